use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{geometry, Coordinate};

/// Identifier of a way in the road data service.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(transparent)]
pub struct RoadId(pub i64);

impl fmt::Display for RoadId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoadRef {
    pub id: RoadId,
    pub name: Option<String>,
    pub geometry: Vec<Coordinate>,
}

impl RoadRef {
    pub fn new(id: RoadId, geometry: Vec<Coordinate>) -> Self {
        Self {
            id,
            name: None,
            geometry,
        }
    }

    pub fn with_name(mut self, name: Option<String>) -> Self {
        self.name = name;
        self
    }

    /// Distance in meters from `coordinate` to the closest part of this road.
    pub fn distance_m(&self, coordinate: &Coordinate) -> Option<f64> {
        geometry::distance_to_polyline_m(&self.geometry, coordinate)
    }
}
