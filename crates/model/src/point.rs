use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{Coordinate, RoadRef};

/// A confirmed click. Fields are private so a point cannot change once it
/// joined a session.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Point {
    coordinate: Coordinate,
    road: Option<RoadRef>,
}

impl Point {
    pub fn new(coordinate: Coordinate, road: Option<RoadRef>) -> Self {
        Self { coordinate, road }
    }

    pub fn coordinate(&self) -> &Coordinate {
        &self.coordinate
    }

    pub fn road(&self) -> Option<&RoadRef> {
        self.road.as_ref()
    }
}
