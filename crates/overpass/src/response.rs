use std::collections::HashMap;

use model::{Coordinate, RoadId, RoadRef};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Response {
    #[serde(default)]
    pub elements: Vec<Element>,
    /// Set by the service when a query ran into a runtime error or timeout.
    pub remark: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Node,
    Way,
    Relation,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Element {
    #[serde(rename = "type")]
    pub kind: ElementKind,
    pub id: i64,
    pub geometry: Option<Vec<LatLon>>,
    #[serde(default)]
    pub tags: HashMap<String, String>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl Element {
    /// Converts a way with geometry into a road. Vertices with invalid
    /// coordinates are dropped.
    pub fn into_road(self) -> Option<RoadRef> {
        if self.kind != ElementKind::Way {
            return None;
        }
        let geometry = self
            .geometry?
            .into_iter()
            .filter_map(|point| Coordinate::new(point.lat, point.lon).ok())
            .collect::<Vec<_>>();
        if geometry.is_empty() {
            return None;
        }
        let name = self.tags.get("name").cloned();
        Some(RoadRef::new(RoadId(self.id), geometry).with_name(name))
    }
}

impl Response {
    /// All usable roads, in the order the service returned them.
    pub fn into_roads(self) -> Vec<RoadRef> {
        if let Some(remark) = &self.remark {
            log::warn!("Overpass remark: {}", remark);
        }
        self.elements
            .into_iter()
            .filter_map(Element::into_road)
            .collect()
    }
}
