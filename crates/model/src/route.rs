use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{Coordinate, LineStyle, RouteColor};

/// The line currently shown for the latest segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RenderedRoute {
    pub geometry: Vec<Coordinate>,
    pub color: RouteColor,
    /// `false` while the straight fallback line is displayed.
    pub road_aligned: bool,
}

impl RenderedRoute {
    pub fn straight(from: Coordinate, to: Coordinate, color: RouteColor) -> Self {
        Self {
            geometry: vec![from, to],
            color,
            road_aligned: false,
        }
    }

    pub fn style(&self) -> LineStyle {
        if self.road_aligned {
            LineStyle::route(self.color)
        } else {
            LineStyle::fallback(self.color)
        }
    }
}
