use std::{fmt, str::FromStr};

use model::{Coordinate, Point, RoadRef};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Which clicks a session accepts. Chosen once, when the view is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum AcceptanceMode {
    /// Only clicks that resolve to a nearby road become points.
    RoadSnap,
    /// Every click becomes a point.
    FreeDraw,
}

impl AcceptanceMode {
    pub fn name(self) -> &'static str {
        match self {
            AcceptanceMode::RoadSnap => "road-snap",
            AcceptanceMode::FreeDraw => "free-draw",
        }
    }
}

impl fmt::Display for AcceptanceMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AcceptanceMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "road-snap" | "roadsnap" | "snap" => Ok(AcceptanceMode::RoadSnap),
            "free-draw" | "freedraw" | "free" => Ok(AcceptanceMode::FreeDraw),
            other => Err(format!("unknown acceptance mode '{other}'")),
        }
    }
}

/// Result of the road lookup made for a click, if any.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    NotAttempted,
    Resolved(RoadRef),
    NotFound,
}

impl From<Option<RoadRef>> for Lookup {
    fn from(value: Option<RoadRef>) -> Self {
        value.map(Lookup::Resolved).unwrap_or(Lookup::NotFound)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Accepted { len: usize },
    Rejected { len: usize },
}

impl AddOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, AddOutcome::Accepted { .. })
    }

    pub fn len(&self) -> usize {
        match self {
            AddOutcome::Accepted { len } | AddOutcome::Rejected { len } => *len,
        }
    }
}

/// Ordered, append only list of confirmed points. Points 0-1, 2-3, ... form
/// the segments.
#[derive(Debug, Clone)]
pub struct PointSession {
    mode: AcceptanceMode,
    points: Vec<Point>,
}

impl PointSession {
    pub fn new(mode: AcceptanceMode) -> Self {
        Self {
            mode,
            points: vec![],
        }
    }

    pub fn mode(&self) -> AcceptanceMode {
        self.mode
    }

    pub fn add_point(&mut self, at: Coordinate, lookup: Lookup) -> AddOutcome {
        let road = match (self.mode, lookup) {
            (_, Lookup::Resolved(road)) => Some(road),
            (AcceptanceMode::FreeDraw, _) => None,
            (AcceptanceMode::RoadSnap, Lookup::NotFound) => {
                log::warn!("Rejected click at {}: no road nearby.", at);
                return AddOutcome::Rejected { len: self.len() };
            }
            (AcceptanceMode::RoadSnap, Lookup::NotAttempted) => {
                log::warn!("Rejected click at {}: road was never looked up.", at);
                return AddOutcome::Rejected { len: self.len() };
            }
        };
        self.points.push(Point::new(at, road));
        AddOutcome::Accepted { len: self.len() }
    }

    pub fn segment_ready(&self) -> bool {
        self.len() >= 2 && self.len() % 2 == 0
    }

    /// The two most recent points, when they complete a segment.
    pub fn last_segment(&self) -> Option<(&Point, &Point)> {
        if !self.segment_ready() {
            return None;
        }
        match self.points.as_slice() {
            [.., a, b] => Some((a, b)),
            _ => None,
        }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
