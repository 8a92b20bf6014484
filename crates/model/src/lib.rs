use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::{error, fmt};
use utility::geo::haversine_distance;

pub mod geometry;
pub mod point;
pub mod rating;
pub mod road;
pub mod route;

pub use point::Point;
pub use rating::{LineStyle, Rating, RatingError, RouteColor};
pub use road::{RoadId, RoadRef};
pub use route::RenderedRoute;

pub trait ExampleData {
    fn example_data() -> Self;
}

#[derive(Debug, Clone, PartialEq)]
pub enum CoordinateError {
    NotFinite,
    LatitudeOutOfRange(f64),
    LongitudeOutOfRange(f64),
}

impl error::Error for CoordinateError {}

impl fmt::Display for CoordinateError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CoordinateError::NotFinite => write!(f, "Coordinate is not a finite number."),
            CoordinateError::LatitudeOutOfRange(lat) => {
                write!(f, "Latitude {} is outside of [-90, 90].", lat)
            }
            CoordinateError::LongitudeOutOfRange(lon) => {
                write!(f, "Longitude {} is outside of [-180, 180].", lon)
            }
        }
    }
}

/// A WGS84 position. Construct with [`Coordinate::new`] to get validation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoordinateError> {
        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(CoordinateError::NotFinite);
        }
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(CoordinateError::LatitudeOutOfRange(latitude));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(CoordinateError::LongitudeOutOfRange(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    pub fn distance_m(&self, other: &Coordinate) -> f64 {
        haversine_distance(
            self.latitude,
            self.longitude,
            other.latitude,
            other.longitude,
        ) * 1000.0
    }

    pub fn as_tuple(&self) -> (f64, f64) {
        (self.latitude, self.longitude)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.latitude, self.longitude)
    }
}

impl ExampleData for Coordinate {
    fn example_data() -> Self {
        Self {
            latitude: 33.18,
            longitude: 131.62,
        }
    }
}

/// Visible map area, as reported by the map surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Bounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl Bounds {
    pub fn new(south: f64, west: f64, north: f64, east: f64) -> Self {
        Self {
            south,
            west,
            north,
            east,
        }
    }

    pub fn contains(&self, coordinate: &Coordinate) -> bool {
        (self.south..=self.north).contains(&coordinate.latitude)
            && (self.west..=self.east).contains(&coordinate.longitude)
    }

    pub fn is_valid(&self) -> bool {
        [self.south, self.west, self.north, self.east]
            .iter()
            .all(|value| value.is_finite())
            && self.south <= self.north
            && self.west <= self.east
    }
}

impl ExampleData for Bounds {
    fn example_data() -> Self {
        Self::new(33.176, 131.612, 33.184, 131.628)
    }
}
