use schemars::{
    gen::SchemaGenerator,
    schema::{InstanceType, Schema, SchemaObject},
    JsonSchema,
};
use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};
use std::{error, fmt};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RatingError(pub i64);

impl error::Error for RatingError {}

impl fmt::Display for RatingError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Rating {} is not one of 1, 2 or 3.", self.0)
    }
}

/// User feedback for a drawn segment. Encoded as the bare integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize_repr, Deserialize_repr)]
#[repr(u8)]
pub enum Rating {
    Poor = 1,
    Fair = 2,
    Good = 3,
}

impl Rating {
    pub const ALL: [Rating; 3] = [Rating::Poor, Rating::Fair, Rating::Good];

    pub fn value(self) -> u8 {
        self as u8
    }

    pub fn label(self) -> &'static str {
        match self {
            Rating::Poor => "Poor",
            Rating::Fair => "Okay",
            Rating::Good => "Good",
        }
    }
}

impl TryFrom<i64> for Rating {
    type Error = RatingError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Rating::Poor),
            2 => Ok(Rating::Fair),
            3 => Ok(Rating::Good),
            other => Err(RatingError(other)),
        }
    }
}

impl TryFrom<u8> for Rating {
    type Error = RatingError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Rating::try_from(value as i64)
    }
}

impl JsonSchema for Rating {
    fn schema_name() -> String {
        "Rating".to_owned()
    }

    fn json_schema(_gen: &mut SchemaGenerator) -> Schema {
        SchemaObject {
            instance_type: Some(InstanceType::Integer.into()),
            enum_values: Some(Rating::ALL.iter().map(|r| r.value().into()).collect()),
            ..Default::default()
        }
        .into()
    }
}

/// Fixed palette for rendered routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum RouteColor {
    Default,
    Warning,
    Neutral,
    Favorable,
}

impl RouteColor {
    pub fn for_rating(rating: Rating) -> Self {
        match rating {
            Rating::Poor => RouteColor::Warning,
            Rating::Fair => RouteColor::Neutral,
            Rating::Good => RouteColor::Favorable,
        }
    }

    pub fn css(self) -> &'static str {
        match self {
            RouteColor::Default => "#3388ff",
            RouteColor::Warning => "#e53935",
            RouteColor::Neutral => "#fbc02d",
            RouteColor::Favorable => "#43a047",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LineStyle {
    pub color: String,
    pub weight: f32,
    pub dashed: bool,
}

impl LineStyle {
    pub fn route(color: RouteColor) -> Self {
        Self {
            color: color.css().to_owned(),
            weight: 5.0,
            dashed: false,
        }
    }

    /// Provisional straight line shown until road geometry arrives.
    pub fn fallback(color: RouteColor) -> Self {
        Self {
            dashed: true,
            ..Self::route(color)
        }
    }

    pub fn road_overlay() -> Self {
        Self {
            color: "blue".to_owned(),
            weight: 3.0,
            dashed: false,
        }
    }
}
