use std::{error, fmt};

use model::{Rating, RatingError};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{
    renderer::RouteRenderer,
    surface::{LayerId, MapSurface},
};

/// One button of the prompt, bound to exactly one rating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PromptAction {
    pub rating: Rating,
    pub label: String,
}

/// Declarative description of the rating overlay. Hosts build their widgets
/// from this.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PromptView {
    pub title: String,
    pub actions: Vec<PromptAction>,
}

impl PromptView {
    pub fn segment_rating() -> Self {
        Self {
            title: "How was this segment?".to_owned(),
            actions: Rating::ALL
                .iter()
                .map(|rating| PromptAction {
                    rating: *rating,
                    label: rating.label().to_owned(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FeedbackError {
    NotVisible,
    InvalidRating(RatingError),
}

impl error::Error for FeedbackError {}

impl fmt::Display for FeedbackError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FeedbackError::NotVisible => write!(f, "There is no rating prompt to answer."),
            FeedbackError::InvalidRating(why) => write!(f, "{}", why),
        }
    }
}

impl From<RatingError> for FeedbackError {
    fn from(value: RatingError) -> Self {
        FeedbackError::InvalidRating(value)
    }
}

/// Transient rating overlay for the latest segment. At most one is shown.
#[derive(Debug)]
pub struct FeedbackPrompt {
    view: PromptView,
    overlay: Option<LayerId>,
}

impl Default for FeedbackPrompt {
    fn default() -> Self {
        Self::new(PromptView::segment_rating())
    }
}

impl FeedbackPrompt {
    pub fn new(view: PromptView) -> Self {
        Self {
            view,
            overlay: None,
        }
    }

    /// Shows the prompt, replacing one that is already visible.
    pub fn show(&mut self, surface: &mut dyn MapSurface) -> LayerId {
        self.dismiss(surface);
        let layer = surface.add_overlay(&self.view);
        self.overlay = Some(layer);
        layer
    }

    /// Handles one of the prompt's actions: recolors the current route and
    /// removes the overlay. Invalid input leaves both untouched.
    pub fn submit(
        &mut self,
        raw: i64,
        renderer: &mut RouteRenderer,
        surface: &mut dyn MapSurface,
    ) -> Result<Rating, FeedbackError> {
        if self.overlay.is_none() {
            return Err(FeedbackError::NotVisible);
        }
        let rating = Rating::try_from(raw)?;
        renderer.recolor(surface, rating);
        self.dismiss(surface);
        Ok(rating)
    }

    pub fn dismiss(&mut self, surface: &mut dyn MapSurface) {
        if let Some(layer) = self.overlay.take() {
            surface.remove_layer(layer);
        }
    }

    pub fn is_visible(&self) -> bool {
        self.overlay.is_some()
    }

    pub fn view(&self) -> &PromptView {
        &self.view
    }
}
