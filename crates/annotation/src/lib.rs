//! Point pairing, road snapping and route drawing for an interactive map.
//!
//! A map host forwards clicks and viewport changes to an
//! [`AnnotationController`]. Accepted clicks become points of a
//! [`PointSession`]; every completed pair is drawn by the [`RouteRenderer`]
//! and, for road-snap views, rated through the [`FeedbackPrompt`].

pub mod controller;
pub mod feedback;
pub mod renderer;
pub mod service;
pub mod session;
pub mod surface;

#[cfg(test)]
pub(crate) mod testing;

pub use controller::{AnnotationController, ControllerConfig, InteractionState};
pub use feedback::{FeedbackError, FeedbackPrompt, PromptView};
pub use renderer::RouteRenderer;
pub use service::{spawn, AnnotationHandle, ServiceError};
pub use session::{AcceptanceMode, PointSession};
pub use surface::{DrawCommand, LayerId, MapSurface, RecordingSurface};
