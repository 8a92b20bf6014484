use std::sync::Arc;

use chrono::{DateTime, Local};
use model::{Bounds, Coordinate, Point, Rating, RenderedRoute, RouteColor};
use overpass::RoadLookup;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{
    feedback::{FeedbackError, FeedbackPrompt, PromptView},
    renderer::RouteRenderer,
    session::{AcceptanceMode, Lookup, PointSession},
    surface::MapSurface,
};

pub const DEFAULT_SNAP_RADIUS_M: f64 = 15.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum InteractionState {
    Idle,
    AwaitingFirstPoint,
    AwaitingSecondPoint,
    SegmentDrawn,
    AwaitingRating,
}

#[derive(Debug, Clone)]
pub struct ControllerConfig {
    pub mode: AcceptanceMode,
    pub snap_radius_m: f64,
    /// Draw the roads of the visible area (road-snap views only).
    pub road_overlay: bool,
}

impl ControllerConfig {
    pub fn new(mode: AcceptanceMode) -> Self {
        Self {
            mode,
            snap_radius_m: DEFAULT_SNAP_RADIUS_M,
            road_overlay: true,
        }
    }
}

#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClickOutcome {
    pub sequence: u64,
    pub accepted: bool,
    pub session_length: usize,
    pub segment: Option<RenderedRoute>,
    pub state: InteractionState,
    pub diagnostics: Vec<String>,
}

#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RatingOutcome {
    pub rating: Rating,
    pub route: Option<RenderedRoute>,
    pub state: InteractionState,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ViewportOutcome {
    pub roads_shown: usize,
    pub diagnostics: Vec<String>,
}

#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub mode: AcceptanceMode,
    pub state: InteractionState,
    pub points: Vec<Point>,
    pub segment_ready: bool,
    pub current_route: Option<RenderedRoute>,
    pub prompt: Option<PromptView>,
    pub bounds: Option<Bounds>,
    pub clicks: u64,
    pub created_at: DateTime<Local>,
}

/// Drives one map view: turns surface events into session updates and
/// drawing. Lookups are awaited before any shared state is touched.
pub struct AnnotationController<S: MapSurface> {
    config: ControllerConfig,
    session: PointSession,
    renderer: RouteRenderer,
    prompt: FeedbackPrompt,
    surface: S,
    lookup: Arc<dyn RoadLookup>,
    state: InteractionState,
    clicks: u64,
    created_at: DateTime<Local>,
}

impl<S: MapSurface> AnnotationController<S> {
    pub fn new(config: ControllerConfig, surface: S, lookup: Arc<dyn RoadLookup>) -> Self {
        Self {
            session: PointSession::new(config.mode),
            config,
            renderer: RouteRenderer::new(),
            prompt: FeedbackPrompt::default(),
            surface,
            lookup,
            state: InteractionState::Idle,
            clicks: 0,
            created_at: Local::now(),
        }
    }

    pub async fn on_click(&mut self, latitude: f64, longitude: f64) -> ClickOutcome {
        self.clicks += 1;
        if self.state == InteractionState::Idle {
            self.state = InteractionState::AwaitingFirstPoint;
        }

        let coordinate = match Coordinate::new(latitude, longitude) {
            Ok(coordinate) => coordinate,
            Err(why) => {
                log::warn!("Ignoring click: {}", why);
                return self.rejected(why.to_string());
            }
        };

        let lookup = match self.config.mode {
            AcceptanceMode::RoadSnap => Lookup::from(
                self.lookup
                    .resolve_near(&coordinate, self.config.snap_radius_m)
                    .await,
            ),
            AcceptanceMode::FreeDraw => Lookup::NotAttempted,
        };

        if !self.session.add_point(coordinate, lookup).is_accepted() {
            return self.rejected(format!(
                "No road within {}m of {}, click ignored.",
                self.config.snap_radius_m, coordinate
            ));
        }

        if let Some(point) = self.session.points().last() {
            self.renderer.place_marker(&mut self.surface, point);
        }

        let segment = match self.session.last_segment() {
            Some((a, b)) => {
                let route = self
                    .renderer
                    .draw_segment(
                        &mut self.surface,
                        self.lookup.as_ref(),
                        a,
                        b,
                        RouteColor::Default,
                    )
                    .await;
                self.state = InteractionState::SegmentDrawn;
                Some(route)
            }
            None => {
                self.state = InteractionState::AwaitingSecondPoint;
                None
            }
        };

        if segment.is_some() {
            self.state = match self.config.mode {
                AcceptanceMode::RoadSnap => {
                    self.prompt.show(&mut self.surface);
                    InteractionState::AwaitingRating
                }
                AcceptanceMode::FreeDraw => InteractionState::AwaitingFirstPoint,
            };
        }

        ClickOutcome {
            sequence: self.clicks,
            accepted: true,
            session_length: self.session.len(),
            segment,
            state: self.state,
            diagnostics: vec![],
        }
    }

    pub fn submit_rating(&mut self, raw: i64) -> Result<RatingOutcome, FeedbackError> {
        let rating = self
            .prompt
            .submit(raw, &mut self.renderer, &mut self.surface)
            .inspect_err(|why| log::warn!("Rating rejected: {}", why))?;

        // a half finished next segment keeps waiting for its second point
        self.state = if self.session.len() % 2 == 1 {
            InteractionState::AwaitingSecondPoint
        } else {
            InteractionState::AwaitingFirstPoint
        };

        Ok(RatingOutcome {
            rating,
            route: self.renderer.current().cloned(),
            state: self.state,
        })
    }

    /// Records the visible area and refreshes the road overlay.
    pub async fn on_viewport_change(&mut self, bounds: Bounds) -> ViewportOutcome {
        if !bounds.is_valid() {
            log::warn!("Ignoring invalid viewport {:?}.", bounds);
            return ViewportOutcome {
                roads_shown: 0,
                diagnostics: vec![format!("Invalid viewport {:?}.", bounds)],
            };
        }
        self.surface.update_bounds(bounds);
        if self.state == InteractionState::Idle {
            self.state = InteractionState::AwaitingFirstPoint;
        }

        if self.config.mode == AcceptanceMode::RoadSnap && self.config.road_overlay {
            let roads = self.lookup.roads_within(&bounds).await;
            log::debug!("Showing {} roads for {:?}.", roads.len(), bounds);
            self.renderer.show_roads(&mut self.surface, &roads);
        }
        ViewportOutcome {
            roads_shown: self.renderer.road_layers().len(),
            diagnostics: vec![],
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            mode: self.session.mode(),
            state: self.state,
            points: self.session.points().to_vec(),
            segment_ready: self.session.segment_ready(),
            current_route: self.renderer.current().cloned(),
            prompt: self
                .prompt
                .is_visible()
                .then(|| self.prompt.view().clone()),
            bounds: self.surface.get_bounds(),
            clicks: self.clicks,
            created_at: self.created_at,
        }
    }

    pub fn state(&self) -> InteractionState {
        self.state
    }

    pub fn session(&self) -> &PointSession {
        &self.session
    }

    pub fn renderer(&self) -> &RouteRenderer {
        &self.renderer
    }

    pub fn prompt(&self) -> &FeedbackPrompt {
        &self.prompt
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    fn rejected(&self, diagnostic: String) -> ClickOutcome {
        ClickOutcome {
            sequence: self.clicks,
            accepted: false,
            session_length: self.session.len(),
            segment: None,
            state: self.state,
            diagnostics: vec![diagnostic],
        }
    }
}
