use std::{error, fmt};

use model::Bounds;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};

use crate::{
    controller::{
        AnnotationController, ClickOutcome, RatingOutcome, SessionSnapshot, ViewportOutcome,
    },
    feedback::FeedbackError,
    surface::{DrawCommand, RecordingSurface},
};

const MAILBOX_SIZE: usize = 32;

#[derive(Debug)]
pub enum ServiceError {
    SendError,
    ResponseError(oneshot::error::RecvError),
}

impl error::Error for ServiceError {}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ServiceError::SendError => write!(f, "The annotation view is closed."),
            ServiceError::ResponseError(why) => {
                write!(f, "The annotation view did not answer: {}", why)
            }
        }
    }
}

impl<T> From<mpsc::error::SendError<T>> for ServiceError {
    fn from(_: mpsc::error::SendError<T>) -> Self {
        ServiceError::SendError
    }
}

impl From<oneshot::error::RecvError> for ServiceError {
    fn from(why: oneshot::error::RecvError) -> Self {
        ServiceError::ResponseError(why)
    }
}

pub type ServiceResult<O> = Result<O, ServiceError>;

/// An answer together with the drawing it caused.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Reply<T> {
    #[serde(flatten)]
    pub outcome: T,
    pub commands: Vec<DrawCommand>,
}

#[derive(Debug)]
pub enum Request {
    Click {
        latitude: f64,
        longitude: f64,
        responder: oneshot::Sender<Reply<ClickOutcome>>,
    },
    Rate {
        rating: i64,
        responder: oneshot::Sender<Result<Reply<RatingOutcome>, FeedbackError>>,
    },
    Viewport {
        bounds: Bounds,
        responder: oneshot::Sender<Reply<ViewportOutcome>>,
    },
    Snapshot {
        responder: oneshot::Sender<SessionSnapshot>,
    },
}

/// Client side of a running view. Cloning is cheap; the view stops once the
/// last handle is dropped.
#[derive(Debug, Clone)]
pub struct AnnotationHandle {
    sender: mpsc::Sender<Request>,
}

/// Runs `controller` on its own task. Requests are handled one after the
/// other in arrival order, and every lookup a request makes finishes before
/// the next request is taken.
pub fn spawn(controller: AnnotationController<RecordingSurface>) -> AnnotationHandle {
    let (sender, mut receiver) = mpsc::channel(MAILBOX_SIZE);

    tokio::spawn(async move {
        let mut controller = controller;
        while let Some(request) = receiver.recv().await {
            handle(&mut controller, request).await;
        }
        log::info!(
            "Annotation view closed after {} clicks.",
            controller.snapshot().clicks
        );
    });

    AnnotationHandle { sender }
}

async fn handle(controller: &mut AnnotationController<RecordingSurface>, request: Request) {
    // a dropped responder only means the caller went away
    match request {
        Request::Click {
            latitude,
            longitude,
            responder,
        } => {
            let outcome = controller.on_click(latitude, longitude).await;
            let commands = controller.surface_mut().drain();
            let _ = responder.send(Reply { outcome, commands });
        }
        Request::Rate { rating, responder } => {
            let result = controller.submit_rating(rating).map(|outcome| Reply {
                outcome,
                commands: controller.surface_mut().drain(),
            });
            let _ = responder.send(result);
        }
        Request::Viewport { bounds, responder } => {
            let outcome = controller.on_viewport_change(bounds).await;
            let commands = controller.surface_mut().drain();
            let _ = responder.send(Reply { outcome, commands });
        }
        Request::Snapshot { responder } => {
            let _ = responder.send(controller.snapshot());
        }
    }
}

impl AnnotationHandle {
    pub async fn click(&self, latitude: f64, longitude: f64) -> ServiceResult<Reply<ClickOutcome>> {
        let (responder, response) = oneshot::channel();
        self.sender
            .send(Request::Click {
                latitude,
                longitude,
                responder,
            })
            .await?;
        Ok(response.await?)
    }

    pub async fn rate(
        &self,
        rating: i64,
    ) -> ServiceResult<Result<Reply<RatingOutcome>, FeedbackError>> {
        let (responder, response) = oneshot::channel();
        self.sender.send(Request::Rate { rating, responder }).await?;
        Ok(response.await?)
    }

    pub async fn viewport(&self, bounds: Bounds) -> ServiceResult<Reply<ViewportOutcome>> {
        let (responder, response) = oneshot::channel();
        self.sender
            .send(Request::Viewport { bounds, responder })
            .await?;
        Ok(response.await?)
    }

    pub async fn snapshot(&self) -> ServiceResult<SessionSnapshot> {
        let (responder, response) = oneshot::channel();
        self.sender.send(Request::Snapshot { responder }).await?;
        Ok(response.await?)
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use super::*;
    use crate::{
        controller::{ControllerConfig, InteractionState},
        session::AcceptanceMode,
        testing::FakeLookup,
    };
    use model::{Coordinate, RoadId, RoadRef};

    fn road() -> RoadRef {
        RoadRef::new(
            RoadId(5),
            vec![
                Coordinate::new(33.180, 131.619).unwrap(),
                Coordinate::new(33.180, 131.621).unwrap(),
            ],
        )
    }

    fn start(mode: AcceptanceMode, lookup: FakeLookup) -> AnnotationHandle {
        spawn(AnnotationController::new(
            ControllerConfig::new(mode),
            RecordingSurface::new(),
            Arc::new(lookup),
        ))
    }

    #[tokio::test]
    async fn overlapping_clicks_are_handled_in_order() {
        let lookup = FakeLookup::with_roads(vec![road()]).delayed(Duration::from_millis(50));
        let view = start(AcceptanceMode::RoadSnap, lookup);

        let (first, second) = tokio::join!(view.click(33.180, 131.619), view.click(33.180, 131.621));
        let (first, second) = (first.unwrap(), second.unwrap());

        assert_eq!(first.outcome.sequence, 1);
        assert_eq!(first.outcome.session_length, 1);
        assert_eq!(second.outcome.sequence, 2);
        assert_eq!(second.outcome.session_length, 2);
        assert_eq!(second.outcome.state, InteractionState::AwaitingRating);
        assert!(second
            .commands
            .iter()
            .any(|command| matches!(command, DrawCommand::ShowOverlay { .. })));
    }

    #[tokio::test]
    async fn rating_round_trip() {
        let view = start(AcceptanceMode::RoadSnap, FakeLookup::with_roads(vec![road()]));
        view.click(33.180, 131.619).await.unwrap();
        view.click(33.180, 131.621).await.unwrap();

        let rejected = view.rate(9).await.unwrap();
        assert!(rejected.is_err());

        let accepted = view.rate(2).await.unwrap().unwrap();
        assert_eq!(accepted.outcome.rating.value(), 2);
        assert!(!accepted.commands.is_empty());

        let snapshot = view.snapshot().await.unwrap();
        assert!(snapshot.prompt.is_none());
        assert_eq!(snapshot.points.len(), 2);
    }

    #[tokio::test]
    async fn free_draw_view() {
        let view = start(AcceptanceMode::FreeDraw, FakeLookup::default());
        let first = view.click(33.180, 131.620).await.unwrap();
        let second = view.click(33.181, 131.621).await.unwrap();
        assert_eq!(first.commands.len(), 1);
        // marker and straight line
        assert_eq!(second.commands.len(), 2);
        assert_eq!(second.outcome.session_length, 2);
    }
}
