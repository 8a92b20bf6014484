use std::{sync::Arc, time::Instant};

use annotation::{
    controller::{ClickOutcome, RatingOutcome, SessionSnapshot, ViewportOutcome},
    service::Reply,
    AcceptanceMode, AnnotationHandle, InteractionState,
};
use axum::{
    body::Bytes,
    extract::{OriginalUri, Path, State},
    http::{Method, StatusCode},
    routing::{get, post},
    Extension, Json, Router,
};
use model::Bounds;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{
    common::{route_not_found, schema, ErrorReply, HateoasResult, RouteResult},
    hateoas,
    middleware::base_url::{base_url_middleware, BaseUrl},
    views::ViewRegistry,
    WebState,
};

macro_rules! resource {
    ($($arg:tt)*) => {
        crate::api::v1::resource!("/views{}", format_args!($($arg)*))
    };
}
pub(crate) use resource;

pub(crate) fn routes(state: WebState) -> Router {
    Router::new()
        .route("/schema", get(schema::<ViewDto>))
        .route("/schema/snapshot", get(schema::<SessionSnapshot>))
        .route("/schema/click", get(schema::<Reply<ClickOutcome>>))
        .route("/schema/rating", get(schema::<Reply<RatingOutcome>>))
        .route("/schema/viewport", get(schema::<Reply<ViewportOutcome>>))
        .route("/", get(list_views).post(create_view))
        .route("/:id", get(get_view).delete(delete_view))
        .route("/:id/clicks", post(click))
        .route("/:id/viewport", post(viewport))
        .route("/:id/rating", post(rate))
        .layer(axum::middleware::from_fn(base_url_middleware))
        .with_state(state)
        .fallback(route_not_found)
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ViewDto {
    pub id: u64,
    pub mode: AcceptanceMode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewList {
    pub views: Vec<hateoas::Response<ViewDto>>,
}

#[derive(Debug, Default, Deserialize)]
struct CreateViewRequest {
    mode: Option<AcceptanceMode>,
}

#[derive(Debug, Deserialize)]
struct ClickRequest {
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Deserialize)]
struct RatingRequest {
    rating: i64,
}

async fn lookup_view(views: &ViewRegistry, id: u64) -> RouteResult<AnnotationHandle> {
    views
        .get(id)
        .await
        .ok_or_else(|| ErrorReply::unknown_view(id))
}

fn view_hateoas(view: ViewDto, base_url: Arc<BaseUrl>) -> hateoas::Response<ViewDto> {
    let id = view.id;
    hateoas::Response::builder(view, base_url)
        .link("self", resource!("/{}", id))
        .link("clicks", resource!("/{}/clicks", id))
        .link("viewport", resource!("/{}/viewport", id))
        .link("rating", resource!("/{}/rating", id))
        .link("schema", resource!("/schema"))
        .build()
}

async fn list_views(
    State(views): State<ViewRegistry>,
    Extension(base_url): Extension<Arc<BaseUrl>>,
) -> Json<ViewList> {
    let views = views
        .list()
        .await
        .into_iter()
        .map(|(id, mode)| view_hateoas(ViewDto { id, mode }, base_url.clone()))
        .collect();
    Json(ViewList { views })
}

/// An empty body opens a view in the server's default mode.
async fn create_view(
    OriginalUri(original_uri): OriginalUri,
    State(WebState {
        views,
        default_mode,
    }): State<WebState>,
    Extension(base_url): Extension<Arc<BaseUrl>>,
    body: Bytes,
) -> RouteResult<(StatusCode, Json<hateoas::Response<ViewDto>>)> {
    let request = if body.iter().all(u8::is_ascii_whitespace) {
        CreateViewRequest::default()
    } else {
        serde_json::from_slice::<CreateViewRequest>(&body).map_err(|why| {
            ErrorReply::bad_request("Expected a body like {\"mode\": \"road-snap\"}.")
                .at(&Method::POST, original_uri.path())
                .because(why)
        })?
    };

    let mode = request.mode.unwrap_or(default_mode);
    let id = views.open(mode).await;
    let view = view_hateoas(ViewDto { id, mode }, base_url);
    Ok((StatusCode::CREATED, view.json()))
}

async fn get_view(
    Path(id): Path<u64>,
    State(views): State<ViewRegistry>,
    Extension(base_url): Extension<Arc<BaseUrl>>,
) -> HateoasResult<SessionSnapshot> {
    let snapshot = lookup_view(&views, id).await?.snapshot().await?;
    Ok(hateoas::Response::builder(snapshot, base_url)
        .link("self", resource!("/{}", id))
        .link("clicks", resource!("/{}/clicks", id))
        .link("schema", resource!("/schema/snapshot"))
        .build()
        .json())
}

async fn delete_view(Path(id): Path<u64>, State(views): State<ViewRegistry>) -> RouteResult<StatusCode> {
    if views.close(id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ErrorReply::unknown_view(id))
    }
}

async fn click(
    Path(id): Path<u64>,
    State(views): State<ViewRegistry>,
    Extension(base_url): Extension<Arc<BaseUrl>>,
    Json(request): Json<ClickRequest>,
) -> HateoasResult<Reply<ClickOutcome>> {
    let handle = lookup_view(&views, id).await?;

    let now = Instant::now();
    let reply = handle.click(request.latitude, request.longitude).await?;
    let elapsed = now.elapsed();

    let awaiting_rating = reply.outcome.state == InteractionState::AwaitingRating;
    let mut response = hateoas::Response::builder(reply, base_url)
        .link("self", resource!("/{}/clicks", id))
        .link("view", resource!("/{}", id))
        .debug_info("elapsedSecs", elapsed.as_secs_f64());
    if awaiting_rating {
        response = response.link("rating", resource!("/{}/rating", id));
    }
    Ok(response.build().json())
}

async fn viewport(
    OriginalUri(original_uri): OriginalUri,
    Path(id): Path<u64>,
    State(views): State<ViewRegistry>,
    Extension(base_url): Extension<Arc<BaseUrl>>,
    Json(bounds): Json<Bounds>,
) -> HateoasResult<Reply<ViewportOutcome>> {
    if !bounds.is_valid() {
        return Err(ErrorReply::bad_request(
            "South must not exceed north and west must not exceed east.",
        )
        .at(&Method::POST, original_uri.path()));
    }

    let reply = lookup_view(&views, id).await?.viewport(bounds).await?;
    Ok(hateoas::Response::builder(reply, base_url)
        .link("view", resource!("/{}", id))
        .build()
        .json())
}

async fn rate(
    OriginalUri(original_uri): OriginalUri,
    Path(id): Path<u64>,
    State(views): State<ViewRegistry>,
    Extension(base_url): Extension<Arc<BaseUrl>>,
    Json(request): Json<RatingRequest>,
) -> HateoasResult<Reply<RatingOutcome>> {
    let reply = lookup_view(&views, id)
        .await?
        .rate(request.rating)
        .await?
        .map_err(|why| {
            ErrorReply::from(why).at(&Method::POST, original_uri.path())
        })?;
    Ok(hateoas::Response::builder(reply, base_url)
        .link("view", resource!("/{}", id))
        .link("clicks", resource!("/{}/clicks", id))
        .build()
        .json())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use annotation::DrawCommand;
    use async_trait::async_trait;
    use axum::http::{HeaderMap, Uri};
    use model::{geometry, Coordinate, Point, RoadId, RoadRef, RouteColor};
    use overpass::{OverpassClient, OverpassConfig, RoadLookup};

    use super::*;

    /// One east-west street through the demo area.
    struct OneStreet(RoadRef);

    impl OneStreet {
        fn new() -> Self {
            Self(RoadRef::new(
                RoadId(42),
                vec![
                    Coordinate::new(33.1800, 131.6180).unwrap(),
                    Coordinate::new(33.1800, 131.6200).unwrap(),
                    Coordinate::new(33.1800, 131.6220).unwrap(),
                ],
            ))
        }
    }

    #[async_trait]
    impl RoadLookup for OneStreet {
        async fn resolve_near(&self, at: &Coordinate, radius_m: f64) -> Option<RoadRef> {
            self.0
                .distance_m(at)
                .filter(|distance| *distance <= radius_m)
                .map(|_| self.0.clone())
        }

        async fn resolve_between(&self, from: &Point, to: &Point) -> Vec<Coordinate> {
            match (from.road(), to.road()) {
                (Some(a), Some(b)) => {
                    geometry::road_path(from.coordinate(), a, to.coordinate(), b)
                }
                _ => vec![],
            }
        }

        async fn roads_within(&self, _bounds: &Bounds) -> Vec<RoadRef> {
            vec![self.0.clone()]
        }
    }

    fn state(default_mode: AcceptanceMode) -> WebState {
        WebState {
            views: ViewRegistry::new(Arc::new(OneStreet::new()), 15.0),
            default_mode,
        }
    }

    fn unreachable_state() -> WebState {
        let client = OverpassClient::new(OverpassConfig {
            url: "http://127.0.0.1:9/api/interpreter".to_owned(),
            proxy: None,
            timeout: Some(Duration::from_secs(2)),
        })
        .unwrap();
        WebState {
            views: ViewRegistry::new(Arc::new(client), 15.0),
            default_mode: AcceptanceMode::RoadSnap,
        }
    }

    fn base_url() -> Extension<Arc<BaseUrl>> {
        let mut headers = HeaderMap::new();
        headers.insert("host", "localhost:8080".parse().unwrap());
        Extension(Arc::new(BaseUrl::from_headers(&headers)))
    }

    fn uri(path: &str) -> OriginalUri {
        OriginalUri(path.parse::<Uri>().unwrap())
    }

    async fn open(
        state: &WebState,
        body: &'static str,
    ) -> RouteResult<hateoas::Response<ViewDto>> {
        create_view(
            uri("/api/v1/views"),
            State(state.clone()),
            base_url(),
            Bytes::from_static(body.as_bytes()),
        )
        .await
        .map(|(_, Json(view))| view)
    }

    async fn click_at(
        state: &WebState,
        id: u64,
        latitude: f64,
        longitude: f64,
    ) -> hateoas::Response<Reply<ClickOutcome>> {
        click(
            Path(id),
            State(state.views.clone()),
            base_url(),
            Json(ClickRequest {
                latitude,
                longitude,
            }),
        )
        .await
        .unwrap()
        .0
    }

    async fn rate_with(
        state: &WebState,
        id: u64,
        rating: i64,
    ) -> RouteResult<hateoas::Response<Reply<RatingOutcome>>> {
        rate(
            uri(&format!("/api/v1/views/{id}/rating")),
            Path(id),
            State(state.views.clone()),
            base_url(),
            Json(RatingRequest { rating }),
        )
        .await
        .map(|Json(reply)| reply)
    }

    #[test_log::test(tokio::test)]
    async fn create_view_uses_default_mode_and_links() {
        let state = state(AcceptanceMode::FreeDraw);

        let view = open(&state, "").await.unwrap();
        assert_eq!(view.content.mode, AcceptanceMode::FreeDraw);
        assert_eq!(
            view.link("clicks"),
            Some(
                format!(
                    "http://localhost:8080/api/v1/views/{}/clicks",
                    view.content.id
                )
                .as_str()
            )
        );

        let view = open(&state, r#"{"mode": "road-snap"}"#).await.unwrap();
        assert_eq!(view.content.mode, AcceptanceMode::RoadSnap);

        let error = open(&state, r#"{"mode": "teleport"}"#).await.unwrap_err();
        assert_eq!(error.status_code, StatusCode::BAD_REQUEST);

        let listed = list_views(State(state.views.clone()), base_url()).await;
        assert_eq!(listed.0.views.len(), 2);
    }

    #[test_log::test(tokio::test)]
    async fn free_draw_connects_any_two_clicks() {
        let state = state(AcceptanceMode::FreeDraw);
        let id = open(&state, "").await.unwrap().content.id;

        let first = click_at(&state, id, 33.1850, 131.6250).await;
        assert!(first.content.outcome.accepted);
        assert!(matches!(
            first.content.commands.as_slice(),
            [DrawCommand::AddMarker { .. }]
        ));

        let second = click_at(&state, id, 33.1860, 131.6260).await;
        let segment = second.content.outcome.segment.clone().unwrap();
        assert!(!segment.road_aligned);
        assert_eq!(segment.geometry.len(), 2);
        assert!(second.link("rating").is_none());

        let snapshot = get_view(Path(id), State(state.views.clone()), base_url())
            .await
            .unwrap()
            .0;
        assert_eq!(snapshot.content.points.len(), 2);
        assert!(snapshot.content.prompt.is_none());
    }

    #[test_log::test(tokio::test)]
    async fn road_snap_segment_is_rated() {
        let state = state(AcceptanceMode::RoadSnap);
        let id = open(&state, "").await.unwrap().content.id;

        click_at(&state, id, 33.18002, 131.6185).await;
        let second = click_at(&state, id, 33.18002, 131.6215).await;
        assert_eq!(
            second.content.outcome.state,
            InteractionState::AwaitingRating
        );
        assert!(second.link("rating").is_some());
        assert!(second
            .content
            .commands
            .iter()
            .any(|command| matches!(command, DrawCommand::ShowOverlay { .. })));

        let rated = rate_with(&state, id, 3).await.unwrap();
        let route = rated.content.outcome.route.clone().unwrap();
        assert_eq!(route.color, RouteColor::Favorable);
        assert!(route.road_aligned);
        assert!(rated
            .content
            .commands
            .iter()
            .any(|command| matches!(command, DrawCommand::RemoveLayer { .. })));
    }

    #[test_log::test(tokio::test)]
    async fn invalid_rating_is_a_bad_request() {
        let state = state(AcceptanceMode::RoadSnap);
        let id = open(&state, "").await.unwrap().content.id;
        click_at(&state, id, 33.18002, 131.6185).await;
        click_at(&state, id, 33.18002, 131.6215).await;

        let error = rate_with(&state, id, 7).await.unwrap_err();
        assert_eq!(error.status_code, StatusCode::BAD_REQUEST);
        assert_eq!(
            error.path(),
            Some(format!("/api/v1/views/{id}/rating").as_str())
        );

        // the prompt is still up, so a valid rating goes through afterwards
        assert!(rate_with(&state, id, 1).await.is_ok());
    }

    #[test_log::test(tokio::test)]
    async fn rating_without_prompt_conflicts() {
        let state = state(AcceptanceMode::FreeDraw);
        let id = open(&state, "").await.unwrap().content.id;

        let error = rate_with(&state, id, 2).await.unwrap_err();
        assert_eq!(error.status_code, StatusCode::CONFLICT);
    }

    #[test_log::test(tokio::test)]
    async fn viewport_draws_road_overlay() {
        let state = state(AcceptanceMode::RoadSnap);
        let id = open(&state, "").await.unwrap().content.id;

        let reply = viewport(
            uri(&format!("/api/v1/views/{id}/viewport")),
            Path(id),
            State(state.views.clone()),
            base_url(),
            Json(Bounds::new(33.176, 131.612, 33.184, 131.628)),
        )
        .await
        .unwrap()
        .0;
        assert_eq!(reply.content.outcome.roads_shown, 1);

        let error = viewport(
            uri(&format!("/api/v1/views/{id}/viewport")),
            Path(id),
            State(state.views.clone()),
            base_url(),
            Json(Bounds::new(33.19, 131.61, 33.17, 131.63)),
        )
        .await
        .unwrap_err();
        assert_eq!(error.status_code, StatusCode::BAD_REQUEST);
    }

    #[test_log::test(tokio::test)]
    async fn unknown_and_deleted_views() {
        let state = state(AcceptanceMode::FreeDraw);
        let id = open(&state, "").await.unwrap().content.id;

        assert_eq!(
            delete_view(Path(id), State(state.views.clone()))
                .await
                .unwrap(),
            StatusCode::NO_CONTENT
        );
        let error = get_view(Path(id), State(state.views.clone()), base_url())
            .await
            .unwrap_err();
        assert_eq!(error.status_code, StatusCode::NOT_FOUND);
        let error = delete_view(Path(id), State(state.views.clone()))
            .await
            .unwrap_err();
        assert_eq!(error.status_code, StatusCode::NOT_FOUND);
    }

    #[test_log::test(tokio::test)]
    async fn unreachable_road_data_rejects_road_snap_clicks() {
        let state = unreachable_state();
        let id = open(&state, "").await.unwrap().content.id;

        let reply = click_at(&state, id, 33.1800, 131.6200).await;
        assert!(!reply.content.outcome.accepted);
        assert_eq!(reply.content.outcome.session_length, 0);
        assert!(reply.content.commands.is_empty());
    }
}
