use annotation::AcceptanceMode;
use axum::{extract::State, routing::get, Json, Router};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub mod v1;

use crate::{
    common::{route_not_found, schema},
    WebState,
};

macro_rules! resource {
    ($($arg:tt)*) => {
        format!("/api{}", format_args!($($arg)*))
    };
}
pub(crate) use resource;

pub fn routes(state: WebState) -> Router {
    Router::new()
        .route("/ping", get(ping))
        .route("/ping/schema", get(schema::<Ping>))
        .nest_service("/v1", v1::routes(state.clone()))
        .with_state(state)
        .fallback(route_not_found)
}

/// Liveness answer, also telling the page which mode a new view starts in.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Ping {
    pub open_views: usize,
    pub default_mode: AcceptanceMode,
    pub views: String,
}

async fn ping(State(state): State<WebState>) -> Json<Ping> {
    Json(Ping {
        open_views: state.views.list().await.len(),
        default_mode: state.default_mode,
        views: v1::views::resource!("/"),
    })
}
