use axum::{routing::get, Router};
use model::{Bounds, Coordinate};

use crate::{
    common::{example, route_not_found},
    middleware::base_url::base_url_middleware,
    WebState,
};

pub(crate) mod views;

macro_rules! resource {
    ($($arg:tt)*) => {
        crate::api::resource!("/v1{}", format_args!($($arg)*))
    };
}
pub(crate) use resource;

pub(crate) fn routes(state: WebState) -> Router {
    Router::new()
        .route("/coordinate/example", get(example::<Coordinate>))
        .route("/bounds/example", get(example::<Bounds>))
        .nest_service("/views", views::routes(state.clone()))
        .layer(axum::middleware::from_fn(base_url_middleware))
        .with_state(state)
        .fallback(route_not_found)
}
