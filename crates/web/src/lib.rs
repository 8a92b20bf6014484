pub use crate::common::RouteResult;

use annotation::AcceptanceMode;
use axum::{extract::FromRef, routing::get_service, Router};
use tokio::net::TcpListener;
use tower_http::{
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use tracing_subscriber::EnvFilter;

pub mod api;
pub mod common;
pub mod config;
pub mod hateoas;
pub mod middleware;
pub mod views;

pub use config::WebConfig;
use views::ViewRegistry;

#[derive(Clone, FromRef)]
pub struct WebState {
    pub views: ViewRegistry,
    pub default_mode: AcceptanceMode,
}

/// Sets up `log` output and, with `http_trace`, a `tracing` subscriber for
/// the request spans. `env_logger` owns the `log` facade, so the subscriber
/// is installed without a log bridge.
pub fn init_logging(http_trace: bool) -> Result<(), Box<dyn std::error::Error>> {
    env_logger::try_init()?;
    if http_trace {
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
    }
    Ok(())
}

pub fn router(state: WebState, static_dir: &str) -> Router {
    Router::new()
        .nest_service("/api", api::routes(state))
        .fallback_service(static_content_router(static_dir))
}

pub async fn start_web_server(config: &WebConfig, state: WebState) -> std::io::Result<()> {
    state.views.spawn_expiry(config.view_idle);
    let mut routes = router(state, &config.static_dir);
    if config.http_trace {
        routes = routes.layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        );
    }

    let listener = TcpListener::bind(config.bind).await?;
    log::info!("Serving the map on http://{}/", config.bind);
    axum::serve(listener, routes.into_make_service()).await?;

    Ok(())
}

fn static_content_router(static_dir: &str) -> Router {
    let not_found = format!("{}/error404.html", static_dir.trim_end_matches('/'));
    Router::new().fallback_service(get_service(
        ServeDir::new(static_dir).not_found_service(ServeFile::new(not_found)),
    ))
}
