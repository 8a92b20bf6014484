use std::error;
use std::fmt;
use std::sync::Arc;

pub mod client;
pub mod lookup;
pub mod response;
pub mod query;

pub use client::{OverpassClient, OverpassConfig};
pub use lookup::RoadLookup;
pub use query::Query;

#[derive(Debug, Clone)]
pub enum ApiError {
    RequestError(Arc<reqwest::Error>),
    JsonError(Arc<serde_json::Error>),
    InvalidResponse {
        status_code: reqwest::StatusCode,
        url: String,
        response: Option<String>,
    },
    InvalidQuery(String),
    Other(String),
}

impl error::Error for ApiError {}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ApiError::RequestError(e) => write!(f, "HTTP request error: {}", e),
            ApiError::JsonError(e) => write!(f, "JSON parse error: {}", e),
            ApiError::InvalidResponse {
                status_code,
                url,
                response,
            } => match response {
                Some(text) => {
                    write!(f, "Invalid Response ({}) {}: {}", status_code, text, url)
                }
                None => write!(f, "Invalid Response({}) {}", status_code, url),
            },
            ApiError::InvalidQuery(why) => write!(f, "Invalid query: {}", why),
            ApiError::Other(e) => write!(f, "{e}"),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        ApiError::RequestError(Arc::new(e))
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::JsonError(Arc::new(e))
    }
}

/// A local stand-in for the Overpass interpreter that answers every query
/// with one canned status and body and records the query texts it received.
#[cfg(test)]
pub(crate) mod testing {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use axum::{extract::State, http::StatusCode, routing::post, Form, Router};

    use crate::{OverpassClient, OverpassConfig};

    pub(crate) type Queries = Arc<Mutex<Vec<String>>>;

    pub(crate) async fn canned_server(
        status: StatusCode,
        body: &'static str,
    ) -> (OverpassClient, Queries) {
        let queries = Queries::default();
        let app = Router::new()
            .route(
                "/api/interpreter",
                post(
                    move |State(queries): State<Queries>,
                          Form(form): Form<HashMap<String, String>>| async move {
                        let query = form.get("data").cloned().unwrap_or_default();
                        queries.lock().unwrap().push(query);
                        (status, body)
                    },
                ),
            )
            .with_state(queries.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await });

        let client = OverpassClient::new(OverpassConfig {
            url: format!("http://{addr}/api/interpreter"),
            proxy: None,
            timeout: Some(Duration::from_secs(5)),
        })
        .unwrap();
        (client, queries)
    }
}
