use annotation::{FeedbackError, ServiceError};
use axum::{
    extract::OriginalUri,
    http::{Method, StatusCode},
    response::IntoResponse,
    Json,
};
use model::ExampleData;
use schemars::{schema_for, schema_for_value, JsonSchema};
use serde::{Deserialize, Serialize};

use crate::hateoas;

pub type RouteResult<O> = Result<O, ErrorReply>;
pub type HateoasResult<O> = RouteResult<Json<hateoas::Response<O>>>;

pub(crate) async fn schema<T: JsonSchema + Serialize>() -> impl IntoResponse {
    Json(schema_for!(T))
}

pub(crate) async fn example<T: ExampleData + Serialize>() -> impl IntoResponse {
    Json(schema_for_value!(T::example_data()))
}

pub(crate) async fn route_not_found(method: Method, OriginalUri(uri): OriginalUri) -> ErrorReply {
    ErrorReply::no_route(&method, uri.path())
}

/// The request an error answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestLine {
    pub method: String,
    pub path: String,
}

/// Body of every non-2xx API answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorReply {
    #[serde(skip)]
    pub status_code: StatusCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request: Option<RequestLine>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cause: Option<String>,
}

impl ErrorReply {
    pub fn new(status_code: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status_code,
            message: message.into(),
            request: None,
            cause: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn no_route(method: &Method, path: &str) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            "No such resource. Views live under /api/v1/views.",
        )
        .at(method, path)
    }

    pub fn unknown_view(id: u64) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            format!("There is no view {id}. It was closed or never opened."),
        )
    }

    pub fn at(mut self, method: &Method, path: &str) -> Self {
        self.request = Some(RequestLine {
            method: method.to_string(),
            path: path.to_owned(),
        });
        self
    }

    pub fn because(mut self, cause: impl ToString) -> Self {
        self.cause = Some(cause.to_string());
        self
    }

    pub fn path(&self) -> Option<&str> {
        self.request.as_ref().map(|request| request.path.as_str())
    }
}

impl From<ServiceError> for ErrorReply {
    fn from(value: ServiceError) -> Self {
        Self::new(StatusCode::GONE, "The view is no longer running.").because(value)
    }
}

impl From<FeedbackError> for ErrorReply {
    fn from(value: FeedbackError) -> Self {
        let status_code = match value {
            FeedbackError::InvalidRating(_) => StatusCode::BAD_REQUEST,
            FeedbackError::NotVisible => StatusCode::CONFLICT,
        };
        Self::new(status_code, value.to_string())
    }
}

impl IntoResponse for ErrorReply {
    fn into_response(self) -> axum::response::Response {
        (self.status_code, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test(tokio::test)]
    async fn unmatched_routes_name_the_request() {
        let uri = OriginalUri("/api/v2/views?x=1".parse().unwrap());
        let reply = route_not_found(Method::PATCH, uri).await;
        assert_eq!(reply.status_code, StatusCode::NOT_FOUND);
        assert_eq!(reply.path(), Some("/api/v2/views"));

        let body = serde_json::to_value(&reply).unwrap();
        assert_eq!(body["request"]["method"], "PATCH");
        assert!(body["message"].as_str().unwrap().contains("/api/v1/views"));
        assert!(body.get("cause").is_none());
        assert!(body.get("statusCode").is_none());
    }

    #[test]
    fn feedback_errors_map_to_statuses() {
        let reply = ErrorReply::from(FeedbackError::NotVisible);
        assert_eq!(reply.status_code, StatusCode::CONFLICT);
        assert!(!reply.message.is_empty());
    }
}
