//! Unified API error handling
//!
//! Error bodies carry the underlying error text verbatim.

use actix_web::http::StatusCode;
use actix_web::http::header::ContentType;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use utoipa::ToSchema;

use crate::model::RequestError;
use crate::service::InferenceError;

const FAILURE_MARKER: &str = "API error";

/// JSON error body
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test: Option<String>,
}

/// Static asset served by the landing page routes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Asset {
    Stylesheet,
    Script,
}

impl std::fmt::Display for Asset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Asset::Stylesheet => f.write_str("CSS not found"),
            Asset::Script => f.write_str("JS not found"),
        }
    }
}

/// Unified API error type
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ApiError {
    /// Classifier artifact did not load (503)
    #[error("Model not loaded")]
    ModelUnavailable,

    /// Text shorter than the minimum length (400)
    #[error("Text too short")]
    InputTooShort,

    /// Prediction or request handling failed (500)
    #[error("{0}")]
    InferenceFailure(String),

    /// Static asset missing (404, plain text)
    #[error("{0}")]
    AssetNotFound(Asset),

    /// Landing page could not be rendered (500, plain text)
    #[error("Error: {0}")]
    TemplateRender(String),
}

impl ApiError {
    fn error_type(&self) -> &'static str {
        match self {
            ApiError::ModelUnavailable => "model_unavailable",
            ApiError::InputTooShort => "input_too_short",
            ApiError::InferenceFailure(_) => "inference_failure",
            ApiError::AssetNotFound(_) => "asset_not_found",
            ApiError::TemplateRender(_) => "template_render_error",
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::ModelUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::InputTooShort => StatusCode::BAD_REQUEST,
            ApiError::AssetNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InferenceFailure(_) | ApiError::TemplateRender(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(
                error_type = self.error_type(),
                status = status.as_u16(),
                message = %self,
                "API error"
            );
        } else {
            tracing::warn!(
                error_type = self.error_type(),
                status = status.as_u16(),
                message = %self,
                "API error"
            );
        }

        match self {
            ApiError::AssetNotFound(_) | ApiError::TemplateRender(_) => HttpResponse::build(status)
                .content_type(ContentType::plaintext())
                .body(self.to_string()),
            ApiError::InferenceFailure(_) => HttpResponse::build(status).json(ErrorResponse {
                error: self.to_string(),
                test: Some(FAILURE_MARKER.to_string()),
            }),
            ApiError::ModelUnavailable | ApiError::InputTooShort => {
                HttpResponse::build(status).json(ErrorResponse {
                    error: self.to_string(),
                    test: None,
                })
            }
        }
    }
}

impl From<InferenceError> for ApiError {
    fn from(err: InferenceError) -> Self {
        match err {
            InferenceError::ModelUnavailable => ApiError::ModelUnavailable,
            InferenceError::InputTooShort => ApiError::InputTooShort,
            InferenceError::InferenceFailure(msg) => ApiError::InferenceFailure(msg),
        }
    }
}

impl From<RequestError> for ApiError {
    fn from(err: RequestError) -> Self {
        ApiError::InferenceFailure(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    async fn body_of(err: ApiError) -> (StatusCode, String) {
        let response = err.error_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body()).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[actix_web::test]
    async fn test_json_error_bodies() {
        let (status, body) = body_of(ApiError::ModelUnavailable).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body, r#"{"error":"Model not loaded"}"#);

        let (status, body) = body_of(ApiError::InputTooShort).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, r#"{"error":"Text too short"}"#);

        let (status, body) = body_of(ApiError::InferenceFailure("boom".to_string())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, r#"{"error":"boom","test":"API error"}"#);
    }

    #[actix_web::test]
    async fn test_plain_text_error_bodies() {
        let (status, body) = body_of(ApiError::AssetNotFound(Asset::Stylesheet)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, "CSS not found");

        let (_, body) = body_of(ApiError::AssetNotFound(Asset::Script)).await;
        assert_eq!(body, "JS not found");

        let (status, body) = body_of(ApiError::TemplateRender("missing index".to_string())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, "Error: missing index");
    }
}
