//! OpenAPI specification endpoint

use actix_web::{HttpResponse, Responder, get};
use utoipa::OpenApi;

use crate::api::error::ErrorResponse;
use crate::api::health::HealthStatus;
use crate::model::{AnalysisRequest, AnalysisResult, ClassProbabilities};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Hate Speech Detector API",
        description = "Classifies text as hate speech, offensive language or neither. \
            Confidence and per-class scores are placeholders unless model scoring is enabled."
    ),
    paths(crate::api::analyze::analyze, crate::api::health::health),
    components(schemas(
        AnalysisRequest,
        AnalysisResult,
        ClassProbabilities,
        ErrorResponse,
        HealthStatus
    )),
    tags(
        (name = "analysis", description = "Text classification"),
        (name = "health", description = "Service status")
    )
)]
pub struct ApiDoc;

/// Serve OpenAPI JSON specification
#[get("/openapi.json")]
pub async fn openapi_json() -> impl Responder {
    HttpResponse::Ok().json(ApiDoc::openapi())
}

/// Configure OpenAPI routes
pub fn configure(cfg: &mut actix_web::web::ServiceConfig) {
    cfg.service(openapi_json);
}
