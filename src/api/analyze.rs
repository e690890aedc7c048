//! Text analysis endpoint

use actix_web::http::header::{ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS};
use actix_web::{HttpResponse, Responder, options, post, web};

use crate::api::error::{ApiError, ErrorResponse};
use crate::model::{AnalysisRequest, AnalysisResult};
use crate::service::InferenceService;

/// Classify a piece of text
///
/// The model check runs before the body is parsed, so a degraded service
/// answers 503 whatever the request contains.
#[utoipa::path(
    post,
    path = "/api/analyze",
    request_body = AnalysisRequest,
    responses(
        (status = 200, description = "Text classified", body = AnalysisResult),
        (status = 400, description = "Text shorter than 10 characters", body = ErrorResponse),
        (status = 500, description = "Inference failed", body = ErrorResponse),
        (status = 503, description = "Model not loaded", body = ErrorResponse)
    ),
    tag = "analysis"
)]
#[post("/api/analyze")]
pub async fn analyze(
    service: web::Data<InferenceService>,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    tracing::info!("POST /api/analyze");

    service.ensure_ready()?;

    let request = AnalysisRequest::from_json(&body)?;
    let result = service.analyze(request.text())?;

    tracing::info!(class = result.class, "Analysis complete");

    Ok(HttpResponse::Ok().json(result))
}

/// CORS preflight for the analysis endpoint
#[options("/api/analyze")]
pub async fn analyze_options() -> impl Responder {
    tracing::info!("OPTIONS /api/analyze");

    HttpResponse::Ok()
        .insert_header((ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type"))
        .insert_header((ACCESS_CONTROL_ALLOW_METHODS, "GET, POST, OPTIONS"))
        .json(serde_json::json!({}))
}

/// Configure analysis routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(analyze).service(analyze_options);
}
