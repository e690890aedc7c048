//! Health endpoint reporting whether the model is available

use actix_web::{HttpResponse, Responder, get, web};
use serde::Serialize;
use utoipa::ToSchema;

use crate::service::InferenceService;

/// Routes advertised by the health endpoint
pub const ENDPOINTS: [&str; 5] = ["/", "/style.css", "/script.js", "/api/health", "/api/analyze"];

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthStatus {
    /// `healthy`, or `model not loaded` in the degraded state
    pub status: String,
    pub model_loaded: bool,
    pub endpoints: Vec<String>,
}

impl HealthStatus {
    pub fn of(service: &InferenceService) -> Self {
        let model_loaded = service.is_model_loaded();

        Self {
            status: if model_loaded { "healthy" } else { "model not loaded" }.to_string(),
            model_loaded,
            endpoints: ENDPOINTS.iter().map(|e| e.to_string()).collect(),
        }
    }
}

/// Report service health
///
/// Always answers 200; a missing model shows up in the body only.
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service status", body = HealthStatus)
    ),
    tag = "health"
)]
#[get("/api/health")]
pub async fn health(service: web::Data<InferenceService>) -> impl Responder {
    tracing::info!("GET /api/health");
    HttpResponse::Ok().json(HealthStatus::of(&service))
}

/// Configure health check routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(health);
}
