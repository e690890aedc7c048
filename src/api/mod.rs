//! HTTP surface

pub mod analyze;
pub mod error;
pub mod health;
pub mod openapi;
pub mod pages;

use actix_web::http::header::ACCESS_CONTROL_ALLOW_ORIGIN;
use actix_web::middleware::DefaultHeaders;

/// Permits cross-origin access from any origin on every response
pub fn cors_headers() -> DefaultHeaders {
    DefaultHeaders::new().add((ACCESS_CONTROL_ALLOW_ORIGIN, "*"))
}
