//! Landing page and its static assets

use std::path::{Path, PathBuf};

use actix_web::http::header::ContentType;
use actix_web::{HttpResponse, get, web};

use crate::api::error::{ApiError, Asset};

const INDEX_FILE: &str = "index.html";
const STYLESHEET_FILE: &str = "style.css";
const SCRIPT_FILE: &str = "script.js";

/// Directory the page files are read from
#[derive(Debug, Clone)]
pub struct AssetDir(PathBuf);

impl AssetDir {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self(dir.into())
    }

    pub fn path(&self) -> &Path {
        &self.0
    }

    async fn read(&self, name: &str) -> std::io::Result<String> {
        tokio::fs::read_to_string(self.0.join(name)).await
    }
}

#[get("/")]
pub async fn index(assets: web::Data<AssetDir>) -> Result<HttpResponse, ApiError> {
    tracing::info!("GET / - serving {}", INDEX_FILE);

    let page = assets
        .read(INDEX_FILE)
        .await
        .map_err(|e| ApiError::TemplateRender(e.to_string()))?;

    Ok(HttpResponse::Ok().content_type(ContentType::html()).body(page))
}

#[get("/style.css")]
pub async fn stylesheet(assets: web::Data<AssetDir>) -> Result<HttpResponse, ApiError> {
    tracing::info!("GET /style.css");

    let css = assets.read(STYLESHEET_FILE).await.map_err(|e| {
        tracing::debug!(error = %e, "Stylesheet unavailable");
        ApiError::AssetNotFound(Asset::Stylesheet)
    })?;

    Ok(HttpResponse::Ok()
        .content_type("text/css; charset=utf-8")
        .body(css))
}

#[get("/script.js")]
pub async fn script(assets: web::Data<AssetDir>) -> Result<HttpResponse, ApiError> {
    tracing::info!("GET /script.js");

    let js = assets.read(SCRIPT_FILE).await.map_err(|e| {
        tracing::debug!(error = %e, "Script unavailable");
        ApiError::AssetNotFound(Asset::Script)
    })?;

    Ok(HttpResponse::Ok()
        .content_type("text/javascript; charset=utf-8")
        .body(js))
}

/// Configure page routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(index).service(stylesheet).service(script);
}
