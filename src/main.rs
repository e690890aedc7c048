use actix_web::middleware::Logger;
use actix_web::{App, HttpServer, web};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod app;
mod model;
mod service;

use api::pages::AssetDir;
use app::AppState;
use model::Config;
use service::InferenceService;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present (ignore if missing)
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        cwd = ?std::env::current_dir().ok(),
        "Starting hate speech detector"
    );

    let config = Config::from_env();
    tracing::info!(config = ?config, "Configuration resolved");

    let state = AppState::new(&config);

    let inference: web::Data<InferenceService> = web::Data::from(state.inference.clone());
    let assets = web::Data::new(AssetDir::new(state.assets_dir.clone()));
    app::log_assets_dir(assets.path());

    let (port, listener) = app::bind_listener(&config.host, &config.ports)?;
    let addr = listener.local_addr()?;

    tracing::info!(port, "Serving on http://{} (health: http://{}/api/health)", addr, addr);

    HttpServer::new(move || {
        App::new()
            .wrap(api::cors_headers())
            .wrap(Logger::default())
            .app_data(inference.clone())
            .app_data(assets.clone())
            .configure(api::pages::configure)
            .configure(api::health::configure)
            .configure(api::analyze::configure)
            .configure(api::openapi::configure)
    })
    .listen(listener)?
    .run()
    .await
}
