//! Application state and startup helpers
//!
//! Loads the classifier artifact, builds the shared services and picks the
//! listening port from the configured candidates.

use std::io;
use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::model::Config;
use crate::service::scoring::policy_for;
use crate::service::{Classifier, InferenceService, LinearTextClassifier};

/// Shared state handed to the request handlers
pub struct AppState {
    /// Inference service, degraded when the artifact did not load
    pub inference: Arc<InferenceService>,
    /// Directory the landing page and its assets are served from
    pub assets_dir: PathBuf,
}

impl AppState {
    /// Build the application state
    ///
    /// A model that fails to load is logged and leaves the service degraded;
    /// it never aborts startup.
    pub fn new(config: &Config) -> Self {
        let classifier = load_classifier(&config.model_path);

        let inference = match classifier {
            Some(classifier) => InferenceService::new(Some(classifier), policy_for(config.scoring)),
            None => InferenceService::degraded(),
        };

        Self {
            inference: Arc::new(inference),
            assets_dir: config.assets_dir.clone(),
        }
    }
}

fn load_classifier(path: &Path) -> Option<Arc<dyn Classifier>> {
    match LinearTextClassifier::from_path(path) {
        Ok(model) => {
            tracing::info!(
                path = %path.display(),
                classes = ?model.classes(),
                vocabulary = model.vocabulary_size(),
                "Model loaded successfully"
            );
            Some(Arc::new(model))
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Error loading model, inference disabled");
            None
        }
    }
}

/// Log the files available in the asset directory
pub fn log_assets_dir(dir: &Path) {
    match std::fs::read_dir(dir) {
        Ok(entries) => {
            let files: Vec<String> = entries
                .filter_map(Result::ok)
                .map(|entry| entry.file_name().to_string_lossy().into_owned())
                .collect();
            tracing::info!(dir = %dir.display(), files = ?files, "Asset directory found");
        }
        Err(e) => {
            tracing::warn!(dir = %dir.display(), error = %e, "Asset directory not found");
        }
    }
}

/// Startup errors
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum StartupError {
    /// Binding failed for a reason other than the port being taken
    #[error("Failed to bind port {port}: {source}")]
    Bind {
        port: u16,
        #[source]
        source: io::Error,
    },

    /// Every candidate port was already in use
    #[error("No available port among {0:?}")]
    NoPortAvailable(Vec<u16>),
}

impl From<StartupError> for io::Error {
    fn from(err: StartupError) -> Self {
        match err {
            StartupError::Bind { source, .. } => source,
            other => io::Error::new(io::ErrorKind::AddrInUse, other.to_string()),
        }
    }
}

/// Try each candidate port in order and return the first successful bind
///
/// Only `AddrInUse` moves on to the next port; any other error aborts.
pub fn bind_first_available<T>(
    ports: &[u16],
    mut bind: impl FnMut(u16) -> io::Result<T>,
) -> Result<(u16, T), StartupError> {
    for &port in ports {
        tracing::info!(port, "Trying port");
        match bind(port) {
            Ok(bound) => return Ok((port, bound)),
            Err(e) if e.kind() == io::ErrorKind::AddrInUse => {
                tracing::warn!(port, "Port busy, trying next");
            }
            Err(source) => return Err(StartupError::Bind { port, source }),
        }
    }

    Err(StartupError::NoPortAvailable(ports.to_vec()))
}

/// Bind a TCP listener on `host` using the first free candidate port
pub fn bind_listener(host: &str, ports: &[u16]) -> Result<(u16, TcpListener), StartupError> {
    bind_first_available(ports, |port| TcpListener::bind((host, port)))
}
