use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

const ENV_CONFIG_PATH: &str = "HSD_CONFIG_PATH";
const DEFAULT_CONFIG_PATH: &str = "config.yaml";

const ENV_HOST: &str = "HOST";
const ENV_PORTS: &str = "PORTS";
const ENV_MODEL_PATH: &str = "HSD_MODEL_PATH";
const ENV_SCORING: &str = "HSD_SCORING";
const ENV_ASSETS_DIR: &str = "HSD_ASSETS_DIR";

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORTS: [u16; 4] = [5000, 5001, 5002, 5003];
pub const DEFAULT_MODEL_PATH: &str = "hate_speech_model.json";
pub const DEFAULT_ASSETS_DIR: &str = "templates";

/// How `confidence` and `probabilities` are filled in for a prediction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoringMode {
    /// Fixed 85.5 confidence, 0.8 for the predicted class and 0.1 elsewhere
    #[default]
    Placeholder,
    /// Per-class probabilities reported by the classifier
    Model,
}

impl std::str::FromStr for ScoringMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "placeholder" => Ok(Self::Placeholder),
            "model" => Ok(Self::Model),
            other => Err(format!("unknown scoring mode: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerSection {
    pub host: Option<String>,
    pub ports: Option<Vec<u16>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelSection {
    pub path: Option<PathBuf>,
    pub scoring: Option<ScoringMode>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssetsSection {
    pub dir: Option<PathBuf>,
}

/// YAML configuration file structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub model: ModelSection,
    #[serde(default)]
    pub assets: AssetsSection,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    /// Candidate ports, tried in order at startup
    pub ports: Vec<u16>,
    pub model_path: PathBuf,
    pub scoring: ScoringMode,
    /// Directory holding `index.html`, `style.css` and `script.js`
    pub assets_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            ports: DEFAULT_PORTS.to_vec(),
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            scoring: ScoringMode::default(),
            assets_dir: PathBuf::from(DEFAULT_ASSETS_DIR),
        }
    }
}

impl Config {
    /// Load configuration from the config file, then apply environment overrides
    pub fn from_env() -> Self {
        let config_path = std::env::var(ENV_CONFIG_PATH)
            .unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

        let file = Self::load_config_file(&config_path).unwrap_or_default();

        Self::resolve(file, |key| std::env::var(key).ok())
    }

    /// Merge file values and overrides on top of the defaults
    ///
    /// `lookup` resolves an environment variable name to its value.
    pub fn resolve(file: ConfigFile, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let host = lookup(ENV_HOST)
            .filter(|h| !h.trim().is_empty())
            .or(file.server.host)
            .unwrap_or(defaults.host);

        let ports = match lookup(ENV_PORTS) {
            Some(raw) => match parse_ports(&raw) {
                Ok(ports) => Some(ports),
                Err(e) => {
                    tracing::warn!(value = %raw, error = %e, "Ignoring invalid PORTS");
                    None
                }
            },
            None => None,
        }
        .or(file.server.ports)
        .filter(|ports| !ports.is_empty())
        .unwrap_or(defaults.ports);

        let model_path = lookup(ENV_MODEL_PATH)
            .map(PathBuf::from)
            .or(file.model.path)
            .unwrap_or(defaults.model_path);

        let scoring = match lookup(ENV_SCORING) {
            Some(raw) => match raw.parse::<ScoringMode>() {
                Ok(mode) => Some(mode),
                Err(e) => {
                    tracing::warn!(error = %e, "Ignoring invalid HSD_SCORING");
                    None
                }
            },
            None => None,
        }
        .or(file.model.scoring)
        .unwrap_or(defaults.scoring);

        let assets_dir = lookup(ENV_ASSETS_DIR)
            .map(PathBuf::from)
            .or(file.assets.dir)
            .unwrap_or(defaults.assets_dir);

        Self {
            host,
            ports,
            model_path,
            scoring,
            assets_dir,
        }
    }

    /// Load configuration from YAML file
    fn load_config_file(path: &str) -> Option<ConfigFile> {
        let path = Path::new(path);

        if !path.exists() {
            tracing::debug!(path = %path.display(), "Config file not found, using defaults");
            return None;
        }

        match fs::read_to_string(path) {
            Ok(contents) => match parse_config_file(&contents) {
                Ok(config) => {
                    tracing::info!(path = %path.display(), "Loaded configuration from file");
                    Some(config)
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Failed to parse config file, using defaults");
                    None
                }
            },
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to read config file, using defaults");
                None
            }
        }
    }
}

/// Parse YAML config contents; an empty document yields the defaults
pub fn parse_config_file(contents: &str) -> Result<ConfigFile, serde_yaml::Error> {
    let contents = contents.trim();
    if contents.is_empty() {
        return Ok(ConfigFile::default());
    }
    serde_yaml::from_str(contents)
}

/// Parse a comma separated port list such as `5000, 5001`
pub fn parse_ports(raw: &str) -> Result<Vec<u16>, std::num::ParseIntError> {
    raw.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::parse)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_file_or_env() {
        let config = Config::resolve(ConfigFile::default(), env(&[]));
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.ports, vec![5000, 5001, 5002, 5003]);
        assert_eq!(config.model_path, PathBuf::from("hate_speech_model.json"));
        assert_eq!(config.scoring, ScoringMode::Placeholder);
        assert_eq!(config.assets_dir, PathBuf::from("templates"));
    }

    #[test]
    fn test_file_values_applied() {
        let file = parse_config_file(
            r#"
server:
  host: 0.0.0.0
  ports: [8080, 8081]
model:
  path: /models/hs.json
  scoring: model
assets:
  dir: web
"#,
        )
        .unwrap();

        let config = Config::resolve(file, env(&[]));
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.ports, vec![8080, 8081]);
        assert_eq!(config.model_path, PathBuf::from("/models/hs.json"));
        assert_eq!(config.scoring, ScoringMode::Model);
        assert_eq!(config.assets_dir, PathBuf::from("web"));
    }

    #[test]
    fn test_env_overrides_file() {
        let file = parse_config_file("server:\n  ports: [8080]\nmodel:\n  scoring: model\n").unwrap();
        let config = Config::resolve(
            file,
            env(&[
                ("PORTS", "6000,6001"),
                ("HSD_SCORING", "placeholder"),
                ("HSD_MODEL_PATH", "other.json"),
            ]),
        );
        assert_eq!(config.ports, vec![6000, 6001]);
        assert_eq!(config.scoring, ScoringMode::Placeholder);
        assert_eq!(config.model_path, PathBuf::from("other.json"));
    }

    #[test]
    fn test_invalid_env_values_ignored() {
        let file = parse_config_file("server:\n  ports: [8080]\n").unwrap();
        let config = Config::resolve(file, env(&[("PORTS", "abc"), ("HSD_SCORING", "softmax")]));
        assert_eq!(config.ports, vec![8080]);
        assert_eq!(config.scoring, ScoringMode::Placeholder);
    }

    #[test]
    fn test_empty_port_list_falls_back_to_defaults() {
        let file = parse_config_file("server:\n  ports: []\n").unwrap();
        let config = Config::resolve(file, env(&[]));
        assert_eq!(config.ports, DEFAULT_PORTS.to_vec());
    }

    #[test]
    fn test_empty_file_is_default() {
        let file = parse_config_file("   \n").unwrap();
        assert!(file.server.host.is_none());
        assert!(file.model.path.is_none());
    }

    #[test]
    fn test_parse_ports() {
        assert_eq!(parse_ports("5000, 5001,5002").unwrap(), vec![5000, 5001, 5002]);
        assert_eq!(parse_ports("5000,").unwrap(), vec![5000]);
        assert!(parse_ports("5000,70000").is_err());
    }
}
