//! Configuration module

use std::env;
use std::path::PathBuf;

use crate::inference::ModelSource;
use crate::training::DEFAULT_MODEL_PATH;

/// Model artifact locations tried at startup, in order
pub const DEFAULT_MODEL_PATHS: &str = "models/iris_model.json,/app/models/iris_model.json,iris_model.json";

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Bind address
    pub host: String,

    /// Server port
    pub port: u16,

    /// Candidate model artifacts
    pub model_paths: Vec<PathBuf>,

    /// Where a freshly trained model is written
    pub model_output_path: PathBuf,

    /// Front-end assets served at `/` and `/static`
    pub static_dir: PathBuf,

    /// Environment (development, production)
    pub environment: String,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; missing or unparsable values fall back to defaults
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),

            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(8000),

            model_paths: parse_path_list(
                &lookup("MODEL_PATHS").unwrap_or_else(|| DEFAULT_MODEL_PATHS.to_string()),
            ),

            model_output_path: lookup("MODEL_OUTPUT_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_MODEL_PATH)),

            static_dir: lookup("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("static")),

            environment: lookup("ENVIRONMENT")
                .unwrap_or_else(|| "development".to_string()),
        }
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn model_source(&self) -> ModelSource {
        ModelSource {
            candidates: self.model_paths.clone(),
            output_path: self.model_output_path.clone(),
        }
    }
}

/// Split a comma-separated path list, dropping blanks
pub fn parse_path_list(raw: &str) -> Vec<PathBuf> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8000);
        assert_eq!(config.model_paths.len(), 3);
        assert_eq!(config.model_paths[0], PathBuf::from("models/iris_model.json"));
        assert_eq!(config.model_output_path, PathBuf::from("models/iris_model.json"));
        assert_eq!(config.static_dir, PathBuf::from("static"));
        assert!(!config.is_production());
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("PORT", "9001"),
            ("MODEL_PATHS", " a.json , ,b.json"),
            ("MODEL_OUTPUT_PATH", "/tmp/out.json"),
            ("ENVIRONMENT", "production"),
        ]
        .into_iter()
        .collect();

        let config = Config::from_lookup(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(config.port, 9001);
        assert_eq!(config.model_paths, vec![PathBuf::from("a.json"), PathBuf::from("b.json")]);
        assert!(config.is_production());

        let source = config.model_source();
        assert_eq!(source.candidates, config.model_paths);
        assert_eq!(source.output_path, PathBuf::from("/tmp/out.json"));
    }

    #[test]
    fn test_bad_port_falls_back() {
        let config = Config::from_lookup(|k| (k == "PORT").then(|| "not-a-port".to_string()));
        assert_eq!(config.port, 8000);
    }
}
