use serde_json::Value;
use std::io;
use std::path::Path;
use tracing::{debug, warn};

use super::app::AppConfig;
use crate::error::DeployError;

/// Supported configuration document formats, chosen by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Json,
    Toml,
}

impl ConfigFormat {
    /// Anything that is not `.json` or `.toml` is read as YAML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => ConfigFormat::Json,
            Some("toml") => ConfigFormat::Toml,
            _ => ConfigFormat::Yaml,
        }
    }

    /// Parse `content` into a generic document.
    pub fn parse(&self, content: &str) -> Result<Value, String> {
        match self {
            ConfigFormat::Yaml => {
                if content.trim().is_empty() {
                    return Ok(Value::Object(Default::default()));
                }
                serde_yaml::from_str(content).map_err(|e| e.to_string())
            }
            ConfigFormat::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
            ConfigFormat::Toml => toml::from_str(content).map_err(|e| e.to_string()),
        }
    }
}

/// Read a file, mapping "not found" to `None`.
///
/// Any other I/O failure is a configuration error naming the file.
pub fn read_optional(path: &Path) -> Result<Option<String>, DeployError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(DeployError::Config {
            file: path.to_path_buf(),
            message: e.to_string(),
        }),
    }
}

/// Load the application configuration.
///
/// A missing file yields the default (empty) configuration.
pub fn load_app_config(path: &Path) -> Result<AppConfig, DeployError> {
    let Some(content) = read_optional(path)? else {
        warn!(file = %path.display(), "App config not found, using defaults");
        return Ok(AppConfig::default());
    };
    let config_error = |message: String| DeployError::Config {
        file: path.to_path_buf(),
        message,
    };
    let value = ConfigFormat::from_path(path)
        .parse(&content)
        .map_err(config_error)?;
    let value = match value {
        Value::Null => Value::Object(Default::default()),
        other => other,
    };
    let config = AppConfig::from_value(value).map_err(|e| config_error(e.to_string()))?;
    debug!(
        file = %path.display(),
        routes = config.routes.len(),
        environment = %config.environment,
        "Loaded app config"
    );
    Ok(config)
}

/// Load a job's optional `config.{yaml,yml,json}`.
pub fn load_job_config(job_dir: &Path) -> Result<Option<Value>, DeployError> {
    for name in ["config.yaml", "config.yml", "config.json"] {
        let path = job_dir.join(name);
        if let Some(content) = read_optional(&path)? {
            let value = ConfigFormat::from_path(&path)
                .parse(&content)
                .map_err(|message| DeployError::Config {
                    file: path.clone(),
                    message,
                })?;
            return Ok(Some(value));
        }
    }
    Ok(None)
}
