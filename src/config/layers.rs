use minijinja::{context, Environment};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_yaml::{Mapping, Value};
use std::path::{Path, PathBuf};
use tracing::debug;

use super::app::AppConfig;
use super::load::read_optional;
use super::merge::merge_layers;
use crate::descriptor::FunctionSet;
use crate::error::DeployError;

#[allow(clippy::expect_used)]
static RAW_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?m)['"]?<<<(.*?)>>>['"]?"#).expect("raw marker regex"));

/// Built-in descriptor defaults, the lowest-precedence layer
pub fn default_descriptor() -> Value {
    let mut package = Mapping::new();
    package.insert("excludeDevDependencies".into(), Value::Bool(false));

    let mut provider = Mapping::new();
    provider.insert("name".into(), "aws".into());
    provider.insert("runtime".into(), "nodejs6.10".into());

    let mut root = Mapping::new();
    root.insert("service".into(), "my-service".into());
    root.insert("package".into(), Value::Mapping(package));
    root.insert("provider".into(), Value::Mapping(provider));
    Value::Mapping(root)
}

/// Base descriptor file for an application root
pub fn base_descriptor_path(root: &Path) -> PathBuf {
    root.join("config").join("serverless.yml")
}

/// Environment-specific descriptor file for an application root
pub fn env_descriptor_path(root: &Path, environment: &str) -> PathBuf {
    root.join("config")
        .join(format!("serverless-{environment}.yml"))
}

/// Render a descriptor config file as a template and parse it as YAML.
///
/// The template sees `config` (the whole app config document) and
/// `environment`. A missing file is `Null`; an empty file is an empty
/// mapping.
pub fn load_descriptor_file(path: &Path, app: &AppConfig) -> Result<Value, DeployError> {
    let Some(source) = read_optional(path)? else {
        debug!(file = %path.display(), "No descriptor config file");
        return Ok(Value::Null);
    };
    let config_error = |message: String| DeployError::Config {
        file: path.to_path_buf(),
        message,
    };
    let env = Environment::new();
    let rendered = env
        .render_str(
            &source,
            context! { config => &app.raw, environment => &app.environment },
        )
        .map_err(|e| config_error(e.to_string()))?;
    if rendered.trim().is_empty() {
        return Ok(Value::Mapping(Mapping::new()));
    }
    serde_yaml::from_str(&rendered).map_err(|e| config_error(e.to_string()))
}

/// Configuration sources for the deployment descriptor, lowest first
#[derive(Debug, Clone, Default)]
pub struct DescriptorLayers {
    pub base_file: Value,
    pub env_file: Value,
    pub app_override: Value,
    pub job_override: Value,
}

impl DescriptorLayers {
    /// Read both descriptor files and the inline override for `app`.
    pub fn load(root: &Path, app: &AppConfig) -> Result<Self, DeployError> {
        Ok(Self {
            base_file: load_descriptor_file(&base_descriptor_path(root), app)?,
            env_file: load_descriptor_file(&env_descriptor_path(root, &app.environment), app)?,
            app_override: app.serverless.yml.clone(),
            job_override: Value::Null,
        })
    }

    pub fn with_job_override(mut self, job_override: Value) -> Self {
        self.job_override = job_override;
        self
    }

    /// Merge all layers with `functions` on top.
    ///
    /// Generated functions are merged last, so no file can drop or rename
    /// one of them.
    pub fn build(self, functions: &FunctionSet) -> anyhow::Result<Value> {
        let mut generated = Mapping::new();
        generated.insert("functions".into(), serde_yaml::to_value(functions)?);
        Ok(merge_layers([
            default_descriptor(),
            self.base_file,
            self.env_file,
            self.app_override,
            self.job_override,
            Value::Mapping(generated),
        ]))
    }
}

/// Append `-<suffix>` to the descriptor's `service` name.
pub fn append_service_suffix(descriptor: &mut Value, suffix: &str) {
    let Some(map) = descriptor.as_mapping_mut() else {
        return;
    };
    let service = match map.get("service") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    };
    map.insert("service".into(), Value::String(format!("{service}-{suffix}")));
}

/// Serialize the descriptor, emitting `<<<raw>>>` strings unquoted.
pub fn render_descriptor(descriptor: &Value) -> anyhow::Result<String> {
    let yaml = serde_yaml::to_string(descriptor)?;
    Ok(RAW_MARKER.replace_all(&yaml, "$1").into_owned())
}
