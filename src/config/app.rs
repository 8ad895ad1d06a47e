use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::descriptor::Origin;

/// Paths copied into every deployment tree unless overridden
pub const DEFAULT_INCLUDE: [&str; 4] = [
    "api/helpers",
    "api/models",
    "config/models.js",
    "config/datastores.js",
];

/// Paths transpiled in every deployment tree unless overridden
pub const DEFAULT_TRANSPILE: [&str; 2] = ["api/helpers", "api/models"];

pub const PRODUCTION: &str = "production";

fn default_environment() -> String {
    "development".to_string()
}

fn default_true() -> bool {
    true
}

/// An empty key (`routes:`) reads as an empty mapping
fn null_as_empty<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Map<String, Value>>::deserialize(deserializer)?.unwrap_or_default())
}

fn default_origins() -> Origin {
    Origin::default()
}

fn default_request_headers() -> String {
    "content-type".to_string()
}

/// Application configuration read from `config/app.yaml`
///
/// Immutable once loaded; every pipeline stage receives it explicitly.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    /// Selects `config/serverless-<environment>.yml`
    #[serde(default = "default_environment")]
    pub environment: String,
    /// Route table: address → target, in declaration order
    #[serde(default, deserialize_with = "null_as_empty")]
    pub routes: Map<String, Value>,
    #[serde(default)]
    pub security: SecurityConfig,
    #[serde(default)]
    pub serverless: ServerlessConfig,
    /// Forwarded verbatim to the ORM bootstrap file
    #[serde(default, deserialize_with = "null_as_empty")]
    pub models: Map<String, Value>,
    /// Forwarded verbatim to the ORM bootstrap file
    #[serde(default, deserialize_with = "null_as_empty")]
    pub datastores: Map<String, Value>,
    /// The whole source document, exposed to config-file templates
    #[serde(skip)]
    pub raw: Value,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            environment: default_environment(),
            routes: Map::new(),
            security: SecurityConfig::default(),
            serverless: ServerlessConfig::default(),
            models: Map::new(),
            datastores: Map::new(),
            raw: Value::Object(Map::new()),
        }
    }
}

impl AppConfig {
    /// Build from an already parsed document, keeping it for templating.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        let mut config: AppConfig = serde_json::from_value(value.clone())?;
        config.raw = value;
        Ok(config)
    }

    pub fn is_production(&self) -> bool {
        self.environment == PRODUCTION
    }

    /// Same configuration under another environment name
    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        let environment = environment.into();
        if let Value::Object(map) = &mut self.raw {
            map.insert("environment".to_string(), Value::String(environment.clone()));
        }
        self.environment = environment;
        self
    }

    /// Models settings as shipped to the ORM bootstrap
    ///
    /// Deployed functions never run migrations and always use the default
    /// datastore.
    pub fn deployed_models(&self) -> Map<String, Value> {
        let mut models = self.models.clone();
        models.insert("migrate".to_string(), Value::String("safe".to_string()));
        models.insert("datastore".to_string(), Value::String("default".to_string()));
        models
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SecurityConfig {
    #[serde(default)]
    pub cors: GlobalCors,
}

/// Application-wide CORS settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalCors {
    /// Apply CORS to every route that does not opt out
    #[serde(default)]
    pub all_routes: bool,
    #[serde(default = "default_origins")]
    pub allow_origins: Origin,
    /// Comma-separated header names
    #[serde(default = "default_request_headers")]
    pub allow_request_headers: String,
    #[serde(default)]
    pub allow_credentials: bool,
}

impl Default for GlobalCors {
    fn default() -> Self {
        Self {
            all_routes: false,
            allow_origins: default_origins(),
            allow_request_headers: default_request_headers(),
            allow_credentials: false,
        }
    }
}

/// External command and its leading arguments
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CommandConfig {
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl CommandConfig {
    pub fn new(command: &str, args: &[&str]) -> Self {
        Self {
            command: command.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }
}

/// Deployment settings under the `serverless` key
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerlessConfig {
    /// Replaces [`DEFAULT_INCLUDE`] when set
    pub include: Option<Vec<String>>,
    /// Replaces [`DEFAULT_TRANSPILE`] when set
    pub transpile: Option<Vec<String>>,
    #[serde(default = "default_true")]
    pub orm: bool,
    #[serde(default)]
    pub require_prod: bool,
    pub default_authorizer: Option<String>,
    /// Framework packages to keep in the deployed manifest
    #[serde(default)]
    pub keep_framework_deps: Vec<String>,
    /// Inline descriptor override, layered above the config files
    #[serde(default)]
    pub yml: serde_yaml::Value,
    /// Source transform applied to transpiled files (stdin → stdout)
    pub transpiler: Option<CommandConfig>,
    pub install_command: Option<CommandConfig>,
    pub deploy_command: Option<CommandConfig>,
}

impl Default for ServerlessConfig {
    fn default() -> Self {
        Self {
            include: None,
            transpile: None,
            orm: true,
            require_prod: false,
            default_authorizer: None,
            keep_framework_deps: Vec::new(),
            yml: serde_yaml::Value::Null,
            transpiler: None,
            install_command: None,
            deploy_command: None,
        }
    }
}

impl ServerlessConfig {
    pub fn include_paths(&self) -> Vec<String> {
        self.include
            .clone()
            .unwrap_or_else(|| DEFAULT_INCLUDE.iter().map(|s| s.to_string()).collect())
    }

    pub fn transpile_paths(&self) -> Vec<String> {
        self.transpile
            .clone()
            .unwrap_or_else(|| DEFAULT_TRANSPILE.iter().map(|s| s.to_string()).collect())
    }

    pub fn transpiler_command(&self) -> CommandConfig {
        self.transpiler
            .clone()
            .unwrap_or_else(|| CommandConfig::new("npx", &["babel", "--presets", "env"]))
    }

    pub fn install(&self) -> CommandConfig {
        self.install_command
            .clone()
            .unwrap_or_else(|| CommandConfig::new("npm", &["install"]))
    }

    pub fn deploy(&self) -> CommandConfig {
        self.deploy_command
            .clone()
            .unwrap_or_else(|| CommandConfig::new("serverless", &["deploy"]))
    }
}
