use serde_json::Value;

/// Per-route CORS override
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CorsSetting {
    /// No `cors` key; the global `allRoutes` flag decides
    #[default]
    Inherit,
    /// `cors: false`
    Disabled,
    /// `cors: true`
    Enabled,
    /// `cors: { ... }`, each field falling back to the global setting
    Custom(CorsOverride),
}

/// Fields of an object-valued `cors` override
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CorsOverride {
    pub allow_origins: Option<Value>,
    pub allow_request_headers: Option<String>,
    pub allow_credentials: Option<bool>,
}

/// Per-route authorizer override
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuthorizerSetting {
    /// Use the configured default authorizer, if any
    #[default]
    Default,
    /// `authorizer: false`
    Disabled,
    /// `authorizer: "<name>"`
    Named(String),
}

/// A route table value resolved to something deployable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTarget {
    /// Action identifier, e.g. `user/find`
    pub action: String,
    pub cors: CorsSetting,
    pub authorizer: AuthorizerSetting,
}

impl RouteTarget {
    /// Interpret a route table value.
    ///
    /// Returns `None` for values that do not name an action (views,
    /// redirects, nested policies and the like); such routes are skipped.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(action) => Some(Self {
                action: action.clone(),
                cors: CorsSetting::Inherit,
                authorizer: AuthorizerSetting::Default,
            }),
            Value::Object(map) => {
                let action = map.get("action")?.as_str()?.to_string();
                Some(Self {
                    action,
                    cors: cors_setting(map.get("cors")),
                    authorizer: authorizer_setting(map.get("authorizer")),
                })
            }
            _ => None,
        }
    }
}

fn cors_setting(value: Option<&Value>) -> CorsSetting {
    match value {
        None | Some(Value::Null) => CorsSetting::Inherit,
        Some(Value::Bool(false)) => CorsSetting::Disabled,
        Some(Value::Bool(true)) => CorsSetting::Enabled,
        Some(Value::Object(map)) => CorsSetting::Custom(CorsOverride {
            allow_origins: map
                .get("allowOrigins")
                .filter(|v| v.is_string() || v.is_array())
                .cloned(),
            allow_request_headers: map
                .get("allowRequestHeaders")
                .and_then(Value::as_str)
                .map(str::to_string),
            allow_credentials: map.get("allowCredentials").and_then(Value::as_bool),
        }),
        // Any other value is truthy
        Some(_) => CorsSetting::Enabled,
    }
}

fn authorizer_setting(value: Option<&Value>) -> AuthorizerSetting {
    match value {
        Some(Value::Bool(false)) => AuthorizerSetting::Disabled,
        Some(Value::String(name)) if !name.is_empty() => AuthorizerSetting::Named(name.clone()),
        _ => AuthorizerSetting::Default,
    }
}
