//! # Descriptor Records
//!
//! Typed records for the deployable units written into `serverless.yml`.
//! Each record serializes straight into the platform's descriptor shape:
//!
//! ```yaml
//! userFind:
//!   handler: functions/user/find.fn
//!   events:
//!     - http:
//!         path: /users/{id}
//!         method: get
//!         request:
//!           parameters:
//!             paths:
//!               id: true
//!         cors:
//!           origin: '*'
//!           headers: [Content-Type]
//!           allowCredentials: false
//!         authorizer:
//!           name: authorizersJwt
//!           type: request
//!           resultTtlInSeconds: 0
//! ```

use indexmap::IndexMap;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

/// Generated functions keyed by function name, in emission order
pub type FunctionSet = IndexMap<String, FunctionDescriptor>;

/// Allowed CORS origin(s), as configured
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Origin {
    One(String),
    Many(Vec<String>),
}

impl Default for Origin {
    fn default() -> Self {
        Origin::One("*".to_string())
    }
}

/// Resolved CORS policy attached to an HTTP trigger
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CorsPolicy {
    pub origin: Origin,
    pub headers: Vec<String>,
    pub allow_credentials: bool,
}

/// Reference to an authorizer function guarding an HTTP trigger
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizerRef {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub result_ttl_in_seconds: u32,
}

impl AuthorizerRef {
    /// Request-type authorizer with result caching disabled
    pub fn request(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: "request".to_string(),
            result_ttl_in_seconds: 0,
        }
    }
}

/// HTTP event source for a function
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpTrigger {
    pub path: String,
    /// Lower-case verb, or empty for any verb
    pub method: String,
    /// Path capture names, `"0"` for a greedy wildcard
    pub path_parameters: Vec<String>,
    pub cors: Option<CorsPolicy>,
    pub authorizer: Option<AuthorizerRef>,
}

struct PathParameters<'a>(&'a [String]);

impl Serialize for PathParameters<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        struct Names<'a>(&'a [String]);
        impl Serialize for Names<'_> {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                let mut map = serializer.serialize_map(Some(self.0.len()))?;
                for name in self.0 {
                    map.serialize_entry(name, &true)?;
                }
                map.end()
            }
        }
        struct Paths<'a>(&'a [String]);
        impl Serialize for Paths<'_> {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("paths", &Names(self.0))?;
                map.end()
            }
        }
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry("parameters", &Paths(self.0))?;
        map.end()
    }
}

impl Serialize for HttpTrigger {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("path", &self.path)?;
        map.serialize_entry("method", &self.method)?;
        if !self.path_parameters.is_empty() {
            map.serialize_entry("request", &PathParameters(&self.path_parameters))?;
        }
        if let Some(cors) = &self.cors {
            map.serialize_entry("cors", cors)?;
        }
        if let Some(authorizer) = &self.authorizer {
            map.serialize_entry("authorizer", authorizer)?;
        }
        map.end()
    }
}

/// Scheduled event source for a job function
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleTrigger {
    pub schedule_expression: String,
}

/// Event source of a function
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    Http(HttpTrigger),
    Schedule(ScheduleTrigger),
}

impl Serialize for Trigger {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        match self {
            Trigger::Http(http) => map.serialize_entry("http", http)?,
            Trigger::Schedule(schedule) => {
                map.serialize_entry("schedule", &schedule.schedule_expression)?
            }
        }
        map.end()
    }
}

/// One deployable unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDescriptor {
    /// `functions/<name>.fn`, relative to the output root
    pub handler: String,
    /// Authorizer functions carry no trigger of their own
    pub trigger: Option<Trigger>,
}

impl FunctionDescriptor {
    pub fn http(&self) -> Option<&HttpTrigger> {
        match &self.trigger {
            Some(Trigger::Http(http)) => Some(http),
            _ => None,
        }
    }
}

impl Serialize for FunctionDescriptor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("handler", &self.handler)?;
        if let Some(trigger) = &self.trigger {
            map.serialize_entry("events", &[trigger])?;
        }
        map.end()
    }
}
