use serde_json::Value;

use super::target::{CorsOverride, CorsSetting};
use crate::config::GlobalCors;
use crate::descriptor::{CorsPolicy, Origin};

/// Resolve the CORS policy for one route.
///
/// - `cors: false` always wins and yields no policy
/// - `cors: true` or `allRoutes` applies the global settings
/// - an object override applies its own fields, falling back field by field
/// - otherwise no policy
pub fn resolve_cors(setting: &CorsSetting, global: &GlobalCors) -> Option<CorsPolicy> {
    match setting {
        CorsSetting::Disabled => None,
        CorsSetting::Enabled => Some(policy(&CorsOverride::default(), global)),
        CorsSetting::Custom(over) => Some(policy(over, global)),
        CorsSetting::Inherit if global.all_routes => {
            Some(policy(&CorsOverride::default(), global))
        }
        CorsSetting::Inherit => None,
    }
}

fn policy(over: &CorsOverride, global: &GlobalCors) -> CorsPolicy {
    let origin = over
        .allow_origins
        .as_ref()
        .and_then(origin_from_value)
        .unwrap_or_else(|| global.allow_origins.clone());
    let headers = over
        .allow_request_headers
        .as_deref()
        .unwrap_or(&global.allow_request_headers);
    CorsPolicy {
        origin,
        headers: split_headers(headers),
        allow_credentials: over.allow_credentials.unwrap_or(global.allow_credentials),
    }
}

fn origin_from_value(value: &Value) -> Option<Origin> {
    serde_json::from_value(value.clone()).ok()
}

/// Split a comma-separated header list, trimming each entry
pub fn split_headers(headers: &str) -> Vec<String> {
    headers.split(',').map(|h| h.trim().to_string()).collect()
}
