use once_cell::sync::Lazy;
use regex::Regex;

#[allow(clippy::expect_used)]
static NAMED_SEGMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/:([A-Za-z0-9_]+)").expect("named segment regex"));

/// Parameter key used for a trailing greedy wildcard
pub const WILDCARD_PARAM: &str = "0";

/// Result of translating a framework path into the platform's syntax
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslatedPath {
    /// Path with `{name}` captures and an optional `{0+}` greedy tail
    pub path: String,
    /// Capture names in path order, with [`WILDCARD_PARAM`] last when present
    pub params: Vec<String>,
}

impl TranslatedPath {
    pub fn has_params(&self) -> bool {
        !self.params.is_empty()
    }
}

/// Rewrite `/:name` segments to `/{name}` and a trailing `/*` to `/{0+}`.
///
/// A `/*` anywhere but the end of the path is left as-is and does not
/// contribute a parameter.
pub fn translate_path(path: &str) -> TranslatedPath {
    let mut params: Vec<String> = Vec::new();
    for caps in NAMED_SEGMENT.captures_iter(path) {
        if let Some(name) = caps.get(1) {
            if !params.iter().any(|p| p == name.as_str()) {
                params.push(name.as_str().to_string());
            }
        }
    }

    let mut translated = NAMED_SEGMENT.replace_all(path, "/{$1}").into_owned();
    if let Some(stem) = translated.strip_suffix("/*") {
        translated = format!("{stem}/{{0+}}");
        params.push(WILDCARD_PARAM.to_string());
    }

    TranslatedPath {
        path: translated,
        params,
    }
}
