use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

#[allow(clippy::expect_used)]
static VERB_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(all|get|post|put|delete|trace|options|connect|patch|head)\s+")
        .expect("verb prefix regex")
});

/// HTTP verb recognized at the start of a route address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    All,
    Get,
    Post,
    Put,
    Delete,
    Trace,
    Options,
    Connect,
    Patch,
    Head,
}

impl Verb {
    /// Lower-case token as written in descriptors and resource-map keys
    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::All => "all",
            Verb::Get => "get",
            Verb::Post => "post",
            Verb::Put => "put",
            Verb::Delete => "delete",
            Verb::Trace => "trace",
            Verb::Options => "options",
            Verb::Connect => "connect",
            Verb::Patch => "patch",
            Verb::Head => "head",
        }
    }

    /// Case-insensitive lookup of a verb token
    pub fn from_token(token: &str) -> Option<Self> {
        let verb = match token.to_ascii_lowercase().as_str() {
            "all" => Verb::All,
            "get" => Verb::Get,
            "post" => Verb::Post,
            "put" => Verb::Put,
            "delete" => Verb::Delete,
            "trace" => Verb::Trace,
            "options" => Verb::Options,
            "connect" => Verb::Connect,
            "patch" => Verb::Patch,
            "head" => Verb::Head,
            _ => return None,
        };
        Some(verb)
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A route address split into its verb and path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedAddress {
    /// `None` means the route answers any verb
    pub verb: Option<Verb>,
    pub path: String,
}

impl ParsedAddress {
    /// Verb token, or the empty string for "any verb"
    pub fn verb_str(&self) -> &'static str {
        self.verb.map(|v| v.as_str()).unwrap_or("")
    }
}

/// Parse a `"[VERB ]PATH"` route address.
///
/// Any string is accepted. A leading verb token must be followed by
/// whitespace to count as a verb, so `"get"` alone is a path.
pub fn parse_address(address: &str) -> ParsedAddress {
    match VERB_PREFIX.captures(address) {
        Some(caps) => {
            let verb = caps.get(1).and_then(|m| Verb::from_token(m.as_str()));
            let rest = &address[caps.get(0).map_or(0, |m| m.end())..];
            ParsedAddress {
                verb,
                path: rest.trim().to_string(),
            }
        }
        None => ParsedAddress {
            verb: None,
            path: address.trim().to_string(),
        },
    }
}
