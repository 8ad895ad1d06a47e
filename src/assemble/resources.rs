use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

/// Original route behind a translated path, written to `resources.json`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceEntry {
    pub address: String,
    pub target: Value,
}

/// Two routes that translated to the same resource key
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Collision {
    pub key: String,
    pub previous_address: String,
    pub address: String,
}

/// `"<verb> <path>"` (or bare `<path>`) → original route
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ResourceMap(IndexMap<String, ResourceEntry>);

impl ResourceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Key under which a translated route is recorded
    pub fn key(verb: &str, path: &str) -> String {
        if verb.is_empty() {
            path.to_string()
        } else {
            format!("{verb} {path}")
        }
    }

    /// Record a route; the later entry replaces an earlier one with the same key.
    pub fn record(&mut self, key: String, entry: ResourceEntry) -> Option<Collision> {
        let address = entry.address.clone();
        self.0
            .insert(key.clone(), entry)
            .map(|previous| Collision {
                key,
                previous_address: previous.address,
                address,
            })
    }

    pub fn get(&self, key: &str) -> Option<&ResourceEntry> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ResourceEntry)> {
        self.0.iter().map(|(key, entry)| (key.as_str(), entry))
    }
}
