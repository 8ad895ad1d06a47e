//! Dependency manifest (`package.json`) handling.
//!
//! The deployed tree gets a copy of the app's manifest with the web framework
//! and its hooks removed, the runtime wrapper's dependencies guaranteed, and
//! dev dependencies cleared.

use std::fs;
use std::io;
use std::path::Path;

use anyhow::Context;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::DeployError;

pub const MANIFEST_FILE: &str = "package.json";

/// Framework package whose presence marks an app root
pub const FRAMEWORK_PACKAGE: &str = "sails";

const FRAMEWORK_HOOK_MARKER: &str = "sails-hook-";

/// Packages the generated handlers need at runtime, with fallback versions
pub const RUNTIME_DEPENDENCIES: [(&str, &str); 5] = [
    ("baggywrinkle", "latest"),
    ("babel-polyfill", "6.26.0"),
    ("sails-hook-orm", "^2.0.0-22"),
    ("machine", "15.0.0-20"),
    ("recursive-readdir", "2.2.1"),
];

/// Read `<root>/package.json` and check it belongs to a framework app.
///
/// A missing, unreadable or unparsable manifest is treated the same as one
/// without the framework dependency.
pub fn read_app_manifest(root: &Path) -> Result<Map<String, Value>, DeployError> {
    let not_app = || DeployError::NotInAppRoot {
        root: root.to_path_buf(),
    };
    let source = fs::read_to_string(root.join(MANIFEST_FILE)).map_err(|_| not_app())?;
    let manifest: Map<String, Value> = serde_json::from_str(&source).map_err(|_| not_app())?;
    if depends_on_framework(&manifest) {
        Ok(manifest)
    } else {
        Err(not_app())
    }
}

/// Whether `dependencies` or `devDependencies` lists the framework
pub fn depends_on_framework(manifest: &Map<String, Value>) -> bool {
    ["dependencies", "devDependencies"].iter().any(|section| {
        manifest
            .get(*section)
            .and_then(|deps| deps.get(FRAMEWORK_PACKAGE))
            .is_some_and(is_truthy)
    })
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => false,
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

fn is_framework_package(name: &str) -> bool {
    name == FRAMEWORK_PACKAGE || name.contains(FRAMEWORK_HOOK_MARKER)
}

/// Manifest as shipped with the deployment.
///
/// Framework packages not listed in `keep` are dropped, runtime dependencies
/// are added when absent and `devDependencies` is emptied. Key order of the
/// remaining entries is preserved.
pub fn deployed_manifest(manifest: &Map<String, Value>, keep: &[String]) -> Map<String, Value> {
    let mut deployed = manifest.clone();

    let mut dependencies: Map<String, Value> = manifest
        .get("dependencies")
        .and_then(Value::as_object)
        .map(|deps| {
            deps.iter()
                .filter(|(name, _)| !is_framework_package(name) || keep.contains(*name))
                .map(|(name, version)| (name.clone(), version.clone()))
                .collect()
        })
        .unwrap_or_default();

    for (name, version) in RUNTIME_DEPENDENCIES {
        let present = dependencies.get(name).is_some_and(is_truthy);
        if !present {
            debug!(package = name, version, "Adding runtime dependency");
            dependencies.insert(name.to_string(), Value::String(version.to_string()));
        }
    }

    deployed.insert("dependencies".to_string(), Value::Object(dependencies));
    deployed.insert("devDependencies".to_string(), Value::Object(Map::new()));
    deployed
}

/// Write a manifest as pretty JSON
pub fn write_manifest(path: &Path, manifest: &Map<String, Value>) -> anyhow::Result<()> {
    let mut content = serde_json::to_string_pretty(manifest)?;
    content.push('\n');
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
}

/// Whether `<root>/api/helpers` holds at least one `.js` file.
///
/// Only the top level is checked. A missing folder means no helpers.
pub fn has_helpers(root: &Path) -> anyhow::Result<bool> {
    let dir = root.join("api").join("helpers");
    let entries = match fs::read_dir(&dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(err) => {
            return Err(err).with_context(|| format!("Failed to read {}", dir.display()))
        }
    };
    for entry in entries {
        let entry = entry.with_context(|| format!("Failed to read {}", dir.display()))?;
        let name = entry.file_name();
        let name = name.to_string_lossy();
        let after_first = name.char_indices().nth(1);
        if after_first.is_some_and(|(i, _)| name[i..].contains(".js")) {
            return Ok(true);
        }
    }
    Ok(false)
}
