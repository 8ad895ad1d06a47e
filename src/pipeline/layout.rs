use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use anyhow::Context;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::DeployError;

/// Default output folder, relative to the app root
pub const OUTPUT_DIR: &str = "serverless";

pub const DESCRIPTOR_FILE: &str = "serverless.yml";
pub const RESOURCES_FILE: &str = "resources.json";

/// Where a run reads from and writes to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    /// Application root
    pub root: PathBuf,
    /// Deployment tree, removed and recreated on every run
    pub output: PathBuf,
}

impl OutputLayout {
    pub fn new(root: impl Into<PathBuf>, output: Option<PathBuf>) -> Self {
        let root = root.into();
        let output = output.unwrap_or_else(|| root.join(OUTPUT_DIR));
        Self { root, output }
    }

    /// Resolve an output-relative, `/`-separated path
    pub fn output_path(&self, relative: &str) -> PathBuf {
        relative
            .split('/')
            .filter(|s| !s.is_empty())
            .fold(self.output.clone(), |path, part| path.join(part))
    }

    /// Resolve a root-relative, `/`-separated path
    pub fn source_path(&self, relative: &str) -> PathBuf {
        relative
            .split('/')
            .filter(|s| !s.is_empty())
            .fold(self.root.clone(), |path, part| path.join(part))
    }

    /// Refuse an output folder that overlaps the app being deployed.
    ///
    /// The output may not be the root, an ancestor of it, or sit inside any
    /// of the root-relative `sources`. Symlinks are resolved where the path
    /// exists.
    pub fn check_output(&self, sources: &[String]) -> Result<(), DeployError> {
        let resolve_error = |err: io::Error| {
            DeployError::BadArgs(format!("Cannot resolve output directory: {err}"))
        };
        let root = resolve(&self.root).map_err(resolve_error)?;
        let output = resolve(&self.output).map_err(resolve_error)?;

        if root.starts_with(&output) {
            return Err(DeployError::BadArgs(format!(
                "Output directory {} would replace the app at {}",
                self.output.display(),
                self.root.display()
            )));
        }
        for source in sources {
            let source_dir = resolve(&self.source_path(source)).map_err(resolve_error)?;
            if output.starts_with(&source_dir) {
                return Err(DeployError::BadArgs(format!(
                    "Output directory {} is inside the deployed source `{source}`",
                    self.output.display()
                )));
            }
        }
        Ok(())
    }

    /// Remove any previous output and create an empty output folder.
    pub fn reset_output(&self) -> anyhow::Result<()> {
        match fs::remove_dir_all(&self.output) {
            Ok(()) => debug!(path = %self.output.display(), "Removed previous output"),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("Failed to remove {}", self.output.display()))
            }
        }
        fs::create_dir_all(&self.output)
            .with_context(|| format!("Failed to create {}", self.output.display()))
    }

    /// Copy a root-relative file or folder to the same place in the output.
    ///
    /// Returns `false` when the source does not exist.
    pub fn include(&self, relative: &str) -> anyhow::Result<bool> {
        let source = self.source_path(relative);
        if !source.exists() {
            warn!(path = relative, "Include path not found, skipping");
            return Ok(false);
        }
        copy_tree(&source, &self.output_path(relative))?;
        Ok(true)
    }

    /// Write `content` to an output-relative path, creating parent folders.
    pub fn write(&self, relative: &str, content: &str) -> anyhow::Result<PathBuf> {
        let path = self.output_path(relative);
        write_file(&path, content)?;
        Ok(path)
    }
}

fn write_file(path: &Path, content: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
}

/// Absolute, `.`/`..`-free form of `path`, with symlinks resolved on the part
/// that exists
fn resolve(path: &Path) -> io::Result<PathBuf> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };
    let mut normal = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normal.pop();
            }
            other => normal.push(other),
        }
    }

    let mut missing = Vec::new();
    let mut existing = normal.as_path();
    while !existing.exists() {
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                missing.push(name.to_os_string());
                existing = parent;
            }
            _ => break,
        }
    }
    let mut resolved = existing.canonicalize()?;
    resolved.extend(missing.iter().rev());
    Ok(resolved)
}

/// Recursively copy `from` (file or folder) to `to`
pub fn copy_tree(from: &Path, to: &Path) -> anyhow::Result<()> {
    for entry in WalkDir::new(from).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Failed to read {}", from.display()))?;
        let relative = entry
            .path()
            .strip_prefix(from)
            .with_context(|| format!("{} is outside {}", entry.path().display(), from.display()))?;
        let dest = if relative.as_os_str().is_empty() {
            to.to_path_buf()
        } else {
            to.join(relative)
        };

        if entry.file_type().is_dir() {
            fs::create_dir_all(&dest)
                .with_context(|| format!("Failed to create {}", dest.display()))?;
        } else {
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            fs::copy(entry.path(), &dest).with_context(|| {
                format!(
                    "Failed to copy {} to {}",
                    entry.path().display(),
                    dest.display()
                )
            })?;
        }
    }
    Ok(())
}
