use std::io;
use std::path::Path;

use anyhow::Context;
use walkdir::WalkDir;

/// Authorizer sources relative to the output root
pub const AUTHORIZERS_DIR: &str = "api/authorizers";

/// List every file under `<root>/api/authorizers`, recursively.
///
/// Returned paths are relative to `root`, `/`-separated and sorted. A missing
/// directory yields no entries; any other read failure, or a file in place of
/// the directory, is an error.
pub fn list_authorizers(root: &Path) -> anyhow::Result<Vec<String>> {
    let dir = root.join(AUTHORIZERS_DIR);
    let mut files = Vec::new();

    for entry in WalkDir::new(&dir).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) if err.depth() == 0 && is_not_found(&err) => return Ok(Vec::new()),
            Err(err) => {
                return Err(err).with_context(|| format!("Failed to list {}", dir.display()))
            }
        };
        if entry.depth() == 0 && !entry.file_type().is_dir() {
            anyhow::bail!("{} is not a directory", dir.display());
        }
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(root)
            .with_context(|| format!("{} is outside {}", entry.path().display(), root.display()))?;
        let parts: Vec<_> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        files.push(parts.join("/"));
    }

    Ok(files)
}

fn is_not_found(err: &walkdir::Error) -> bool {
    err.io_error()
        .map(|e| e.kind() == io::ErrorKind::NotFound)
        .unwrap_or(false)
}
