//! Source transforms applied to the copied tree.
//!
//! Every `.js` file under a transpile path first gets its action body wrapped
//! so thrown errors reach the `error` exit, then goes through a
//! [`Transpiler`] (by default `npx babel --presets env`, fed on stdin).

use std::borrow::Cow;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;

use anyhow::Context;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::config::CommandConfig;

/// `fn: ... { <body> } }` in an action definition
#[allow(clippy::expect_used)]
static ACTION_BODY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(fn:.+?\{)([\w\W]+)(\}\s+\})").expect("valid action body regex"));

/// Transforms one source file
pub trait Transpiler {
    fn transpile(&self, path: &Path, source: &str) -> anyhow::Result<String>;
}

/// [`Transpiler`] that pipes the source through an external command
#[derive(Debug, Clone)]
pub struct CommandTranspiler {
    command: CommandConfig,
    cwd: PathBuf,
}

impl CommandTranspiler {
    /// `cwd` is where the command runs, so it can find local presets
    pub fn new(command: CommandConfig, cwd: impl Into<PathBuf>) -> Self {
        Self {
            command,
            cwd: cwd.into(),
        }
    }
}

impl Transpiler for CommandTranspiler {
    fn transpile(&self, path: &Path, source: &str) -> anyhow::Result<String> {
        let mut child = Command::new(&self.command.command)
            .args(&self.command.args)
            .current_dir(&self.cwd)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("Failed to start `{}`", self.command.command))?;

        // The child may fill stdout before it drains stdin.
        let feeder = child.stdin.take().map(|mut stdin| {
            let source = source.to_string();
            thread::spawn(move || stdin.write_all(source.as_bytes()))
        });

        let output = child
            .wait_with_output()
            .with_context(|| format!("Transpiler did not finish for {}", path.display()))?;
        let fed = feeder.map(|feeder| feeder.join());
        if !output.status.success() {
            anyhow::bail!(
                "Transpiling {} failed: {}",
                path.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        match fed {
            Some(Ok(result)) => result
                .with_context(|| format!("Failed to feed {} to the transpiler", path.display()))?,
            Some(Err(_)) => anyhow::bail!("Transpiler input thread panicked for {}", path.display()),
            None => {}
        }
        String::from_utf8(output.stdout)
            .with_context(|| format!("Transpiler produced invalid UTF-8 for {}", path.display()))
    }
}

/// Wrap the first action body in `try { } catch (e) { return exits.error(e); }`.
///
/// Sources without an action definition are returned unchanged.
pub fn guard_action_body(source: &str) -> Cow<'_, str> {
    ACTION_BODY.replace(
        source,
        "${1} try { ${2} } catch (e) { return exits.error(e); } ${3}",
    )
}

/// Guard and transpile every `.js` file under `dir`, in place.
///
/// Dotfiles and dot-directories are skipped. A missing `dir` is skipped with
/// a warning. Returns how many files were rewritten.
pub fn transpile_tree(dir: &Path, transpiler: &dyn Transpiler) -> anyhow::Result<usize> {
    if !dir.exists() {
        warn!(path = %dir.display(), "Nothing to transpile");
        return Ok(0);
    }

    let walker = WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry));

    let mut count = 0;
    for entry in walker {
        let entry = entry.with_context(|| format!("Failed to walk {}", dir.display()))?;
        let path = entry.path();
        if !entry.file_type().is_file() || !matches!(path.extension(), Some(ext) if ext == "js") {
            continue;
        }
        let source =
            fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
        let guarded = guard_action_body(&source);
        let output = transpiler.transpile(path, &guarded)?;
        fs::write(path, output).with_context(|| format!("Failed to write {}", path.display()))?;
        debug!(path = %path.display(), "Transpiled");
        count += 1;
    }
    Ok(count)
}

fn is_hidden(entry: &walkdir::DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.')
}
