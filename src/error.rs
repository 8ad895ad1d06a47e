use std::fmt;
use std::path::PathBuf;

/// Conditions that abort a deploy run
///
/// Every variant is fatal for the current run. Output already written to the
/// deployment directory is left in place for inspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployError {
    /// The command-line selection of what to deploy is invalid
    ///
    /// Reported before anything is touched on disk.
    BadArgs(String),
    /// The working directory does not look like an application root
    ///
    /// Detected when the dependency manifest is missing, unreadable, or does
    /// not list the web framework as a dependency.
    NotInAppRoot {
        /// Directory that was checked
        root: PathBuf,
    },
    /// `requireProd` is set but the run is not in the production environment
    NotInProduction,
    /// A configuration file exists but could not be read or parsed
    Config {
        /// Offending file
        file: PathBuf,
        /// Underlying parser or I/O message
        message: String,
    },
    /// The dependency install command failed
    Install(String),
    /// The deploy command failed
    Deploy(String),
}

impl fmt::Display for DeployError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeployError::BadArgs(msg) => write!(f, "Invalid arguments: {msg}"),
            DeployError::NotInAppRoot { root } => write!(
                f,
                "It doesn't look like {} contains a Sails project (no `sails` dependency in package.json)",
                root.display()
            ),
            DeployError::NotInProduction => write!(
                f,
                "This app specifies that it should only be deployed in production mode. \
                Try `NODE_ENV=production` or pass --prod"
            ),
            DeployError::Config { file, message } => {
                write!(f, "Error parsing {}: {message}", file.display())
            }
            DeployError::Install(msg) => {
                write!(f, "A problem occurred while installing dependencies: {msg}")
            }
            DeployError::Deploy(msg) => write!(f, "Deployment failed: {msg}"),
        }
    }
}

impl std::error::Error for DeployError {}
