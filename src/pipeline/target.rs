use crate::error::DeployError;

const TARGET_FLAGS: &str = "`--all`, `-j <job name>`, `-c <controller name>` or `-f <function name>`";

/// What a run deploys
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployTarget {
    /// Every route
    All,
    /// Routes whose action lives in one controller
    Controller(String),
    /// Every route is built, only one function is deployed
    Function(String),
    /// One scheduled job
    Job(String),
}

impl DeployTarget {
    /// Pick the target from the mutually exclusive command-line selectors.
    pub fn from_flags(
        all: bool,
        controller: Option<String>,
        function: Option<String>,
        job: Option<String>,
    ) -> Result<Self, DeployError> {
        let mut selected = Vec::new();
        if all {
            selected.push(DeployTarget::All);
        }
        if let Some(c) = controller {
            selected.push(DeployTarget::Controller(c));
        }
        if let Some(f) = function {
            selected.push(DeployTarget::Function(f));
        }
        if let Some(j) = job {
            selected.push(DeployTarget::Job(j));
        }

        match selected.len() {
            0 => Err(DeployError::BadArgs(format!(
                "One of {TARGET_FLAGS} must be specified."
            ))),
            1 => Ok(selected.remove(0)),
            _ => Err(DeployError::BadArgs(format!(
                "Only one of {TARGET_FLAGS} may be specified."
            ))),
        }
    }

    /// Controller the assembler is scoped to
    pub fn controller(&self) -> Option<&str> {
        match self {
            DeployTarget::Controller(name) => Some(name.as_str()),
            _ => None,
        }
    }

    pub fn job(&self) -> Option<&str> {
        match self {
            DeployTarget::Job(name) => Some(name.as_str()),
            _ => None,
        }
    }

    /// Appended to the descriptor's `service` name
    pub fn service_suffix(&self) -> Option<String> {
        match self {
            DeployTarget::Controller(name) => Some(name.clone()),
            DeployTarget::Job(name) => Some(format!("job-{name}")),
            DeployTarget::All | DeployTarget::Function(_) => None,
        }
    }

    /// Extra arguments for the deploy command
    pub fn deploy_args(&self) -> Vec<String> {
        match self {
            DeployTarget::Function(name) => vec!["-f".to_string(), name.clone()],
            _ => Vec::new(),
        }
    }

    /// Source folders copied and transpiled on top of the configured ones
    pub fn source_paths(&self) -> Vec<String> {
        match self {
            DeployTarget::Job(name) => vec![format!("jobs/{name}")],
            _ => vec!["api/controllers".to_string(), "api/authorizers".to_string()],
        }
    }
}
