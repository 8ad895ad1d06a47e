use crate::descriptor::CorsPolicy;

/// Helpers bootstrap written at the output root when helpers are shipped
pub const HELPERS_BOOTSTRAP_FILE: &str = "initialize-helpers.js";

/// ORM bootstrap written at the output root when the ORM is enabled
pub const ORM_BOOTSTRAP_FILE: &str = "initialize-orm.js";

/// Which bootstrap files exist in the output tree
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HandlerSupport {
    pub helpers: bool,
    pub orm: bool,
}

/// Runs before the wrapped action, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootstrapStep {
    /// `require` path of the helpers bootstrap, relative to the handler
    Helpers(String),
    /// `require` path of the ORM bootstrap, relative to the handler
    Orm(String),
}

/// Runs after the wrapped action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeardownStep {
    Orm,
}

/// CORS setting handed to the runtime wrapper
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorsLiteral {
    Off,
    On,
    Empty,
    Policy(CorsPolicy),
}

/// Extra wrapper options appended after `cors`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerOption {
    NoEnvelope,
    EventType(String),
}

/// Everything needed to render one handler module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerPlan {
    /// `require` path of the wrapped unit, relative to the handler file
    pub target: String,
    pub bootstrap: Vec<BootstrapStep>,
    pub teardown: Vec<TeardownStep>,
    pub cors: CorsLiteral,
    pub options: Vec<HandlerOption>,
}

impl HandlerPlan {
    /// Plan for a handler written at `handler_file` wrapping `target_file`.
    ///
    /// Both paths are relative to the output root and use `/` separators.
    pub fn new(
        handler_file: &str,
        target_file: &str,
        support: HandlerSupport,
        cors: CorsLiteral,
    ) -> Self {
        let mut bootstrap = Vec::new();
        let mut teardown = Vec::new();
        if support.helpers {
            bootstrap.push(BootstrapStep::Helpers(relative_require(
                handler_file,
                HELPERS_BOOTSTRAP_FILE,
            )));
        }
        if support.orm {
            bootstrap.push(BootstrapStep::Orm(relative_require(
                handler_file,
                ORM_BOOTSTRAP_FILE,
            )));
            teardown.push(TeardownStep::Orm);
        }
        Self {
            target: relative_require(handler_file, target_file),
            bootstrap,
            teardown,
            cors,
            options: Vec::new(),
        }
    }

    pub fn with_option(mut self, option: HandlerOption) -> Self {
        self.options.push(option);
        self
    }
}

/// `require` specifier reaching `target` from the directory holding `from_file`
///
/// Always starts with `./` or `../` so it is never resolved as a package.
pub fn relative_require(from_file: &str, target: &str) -> String {
    let mut from_dir: Vec<&str> = from_file.split('/').filter(|s| !s.is_empty()).collect();
    from_dir.pop();
    let target: Vec<&str> = target.split('/').filter(|s| !s.is_empty()).collect();

    let common = from_dir
        .iter()
        .zip(target.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let ups = from_dir.len() - common;
    let rest = target[common..].join("/");
    if ups == 0 {
        format!("./{rest}")
    } else {
        format!("{}{rest}", "../".repeat(ups))
    }
}
