#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use lambdaforge::config::CommandConfig;
use lambdaforge::process::{ProcessOutcome, ProcessRunner};
use lambdaforge::transpile::Transpiler;
use tempfile::TempDir;

pub const APP_YAML: &str = r#"
environment: development
routes:
  "GET /users/:id": user/find
  "POST /users":
    action: user/create
    cors: true
  "/files/*": file/serve
  "GET /":
    view: pages/homepage
security:
  cors:
    allRoutes: false
    allowOrigins: "*"
    allowRequestHeaders: "Content-Type, Authorization"
serverless:
  defaultAuthorizer: jwt
  yml:
    provider:
      memorySize: 256
models:
  migrate: alter
datastores:
  default:
    adapter: sails-disk
"#;

pub const PACKAGE_JSON: &str = r#"{
  "name": "shop",
  "version": "1.0.0",
  "dependencies": {
    "lodash": "^4.17.0",
    "sails": "^1.5.0",
    "sails-hook-orm": "^2.1.0",
    "sails-hook-grunt": "^4.0.0"
  },
  "devDependencies": {
    "eslint": "^5.0.0"
  }
}
"#;

const ACTION: &str = "module.exports = {\n  fn: async function (inputs, exits) {\n    return exits.success();\n  }\n};\n";

/// A minimal framework app on disk
pub struct AppFixture {
    pub dir: TempDir,
}

impl AppFixture {
    pub fn new() -> Self {
        let fixture = Self {
            dir: tempfile::tempdir().unwrap(),
        };
        fixture.write("package.json", PACKAGE_JSON);
        fixture.write("config/app.yaml", APP_YAML);
        fixture.write("api/controllers/user/find.js", ACTION);
        fixture.write("api/controllers/user/create.js", ACTION);
        fixture.write("api/controllers/file/serve.js", ACTION);
        fixture.write("api/authorizers/jwt.js", ACTION);
        fixture.write("api/models/User.js", "module.exports = { attributes: {} };\n");
        fixture.write("api/helpers/format-price.js", ACTION);
        fixture.write("config/models.js", "module.exports.models = {};\n");
        fixture.write("config/datastores.js", "module.exports.datastores = {};\n");
        fixture
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn output(&self) -> PathBuf {
        self.root().join("serverless")
    }

    pub fn write(&self, relative: &str, content: &str) {
        let path = self.root().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    pub fn read_output(&self, relative: &str) -> String {
        fs::read_to_string(self.output().join(relative))
            .unwrap_or_else(|err| panic!("reading {relative}: {err}"))
    }
}

/// Marks files instead of running a real transpiler
#[derive(Default)]
pub struct MarkingTranspiler {
    pub seen: RefCell<Vec<PathBuf>>,
}

impl Transpiler for MarkingTranspiler {
    fn transpile(&self, path: &Path, source: &str) -> anyhow::Result<String> {
        self.seen.borrow_mut().push(path.to_path_buf());
        Ok(format!("// transpiled\n{source}"))
    }
}

/// Records commands and answers with scripted exit codes
pub struct ScriptedRunner {
    pub calls: RefCell<Vec<(String, Vec<String>, PathBuf)>>,
    pub install_code: i32,
    pub deploy_code: i32,
}

impl ScriptedRunner {
    pub fn succeeding() -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            install_code: 0,
            deploy_code: 0,
        }
    }

    pub fn failing_install() -> Self {
        Self {
            install_code: 1,
            ..Self::succeeding()
        }
    }

    pub fn failing_deploy() -> Self {
        Self {
            deploy_code: 2,
            ..Self::succeeding()
        }
    }

    pub fn commands(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .map(|(command, args, _)| format!("{command} {}", args.join(" ")))
            .collect()
    }
}

impl ProcessRunner for ScriptedRunner {
    fn run(
        &self,
        command: &CommandConfig,
        extra_args: &[String],
        cwd: &Path,
    ) -> anyhow::Result<ProcessOutcome> {
        let args: Vec<String> = command.args.iter().chain(extra_args).cloned().collect();
        let is_install = args.first().map(String::as_str) == Some("install");
        self.calls
            .borrow_mut()
            .push((command.command.clone(), args, cwd.to_path_buf()));
        let code = if is_install {
            self.install_code
        } else {
            self.deploy_code
        };
        Ok(ProcessOutcome { code: Some(code) })
    }
}
