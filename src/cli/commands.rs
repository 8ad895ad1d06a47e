use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::{info, warn};

use crate::assemble::{Collision, ResourceMap};
use crate::config::{load_app_config, AppConfig, PRODUCTION};
use crate::descriptor::FunctionSet;
use crate::pipeline::{DeployOptions, DeployTarget, OutputLayout, Pipeline};
use crate::process::{with_bin_override, SystemRunner};
use crate::transpile::CommandTranspiler;

/// Candidate app config files under `<root>/config`, in lookup order
const APP_CONFIG_FILES: [&str; 4] = ["app.yaml", "app.yml", "app.json", "app.toml"];

/// Command-line interface for lambdaforge
#[derive(Parser, Debug)]
#[command(name = "lambdaforge", version)]
#[command(about = "Deploy a web app's routes as serverless functions", long_about = None)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// What to build and where the app lives
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct TargetArgs {
    /// Deploy every route
    #[arg(long, default_value_t = false)]
    pub all: bool,

    /// Deploy the routes of one controller
    #[arg(short = 'c', long = "controller", value_name = "CONTROLLER")]
    pub controller: Option<String>,

    /// Deploy a single function
    #[arg(short = 'f', long = "function", value_name = "FUNCTION")]
    pub function: Option<String>,

    /// Deploy a scheduled job from jobs/<JOB>
    #[arg(short = 'j', long = "job", value_name = "JOB")]
    pub job: Option<String>,

    /// Application root
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// App config file (default: <root>/config/app.yaml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Use the production environment
    #[arg(long, default_value_t = false)]
    pub prod: bool,

    /// Environment name, overriding the config file
    #[arg(long = "environment", env = "NODE_ENV", value_name = "ENV")]
    pub environment: Option<String>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the deployment tree and deploy it
    Deploy {
        #[command(flatten)]
        target: TargetArgs,

        /// Output directory (default: <root>/serverless)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Install dependencies but do not deploy
        #[arg(long = "nodeploy", default_value_t = false)]
        no_deploy: bool,

        /// Write the deployment tree only
        #[arg(long = "skipdeps", default_value_t = false)]
        skip_deps: bool,

        /// Package manager binary
        #[arg(long, env = "LAMBDAFORGE_NPM_BIN", hide = true)]
        npm_bin: Option<String>,

        /// Deploy tool binary
        #[arg(long, env = "LAMBDAFORGE_SERVERLESS_BIN", hide = true)]
        serverless_bin: Option<String>,
    },
    /// Print the functions and resource map a deploy would produce
    Inspect {
        #[command(flatten)]
        target: TargetArgs,
    },
}

impl TargetArgs {
    /// Resolve the deploy target. Fails on zero or several selectors.
    pub fn deploy_target(&self) -> anyhow::Result<DeployTarget> {
        Ok(DeployTarget::from_flags(
            self.all,
            self.controller.clone(),
            self.function.clone(),
            self.job.clone(),
        )?)
    }

    /// Load the app config and settle its environment.
    ///
    /// `--prod` wins over `--environment`/`NODE_ENV`, which win over the file.
    pub fn load_app(&self) -> anyhow::Result<AppConfig> {
        let path = match &self.config {
            Some(path) => path.clone(),
            None => find_app_config(&self.root),
        };
        let app = load_app_config(&path)?;
        let environment = if self.prod {
            Some(PRODUCTION.to_string())
        } else {
            self.environment.clone().filter(|e| !e.is_empty())
        };
        Ok(match environment {
            Some(environment) => app.with_environment(environment),
            None => app,
        })
    }
}

/// First existing `config/app.*` under `root`, or `config/app.yaml`
pub fn find_app_config(root: &Path) -> PathBuf {
    let dir = root.join("config");
    APP_CONFIG_FILES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
        .unwrap_or_else(|| dir.join(APP_CONFIG_FILES[0]))
}

#[derive(Serialize)]
struct InspectOutput<'a> {
    environment: &'a str,
    functions: &'a FunctionSet,
    resources: &'a ResourceMap,
    collisions: &'a [Collision],
}

/// Execute a parsed command line
pub fn run_cli(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Deploy {
            target,
            output,
            no_deploy,
            skip_deps,
            npm_bin,
            serverless_bin,
        } => {
            let deploy_target = target.deploy_target()?;
            let mut app = target.load_app()?;
            info!(environment = %app.environment, deploy_target = ?deploy_target, "Deploying");

            app.serverless.install_command =
                Some(with_bin_override(app.serverless.install(), npm_bin));
            app.serverless.deploy_command =
                Some(with_bin_override(app.serverless.deploy(), serverless_bin));

            let transpiler =
                CommandTranspiler::new(app.serverless.transpiler_command(), &target.root);
            let pipeline = Pipeline::new(&app, &transpiler, &SystemRunner);
            let report = pipeline.run(&DeployOptions {
                target: deploy_target,
                layout: OutputLayout::new(&target.root, output),
                skip_deps,
                no_deploy,
            })?;

            if !report.collisions.is_empty() {
                warn!(
                    count = report.collisions.len(),
                    "Some routes share a resource key; see warnings above"
                );
            }
            info!(
                functions = report.functions.len(),
                descriptor = %report.descriptor.display(),
                installed = report.installed,
                deployed = report.deployed,
                "Deploy finished"
            );
            Ok(())
        }
        Commands::Inspect { target } => {
            let deploy_target = target.deploy_target()?;
            let app = target.load_app()?;
            let transpiler =
                CommandTranspiler::new(app.serverless.transpiler_command(), &target.root);
            let pipeline = Pipeline::new(&app, &transpiler, &SystemRunner);
            pipeline.check(&target.root)?;
            let assembly = pipeline.plan(&deploy_target, &target.root)?;

            let output = InspectOutput {
                environment: &app.environment,
                functions: &assembly.functions,
                resources: &assembly.resources,
                collisions: &assembly.collisions,
            };
            let json =
                serde_json::to_string_pretty(&output).context("Failed to serialize assembly")?;
            println!("{json}");
            Ok(())
        }
    }
}
