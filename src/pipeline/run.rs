use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::info;

use super::layout::{OutputLayout, DESCRIPTOR_FILE, RESOURCES_FILE};
use super::target::DeployTarget;
use crate::assemble::{
    assemble_job, list_authorizers, Assembler, Assembly, Collision, JobSpec, JOBS_DIR,
    JOB_ENTRY_FILE,
};
use crate::config::{
    append_service_suffix, load_job_config, render_descriptor, AppConfig, DescriptorLayers,
};
use crate::error::DeployError;
use crate::handler::{
    render_helpers_bootstrap, render_orm_bootstrap, HandlerSupport, HELPERS_BOOTSTRAP_FILE,
    ORM_BOOTSTRAP_FILE,
};
use crate::manifest::{deployed_manifest, has_helpers, read_app_manifest, write_manifest, MANIFEST_FILE};
use crate::process::ProcessRunner;
use crate::transpile::{transpile_tree, Transpiler};

/// Per-run switches
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployOptions {
    pub target: DeployTarget,
    pub layout: OutputLayout,
    /// Stop after writing the output tree
    pub skip_deps: bool,
    /// Install dependencies but do not deploy
    pub no_deploy: bool,
}

/// What a completed run produced
#[derive(Debug, Clone, PartialEq)]
pub struct DeployReport {
    pub functions: Vec<String>,
    pub collisions: Vec<Collision>,
    pub descriptor: PathBuf,
    pub installed: bool,
    pub deployed: bool,
}

/// Full deploy run over one app configuration
pub struct Pipeline<'a> {
    app: &'a AppConfig,
    transpiler: &'a dyn Transpiler,
    runner: &'a dyn ProcessRunner,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        app: &'a AppConfig,
        transpiler: &'a dyn Transpiler,
        runner: &'a dyn ProcessRunner,
    ) -> Self {
        Self {
            app,
            transpiler,
            runner,
        }
    }

    /// Preconditions checked before anything is written.
    ///
    /// Returns the app's dependency manifest.
    pub fn check(&self, root: &Path) -> Result<Map<String, Value>, DeployError> {
        if self.app.serverless.require_prod && !self.app.is_production() {
            return Err(DeployError::NotInProduction);
        }
        read_app_manifest(root)
    }

    /// A job target must name an existing `jobs/<name>/job.js`.
    pub fn check_target(&self, target: &DeployTarget, root: &Path) -> Result<(), DeployError> {
        if let Some(name) = target.job() {
            let entry = root.join(JOBS_DIR).join(name).join(JOB_ENTRY_FILE);
            if !entry.is_file() {
                return Err(DeployError::BadArgs(format!(
                    "Job `{name}` not found: {} does not exist",
                    entry.display()
                )));
            }
        }
        Ok(())
    }

    fn support(&self, root: &Path) -> anyhow::Result<HandlerSupport> {
        Ok(HandlerSupport {
            helpers: has_helpers(root)?,
            orm: self.app.serverless.orm,
        })
    }

    /// Assemble a target. Authorizers are listed under `authorizer_root`.
    fn assemble(
        &self,
        target: &DeployTarget,
        root: &Path,
        authorizer_root: &Path,
        support: HandlerSupport,
    ) -> anyhow::Result<(Assembly, Option<JobSpec>)> {
        if let Some(name) = target.job() {
            let job_dir = root.join(JOBS_DIR).join(name);
            let config = load_job_config(&job_dir)?;
            let job = JobSpec::new(name, config).map_err(|err| DeployError::Config {
                file: job_dir.clone(),
                message: err.to_string(),
            })?;
            let assembly = assemble_job(&job, support)?;
            return Ok((assembly, Some(job)));
        }

        let assembler = Assembler::new(self.app, support).scoped_to(target.controller());
        let mut assembly = assembler.assemble(&self.app.routes)?;
        let authorizers = list_authorizers(authorizer_root)?;
        assembler.add_authorizers(&mut assembly, &authorizers)?;
        Ok((assembly, None))
    }

    /// Assemble a target from the source tree without writing anything.
    pub fn plan(&self, target: &DeployTarget, root: &Path) -> anyhow::Result<Assembly> {
        self.check_target(target, root)?;
        let support = self.support(root)?;
        let (assembly, _) = self.assemble(target, root, root, support)?;
        Ok(assembly)
    }

    /// Run every step, in order. Aborts on the first failure and leaves
    /// whatever was already written in place.
    pub fn run(&self, options: &DeployOptions) -> anyhow::Result<DeployReport> {
        let layout = &options.layout;
        let target = &options.target;
        let manifest = self.check(&layout.root)?;
        self.check_target(target, &layout.root)?;

        let extra = target.source_paths();
        let serverless = &self.app.serverless;
        let sources: Vec<String> = serverless
            .include_paths()
            .into_iter()
            .chain(serverless.transpile_paths())
            .chain(extra.iter().cloned())
            .collect();
        layout.check_output(&sources)?;

        info!(output = %layout.output.display(), "Cleaning up previous deployments");
        layout.reset_output()?;

        info!("Copying deployment files");
        let keep = &self.app.serverless.keep_framework_deps;
        write_manifest(
            &layout.output_path(MANIFEST_FILE),
            &deployed_manifest(&manifest, keep),
        )?;

        for path in self.app.serverless.include_paths().iter().chain(&extra) {
            layout.include(path)?;
        }

        info!("Transpiling code");
        for path in self.app.serverless.transpile_paths().iter().chain(&extra) {
            let count = transpile_tree(&layout.output_path(path), self.transpiler)?;
            info!(path = %path, files = count, "Transpiled");
        }

        let support = self.support(&layout.root)?;
        let (assembly, job) = self.assemble(target, &layout.root, &layout.output, support)?;
        for (path, content) in assembly.files.iter() {
            layout.write(path, content)?;
        }
        if job.is_none() {
            layout.write(RESOURCES_FILE, &serde_json::to_string(&assembly.resources)?)?;
        }

        let mut layers = DescriptorLayers::load(&layout.root, self.app)?;
        if let Some(job) = &job {
            layers = layers.with_job_override(job.serverless_yml.clone());
        }
        let mut descriptor = layers.build(&assembly.functions)?;
        if let Some(suffix) = target.service_suffix() {
            append_service_suffix(&mut descriptor, &suffix);
        }
        let descriptor_path = layout.write(DESCRIPTOR_FILE, &render_descriptor(&descriptor)?)?;
        info!(
            path = %descriptor_path.display(),
            functions = assembly.functions.len(),
            "Wrote deployment descriptor"
        );

        if support.orm {
            let models = self.app.deployed_models();
            layout.write(
                ORM_BOOTSTRAP_FILE,
                &render_orm_bootstrap(&models, &self.app.datastores)?,
            )?;
        }
        if support.helpers {
            layout.write(HELPERS_BOOTSTRAP_FILE, &render_helpers_bootstrap()?)?;
        }

        let mut report = DeployReport {
            functions: assembly.functions.keys().cloned().collect(),
            collisions: assembly.collisions,
            descriptor: descriptor_path,
            installed: false,
            deployed: false,
        };

        if options.skip_deps {
            info!("Done");
            return Ok(report);
        }

        info!("Installing dependencies");
        let install = self.app.serverless.install();
        let outcome = self
            .runner
            .run(&install, &[], &layout.output)
            .map_err(|err| DeployError::Install(format!("{err:#}")))?;
        if !outcome.is_success() {
            return Err(DeployError::Install(exit_message(&install.command, outcome.code)).into());
        }
        report.installed = true;

        if options.no_deploy {
            info!("Done");
            return Ok(report);
        }

        info!("Starting deployment");
        let deploy = self.app.serverless.deploy();
        let outcome = self
            .runner
            .run(&deploy, &target.deploy_args(), &layout.output)
            .map_err(|err| DeployError::Deploy(format!("{err:#}")))?;
        if !outcome.is_success() {
            return Err(DeployError::Deploy(exit_message(&deploy.command, outcome.code)).into());
        }
        report.deployed = true;

        info!("Done");
        Ok(report)
    }
}

fn exit_message(command: &str, code: Option<i32>) -> String {
    match code {
        Some(code) => format!("`{command}` exited with status {code}"),
        None => format!("`{command}` was terminated by a signal"),
    }
}
