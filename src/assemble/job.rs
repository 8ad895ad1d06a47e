use serde::Deserialize;
use serde_json::Value;

use crate::descriptor::{FunctionDescriptor, ScheduleTrigger, Trigger};
use crate::handler::{CorsLiteral, HandlerOption, HandlerPlan, HandlerSupport};

use super::Assembly;

/// Schedule used when a job does not set one
pub const DEFAULT_SCHEDULE: &str = "rate(1 minute)";

/// Folder holding one subfolder per job, relative to the app root
pub const JOBS_DIR: &str = "jobs";

/// Module each job folder must provide
pub const JOB_ENTRY_FILE: &str = "job.js";

/// Name of the single function a job deploy produces
pub const JOB_FUNCTION: &str = "job";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JobConfig {
    schedule: Option<String>,
    #[serde(default)]
    serverless_yml: serde_yaml::Value,
}

/// A scheduled job living in `jobs/<name>/`
#[derive(Debug, Clone, PartialEq)]
pub struct JobSpec {
    pub name: String,
    pub schedule: String,
    /// Descriptor override layered above the app-level one
    pub serverless_yml: serde_yaml::Value,
}

impl JobSpec {
    /// Build from the job's optional `config` document.
    pub fn new(name: impl Into<String>, config: Option<Value>) -> Result<Self, serde_json::Error> {
        let config: JobConfig = match config {
            Some(Value::Null) | None => JobConfig::default(),
            Some(value) => serde_json::from_value(value)?,
        };
        Ok(Self {
            name: name.into(),
            schedule: config
                .schedule
                .unwrap_or_else(|| DEFAULT_SCHEDULE.to_string()),
            serverless_yml: config.serverless_yml,
        })
    }

    /// Source folder, relative to the app root
    pub fn dir(&self) -> String {
        format!("{JOBS_DIR}/{}", self.name)
    }
}

/// Assemble the single scheduled function for a job.
pub fn assemble_job(job: &JobSpec, support: HandlerSupport) -> anyhow::Result<Assembly> {
    let mut assembly = Assembly::default();
    let handler_file = format!("functions/{JOB_FUNCTION}.js");
    let target_file = format!("{}/{JOB_ENTRY_FILE}", job.dir());

    assembly.functions.insert(
        JOB_FUNCTION.to_string(),
        FunctionDescriptor {
            handler: format!("functions/{JOB_FUNCTION}.fn"),
            trigger: Some(Trigger::Schedule(ScheduleTrigger {
                schedule_expression: job.schedule.clone(),
            })),
        },
    );

    let source = HandlerPlan::new(&handler_file, &target_file, support, CorsLiteral::Empty)
        .with_option(HandlerOption::EventType("generic".to_string()))
        .render()?;
    assembly.files.insert(handler_file, source);

    Ok(assembly)
}
