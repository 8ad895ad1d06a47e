use askama::Template;
use serde_json::{Map, Value};

use super::plan::{BootstrapStep, CorsLiteral, HandlerOption, HandlerPlan, TeardownStep};

/// Template data for one handler module
#[derive(Template)]
#[template(path = "handler.js.txt", escape = "none")]
pub struct HandlerTemplateData {
    pub target: String,
    /// Rendered JS expressions
    pub bootstrap: Vec<String>,
    /// Rendered JS expressions
    pub teardown: Vec<String>,
    pub cors: String,
    /// Rendered `key: value` pairs
    pub options: Vec<String>,
}

/// Template data for the ORM bootstrap
#[derive(Template)]
#[template(path = "initialize-orm.js.txt", escape = "none")]
pub struct OrmBootstrapTemplateData {
    /// JSON object literal
    pub models_config: String,
    /// JSON object literal
    pub datastores_config: String,
}

/// Template for the helpers bootstrap
#[derive(Template)]
#[template(path = "initialize-helpers.js.txt", escape = "none")]
pub struct HelpersBootstrapTemplate;

fn js_string(s: &str) -> String {
    format!("'{}'", s.replace('\\', "\\\\").replace('\'', "\\'"))
}

impl BootstrapStep {
    fn to_js(&self) -> String {
        match self {
            BootstrapStep::Helpers(path) | BootstrapStep::Orm(path) => {
                format!("require({})", js_string(path))
            }
        }
    }
}

impl TeardownStep {
    fn to_js(self) -> String {
        match self {
            TeardownStep::Orm => "(cb) => { sails.hooks.orm.teardown(cb); }".to_string(),
        }
    }
}

impl CorsLiteral {
    fn to_js(&self) -> anyhow::Result<String> {
        Ok(match self {
            CorsLiteral::Off => "false".to_string(),
            CorsLiteral::On => "true".to_string(),
            CorsLiteral::Empty => "{}".to_string(),
            CorsLiteral::Policy(policy) => serde_json::to_string(policy)?,
        })
    }
}

impl HandlerOption {
    fn to_js(&self) -> String {
        match self {
            HandlerOption::NoEnvelope => "noEnvelope: true".to_string(),
            HandlerOption::EventType(kind) => format!("eventType: {}", js_string(kind)),
        }
    }
}

impl HandlerPlan {
    /// Render the handler module source
    pub fn render(&self) -> anyhow::Result<String> {
        let rendered = HandlerTemplateData {
            target: self.target.replace('\'', "\\'"),
            bootstrap: self.bootstrap.iter().map(BootstrapStep::to_js).collect(),
            teardown: self.teardown.iter().map(|step| step.to_js()).collect(),
            cors: self.cors.to_js()?,
            options: self.options.iter().map(HandlerOption::to_js).collect(),
        }
        .render()?;
        Ok(rendered)
    }
}

/// Render `initialize-orm.js` with the deployed models and datastores settings
pub fn render_orm_bootstrap(
    models: &Map<String, Value>,
    datastores: &Map<String, Value>,
) -> anyhow::Result<String> {
    let rendered = OrmBootstrapTemplateData {
        models_config: serde_json::to_string(models)?,
        datastores_config: serde_json::to_string(datastores)?,
    }
    .render()?;
    Ok(rendered)
}

/// Render `initialize-helpers.js`
pub fn render_helpers_bootstrap() -> anyhow::Result<String> {
    Ok(HelpersBootstrapTemplate.render()?)
}
