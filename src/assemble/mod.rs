//! # Assemble Module
//!
//! Folds the route table into deployable functions.
//!
//! For every route that names an action, the assembler:
//!
//! 1. parses and translates the address ([`crate::route`])
//! 2. records the translated key in the [`ResourceMap`]
//! 3. builds a [`FunctionDescriptor`] named after the camel-cased action,
//!    with an HTTP trigger carrying path parameters, CORS and authorizer
//! 4. renders the handler module for `functions/<action>.js`
//!
//! Authorizer files found in the output tree are added afterwards as bare
//! functions. Job deploys bypass the route table entirely and produce one
//! scheduled function (see [`assemble_job`]).
//!
//! The fold itself does no I/O; callers list authorizers with
//! [`list_authorizers`] and write [`Assembly::files`] to disk.

mod authorizers;
mod cors;
mod job;
mod resources;
mod target;


use indexmap::IndexMap;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::config::{AppConfig, GlobalCors};
use crate::descriptor::{AuthorizerRef, FunctionDescriptor, FunctionSet, HttpTrigger, Trigger};
use crate::handler::{CorsLiteral, HandlerOption, HandlerPlan, HandlerSupport};
use crate::route::{camel_case, parse_address, translate_path};

pub use authorizers::{list_authorizers, AUTHORIZERS_DIR};
pub use cors::{resolve_cors, split_headers};
pub use job::{assemble_job, JobSpec, DEFAULT_SCHEDULE, JOBS_DIR, JOB_ENTRY_FILE, JOB_FUNCTION};
pub use resources::{Collision, ResourceEntry, ResourceMap};
pub use target::{AuthorizerSetting, CorsOverride, CorsSetting, RouteTarget};

/// Result of assembling one deploy target
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Assembly {
    pub functions: FunctionSet,
    pub resources: ResourceMap,
    /// Generated handler sources keyed by output-relative path
    pub files: IndexMap<String, String>,
    /// Resource keys that more than one route translated to
    pub collisions: Vec<Collision>,
}

/// Route table → functions, bound to one app configuration
#[derive(Debug, Clone)]
pub struct Assembler<'a> {
    cors: &'a GlobalCors,
    default_authorizer: Option<&'a str>,
    controller: Option<&'a str>,
    support: HandlerSupport,
}

impl<'a> Assembler<'a> {
    pub fn new(app: &'a AppConfig, support: HandlerSupport) -> Self {
        Self {
            cors: &app.security.cors,
            default_authorizer: app.serverless.default_authorizer.as_deref(),
            controller: None,
            support,
        }
    }

    /// Only keep routes whose action lives in `controller`
    pub fn scoped_to(mut self, controller: Option<&'a str>) -> Self {
        self.controller = controller;
        self
    }

    /// Fold a route table, in order, into an [`Assembly`].
    pub fn assemble(&self, routes: &Map<String, Value>) -> anyhow::Result<Assembly> {
        let mut assembly = Assembly::default();
        for (address, value) in routes {
            self.add_route(&mut assembly, address, value)?;
        }
        for collision in &assembly.collisions {
            warn!(
                key = %collision.key,
                previous = %collision.previous_address,
                address = %collision.address,
                "Two routes map to the same resource; the later one wins"
            );
        }
        Ok(assembly)
    }

    fn add_route(&self, assembly: &mut Assembly, address: &str, value: &Value) -> anyhow::Result<()> {
        let Some(target) = RouteTarget::from_value(value) else {
            debug!(address, "Skipping route without an action");
            return Ok(());
        };
        if let Some(controller) = self.controller {
            if !target.action.starts_with(&format!("{controller}/")) {
                return Ok(());
            }
        }

        let parsed = parse_address(address);
        let translated = translate_path(&parsed.path);
        let verb = parsed.verb_str();

        let key = ResourceMap::key(verb, &translated.path);
        let entry = ResourceEntry {
            address: address.to_string(),
            target: value.clone(),
        };
        if let Some(collision) = assembly.resources.record(key, entry) {
            assembly.collisions.push(collision);
        }

        let name = camel_case(&target.action);
        let cors = resolve_cors(&target.cors, self.cors);
        let authorizer = self.authorizer_for(&target).map(AuthorizerRef::request);

        let handler_file = format!("functions/{}.js", target.action);
        let target_file = format!("api/controllers/{}.js", target.action);
        let cors_literal = cors
            .clone()
            .map(CorsLiteral::Policy)
            .unwrap_or(CorsLiteral::Off);
        let source =
            HandlerPlan::new(&handler_file, &target_file, self.support, cors_literal).render()?;

        debug!(function = %name, path = %translated.path, method = verb, "Assembled route");
        assembly.functions.insert(
            name,
            FunctionDescriptor {
                handler: format!("functions/{}.fn", target.action),
                trigger: Some(Trigger::Http(HttpTrigger {
                    path: translated.path,
                    method: verb.to_string(),
                    path_parameters: translated.params,
                    cors,
                    authorizer,
                })),
            },
        );
        assembly.files.insert(handler_file, source);
        Ok(())
    }

    fn authorizer_for(&self, target: &RouteTarget) -> Option<String> {
        let name = match &target.authorizer {
            AuthorizerSetting::Disabled => return None,
            AuthorizerSetting::Named(name) => name.as_str(),
            AuthorizerSetting::Default => self.default_authorizer.filter(|n| !n.is_empty())?,
        };
        Some(camel_case(&format!("authorizers {name}")))
    }

    /// Add one bare function per authorizer file.
    ///
    /// `files` are output-relative paths as returned by [`list_authorizers`].
    pub fn add_authorizers(&self, assembly: &mut Assembly, files: &[String]) -> anyhow::Result<()> {
        for file in files {
            let basename = file.rsplit('/').next().unwrap_or(file);
            let handler_file = format!("functions/authorizers/{basename}");
            let action = format!(
                "authorizers/{}",
                basename.strip_suffix(".js").unwrap_or(basename)
            );
            let name = camel_case(&action);

            let source = HandlerPlan::new(&handler_file, file, self.support, CorsLiteral::On)
                .with_option(HandlerOption::NoEnvelope)
                .render()?;

            debug!(function = %name, source = %file, "Assembled authorizer");
            assembly.functions.insert(
                name,
                FunctionDescriptor {
                    handler: format!("functions/{action}.fn"),
                    trigger: None,
                },
            );
            assembly.files.insert(handler_file, source);
        }
        Ok(())
    }
}
