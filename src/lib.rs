//! # lambdaforge
//!
//! **lambdaforge** compiles a web application's route table into a
//! function-per-route serverless deployment tree, then hands it to the
//! platform's deploy tool.
//!
//! ## Overview
//!
//! Given an app root with `config/app.yaml` and a `package.json`, a deploy run
//! produces `<root>/serverless/` containing:
//!
//! - one handler module per route under `functions/`
//! - `serverless.yml`, the layered deployment descriptor
//! - `resources.json`, mapping translated paths back to the original routes
//! - a `package.json` stripped of the web framework
//!
//! ## Architecture
//!
//! - **[`route`]** - Address parsing, path translation and function naming
//! - **[`descriptor`]** - Typed function, trigger, CORS and authorizer records
//! - **[`assemble`]** - Folds the route table into functions and handler files
//! - **[`handler`]** - Handler module IR and its askama templates
//! - **[`config`]** - App config loading and descriptor layering
//! - **[`manifest`]** - `package.json` rewriting and app-root detection
//! - **[`transpile`]** / **[`process`]** - External tools behind traits
//! - **[`pipeline`]** - The ordered deploy run
//! - **[`cli`]** - The `lambdaforge` command line
//!
//! ### Compilation Flow
//!
//! ```text
//! "GET /users/:id": user/find
//!   └─ route::parse_address      → get, /users/:id
//!      └─ route::translate_path  → /users/{id}, [id]
//!         └─ assemble::Assembler → userFind { handler, events: [http] }
//!            └─ config::DescriptorLayers::build → serverless.yml
//! ```
//!
//! ## Usage from Code
//!
//! ```rust,ignore
//! use lambdaforge::assemble::Assembler;
//! use lambdaforge::config::load_app_config;
//! use lambdaforge::handler::HandlerSupport;
//!
//! let app = load_app_config("config/app.yaml".as_ref())?;
//! let assembly = Assembler::new(&app, HandlerSupport::default()).assemble(&app.routes)?;
//! for (name, function) in assembly.functions.iter() {
//!     println!("{name} → {}", function.handler);
//! }
//! ```

pub mod assemble;
pub mod cli;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod handler;
pub mod logging;
pub mod manifest;
pub mod pipeline;
pub mod process;
pub mod route;
pub mod transpile;

pub use assemble::{Assembler, Assembly};
pub use config::AppConfig;
pub use error::DeployError;
pub use pipeline::{DeployOptions, DeployTarget, Pipeline};
