//! # CLI Module
//!
//! Command-line interface for the `lambdaforge` binary.
//!
//! ## Commands
//!
//! ### `deploy`
//!
//! Build the deployment tree, install its dependencies and deploy it:
//!
//! ```bash
//! lambdaforge deploy --all
//! lambdaforge deploy -c user --prod
//! lambdaforge deploy -f userFind --skipdeps
//! lambdaforge deploy -j nightly-report --nodeploy
//! ```
//!
//! Exactly one of `--all`, `-c`, `-f` or `-j` must be given.
//!
//! Options:
//! - `--root <DIR>` - Application root (default: `.`)
//! - `--output <DIR>` - Deployment tree (default: `<root>/serverless`)
//! - `--config <FILE>` - App config (default: `<root>/config/app.yaml`)
//! - `--prod` - Use the production environment
//! - `--skipdeps` - Stop after writing the tree
//! - `--nodeploy` - Install dependencies but do not deploy
//!
//! ### `inspect`
//!
//! Print the functions, resource map and collisions for a target as JSON,
//! without touching the filesystem:
//!
//! ```bash
//! lambdaforge inspect --all
//! ```
//!
//! ## Environment
//!
//! - `NODE_ENV` - environment name when `--prod` is not given
//! - `LAMBDAFORGE_NPM_BIN`, `LAMBDAFORGE_SERVERLESS_BIN` - replace the
//!   install and deploy binaries

mod commands;


pub use commands::{find_app_config, run_cli, Cli, Commands, TargetArgs};
