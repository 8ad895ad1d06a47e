//! # Pipeline Module
//!
//! Orchestrates a deploy run from the app root to the hosting platform.
//!
//! ## Steps
//!
//! 1. Check preconditions (`requireProd`, framework dependency in `package.json`,
//!    the job's `job.js`, an output folder clear of the app's sources)
//! 2. Remove and recreate the output folder (`<root>/serverless` by default)
//! 3. Write the deployed `package.json`
//! 4. Copy include paths into the output
//! 5. Transpile the transpile paths in place
//! 6. Assemble functions, write handler modules and `resources.json`
//! 7. Layer and write `serverless.yml`
//! 8. Write the ORM and helpers bootstrap files when needed
//! 9. Install dependencies, then deploy
//!
//! Steps run strictly in order on the calling thread. External tools are
//! reached through the [`Transpiler`](crate::transpile::Transpiler) and
//! [`ProcessRunner`](crate::process::ProcessRunner) traits.

mod layout;
mod run;
mod target;


pub use layout::{copy_tree, OutputLayout, DESCRIPTOR_FILE, OUTPUT_DIR, RESOURCES_FILE};
pub use run::{DeployOptions, DeployReport, Pipeline};
pub use target::DeployTarget;
