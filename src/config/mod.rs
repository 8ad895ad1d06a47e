//! # Config Module
//!
//! Loads the application configuration and layers the deployment descriptor.
//!
//! ## Descriptor Layering
//!
//! The final `serverless.yml` is a deep merge of, in increasing precedence:
//!
//! 1. Built-in defaults ([`default_descriptor`])
//! 2. `config/serverless.yml`
//! 3. `config/serverless-<environment>.yml`
//! 4. The app config's inline `serverless.yml` override
//! 5. A job's `serverlessYml` override (job deploys only)
//! 6. The generated `functions` map
//!
//! Mappings merge recursively; sequences and scalars from a higher layer
//! replace lower ones. Both descriptor files are rendered as `minijinja`
//! templates before parsing, so they can reference app settings:
//!
//! ```yaml
//! provider:
//!   stage: {{ environment }}
//!   region: {{ config.custom.region }}
//! ```
//!
//! A descriptor file that does not exist is an empty layer. Any other read
//! or parse failure aborts the run with [`DeployError::Config`](crate::error::DeployError).

mod app;
mod layers;
mod load;
mod merge;


pub use app::{
    AppConfig, CommandConfig, GlobalCors, SecurityConfig, ServerlessConfig, DEFAULT_INCLUDE,
    DEFAULT_TRANSPILE, PRODUCTION,
};
pub use layers::{
    append_service_suffix, base_descriptor_path, default_descriptor, env_descriptor_path,
    load_descriptor_file, render_descriptor, DescriptorLayers,
};
pub use load::{load_app_config, load_job_config, read_optional, ConfigFormat};
pub use merge::{deep_merge, merge_layers};
