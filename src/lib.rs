pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::storage::LocalStorage;
pub use config::toml_config::ScaffoldConfig;
pub use crate::core::{
    context::ProjectContext,
    runner::GenerationRunner,
    synth::Synthesizer,
    unit::{ModelDefinitionUnit, ServiceIdentity, SmithyModelOptions},
    workspace::Workspace,
};
pub use utils::error::{Result, ScaffoldError};
