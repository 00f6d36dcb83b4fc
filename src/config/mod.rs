pub mod toml_config;

#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "smithy-scaffold")]
#[command(about = "Scaffolds Gradle projects that build OpenAPI specifications from Smithy models")]
pub struct CliConfig {
    /// Path to the scaffold TOML configuration
    #[arg(short, long, default_value = "scaffold.toml")]
    pub config: String,

    /// Override workspace.root from the configuration
    #[arg(long)]
    pub root: Option<String>,

    /// Show what would be written without touching disk
    #[arg(long)]
    pub dry_run: bool,

    /// Run the generation steps (wrapper staging and Gradle build) after synthesis
    #[arg(long)]
    pub generate: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub log_json: bool,
}
