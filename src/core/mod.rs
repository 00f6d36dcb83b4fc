pub mod context;
pub mod dependencies;
pub mod descriptor;
pub mod runner;
pub mod staging;
pub mod synth;
pub mod unit;
pub mod workspace;

pub use crate::domain::model::{DependencyCoordinate, FileSpec, GeneratedFile, GenerationStep};
pub use crate::domain::ports::Storage;
pub use crate::utils::error::Result;
