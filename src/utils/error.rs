use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScaffoldError {
    #[error("Invalid dependency coordinate '{coordinate}': {reason}")]
    InvalidCoordinateFormat { coordinate: String, reason: String },

    #[error("External build '{command}' failed for project '{project}': {status}")]
    ExternalBuildFailure {
        command: String,
        project: String,
        status: String,
    },

    #[error("Dependency cycle detected: {}", .cycle.join(" -> "))]
    DependencyCycle { cycle: Vec<String> },

    #[error("Model '{referenced_by}' depends on unknown model '{name}'")]
    UnknownModel { name: String, referenced_by: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Declaration,
    Configuration,
    Generation,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl ScaffoldError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ScaffoldError::InvalidCoordinateFormat { .. }
            | ScaffoldError::DependencyCycle { .. }
            | ScaffoldError::UnknownModel { .. } => ErrorCategory::Declaration,
            ScaffoldError::ConfigValidationError { .. }
            | ScaffoldError::InvalidConfigValueError { .. }
            | ScaffoldError::MissingConfigError { .. } => ErrorCategory::Configuration,
            ScaffoldError::ExternalBuildFailure { .. } => ErrorCategory::Generation,
            ScaffoldError::IoError(_) | ScaffoldError::SerializationError(_) => {
                ErrorCategory::System
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Declaration | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Generation => ErrorSeverity::Medium,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            ScaffoldError::InvalidCoordinateFormat { .. } => {
                "Use 'group:artifact:version' or 'file://<path>' for dependencies".to_string()
            }
            ScaffoldError::ExternalBuildFailure { .. } => {
                "Inspect the Gradle output above, fix the model and re-run generation".to_string()
            }
            ScaffoldError::DependencyCycle { .. } => {
                "Remove one of the depends_on entries that form the cycle".to_string()
            }
            ScaffoldError::UnknownModel { name, .. } => {
                format!("Declare a model named '{}' or fix the depends_on entry", name)
            }
            ScaffoldError::ConfigValidationError { field, .. }
            | ScaffoldError::InvalidConfigValueError { field, .. }
            | ScaffoldError::MissingConfigError { field } => {
                format!("Check the '{}' setting in the configuration file", field)
            }
            ScaffoldError::IoError(_) => {
                "Check that the output directories exist and are writable".to_string()
            }
            ScaffoldError::SerializationError(_) => {
                "Check the smithy_build overrides for values that cannot be serialized".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Declaration => format!("Invalid model declaration: {}", self),
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::Generation => format!("Generation failed: {}", self),
            ErrorCategory::System => format!("System error: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, ScaffoldError>;
