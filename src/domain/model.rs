use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Prefix marking a dependency string as a local jar rather than a registry coordinate.
pub const FILE_DEPENDENCY_PREFIX: &str = "file://";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Registry {
    Maven,
}

/// Identity used to deduplicate registry coordinates. The version is not part of it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CoordinateKey {
    pub registry: Registry,
    pub group: String,
    pub artifact: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum DependencyCoordinate {
    Registry {
        registry: Registry,
        group: String,
        artifact: String,
        /// Version plus any trailing classifier segments, e.g. `1.0.0:sources`.
        version: String,
    },
    LocalFile {
        relative_path: String,
    },
}

impl DependencyCoordinate {
    pub fn maven(group: &str, artifact: &str, version: &str) -> Self {
        Self::Registry {
            registry: Registry::Maven,
            group: group.to_string(),
            artifact: artifact.to_string(),
            version: version.to_string(),
        }
    }

    pub fn local_file(relative_path: impl Into<String>) -> Self {
        Self::LocalFile {
            relative_path: relative_path.into(),
        }
    }

    /// `None` for local files, which never take part in deduplication.
    pub fn key(&self) -> Option<CoordinateKey> {
        match self {
            Self::Registry {
                registry,
                group,
                artifact,
                ..
            } => Some(CoordinateKey {
                registry: *registry,
                group: group.clone(),
                artifact: artifact.clone(),
            }),
            Self::LocalFile { .. } => None,
        }
    }

    pub fn is_local_file(&self) -> bool {
        matches!(self, Self::LocalFile { .. })
    }

    /// Renders the coordinate in Gradle's dependency syntax.
    pub fn to_gradle(&self) -> String {
        match self {
            Self::Registry {
                group,
                artifact,
                version,
                ..
            } => format!("implementation \"{}:{}:{}\"", group, artifact, version),
            Self::LocalFile { relative_path } => {
                format!("implementation files(\"{}\")", relative_path)
            }
        }
    }
}

impl fmt::Display for DependencyCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Registry {
                group,
                artifact,
                version,
                ..
            } => write!(f, "{}:{}:{}", group, artifact, version),
            Self::LocalFile { relative_path } => {
                write!(f, "{}{}", FILE_DEPENDENCY_PREFIX, relative_path)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileKind {
    Regular,
    Executable,
}

/// A file copied from the samples directory into a generated project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSpec {
    pub source_path: PathBuf,
    pub destination_relative_path: String,
    pub kind: FileKind,
}

/// Deferred work recorded during construction and executed later by the runner.
/// All paths are relative to the project directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum GenerationStep {
    EnsureDirectory {
        path: String,
    },
    CopyIfAbsent {
        source: String,
        dest: String,
        executable: bool,
    },
    InvokeExternalBuild {
        program: String,
        args: Vec<String>,
    },
}

impl fmt::Display for GenerationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EnsureDirectory { path } => write!(f, "mkdir -p {}", path),
            Self::CopyIfAbsent { source, dest, .. } => {
                write!(f, "if [ ! -f {dest} ]; then cp {source} {dest}; fi")
            }
            Self::InvokeExternalBuild { program, args } => {
                write!(f, "{}", program)?;
                for arg in args {
                    write!(f, " {}", arg)?;
                }
                Ok(())
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilePolicy {
    /// Rewritten on every synthesis.
    Generated,
    /// Written once; user edits are kept.
    Sample,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub path: String,
    pub contents: String,
    pub policy: FilePolicy,
}
