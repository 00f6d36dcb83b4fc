//! Deduplicated dependency declarations for a Smithy model project.
//!
//! Required Smithy artifacts are always present unless the user declares the same
//! `group:artifact` with another version, in which case the user's declaration wins.
//! Required artifacts come first in every view; user declarations follow in the
//! order they were first declared.

use crate::domain::model::{DependencyCoordinate, FILE_DEPENDENCY_PREFIX};
use crate::utils::error::{Result, ScaffoldError};

pub const REQUIRED_SMITHY_GROUP: &str = "software.amazon.smithy";
pub const REQUIRED_SMITHY_ARTIFACTS: [&str; 4] = [
    "smithy-cli",
    "smithy-model",
    "smithy-openapi",
    "smithy-aws-traits",
];
pub const REQUIRED_SMITHY_VERSION: &str = "1.28.0";

/// Parses `group:artifact:version[:classifier...]` or `file://<path>`.
///
/// Segments after the version are kept verbatim; only group and artifact form the
/// deduplication key.
pub fn parse_coordinate(raw: &str) -> Result<DependencyCoordinate> {
    let invalid = |reason: &str| ScaffoldError::InvalidCoordinateFormat {
        coordinate: raw.to_string(),
        reason: reason.to_string(),
    };

    if let Some(path) = raw.strip_prefix(FILE_DEPENDENCY_PREFIX) {
        if path.trim().is_empty() {
            return Err(invalid("file dependency has no path"));
        }
        return Ok(DependencyCoordinate::local_file(path));
    }

    let segments: Vec<&str> = raw.split(':').map(str::trim).collect();
    match segments.as_slice() {
        [group, artifact, rest @ ..] if !rest.is_empty() => {
            if group.is_empty() {
                return Err(invalid("missing group segment"));
            }
            if artifact.is_empty() {
                return Err(invalid("missing artifact segment"));
            }
            if rest.iter().any(|segment| segment.is_empty()) {
                return Err(invalid("empty version or classifier segment"));
            }
            Ok(DependencyCoordinate::maven(group, artifact, &rest.join(":")))
        }
        _ => Err(invalid("expected 'group:artifact:version'")),
    }
}

#[derive(Debug, Clone)]
pub struct DependencyDeclarationSet {
    required: Vec<DependencyCoordinate>,
    declared: Vec<DependencyCoordinate>,
}

impl Default for DependencyDeclarationSet {
    fn default() -> Self {
        Self::new()
    }
}

impl DependencyDeclarationSet {
    /// Starts with the required Smithy artifacts at [`REQUIRED_SMITHY_VERSION`].
    pub fn new() -> Self {
        let required = REQUIRED_SMITHY_ARTIFACTS
            .iter()
            .map(|artifact| {
                DependencyCoordinate::maven(REQUIRED_SMITHY_GROUP, artifact, REQUIRED_SMITHY_VERSION)
            })
            .collect();
        Self {
            required,
            declared: Vec::new(),
        }
    }

    pub fn add<I>(&mut self, coordinates: I)
    where
        I: IntoIterator<Item = DependencyCoordinate>,
    {
        for coordinate in coordinates {
            let Some(key) = coordinate.key() else {
                tracing::debug!("Adding local dependency {}", coordinate);
                self.declared.push(coordinate);
                continue;
            };

            match self
                .declared
                .iter_mut()
                .find(|existing| existing.key().as_ref() == Some(&key))
            {
                Some(existing) => {
                    tracing::debug!("Replacing dependency {} with {}", existing, coordinate);
                    *existing = coordinate;
                }
                None => self.declared.push(coordinate),
            }
        }
    }

    /// Parses every entry before adding any, so a bad string leaves the set untouched.
    pub fn add_strs<S: AsRef<str>>(&mut self, raw: &[S]) -> Result<()> {
        let parsed = raw
            .iter()
            .map(|s| parse_coordinate(s.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        self.add(parsed);
        Ok(())
    }

    /// Effective coordinates: required ones not overridden, then declared ones.
    pub fn coordinates(&self) -> Vec<&DependencyCoordinate> {
        let overridden: Vec<_> = self.declared.iter().filter_map(|c| c.key()).collect();
        self.required
            .iter()
            .filter(|req| req.key().is_some_and(|key| !overridden.contains(&key)))
            .chain(self.declared.iter())
            .collect()
    }

    /// `group:artifact:version` for every registry coordinate; local files are left out.
    pub fn remote_manifest(&self) -> Vec<String> {
        self.coordinates()
            .into_iter()
            .filter(|c| !c.is_local_file())
            .map(ToString::to_string)
            .collect()
    }

    /// Every coordinate, local files included, as Gradle dependency lines.
    pub fn build_file_manifest(&self) -> Vec<String> {
        self.coordinates()
            .into_iter()
            .map(DependencyCoordinate::to_gradle)
            .collect()
    }

    pub fn local_files(&self) -> Vec<&DependencyCoordinate> {
        self.declared.iter().filter(|c| c.is_local_file()).collect()
    }
}
