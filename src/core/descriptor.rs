//! `smithy-build.json` and `build.gradle` rendering.
//!
//! The descriptor is merged in a fixed order, later layers winning:
//!
//! 1. baseline (`version`, the `openapi` projection with `tags: true`)
//! 2. user overrides, deep-merged key by key
//! 3. `maven.dependencies` and `maven.repositories`, always derived from the
//!    dependency set and repository list so no required artifact is dropped
//!
//! `maven` entries written under overrides are folded into the dependency set first,
//! see [`SmithyBuildOptions::normalized`].

use crate::core::dependencies::DependencyDeclarationSet;
use crate::utils::error::{Result, ScaffoldError};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

pub const SMITHY_BUILD_VERSION: &str = "2.0";
pub const SMITHY_GRADLE_PLUGIN_VERSION: &str = "0.6.0";
pub const DEFAULT_REPOSITORY_URLS: [&str; 2] = [
    "https://repo.maven.apache.org/maven2/",
    "file://~/.m2/repository",
];

/// User-facing knobs for the descriptor, as they appear in configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SmithyBuildOptions {
    #[serde(default)]
    pub dependencies: Vec<String>,
    /// Replaces [`DEFAULT_REPOSITORY_URLS`] entirely when set.
    pub repository_urls: Option<Vec<String>>,
    /// Arbitrary `smithy-build.json` fields merged over the baseline.
    #[serde(default)]
    pub overrides: Map<String, Value>,
}

impl SmithyBuildOptions {
    pub fn repository_urls(&self) -> Vec<String> {
        match &self.repository_urls {
            Some(urls) => urls.clone(),
            None => DEFAULT_REPOSITORY_URLS.iter().map(|u| u.to_string()).collect(),
        }
    }

    /// Moves `maven.dependencies` and `maven.repositories` out of `overrides` into the
    /// typed fields, so they go through the dependency set instead of being replaced
    /// by the derived lists. Override dependencies come before `dependencies`; an
    /// explicit `repository_urls` wins over override repositories.
    pub fn normalized(&self) -> Result<SmithyBuildOptions> {
        let mut normalized = self.clone();
        let Some(Value::Object(maven)) = normalized.overrides.get_mut("maven") else {
            return Ok(normalized);
        };

        let mut dependencies = Vec::new();
        if let Some(value) = maven.remove("dependencies") {
            for item in as_array(value, "maven.dependencies")? {
                match item {
                    Value::String(coordinate) => dependencies.push(coordinate),
                    other => {
                        return Err(ScaffoldError::InvalidCoordinateFormat {
                            coordinate: other.to_string(),
                            reason: "dependency must be a string".to_string(),
                        })
                    }
                }
            }
        }

        let mut repositories = None;
        if let Some(value) = maven.remove("repositories") {
            let urls = as_array(value, "maven.repositories")?
                .into_iter()
                .map(|item| match item.get("url").and_then(Value::as_str) {
                    Some(url) => Ok(url.to_string()),
                    None => Err(ScaffoldError::ConfigValidationError {
                        field: "smithy_build.overrides.maven.repositories".to_string(),
                        message: format!("entry {} has no string 'url'", item),
                    }),
                })
                .collect::<Result<Vec<_>>>()?;
            repositories = Some(urls);
        }

        if maven.is_empty() {
            normalized.overrides.remove("maven");
        }
        dependencies.append(&mut normalized.dependencies);
        normalized.dependencies = dependencies;
        if normalized.repository_urls.is_none() {
            normalized.repository_urls = repositories;
        }
        Ok(normalized)
    }
}

fn as_array(value: Value, field: &str) -> Result<Vec<Value>> {
    match value {
        Value::Array(items) => Ok(items),
        other => Err(ScaffoldError::ConfigValidationError {
            field: format!("smithy_build.overrides.{}", field),
            message: format!("expected an array, got {}", other),
        }),
    }
}

/// Deep merge: objects merge recursively, anything else in `overlay` replaces `base`.
pub fn merge_values(base: &mut Value, overlay: &Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                match base_map.get_mut(key) {
                    Some(base_value) => merge_values(base_value, overlay_value),
                    None => {
                        base_map.insert(key.clone(), overlay_value.clone());
                    }
                }
            }
        }
        (base, overlay) => *base = overlay.clone(),
    }
}

pub fn baseline_descriptor(service_shape_id: &str) -> Value {
    json!({
        "version": SMITHY_BUILD_VERSION,
        "projections": {
            "openapi": {
                "plugins": {
                    "openapi": {
                        "service": service_shape_id,
                        "tags": true
                    }
                }
            }
        }
    })
}

pub fn merge_descriptor(
    service_shape_id: &str,
    overrides: &Map<String, Value>,
    remote_dependencies: &[String],
    repository_urls: &[String],
) -> Value {
    let mut descriptor = baseline_descriptor(service_shape_id);
    merge_values(&mut descriptor, &Value::Object(overrides.clone()));

    let repositories: Vec<Value> = repository_urls
        .iter()
        .map(|url| json!({ "url": url }))
        .collect();
    merge_values(
        &mut descriptor,
        &json!({
            "maven": {
                "dependencies": remote_dependencies,
                "repositories": repositories
            }
        }),
    );
    descriptor
}

/// A merged `smithy-build.json` document.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildDescriptor {
    document: Value,
}

impl BuildDescriptor {
    pub fn document(&self) -> &Value {
        &self.document
    }

    pub fn dependencies(&self) -> Vec<&str> {
        self.string_list("/maven/dependencies", None)
    }

    pub fn repository_urls(&self) -> Vec<&str> {
        self.string_list("/maven/repositories", Some("url"))
    }

    fn string_list(&self, pointer: &str, field: Option<&str>) -> Vec<&str> {
        self.document
            .pointer(pointer)
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| match field {
                        Some(field) => item.get(field).and_then(Value::as_str),
                        None => item.as_str(),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        let mut rendered = serde_json::to_string_pretty(&self.document)?;
        rendered.push('\n');
        Ok(rendered)
    }
}

pub struct BuildDescriptorWriter<'a> {
    model_dir: &'a str,
    service_shape_id: &'a str,
    dependencies: &'a DependencyDeclarationSet,
    options: &'a SmithyBuildOptions,
}

impl<'a> BuildDescriptorWriter<'a> {
    pub fn new(
        model_dir: &'a str,
        service_shape_id: &'a str,
        dependencies: &'a DependencyDeclarationSet,
        options: &'a SmithyBuildOptions,
    ) -> Self {
        Self {
            model_dir,
            service_shape_id,
            dependencies,
            options,
        }
    }

    pub fn descriptor(&self) -> BuildDescriptor {
        BuildDescriptor {
            document: merge_descriptor(
                self.service_shape_id,
                &self.options.overrides,
                &self.dependencies.remote_manifest(),
                &self.options.repository_urls(),
            ),
        }
    }

    /// `build.gradle`, which unlike the descriptor can reference local jars.
    pub fn build_gradle(&self) -> String {
        let repositories: String = self
            .options
            .repository_urls()
            .iter()
            .map(|url| format!("    maven {{ url \"{}\" }}\n", url))
            .collect();
        let dependencies: String = self
            .dependencies
            .build_file_manifest()
            .iter()
            .map(|line| format!("    {}\n", line))
            .collect();

        format!(
            r#"plugins {{
    id "software.amazon.smithy" version "{plugin_version}"
}}

sourceSets {{
    main {{
        java {{
            srcDirs = ['{model_dir}']
        }}
    }}
}}

repositories {{
{repositories}}}

dependencies {{
{dependencies}}}
"#,
            plugin_version = SMITHY_GRADLE_PLUGIN_VERSION,
            model_dir = self.model_dir,
            repositories = repositories,
            dependencies = dependencies,
        )
    }
}
