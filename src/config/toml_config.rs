use crate::core::descriptor::SmithyBuildOptions;
use crate::core::unit::{GenerationSettings, ServiceIdentity, SmithyModelOptions};
use crate::utils::error::{Result, ScaffoldError};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScaffoldConfig {
    #[serde(default)]
    pub workspace: WorkspaceConfig,
    #[serde(default)]
    pub models: Vec<ModelConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    #[serde(default = "default_root")]
    pub root: String,
    #[serde(default = "default_samples_dir")]
    pub samples_dir: String,
    /// Program followed by its arguments, run inside each project directory.
    pub build_command: Option<Vec<String>>,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            samples_dir: default_samples_dir(),
            build_command: None,
        }
    }
}

fn default_root() -> String {
    ".".to_string()
}

fn default_samples_dir() -> String {
    "samples/smithy".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub name: String,
    pub outdir: String,
    pub service: Option<ServiceIdentity>,
    #[serde(default)]
    pub depends_on: Vec<String>,
    pub ignore_gradle_wrapper: Option<bool>,
    pub ignore_smithy_build_output: Option<bool>,
    #[serde(default)]
    pub smithy_build: SmithyBuildOptions,
}

impl ModelConfig {
    pub fn smithy_options(&self) -> Result<SmithyModelOptions> {
        let service = validation::validate_required_field(
            &format!("models.{}.service", self.name),
            &self.service,
        )?;
        Ok(SmithyModelOptions {
            service: service.clone(),
            smithy_build: self.smithy_build.clone(),
            ignore_gradle_wrapper: self.ignore_gradle_wrapper,
            ignore_smithy_build_output: self.ignore_smithy_build_output,
        })
    }
}

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is a valid regex"))
}

impl ScaffoldConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| ScaffoldError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unknown variables are left as-is.
    fn substitute_env_vars(content: &str) -> String {
        env_var_pattern()
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    pub fn root_dir(&self) -> PathBuf {
        PathBuf::from(&self.workspace.root)
    }

    pub fn generation_settings(&self) -> GenerationSettings {
        let settings = GenerationSettings::new(self.root_dir().join(&self.workspace.samples_dir));
        match self.workspace.build_command.as_deref() {
            Some([program, args @ ..]) => settings.with_build_command(program, args),
            _ => settings,
        }
    }

    pub fn get_model(&self, name: &str) -> Option<&ModelConfig> {
        self.models.iter().find(|m| m.name == name)
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_path("workspace.root", &self.workspace.root)?;
        validation::validate_path("workspace.samples_dir", &self.workspace.samples_dir)?;
        if let Some(command) = &self.workspace.build_command {
            match command.first() {
                Some(program) => validation::validate_non_empty_string("workspace.build_command", program)?,
                None => {
                    return Err(ScaffoldError::InvalidConfigValueError {
                        field: "workspace.build_command".to_string(),
                        value: "[]".to_string(),
                        reason: "Build command needs at least a program".to_string(),
                    })
                }
            }
        }

        if self.models.is_empty() {
            return Err(ScaffoldError::MissingConfigError {
                field: "models".to_string(),
            });
        }
        validation::validate_unique_names("models.name", self.models.iter().map(|m| m.name.as_str()))?;

        for model in &self.models {
            self.validate_model(model)?;
        }

        self.dependency_order().map(|_| ())
    }

    fn validate_model(&self, model: &ModelConfig) -> Result<()> {
        validation::validate_non_empty_string("models.name", &model.name)?;
        validation::validate_path(&format!("models.{}.outdir", model.name), &model.outdir)?;

        let service = model.smithy_options()?.service;
        validation::validate_namespace(&format!("models.{}.service.namespace", model.name), &service.namespace)?;
        validation::validate_shape_name(&format!("models.{}.service.name", model.name), &service.name)?;

        for url in model.smithy_build.normalized()?.repository_urls() {
            validation::validate_repository_url(
                &format!("models.{}.smithy_build.repository_urls", model.name),
                &url,
            )?;
        }

        for dep in &model.depends_on {
            if self.get_model(dep).is_none() {
                return Err(ScaffoldError::UnknownModel {
                    name: dep.clone(),
                    referenced_by: model.name.clone(),
                });
            }
        }

        Ok(())
    }

    /// Model names ordered so every model comes after the models it depends on.
    /// Ties keep declaration order. Fails on unknown names and on cycles.
    pub fn dependency_order(&self) -> Result<Vec<&str>> {
        let mut order = Vec::with_capacity(self.models.len());
        let mut visited = HashSet::new();
        let mut stack = Vec::new();

        for model in &self.models {
            self.visit(&model.name, &mut visited, &mut stack, &mut order)?;
        }
        Ok(order)
    }

    fn visit<'a>(
        &'a self,
        name: &'a str,
        visited: &mut HashSet<&'a str>,
        stack: &mut Vec<&'a str>,
        order: &mut Vec<&'a str>,
    ) -> Result<()> {
        if visited.contains(name) {
            return Ok(());
        }
        if let Some(start) = stack.iter().position(|n| *n == name) {
            let mut cycle: Vec<String> = stack[start..].iter().map(|n| n.to_string()).collect();
            cycle.push(name.to_string());
            return Err(ScaffoldError::DependencyCycle { cycle });
        }

        let model = self.get_model(name).ok_or_else(|| ScaffoldError::UnknownModel {
            name: name.to_string(),
            referenced_by: stack.last().map(|n| n.to_string()).unwrap_or_default(),
        })?;

        stack.push(name);
        for dep in &model.depends_on {
            self.visit(dep, visited, stack, order)?;
        }
        stack.pop();

        visited.insert(name);
        order.push(name);
        Ok(())
    }

    /// Direct dependents of each model, for logging and dry runs.
    pub fn dependents(&self) -> HashMap<&str, Vec<&str>> {
        let mut dependents: HashMap<&str, Vec<&str>> = HashMap::new();
        for model in &self.models {
            for dep in &model.depends_on {
                dependents.entry(dep.as_str()).or_default().push(model.name.as_str());
            }
        }
        dependents
    }
}

impl Validate for ScaffoldConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const BASIC: &str = r#"
[workspace]
root = "/repo"

[[models]]
name = "shapes"
outdir = "packages/shapes"
[models.service]
namespace = "com.example.shapes"
name = "Shapes"

[[models]]
name = "my/api"
outdir = "packages/api/model"
depends_on = ["shapes"]
ignore_gradle_wrapper = false
[models.service]
namespace = "com.example"
name = "MyApi"
[models.smithy_build]
dependencies = ["software.amazon.smithy:smithy-validation-model:1.28.0"]
repository_urls = ["https://repo.example.com/maven/"]
[models.smithy_build.overrides.projections.openapi.plugins.openapi]
tags = false
"#;

    #[test]
    fn test_parse_basic_config() {
        let config = ScaffoldConfig::from_toml_str(BASIC).unwrap();

        assert_eq!(config.models.len(), 2);
        assert_eq!(config.workspace.samples_dir, "samples/smithy");
        let api = config.get_model("my/api").unwrap();
        assert_eq!(api.depends_on, vec!["shapes"]);
        assert_eq!(api.ignore_gradle_wrapper, Some(false));
        assert_eq!(
            api.smithy_build.overrides["projections"]["openapi"]["plugins"]["openapi"]["tags"],
            false
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_generation_settings() {
        let mut config = ScaffoldConfig::from_toml_str(BASIC).unwrap();
        let settings = config.generation_settings();
        assert_eq!(settings.samples_dir, PathBuf::from("/repo/samples/smithy"));
        assert_eq!(settings.build_program, "./gradlew");

        config.workspace.build_command = Some(vec!["gradle".to_string(), "build".to_string(), "--offline".to_string()]);
        let settings = config.generation_settings();
        assert_eq!(settings.build_program, "gradle");
        assert_eq!(settings.build_args, vec!["build", "--offline"]);
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("SCAFFOLD_TEST_REPO_URL", "https://nexus.example.com/repo");

        let content = r#"
[[models]]
name = "api"
outdir = "api"
[models.service]
namespace = "com.example"
name = "Api"
[models.smithy_build]
repository_urls = ["${SCAFFOLD_TEST_REPO_URL}", "${SCAFFOLD_TEST_UNSET_VAR}"]
"#;
        let config = ScaffoldConfig::from_toml_str(content).unwrap();
        assert_eq!(
            config.models[0].smithy_build.repository_urls,
            Some(vec![
                "https://nexus.example.com/repo".to_string(),
                "${SCAFFOLD_TEST_UNSET_VAR}".to_string()
            ])
        );

        std::env::remove_var("SCAFFOLD_TEST_REPO_URL");
    }

    #[test]
    fn test_dependency_order() {
        let content = r#"
[[models]]
name = "api"
outdir = "api"
depends_on = ["types", "shapes"]
[models.service]
namespace = "com.example"
name = "Api"

[[models]]
name = "shapes"
outdir = "shapes"
depends_on = ["types"]
[models.service]
namespace = "com.example"
name = "Shapes"

[[models]]
name = "types"
outdir = "types"
[models.service]
namespace = "com.example"
name = "Types"
"#;
        let config = ScaffoldConfig::from_toml_str(content).unwrap();
        assert_eq!(config.dependency_order().unwrap(), vec!["types", "shapes", "api"]);
        assert_eq!(config.dependents()["types"], vec!["api", "shapes"]);
    }

    #[test]
    fn test_cycle_is_rejected() {
        let content = r#"
[[models]]
name = "a"
outdir = "a"
depends_on = ["b"]
[models.service]
namespace = "com.example"
name = "A"

[[models]]
name = "b"
outdir = "b"
depends_on = ["a"]
[models.service]
namespace = "com.example"
name = "B"
"#;
        let config = ScaffoldConfig::from_toml_str(content).unwrap();
        match config.validate() {
            Err(ScaffoldError::DependencyCycle { cycle }) => assert_eq!(cycle, vec!["a", "b", "a"]),
            other => panic!("expected a cycle error, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_dependency_is_rejected() {
        let content = r#"
[[models]]
name = "a"
outdir = "a"
depends_on = ["missing"]
[models.service]
namespace = "com.example"
name = "A"
"#;
        let config = ScaffoldConfig::from_toml_str(content).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ScaffoldError::UnknownModel { ref name, .. }) if name == "missing"
        ));
    }

    #[test]
    fn test_missing_service_and_bad_values() {
        let missing_service = r#"
[[models]]
name = "a"
outdir = "a"
"#;
        let config = ScaffoldConfig::from_toml_str(missing_service).unwrap();
        assert!(matches!(config.validate(), Err(ScaffoldError::MissingConfigError { .. })));

        let bad_repo = r#"
[[models]]
name = "a"
outdir = "a"
[models.service]
namespace = "com.example"
name = "A"
[models.smithy_build]
repository_urls = ["ftp://example.com"]
"#;
        let config = ScaffoldConfig::from_toml_str(bad_repo).unwrap();
        assert!(matches!(config.validate(), Err(ScaffoldError::InvalidConfigValueError { .. })));

        let bad_override_repo = r#"
[[models]]
name = "a"
outdir = "a"
[models.service]
namespace = "com.example"
name = "A"
[[models.smithy_build.overrides.maven.repositories]]
url = "ftp://example.com"
"#;
        let config = ScaffoldConfig::from_toml_str(bad_override_repo).unwrap();
        assert!(matches!(config.validate(), Err(ScaffoldError::InvalidConfigValueError { .. })));

        assert!(ScaffoldConfig::from_toml_str("").unwrap().validate().is_err());
        assert!(ScaffoldConfig::from_toml_str("models = 3").is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(BASIC.as_bytes()).unwrap();

        let config = ScaffoldConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.models[0].name, "shapes");
    }
}
