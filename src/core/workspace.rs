use crate::config::toml_config::ScaffoldConfig;
use crate::core::context::ProjectContext;
use crate::core::unit::ModelDefinitionUnit;
use crate::utils::error::{Result, ScaffoldError};
use crate::utils::validation::Validate;
use std::path::{Path, PathBuf};

/// A finalized project: its context plus the derived specification path.
#[derive(Debug, Clone)]
pub struct Project {
    pub context: ProjectContext,
    pub specification_output_path: String,
    pub depends_on: Vec<String>,
}

impl Project {
    pub fn name(&self) -> &str {
        self.context.name()
    }

    /// Absolute path of the OpenAPI specification once the build has run.
    pub fn specification_path(&self) -> PathBuf {
        self.context.outdir().join(&self.specification_output_path)
    }
}

/// Every model of a scaffold configuration, wired together and finalized.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
    projects: Vec<Project>,
}

impl Workspace {
    /// Validates the configuration (cycles included), defines one unit per model,
    /// adds the `depends_on` edges and finalizes every unit.
    pub fn from_config(config: &ScaffoldConfig) -> Result<Self> {
        config.validate()?;

        let root = absolute(&config.root_dir())?;
        let settings = {
            let mut settings = config.generation_settings();
            settings.samples_dir = absolute(&settings.samples_dir)?;
            settings
        };
        let order = config.dependency_order()?;

        let mut defined: Vec<(ProjectContext, ModelDefinitionUnit)> = Vec::with_capacity(order.len());
        for name in &order {
            let model = config.get_model(name).ok_or_else(|| ScaffoldError::UnknownModel {
                name: name.to_string(),
                referenced_by: "workspace".to_string(),
            })?;
            let mut context = ProjectContext::new(&model.name, root.join(&model.outdir));
            let unit = ModelDefinitionUnit::new(&mut context, model.smithy_options()?, &settings)?;
            defined.push((context, unit));
        }

        // Dependencies always precede their dependents in `defined`, so each edge
        // reads from the already-built prefix.
        for index in 0..defined.len() {
            let (built, rest) = defined.split_at_mut(index);
            let (_, unit) = &mut rest[0];
            let depends_on = config
                .get_model(unit.project_name())
                .map(|m| m.depends_on.clone())
                .unwrap_or_default();

            let deps: Vec<&ModelDefinitionUnit> = depends_on
                .iter()
                .filter_map(|dep| built.iter().find(|(_, u)| u.project_name() == dep).map(|(_, u)| u))
                .collect();
            if !deps.is_empty() {
                tracing::debug!(
                    "Wiring '{}' -> [{}]",
                    unit.project_name(),
                    depends_on.join(", ")
                );
                unit.add_smithy_deps(&deps);
            }
        }

        let mut projects = Vec::with_capacity(defined.len());
        for (mut context, unit) in defined {
            let depends_on = config
                .get_model(unit.project_name())
                .map(|m| m.depends_on.clone())
                .unwrap_or_default();
            let specification_output_path = unit.finalize(&mut context)?;
            projects.push(Project {
                context,
                specification_output_path,
                depends_on,
            });
        }

        tracing::info!("📦 Workspace defined with {} model project(s)", projects.len());
        Ok(Self { root, projects })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Projects in dependency order: every project follows the projects it depends on.
    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn project(&self, name: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.name() == name)
    }
}

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}
