//! The Smithy model definition unit.
//!
//! A [`ModelDefinitionUnit`] owns everything needed to turn one Smithy model into an
//! OpenAPI specification with Gradle: the dependency set, descriptor options, the
//! staged Gradle wrapper, and the ignore patterns and generation steps it registers
//! in its [`ProjectContext`].
//!
//! Units can depend on other units through [`ModelDefinitionUnit::add_smithy_deps`],
//! which points at the dependency's built jar. The unit does not look for cycles;
//! [`crate::core::workspace::Workspace`] rejects them before wiring any edge.

use crate::core::context::ProjectContext;
use crate::core::dependencies::DependencyDeclarationSet;
use crate::core::descriptor::{BuildDescriptor, BuildDescriptorWriter, SmithyBuildOptions};
use crate::core::staging::{relative_path, to_slash, FileStagingPlan, IgnorePolicy};
use crate::domain::model::{DependencyCoordinate, FilePolicy, GenerationStep};
use crate::utils::error::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const MODEL_DIR: &str = "src/main/smithy";
pub const PROJECTIONS_DIR: &str = "build/smithyprojections";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceIdentity {
    pub namespace: String,
    pub name: String,
}

impl ServiceIdentity {
    pub fn new(namespace: &str, name: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            name: name.to_string(),
        }
    }

    /// `namespace#Name`
    pub fn shape_id(&self) -> String {
        format!("{}#{}", self.namespace, self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmithyModelOptions {
    pub service: ServiceIdentity,
    #[serde(default)]
    pub smithy_build: SmithyBuildOptions,
    pub ignore_gradle_wrapper: Option<bool>,
    pub ignore_smithy_build_output: Option<bool>,
}

impl SmithyModelOptions {
    pub fn new(service: ServiceIdentity) -> Self {
        Self {
            service,
            smithy_build: SmithyBuildOptions::default(),
            ignore_gradle_wrapper: None,
            ignore_smithy_build_output: None,
        }
    }

    pub fn ignore_policy(&self) -> IgnorePolicy {
        IgnorePolicy {
            ignore_gradle_wrapper: self.ignore_gradle_wrapper.unwrap_or(true),
            ignore_smithy_build_output: self.ignore_smithy_build_output.unwrap_or(true),
        }
    }
}

/// Where the wrapper samples live and how the external build is invoked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationSettings {
    pub samples_dir: PathBuf,
    pub build_program: String,
    pub build_args: Vec<String>,
}

impl GenerationSettings {
    pub fn new(samples_dir: impl Into<PathBuf>) -> Self {
        Self {
            samples_dir: samples_dir.into(),
            build_program: "./gradlew".to_string(),
            build_args: vec!["build".to_string()],
        }
    }

    pub fn with_build_command(mut self, program: &str, args: &[String]) -> Self {
        self.build_program = program.to_string();
        self.build_args = args.to_vec();
        self
    }
}

/// Replaces characters Gradle rejects in project names with `-`.
pub fn sanitize_project_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '<' | '>' | '"' | '?' | '*' | '|' => '-',
            other => other,
        })
        .collect()
}

/// Path of the generated OpenAPI specification, relative to the project directory.
pub fn specification_output_path(gradle_project_name: &str, service_name: &str) -> String {
    format!(
        "{}/{}/openapi/openapi/{}.openapi.json",
        PROJECTIONS_DIR, gradle_project_name, service_name
    )
}

#[derive(Debug, Clone)]
pub struct ModelDefinitionUnit {
    project_name: String,
    gradle_project_name: String,
    outdir: PathBuf,
    options: SmithyModelOptions,
    service_shape_id: String,
    dependencies: DependencyDeclarationSet,
    specification_output_path: String,
}

impl ModelDefinitionUnit {
    /// Builds the unit and registers its sample files, staging steps, external build
    /// and ignore patterns in `context`. Fails on the first malformed dependency.
    pub fn new(
        context: &mut ProjectContext,
        mut options: SmithyModelOptions,
        settings: &GenerationSettings,
    ) -> Result<Self> {
        options.smithy_build = options.smithy_build.normalized()?;
        let mut dependencies = DependencyDeclarationSet::new();
        dependencies.add_strs(&options.smithy_build.dependencies)?;

        let gradle_project_name = sanitize_project_name(context.name());
        let specification_output_path =
            specification_output_path(&gradle_project_name, &options.service.name);
        let service_shape_id = options.service.shape_id();

        options.ignore_policy().register(context);

        context.add_file(
            "settings.gradle",
            format!("rootProject.name = '{}'\n", gradle_project_name),
            FilePolicy::Sample,
        );
        context.add_file(
            format!("{}/main.smithy", MODEL_DIR),
            sample_model(&options.service),
            FilePolicy::Sample,
        );

        // The wrapper is copied at generation time and never overwritten, so users
        // can bring their own and set ignore_gradle_wrapper = false.
        FileStagingPlan::gradle_wrapper(&settings.samples_dir).register(context);
        context.append_generation_step(GenerationStep::InvokeExternalBuild {
            program: settings.build_program.clone(),
            args: settings.build_args.clone(),
        });

        tracing::debug!(
            "Defined model unit '{}' for service {}",
            gradle_project_name,
            service_shape_id
        );

        Ok(Self {
            project_name: context.name().to_string(),
            gradle_project_name,
            outdir: context.outdir().to_path_buf(),
            options,
            service_shape_id,
            dependencies,
            specification_output_path,
        })
    }

    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    pub fn gradle_project_name(&self) -> &str {
        &self.gradle_project_name
    }

    pub fn outdir(&self) -> &Path {
        &self.outdir
    }

    pub fn service(&self) -> &ServiceIdentity {
        &self.options.service
    }

    pub fn specification_output_path(&self) -> &str {
        &self.specification_output_path
    }

    pub fn dependencies(&self) -> &DependencyDeclarationSet {
        &self.dependencies
    }

    /// Adds `group:artifact:version` or `file://<path>` dependencies.
    pub fn add_deps<S: AsRef<str>>(&mut self, deps: &[S]) -> Result<()> {
        self.dependencies.add_strs(deps)
    }

    /// Jar this unit builds, as seen from `consumer_dir`.
    pub fn artifact_coordinate_from(&self, consumer_dir: &Path) -> DependencyCoordinate {
        let jar = relative_path(consumer_dir, &self.outdir)
            .join("build")
            .join("libs")
            .join(format!("{}.jar", self.gradle_project_name));
        DependencyCoordinate::local_file(to_slash(&jar))
    }

    /// Makes the shapes of `deps` importable from this model.
    pub fn add_smithy_deps(&mut self, deps: &[&ModelDefinitionUnit]) {
        let coordinates: Vec<_> = deps
            .iter()
            .map(|dep| dep.artifact_coordinate_from(&self.outdir))
            .collect();
        self.dependencies.add(coordinates);
    }

    fn writer(&self) -> BuildDescriptorWriter<'_> {
        BuildDescriptorWriter::new(
            MODEL_DIR,
            &self.service_shape_id,
            &self.dependencies,
            &self.options.smithy_build,
        )
    }

    pub fn build_descriptor(&self) -> BuildDescriptor {
        self.writer().descriptor()
    }

    pub fn build_gradle(&self) -> String {
        self.writer().build_gradle()
    }

    /// Serializes the final state into `context`. Consumes the unit; nothing can
    /// change its dependencies afterwards.
    pub fn finalize(self, context: &mut ProjectContext) -> Result<String> {
        context.add_file(
            "smithy-build.json",
            self.build_descriptor().to_json_pretty()?,
            FilePolicy::Generated,
        );
        context.add_file("build.gradle", self.build_gradle(), FilePolicy::Generated);
        tracing::debug!(
            "Finalized '{}' with {} dependencies",
            self.gradle_project_name,
            self.dependencies.coordinates().len()
        );
        Ok(self.specification_output_path)
    }
}

pub fn sample_model(service: &ServiceIdentity) -> String {
    format!(
        r#"$version: "2"
namespace {namespace}

use aws.protocols#restJson1

/// A sample smithy api
@restJson1
service {name} {{
    version: "1.0"
    operations: [SayHello]
}}

@readonly
@http(method: "GET", uri: "/hello")
operation SayHello {{
    input: SayHelloInput
    output: SayHelloOutput
    errors: [ApiError]
}}

string Name
string Message

@input
structure SayHelloInput {{
    @httpQuery("name")
    @required
    name: Name
}}

@output
structure SayHelloOutput {{
    @required
    message: Message
}}

@error("client")
structure ApiError {{
    @required
    errorMessage: Message
}}
"#,
        namespace = service.namespace,
        name = service.name,
    )
}
