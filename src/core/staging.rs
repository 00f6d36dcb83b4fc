use crate::core::context::ProjectContext;
use crate::domain::model::{FileKind, FileSpec, GenerationStep};
use std::path::{Component, Path, PathBuf};

pub const GRADLE_WRAPPER_DIR: &str = "gradle/wrapper";
pub const GRADLE_WRAPPER_FILES: [&str; 2] = [
    "gradle/wrapper/gradle-wrapper.jar",
    "gradle/wrapper/gradle-wrapper.properties",
];
pub const GRADLE_WRAPPER_EXECUTABLES: [&str; 2] = ["gradlew", "gradlew.bat"];

/// Sample files copied into a project at generation time, never over existing ones.
#[derive(Debug, Clone, Default)]
pub struct FileStagingPlan {
    files: Vec<FileSpec>,
}

impl FileStagingPlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// The Gradle wrapper, read from `samples_dir`.
    pub fn gradle_wrapper(samples_dir: &Path) -> Self {
        let mut plan = Self::new();
        plan.stage(GRADLE_WRAPPER_FILES.iter().map(|file| FileSpec {
            source_path: samples_dir.join(file),
            destination_relative_path: file.to_string(),
            kind: FileKind::Regular,
        }));
        plan.stage(GRADLE_WRAPPER_EXECUTABLES.iter().map(|file| FileSpec {
            source_path: samples_dir.join(file),
            destination_relative_path: file.to_string(),
            kind: FileKind::Executable,
        }));
        plan
    }

    pub fn stage<I>(&mut self, files: I)
    where
        I: IntoIterator<Item = FileSpec>,
    {
        self.files.extend(files);
    }

    pub fn files(&self) -> &[FileSpec] {
        &self.files
    }

    /// Destination directories first, then one conditional copy per file.
    /// Sources are expressed relative to the project directory.
    pub fn generation_steps(&self, project_dir: &Path) -> Vec<GenerationStep> {
        let mut directories: Vec<String> = Vec::new();
        for file in &self.files {
            if let Some(parent) = Path::new(&file.destination_relative_path).parent() {
                let parent = to_slash(parent);
                if !parent.is_empty() && !directories.contains(&parent) {
                    directories.push(parent);
                }
            }
        }

        let mut steps: Vec<GenerationStep> = directories
            .into_iter()
            .map(|path| GenerationStep::EnsureDirectory { path })
            .collect();
        steps.extend(self.files.iter().map(|file| GenerationStep::CopyIfAbsent {
            source: to_slash(&relative_path(project_dir, &file.source_path)),
            dest: file.destination_relative_path.clone(),
            executable: file.kind == FileKind::Executable,
        }));
        steps
    }

    pub fn register(&self, context: &mut ProjectContext) {
        for step in self.generation_steps(context.outdir()) {
            context.append_generation_step(step);
        }
    }
}

/// Version control exclusions for a Smithy model project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IgnorePolicy {
    pub ignore_gradle_wrapper: bool,
    pub ignore_smithy_build_output: bool,
}

impl Default for IgnorePolicy {
    fn default() -> Self {
        Self {
            ignore_gradle_wrapper: true,
            ignore_smithy_build_output: true,
        }
    }
}

impl IgnorePolicy {
    pub fn patterns(&self) -> Vec<&'static str> {
        let mut patterns = Vec::new();
        if self.ignore_gradle_wrapper {
            patterns.extend(["gradle", "gradlew", "gradlew.bat"]);
        }
        // the wrapper downloads gradle itself into .gradle
        patterns.push(".gradle");
        if self.ignore_smithy_build_output {
            // smithy-output is where the older cli-based generation wrote its projections
            patterns.extend(["build", "smithy-output"]);
        }
        patterns
    }

    pub fn register(&self, context: &mut ProjectContext) {
        for pattern in self.patterns() {
            context.add_ignore_pattern(pattern);
        }
    }
}

/// Lexical relative path from `from` to `to`. Neither path is touched on disk,
/// so both should be absolute or both relative to the same base.
pub fn relative_path(from: &Path, to: &Path) -> PathBuf {
    let from: Vec<Component> = normalize(from);
    let to: Vec<Component> = normalize(to);

    let common = from
        .iter()
        .zip(to.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut result = PathBuf::new();
    for _ in common..from.len() {
        result.push("..");
    }
    for component in &to[common..] {
        result.push(component.as_os_str());
    }
    result
}

fn normalize(path: &Path) -> Vec<Component<'_>> {
    let mut components = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match components.last() {
                Some(Component::Normal(_)) => {
                    components.pop();
                }
                _ => components.push(component),
            },
            other => components.push(other),
        }
    }
    components
}

pub fn to_slash(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
