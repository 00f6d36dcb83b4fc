use crate::domain::model::{FilePolicy, GeneratedFile, GenerationStep};
use std::path::{Path, PathBuf};

/// Per-project state shared by everything that contributes to one generated project.
///
/// Ignore patterns, generation steps and files are append-only and kept in the
/// order they were added; the runner executes steps in exactly that order.
#[derive(Debug, Clone)]
pub struct ProjectContext {
    name: String,
    outdir: PathBuf,
    ignore_patterns: Vec<String>,
    generation_steps: Vec<GenerationStep>,
    files: Vec<GeneratedFile>,
}

impl ProjectContext {
    pub fn new(name: impl Into<String>, outdir: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            outdir: outdir.into(),
            ignore_patterns: Vec::new(),
            generation_steps: Vec::new(),
            files: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn outdir(&self) -> &Path {
        &self.outdir
    }

    /// Appends `pattern` unless it is already present.
    pub fn add_ignore_pattern(&mut self, pattern: &str) {
        if !self.ignore_patterns.iter().any(|p| p == pattern) {
            self.ignore_patterns.push(pattern.to_string());
        }
    }

    pub fn ignore_patterns(&self) -> &[String] {
        &self.ignore_patterns
    }

    pub fn append_generation_step(&mut self, step: GenerationStep) {
        tracing::debug!("[{}] generation step: {}", self.name, step);
        self.generation_steps.push(step);
    }

    pub fn generation_steps(&self) -> &[GenerationStep] {
        &self.generation_steps
    }

    /// Registers a file to synthesize. A later file at the same path replaces the earlier one.
    pub fn add_file(&mut self, path: impl Into<String>, contents: impl Into<String>, policy: FilePolicy) {
        let file = GeneratedFile {
            path: path.into(),
            contents: contents.into(),
            policy,
        };
        match self.files.iter_mut().find(|f| f.path == file.path) {
            Some(existing) => *existing = file,
            None => self.files.push(file),
        }
    }

    pub fn files(&self) -> &[GeneratedFile] {
        &self.files
    }

    pub fn gitignore(&self) -> String {
        let mut contents = String::from("# Generated by smithy-scaffold. Edit the scaffold configuration instead.\n");
        for pattern in &self.ignore_patterns {
            contents.push_str(pattern);
            contents.push('\n');
        }
        contents
    }
}
