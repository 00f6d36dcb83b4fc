//! Executes the generation steps recorded in a [`ProjectContext`].
//!
//! Steps run strictly in the order they were appended, inside the project
//! directory. Nothing is retried: the first failing step stops the project and,
//! through [`GenerationRunner::run_workspace`], every project after it.

use crate::core::context::ProjectContext;
use crate::core::workspace::Workspace;
use crate::domain::model::GenerationStep;
use crate::utils::error::{Result, ScaffoldError};
use std::path::Path;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::fs;
use tokio::process::Command;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Done,
    /// Copy skipped because the destination already exists.
    Skipped,
}

#[derive(Debug, Clone)]
pub struct GenerationReport {
    pub project: String,
    pub steps: Vec<(GenerationStep, StepOutcome)>,
    pub duration: Duration,
}

impl GenerationReport {
    pub fn skipped(&self) -> usize {
        self.steps
            .iter()
            .filter(|(_, outcome)| *outcome == StepOutcome::Skipped)
            .count()
    }
}

#[derive(Debug, Clone, Default)]
pub struct GenerationRunner {
    /// Stream the external build's output instead of capturing it.
    inherit_output: bool,
}

impl GenerationRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_inherited_output(mut self, inherit: bool) -> Self {
        self.inherit_output = inherit;
        self
    }

    pub async fn run(&self, context: &ProjectContext) -> Result<GenerationReport> {
        let start = Instant::now();
        let project_dir = context.outdir();
        fs::create_dir_all(project_dir).await?;

        tracing::info!(
            "🚀 [{}] running {} generation step(s)",
            context.name(),
            context.generation_steps().len()
        );

        let mut steps = Vec::with_capacity(context.generation_steps().len());
        for step in context.generation_steps() {
            tracing::debug!("[{}] $ {}", context.name(), step);
            let outcome = self.execute(context.name(), project_dir, step).await?;
            steps.push((step.clone(), outcome));
        }

        let report = GenerationReport {
            project: context.name().to_string(),
            steps,
            duration: start.elapsed(),
        };
        tracing::info!(
            "✅ [{}] generation finished in {:?} ({} copy skipped)",
            report.project,
            report.duration,
            report.skipped()
        );
        Ok(report)
    }

    /// Runs every project in dependency order, so dependency jars exist before
    /// the projects that reference them are built.
    pub async fn run_workspace(&self, workspace: &Workspace) -> Result<Vec<GenerationReport>> {
        let mut reports = Vec::with_capacity(workspace.projects().len());
        for project in workspace.projects() {
            reports.push(self.run(&project.context).await?);
        }
        Ok(reports)
    }

    async fn execute(&self, project: &str, project_dir: &Path, step: &GenerationStep) -> Result<StepOutcome> {
        match step {
            GenerationStep::EnsureDirectory { path } => {
                fs::create_dir_all(project_dir.join(path)).await?;
                Ok(StepOutcome::Done)
            }
            GenerationStep::CopyIfAbsent {
                source,
                dest,
                executable,
            } => {
                let dest_path = project_dir.join(dest);
                if fs::try_exists(&dest_path).await? {
                    tracing::debug!("[{}] keeping existing {}", project, dest);
                    return Ok(StepOutcome::Skipped);
                }
                if let Some(parent) = dest_path.parent() {
                    fs::create_dir_all(parent).await?;
                }
                fs::copy(project_dir.join(source), &dest_path).await?;
                set_staged_mode(&dest_path, *executable).await?;
                Ok(StepOutcome::Done)
            }
            GenerationStep::InvokeExternalBuild { program, args } => {
                let mut command = Command::new(program);
                command.args(args).current_dir(project_dir).stdin(Stdio::null());
                if self.inherit_output {
                    command.stdout(Stdio::inherit()).stderr(Stdio::inherit());
                }

                let failure = |status: String| ScaffoldError::ExternalBuildFailure {
                    command: step.to_string(),
                    project: project.to_string(),
                    status,
                };

                let output = command
                    .output()
                    .await
                    .map_err(|e| failure(format!("could not start: {}", e)))?;
                if !output.status.success() {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    if !stderr.trim().is_empty() {
                        tracing::error!("[{}] {}", project, stderr.trim_end());
                    }
                    return Err(failure(output.status.to_string()));
                }
                Ok(StepOutcome::Done)
            }
        }
    }
}

/// `fs::copy` carries the source mode over, so both kinds are set explicitly.
#[cfg(unix)]
async fn set_staged_mode(path: &Path, executable: bool) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut permissions = fs::metadata(path).await?.permissions();
    permissions.set_mode(if executable { 0o755 } else { 0o644 });
    fs::set_permissions(path, permissions).await?;
    Ok(())
}

#[cfg(not(unix))]
async fn set_staged_mode(_path: &Path, _executable: bool) -> Result<()> {
    Ok(())
}
