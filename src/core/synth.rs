use crate::core::context::ProjectContext;
use crate::domain::model::FilePolicy;
use crate::domain::ports::Storage;
use crate::utils::error::Result;
use std::path::{Path, PathBuf};

pub const GITIGNORE: &str = ".gitignore";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOutcome {
    Written,
    /// A sample file that already existed and was left alone.
    Kept,
    /// Dry run: nothing touched.
    Planned,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesizedFile {
    pub path: PathBuf,
    pub outcome: FileOutcome,
}

/// Writes the files registered in a [`ProjectContext`] through a [`Storage`].
pub struct Synthesizer<S: Storage> {
    storage: S,
    dry_run: bool,
}

impl<S: Storage> Synthesizer<S> {
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            dry_run: false,
        }
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Paths handed to storage are the project's outdir joined with the file path,
    /// so a storage rooted at the workspace root (or `/`) serves every project.
    pub async fn synthesize(&self, context: &ProjectContext) -> Result<Vec<SynthesizedFile>> {
        let mut results = Vec::with_capacity(context.files().len() + 1);

        for file in context.files() {
            let path = context.outdir().join(&file.path);
            let outcome = self
                .write(&path, file.contents.as_bytes(), file.policy)
                .await?;
            results.push(SynthesizedFile { path, outcome });
        }

        let gitignore = context.outdir().join(GITIGNORE);
        let outcome = self
            .write(&gitignore, context.gitignore().as_bytes(), FilePolicy::Generated)
            .await?;
        results.push(SynthesizedFile {
            path: gitignore,
            outcome,
        });

        let written = results
            .iter()
            .filter(|r| r.outcome == FileOutcome::Written)
            .count();
        tracing::info!(
            "📝 [{}] {} file(s) written, {} kept",
            context.name(),
            written,
            results.iter().filter(|r| r.outcome == FileOutcome::Kept).count()
        );
        Ok(results)
    }

    async fn write(&self, path: &Path, data: &[u8], policy: FilePolicy) -> Result<FileOutcome> {
        if self.dry_run {
            tracing::info!("🔍 Would write {}", path.display());
            return Ok(FileOutcome::Planned);
        }

        if policy == FilePolicy::Sample && self.storage.exists(path).await? {
            tracing::debug!("Keeping existing sample {}", path.display());
            return Ok(FileOutcome::Kept);
        }

        self.storage.write_file(path, data).await?;
        tracing::debug!("Wrote {}", path.display());
        Ok(FileOutcome::Written)
    }
}
