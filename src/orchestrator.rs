//! Batch translation over a directory tree.
//!
//! Documents are processed one at a time, in the order given. Every
//! failure inside a single document's pipeline is turned into a
//! [`TranslationRecord`]; nothing aborts the batch.

use crate::console::Console;
use crate::document::DocumentTranslator;
use crate::error::{self, FileSystemError};
use crate::files::{self, Discovery, OutputLayout};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Outcome of translating a single document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Translated text was written to `destination`.
    Success { destination: PathBuf },
    /// Translation or I/O failed.
    Failure { error: String },
}

/// Per-document result, created once and never modified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationRecord {
    /// Source path relative to the source root.
    pub source: PathBuf,
    pub outcome: Outcome,
}

impl TranslationRecord {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Success { .. })
    }

    pub fn is_failure(&self) -> bool {
        !self.is_success()
    }

    /// Error description for failed documents.
    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Failure { error } => Some(error),
            Outcome::Success { .. } => None,
        }
    }
}

/// Success and failure counts over a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl RunSummary {
    /// Process exit code: success only when nothing failed.
    pub fn exit_code(&self) -> ExitCode {
        if self.failed == 0 {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        }
    }
}

/// Aggregates a run's records.
pub fn summarize(records: &[TranslationRecord]) -> RunSummary {
    let succeeded = records.iter().filter(|r| r.is_success()).count();
    RunSummary {
        total: records.len(),
        succeeded,
        failed: records.len() - succeeded,
    }
}

/// Drives translation of a set of documents.
pub struct Orchestrator {
    translator: DocumentTranslator,
    target_language: String,
    console: Console,
}

impl Orchestrator {
    pub fn new(translator: DocumentTranslator, target_language: impl Into<String>) -> Self {
        Self {
            translator,
            target_language: target_language.into(),
            console: Console::new(),
        }
    }

    /// Discovers documents under the layout's source root and translates them.
    ///
    /// The output directory itself is never searched.
    pub async fn translate_directory(
        &self,
        layout: &OutputLayout,
        extension: &str,
    ) -> Result<Vec<TranslationRecord>, FileSystemError> {
        let output_dir = layout.output_root();
        let mut discovery = Discovery::new(extension);
        if let Some(name) = output_dir.file_name().and_then(|n| n.to_str()) {
            discovery = discovery.skip_dir(name);
        }

        let documents = discovery.find(layout.source_root())?;
        if documents.is_empty() {
            self.console.info(&format!("No .{} files found in directory", extension));
            return Ok(Vec::new());
        }

        self.console.info(&format!("Found {} file(s) to translate", documents.len()));
        Ok(self.translate_set(&documents, layout).await)
    }

    /// Translates `documents` in order, one record per document.
    pub async fn translate_set(
        &self,
        documents: &[PathBuf],
        layout: &OutputLayout,
    ) -> Vec<TranslationRecord> {
        let total = documents.len();
        let mut records = Vec::with_capacity(total);

        for (i, source) in documents.iter().enumerate() {
            let relative = layout.relative(source).to_path_buf();
            self.console.document(i + 1, total, &relative.display().to_string());

            let outcome = match self.translate_one(source, layout).await {
                Ok(destination) => {
                    self.console.success(&format!(
                        "Translated {} -> {}",
                        relative.display(),
                        destination.display()
                    ));
                    Outcome::Success { destination }
                }
                Err(error) => {
                    let error = format!("{:#}", error);
                    self.console.error(&format!(
                        "Failed to translate {}: {}",
                        relative.display(),
                        error
                    ));
                    Outcome::Failure { error }
                }
            };

            records.push(TranslationRecord {
                source: relative,
                outcome,
            });
        }

        records
    }

    /// Read, translate, write. Any error ends this document only.
    async fn translate_one(&self, source: &Path, layout: &OutputLayout) -> error::Result<PathBuf> {
        let content = files::read_document(source).await?;
        let translated = self
            .translator
            .translate_document(&content, &self.target_language)
            .await?;
        let destination = layout.destination(source);
        files::write_document(&destination, &translated).await?;
        Ok(destination)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::{ScriptedBackend, client, payload};
    use crate::error::RemoteError;
    use tempfile::TempDir;

    /// Orchestrator whose backend rejects any payload containing "FAIL".
    fn orchestrator() -> Orchestrator {
        let backend = ScriptedBackend::from_fn(|prompt| {
            let text = payload(prompt);
            if text.contains("FAIL") {
                Err(RemoteError::Fatal("HTTP 400: rejected".to_string()))
            } else {
                Ok(format!("[ja] {}", text))
            }
        });
        let (client, _) = client(backend, 1);
        Orchestrator::new(DocumentTranslator::new(client), "Japanese")
    }

    fn write(root: &Path, relative: &str, content: &str) -> PathBuf {
        let path = root.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, content).unwrap();
        path
    }

    #[tokio::test]
    async fn test_empty_set() {
        let dir = TempDir::new().unwrap();
        let layout = OutputLayout::new(dir.path(), "jp");

        let records = orchestrator().translate_set(&[], &layout).await;
        let summary = summarize(&records);

        assert_eq!(summary, RunSummary::default());
        assert_eq!(summary.exit_code(), ExitCode::SUCCESS);
    }

    #[tokio::test]
    async fn test_one_failure_is_isolated() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        let docs = vec![
            write(root, "a.md", "Alpha"),
            write(root, "docs/b.md", "please FAIL here"),
            write(root, "docs/guide.md", "Guide[^1]\n\n[^1]: source"),
        ];
        let layout = OutputLayout::new(root, "jp");

        let records = orchestrator().translate_set(&docs, &layout).await;

        assert_eq!(records.len(), 3);
        assert_eq!(
            records.iter().map(|r| r.source.clone()).collect::<Vec<_>>(),
            vec![
                PathBuf::from("a.md"),
                PathBuf::from("docs/b.md"),
                PathBuf::from("docs/guide.md")
            ]
        );
        assert!(records[0].is_success());
        assert!(records[1].is_failure());
        assert!(records[1].error().unwrap().contains("HTTP 400: rejected"));
        assert!(records[2].is_success());

        let summary = summarize(&records);
        assert_eq!((summary.succeeded, summary.failed), (2, 1));
        assert_eq!(summary.exit_code(), ExitCode::FAILURE);

        assert_eq!(
            std::fs::read_to_string(root.join("jp/docs/guide.md")).unwrap(),
            "[ja] Guide[^1]\n\n[^1]: source"
        );
        assert!(!root.join("jp/docs/b.md").exists());
    }

    #[tokio::test]
    async fn test_read_failure_is_recorded() {
        let dir = TempDir::new().unwrap();
        let layout = OutputLayout::new(dir.path(), "jp");
        let missing = dir.path().join("missing.md");

        let records = orchestrator().translate_set(&[missing], &layout).await;

        assert_eq!(records.len(), 1);
        let error = records[0].error().unwrap();
        assert!(error.starts_with("Failed to read"));
        assert!(error.contains("missing.md"));
        // The io cause follows the path, once.
        assert_eq!(error.matches("os error").count(), 1);
    }

    #[tokio::test]
    async fn test_write_failure_is_recorded() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        let doc = write(root, "docs/a.md", "Alpha");
        // A file where the output directory should be.
        std::fs::write(root.join("jp"), "blocking").unwrap();
        let layout = OutputLayout::new(root, "jp");

        let records = orchestrator().translate_set(&[doc], &layout).await;

        assert!(records[0].is_failure());
        assert!(records[0].error().unwrap().contains("Failed to write"));
    }

    #[tokio::test]
    async fn test_translate_directory_mirrors_tree_and_skips_output() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(root, "README.md", "Root");
        write(root, "docs/guide.md", "Guide");
        write(root, "docs/notes.txt", "ignored");
        write(root, "jp/old.md", "previous output");
        let layout = OutputLayout::new(root, "jp");

        let records = orchestrator()
            .translate_directory(&layout, "md")
            .await
            .unwrap();

        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.is_success()));
        assert_eq!(
            std::fs::read_to_string(root.join("jp/docs/guide.md")).unwrap(),
            "[ja] Guide"
        );
        assert_eq!(
            std::fs::read_to_string(root.join("jp/README.md")).unwrap(),
            "[ja] Root"
        );
        assert!(!root.join("jp/jp").exists());
    }

    #[tokio::test]
    async fn test_translate_directory_rejects_missing_root() {
        let dir = TempDir::new().unwrap();
        let layout = OutputLayout::new(dir.path().join("absent"), "jp");

        assert!(orchestrator().translate_directory(&layout, "md").await.is_err());
    }

    #[test]
    fn test_exit_code_law() {
        let ok = TranslationRecord {
            source: PathBuf::from("a.md"),
            outcome: Outcome::Success {
                destination: PathBuf::from("jp/a.md"),
            },
        };
        let failed = TranslationRecord {
            source: PathBuf::from("b.md"),
            outcome: Outcome::Failure {
                error: "boom".to_string(),
            },
        };

        assert_eq!(summarize(&[ok.clone()]).exit_code(), ExitCode::SUCCESS);
        assert_eq!(summarize(&[ok, failed]).exit_code(), ExitCode::FAILURE);
        assert_eq!(summarize(&[]).exit_code(), ExitCode::SUCCESS);
    }
}
