//! Document discovery, output path mapping, and file I/O.

use crate::error::FileSystemError;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Checks that `path` exists and is a directory.
pub fn validate_directory(path: &Path) -> Result<(), FileSystemError> {
    if !path.exists() {
        return Err(FileSystemError::DirectoryNotFound(path.to_path_buf()));
    }
    if !path.is_dir() {
        return Err(FileSystemError::NotADirectory(path.to_path_buf()));
    }
    Ok(())
}

/// Recursive search for documents with a given extension.
#[derive(Debug, Clone)]
pub struct Discovery {
    /// Extension without the leading dot, compared case-insensitively.
    extension: String,
    /// Directory names directly under the root that are not searched.
    skip_dirs: Vec<String>,
}

impl Discovery {
    pub fn new(extension: &str) -> Self {
        Self {
            extension: extension.trim_start_matches('.').to_string(),
            skip_dirs: Vec::new(),
        }
    }

    /// Excludes the top-level directory `name` (e.g. the output directory).
    pub fn skip_dir(mut self, name: &str) -> Self {
        self.skip_dirs.push(name.to_string());
        self
    }

    fn matches(&self, path: &Path) -> bool {
        path.extension()
            .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case(&self.extension))
    }

    /// Returns every matching regular file under `root`, sorted.
    pub fn find(&self, root: &Path) -> Result<Vec<PathBuf>, FileSystemError> {
        validate_directory(root)?;

        let walker = WalkDir::new(root).into_iter().filter_entry(|entry| {
            !(entry.depth() == 1
                && entry.file_type().is_dir()
                && self
                    .skip_dirs
                    .iter()
                    .any(|skip| entry.file_name() == OsStr::new(skip)))
        });

        let mut documents = Vec::new();
        for entry in walker {
            let entry = entry?;
            if entry.file_type().is_file() && self.matches(entry.path()) {
                documents.push(entry.into_path());
            }
        }

        documents.sort();
        Ok(documents)
    }
}

/// Maps source documents to their translated location.
///
/// `root/docs/guide.md` becomes `root/<output_dir>/docs/guide.md`.
#[derive(Debug, Clone)]
pub struct OutputLayout {
    source_root: PathBuf,
    output_dir: String,
}

impl OutputLayout {
    pub fn new(source_root: impl Into<PathBuf>, output_dir: impl Into<String>) -> Self {
        Self {
            source_root: source_root.into(),
            output_dir: output_dir.into(),
        }
    }

    pub fn source_root(&self) -> &Path {
        &self.source_root
    }

    /// Root directory that receives all translated files.
    pub fn output_root(&self) -> PathBuf {
        self.source_root.join(&self.output_dir)
    }

    /// Path of `source` relative to the source root, or just its file name
    /// when it lives elsewhere.
    pub fn relative<'a>(&self, source: &'a Path) -> &'a Path {
        source
            .strip_prefix(&self.source_root)
            .ok()
            .or_else(|| source.file_name().map(Path::new))
            .unwrap_or(source)
    }

    /// Destination for `source` under the output directory.
    pub fn destination(&self, source: &Path) -> PathBuf {
        self.output_root().join(self.relative(source))
    }
}

/// Reads a document as UTF-8 text.
pub async fn read_document(path: &Path) -> Result<String, FileSystemError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| FileSystemError::Read {
            path: path.to_path_buf(),
            source,
        })
}

/// Writes `content` to `path`, creating missing parent directories.
pub async fn write_document(path: &Path, content: &str) -> Result<(), FileSystemError> {
    let write_error = |source: std::io::Error| FileSystemError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(write_error)?;
    }
    tokio::fs::write(path, content).await.map_err(write_error)
}
