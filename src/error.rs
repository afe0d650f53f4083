//! Error types for the mdtranslate application.
//!
//! Uses `thiserror` for structured error definitions that provide
//! clear context about what went wrong. Each layer raises its own
//! typed errors; only the orchestrator turns them into data. Messages
//! never repeat their wrapped cause; `{:#}` prints the chain.

use std::path::PathBuf;
use thiserror::Error;

/// Error raised when restoring footnotes into translated text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FootnoteError {
    /// Placeholders in the translated text do not match the extracted footnotes 1:1
    #[error("Malformed placeholders: expected {expected}, found {found} ({detail})")]
    MalformedPlaceholder {
        expected: usize,
        found: usize,
        detail: String,
    },
}

/// Classification of a single failed remote call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// Timeout, connection failure or a server-side hiccup worth retrying
    #[error("transient failure: {0}")]
    Transient(String),

    /// The service asked us to slow down (HTTP 429, quota exhausted)
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// Any other error; retrying will not help
    #[error("{0}")]
    Fatal(String),
}

/// Error type for translation operations.
#[derive(Error, Debug)]
pub enum TranslationError {
    /// No API key was supplied to the client
    #[error("Missing API credential")]
    MissingCredential,

    /// Transient failures persisted through every retry
    #[error("Translation service unavailable after {attempts} attempts: {last_error}")]
    Unavailable { attempts: u32, last_error: String },

    /// Rate limiting persisted through every retry
    #[error("Rate limit exceeded after {attempts} attempts: {last_error}")]
    RateLimitExceeded { attempts: u32, last_error: String },

    /// The remote service rejected the request
    #[error("Remote service error: {0}")]
    Remote(String),

    /// Footnotes could not be restored into the translated text
    #[error(transparent)]
    Footnote(#[from] FootnoteError),

    /// Invalid client configuration
    #[error("Invalid API configuration: {0}")]
    InvalidConfig(String),
}

/// Error type for configuration and credential loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse config file
    #[error("Failed to parse config: {0}")]
    ParseError(String),

    /// Missing required configuration value
    #[error("Missing required config value: {0}")]
    MissingValue(String),

    /// Invalid configuration value
    #[error("Invalid config value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Config directory not found
    #[error("Could not determine config directory")]
    NoConfigDir,

    /// Credential file does not exist
    #[error("Credential file not found: {}", .0.display())]
    CredentialFileMissing(PathBuf),

    /// Credential path exists but is not a regular file
    #[error("Credential path is not a file: {}", .0.display())]
    NotAFile(PathBuf),

    /// Credential file has no `key=` line
    #[error("API key not found in {} (expected format: key=<your_api_key>)", .0.display())]
    CredentialKeyMissing(PathBuf),

    /// `key=` line present but empty
    #[error("API key value is empty in {}", .0.display())]
    EmptyCredential(PathBuf),
}

/// Error type for file system operations.
#[derive(Error, Debug)]
pub enum FileSystemError {
    /// Source directory is missing
    #[error("Directory does not exist: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    /// Source path is not a directory
    #[error("Path is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    /// Directory traversal failed
    #[error("Failed to scan directory")]
    Walk(#[from] walkdir::Error),

    /// Failed to read a document
    #[error("Failed to read {}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to write a document or create its directory
    #[error("Failed to write {}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Result type alias using anyhow for application-level error handling.
pub type Result<T> = anyhow::Result<T>;
