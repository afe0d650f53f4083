//! mdtranslate - Markdown tree translator.
//!
//! This library provides functionality for:
//! - Lifting footnotes out of documents and restoring them after translation
//! - Calling a remote translation model with bounded retry and backoff
//! - Translating a directory tree document by document with per-file isolation

pub mod client;
pub mod config;
pub mod console;
pub mod credentials;
pub mod document;
pub mod error;
pub mod files;
pub mod footnotes;
pub mod gemini;
pub mod orchestrator;

// Re-export commonly used types
pub use client::{CompletionBackend, RetryPolicy, Sleeper, TranslationClient};
pub use config::Config;
pub use console::Console;
pub use document::DocumentTranslator;
pub use error::{ConfigError, FileSystemError, FootnoteError, RemoteError, TranslationError};
pub use files::{Discovery, OutputLayout};
pub use footnotes::{Extraction, Footnotes};
pub use orchestrator::{Orchestrator, Outcome, RunSummary, TranslationRecord};
