//! API key loading from a `.env`-style file.
//!
//! The file holds `key=<value>` lines; only the literal `key` entry is read.

use crate::error::ConfigError;
use std::path::Path;

/// Default credential file, relative to the working directory.
pub const DEFAULT_ENV_FILE: &str = ".env";

/// Removes one layer of matching single or double quotes.
fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

/// Extracts the API key from `.env` file content.
///
/// Blank lines and `#` comments are skipped; the first `key=` line wins.
/// Returns `None` when there is no `key=` line and `Some("")` when it is empty.
pub fn parse_api_key(content: &str) -> Option<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .find_map(|line| line.strip_prefix("key="))
        .map(|value| unquote(value.trim()).trim().to_string())
}

/// Loads the API key from the file at `path`.
pub fn load_api_key(path: &Path) -> Result<String, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::CredentialFileMissing(path.to_path_buf()));
    }
    if !path.is_file() {
        return Err(ConfigError::NotAFile(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)?;
    match parse_api_key(&content) {
        Some(key) if !key.is_empty() => Ok(key),
        Some(_) => Err(ConfigError::EmptyCredential(path.to_path_buf())),
        None => Err(ConfigError::CredentialKeyMissing(path.to_path_buf())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_env(content: &str) -> (TempDir, std::path::PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn test_load_plain_key() {
        let (_dir, path) = write_env("key=my_secret_api_key_123");
        assert_eq!(load_api_key(&path).unwrap(), "my_secret_api_key_123");
    }

    #[test]
    fn test_quotes_stripped() {
        assert_eq!(parse_api_key("key=\"my_api_key\"").as_deref(), Some("my_api_key"));
        assert_eq!(parse_api_key("key='my_api_key'").as_deref(), Some("my_api_key"));
        assert_eq!(parse_api_key("key=\"unbalanced").as_deref(), Some("\"unbalanced"));
    }

    #[test]
    fn test_comments_and_blank_lines_skipped() {
        let content = "# This is a comment\n\n\nkey=my_api_key\n# Another comment\n";
        assert_eq!(parse_api_key(content).as_deref(), Some("my_api_key"));
    }

    #[test]
    fn test_other_keys_ignored() {
        assert_eq!(parse_api_key("OTHER_VAR=value\nmonkey=x"), None);
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = load_api_key(&dir.path().join("nonexistent.env")).unwrap_err();
        assert!(matches!(err, ConfigError::CredentialFileMissing(_)));
    }

    #[test]
    fn test_directory_is_not_a_file() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            load_api_key(dir.path()),
            Err(ConfigError::NotAFile(_))
        ));
    }

    #[test]
    fn test_key_missing() {
        let (_dir, path) = write_env("OTHER_VAR=value\nANOTHER_VAR=value2");
        assert!(matches!(
            load_api_key(&path),
            Err(ConfigError::CredentialKeyMissing(_))
        ));
    }

    #[test]
    fn test_empty_values() {
        let (_dir, path) = write_env("key=");
        assert!(matches!(
            load_api_key(&path),
            Err(ConfigError::EmptyCredential(_))
        ));

        let (_dir, path) = write_env("key=\"\"");
        assert!(matches!(
            load_api_key(&path),
            Err(ConfigError::EmptyCredential(_))
        ));
    }
}
