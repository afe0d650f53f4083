//! Console output formatting with ANSI color support.
//!
//! Provides styled terminal output with automatic TTY detection
//! and respect for the NO_COLOR environment variable.

use crate::orchestrator::{RunSummary, TranslationRecord};
use std::io::{self, IsTerminal};

/// ANSI style codes for terminal formatting.
#[derive(Debug, Clone, Copy)]
pub enum Style {
    Bold,
    Dim,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    Gray,
}

impl Style {
    /// Returns the ANSI escape code for this style.
    fn code(self) -> &'static str {
        match self {
            Style::Bold => "1",
            Style::Dim => "2",
            Style::Red => "31",
            Style::Green => "32",
            Style::Yellow => "33",
            Style::Blue => "34",
            Style::Magenta => "35",
            Style::Cyan => "36",
            Style::Gray => "90",
        }
    }
}

const RESET: &str = "\x1b[0m";

/// Width of the summary banner rule.
const RULE_WIDTH: usize = 60;

/// Console output handler with color support detection.
#[derive(Debug, Clone, Copy)]
pub struct Console {
    colors_enabled: bool,
}

impl Default for Console {
    fn default() -> Self {
        Self::new()
    }
}

impl Console {
    /// Creates a new Console instance, detecting color support.
    ///
    /// Colors are disabled if:
    /// - The `NO_COLOR` environment variable is set
    /// - stdout is not a terminal (TTY)
    pub fn new() -> Self {
        let colors_enabled = std::env::var("NO_COLOR").is_err() && io::stdout().is_terminal();

        Self { colors_enabled }
    }

    /// Creates a Console with colors explicitly enabled or disabled.
    pub fn with_colors(enabled: bool) -> Self {
        Self {
            colors_enabled: enabled,
        }
    }

    /// Applies ANSI styles to text if colors are enabled.
    pub fn style(&self, text: &str, styles: &[Style]) -> String {
        if !self.colors_enabled || styles.is_empty() {
            return text.to_string();
        }

        let codes: Vec<&str> = styles.iter().map(|s| s.code()).collect();
        format!("\x1b[{}m{}{}", codes.join(";"), text, RESET)
    }

    /// Creates a colored label like `[INFO]`.
    pub fn label(&self, label: &str, color: Style) -> String {
        let styled = self.style(label, &[color, Style::Bold]);
        format!("[{}]", styled)
    }

    /// Prints an info message with blue `[INFO]` label.
    pub fn info(&self, message: &str) {
        println!("{} {}", self.label("INFO", Style::Blue), message);
    }

    /// Prints a success message with green `[OK]` label.
    pub fn success(&self, message: &str) {
        println!("{} {}", self.label("OK", Style::Green), message);
    }

    /// Prints a warning message with yellow `[WARN]` label.
    pub fn warning(&self, message: &str) {
        println!("{} {}", self.label("WARN", Style::Yellow), message);
    }

    /// Prints an error message with red `[ERROR]` label.
    pub fn error(&self, message: &str) {
        eprintln!("{} {}", self.label("ERROR", Style::Red), message);
    }

    /// Prints a step message with cyan `[STEP]` label.
    pub fn step(&self, message: &str) {
        println!("{} {}", self.label("STEP", Style::Cyan), message);
    }

    /// Prints a section header in magenta bold.
    pub fn section(&self, message: &str) {
        println!();
        println!("{}", self.style(message, &[Style::Magenta, Style::Bold]));
    }

    /// Returns text styled as muted (dim gray).
    pub fn muted(&self, text: &str) -> String {
        self.style(text, &[Style::Gray, Style::Dim])
    }

    /// Formats the `[3/10]` position prefix for a document.
    pub fn position(&self, index: usize, total: usize) -> String {
        self.style(&format!("[{}/{}]", index, total), &[Style::Cyan, Style::Bold])
    }

    /// Prints the start of work on one document.
    pub fn document(&self, index: usize, total: usize, name: &str) {
        println!(
            "{} {} {}",
            self.label("..", Style::Cyan),
            self.position(index, total),
            name
        );
    }

    /// Renders the end-of-run report as lines.
    pub fn summary_lines(
        &self,
        summary: &RunSummary,
        records: &[TranslationRecord],
    ) -> Vec<String> {
        if summary.total == 0 {
            return vec!["No files were processed".to_string()];
        }

        let rule = "=".repeat(RULE_WIDTH);
        let mut lines = vec![
            rule.clone(),
            self.style("TRANSLATION SUMMARY", &[Style::Bold]),
            rule.clone(),
            format!("Total files: {}", summary.total),
            format!(
                "Successful: {}",
                self.style(&summary.succeeded.to_string(), &[Style::Green, Style::Bold])
            ),
            format!(
                "Failed: {}",
                self.style(&summary.failed.to_string(), &[Style::Red, Style::Bold])
            ),
        ];

        let failures: Vec<&TranslationRecord> =
            records.iter().filter(|r| r.is_failure()).collect();
        if !failures.is_empty() {
            lines.push(String::new());
            lines.push("Failed files:".to_string());
            for record in failures {
                lines.push(format!("  - {}", record.source.display()));
                if let Some(error) = record.error() {
                    lines.push(format!("    {}", self.muted(&format!("Error: {}", error))));
                }
            }
        }

        lines.push(rule);
        lines
    }

    /// Prints the end-of-run report.
    pub fn summary(&self, summary: &RunSummary, records: &[TranslationRecord]) {
        println!();
        for line in self.summary_lines(summary, records) {
            println!("{}", line);
        }
    }
}
