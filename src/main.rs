//! mdtranslate CLI - translate a tree of Markdown documents.

use anyhow::Context;
use clap::Parser;
use mdtranslate::client::TranslationClient;
use mdtranslate::config::Config;
use mdtranslate::console::Console;
use mdtranslate::credentials::{self, DEFAULT_ENV_FILE};
use mdtranslate::document::DocumentTranslator;
use mdtranslate::error::Result;
use mdtranslate::files::{self, OutputLayout};
use mdtranslate::orchestrator::{Orchestrator, summarize};
use std::path::PathBuf;
use std::process::ExitCode;

/// Translate Markdown files while preserving formatting and footnotes.
#[derive(Parser, Debug)]
#[command(name = "mdtranslate")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory containing Markdown files to translate.
    directory: PathBuf,

    /// File holding the API key as `key=<value>`.
    #[arg(long, default_value = DEFAULT_ENV_FILE)]
    env_file: PathBuf,

    /// Config file to use instead of the platform default.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Language to translate into.
    #[arg(long)]
    target_language: Option<String>,

    /// Name of the output subdirectory created under DIRECTORY.
    #[arg(long)]
    output_dir: Option<String>,

    /// Model identifier.
    #[arg(long)]
    model: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let console = Console::new();

    match run(args, &console).await {
        Ok(code) => code,
        Err(e) => {
            console.error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

/// Loads configuration: file, then environment, then command-line flags.
fn load_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .context("Failed to load configuration")?;

    config
        .apply_env()
        .context("Invalid environment override")?;

    if let Some(language) = &args.target_language {
        config.translation.target_language = language.clone();
    }
    if let Some(output_dir) = &args.output_dir {
        config.translation.output_directory_name = output_dir.clone();
    }
    if let Some(model) = &args.model {
        config.api.model = model.clone();
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

async fn run(args: Args, console: &Console) -> Result<ExitCode> {
    console.section("mdtranslate - Markdown Translator");

    files::validate_directory(&args.directory)?;
    console.info(&format!("Source directory: {}", args.directory.display()));

    console.step("Loading configuration...");
    let config = load_config(&args)?;

    let api_key = credentials::load_api_key(&args.env_file)
        .context("Failed to load API key")?;
    console.success(&format!(
        "Configuration loaded (model {}, target {})",
        config.api.model, config.translation.target_language
    ));

    let client = TranslationClient::new(&api_key, &config)
        .context("Failed to initialize translation client")?;
    let orchestrator = Orchestrator::new(
        DocumentTranslator::new(client),
        config.translation.target_language.clone(),
    );
    let layout = OutputLayout::new(
        args.directory.clone(),
        config.translation.output_directory_name.clone(),
    );

    console.step("Starting translation...");
    let records = orchestrator
        .translate_directory(&layout, &config.translation.extension)
        .await
        .context("Failed to find documents")?;

    let summary = summarize(&records);
    console.summary(&summary, &records);

    Ok(summary.exit_code())
}
