// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Result, Context};
use log::{error, info, warn, LevelFilter, Log, Metadata, Record, Level, SetLoggerError};
use std::path::{Path, PathBuf};
use std::io::Write;
use clap::{Parser, ValueEnum, CommandFactory, Subcommand};
use clap_complete::{generate, Shell};

use subtable::app_config::{self, Config, TranslationProvider};
use subtable::app_controller::{Controller, RunOptions};
use subtable::file_utils::FileManager;

/// CLI Wrapper for TranslationProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliTranslationProvider {
    #[value(name = "openai")]
    OpenAI,
    Anthropic,
    Mock,
}

impl From<CliTranslationProvider> for TranslationProvider {
    fn from(cli_provider: CliTranslationProvider) -> Self {
        match cli_provider {
            CliTranslationProvider::OpenAI => TranslationProvider::OpenAI,
            CliTranslationProvider::Anthropic => TranslationProvider::Anthropic,
            CliTranslationProvider::Mock => TranslationProvider::Mock,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate a subtitle file
    Translate(TranslateArgs),

    /// Print how a subtitle file would be chunked, without translating it
    Plan(PlanArgs),

    /// Generate shell completions for subtable
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct TranslateArgs {
    /// The file name of the original subtitle file
    #[arg(long)]
    input_subtitle: PathBuf,

    /// The file name of the output subtitle file, next to the input by default
    #[arg(long)]
    output_subtitle: Option<PathBuf>,

    /// Language of the original subtitle file (ISO 639-1 code)
    #[arg(long)]
    input_language: Option<String>,

    /// Language of the output subtitle file (ISO 639-1 code)
    #[arg(long)]
    output_language: Option<String>,

    /// Translation provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliTranslationProvider>,

    /// Model name to use for translation
    #[arg(short, long)]
    model: Option<String>,

    /// Chunks already translated by an interrupted run
    #[arg(long, default_value_t = 0)]
    skip_chunks: usize,

    /// Force overwrite of an existing output file
    #[arg(short, long)]
    force_overwrite: bool,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

#[derive(Parser, Debug)]
struct PlanArgs {
    /// The subtitle file to chunk
    #[arg(long)]
    input_subtitle: PathBuf,

    /// Model name the chunks are sized for
    #[arg(short, long)]
    model: Option<String>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// subtable - batched subtitle translation with LLMs
///
/// Sends subtitle entries to a language model as a marker-tagged table,
/// validates the returned table and writes the translated track chunk by chunk.
#[derive(Parser, Debug)]
#[command(name = "subtable")]
#[command(version)]
#[command(about = "Batched subtitle translation with LLMs")]
#[command(long_about = "subtable translates SubRip subtitle files through LLM providers, many entries per request.

EXAMPLES:
    subtable translate --input-subtitle movie.srt --output-subtitle movie.fr.srt --input-language en --output-language fr
    subtable translate --input-subtitle movie.srt --output-subtitle movie.fr.srt --skip-chunks 12
    subtable plan --input-subtitle movie.srt -m gpt-4
    subtable completions bash > subtable.bash

CONFIGURATION:
    Configuration is stored in conf.json by default. If the config file doesn't
    exist, a default one will be created automatically. API keys are read from
    OPENAI_API_KEY or ANTHROPIC_API_KEY when the configuration has none.

SUPPORTED PROVIDERS:
    openai    - OpenAI API (requires API key)
    anthropic - Anthropic API (requires API key)
    mock      - Offline translator tagging every entry, for dry runs")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Tag and ANSI colour for a level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("ERROR", "1;31"),
            Level::Warn => ("WARN ", "1;33"),
            Level::Info => ("INFO ", "1;32"),
            Level::Debug => ("DEBUG", "1;36"),
            Level::Trace => ("TRACE", "1;35"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (tag, colour) = Self::style_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "\x1B[{}m{} {} {}\x1B[0m",
                colour, now, tag, record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() {
    // Records are filtered through log::set_max_level from here on
    if let Err(e) = CustomLogger::init(LevelFilter::Trace) {
        eprintln!("Failed to initialise logging: {}", e);
    }
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    let result = match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "subtable", &mut std::io::stdout());
            Ok(())
        }
        Commands::Translate(args) => run_translate(args).await,
        Commands::Plan(args) => run_plan(args),
    };

    if let Err(e) = result {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

/// Load the configuration and apply the log level, CLI first
fn load_config(config_path: &str, log_level: Option<CliLogLevel>) -> Result<Config> {
    if let Some(level) = &log_level {
        let level: app_config::LogLevel = level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    let mut config = Config::load_or_create(config_path)?;

    match log_level {
        Some(level) => config.log_level = level.into(),
        None => log::set_max_level(config.log_level.to_level_filter()),
    }

    Ok(config)
}

/// Fill a missing API key from the provider's environment variable
fn apply_api_key_from_env(config: &mut Config) {
    let Some(var) = config.translation.provider.api_key_env_var() else {
        return;
    };
    if !config.translation.get_api_key().is_empty() {
        return;
    }

    match std::env::var(var) {
        Ok(key) if !key.is_empty() => {
            config.translation.active_provider_config_mut().api_key = key;
        }
        _ => warn!("No API key in the configuration and {} is not set", var),
    }
}

async fn run_translate(options: TranslateArgs) -> Result<()> {
    let mut config = load_config(&options.config_path, options.log_level)?;

    // Override config with CLI options if provided
    if let Some(provider) = options.provider {
        config.translation.provider = provider.into();
    }
    if let Some(model) = options.model {
        config.translation.model = model;
    }
    if let Some(source_language) = options.input_language {
        config.source_language = source_language;
    }
    if let Some(target_language) = options.output_language {
        config.target_language = target_language;
    }
    apply_api_key_from_env(&mut config);

    config.validate()
        .context("Configuration validation failed")?;

    let output_subtitle = options.output_subtitle.unwrap_or_else(|| {
        FileManager::generate_output_path(
            &options.input_subtitle,
            options.input_subtitle.parent().unwrap_or(Path::new("")),
            &config.target_language,
        )
    });

    let controller = Controller::with_config(config)?;
    let summary = controller.run(
        &options.input_subtitle,
        &output_subtitle,
        RunOptions {
            force_overwrite: options.force_overwrite,
            skip_chunks: options.skip_chunks,
            show_progress: true,
        },
    ).await?;

    info!("Success: {} ({} entries)", output_subtitle.display(), summary.entries);
    Ok(())
}

fn run_plan(options: PlanArgs) -> Result<()> {
    let mut config = load_config(&options.config_path, options.log_level)?;
    if let Some(model) = options.model {
        config.translation.model = model;
    }

    let controller = Controller::with_config(config)?;
    let plan = controller.plan(&options.input_subtitle)?;

    for chunk in &plan {
        println!(
            "chunk {}: {} entries (#{}..#{}), {} tokens",
            chunk.number, chunk.entries, chunk.first_seq_num, chunk.last_seq_num, chunk.tokens
        );
    }
    info!("{} chunks", plan.len());

    Ok(())
}
