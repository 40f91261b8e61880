use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use papertag_core::config_file::{self, ConfigFile};
use papertag_core::{Config, ProgressEvent, RunStats, display_name};
use papertag_ingest::{DocumentProcessor, process_batch};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

mod output;

use output::ColorMode;

/// Research-paper keyword tagger - Extract keywords from academic PDFs
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

/// Settings that can come from flags, overriding file and environment.
#[derive(clap::Args, Debug, Default)]
struct Overrides {
    /// Maximum number of pages to read from each PDF
    #[arg(long)]
    max_pages: Option<usize>,

    /// Timeout in seconds for external tools (pdftotext, annotator)
    #[arg(long)]
    timeout: Option<u64>,

    /// Path to the pdftotext binary
    #[arg(long)]
    pdftotext: Option<PathBuf>,

    /// NLP annotator command line (e.g. "python3 scripts/annotate.py"),
    /// split on whitespace. Use `nlp.annotator_command` in the config file for
    /// paths containing spaces.
    #[arg(long)]
    annotator: Option<String>,

    /// Skip the NLP annotator and rank by word frequency
    #[arg(long)]
    no_nlp: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract keywords from one or more PDF files
    Extract {
        /// PDF files to process
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Maximum number of keywords per document
        #[arg(short = 'k', long)]
        max_keywords: Option<usize>,

        /// Number of documents processed concurrently
        #[arg(short, long)]
        workers: Option<usize>,

        /// Print one JSON record per document instead of text
        #[arg(long)]
        json: bool,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,

        /// Path to output file
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        overrides: Overrides,
    },

    /// Dry run: show the text, keywords section, title and abstract found in a PDF
    Inspect {
        /// PDF file to inspect
        file: PathBuf,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,

        #[command(flatten)]
        overrides: Overrides,
    },

    /// Print the resolved configuration as TOML
    Config {
        /// Write the resolved configuration to the user config file
        #[arg(long)]
        save: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Logs go to stderr so stdout stays clean for results
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Extract {
            files,
            max_keywords,
            workers,
            json,
            no_color,
            output,
            overrides,
        } => {
            let mut config = resolve_config(&overrides);
            if let Some(n) = max_keywords {
                config.max_keywords = n;
            }
            if let Some(n) = workers {
                config.num_workers = n;
            }
            extract(files, config, json, no_color, output).await
        }
        Command::Inspect {
            file,
            no_color,
            overrides,
        } => {
            let config = resolve_config(&overrides);
            // Extraction drives external tools synchronously
            tokio::task::spawn_blocking(move || inspect(&file, &config, no_color)).await?
        }
        Command::Config { save } => show_config(save),
    }
}

fn env_parse<T: FromStr>(name: &str) -> Option<T> {
    let value = std::env::var(name).ok()?;
    match value.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!(var = name, value = %value, "ignoring unparsable environment variable");
            None
        }
    }
}

/// Split an annotator command line on whitespace. No shell quoting is
/// applied, so arguments cannot contain spaces.
fn split_command(command: &str) -> Vec<String> {
    command.split_whitespace().map(str::to_string).collect()
}

/// Resolve configuration: CLI flags > env vars > config file > defaults.
fn resolve_config(overrides: &Overrides) -> Config {
    let mut config = Config::default();
    config_file::load_config().apply_to(&mut config);

    if let Some(n) = env_parse("PAPERTAG_MAX_KEYWORDS") {
        config.max_keywords = n;
    }
    if let Some(n) = env_parse("PAPERTAG_MAX_PAGES") {
        config.max_pages = n;
    }
    if let Some(n) = env_parse("PAPERTAG_TIMEOUT") {
        config.tool_timeout_secs = n;
    }
    if let Some(n) = env_parse("PAPERTAG_WORKERS") {
        config.num_workers = n;
    }
    if let Ok(cmd) = std::env::var("PAPERTAG_ANNOTATOR") {
        config.annotator_command = Some(split_command(&cmd));
    }
    if let Ok(path) = std::env::var("PAPERTAG_PDFTOTEXT") {
        config.pdftotext_path = PathBuf::from(path);
    }

    if let Some(n) = overrides.max_pages {
        config.max_pages = n;
    }
    if let Some(secs) = overrides.timeout {
        config.tool_timeout_secs = secs;
    }
    if let Some(ref path) = overrides.pdftotext {
        config.pdftotext_path = path.clone();
    }
    if let Some(ref cmd) = overrides.annotator {
        config.annotator_command = Some(split_command(cmd));
    }
    if overrides.no_nlp {
        config.nlp_enabled = false;
    }
    config
}

fn validate(config: &Config) -> anyhow::Result<()> {
    if config.max_keywords == 0 {
        anyhow::bail!("--max-keywords must be at least 1");
    }
    if config.max_pages == 0 {
        anyhow::bail!("--max-pages must be at least 1");
    }
    Ok(())
}

async fn extract(
    files: Vec<PathBuf>,
    config: Config,
    json: bool,
    no_color: bool,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    validate(&config)?;

    let color = ColorMode(!no_color && !json && output.is_none());
    let mut writer: Box<dyn Write> = if let Some(ref output_path) = output {
        Box::new(std::fs::File::create(output_path)?)
    } else {
        Box::new(std::io::stdout())
    };

    // Starting the annotator blocks on its first reply
    let processor = {
        let config = config.clone();
        Arc::new(tokio::task::spawn_blocking(move || DocumentProcessor::from_config(&config)).await??)
    };
    tracing::info!(
        strategy = %processor.strategy(),
        workers = config.num_workers,
        files = files.len(),
        "starting extraction"
    );

    // Progress bar on stderr; hidden automatically when stderr is not a terminal
    let bar = ProgressBar::new(files.len() as u64);
    bar.set_style(
        ProgressStyle::with_template("{spinner:.green} [{bar:40.green/dim}] {pos}/{len} {msg}")?
            .progress_chars("=> "),
    );
    let progress = {
        let bar = bar.clone();
        move |event: ProgressEvent| match event {
            ProgressEvent::Started { path, .. } => bar.set_message(display_name(&path)),
            ProgressEvent::Finished { .. } => bar.inc(1),
        }
    };

    let cancel = CancellationToken::new();

    // Set up Ctrl+C handler
    let cancel_clone = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel_clone.cancel();
        }
    });

    let results = process_batch(
        processor,
        &files,
        config.max_keywords,
        config.num_workers,
        cancel,
        Arc::new(progress),
    )
    .await;
    bar.finish_and_clear();

    for result in &results {
        if json {
            output::print_json(&mut writer, result)?;
        } else {
            output::print_result(&mut writer, result, color)?;
        }
    }

    if !json {
        output::print_summary(&mut writer, &RunStats::from_results(&results), color)?;
    }
    writer.flush()?;

    Ok(())
}

fn inspect(file: &Path, config: &Config, no_color: bool) -> anyhow::Result<()> {
    validate(config)?;
    if !file.exists() {
        anyhow::bail!("File not found: {}", file.display());
    }

    let color = ColorMode(!no_color);
    let mut writer = std::io::stdout();

    let processor = DocumentProcessor::from_config(config)?;
    let file_name = display_name(file);
    let backends = processor.text_extractor().backend_names();

    let Some(text) = processor
        .text_extractor()
        .extract_text(file, processor.max_pages())
    else {
        writeln!(
            writer,
            "INSPECT: {} ({})",
            file_name,
            papertag_core::ERR_NO_TEXT
        )?;
        return Ok(());
    };

    let keywords = processor.keyword_extractor();
    let section = keywords.find_keywords_section(&text);
    let segments = keywords.segment(&text);
    let outcome = keywords.extract_from_text(&text, config.max_keywords);

    let inspection = output::Inspection {
        file_name: &file_name,
        backends: &backends,
        text_chars: text.chars().count(),
        section: section.as_deref(),
        min_section_terms: keywords.config().min_section_terms(),
        segments: &segments,
        strategy: keywords.strategy(),
        outcome: outcome
            .as_ref()
            .map(|set| (set.method, set.keywords.as_slice()))
            .map_err(|e| e.to_string()),
    };
    output::print_inspection(&mut writer, &inspection, color)?;

    Ok(())
}

fn show_config(save: bool) -> anyhow::Result<()> {
    let resolved = resolve_config(&Overrides::default());
    let file = ConfigFile::from_config(&resolved);
    let rendered = toml::to_string_pretty(&file)?;

    match config_file::config_path() {
        Some(path) => println!("# {}", path.display()),
        None => println!("# no platform config directory"),
    }
    print!("{}", rendered);

    if save {
        let path = config_file::save_config(&file).map_err(anyhow::Error::msg)?;
        eprintln!("Saved configuration to {}", path.display());
    }
    Ok(())
}
