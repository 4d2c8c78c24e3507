use anyhow::{anyhow, Context};
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;
use treescout::{CrawlConfig, CrawlError, Settings};

/// Search directory trees for a literal string, showing live progress
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Literal, case-sensitive string to search for
    #[arg(value_name = "SEARCH-TERM", allow_hyphen_values = true)]
    search_term: String,

    /// Maximum number of files searched at the same time
    #[arg(value_name = "MAX-GREP-WORKERS", allow_hyphen_values = true)]
    max_grep_workers: String,

    /// Directory trees to search
    #[arg(value_name = "ROOT", required = true)]
    roots: Vec<PathBuf>,

    /// YAML settings file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); logs go to stderr
    #[arg(short, long)]
    log_level: Option<String>,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.exit()
        }
        Err(e) => {
            let _ = e.print();
            return ExitCode::FAILURE;
        }
    };

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            if e
                .downcast_ref::<CrawlError>()
                .is_some_and(CrawlError::is_configuration)
            {
                eprintln!("{}", Cli::command().render_usage());
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let settings = Settings::load_from(cli.config.as_deref())?.merge_with_cli(cli.log_level);
    init_logging(&settings.log_level)?;

    let config = CrawlConfig::new(cli.search_term, &cli.max_grep_workers, cli.roots)?;
    debug!("Running with {:?}", config);

    let stdout = io::stdout();
    treescout::run(&config, stdout.lock())?;
    Ok(())
}

fn init_logging(level: &str) -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_new(level).with_context(|| format!("Invalid log level '{}'", level))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init()
        .map_err(|e| anyhow!("Failed to initialize logging: {}", e))
}
