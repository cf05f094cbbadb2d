use anyhow::{bail, Context, Result};
use citation_agent::config::{default_config_path, find_config_file, load_config, Config};
use citation_agent::ui::{self, Spinner, Status};
use citation_agent::utils::{format_bibliography, CitationStyle};
use citation_agent::{CitationAgent, RetrievalService};
use clap::{Parser, Subcommand, ValueEnum};
use owo_colors::OwoColorize;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Shortest claim accepted, in characters after trimming
const MIN_CLAIM_CHARS: usize = 3;

/// Citation Agent - Find real academic papers that support a claim
#[derive(Parser, Debug)]
#[command(name = "citation-agent")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Find real academic papers that support a claim", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging (-v, -vv)
    #[arg(long, short, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    /// Output format
    #[arg(long, short, value_enum, global = true, default_value_t = OutputFormat::Auto)]
    output: OutputFormat,

    /// Configuration file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Output format for results
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// Automatic based on terminal (table if TTY, JSON otherwise)
    Auto,
    /// Table format (human-readable)
    Table,
    /// JSON format (machine-readable)
    Json,
}

impl OutputFormat {
    fn resolve(self) -> Self {
        match self {
            OutputFormat::Auto if ui::is_terminal() => OutputFormat::Table,
            OutputFormat::Auto => OutputFormat::Json,
            other => other,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Find citations supporting a claim
    #[command(alias = "c")]
    Cite {
        /// The claim to support
        claim: String,

        /// Also print a bibliography in this style
        #[arg(long, short, value_enum)]
        style: Option<CitationStyle>,
    },

    /// Search all sources and print the merged papers
    #[command(alias = "p")]
    Papers {
        /// Search query string
        query: String,

        /// Maximum results per source
        #[arg(long, short)]
        max_results: Option<usize>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Write the default configuration as TOML
    Init {
        /// Where to write (defaults to the user config directory)
        #[arg(long)]
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the effective configuration
    Show,
}

fn init_tracing(cli: &Cli) {
    let log_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let level = if cli.quiet { "error" } else { log_level };
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| format!("citation_agent={}", level)),
    );

    if cli.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn resolve_config(cli: &Cli) -> Result<Config> {
    let path = cli.config.clone().or_else(find_config_file);
    if let Some(ref path) = path {
        tracing::debug!("Using config file: {}", path.display());
    }
    load_config(path.as_deref()).context("Failed to load configuration")
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli);

    let config = resolve_config(&cli)?;
    let output = cli.output.resolve();

    match cli.command {
        Commands::Cite { ref claim, style } => {
            run_cite(&config, claim, style, output, cli.quiet).await
        }
        Commands::Papers {
            ref query,
            max_results,
        } => run_papers(&config, query, max_results, output, cli.quiet).await,
        Commands::Config { ref action } => run_config(&config, action),
    }
}

async fn run_cite(
    config: &Config,
    claim: &str,
    style: Option<CitationStyle>,
    output: OutputFormat,
    quiet: bool,
) -> Result<()> {
    let claim = claim.trim();
    if claim.chars().count() < MIN_CLAIM_CHARS {
        bail!("Claim must be at least {} characters", MIN_CLAIM_CHARS);
    }

    let agent = CitationAgent::from_config(config)?;

    let spinner = Spinner::new("Searching for supporting papers...", quiet);
    let outcome = match agent.run(claim).await {
        Ok(outcome) => outcome,
        Err(e) => {
            spinner.finish_with_error("Citation search failed");
            return Err(e.into());
        }
    };
    spinner.finish_with_success(&format!(
        "Done after {} iterations ({})",
        outcome.iterations, outcome.stop_reason
    ));

    if output == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    if outcome.citations.is_empty() {
        ui::print_status(Status::Warning, "No citations found for this claim.");
        return Ok(());
    }

    ui::print_section("Citations");
    println!("{}", ui::citations_table(&outcome));
    ui::print_citation_links(&outcome);

    if let Some(ref summary) = outcome.summary {
        println!();
        println!("{} {}", "Summary:".bold(), summary);
    }

    if let Some(style) = style {
        ui::print_section(&format!("Bibliography ({})", style));
        println!("{}", format_bibliography(&outcome.citations, style));
    }

    Ok(())
}

async fn run_papers(
    config: &Config,
    query: &str,
    max_results: Option<usize>,
    output: OutputFormat,
    quiet: bool,
) -> Result<()> {
    if query.trim().is_empty() {
        bail!("Query must not be empty");
    }

    let mut service = RetrievalService::from_config(config)?;
    if let Some(max) = max_results {
        service = service.max_results_per_source(max);
    }

    let spinner = Spinner::new(
        &format!("Searching {} sources...", service.registry().len()),
        quiet,
    );
    let papers = service.retrieve(query).await;
    spinner.finish_with_success(&format!("Found {} unique papers", papers.len()));

    match output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&papers)?),
        _ if papers.is_empty() => {
            ui::print_status(Status::Warning, &format!("No papers found for \"{}\"", query.trim()))
        }
        _ => println!("{}", ui::papers_table(&papers)),
    }

    Ok(())
}

fn run_config(config: &Config, action: &ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Init { path, force } => {
            let path = match path.clone().or_else(default_config_path) {
                Some(path) => path,
                None => bail!("Could not determine a config directory; pass --path"),
            };
            if path.exists() && !force {
                bail!("{} already exists (use --force to overwrite)", path.display());
            }
            Config::default()
                .save(&path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            ui::print_status(
                Status::Success,
                &format!("Wrote default configuration to {}", path.display()),
            );
        }
        ConfigAction::Show => {
            // Never echo secrets
            let mut shown = config.clone();
            if shown.llm.api_key.is_some() {
                shown.llm.api_key = Some("********".to_string());
            }
            if shown.sources.semantic_scholar_api_key.is_some() {
                shown.sources.semantic_scholar_api_key = Some("********".to_string());
            }
            print!("{}", shown.to_toml()?);
        }
    }
    Ok(())
}
