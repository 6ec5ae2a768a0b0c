use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use interview_digest::batch::{self, BatchOptions, BatchOutcome};
use interview_digest::config::{load_env_files, Config};
use interview_digest::llm::{catalog, InterviewOverrides, ModelChoice, OpenRouterClient};
use interview_digest::report::{render_console_summary, render_quality_summary};
use interview_digest::themes::{all_themes, Hypothesis};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(
    name = "interview-digest",
    about = "Turn interview transcripts into cited, quality-checked analysis reports",
    version
)]
struct Cli {
    /// Theme slug to analyze (e.g. bill-of-lading)
    slug: Option<String>,

    /// Only analyze the first N sessions
    #[arg(long, value_name = "N")]
    limit: Option<usize>,

    /// Model catalog key (see --list-models)
    #[arg(long, value_name = "KEY", conflicts_with = "auto_model")]
    model: Option<String>,

    /// Pick the model from the estimated prompt size
    #[arg(long)]
    auto_model: bool,

    /// Research file (.json or .md) to include as background
    #[arg(long, value_name = "PATH")]
    deep_research: Option<PathBuf>,

    /// JSON file with interview description, overview, themes and questions
    #[arg(long, value_name = "PATH")]
    interview_config: Option<PathBuf>,

    /// Directory containing the session and message CSV exports
    #[arg(long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Parent directory for run output (default: logs)
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Fail without writing anything if the report fails the quality check
    #[arg(long)]
    require_quality: bool,

    /// Draft hypotheses for the slug from sample sessions instead of running an analysis
    #[arg(long, conflicts_with_all = ["deep_research", "require_quality"])]
    draft_hypotheses: bool,

    /// Print the model catalog and exit
    #[arg(long)]
    list_models: bool,

    /// Print the registered themes and exit
    #[arg(long)]
    list_themes: bool,

    /// Debug logging
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Errors only
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("interview-digest error: {error:#}");
        std::process::exit(1);
    }
}

fn init_tracing(quiet: bool, verbose: bool) -> Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "info"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("INTERVIEW_DIGEST_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}

fn print_models() {
    println!("Available models:");
    for model in catalog() {
        println!(
            "  {:<26} {:<42} {:>9} ctx / {:>6} out  {}",
            model.key,
            model.name,
            model.max_context_tokens,
            model.max_output_tokens,
            model.description
        );
    }
}

fn print_themes() {
    println!("Registered themes:");
    for theme in all_themes() {
        println!(
            "  {:<22} {} ({} hypotheses)",
            theme.slug,
            theme.title,
            theme.hypotheses.len()
        );
    }
}

fn print_hypotheses(slug: &str, hypotheses: &[Hypothesis]) {
    println!("Drafted hypotheses for {}:", slug);
    for hypothesis in hypotheses {
        println!(
            "  {:<4} [{}] {}\n       {}",
            hypothesis.id,
            hypothesis.priority.as_str(),
            hypothesis.category,
            hypothesis.description
        );
    }
}

fn load_overrides(path: &Path) -> Result<InterviewOverrides> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read interview config '{}'", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Invalid interview config '{}'", path.display()))
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.quiet, cli.verbose)?;
    load_env_files();

    if cli.list_models || cli.list_themes {
        if cli.list_models {
            print_models();
        }
        if cli.list_themes {
            print_themes();
        }
        return Ok(());
    }

    let Some(slug) = cli.slug else {
        Cli::command().print_help()?;
        println!();
        print_models();
        return Ok(());
    };

    let config = Config::load();
    let model = if cli.auto_model {
        ModelChoice::Auto
    } else if let Some(key) = cli.model {
        ModelChoice::Manual(key)
    } else if let Some(key) = config.default_model_key()? {
        ModelChoice::Manual(key.to_string())
    } else {
        ModelChoice::default()
    };
    let overrides = cli
        .interview_config
        .as_deref()
        .map(load_overrides)
        .transpose()?;

    let options = BatchOptions {
        slug,
        limit: cli.limit,
        model,
        research_path: cli.deep_research,
        overrides,
        data_dir: cli.data_dir.unwrap_or_else(|| config.data_dir()),
        output_dir: cli.output_dir.unwrap_or_else(|| config.output_dir()),
        require_quality: cli.require_quality,
        max_output_tokens: config.max_output_tokens,
    };

    let connect = || -> interview_digest::Result<OpenRouterClient> {
        let client = OpenRouterClient::new(config.api_key()?)?
            .with_timeout(config.request_timeout_secs());
        Ok(match config.api_url.as_deref() {
            Some(url) => client.with_endpoint(url),
            None => client,
        })
    };

    if cli.draft_hypotheses {
        let hypotheses = batch::draft_hypotheses(&options, connect).await?;
        print_hypotheses(&options.slug, &hypotheses);
        return Ok(());
    }

    match batch::run(&options, connect).await? {
        BatchOutcome::Completed(summary) => {
            println!("{}\n", render_console_summary(&summary.stats));
            println!("{}", render_quality_summary(&summary.quality));
            println!("Report:       {}", summary.report_path.display());
            println!("Quantitative: {}", summary.quantitative_path.display());
            println!("Metadata:     {}", summary.metadata_path.display());
        }
        BatchOutcome::NoSessions { slug, known_slugs } => {
            println!("No sessions found for slug: {}", slug);
            if known_slugs.is_empty() {
                println!("The sessions export contains no sessions.");
            } else {
                println!("Available slugs:");
                for known in known_slugs {
                    println!("  - {}", known);
                }
            }
        }
    }

    Ok(())
}
