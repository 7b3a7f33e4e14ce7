//! Outreach CLI
//!
//! Runs one outreach session against an already logged-in browser profile.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use outreach::config::{DEFAULT_FAILURE_LOG, DEFAULT_MAX_CANDIDATES};
use outreach::{
    BrowserSettings, DelayRange, GeneratorSettings, HumanPacer, Outcome, PacingConfig, Provider,
    RunConfig, RunController, RunReport, WebDriverLauncher,
};

#[derive(Parser)]
#[command(name = "outreach")]
#[command(about = "Send personalized connection requests to people at a company")]
struct Cli {
    /// Target company, as shown on its page
    #[arg(long)]
    company: String,

    /// Shared school or organization used to filter people
    #[arg(long)]
    affiliation: String,

    /// Maximum number of people to contact (1-50)
    #[arg(long, default_value_t = DEFAULT_MAX_CANDIDATES)]
    max_candidates: usize,

    /// Numeric school facet to narrow the listing
    #[arg(long)]
    school_facet: Option<String>,

    /// Text generation provider (anthropic or openai)
    #[arg(long, default_value_t = Provider::Anthropic)]
    provider: Provider,

    /// Model override; defaults to ANTHROPIC_MODEL / OPENAI_MODEL, then the provider default
    #[arg(long)]
    model: Option<String>,

    /// Seconds to wait for the provider before using the fallback note
    #[arg(long, default_value_t = 30)]
    generator_timeout: u64,

    /// File that receives one line per failed request
    #[arg(long, default_value = DEFAULT_FAILURE_LOG)]
    failure_log: PathBuf,

    /// Shortest pause between people, in seconds (never below 45)
    #[arg(long, default_value_t = 45)]
    min_gap: u64,

    /// Longest pause between people, in seconds
    #[arg(long, default_value_t = 120)]
    max_gap: u64,

    /// Env file with API keys and browser settings
    #[arg(long, default_value = ".env")]
    env_file: PathBuf,

    /// List matching people without contacting anyone
    #[arg(long)]
    discover_only: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,outreach=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();

    match dotenvy::from_path(&cli.env_file) {
        Ok(()) => tracing::debug!(path = %cli.env_file.display(), "Loaded env file"),
        Err(e) if e.not_found() => {
            tracing::debug!(path = %cli.env_file.display(), "No env file, using process environment")
        }
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to load {}", cli.env_file.display()))
        }
    }

    let config = RunConfig::new(&cli.company, &cli.affiliation)
        .with_max_candidates(cli.max_candidates)
        .with_school_facet(cli.school_facet.clone())
        .with_failure_log(&cli.failure_log);

    let generator = GeneratorSettings::from_env(cli.provider)
        .with_model(cli.model.clone())
        .with_timeout(Duration::from_secs(cli.generator_timeout));
    let browser = BrowserSettings::from_env();
    tracing::info!(
        provider = %cli.provider,
        model = generator.model(),
        webdriver = %browser.webdriver_url,
        "Configuration loaded"
    );

    let pacer = HumanPacer::new(
        PacingConfig::default().with_candidate_gap(DelayRange::secs(cli.min_gap, cli.max_gap)),
    );
    let applied = pacer.config().between_candidates.min.as_secs();
    if cli.min_gap < applied {
        tracing::warn!(
            requested = cli.min_gap,
            applied,
            "Minimum gap raised to the floor"
        );
    }

    let controller =
        RunController::from_settings(config, &generator, WebDriverLauncher::new(&browser))
            .context("Invalid configuration")?
            .with_pacer(Arc::new(pacer))
            .discover_only(cli.discover_only);

    let report = controller.run().await.context("Run aborted")?;

    if cli.discover_only {
        print_candidates(&report)?;
    } else {
        print_summary(&report, &cli.failure_log);
    }
    Ok(())
}

/// One JSON object per line on stdout.
fn print_candidates(report: &RunReport) -> Result<()> {
    for candidate in &report.discovered {
        let line = serde_json::to_string(candidate).context("Failed to serialize candidate")?;
        println!("{}", line);
    }
    Ok(())
}

fn print_summary(report: &RunReport, failure_log: &std::path::Path) {
    println!();
    println!("{}", "Outreach summary".bright_cyan().bold());
    println!("  run:        {}", report.run_id);
    println!(
        "  duration:   {}s",
        (report.finished_at - report.started_at).num_seconds()
    );
    println!("  discovered: {}", report.discovered.len());
    println!("  sent:       {}", report.sent().to_string().green());
    println!("  failed:     {}", report.failed().to_string().red());

    for attempt in &report.attempts {
        let marker = match attempt.outcome {
            Outcome::Sent => "✓".green(),
            Outcome::Failed => "✗".red(),
        };
        match &attempt.failure_reason {
            Some(reason) => println!(
                "  {} {} ({})",
                marker,
                attempt.candidate.display_name,
                reason.dimmed()
            ),
            None => println!("  {} {}", marker, attempt.candidate.display_name),
        }
    }

    if report.failed() > 0 {
        println!();
        println!(
            "Failed requests were appended to {}",
            failure_log.display().to_string().yellow()
        );
    }
}
