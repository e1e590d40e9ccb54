use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, Instrument};

use xivprep::app::ports::HttpClientPort;
use xivprep::config::Config;
use xivprep::constants;
use xivprep::error::PrepError;
use xivprep::infra::http_client::ReqwestHttp;
use xivprep::logging;
use xivprep::sources::{actions, catalog, statuses};
use xivprep::triggers;
use xivprep::types::RunSummary;

#[derive(Parser)]
#[command(name = "xivprep")]
#[command(about = "Prepares action, status effect and trigger data for the web front-end")]
#[command(version)]
struct Cli {
    /// TOML file overriding the built-in paths, URLs and column positions
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build actions.json from the action and description exports
    Actions,
    /// Build status_effects.json from the status export
    Statuses,
    /// Minify trigger scripts into one bundle
    Triggers,
    /// Download the full action catalog and its icons
    Pull,
    /// Split the pulled catalog into per-action files and a compact index
    Recompile,
    /// Run actions, statuses and triggers in sequence
    All,
}

fn print_summary(summary: &RunSummary) {
    println!("\n📊 Results for {}:", summary.job);
    println!("   Started: {}", summary.started_at.format("%Y-%m-%d %H:%M:%S UTC"));
    println!("   Rows read: {}", summary.rows_read);
    println!("   Written: {}", summary.written);
    println!("   Skipped: {}", summary.skipped);
    println!(
        "   Icons: {} fetched, {} cached, {} failed, {} missing",
        summary.icons_fetched, summary.icons_cached, summary.icon_failures, summary.icons_missing
    );
    println!("   Took: {:.2}s", summary.elapsed.as_secs_f64());
    println!("   Output file: {}", summary.output_file);
}

async fn run_job(name: &str, config: &Config, http: Arc<dyn HttpClientPort>) -> Result<RunSummary> {
    let result = async {
        info!("Starting job");
        match name {
            constants::ACTIONS_JOB => actions::run(config, http).await,
            constants::STATUSES_JOB => statuses::run(config, http).await,
            constants::TRIGGERS_JOB => triggers::run(&config.triggers),
            constants::CATALOG_PULL_JOB => catalog::pull(config, http).await,
            constants::CATALOG_RECOMPILE_JOB => catalog::recompile(config),
            other => Err(PrepError::Config(format!("unknown job {}", other))),
        }
    }
    .instrument(tracing::info_span!("job", job = %name))
    .await;

    result.with_context(|| format!("{} job failed", name))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let _log_guard = logging::init_logging();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    let http: Arc<dyn HttpClientPort> =
        Arc::new(ReqwestHttp::new().context("Failed to build HTTP client")?);

    let jobs: &[&str] = match cli.command {
        Commands::Actions => &[constants::ACTIONS_JOB],
        Commands::Statuses => &[constants::STATUSES_JOB],
        Commands::Triggers => &[constants::TRIGGERS_JOB],
        Commands::Pull => &[constants::CATALOG_PULL_JOB],
        Commands::Recompile => &[constants::CATALOG_RECOMPILE_JOB],
        Commands::All => &[
            constants::ACTIONS_JOB,
            constants::STATUSES_JOB,
            constants::TRIGGERS_JOB,
        ],
    };

    for job in jobs {
        match run_job(job, &config, http.clone()).await {
            Ok(summary) => print_summary(&summary),
            Err(e) => {
                error!("{:#}", e);
                println!("❌ {:#}", e);
                return Err(e);
            }
        }
    }

    println!("✅ Done");
    Ok(())
}
