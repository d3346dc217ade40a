//! bugbug-nag - Main Entry Point
//!
//! Runs the defect/enhancement/task check once and prints the report.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bugbug_nag::constants;
use bugbug_nag::logic::bugzilla::{BugzillaClient, BugzillaConfig};
use bugbug_nag::logic::model::{retrieve_model, DefectEnhancementTaskModel};
use bugbug_nag::logic::nag::defect_enhancement_task::TOOL_NAME;
use bugbug_nag::logic::nag::{render_report, BugbugScript, DefectEnhancementTask, NagCheck, ReportFormat};
use bugbug_nag::ToolsConfig;

#[derive(Parser)]
#[command(name = "bugbug-nag")]
#[command(about = "Report bugs whose type disagrees with the bugbug classifier", long_about = None)]
#[command(version)]
struct Cli {
    /// Run date: today, yesterday, tomorrow or YYYY-MM-DD
    #[arg(short = 'D', long, default_value = "today")]
    date: String,

    /// Analyze these bugs instead of querying recent ones
    #[arg(long, value_delimiter = ',')]
    bug_ids: Vec<u64>,

    /// Tools config file (defaults to $AUTONAG_CONFIG or configs/tools.json)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Model bundle directory, overrides `model_path` from the config
    #[arg(long)]
    model: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    format: ReportFormat,
}

fn main() -> anyhow::Result<()> {
    // Load .env before anything reads the environment
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "bugbug_nag=info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config_path = cli
        .config
        .unwrap_or_else(|| PathBuf::from(constants::get_tools_config_path()));
    let mut config = ToolsConfig::load(&config_path)?
        .nag_config(TOOL_NAME)
        .with_context(|| format!("loading {} settings from {}", TOOL_NAME, config_path.display()))?;
    if let Some(model) = cli.model {
        config.model_path = model;
    }

    let bugzilla = BugzillaClient::new(BugzillaConfig {
        timeout_seconds: config.bz_query_timeout,
        ..Default::default()
    });
    tracing::info!("Bugzilla: {}", bugzilla.base_url());

    let model_dir = retrieve_model(&config).context("retrieving model")?;
    let model = DefectEnhancementTaskModel::load(&model_dir).context("loading model")?;
    tracing::info!("Model classes: {}", model.metadata().classes.join(", "));

    let check = DefectEnhancementTask::new(BugbugScript::new(bugzilla, model), config);
    tracing::info!(
        "Running {} for {} (confidence >= {}, {} days back)",
        check.name(),
        cli.date,
        check.config().confidence_threshold,
        check.config().days_lookup
    );

    let results = check.get_bugs(&cli.date, &cli.bug_ids)?;
    let report = render_report(&check, results, cli.format)?;
    print!("{}", report);

    Ok(())
}
