//! Salesflow CLI
//!
//! Thin wrapper over the orchestrator, wired to the bundled deterministic
//! providers so every workflow runs locally.

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

use salesflow::provider::{MemoryCheckpoint, SyntheticScanner, TemplateComposer};
use salesflow::workflow::{workflow_options, WorkflowRequest};
use salesflow::{Config, SalesOrchestrator, ScanCriteria};

#[derive(Parser)]
#[command(name = "salesflow")]
#[command(author, version, about = "Outbound-sales pipeline orchestration")]
#[command(propagate_version = true)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan for leads and store them
    Discover {
        /// Titles to search for
        #[arg(long)]
        title: Vec<String>,

        /// Industries to search in
        #[arg(long)]
        industry: Vec<String>,

        /// Minimum provider score (0-100)
        #[arg(long, default_value = "60")]
        min_score: f64,

        /// Maximum number of leads
        #[arg(long, default_value = "50")]
        max_results: usize,
    },

    /// Top 5 leads with deep-personalized outreach
    QuickWins,

    /// Outreach campaign over a wider cohort
    Outreach {
        /// Campaign size
        #[arg(long, default_value = "25")]
        campaign_size: usize,
    },

    /// Nurture every stored lead
    Nurture,

    /// Book meetings for unscheduled prospects
    Schedule,

    /// Pipeline status report
    Report,

    /// Run the full pipeline end to end
    Pipeline,

    /// Department status snapshot
    Status,

    /// List available workflows
    Options,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("salesflow=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("salesflow=info"))
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let config = Config::load(cli.config.as_deref())?;
    let session_id = Uuid::new_v4().to_string();

    let mut orchestrator = SalesOrchestrator::new(config, session_id)
        .with_scanner(Arc::new(SyntheticScanner::new()))
        .with_composer(Arc::new(TemplateComposer::new()))
        .with_checkpoint(Arc::new(MemoryCheckpoint::new()));

    let request = match cli.command {
        Commands::Discover {
            title,
            industry,
            min_score,
            max_results,
        } => WorkflowRequest::LeadGeneration {
            criteria: ScanCriteria {
                titles: title,
                industries: industry,
                min_score,
                max_results,
                ..Default::default()
            },
        },
        Commands::QuickWins => WorkflowRequest::QuickWins {
            industries: Vec::new(),
            titles: Vec::new(),
        },
        Commands::Outreach { campaign_size } => WorkflowRequest::FullOutreach {
            industries: Vec::new(),
            titles: Vec::new(),
            company_sizes: Vec::new(),
            message_tone: None,
            min_score: None,
            campaign_size: Some(campaign_size),
        },
        Commands::Nurture => WorkflowRequest::LeadNurturing { lead_ids: Vec::new() },
        Commands::Schedule => WorkflowRequest::MeetingScheduling { meetings: Vec::new() },
        Commands::Report => WorkflowRequest::PipelineReporting,
        Commands::Pipeline => WorkflowRequest::FullPipeline,
        Commands::Status => {
            println!("{}", serde_json::to_string_pretty(&orchestrator.status())?);
            return Ok(());
        }
        Commands::Options => {
            println!("{}", serde_json::to_string_pretty(&workflow_options())?);
            return Ok(());
        }
    };

    let envelope = orchestrator.execute(request).await;
    println!("{}", serde_json::to_string_pretty(&envelope)?);

    if envelope.success {
        Ok(())
    } else {
        std::process::exit(1)
    }
}
