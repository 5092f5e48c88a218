//! Salesflow: outbound-sales pipeline orchestration
//!
//! A small engine that drives a multi-stage sales pipeline:
//! - **Discovery**: find candidate leads and score them
//! - **Nurture**: outreach, follow-ups, and qualification into prospects
//! - **Scheduling**: book meetings with unscheduled prospects
//! - **Reporting**: read-only pipeline health and recommendations
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │         SalesOrchestrator               │
//! │  execute(request) → Envelope            │
//! └────────────────────┬────────────────────┘
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │   Stage executors (per-item isolation)  │
//! │  discovery → nurture → schedule → report│
//! └────────────────────┬────────────────────┘
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │   EntityStore + Metrics                 │
//! │  leads / prospects / meetings           │
//! └─────────────────────────────────────────┘
//! ```
//!
//! External collaborators (lead scanner, outreach composer, checkpoint
//! store) are optional trait objects; when a handle is absent the stage
//! falls back to a deterministic synthetic implementation with the same
//! output shape.

pub mod config;
pub mod metrics;
pub mod provider;
pub mod report;
pub mod scoring;
pub mod store;
pub mod workflow;

// Re-exports for convenience
pub use config::Config;
pub use metrics::Metrics;
pub use provider::{CheckpointStore, LeadScanner, OutreachComposer, ScanCriteria};
pub use report::{PipelineReport, StatusReport};
pub use scoring::ScoringCriteria;
pub use store::{EntityStore, Lead, LeadStatus, Prospect, ScheduledMeeting};
pub use workflow::orchestrator::SalesOrchestrator;
pub use workflow::{Envelope, WorkflowKind, WorkflowRequest};

/// Crate-level error type
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Lead scanner error: {0}")]
    Scanner(String),

    #[error("Outreach composer error: {0}")]
    Composer(String),

    #[error("Checkpoint error: {0}")]
    Checkpoint(String),

    #[error("Scheduling error: {0}")]
    Scheduling(String),

    #[error("Unknown lead: {0}")]
    UnknownLead(String),

    #[error("Unknown prospect: {0}")]
    UnknownProspect(String),

    #[error("Workflow error: {0}")]
    Workflow(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl Error {
    /// Short machine-readable tag for failure envelopes.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Config(_) => "config",
            Error::Scanner(_) => "scanner",
            Error::Composer(_) => "composer",
            Error::Checkpoint(_) => "checkpoint",
            Error::Scheduling(_) => "scheduling",
            Error::UnknownLead(_) => "unknown_lead",
            Error::UnknownProspect(_) => "unknown_prospect",
            Error::Workflow(_) => "workflow",
            Error::Io(_) => "io",
            Error::Json(_) => "json",
            Error::Toml(_) => "toml",
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
