//! Workflow surface: requests, response envelopes, and stage executors
//!
//! A workflow is a named, externally invokable operation; either a single
//! stage (discovery, nurture, scheduling, reporting), a composed outreach
//! campaign, or the fixed full-pipeline sequence. Every invocation returns
//! an [`Envelope`]; failures never propagate past the orchestrator.

pub mod discovery;
pub mod nurture;
pub mod orchestrator;
pub mod schedule;

use serde::{Deserialize, Serialize};

use crate::metrics::Metrics;
use crate::provider::{ScanCriteria, Tone};
use crate::report::PipelineReport;
use crate::store::{Lead, ScheduledMeeting};
use crate::Error;

/// The named workflows the orchestrator can dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowKind {
    LeadGeneration,
    QuickWins,
    FullOutreach,
    LeadNurturing,
    MeetingScheduling,
    PipelineReporting,
    FullPipeline,
}

impl WorkflowKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowKind::LeadGeneration => "lead_generation",
            WorkflowKind::QuickWins => "quick_wins",
            WorkflowKind::FullOutreach => "full_outreach",
            WorkflowKind::LeadNurturing => "lead_nurturing",
            WorkflowKind::MeetingScheduling => "meeting_scheduling",
            WorkflowKind::PipelineReporting => "pipeline_reporting",
            WorkflowKind::FullPipeline => "full_pipeline",
        }
    }
}

impl std::fmt::Display for WorkflowKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A workflow invocation. Each variant carries its own strongly-typed
/// parameter set; unspecified fields take documented defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "workflow_type", rename_all = "snake_case")]
pub enum WorkflowRequest {
    /// Scan for leads and insert them into the store
    LeadGeneration {
        #[serde(default)]
        criteria: ScanCriteria,
    },
    /// Top-scoring leads with deep-personalized outreach (floor 80, cap 5)
    QuickWins {
        #[serde(default)]
        industries: Vec<String>,
        #[serde(default)]
        titles: Vec<String>,
    },
    /// Campaign over a larger cohort with averaged message quality scores
    FullOutreach {
        #[serde(default)]
        industries: Vec<String>,
        #[serde(default)]
        titles: Vec<String>,
        #[serde(default)]
        company_sizes: Vec<String>,
        #[serde(default)]
        message_tone: Option<Tone>,
        #[serde(default)]
        min_score: Option<f64>,
        #[serde(default)]
        campaign_size: Option<usize>,
    },
    /// Outreach and qualification over existing leads (empty = all)
    LeadNurturing {
        #[serde(default)]
        lead_ids: Vec<String>,
    },
    /// Book meetings (empty = every unscheduled prospect)
    MeetingScheduling {
        #[serde(default)]
        meetings: Vec<MeetingRequest>,
    },
    /// Read-only pipeline status report
    PipelineReporting,
    /// discovery → nurture → scheduling → reporting, in that order
    FullPipeline,
}

impl WorkflowRequest {
    pub fn kind(&self) -> WorkflowKind {
        match self {
            WorkflowRequest::LeadGeneration { .. } => WorkflowKind::LeadGeneration,
            WorkflowRequest::QuickWins { .. } => WorkflowKind::QuickWins,
            WorkflowRequest::FullOutreach { .. } => WorkflowKind::FullOutreach,
            WorkflowRequest::LeadNurturing { .. } => WorkflowKind::LeadNurturing,
            WorkflowRequest::MeetingScheduling { .. } => WorkflowKind::MeetingScheduling,
            WorkflowRequest::PipelineReporting => WorkflowKind::PipelineReporting,
            WorkflowRequest::FullPipeline => WorkflowKind::FullPipeline,
        }
    }
}

/// One entry in a scheduling batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeetingRequest {
    pub prospect_id: String,
    #[serde(default = "default_meeting_type")]
    pub meeting_type: String,
    #[serde(default)]
    pub preferred_times: Vec<String>,
}

pub(crate) fn default_meeting_type() -> String {
    "discovery_call".to_string()
}

impl MeetingRequest {
    pub fn discovery_call(prospect_id: impl Into<String>) -> Self {
        Self {
            prospect_id: prospect_id.into(),
            meeting_type: default_meeting_type(),
            preferred_times: Vec::new(),
        }
    }
}

/// A failure scoped to a single item inside a batch stage. Collected, never
/// fatal to the batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemError {
    /// Id of the lead/prospect the failure is scoped to
    pub id: String,
    pub message: String,
}

impl ItemError {
    pub fn new(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            message: message.into(),
        }
    }
}

/// Result of a discovery run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryOutcome {
    pub leads_found: usize,
    /// Ids of every inserted lead, in insertion order
    pub lead_ids: Vec<String>,
    /// Up to 10 leads with their full attribute set
    pub preview: Vec<Lead>,
}

/// Result of a nurture batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NurtureOutcome {
    pub leads_contacted: usize,
    pub emails_sent: usize,
    pub prospects_qualified: usize,
    pub errors: Vec<ItemError>,
}

/// Result of a scheduling batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchedulingOutcome {
    pub meetings_requested: usize,
    pub meetings_confirmed: usize,
    pub calendar_conflicts: usize,
    pub scheduled_meetings: Vec<ScheduledMeeting>,
    pub errors: Vec<ItemError>,
}

/// One composed message in a campaign.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignMessage {
    pub lead_id: String,
    pub contact_name: String,
    pub company_name: String,
    pub subject: String,
    /// Truncated to 200 characters for the envelope
    pub body: String,
    pub personalization_score: f64,
    pub predicted_response_rate: f64,
}

/// Aggregate view of an outreach campaign.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CampaignSummary {
    pub leads_found: usize,
    pub messages_generated: usize,
    pub avg_personalization_score: f64,
    pub avg_response_rate: f64,
    pub estimated_responses: u64,
}

/// Result of quick-wins or full-outreach campaigns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutreachOutcome {
    pub summary: CampaignSummary,
    /// Up to 5 messages for preview
    pub messages: Vec<CampaignMessage>,
    pub errors: Vec<ItemError>,
}

/// Workflow-specific payload inside an [`Envelope`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "stage", content = "data", rename_all = "snake_case")]
pub enum WorkflowOutcome {
    Discovery(DiscoveryOutcome),
    Outreach(OutreachOutcome),
    Nurture(NurtureOutcome),
    Scheduling(SchedulingOutcome),
    Report(PipelineReport),
    /// One envelope per stage of a full-pipeline run, in execution order
    Pipeline(Vec<Envelope>),
}

/// The structured response every workflow invocation returns, success or
/// failure. Callers never see an unhandled fault.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    pub success: bool,
    pub workflow_type: WorkflowKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<WorkflowOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remediation: Option<String>,
    /// Wall-clock execution time in seconds
    pub execution_time: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<Metrics>,
}

impl Envelope {
    pub fn completed(
        workflow_type: WorkflowKind,
        outcome: WorkflowOutcome,
        execution_time: f64,
        metrics: Metrics,
    ) -> Self {
        Self {
            success: true,
            workflow_type,
            outcome: Some(outcome),
            error: None,
            error_type: None,
            remediation: None,
            execution_time,
            metrics: Some(metrics),
        }
    }

    pub fn failed(workflow_type: WorkflowKind, error: &Error, execution_time: f64) -> Self {
        Self {
            success: false,
            workflow_type,
            outcome: None,
            error: Some(error.to_string()),
            error_type: Some(error.kind().to_string()),
            remediation: Some("Contact support if this persists".to_string()),
            execution_time,
            metrics: None,
        }
    }
}

/// A human-facing description of one invokable workflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowOption {
    pub id: WorkflowKind,
    pub name: String,
    pub description: String,
    pub estimated_time: String,
    pub parameters: Vec<String>,
}

/// Static catalog of the available workflows.
pub fn workflow_options() -> Vec<WorkflowOption> {
    fn opt(id: WorkflowKind, name: &str, desc: &str, time: &str, params: &[&str]) -> WorkflowOption {
        WorkflowOption {
            id,
            name: name.to_string(),
            description: desc.to_string(),
            estimated_time: time.to_string(),
            parameters: params.iter().map(|p| p.to_string()).collect(),
        }
    }

    vec![
        opt(
            WorkflowKind::LeadGeneration,
            "Lead Generation",
            "Find and qualify potential leads",
            "10-30 seconds",
            &["industries", "titles", "company_sizes", "max_results"],
        ),
        opt(
            WorkflowKind::QuickWins,
            "Quick Wins",
            "Find top 5 leads and prepare outreach",
            "20-40 seconds",
            &["industries", "titles"],
        ),
        opt(
            WorkflowKind::FullOutreach,
            "Full Outreach Campaign",
            "Find leads and generate personalized messages",
            "30-60 seconds",
            &["industries", "titles", "company_sizes", "message_tone", "campaign_size"],
        ),
        opt(
            WorkflowKind::LeadNurturing,
            "Lead Nurturing",
            "Follow up with existing leads",
            "15-30 seconds",
            &["lead_ids"],
        ),
        opt(
            WorkflowKind::MeetingScheduling,
            "Meeting Scheduling",
            "Schedule meetings with qualified prospects",
            "20-45 seconds",
            &["meetings"],
        ),
        opt(
            WorkflowKind::PipelineReporting,
            "Pipeline Report",
            "Generate comprehensive pipeline status",
            "5-15 seconds",
            &[],
        ),
        opt(
            WorkflowKind::FullPipeline,
            "Full Pipeline",
            "Run discovery, nurture, scheduling and reporting end to end",
            "1-3 minutes",
            &[],
        ),
    ]
}

/// Rough execution-time estimate in seconds. Flat for catalog-style
/// workflows, per-item otherwise.
pub fn estimate_execution_time(kind: WorkflowKind, count: usize) -> f64 {
    match kind {
        WorkflowKind::QuickWins => 15.0,
        WorkflowKind::PipelineReporting => 5.0,
        WorkflowKind::LeadGeneration => 0.2 * count as f64,
        WorkflowKind::FullOutreach => 0.5 * count as f64,
        WorkflowKind::LeadNurturing => 0.3 * count as f64,
        WorkflowKind::MeetingScheduling => 0.4 * count as f64,
        WorkflowKind::FullPipeline => 60.0,
    }
}
