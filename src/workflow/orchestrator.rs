//! Pipeline orchestrator
//!
//! Dispatches named workflows against the entity store, isolating failures
//! per stage and per item, and folds every completed execution into the
//! running metrics aggregate.
//!
//! One orchestrator owns one pipeline: the store, the metrics, and
//! optional handles to the external collaborators. `execute` takes
//! `&mut self`, which is the single-writer discipline; concurrent callers
//! wrap the orchestrator in a mutex or an actor task.

use std::sync::Arc;
use std::time::Instant;

use tracing::{error, info, warn};

use super::{
    discovery, nurture, schedule, CampaignMessage, CampaignSummary, Envelope, ItemError,
    OutreachOutcome, WorkflowKind, WorkflowOutcome, WorkflowRequest,
};
use crate::config::Config;
use crate::metrics::Metrics;
use crate::provider::{
    CheckpointStore, LeadScanner, OutreachComposer, OutreachConfig, PersonalizationDepth,
    ScanCriteria, TemplateComposer, Tone,
};
use crate::report::{self, PipelineReport, StatusReport};
use crate::store::EntityStore;
use crate::Result;

/// Quick wins scans with a high floor and a small cap.
const QUICK_WINS_MIN_SCORE: f64 = 80.0;
const QUICK_WINS_CAP: usize = 5;
/// Full outreach casts wider at a lower floor.
const FULL_OUTREACH_MIN_SCORE: f64 = 65.0;
const FULL_OUTREACH_DEFAULT_SIZE: usize = 25;
/// Campaign envelopes preview at most this many messages.
const MESSAGE_PREVIEW_LIMIT: usize = 5;
/// Message bodies are truncated to this length in previews.
const BODY_PREVIEW_CHARS: usize = 200;

/// Coordinates the sales pipeline for one session.
pub struct SalesOrchestrator {
    config: Config,
    session_id: String,
    store: EntityStore,
    metrics: Metrics,
    scanner: Option<Arc<dyn LeadScanner>>,
    composer: Option<Arc<dyn OutreachComposer>>,
    checkpoint: Option<Arc<dyn CheckpointStore>>,
    /// Used for campaigns when no composer handle is configured
    fallback_composer: TemplateComposer,
}

impl SalesOrchestrator {
    pub fn new(config: Config, session_id: impl Into<String>) -> Self {
        let session_id = session_id.into();
        info!("Sales orchestrator initialized for session {}", session_id);
        Self {
            config,
            session_id,
            store: EntityStore::new(),
            metrics: Metrics::new(),
            scanner: None,
            composer: None,
            checkpoint: None,
            fallback_composer: TemplateComposer::new(),
        }
    }

    pub fn with_scanner(mut self, scanner: Arc<dyn LeadScanner>) -> Self {
        self.scanner = Some(scanner);
        self
    }

    pub fn with_composer(mut self, composer: Arc<dyn OutreachComposer>) -> Self {
        self.composer = Some(composer);
        self
    }

    pub fn with_checkpoint(mut self, checkpoint: Arc<dyn CheckpointStore>) -> Self {
        self.checkpoint = Some(checkpoint);
        self
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Execute a named workflow and return its envelope.
    ///
    /// This is the single top-level safety net: any error escaping a
    /// stage's own handling is converted into a failure envelope here.
    /// Completed executions (success or failure) are folded into the
    /// metrics; a full-pipeline run folds per stage instead of once.
    pub async fn execute(&mut self, request: WorkflowRequest) -> Envelope {
        if let WorkflowRequest::FullPipeline = request {
            info!("Executing sales workflow: {}", WorkflowKind::FullPipeline);
            let start = Instant::now();
            let stages = self.run_full_pipeline().await;
            return Envelope::completed(
                WorkflowKind::FullPipeline,
                WorkflowOutcome::Pipeline(stages),
                start.elapsed().as_secs_f64(),
                self.metrics.clone(),
            );
        }

        self.execute_single(request).await
    }

    /// Execute one non-composed workflow: dispatch, catch, fold metrics.
    async fn execute_single(&mut self, request: WorkflowRequest) -> Envelope {
        let kind = request.kind();
        info!("Executing sales workflow: {}", kind);
        let start = Instant::now();

        match self.dispatch(request).await {
            Ok(outcome) => {
                let elapsed = start.elapsed().as_secs_f64();
                self.metrics.record_execution(elapsed, true);
                self.fold_counters(kind, &outcome);
                Envelope::completed(kind, outcome, elapsed, self.metrics.clone())
            }
            Err(e) => {
                let elapsed = start.elapsed().as_secs_f64();
                error!("Workflow {} failed: {}", kind, e);
                self.metrics.record_execution(elapsed, false);
                Envelope::failed(kind, &e, elapsed)
            }
        }
    }

    async fn dispatch(&mut self, request: WorkflowRequest) -> Result<WorkflowOutcome> {
        match request {
            WorkflowRequest::LeadGeneration { criteria } => {
                let outcome = self.run_discovery(&criteria).await?;
                Ok(WorkflowOutcome::Discovery(outcome))
            }
            WorkflowRequest::QuickWins { industries, titles } => {
                let criteria = ScanCriteria {
                    industries: defaulted(industries, &["SaaS", "FinTech"]),
                    titles: defaulted(titles, &["CTO", "VP", "Director"]),
                    min_score: QUICK_WINS_MIN_SCORE,
                    max_results: QUICK_WINS_CAP,
                    ..Default::default()
                };
                let outcome = self
                    .run_campaign(&criteria, Tone::Formal, PersonalizationDepth::Deep)
                    .await?;
                Ok(WorkflowOutcome::Outreach(outcome))
            }
            WorkflowRequest::FullOutreach {
                industries,
                titles,
                company_sizes,
                message_tone,
                min_score,
                campaign_size,
            } => {
                let criteria = ScanCriteria {
                    industries,
                    titles,
                    company_sizes,
                    min_score: min_score.unwrap_or(FULL_OUTREACH_MIN_SCORE),
                    max_results: campaign_size.unwrap_or(FULL_OUTREACH_DEFAULT_SIZE),
                };
                let outcome = self
                    .run_campaign(
                        &criteria,
                        message_tone.unwrap_or(Tone::Formal),
                        PersonalizationDepth::Moderate,
                    )
                    .await?;
                Ok(WorkflowOutcome::Outreach(outcome))
            }
            WorkflowRequest::LeadNurturing { lead_ids } => {
                let outcome = nurture::run(
                    &mut self.store,
                    self.composer.as_deref(),
                    &self.config.sender,
                    &lead_ids,
                )
                .await?;
                Ok(WorkflowOutcome::Nurture(outcome))
            }
            WorkflowRequest::MeetingScheduling { meetings } => {
                let outcome = schedule::run(&mut self.store, &meetings).await?;
                Ok(WorkflowOutcome::Scheduling(outcome))
            }
            WorkflowRequest::PipelineReporting => {
                info!("Generating pipeline status report");
                Ok(WorkflowOutcome::Report(self.report()))
            }
            WorkflowRequest::FullPipeline => {
                // Handled in execute; reaching here is a programming error
                Err(crate::Error::Workflow(
                    "full_pipeline is composed, not dispatched".to_string(),
                ))
            }
        }
    }

    async fn run_discovery(&mut self, criteria: &ScanCriteria) -> Result<super::DiscoveryOutcome> {
        discovery::run(
            &mut self.store,
            self.scanner.as_deref(),
            self.checkpoint.as_deref(),
            &self.config.scoring,
            criteria,
            &self.session_id,
            self.config.checkpoint.ttl_secs,
        )
        .await
    }

    /// Discovery followed by message composition for every result.
    async fn run_campaign(
        &mut self,
        criteria: &ScanCriteria,
        tone: Tone,
        depth: PersonalizationDepth,
    ) -> Result<OutreachOutcome> {
        let discovered = self.run_discovery(criteria).await?;

        let outreach_config = OutreachConfig {
            category: "cold_outreach".to_string(),
            tone,
            personalization_depth: depth,
            sender: self.config.sender.clone(),
        };

        let mut messages = Vec::new();
        let mut errors = Vec::new();
        let mut total_personalization = 0.0;
        let mut total_response_rate = 0.0;

        for id in &discovered.lead_ids {
            let lead = match self.store.lead(id) {
                Some(lead) => lead.clone(),
                None => continue,
            };

            let composed = match &self.composer {
                Some(composer) => composer.compose(&lead, &outreach_config).await,
                None => self.fallback_composer.compose(&lead, &outreach_config).await,
            };

            match composed {
                Ok(message) => {
                    total_personalization += message.personalization_score;
                    total_response_rate += message.predicted_response_rate;
                    messages.push(CampaignMessage {
                        lead_id: lead.id.clone(),
                        contact_name: lead.name.clone(),
                        company_name: lead.company.clone(),
                        subject: message.subject,
                        body: truncate(&message.body, BODY_PREVIEW_CHARS),
                        personalization_score: message.personalization_score,
                        predicted_response_rate: message.predicted_response_rate,
                    });
                }
                Err(e) => {
                    warn!("Failed to compose outreach for lead {}: {}", lead.id, e);
                    errors.push(ItemError::new(lead.id.clone(), e.to_string()));
                }
            }
        }

        let generated = messages.len();
        let (avg_personalization, avg_response) = if generated > 0 {
            (
                total_personalization / generated as f64,
                total_response_rate / generated as f64,
            )
        } else {
            (0.0, 0.0)
        };

        let summary = CampaignSummary {
            leads_found: discovered.leads_found,
            messages_generated: generated,
            avg_personalization_score: avg_personalization,
            avg_response_rate: avg_response,
            estimated_responses: (generated as f64 * avg_response).round() as u64,
        };

        messages.truncate(MESSAGE_PREVIEW_LIMIT);
        Ok(OutreachOutcome {
            summary,
            messages,
            errors,
        })
    }

    /// Fixed stage sequence with default criteria, so each stage operates
    /// over the store accumulated by the ones before it. Every stage's
    /// envelope is recorded and a failed stage never stops the next one.
    async fn run_full_pipeline(&mut self) -> Vec<Envelope> {
        let stages = [
            WorkflowRequest::LeadGeneration {
                criteria: ScanCriteria::default(),
            },
            WorkflowRequest::LeadNurturing { lead_ids: Vec::new() },
            WorkflowRequest::MeetingScheduling { meetings: Vec::new() },
            WorkflowRequest::PipelineReporting,
        ];

        let mut results = Vec::with_capacity(stages.len());
        for stage in stages {
            let kind = stage.kind();
            let envelope = self.execute_single(stage).await;
            if !envelope.success {
                warn!("Pipeline stage {} failed, continuing", kind);
            }
            results.push(envelope);
        }
        results
    }

    /// Fold workflow-specific counters from a completed outcome.
    fn fold_counters(&mut self, kind: WorkflowKind, outcome: &WorkflowOutcome) {
        match outcome {
            WorkflowOutcome::Discovery(d) => {
                self.metrics.leads_generated += d.leads_found as u64;
            }
            WorkflowOutcome::Outreach(o) => {
                self.metrics.leads_qualified += o.summary.leads_found as u64;
                self.metrics.messages_composed += o.summary.messages_generated as u64;
                if kind == WorkflowKind::FullOutreach {
                    self.metrics.record_campaign(
                        o.summary.avg_personalization_score,
                        o.summary.avg_response_rate,
                    );
                }
            }
            WorkflowOutcome::Nurture(n) => {
                self.metrics.emails_sent += n.emails_sent as u64;
                self.metrics.leads_qualified += n.prospects_qualified as u64;
            }
            WorkflowOutcome::Scheduling(s) => {
                self.metrics.meetings_booked += s.meetings_confirmed as u64;
            }
            WorkflowOutcome::Report(_) | WorkflowOutcome::Pipeline(_) => {}
        }
    }

    /// Read-only pipeline report over the current store.
    pub fn report(&self) -> PipelineReport {
        report::build_report(&self.store, &self.config.targets)
    }

    /// Point-in-time department status.
    pub fn status(&self) -> StatusReport {
        report::build_status(&self.store, &self.metrics, &self.config.targets)
    }

    /// Flat business-impact figures.
    pub fn business_impact(&self) -> std::collections::HashMap<String, f64> {
        report::business_impact(&self.store)
    }
}

fn defaulted(provided: Vec<String>, fallback: &[&str]) -> Vec<String> {
    if provided.is_empty() {
        fallback.iter().map(|s| s.to_string()).collect()
    } else {
        provided
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        let cut: String = s.chars().take(max_chars).collect();
        format!("{}...", cut)
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{ScannedLead, SyntheticScanner};
    use crate::{Error, Result};
    use async_trait::async_trait;

    struct FixedScanner(Vec<ScannedLead>);

    #[async_trait]
    impl LeadScanner for FixedScanner {
        async fn scan(&self, _criteria: &ScanCriteria) -> Result<Vec<ScannedLead>> {
            Ok(self.0.clone())
        }
    }

    struct DownScanner;

    #[async_trait]
    impl LeadScanner for DownScanner {
        async fn scan(&self, _criteria: &ScanCriteria) -> Result<Vec<ScannedLead>> {
            Err(Error::Scanner("upstream unavailable".to_string()))
        }
    }

    fn scanned(score: f64) -> ScannedLead {
        ScannedLead {
            name: "Contact".to_string(),
            email: "c@example.com".to_string(),
            company: "Acme".to_string(),
            title: "CTO".to_string(),
            industry: "SaaS".to_string(),
            company_size: "51-200".to_string(),
            score,
            source: "scanner".to_string(),
        }
    }

    fn orchestrator() -> SalesOrchestrator {
        SalesOrchestrator::new(Config::default(), "test-session")
    }

    #[tokio::test]
    async fn test_lead_generation_updates_metrics() {
        let mut orch = orchestrator()
            .with_scanner(Arc::new(FixedScanner(vec![
                scanned(85.0),
                scanned(90.0),
                scanned(60.0),
            ])));

        let envelope = orch
            .execute(WorkflowRequest::LeadGeneration {
                criteria: ScanCriteria {
                    titles: vec!["CTO".to_string()],
                    min_score: 80.0,
                    max_results: 3,
                    ..Default::default()
                },
            })
            .await;

        assert!(envelope.success);
        assert_eq!(orch.metrics().leads_generated, 2);
        assert_eq!(orch.metrics().total_workflows_executed, 1);
        assert_eq!(orch.metrics().success_rate, 1.0);
        assert_eq!(orch.store().lead_count(), 2);
    }

    #[tokio::test]
    async fn test_scanner_failure_produces_failure_envelope() {
        let mut orch = orchestrator().with_scanner(Arc::new(DownScanner));

        let envelope = orch
            .execute(WorkflowRequest::LeadGeneration {
                criteria: ScanCriteria::default(),
            })
            .await;

        assert!(!envelope.success);
        assert_eq!(envelope.error_type.as_deref(), Some("scanner"));
        assert_eq!(envelope.workflow_type, WorkflowKind::LeadGeneration);
        // Failure still counts toward the total
        assert_eq!(orch.metrics().total_workflows_executed, 1);
        assert_eq!(orch.metrics().success_rate, 0.0);
    }

    #[tokio::test]
    async fn test_quick_wins_composes_for_each_lead() {
        let mut orch = orchestrator().with_scanner(Arc::new(SyntheticScanner::new()));

        let envelope = orch
            .execute(WorkflowRequest::QuickWins {
                industries: Vec::new(),
                titles: Vec::new(),
            })
            .await;

        assert!(envelope.success);
        match envelope.outcome.unwrap() {
            WorkflowOutcome::Outreach(o) => {
                assert!(o.summary.leads_found > 0);
                assert!(o.summary.leads_found <= QUICK_WINS_CAP);
                assert_eq!(o.summary.messages_generated, o.summary.leads_found);
                assert!(o.errors.is_empty());
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert!(orch.metrics().messages_composed > 0);
    }

    #[tokio::test]
    async fn test_full_outreach_records_campaign_averages() {
        let mut orch = orchestrator().with_scanner(Arc::new(SyntheticScanner::new()));

        let envelope = orch
            .execute(WorkflowRequest::FullOutreach {
                industries: Vec::new(),
                titles: Vec::new(),
                company_sizes: Vec::new(),
                message_tone: None,
                min_score: None,
                campaign_size: Some(8),
            })
            .await;

        assert!(envelope.success);
        assert!(orch.metrics().personalization_score > 0.0);
        assert!(orch.metrics().response_rate > 0.0);
    }

    #[tokio::test]
    async fn test_execution_time_mean_over_multiple_runs() {
        let mut orch = orchestrator();

        for _ in 0..3 {
            orch.execute(WorkflowRequest::PipelineReporting).await;
        }

        let m = orch.metrics();
        assert_eq!(m.total_workflows_executed, 3);
        assert!(m.average_execution_time >= 0.0);
        assert!(m.last_execution.is_some());
    }

    #[tokio::test]
    async fn test_full_pipeline_runs_all_stages() {
        let mut orch = orchestrator();

        let envelope = orch.execute(WorkflowRequest::FullPipeline).await;
        assert!(envelope.success);

        match envelope.outcome.unwrap() {
            WorkflowOutcome::Pipeline(stages) => {
                assert_eq!(stages.len(), 4);
                let kinds: Vec<WorkflowKind> =
                    stages.iter().map(|s| s.workflow_type).collect();
                assert_eq!(
                    kinds,
                    vec![
                        WorkflowKind::LeadGeneration,
                        WorkflowKind::LeadNurturing,
                        WorkflowKind::MeetingScheduling,
                        WorkflowKind::PipelineReporting,
                    ]
                );
                assert!(stages.iter().all(|s| s.success));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }

        // Each stage folded into the metrics individually
        assert_eq!(orch.metrics().total_workflows_executed, 4);
        // Discovery synthesized leads for the later stages to consume
        assert!(orch.store().lead_count() > 0);
    }

    #[tokio::test]
    async fn test_full_pipeline_continues_past_failed_stage() {
        let mut orch = orchestrator().with_scanner(Arc::new(DownScanner));

        let envelope = orch.execute(WorkflowRequest::FullPipeline).await;
        assert!(envelope.success);

        match envelope.outcome.unwrap() {
            WorkflowOutcome::Pipeline(stages) => {
                assert_eq!(stages.len(), 4);
                assert!(!stages[0].success);
                // Later stages still ran against the (empty) store
                assert!(stages[1].success);
                assert!(stages[2].success);
                assert!(stages[3].success);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_status_and_impact_views() {
        let mut orch = orchestrator();
        orch.execute(WorkflowRequest::LeadGeneration {
            criteria: ScanCriteria {
                max_results: 5,
                ..Default::default()
            },
        })
        .await;

        let status = orch.status();
        assert_eq!(status.leads_count, 5);
        assert_eq!(status.metrics.leads_generated, 5);

        let impact = orch.business_impact();
        assert_eq!(impact["leads_generated"], 5.0);
    }

    #[test]
    fn test_truncate_preserves_short_strings() {
        assert_eq!(truncate("short", 200), "short");
        let long = "x".repeat(300);
        let cut = truncate(&long, 200);
        assert!(cut.ends_with("..."));
        assert_eq!(cut.chars().count(), 203);
    }
}
