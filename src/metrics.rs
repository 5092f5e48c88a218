//! Department metrics
//!
//! A single mutable aggregate owned by the orchestrator. Counters only
//! ever increase; the execution-time average is maintained incrementally
//! so it equals the arithmetic mean of every recorded duration at any
//! observation point.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Running aggregate over all workflow executions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metrics {
    pub leads_generated: u64,
    pub leads_qualified: u64,
    pub messages_composed: u64,
    pub emails_sent: u64,
    pub responses_received: u64,
    pub meetings_booked: u64,
    pub total_workflows_executed: u64,
    /// Arithmetic mean of all recorded execution durations, in seconds
    pub average_execution_time: f64,
    pub last_execution: Option<DateTime<Utc>>,
    /// Cumulative ratio of successful executions to total executions
    pub success_rate: f64,
    /// Average over the most recent campaign, not cumulative
    pub personalization_score: f64,
    /// Average over the most recent campaign, not cumulative
    pub response_rate: f64,

    /// Successful executions, feeds success_rate
    #[serde(skip)]
    successes: u64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one completed workflow execution into the aggregate.
    ///
    /// Applies the incremental mean update
    /// `avg_n = (avg_{n-1} * (n-1) + d_n) / n` and recomputes the success
    /// rate as successes/total. Both success and failure count toward the
    /// total.
    pub fn record_execution(&mut self, duration_secs: f64, success: bool) {
        self.total_workflows_executed += 1;
        self.last_execution = Some(Utc::now());

        let n = self.total_workflows_executed as f64;
        self.average_execution_time =
            (self.average_execution_time * (n - 1.0) + duration_secs) / n;

        if success {
            self.successes += 1;
        }
        self.success_rate = self.successes as f64 / n;
    }

    /// Record the averaged scores of the most recent outreach campaign.
    /// These overwrite, they do not accumulate.
    pub fn record_campaign(&mut self, personalization: f64, response_rate: f64) {
        self.personalization_score = personalization;
        self.response_rate = response_rate;
    }
}
