//! Pipeline entity store
//!
//! In-memory tables for the three pipeline entities (leads, prospects,
//! scheduled meetings). All mutation of pipeline state goes through this
//! store; stage executors read and write it, the reporting view only reads.
//!
//! Entities are never deleted. Leads advance new → contacted → qualified;
//! prospects and meetings are append-only.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Lifecycle status of a lead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    /// Discovered, not yet contacted
    New,
    /// At least one outreach attempt made
    Contacted,
    /// Promoted to prospect (terminal)
    Qualified,
    /// Exhausted; declared but never produced by any stage
    Dead,
}

impl LeadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeadStatus::New => "new",
            LeadStatus::Contacted => "contacted",
            LeadStatus::Qualified => "qualified",
            LeadStatus::Dead => "dead",
        }
    }
}

/// A discovered sales candidate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lead {
    /// Opaque unique id, never reused
    pub id: String,
    pub name: String,
    pub email: String,
    pub company: String,
    pub title: String,
    /// Originating source ("scanner", "synthetic", ...)
    pub source: String,
    /// Score in [0, 10], immutable after discovery
    pub score: f64,
    pub status: LeadStatus,
    pub created_at: DateTime<Utc>,
    pub contact_attempts: u32,
    pub last_contacted: Option<DateTime<Utc>>,
    /// Append-only free-text activity log
    pub notes: Vec<String>,
}

impl Lead {
    /// Create a new lead with a freshly minted id.
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        company: impl Into<String>,
        title: impl Into<String>,
        source: impl Into<String>,
        score: f64,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            email: email.into(),
            company: company.into(),
            title: title.into(),
            source: source.into(),
            score,
            status: LeadStatus::New,
            created_at: Utc::now(),
            contact_attempts: 0,
            last_contacted: None,
            notes: Vec::new(),
        }
    }

    /// Record an outreach attempt.
    pub fn record_contact(&mut self, note: impl Into<String>) {
        self.contact_attempts += 1;
        self.last_contacted = Some(Utc::now());
        self.notes.push(note.into());
    }
}

/// A lead judged qualified. Holds a back-reference to its source lead,
/// which continues to live in the lead table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prospect {
    pub lead_id: String,
    /// Copied from the lead score at qualification time, independent after
    pub qualification_score: f64,
    pub pain_points: Vec<String>,
    pub budget_range: Option<String>,
    pub timeline: Option<String>,
    pub decision_maker: bool,
    pub next_action: String,
    pub meeting_scheduled: bool,
}

impl Prospect {
    /// Qualify a lead into a prospect. Decision-maker is derived from the
    /// score; the remaining fields use fixed defaults until enrichment
    /// exists.
    pub fn from_lead(lead: &Lead) -> Self {
        Self {
            lead_id: lead.id.clone(),
            qualification_score: lead.score,
            pain_points: vec!["automation".to_string(), "efficiency".to_string()],
            budget_range: Some("10k-50k".to_string()),
            timeline: Some("Q1".to_string()),
            decision_maker: lead.score >= 8.0,
            next_action: "schedule_meeting".to_string(),
            meeting_scheduled: false,
        }
    }
}

/// An agreed-upon calendar slot. Append-only; no cancellation path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledMeeting {
    pub id: String,
    pub prospect_id: String,
    pub meeting_type: String,
    pub scheduled_time: DateTime<Utc>,
    pub duration_minutes: u32,
    /// Always "confirmed" in the current workflow
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl ScheduledMeeting {
    pub fn new(prospect_id: impl Into<String>, meeting_type: impl Into<String>, slot: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            prospect_id: prospect_id.into(),
            meeting_type: meeting_type.into(),
            scheduled_time: slot,
            duration_minutes: 30,
            status: "confirmed".to_string(),
            created_at: Utc::now(),
        }
    }
}

/// Stubbed slot-finder: always offers a slot three days out, regardless of
/// preferences. A real calendar integration would negotiate here.
pub fn find_available_slot(_meeting_type: &str, _preferred: &[String]) -> Option<DateTime<Utc>> {
    Some(Utc::now() + Duration::days(3))
}

/// In-memory tables for the pipeline. One per orchestrator instance.
#[derive(Debug, Default)]
pub struct EntityStore {
    leads: HashMap<String, Lead>,
    prospects: HashMap<String, Prospect>,
    meetings: Vec<ScheduledMeeting>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a lead under its own id, returning the id.
    pub fn insert_lead(&mut self, lead: Lead) -> String {
        let id = lead.id.clone();
        self.leads.insert(id.clone(), lead);
        id
    }

    pub fn lead(&self, id: &str) -> Option<&Lead> {
        self.leads.get(id)
    }

    pub fn lead_mut(&mut self, id: &str) -> Option<&mut Lead> {
        self.leads.get_mut(id)
    }

    pub fn leads(&self) -> impl Iterator<Item = &Lead> {
        self.leads.values()
    }

    pub fn lead_ids(&self) -> Vec<String> {
        self.leads.keys().cloned().collect()
    }

    pub fn lead_count(&self) -> usize {
        self.leads.len()
    }

    /// Record a qualified prospect. At most one prospect exists per lead
    /// id; re-qualifying overwrites rather than duplicating.
    pub fn qualify(&mut self, prospect: Prospect) {
        self.prospects.insert(prospect.lead_id.clone(), prospect);
    }

    pub fn prospect(&self, lead_id: &str) -> Option<&Prospect> {
        self.prospects.get(lead_id)
    }

    pub fn prospect_mut(&mut self, lead_id: &str) -> Option<&mut Prospect> {
        self.prospects.get_mut(lead_id)
    }

    pub fn prospects(&self) -> impl Iterator<Item = &Prospect> {
        self.prospects.values()
    }

    pub fn prospect_count(&self) -> usize {
        self.prospects.len()
    }

    /// Ids of prospects with no meeting on the books yet.
    pub fn unscheduled_prospect_ids(&self) -> Vec<String> {
        self.prospects
            .values()
            .filter(|p| !p.meeting_scheduled)
            .map(|p| p.lead_id.clone())
            .collect()
    }

    pub fn add_meeting(&mut self, meeting: ScheduledMeeting) {
        self.meetings.push(meeting);
    }

    pub fn meetings(&self) -> &[ScheduledMeeting] {
        &self.meetings
    }

    pub fn meeting_count(&self) -> usize {
        self.meetings.len()
    }

    /// Histogram of lead statuses.
    pub fn status_breakdown(&self) -> HashMap<String, usize> {
        let mut breakdown = HashMap::new();
        for lead in self.leads.values() {
            *breakdown.entry(lead.status.as_str().to_string()).or_insert(0) += 1;
        }
        breakdown
    }

    /// Estimated pipeline value: each prospect's source-lead score × 1000.
    /// A valuation heuristic, not a currency computation.
    pub fn pipeline_value(&self) -> f64 {
        self.prospects
            .values()
            .filter_map(|p| self.leads.get(&p.lead_id))
            .map(|lead| lead.score * 1000.0)
            .sum()
    }
}
