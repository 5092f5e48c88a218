//! External collaborator interfaces
//!
//! The orchestrator talks to three collaborators through narrow traits:
//! - [`LeadScanner`]: produces candidate leads for search criteria
//! - [`OutreachComposer`]: writes a personalized message for a lead
//! - [`CheckpointStore`]: best-effort TTL'd key/value checkpointing
//!
//! Each trait ships with a deterministic in-process implementation so the
//! pipeline runs with no external services and with identical output
//! shapes. The orchestrator holds optional handles; absence of a handle
//! switches the stage to its documented synthetic path.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;

use crate::config::SenderInfo;
use crate::store::Lead;
use crate::{Error, Result};

/// Search criteria consumed by a lead scanner.
///
/// `min_score` is on the scanner's own 0–100 scale; the discovery stage
/// filters on it and then normalizes into the store's 0–10 lead score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanCriteria {
    #[serde(default)]
    pub industries: Vec<String>,
    #[serde(default)]
    pub titles: Vec<String>,
    #[serde(default)]
    pub company_sizes: Vec<String>,
    #[serde(default = "default_min_score")]
    pub min_score: f64,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

fn default_min_score() -> f64 {
    60.0
}

fn default_max_results() -> usize {
    50
}

impl Default for ScanCriteria {
    fn default() -> Self {
        Self {
            industries: Vec::new(),
            titles: Vec::new(),
            company_sizes: Vec::new(),
            min_score: default_min_score(),
            max_results: default_max_results(),
        }
    }
}

/// A candidate returned by a scanner, scored on the scanner's 0–100 scale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannedLead {
    pub name: String,
    pub email: String,
    pub company: String,
    pub title: String,
    pub industry: String,
    pub company_size: String,
    pub score: f64,
    pub source: String,
}

/// Message tone for outreach composition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Formal,
    Casual,
    Friendly,
}

impl Default for Tone {
    fn default() -> Self {
        Tone::Formal
    }
}

/// How much lead-specific detail goes into a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonalizationDepth {
    Light,
    Moderate,
    Deep,
}

impl Default for PersonalizationDepth {
    fn default() -> Self {
        PersonalizationDepth::Moderate
    }
}

/// Configuration for composing one outreach message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutreachConfig {
    /// Template category ("cold_outreach", "follow_up", ...)
    pub category: String,
    #[serde(default)]
    pub tone: Tone,
    #[serde(default)]
    pub personalization_depth: PersonalizationDepth,
    pub sender: SenderInfo,
}

impl OutreachConfig {
    pub fn cold_outreach(sender: SenderInfo, depth: PersonalizationDepth) -> Self {
        Self {
            category: "cold_outreach".to_string(),
            tone: Tone::Formal,
            personalization_depth: depth,
            sender,
        }
    }
}

/// A composed message plus the composer's own quality estimates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComposedMessage {
    pub subject: String,
    pub body: String,
    /// Composer's personalization estimate in [0, 1]
    pub personalization_score: f64,
    /// Predicted response rate in [0, 1]
    pub predicted_response_rate: f64,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

/// Produces candidate leads for search criteria.
#[async_trait]
pub trait LeadScanner: Send + Sync {
    async fn scan(&self, criteria: &ScanCriteria) -> Result<Vec<ScannedLead>>;
}

/// Writes a personalized outreach message for a lead.
#[async_trait]
pub trait OutreachComposer: Send + Sync {
    async fn compose(&self, lead: &Lead, config: &OutreachConfig) -> Result<ComposedMessage>;
}

/// Best-effort key/value checkpointing with TTL semantics. Write failures
/// are never a correctness problem for callers.
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    async fn set_with_ttl(&self, key: &str, ttl_secs: u64, value: &str) -> Result<()>;
}

// Deterministic in-process implementations

const CATALOG_COMPANIES: &[&str] = &[
    "Northwind Labs",
    "Apex Metrics",
    "Brightline Systems",
    "Cascade Works",
    "Meridian Cloud",
];

/// Deterministic scanner: synthesizes leads by cycling the criteria lists
/// over a fixed company catalog. Same criteria, same output.
#[derive(Debug, Default)]
pub struct SyntheticScanner;

impl SyntheticScanner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl LeadScanner for SyntheticScanner {
    async fn scan(&self, criteria: &ScanCriteria) -> Result<Vec<ScannedLead>> {
        let titles = non_empty_or(&criteria.titles, &["CEO", "CTO", "VP Engineering"]);
        let industries = non_empty_or(&criteria.industries, &["Technology", "SaaS"]);
        let sizes = non_empty_or(&criteria.company_sizes, &["11-50", "51-200"]);

        let mut leads = Vec::new();
        for i in 0..criteria.max_results {
            // Spread scores deterministically over 55..100
            let score = 55.0 + ((i * 17) % 45) as f64;
            if score < criteria.min_score {
                continue;
            }

            let company = CATALOG_COMPANIES[i % CATALOG_COMPANIES.len()];
            leads.push(ScannedLead {
                name: format!("Contact {}", i + 1),
                email: format!(
                    "contact{}@{}.example",
                    i + 1,
                    company.to_lowercase().replace(' ', "-")
                ),
                company: company.to_string(),
                title: titles[i % titles.len()].clone(),
                industry: industries[i % industries.len()].clone(),
                company_size: sizes[i % sizes.len()].clone(),
                score,
                source: "synthetic_scan".to_string(),
            });
        }

        Ok(leads)
    }
}

fn non_empty_or(provided: &[String], fallback: &[&str]) -> Vec<String> {
    if provided.is_empty() {
        fallback.iter().map(|s| s.to_string()).collect()
    } else {
        provided.to_vec()
    }
}

/// Template-driven composer: fills a fixed template per category and
/// derives its quality estimates from the depth setting and the lead score.
#[derive(Debug, Default)]
pub struct TemplateComposer;

impl TemplateComposer {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl OutreachComposer for TemplateComposer {
    async fn compose(&self, lead: &Lead, config: &OutreachConfig) -> Result<ComposedMessage> {
        let greeting = match config.tone {
            Tone::Formal => "Dear",
            Tone::Casual | Tone::Friendly => "Hi",
        };

        let subject = match config.category.as_str() {
            "follow_up" => format!("Following up, {}", lead.name),
            _ => format!("Quick question about {}", lead.company),
        };

        let body = format!(
            "{greeting} {name},\n\nI noticed {company} is growing and thought \
             our work on pipeline automation might be relevant to you as {title}.\n\n\
             Best,\n{sender}, {sender_title} at {sender_company}\n",
            greeting = greeting,
            name = lead.name,
            company = lead.company,
            title = lead.title,
            sender = config.sender.name,
            sender_title = config.sender.title,
            sender_company = config.sender.company,
        );

        let base = match config.personalization_depth {
            PersonalizationDepth::Light => 0.45,
            PersonalizationDepth::Moderate => 0.65,
            PersonalizationDepth::Deep => 0.85,
        };
        // Better-scored leads give the template more to work with
        let personalization = (base + lead.score / 100.0).min(1.0);
        let predicted_response = (personalization * 0.35).min(1.0);

        let mut metadata = HashMap::new();
        metadata.insert(
            "template".to_string(),
            serde_json::Value::String(config.category.clone()),
        );

        Ok(ComposedMessage {
            subject,
            body,
            personalization_score: personalization,
            predicted_response_rate: predicted_response,
            metadata,
        })
    }
}

/// In-memory checkpoint store. TTLs are recorded but not enforced; this
/// stands in for an external cache during tests and demos.
#[derive(Debug, Default)]
pub struct MemoryCheckpoint {
    entries: Mutex<HashMap<String, (u64, String)>>,
}

impl MemoryCheckpoint {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .ok()
            .and_then(|e| e.get(key).map(|(_, v)| v.clone()))
    }
}

#[async_trait]
impl CheckpointStore for MemoryCheckpoint {
    async fn set_with_ttl(&self, key: &str, ttl_secs: u64, value: &str) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| Error::Checkpoint("checkpoint store poisoned".to_string()))?;
        entries.insert(key.to_string(), (ttl_secs, value.to_string()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_synthetic_scan_is_deterministic() {
        let scanner = SyntheticScanner::new();
        let criteria = ScanCriteria {
            titles: vec!["CTO".to_string()],
            max_results: 10,
            ..Default::default()
        };

        let a = scanner.scan(&criteria).await.unwrap();
        let b = scanner.scan(&criteria).await.unwrap();
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(&b) {
            assert_eq!(x.email, y.email);
            assert_eq!(x.score, y.score);
        }
    }

    #[tokio::test]
    async fn test_synthetic_scan_honors_min_score() {
        let scanner = SyntheticScanner::new();
        let criteria = ScanCriteria {
            min_score: 80.0,
            max_results: 20,
            ..Default::default()
        };

        let leads = scanner.scan(&criteria).await.unwrap();
        assert!(!leads.is_empty());
        assert!(leads.iter().all(|l| l.score >= 80.0));
    }

    #[tokio::test]
    async fn test_synthetic_scan_cycles_titles() {
        let scanner = SyntheticScanner::new();
        let criteria = ScanCriteria {
            titles: vec!["CTO".to_string(), "CEO".to_string()],
            min_score: 0.0,
            max_results: 4,
            ..Default::default()
        };

        let leads = scanner.scan(&criteria).await.unwrap();
        let titles: Vec<&str> = leads.iter().map(|l| l.title.as_str()).collect();
        assert_eq!(titles, vec!["CTO", "CEO", "CTO", "CEO"]);
    }

    #[tokio::test]
    async fn test_template_composer_personalization_bounds() {
        let composer = TemplateComposer::new();
        let lead = Lead::new("Ada", "ada@acme.example", "Acme", "CTO", "test", 9.0);
        let config =
            OutreachConfig::cold_outreach(SenderInfo::default(), PersonalizationDepth::Deep);

        let message = composer.compose(&lead, &config).await.unwrap();
        assert!(message.subject.contains("Acme"));
        assert!((0.0..=1.0).contains(&message.personalization_score));
        assert!((0.0..=1.0).contains(&message.predicted_response_rate));
    }

    #[tokio::test]
    async fn test_memory_checkpoint_round_trip() {
        let store = MemoryCheckpoint::new();
        store
            .set_with_ttl("session:s1:lead:l1", 3600, "{}")
            .await
            .unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.get("session:s1:lead:l1").as_deref(), Some("{}"));
    }
}
