//! Discovery stage executor
//!
//! Scans for candidate leads, scores and stores them, and checkpoints each
//! lead best-effort. With no scanner handle the stage synthesizes a
//! deterministic batch by cycling the criteria lists, so the output shape
//! never changes.

use tracing::{debug, info, warn};

use super::DiscoveryOutcome;
use crate::provider::{CheckpointStore, LeadScanner, ScanCriteria};
use crate::scoring::ScoringCriteria;
use crate::store::{EntityStore, Lead};
use crate::Result;

/// How many leads a discovery result previews.
const PREVIEW_LIMIT: usize = 10;

/// Run discovery: scan (or synthesize), filter, insert, checkpoint.
///
/// A scanner failure is a stage failure and surfaces as `Err`; checkpoint
/// failures are logged and swallowed. Never panics past this boundary.
pub async fn run(
    store: &mut EntityStore,
    scanner: Option<&dyn LeadScanner>,
    checkpoint: Option<&dyn CheckpointStore>,
    scoring: &ScoringCriteria,
    criteria: &ScanCriteria,
    session_id: &str,
    checkpoint_ttl: u64,
) -> Result<DiscoveryOutcome> {
    let leads = match scanner {
        Some(scanner) => {
            info!(min_score = criteria.min_score, max = criteria.max_results, "Scanning for leads");
            let scanned = scanner.scan(criteria).await?;
            scanned
                .into_iter()
                .filter(|s| s.score >= criteria.min_score)
                .take(criteria.max_results)
                .map(|s| {
                    // Scanner scores are 0-100; the store holds 0-10
                    let score = (s.score / 10.0).min(10.0);
                    Lead::new(s.name, s.email, s.company, s.title, s.source, score)
                })
                .collect::<Vec<_>>()
        }
        None => {
            debug!("No scanner configured, synthesizing leads");
            synthesize(scoring, criteria)
        }
    };

    let mut lead_ids = Vec::with_capacity(leads.len());
    for lead in leads {
        if let Some(checkpoint) = checkpoint {
            let key = format!("session:{}:lead:{}", session_id, lead.id);
            match serde_json::to_string(&lead) {
                Ok(payload) => {
                    if let Err(e) = checkpoint.set_with_ttl(&key, checkpoint_ttl, &payload).await {
                        warn!("Failed to checkpoint lead {}: {}", lead.id, e);
                    }
                }
                Err(e) => warn!("Failed to serialize lead {}: {}", lead.id, e),
            }
        }
        lead_ids.push(store.insert_lead(lead));
    }

    let preview = lead_ids
        .iter()
        .take(PREVIEW_LIMIT)
        .filter_map(|id| store.lead(id).cloned())
        .collect();

    info!("Discovery found {} leads", lead_ids.len());
    Ok(DiscoveryOutcome {
        leads_found: lead_ids.len(),
        lead_ids,
        preview,
    })
}

/// Deterministic local generator: `max_results` leads cycling the provided
/// title/industry/size lists, scored by the scoring engine.
fn synthesize(scoring: &ScoringCriteria, criteria: &ScanCriteria) -> Vec<Lead> {
    let titles = cycle_source(&criteria.titles, &["CEO", "CTO", "VP"]);
    let industries = cycle_source(&criteria.industries, &["Technology", "SaaS"]);
    let sizes = cycle_source(&criteria.company_sizes, &["startup", "mid-market"]);

    (0..criteria.max_results)
        .map(|i| {
            let title = &titles[i % titles.len()];
            let industry = &industries[i % industries.len()];
            let size = &sizes[i % sizes.len()];
            let score = scoring.score(title, size, industry);

            Lead::new(
                format!("Contact {}", i + 1),
                format!("contact{}@company{}.example", i + 1, i + 1),
                format!("Company {}", i + 1),
                title.clone(),
                "synthetic",
                score,
            )
        })
        .collect()
}

fn cycle_source(provided: &[String], fallback: &[&str]) -> Vec<String> {
    if provided.is_empty() {
        fallback.iter().map(|s| s.to_string()).collect()
    } else {
        provided.to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{MemoryCheckpoint, ScannedLead, SyntheticScanner};
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

    fn scanned(title: &str, score: f64) -> ScannedLead {
        ScannedLead {
            name: format!("{} person", title),
            email: "x@example.com".to_string(),
            company: "Acme".to_string(),
            title: title.to_string(),
            industry: "SaaS".to_string(),
            company_size: "51-200".to_string(),
            score,
            source: "scanner".to_string(),
        }
    }

    #[tokio::test]
    async fn test_min_score_filter_and_normalization() {
        let mut store = EntityStore::new();
        let scanner = FixedScanner(vec![
            scanned("CTO", 85.0),
            scanned("CTO", 90.0),
            scanned("CTO", 60.0),
        ]);
        let criteria = ScanCriteria {
            titles: vec!["CTO".to_string()],
            min_score: 80.0,
            max_results: 3,
            ..Default::default()
        };

        let outcome = run(
            &mut store,
            Some(&scanner),
            None,
            &ScoringCriteria::default(),
            &criteria,
            "s1",
            3600,
        )
        .await
        .unwrap();

        assert_eq!(outcome.leads_found, 2);
        assert_eq!(store.lead_count(), 2);
        for lead in store.leads() {
            assert!(lead.score >= 8.0 && lead.score <= 10.0);
        }
    }

    #[tokio::test]
    async fn test_scanner_failure_is_a_stage_error() {
        let mut store = EntityStore::new();
        let result = run(
            &mut store,
            Some(&DownScanner),
            None,
            &ScoringCriteria::default(),
            &ScanCriteria::default(),
            "s1",
            3600,
        )
        .await;

        assert!(matches!(result, Err(Error::Scanner(_))));
        assert_eq!(store.lead_count(), 0);
    }

    #[tokio::test]
    async fn test_fallback_synthesizes_max_results() {
        let mut store = EntityStore::new();
        let criteria = ScanCriteria {
            titles: vec!["CTO".to_string(), "CEO".to_string()],
            max_results: 5,
            ..Default::default()
        };

        let outcome = run(
            &mut store,
            None,
            None,
            &ScoringCriteria::default(),
            &criteria,
            "s1",
            3600,
        )
        .await
        .unwrap();

        assert_eq!(outcome.leads_found, 5);
        assert_eq!(store.lead_count(), 5);
        // Scores are engine-computed, so bounded
        assert!(store.leads().all(|l| (0.0..=10.0).contains(&l.score)));
    }

    #[tokio::test]
    async fn test_checkpoints_written_per_lead() {
        let mut store = EntityStore::new();
        let checkpoint = MemoryCheckpoint::new();
        let criteria = ScanCriteria {
            max_results: 3,
            ..Default::default()
        };

        let outcome = run(
            &mut store,
            None,
            Some(&checkpoint),
            &ScoringCriteria::default(),
            &criteria,
            "sess42",
            3600,
        )
        .await
        .unwrap();

        assert_eq!(checkpoint.len(), 3);
        let key = format!("session:sess42:lead:{}", outcome.lead_ids[0]);
        assert!(checkpoint.get(&key).is_some());
    }

    #[tokio::test]
    async fn test_preview_capped_at_ten() {
        let mut store = EntityStore::new();
        let criteria = ScanCriteria {
            max_results: 25,
            ..Default::default()
        };

        let outcome = run(
            &mut store,
            None,
            None,
            &ScoringCriteria::default(),
            &criteria,
            "s1",
            3600,
        )
        .await
        .unwrap();

        assert_eq!(outcome.leads_found, 25);
        assert_eq!(outcome.preview.len(), 10);
    }

    #[tokio::test]
    async fn test_synthetic_scanner_end_to_end() {
        let mut store = EntityStore::new();
        let scanner = SyntheticScanner::new();
        let criteria = ScanCriteria {
            min_score: 70.0,
            max_results: 10,
            ..Default::default()
        };

        let outcome = run(
            &mut store,
            Some(&scanner),
            None,
            &ScoringCriteria::default(),
            &criteria,
            "s1",
            3600,
        )
        .await
        .unwrap();

        assert!(outcome.leads_found > 0);
        assert!(store.leads().all(|l| l.score >= 7.0));
    }
}
