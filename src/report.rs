//! Read-only pipeline projections
//!
//! Everything here is computed on demand from the entity store; nothing is
//! mutated and no independent state exists. Division by zero on an empty
//! store yields 0, never an error or NaN.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::config::SalesTargets;
use crate::metrics::Metrics;
use crate::store::EntityStore;

/// Headline counts and conversion ratios.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSummary {
    pub total_leads: usize,
    pub total_prospects: usize,
    pub total_meetings: usize,
    pub pipeline_value: f64,
    pub lead_to_prospect_conversion: f64,
    pub lead_to_meeting_conversion: f64,
}

/// Fixed monthly targets next to the observed values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetsVsActual {
    pub leads_target: u64,
    pub leads_actual: usize,
    pub meetings_target: u64,
    pub meetings_actual: usize,
    pub pipeline_value_target: f64,
    pub pipeline_value_actual: f64,
}

/// Simple threshold predicates over the same counts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthIndicators {
    pub pipeline_health: String,
    pub activity_level: String,
    pub conversion_health: String,
}

/// Full pipeline status report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineReport {
    pub generated_at: DateTime<Utc>,
    pub summary: PipelineSummary,
    pub lead_breakdown: HashMap<String, usize>,
    pub targets_vs_actual: TargetsVsActual,
    pub recommendations: Vec<String>,
    pub health_indicators: HealthIndicators,
}

/// Build a pipeline status report from the store.
pub fn build_report(store: &EntityStore, targets: &SalesTargets) -> PipelineReport {
    let total_leads = store.lead_count();
    let total_prospects = store.prospect_count();
    let total_meetings = store.meeting_count();
    let pipeline_value = store.pipeline_value();

    let (prospect_rate, meeting_rate) = if total_leads > 0 {
        (
            total_prospects as f64 / total_leads as f64,
            total_meetings as f64 / total_leads as f64,
        )
    } else {
        (0.0, 0.0)
    };

    PipelineReport {
        generated_at: Utc::now(),
        summary: PipelineSummary {
            total_leads,
            total_prospects,
            total_meetings,
            pipeline_value,
            lead_to_prospect_conversion: prospect_rate,
            lead_to_meeting_conversion: meeting_rate,
        },
        lead_breakdown: store.status_breakdown(),
        targets_vs_actual: TargetsVsActual {
            leads_target: targets.monthly_leads,
            leads_actual: total_leads,
            meetings_target: targets.monthly_meetings,
            meetings_actual: total_meetings,
            pipeline_value_target: targets.monthly_pipeline_value,
            pipeline_value_actual: pipeline_value,
        },
        recommendations: recommendations(total_leads, total_prospects, total_meetings),
        health_indicators: HealthIndicators {
            pipeline_health: if total_prospects > 0 {
                "healthy".to_string()
            } else {
                "needs_attention".to_string()
            },
            activity_level: if total_leads > 10 {
                "high".to_string()
            } else {
                "low".to_string()
            },
            conversion_health: if prospect_rate > 0.1 {
                "good".to_string()
            } else {
                "needs_improvement".to_string()
            },
        },
    }
}

/// Rule-based recommendation list. Falls back to a single positive note
/// when no rule fires.
fn recommendations(leads: usize, prospects: usize, meetings: usize) -> Vec<String> {
    let mut recs = Vec::new();

    if leads < 10 {
        recs.push(
            "Increase lead generation activity - current lead count is below optimal".to_string(),
        );
    }
    if prospects == 0 {
        recs.push("Focus on lead qualification - no qualified prospects in pipeline".to_string());
    }
    if meetings == 0 {
        recs.push("Prioritize meeting scheduling with qualified prospects".to_string());
    }

    if recs.is_empty() {
        recs.push("Pipeline is performing well - continue current activities".to_string());
    }
    recs
}

/// Point-in-time department status: counts, metrics snapshot, targets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusReport {
    pub department: String,
    pub leads_count: usize,
    pub prospects_count: usize,
    pub meetings_scheduled_count: usize,
    pub metrics: Metrics,
    pub targets: SalesTargets,
    pub health_indicators: HealthIndicators,
    pub last_updated: DateTime<Utc>,
}

/// Build a department status view from the same store the report reads.
pub fn build_status(store: &EntityStore, metrics: &Metrics, targets: &SalesTargets) -> StatusReport {
    let report = build_report(store, targets);
    StatusReport {
        department: "sales".to_string(),
        leads_count: store.lead_count(),
        prospects_count: store.prospect_count(),
        meetings_scheduled_count: store.meeting_count(),
        metrics: metrics.clone(),
        targets: targets.clone(),
        health_indicators: report.health_indicators,
        last_updated: Utc::now(),
    }
}

/// Flat business-impact figures derived from the store.
pub fn business_impact(store: &EntityStore) -> HashMap<String, f64> {
    let leads = store.lead_count() as f64;
    let mut impact = HashMap::new();
    impact.insert("leads_generated".to_string(), leads);
    impact.insert("meetings_booked".to_string(), store.meeting_count() as f64);
    impact.insert("pipeline_value".to_string(), store.pipeline_value());
    impact.insert(
        "conversion_rate".to_string(),
        if leads > 0.0 {
            store.prospect_count() as f64 / leads
        } else {
            0.0
        },
    );
    impact
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{Lead, Prospect};

    fn stored_lead(store: &mut EntityStore, score: f64) -> String {
        store.insert_lead(Lead::new(
            "Ada",
            "ada@acme.example",
            "Acme",
            "CTO",
            "test",
            score,
        ))
    }

    #[test]
    fn test_empty_store_rates_are_zero() {
        let store = EntityStore::new();
        let report = build_report(&store, &SalesTargets::default());

        assert_eq!(report.summary.lead_to_prospect_conversion, 0.0);
        assert_eq!(report.summary.lead_to_meeting_conversion, 0.0);
        assert!(report.summary.lead_to_prospect_conversion.is_finite());
        assert_eq!(report.summary.pipeline_value, 0.0);
    }

    #[test]
    fn test_empty_store_recommendations() {
        let store = EntityStore::new();
        let report = build_report(&store, &SalesTargets::default());

        assert_eq!(report.recommendations.len(), 3);
        assert_eq!(report.health_indicators.pipeline_health, "needs_attention");
        assert_eq!(report.health_indicators.activity_level, "low");
    }

    #[test]
    fn test_healthy_pipeline_gets_positive_default() {
        let mut store = EntityStore::new();
        for _ in 0..12 {
            let id = stored_lead(&mut store, 9.0);
            let lead = store.lead(&id).unwrap().clone();
            store.qualify(Prospect::from_lead(&lead));
            store.add_meeting(crate::store::ScheduledMeeting::new(
                id,
                "discovery_call",
                Utc::now(),
            ));
        }

        let report = build_report(&store, &SalesTargets::default());
        assert_eq!(
            report.recommendations,
            vec!["Pipeline is performing well - continue current activities".to_string()]
        );
        assert_eq!(report.health_indicators.pipeline_health, "healthy");
        assert_eq!(report.health_indicators.conversion_health, "good");
    }

    #[test]
    fn test_conversion_ratios() {
        let mut store = EntityStore::new();
        for i in 0..4 {
            let id = stored_lead(&mut store, 8.0);
            if i < 2 {
                let lead = store.lead(&id).unwrap().clone();
                store.qualify(Prospect::from_lead(&lead));
            }
        }

        let report = build_report(&store, &SalesTargets::default());
        assert!((report.summary.lead_to_prospect_conversion - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_business_impact_empty_store() {
        let impact = business_impact(&EntityStore::new());
        assert_eq!(impact["conversion_rate"], 0.0);
        assert_eq!(impact["pipeline_value"], 0.0);
    }
}
