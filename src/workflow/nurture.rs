//! Nurture stage executor
//!
//! Walks a batch of leads: initial outreach for new leads, follow-ups for
//! contacted leads under the attempt cap, then a qualification check that
//! promotes well-scored, sufficiently-contacted leads to prospects.
//!
//! Items are independent: a failure on one lead is recorded against its id
//! and the batch moves on.

use chrono::Utc;
use tracing::{debug, info};

use super::{ItemError, NurtureOutcome};
use crate::config::SenderInfo;
use crate::provider::{OutreachComposer, OutreachConfig, PersonalizationDepth, Tone};
use crate::store::{EntityStore, LeadStatus, Prospect};
use crate::{Error, Result};

/// Leads stop receiving follow-ups after this many attempts.
const MAX_CONTACT_ATTEMPTS: u32 = 3;
/// Score a lead must exceed to qualify.
const QUALIFICATION_SCORE: f64 = 7.0;
/// Attempts a lead needs before it can qualify.
const QUALIFICATION_ATTEMPTS: u32 = 2;

/// Run the nurture batch over `lead_ids`, or over every stored lead when
/// the list is empty.
pub async fn run(
    store: &mut EntityStore,
    composer: Option<&dyn OutreachComposer>,
    sender: &SenderInfo,
    lead_ids: &[String],
) -> Result<NurtureOutcome> {
    let ids = if lead_ids.is_empty() {
        store.lead_ids()
    } else {
        lead_ids.to_vec()
    };

    info!("Nurturing {} leads", ids.len());
    let mut outcome = NurtureOutcome::default();

    for id in &ids {
        match nurture_one(store, composer, sender, id).await {
            Ok(effect) => {
                outcome.leads_contacted += 1;
                if effect.email_sent {
                    outcome.emails_sent += 1;
                }
                if effect.newly_qualified {
                    outcome.prospects_qualified += 1;
                }
            }
            Err(e) => {
                debug!("Nurture failed for lead {}: {}", id, e);
                outcome.errors.push(ItemError::new(id.clone(), e.to_string()));
            }
        }
    }

    info!(
        contacted = outcome.leads_contacted,
        emails = outcome.emails_sent,
        qualified = outcome.prospects_qualified,
        errors = outcome.errors.len(),
        "Nurturing completed"
    );
    Ok(outcome)
}

struct NurtureEffect {
    email_sent: bool,
    newly_qualified: bool,
}

async fn nurture_one(
    store: &mut EntityStore,
    composer: Option<&dyn OutreachComposer>,
    sender: &SenderInfo,
    id: &str,
) -> Result<NurtureEffect> {
    let snapshot = store
        .lead(id)
        .ok_or_else(|| Error::UnknownLead(id.to_string()))?
        .clone();

    let mut email_sent = false;

    match snapshot.status {
        LeadStatus::New => {
            send_outreach(composer, sender, &snapshot, "cold_outreach").await?;
            if let Some(lead) = store.lead_mut(id) {
                lead.record_contact(contact_note("cold_outreach"));
                lead.status = LeadStatus::Contacted;
            }
            email_sent = true;
        }
        LeadStatus::Contacted if snapshot.contact_attempts < MAX_CONTACT_ATTEMPTS => {
            send_outreach(composer, sender, &snapshot, "follow_up").await?;
            if let Some(lead) = store.lead_mut(id) {
                lead.record_contact(contact_note("follow_up"));
            }
            email_sent = true;
        }
        _ => {}
    }

    // Qualification is independent of whether an email went out this pass
    let current = store
        .lead(id)
        .ok_or_else(|| Error::UnknownLead(id.to_string()))?
        .clone();
    let mut newly_qualified = false;
    if current.score > QUALIFICATION_SCORE && current.contact_attempts >= QUALIFICATION_ATTEMPTS {
        newly_qualified = store.prospect(id).is_none();
        store.qualify(Prospect::from_lead(&current));
        if let Some(lead) = store.lead_mut(id) {
            lead.status = LeadStatus::Qualified;
        }
    }

    Ok(NurtureEffect {
        email_sent,
        newly_qualified,
    })
}

async fn send_outreach(
    composer: Option<&dyn OutreachComposer>,
    sender: &SenderInfo,
    lead: &crate::store::Lead,
    category: &str,
) -> Result<()> {
    if let Some(composer) = composer {
        let config = OutreachConfig {
            category: category.to_string(),
            tone: Tone::Formal,
            personalization_depth: PersonalizationDepth::Moderate,
            sender: sender.clone(),
        };
        composer.compose(lead, &config).await?;
    }
    // Delivery itself is out of scope; the contact note is the send record
    debug!("Sending {} email to {}", category, lead.email);
    Ok(())
}

fn contact_note(category: &str) -> String {
    format!("Sent {} email at {}", category, Utc::now().to_rfc3339())
}
