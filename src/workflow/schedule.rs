//! Scheduling stage executor
//!
//! Books one meeting per request. With an empty batch it targets every
//! prospect that has no meeting yet, as a discovery call. The slot-finder
//! is a stub that always offers a slot three days out; a missing slot is a
//! calendar conflict, not an error.

use tracing::{debug, info};

use super::{ItemError, MeetingRequest, SchedulingOutcome};
use crate::store::{find_available_slot, EntityStore, ScheduledMeeting};
use crate::Result;

/// Run the scheduling batch. Per-item failures are recorded without
/// aborting the batch.
pub async fn run(store: &mut EntityStore, requests: &[MeetingRequest]) -> Result<SchedulingOutcome> {
    let requests: Vec<MeetingRequest> = if requests.is_empty() {
        store
            .unscheduled_prospect_ids()
            .into_iter()
            .map(MeetingRequest::discovery_call)
            .collect()
    } else {
        requests.to_vec()
    };

    info!("Scheduling meetings for {} prospects", requests.len());
    let mut outcome = SchedulingOutcome::default();

    for request in &requests {
        outcome.meetings_requested += 1;

        match schedule_one(store, request) {
            Ok(Some(meeting)) => {
                outcome.meetings_confirmed += 1;
                outcome.scheduled_meetings.push(meeting);
            }
            Ok(None) => {
                debug!("No slot available for prospect {}", request.prospect_id);
                outcome.calendar_conflicts += 1;
            }
            Err(e) => {
                outcome
                    .errors
                    .push(ItemError::new(request.prospect_id.clone(), e.to_string()));
            }
        }
    }

    info!(
        requested = outcome.meetings_requested,
        confirmed = outcome.meetings_confirmed,
        conflicts = outcome.calendar_conflicts,
        "Meeting scheduling completed"
    );
    Ok(outcome)
}

fn schedule_one(
    store: &mut EntityStore,
    request: &MeetingRequest,
) -> crate::Result<Option<ScheduledMeeting>> {
    let slot = match find_available_slot(&request.meeting_type, &request.preferred_times) {
        Some(slot) => slot,
        None => return Ok(None),
    };

    let meeting = ScheduledMeeting::new(request.prospect_id.clone(), request.meeting_type.clone(), slot);
    store.add_meeting(meeting.clone());

    // A request for an unknown prospect still books the slot; only the
    // prospect flags are skipped
    if let Some(prospect) = store.prospect_mut(&request.prospect_id) {
        prospect.meeting_scheduled = true;
        prospect.next_action = "attend_meeting".to_string();
    }

    Ok(Some(meeting))
}
