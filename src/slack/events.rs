//! Slack Events API dispatch.
//!
//! Decodes the push envelope and routes reaction events to the
//! [`ReactionReconciler`]. The caller always acknowledges with 200; the
//! result here only drives logging and the URL verification echo.

use chrono::NaiveDateTime;
use tracing::{debug, info, warn};

use crate::models::event::{CallbackEvent, PushEvent, ReactionEvent};
use crate::rotation::reaction::{ReactionChange, ReactionOutcome, ReactionReconciler};

/// What the events endpoint should answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventAck {
    /// Echo this challenge back to Slack.
    Challenge(String),
    /// Plain acknowledgement.
    Ok,
}

/// Route one push event.
pub async fn dispatch(
    reconciler: &ReactionReconciler<'_>,
    event: PushEvent,
    now: NaiveDateTime,
) -> EventAck {
    match event {
        PushEvent::UrlVerification { challenge } => {
            info!("answering slack url verification");
            EventAck::Challenge(challenge)
        }
        PushEvent::EventCallback { event } => {
            let (payload, change) = match event {
                CallbackEvent::ReactionAdded(payload) => (payload, ReactionChange::Added),
                CallbackEvent::ReactionRemoved(payload) => (payload, ReactionChange::Removed),
                CallbackEvent::Unsupported => {
                    debug!("ignoring unsupported callback event");
                    return EventAck::Ok;
                }
            };
            let reaction = ReactionEvent::from(payload);
            match reconciler.reconcile(&reaction, change, now).await {
                Ok(ReactionOutcome::Applied { meals_eaten, .. }) => {
                    debug!(user = %reaction.user, meals_eaten, "reaction applied");
                }
                Ok(ReactionOutcome::Ignored { reason }) => {
                    debug!(user = %reaction.user, ?reason, "reaction ignored");
                }
                Err(err) => {
                    warn!(user = %reaction.user, message_id = %reaction.message_id, %err, "reaction not applied");
                }
            }
            EventAck::Ok
        }
        PushEvent::Unsupported => {
            debug!("ignoring unsupported push event");
            EventAck::Ok
        }
    }
}
