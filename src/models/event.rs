//! Slack Events API payloads and the reaction event consumed by the
//! reconciler.
//!
//! Only the handful of event kinds the rotation reacts to are modeled.
//! Anything else decodes to an `Unsupported` variant instead of failing.

use serde::{Deserialize, Serialize};

/// Reaction name that marks "I am eating".
pub const THUMBS_UP: &str = "+1";

/// Top-level envelope delivered to the events endpoint.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PushEvent {
    /// Handshake sent when the events URL is configured.
    UrlVerification {
        /// Value that must be echoed back.
        challenge: String,
    },
    /// Wrapper around a workspace event.
    EventCallback {
        /// The inner event.
        event: CallbackEvent,
    },
    /// Any other envelope type.
    #[serde(other)]
    Unsupported,
}

/// Inner workspace events.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CallbackEvent {
    /// A user added a reaction.
    ReactionAdded(ReactionPayload),
    /// A user removed a reaction.
    ReactionRemoved(ReactionPayload),
    /// Any other event type.
    #[serde(other)]
    Unsupported,
}

/// Wire form of `reaction_added` / `reaction_removed`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ReactionPayload {
    /// User who reacted.
    pub user: String,
    /// Emoji name without colons, e.g. `+1`.
    pub reaction: String,
    /// The reacted-to item.
    pub item: ReactionItem,
}

/// Item a reaction was attached to.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct ReactionItem {
    /// Channel containing the message.
    #[serde(default)]
    pub channel: String,
    /// Message timestamp; absent for file reactions.
    #[serde(default)]
    pub ts: String,
}

/// A reaction change on a chat message, independent of the wire format.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReactionEvent {
    /// Emoji name, e.g. `+1`.
    pub reaction: String,
    /// Identifier of the reacted-to message.
    pub message_id: String,
    /// Platform ID of the reacting user.
    pub user: String,
    /// Channel containing the message.
    pub channel: String,
}

impl ReactionEvent {
    /// Whether the reaction is the thumbs-up that counts as eating.
    #[must_use]
    pub fn is_thumbs_up(&self) -> bool {
        self.reaction == THUMBS_UP
    }
}

impl From<ReactionPayload> for ReactionEvent {
    fn from(payload: ReactionPayload) -> Self {
        Self {
            reaction: payload.reaction,
            message_id: payload.item.ts,
            user: payload.user,
            channel: payload.item.channel,
        }
    }
}
