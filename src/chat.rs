//! Chat platform seam used by the rotation engines.
//!
//! The production implementation is [`crate::slack::client::SlackService`];
//! tests substitute a recording fake.

use std::future::Future;
use std::pin::Pin;

use slack_morphism::prelude::SlackBlock;

use crate::Result;

/// Outgoing chat message: fallback text plus Block Kit layout.
#[derive(Debug, Clone)]
pub struct ChatMessage {
    /// Plain-text fallback shown in notifications.
    pub text: String,
    /// Rich layout blocks.
    pub blocks: Vec<SlackBlock>,
}

/// Profile details needed to register a new member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    /// Real name, or the best available fallback.
    pub full_name: String,
}

/// Operations the rotation needs from the chat platform.
pub trait ChatPlatform: Send + Sync {
    /// Post a message to `channel` and return its message identifier.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Slack` if the platform rejects the message.
    fn post_message<'a>(
        &'a self,
        channel: &'a str,
        message: ChatMessage,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>>;

    /// Look up a user's profile by platform ID.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Slack` if the lookup fails.
    fn user_profile<'a>(
        &'a self,
        platform_id: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<UserProfile>> + Send + 'a>>;
}
