//! Slack Web API client implementing [`ChatPlatform`].

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use slack_morphism::prelude::{
    SlackApiChatPostMessageRequest, SlackApiToken, SlackApiTokenType, SlackApiTokenValue,
    SlackApiUsersInfoRequest, SlackChannelId, SlackClient, SlackClientHyperHttpsConnector,
    SlackClientSession, SlackMessageContent, SlackUserId,
};
use tracing::{debug, info};

use crate::chat::{ChatMessage, ChatPlatform, UserProfile};
use crate::{config::SlackConfig, AppError, Result};

fn post_request(channel: &str, message: ChatMessage) -> SlackApiChatPostMessageRequest {
    let content = SlackMessageContent {
        text: Some(message.text),
        blocks: Some(message.blocks),
        attachments: None,
        upload: None,
        files: None,
        reactions: None,
        metadata: None,
        markdown_text: None,
    };

    SlackApiChatPostMessageRequest {
        channel: SlackChannelId(channel.to_owned()),
        content,
        as_user: None,
        icon_emoji: None,
        icon_url: None,
        link_names: Some(true),
        parse: None,
        thread_ts: None,
        username: None,
        reply_broadcast: None,
        unfurl_links: None,
        unfurl_media: None,
    }
}

/// Slack bot client used for announcements and profile lookups.
pub struct SlackService {
    client: Arc<SlackClient<SlackClientHyperHttpsConnector>>,
    bot_token: SlackApiToken,
}

impl SlackService {
    /// Build the Slack client from the configured bot token.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Slack` if the HTTPS connector cannot be created,
    /// or `AppError::Config` if no bot token was loaded.
    pub fn start(config: &SlackConfig) -> Result<Self> {
        if config.bot_token.is_empty() {
            return Err(AppError::Config("slack bot token is not loaded".into()));
        }
        let connector = SlackClientHyperHttpsConnector::new()
            .map_err(|err| AppError::Slack(format!("failed to init slack connector: {err}")))?;
        let client = Arc::new(SlackClient::new(connector));
        let bot_token = SlackApiToken {
            token_value: SlackApiTokenValue(config.bot_token.clone()),
            cookie: None,
            team_id: None,
            scope: None,
            token_type: Some(SlackApiTokenType::Bot),
        };

        info!("slack service started");
        Ok(Self { client, bot_token })
    }

    /// Create an HTTP session for direct API calls using the bot token.
    #[must_use]
    pub fn http_session(&self) -> SlackClientSession<'_, SlackClientHyperHttpsConnector> {
        self.client.open_session(&self.bot_token)
    }

    async fn send(&self, channel: &str, message: ChatMessage) -> Result<String> {
        let request = post_request(channel, message);
        let response = self
            .http_session()
            .chat_post_message(&request)
            .await
            .map_err(|err| AppError::Slack(format!("failed to post message: {err}")))?;
        let ts = response.ts.to_string();
        info!(channel, %ts, "posted slack message");
        Ok(ts)
    }

    async fn fetch_profile(&self, platform_id: &str) -> Result<UserProfile> {
        let request = SlackApiUsersInfoRequest::new(SlackUserId(platform_id.to_owned()));
        let response = self
            .http_session()
            .users_info(&request)
            .await
            .map_err(|err| AppError::Slack(format!("failed to read user info: {err}")))?;

        let full_name = response
            .user
            .profile
            .and_then(|profile| {
                profile
                    .real_name
                    .filter(|name| !name.is_empty())
                    .or(profile.display_name.filter(|name| !name.is_empty()))
            })
            .unwrap_or_else(|| platform_id.to_owned());
        debug!(platform_id, %full_name, "fetched slack profile");
        Ok(UserProfile { full_name })
    }
}

impl ChatPlatform for SlackService {
    fn post_message<'a>(
        &'a self,
        channel: &'a str,
        message: ChatMessage,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>> {
        Box::pin(self.send(channel, message))
    }

    fn user_profile<'a>(
        &'a self,
        platform_id: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<UserProfile>> + Send + 'a>> {
        Box::pin(self.fetch_profile(platform_id))
    }
}
