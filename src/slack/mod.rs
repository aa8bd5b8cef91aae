//! Slack bridge: Web API client, Block Kit builders and Events API dispatch.

pub mod blocks;
pub mod client;
pub mod events;
