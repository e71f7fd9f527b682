//! Chat-platform boundary: shared references and collaborator traits.
//!
//! The platform connection itself (session, event delivery, channel
//! discovery) lives outside this crate; these traits are the seams the
//! engine consumes it through.

use async_trait::async_trait;
use aegis_common::AppResult;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fully-qualified reference to a message on the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageRef {
    /// Guild the message was posted in.
    pub guild_id: u64,
    /// Channel within the guild.
    pub channel_id: u64,
    /// The message itself.
    pub message_id: u64,
}

/// Reference to a platform user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRef {
    /// User id.
    pub id: u64,
    /// Display name at the time the event was captured.
    pub username: String,
}

/// A resolved message: its reference, author, and content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageSnapshot {
    /// Where the message lives.
    pub message: MessageRef,
    /// Who wrote it.
    pub author: UserRef,
    /// The message text.
    pub content: String,
}

/// Failure to resolve a message reference, one variant per distinct
/// corrective reply shown to the reporter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    /// The guild is not one this bot is in.
    #[error("guild unavailable")]
    GuildUnavailable,

    /// The channel was deleted or never existed.
    #[error("channel not found")]
    ChannelNotFound,

    /// The message was deleted or never existed.
    #[error("message not found")]
    MessageNotFound,

    /// The platform call itself failed.
    #[error("platform error: {0}")]
    Platform(String),
}

/// Resolves message references against the platform.
#[async_trait]
pub trait MessageLookup: Send + Sync {
    /// Fetch a message by reference.
    async fn fetch_message(&self, message: &MessageRef) -> Result<MessageSnapshot, LookupError>;
}

/// Outbound side of the chat platform.
#[async_trait]
pub trait Platform: MessageLookup {
    /// Send a direct message to a user.
    async fn send_direct_message(&self, user_id: u64, text: &str) -> AppResult<()>;

    /// Post a message into a channel, returning the new message's id.
    ///
    /// The returned id is the correlation key for moderator reactions on
    /// forwarded summaries.
    async fn post_to_channel(&self, channel_id: u64, text: &str) -> AppResult<u64>;
}
