//! Inbound chat-platform events.

use crate::platform::{MessageRef, UserRef};
use serde::{Deserialize, Serialize};

/// An event delivered by the chat platform.
///
/// The platform adapter distinguishes direct messages from guild messages
/// structurally; everything else about an event's meaning (monitored
/// channel, moderation channel, own-bot traffic) is decided by the triage
/// coordinator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundEvent {
    /// A direct message to the bot.
    DirectMessage {
        /// Sender.
        author: UserRef,
        /// Message text.
        content: String,
    },
    /// A message posted in a guild channel.
    ChannelMessage {
        /// Where the message was posted.
        message: MessageRef,
        /// Who posted it.
        author: UserRef,
        /// Message text.
        content: String,
    },
    /// A guild-channel message was edited.
    MessageEdit {
        /// The edited message.
        message: MessageRef,
        /// Original author.
        author: UserRef,
        /// Text after the edit.
        content: String,
    },
    /// A reaction was added to a message.
    ReactionAdd {
        /// The message reacted to.
        message: MessageRef,
        /// Who reacted.
        reactor: UserRef,
        /// The reaction emoji.
        emoji: String,
    },
}
