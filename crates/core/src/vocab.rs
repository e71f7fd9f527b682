//! Closed vocabularies shared across the moderation workflow.
//!
//! Every user-facing keyword and moderator-facing signal is a closed, typed
//! set with a total mapping, so adding a category or disposition is a
//! compiler-enforced change rather than a string comparison scattered across
//! call sites.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Control keywords for the reporting dialogue.
pub mod keywords {
    /// Starts a new report.
    pub const START: &str = "report";
    /// Cancels an in-flight report from any non-terminal state.
    pub const CANCEL: &str = "cancel";
    /// Asks for usage instructions.
    pub const HELP: &str = "help";
    /// Age disclosure: reporter is under 18.
    pub const UNDERAGE: &str = "under";
    /// Age disclosure: reporter is 18 or over.
    pub const OVERAGE: &str = "over";
    /// Block the reported user.
    pub const BLOCK: &str = "block";
    /// Submit without blocking.
    pub const DO_NOT_BLOCK: &str = "no block";
}

/// Reaction symbols moderators place on forwarded summaries.
///
/// These identifiers are shared between the summary-posting code (the
/// reaction legend) and the resolution code; they must never drift apart.
pub mod signals {
    /// Delete the reported message.
    pub const DELETE: &str = "💩";
    /// Ban the reported user.
    pub const BAN: &str = "🚷";
    /// Ban the reported user and escalate to local authorities.
    pub const BAN_AND_ESCALATE: &str = "🚓";
    /// Mark resolved with no further action.
    pub const RESOLVE: &str = "☑️";
}

/// Abuse categories a reporter chooses from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportCategory {
    /// Unwanted intimate or sexual content.
    Intimate,
    /// Content promoting self harm.
    SelfHarm,
    /// Hate speech or harassment.
    Hate,
    /// Violence or threats of violence.
    Violence,
    /// Unsolicited spam.
    Spam,
    /// Anything else.
    Other,
}

impl ReportCategory {
    /// All categories, in menu order.
    pub const ALL: [Self; 6] = [
        Self::Intimate,
        Self::SelfHarm,
        Self::Hate,
        Self::Violence,
        Self::Spam,
        Self::Other,
    ];

    /// The user-facing keyword for this category.
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Intimate => "intimate",
            Self::SelfHarm => "self harm",
            Self::Hate => "hate speech/harassment",
            Self::Violence => "violence",
            Self::Spam => "spam",
            Self::Other => "other",
        }
    }

    /// Parse a user-facing keyword. Matching is exact and case-sensitive.
    #[must_use]
    pub fn from_keyword(text: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.keyword() == text)
    }
}

impl fmt::Display for ReportCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// A moderator's reaction signal, decoded from the reaction emoji.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispositionSignal {
    /// Delete the reported message.
    Delete,
    /// Ban the reported user.
    Ban,
    /// Ban the reported user and escalate the incident.
    BanAndEscalate,
    /// Mark resolved with no further action.
    Resolve,
    /// Any other reaction; resolves as a false positive.
    Other,
}

impl DispositionSignal {
    /// Decode a reaction emoji. Total: unknown emoji map to [`Self::Other`].
    #[must_use]
    pub fn from_emoji(emoji: &str) -> Self {
        match emoji {
            signals::DELETE => Self::Delete,
            signals::BAN => Self::Ban,
            signals::BAN_AND_ESCALATE => Self::BanAndEscalate,
            signals::RESOLVE => Self::Resolve,
            _ => Self::Other,
        }
    }
}

/// Terminal moderator decision on a flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Disposition {
    /// Awaiting a moderator decision.
    Pending,
    /// The reported message was deleted.
    Deleted,
    /// The reported user was banned.
    Banned,
    /// The reported user was banned and the incident escalated.
    BannedAndEscalated,
    /// Resolved with no further action.
    Resolved,
    /// The flag was a false positive.
    FalsePositive,
}

impl From<DispositionSignal> for Disposition {
    /// Total signal-to-disposition mapping; the catch-all is deliberate so a
    /// moderator action is never dropped.
    fn from(signal: DispositionSignal) -> Self {
        match signal {
            DispositionSignal::Delete => Self::Deleted,
            DispositionSignal::Ban => Self::Banned,
            DispositionSignal::BanAndEscalate => Self::BannedAndEscalated,
            DispositionSignal::Resolve => Self::Resolved,
            DispositionSignal::Other => Self::FalsePositive,
        }
    }
}

/// Flag priority. `HighPriority` sorts first.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// Child-solicitation escalation fast path.
    HighPriority,
    /// Everything else.
    #[default]
    Normal,
}
