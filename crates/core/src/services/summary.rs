//! Moderator-facing summary and confirmation formatting.
//!
//! Correlation between a summary and its flagged message is carried by the
//! registry's structured keys; nothing here is ever parsed back out of the
//! text.

use aegis_classifier::AttributeScores;
use chrono::{DateTime, Utc};

use crate::platform::MessageSnapshot;
use crate::services::registry::FlagEntry;
use crate::vocab::{Disposition, Priority, ReportCategory, signals};

/// A formatted summary ready to post into a moderation channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeratorSummary {
    /// Sort-to-top marker for the moderation queue.
    pub priority: Priority,
    /// Message body.
    pub body: String,
}

/// Summary for a message flagged by the automated scoring path.
#[must_use]
pub fn automated(snapshot: &MessageSnapshot, scores: &AttributeScores) -> ModeratorSummary {
    let body = format!(
        "**Suspected message:**\n**Suspected abuser:** {}\n**Message ID:** `{}`\n\
         **Message content:** `{}`\n**Message suspicion scores:**\n{}\n{}",
        snapshot.author.username,
        snapshot.message.message_id,
        snapshot.content,
        code_block(&scores.to_pretty_json()),
        reaction_legend()
    );
    ModeratorSummary {
        priority: Priority::Normal,
        body,
    }
}

/// Summary for a message identified by a completed user report.
#[must_use]
pub fn report(
    report_id: &str,
    category: ReportCategory,
    snapshot: &MessageSnapshot,
) -> ModeratorSummary {
    let body = format!(
        "**Report** `{report_id}`\n**Suspected abuser:** {}\n**Message ID:** `{}`\n\
         **Message content:** `{}`\n**Report type:** `{category}`\n{}",
        snapshot.author.username,
        snapshot.message.message_id,
        snapshot.content,
        reaction_legend()
    );
    ModeratorSummary {
        priority: Priority::Normal,
        body,
    }
}

/// High-priority summary for a child-solicitation escalation.
///
/// Never merged with the normal report summary; the banner keeps it visually
/// distinct in the moderation queue.
#[must_use]
pub fn child_solicitation(
    report_id: &str,
    category: Option<ReportCategory>,
    snapshot: &MessageSnapshot,
) -> ModeratorSummary {
    let category_line = category.map_or_else(String::new, |c| format!("**Report type:** `{c}`\n"));
    let body = format!(
        "🚨🚨🚨🚨🚨🚨🚨🚨🚨\n🚨🚨   **High Priority**   🚨🚨\n🚨🚨🚨🚨🚨🚨🚨🚨🚨\n\n\
         **POTENTIAL CHILD SOLICITATION**\n\n**Report** `{report_id}`\n\
         **Suspected abuser:** {}\n**Message ID:** `{}`\n**Message content:** `{}`\n{category_line}{}",
        snapshot.author.username,
        snapshot.message.message_id,
        snapshot.content,
        reaction_legend()
    );
    ModeratorSummary {
        priority: Priority::HighPriority,
        body,
    }
}

/// The single confirmation posted when a flag is resolved.
#[must_use]
pub fn disposition_confirmation(entry: &FlagEntry, at: DateTime<Utc>) -> String {
    let author = &entry.original.author.username;
    let message_id = entry.original.message.message_id;
    let content = &entry.original.content;

    match entry.disposition {
        Disposition::Deleted => format!(
            "**Deleted** the following message:\n**From:** `{author}` **Message ID:** \
             `{message_id}` **Message content:** `{content}`\n**At:** `{at}`"
        ),
        Disposition::Banned => format!(
            "**Shadow banning** the user `{author}` for sending **Message ID:** `{message_id}` \
             **Message content:** `{content}`\n**At:** `{at}`"
        ),
        Disposition::BannedAndEscalated => format!(
            "`{author}` is **banned** for sending **Message ID:** `{message_id}` **Message \
             content:** `{content}`\n**At:** `{at}`\nThis report has been shared with local \
             authorities."
        ),
        Disposition::Resolved => {
            "This report has been marked as **Resolved** with no further actions.".to_string()
        }
        Disposition::FalsePositive => format!(
            "This was a false positive:\n`{author}` sent **Message ID:** `{message_id}` \
             **Message content:** `{content}`\n**At:** `{at}`"
        ),
        // Unresolved entries never reach confirmation formatting
        Disposition::Pending => format!("Report `{}` is still pending.", entry.report_id),
    }
}

fn code_block(s: &str) -> String {
    format!("```\n{s}\n```")
}

fn reaction_legend() -> String {
    format!(
        "Please use one of the following reactions:\n\n{} `Delete` the reported message\n\n\
         {} `Ban` the reported user\n\n{} `Ban` the reported user and `Escalate` this incident \
         to local authorities\n\n{} Mark this report as `Resolved` with no further actions\n\n\
         Select any other reaction to mark the report as a false alarm",
        signals::DELETE,
        signals::BAN,
        signals::BAN_AND_ESCALATE,
        signals::RESOLVE
    )
}
