//! Flag registry correlating moderation-channel forwards with flagged content.
//!
//! Entries are keyed by the id of the summary message posted into the
//! moderation channel, because that is the message moderators react to.
//! Resolution pops the entry, so each flag is actioned at most once.

use std::collections::HashMap;
use std::sync::Arc;

use aegis_classifier::AttributeScores;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::warn;

use crate::platform::MessageSnapshot;
use crate::vocab::{Disposition, DispositionSignal, Priority, ReportCategory};

/// What produced a flag.
#[derive(Debug, Clone, PartialEq)]
pub enum FlagSource {
    /// The automated scoring path flagged the message.
    Automated {
        /// The full score breakdown at flag time.
        scores: AttributeScores,
    },
    /// A completed user report identified the message.
    Report {
        /// Reporter-chosen abuse category.
        category: ReportCategory,
        /// Whether the reporter disclosed being a minor.
        reporter_is_minor: bool,
    },
}

/// A flagged item awaiting moderator disposition.
#[derive(Debug, Clone, PartialEq)]
pub struct FlagEntry {
    /// Stable id for this flag, used in summaries and logs.
    pub report_id: String,
    /// The flagged message.
    pub original: MessageSnapshot,
    /// What produced this flag.
    pub source: FlagSource,
    /// Flag priority; high priority is set only by child-solicitation
    /// escalation.
    pub priority: Priority,
    /// Moderator decision; `Pending` until resolved, set exactly once.
    pub disposition: Disposition,
    /// When the entry was registered.
    pub registered_at: DateTime<Utc>,
}

impl FlagEntry {
    /// Create a pending entry.
    #[must_use]
    pub fn new(
        report_id: String,
        original: MessageSnapshot,
        source: FlagSource,
        priority: Priority,
    ) -> Self {
        Self {
            report_id,
            original,
            source,
            priority,
            disposition: Disposition::Pending,
            registered_at: Utc::now(),
        }
    }
}

/// Outcome of resolving a forwarded summary.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// The entry was pending; the disposition has been applied and the entry
    /// permanently retired.
    Actioned {
        /// The retired entry, with its final disposition set.
        entry: FlagEntry,
    },
    /// No pending entry for that summary: it was already resolved, or the
    /// reaction was on a message that never carried a flag. An expected
    /// race, not an error.
    AlreadyHandled,
}

/// In-memory registry of flags awaiting disposition.
#[derive(Clone, Default)]
pub struct FlagRegistry {
    /// Entries keyed by forwarded-summary message id.
    entries: Arc<RwLock<HashMap<u64, FlagEntry>>>,
}

impl FlagRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Register a flag under the id of its forwarded summary.
    ///
    /// A summary id resolves to at most one entry; a duplicate registration
    /// is logged and ignored.
    pub async fn register(&self, forward_id: u64, entry: FlagEntry) {
        let mut entries = self.entries.write().await;
        match entries.entry(forward_id) {
            std::collections::hash_map::Entry::Occupied(existing) => {
                warn!(
                    forward_id,
                    report_id = %existing.get().report_id,
                    "Duplicate flag registration ignored"
                );
            }
            std::collections::hash_map::Entry::Vacant(slot) => {
                slot.insert(entry);
            }
        }
    }

    /// Resolve a moderator's signal against the forwarded summary it was
    /// placed on.
    ///
    /// Pops the entry and applies the total signal-to-disposition mapping.
    /// Resolving an unknown or already-resolved summary is a no-op reported
    /// as [`Resolution::AlreadyHandled`].
    pub async fn resolve(&self, forward_id: u64, signal: DispositionSignal) -> Resolution {
        let mut entries = self.entries.write().await;
        match entries.remove(&forward_id) {
            Some(mut entry) => {
                entry.disposition = Disposition::from(signal);
                Resolution::Actioned { entry }
            }
            None => Resolution::AlreadyHandled,
        }
    }

    /// Number of flags still awaiting disposition.
    pub async fn pending_count(&self) -> usize {
        self.entries.read().await.len()
    }
}
