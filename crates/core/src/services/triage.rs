//! Triage coordinator: event routing, scoring decisions, and moderator
//! dispositions.
//!
//! One coordinator serves the whole process. Sessions are serialized per
//! reporting user and flags per forwarded summary; work on different keys
//! proceeds concurrently.

use std::collections::HashMap;
use std::sync::Arc;

use aegis_classifier::{AttributeScores, ScoreEvaluator, attributes};
use aegis_common::config::{GuildConfig, TriageConfig};
use aegis_common::{AppResult, IdGenerator};
use chrono::Utc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::events::InboundEvent;
use crate::platform::{MessageRef, MessageSnapshot, Platform, UserRef};
use crate::services::registry::{FlagEntry, FlagRegistry, FlagSource, Resolution};
use crate::services::session::ReportSession;
use crate::services::summary::{self, ModeratorSummary};
use crate::vocab::{DispositionSignal, Priority, ReportCategory, keywords};

const HELP_REPLY: &str = "Use the `report` command to begin the reporting process.\n\
     Use the `cancel` command to cancel the report process.";

/// Channel wiring for one moderated guild, resolved from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuildChannels {
    /// Channel whose messages are scored automatically.
    pub monitored_channel_id: u64,
    /// Channel receiving flag summaries and disposition confirmations.
    pub moderation_channel_id: u64,
}

impl From<&GuildConfig> for GuildChannels {
    fn from(config: &GuildConfig) -> Self {
        Self {
            monitored_channel_id: config.monitored_channel_id,
            moderation_channel_id: config.moderation_channel_id,
        }
    }
}

/// Top-level orchestrator for the moderation workflow.
#[derive(Clone)]
pub struct TriageCoordinator {
    evaluator: Arc<dyn ScoreEvaluator>,
    platform: Arc<dyn Platform>,
    registry: FlagRegistry,
    sessions: Arc<RwLock<HashMap<u64, Arc<Mutex<ReportSession>>>>>,
    guilds: Arc<HashMap<u64, GuildChannels>>,
    config: TriageConfig,
    bot_user_id: u64,
    id_gen: IdGenerator,
}

impl TriageCoordinator {
    /// Create a coordinator over the given collaborators.
    #[must_use]
    pub fn new(
        evaluator: Arc<dyn ScoreEvaluator>,
        platform: Arc<dyn Platform>,
        guilds: HashMap<u64, GuildChannels>,
        config: TriageConfig,
        bot_user_id: u64,
    ) -> Self {
        Self {
            evaluator,
            platform,
            registry: FlagRegistry::new(),
            sessions: Arc::new(RwLock::new(HashMap::new())),
            guilds: Arc::new(guilds),
            config,
            bot_user_id,
            id_gen: IdGenerator::new(),
        }
    }

    /// The flag registry backing this coordinator.
    #[must_use]
    pub const fn registry(&self) -> &FlagRegistry {
        &self.registry
    }

    /// Number of in-flight report sessions.
    pub async fn active_session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Route one inbound platform event to the appropriate path.
    pub async fn on_event(&self, event: InboundEvent) -> AppResult<()> {
        match event {
            InboundEvent::DirectMessage { author, content } => {
                if author.id == self.bot_user_id {
                    return Ok(());
                }
                self.on_direct_message(&author, &content).await?;
            }
            InboundEvent::ChannelMessage {
                message,
                author,
                content,
            } => {
                if author.id == self.bot_user_id {
                    return Ok(());
                }
                let snapshot = MessageSnapshot {
                    message,
                    author,
                    content,
                };
                if self.is_monitored(&snapshot.message) {
                    self.on_channel_message(&snapshot).await?;
                } else {
                    debug!(
                        channel_id = snapshot.message.channel_id,
                        "Ignoring message in unmonitored channel"
                    );
                }
            }
            InboundEvent::MessageEdit {
                message,
                author,
                content,
            } => {
                if author.id == self.bot_user_id {
                    return Ok(());
                }
                let snapshot = MessageSnapshot {
                    message,
                    author,
                    content,
                };
                self.on_message_edit(&snapshot).await?;
            }
            InboundEvent::ReactionAdd {
                message,
                reactor,
                emoji,
            } => {
                if reactor.id == self.bot_user_id {
                    return Ok(());
                }
                if self.is_moderation_channel(&message) {
                    self.on_moderator_signal(&message, &emoji).await?;
                }
            }
        }
        Ok(())
    }

    /// Handle one direct message from a (potential) reporter.
    ///
    /// Returns the replies sent back to the user.
    pub async fn on_direct_message(&self, author: &UserRef, content: &str) -> AppResult<Vec<String>> {
        if content == keywords::HELP {
            self.platform
                .send_direct_message(author.id, HELP_REPLY)
                .await?;
            return Ok(vec![HELP_REPLY.to_string()]);
        }

        let existing = self.sessions.read().await.get(&author.id).cloned();
        let session = match existing {
            Some(session) => session,
            None => {
                // Only the start keyword opens a new session
                if !content.starts_with(keywords::START) {
                    return Ok(Vec::new());
                }
                let created = Arc::new(Mutex::new(ReportSession::new(author.id)));
                self.sessions
                    .write()
                    .await
                    .entry(author.id)
                    .or_insert_with(|| Arc::clone(&created))
                    .clone()
            }
        };

        // Per-user serialization: the session lock is held for the whole turn
        let mut session = session.lock().await;
        let replies = session.handle(content, self.platform.as_ref()).await;
        for reply in &replies {
            self.platform.send_direct_message(author.id, reply).await?;
        }

        if session.take_escalation() {
            self.forward_report(&session, Priority::HighPriority).await?;
        }
        if session.is_submitted() {
            self.forward_report(&session, Priority::Normal).await?;
        }

        let finished = session.is_submitted() || session.is_complete();
        drop(session);
        if finished {
            self.sessions.write().await.remove(&author.id);
        }

        Ok(replies)
    }

    /// Score a monitored-channel message and flag it if it breaches a
    /// threshold.
    ///
    /// Returns the posted summary when the message was flagged. Classifier
    /// failures fail open: the message is not flagged and the failure is
    /// logged, never surfaced to users.
    pub async fn on_channel_message(
        &self,
        snapshot: &MessageSnapshot,
    ) -> AppResult<Option<ModeratorSummary>> {
        let scores = match self.evaluator.score(&snapshot.content).await {
            Ok(scores) => scores,
            Err(e) => {
                warn!(
                    error = %e,
                    message_id = snapshot.message.message_id,
                    "Classifier call failed; message not flagged"
                );
                return Ok(None);
            }
        };

        if !self.should_flag(&scores) {
            return Ok(None);
        }

        let Some(channels) = self.guilds.get(&snapshot.message.guild_id) else {
            warn!(
                guild_id = snapshot.message.guild_id,
                "Flagged message in guild with no moderation channel"
            );
            return Ok(None);
        };

        let moderator_summary = summary::automated(snapshot, &scores);
        // The registry entry is written only after the decision and the post,
        // so no pending placeholder exists during the network calls.
        let forward_id = self
            .platform
            .post_to_channel(channels.moderation_channel_id, &moderator_summary.body)
            .await?;

        let report_id = self.id_gen.generate();
        info!(
            report_id = %report_id,
            message_id = snapshot.message.message_id,
            forward_id,
            "Message flagged by automated scoring"
        );
        self.registry
            .register(
                forward_id,
                FlagEntry::new(
                    report_id,
                    snapshot.clone(),
                    FlagSource::Automated { scores },
                    Priority::Normal,
                ),
            )
            .await;

        Ok(Some(moderator_summary))
    }

    /// Re-run the scoring decision on an edited message.
    ///
    /// Uses the same decision path as a newly posted message. Edits inside
    /// unmonitored channels (including moderation channels) are ignored.
    pub async fn on_message_edit(
        &self,
        snapshot: &MessageSnapshot,
    ) -> AppResult<Option<ModeratorSummary>> {
        if !self.is_monitored(&snapshot.message) {
            debug!(
                channel_id = snapshot.message.channel_id,
                "Ignoring edit in unmonitored channel"
            );
            return Ok(None);
        }
        self.on_channel_message(snapshot).await
    }

    /// Apply a moderator's reaction signal to the forwarded summary it was
    /// placed on.
    pub async fn on_moderator_signal(
        &self,
        message: &MessageRef,
        emoji: &str,
    ) -> AppResult<Resolution> {
        let signal = DispositionSignal::from_emoji(emoji);
        match self.registry.resolve(message.message_id, signal).await {
            Resolution::Actioned { entry } => {
                let confirmation = summary::disposition_confirmation(&entry, Utc::now());
                if let Some(channels) = self.guilds.get(&message.guild_id) {
                    self.platform
                        .post_to_channel(channels.moderation_channel_id, &confirmation)
                        .await?;
                }
                info!(
                    report_id = %entry.report_id,
                    disposition = ?entry.disposition,
                    "Flag resolved"
                );
                Ok(Resolution::Actioned { entry })
            }
            Resolution::AlreadyHandled => {
                info!(
                    forward_id = message.message_id,
                    "Reaction on already-handled flag"
                );
                Ok(Resolution::AlreadyHandled)
            }
        }
    }

    /// The automated flagging decision.
    ///
    /// Flags when any non-flirtation score exceeds the toxicity threshold,
    /// or when the flirtation score exceeds its own threshold.
    fn should_flag(&self, scores: &AttributeScores) -> bool {
        let toxic = scores
            .max_excluding(attributes::FLIRTATION)
            .is_some_and(|max| max > self.config.toxicity_threshold);
        let flirtation = scores
            .get(attributes::FLIRTATION)
            .is_some_and(|score| score > self.config.flirtation_threshold);
        toxic || flirtation
    }

    /// Forward a report-driven flag to the moderation channel and register it.
    async fn forward_report(&self, session: &ReportSession, priority: Priority) -> AppResult<()> {
        let Some(snapshot) = session.reported_message() else {
            warn!(
                owner_id = session.owner_id(),
                "Report session finished without an identified message"
            );
            return Ok(());
        };
        let Some(channels) = self.guilds.get(&snapshot.message.guild_id) else {
            warn!(
                guild_id = snapshot.message.guild_id,
                "Report targets guild with no moderation channel"
            );
            return Ok(());
        };

        let report_id = self.id_gen.generate();
        let moderator_summary = match priority {
            Priority::HighPriority => {
                summary::child_solicitation(&report_id, session.category(), snapshot)
            }
            Priority::Normal => summary::report(
                &report_id,
                session.category().unwrap_or(ReportCategory::Other),
                snapshot,
            ),
        };

        let forward_id = self
            .platform
            .post_to_channel(channels.moderation_channel_id, &moderator_summary.body)
            .await?;

        info!(
            report_id = %report_id,
            owner_id = session.owner_id(),
            forward_id,
            priority = ?priority,
            "Report forwarded to moderation channel"
        );
        self.registry
            .register(
                forward_id,
                FlagEntry::new(
                    report_id,
                    snapshot.clone(),
                    FlagSource::Report {
                        category: session.category().unwrap_or(ReportCategory::Other),
                        reporter_is_minor: session.is_minor() == Some(true),
                    },
                    priority,
                ),
            )
            .await;

        Ok(())
    }

    fn is_monitored(&self, message: &MessageRef) -> bool {
        self.guilds
            .get(&message.guild_id)
            .is_some_and(|channels| channels.monitored_channel_id == message.channel_id)
    }

    fn is_moderation_channel(&self, message: &MessageRef) -> bool {
        self.guilds
            .get(&message.guild_id)
            .is_some_and(|channels| channels.moderation_channel_id == message.channel_id)
    }
}
