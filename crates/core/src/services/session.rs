//! Report session state machine for the user-facing reporting dialogue.
//!
//! One session exists per reporting user. Every inbound DM from the owner is
//! fed through [`ReportSession::handle`], which returns the replies to send
//! and advances the state. Unrecognized input re-prompts the current pending
//! question without touching already-captured fields.

use chrono::Utc;
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

use crate::platform::{LookupError, MessageLookup, MessageRef, MessageSnapshot};
use crate::vocab::{ReportCategory, keywords};

static MESSAGE_LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/(\d+)/(\d+)/(\d+)").unwrap());

const CANCELLED_REPLY: &str = "Report cancelled.";

const LINK_MALFORMED_REPLY: &str =
    "I'm sorry, I couldn't read that link. Please try again or say `cancel` to cancel.";

const GUILD_UNAVAILABLE_REPLY: &str = "I cannot accept reports of messages from guilds that I'm \
     not in. Please have the guild owner add me to the guild and try again.";

const CHANNEL_MISSING_REPLY: &str =
    "It seems this channel was deleted or never existed. Please try again or say `cancel` to cancel.";

const MESSAGE_MISSING_REPLY: &str =
    "It seems this message was deleted or never existed. Please try again or say `cancel` to cancel.";

const SOLICITATION_RESOURCES: &str = "\
Hey, just so you know, it is NOT your fault if you experienced something uncomfortable \
or did something you think you maybe shouldn't have done. You're a kid and you're still \
learning. The fault is ALWAYS on the adults.
Here are some educational and emotional resources for you to look at while we review your case:
https://www.missingkids.org/gethelpnow/csam-resources
https://www.pacer.org/cmh/
https://childmind.org/";

/// Dialogue state of a report session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Session created; instructions not yet sent.
    Start,
    /// Waiting for the reporter to paste a message link.
    AwaitingMessageLink,
    /// Message resolved; waiting for an abuse category.
    MessageIdentified,
    /// Category captured; waiting for the age disclosure.
    AwaitingAgeDisclosure,
    /// Adult reporter; waiting for the block choice.
    AwaitingBlockChoice,
    /// Minor disclosed; escalation path, replays support resources.
    ChildSolicitationFlow,
    /// Report queued for moderator forwarding without a block.
    Submitted,
    /// Dialogue finished (cancelled, or submitted with block applied).
    Complete,
}

/// A single user's in-flight report.
///
/// All captured fields live on the instance; nothing is shared between
/// sessions.
#[derive(Debug)]
pub struct ReportSession {
    owner_id: u64,
    state: SessionState,
    reported_message: Option<MessageSnapshot>,
    category: Option<ReportCategory>,
    is_minor: Option<bool>,
    block_requested: bool,
    pending_escalation: bool,
}

impl ReportSession {
    /// Create a session owned by the given user.
    #[must_use]
    pub const fn new(owner_id: u64) -> Self {
        Self {
            owner_id,
            state: SessionState::Start,
            reported_message: None,
            category: None,
            is_minor: None,
            block_requested: false,
            pending_escalation: false,
        }
    }

    /// The reporting user.
    #[must_use]
    pub const fn owner_id(&self) -> u64 {
        self.owner_id
    }

    /// Current dialogue state.
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// The message under report, once identified.
    #[must_use]
    pub const fn reported_message(&self) -> Option<&MessageSnapshot> {
        self.reported_message.as_ref()
    }

    /// The chosen abuse category, once captured.
    #[must_use]
    pub const fn category(&self) -> Option<ReportCategory> {
        self.category
    }

    /// The age disclosure, once captured.
    #[must_use]
    pub const fn is_minor(&self) -> Option<bool> {
        self.is_minor
    }

    /// Whether the reporter asked for the reported user to be blocked.
    #[must_use]
    pub const fn block_requested(&self) -> bool {
        self.block_requested
    }

    /// Whether the dialogue has finished.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        matches!(self.state, SessionState::Complete)
    }

    /// Whether the report is queued for moderator forwarding.
    #[must_use]
    pub const fn is_submitted(&self) -> bool {
        matches!(self.state, SessionState::Submitted)
    }

    /// Whether the session is on the child-solicitation escalation path.
    #[must_use]
    pub const fn is_child_solicitation(&self) -> bool {
        matches!(self.state, SessionState::ChildSolicitationFlow)
    }

    /// One-shot escalation marker: returns `true` exactly once after the
    /// session enters the child-solicitation flow, so the high-priority
    /// moderator forward fires a single time.
    pub const fn take_escalation(&mut self) -> bool {
        if self.pending_escalation {
            self.pending_escalation = false;
            true
        } else {
            false
        }
    }

    /// Feed one inbound DM from the owning user through the state machine.
    ///
    /// Returns the replies to send back, in order. Terminal sessions return
    /// no replies.
    pub async fn handle<L>(&mut self, content: &str, lookup: &L) -> Vec<String>
    where
        L: MessageLookup + ?Sized,
    {
        if matches!(self.state, SessionState::Submitted | SessionState::Complete) {
            return Vec::new();
        }

        // Cancellation overrides all other logic in any non-terminal state.
        if content == keywords::CANCEL {
            debug!(owner_id = self.owner_id, "Report cancelled");
            self.state = SessionState::Complete;
            return vec![CANCELLED_REPLY.to_string()];
        }

        match self.state {
            SessionState::Start => self.on_start(),
            SessionState::AwaitingMessageLink => self.on_awaiting_link(content, lookup).await,
            SessionState::MessageIdentified => self.on_awaiting_category(content),
            SessionState::AwaitingAgeDisclosure => self.on_awaiting_age(content),
            SessionState::AwaitingBlockChoice => self.on_awaiting_block(content),
            SessionState::ChildSolicitationFlow => vec![SOLICITATION_RESOURCES.to_string()],
            SessionState::Submitted | SessionState::Complete => Vec::new(),
        }
    }

    fn on_start(&mut self) -> Vec<String> {
        self.state = SessionState::AwaitingMessageLink;
        vec![
            "Thank you for starting the reporting process. Say `help` at any time for more \
             information.\n\nPlease copy paste the link to the message you want to report.\n\
             You can obtain this link by right-clicking the message and clicking `Copy Message \
             Link`."
                .to_string(),
        ]
    }

    async fn on_awaiting_link<L>(&mut self, content: &str, lookup: &L) -> Vec<String>
    where
        L: MessageLookup + ?Sized,
    {
        let Some(message_ref) = parse_message_link(content) else {
            return vec![LINK_MALFORMED_REPLY.to_string()];
        };

        let snapshot = match lookup.fetch_message(&message_ref).await {
            Ok(snapshot) => snapshot,
            Err(LookupError::GuildUnavailable) => {
                return vec![GUILD_UNAVAILABLE_REPLY.to_string()];
            }
            Err(LookupError::ChannelNotFound) => {
                return vec![CHANNEL_MISSING_REPLY.to_string()];
            }
            Err(LookupError::MessageNotFound) => {
                return vec![MESSAGE_MISSING_REPLY.to_string()];
            }
            Err(LookupError::Platform(reason)) => {
                debug!(owner_id = self.owner_id, reason, "Message lookup failed");
                return vec![MESSAGE_MISSING_REPLY.to_string()];
            }
        };

        let preview = format!("```{}: {}```", snapshot.author.username, snapshot.content);
        self.reported_message = Some(snapshot);
        self.state = SessionState::MessageIdentified;

        vec![
            "I found this message: ".to_string(),
            preview,
            format!(
                "If this is not the right message, type `cancel` and restart the reporting \
                 process.\nOtherwise, let me know which of the following abuse types this \
                 message is:\n{}",
                category_menu()
            ),
        ]
    }

    fn on_awaiting_category(&mut self, content: &str) -> Vec<String> {
        let Some(category) = ReportCategory::from_keyword(content) else {
            return vec![format!(
                "I'm sorry, I didn't recognize that abuse type. Please reply with one of:\n{}",
                category_menu()
            )];
        };

        self.category = Some(category);
        self.state = SessionState::AwaitingAgeDisclosure;
        vec![format!(
            "We are sorry to hear that you received a concerning message. In order to properly \
             prioritize your report, will you let us know if you are under the age of 18?\n\
             Please respond `{}` or `{}`.",
            keywords::UNDERAGE,
            keywords::OVERAGE
        )]
    }

    fn on_awaiting_age(&mut self, content: &str) -> Vec<String> {
        match content {
            keywords::UNDERAGE => {
                self.is_minor = Some(true);
                self.block_requested = true;
                self.state = SessionState::ChildSolicitationFlow;
                self.pending_escalation = true;
                vec![format!(
                    "Thanks so much for letting us know. **You are so brave!** For your safety, \
                     we've prevented this user from contacting you again.\n{}\n{}",
                    SOLICITATION_RESOURCES,
                    self.report_details()
                )]
            }
            keywords::OVERAGE => {
                self.is_minor = Some(false);
                self.state = SessionState::AwaitingBlockChoice;
                vec![format!(
                    "Thanks for letting us know! We will contact you when we have reviewed your \
                     case. In the meantime, would you like to block the user from this \
                     conversation? Reply `{}` or `{}`:",
                    keywords::BLOCK,
                    keywords::DO_NOT_BLOCK
                )]
            }
            _ => vec![format!(
                "I'm sorry, I didn't get that. In order to properly prioritize your report, \
                 will you let us know if you are under the age of 18? Please respond `{}` or \
                 `{}`.",
                keywords::UNDERAGE,
                keywords::OVERAGE
            )],
        }
    }

    fn on_awaiting_block(&mut self, content: &str) -> Vec<String> {
        match content {
            keywords::BLOCK => {
                self.block_requested = true;
                self.state = SessionState::Complete;
                let author = self
                    .reported_message
                    .as_ref()
                    .map_or_else(String::new, |m| m.author.username.clone());
                vec![format!(
                    "We have **Blocked** {author} and prevented the account from any future \
                     interactions.\nYour report is **Successfully submitted**.\n{}",
                    self.report_details()
                )]
            }
            keywords::DO_NOT_BLOCK => {
                self.state = SessionState::Submitted;
                vec![format!(
                    "Your report is **Successfully submitted**.\n{}",
                    self.report_details()
                )]
            }
            _ => vec![format!(
                "I'm sorry, I didn't get that. Would you like to block the user from this \
                 conversation? Reply `{}` or `{}`.",
                keywords::BLOCK,
                keywords::DO_NOT_BLOCK
            )],
        }
    }

    fn report_details(&self) -> String {
        let (author, content) = self.reported_message.as_ref().map_or_else(
            || (String::new(), String::new()),
            |m| (m.author.username.clone(), m.content.clone()),
        );
        format!(
            "**Reported user:** `{author}` **Reported message:** `{content}`\n**At:** `{}`",
            Utc::now()
        )
    }
}

/// Parse the three numeric identifiers out of a pasted message link.
#[must_use]
pub fn parse_message_link(text: &str) -> Option<MessageRef> {
    let captures = MESSAGE_LINK_RE.captures(text)?;
    let guild_id = captures.get(1)?.as_str().parse().ok()?;
    let channel_id = captures.get(2)?.as_str().parse().ok()?;
    let message_id = captures.get(3)?.as_str().parse().ok()?;
    Some(MessageRef {
        guild_id,
        channel_id,
        message_id,
    })
}

fn category_menu() -> String {
    ReportCategory::ALL
        .iter()
        .map(|c| format!("`{}`", c.keyword()))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::platform::UserRef;
    use async_trait::async_trait;

    struct StubLookup {
        result: Result<MessageSnapshot, LookupError>,
    }

    #[async_trait]
    impl MessageLookup for StubLookup {
        async fn fetch_message(
            &self,
            _message: &MessageRef,
        ) -> Result<MessageSnapshot, LookupError> {
            self.result.clone()
        }
    }

    fn snapshot() -> MessageSnapshot {
        MessageSnapshot {
            message: MessageRef {
                guild_id: 123,
                channel_id: 456,
                message_id: 789,
            },
            author: UserRef {
                id: 42,
                username: "suspect".to_string(),
            },
            content: "something awful".to_string(),
        }
    }

    fn found() -> StubLookup {
        StubLookup {
            result: Ok(snapshot()),
        }
    }

    async fn session_at_category_menu() -> ReportSession {
        let mut session = ReportSession::new(7);
        session.handle("report", &found()).await;
        session.handle("https://chat.example/channels/123/456/789", &found()).await;
        assert_eq!(session.state(), SessionState::MessageIdentified);
        session
    }

    #[test]
    fn test_parse_message_link() {
        let parsed = parse_message_link("https://chat.example/channels/123/456/789").unwrap();
        assert_eq!(parsed.guild_id, 123);
        assert_eq!(parsed.channel_id, 456);
        assert_eq!(parsed.message_id, 789);

        assert!(parse_message_link("no numbers here").is_none());
        assert!(parse_message_link("/123/456").is_none());
    }

    #[tokio::test]
    async fn test_start_transitions_to_awaiting_link() {
        let mut session = ReportSession::new(7);
        let replies = session.handle("report", &found()).await;
        assert_eq!(replies.len(), 1);
        assert!(replies[0].contains("Copy Message Link"));
        assert_eq!(session.state(), SessionState::AwaitingMessageLink);
    }

    #[tokio::test]
    async fn test_link_failures_are_distinct_and_keep_state() {
        let mut session = ReportSession::new(7);
        session.handle("report", &found()).await;

        let malformed = session.handle("not a link", &found()).await;
        assert_eq!(malformed, vec![LINK_MALFORMED_REPLY.to_string()]);
        assert_eq!(session.state(), SessionState::AwaitingMessageLink);

        for (error, reply) in [
            (LookupError::GuildUnavailable, GUILD_UNAVAILABLE_REPLY),
            (LookupError::ChannelNotFound, CHANNEL_MISSING_REPLY),
            (LookupError::MessageNotFound, MESSAGE_MISSING_REPLY),
        ] {
            let lookup = StubLookup { result: Err(error) };
            let replies = session.handle("/123/456/789", &lookup).await;
            assert_eq!(replies, vec![reply.to_string()]);
            assert_eq!(session.state(), SessionState::AwaitingMessageLink);
        }
    }

    #[tokio::test]
    async fn test_identified_message_shows_preview_and_menu() {
        let mut session = ReportSession::new(7);
        session.handle("report", &found()).await;
        let replies = session.handle("/123/456/789", &found()).await;

        assert_eq!(replies.len(), 3);
        assert!(replies[1].contains("suspect"));
        assert!(replies[1].contains("something awful"));
        assert!(replies[2].contains("hate speech/harassment"));
        assert_eq!(session.reported_message().unwrap().author.id, 42);
    }

    #[tokio::test]
    async fn test_unknown_category_reprompts_without_transition() {
        let mut session = session_at_category_menu().await;
        let replies = session.handle("rudeness", &found()).await;
        assert!(replies[0].contains("didn't recognize"));
        assert_eq!(session.state(), SessionState::MessageIdentified);
        assert_eq!(session.category(), None);
    }

    #[tokio::test]
    async fn test_category_then_age_reprompt_does_not_reask_category() {
        let mut session = session_at_category_menu().await;
        session.handle("spam", &found()).await;
        assert_eq!(session.category(), Some(ReportCategory::Spam));
        assert_eq!(session.state(), SessionState::AwaitingAgeDisclosure);

        // Garbage at the age stage re-asks age only; category stays captured
        let replies = session.handle("maybe", &found()).await;
        assert!(replies[0].contains("under the age of 18"));
        assert!(!replies[0].contains("abuse types"));
        assert_eq!(session.category(), Some(ReportCategory::Spam));
    }

    #[tokio::test]
    async fn test_underage_enters_child_solicitation_flow() {
        let mut session = session_at_category_menu().await;
        session.handle("intimate", &found()).await;
        let replies = session.handle("under", &found()).await;

        assert_eq!(session.state(), SessionState::ChildSolicitationFlow);
        assert_eq!(session.is_minor(), Some(true));
        assert!(session.block_requested());
        assert!(replies[0].contains("missingkids.org"));

        // The escalation marker fires exactly once
        assert!(session.take_escalation());
        assert!(!session.take_escalation());
    }

    #[tokio::test]
    async fn test_child_solicitation_flow_replays_resources() {
        let mut session = session_at_category_menu().await;
        session.handle("intimate", &found()).await;
        session.handle("under", &found()).await;

        let first = session.handle("what do I do now", &found()).await;
        let second = session.handle("hello?", &found()).await;
        assert_eq!(first, second);
        assert!(first[0].contains("missingkids.org"));
        assert_eq!(session.state(), SessionState::ChildSolicitationFlow);
    }

    #[tokio::test]
    async fn test_overage_block_completes() {
        let mut session = session_at_category_menu().await;
        session.handle("violence", &found()).await;
        session.handle("over", &found()).await;
        assert_eq!(session.state(), SessionState::AwaitingBlockChoice);

        let replies = session.handle("block", &found()).await;
        assert_eq!(session.state(), SessionState::Complete);
        assert!(session.block_requested());
        assert!(replies[0].contains("Blocked"));
        assert!(replies[0].contains("Successfully submitted"));
    }

    #[tokio::test]
    async fn test_overage_no_block_submits() {
        let mut session = session_at_category_menu().await;
        session.handle("violence", &found()).await;
        session.handle("over", &found()).await;

        let replies = session.handle("no block", &found()).await;
        assert_eq!(session.state(), SessionState::Submitted);
        assert!(!session.block_requested());
        assert!(replies[0].contains("Successfully submitted"));
        assert!(session.is_submitted());
    }

    #[tokio::test]
    async fn test_block_reprompt_keeps_age_and_category() {
        let mut session = session_at_category_menu().await;
        session.handle("violence", &found()).await;
        session.handle("over", &found()).await;

        let replies = session.handle("hmm", &found()).await;
        assert!(replies[0].contains("block"));
        assert_eq!(session.state(), SessionState::AwaitingBlockChoice);
        assert_eq!(session.is_minor(), Some(false));
        assert_eq!(session.category(), Some(ReportCategory::Violence));
    }

    #[tokio::test]
    async fn test_cancel_from_every_non_terminal_state() {
        // Start
        let mut session = ReportSession::new(7);
        assert_eq!(session.handle("cancel", &found()).await, vec![CANCELLED_REPLY.to_string()]);
        assert!(session.is_complete());

        // AwaitingMessageLink
        let mut session = ReportSession::new(7);
        session.handle("report", &found()).await;
        assert_eq!(session.handle("cancel", &found()).await, vec![CANCELLED_REPLY.to_string()]);
        assert!(session.is_complete());

        // MessageIdentified
        let mut session = session_at_category_menu().await;
        assert_eq!(session.handle("cancel", &found()).await, vec![CANCELLED_REPLY.to_string()]);
        assert!(session.is_complete());

        // AwaitingAgeDisclosure
        let mut session = session_at_category_menu().await;
        session.handle("spam", &found()).await;
        assert_eq!(session.handle("cancel", &found()).await, vec![CANCELLED_REPLY.to_string()]);
        assert!(session.is_complete());

        // AwaitingBlockChoice
        let mut session = session_at_category_menu().await;
        session.handle("spam", &found()).await;
        session.handle("over", &found()).await;
        assert_eq!(session.handle("cancel", &found()).await, vec![CANCELLED_REPLY.to_string()]);
        assert!(session.is_complete());

        // ChildSolicitationFlow
        let mut session = session_at_category_menu().await;
        session.handle("spam", &found()).await;
        session.handle("under", &found()).await;
        assert_eq!(session.handle("cancel", &found()).await, vec![CANCELLED_REPLY.to_string()]);
        assert!(session.is_complete());
    }

    #[tokio::test]
    async fn test_terminal_states_return_no_replies() {
        let mut session = session_at_category_menu().await;
        session.handle("spam", &found()).await;
        session.handle("over", &found()).await;
        session.handle("no block", &found()).await;
        assert!(session.is_submitted());

        assert!(session.handle("anything", &found()).await.is_empty());
        assert!(session.handle("cancel", &found()).await.is_empty());
        // Still submitted; cancel does not resurrect a terminal session
        assert!(session.is_submitted());
    }
}
