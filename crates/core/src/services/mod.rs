//! Moderation-workflow services.

pub mod registry;
pub mod session;
pub mod summary;
pub mod triage;

pub use registry::{FlagEntry, FlagRegistry, FlagSource, Resolution};
pub use session::{ReportSession, SessionState};
pub use summary::ModeratorSummary;
pub use triage::{GuildChannels, TriageCoordinator};
