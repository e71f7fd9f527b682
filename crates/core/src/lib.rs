//! Core moderation-workflow logic for aegis-rs.
//!
//! The pieces fit together as a pipeline over inbound chat events:
//!
//! - [`events::InboundEvent`]: what the platform delivers
//! - [`services::TriageCoordinator`]: routes events to the report dialogue,
//!   the automated scoring path, or the moderator disposition path
//! - [`services::ReportSession`]: per-user reporting state machine
//! - [`services::FlagRegistry`]: correlates moderation-channel forwards with
//!   flagged content
//! - [`vocab`]: the closed keyword, category, and disposition vocabularies

pub mod events;
pub mod platform;
pub mod services;
pub mod vocab;

pub use events::InboundEvent;
pub use platform::{LookupError, MessageLookup, MessageRef, MessageSnapshot, Platform, UserRef};
pub use services::*;
