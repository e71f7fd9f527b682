//! Chat-platform boundary for aegis-rs.
//!
//! This crate is the thin I/O layer between the engine and the platform:
//!
//! - **Ingest**: an Axum router accepting inbound events pushed by the
//!   platform adapter (`POST /events`)
//! - **Outbound**: [`HttpPlatform`], a reqwest client implementing
//!   [`aegis_core::Platform`] against the platform's REST API
//!
//! No moderation logic lives here; events are deserialized and handed to
//! the triage coordinator as-is.

pub mod endpoints;
pub mod platform;
pub mod state;

pub use endpoints::router;
pub use platform::HttpPlatform;
pub use state::AppState;
