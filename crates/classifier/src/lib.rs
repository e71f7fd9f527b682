//! Text-classification collaborator for aegis-rs.
//!
//! This crate adapts the external text-classification service into a typed
//! interface:
//!
//! - **Scores**: Attribute score maps via [`AttributeScores`]
//! - **Evaluator**: The [`ScoreEvaluator`] trait consumed by triage
//! - **Client**: [`PerspectiveClient`], the HTTP implementation
//!
//! Scores are opaque inputs to the rest of the system; this crate never
//! decides whether a message is flagged.

pub mod client;
pub mod scores;

pub use client::{ClassifierError, PerspectiveClient, ScoreEvaluator};
pub use scores::{AttributeScores, attributes};
