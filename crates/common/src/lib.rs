//! Common utilities and shared types for aegis-rs.
//!
//! This crate provides foundational components used across all aegis-rs crates:
//!
//! - **Configuration**: Application settings via [`Config`]
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`]
//! - **ID Generation**: ULID-based unique identifiers via [`IdGenerator`]
//!
//! # Example
//!
//! ```no_run
//! use aegis_common::{Config, IdGenerator, AppResult};
//!
//! fn example() -> AppResult<()> {
//!     let config = Config::load()?;
//!     let id_gen = IdGenerator::new();
//!     let report_id = id_gen.generate();
//!     println!("New report id: {}", report_id);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod id;

pub use config::{ClassifierConfig, Config, GuildConfig, PlatformConfig, ServerConfig, TriageConfig};
pub use error::{AppError, AppResult};
pub use id::IdGenerator;
