//! Common utilities and shared types for sangam.
//!
//! This crate provides foundational components used across all sangam crates:
//!
//! - **Configuration**: Application settings via [`Config`]
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`]
//! - **ID Generation**: ULID-based identifiers and member codes via [`IdGenerator`]
//! - **Time**: UTC to local zone rendering via [`LocalTimeFormatter`]
//!
//! # Example
//!
//! ```no_run
//! use sangam_common::{Config, IdGenerator, AppResult};
//!
//! fn example() -> AppResult<()> {
//!     let config = Config::load()?;
//!     let id_gen = IdGenerator::new();
//!     let id = id_gen.generate();
//!     println!("Generated ID: {} on port {}", id, config.server.port);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod id;
pub mod time;

pub use config::{Config, LogFormat};
pub use error::{AppError, AppResult};
pub use id::IdGenerator;
pub use time::LocalTimeFormatter;
