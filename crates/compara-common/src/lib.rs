//! Compara Common Library
//!
//! Shared error handling and logging setup for the compara tools.
//!
//! # Overview
//!
//! - **Error Handling**: [`ComparaError`] for the shared input tables
//!   (species lists, gene queries, homology and alignment files)
//! - **Logging**: one-time `tracing` subscriber setup driven by [`logging::LogConfig`]
//!
//! # Example
//!
//! ```no_run
//! use compara_common::logging::{init_logging, LogConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     let _guard = init_logging(&LogConfig::from_env()?)?;
//!     tracing::info!("ready");
//!     Ok(())
//! }
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod error;
pub mod logging;

// Re-export commonly used types
pub use error::{ComparaError, Result};
