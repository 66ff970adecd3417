//! Ambient infrastructure for Cater services.
//!
//! Services emit [`tracing`] spans and events on their own; this crate only
//! installs a subscriber that renders them.
//!
//! # Example
//!
//! ```no_run
//! use cater_core::{TracingConfig, TracingFormat};
//! use tracing::Level;
//!
//! TracingConfig::new()
//!     .with_level(Level::DEBUG)
//!     .with_format(TracingFormat::Compact)
//!     .init();
//! ```

/// Subscriber configuration and installation.
pub mod subscriber;

pub use crate::subscriber::{TracingConfig, TracingError, TracingFormat};
