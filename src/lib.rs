//! Service objects with lifecycle callbacks and attribute-keyed error reporting.
//!
//! A service performs one logical operation. Around that operation it can
//! register `before`, `around` and `after` hooks, and it reports a binary
//! outcome together with an ordered collection of per-attribute messages.
//!
//! See [`cater_service`] for the execution model and [`cater_core`] for
//! logging setup.

pub use cater_core;
pub use cater_service;

pub use cater_service::{
    Attribute, Callbacks, Errors, Failure, Invocation, Message, Outcome, Service, ServiceError,
    ServiceResult, execute,
};

/// Re-export all common types for easy access.
pub mod prelude {
    pub use cater_core::{TracingConfig, TracingFormat};
    pub use cater_service::prelude::*;
}
