//! Error types for API misuse.
//!
//! Business failures never show up here: they are reported through the
//! invocation's [`Outcome`] and [`Errors`](crate::Errors). These variants mark
//! contract violations by the code driving a service.

use crate::outcome::Outcome;

/// Misuse of the service API.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    /// The outcome was queried before the invocation finished running.
    #[error("service `{service}` was not called yet")]
    NotYetRun {
        /// Type name of the service.
        service: &'static str,
    },

    /// A failure primitive was used outside of a running `call` chain.
    #[error("service `{service}` cannot fail outside its call chain (outcome: {outcome})")]
    FailOutsideCall {
        /// Type name of the service.
        service: &'static str,
        /// Outcome at the time of the call.
        outcome: Outcome,
    },
}
