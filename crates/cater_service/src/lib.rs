//! Service execution primitives for Cater.
//!
//! `cater_service` runs "service" units of work: types that perform one
//! logical operation, wrap it in lifecycle hooks, and report a binary outcome
//! together with attribute-keyed error messages.
//!
//! # Core Concepts
//!
//! - [`Service`] - The operation and its hook definitions
//! - [`Invocation`] - One run of a service: outcome, errors, message
//! - [`Errors`] - Ordered, attribute-keyed collection of failure messages
//! - [`Callbacks`] - The `call`, `success` and `error` hook chains
//! - [`execute`] - Runtime engine for a single invocation
//!
//! # Lifecycle
//!
//! ```text
//! execute(service, args)
//!   └─ call chain: before* → around* → Service::call → around* → after*
//!        ├─ Ok           → outcome = Succeeded → success chain
//!        └─ Err(Failure) → outcome = Failed    → error chain
//! ```
//!
//! # Example
//!
//! ```
//! use cater_service::prelude::*;
//!
//! #[derive(Default)]
//! struct CreateUser {
//!     id: Option<u64>,
//! }
//!
//! impl Service for CreateUser {
//!     type Args = (&'static str, &'static str);
//!
//!     fn call(invocation: &mut Invocation<Self>, (name, email): Self::Args) -> ServiceResult {
//!         let mut errors = Errors::new();
//!         if name.is_empty() {
//!             errors.add("name", "is required");
//!         }
//!         if !email.contains('@') {
//!             errors.add("email", "is invalid");
//!         }
//!         if !errors.is_empty() {
//!             return Err(invocation.fail_from(&errors));
//!         }
//!         invocation.id = Some(1);
//!         Ok(())
//!     }
//! }
//!
//! let created = CreateUser::run(("", "nope"));
//! assert!(created.failed());
//! assert_eq!(created.errors()["name"], ["is required"]);
//! assert_eq!(created.errors()["email"], ["is invalid"]);
//! ```

/// Misuse errors.
pub mod error;

/// Attribute-keyed error collection.
pub mod errors;

/// Service execution engine.
pub mod executor;

/// Lifecycle hooks for service execution.
pub mod hooks;

/// One execution of a service.
pub mod invocation;

/// Tri-state invocation outcome.
pub mod outcome;

/// The service trait.
pub mod service;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use crate::error::ServiceError;
    pub use crate::errors::{Attribute, Errors, Messages};
    pub use crate::executor::execute;
    pub use crate::hooks::{BoxedHook, Callbacks, Chain, HookKind, HookRegistrationError, Next};
    pub use crate::invocation::{Failure, Invocation, InvocationId, Message, ServiceResult};
    pub use crate::outcome::Outcome;
    pub use crate::service::Service;
}

// Re-export key types at crate root for convenience
pub use error::ServiceError;
pub use errors::{Attribute, Errors, Messages};
pub use executor::execute;
pub use hooks::{Callbacks, Chain, HookRegistrationError};
pub use invocation::{Failure, Invocation, InvocationId, Message, ServiceResult};
pub use outcome::Outcome;
pub use service::Service;
