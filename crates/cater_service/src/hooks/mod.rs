//! Lifecycle hooks for service execution.
//!
//! Hooks extend a service with behavior that runs around its operation:
//! authorization, normalization, timing, logging, notifications.
//!
//! # Design Principles
//!
//! - Hooks execute in registration order
//! - `around` hooks nest: the first registered wraps all later ones
//! - A failure stops every remaining hook of the chain
//! - Guards skip a hook without failing the invocation
//!
//! # Architecture
//!
//! The hook system consists of three parts:
//!
//! - **Chains** ([`chain`]): the `call`, `success` and `error` phases
//! - **API** ([`api`]): registration and chain execution
//! - **Definitions** ([`definitions`]): per-service cache of registered hooks
//!
//! # Example
//!
//! ```
//! use cater_service::prelude::*;
//!
//! #[derive(Default)]
//! struct Publish {
//!     title: String,
//! }
//!
//! impl Service for Publish {
//!     type Args = String;
//!
//!     fn define_callbacks(callbacks: &mut Callbacks<Self>) -> Result<(), HookRegistrationError> {
//!         callbacks.after_call("trim", |invocation: &mut Invocation<Self>| {
//!             invocation.title = invocation.title.trim().to_owned();
//!             Ok(())
//!         })?;
//!         callbacks.after_error("report", |invocation: &mut Invocation<Self>| {
//!             tracing::warn!(errors = invocation.errors().len(), "publish failed");
//!         })?;
//!         Ok(())
//!     }
//!
//!     fn call(invocation: &mut Invocation<Self>, title: String) -> ServiceResult {
//!         invocation.title = title;
//!         if invocation.title.is_empty() {
//!             return Err(invocation.fail_with([("title", "can't be blank")]));
//!         }
//!         Ok(())
//!     }
//! }
//!
//! assert_eq!(Publish::run(" Hello ".to_owned()).title, "Hello");
//! assert!(Publish::run(String::new()).failed());
//! ```

pub mod api;
pub mod chain;
pub mod definitions;

pub use api::{BoxedHook, Callbacks, HookConfig, HookRegistrationError, Next};
pub use chain::{Chain, HookKind};
pub use definitions::definition;
