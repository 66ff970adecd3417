//! Service execution engine.
//!
//! [`execute`] drives one invocation through its lifecycle:
//!
//! 1. the `call` chain runs around [`Service::call`]
//! 2. the outcome is set, exactly once
//! 3. the `success` or the `error` chain runs, depending on the outcome
//!
//! A [`Failure`](crate::Failure) stops the `call` chain and is absorbed here;
//! the caller inspects the returned invocation instead.
//!
//! # Example
//!
//! ```
//! use cater_service::prelude::*;
//!
//! struct Charge {
//!     limit: u32,
//! }
//!
//! impl Service for Charge {
//!     type Args = u32;
//!
//!     fn call(invocation: &mut Invocation<Self>, amount: u32) -> ServiceResult {
//!         if amount > invocation.limit {
//!             return Err(invocation.fail("amount exceeds limit"));
//!         }
//!         Ok(())
//!     }
//! }
//!
//! let charged = execute(Charge { limit: 100 }, 250);
//! assert!(charged.failed());
//! assert_eq!(charged.errors()["base"], ["amount exceeds limit"]);
//! ```

use core::any::type_name;

use crate::hooks::{Chain, definition};
use crate::invocation::Invocation;
use crate::outcome::Outcome;
use crate::service::Service;

/// Runs `service` with `args` and returns the finished invocation.
///
/// The returned invocation always has its outcome set.
pub fn execute<S: Service>(service: S, args: S::Args) -> Invocation<S> {
    let callbacks = definition::<S>();
    let mut invocation = Invocation::new(service);

    let span = tracing::debug_span!(
        "service",
        service = type_name::<S>(),
        invocation = %invocation.id(),
    );
    let _entered = span.enter();

    invocation.begin();
    let mut args = Some(args);
    let called = callbacks.run_chain(Chain::Call, &mut invocation, &mut |invocation| {
        match args.take() {
            Some(args) => S::call(invocation, args),
            None => Ok(()),
        }
    });

    let outcome = if called.is_err() || invocation.signalled() {
        Outcome::Failed
    } else {
        Outcome::Succeeded
    };
    invocation.finish(outcome);

    let chain = match outcome {
        Outcome::Failed => {
            tracing::debug!(errors = invocation.errors().len(), "service failed");
            Chain::Error
        }
        Outcome::Succeeded | Outcome::Unset => {
            tracing::debug!("service succeeded");
            Chain::Success
        }
    };
    let completed = callbacks.run_chain(chain, &mut invocation, &mut |_| Ok(()));
    debug_assert!(
        completed.is_ok(),
        "failure primitives are rejected outside the call chain"
    );

    invocation
}
