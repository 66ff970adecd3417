//! The [`Service`] trait.

use crate::executor::execute;
use crate::hooks::{Callbacks, HookRegistrationError};
use crate::invocation::{Invocation, ServiceResult};

/// A unit of work performing one logical operation.
///
/// Implementors provide the operation ([`call`](Self::call)) and, optionally,
/// the hooks that wrap it ([`define_callbacks`](Self::define_callbacks)).
/// Running the service yields an [`Invocation`] carrying the outcome, the
/// collected errors and the service value itself.
///
/// # Example
///
/// ```
/// use cater_service::prelude::*;
///
/// #[derive(Default)]
/// struct Divide {
///     quotient: Option<i64>,
/// }
///
/// impl Service for Divide {
///     type Args = (i64, i64);
///
///     fn call(invocation: &mut Invocation<Self>, (a, b): (i64, i64)) -> ServiceResult {
///         if b == 0 {
///             return Err(invocation.fail_with([("divisor", "must not be zero")]));
///         }
///         invocation.quotient = Some(a / b);
///         Ok(())
///     }
/// }
///
/// Divide::run((10, 2))
///     .on_success(|done| assert_eq!(done.quotient, Some(5)))
///     .on_error(|_| unreachable!());
///
/// let failed = Divide::run((1, 0));
/// assert_eq!(failed.errors()["divisor"], ["must not be zero"]);
/// ```
pub trait Service: Sized + 'static {
    /// Arguments passed to the operation.
    type Args;

    /// Performs the operation.
    ///
    /// Return `Ok(())` to succeed. To fail, record the reason with one of the
    /// failure primitives on [`Invocation`] and return the token it gives
    /// back as `Err`.
    fn call(invocation: &mut Invocation<Self>, args: Self::Args) -> ServiceResult;

    /// Registers the hooks of this service.
    ///
    /// Called once per service type, on the first run. The registered hooks
    /// are shared by every invocation afterwards.
    ///
    /// # Errors
    ///
    /// Propagate registration errors; they abort the first run with a panic.
    fn define_callbacks(callbacks: &mut Callbacks<Self>) -> Result<(), HookRegistrationError> {
        let _ = callbacks;
        Ok(())
    }

    /// Runs a default-constructed service with `args`.
    fn run(args: Self::Args) -> Invocation<Self>
    where
        Self: Default,
    {
        execute(Self::default(), args)
    }
}
