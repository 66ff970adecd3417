//! Hook registration and chain execution.
//!
//! [`Callbacks`] holds the hooks of one service definition, grouped by
//! [`Chain`]. Hooks are registered once, while the definition is built, and
//! are only read afterwards.
//!
//! # Example
//!
//! ```
//! use cater_service::hooks::{Callbacks, Chain};
//! use cater_service::Invocation;
//!
//! struct Audit {
//!     admin: bool,
//! }
//!
//! let mut callbacks = Callbacks::<Audit>::new();
//! callbacks
//!     .before_call("authorize", |invocation: &mut Invocation<Audit>| {
//!         Err(invocation.fail("not allowed"))
//!     })?
//!     .unless(|invocation| invocation.admin);
//! callbacks.around_call("timing", |invocation, next| {
//!     let started = std::time::Instant::now();
//!     let result = next.run(invocation);
//!     tracing::debug!(elapsed = ?started.elapsed(), "call finished");
//!     result
//! })?;
//!
//! assert_eq!(callbacks.hook_count(Chain::Call), 2);
//! # Ok::<(), cater_service::hooks::HookRegistrationError>(())
//! ```

use core::fmt;

use hashbrown::HashMap;

use super::chain::{Chain, HookKind};
use crate::invocation::{Failure, Invocation, ServiceResult};

type StepFn<S> = dyn Fn(&mut Invocation<S>) -> ServiceResult + Send + Sync;
type AroundFn<S> = dyn Fn(&mut Invocation<S>, Next<'_, '_, S>) -> ServiceResult + Send + Sync;
type GuardFn<S> = dyn Fn(&Invocation<S>) -> bool + Send + Sync;

// ─────────────────────────────────────────────────────────────────────────────
// BoxedHook
// ─────────────────────────────────────────────────────────────────────────────

enum Handler<S> {
    Before(Box<StepFn<S>>),
    Around(Box<AroundFn<S>>),
    After(Box<StepFn<S>>),
}

struct Guard<S> {
    /// Value the check must return for the hook to run.
    expected: bool,
    check: Box<GuardFn<S>>,
}

/// Type-erased hook with its guard conditions.
///
/// Most users should use the named registration methods on [`Callbacks`]
/// instead of creating `BoxedHook` directly.
pub struct BoxedHook<S> {
    handler: Handler<S>,
    guards: Vec<Guard<S>>,
}

impl<S: 'static> BoxedHook<S> {
    /// Creates a hook that runs before the core action.
    #[must_use]
    pub fn before(
        hook: impl Fn(&mut Invocation<S>) -> ServiceResult + Send + Sync + 'static,
    ) -> Self {
        Self::from_handler(Handler::Before(Box::new(hook)))
    }

    /// Creates a hook that wraps the core action.
    ///
    /// The hook receives a [`Next`] continuation; not running it skips the
    /// inner hooks and the core action.
    #[must_use]
    pub fn around(
        hook: impl Fn(&mut Invocation<S>, Next<'_, '_, S>) -> ServiceResult + Send + Sync + 'static,
    ) -> Self {
        Self::from_handler(Handler::Around(Box::new(hook)))
    }

    /// Creates a hook that runs after the core action.
    #[must_use]
    pub fn after(
        hook: impl Fn(&mut Invocation<S>) -> ServiceResult + Send + Sync + 'static,
    ) -> Self {
        Self::from_handler(Handler::After(Box::new(hook)))
    }

    /// Adds a guard; the hook only runs when `guard` returns `true`.
    #[must_use]
    pub fn only_if(mut self, guard: impl Fn(&Invocation<S>) -> bool + Send + Sync + 'static) -> Self {
        self.push_guard(true, guard);
        self
    }

    /// Adds a guard; the hook only runs when `guard` returns `false`.
    #[must_use]
    pub fn unless(mut self, guard: impl Fn(&Invocation<S>) -> bool + Send + Sync + 'static) -> Self {
        self.push_guard(false, guard);
        self
    }

    fn push_guard(
        &mut self,
        expected: bool,
        guard: impl Fn(&Invocation<S>) -> bool + Send + Sync + 'static,
    ) {
        self.guards.push(Guard {
            expected,
            check: Box::new(guard),
        });
    }
}

impl<S> BoxedHook<S> {
    fn from_handler(handler: Handler<S>) -> Self {
        Self {
            handler,
            guards: Vec::new(),
        }
    }

    /// Returns where the hook sits relative to the core action.
    #[must_use]
    pub fn kind(&self) -> HookKind {
        match self.handler {
            Handler::Before(_) => HookKind::Before,
            Handler::Around(_) => HookKind::Around,
            Handler::After(_) => HookKind::After,
        }
    }

    /// Returns `true` if the hook has guard conditions.
    #[must_use]
    pub fn is_guarded(&self) -> bool {
        !self.guards.is_empty()
    }

    fn admits(&self, invocation: &Invocation<S>) -> bool {
        self.guards
            .iter()
            .all(|guard| (guard.check)(invocation) == guard.expected)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// HookRegistrationError
// ─────────────────────────────────────────────────────────────────────────────

/// Errors that can occur during hook registration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HookRegistrationError {
    /// A hook with this name already exists on the chain.
    #[error("hook '{name}' already registered for chain '{chain}'")]
    DuplicateName {
        /// The chain where the duplicate was found.
        chain: Chain,
        /// The duplicate hook name.
        name: String,
    },
}

// ─────────────────────────────────────────────────────────────────────────────
// HookEntry
// ─────────────────────────────────────────────────────────────────────────────

/// Entry in a chain, containing the hook name and the hook itself.
struct HookEntry<S> {
    /// Human-readable name for debugging and logging.
    name: String,
    hook: BoxedHook<S>,
}

impl<S> HookEntry<S> {
    /// Evaluates the guards, logging when the hook is skipped.
    fn admits(&self, chain: Chain, invocation: &Invocation<S>) -> bool {
        let admitted = self.hook.admits(invocation);
        if !admitted {
            tracing::trace!(%chain, kind = %self.hook.kind(), hook = %self.name, "guard skipped hook");
        }
        admitted
    }

    fn trace_run(&self, chain: Chain) {
        tracing::trace!(%chain, kind = %self.hook.kind(), hook = %self.name, "running hook");
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// HookConfig
// ─────────────────────────────────────────────────────────────────────────────

/// Handle to a freshly registered hook, used to attach guards.
pub struct HookConfig<'a, S> {
    hook: &'a mut BoxedHook<S>,
}

impl<S: 'static> HookConfig<'_, S> {
    /// Only run the hook when `guard` returns `true`.
    pub fn only_if(self, guard: impl Fn(&Invocation<S>) -> bool + Send + Sync + 'static) -> Self {
        self.hook.push_guard(true, guard);
        self
    }

    /// Only run the hook when `guard` returns `false`.
    pub fn unless(self, guard: impl Fn(&Invocation<S>) -> bool + Send + Sync + 'static) -> Self {
        self.hook.push_guard(false, guard);
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Next
// ─────────────────────────────────────────────────────────────────────────────

struct AroundStep<'n, S> {
    entry: &'n HookEntry<S>,
    handler: &'n AroundFn<S>,
}

/// Continuation handed to `around` hooks.
///
/// Calling [`run`](Self::run) executes the remaining `around` hooks and then
/// the core action, and returns their result. The continuation can run at
/// most once; dropping it without running skips everything inside.
pub struct Next<'n, 'c, S> {
    chain: Chain,
    /// Whether a failure had already been signalled when the chain started.
    signalled: bool,
    steps: &'n [AroundStep<'n, S>],
    core: &'n mut (dyn FnMut(&mut Invocation<S>) -> ServiceResult + 'c),
}

impl<S> Next<'_, '_, S> {
    /// Proceeds inward to the next `around` hook or the core action.
    pub fn run(self, invocation: &mut Invocation<S>) -> ServiceResult {
        let Some((step, rest)) = self.steps.split_first() else {
            let result = (self.core)(invocation);
            return settle(result, invocation, self.signalled);
        };

        if !step.entry.admits(self.chain, invocation) {
            return Next { steps: rest, ..self }.run(invocation);
        }

        step.entry.trace_run(self.chain);
        let chain = self.chain;
        let signalled = self.signalled;
        let result = (step.handler)(
            invocation,
            Next {
                chain,
                signalled,
                steps: rest,
                core: self.core,
            },
        );
        settle(result, invocation, signalled)
    }
}

/// Turns a hook result into the chain's verdict.
///
/// A failure primitive used during the step halts the chain even if the hook
/// swallowed the returned token.
fn settle<S>(result: ServiceResult, invocation: &Invocation<S>, signalled: bool) -> ServiceResult {
    result?;
    if !signalled && invocation.signalled() {
        return Err(Failure::signal());
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Callbacks
// ─────────────────────────────────────────────────────────────────────────────

/// Hooks of one service definition, grouped by chain.
///
/// # Ordering
///
/// - `before` and `after` hooks run in registration order
/// - `around` hooks nest in registration order: the first registered is the
///   outermost
///
/// # Thread Safety
///
/// `Callbacks` is `Send + Sync`. Registration needs `&mut self`, so a
/// definition is read-only once it is shared.
pub struct Callbacks<S> {
    /// Maps chain to its hook entries in registration order.
    chains: HashMap<Chain, Vec<HookEntry<S>>>,
}

impl<S> Default for Callbacks<S> {
    fn default() -> Self {
        Self {
            chains: HashMap::new(),
        }
    }
}

impl<S> fmt::Debug for Callbacks<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for chain in Chain::ALL {
            map.entry(&chain, &self.hook_names(chain));
        }
        map.finish()
    }
}

impl<S: 'static> Callbacks<S> {
    /// Creates an empty set of callbacks.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a hook that runs before the operation.
    ///
    /// # Errors
    ///
    /// Returns [`HookRegistrationError::DuplicateName`] if the `call` chain
    /// already has a hook called `name`.
    pub fn before_call<F>(
        &mut self,
        name: impl Into<String>,
        hook: F,
    ) -> Result<HookConfig<'_, S>, HookRegistrationError>
    where
        F: Fn(&mut Invocation<S>) -> ServiceResult + Send + Sync + 'static,
    {
        self.register(Chain::Call, name, BoxedHook::before(hook))
    }

    /// Registers a hook that wraps the operation.
    ///
    /// # Errors
    ///
    /// Same as [`before_call`](Self::before_call).
    pub fn around_call<F>(
        &mut self,
        name: impl Into<String>,
        hook: F,
    ) -> Result<HookConfig<'_, S>, HookRegistrationError>
    where
        F: Fn(&mut Invocation<S>, Next<'_, '_, S>) -> ServiceResult + Send + Sync + 'static,
    {
        self.register(Chain::Call, name, BoxedHook::around(hook))
    }

    /// Registers a hook that runs after the operation returned normally.
    ///
    /// # Errors
    ///
    /// Same as [`before_call`](Self::before_call).
    pub fn after_call<F>(
        &mut self,
        name: impl Into<String>,
        hook: F,
    ) -> Result<HookConfig<'_, S>, HookRegistrationError>
    where
        F: Fn(&mut Invocation<S>) -> ServiceResult + Send + Sync + 'static,
    {
        self.register(Chain::Call, name, BoxedHook::after(hook))
    }

    /// Registers a hook on the `success` chain.
    ///
    /// # Errors
    ///
    /// Returns [`HookRegistrationError::DuplicateName`] if the `success`
    /// chain already has a hook called `name`.
    pub fn after_success<F>(
        &mut self,
        name: impl Into<String>,
        hook: F,
    ) -> Result<HookConfig<'_, S>, HookRegistrationError>
    where
        F: Fn(&mut Invocation<S>) + Send + Sync + 'static,
    {
        let hook = BoxedHook::after(move |invocation| {
            hook(invocation);
            Ok(())
        });
        self.register(Chain::Success, name, hook)
    }

    /// Registers a hook on the `error` chain.
    ///
    /// # Errors
    ///
    /// Returns [`HookRegistrationError::DuplicateName`] if the `error` chain
    /// already has a hook called `name`.
    pub fn after_error<F>(
        &mut self,
        name: impl Into<String>,
        hook: F,
    ) -> Result<HookConfig<'_, S>, HookRegistrationError>
    where
        F: Fn(&mut Invocation<S>) + Send + Sync + 'static,
    {
        let hook = BoxedHook::after(move |invocation| {
            hook(invocation);
            Ok(())
        });
        self.register(Chain::Error, name, hook)
    }

    /// Registers a pre-built [`BoxedHook`] on the given chain.
    ///
    /// This is the lower-level registration method used by the named ones.
    ///
    /// # Errors
    ///
    /// Returns [`HookRegistrationError::DuplicateName`] if `chain` already
    /// has a hook called `name`.
    pub fn register(
        &mut self,
        chain: Chain,
        name: impl Into<String>,
        hook: BoxedHook<S>,
    ) -> Result<HookConfig<'_, S>, HookRegistrationError> {
        let name = name.into();
        let entries = self.chains.entry(chain).or_default();

        if entries.iter().any(|entry| entry.name == name) {
            return Err(HookRegistrationError::DuplicateName { chain, name });
        }

        let index = entries.len();
        entries.push(HookEntry { name, hook });
        Ok(HookConfig {
            hook: &mut entries[index].hook,
        })
    }
}

impl<S> Callbacks<S> {
    /// Returns the number of hooks registered on `chain`.
    #[must_use]
    pub fn hook_count(&self, chain: Chain) -> usize {
        self.chains.get(&chain).map_or(0, Vec::len)
    }

    /// Checks if a hook with the given name exists on `chain`.
    #[must_use]
    pub fn contains_hook(&self, chain: Chain, name: &str) -> bool {
        self.entries(chain).iter().any(|entry| entry.name == name)
    }

    /// Returns the hook names on `chain`, in registration order.
    #[must_use]
    pub fn hook_names(&self, chain: Chain) -> Vec<&str> {
        self.entries(chain)
            .iter()
            .map(|entry| entry.name.as_str())
            .collect()
    }

    fn entries(&self, chain: Chain) -> &[HookEntry<S>] {
        self.chains.get(&chain).map_or(&[], Vec::as_slice)
    }

    /// Runs `chain` around `core`.
    ///
    /// `before` hooks run first, then the `around` hooks nest around `core`,
    /// then `after` hooks run. The first failure stops the chain and is
    /// returned.
    pub(crate) fn run_chain(
        &self,
        chain: Chain,
        invocation: &mut Invocation<S>,
        core: &mut dyn FnMut(&mut Invocation<S>) -> ServiceResult,
    ) -> ServiceResult {
        let entries = self.entries(chain);
        let signalled = invocation.signalled();

        for entry in entries {
            if let Handler::Before(handler) = &entry.hook.handler
                && entry.admits(chain, invocation)
            {
                entry.trace_run(chain);
                settle(handler(invocation), invocation, signalled)?;
            }
        }

        let steps: Vec<AroundStep<'_, S>> = entries
            .iter()
            .filter_map(|entry| match &entry.hook.handler {
                Handler::Around(handler) => Some(AroundStep {
                    entry,
                    handler: handler.as_ref(),
                }),
                Handler::Before(_) | Handler::After(_) => None,
            })
            .collect();
        Next {
            chain,
            signalled,
            steps: &steps,
            core,
        }
        .run(invocation)?;

        for entry in entries {
            if let Handler::After(handler) = &entry.hook.handler
                && entry.admits(chain, invocation)
            {
                entry.trace_run(chain);
                settle(handler(invocation), invocation, signalled)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    type Log = Arc<Mutex<Vec<String>>>;

    fn calling() -> Invocation<()> {
        let mut invocation = Invocation::new(());
        invocation.begin();
        invocation
    }

    fn record(log: &Log, entry: &str) -> impl Fn(&mut Invocation<()>) -> ServiceResult + use<> {
        let log = Arc::clone(log);
        let entry = entry.to_owned();
        move |_| {
            log.lock().unwrap().push(entry.clone());
            Ok(())
        }
    }

    fn run(callbacks: &Callbacks<()>, invocation: &mut Invocation<()>, log: &Log) -> ServiceResult {
        let log = Arc::clone(log);
        callbacks.run_chain(Chain::Call, invocation, &mut |_| {
            log.lock().unwrap().push("core".to_owned());
            Ok(())
        })
    }

    fn entries(log: &Log) -> Vec<String> {
        log.lock().unwrap().clone()
    }

    #[test]
    fn before_and_after_run_in_registration_order() {
        let log = Log::default();
        let mut callbacks = Callbacks::<()>::new();
        callbacks.after_call("after_1", record(&log, "after_1")).unwrap();
        callbacks.before_call("before_1", record(&log, "before_1")).unwrap();
        callbacks.after_call("after_2", record(&log, "after_2")).unwrap();
        callbacks.before_call("before_2", record(&log, "before_2")).unwrap();

        let mut invocation = calling();
        run(&callbacks, &mut invocation, &log).unwrap();

        assert_eq!(
            entries(&log),
            ["before_1", "before_2", "core", "after_1", "after_2"]
        );
    }

    #[test]
    fn first_around_is_outermost() {
        let log = Log::default();
        let mut callbacks = Callbacks::<()>::new();
        for name in ["outer", "inner"] {
            let log = Arc::clone(&log);
            callbacks
                .around_call(name, move |invocation, next| {
                    log.lock().unwrap().push(format!("{name}:enter"));
                    let result = next.run(invocation);
                    log.lock().unwrap().push(format!("{name}:exit"));
                    result
                })
                .unwrap();
        }

        let mut invocation = calling();
        run(&callbacks, &mut invocation, &log).unwrap();

        assert_eq!(
            entries(&log),
            ["outer:enter", "inner:enter", "core", "inner:exit", "outer:exit"]
        );
    }

    #[test]
    fn around_without_continuation_skips_core() {
        let log = Log::default();
        let mut callbacks = Callbacks::<()>::new();
        callbacks
            .around_call("gate", |_invocation, _next| Ok(()))
            .unwrap();
        callbacks.after_call("after", record(&log, "after")).unwrap();

        let mut invocation = calling();
        run(&callbacks, &mut invocation, &log).unwrap();

        assert_eq!(entries(&log), ["after"]);
    }

    #[test]
    fn failure_in_before_hook_skips_the_rest() {
        let log = Log::default();
        let mut callbacks = Callbacks::<()>::new();
        callbacks
            .before_call("reject", |invocation: &mut Invocation<()>| {
                Err(invocation.fail("rejected"))
            })
            .unwrap();
        callbacks.before_call("later", record(&log, "later")).unwrap();
        callbacks.after_call("after", record(&log, "after")).unwrap();

        let mut invocation = calling();
        let result = run(&callbacks, &mut invocation, &log);

        assert!(result.is_err());
        assert!(entries(&log).is_empty());
        assert_eq!(invocation.errors()["base"], ["rejected"]);
    }

    #[test]
    fn failure_in_core_unwinds_arounds_without_after() {
        let log = Log::default();
        let mut callbacks = Callbacks::<()>::new();
        {
            let log = Arc::clone(&log);
            callbacks
                .around_call("wrap", move |invocation, next| {
                    log.lock().unwrap().push("wrap:enter".to_owned());
                    next.run(invocation)?;
                    log.lock().unwrap().push("wrap:exit".to_owned());
                    Ok(())
                })
                .unwrap();
        }
        callbacks.after_call("after", record(&log, "after")).unwrap();

        let mut invocation = calling();
        let result = callbacks.run_chain(Chain::Call, &mut invocation, &mut |invocation| {
            Err(invocation.fail("boom"))
        });

        assert!(result.is_err());
        assert_eq!(entries(&log), ["wrap:enter"]);
    }

    #[test]
    fn swallowed_failure_still_halts_chain() {
        let log = Log::default();
        let mut callbacks = Callbacks::<()>::new();
        callbacks
            .around_call("swallow", |invocation, next| {
                let _ = next.run(invocation);
                Ok(())
            })
            .unwrap();
        callbacks.after_call("after", record(&log, "after")).unwrap();

        let mut invocation = calling();
        let result = callbacks.run_chain(Chain::Call, &mut invocation, &mut |invocation| {
            let _ = invocation.fail("boom");
            Ok(())
        });

        assert!(result.is_err());
        assert!(entries(&log).is_empty());
    }

    #[test]
    fn guards_skip_hooks_without_failing() {
        let log = Log::default();
        let mut callbacks = Callbacks::<()>::new();
        callbacks
            .before_call("skipped", record(&log, "skipped"))
            .unwrap()
            .only_if(|_| false);
        callbacks
            .before_call("kept", record(&log, "kept"))
            .unwrap()
            .unless(|_| false);
        callbacks
            .around_call("skipped_around", |_invocation, _next| Ok(()))
            .unwrap()
            .unless(|_| true);

        let mut invocation = calling();
        run(&callbacks, &mut invocation, &log).unwrap();

        assert_eq!(entries(&log), ["kept", "core"]);
        assert!(invocation.errors().is_empty());
    }

    #[test]
    fn all_guards_must_pass() {
        let log = Log::default();
        let mut callbacks = Callbacks::<()>::new();
        callbacks
            .register(
                Chain::Call,
                "guarded",
                BoxedHook::before(record(&log, "guarded"))
                    .only_if(|_| true)
                    .only_if(|_| false),
            )
            .unwrap();

        let mut invocation = calling();
        run(&callbacks, &mut invocation, &log).unwrap();

        assert_eq!(entries(&log), ["core"]);
    }

    #[test]
    fn register_rejects_duplicate_names() {
        let log = Log::default();
        let mut callbacks = Callbacks::<()>::new();
        callbacks.before_call("my_hook", record(&log, "a")).unwrap();

        let result = callbacks.after_call("my_hook", record(&log, "b"));

        match result {
            Err(HookRegistrationError::DuplicateName { chain, name }) => {
                assert_eq!(chain, Chain::Call);
                assert_eq!(name, "my_hook");
            }
            Ok(_) => panic!("expected DuplicateName error"),
        }
    }

    #[test]
    fn same_name_different_chains_allowed() {
        let mut callbacks = Callbacks::<()>::new();
        callbacks.after_success("logger", |_| {}).unwrap();
        callbacks.after_error("logger", |_| {}).unwrap();

        assert_eq!(callbacks.hook_count(Chain::Success), 1);
        assert_eq!(callbacks.hook_count(Chain::Error), 1);
        assert_eq!(callbacks.hook_count(Chain::Call), 0);
    }

    #[test]
    fn introspection_reports_names() {
        let log = Log::default();
        let mut callbacks = Callbacks::<()>::new();
        callbacks.before_call("first", record(&log, "first")).unwrap();
        callbacks.after_call("second", record(&log, "second")).unwrap();

        assert!(callbacks.contains_hook(Chain::Call, "first"));
        assert!(!callbacks.contains_hook(Chain::Success, "first"));
        assert_eq!(callbacks.hook_names(Chain::Call), ["first", "second"]);
    }

    #[test]
    fn boxed_hook_reports_kind() {
        let hook = BoxedHook::<()>::around(|invocation, next| next.run(invocation));
        assert_eq!(hook.kind(), HookKind::Around);
        assert!(!hook.is_guarded());
        assert!(hook.only_if(|_| true).is_guarded());
    }
}
