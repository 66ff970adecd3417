//! One execution of a service.
//!
//! An [`Invocation`] wraps the service value together with the state of a
//! single run: its [`Outcome`], its [`Errors`] and an optional free-form
//! [`Message`]. The operation and every hook receive the invocation, and the
//! engine hands it back to the caller when the run is over.
//!
//! # Reporting failure
//!
//! The failure primitives ([`fail`](Invocation::fail),
//! [`fail_with`](Invocation::fail_with), [`fail_from`](Invocation::fail_from))
//! record detail on the invocation and return a [`Failure`] token. Returning
//! that token as `Err` stops the `call` chain:
//!
//! ```
//! use cater_service::prelude::*;
//!
//! #[derive(Default)]
//! struct Greet;
//!
//! impl Service for Greet {
//!     type Args = &'static str;
//!
//!     fn call(invocation: &mut Invocation<Self>, name: &'static str) -> ServiceResult {
//!         if name.is_empty() {
//!             return Err(invocation.fail_with([("name", "is required")]));
//!         }
//!         invocation.set_message(format!("hello, {name}"));
//!         Ok(())
//!     }
//! }
//!
//! let greeted = Greet::run("");
//! assert!(greeted.failed());
//! assert_eq!(greeted.errors()["name"], ["is required"]);
//! ```

use core::any::type_name;
use core::fmt;
use core::ops::{Deref, DerefMut};
use std::sync::Arc;

use indexmap::IndexMap;

use crate::error::ServiceError;
use crate::errors::{Attribute, Errors, Messages};
use crate::outcome::Outcome;

/// Result type returned by service operations and hooks.
pub type ServiceResult<T = ()> = Result<T, Failure>;

// ─────────────────────────────────────────────────────────────────────────────
// Failure
// ─────────────────────────────────────────────────────────────────────────────

/// Signal that aborts the rest of the `call` chain.
///
/// Carries no detail of its own; everything the caller needs is recorded on
/// the invocation before the token is produced. Only the failure primitives
/// on [`Invocation`] can create one, and the engine absorbs it: it never
/// reaches the caller of [`Service::run`](crate::Service::run).
#[derive(Debug, PartialEq, Eq)]
#[must_use = "return the failure from the operation to stop the call chain"]
pub struct Failure {
    _private: (),
}

impl Failure {
    pub(crate) const fn signal() -> Self {
        Self { _private: () }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("service failure")
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Message
// ─────────────────────────────────────────────────────────────────────────────

/// Free-form payload attached to an invocation, usually by a failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// Plain text.
    Text(String),
    /// Attribute map given to [`Invocation::fail_with`].
    Attributes(IndexMap<Attribute, Vec<String>>),
    /// Error collection merged in by [`Invocation::fail_from`].
    Errors(Errors),
}

impl Message {
    /// Returns the text if this is a [`Message::Text`].
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Message::Text(text) => Some(text),
            Message::Attributes(_) | Message::Errors(_) => None,
        }
    }

    /// Records the payload into `errors`.
    ///
    /// Text goes under `base`, attribute maps add one entry per message and
    /// error collections are merged.
    fn record_into(&self, errors: &mut Errors) {
        match self {
            Message::Text(text) => {
                errors.add_base(text.as_str());
            }
            Message::Attributes(attributes) => {
                for (attribute, messages) in attributes {
                    for message in messages {
                        errors.add(attribute, message.as_str());
                    }
                }
            }
            Message::Errors(other) => {
                errors.merge(other);
            }
        }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Message::Text(text) => f.write_str(text),
            Message::Attributes(attributes) => {
                let mut first = true;
                for (attribute, messages) in attributes {
                    for message in messages {
                        if !first {
                            f.write_str("; ")?;
                        }
                        first = false;
                        write!(f, "{attribute} {message}")?;
                    }
                }
                Ok(())
            }
            Message::Errors(errors) => {
                let mut first = true;
                for (attribute, message) in errors.iter() {
                    if !first {
                        f.write_str("; ")?;
                    }
                    first = false;
                    write!(f, "{attribute} {message}")?;
                }
                Ok(())
            }
        }
    }
}

impl From<&str> for Message {
    fn from(text: &str) -> Self {
        Message::Text(text.to_owned())
    }
}

impl From<String> for Message {
    fn from(text: String) -> Self {
        Message::Text(text)
    }
}

impl From<Errors> for Message {
    fn from(errors: Errors) -> Self {
        Message::Errors(errors)
    }
}

impl From<IndexMap<Attribute, Vec<String>>> for Message {
    fn from(attributes: IndexMap<Attribute, Vec<String>>) -> Self {
        Message::Attributes(attributes)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// InvocationId
// ─────────────────────────────────────────────────────────────────────────────

/// Unique identifier of one invocation.
///
/// Generated with nanoid; used to correlate log output of a single run.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InvocationId(Arc<str>);

impl InvocationId {
    /// Creates a new unique ID.
    #[must_use]
    pub fn new() -> Self {
        Self(nanoid::nanoid!().into())
    }

    /// Returns the ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for InvocationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for InvocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Invocation
// ─────────────────────────────────────────────────────────────────────────────

/// Where an invocation is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    /// Constructed, not handed to the engine yet.
    Pending,
    /// Inside the `call` chain; failure primitives are allowed.
    Calling,
    /// Outcome set; running the `success`/`error` chain or returned.
    Done,
}

/// One execution of service `S`.
///
/// Dereferences to the service value, so hooks and the operation can read and
/// update the service's own fields directly.
#[derive(Debug)]
pub struct Invocation<S> {
    id: InvocationId,
    service: S,
    stage: Stage,
    outcome: Outcome,
    signalled: bool,
    errors: Errors,
    message: Option<Message>,
}

impl<S> Invocation<S> {
    /// Creates a fresh invocation that has not run yet.
    #[must_use]
    pub fn new(service: S) -> Self {
        Self {
            id: InvocationId::new(),
            service,
            stage: Stage::Pending,
            outcome: Outcome::Unset,
            signalled: false,
            errors: Errors::new(),
            message: None,
        }
    }

    /// Returns the unique ID of this invocation.
    #[must_use]
    pub fn id(&self) -> &InvocationId {
        &self.id
    }

    /// Returns the service value.
    #[must_use]
    pub fn service(&self) -> &S {
        &self.service
    }

    /// Returns the service value mutably.
    #[must_use]
    pub fn service_mut(&mut self) -> &mut S {
        &mut self.service
    }

    /// Consumes the invocation and returns the service value.
    #[must_use]
    pub fn into_inner(self) -> S {
        self.service
    }

    /// Returns the raw outcome without checking whether the invocation ran.
    #[must_use]
    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    /// Returns whether the invocation succeeded.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotYetRun`] while the outcome is unset.
    pub fn try_succeeded(&self) -> Result<bool, ServiceError> {
        self.outcome.as_success().ok_or(ServiceError::NotYetRun {
            service: type_name::<S>(),
        })
    }

    /// Returns `true` if the invocation succeeded.
    ///
    /// # Panics
    ///
    /// Panics with [`ServiceError::NotYetRun`] if the invocation has not
    /// finished its `call` chain. Use [`try_succeeded`](Self::try_succeeded)
    /// to get the error instead.
    #[must_use]
    pub fn succeeded(&self) -> bool {
        match self.try_succeeded() {
            Ok(succeeded) => succeeded,
            Err(err) => {
                tracing::error!(invocation = %self.id, "{err}");
                panic!("{err}");
            }
        }
    }

    /// Returns `true` if the invocation failed.
    ///
    /// # Panics
    ///
    /// Same as [`succeeded`](Self::succeeded).
    #[must_use]
    pub fn failed(&self) -> bool {
        !self.succeeded()
    }

    /// Returns the collected errors.
    #[must_use]
    pub fn errors(&self) -> &Errors {
        &self.errors
    }

    /// Returns the collected errors mutably.
    ///
    /// Adding errors alone does not fail the invocation; use one of the
    /// failure primitives for that.
    #[must_use]
    pub fn errors_mut(&mut self) -> &mut Errors {
        &mut self.errors
    }

    /// Returns the free-form message, if one was set.
    #[must_use]
    pub fn message(&self) -> Option<&Message> {
        self.message.as_ref()
    }

    /// Sets the free-form message. Last write wins.
    pub fn set_message(&mut self, message: impl Into<Message>) {
        self.message = Some(message.into());
    }

    // ─────────────────────────────────────────────────────────────────────
    // Failure primitives
    // ─────────────────────────────────────────────────────────────────────

    /// Fails with a single message recorded under `base`.
    ///
    /// The message also becomes the invocation's [`Message::Text`].
    ///
    /// # Panics
    ///
    /// Panics with [`ServiceError::FailOutsideCall`] unless the `call` chain
    /// is running.
    pub fn fail(&mut self, message: impl Into<String>) -> Failure {
        self.fail_message(Message::Text(message.into()))
    }

    /// Fails with messages keyed by attribute.
    ///
    /// Each entry carries one message or a list of them; every message is
    /// added in order. The normalized map becomes the invocation's
    /// [`Message::Attributes`].
    ///
    /// # Panics
    ///
    /// Same as [`fail`](Self::fail).
    pub fn fail_with<I, A, M>(&mut self, entries: I) -> Failure
    where
        I: IntoIterator<Item = (A, M)>,
        A: Into<Attribute>,
        M: Into<Messages>,
    {
        let mut attributes: IndexMap<Attribute, Vec<String>> = IndexMap::new();
        for (attribute, messages) in entries {
            attributes
                .entry(attribute.into())
                .or_default()
                .extend(messages.into().into_vec());
        }
        self.fail_message(Message::Attributes(attributes))
    }

    /// Fails by merging another collection, typically a nested service's.
    ///
    /// Existing messages are kept; `errors` is appended after them.
    ///
    /// # Panics
    ///
    /// Same as [`fail`](Self::fail).
    pub fn fail_from(&mut self, errors: &Errors) -> Failure {
        self.fail_message(Message::Errors(errors.clone()))
    }

    /// Fails with any [`Message`] payload.
    ///
    /// The payload is recorded into [`errors`](Self::errors) according to its
    /// variant and then stored as the invocation's message.
    ///
    /// # Panics
    ///
    /// Same as [`fail`](Self::fail).
    pub fn fail_message(&mut self, message: impl Into<Message>) -> Failure {
        self.ensure_calling();
        let message = message.into();
        message.record_into(&mut self.errors);
        self.message = Some(message);
        self.signalled = true;
        Failure::signal()
    }

    /// Fails with a single message recorded under `base`.
    ///
    /// # Panics
    ///
    /// Same as [`fail`](Self::fail).
    #[deprecated(note = "use `fail` instead")]
    pub fn error(&mut self, message: impl Into<String>) -> Failure {
        self.ensure_calling();
        let message = message.into();
        self.errors.add_base(message.as_str());
        self.message = Some(Message::Text(message));
        self.signalled = true;
        Failure::signal()
    }

    // ─────────────────────────────────────────────────────────────────────
    // Result accessors
    // ─────────────────────────────────────────────────────────────────────

    /// Calls `f` if the invocation succeeded. Returns `self` for chaining.
    ///
    /// # Panics
    ///
    /// Same as [`succeeded`](Self::succeeded).
    pub fn on_success(&self, f: impl FnOnce(&Self)) -> &Self {
        if self.succeeded() {
            f(self);
        }
        self
    }

    /// Calls `f` if the invocation failed. Returns `self` for chaining.
    ///
    /// # Panics
    ///
    /// Same as [`succeeded`](Self::succeeded).
    pub fn on_error(&self, f: impl FnOnce(&Self)) -> &Self {
        if self.failed() {
            f(self);
        }
        self
    }

    // ─────────────────────────────────────────────────────────────────────
    // Engine bookkeeping
    // ─────────────────────────────────────────────────────────────────────

    pub(crate) fn begin(&mut self) {
        self.stage = Stage::Calling;
    }

    /// Sets the outcome. Called exactly once, when the `call` chain is over.
    pub(crate) fn finish(&mut self, outcome: Outcome) {
        debug_assert!(!self.outcome.is_set(), "outcome is set exactly once");
        self.outcome = outcome;
        self.stage = Stage::Done;
    }

    /// Returns `true` once a failure primitive has been used.
    pub(crate) fn signalled(&self) -> bool {
        self.signalled
    }

    fn ensure_calling(&self) {
        if self.stage != Stage::Calling {
            let err = ServiceError::FailOutsideCall {
                service: type_name::<S>(),
                outcome: self.outcome,
            };
            tracing::error!(invocation = %self.id, "{err}");
            panic!("{err}");
        }
    }
}

impl<S> Deref for Invocation<S> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.service
    }
}

impl<S> DerefMut for Invocation<S> {
    fn deref_mut(&mut self) -> &mut S {
        &mut self.service
    }
}
