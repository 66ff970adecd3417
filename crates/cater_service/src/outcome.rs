//! Tri-state outcome of one service invocation.

use core::fmt;

/// Result state of an [`Invocation`](crate::Invocation).
///
/// Starts as [`Unset`](Self::Unset) and moves to exactly one of the two
/// terminal states when the `call` chain finishes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// The invocation has not finished its `call` chain yet.
    #[default]
    Unset,
    /// The operation returned normally.
    Succeeded,
    /// The operation, or one of its hooks, reported a failure.
    Failed,
}

impl Outcome {
    /// Returns `true` once a terminal state has been reached.
    #[must_use]
    pub fn is_set(self) -> bool {
        !matches!(self, Outcome::Unset)
    }

    /// Returns `Some(true)` for success, `Some(false)` for failure and `None`
    /// while unset.
    #[must_use]
    pub fn as_success(self) -> Option<bool> {
        match self {
            Outcome::Unset => None,
            Outcome::Succeeded => Some(true),
            Outcome::Failed => Some(false),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Unset => write!(f, "unset"),
            Outcome::Succeeded => write!(f, "succeeded"),
            Outcome::Failed => write!(f, "failed"),
        }
    }
}
