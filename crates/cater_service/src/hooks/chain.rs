//! Lifecycle chains and hook kinds.
//!
//! Every service has three chains:
//!
//! - [`Chain::Call`] wraps the operation itself
//! - [`Chain::Success`] runs after the operation returned normally
//! - [`Chain::Error`] runs after the operation reported a failure
//!
//! Within a chain, each hook is a [`HookKind::Before`], [`HookKind::Around`]
//! or [`HookKind::After`] hook.

use core::fmt;

/// Named lifecycle phase a hook is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Chain {
    /// Wraps the service operation.
    Call,
    /// Runs once the operation succeeded.
    Success,
    /// Runs once the operation failed.
    Error,
}

impl Chain {
    /// All chains, in lifecycle order.
    pub const ALL: [Chain; 3] = [Chain::Call, Chain::Success, Chain::Error];

    /// Returns the chain name used in logs and error messages.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Chain::Call => "call",
            Chain::Success => "success",
            Chain::Error => "error",
        }
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Position of a hook relative to the chain's core action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookKind {
    /// Runs before the core action.
    Before,
    /// Wraps the core action and must call its continuation to proceed.
    Around,
    /// Runs after the core action.
    After,
}

impl fmt::Display for HookKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HookKind::Before => write!(f, "before"),
            HookKind::Around => write!(f, "around"),
            HookKind::After => write!(f, "after"),
        }
    }
}
