//! Shared test utilities for `cater_service` integration tests.
//!
//! Import via `mod test_utils;` in test files.

#![allow(
    dead_code,
    missing_docs,
    reason = "shared test utilities: not all items are used in every test binary"
)]

use cater_service::{Invocation, ServiceResult};

// ═══════════════════════════════════════════════════════════════════════════════
// JOURNAL
// ═══════════════════════════════════════════════════════════════════════════════

/// Ordered record of what ran during an invocation.
///
/// Hook definitions are shared by every invocation of a service type, so
/// tests keep their observations on the service value itself.
#[derive(Debug, Default, Clone)]
pub struct Journal(Vec<String>);

impl Journal {
    pub fn record(&mut self, entry: impl Into<String>) {
        self.0.push(entry.into());
    }

    pub fn entries(&self) -> Vec<&str> {
        self.0.iter().map(String::as_str).collect()
    }

    pub fn count(&self, entry: &str) -> usize {
        self.0.iter().filter(|e| *e == entry).count()
    }
}

/// Services that carry a [`Journal`].
pub trait Journaled {
    fn journal(&mut self) -> &mut Journal;
}

/// Hook that records `entry` and continues.
pub fn note<S: Journaled + 'static>(
    entry: &'static str,
) -> impl Fn(&mut Invocation<S>) -> ServiceResult + Send + Sync + 'static {
    move |invocation| {
        invocation.journal().record(entry);
        Ok(())
    }
}

/// Hook for the `success`/`error` chains that records `entry`.
pub fn note_after<S: Journaled + 'static>(
    entry: &'static str,
) -> impl Fn(&mut Invocation<S>) + Send + Sync + 'static {
    move |invocation| invocation.journal().record(entry)
}

/// Hook that records `entry` and fails with it.
pub fn reject<S: Journaled + 'static>(
    entry: &'static str,
) -> impl Fn(&mut Invocation<S>) -> ServiceResult + Send + Sync + 'static {
    move |invocation| {
        invocation.journal().record(entry);
        Err(invocation.fail(entry))
    }
}
