//! Signup data and the in-memory account directory.

use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Fields submitted by a user signing up.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignupRequest {
    /// Display name.
    pub name: String,
    /// Contact email.
    pub email: String,
    /// Plain-text password; only its length is checked.
    #[serde(skip_serializing)]
    pub password: String,
}

impl SignupRequest {
    /// Creates a request from its three fields.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            password: password.into(),
        }
    }
}

/// A registered account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Account {
    /// Sequential identifier, starting at 1.
    pub id: u64,
    /// Display name.
    pub name: String,
    /// Normalized email.
    pub email: String,
}

/// Shared in-memory account store.
///
/// Cloning yields another handle to the same accounts.
#[derive(Debug, Clone, Default)]
pub struct Directory {
    accounts: Arc<RwLock<Vec<Account>>>,
}

impl Directory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an account unless `email` is already taken.
    pub fn try_register(&self, name: &str, email: &str) -> Option<Account> {
        let mut accounts = self.accounts.write();
        if accounts.iter().any(|account| account.email == email) {
            return None;
        }
        let account = Account {
            id: accounts.len() as u64 + 1,
            name: name.to_owned(),
            email: email.to_owned(),
        };
        accounts.push(account.clone());
        Some(account)
    }

    /// Returns `true` if an account uses `email`.
    #[must_use]
    pub fn contains_email(&self, email: &str) -> bool {
        self.accounts
            .read()
            .iter()
            .any(|account| account.email == email)
    }

    /// Number of registered accounts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.accounts.read().len()
    }

    /// Returns `true` if nobody registered yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.accounts.read().is_empty()
    }
}
