//! The signup services.

use std::time::Instant;

use cater_service::prelude::*;
use serde_json::{Value, json};

use crate::account::{Account, Directory, SignupRequest};

/// Minimum accepted password length.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Domain kept for internal accounts.
pub const RESERVED_DOMAIN: &str = "@cater.internal";

// ─────────────────────────────────────────────────────────────────────────────
// ValidateSignup
// ─────────────────────────────────────────────────────────────────────────────

/// Checks a signup request field by field and reports every problem at once.
#[derive(Debug, Default)]
pub struct ValidateSignup;

impl Service for ValidateSignup {
    type Args = SignupRequest;

    fn call(invocation: &mut Invocation<Self>, request: SignupRequest) -> ServiceResult {
        let mut errors = Errors::new();

        if request.name.trim().is_empty() {
            errors.add("name", "is required");
        }
        if request.email.is_empty() {
            errors.add("email", "is required");
        } else if !is_email(&request.email) {
            errors.add("email", "is invalid");
        }
        if request.password.chars().count() < MIN_PASSWORD_LEN {
            errors.add(
                "password",
                format!("must be at least {MIN_PASSWORD_LEN} characters"),
            );
        }
        if !request.name.is_empty() && request.password.eq_ignore_ascii_case(&request.name) {
            errors.add("password", "must differ from the name");
        }

        if errors.is_empty() {
            return Ok(());
        }
        Err(invocation.fail_from(&errors))
    }
}

fn is_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.contains('@')
        }
        None => false,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// CreateAccount
// ─────────────────────────────────────────────────────────────────────────────

/// Validates a request and registers the account in a [`Directory`].
#[derive(Debug)]
pub struct CreateAccount {
    directory: Directory,
    request: SignupRequest,
    allow_reserved: bool,
    account: Option<Account>,
}

impl CreateAccount {
    /// Prepares a signup of `request` into `directory`.
    #[must_use]
    pub fn new(directory: Directory, request: SignupRequest) -> Self {
        Self {
            directory,
            request,
            allow_reserved: false,
            account: None,
        }
    }

    /// Accepts emails on [`RESERVED_DOMAIN`].
    #[must_use]
    pub fn allow_reserved(mut self, allow: bool) -> Self {
        self.allow_reserved = allow;
        self
    }

    /// The request as normalized by the run.
    #[must_use]
    pub fn request(&self) -> &SignupRequest {
        &self.request
    }

    /// The created account, once the run succeeded.
    #[must_use]
    pub fn account(&self) -> Option<&Account> {
        self.account.as_ref()
    }
}

impl Service for CreateAccount {
    type Args = ();

    fn define_callbacks(callbacks: &mut Callbacks<Self>) -> Result<(), HookRegistrationError> {
        callbacks.before_call("normalize", |invocation: &mut Invocation<Self>| {
            let email = invocation.request.email.trim().to_lowercase();
            invocation.request.email = email;
            Ok(())
        })?;

        callbacks.before_call("validate", |invocation: &mut Invocation<Self>| {
            let validated = ValidateSignup::run(invocation.request.clone());
            if validated.failed() {
                return Err(invocation.fail_from(validated.errors()));
            }
            Ok(())
        })?;

        callbacks
            .before_call("reserved_domain", |invocation: &mut Invocation<Self>| {
                if invocation.request.email.ends_with(RESERVED_DOMAIN) {
                    return Err(invocation.fail_with([("email", "uses a reserved domain")]));
                }
                Ok(())
            })?
            .unless(|invocation| invocation.allow_reserved);

        callbacks.around_call("timing", |invocation, next| {
            let started = Instant::now();
            let result = next.run(invocation);
            tracing::debug!(elapsed = ?started.elapsed(), ok = result.is_ok(), "registration timed");
            result
        })?;

        callbacks.after_call("welcome", |invocation: &mut Invocation<Self>| {
            let name = invocation.account.as_ref().map(|account| account.name.clone());
            if let Some(name) = name {
                invocation.set_message(format!("Welcome, {name}!"));
            }
            Ok(())
        })?;

        callbacks.after_success("log_created", |invocation: &mut Invocation<Self>| {
            if let Some(account) = &invocation.account {
                tracing::info!(id = account.id, email = %account.email, "account created");
            }
        })?;

        callbacks.after_error("log_rejected", |invocation: &mut Invocation<Self>| {
            tracing::warn!(
                email = %invocation.request.email,
                errors = invocation.errors().len(),
                "signup rejected"
            );
        })?;

        Ok(())
    }

    fn call(invocation: &mut Invocation<Self>, (): ()) -> ServiceResult {
        let SignupRequest { name, email, .. } = &invocation.request;
        match invocation.directory.try_register(name.trim(), email) {
            Some(account) => {
                invocation.account = Some(account);
                Ok(())
            }
            None => Err(invocation.fail_with([("email", "has already been taken")])),
        }
    }
}

/// Renders the outcome of a signup as JSON.
#[must_use]
pub fn report(invocation: &Invocation<CreateAccount>) -> Value {
    if invocation.succeeded() {
        json!({
            "status": "created",
            "account": invocation.account(),
            "message": invocation.message().map(ToString::to_string),
        })
    } else {
        json!({
            "status": "rejected",
            "email": invocation.request().email,
            "errors": invocation.errors(),
        })
    }
}
