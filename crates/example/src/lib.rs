//! Example user signup flow built with Cater services.
//!
//! Demonstrates nested services, every hook kind, guards and error merging.
//!
//! # Flow
//!
//! ```text
//! CreateAccount
//!   ├─ before  normalize         trims and lowercases the email
//!   ├─ before  validate          runs ValidateSignup, merges its errors
//!   ├─ before  reserved_domain   unless reserved domains are allowed
//!   ├─ around  timing
//!   │    └─ call                 registers the account in the Directory
//!   ├─ after   welcome           sets the welcome message
//!   ├─ success log_created
//!   └─ error   log_rejected
//! ```

mod account;
mod services;

pub use account::{Account, Directory, SignupRequest};
pub use services::{CreateAccount, MIN_PASSWORD_LEN, RESERVED_DOMAIN, ValidateSignup, report};
