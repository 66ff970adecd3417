//! Example signup CLI.
//!
//! Registers a user in an in-memory directory that already holds an admin
//! account, then prints the outcome as JSON.
//!
//! # Usage
//!
//! ```bash
//! signup <name> <email> <password>
//! ```
//!
//! # Example
//!
//! ```bash
//! CATER_LOG=cater_service=debug,info signup Ada ada@example.com hunter22
//! ```

use cater_core::TracingConfig;
use cater_service::execute;
use example::{CreateAccount, Directory, SignupRequest, report};

#[expect(
    clippy::print_stdout,
    clippy::print_stderr,
    reason = "command-line output"
)]
fn main() {
    let _ = dotenvy::dotenv();

    match TracingConfig::from_env() {
        Ok(config) => config.init(),
        Err(err) => {
            eprintln!("Error: {err}");
            std::process::exit(1);
        }
    }

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 4 {
        eprintln!("Usage: signup <name> <email> <password>");
        eprintln!("Example: signup Ada ada@example.com hunter22");
        std::process::exit(1);
    }

    let directory = Directory::new();
    let _ = directory.try_register("Admin", "admin@example.com");

    let request = SignupRequest::new(&args[1], &args[2], &args[3]);
    let invocation = execute(CreateAccount::new(directory, request), ());

    match serde_json::to_string_pretty(&report(&invocation)) {
        Ok(rendered) => println!("{rendered}"),
        Err(err) => eprintln!("Error: cannot render report: {err}"),
    }

    if invocation.failed() {
        std::process::exit(2);
    }
}
