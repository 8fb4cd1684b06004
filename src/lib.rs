//! Vault Sanitizer Library
//!
//! Command-line front end for the vault integrity checker: parses the
//! invocation, validates it, acquires the vault passphrase and plans the
//! report files the checker writes to.

pub mod cli;
pub mod config;
pub mod console;
pub mod error;
pub mod output;
pub mod secret;
pub mod types;

// Re-export main types for convenience
pub use cli::Cli;
pub use config::{Configuration, ConfigurationBuilder};
pub use console::{Console, ScriptedConsole, TerminalConsole};
pub use error::{Result, SanitizerError};
pub use output::{OutputPlan, OverwriteAnswer};
pub use secret::{Passphrase, PassphraseRequest, PassphraseSource, PassphraseState};
pub use types::{Problem, SolvableProblems};
