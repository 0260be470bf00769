//! edbrowse configuration files and automation functions.
//!
//! Loads an `.ebrc` file into typed records and an ordered rule table,
//! answers the per-URL and per-message questions those rules decide, and
//! runs the functions the file defines.

pub mod account;
pub mod adbook;
pub mod cli;
pub mod config;
pub mod error;
pub mod keyword;
pub mod preprocess;
pub mod replace;
pub mod rules;
pub mod script;
pub mod session;
pub mod settings;
pub mod urlmatch;

pub use config::Config;
pub use error::{ConfigError, ConfigErrorKind, RunError, UrlError};
pub use rules::{Rule, RuleTable};
pub use script::{CommandEvaluator, Interpreter, Outcome, RunStatus};
pub use session::Session;
pub use settings::Settings;
