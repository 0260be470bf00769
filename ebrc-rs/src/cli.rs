//! Command-line argument parsing.
//!
//! Usage:
//!   ebrc [-c <file>] [-d <level>] [--check] [--list] [--dump <function>]
//!   ebrc [-c <file>] [-d <level>] <function> [<args>...]

use std::io::Write;
use std::path::PathBuf;

use clap::Parser;
use directories::BaseDirs;

use crate::script::CommandEvaluator;
use crate::session::Session;

// ── Public types ──────────────────────────────────────────────────────────────

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(name = "ebrc", version, about = "Load an edbrowse config file and run its functions")]
pub struct CliArgs {
    /// Configuration file (default: $EBRC, then ~/.ebrc).
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Debug level 0-9; 3 shows every command a function runs.
    #[arg(short = 'd', long = "debug", default_value_t = 1)]
    pub debug: u8,

    /// Load the configuration, report problems, and exit.
    #[arg(long)]
    pub check: bool,

    /// List the defined functions.
    #[arg(long)]
    pub list: bool,

    /// Print the encoded body of a function.
    #[arg(long, value_name = "FUNCTION")]
    pub dump: Option<String>,

    /// Function to run, followed by its arguments.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub call: Vec<String>,
}

impl CliArgs {
    /// The configuration file to load.
    pub fn config_path(&self) -> Option<PathBuf> {
        self.config.clone().or_else(find_user_config)
    }

    /// `NAME ARGS...` joined back into a call line.
    pub fn call_line(&self) -> Option<String> {
        (!self.call.is_empty()).then(|| self.call.join(" "))
    }

    pub fn log_level(&self) -> log::LevelFilter {
        match self.debug {
            0 => log::LevelFilter::Error,
            1 => log::LevelFilter::Warn,
            2 => log::LevelFilter::Info,
            3..=5 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    }
}

/// `$EBRC` if set, else `~/.ebrc`.
pub fn find_user_config() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os("EBRC").filter(|v| !v.is_empty()) {
        return Some(PathBuf::from(path));
    }
    BaseDirs::new().map(|dirs| dirs.home_dir().join(".ebrc"))
}

// ── Dry-run evaluator ─────────────────────────────────────────────────────────

/// Prints each command instead of running it.
///
/// Every command succeeds except `false` and `!false`, which fail, so the
/// branches of a function can be exercised from the command line.
pub struct EchoEvaluator<W: Write> {
    out: W,
}

impl<W: Write> EchoEvaluator<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> CommandEvaluator for EchoEvaluator<W> {
    fn evaluate(&mut self, _session: &mut Session, command: &str) -> bool {
        if let Err(e) = writeln!(self.out, "{command}") {
            log::error!("cannot write command: {e}");
            return false;
        }
        !matches!(command.trim(), "false" | "!false")
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
