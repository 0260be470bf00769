//! Function interpreter.
//!
//! Runs one encoded function body line by line.  Literal lines are expanded
//! and handed to a [`CommandEvaluator`]; its boolean result is the outcome
//! that the next `if`, `while` or `until` tests.  Control lines steer the
//! instruction pointer with [`balance`] and a small stack of open blocks.
//!
//! | Block       | Enters when                | Repeats when               |
//! |-------------|----------------------------|----------------------------|
//! | `if(*)`     | last command succeeded     |                            |
//! | `if(?)`     | last command failed        |                            |
//! | `while(*)`  | last command succeeded     | body's last command passed |
//! | `while(?)`  | last command failed        | body's last command failed |
//! | `until(*)`  | always                     | body's last command failed |
//! | `until(?)`  | always                     | body's last command passed |
//! | `loop(N)`   | N > 0                      | fewer than N passes        |
//!
//! Every test resets the outcome to success, so a failure tested by a
//! block is consumed.  An ordinary function ignores failures nobody tests
//! and runs every line.  In a `function+` function a failure that reaches
//! the next literal line (or the end of the body) untested marks the run as
//! a soft failure.

use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use crate::error::RunError;
use crate::preprocess::{Block, LineKind};
use crate::rules::Function;
use crate::session::Session;
use crate::settings::Settings;

use super::expand::{crunch, substitute, Args};
use super::program::{balance, Direction};

// ── Outcomes ──────────────────────────────────────────────────────────────────

/// How a function that ran to the end went.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    /// A `function+` body had at least one untested failure.
    SoftFailure,
}

/// Flat classification of a run, for callers that only need a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Success,
    SoftFailure,
    Failed,
    NotFound,
}

impl RunStatus {
    pub fn of(result: &Result<Outcome, RunError>) -> Self {
        match result {
            Ok(Outcome::Success) => RunStatus::Success,
            Ok(Outcome::SoftFailure) => RunStatus::SoftFailure,
            Err(e) if e.is_not_found() => RunStatus::NotFound,
            Err(_) => RunStatus::Failed,
        }
    }
}

// ── CommandEvaluator ──────────────────────────────────────────────────────────

/// Executes one expanded command line.
///
/// Implementations may change `session` and may call
/// [`Interpreter::run`] again to run another function.
pub trait CommandEvaluator {
    fn evaluate(&mut self, session: &mut Session, command: &str) -> bool;
}

impl<F> CommandEvaluator for F
where
    F: FnMut(&mut Session, &str) -> bool,
{
    fn evaluate(&mut self, session: &mut Session, command: &str) -> bool {
        self(session, command)
    }
}

// ── SettingsGuard ─────────────────────────────────────────────────────────────

/// Restores the session's settings when dropped.
struct SettingsGuard<'a> {
    session: &'a mut Session,
    saved: Option<Settings>,
}

impl<'a> SettingsGuard<'a> {
    fn new(session: &'a mut Session, restore: bool) -> Self {
        let saved = restore.then(|| session.settings.clone());
        Self { session, saved }
    }
}

impl Deref for SettingsGuard<'_> {
    type Target = Session;

    fn deref(&self) -> &Session {
        self.session
    }
}

impl DerefMut for SettingsGuard<'_> {
    fn deref_mut(&mut self) -> &mut Session {
        self.session
    }
}

impl Drop for SettingsGuard<'_> {
    fn drop(&mut self) {
        if let Some(saved) = self.saved.take() {
            self.session.settings = saved;
        }
    }
}

// ── Interpreter ───────────────────────────────────────────────────────────────

/// An open control block.
#[derive(Debug, Clone, Copy)]
enum Control {
    If,
    While { on_success: bool },
    Until { on_success: bool },
    /// Passes still to run.
    Loop(u32),
}

pub struct Interpreter;

impl Interpreter {
    /// Run `NAME [ARGS...]`.
    ///
    /// Settings are put back afterwards unless the function is `init` or
    /// its name starts with `set`.
    pub fn run(
        session: &mut Session,
        evaluator: &mut dyn CommandEvaluator,
        line: &str,
    ) -> Result<Outcome, RunError> {
        let line = crunch(line);
        let (name, rest) = line.split_once(' ').unwrap_or((line.as_str(), ""));
        if name.is_empty() {
            return Err(RunError::NoFunction);
        }
        if !name.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return Err(RunError::BadName(name.to_owned()));
        }
        let function = session
            .config
            .rules
            .function(name)
            .cloned()
            .ok_or_else(|| RunError::NotFound(name.to_owned()))?;

        let restore = name != "init" && !name.starts_with("set");
        let args = Args::parse(rest);
        let mut session = SettingsGuard::new(session, restore);
        log::debug!("running function {} ({} lines)", function.name, function.body.len());
        Frame::new(&function, &args).execute(&mut session, evaluator)
    }
}

/// State of one function invocation.
struct Frame<'f> {
    function: &'f Arc<Function>,
    args: &'f Args,
    stack: Vec<Control>,
    /// Outcome of the last command, reset by every test.
    ok: bool,
    soft_failure: bool,
}

impl<'f> Frame<'f> {
    fn new(function: &'f Arc<Function>, args: &'f Args) -> Self {
        Self {
            function,
            args,
            stack: Vec::new(),
            ok: true,
            soft_failure: false,
        }
    }

    fn execute(
        mut self,
        session: &mut Session,
        evaluator: &mut dyn CommandEvaluator,
    ) -> Result<Outcome, RunError> {
        let body = Arc::clone(&self.function.body);
        let mut ip = 0;

        while let Some(line) = body.get(ip) {
            if session.interrupted() {
                return Err(RunError::Interrupted);
            }

            match &line.kind {
                LineKind::Else => {
                    // the if branch ran; skip the else branch
                    ip = balance(&body, ip, Direction::Forward) + 1;
                    self.stack.pop();
                }
                LineKind::Close => {
                    let start = balance(&body, ip, Direction::Backward) + 1;
                    let repeat = match self.stack.last_mut() {
                        Some(Control::Loop(left)) => {
                            *left = left.saturating_sub(1);
                            *left > 0
                        }
                        Some(&mut Control::While { on_success }) => self.test(on_success),
                        Some(&mut Control::Until { on_success }) => !self.test(on_success),
                        Some(Control::If) | None => false,
                    };
                    if repeat {
                        log::trace!("{}: back to line {}", self.function.name, start);
                        ip = start;
                    } else {
                        self.stack.pop();
                        ip += 1;
                    }
                }
                LineKind::Open(block) => {
                    let (control, enter) = match *block {
                        Block::Loop(n) => (Control::Loop(n), n > 0),
                        Block::Until { on_success } => (Control::Until { on_success }, true),
                        Block::While { on_success } => {
                            (Control::While { on_success }, self.test(on_success))
                        }
                        // sections never reach a body; treat like a plain if
                        Block::If { on_success } => (Control::If, self.test(on_success)),
                        _ => (Control::If, true),
                    };
                    self.stack.push(control);
                    if enter {
                        ip += 1;
                    } else {
                        let skip = balance(&body, ip, Direction::Forward);
                        if matches!(body.get(skip).map(|l| &l.kind), Some(LineKind::Close)) {
                            self.stack.pop();
                        }
                        ip = skip + 1;
                    }
                }
                LineKind::Text(template) => {
                    self.note_failure();
                    let command = substitute(template, self.args)?;
                    log::debug!("< {command}");
                    self.ok = evaluator.evaluate(session, &command);
                    ip += 1;
                }
            }
        }

        self.note_failure();
        Ok(if self.soft_failure { Outcome::SoftFailure } else { Outcome::Success })
    }

    /// Test the last outcome: `on_success` asks "did it pass?", otherwise
    /// "did it fail?".  Consumes the outcome.
    fn test(&mut self, on_success: bool) -> bool {
        let result = self.ok == on_success;
        self.ok = true;
        result
    }

    /// A failure nobody tested is a soft failure in a `function+` body.
    fn note_failure(&mut self) {
        if !self.ok && self.function.nofail {
            log::debug!("{}: untested failure", self.function.name);
            self.soft_failure = true;
            self.ok = true;
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
