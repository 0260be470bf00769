//! Automation functions.
//!
//! A function is defined in the configuration file as a block of command
//! templates with structured control flow:
//!
//! ```text
//! function:fetch{
//! b ~1
//! if(?){
//! b ~2
//! }
//! }
//! ```
//!
//! and invoked by name with up to nine arguments.  Each expanded command is
//! passed to a [`CommandEvaluator`] supplied by the caller.
//!
//! # Quick start
//!
//! ```rust
//! use ebrc::{Config, Interpreter, Session};
//!
//! let config = Config::load_str("function:hi{\necho hello ~1\n}\n", "demo").unwrap();
//! let mut session = Session::new(config);
//! let mut seen = Vec::new();
//! let mut eval = |_: &mut Session, cmd: &str| {
//!     seen.push(cmd.to_owned());
//!     true
//! };
//! Interpreter::run(&mut session, &mut eval, "hi world").unwrap();
//! assert_eq!(seen, ["echo hello world"]);
//! ```

pub mod expand;
pub mod interp;
pub mod program;

pub use interp::{CommandEvaluator, Interpreter, Outcome, RunStatus};
