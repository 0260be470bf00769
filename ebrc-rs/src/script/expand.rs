//! Argument binding and substitution for function calls.
//!
//! | Sequence    | Meaning                                 |
//! |-------------|-----------------------------------------|
//! | `~0`        | Everything after the function name      |
//! | `~1` … `~9` | The n-th space-separated argument       |
//!
//! Any other `~` is copied through unchanged.

use crate::error::RunError;

/// Most positional arguments a function can see.
pub const MAX_ARGS: usize = 9;

/// Collapse runs of blanks to one space and trim both ends.
pub fn crunch(line: &str) -> String {
    line.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Arguments of one invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Args {
    all: String,
    words: Vec<String>,
}

impl Args {
    /// Bind the crunched text that followed the function name.
    pub fn parse(rest: &str) -> Self {
        let mut words: Vec<String> = rest.split_whitespace().map(str::to_owned).collect();
        if words.len() > MAX_ARGS {
            log::warn!("{} arguments given, only the first {MAX_ARGS} are used", words.len());
            words.truncate(MAX_ARGS);
        }
        Self { all: rest.to_owned(), words }
    }

    /// `~n`: 0 is the whole remainder, 1–9 the positional words.
    pub fn get(&self, n: usize) -> Option<&str> {
        match n {
            0 => Some(&self.all),
            n => self.words.get(n - 1).map(String::as_str),
        }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Replace every `~N` in `template` with its argument.
pub fn substitute(template: &str, args: &Args) -> Result<String, RunError> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '~' {
            if let Some(n) = chars.peek().and_then(|c| c.to_digit(10)) {
                chars.next();
                let n = n as usize;
                out.push_str(args.get(n).ok_or(RunError::NoArgument(n))?);
                continue;
            }
        }
        out.push(ch);
    }
    Ok(out)
}
