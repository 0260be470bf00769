//! Config preprocessor.
//!
//! A single forward pass over the raw text of one configuration file (or
//! one `include=` file).  Line endings are normalised, comments and leading
//! blanks are dropped, and every structural line is recognised once and
//! replaced by a compact control record:
//!
//! | Source line           | Record                                   | Code      |
//! |-----------------------|------------------------------------------|-----------|
//! | `mail{`               | [`Block::Mail`]                          | `\x81 m`  |
//! | `plugin{` / `mime{`   | [`Block::Plugin`]                        | `\x81 e`  |
//! | `table{`              | [`Block::Table`]                         | `\x81 b`  |
//! | `fromfilter{`         | [`Block::FromFilter`]                    | `\x81 r`  |
//! | `tofilter{`           | [`Block::ToFilter`]                      | `\x81 t`  |
//! | `subjfilter{`         | [`Block::SubjFilter`]                    | `\x81 s`  |
//! | `if(*){` / `if(?){`   | [`Block::If`]                            | `I` / `i` |
//! | `while(*){` / `(?)`   | [`Block::While`]                         | `W` / `w` |
//! | `until(*){` / `(?)`   | [`Block::Until`]                         | `U` / `u` |
//! | `loop(N){`            | [`Block::Loop`]                          | `l` N     |
//! | `function+NAME{`      | [`Block::Function`], nofail              | `f+NAME`  |
//! | `function:NAME{`      | [`Block::Function`]                      | `f:NAME`  |
//! | `}`                   | [`LineKind::Close`]                      | `\x82`    |
//! | `}else{`              | [`LineKind::Else`]                       | `\x83`    |
//!
//! Blanks inside a structural line are ignored, so `} else {` is an else.
//! Every other line passes through as [`LineKind::Text`].

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::{ConfigError, ConfigErrorKind};

/// Control code that starts a block-open record.
pub const BLOCK_OPEN: char = '\u{81}';
/// Control code of a block-close record.
pub const BLOCK_CLOSE: char = '\u{82}';
/// Control code of a block-else record.
pub const BLOCK_ELSE: char = '\u{83}';

/// Longest permitted function name.
pub const MAX_FUNCTION_NAME: usize = 10;

// ── Block ─────────────────────────────────────────────────────────────────────

/// The kind of block a block-open record starts, with its payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Mail,
    Plugin,
    Table,
    FromFilter,
    ToFilter,
    SubjFilter,
    /// `if(*)` when `on_success`, `if(?)` otherwise.
    If { on_success: bool },
    While { on_success: bool },
    Until { on_success: bool },
    /// `loop(N)`: run the body N times.
    Loop(u32),
    Function { name: String, nofail: bool },
}

impl Block {
    /// The one-character subtype that follows the block-open code.
    pub fn code(&self) -> char {
        match self {
            Block::Mail => 'm',
            Block::Plugin => 'e',
            Block::Table => 'b',
            Block::FromFilter => 'r',
            Block::ToFilter => 't',
            Block::SubjFilter => 's',
            Block::If { on_success: true } => 'I',
            Block::If { on_success: false } => 'i',
            Block::While { on_success: true } => 'W',
            Block::While { on_success: false } => 'w',
            Block::Until { on_success: true } => 'U',
            Block::Until { on_success: false } => 'u',
            Block::Loop(_) => 'l',
            Block::Function { .. } => 'f',
        }
    }

    /// Blocks that may only appear at the top level of a file.
    pub fn is_section(&self) -> bool {
        matches!(
            self,
            Block::Mail
                | Block::Plugin
                | Block::Table
                | Block::FromFilter
                | Block::ToFilter
                | Block::SubjFilter
                | Block::Function { .. }
        )
    }
}

// ── Line ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    /// A literal line: a key/value pair, a filter, or a command template.
    Text(String),
    Open(Block),
    Close,
    Else,
}

/// One record of an encoded buffer, tagged with its source line number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub number: usize,
    pub kind: LineKind,
}

impl Line {
    pub fn text(number: usize, text: impl Into<String>) -> Self {
        Self { number, kind: LineKind::Text(text.into()) }
    }
}

impl fmt::Display for Line {
    /// Render the record in its control-code text form.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            LineKind::Text(s) => f.write_str(s),
            LineKind::Close => write!(f, "{BLOCK_CLOSE}"),
            LineKind::Else => write!(f, "{BLOCK_ELSE}"),
            LineKind::Open(block) => {
                write!(f, "{BLOCK_OPEN}{}", block.code())?;
                match block {
                    Block::Loop(n) => write!(f, "{n}"),
                    Block::Function { name, nofail } => {
                        write!(f, "{}{name}", if *nofail { '+' } else { ':' })
                    }
                    _ => Ok(()),
                }
            }
        }
    }
}

/// Render a run of records as newline-terminated control-code text.
pub fn render(lines: &[Line]) -> String {
    let mut out = String::new();
    for line in lines {
        out.push_str(&line.to_string());
        out.push('\n');
    }
    out
}

// ── Encoder ───────────────────────────────────────────────────────────────────

/// Preprocess the text of one configuration file.
///
/// `file` is the display name used in diagnostics.  On error nothing is
/// returned, so a bad file never contributes partial records.
pub fn encode(src: &str, file: &str) -> Result<Vec<Line>, ConfigError> {
    let mut out = Vec::new();

    for (i, raw) in src.split('\n').enumerate() {
        let number = i + 1;
        let raw = raw.strip_suffix('\r').unwrap_or(raw);
        if raw.contains('\0') {
            return Err(ConfigError::at(file, number, ConfigErrorKind::Nulls));
        }

        let line = raw.trim_start_matches([' ', '\t']);
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let compact: String = line.chars().filter(|&c| c != ' ' && c != '\t').collect();
        let kind = match structural(&compact)
            .map_err(|kind| ConfigError::at(file, number, kind))?
        {
            Some(kind) => kind,
            None => LineKind::Text(line.to_owned()),
        };
        out.push(Line { number, kind });
    }

    Ok(out)
}

/// Recognise a structural line from its blank-free form.
fn structural(compact: &str) -> Result<Option<LineKind>, ConfigErrorKind> {
    let block = match compact {
        "}" => return Ok(Some(LineKind::Close)),
        "}else{" => return Ok(Some(LineKind::Else)),
        "mail{" => Block::Mail,
        "plugin{" | "mime{" => Block::Plugin,
        "table{" => Block::Table,
        "fromfilter{" => Block::FromFilter,
        "tofilter{" => Block::ToFilter,
        "subjfilter{" => Block::SubjFilter,
        "if(*){" => Block::If { on_success: true },
        "if(?){" => Block::If { on_success: false },
        "while(*){" => Block::While { on_success: true },
        "while(?){" => Block::While { on_success: false },
        "until(*){" => Block::Until { on_success: true },
        "until(?){" => Block::Until { on_success: false },
        _ => {
            if let Some(caps) = loop_header().captures(compact) {
                let count = caps[1].parse().map_err(|_| ConfigErrorKind::LoopCount)?;
                Block::Loop(count)
            } else if let Some(rest) = compact.strip_prefix("function") {
                match function_header(rest)? {
                    Some(block) => block,
                    None => return Ok(None),
                }
            } else {
                return Ok(None);
            }
        }
    };
    Ok(Some(LineKind::Open(block)))
}

fn loop_header() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^loop\((\d+)\)\{$").expect("static regex"))
}

/// Parse what follows `function` in a header line.  Returns `None` when the
/// separator is neither `+` nor `:`, so the line stays literal.
fn function_header(rest: &str) -> Result<Option<Block>, ConfigErrorKind> {
    let nofail = match rest.chars().next() {
        Some('+') => true,
        Some(':') => false,
        _ => return Ok(None),
    };
    let rest = &rest[1..];
    if rest.is_empty() || rest.starts_with(['{', '(']) {
        return Err(ConfigErrorKind::NoFunctionName);
    }
    let name_len = rest.bytes().take_while(u8::is_ascii_alphanumeric).count();
    if name_len > MAX_FUNCTION_NAME {
        return Err(ConfigErrorKind::FunctionNameTooLong(MAX_FUNCTION_NAME));
    }
    if &rest[name_len..] != "{" {
        return Err(ConfigErrorKind::FunctionHeaderSyntax);
    }
    Ok(Some(Block::Function { name: rest[..name_len].to_owned(), nofail }))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
