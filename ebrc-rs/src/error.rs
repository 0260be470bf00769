//! Error types.
//!
//! Configuration problems are reported as a [`ConfigError`] naming the file
//! and line; a failed load never terminates the process.  Function
//! invocations fail with a [`RunError`].

use std::path::PathBuf;

use thiserror::Error;

// ── ConfigError ───────────────────────────────────────────────────────────────

/// A fatal problem found while loading a configuration file.
#[derive(Debug, Error)]
#[error("{}: {kind}", location(.file, .line))]
pub struct ConfigError {
    /// Display name of the file (its final path component).
    pub file: String,
    /// 1-based line number, when the problem is tied to a line.
    pub line: Option<usize>,
    pub kind: ConfigErrorKind,
}

fn location(file: &str, line: &Option<usize>) -> String {
    match line {
        Some(n) => format!("{file} line {n}"),
        None => file.to_owned(),
    }
}

impl ConfigError {
    pub fn at(file: impl Into<String>, line: usize, kind: ConfigErrorKind) -> Self {
        Self { file: file.into(), line: Some(line), kind }
    }

    pub fn in_file(file: impl Into<String>, kind: ConfigErrorKind) -> Self {
        Self { file: file.into(), line: None, kind }
    }
}

/// What went wrong while loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigErrorKind {
    #[error("cannot read configuration file {path}: {source}")]
    Unreadable { path: PathBuf, source: std::io::Error },

    // -- preprocessing --------------------------------------------------------
    #[error("null byte in configuration text")]
    Nulls,
    #[error("function has no name")]
    NoFunctionName,
    #[error("function name is longer than {0} characters")]
    FunctionNameTooLong(usize),
    #[error("syntax error in function header")]
    FunctionHeaderSyntax,
    #[error("loop count is out of range")]
    LoopCount,

    // -- keywords and sections ------------------------------------------------
    #[error("unrecognized keyword {0}")]
    BadKeyword(String),
    #[error("keyword cannot appear inside a function")]
    KeywordInFunction,
    #[error("mail attribute {0} cannot appear outside a mail block")]
    MailAttrOutside(String),
    #[error("plugin attribute {0} cannot appear outside a plugin block")]
    PluginAttrOutside(String),
    #[error("table attribute {0} cannot appear outside a table block")]
    TableAttrOutside(String),
    #[error("keyword {0} cannot appear inside a mail block")]
    MailAttrInside(String),
    #[error("keyword {0} cannot appear inside a plugin block")]
    PluginAttrInside(String),
    #[error("keyword {0} cannot appear inside a table block")]
    TableAttrInside(String),
    #[error("keyword {0} has no value")]
    NoAttribute(String),

    // -- block structure ------------------------------------------------------
    #[error("unexpected closing brace")]
    UnexpectedBrace,
    #[error("unexpected else")]
    UnexpectedElse,
    #[error("garbled text outside of any block")]
    GarbledText,
    #[error("cannot start a block inside {0}")]
    BlockNotAllowed(&'static str),
    #[error("control statement outside of a function")]
    StatementOutsideFunction,
    #[error("blocks are nested too deeply")]
    TooDeeplyNested,
    #[error("function {0} is not closed")]
    FunctionNotClosed(String),
    #[error("{0} block is not closed")]
    BlockNotClosed(&'static str),

    // -- mail filters ---------------------------------------------------------
    #[error("filter line has no > to separate the match from the destination")]
    NoFilterTarget,
    #[error("filter line has no match string")]
    NoMatchString,
    #[error("filter match {0} has no destination")]
    NoDestination(String),

    // -- mail accounts --------------------------------------------------------
    #[error("too many mail accounts, limit {0}")]
    TooManyAccounts(usize),
    #[error("too many to/cc/bcc/attach entries, limit {0}")]
    TooManyRecipients(usize),
    #[error("more than one default mail account")]
    SeveralDefaults,
    #[error("mail account has no inserver")]
    NoInserver,
    #[error("mail account has no outserver")]
    NoOutserver,
    #[error("mail account has no login")]
    NoLogin,
    #[error("mail account has no password")]
    NoPassword,
    #[error("mail account has no from address")]
    NoFrom,
    #[error("mail account has no reply address")]
    NoReply,

    // -- plugins --------------------------------------------------------------
    #[error("too many plugins, limit {0}")]
    TooManyTypes(usize),
    #[error("outtype must be h or t")]
    BadOuttype,
    #[error("plugin has no type")]
    NoType,
    #[error("plugin has no description")]
    NoDescription,
    #[error("plugin needs a suffix, protocol, or content type")]
    NoSuffix,
    #[error("plugin has no program")]
    NoProgram,

    // -- tables ---------------------------------------------------------------
    #[error("too many tables, limit {0}")]
    TooManyTables(usize),
    #[error("too many columns, limit {0}")]
    TooManyColumns(usize),
    #[error("key column is not a number")]
    KeyNotNumber,
    #[error("key column out of range, the table has {0} columns")]
    KeyOutOfRange(usize),
    #[error("table has no name")]
    NoTableName,
    #[error("table has no short name")]
    NoShortName,
    #[error("table has no columns")]
    NoColumns,

    // -- global keywords ------------------------------------------------------
    #[error("{0} is not a directory")]
    NotDirectory(PathBuf),
    #[error("cannot create directory {path}: {source}")]
    CreateDirectory { path: PathBuf, source: std::io::Error },
    #[error("cookie jar {0} is not a regular file")]
    JarNotFile(PathBuf),
    #[error("cannot open cookie jar {path}: {source}")]
    JarNotWritable { path: PathBuf, source: std::io::Error },
    #[error("certificate file {0} is not a regular file")]
    CertNotFile(PathBuf),
    #[error("cannot read certificate file {path}: {source}")]
    CertNotReadable { path: PathBuf, source: std::io::Error },
    #[error("address book {0} is not a regular file")]
    AddressBookNotFile(PathBuf),
    #[error("emoji file {0} is not a regular file")]
    EmojiNotFile(PathBuf),
    #[error("too many user agents, limit {0}")]
    TooManyAgents(usize),
    #[error("no user agent at index {0}")]
    NoAgent(usize),
    #[error("agentsite needs a domain and an agent number")]
    MalformedAgentSite,
    #[error("domain {0} needs an interior dot")]
    DomainDot(String),
}

// ── RunError ──────────────────────────────────────────────────────────────────

/// Why a function invocation did not run to completion.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("no function specified")]
    NoFunction,
    #[error("bad function name {0}")]
    BadName(String),
    #[error("no such function {0}")]
    NotFound(String),
    #[error("no such argument {0}")]
    NoArgument(usize),
    #[error("interrupted")]
    Interrupted,
}

impl RunError {
    /// `true` when the function could not be located at all, as opposed to
    /// failing while it ran.
    pub fn is_not_found(&self) -> bool {
        matches!(self, RunError::NoFunction | RunError::BadName(_) | RunError::NotFound(_))
    }
}

// ── UrlError ──────────────────────────────────────────────────────────────────

/// A URL that could not be split into protocol and host.
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("cannot parse url {url}: {source}")]
    Parse { url: String, source: url::ParseError },
    #[error("url {0} has no host")]
    NoHost(String),
}

// ── Tests ─────────────────────────────────────────────────────────────────────
