//! `.ebrc` configuration loader.
//!
//! Consumes the encoded lines produced by [`crate::preprocess`] and builds a
//! [`Config`]: typed mail/plugin/table records, global settings, and the
//! ordered [`RuleTable`] (including function bodies).
//!
//! | Line | Action |
//! |------|--------|
//! | `KEY = VALUE` | apply a keyword in the current block |
//! | `default`, `secure`, `from_file`, ... | flag word inside a mail or plugin block |
//! | `MATCH > DEST` | redirect rule, inside a filter block |
//! | `include = FILE` | load FILE, then continue after this line |
//! | `function:NAME{` ... `}` | define a function |
//!
//! Every error aborts the load and names the file and line.  The one
//! exception is an include file that cannot be read or preprocessed, which
//! is logged, recorded in [`Config::warnings`] and skipped.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use directories::BaseDirs;
use regex::{Captures, Regex};

use crate::account::{DataSource, DbTable, MailAccount, MimeType};
use crate::error::{ConfigError, ConfigErrorKind};
use crate::keyword::{Keyword, KeywordClass};
use crate::preprocess::{self, Block, Line, LineKind};
use crate::rules::{FilterKind, Function, ProxyRoute, Rule, RuleTable};

/// Deepest block nesting, counting the function itself.
pub const MAX_NEST: usize = 20;
pub const MAX_ACCOUNTS: usize = 100;
pub const MAX_MIME: usize = 40;
pub const MAX_TABLES: usize = 100;
/// Agent slots, including the built-in agent in slot 0.
pub const MAX_AGENTS: usize = 10;

/// The built-in user agent, always in slot 0.
pub fn default_agent() -> String {
    format!("edbrowse/{}", env!("CARGO_PKG_VERSION"))
}

// ── Config ────────────────────────────────────────────────────────────────────

/// Everything a configuration file defines.
#[derive(Debug, Clone)]
pub struct Config {
    pub rules: RuleTable,
    pub accounts: Vec<MailAccount>,
    /// 1-based index of the default account, 0 when there are no accounts.
    pub default_account: usize,
    pub mime_types: Vec<MimeType>,
    pub tables: Vec<DbTable>,
    /// User agents; slot 0 is [`default_agent`].
    pub agents: Vec<String>,
    pub down_dir: Option<PathBuf>,
    pub mail_dir: Option<PathBuf>,
    pub mail_unread: Option<PathBuf>,
    pub mail_reply: Option<PathBuf>,
    pub cookie_jar: Option<PathBuf>,
    pub cache_dir: Option<PathBuf>,
    pub cert_file: Option<PathBuf>,
    pub address_book: Option<PathBuf>,
    pub emoji_file: Option<PathBuf>,
    /// Seconds; 0 means the built-in default.
    pub web_timeout: u32,
    pub mail_timeout: u32,
    pub data_source: Option<DataSource>,
    pub localize_web: Option<String>,
    pub envelope: Option<String>,
    pub imap_fetch: usize,
    pub cache_size: usize,
    /// Include files that were skipped.
    pub warnings: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rules: RuleTable::new(),
            accounts: Vec::new(),
            default_account: 0,
            mime_types: Vec::new(),
            tables: Vec::new(),
            agents: vec![default_agent()],
            down_dir: None,
            mail_dir: None,
            mail_unread: None,
            mail_reply: None,
            cookie_jar: None,
            cache_dir: None,
            cert_file: None,
            address_book: None,
            emoji_file: None,
            web_timeout: 0,
            mail_timeout: 0,
            data_source: None,
            localize_web: None,
            envelope: None,
            imap_fetch: 100,
            cache_size: 1000,
            warnings: Vec::new(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read and load a configuration file from disk.
    pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let root = FileContext::open(path)?;
        log::info!("loading configuration from {}", path.display());
        Loader::default().run(root)
    }

    /// Load configuration text.  `name` is used in diagnostics; relative
    /// include paths are taken from the current directory.
    pub fn load_str(src: &str, name: &str) -> Result<Self, ConfigError> {
        let root = FileContext::new(name.to_owned(), None, src)?;
        Loader::default().run(root)
    }

    /// The default mail account, if any accounts are defined.
    pub fn default_account(&self) -> Option<&MailAccount> {
        self.default_account.checked_sub(1).and_then(|i| self.accounts.get(i))
    }

    /// Table descriptor by short name.
    pub fn find_table(&self, short: &str) -> Option<&DbTable> {
        self.tables.iter().find(|t| t.short.as_deref() == Some(short))
    }

    /// Add a descriptor for a table that is not in the configuration, with
    /// `name` as both its name and short name.
    pub fn new_table(&mut self, name: &str) -> Result<&mut DbTable, ConfigErrorKind> {
        if self.tables.len() == MAX_TABLES {
            return Err(ConfigErrorKind::TooManyTables(MAX_TABLES));
        }
        self.tables.push(DbTable {
            name: Some(name.to_owned()),
            short: Some(name.to_owned()),
            ..DbTable::default()
        });
        let last = self.tables.len() - 1;
        Ok(&mut self.tables[last])
    }
}

// ── File contexts ─────────────────────────────────────────────────────────────

/// One file being loaded: the root file or an include.
struct FileContext {
    name: String,
    path: Option<PathBuf>,
    lines: Vec<Line>,
    cursor: usize,
}

impl FileContext {
    fn new(name: String, path: Option<PathBuf>, src: &str) -> Result<Self, ConfigError> {
        let lines = preprocess::encode(src, &name)?;
        Ok(Self { name, path, lines, cursor: 0 })
    }

    fn open(path: &Path) -> Result<Self, ConfigError> {
        let name = display_name(path);
        let bytes = fs::read(path).map_err(|source| {
            ConfigError::in_file(&name, ConfigErrorKind::Unreadable { path: path.to_owned(), source })
        })?;
        Self::new(name, Some(path.to_owned()), &String::from_utf8_lossy(&bytes))
    }

    fn dir(&self) -> Option<&Path> {
        self.path.as_deref().and_then(Path::parent)
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

// ── Loader ────────────────────────────────────────────────────────────────────

/// The block currently open outside of any function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Section {
    #[default]
    Top,
    Mail,
    Plugin,
    Table,
    Filter(FilterKind),
}

impl Section {
    fn describe(self) -> &'static str {
        match self {
            Section::Top => "the top level",
            Section::Mail => "a mail descriptor",
            Section::Plugin => "a plugin descriptor",
            Section::Table => "a table descriptor",
            Section::Filter(_) => "a filter block",
        }
    }
}

/// A function whose closing brace has not been seen yet.
struct OpenFunction {
    name: String,
    nofail: bool,
    file: String,
    line: usize,
    body: Vec<Line>,
    /// Control blocks open inside the body.
    nest: Vec<Block>,
}

#[derive(Default)]
struct Loader {
    config: Config,
    stack: Vec<FileContext>,
    section: Section,
    mail: MailAccount,
    mime: MimeType,
    table: DbTable,
    function: Option<OpenFunction>,
}

impl Loader {
    fn run(mut self, root: FileContext) -> Result<Config, ConfigError> {
        let root_name = root.name.clone();
        self.stack.push(root);

        while let Some(ctx) = self.stack.last_mut() {
            let Some(line) = ctx.lines.get(ctx.cursor).cloned() else {
                self.stack.pop();
                continue;
            };
            ctx.cursor += 1;
            let number = line.number;
            self.line(line).map_err(|kind| {
                let file = self.stack.last().map(|c| c.name.clone()).unwrap_or_default();
                ConfigError::at(file, number, kind)
            })?;
        }
        self.end_of_input(root_name)?;

        let mut config = self.config;
        if !config.accounts.is_empty() && config.default_account == 0 {
            config.default_account = 1;
        }
        log::info!(
            "configuration loaded: {} rules, {} functions, {} mail accounts",
            config.rules.len(),
            config.rules.functions().count(),
            config.accounts.len()
        );
        Ok(config)
    }

    /// A block may be opened in an include and closed by the file that
    /// included it, so open blocks are only checked once every file is
    /// exhausted.
    fn end_of_input(&self, file: String) -> Result<(), ConfigError> {
        if let Some(f) = &self.function {
            return Err(ConfigError::in_file(file, ConfigErrorKind::FunctionNotClosed(f.name.clone())));
        }
        if self.section != Section::Top {
            let kind = ConfigErrorKind::BlockNotClosed(self.section.describe());
            return Err(ConfigError::in_file(file, kind));
        }
        Ok(())
    }

    fn line(&mut self, line: Line) -> Result<(), ConfigErrorKind> {
        if self.function.is_some() {
            return self.function_line(line);
        }
        if let Section::Filter(kind) = self.section {
            return self.filter_line(kind, line);
        }

        match line.kind {
            LineKind::Text(text) => self.text(&text),
            LineKind::Open(block) => self.open(block, line.number),
            LineKind::Else => Err(ConfigErrorKind::UnexpectedElse),
            LineKind::Close => self.close(),
        }
    }

    // -- functions ------------------------------------------------------------

    fn function_line(&mut self, line: Line) -> Result<(), ConfigErrorKind> {
        let Some(func) = self.function.as_mut() else { return Ok(()) };

        match &line.kind {
            LineKind::Text(text) => {
                if let Some((key, _)) = key_value(text) {
                    if key.parse::<Keyword>().is_ok() {
                        return Err(ConfigErrorKind::KeywordInFunction);
                    }
                }
            }
            LineKind::Open(block) if block.is_section() => {
                return Err(ConfigErrorKind::BlockNotAllowed("another function"));
            }
            LineKind::Open(block) => {
                if func.nest.len() + 2 >= MAX_NEST {
                    return Err(ConfigErrorKind::TooDeeplyNested);
                }
                func.nest.push(block.clone());
            }
            LineKind::Else => {
                if !matches!(func.nest.last(), Some(Block::If { .. })) {
                    return Err(ConfigErrorKind::UnexpectedElse);
                }
            }
            LineKind::Close => {
                if func.nest.pop().is_none() {
                    let Some(done) = self.function.take() else { return Ok(()) };
                    log::debug!("function {} defined with {} lines", done.name, done.body.len());
                    self.config.rules.push(Rule::Function(Arc::new(Function {
                        name: done.name,
                        nofail: done.nofail,
                        body: done.body.into(),
                        file: done.file,
                        line: done.line,
                    })));
                    return Ok(());
                }
            }
        }
        func.body.push(line);
        Ok(())
    }

    // -- filter blocks --------------------------------------------------------

    fn filter_line(&mut self, filter: FilterKind, line: Line) -> Result<(), ConfigErrorKind> {
        match line.kind {
            LineKind::Text(text) => {
                let (pattern, destination) =
                    text.split_once('>').ok_or(ConfigErrorKind::NoFilterTarget)?;
                let pattern = pattern.trim_end();
                if pattern.is_empty() {
                    return Err(ConfigErrorKind::NoMatchString);
                }
                let destination = destination.trim();
                if destination.is_empty() {
                    return Err(ConfigErrorKind::NoDestination(pattern.to_owned()));
                }
                self.config.rules.push(Rule::Redirect {
                    filter,
                    pattern: pattern.to_owned(),
                    destination: destination.to_owned(),
                });
                Ok(())
            }
            LineKind::Close => {
                self.section = Section::Top;
                Ok(())
            }
            LineKind::Open(block) if block.is_section() => {
                Err(ConfigErrorKind::BlockNotAllowed(self.section.describe()))
            }
            LineKind::Open(_) => Err(ConfigErrorKind::StatementOutsideFunction),
            LineKind::Else => Err(ConfigErrorKind::UnexpectedElse),
        }
    }

    // -- blocks ---------------------------------------------------------------

    fn open(&mut self, block: Block, number: usize) -> Result<(), ConfigErrorKind> {
        if !block.is_section() {
            return Err(ConfigErrorKind::StatementOutsideFunction);
        }
        if self.section != Section::Top {
            return Err(ConfigErrorKind::BlockNotAllowed(self.section.describe()));
        }

        self.section = match block {
            Block::Mail => {
                if self.config.accounts.len() == MAX_ACCOUNTS {
                    return Err(ConfigErrorKind::TooManyAccounts(MAX_ACCOUNTS));
                }
                self.mail = MailAccount::default();
                Section::Mail
            }
            Block::Plugin => {
                if self.config.mime_types.len() == MAX_MIME {
                    return Err(ConfigErrorKind::TooManyTypes(MAX_MIME));
                }
                self.mime = MimeType::default();
                Section::Plugin
            }
            Block::Table => {
                if self.config.tables.len() == MAX_TABLES {
                    return Err(ConfigErrorKind::TooManyTables(MAX_TABLES));
                }
                self.table = DbTable::default();
                Section::Table
            }
            Block::FromFilter => Section::Filter(FilterKind::From),
            Block::ToFilter => Section::Filter(FilterKind::To),
            Block::SubjFilter => Section::Filter(FilterKind::Subject),
            Block::Function { name, nofail } => {
                let file = self.stack.last().map(|c| c.name.clone()).unwrap_or_default();
                self.function = Some(OpenFunction {
                    name,
                    nofail,
                    file,
                    line: number,
                    body: Vec::new(),
                    nest: Vec::new(),
                });
                Section::Top
            }
            Block::If { .. } | Block::While { .. } | Block::Until { .. } | Block::Loop(_) => {
                return Err(ConfigErrorKind::StatementOutsideFunction)
            }
        };
        Ok(())
    }

    fn close(&mut self) -> Result<(), ConfigErrorKind> {
        match std::mem::take(&mut self.section) {
            Section::Top => return Err(ConfigErrorKind::UnexpectedBrace),
            Section::Mail => {
                let mut account = std::mem::take(&mut self.mail);
                account.finish()?;
                self.config.accounts.push(account);
            }
            Section::Plugin => {
                let mime = std::mem::take(&mut self.mime);
                mime.finish()?;
                self.config.mime_types.push(mime);
            }
            Section::Table => {
                let table = std::mem::take(&mut self.table);
                table.finish()?;
                self.config.tables.push(table);
            }
            Section::Filter(_) => {}
        }
        Ok(())
    }

    // -- keywords -------------------------------------------------------------

    fn text(&mut self, text: &str) -> Result<(), ConfigErrorKind> {
        if let Some((key, value)) = key_value(text) {
            let keyword = key
                .parse::<Keyword>()
                .map_err(|_| ConfigErrorKind::BadKeyword(key.to_owned()))?;
            return self.keyword(keyword, value);
        }

        let word = text.trim_end();
        let known = match self.section {
            Section::Mail if word == "default" => {
                let index = self.config.accounts.len() + 1;
                if self.config.default_account != 0 && self.config.default_account != index {
                    return Err(ConfigErrorKind::SeveralDefaults);
                }
                self.config.default_account = index;
                true
            }
            Section::Mail => self.mail.flag(word),
            Section::Plugin => self.mime.flag(word),
            _ => false,
        };
        if known {
            Ok(())
        } else {
            Err(ConfigErrorKind::GarbledText)
        }
    }

    fn keyword(&mut self, keyword: Keyword, value: &str) -> Result<(), ConfigErrorKind> {
        let name = || keyword.name().to_owned();
        match (keyword.class(), self.section) {
            (KeywordClass::Mail, Section::Mail)
            | (KeywordClass::Plugin, Section::Plugin)
            | (KeywordClass::Table, Section::Table)
            | (KeywordClass::Global, Section::Top) => {}
            (KeywordClass::Mail, _) => return Err(ConfigErrorKind::MailAttrOutside(name())),
            (KeywordClass::Plugin, _) => return Err(ConfigErrorKind::PluginAttrOutside(name())),
            (KeywordClass::Table, _) => return Err(ConfigErrorKind::TableAttrOutside(name())),
            (KeywordClass::Global, Section::Plugin) => {
                return Err(ConfigErrorKind::PluginAttrInside(name()))
            }
            (KeywordClass::Global, Section::Table) => {
                return Err(ConfigErrorKind::TableAttrInside(name()))
            }
            (KeywordClass::Global, _) => return Err(ConfigErrorKind::MailAttrInside(name())),
        }
        if value.is_empty() {
            return Err(ConfigErrorKind::NoAttribute(name()));
        }

        match keyword.class() {
            KeywordClass::Mail => self.mail.set(keyword, value),
            KeywordClass::Plugin => self.mime.set(keyword, value),
            KeywordClass::Table => self.table.set(keyword, value),
            KeywordClass::Global => self.global(keyword, value),
        }
    }

    fn global(&mut self, keyword: Keyword, value: &str) -> Result<(), ConfigErrorKind> {
        let config = &mut self.config;
        match keyword {
            Keyword::DownDir => {
                let path = expand_path(value);
                if !path.is_dir() {
                    return Err(ConfigErrorKind::NotDirectory(path));
                }
                config.down_dir = Some(path);
            }
            Keyword::MailDir => {
                let path = expand_path(value);
                if !path.is_dir() {
                    return Err(ConfigErrorKind::NotDirectory(path));
                }
                let unread = path.join("unread");
                if !unread.is_dir() {
                    fs::create_dir(&unread).map_err(|source| ConfigErrorKind::CreateDirectory {
                        path: unread.clone(),
                        source,
                    })?;
                }
                config.mail_reply = Some(path.join(".reply"));
                config.mail_unread = Some(unread);
                config.mail_dir = Some(path);
            }
            Keyword::Agent => {
                if config.agents.len() == MAX_AGENTS {
                    return Err(ConfigErrorKind::TooManyAgents(MAX_AGENTS));
                }
                config.agents.push(value.to_owned());
            }
            Keyword::Jar => {
                let path = expand_path(value);
                if path.exists() && !path.is_file() {
                    return Err(ConfigErrorKind::JarNotFile(path));
                }
                OpenOptions::new()
                    .append(true)
                    .create(true)
                    .open(&path)
                    .map_err(|source| ConfigErrorKind::JarNotWritable { path: path.clone(), source })?;
                config.cookie_jar = Some(path);
            }
            Keyword::NoJs => config.rules.push(Rule::NoJs(dotted_domain(value)?)),
            Keyword::NoVs => config.rules.push(Rule::NoVerify(dotted_domain(value)?)),
            Keyword::CacheDir => config.cache_dir = Some(expand_path(value)),
            Keyword::WebTimer => config.web_timeout = atoi(value).clamp(0, u32::MAX as i64) as u32,
            Keyword::MailTimer => config.mail_timeout = atoi(value).clamp(0, u32::MAX as i64) as u32,
            Keyword::CertFile => {
                let path = expand_path(value);
                if path.exists() && !path.is_file() {
                    return Err(ConfigErrorKind::CertNotFile(path));
                }
                fs::File::open(&path)
                    .map_err(|source| ConfigErrorKind::CertNotReadable { path: path.clone(), source })?;
                config.cert_file = Some(path);
            }
            Keyword::DataSource => config.data_source = Some(DataSource::parse(value)),
            Keyword::Proxy => config.rules.push(Rule::Proxy(ProxyRoute::parse(value))),
            Keyword::AgentSite => {
                let words: Vec<&str> = value.split_whitespace().collect();
                let [pattern, index] = words.as_slice() else {
                    return Err(ConfigErrorKind::MalformedAgentSite);
                };
                let agent: usize = index.parse().map_err(|_| ConfigErrorKind::MalformedAgentSite)?;
                if agent >= config.agents.len() {
                    return Err(ConfigErrorKind::NoAgent(agent));
                }
                config.rules.push(Rule::AgentSite { pattern: (*pattern).to_owned(), agent });
            }
            Keyword::LocalizeWeb => config.localize_web = Some(value.to_owned()),
            Keyword::ImapFetch => config.imap_fetch = atoi(value).clamp(10, 1000) as usize,
            Keyword::CacheSize => config.cache_size = atoi(value).clamp(0, 10000) as usize,
            Keyword::AdBook => {
                let path = expand_path(value);
                if !path.is_file() {
                    return Err(ConfigErrorKind::AddressBookNotFile(path));
                }
                config.address_book = Some(path);
            }
            Keyword::Envelope => config.envelope = Some(value.to_owned()),
            Keyword::Emojis | Keyword::Emoji => {
                let path = expand_path(value);
                if !path.is_file() {
                    return Err(ConfigErrorKind::EmojiNotFile(path));
                }
                config.emoji_file = Some(path);
            }
            Keyword::Include => self.include(value),
            other => return Err(ConfigErrorKind::BadKeyword(other.name().to_owned())),
        }
        Ok(())
    }

    /// Push an include file; the current file resumes on the next line when
    /// it is exhausted.
    fn include(&mut self, value: &str) {
        let mut path = expand_path(value);
        if path.is_relative() {
            if let Some(dir) = self.stack.last().and_then(FileContext::dir) {
                path = dir.join(path);
            }
        }

        let canonical = fs::canonicalize(&path).ok();
        let cycle = canonical.is_some()
            && self
                .stack
                .iter()
                .any(|c| c.path.as_deref().and_then(|p| fs::canonicalize(p).ok()) == canonical);
        if cycle {
            self.warn(format!("{} is already being loaded, include skipped", path.display()));
            return;
        }

        match FileContext::open(&path) {
            Ok(ctx) => {
                log::debug!("including {}", path.display());
                self.stack.push(ctx);
            }
            Err(e) => self.warn(format!("include skipped: {e}")),
        }
    }

    fn warn(&mut self, message: String) {
        log::warn!("{message}");
        self.config.warnings.push(message);
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Split `KEY = VALUE` where KEY is purely alphabetic.
fn key_value(text: &str) -> Option<(&str, &str)> {
    let (key, value) = text.split_once('=')?;
    let key = key.trim_end_matches([' ', '\t']);
    if key.is_empty() || !key.bytes().all(|b| b.is_ascii_alphabetic()) {
        return None;
    }
    Some((key, value.trim()))
}

/// Domain for `nojs`/`novs`: leading dot dropped, a dot required before
/// the last character.
fn dotted_domain(value: &str) -> Result<String, ConfigErrorKind> {
    let domain = value.strip_prefix('.').unwrap_or(value);
    match domain.find('.') {
        Some(i) if i + 1 < domain.len() => Ok(domain.to_owned()),
        _ => Err(ConfigErrorKind::DomainDot(domain.to_owned())),
    }
}

/// Leading integer of `s`, like C `atoi`: 0 when there is none.
fn atoi(s: &str) -> i64 {
    let s = s.trim_start();
    let (sign, digits) = match s.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, s.strip_prefix('+').unwrap_or(s)),
    };
    let end = digits.bytes().take_while(u8::is_ascii_digit).count();
    digits[..end].parse::<i64>().map(|n| sign * n).unwrap_or(0)
}

fn env_var_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}|\$([A-Za-z_][A-Za-z0-9_]*)").expect("static regex")
    })
}

/// Expand `$VAR`, `${VAR}` and a leading `~` in a file name.  Unset
/// variables expand to nothing.
pub fn expand_path(value: &str) -> PathBuf {
    let expanded = env_var_re().replace_all(value, |caps: &Captures| {
        let name = caps.get(1).or_else(|| caps.get(2)).map_or("", |m| m.as_str());
        std::env::var(name).unwrap_or_default()
    });

    let home = || BaseDirs::new().map(|b| b.home_dir().to_owned());
    if expanded == "~" {
        if let Some(home) = home() {
            return home;
        }
    }
    if let Some(rest) = expanded.strip_prefix("~/") {
        if let Some(home) = home() {
            return home.join(rest);
        }
    }
    PathBuf::from(expanded.into_owned())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn load(src: &str) -> Config {
        Config::load_str(src, "test.ebrc").unwrap()
    }

    fn fail(src: &str) -> ConfigError {
        Config::load_str(src, "test.ebrc").unwrap_err()
    }

    const MAIL: &str = "mail{\ninserver=in.x.org\noutserver=out.x.org\nlogin=me\npassword=pw\n\
                        from=Me\nreply=me@x.org\n";

    #[test]
    fn key_value_split() {
        assert_eq!(key_value("agent = lynx 2.8 "), Some(("agent", "lynx 2.8")));
        assert_eq!(key_value("program=cat %i x=y"), Some(("program", "cat %i x=y")));
        assert_eq!(key_value("a1=b"), None);
        assert_eq!(key_value("=b"), None);
        assert_eq!(key_value("echo hi"), None);
    }

    #[test]
    fn atoi_like_c() {
        assert_eq!(atoi("42abc"), 42);
        assert_eq!(atoi("-7"), -7);
        assert_eq!(atoi("x"), 0);
    }

    #[test]
    fn agents_and_agentsite() {
        let c = load("agent=lynx\nagent=mozilla\nagentsite=bank.com 2\n");
        assert_eq!(c.agents.len(), 3);
        assert!(c.agents[0].starts_with("edbrowse/"));
        assert_eq!(c.rules.agent_for("http://www.bank.com/"), Some(2));

        assert!(matches!(fail("agentsite=bank.com 1\n").kind, ConfigErrorKind::NoAgent(1)));
        assert!(matches!(fail("agentsite=bank.com\n").kind, ConfigErrorKind::MalformedAgentSite));
    }

    #[test]
    fn too_many_agents() {
        let src: String = (0..MAX_AGENTS).map(|i| format!("agent=a{i}\n")).collect();
        let e = fail(&src);
        assert!(matches!(e.kind, ConfigErrorKind::TooManyAgents(MAX_AGENTS)));
        assert_eq!(e.line, Some(MAX_AGENTS));
    }

    #[test]
    fn numeric_globals_are_clamped() {
        let c = load("imapfetch=3\ncachesize=-5\nwebtimer=30\n");
        assert_eq!((c.imap_fetch, c.cache_size, c.web_timeout), (10, 0, 30));
        let c = load("imapfetch=5000\ncachesize=99999\n");
        assert_eq!((c.imap_fetch, c.cache_size), (1000, 10000));
    }

    #[test]
    fn nojs_needs_interior_dot() {
        let c = load("nojs=.ads.example.\n");
        assert!(c.rules.suppresses_js("http://tracker.ads.example.com/"));
        assert!(matches!(fail("nojs=localhost\n").kind, ConfigErrorKind::DomainDot(_)));
        assert!(matches!(fail("novs=com.\n").kind, ConfigErrorKind::DomainDot(_)));
    }

    #[test]
    fn mail_account_closes() {
        let c = load(&format!("{MAIL}imap\nsecure\n}}\n"));
        assert_eq!(c.accounts.len(), 1);
        assert_eq!(c.default_account, 1);
        assert_eq!(c.accounts[0].inport, 993);
    }

    #[test]
    fn mail_missing_reply_reports_close_line() {
        let e = fail("mail{\ninserver=a\noutserver=b\nlogin=c\npassword=d\nfrom=e\n}\n");
        assert!(matches!(e.kind, ConfigErrorKind::NoReply));
        assert_eq!(e.line, Some(7));
    }

    #[test]
    fn explicit_default_account() {
        let c = load(&format!("{MAIL}}}\n{MAIL}default\n}}\n"));
        assert_eq!(c.default_account, 2);
        assert_eq!(c.default_account().and_then(|a| a.reply.as_deref()), Some("me@x.org"));

        let e = fail(&format!("{MAIL}default\n}}\n{MAIL}default\n}}\n"));
        assert!(matches!(e.kind, ConfigErrorKind::SeveralDefaults));
    }

    #[test]
    fn keyword_scope_errors() {
        assert!(matches!(fail("login=me\n").kind, ConfigErrorKind::MailAttrOutside(_)));
        assert!(matches!(fail("program=x\n").kind, ConfigErrorKind::PluginAttrOutside(_)));
        assert!(matches!(fail("cols=a,b\n").kind, ConfigErrorKind::TableAttrOutside(_)));
        assert!(matches!(fail("mail{\nagent=x\n").kind, ConfigErrorKind::MailAttrInside(_)));
        assert!(matches!(fail("plugin{\nlogin=x\n").kind, ConfigErrorKind::MailAttrOutside(_)));
        assert!(matches!(fail("plugin{\nnojs=a.b\n").kind, ConfigErrorKind::PluginAttrInside(_)));
        assert!(matches!(fail("table{\ntype=x\n").kind, ConfigErrorKind::PluginAttrOutside(_)));
        assert!(matches!(fail("table{\nproxy=x\n").kind, ConfigErrorKind::TableAttrInside(_)));
        assert!(matches!(fail("colour=blue\n").kind, ConfigErrorKind::BadKeyword(_)));
        assert!(matches!(fail("agent=\n").kind, ConfigErrorKind::NoAttribute(_)));
    }

    #[test]
    fn structural_errors() {
        assert!(matches!(fail("}\n").kind, ConfigErrorKind::UnexpectedBrace));
        assert!(matches!(fail("}else{\n").kind, ConfigErrorKind::UnexpectedElse));
        assert!(matches!(fail("hello world\n").kind, ConfigErrorKind::GarbledText));
        assert!(matches!(fail("if(*){\n").kind, ConfigErrorKind::StatementOutsideFunction));
        assert!(matches!(
            fail("mail{\nfunction:x{\n").kind,
            ConfigErrorKind::BlockNotAllowed("a mail descriptor")
        ));
        assert!(matches!(
            fail("function:a{\ntable{\n").kind,
            ConfigErrorKind::BlockNotAllowed("another function")
        ));
        assert!(matches!(fail("plugin{\n").kind, ConfigErrorKind::BlockNotClosed(_)));
        assert!(matches!(fail("function:go{\necho\n").kind, ConfigErrorKind::FunctionNotClosed(ref n) if n == "go"));
    }

    #[test]
    fn function_body_rules() {
        let c = load("function:go{\nx=y\nif(*){\necho a\n}else{\necho b\n}\n}\n");
        let f = c.rules.function("GO").unwrap();
        assert_eq!(f.body.len(), 6);
        assert_eq!(f.line, 1);
        assert_eq!(f.body[0], Line::text(2, "x=y"));

        assert!(matches!(fail("function:go{\nagent=x\n}\n").kind, ConfigErrorKind::KeywordInFunction));
        assert!(matches!(fail("function:go{\nloop(2){\n}else{\n}\n}\n").kind, ConfigErrorKind::UnexpectedElse));
    }

    #[test]
    fn nesting_limit() {
        let ok = format!("function:deep{{\n{}{}}}\n", "if(*){\n".repeat(18), "}\n".repeat(18));
        load(&ok);
        let bad = format!("function:deep{{\n{}", "if(*){\n".repeat(19));
        assert!(matches!(fail(&bad).kind, ConfigErrorKind::TooDeeplyNested));
    }

    #[test]
    fn filter_blocks() {
        let c = load("fromfilter{\nboss@work.com > work\n}\nsubjfilter{\nsale>spam\n}\n");
        assert_eq!(c.rules.redirect("me", "boss@work.com", "", "x"), Some("work"));
        assert_eq!(c.rules.redirect("me", "a@b", "", "Sale"), Some("spam"));

        assert!(matches!(fail("tofilter{\nnoarrow\n").kind, ConfigErrorKind::NoFilterTarget));
        assert!(matches!(fail("tofilter{\n > x\n").kind, ConfigErrorKind::NoMatchString));
        assert!(matches!(fail("tofilter{\na@b >  \n").kind, ConfigErrorKind::NoDestination(_)));
    }

    #[test]
    fn tables_and_runtime_descriptors() {
        let mut c = load("table{\ntname=customers\ntshort=cust\ncols=id,name\nkeycol=1\n}\n");
        assert_eq!(c.find_table("cust").map(|t| t.cols.len()), Some(2));
        assert!(c.find_table("customers").is_none());
        c.new_table("orders").unwrap();
        assert!(c.find_table("orders").is_some());
    }

    #[test]
    fn plugin_flags() {
        let c = load("plugin{\ntype=pdf\ndesc=pdf file\nsuffix=pdf\nprogram=pdftotext %i -\n\
                      from_file\nouttype=t\n}\n");
        assert!(c.mime_types[0].from_file);
    }

    #[test]
    fn unreadable_include_is_skipped() {
        let c = load("include=/nonexistent/ebrc/extra\nagent=after\n");
        assert_eq!(c.warnings.len(), 1);
        assert_eq!(c.agents.last().map(String::as_str), Some("after"));
    }

    #[test]
    fn expand_env_vars() {
        std::env::set_var("EBRC_TEST_DIR", "/tmp/ebrc");
        assert_eq!(expand_path("$EBRC_TEST_DIR/jar"), PathBuf::from("/tmp/ebrc/jar"));
        assert_eq!(expand_path("${EBRC_TEST_DIR}x"), PathBuf::from("/tmp/ebrcx"));
        assert_eq!(expand_path("/plain"), PathBuf::from("/plain"));
    }
}
