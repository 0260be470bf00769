//! Typed records built from `mail{`, `plugin{` and `table{` blocks.
//!
//! Each record is filled one attribute at a time while its block is open and
//! checked for mandatory fields when the block closes.

use crate::error::ConfigErrorKind;
use crate::keyword::Keyword;

/// Most to/cc/bcc/attach entries on one account.
pub const MAX_CC: usize = 10;
/// Most columns in one table descriptor.
pub const MAX_TABLE_COLS: usize = 40;

// ── Mail accounts ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CcKind {
    To,
    Cc,
    Bcc,
    Attach,
}

/// One automatic recipient or attachment of outgoing mail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CcEntry {
    pub kind: CcKind,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MailAccount {
    pub inserver: Option<String>,
    pub outserver: Option<String>,
    pub login: Option<String>,
    pub password: Option<String>,
    pub from: Option<String>,
    pub reply: Option<String>,
    pub inport: u16,
    pub outport: u16,
    pub in_ssl: bool,
    /// 0 plain, 1 implicit TLS (`*`), 2 (`^`), 4 (`+`).
    pub out_ssl: u8,
    pub cc: Vec<CcEntry>,
    pub secure: bool,
    pub imap: bool,
    pub nofetch: bool,
}

impl MailAccount {
    /// Apply one `key=value` attribute.
    pub fn set(&mut self, key: Keyword, value: &str) -> Result<(), ConfigErrorKind> {
        let value = value.to_owned();
        match key {
            Keyword::InServer => self.inserver = Some(value),
            Keyword::OutServer => self.outserver = Some(value),
            Keyword::Login => self.login = Some(value),
            Keyword::Password => self.password = Some(value),
            Keyword::From => self.from = Some(value),
            Keyword::Reply => self.reply = Some(value),
            Keyword::InPort => {
                let port = match value.strip_prefix('*') {
                    Some(rest) => {
                        self.in_ssl = true;
                        rest
                    }
                    None => &value,
                };
                self.inport = leading_number(port);
            }
            Keyword::OutPort => {
                let mut port = value.as_str();
                for (prefix, level) in [('+', 4), ('^', 2), ('*', 1)] {
                    if let Some(rest) = port.strip_prefix(prefix) {
                        self.out_ssl = level;
                        port = rest;
                    }
                }
                self.outport = leading_number(port);
            }
            Keyword::To | Keyword::Cc | Keyword::Bcc | Keyword::Attach => {
                if self.cc.len() == MAX_CC {
                    return Err(ConfigErrorKind::TooManyRecipients(MAX_CC));
                }
                let kind = match key {
                    Keyword::To => CcKind::To,
                    Keyword::Cc => CcKind::Cc,
                    Keyword::Bcc => CcKind::Bcc,
                    _ => CcKind::Attach,
                };
                self.cc.push(CcEntry { kind, value });
            }
            other => return Err(ConfigErrorKind::MailAttrInside(other.name().to_owned())),
        }
        Ok(())
    }

    /// Apply a bare flag word.  Returns `false` if `word` is not a mail flag.
    pub fn flag(&mut self, word: &str) -> bool {
        match word {
            "nofetch" => self.nofetch = true,
            "secure" => self.secure = true,
            "imap" => {
                self.imap = true;
                self.nofetch = true;
            }
            _ => return false,
        }
        true
    }

    /// Check mandatory fields and fill in default ports.
    pub fn finish(&mut self) -> Result<(), ConfigErrorKind> {
        let required = [
            (self.inserver.is_none(), ConfigErrorKind::NoInserver),
            (self.outserver.is_none(), ConfigErrorKind::NoOutserver),
            (self.login.is_none(), ConfigErrorKind::NoLogin),
            (self.password.is_none(), ConfigErrorKind::NoPassword),
            (self.from.is_none(), ConfigErrorKind::NoFrom),
            (self.reply.is_none(), ConfigErrorKind::NoReply),
        ];
        if let Some((_, kind)) = required.into_iter().find(|(missing, _)| *missing) {
            return Err(kind);
        }

        if self.secure {
            self.in_ssl = true;
            self.out_ssl = 1;
        }
        if self.inport == 0 {
            self.inport = match (self.secure, self.imap) {
                (true, true) => 993,
                (true, false) => 995,
                (false, true) => 143,
                (false, false) => 110,
            };
        }
        if self.outport == 0 {
            self.outport = if self.secure { 465 } else { 25 };
        }
        Ok(())
    }
}

/// Decimal digits at the start of `s`, or 0.
fn leading_number(s: &str) -> u16 {
    let digits: &str = &s[..s.bytes().take_while(u8::is_ascii_digit).count()];
    digits.parse().unwrap_or(0)
}

// ── Plugins ───────────────────────────────────────────────────────────────────

/// What a plugin writes to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutType {
    Html,
    Text,
}

/// A `plugin{` (or `mime{`) descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MimeType {
    pub mime_type: Option<String>,
    pub desc: Option<String>,
    pub suffix: Option<String>,
    pub protocol: Option<String>,
    pub program: Option<String>,
    pub content: Option<String>,
    pub outtype: Option<OutType>,
    pub urlmatch: Option<String>,
    pub from_file: bool,
    pub down_url: bool,
}

impl MimeType {
    pub fn set(&mut self, key: Keyword, value: &str) -> Result<(), ConfigErrorKind> {
        let value = value.to_owned();
        match key {
            Keyword::Type => self.mime_type = Some(value),
            Keyword::Desc => self.desc = Some(value),
            Keyword::Suffix => self.suffix = Some(value),
            Keyword::Protocol => self.protocol = Some(value),
            Keyword::Program => self.program = Some(value),
            Keyword::Content => self.content = Some(value),
            Keyword::OutType => {
                self.outtype = match value.chars().next().map(|c| c.to_ascii_lowercase()) {
                    Some('h') => Some(OutType::Html),
                    Some('t') => Some(OutType::Text),
                    _ => return Err(ConfigErrorKind::BadOuttype),
                };
            }
            Keyword::UrlMatch => self.urlmatch = Some(value),
            other => return Err(ConfigErrorKind::PluginAttrInside(other.name().to_owned())),
        }
        Ok(())
    }

    pub fn flag(&mut self, word: &str) -> bool {
        match word {
            "from_file" => self.from_file = true,
            "down_url" => self.down_url = true,
            _ => return false,
        }
        true
    }

    pub fn finish(&self) -> Result<(), ConfigErrorKind> {
        if self.mime_type.is_none() {
            return Err(ConfigErrorKind::NoType);
        }
        if self.desc.is_none() {
            return Err(ConfigErrorKind::NoDescription);
        }
        if self.suffix.is_none() && self.protocol.is_none() && self.content.is_none() {
            return Err(ConfigErrorKind::NoSuffix);
        }
        if self.program.is_none() {
            return Err(ConfigErrorKind::NoProgram);
        }
        Ok(())
    }
}

// ── Tables ────────────────────────────────────────────────────────────────────

/// A `table{` descriptor for the database browser.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DbTable {
    pub name: Option<String>,
    pub short: Option<String>,
    pub cols: Vec<String>,
    /// 1-based key column; 0 when unset.
    pub key1: usize,
    pub key2: usize,
}

impl DbTable {
    pub fn set(&mut self, key: Keyword, value: &str) -> Result<(), ConfigErrorKind> {
        match key {
            Keyword::TName => self.name = Some(value.to_owned()),
            Keyword::TShort => self.short = Some(value.to_owned()),
            Keyword::Cols => {
                for col in value.split(',') {
                    if self.cols.len() == MAX_TABLE_COLS {
                        return Err(ConfigErrorKind::TooManyColumns(MAX_TABLE_COLS));
                    }
                    self.cols.push(col.to_owned());
                }
            }
            Keyword::KeyCol => {
                let (first, second) = match value.split_once(',') {
                    Some((a, b)) => (a, Some(b)),
                    None => (value, None),
                };
                self.key1 = first.trim().parse().map_err(|_| ConfigErrorKind::KeyNotNumber)?;
                if let Some(n) = second.and_then(|b| b.trim().parse().ok()) {
                    self.key2 = n;
                }
                if self.key1 > self.cols.len() || self.key2 > self.cols.len() {
                    return Err(ConfigErrorKind::KeyOutOfRange(self.cols.len()));
                }
            }
            other => return Err(ConfigErrorKind::TableAttrInside(other.name().to_owned())),
        }
        Ok(())
    }

    pub fn finish(&self) -> Result<(), ConfigErrorKind> {
        if self.name.is_none() {
            return Err(ConfigErrorKind::NoTableName);
        }
        if self.short.is_none() {
            return Err(ConfigErrorKind::NoShortName);
        }
        if self.cols.is_empty() {
            return Err(ConfigErrorKind::NoColumns);
        }
        Ok(())
    }
}

// ── Data source ───────────────────────────────────────────────────────────────

/// `datasource=AREA[,LOGIN[,PASSWORD]]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataSource {
    pub area: String,
    pub login: Option<String>,
    pub password: Option<String>,
}

impl DataSource {
    pub fn parse(value: &str) -> Self {
        let mut parts = value.splitn(3, ',');
        let area = parts.next().unwrap_or_default().to_owned();
        let field = |p: Option<&str>| p.filter(|s| !s.is_empty()).map(str::to_owned);
        let login = field(parts.next());
        let password = field(parts.next());
        Self { area, login, password }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
