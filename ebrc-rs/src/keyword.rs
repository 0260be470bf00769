//! Configuration keywords.
//!
//! The vocabulary is a fixed, ordered list split into four contiguous
//! ranges: mail-account attributes, plugin attributes, table attributes and
//! global settings.  The discriminant of each [`Keyword`] is its position in
//! that list, so the range a keyword belongs to is a simple comparison.

use std::str::FromStr;

// ── KeywordClass ──────────────────────────────────────────────────────────────

/// Which block a keyword must (or must not) appear in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeywordClass {
    Mail,
    Plugin,
    Table,
    Global,
}

// ── Keyword ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(usize)]
pub enum Keyword {
    InServer   =  0,
    OutServer  =  1,
    Login      =  2,
    Password   =  3,
    From       =  4,
    Reply      =  5,
    InPort     =  6,
    OutPort    =  7,
    To         =  8,
    Cc         =  9,
    Bcc        = 10,
    Attach     = 11,
    Type       = 12,
    Desc       = 13,
    Suffix     = 14,
    Protocol   = 15,
    Program    = 16,
    Content    = 17,
    OutType    = 18,
    UrlMatch   = 19,
    TName      = 20,
    TShort     = 21,
    Cols       = 22,
    KeyCol     = 23,
    DownDir    = 24,
    MailDir    = 25,
    Agent      = 26,
    Jar        = 27,
    NoJs       = 28,
    CacheDir   = 29,
    WebTimer   = 30,
    MailTimer  = 31,
    CertFile   = 32,
    DataSource = 33,
    Proxy      = 34,
    AgentSite  = 35,
    LocalizeWeb = 36,
    ImapFetch  = 37,
    NoVs       = 38,
    CacheSize  = 39,
    AdBook     = 40,
    Envelope   = 41,
    Emojis     = 42,
    Emoji      = 43,
    Include    = 44,
}

/// First plugin keyword; everything before it is a mail attribute.
pub const MIME_WORDS: usize = 12;
/// First table keyword.
pub const TABLE_WORDS: usize = 20;
/// First global keyword.
pub const GLOBAL_WORDS: usize = 24;

impl Keyword {
    /// Every keyword in vocabulary order.
    pub const ALL: &'static [Keyword] = &[
        Keyword::InServer,
        Keyword::OutServer,
        Keyword::Login,
        Keyword::Password,
        Keyword::From,
        Keyword::Reply,
        Keyword::InPort,
        Keyword::OutPort,
        Keyword::To,
        Keyword::Cc,
        Keyword::Bcc,
        Keyword::Attach,
        Keyword::Type,
        Keyword::Desc,
        Keyword::Suffix,
        Keyword::Protocol,
        Keyword::Program,
        Keyword::Content,
        Keyword::OutType,
        Keyword::UrlMatch,
        Keyword::TName,
        Keyword::TShort,
        Keyword::Cols,
        Keyword::KeyCol,
        Keyword::DownDir,
        Keyword::MailDir,
        Keyword::Agent,
        Keyword::Jar,
        Keyword::NoJs,
        Keyword::CacheDir,
        Keyword::WebTimer,
        Keyword::MailTimer,
        Keyword::CertFile,
        Keyword::DataSource,
        Keyword::Proxy,
        Keyword::AgentSite,
        Keyword::LocalizeWeb,
        Keyword::ImapFetch,
        Keyword::NoVs,
        Keyword::CacheSize,
        Keyword::AdBook,
        Keyword::Envelope,
        Keyword::Emojis,
        Keyword::Emoji,
        Keyword::Include,
    ];

    pub const COUNT: usize = 45;

    /// The spelling used in configuration files.
    pub fn name(self) -> &'static str {
        match self {
            Keyword::InServer    => "inserver",
            Keyword::OutServer   => "outserver",
            Keyword::Login       => "login",
            Keyword::Password    => "password",
            Keyword::From        => "from",
            Keyword::Reply       => "reply",
            Keyword::InPort      => "inport",
            Keyword::OutPort     => "outport",
            Keyword::To          => "to",
            Keyword::Cc          => "cc",
            Keyword::Bcc         => "bcc",
            Keyword::Attach      => "attach",
            Keyword::Type        => "type",
            Keyword::Desc        => "desc",
            Keyword::Suffix      => "suffix",
            Keyword::Protocol    => "protocol",
            Keyword::Program     => "program",
            Keyword::Content     => "content",
            Keyword::OutType     => "outtype",
            Keyword::UrlMatch    => "urlmatch",
            Keyword::TName       => "tname",
            Keyword::TShort      => "tshort",
            Keyword::Cols        => "cols",
            Keyword::KeyCol      => "keycol",
            Keyword::DownDir     => "downdir",
            Keyword::MailDir     => "maildir",
            Keyword::Agent       => "agent",
            Keyword::Jar         => "jar",
            Keyword::NoJs        => "nojs",
            Keyword::CacheDir    => "cachedir",
            Keyword::WebTimer    => "webtimer",
            Keyword::MailTimer   => "mailtimer",
            Keyword::CertFile    => "certfile",
            Keyword::DataSource  => "datasource",
            Keyword::Proxy       => "proxy",
            Keyword::AgentSite   => "agentsite",
            Keyword::LocalizeWeb => "localizeweb",
            Keyword::ImapFetch   => "imapfetch",
            Keyword::NoVs        => "novs",
            Keyword::CacheSize   => "cachesize",
            Keyword::AdBook      => "adbook",
            Keyword::Envelope    => "envelope",
            Keyword::Emojis      => "emojis",
            Keyword::Emoji       => "emoji",
            Keyword::Include     => "include",
        }
    }

    /// The contiguous range this keyword falls in.
    pub fn class(self) -> KeywordClass {
        match self as usize {
            n if n < MIME_WORDS => KeywordClass::Mail,
            n if n < TABLE_WORDS => KeywordClass::Plugin,
            n if n < GLOBAL_WORDS => KeywordClass::Table,
            _ => KeywordClass::Global,
        }
    }
}

impl FromStr for Keyword {
    type Err = String;

    /// Exact, case-sensitive lookup.
    fn from_str(s: &str) -> Result<Self, String> {
        Keyword::ALL
            .iter()
            .copied()
            .find(|k| k.name() == s)
            .ok_or_else(|| format!("unrecognized keyword {s:?}"))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_matches_all_len() {
        assert_eq!(Keyword::COUNT, Keyword::ALL.len());
    }

    #[test]
    fn round_trip_from_str() {
        for &k in Keyword::ALL {
            let parsed: Keyword = k.name().parse().unwrap();
            assert_eq!(parsed, k);
        }
    }

    #[test]
    fn lookup_is_case_sensitive() {
        assert!("Proxy".parse::<Keyword>().is_err());
        assert_eq!("proxy".parse::<Keyword>().unwrap(), Keyword::Proxy);
    }

    #[test]
    fn ranges_are_contiguous() {
        let classes: Vec<KeywordClass> = Keyword::ALL.iter().map(|k| k.class()).collect();
        let mut changes = 0;
        for pair in classes.windows(2) {
            if pair[0] != pair[1] {
                changes += 1;
            }
        }
        assert_eq!(changes, 3);
        assert_eq!(Keyword::Attach.class(), KeywordClass::Mail);
        assert_eq!(Keyword::Type.class(), KeywordClass::Plugin);
        assert_eq!(Keyword::KeyCol.class(), KeywordClass::Table);
        assert_eq!(Keyword::DownDir.class(), KeywordClass::Global);
        assert_eq!(Keyword::Include.class(), KeywordClass::Global);
    }

    #[test]
    fn discriminants_are_dense() {
        for (i, &k) in Keyword::ALL.iter().enumerate() {
            assert_eq!(k as usize, i, "{:?} has wrong discriminant", k);
        }
    }
}
