//! The rule table.
//!
//! One ordered, append-only list of heterogeneous rules.  Insertion order
//! is match priority: every predicate walks the list from the front, looks
//! only at rules of its own kind, and the first hit wins.  The table is only
//! built during a configuration load and is replaced wholesale on reload.

use std::sync::Arc;

use crate::preprocess::Line;
use crate::urlmatch::{pattern_match_url, prot_host};

// ── Rule kinds ────────────────────────────────────────────────────────────────

/// Which mail header a redirect rule is tested against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    /// `fromfilter{`: sender or reply-to address.
    From,
    /// `tofilter{`: recipient address.
    To,
    /// `subjfilter{`: subject line.
    Subject,
}

/// A `proxy=` entry.  `None` fields are wildcards; a `None` proxy means a
/// direct connection.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProxyRoute {
    /// `|`-separated protocol list.
    pub protocols: Option<String>,
    pub domain: Option<String>,
    pub proxy: Option<String>,
}

impl ProxyRoute {
    /// Parse the value of a `proxy=` line: `[PROTOCOLS [DOMAIN]] PROXY`.
    ///
    /// `*` stands for any protocol or any domain.  `PROXY` is `host:port`,
    /// `host port`, or `direct`.
    pub fn parse(value: &str) -> Self {
        let mut words: Vec<String> = value.split_whitespace().map(str::to_owned).collect();
        if words.len() >= 2 && words.last().is_some_and(|w| w.bytes().all(|b| b.is_ascii_digit())) {
            let port = words.pop().unwrap_or_default();
            if let Some(host) = words.last_mut() {
                host.push(':');
                host.push_str(&port);
            }
        }

        let wild = |w: &String| (w != "*").then(|| w.clone());
        let mut route = ProxyRoute::default();
        let proxy = match words.as_slice() {
            [] => String::new(),
            [proxy] => proxy.clone(),
            [prot, proxy] => {
                route.protocols = wild(prot);
                proxy.clone()
            }
            [prot, domain, rest @ ..] => {
                route.protocols = wild(prot);
                route.domain = wild(domain);
                rest.join(" ")
            }
        };
        if !proxy.is_empty() && !proxy.eq_ignore_ascii_case("direct") {
            route.proxy = Some(proxy);
        }
        route
    }

    fn matches(&self, prot: &str, url: &str) -> bool {
        if let Some(list) = &self.protocols {
            if !list.split('|').any(|p| p.eq_ignore_ascii_case(prot)) {
                return false;
            }
        }
        self.domain.as_deref().map_or(true, |d| pattern_match_url(url, d))
    }
}

/// A named automation function and its encoded body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Function {
    pub name: String,
    /// Declared with `function+`: failures do not stop the function.
    pub nofail: bool,
    /// The lines between the opener and its matching close.
    pub body: Arc<[Line]>,
    /// File and line of the opener, for diagnostics.
    pub file: String,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    /// `nojs=`: never run JavaScript from matching hosts.
    NoJs(String),
    /// `novs=`: do not verify certificates of matching hosts.
    NoVerify(String),
    Proxy(ProxyRoute),
    /// `agentsite=`: use agent number `agent` for matching hosts.
    AgentSite { pattern: String, agent: usize },
    Function(Arc<Function>),
    /// One `MATCH > DESTINATION` line of a mail filter block.
    Redirect { filter: FilterKind, pattern: String, destination: String },
}

// ── RuleTable ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct RuleTable {
    rules: Vec<Rule>,
}

impl RuleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rule at the lowest priority.
    pub fn push(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// `true` if a `nojs` rule matches the URL.
    pub fn suppresses_js(&self, url: &str) -> bool {
        self.rules
            .iter()
            .any(|r| matches!(r, Rule::NoJs(p) if pattern_match_url(url, p)))
    }

    /// `true` if a `novs` rule matches the URL.
    pub fn skips_verify(&self, url: &str) -> bool {
        self.rules
            .iter()
            .any(|r| matches!(r, Rule::NoVerify(p) if pattern_match_url(url, p)))
    }

    /// The first proxy route that applies to `url`, if any.
    pub fn proxy_route(&self, url: &str) -> Option<&ProxyRoute> {
        let (prot, _) = prot_host(url).ok()?;
        self.rules.iter().find_map(|r| match r {
            Rule::Proxy(route) if route.matches(&prot, url) => Some(route),
            _ => None,
        })
    }

    /// The proxy to use for `url`; `None` means connect directly.
    pub fn proxy_for(&self, url: &str) -> Option<&str> {
        self.proxy_route(url)?.proxy.as_deref()
    }

    /// The agent number selected by the first matching `agentsite` rule.
    pub fn agent_for(&self, url: &str) -> Option<usize> {
        self.rules.iter().find_map(|r| match r {
            Rule::AgentSite { pattern, agent } if pattern_match_url(url, pattern) => Some(*agent),
            _ => None,
        })
    }

    /// Look up a function by name, ignoring case.
    pub fn function(&self, name: &str) -> Option<&Arc<Function>> {
        self.functions().find(|f| f.name.eq_ignore_ascii_case(name))
    }

    pub fn functions(&self) -> impl Iterator<Item = &Arc<Function>> {
        self.rules.iter().filter_map(|r| match r {
            Rule::Function(f) => Some(f),
            _ => None,
        })
    }

    /// Destination folder for an incoming message, from the filter rules.
    ///
    /// * from rules match the sender or reply address exactly, or an
    ///   `@domain` suffix of the reply address;
    /// * to rules match the recipient exactly, or by `@domain` suffix;
    /// * subject rules match the whole subject, or a prefix or suffix that
    ///   covers at least half of it.
    ///
    /// All comparisons ignore ASCII case.
    pub fn redirect(&self, to: &str, from: &str, reply: &str, subject: &str) -> Option<&str> {
        self.rules.iter().find_map(|r| match r {
            Rule::Redirect { filter, pattern, destination } => {
                let hit = match filter {
                    FilterKind::From => {
                        pattern.eq_ignore_ascii_case(from)
                            || pattern.eq_ignore_ascii_case(reply)
                            || at_suffix(pattern, reply)
                    }
                    FilterKind::To => pattern.eq_ignore_ascii_case(to) || at_suffix(pattern, to),
                    FilterKind::Subject => subject_match(pattern, subject),
                };
                hit.then_some(destination.as_str())
            }
            _ => None,
        })
    }
}

/// `@domain` pattern that is a proper suffix of `addr`.
fn at_suffix(pattern: &str, addr: &str) -> bool {
    let (m, a) = (pattern.as_bytes(), addr.as_bytes());
    m.first() == Some(&b'@') && m.len() < a.len() && a[a.len() - m.len()..].eq_ignore_ascii_case(m)
}

fn subject_match(pattern: &str, subject: &str) -> bool {
    let (m, s) = (pattern.as_bytes(), subject.as_bytes());
    if m.len() > s.len() {
        return false;
    }
    if m.len() == s.len() {
        return m.eq_ignore_ascii_case(s);
    }
    if s.len() > 2 * m.len() {
        return false;
    }
    s[..m.len()].eq_ignore_ascii_case(m) || s[s.len() - m.len()..].eq_ignore_ascii_case(m)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
