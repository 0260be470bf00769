//! Process-wide state: the loaded configuration plus the interactive
//! settings and lookup tables that depend on it.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::adbook::AddressBook;
use crate::config::Config;
use crate::error::{ConfigError, RunError};
use crate::replace::Replacements;
use crate::script::{CommandEvaluator, Interpreter, Outcome};
use crate::settings::Settings;
use crate::urlmatch::is_data_uri;

#[derive(Debug)]
pub struct Session {
    pub config: Config,
    pub settings: Settings,
    pub address_book: AddressBook,
    pub replacements: Replacements,
    config_path: Option<PathBuf>,
    interrupt: Arc<AtomicBool>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl Session {
    pub fn new(config: Config) -> Self {
        let mut session = Self {
            config: Config::default(),
            settings: Settings::default(),
            address_book: AddressBook::default(),
            replacements: Replacements::default(),
            config_path: None,
            interrupt: Arc::new(AtomicBool::new(false)),
        };
        session.install(config);
        session
    }

    /// Load `path` and remember it for [`Session::reload`].
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut session = Self::new(Config::load_file(path)?);
        session.config_path = Some(path.to_owned());
        Ok(session)
    }

    /// Rebuild everything from the configuration file.
    ///
    /// The old configuration is dropped first: on failure the session is
    /// left with an empty configuration, never a mix of old and new.
    pub fn reload(&mut self) -> Result<(), ConfigError> {
        self.install(Config::default());
        let Some(path) = self.config_path.clone() else {
            return Ok(());
        };
        let config = Config::load_file(&path)?;
        self.install(config);
        Ok(())
    }

    fn install(&mut self, config: Config) {
        self.address_book = match &config.address_book {
            Some(path) => AddressBook::load(path).unwrap_or_else(|e| {
                log::warn!("cannot read address book {}: {e}", path.display());
                AddressBook::default()
            }),
            None => AddressBook::default(),
        };
        if self.settings.agent_index >= config.agents.len() {
            self.settings.agent_index = 0;
        }
        if let Some(agent) = config.agents.get(self.settings.agent_index) {
            self.settings.current_agent = agent.clone();
        }
        self.config = config;
    }

    /// Read a `jslocal` replacement file.
    pub fn load_replacements(&mut self, path: &Path) -> std::io::Result<()> {
        self.replacements = Replacements::load(path)?;
        Ok(())
    }

    // ── Interrupts ────────────────────────────────────────────────────────────

    /// Flag that stops a running function at its next line.
    pub fn interrupt_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.interrupt)
    }

    pub fn interrupted(&self) -> bool {
        self.interrupt.load(Ordering::Relaxed)
    }

    pub fn clear_interrupt(&self) {
        self.interrupt.store(false, Ordering::Relaxed);
    }

    // ── Agents ────────────────────────────────────────────────────────────────

    /// Make agent `index` current.  Returns `false` if there is no such slot.
    pub fn set_agent(&mut self, index: usize) -> bool {
        match self.config.agents.get(index) {
            Some(agent) => {
                self.settings.current_agent = agent.clone();
                self.settings.agent_index = index;
                true
            }
            None => false,
        }
    }

    // ── Rule queries ──────────────────────────────────────────────────────────

    /// Whether JavaScript may run for `url`.
    pub fn java_ok(&self, url: &str) -> bool {
        if !self.settings.allow_js {
            return false;
        }
        if is_data_uri(url) {
            return true;
        }
        !self.config.rules.suppresses_js(url)
    }

    /// Whether the certificate of `url`'s host must be verified.
    pub fn must_verify_host(&self, url: &str) -> bool {
        self.settings.verify_certificates && !self.config.rules.skips_verify(url)
    }

    /// Proxy for `url`, `None` for a direct connection.
    pub fn find_proxy_for_url(&self, url: &str) -> Option<&str> {
        self.config.rules.proxy_for(url)
    }

    /// User agent chosen for `url` by an `agentsite` rule.
    pub fn find_agent_for_url(&self, url: &str) -> Option<&str> {
        let index = self.config.rules.agent_for(url)?;
        self.config.agents.get(index).map(String::as_str)
    }

    /// Folder an incoming message should be filed in.
    pub fn mail_redirect(&self, to: &str, from: &str, reply: &str, subject: &str) -> Option<&str> {
        self.config
            .rules
            .redirect(to, from, reply, subject)
            .or_else(|| self.address_book.reverse_alias(reply))
    }

    // ── Functions ─────────────────────────────────────────────────────────────

    /// Run `NAME [ARGS...]` as a fresh top-level call.
    ///
    /// An interrupt left over from an earlier run is discarded first.  A
    /// function called from inside a running function should go through
    /// [`Interpreter::run`] so that an interrupt stops the whole chain.
    pub fn run_function(
        &mut self,
        evaluator: &mut dyn CommandEvaluator,
        line: &str,
    ) -> Result<Outcome, RunError> {
        self.clear_interrupt();
        Interpreter::run(self, evaluator, line)
    }

    /// Run the `init` function if there is one.  Its setting changes stay.
    pub fn run_init(
        &mut self,
        evaluator: &mut dyn CommandEvaluator,
    ) -> Result<Option<Outcome>, RunError> {
        if self.config.rules.function("init").is_none() {
            return Ok(None);
        }
        self.run_function(evaluator, "init").map(Some)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn session(src: &str) -> Session {
        Session::new(Config::load_str(src, "test.ebrc").unwrap())
    }

    #[test]
    fn java_ok_checks_setting_rules_and_data_uris() {
        let mut s = session("nojs=.ads.example.\n");
        assert!(!s.java_ok("http://tracker.ads.example.com/"));
        assert!(s.java_ok("http://shop.example.com/"));
        assert!(s.java_ok("data:text/html,<script>x()</script>"));
        s.settings.allow_js = false;
        assert!(!s.java_ok("http://shop.example.com/"));
        assert!(!s.java_ok("data:,x"));
    }

    #[test]
    fn verify_host() {
        let mut s = session("novs=self.signed.org\n");
        assert!(!s.must_verify_host("https://www.self.signed.org/"));
        assert!(s.must_verify_host("https://bank.com/"));
        s.settings.verify_certificates = false;
        assert!(!s.must_verify_host("https://bank.com/"));
    }

    #[test]
    fn proxy_scenario() {
        let s = session("proxy=http myproxy.example 8080\nproxy=* internal.example direct\n");
        assert_eq!(s.find_proxy_for_url("http://x.com"), Some("myproxy.example:8080"));
        assert_eq!(s.find_proxy_for_url("https://internal.example/y"), None);
        assert_eq!(s.find_proxy_for_url("https://other.com"), None);
    }

    #[test]
    fn agent_lookup_and_switch() {
        let mut s = session("agent=lynx/2.8\nagentsite=slow.org 1\n");
        assert_eq!(s.find_agent_for_url("http://www.slow.org/"), Some("lynx/2.8"));
        assert_eq!(s.find_agent_for_url("http://fast.org/"), None);
        assert!(s.set_agent(1));
        assert_eq!(s.settings.current_agent, "lynx/2.8");
        assert!(!s.set_agent(5));
    }

    #[test]
    fn redirect_falls_back_to_address_book() {
        let mut s = session("tofilter{\n@lists.org > lists\n}\n");
        s.address_book = AddressBook::parse("carol:carol@home.net\n");
        assert_eq!(s.mail_redirect("me@lists.org", "x", "y", "z"), Some("lists"));
        assert_eq!(s.mail_redirect("me@x", "c", "Carol@Home.net", "z"), Some("carol"));
        assert_eq!(s.mail_redirect("me@x", "c", "d@e", "z"), None);
    }

    #[test]
    fn reload_without_path_clears() {
        let mut s = session("nojs=a.b\n");
        s.reload().unwrap();
        assert!(s.config.rules.is_empty());
    }

    #[test]
    fn interrupt_flag_is_shared() {
        let s = Session::default();
        let flag = s.interrupt_flag();
        flag.store(true, Ordering::Relaxed);
        assert!(s.interrupted());
        s.clear_interrupt();
        assert!(!s.interrupted());
    }

    #[test]
    fn interrupt_in_init_does_not_stop_next_call() {
        let mut s = session("function:init{\nslow\nslower\n}\nfunction:go{\nquick\n}\n");
        let flag = s.interrupt_flag();
        let mut ran = Vec::new();
        let mut eval = |_: &mut Session, cmd: &str| {
            if cmd == "slow" {
                flag.store(true, Ordering::Relaxed);
            }
            ran.push(cmd.to_owned());
            true
        };
        assert!(matches!(s.run_init(&mut eval), Err(RunError::Interrupted)));
        assert_eq!(s.run_function(&mut eval, "go").unwrap(), Outcome::Success);
        assert_eq!(ran, ["slow", "quick"]);
    }
}
