//! Local replacements for remote scripts and style sheets.
//!
//! A `jslocal` file maps URLs to local files, one `LOCALFILE:URL` per line,
//! so a broken or slow remote script can be swapped for a patched copy.
//! The query string of a requested URL is ignored when looking it up.

use std::fs;
use std::io;
use std::path::Path;

#[derive(Debug, Clone, Default)]
pub struct Replacements {
    /// `(url, local file)`, in file order.
    entries: Vec<(String, String)>,
}

impl Replacements {
    pub fn load(path: &Path) -> io::Result<Self> {
        let bytes = fs::read(path)?;
        Ok(Self::parse(&String::from_utf8_lossy(&bytes)))
    }

    pub fn parse(src: &str) -> Self {
        let mut entries = Vec::new();
        for line in src.lines() {
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((local, url)) = line.split_once(':') else {
                log::warn!("jslocal line has no colon: {line}");
                continue;
            };
            if url.contains('?') {
                log::warn!("jslocal url has a query string: {url}");
                continue;
            }
            entries.push((url.to_owned(), local.to_owned()));
        }
        log::debug!("{} js or css file replacements", entries.len());
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Local file standing in for `url`.  Later lines take precedence.
    pub fn fetch_replace(&self, url: &str) -> Option<&str> {
        let base = url.split_once('?').map_or(url, |(b, _)| b);
        self.entries
            .iter()
            .rev()
            .find(|(u, _)| u == base)
            .map(|(_, local)| local.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_ignores_query() {
        let r = Replacements::parse(
            "# patched scripts\r\nfix.js:http://x.com/app.js\nbad line\nq.js:http://x.com/q.js?v=1\n\
             newer.js:http://x.com/app.js\n",
        );
        assert_eq!(r.len(), 2);
        assert_eq!(r.fetch_replace("http://x.com/app.js?v=3"), Some("newer.js"));
        assert_eq!(r.fetch_replace("http://x.com/q.js"), None);
    }
}
