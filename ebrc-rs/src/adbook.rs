//! Address book, used for reverse alias lookup when filing mail.
//!
//! One entry per line, `alias:address[:extra...]`.  Blank lines and lines
//! starting with `#` are ignored.

use std::fs;
use std::io;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alias {
    pub name: String,
    pub address: String,
}

#[derive(Debug, Clone, Default)]
pub struct AddressBook {
    entries: Vec<Alias>,
}

impl AddressBook {
    pub fn load(path: &Path) -> io::Result<Self> {
        let bytes = fs::read(path)?;
        Ok(Self::parse(&String::from_utf8_lossy(&bytes)))
    }

    pub fn parse(src: &str) -> Self {
        let mut entries = Vec::new();
        for (i, line) in src.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut fields = line.split(':').map(str::trim);
            match (fields.next(), fields.next()) {
                (Some(name), Some(address)) if !name.is_empty() && !address.is_empty() => {
                    entries.push(Alias { name: name.to_owned(), address: address.to_owned() });
                }
                _ => log::warn!("address book line {}: expected alias:address", i + 1),
            }
        }
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Alias whose address is `address`, ignoring case.  Aliases that start
    /// with `!` are never returned.
    pub fn reverse_alias(&self, address: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|a| !a.name.starts_with('!') && a.address.eq_ignore_ascii_case(address))
            .map(|a| a.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_lookup() {
        let book = AddressBook::parse("# friends\nbob : Bob@Example.com : 555-1234\n\nbad line\n!old:old@x.org\n");
        assert_eq!(book.len(), 2);
        assert_eq!(book.reverse_alias("bob@example.com"), Some("bob"));
        assert_eq!(book.reverse_alias("old@x.org"), None);
        assert_eq!(book.reverse_alias("nobody@x.org"), None);
    }
}
