//! URL and domain matching.
//!
//! Rule patterns have the form `DOMAIN[/PATH]`.  The domain is compared with
//! the URL's host label by label, case-insensitively, and each label may use
//! the glob wildcards `*` and `?` (`\x` is a literal `x`).
//!
//! | Pattern          | Matches                                          |
//! |------------------|--------------------------------------------------|
//! | `example.com`    | `example.com`, `www.example.com`                 |
//! | `.example.com`   | same; a leading dot is ignored                   |
//! | `ads.example.`   | any host containing the labels `ads.example`     |
//! | `*.cdn.net`      | `a.cdn.net`, `x.a.cdn.net`                       |
//! | `site.org/blog`  | `site.org` hosts whose path starts with `/blog`  |
//!
//! Without a trailing dot the pattern must be a label-suffix of the host.

use url::Url;

use crate::error::UrlError;

/// Split `url` into its lowercase protocol and host.
///
/// A URL without a scheme is taken to be `http`.
pub fn prot_host(url: &str) -> Result<(String, String), UrlError> {
    let parsed = parse(url)?;
    let host = parsed
        .host_str()
        .filter(|h| !h.is_empty())
        .ok_or_else(|| UrlError::NoHost(url.to_owned()))?;
    Ok((parsed.scheme().to_owned(), host.to_owned()))
}

/// `true` for `data:` URIs.
pub fn is_data_uri(url: &str) -> bool {
    url.get(..5).is_some_and(|s| s.eq_ignore_ascii_case("data:"))
}

/// `true` if the host (and path, when the pattern has one) of `url` matches
/// `pattern`.
pub fn pattern_match_url(url: &str, pattern: &str) -> bool {
    let Ok(parsed) = parse(url) else { return false };
    let Some(host) = parsed.host_str() else { return false };

    let (domain, path) = match pattern.find('/') {
        Some(i) => (&pattern[..i], Some(&pattern[i..])),
        None => (pattern, None),
    };
    if !domain_match(host, domain) {
        return false;
    }
    path.map_or(true, |p| parsed.path().starts_with(p))
}

/// Label-wise comparison of a host against a domain pattern.
pub fn domain_match(host: &str, domain: &str) -> bool {
    let domain = domain.trim_start_matches('.');
    let open = domain.ends_with('.');
    let domain = domain.trim_end_matches('.');
    if domain.is_empty() {
        return false;
    }

    let want: Vec<&str> = domain.split('.').collect();
    let have: Vec<&str> = host.trim_end_matches('.').split('.').collect();
    if want.len() > have.len() {
        return false;
    }

    let run_at = |i: usize| {
        want.iter()
            .zip(&have[i..])
            .all(|(p, h)| glob_match(p, h))
    };
    let last = have.len() - want.len();
    if open {
        (0..=last).any(run_at)
    } else {
        run_at(last)
    }
}

fn parse(url: &str) -> Result<Url, UrlError> {
    match Url::parse(url) {
        Ok(u) => Ok(u),
        Err(url::ParseError::RelativeUrlWithoutBase) => Url::parse(&format!("http://{url}"))
            .map_err(|source| UrlError::Parse { url: url.to_owned(), source }),
        Err(source) => Err(UrlError::Parse { url: url.to_owned(), source }),
    }
}

// ── Glob ──────────────────────────────────────────────────────────────────────

/// Case-insensitive glob match of one label.
///
/// Single-star backtracking: on a mismatch the most recent `*` absorbs one
/// more character, so the cost stays proportional to `pat.len() * text.len()`.
pub fn glob_match(pat: &str, text: &str) -> bool {
    let (pat, s) = (pat.as_bytes(), text.as_bytes());
    let (mut p, mut t) = (0, 0);
    let mut star: Option<(usize, usize)> = None;

    while t < s.len() {
        match pat.get(p) {
            Some(b'*') => {
                star = Some((p, t));
                p += 1;
                continue;
            }
            Some(b'?') => {
                p += 1;
                t += 1;
                continue;
            }
            Some(b'\\') if p + 1 < pat.len() && pat[p + 1].eq_ignore_ascii_case(&s[t]) => {
                p += 2;
                t += 1;
                continue;
            }
            Some(&c) if c != b'\\' || p + 1 == pat.len() => {
                if c.eq_ignore_ascii_case(&s[t]) {
                    p += 1;
                    t += 1;
                    continue;
                }
            }
            _ => {}
        }
        match star {
            Some((sp, st)) => {
                star = Some((sp, st + 1));
                p = sp + 1;
                t = st + 1;
            }
            None => return false,
        }
    }
    pat[p..].iter().all(|&c| c == b'*')
}

// ── Tests ─────────────────────────────────────────────────────────────────────
