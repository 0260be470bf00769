use proptest::prelude::*;

use ebrc::preprocess::encode;
use ebrc::urlmatch::{domain_match, glob_match, pattern_match_url};
use ebrc::{Config, Interpreter, Outcome, Session};

/// Runs `call`; commands equal to `failing` report failure.
fn run_collect(config: &str, call: &str, failing: &str) -> (Outcome, Vec<String>) {
    let mut session = Session::new(Config::load_str(config, "prop.ebrc").unwrap());
    let mut ran = Vec::new();
    let mut eval = |_: &mut Session, cmd: &str| {
        ran.push(cmd.to_owned());
        cmd != failing
    };
    let outcome = Interpreter::run(&mut session, &mut eval, call).unwrap();
    (outcome, ran)
}

proptest! {
    /// The preprocessor returns Ok or Err on any text, never panics.
    #[test]
    fn encode_does_not_panic(s in "\\PC*") {
        let _ = encode(&s, "prop");
    }

    /// Same for the whole loader.  The alphabet spells function and block
    /// headers but none of the keywords that touch the file system.
    #[test]
    fn loader_does_not_panic(s in "[fnuctiolp0-9{}()=:+*?# \n]{0,200}") {
        let _ = Config::load_str(&s, "prop");
    }
}

proptest! {
    /// Plain command lines reach the evaluator exactly as written,
    /// apart from leading blanks.
    #[test]
    fn literal_lines_round_trip(lines in prop::collection::vec("[a-z][a-z /.]{0,20}", 1..10)) {
        let src = format!("function:f{{\n{}\n}}\n", lines.join("\n"));
        let (outcome, ran) = run_collect(&src, "f", "");
        prop_assert_eq!(outcome, Outcome::Success);
        prop_assert_eq!(ran, lines);
    }

    /// `loop(N)` runs its body exactly N times, whether or not the body
    /// fails, in both kinds of function.
    #[test]
    fn loop_runs_exactly_n_times(n in 0u32..50, body_fails: bool, nofail: bool) {
        let mode = if nofail { '+' } else { ':' };
        let src = format!("function{mode}f{{\nloop({n}){{\nstep\n}}\ndone\n}}\n");
        let failing = if body_fails { "step" } else { "" };
        let (_, ran) = run_collect(&src, "f", failing);
        prop_assert_eq!(ran.len(), n as usize + 1);
        prop_assert_eq!(ran.last().map(String::as_str), Some("done"));
    }
}

proptest! {
    /// A lone star matches every label.
    #[test]
    fn star_matches_anything(s in "\\PC*") {
        prop_assert!(glob_match("*", &s));
    }

    /// A label with no wildcards matches itself in any case.
    #[test]
    fn plain_glob_matches_itself(s in "[a-zA-Z0-9-]{0,30}") {
        prop_assert!(glob_match(&s, &s));
        prop_assert!(glob_match(&s.to_uppercase(), &s.to_lowercase()));
    }

    /// A host is always inside its own domain and its parent domain.
    #[test]
    fn host_matches_own_domain(label in "[a-z]{1,10}", domain in "[a-z]{1,10}\\.[a-z]{2,3}") {
        let host = format!("{label}.{domain}");
        prop_assert!(domain_match(&host, &host));
        prop_assert!(domain_match(&host, &domain));
    }

    /// Matching never panics on arbitrary urls and patterns.
    #[test]
    fn url_matching_does_not_panic(url in "\\PC{0,60}", pattern in "\\PC{0,30}") {
        let _ = pattern_match_url(&url, &pattern);
        let _ = domain_match(&url, &pattern);
    }
}
