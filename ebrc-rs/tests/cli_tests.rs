/// Run the `ebrc` binary against small configuration files and check its
/// output and exit status.
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Path to the `ebrc` binary built by this workspace.
fn binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_ebrc"))
}

const CONFIG: &str = "\
# sample
agent=lynx/2.8
nojs=ads.example.com

function:init{
startup
}

function:greet{
hello ~1 and ~2
}

function+tolerant{
first
false
last
}

function:strict{
first
false
last
}

function:branch{
~1
if(*){
took then
}else{
took else
}
}
";

fn write_config(dir: &Path, text: &str) -> PathBuf {
    let path = dir.join("ebrc");
    std::fs::write(&path, text).unwrap();
    path
}

fn ebrc(config: &Path, args: &[&str]) -> Output {
    Command::new(binary())
        .arg("-c")
        .arg(config)
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to spawn ebrc binary")
}

fn stdout_lines(out: &Output) -> Vec<String> {
    String::from_utf8_lossy(&out.stdout)
        .lines()
        .map(str::to_owned)
        .collect()
}

// ── Test cases ────────────────────────────────────────────────────────────────

#[test]
fn check_reports_counts() {
    let dir = tempfile::tempdir().unwrap();
    let rc = write_config(dir.path(), CONFIG);
    let out = ebrc(&rc, &["--check"]);
    assert!(out.status.success());
    let text = String::from_utf8_lossy(&out.stdout);
    assert!(text.contains("6 rules, 5 functions"), "{text}");
}

#[test]
fn list_shows_functions_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let rc = write_config(dir.path(), CONFIG);
    let out = ebrc(&rc, &["--list"]);
    let names: Vec<String> = stdout_lines(&out)
        .iter()
        .filter_map(|l| l.split('\t').next().map(str::to_owned))
        .collect();
    assert_eq!(names, [":init", ":greet", "+tolerant", ":strict", ":branch"]);
}

#[test]
fn dump_renders_body() {
    let dir = tempfile::tempdir().unwrap();
    let rc = write_config(dir.path(), CONFIG);
    let out = ebrc(&rc, &["--dump", "greet"]);
    assert!(out.status.success());
    assert!(String::from_utf8_lossy(&out.stdout).contains("hello ~1 and ~2"));

    let out = ebrc(&rc, &["--dump", "missing"]);
    assert_eq!(out.status.code(), Some(2));
}

#[test]
fn call_prints_expanded_commands_after_init() {
    let dir = tempfile::tempdir().unwrap();
    let rc = write_config(dir.path(), CONFIG);
    let out = ebrc(&rc, &["greet", "Alice", "Bob"]);
    assert!(out.status.success());
    assert_eq!(stdout_lines(&out), ["startup", "hello Alice and Bob"]);
}

#[test]
fn branches_follow_false() {
    let dir = tempfile::tempdir().unwrap();
    let rc = write_config(dir.path(), CONFIG);
    let out = ebrc(&rc, &["branch", "false"]);
    assert!(out.status.success());
    assert_eq!(stdout_lines(&out), ["startup", "false", "took else"]);
}

#[test]
fn exit_status_reflects_outcome() {
    let dir = tempfile::tempdir().unwrap();
    let rc = write_config(dir.path(), CONFIG);

    let out = ebrc(&rc, &["tolerant"]);
    assert_eq!(out.status.code(), Some(1));
    assert_eq!(stdout_lines(&out), ["startup", "first", "false", "last"]);

    let out = ebrc(&rc, &["strict"]);
    assert!(out.status.success());
    assert_eq!(stdout_lines(&out), ["startup", "first", "false", "last"]);

    let out = ebrc(&rc, &["nosuch"]);
    assert_eq!(out.status.code(), Some(2));
}

#[test]
fn config_error_exits_three() {
    let dir = tempfile::tempdir().unwrap();
    let rc = write_config(dir.path(), "function:half{\nx\n");
    let out = ebrc(&rc, &["--check"]);
    assert_eq!(out.status.code(), Some(3));
    assert!(String::from_utf8_lossy(&out.stderr).contains("half"));
}
