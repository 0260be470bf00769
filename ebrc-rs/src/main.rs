use std::io;
use std::process::ExitCode;

use clap::Parser;

use ebrc::cli::{CliArgs, EchoEvaluator};
use ebrc::preprocess::render;
use ebrc::script::{Outcome, RunStatus};
use ebrc::Session;

const EXIT_FAILED: u8 = 1;
const EXIT_NOT_FOUND: u8 = 2;
const EXIT_CONFIG: u8 = 3;

fn main() -> ExitCode {
    let args = CliArgs::parse();

    env_logger::Builder::from_default_env()
        .filter_level(args.log_level())
        .format_timestamp(None)
        .init();

    // ── Load configuration ────────────────────────────────────────────────────
    let Some(path) = args.config_path() else {
        eprintln!("ebrc: no configuration file; use -c or set EBRC");
        return ExitCode::from(EXIT_CONFIG);
    };
    let mut session = match Session::load(&path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("ebrc: {e}");
            return ExitCode::from(EXIT_CONFIG);
        }
    };
    for warning in &session.config.warnings {
        eprintln!("ebrc: warning: {warning}");
    }
    session.settings.debug_level = args.debug;

    // ── Interrupts stop the running function at its next line ────────────────
    let flag = session.interrupt_flag();
    if let Err(e) = ctrlc::set_handler(move || {
        flag.store(true, std::sync::atomic::Ordering::Relaxed);
    }) {
        log::warn!("cannot install interrupt handler: {e}");
    }

    if args.check {
        println!(
            "{}: {} rules, {} functions, {} mail accounts, {} plugins, {} tables",
            path.display(),
            session.config.rules.len(),
            session.config.rules.functions().count(),
            session.config.accounts.len(),
            session.config.mime_types.len(),
            session.config.tables.len(),
        );
        return ExitCode::SUCCESS;
    }

    if args.list {
        for f in session.config.rules.functions() {
            let mode = if f.nofail { '+' } else { ':' };
            println!("{mode}{}\t{} line {}", f.name, f.file, f.line);
        }
        return ExitCode::SUCCESS;
    }

    if let Some(name) = &args.dump {
        return match session.config.rules.function(name) {
            Some(f) => {
                print!("{}", render(&f.body));
                ExitCode::SUCCESS
            }
            None => {
                eprintln!("ebrc: no such function {name}");
                ExitCode::from(EXIT_NOT_FOUND)
            }
        };
    }

    // ── Run init, then the requested function ─────────────────────────────────
    let mut evaluator = EchoEvaluator::new(io::stdout().lock());
    if let Err(e) = session.run_init(&mut evaluator) {
        eprintln!("ebrc: init: {e}");
    }

    let Some(call) = args.call_line() else {
        return ExitCode::SUCCESS;
    };
    let result = session.run_function(&mut evaluator, &call);
    match (&result, RunStatus::of(&result)) {
        (Ok(Outcome::Success), _) => ExitCode::SUCCESS,
        (Ok(Outcome::SoftFailure), _) => {
            eprintln!("ebrc: {call}: finished with failures");
            ExitCode::from(EXIT_FAILED)
        }
        (Err(e), RunStatus::NotFound) => {
            eprintln!("ebrc: {e}");
            ExitCode::from(EXIT_NOT_FOUND)
        }
        (Err(e), _) => {
            eprintln!("ebrc: {e}");
            ExitCode::from(EXIT_FAILED)
        }
    }
}
