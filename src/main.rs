mod ast;
mod callable;
mod config;
mod env;
mod error;
mod highlighter;
mod interpreter;
mod parser;
mod scanner;
mod token;
mod value;

use config::{WELCOME_MESSAGE, WELCOME_SUBTITLE};
use error::Reporter;
use highlighter::LangHelper;
use interpreter::Interpreter;
use parser::Parser;
use rustyline::error::ReadlineError;
use rustyline::{Config, Editor};
use scanner::Scanner;
use std::process::ExitCode;
use std::rc::Rc;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    match args.len() {
        1 => run_prompt(),
        2 => run_file(&args[1]),
        _ => {
            eprintln!("Usage: lang-interp [script]");
            ExitCode::from(64)
        }
    }
}

/// Runs a single script file and maps its outcome onto the process exit
/// code: 65 for a scan/parse error, 70 for a runtime error, 0 otherwise.
fn run_file(path: &str) -> ExitCode {
    let source = match std::fs::read_to_string(path) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("Cannot read script file {path}: {err}");
            return ExitCode::from(70);
        }
    };

    let reporter = Rc::new(Reporter::new());
    let mut interpreter = Interpreter::with_stdout(reporter.clone());
    run(&source, &mut interpreter, &reporter);

    if reporter.had_error() {
        ExitCode::from(65)
    } else if reporter.had_runtime_error() {
        ExitCode::from(70)
    } else {
        ExitCode::SUCCESS
    }
}

/// Interactive REPL: one persistent interpreter across lines, with the
/// reporter's sticky error flags reset between lines so one bad line
/// doesn't poison the exit behavior of later ones.
fn run_prompt() -> ExitCode {
    let reporter = Rc::new(Reporter::new());
    let mut interpreter = Interpreter::with_stdout(reporter.clone());

    let config = Config::builder().auto_add_history(true).build();
    let mut rl = match Editor::with_config(config) {
        Ok(rl) => rl,
        Err(err) => {
            eprintln!("Failed to initialize REPL: {err}");
            return ExitCode::from(70);
        }
    };
    rl.set_helper(Some(LangHelper::new()));

    let history_file = ".lang_interp_history";
    let _ = rl.load_history(history_file);

    println!("{WELCOME_MESSAGE}");
    println!("{WELCOME_SUBTITLE}");

    loop {
        match rl.readline("> ") {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                reporter.reset();
                run(&line, &mut interpreter, &reporter);
            }
            Err(ReadlineError::Interrupted) => {
                continue;
            }
            Err(ReadlineError::Eof) => {
                break;
            }
            Err(err) => {
                eprintln!("Error: {err}");
                break;
            }
        }
    }

    let _ = rl.save_history(history_file);
    ExitCode::SUCCESS
}

/// Scans, parses, and interprets `source`. Parse errors abort before any
/// statement runs; a reported scan/parse error short-circuits evaluation.
fn run(source: &str, interpreter: &mut Interpreter, reporter: &Reporter) {
    let tokens = Scanner::new(source, reporter).scan_tokens();
    let statements = Parser::new(tokens, reporter).parse();

    if reporter.had_error() {
        return;
    }

    interpreter.interpret(&statements);
}
