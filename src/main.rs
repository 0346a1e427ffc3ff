//! Entry point for elftool.
//!
//! This file handles high-level application flow:
//! 1. Answer `-v` before looking at anything else.
//! 2. Parse command-line arguments using `clap`.
//! 3. Load the input image and run the requested command.
//!
//! Error handling is done via `anyhow`; every failure ends up as a single
//! `<program>: *** Error: ...` line on standard error and exit status 1.

use anyhow::{Context, Result};
use clap::Parser;
use std::io::Write;
use std::path::Path;
use std::process::ExitCode;

use elftool::config::{self, Command, Config};
use elftool::inspector::Inspector;
use elftool::logging;

fn main() -> ExitCode {
    let program = program_name();

    if config::version_requested(std::env::args_os().skip(1)) {
        println!("{program}: version {}", env!("CARGO_PKG_VERSION"));
        return ExitCode::SUCCESS;
    }

    let config = match Config::try_parse() {
        Ok(config) => config,
        // --help
        Err(e) if !e.use_stderr() => {
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            eprintln!("{program}: *** Error: {}.", usage_message(&e));
            return ExitCode::FAILURE;
        }
    };
    logging::init(&program, &config.log_filter());

    match run(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{program}: *** Error: {e:#}.");
            ExitCode::FAILURE
        }
    }
}

fn run(config: Config) -> Result<()> {
    let command: Command = config
        .command()
        .context("no command supplied")?
        .parse()?;
    let input = config.input.context("no input file")?;

    let mut inspector = Inspector::open(&input).context("cannot load ELF image")?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    inspector
        .run(&command, &mut out)
        .with_context(|| input.display().to_string())?;
    out.flush()?;
    Ok(())
}

/// First line of a clap error, without clap's own `error: ` lead-in.
fn usage_message(e: &clap::Error) -> String {
    let rendered = e.to_string();
    let first = rendered.lines().next().unwrap_or_default();
    first.strip_prefix("error: ").unwrap_or(first).trim().to_string()
}

/// Basename of argv[0], used to prefix diagnostics.
fn program_name() -> String {
    std::env::args_os()
        .next()
        .as_deref()
        .map(Path::new)
        .and_then(Path::file_name)
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| env!("CARGO_PKG_NAME").to_string())
}
