//! Configuration module.
//!
//! This module defines the command-line interface using `clap` and the
//! commands the tool understands. The command string given to `-c` is parsed
//! separately (see [`Command::from_str`]) so that `-v` can win over a bad one.

use clap::Parser;
use std::ffi::OsStr;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Inspect and patch ELF object files.
///
/// Reports section and symbol facts of an ELF32/ELF64 object (either byte
/// order) and flips the `_debug_flag` byte in place.
#[derive(Parser, Debug)]
#[command(author, about, long_about = None, disable_version_flag = true)]
pub struct Config {
    /// Print the version and exit
    ///
    /// Answered by [`version_requested`] before the rest of the command line
    /// is parsed.
    #[arg(short = 'v')]
    pub version: bool,

    /// Command: dumpsections, objectsizes, findsymbol=<name>,
    /// sectionvaddr=<name>, sectionsize=<name>, setdebugflag=<hex-byte>
    #[arg(short = 'c', value_name = "COMMAND", num_args = 0..=1, default_missing_value = "")]
    pub command: Option<String>,

    /// Input object file
    #[arg(value_name = "INPUT")]
    pub input: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, help = "Set the logging level")]
    pub log_level: Option<String>,
}

/// Whether `-v` appears in `args` (argv without the program name) before a
/// `--` terminator. `-v` wins over every other argument, including ones the
/// parser would reject.
pub fn version_requested<I, S>(args: I) -> bool
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    args.into_iter()
        .take_while(|arg| arg.as_ref() != "--")
        .any(|arg| arg.as_ref() == "-v")
}

impl Config {
    /// The `-c` argument, if one with a value was given.
    pub fn command(&self) -> Option<&str> {
        self.command.as_deref().filter(|c| !c.is_empty())
    }

    /// `VERBOSE=Y` in the environment turns on progress messages.
    pub fn verbose(&self) -> bool {
        std::env::var("VERBOSE").is_ok_and(|v| v == "Y")
    }

    /// Filter directive handed to the tracing subscriber.
    pub fn log_filter(&self) -> String {
        match &self.log_level {
            Some(level) => level.clone(),
            None if self.verbose() => "info".to_string(),
            None => "warn".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    DumpSections,
    ObjectSizes,
    FindSymbol(String),
    SectionVaddr(String),
    SectionSize(String),
    SetDebugFlag(u8),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    Unknown(String),
    BadFlagValue(String),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::Unknown(s) => write!(f, "unknown command \"{s}\""),
            CommandError::BadFlagValue(s) => write!(f, "invalid debug flag value \"{s}\""),
        }
    }
}

impl std::error::Error for CommandError {}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "dumpsections" {
            return Ok(Command::DumpSections);
        }
        if s == "objectsizes" {
            return Ok(Command::ObjectSizes);
        }
        let Some((verb, arg)) = s.split_once('=') else {
            return Err(CommandError::Unknown(s.to_string()));
        };
        match verb {
            "findsymbol" => Ok(Command::FindSymbol(arg.to_string())),
            "sectionvaddr" => Ok(Command::SectionVaddr(arg.to_string())),
            "sectionsize" => Ok(Command::SectionSize(arg.to_string())),
            "setdebugflag" => parse_byte(arg)
                .map(Command::SetDebugFlag)
                .ok_or_else(|| CommandError::BadFlagValue(arg.to_string())),
            _ => Err(CommandError::Unknown(s.to_string())),
        }
    }
}

/// Parses a hex byte, with or without a `0x` prefix.
fn parse_byte(s: &str) -> Option<u8> {
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    if digits.is_empty() {
        return None;
    }
    u8::from_str_radix(digits, 16).ok()
}
