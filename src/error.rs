//! Error types.
//!
//! Every failure the tool can report is an [`ElfError`]. The variants fall into
//! five broad classes (see [`ErrorKind`]); the command layer decides which of
//! them are fatal for a given command.

use std::io;
use thiserror::Error;

/// Broad classification of an [`ElfError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Io,
    OutOfMemory,
    MalformedImage,
    SymbolNotFound,
    SectionNotFound,
}

#[derive(Debug, Error)]
pub enum ElfError {
    /// An open/seek/read/write call failed.
    #[error("{op}(): {target}")]
    Io {
        op: &'static str,
        target: String,
        #[source]
        source: io::Error,
    },

    #[error("cannot allocate {size} bytes")]
    OutOfMemory { size: usize },

    #[error("not an ELF file: bad magic number")]
    BadMagic,

    #[error("unknown ELF class {0}")]
    UnknownClass(u8),

    #[error("unknown ELF data encoding {0}")]
    UnknownEncoding(u8),

    #[error("{what} truncated at offset {offset:#x}, {needed} bytes needed")]
    Truncated {
        what: &'static str,
        offset: u64,
        needed: u64,
    },

    #[error("section header entry size is {found}, expected {expected}")]
    BadEntrySize { expected: u64, found: u64 },

    #[error("section header string table index {index} out of range ({count} sections)")]
    BadSectionIndex { index: usize, count: usize },

    #[error("string offset {offset:#x} out of range (table size {len:#x})")]
    StringOutOfRange { offset: u64, len: u64 },

    #[error("string at offset {offset:#x} is not NUL-terminated")]
    UnterminatedString { offset: u64 },

    #[error("symbol table present but no {0} section")]
    MissingStringTable(&'static str),

    #[error("symbol \"{symbol}\" at {address:#x} lies outside {section}")]
    PatchOutOfRange {
        symbol: String,
        section: &'static str,
        address: u64,
    },

    #[error("symbol \"{name}\" not found")]
    SymbolNotFound { name: String },

    #[error("section \"{name}\" not found")]
    SectionNotFound { name: String },
}

impl ElfError {
    pub fn io(op: &'static str, target: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            op,
            target: target.into(),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Io { .. } => ErrorKind::Io,
            Self::OutOfMemory { .. } => ErrorKind::OutOfMemory,
            Self::SymbolNotFound { .. } => ErrorKind::SymbolNotFound,
            Self::SectionNotFound { .. } => ErrorKind::SectionNotFound,
            Self::BadMagic
            | Self::UnknownClass(_)
            | Self::UnknownEncoding(_)
            | Self::Truncated { .. }
            | Self::BadEntrySize { .. }
            | Self::BadSectionIndex { .. }
            | Self::StringOutOfRange { .. }
            | Self::UnterminatedString { .. }
            | Self::MissingStringTable(_)
            | Self::PatchOutOfRange { .. } => ErrorKind::MalformedImage,
        }
    }

    /// Lookup misses. Fatal for query commands, benign for the patch command.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::SymbolNotFound | ErrorKind::SectionNotFound
        )
    }
}

pub type Result<T> = std::result::Result<T, ElfError>;
