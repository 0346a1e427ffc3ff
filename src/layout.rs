//! On-disk record layouts.
//!
//! The file header, section headers and symbols have different field widths
//! and field orders in the two ELF classes. This module describes both
//! layouts as tables of byte offsets so that the readers can stay
//! class-agnostic: every address/offset/size-like field ("word") is widened to
//! `u64` on read. Name fields are 32 bits wide in both classes.

use crate::endian::ByteOrder;
use crate::error::{ElfError, Result};

pub const ELFMAG: [u8; 4] = *b"\x7fELF";
pub const EI_CLASS: usize = 4;
pub const EI_DATA: usize = 5;
pub const EI_NIDENT: usize = 16;

pub const ELFCLASS32: u8 = 1;
pub const ELFCLASS64: u8 = 2;

/// Address width of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Class {
    Elf32,
    Elf64,
}

/// Offsets of the file header fields read by the analyzer.
#[derive(Debug)]
pub struct HeaderLayout {
    pub entry_size: u64,
    pub phoff: u64,
    pub shoff: u64,
    pub shentsize: u64,
    pub shnum: u64,
    pub shstrndx: u64,
}

/// Offsets of the section header fields.
#[derive(Debug)]
pub struct SectionLayout {
    pub entry_size: u64,
    pub name: u64,
    pub kind: u64,
    pub flags: u64,
    pub addr: u64,
    pub offset: u64,
    pub size: u64,
    pub link: u64,
    pub info: u64,
    pub addralign: u64,
    pub entsize: u64,
}

/// Offsets of the symbol table entry fields.
#[derive(Debug)]
pub struct SymbolLayout {
    pub entry_size: u64,
    pub name: u64,
    pub value: u64,
    pub size: u64,
    pub info: u64,
    pub other: u64,
    pub shndx: u64,
}

const HEADER32: HeaderLayout = HeaderLayout {
    entry_size: 52,
    phoff: 28,
    shoff: 32,
    shentsize: 46,
    shnum: 48,
    shstrndx: 50,
};

const HEADER64: HeaderLayout = HeaderLayout {
    entry_size: 64,
    phoff: 32,
    shoff: 40,
    shentsize: 58,
    shnum: 60,
    shstrndx: 62,
};

const SECTION32: SectionLayout = SectionLayout {
    entry_size: 40,
    name: 0,
    kind: 4,
    flags: 8,
    addr: 12,
    offset: 16,
    size: 20,
    link: 24,
    info: 28,
    addralign: 32,
    entsize: 36,
};

const SECTION64: SectionLayout = SectionLayout {
    entry_size: 64,
    name: 0,
    kind: 4,
    flags: 8,
    addr: 16,
    offset: 24,
    size: 32,
    link: 40,
    info: 44,
    addralign: 48,
    entsize: 56,
};

// Elf32_Sym keeps value/size ahead of info/other/shndx, Elf64_Sym moves them
// to the end so the 64-bit words stay aligned.
const SYMBOL32: SymbolLayout = SymbolLayout {
    entry_size: 16,
    name: 0,
    value: 4,
    size: 8,
    info: 12,
    other: 13,
    shndx: 14,
};

const SYMBOL64: SymbolLayout = SymbolLayout {
    entry_size: 24,
    name: 0,
    info: 4,
    other: 5,
    shndx: 6,
    value: 8,
    size: 16,
};

impl Class {
    pub fn from_ident(byte: u8) -> Result<Self> {
        match byte {
            ELFCLASS32 => Ok(Class::Elf32),
            ELFCLASS64 => Ok(Class::Elf64),
            other => Err(ElfError::UnknownClass(other)),
        }
    }

    pub fn bits(self) -> u32 {
        match self {
            Class::Elf32 => 32,
            Class::Elf64 => 64,
        }
    }

    pub fn header(self) -> &'static HeaderLayout {
        match self {
            Class::Elf32 => &HEADER32,
            Class::Elf64 => &HEADER64,
        }
    }

    pub fn section(self) -> &'static SectionLayout {
        match self {
            Class::Elf32 => &SECTION32,
            Class::Elf64 => &SECTION64,
        }
    }

    pub fn symbol(self) -> &'static SymbolLayout {
        match self {
            Class::Elf32 => &SYMBOL32,
            Class::Elf64 => &SYMBOL64,
        }
    }

    /// Number of hex digits used when printing an address of this class.
    pub fn hex_width(self) -> usize {
        match self {
            Class::Elf32 => 8,
            Class::Elf64 => 16,
        }
    }

    /// Reads an address-sized field and widens it to 64 bits.
    pub fn read_word(
        self,
        order: ByteOrder,
        data: &[u8],
        offset: u64,
        what: &'static str,
    ) -> Result<u64> {
        match self {
            Class::Elf32 => order.read_u32(data, offset, what).map(u64::from),
            Class::Elf64 => order.read_u64(data, offset, what),
        }
    }
}
