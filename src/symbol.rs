//! Symbol table access.
//!
//! The symbol table is scanned linearly; names are resolved through `.strtab`.

use crate::endian::ByteOrder;
use crate::error::{ElfError, Result};
use crate::layout::Class;
use crate::sections::{Region, StringTable, Summary, STRTAB};

/// The optional instrumentation byte toggled by `setdebugflag`.
pub const DEBUG_FLAG: &str = "_debug_flag";

/// One symbol table entry, with value and size widened to 64 bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Symbol {
    pub index: usize,
    /// Offset of the name in `.strtab`; 0 means unnamed.
    pub name_offset: u32,
    pub value: u64,
    pub size: u64,
    pub info: u8,
    pub other: u8,
    pub shndx: u16,
}

impl Symbol {
    pub fn is_named(&self) -> bool {
        self.name_offset != 0
    }

    pub fn binding(&self) -> u8 {
        self.info >> 4
    }

    pub fn kind(&self) -> u8 {
        self.info & 0xf
    }

    pub fn visibility(&self) -> u8 {
        self.other & 0x3
    }
}

/// View over the `.symtab` entries of an image.
pub struct SymbolTable<'a> {
    entries: &'a [u8],
    count: usize,
    class: Class,
    order: ByteOrder,
    strings: Option<StringTable<'a>>,
}

impl<'a> SymbolTable<'a> {
    /// An image without `.symtab` yields an empty table.
    pub fn new(image: &'a [u8], summary: &Summary, order: ByteOrder) -> Result<Self> {
        let class = summary.class;
        let Some(symtab) = summary.symtab else {
            return Ok(Self {
                entries: &[],
                count: 0,
                class,
                order,
                strings: None,
            });
        };
        let strtab = summary.strtab.ok_or(ElfError::MissingStringTable(STRTAB))?;

        let entries = slice(image, symtab)?;
        let count = entries.len() / class.symbol().entry_size as usize;
        Ok(Self {
            entries,
            count,
            class,
            order,
            strings: Some(StringTable::new(image, strtab)?),
        })
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn symbol(&self, index: usize) -> Result<Symbol> {
        const WHAT: &str = "symbol table";
        let layout = self.class.symbol();
        let at = index as u64 * layout.entry_size;
        let data = self.entries;
        let order = self.order;
        Ok(Symbol {
            index,
            name_offset: order.read_u32(data, at + layout.name, WHAT)?,
            value: self.class.read_word(order, data, at + layout.value, WHAT)?,
            size: self.class.read_word(order, data, at + layout.size, WHAT)?,
            info: order.read_u8(data, at + layout.info, WHAT)?,
            other: order.read_u8(data, at + layout.other, WHAT)?,
            shndx: order.read_u16(data, at + layout.shndx, WHAT)?,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = Result<Symbol>> + '_ {
        (0..self.count).map(move |index| self.symbol(index))
    }

    /// Raw name bytes of `symbol`.
    pub fn name(&self, symbol: &Symbol) -> Result<&'a [u8]> {
        match self.strings {
            Some(strings) => strings.get(u64::from(symbol.name_offset)),
            None => Err(ElfError::MissingStringTable(STRTAB)),
        }
    }

    /// First named symbol called `name`, in table order.
    pub fn find(&self, name: &str) -> Result<Symbol> {
        for symbol in self.iter() {
            let symbol = symbol?;
            if symbol.is_named() && self.name(&symbol)? == name.as_bytes() {
                tracing::debug!(symbol = name, index = symbol.index, value = symbol.value, "symbol resolved");
                return Ok(symbol);
            }
        }
        Err(ElfError::SymbolNotFound {
            name: name.to_string(),
        })
    }
}

fn slice(image: &[u8], region: Region) -> Result<&[u8]> {
    usize::try_from(region.offset)
        .ok()
        .zip(usize::try_from(region.size).ok())
        .and_then(|(start, size)| image.get(start..start.checked_add(size)?))
        .ok_or(ElfError::Truncated {
            what: "symbol table",
            offset: region.offset,
            needed: region.size,
        })
}
