//! Structural analysis.
//!
//! Walks the section header table once, resolves every section name through
//! the section-name string table and records where the sections the other
//! commands need (`.text`, `.symtab`, `.strtab`) live in the file. The result
//! is a width-independent [`Summary`]; nothing downstream looks at the raw
//! headers again.

use crate::endian::ByteOrder;
use crate::error::{ElfError, Result};
use crate::layout::Class;

pub const TEXT: &str = ".text";
pub const SYMTAB: &str = ".symtab";
pub const STRTAB: &str = ".strtab";

/// One entry of the section header table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub index: usize,
    /// Offset of the name in the section-name string table.
    pub name_offset: u32,
    pub name: String,
    pub kind: u32,
    pub flags: u64,
    pub address: u64,
    pub offset: u64,
    pub size: u64,
    pub link: u32,
    pub info: u32,
    pub addralign: u64,
    pub entsize: u64,
}

/// File placement of a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub offset: u64,
    pub size: u64,
    pub address: u64,
}

impl Region {
    fn of(section: &Section) -> Self {
        Self {
            offset: section.offset,
            size: section.size,
            address: section.address,
        }
    }

    /// Whether `address` falls inside the section's address range.
    pub fn contains(&self, address: u64) -> bool {
        address >= self.address && address - self.address < self.size
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub class: Class,
    pub phoff: u64,
    pub shoff: u64,
    pub shentsize: u64,
    pub shstrndx: usize,
    pub sections: Vec<Section>,
    /// `None` only for images without a section header table.
    pub shstrtab: Option<Region>,
    pub strtab: Option<Region>,
    pub symtab: Option<Region>,
    pub text: Option<Region>,
    /// Length of the longest section name.
    pub max_name_len: usize,
}

impl Summary {
    /// First section called `name`, in table order.
    pub fn section(&self, name: &str) -> Result<&Section> {
        self.sections
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| ElfError::SectionNotFound {
                name: name.to_string(),
            })
    }
}

/// A blob of NUL-terminated strings addressed by byte offset.
#[derive(Debug, Clone, Copy)]
pub struct StringTable<'a> {
    data: &'a [u8],
}

impl<'a> StringTable<'a> {
    /// Borrows the bytes of `region` out of the image, checking that the whole
    /// table lies inside it.
    pub fn new(image: &'a [u8], region: Region) -> Result<Self> {
        let data = usize::try_from(region.offset)
            .ok()
            .zip(usize::try_from(region.size).ok())
            .and_then(|(start, size)| image.get(start..start.checked_add(size)?))
            .ok_or(ElfError::Truncated {
                what: "string table",
                offset: region.offset,
                needed: region.size,
            })?;
        Ok(Self { data })
    }

    /// The bytes of the string starting at `offset`, without its terminator.
    /// ELF does not require names to be UTF-8, so none is assumed here.
    pub fn get(&self, offset: u64) -> Result<&'a [u8]> {
        let rest = usize::try_from(offset)
            .ok()
            .and_then(|start| self.data.get(start..))
            .filter(|rest| !rest.is_empty())
            .ok_or(ElfError::StringOutOfRange {
                offset,
                len: self.data.len() as u64,
            })?;
        let end = rest
            .iter()
            .position(|&b| b == 0)
            .ok_or(ElfError::UnterminatedString { offset })?;
        Ok(&rest[..end])
    }
}

/// Decodes the file header and section header table of an image.
pub fn analyze(data: &[u8], class: Class, order: ByteOrder) -> Result<Summary> {
    const WHAT: &str = "file header";
    let header = class.header();
    let phoff = class.read_word(order, data, header.phoff, WHAT)?;
    let shoff = class.read_word(order, data, header.shoff, WHAT)?;
    let shentsize = u64::from(order.read_u16(data, header.shentsize, WHAT)?);
    let shnum = usize::from(order.read_u16(data, header.shnum, WHAT)?);
    let shstrndx = usize::from(order.read_u16(data, header.shstrndx, WHAT)?);

    let mut summary = Summary {
        class,
        phoff,
        shoff,
        shentsize,
        shstrndx,
        sections: Vec::with_capacity(shnum),
        shstrtab: None,
        strtab: None,
        symtab: None,
        text: None,
        max_name_len: 0,
    };
    if shnum == 0 {
        tracing::debug!("no section header table");
        return Ok(summary);
    }

    let expected = class.section().entry_size;
    if shentsize != expected {
        return Err(ElfError::BadEntrySize {
            expected,
            found: shentsize,
        });
    }
    if shstrndx >= shnum {
        return Err(ElfError::BadSectionIndex {
            index: shstrndx,
            count: shnum,
        });
    }

    for index in 0..shnum {
        let at = (index as u64)
            .checked_mul(shentsize)
            .and_then(|rel| shoff.checked_add(rel))
            .ok_or(ElfError::Truncated {
                what: "section header table",
                offset: shoff,
                needed: shentsize,
            })?;
        summary
            .sections
            .push(read_section(data, class, order, at, index)?);
    }

    let shstrtab = Region::of(&summary.sections[shstrndx]);
    let names = StringTable::new(data, shstrtab)?;
    summary.shstrtab = Some(shstrtab);

    for section in &mut summary.sections {
        let name = names.get(u64::from(section.name_offset))?;
        section.name = String::from_utf8_lossy(name).into_owned();
        summary.max_name_len = summary.max_name_len.max(section.name.chars().count());

        let slot = match section.name.as_str() {
            STRTAB => &mut summary.strtab,
            SYMTAB => &mut summary.symtab,
            TEXT => &mut summary.text,
            _ => continue,
        };
        if slot.is_none() {
            *slot = Some(Region::of(section));
        }
    }

    tracing::debug!(
        sections = shnum,
        max_name_len = summary.max_name_len,
        text = summary.text.is_some(),
        symtab = summary.symtab.is_some(),
        strtab = summary.strtab.is_some(),
        "section headers analyzed"
    );
    Ok(summary)
}

fn read_section(
    data: &[u8],
    class: Class,
    order: ByteOrder,
    at: u64,
    index: usize,
) -> Result<Section> {
    const WHAT: &str = "section header";
    let layout = class.section();
    // Only the word-sized fields change width with the class.
    let word = |field: u64| class.read_word(order, data, at.saturating_add(field), WHAT);
    let u32_at = |field: u64| order.read_u32(data, at.saturating_add(field), WHAT);

    Ok(Section {
        index,
        name_offset: u32_at(layout.name)?,
        name: String::new(),
        kind: u32_at(layout.kind)?,
        flags: word(layout.flags)?,
        address: word(layout.addr)?,
        offset: word(layout.offset)?,
        size: word(layout.size)?,
        link: u32_at(layout.link)?,
        info: u32_at(layout.info)?,
        addralign: word(layout.addralign)?,
        entsize: word(layout.entsize)?,
    })
}
