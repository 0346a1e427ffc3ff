//! Synthetic ELF images for the integration tests.
//!
//! Images are assembled from the `object` crate's on-disk ELF structs, so the
//! byte layout comes from an independent definition of the format.
#![allow(dead_code)]

use object::elf;
use object::endian::{Endianness, U16, U32, U64};
use object::pod::bytes_of;
use std::path::{Path, PathBuf};

/// File offset of `.text` in every built image.
pub const TEXT_OFFSET: u64 = 0x40;
pub const TEXT_ADDRESS: u64 = 0x1000;
pub const TEXT_SIZE: usize = 0x100;
pub const DATA_ADDRESS: u64 = 0x2000;
pub const DATA_SIZE: usize = 0x10;

const SHSTRTAB: &[u8] = b"\0.text\0.data\0.symtab\0.strtab\0.shstrtab\0";
// Offsets of the names above.
const NAME_TEXT: u32 = 1;
const NAME_DATA: u32 = 7;
const NAME_SYMTAB: u32 = 13;
const NAME_STRTAB: u32 = 21;
const NAME_SHSTRTAB: u32 = 29;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Width {
    Elf32,
    Elf64,
}

pub const ALL: [(Width, Endianness); 4] = [
    (Width::Elf32, Endianness::Little),
    (Width::Elf32, Endianness::Big),
    (Width::Elf64, Endianness::Little),
    (Width::Elf64, Endianness::Big),
];

struct SectionEntry {
    name: u32,
    kind: u32,
    flags: u64,
    addr: u64,
    offset: u64,
    size: u64,
    link: u32,
    info: u32,
    align: u64,
    entsize: u64,
}

#[derive(Clone)]
pub struct ImageBuilder {
    width: Width,
    endian: Endianness,
    text: Vec<u8>,
    symbols: Vec<(Vec<u8>, u64, u64)>,
    symtab: bool,
}

impl ImageBuilder {
    pub fn new(width: Width, endian: Endianness) -> Self {
        Self {
            width,
            endian,
            text: vec![0x90; TEXT_SIZE],
            symbols: Vec::new(),
            symtab: true,
        }
    }

    pub fn symbol(self, name: &str, value: u64, size: u64) -> Self {
        self.raw_symbol(name.as_bytes(), value, size)
    }

    /// A symbol whose name need not be UTF-8.
    pub fn raw_symbol(mut self, name: &[u8], value: u64, size: u64) -> Self {
        self.symbols.push((name.to_vec(), value, size));
        self
    }

    /// Adds `_debug_flag` at `address` inside `.text`, holding `initial`.
    pub fn debug_flag(mut self, address: u64, initial: u8) -> Self {
        self.text[(address - TEXT_ADDRESS) as usize] = initial;
        self.symbol("_debug_flag", address, 1)
    }

    pub fn without_symtab(mut self) -> Self {
        self.symtab = false;
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut out = vec![0u8; TEXT_OFFSET as usize];

        let text_offset = out.len() as u64;
        out.extend_from_slice(&self.text);

        align(&mut out, 8);
        let data_offset = out.len() as u64;
        out.extend_from_slice(&[0xd0; DATA_SIZE]);

        let mut sections = vec![
            SectionEntry {
                name: 0,
                kind: elf::SHT_NULL,
                flags: 0,
                addr: 0,
                offset: 0,
                size: 0,
                link: 0,
                info: 0,
                align: 0,
                entsize: 0,
            },
            SectionEntry {
                name: NAME_TEXT,
                kind: elf::SHT_PROGBITS,
                flags: u64::from(elf::SHF_ALLOC | elf::SHF_EXECINSTR),
                addr: TEXT_ADDRESS,
                offset: text_offset,
                size: self.text.len() as u64,
                link: 0,
                info: 0,
                align: 16,
                entsize: 0,
            },
            SectionEntry {
                name: NAME_DATA,
                kind: elf::SHT_PROGBITS,
                flags: u64::from(elf::SHF_ALLOC | elf::SHF_WRITE),
                addr: DATA_ADDRESS,
                offset: data_offset,
                size: DATA_SIZE as u64,
                link: 0,
                info: 0,
                align: 8,
                entsize: 0,
            },
        ];

        if self.symtab {
            let mut strtab = vec![0u8];
            let mut names = Vec::new();
            for (name, _, _) in &self.symbols {
                names.push(strtab.len() as u32);
                strtab.extend_from_slice(name);
                strtab.push(0);
            }

            align(&mut out, 8);
            let symtab_offset = out.len() as u64;
            self.push_symbol(&mut out, 0, 0, 0, 0, elf::SHN_UNDEF);
            for ((_, value, size), name) in self.symbols.iter().zip(&names) {
                let info = (elf::STB_GLOBAL << 4) | elf::STT_OBJECT;
                self.push_symbol(&mut out, *name, *value, *size, info, 1);
            }
            let symtab_size = out.len() as u64 - symtab_offset;

            let strtab_offset = out.len() as u64;
            out.extend_from_slice(&strtab);

            let entsize = match self.width {
                Width::Elf32 => 16,
                Width::Elf64 => 24,
            };
            sections.push(SectionEntry {
                name: NAME_SYMTAB,
                kind: elf::SHT_SYMTAB,
                flags: 0,
                addr: 0,
                offset: symtab_offset,
                size: symtab_size,
                link: 4,
                info: 1,
                align: 8,
                entsize,
            });
            sections.push(SectionEntry {
                name: NAME_STRTAB,
                kind: elf::SHT_STRTAB,
                flags: 0,
                addr: 0,
                offset: strtab_offset,
                size: strtab.len() as u64,
                link: 0,
                info: 0,
                align: 1,
                entsize: 0,
            });
        }

        let shstrtab_offset = out.len() as u64;
        out.extend_from_slice(SHSTRTAB);
        sections.push(SectionEntry {
            name: NAME_SHSTRTAB,
            kind: elf::SHT_STRTAB,
            flags: 0,
            addr: 0,
            offset: shstrtab_offset,
            size: SHSTRTAB.len() as u64,
            link: 0,
            info: 0,
            align: 1,
            entsize: 0,
        });

        align(&mut out, 8);
        let shoff = out.len() as u64;
        for section in &sections {
            self.push_section(&mut out, section);
        }

        let header = self.file_header(shoff, sections.len() as u16);
        out[..header.len()].copy_from_slice(&header);
        out
    }

    /// Writes the image to `dir/name` and returns its path.
    pub fn write_to(&self, dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, self.build()).unwrap();
        path
    }

    fn file_header(&self, shoff: u64, shnum: u16) -> Vec<u8> {
        let e = self.endian;
        let (class, machine) = match (self.width, e) {
            (Width::Elf32, Endianness::Little) => (elf::ELFCLASS32, elf::EM_386),
            (Width::Elf32, Endianness::Big) => (elf::ELFCLASS32, elf::EM_PPC),
            (Width::Elf64, Endianness::Little) => (elf::ELFCLASS64, elf::EM_X86_64),
            (Width::Elf64, Endianness::Big) => (elf::ELFCLASS64, elf::EM_PPC64),
        };
        let ident = elf::Ident {
            magic: elf::ELFMAG,
            class,
            data: match e {
                Endianness::Little => elf::ELFDATA2LSB,
                Endianness::Big => elf::ELFDATA2MSB,
            },
            version: elf::EV_CURRENT,
            os_abi: elf::ELFOSABI_SYSV,
            abi_version: 0,
            padding: [0; 7],
        };
        let shstrndx = shnum - 1;
        match self.width {
            Width::Elf32 => bytes_of(&elf::FileHeader32::<Endianness> {
                e_ident: ident,
                e_type: U16::new(e, elf::ET_EXEC),
                e_machine: U16::new(e, machine),
                e_version: U32::new(e, u32::from(elf::EV_CURRENT)),
                e_entry: U32::new(e, TEXT_ADDRESS as u32),
                e_phoff: U32::new(e, 0),
                e_shoff: U32::new(e, shoff as u32),
                e_flags: U32::new(e, 0),
                e_ehsize: U16::new(e, 52),
                e_phentsize: U16::new(e, 32),
                e_phnum: U16::new(e, 0),
                e_shentsize: U16::new(e, 40),
                e_shnum: U16::new(e, shnum),
                e_shstrndx: U16::new(e, shstrndx),
            })
            .to_vec(),
            Width::Elf64 => bytes_of(&elf::FileHeader64::<Endianness> {
                e_ident: ident,
                e_type: U16::new(e, elf::ET_EXEC),
                e_machine: U16::new(e, machine),
                e_version: U32::new(e, u32::from(elf::EV_CURRENT)),
                e_entry: U64::new(e, TEXT_ADDRESS),
                e_phoff: U64::new(e, 0),
                e_shoff: U64::new(e, shoff),
                e_flags: U32::new(e, 0),
                e_ehsize: U16::new(e, 64),
                e_phentsize: U16::new(e, 56),
                e_phnum: U16::new(e, 0),
                e_shentsize: U16::new(e, 64),
                e_shnum: U16::new(e, shnum),
                e_shstrndx: U16::new(e, shstrndx),
            })
            .to_vec(),
        }
    }

    fn push_section(&self, out: &mut Vec<u8>, s: &SectionEntry) {
        let e = self.endian;
        match self.width {
            Width::Elf32 => out.extend_from_slice(bytes_of(&elf::SectionHeader32::<Endianness> {
                sh_name: U32::new(e, s.name),
                sh_type: U32::new(e, s.kind),
                sh_flags: U32::new(e, s.flags as u32),
                sh_addr: U32::new(e, s.addr as u32),
                sh_offset: U32::new(e, s.offset as u32),
                sh_size: U32::new(e, s.size as u32),
                sh_link: U32::new(e, s.link),
                sh_info: U32::new(e, s.info),
                sh_addralign: U32::new(e, s.align as u32),
                sh_entsize: U32::new(e, s.entsize as u32),
            })),
            Width::Elf64 => out.extend_from_slice(bytes_of(&elf::SectionHeader64::<Endianness> {
                sh_name: U32::new(e, s.name),
                sh_type: U32::new(e, s.kind),
                sh_flags: U64::new(e, s.flags),
                sh_addr: U64::new(e, s.addr),
                sh_offset: U64::new(e, s.offset),
                sh_size: U64::new(e, s.size),
                sh_link: U32::new(e, s.link),
                sh_info: U32::new(e, s.info),
                sh_addralign: U64::new(e, s.align),
                sh_entsize: U64::new(e, s.entsize),
            })),
        }
    }

    fn push_symbol(&self, out: &mut Vec<u8>, name: u32, value: u64, size: u64, info: u8, shndx: u16) {
        let e = self.endian;
        match self.width {
            Width::Elf32 => out.extend_from_slice(bytes_of(&elf::Sym32::<Endianness> {
                st_name: U32::new(e, name),
                st_value: U32::new(e, value as u32),
                st_size: U32::new(e, size as u32),
                st_info: info,
                st_other: elf::STV_DEFAULT,
                st_shndx: U16::new(e, shndx),
            })),
            Width::Elf64 => out.extend_from_slice(bytes_of(&elf::Sym64::<Endianness> {
                st_name: U32::new(e, name),
                st_info: info,
                st_other: elf::STV_DEFAULT,
                st_shndx: U16::new(e, shndx),
                st_value: U64::new(e, value),
                st_size: U64::new(e, size),
            })),
        }
    }
}

fn align(out: &mut Vec<u8>, to: usize) {
    let len = out.len().div_ceil(to) * to;
    out.resize(len, 0);
}

/// Byte offset of the ELF header field holding `e_shstrndx`, `e_shentsize`
/// etc., for corrupting images in tests.
pub fn header_field(width: Width, field: &str) -> usize {
    match (width, field) {
        (Width::Elf32, "e_shoff") => 32,
        (Width::Elf32, "e_shentsize") => 46,
        (Width::Elf32, "e_shstrndx") => 50,
        (Width::Elf64, "e_shoff") => 40,
        (Width::Elf64, "e_shentsize") => 58,
        (Width::Elf64, "e_shstrndx") => 62,
        _ => panic!("unknown header field {field}"),
    }
}
