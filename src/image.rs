//! Image loading.
//!
//! An [`Image`] owns the open target file and a full in-memory copy of it.
//! The copy is only ever read; patches go through the file handle.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use crate::endian::{ByteOrder, Encoding};
use crate::error::{ElfError, Result};
use crate::layout::{Class, EI_CLASS, EI_DATA, EI_NIDENT, ELFMAG};
use crate::sections::{self, Summary};
use crate::symbol::SymbolTable;

pub struct Image {
    path: PathBuf,
    file: File,
    data: Vec<u8>,
    /// Offset of the ELF object inside the file. Always 0 for plain objects;
    /// kept for archive members.
    base: u64,
    class: Class,
    order: ByteOrder,
    summary: Option<Summary>,
}

impl Image {
    /// Opens `path` for reading and writing and loads the whole file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let name = path.display().to_string();

        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|e| ElfError::io("open", &name, e))?;
        let len = file
            .metadata()
            .map_err(|e| ElfError::io("stat", &name, e))?
            .len();
        let data = read_all(&mut file, len, &name)?;
        let (class, encoding) = identify(&data)?;

        tracing::debug!(
            file = %name,
            size = data.len(),
            class = class.bits(),
            encoding = ?encoding,
            "image loaded"
        );

        Ok(Self {
            path: path.to_path_buf(),
            file,
            data,
            base: 0,
            class,
            order: ByteOrder::new(encoding),
            summary: None,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn base(&self) -> u64 {
        self.base
    }

    pub fn class(&self) -> Class {
        self.class
    }

    pub fn order(&self) -> ByteOrder {
        self.order
    }

    pub fn file_mut(&mut self) -> &mut File {
        &mut self.file
    }

    /// Runs the structural analysis once and caches the result.
    pub fn analyze(&mut self) -> Result<&Summary> {
        self.view().map(|view| view.summary)
    }

    /// The analyzed image together with the bytes it describes.
    pub fn view(&mut self) -> Result<View<'_>> {
        let summary = match self.summary.take() {
            Some(summary) => summary,
            None => sections::analyze(&self.data, self.class, self.order)?,
        };
        Ok(View {
            data: &self.data,
            order: self.order,
            summary: self.summary.insert(summary),
        })
    }
}

/// Borrowed view of an analyzed image.
#[derive(Clone, Copy)]
pub struct View<'a> {
    pub data: &'a [u8],
    pub order: ByteOrder,
    pub summary: &'a Summary,
}

impl<'a> View<'a> {
    pub fn symbols(&self) -> Result<SymbolTable<'a>> {
        SymbolTable::new(self.data, self.summary, self.order)
    }
}

fn read_all(file: &mut File, len: u64, name: &str) -> Result<Vec<u8>> {
    let size = usize::try_from(len).map_err(|_| ElfError::OutOfMemory { size: usize::MAX })?;
    let mut data = Vec::new();
    data.try_reserve_exact(size)
        .map_err(|_| ElfError::OutOfMemory { size })?;
    file.seek(SeekFrom::Start(0))
        .map_err(|e| ElfError::io("lseek", name, e))?;
    file.read_to_end(&mut data)
        .map_err(|e| ElfError::io("read", name, e))?;
    Ok(data)
}

/// Checks the magic number and decodes the class and encoding bytes of the
/// identification block.
pub fn identify(data: &[u8]) -> Result<(Class, Encoding)> {
    if data.len() < EI_NIDENT || data[..ELFMAG.len()] != ELFMAG {
        return Err(ElfError::BadMagic);
    }
    let class = Class::from_ident(data[EI_CLASS])?;
    let encoding = Encoding::from_ident(data[EI_DATA])?;
    Ok((class, encoding))
}
