//! Byte order handling.
//!
//! Fields are loaded in host order and then passed through [`ByteOrder`], which
//! swaps them only when the image's encoding differs from the host's. The swap
//! decision is made once, when the image is loaded, and travels with the value.

use crate::error::{ElfError, Result};

/// `EI_DATA` value for little-endian images.
pub const ELFDATA2LSB: u8 = 1;
/// `EI_DATA` value for big-endian images.
pub const ELFDATA2MSB: u8 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Little,
    Big,
}

impl Encoding {
    pub fn from_ident(byte: u8) -> Result<Self> {
        match byte {
            ELFDATA2LSB => Ok(Encoding::Little),
            ELFDATA2MSB => Ok(Encoding::Big),
            other => Err(ElfError::UnknownEncoding(other)),
        }
    }

    /// Probes the host: store a known 32-bit pattern and look at the byte that
    /// lands first in memory.
    pub fn host() -> Self {
        let probe = 0x0102_0304u32.to_ne_bytes();
        if probe[0] == 0x04 {
            Encoding::Little
        } else {
            Encoding::Big
        }
    }
}

/// The byte order of one image relative to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteOrder {
    encoding: Encoding,
    swap: bool,
}

impl ByteOrder {
    pub fn new(encoding: Encoding) -> Self {
        Self::with_host(encoding, Encoding::host())
    }

    pub fn with_host(encoding: Encoding, host: Encoding) -> Self {
        Self {
            encoding,
            swap: encoding != host,
        }
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    pub fn needs_swap(&self) -> bool {
        self.swap
    }

    pub fn swap16(&self, x: u16) -> u16 {
        if self.swap { x.swap_bytes() } else { x }
    }

    pub fn swap32(&self, x: u32) -> u32 {
        if self.swap { x.swap_bytes() } else { x }
    }

    pub fn swap64(&self, x: u64) -> u64 {
        if self.swap { x.swap_bytes() } else { x }
    }

    pub fn read_u8(&self, data: &[u8], offset: u64, what: &'static str) -> Result<u8> {
        let [b] = field::<1>(data, offset, what)?;
        Ok(b)
    }

    pub fn read_u16(&self, data: &[u8], offset: u64, what: &'static str) -> Result<u16> {
        field(data, offset, what).map(|b| self.swap16(u16::from_ne_bytes(b)))
    }

    pub fn read_u32(&self, data: &[u8], offset: u64, what: &'static str) -> Result<u32> {
        field(data, offset, what).map(|b| self.swap32(u32::from_ne_bytes(b)))
    }

    pub fn read_u64(&self, data: &[u8], offset: u64, what: &'static str) -> Result<u64> {
        field(data, offset, what).map(|b| self.swap64(u64::from_ne_bytes(b)))
    }
}

/// Copies `N` bytes at `offset` out of `data`, failing instead of reading past
/// the end.
fn field<const N: usize>(data: &[u8], offset: u64, what: &'static str) -> Result<[u8; N]> {
    let truncated = || ElfError::Truncated {
        what,
        offset,
        needed: N as u64,
    };
    let start = usize::try_from(offset).map_err(|_| truncated())?;
    let end = start.checked_add(N).ok_or_else(truncated)?;
    let bytes = data.get(start..end).ok_or_else(truncated)?;
    let mut out = [0u8; N];
    out.copy_from_slice(bytes);
    Ok(out)
}
