//! In-place byte patching.
//!
//! The patch location is computed from the analyzed image, then the byte is
//! read back from the file itself and only rewritten when it differs from the
//! requested value, so repeated runs leave the file (and its mtime) alone.

use std::io::{Read, Seek, SeekFrom, Write};

use crate::error::{ElfError, Result};
use crate::image::Image;
use crate::sections::{Region, TEXT};
use crate::symbol::DEBUG_FLAG;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchOutcome {
    /// The byte at `offset` was `previous` and now holds `value`.
    Written { offset: u64, previous: u8, value: u8 },
    /// The byte at `offset` already held `value`; nothing was written.
    Unchanged { offset: u64, value: u8 },
    /// The target symbol (or the section holding it) is not in the image.
    Skipped,
}

/// File offset of `address`, which must lie inside the code section.
pub fn file_offset(text: Region, base: u64, address: u64, symbol: &str, file_len: u64) -> Result<u64> {
    let out_of_range = || ElfError::PatchOutOfRange {
        symbol: symbol.to_string(),
        section: TEXT,
        address,
    };
    if !text.contains(address) {
        return Err(out_of_range());
    }
    let offset = text
        .offset
        .checked_add(address - text.address)
        .filter(|&offset| offset < file_len)
        .ok_or_else(out_of_range)?;
    Ok(base + offset)
}

/// Reads the byte at `offset` and replaces it with `value` if it differs.
///
/// `target` names the file in error messages.
pub fn write_byte<F>(file: &mut F, offset: u64, value: u8, target: &str) -> Result<PatchOutcome>
where
    F: Read + Write + Seek,
{
    file.seek(SeekFrom::Start(offset))
        .map_err(|e| ElfError::io("lseek", target, e))?;
    let mut current = [0u8; 1];
    file.read_exact(&mut current)
        .map_err(|e| ElfError::io("read", target, e))?;
    if current[0] == value {
        return Ok(PatchOutcome::Unchanged { offset, value });
    }

    file.seek(SeekFrom::Start(offset))
        .map_err(|e| ElfError::io("lseek", target, e))?;
    file.write_all(&[value])
        .map_err(|e| ElfError::io("write", target, e))?;
    file.flush().map_err(|e| ElfError::io("write", target, e))?;
    Ok(PatchOutcome::Written {
        offset,
        previous: current[0],
        value,
    })
}

/// Sets the `_debug_flag` byte of `image` to `value`.
///
/// An image built without the flag is left untouched and reported as
/// [`PatchOutcome::Skipped`].
pub fn set_debug_flag(image: &mut Image, value: u8) -> Result<PatchOutcome> {
    let target = image.path().display().to_string();
    let base = image.base();

    let (text, address, file_len) = {
        let view = image.view()?;
        let symbol = match view.symbols()?.find(DEBUG_FLAG) {
            Ok(symbol) => symbol,
            Err(e) if e.is_not_found() => {
                tracing::info!("symbol \"{}\" not found, skipping.", DEBUG_FLAG);
                return Ok(PatchOutcome::Skipped);
            }
            Err(e) => return Err(e),
        };
        let Some(text) = view.summary.text else {
            tracing::info!("section \"{}\" not found, skipping.", TEXT);
            return Ok(PatchOutcome::Skipped);
        };
        (text, symbol.value, view.data.len() as u64)
    };

    let offset = file_offset(text, base, address, DEBUG_FLAG, file_len)?;
    let outcome = write_byte(image.file_mut(), offset, value, &target)?;
    match outcome {
        PatchOutcome::Written { previous, .. } => {
            tracing::debug!(offset, previous, value, "debug flag written");
            tracing::info!("done updating ELF file \"{}\".", target);
        }
        _ => tracing::info!("ELF file \"{}\" already up to date.", target),
    }
    Ok(outcome)
}
