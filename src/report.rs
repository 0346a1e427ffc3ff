//! Text output.
//!
//! Addresses and sizes are printed as `0x`-prefixed upper-case hex, zero
//! padded to 8 digits for ELF32 images and 16 digits for ELF64 images.

use std::io::Write;

use crate::error::{ElfError, Result};
use crate::layout::Class;
use crate::sections::Summary;
use crate::symbol::SymbolTable;
use crate::utils::{compute_tabs, expand_tabs};

const HEADING_NAME: &str = "Name";
const UNNAMED: &str = "<NULL>";

pub fn hex(class: Class, value: u64) -> String {
    format!("0x{:0width$X}", value, width = class.hex_width())
}

/// Digits used for the index column, chosen from the section count.
pub fn index_digits(count: usize) -> usize {
    match count {
        0..=9 => 1,
        10..=99 => 2,
        100..=999 => 3,
        _ => 6,
    }
}

/// Prints the section table: index, name, address and size per section.
pub fn dump_sections(out: &mut impl Write, summary: &Summary) -> Result<()> {
    let class = summary.class;
    let width = summary.max_name_len.max(HEADING_NAME.len());

    let mut line = format!("Index\t{HEADING_NAME}");
    push_tabs(&mut line, HEADING_NAME, width);
    line.push_str(match class {
        Class::Elf32 => "Address\t\tSize\n",
        Class::Elf64 => "Address\t\t\tSize\n",
    });
    emit(out, &line)?;

    let digits = index_digits(summary.sections.len());
    for section in &summary.sections {
        let name = if section.name.is_empty() {
            UNNAMED
        } else {
            section.name.as_str()
        };
        let mut line = format!("{:0digits$}:\t{}", section.index, name);
        push_tabs(&mut line, name, width);
        line.push_str(&format!(
            "{}\t{}\n",
            hex(class, section.address),
            hex(class, section.size)
        ));
        emit(out, &line)?;
    }
    Ok(())
}

/// Prints every named symbol with its value, size and info byte.
pub fn dump_symbols(out: &mut impl Write, class: Class, symbols: &SymbolTable<'_>) -> Result<()> {
    for symbol in symbols.iter() {
        let symbol = symbol?;
        if !symbol.is_named() {
            continue;
        }
        let line = format!(
            "value: {} size: {} info: 0x{:02X} name: {}\n",
            hex(class, symbol.value),
            hex(class, symbol.size),
            symbol.info,
            String::from_utf8_lossy(symbols.name(&symbol)?)
        );
        emit(out, &line)?;
    }
    Ok(())
}

/// Prints a single hex value on its own line.
pub fn print_value(out: &mut impl Write, class: Class, value: u64) -> Result<()> {
    emit(out, &format!("{}\n", hex(class, value)))
}

fn push_tabs(line: &mut String, field: &str, width: usize) {
    for _ in 0..compute_tabs(field, width) {
        line.push('\t');
    }
}

fn emit(out: &mut impl Write, line: &str) -> Result<()> {
    out.write_all(expand_tabs(line).as_bytes())
        .map_err(|e| ElfError::io("write", "<stdout>", e))
}
