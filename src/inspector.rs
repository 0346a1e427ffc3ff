//! Command execution.
//!
//! An [`Inspector`] carries one loaded image through the pipeline:
//! 1. Load: read the file and identify class and byte order.
//! 2. Analyze: decode the section header table (once, cached on the image).
//! 3. Execute: run a single command, writing its report to `out`.

use std::io::Write;
use std::path::Path;

use crate::config::Command;
use crate::error::Result;
use crate::image::Image;
use crate::patch::{self, PatchOutcome};
use crate::report;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The command printed its report.
    Reported,
    /// The patch command ran.
    Patched(PatchOutcome),
}

pub struct Inspector {
    image: Image,
}

impl Inspector {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self {
            image: Image::open(path)?,
        })
    }

    pub fn run(&mut self, command: &Command, out: &mut impl Write) -> Result<Outcome> {
        tracing::debug!(?command, file = %self.image.path().display(), "running command");
        let class = self.image.class();

        match command {
            Command::DumpSections => {
                let summary = self.image.analyze()?;
                report::dump_sections(out, summary)?;
            }
            Command::ObjectSizes => {
                let view = self.image.view()?;
                report::dump_symbols(out, class, &view.symbols()?)?;
            }
            Command::FindSymbol(name) => {
                let symbol = self.image.view()?.symbols()?.find(name)?;
                report::print_value(out, class, symbol.value)?;
            }
            Command::SectionVaddr(name) => {
                let section = self.image.analyze()?.section(name)?;
                report::print_value(out, class, section.address)?;
            }
            Command::SectionSize(name) => {
                let section = self.image.analyze()?.section(name)?;
                report::print_value(out, class, section.size)?;
            }
            Command::SetDebugFlag(value) => {
                let outcome = patch::set_debug_flag(&mut self.image, *value)?;
                return Ok(Outcome::Patched(outcome));
            }
        }
        Ok(Outcome::Reported)
    }
}
