//! ELF object inspection and patching.
//!
//! This library provides the core components of the `elftool` utility.
//! It is organized into several modules:
//! - `config`: CLI configuration and command parsing.
//! - `endian`: Byte order detection and field normalization.
//! - `layout`: On-disk record layouts of the two ELF classes.
//! - `image`: Loading and identifying the target file.
//! - `sections`: Section header table analysis and string tables.
//! - `symbol`: Symbol table scanning.
//! - `patch`: In-place debug flag patching.
//! - `report`: Text output.
//! - `inspector`: Command orchestration.

pub mod config;
pub mod endian;
pub mod error;
pub mod image;
pub mod inspector;
pub mod layout;
pub mod logging;
pub mod patch;
pub mod report;
pub mod sections;
pub mod symbol;
pub mod utils;
