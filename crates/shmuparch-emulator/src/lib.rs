//! Emulator launching for ShmupArch
//!
//! Resolves a selected catalog entry into a concrete launch specification
//! (core, ROM, run-ahead, DIP switches, output target) and turns that into a
//! RetroArch process.

mod launcher;
mod resolver;

pub use launcher::{CoreOptions, EmulatorLauncher, LaunchCommand, LaunchResult};
pub use resolver::{LaunchResolver, LaunchSpec, OutputTarget, RuntimeOptions, select_variant};

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmulatorError {
    #[error("ROM not found: {0}")]
    RomNotFound(PathBuf),

    #[error("Core not found: {0}")]
    CoreNotFound(PathBuf),

    #[error("Config not found: {0}")]
    ConfigNotFound(PathBuf),

    #[error("Unknown core: {0}")]
    UnknownCore(String),

    #[error("Launch failed: {0}")]
    LaunchFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// The launch target is ambiguous or unavailable. Recoverable: the message
/// is what the user is asked to act on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("No ROM found for {title}")]
    NoneAvailable { title: String },

    #[error("Choose a variant of {title}: {}", .candidates.join(", "))]
    Ambiguous {
        title: String,
        candidates: Vec<String>,
    },

    #[error("{title} has no variant '{rom}'")]
    UnknownVariant { title: String, rom: String },

    #[error("ROM '{rom}' is not available")]
    VariantUnavailable { rom: String },
}

/// Libretro cores ShmupArch launches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EmulatorCore {
    #[default]
    FbNeo,
    Mame,
}

impl EmulatorCore {
    /// Configuration name ("fbneo", "mame")
    pub fn short_name(&self) -> &'static str {
        match self {
            EmulatorCore::FbNeo => "fbneo",
            EmulatorCore::Mame => "mame",
        }
    }

    /// Core name as RetroArch reports it; also the per-core override folder
    pub fn display_name(&self) -> &'static str {
        match self {
            EmulatorCore::FbNeo => "FinalBurn Neo",
            EmulatorCore::Mame => "MAME",
        }
    }

    pub fn library_name(&self) -> &'static str {
        match self {
            EmulatorCore::FbNeo => "fbneo_libretro.so",
            EmulatorCore::Mame => "mame_libretro.so",
        }
    }

    /// Short tag for list rows and the footer
    pub fn tag(&self) -> &'static str {
        match self {
            EmulatorCore::FbNeo => "FBNeo",
            EmulatorCore::Mame => "MAME",
        }
    }
}

impl fmt::Display for EmulatorCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for EmulatorCore {
    type Err = EmulatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fbneo" | "fba" | "finalburn neo" => Ok(EmulatorCore::FbNeo),
            "mame" => Ok(EmulatorCore::Mame),
            _ => Err(EmulatorError::UnknownCore(s.to_string())),
        }
    }
}
