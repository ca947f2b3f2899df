//! Shmup catalog for ShmupArch
//!
//! Holds the curated arcade catalog, groups ROM variants into logical
//! entries, tracks which ROMs are present on disk, and provides the query
//! and sort engines the launcher UI runs on every keystroke.

mod difficulty;
mod display;
pub mod filter;
mod game;
mod grouper;
mod scanner;
pub mod sort;
mod store;

pub use difficulty::{DifficultyTier, normalize};
pub use game::{
    DifficultyRating, DifficultyScale, GameDefinition, Orientation, Platform, RomVariant, Routing,
};
pub use grouper::{LogicalEntry, group};
pub use scanner::{AvailabilityChecker, ScanResult};
pub use sort::SortKey;
pub use store::Catalog;

use thiserror::Error;

/// Invalid catalog data. Fatal: a single bad record aborts the whole load.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Duplicate game identifier: {0}")]
    DuplicateId(String),

    #[error("Duplicate ROM '{rom}' in game '{game}'")]
    DuplicateRom { game: String, rom: String },

    #[error("Quality rating {value} out of range 1-10 for game '{game}'")]
    QualityOutOfRange { game: String, value: u8 },

    #[error("{scale} difficulty {value} out of range for game '{game}'")]
    DifficultyOutOfRange {
        game: String,
        scale: DifficultyScale,
        value: u8,
    },

    #[error("Run-ahead of {value} frames out of range 0-6 for game '{game}'")]
    RunaheadOutOfRange { game: String, value: u8 },

    #[error("Empty {field} in game '{game}'")]
    EmptyField { game: String, field: &'static str },

    #[error("Catalog parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_error_display() {
        let err = CatalogError::DuplicateRom {
            game: "ddonpach".to_string(),
            rom: "ddonpachj".to_string(),
        };
        assert!(format!("{}", err).contains("ddonpachj"));

        let err = CatalogError::DifficultyOutOfRange {
            game: "x".to_string(),
            scale: DifficultyScale::Japanese,
            value: 46,
        };
        assert!(format!("{}", err).contains("Japanese"));
    }
}
