//! Game definitions and ROM variants

use serde::{Deserialize, Serialize};
use std::fmt;

/// Hardware family a game runs on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    #[default]
    Arcade,
    NeoGeo,
}

/// Screen orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Tate
    #[default]
    Vertical,
    /// Yoko
    Horizontal,
}

/// Route complexity for a one-credit clear
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Routing {
    #[default]
    Low,
    Medium,
    High,
}

impl Routing {
    /// Lowercase label matched by `r:` queries
    pub fn label(&self) -> &'static str {
        match self {
            Routing::Low => "low",
            Routing::Medium => "medium",
            Routing::High => "high",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Routing::Low => "Low",
            Routing::Medium => "Medium",
            Routing::High => "High",
        }
    }

    pub fn short_name(&self) -> &'static str {
        match self {
            Routing::Low => "L",
            Routing::Medium => "M",
            Routing::High => "H",
        }
    }
}

/// The two community difficulty scales
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyScale {
    /// English 1CC difficulty index, 1-10
    Western,
    /// Japanese difficulty index, 0-45
    Japanese,
}

impl DifficultyScale {
    /// Inclusive bounds of the scale
    pub fn bounds(&self) -> (u8, u8) {
        match self {
            DifficultyScale::Western => (1, 10),
            DifficultyScale::Japanese => (0, 45),
        }
    }

    pub fn contains(&self, value: u8) -> bool {
        let (min, max) = self.bounds();
        (min..=max).contains(&value)
    }
}

impl fmt::Display for DifficultyScale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DifficultyScale::Western => write!(f, "Western"),
            DifficultyScale::Japanese => write!(f, "Japanese"),
        }
    }
}

/// A raw difficulty value tagged with the scale it was expressed in.
///
/// Raw values are never compared across scales; use [`crate::normalize`]
/// for anything that orders or filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifficultyRating {
    pub scale: DifficultyScale,
    pub value: u8,
}

impl DifficultyRating {
    pub fn western(value: u8) -> Self {
        Self {
            scale: DifficultyScale::Western,
            value,
        }
    }

    pub fn japanese(value: u8) -> Self {
        Self {
            scale: DifficultyScale::Japanese,
            value,
        }
    }
}

/// One concrete release (region or revision) of a game
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RomVariant {
    /// ROM key, the file stem under the ROM root (e.g. "ddonpachj")
    pub rom: String,

    /// Region or revision label, empty for the parent set
    pub label: String,

    /// Whether a backing ROM file was found by the last scan
    #[serde(default)]
    pub available: bool,
}

impl RomVariant {
    pub fn new(rom: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            rom: rom.into(),
            label: label.into(),
            available: false,
        }
    }

    /// Label shown in the variant picker
    pub fn display_label(&self) -> &str {
        if self.label.is_empty() {
            "World/International"
        } else {
            &self.label
        }
    }
}

/// A catalog game
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameDefinition {
    /// Stable identifier, unique across the catalog (the parent ROM key)
    pub id: String,
    pub title: String,
    pub developer: String,
    pub year: Option<u16>,
    pub platform: Platform,
    pub orientation: Orientation,

    /// Quality on the 1CC index, 1-10, higher is better
    pub quality: Option<u8>,

    /// Difficulty ratings, most preferred first
    pub ratings: Vec<DifficultyRating>,

    /// Clear goal the Japanese rating refers to (e.g. "2-ALL")
    pub goal_jp: Option<String>,

    pub routing: Routing,

    /// Suggested run-ahead frame count
    pub runahead: Option<u8>,

    /// Needs the MAME core (ST-V, Naomi and similar boards)
    pub requires_mame: bool,

    pub aliases: Vec<String>,
    pub notes: Option<String>,

    /// ROM variants in declared order; the first is the default pick
    pub variants: Vec<RomVariant>,
}

impl GameDefinition {
    /// Rating used for normalization and comparisons
    pub fn primary_rating(&self) -> Option<DifficultyRating> {
        self.ratings.first().copied()
    }

    /// Raw rating on a specific scale, if the game has one
    pub fn rating(&self, scale: DifficultyScale) -> Option<u8> {
        self.ratings
            .iter()
            .find(|r| r.scale == scale)
            .map(|r| r.value)
    }

    /// Find a variant by ROM key
    pub fn variant(&self, rom: &str) -> Option<&RomVariant> {
        self.variants.iter().find(|v| v.rom == rom)
    }
}
