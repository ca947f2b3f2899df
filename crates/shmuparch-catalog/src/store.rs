//! Catalog store: loads and validates the game fixture

use crate::{
    AvailabilityChecker, CatalogError, DifficultyRating, GameDefinition, LogicalEntry,
    Orientation, Platform, RomVariant, Routing, ScanResult, group,
};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

/// Bundled catalog fixture
const BUNDLED_CATALOG: &str = include_str!("../data/games.toml");

/// Largest run-ahead frame count a game may suggest
const MAX_RUNAHEAD: u8 = 6;

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default, rename = "game")]
    games: Vec<GameRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct GameRecord {
    id: String,
    title: String,
    developer: String,
    #[serde(default)]
    year: Option<u16>,
    #[serde(default)]
    platform: Platform,
    #[serde(default)]
    orientation: Orientation,
    #[serde(default)]
    quality: Option<u8>,
    #[serde(default)]
    difficulty_1cc: Option<u8>,
    #[serde(default)]
    difficulty_jp: Option<u8>,
    #[serde(default)]
    goal_jp: Option<String>,
    #[serde(default)]
    routing: Routing,
    #[serde(default)]
    runahead: Option<u8>,
    #[serde(default)]
    requires_mame: bool,
    #[serde(default)]
    aliases: Vec<String>,
    #[serde(default)]
    notes: Option<String>,
    #[serde(default)]
    variants: Vec<VariantRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct VariantRecord {
    rom: String,
    #[serde(default)]
    label: String,
}

impl From<GameRecord> for GameDefinition {
    fn from(record: GameRecord) -> Self {
        // The Western index is already on the unified scale, so it leads
        let ratings = record
            .difficulty_1cc
            .map(DifficultyRating::western)
            .into_iter()
            .chain(record.difficulty_jp.map(DifficultyRating::japanese))
            .collect();

        GameDefinition {
            id: record.id,
            title: record.title,
            developer: record.developer,
            year: record.year,
            platform: record.platform,
            orientation: record.orientation,
            quality: record.quality,
            ratings,
            goal_jp: record.goal_jp.filter(|g| !g.is_empty()),
            routing: record.routing,
            runahead: record.runahead,
            requires_mame: record.requires_mame,
            aliases: record.aliases,
            notes: record.notes.filter(|n| !n.is_empty()),
            variants: record
                .variants
                .into_iter()
                .map(|v| RomVariant::new(v.rom, v.label))
                .collect(),
        }
    }
}

/// Immutable snapshot of the catalog, built once at startup.
///
/// Only availability flags change after load, and only through
/// [`Catalog::rescan`].
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<LogicalEntry>,
}

impl Catalog {
    /// Load the bundled catalog
    pub fn load() -> Result<Self, CatalogError> {
        Self::load_from_str(BUNDLED_CATALOG)
    }

    /// Load a catalog from a TOML file
    pub fn load_from_path(path: &Path) -> Result<Self, CatalogError> {
        let contents = std::fs::read_to_string(path)?;
        Self::load_from_str(&contents)
    }

    /// Load a catalog from TOML text
    pub fn load_from_str(contents: &str) -> Result<Self, CatalogError> {
        Self::from_definitions(parse_records(contents)?)
    }

    /// Parse TOML text into validated game definitions, in declared order
    pub fn parse(contents: &str) -> Result<Vec<GameDefinition>, CatalogError> {
        let definitions = parse_records(contents)?;
        validate(&definitions)?;
        Ok(definitions)
    }

    /// Build a catalog from definitions. Any invalid definition aborts the
    /// whole build.
    pub fn from_definitions(definitions: Vec<GameDefinition>) -> Result<Self, CatalogError> {
        validate(&definitions)?;

        let entries: Vec<LogicalEntry> = definitions.into_iter().map(group).collect();
        tracing::info!("Loaded {} catalog entries", entries.len());

        Ok(Self { entries })
    }

    /// Entries in catalog order
    pub fn entries(&self) -> &[LogicalEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up an entry by identifier
    pub fn get(&self, id: &str) -> Option<&LogicalEntry> {
        self.entries.iter().find(|e| e.id() == id)
    }

    /// Find the entry and variant owning a ROM key
    pub fn find_rom(&self, rom: &str) -> Option<(&LogicalEntry, &RomVariant)> {
        self.entries
            .iter()
            .find_map(|e| e.variant(rom).map(|v| (e, v)))
    }

    /// Number of entries with at least one ROM present
    pub fn available_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_available()).count()
    }

    /// Re-check every variant against the ROM root and re-derive aggregate
    /// availability.
    pub fn rescan(&mut self, checker: &AvailabilityChecker) -> ScanResult {
        let mut total = ScanResult {
            root_readable: checker.root_readable(),
            ..Default::default()
        };
        let start = std::time::Instant::now();

        for entry in &mut self.entries {
            let result = checker.scan(entry.variants_mut());
            entry.refresh_availability();
            total.merge(&result);
        }
        total.duration_ms = start.elapsed().as_millis() as u64;

        if !total.root_readable {
            tracing::warn!(
                "ROM directory {} is not readable, treating all ROMs as missing",
                checker.root().display()
            );
        }
        tracing::info!(
            "Availability scan: {} of {} ROMs present, {} titles launchable ({} ms)",
            total.variants_available,
            total.variants_checked,
            self.available_count(),
            total.duration_ms
        );

        total
    }
}

fn parse_records(contents: &str) -> Result<Vec<GameDefinition>, CatalogError> {
    let file: CatalogFile = toml::from_str(contents)?;
    Ok(file.games.into_iter().map(GameDefinition::from).collect())
}

fn validate(definitions: &[GameDefinition]) -> Result<(), CatalogError> {
    let mut ids = HashSet::new();

    for def in definitions {
        for (field, value) in [
            ("id", &def.id),
            ("title", &def.title),
            ("developer", &def.developer),
        ] {
            if value.trim().is_empty() {
                return Err(CatalogError::EmptyField {
                    game: def.id.clone(),
                    field,
                });
            }
        }

        if !ids.insert(def.id.as_str()) {
            return Err(CatalogError::DuplicateId(def.id.clone()));
        }

        if let Some(quality) = def.quality
            && !(1..=10).contains(&quality)
        {
            return Err(CatalogError::QualityOutOfRange {
                game: def.id.clone(),
                value: quality,
            });
        }

        for rating in &def.ratings {
            if !rating.scale.contains(rating.value) {
                return Err(CatalogError::DifficultyOutOfRange {
                    game: def.id.clone(),
                    scale: rating.scale,
                    value: rating.value,
                });
            }
        }

        if let Some(frames) = def.runahead
            && frames > MAX_RUNAHEAD
        {
            return Err(CatalogError::RunaheadOutOfRange {
                game: def.id.clone(),
                value: frames,
            });
        }

        let mut roms = HashSet::new();
        for variant in &def.variants {
            if variant.rom.trim().is_empty() {
                return Err(CatalogError::EmptyField {
                    game: def.id.clone(),
                    field: "variant rom",
                });
            }
            if !roms.insert(variant.rom.as_str()) {
                return Err(CatalogError::DuplicateRom {
                    game: def.id.clone(),
                    rom: variant.rom.clone(),
                });
            }
        }
    }

    Ok(())
}
