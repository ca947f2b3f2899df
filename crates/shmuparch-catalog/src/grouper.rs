//! Variant grouping into logical entries

use crate::{GameDefinition, RomVariant, normalize};

/// The unit the launcher UI works with: one game plus all of its ROM
/// variants, with the derived fields filter and sort rely on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalEntry {
    definition: GameDefinition,
    difficulty: Option<u8>,
    available: bool,
}

/// Attach a game's variants to a single logical entry.
///
/// Grouping never merges across identifiers. A game without declared
/// variants gets one implicit variant named after its identifier.
pub fn group(mut definition: GameDefinition) -> LogicalEntry {
    if definition.variants.is_empty() {
        definition
            .variants
            .push(RomVariant::new(definition.id.clone(), ""));
    }

    let difficulty = definition
        .primary_rating()
        .map(|r| normalize(r.value, r.scale));

    let mut entry = LogicalEntry {
        definition,
        difficulty,
        available: false,
    };
    entry.refresh_availability();
    entry
}

impl LogicalEntry {
    pub fn id(&self) -> &str {
        &self.definition.id
    }

    pub fn title(&self) -> &str {
        &self.definition.title
    }

    pub fn developer(&self) -> &str {
        &self.definition.developer
    }

    pub fn definition(&self) -> &GameDefinition {
        &self.definition
    }

    /// Variants in declared order
    pub fn variants(&self) -> &[RomVariant] {
        &self.definition.variants
    }

    /// Difficulty on the unified 1-10 scale, if the game is rated
    pub fn difficulty(&self) -> Option<u8> {
        self.difficulty
    }

    /// True when at least one variant has a ROM on disk
    pub fn is_available(&self) -> bool {
        self.available
    }

    pub fn available_variants(&self) -> Vec<&RomVariant> {
        self.definition
            .variants
            .iter()
            .filter(|v| v.available)
            .collect()
    }

    pub fn available_count(&self) -> usize {
        self.definition.variants.iter().filter(|v| v.available).count()
    }

    /// First declared variant
    pub fn default_variant(&self) -> &RomVariant {
        // group() guarantees at least one variant
        &self.definition.variants[0]
    }

    /// The variant to launch without asking, when exactly one is available
    pub fn implicit_pick(&self) -> Option<&RomVariant> {
        let mut available = self.definition.variants.iter().filter(|v| v.available);
        match (available.next(), available.next()) {
            (Some(only), None) => Some(only),
            _ => None,
        }
    }

    pub fn variant(&self, rom: &str) -> Option<&RomVariant> {
        self.definition.variant(rom)
    }

    pub(crate) fn variants_mut(&mut self) -> &mut [RomVariant] {
        &mut self.definition.variants
    }

    /// Re-derive aggregate availability from the variant flags
    pub(crate) fn refresh_availability(&mut self) {
        self.available = self.definition.variants.iter().any(|v| v.available);
    }
}
