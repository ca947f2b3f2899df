//! Sort keys, ordering and section headers

use crate::{DifficultyTier, LogicalEntry};
use std::cmp::Ordering;
use std::fmt;

/// Active sort key. Tab cycles Developer → Quality → Difficulty → Name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Developer,
    Quality,
    Difficulty,
    Name,
}

impl SortKey {
    pub const ALL: [SortKey; 4] = [
        SortKey::Developer,
        SortKey::Quality,
        SortKey::Difficulty,
        SortKey::Name,
    ];

    /// Successor in the fixed cycle
    pub fn next(self) -> Self {
        match self {
            SortKey::Developer => SortKey::Quality,
            SortKey::Quality => SortKey::Difficulty,
            SortKey::Difficulty => SortKey::Name,
            SortKey::Name => SortKey::Developer,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortKey::Developer => "Developer",
            SortKey::Quality => "Quality",
            SortKey::Difficulty => "Difficulty",
            SortKey::Name => "Name",
        }
    }

    /// Ordering between two entries under this key, ties broken by title
    pub fn compare(&self, a: &LogicalEntry, b: &LogicalEntry) -> Ordering {
        let primary = match self {
            SortKey::Developer => a
                .developer()
                .to_lowercase()
                .cmp(&b.developer().to_lowercase()),
            // Higher first; unrated (None) sorts last
            SortKey::Quality => b.definition().quality.cmp(&a.definition().quality),
            SortKey::Difficulty => difficulty_rank(a).cmp(&difficulty_rank(b)),
            SortKey::Name => Ordering::Equal,
        };
        primary.then_with(|| compare_titles(a, b))
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Unrated difficulty sorts after every rated value
fn difficulty_rank(entry: &LogicalEntry) -> (bool, u8) {
    match entry.difficulty() {
        Some(d) => (false, d),
        None => (true, 0),
    }
}

fn compare_titles(a: &LogicalEntry, b: &LogicalEntry) -> Ordering {
    a.title().to_lowercase().cmp(&b.title().to_lowercase())
}

/// Stable sort of `entries` under `key`
pub fn apply<'a, I>(key: SortKey, entries: I) -> Vec<&'a LogicalEntry>
where
    I: IntoIterator<Item = &'a LogicalEntry>,
{
    let mut sorted: Vec<&LogicalEntry> = entries.into_iter().collect();
    sorted.sort_by(|a, b| key.compare(a, b));
    sorted
}

/// A titled run of entries in the game list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section<'a> {
    pub title: String,
    pub entries: Vec<&'a LogicalEntry>,
}

/// Group a list already sorted by `key` into section headers: developers,
/// quality tiers, difficulty tiers or initial letters.
pub fn sections<'a>(key: SortKey, sorted: &[&'a LogicalEntry]) -> Vec<Section<'a>> {
    let mut sections: Vec<Section<'a>> = Vec::new();
    let mut current: Option<String> = None;

    for &entry in sorted {
        let group = section_key(key, entry);
        match sections.last_mut() {
            Some(section) if current.as_ref() == Some(&group) => section.entries.push(entry),
            _ => {
                sections.push(Section {
                    title: section_title(key, entry),
                    entries: vec![entry],
                });
                current = Some(group);
            }
        }
    }

    sections
}

/// Grouping value, normalized the same way `SortKey::compare` orders it
fn section_key(key: SortKey, entry: &LogicalEntry) -> String {
    match key {
        SortKey::Developer => entry.developer().to_lowercase(),
        _ => section_title(key, entry),
    }
}

fn section_title(key: SortKey, entry: &LogicalEntry) -> String {
    match key {
        SortKey::Developer => entry.developer().to_string(),
        SortKey::Quality => match entry.definition().quality {
            Some(9..=10) => "Excellent (9-10)",
            Some(7..=8) => "Great (7-8)",
            Some(5..=6) => "Good (5-6)",
            Some(_) => "Fair (1-4)",
            None => "Unrated",
        }
        .to_string(),
        SortKey::Difficulty => entry
            .difficulty()
            .map(|d| DifficultyTier::from_unified(d).label())
            .unwrap_or("Unrated")
            .to_string(),
        SortKey::Name => match entry.title().chars().next() {
            Some(c) if c.is_ascii_digit() => "0-9".to_string(),
            Some(c) => c.to_uppercase().to_string(),
            None => "#".to_string(),
        },
    }
}
