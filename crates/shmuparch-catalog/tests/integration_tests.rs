//! Integration tests for loading, scanning, filtering and sorting the catalog

use shmuparch_catalog::{AvailabilityChecker, Catalog, LogicalEntry, SortKey, filter, sort};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const CATALOG: &str = r#"
[[game]]
id = "ddp"
title = "DoDonPachi"
developer = "Cave"
quality = 9
difficulty_1cc = 6
variants = [
    { rom = "ddonpach", label = "World" },
    { rom = "ddonpachj", label = "Japan" },
]

[[game]]
id = "garegga"
title = "Battle Garegga"
developer = "Raizing"
quality = 9
difficulty_1cc = 8
routing = "high"
runahead = 3
variants = [{ rom = "bgaregga", label = "Europe" }]

[[game]]
id = "ketsui"
title = "Ketsui: Kizuna Jigoku Tachi"
developer = "Cave"
difficulty_jp = 17
goal_jp = "1-ALL"
routing = "medium"
"#;

/// ROM directory for integration tests
struct RomEnvironment {
    #[allow(dead_code)]
    temp_dir: TempDir,
    roms_dir: PathBuf,
}

impl RomEnvironment {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let roms_dir = temp_dir.path().join("arcade");
        fs::create_dir_all(&roms_dir).expect("Failed to create ROM directory");

        Self { temp_dir, roms_dir }
    }

    fn create_rom(&self, rom: &str) {
        fs::write(self.roms_dir.join(format!("{}.zip", rom)), b"FAKE_ROM_SET")
            .expect("Failed to create ROM");
    }

    fn remove_rom(&self, rom: &str) {
        fs::remove_file(self.roms_dir.join(format!("{}.zip", rom))).expect("Failed to remove ROM");
    }

    fn checker(&self) -> AvailabilityChecker {
        AvailabilityChecker::new(&self.roms_dir)
    }
}

fn ids(entries: &[&LogicalEntry]) -> Vec<String> {
    entries.iter().map(|e| e.id().to_string()).collect()
}

#[test]
fn test_query_examples() {
    let catalog = Catalog::load_from_str(CATALOG).unwrap();

    assert_eq!(ids(&filter::apply("dev:cave q>8", catalog.entries())), ["ddp"]);
    assert_eq!(ids(&filter::apply("d<7", catalog.entries())), ["ddp", "ketsui"]);
    assert_eq!(ids(&filter::apply("r:med", catalog.entries())), ["ketsui"]);
    assert_eq!(ids(&filter::apply("dev:cave kizuna", catalog.entries())), ["ketsui"]);
}

#[test]
fn test_scan_then_filter_visible() {
    let env = RomEnvironment::new();
    env.create_rom("ddonpachj");
    env.create_rom("bgaregga");

    let mut catalog = Catalog::load_from_str(CATALOG).unwrap();
    let result = catalog.rescan(&env.checker());

    assert_eq!(result.variants_checked, 4);
    assert_eq!(result.variants_available, 2);
    assert_eq!(catalog.available_count(), 2);

    let ddp = catalog.get("ddp").unwrap();
    assert!(ddp.is_available());
    assert_eq!(ddp.implicit_pick().unwrap().rom, "ddonpachj");

    let shown = filter::visible(catalog.entries(), false);
    assert_eq!(ids(&shown), ["ddp", "garegga"]);
    assert_eq!(filter::visible(catalog.entries(), true).len(), 3);
}

#[test]
fn test_rescan_rederives_availability() {
    let env = RomEnvironment::new();
    env.create_rom("bgaregga");

    let mut catalog = Catalog::load_from_str(CATALOG).unwrap();
    catalog.rescan(&env.checker());
    assert!(catalog.get("garegga").unwrap().is_available());

    env.remove_rom("bgaregga");
    catalog.rescan(&env.checker());
    assert!(!catalog.get("garegga").unwrap().is_available());
}

#[test]
fn test_unreadable_root_marks_everything_missing() {
    let mut catalog = Catalog::load_from_str(CATALOG).unwrap();
    let result = catalog.rescan(&AvailabilityChecker::new("/nonexistent/shmuparch/roms"));

    assert!(!result.root_readable);
    assert_eq!(catalog.available_count(), 0);
}

#[test]
fn test_filter_then_sort_cycle() {
    let catalog = Catalog::load_from_str(CATALOG).unwrap();
    let filtered = filter::apply("q>8", catalog.entries());

    let by_quality = sort::apply(SortKey::Quality, filtered.iter().copied());
    assert_eq!(ids(&by_quality), ["garegga", "ddp"]);

    let by_difficulty = sort::apply(SortKey::Quality.next(), filtered.iter().copied());
    assert_eq!(ids(&by_difficulty), ["ddp", "garegga"]);
}

#[test]
fn test_difficulty_sort_mixes_scales() {
    let catalog = Catalog::load_from_str(CATALOG).unwrap();
    // ketsui: JP 17 -> 4
    let sorted = sort::apply(SortKey::Difficulty, catalog.entries());
    assert_eq!(ids(&sorted), ["ketsui", "ddp", "garegga"]);
}

#[test]
fn test_bundled_catalog_is_consistent() {
    let catalog = Catalog::load().unwrap();

    for entry in catalog.entries() {
        if let Some(d) = entry.difficulty() {
            assert!((1..=10).contains(&d), "{} has difficulty {}", entry.id(), d);
        }
        assert!(!entry.title().is_empty());
    }

    let cave = filter::apply("dev:cave", catalog.entries());
    assert!(cave.iter().any(|e| e.title() == "DoDonPachi"));
}
