//! ROM availability scanning

use crate::RomVariant;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Result of an availability scan
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ScanResult {
    pub variants_checked: usize,
    pub variants_available: usize,
    /// False when the ROM root could not be read; everything is then missing
    pub root_readable: bool,
    pub duration_ms: u64,
}

impl ScanResult {
    pub fn variants_missing(&self) -> usize {
        self.variants_checked - self.variants_available
    }

    pub(crate) fn merge(&mut self, other: &ScanResult) {
        self.variants_checked += other.variants_checked;
        self.variants_available += other.variants_available;
    }
}

/// Checks ROM keys against files under the ROM root.
///
/// A ROM is present when `<root>/<rom>.<ext>` exists for any configured
/// extension. Contents are not validated.
#[derive(Debug, Clone)]
pub struct AvailabilityChecker {
    root: PathBuf,
    extensions: Vec<String>,
}

impl AvailabilityChecker {
    /// Checker for zipped ROM sets under `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            extensions: vec!["zip".to_string()],
        }
    }

    /// Replace the file extensions probed for each ROM key
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions
            .into_iter()
            .map(|e| e.into().trim_start_matches('.').to_lowercase())
            .filter(|e| !e.is_empty())
            .collect();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether the ROM root is a readable directory
    pub fn root_readable(&self) -> bool {
        self.root.is_dir() && std::fs::read_dir(&self.root).is_ok()
    }

    /// Path of the backing file for a ROM key, if one exists
    pub fn rom_path(&self, rom: &str) -> Option<PathBuf> {
        self.extensions
            .iter()
            .map(|ext| self.root.join(format!("{}.{}", rom, ext)))
            .find(|path| path.is_file())
    }

    /// Path a ROM key is expected at, whether or not it exists
    pub fn expected_path(&self, rom: &str) -> PathBuf {
        let ext = self.extensions.first().map(String::as_str).unwrap_or("zip");
        self.root.join(format!("{}.{}", rom, ext))
    }

    /// ROM key for a file name, with at most one configured extension removed
    pub fn rom_key<'n>(&self, name: &'n str) -> &'n str {
        self.extensions
            .iter()
            .find_map(|ext| {
                let stem = name.strip_suffix(ext.as_str())?.strip_suffix('.')?;
                (!stem.is_empty()).then_some(stem)
            })
            .unwrap_or(name)
    }

    /// Update each variant's availability flag in place. Never fails: an
    /// unreadable root marks every variant missing.
    pub fn scan(&self, variants: &mut [RomVariant]) -> ScanResult {
        let start = Instant::now();
        let readable = self.root_readable();

        let mut result = ScanResult {
            root_readable: readable,
            ..Default::default()
        };

        for variant in variants.iter_mut() {
            variant.available = readable && self.rom_path(&variant.rom).is_some();
            result.variants_checked += 1;
            if variant.available {
                result.variants_available += 1;
            }
        }

        result.duration_ms = start.elapsed().as_millis() as u64;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_scan_marks_present_roms() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("ddonpachj.zip"), b"ROM").unwrap();

        let checker = AvailabilityChecker::new(dir.path());
        let mut variants = vec![
            RomVariant::new("ddonpach", "World"),
            RomVariant::new("ddonpachj", "Japan"),
        ];
        let result = checker.scan(&mut variants);

        assert!(!variants[0].available);
        assert!(variants[1].available);
        assert_eq!(result.variants_checked, 2);
        assert_eq!(result.variants_available, 1);
        assert_eq!(result.variants_missing(), 1);
        assert!(result.root_readable);
    }

    #[test]
    fn test_rom_key_strips_one_configured_extension() {
        let checker = AvailabilityChecker::new("/roms").with_extensions(["zip", "7z"]);
        assert_eq!(checker.rom_key("bgaregga.zip"), "bgaregga");
        assert_eq!(checker.rom_key("bgaregga.7z"), "bgaregga");
        assert_eq!(checker.rom_key("bgaregga.zip.zip"), "bgaregga.zip");
        assert_eq!(checker.rom_key("bgaregga"), "bgaregga");
        assert_eq!(checker.rom_key("bgareggazip"), "bgareggazip");
        assert_eq!(checker.rom_key(".zip"), ".zip");

        let chd_only = AvailabilityChecker::new("/roms").with_extensions(["chd"]);
        assert_eq!(chd_only.rom_key("bgaregga.zip"), "bgaregga.zip");
    }

    #[test]
    fn test_scan_missing_root_is_not_an_error() {
        let checker = AvailabilityChecker::new("/nonexistent/roms/arcade");
        let mut variants = vec![RomVariant::new("bgaregga", "")];
        variants[0].available = true;

        let result = checker.scan(&mut variants);
        assert!(!variants[0].available);
        assert!(!result.root_readable);
        assert_eq!(result.variants_available, 0);
    }

    #[test]
    fn test_custom_extensions() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("esprade.7z"), b"ROM").unwrap();

        let zip_only = AvailabilityChecker::new(dir.path());
        assert!(zip_only.rom_path("esprade").is_none());

        let checker = AvailabilityChecker::new(dir.path()).with_extensions([".7z", "zip"]);
        assert_eq!(checker.rom_path("esprade"), Some(dir.path().join("esprade.7z")));
        assert_eq!(checker.expected_path("ket"), dir.path().join("ket.7z"));
    }

    #[test]
    fn test_directory_named_like_rom_is_ignored() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("dimahoo.zip")).unwrap();

        let checker = AvailabilityChecker::new(dir.path());
        assert!(checker.rom_path("dimahoo").is_none());
    }
}
