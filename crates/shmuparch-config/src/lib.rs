//! Configuration management for ShmupArch
//!
//! TOML configuration for ROM and core locations, emulator output and
//! per-game launch overrides. Files are layered system, then user, then
//! `SHMUPARCH__*` environment variables.

mod emulator_config;
mod overrides;
mod paths;

pub use emulator_config::{EmulatorConfig, MisterConfig};
pub use overrides::GameOverride;
pub use paths::PathsConfig;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

/// System-wide configuration directory
pub const CONFIG_DIR: &str = "/etc/shmuparch";

/// Prefix of environment overrides, e.g. `SHMUPARCH__PATHS__ROM_DIR`
pub const ENV_PREFIX: &str = "SHMUPARCH__";

/// Core names accepted in `default_core` and `[games.<id>].core`
pub const CORE_NAMES: &[&str] = &["fbneo", "mame"];

/// Largest run-ahead frame count accepted anywhere
pub const MAX_RUNAHEAD: u8 = 6;

/// Main ShmupArch configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShmuparchConfig {
    #[serde(default)]
    pub paths: PathsConfig,

    #[serde(default)]
    pub emulator: EmulatorConfig,

    #[serde(default)]
    pub mister: MisterConfig,

    /// Per-game overrides keyed by catalog id
    #[serde(default)]
    pub games: BTreeMap<String, GameOverride>,
}

impl ShmuparchConfig {
    /// Load configuration from a single file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from the standard system and user locations plus the environment
    pub fn load_default() -> Result<Self, ConfigError> {
        let system = system_config_path();
        let user = user_config_path();
        Self::load_layered(&system, user.as_deref())
    }

    /// Stack `system`, then `user`, then environment overrides. Missing
    /// files are skipped.
    pub fn load_layered(system: &Path, user: Option<&Path>) -> Result<Self, ConfigError> {
        let mut merged = toml::Value::Table(toml::map::Map::new());
        let mut found = false;

        for path in std::iter::once(system).chain(user) {
            if !path.exists() {
                continue;
            }
            let contents = std::fs::read_to_string(path)?;
            let layer: toml::Value = toml::from_str(&contents)?;
            merge_toml(&mut merged, layer);
            tracing::debug!("Merged configuration from {}", path.display());
            found = true;
        }

        if !found {
            tracing::warn!("No configuration file found, using defaults");
        }

        merge_toml(&mut merged, env_overlay(std::env::vars()));

        let config: Self = merged.try_into()?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, contents)?;
        tracing::info!("Configuration saved to {}", path.display());
        Ok(())
    }

    /// Overrides for a catalog id, if any
    /// `[games.<id>]` table, ignoring tables that set nothing
    pub fn game_override(&self, id: &str) -> Option<&GameOverride> {
        self.games.get(id).filter(|game| !game.is_empty())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !CORE_NAMES.contains(&self.emulator.default_core.as_str()) {
            return Err(ConfigError::Invalid(format!(
                "unknown default core '{}'",
                self.emulator.default_core
            )));
        }
        if self.emulator.default_runahead > MAX_RUNAHEAD {
            return Err(ConfigError::Invalid(format!(
                "default_runahead {} exceeds {}",
                self.emulator.default_runahead, MAX_RUNAHEAD
            )));
        }
        if self.paths.rom_extensions.is_empty() {
            return Err(ConfigError::Invalid(
                "rom_extensions must not be empty".to_string(),
            ));
        }

        for (id, game) in &self.games {
            if let Some(core) = &game.core
                && !CORE_NAMES.contains(&core.as_str())
            {
                return Err(ConfigError::Invalid(format!(
                    "games.{}: unknown core '{}'",
                    id, core
                )));
            }
            if let Some(frames) = game.runahead
                && frames > MAX_RUNAHEAD
            {
                return Err(ConfigError::Invalid(format!(
                    "games.{}: runahead {} exceeds {}",
                    id, frames, MAX_RUNAHEAD
                )));
            }
        }
        Ok(())
    }
}

/// `/etc/shmuparch/config.toml`
pub fn system_config_path() -> PathBuf {
    Path::new(CONFIG_DIR).join("config.toml")
}

/// `$XDG_CONFIG_HOME/shmuparch/config.toml`
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("shmuparch").join("config.toml"))
}

/// Helper function to merge TOML values
pub fn merge_toml(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
            for (key, value) in overlay_table {
                if let Some(base_value) = base_table.get_mut(&key) {
                    merge_toml(base_value, value);
                } else {
                    base_table.insert(key, value);
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

/// Build a TOML table from `SHMUPARCH__SECTION__KEY=value` pairs.
///
/// Section and field names are lowercased. Keys inside free-form maps
/// (`games.<id>.dip_switches`, `emulator.gpu_env`) keep their case. Values
/// are typed by the field they land in: numbers and booleans only for numeric
/// and boolean fields, comma-separated lists for list fields, strings
/// otherwise.
pub fn env_overlay<I>(vars: I) -> toml::Value
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut root = toml::Value::Table(toml::map::Map::new());

    for (name, raw) in vars {
        let Some(rest) = name.strip_prefix(ENV_PREFIX) else {
            continue;
        };
        let segments = env_segments(rest);
        let Some((leaf, parents)) = segments.split_last() else {
            continue;
        };

        let mut value = env_value(&segments, &raw);
        for key in std::iter::once(leaf).chain(parents.iter().rev()) {
            let mut table = toml::map::Map::new();
            table.insert(key.clone(), value);
            value = toml::Value::Table(table);
        }
        merge_toml(&mut root, value);
    }

    root
}

/// Number of leading segments that name fields rather than map keys
fn field_depth(segments: &[String]) -> usize {
    match segments {
        [games, _, dips, ..] if games == "games" && dips == "dip_switches" => 3,
        [emulator, gpu_env, ..] if emulator == "emulator" && gpu_env == "gpu_env" => 2,
        _ => usize::MAX,
    }
}

fn env_segments(rest: &str) -> Vec<String> {
    let mut segments: Vec<String> = rest
        .split("__")
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();

    // Lowercase one segment at a time so map detection sees normalized names
    let mut i = 0;
    while i < segments.len() && i < field_depth(&segments) {
        segments[i] = segments[i].to_lowercase();
        i += 1;
    }
    segments
}

fn env_value(segments: &[String], raw: &str) -> toml::Value {
    let path: Vec<&str> = segments.iter().map(String::as_str).collect();
    let text = || toml::Value::String(raw.to_string());

    match path.as_slice() {
        ["emulator", "default_runahead"] | ["games", _, "runahead"] => raw
            .trim()
            .parse::<i64>()
            .map(toml::Value::Integer)
            .unwrap_or_else(|_| text()),
        ["emulator", "gpu_offload"] | ["mister", "enabled"] => raw
            .trim()
            .parse::<bool>()
            .map(toml::Value::Boolean)
            .unwrap_or_else(|_| text()),
        ["paths", "rom_extensions"] | ["emulator", "mame_only_roms"] => toml::Value::Array(
            raw.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| toml::Value::String(s.to_string()))
                .collect(),
        ),
        _ => text(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_default_config() {
        let config = ShmuparchConfig::default();
        assert_eq!(config.paths.rom_dir, PathBuf::from("/mnt/z/roms/arcade"));
        assert_eq!(config.emulator.default_core, "fbneo");
        assert!(!config.mister.enabled);
        assert!(config.games.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_serialize_deserialize() {
        let mut config = ShmuparchConfig::default();
        config.games.insert(
            "garegga".to_string(),
            GameOverride {
                runahead: Some(3),
                ..Default::default()
            },
        );
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: ShmuparchConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.emulator.default_runahead, config.emulator.default_runahead);
        assert_eq!(parsed.games.get("garegga"), config.games.get("garegga"));
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::NotFound(PathBuf::from("/etc/shmuparch/config.toml"));
        assert!(format!("{}", err).contains("not found"));

        let err = ConfigError::Invalid("test error".to_string());
        assert!(format!("{}", err).contains("Invalid"));
    }

    #[test]
    fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        let config_content = r#"
[paths]
rom_dir = "/roms/arcade"

[mister]
enabled = true

[games.ddp]
runahead = 2

[games.ddp.dip_switches]
"Bonus Life" = "Every 1M"
"#;
        write!(temp_file, "{}", config_content).unwrap();

        let config = ShmuparchConfig::load(temp_file.path()).unwrap();
        assert_eq!(config.paths.rom_dir, PathBuf::from("/roms/arcade"));
        assert!(config.mister.enabled);
        assert_eq!(config.mister.host, "192.168.30.81");

        let ddp = config.game_override("ddp").unwrap();
        assert_eq!(ddp.runahead, Some(2));
        assert_eq!(
            ddp.dip_switches.get("Bonus Life").map(String::as_str),
            Some("Every 1M")
        );
        assert!(config.game_override("garegga").is_none());
    }

    #[test]
    fn test_load_missing_file() {
        let result = ShmuparchConfig::load(Path::new("/nonexistent/shmuparch.toml"));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_validate_rejects_unknown_core() {
        let mut config = ShmuparchConfig::default();
        config.games.insert(
            "ddp".to_string(),
            GameOverride {
                core: Some("mednafen".to_string()),
                ..Default::default()
            },
        );
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_validate_rejects_runahead() {
        let mut config = ShmuparchConfig::default();
        config.emulator.default_runahead = 9;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_save_config() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");
        let mut config = ShmuparchConfig::default();
        config.mister.host = "10.0.0.5".to_string();

        config.save(&path).unwrap();

        let loaded = ShmuparchConfig::load(&path).unwrap();
        assert_eq!(loaded.mister.host, "10.0.0.5");
    }

    #[test]
    fn test_load_layered_user_wins() {
        let temp_dir = TempDir::new().unwrap();
        let system = temp_dir.path().join("system.toml");
        let user = temp_dir.path().join("user.toml");

        std::fs::write(
            &system,
            "[paths]\nrom_dir = \"/srv/roms\"\n\n[emulator]\ndefault_runahead = 2\n",
        )
        .unwrap();
        std::fs::write(&user, "[emulator]\ndefault_runahead = 0\n").unwrap();

        let config = ShmuparchConfig::load_layered(&system, Some(&user)).unwrap();
        assert_eq!(config.paths.rom_dir, PathBuf::from("/srv/roms"));
        assert_eq!(config.emulator.default_runahead, 0);
    }

    #[test]
    fn test_load_layered_skips_missing() {
        let temp_dir = TempDir::new().unwrap();
        let system = temp_dir.path().join("absent.toml");
        let config = ShmuparchConfig::load_layered(&system, None).unwrap();
        assert_eq!(config.emulator.default_core, "fbneo");
    }

    #[test]
    fn test_env_overlay() {
        let overlay = env_overlay(vars(&[
            ("SHMUPARCH__PATHS__ROM_DIR", "/data/roms"),
            ("SHMUPARCH__MISTER__ENABLED", "true"),
            ("SHMUPARCH__GAMES__GAREGGA__RUNAHEAD", "3"),
            ("HOME", "/root"),
        ]));

        let mut base = toml::Value::Table(toml::map::Map::new());
        merge_toml(&mut base, overlay);
        let config: ShmuparchConfig = base.try_into().unwrap();

        assert_eq!(config.paths.rom_dir, PathBuf::from("/data/roms"));
        assert!(config.mister.enabled);
        assert_eq!(config.game_override("garegga").unwrap().runahead, Some(3));
    }

    #[test]
    fn test_env_overlay_dip_switches_stay_strings() {
        let overlay = env_overlay(vars(&[
            ("SHMUPARCH__GAMES__DDP__DIP_SWITCHES__LIVES", "3"),
            ("SHMUPARCH__GAMES__DDP__DIP_SWITCHES__Stage_Edit", "Enable"),
            ("SHMUPARCH__GAMES__DDP__DIP_SWITCHES__Free_Play", "true"),
        ]));

        let mut base = toml::Value::Table(toml::map::Map::new());
        merge_toml(&mut base, overlay);
        let config: ShmuparchConfig = base.try_into().unwrap();

        let dips = &config.game_override("ddp").unwrap().dip_switches;
        let names: Vec<&str> = dips.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["Free_Play", "LIVES", "Stage_Edit"]);
        assert_eq!(dips["LIVES"], "3");
        assert_eq!(dips["Free_Play"], "true");
        assert_eq!(dips["Stage_Edit"], "Enable");
    }

    #[test]
    fn test_env_overlay_types_follow_fields() {
        let overlay = env_overlay(vars(&[
            ("SHMUPARCH__MISTER__HOST", "10"),
            ("SHMUPARCH__EMULATOR__DEFAULT_CORE", "mame"),
            ("SHMUPARCH__EMULATOR__DEFAULT_RUNAHEAD", "2"),
            ("SHMUPARCH__EMULATOR__GPU_OFFLOAD", "false"),
            ("SHMUPARCH__EMULATOR__GPU_ENV__DRI_PRIME", "1"),
            ("SHMUPARCH__PATHS__ROM_EXTENSIONS", "zip, 7z"),
        ]));

        let mut base = toml::Value::Table(toml::map::Map::new());
        merge_toml(&mut base, overlay);
        let config: ShmuparchConfig = base.try_into().unwrap();

        assert_eq!(config.mister.host, "10");
        assert_eq!(config.emulator.default_core, "mame");
        assert_eq!(config.emulator.default_runahead, 2);
        assert!(!config.emulator.gpu_offload);
        assert_eq!(
            config.emulator.gpu_env.get("DRI_PRIME").map(String::as_str),
            Some("1")
        );
        assert_eq!(config.paths.rom_extensions, vec!["zip", "7z"]);
    }

    #[test]
    fn test_env_overlay_bad_number_is_reported() {
        let overlay = env_overlay(vars(&[("SHMUPARCH__EMULATOR__DEFAULT_RUNAHEAD", "lots")]));

        let mut base = toml::Value::Table(toml::map::Map::new());
        merge_toml(&mut base, overlay);
        let result: Result<ShmuparchConfig, _> = base.try_into();
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_game_table_is_ignored() {
        let mut config = ShmuparchConfig::default();
        config
            .games
            .insert("ddp".to_string(), GameOverride::default());
        assert!(config.game_override("ddp").is_none());

        config.games.insert(
            "ddp".to_string(),
            GameOverride {
                runahead: Some(2),
                ..Default::default()
            },
        );
        assert_eq!(config.game_override("ddp").unwrap().runahead, Some(2));
    }

    #[test]
    fn test_env_overlay_ignores_bare_prefix() {
        let overlay = env_overlay(vars(&[("SHMUPARCH__", "x")]));
        assert!(overlay.as_table().unwrap().is_empty());
    }

    #[test]
    fn test_merge_toml_tables() {
        let base_table = toml::toml! {
            [emulator]
            default_core = "fbneo"
            default_runahead = 1
        };
        let mut base = toml::Value::Table(base_table);

        let overlay_table = toml::toml! {
            [emulator]
            default_runahead = 2
        };
        merge_toml(&mut base, toml::Value::Table(overlay_table));

        let emulator = base.get("emulator").unwrap().as_table().unwrap();
        assert_eq!(emulator.get("default_runahead").unwrap().as_integer(), Some(2));
        assert_eq!(
            emulator.get("default_core").unwrap().as_str(),
            Some("fbneo")
        );
    }

    #[test]
    fn test_merge_toml_replaces_non_tables() {
        let mut base = toml::Value::Integer(42);
        merge_toml(&mut base, toml::Value::String("x".to_string()));
        assert_eq!(base.as_str(), Some("x"));
    }
}
