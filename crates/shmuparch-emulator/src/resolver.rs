//! Launch resolution
//!
//! Turns a logical entry plus an optional variant choice into a
//! [`LaunchSpec`]. Pure: nothing here touches a process.
//!
//! Precedence, highest first:
//!
//! | Setting | Order |
//! |---------|-------|
//! | core | runtime option, `[games.<id>].core`, catalog MAME flag or MAME-only ROM, `default_core` |
//! | run-ahead | runtime option, `[games.<id>].runahead`, catalog value, `default_runahead` |
//! | override config | `[games.<id>].config`, `<override_dir>/<core name>/<rom>.cfg` |
//! | output | runtime `--mister`, `mister.enabled`, local |

use crate::{EmulatorCore, SelectionError};
use serde::Serialize;
use shmuparch_catalog::{AvailabilityChecker, LogicalEntry, RomVariant};
use shmuparch_config::{GameOverride, MAX_RUNAHEAD, ShmuparchConfig};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Caller-supplied overrides that beat everything derived from the catalog
/// and configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuntimeOptions {
    pub core: Option<EmulatorCore>,
    pub runahead: Option<u8>,
    pub mister: bool,
}

impl RuntimeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_core(mut self, core: EmulatorCore) -> Self {
        self.core = Some(core);
        self
    }

    pub fn with_runahead(mut self, frames: u8) -> Self {
        self.runahead = Some(frames);
        self
    }

    /// Stream to the MiSTer instead of the local display
    pub fn with_mister(mut self) -> Self {
        self.mister = true;
        self
    }
}

/// Where the emulator renders
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum OutputTarget {
    Local,
    Remote { host: String },
}

impl OutputTarget {
    pub fn is_remote(&self) -> bool {
        matches!(self, OutputTarget::Remote { .. })
    }

    pub fn label(&self) -> &'static str {
        match self {
            OutputTarget::Local => "Desktop",
            OutputTarget::Remote { .. } => "MiSTer CRT",
        }
    }
}

/// Everything needed to start one game
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LaunchSpec {
    /// Catalog id, `None` for a ROM launched by path
    pub game_id: Option<String>,
    pub title: String,
    pub core: EmulatorCore,
    pub variant: RomVariant,
    pub rom_path: PathBuf,
    pub core_path: PathBuf,
    /// RetroArch config passed with `--config`
    pub base_config: PathBuf,
    /// Per-game RetroArch override, appended when it exists
    pub override_config: PathBuf,
    pub runahead: u8,
    pub dip_switches: BTreeMap<String, String>,
    pub output: OutputTarget,
}

/// Pick the variant to launch.
///
/// Exactly one available variant is chosen implicitly. With several, the
/// caller must name one; guessing a region is never done.
pub fn select_variant<'a>(
    entry: &'a LogicalEntry,
    chosen: Option<&str>,
) -> Result<&'a RomVariant, SelectionError> {
    if !entry.is_available() {
        return Err(SelectionError::NoneAvailable {
            title: entry.title().to_string(),
        });
    }

    match chosen {
        Some(rom) => {
            let variant = entry
                .variant(rom)
                .ok_or_else(|| SelectionError::UnknownVariant {
                    title: entry.title().to_string(),
                    rom: rom.to_string(),
                })?;
            if !variant.available {
                return Err(SelectionError::VariantUnavailable {
                    rom: rom.to_string(),
                });
            }
            Ok(variant)
        }
        None => entry
            .implicit_pick()
            .ok_or_else(|| SelectionError::Ambiguous {
                title: entry.title().to_string(),
                candidates: entry
                    .available_variants()
                    .into_iter()
                    .map(|v| v.rom.clone())
                    .collect(),
            }),
    }
}

/// Resolves launch specifications against a configuration
pub struct LaunchResolver<'a> {
    config: &'a ShmuparchConfig,
    checker: AvailabilityChecker,
}

impl<'a> LaunchResolver<'a> {
    pub fn new(config: &'a ShmuparchConfig) -> Self {
        let checker = AvailabilityChecker::new(&config.paths.rom_dir)
            .with_extensions(config.paths.rom_extensions.iter().cloned());
        Self { config, checker }
    }

    /// Checker over the configured ROM root
    pub fn checker(&self) -> &AvailabilityChecker {
        &self.checker
    }

    /// Variants the user may pick from
    pub fn candidates<'e>(&self, entry: &'e LogicalEntry) -> Vec<&'e RomVariant> {
        entry.available_variants()
    }

    pub fn resolve(
        &self,
        entry: &LogicalEntry,
        chosen: Option<&str>,
        options: &RuntimeOptions,
    ) -> Result<LaunchSpec, SelectionError> {
        let variant = select_variant(entry, chosen)?;
        let definition = entry.definition();
        let game = self.config.game_override(entry.id());
        let core = self.core_for(entry, &variant.rom, options);

        let runahead = options
            .runahead
            .or(game.and_then(|g| g.runahead))
            .or(definition.runahead)
            .unwrap_or(self.config.emulator.default_runahead);

        let spec = self.build(
            Some(entry.id().to_string()),
            entry.title().to_string(),
            variant.clone(),
            self.rom_path(&variant.rom),
            core,
            runahead,
            game,
            options,
        );

        tracing::info!(
            "Resolved {} -> {} [{}] run-ahead {}",
            spec.title,
            spec.variant.rom,
            spec.core.tag(),
            spec.runahead
        );
        Ok(spec)
    }

    /// Core a variant of `entry` would run on
    pub fn core_for(&self, entry: &LogicalEntry, rom: &str, options: &RuntimeOptions) -> EmulatorCore {
        let game_core = self
            .config
            .game_override(entry.id())
            .and_then(|g| g.core.as_deref());
        self.select_core(options, game_core, entry.definition().requires_mame, rom)
    }

    /// Launch settings for a ROM file that may not be in the catalog
    pub fn resolve_file(&self, rom_path: &Path, options: &RuntimeOptions) -> LaunchSpec {
        let rom = rom_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        let mut variant = RomVariant::new(rom.clone(), "");
        variant.available = rom_path.is_file();

        let core = self.select_core(options, None, false, &rom);
        let runahead = options
            .runahead
            .unwrap_or(self.config.emulator.default_runahead);

        self.build(
            None,
            rom,
            variant,
            rom_path.to_path_buf(),
            core,
            runahead,
            None,
            options,
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn build(
        &self,
        game_id: Option<String>,
        title: String,
        variant: RomVariant,
        rom_path: PathBuf,
        core: EmulatorCore,
        runahead: u8,
        game: Option<&GameOverride>,
        options: &RuntimeOptions,
    ) -> LaunchSpec {
        let output = self.output(options);
        let paths = &self.config.paths;

        let core_path = match core {
            EmulatorCore::FbNeo => paths.fbneo_core(),
            EmulatorCore::Mame => paths.mame_core(),
        };
        let base_config = match output {
            OutputTarget::Local => paths.config_file(),
            OutputTarget::Remote { .. } => paths.mister_config_file(),
        };
        let override_config = game
            .and_then(|g| g.config.clone())
            .unwrap_or_else(|| {
                paths
                    .override_dir()
                    .join(core.display_name())
                    .join(format!("{}.cfg", variant.rom))
            });

        LaunchSpec {
            game_id,
            title,
            core,
            variant,
            rom_path,
            core_path,
            base_config,
            override_config,
            runahead: runahead.min(MAX_RUNAHEAD),
            dip_switches: game.map(|g| g.dip_switches.clone()).unwrap_or_default(),
            output,
        }
    }

    fn select_core(
        &self,
        options: &RuntimeOptions,
        game_core: Option<&str>,
        requires_mame: bool,
        rom: &str,
    ) -> EmulatorCore {
        if let Some(core) = options.core {
            return core;
        }
        if let Some(name) = game_core
            && let Ok(core) = name.parse()
        {
            return core;
        }
        if requires_mame || self.config.emulator.is_mame_only(rom) {
            return EmulatorCore::Mame;
        }
        self.config.emulator.default_core.parse().unwrap_or_default()
    }

    fn output(&self, options: &RuntimeOptions) -> OutputTarget {
        if options.mister || self.config.mister.enabled {
            OutputTarget::Remote {
                host: self.config.mister.host.clone(),
            }
        } else {
            OutputTarget::Local
        }
    }

    fn rom_path(&self, rom: &str) -> PathBuf {
        self.checker
            .rom_path(rom)
            .unwrap_or_else(|| self.checker.expected_path(rom))
    }
}
