//! Filesystem locations

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where ROMs, cores and RetroArch configuration live
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// ROM root scanned for `<rom>.<ext>` sets
    #[serde(default = "default_rom_dir")]
    pub rom_dir: PathBuf,

    /// Extensions probed for each ROM key, in preference order
    #[serde(default = "default_rom_extensions")]
    pub rom_extensions: Vec<String>,

    /// Install directory holding cores and RetroArch configs
    #[serde(default = "default_base_dir")]
    pub base_dir: PathBuf,

    /// Replacement catalog fixture
    #[serde(default)]
    pub catalog: Option<PathBuf>,

    /// FinalBurn Neo core, defaults to `<base_dir>/cores/fbneo_libretro.so`
    #[serde(default)]
    pub fbneo_core: Option<PathBuf>,

    /// MAME core, defaults to `<base_dir>/cores/mame_libretro.so`
    #[serde(default)]
    pub mame_core: Option<PathBuf>,

    /// Base RetroArch config for local output
    #[serde(default)]
    pub config_file: Option<PathBuf>,

    /// Base RetroArch config for MiSTer streaming
    #[serde(default)]
    pub mister_config_file: Option<PathBuf>,

    /// RetroArch per-game override root (`<dir>/<core name>/<rom>.cfg`)
    #[serde(default)]
    pub override_dir: Option<PathBuf>,
}

fn default_rom_dir() -> PathBuf {
    PathBuf::from("/mnt/z/roms/arcade")
}

fn default_rom_extensions() -> Vec<String> {
    vec!["zip".to_string()]
}

fn default_base_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("shmuparch"))
        .unwrap_or_else(|| PathBuf::from("/usr/share/shmuparch"))
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            rom_dir: default_rom_dir(),
            rom_extensions: default_rom_extensions(),
            base_dir: default_base_dir(),
            catalog: None,
            fbneo_core: None,
            mame_core: None,
            config_file: None,
            mister_config_file: None,
            override_dir: None,
        }
    }
}

impl PathsConfig {
    pub fn cores_dir(&self) -> PathBuf {
        self.base_dir.join("cores")
    }

    pub fn fbneo_core(&self) -> PathBuf {
        self.fbneo_core
            .clone()
            .unwrap_or_else(|| self.cores_dir().join("fbneo_libretro.so"))
    }

    pub fn mame_core(&self) -> PathBuf {
        self.mame_core
            .clone()
            .unwrap_or_else(|| self.cores_dir().join("mame_libretro.so"))
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_file
            .clone()
            .unwrap_or_else(|| self.base_dir.join("retroarch.cfg"))
    }

    pub fn mister_config_file(&self) -> PathBuf {
        self.mister_config_file
            .clone()
            .unwrap_or_else(|| self.base_dir.join("retroarch-mister.cfg"))
    }

    pub fn override_dir(&self) -> PathBuf {
        self.override_dir
            .clone()
            .unwrap_or_else(|| self.base_dir.join("config"))
    }
}
