//! Emulator and output settings
//!
//! RetroArch binaries, core choice, run-ahead defaults, GPU offload and the
//! MiSTer streaming target.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Global emulator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmulatorConfig {
    /// RetroArch executable, resolved on `PATH` when not absolute
    #[serde(default = "default_retroarch")]
    pub retroarch_bin: PathBuf,

    /// RetroArch build with GroovyMiSTer support
    #[serde(default = "default_mister_retroarch")]
    pub mister_retroarch_bin: PathBuf,

    /// Core used when nothing else decides ("fbneo" or "mame")
    #[serde(default = "default_core")]
    pub default_core: String,

    /// Run-ahead frames when neither the catalog nor an override sets one
    #[serde(default = "default_runahead")]
    pub default_runahead: u8,

    /// Export `gpu_env` for local output
    #[serde(default = "default_true")]
    pub gpu_offload: bool,

    /// Environment forcing the discrete GPU on hybrid systems
    #[serde(default = "default_gpu_env")]
    pub gpu_env: BTreeMap<String, String>,

    /// CPU governor / scheduler wrapper, used for local output when present
    #[serde(default = "default_performance_wrapper")]
    pub performance_wrapper: Option<PathBuf>,

    /// ROM keys that need MAME even though the catalog does not flag them
    #[serde(default = "default_mame_only_roms")]
    pub mame_only_roms: Vec<String>,
}

fn default_retroarch() -> PathBuf {
    PathBuf::from("retroarch")
}

fn default_mister_retroarch() -> PathBuf {
    PathBuf::from("/opt/retroarch-mister/retroarch")
}

fn default_core() -> String {
    "fbneo".to_string()
}

fn default_runahead() -> u8 {
    1
}

fn default_true() -> bool {
    true
}

fn default_gpu_env() -> BTreeMap<String, String> {
    [
        ("__NV_PRIME_RENDER_OFFLOAD", "1"),
        ("__GLX_VENDOR_LIBRARY_NAME", "nvidia"),
        ("__VK_LAYER_NV_optimus", "NVIDIA_only"),
        ("VK_ICD_FILENAMES", "/usr/share/vulkan/icd.d/nvidia_icd.json"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

fn default_performance_wrapper() -> Option<PathBuf> {
    Some(PathBuf::from("/usr/bin/game-performance"))
}

fn default_mame_only_roms() -> Vec<String> {
    // ST-V boards FBNeo does not run
    ["cotton2", "cottonbm", "elandore", "sss", "batmanfr"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl Default for EmulatorConfig {
    fn default() -> Self {
        Self {
            retroarch_bin: default_retroarch(),
            mister_retroarch_bin: default_mister_retroarch(),
            default_core: default_core(),
            default_runahead: default_runahead(),
            gpu_offload: true,
            gpu_env: default_gpu_env(),
            performance_wrapper: default_performance_wrapper(),
            mame_only_roms: default_mame_only_roms(),
        }
    }
}

impl EmulatorConfig {
    /// Whether a ROM key is on the MAME-only list
    pub fn is_mame_only(&self, rom: &str) -> bool {
        self.mame_only_roms.iter().any(|r| r == rom)
    }
}

/// Streaming to a MiSTer FPGA over GroovyMiSTer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MisterConfig {
    /// Stream by default instead of rendering locally
    #[serde(default)]
    pub enabled: bool,

    /// MiSTer address
    #[serde(default = "default_mister_host")]
    pub host: String,
}

fn default_mister_host() -> String {
    "192.168.30.81".to_string()
}

impl Default for MisterConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            host: default_mister_host(),
        }
    }
}
