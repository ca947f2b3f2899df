//! Per-game launch overrides (`[games.<id>]`)

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Launch settings for one catalog game
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameOverride {
    /// Run-ahead frame count
    #[serde(default)]
    pub runahead: Option<u8>,

    /// Core name ("fbneo" or "mame")
    #[serde(default)]
    pub core: Option<String>,

    /// Explicit RetroArch override config
    #[serde(default)]
    pub config: Option<PathBuf>,

    /// DIP switch name to setting, passed to the core as options
    #[serde(default)]
    pub dip_switches: BTreeMap<String, String>,
}

impl GameOverride {
    pub fn is_empty(&self) -> bool {
        self.runahead.is_none()
            && self.core.is_none()
            && self.config.is_none()
            && self.dip_switches.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_override() {
        let text = r#"
runahead = 3
core = "fbneo"

[dip_switches]
Stage_Edit = "Enable"
"#;
        let game: GameOverride = toml::from_str(text).unwrap();
        assert_eq!(game.runahead, Some(3));
        assert_eq!(game.core.as_deref(), Some("fbneo"));
        assert_eq!(
            game.dip_switches.get("Stage_Edit").map(String::as_str),
            Some("Enable")
        );
        assert!(!game.is_empty());
    }

    #[test]
    fn test_empty_override() {
        assert!(GameOverride::default().is_empty());
    }
}
