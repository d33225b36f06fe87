use std::path::PathBuf;
use serde::{Serialize, Deserialize};
use crate::battery::POWER_SUPPLY_ROOT;
use crate::display::FB_ROOT;

pub const SETTINGS_PATH: &str = "Settings.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Settings {
    pub battery: BatterySettings,
    pub audio: AudioSettings,
    pub network: NetworkSettings,
    pub display: DisplaySettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct BatterySettings {
    pub supply_root: PathBuf,
    pub events_path: PathBuf,
    pub warn: f32,
}

impl Default for BatterySettings {
    fn default() -> Self {
        BatterySettings {
            supply_root: PathBuf::from(POWER_SUPPLY_ROOT),
            events_path: PathBuf::from("/tmp/argus-power-status"),
            warn: 10.0,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct AudioSettings {
    pub card: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct NetworkSettings {
    pub interface: String,
}

impl Default for NetworkSettings {
    fn default() -> Self {
        NetworkSettings {
            interface: "wlan0".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct DisplaySettings {
    pub fb_root: PathBuf,
    pub dpi: u16,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        DisplaySettings {
            fb_root: PathBuf::from(FB_ROOT),
            dpi: 96,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_settings_keep_the_other_defaults() {
        let settings: Settings = toml::from_str("[battery]\n\
                                                 warn = 15.0\n\
                                                 \n\
                                                 [network]\n\
                                                 interface = \"wlp3s0\"\n").unwrap();
        assert_eq!(settings.battery.warn, 15.0);
        assert_eq!(settings.battery.supply_root, PathBuf::from(POWER_SUPPLY_ROOT));
        assert_eq!(settings.network.interface, "wlp3s0");
        assert_eq!(settings.display.dpi, 96);
        assert_eq!(settings.audio.card, None);
    }
}
