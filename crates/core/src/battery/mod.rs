mod sysfs;
mod fake;

use std::fmt;
use anyhow::Error;
use serde::{Serialize, Deserialize};

pub use self::sysfs::{SysfsBattery, POWER_SUPPLY_ROOT};
pub use self::fake::FakeBattery;

// Power source bits of an update's plugged mask.
pub const AC: i32 = 1;
pub const USB: i32 = 2;
pub const WIRELESS: i32 = 4;

// Absent or unreadable values degrade to this.
pub const UNKNOWN: i32 = -1;

/// A raw battery status snapshot, as delivered by the platform.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct BatteryUpdate {
    pub level: i32,
    pub scale: i32,
    pub plugged: i32,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PowerSource {
    Ac,
    Usb,
    Wireless,
}

impl fmt::Display for PowerSource {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PowerSource::Ac => write!(f, "ac"),
            PowerSource::Usb => write!(f, "usb"),
            PowerSource::Wireless => write!(f, "wireless"),
        }
    }
}

/// Derived battery state: the charge percentage and the connected power
/// sources, in AC, USB, wireless order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatteryReading {
    #[serde(rename = "battery")]
    pub percentage: f32,
    #[serde(rename = "plugged")]
    pub sources: Vec<PowerSource>,
}

impl BatteryUpdate {
    /// Charge percentage rounded half-up to one decimal place, or -1
    /// when the level or scale is unknown. Out-of-range inputs pass
    /// through the arithmetic unclamped.
    pub fn percentage(&self) -> f32 {
        if self.level == UNKNOWN || self.scale == UNKNOWN || self.scale == 0 {
            return UNKNOWN as f32;
        }
        let percentage = self.level as f32 * 100.0 / self.scale as f32;
        (percentage * 10.0 + 0.5).floor() / 10.0
    }

    /// Connected power sources. A negative mask means the platform
    /// didn't report one, and decodes to the empty set.
    pub fn sources(&self) -> Vec<PowerSource> {
        let mut sources = Vec::new();
        if self.plugged < 0 {
            return sources;
        }
        if self.plugged & AC != 0 {
            sources.push(PowerSource::Ac);
        }
        if self.plugged & USB != 0 {
            sources.push(PowerSource::Usb);
        }
        if self.plugged & WIRELESS != 0 {
            sources.push(PowerSource::Wireless);
        }
        sources
    }

    pub fn reading(&self) -> BatteryReading {
        BatteryReading {
            percentage: self.percentage(),
            sources: self.sources(),
        }
    }
}

pub trait Battery: Send {
    /// The freshest status snapshot, or `None` when the platform can't
    /// supply one.
    fn poll(&mut self) -> Result<Option<BatteryUpdate>, Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update(level: i32, scale: i32, plugged: i32) -> BatteryUpdate {
        BatteryUpdate { level, scale, plugged }
    }

    #[test]
    fn percentage_rounds_to_one_decimal() {
        assert_eq!(update(57, 100, 0).percentage(), 57.0);
        assert_eq!(update(33, 50, 0).percentage(), 66.0);
        assert_eq!(update(1, 3, 0).percentage(), 33.3);
        assert_eq!(update(2, 3, 0).percentage(), 66.7);
        assert_eq!(update(100, 100, 0).percentage(), 100.0);
        // Ties on the tenth digit round up.
        assert_eq!(update(1, 400, 0).percentage(), 0.3);
    }

    #[test]
    fn percentage_propagates_negative_inputs() {
        assert_eq!(update(-50, 100, 0).percentage(), -50.0);
        assert_eq!(update(50, -100, 0).percentage(), -50.0);
    }

    #[test]
    fn percentage_unknown_sentinels() {
        assert_eq!(update(-1, 50, 0).percentage(), -1.0);
        assert_eq!(update(50, -1, 0).percentage(), -1.0);
        assert_eq!(update(50, 0, 0).percentage(), -1.0);
    }

    #[test]
    fn sources_decode_every_mask() {
        let all = [PowerSource::Ac, PowerSource::Usb, PowerSource::Wireless];
        for mask in 0..8 {
            let expected: Vec<PowerSource> = all.iter().enumerate()
                                                .filter(|(i, _)| mask & (1 << i) != 0)
                                                .map(|(_, source)| *source)
                                                .collect();
            assert_eq!(update(50, 100, mask).sources(), expected);
        }
        assert_eq!(update(50, 100, 5).sources(),
                   vec![PowerSource::Ac, PowerSource::Wireless]);
    }

    #[test]
    fn negative_mask_decodes_to_no_sources() {
        assert!(update(50, 100, -1).sources().is_empty());
    }

    #[test]
    fn decoding_is_pure() {
        let update = update(31, 100, 3);
        assert_eq!(update.reading(), update.reading());
    }
}
