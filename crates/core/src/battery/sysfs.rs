use std::fs::{self, File};
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use anyhow::{Context, Error};
use super::{Battery, BatteryUpdate, AC, UNKNOWN, USB, WIRELESS};

pub const POWER_SUPPLY_ROOT: &str = "/sys/class/power_supply";

const CHARGE_NOW: &str = "charge_now";
const CHARGE_FULL: &str = "charge_full";
const CAPACITY: &str = "capacity";
const TYPE: &str = "type";
const ONLINE: &str = "online";

enum ChargeSource {
    // The charge_now/charge_full attribute pair.
    Charge { now: File, full: File },
    // A bare percentage, with an implied scale of 100.
    Capacity(File),
}

pub struct SysfsBattery {
    source: ChargeSource,
    root: PathBuf,
}

impl SysfsBattery {
    pub fn new() -> Result<SysfsBattery, Error> {
        SysfsBattery::from_root(POWER_SUPPLY_ROOT)
    }

    pub fn from_root<P: AsRef<Path>>(root: P) -> Result<SysfsBattery, Error> {
        let root = root.as_ref().to_path_buf();
        let base = find_battery(&root)
            .with_context(|| format!("no battery supply under {}", root.display()))?;
        let source = if base.join(CHARGE_NOW).exists() && base.join(CHARGE_FULL).exists() {
            ChargeSource::Charge {
                now: File::open(base.join(CHARGE_NOW))?,
                full: File::open(base.join(CHARGE_FULL))?,
            }
        } else {
            let path = base.join(CAPACITY);
            ChargeSource::Capacity(File::open(&path)
                .with_context(|| format!("can't open {}", path.display()))?)
        };
        Ok(SysfsBattery { source, root })
    }
}

impl Battery for SysfsBattery {
    fn poll(&mut self) -> Result<Option<BatteryUpdate>, Error> {
        let (level, scale) = match self.source {
            ChargeSource::Charge { ref mut now, ref mut full } => (reread(now), reread(full)),
            ChargeSource::Capacity(ref mut file) => (reread(file), 100),
        };
        let plugged = plugged_mask(&self.root);
        Ok(Some(BatteryUpdate { level, scale, plugged }))
    }
}

fn find_battery(root: &Path) -> Option<PathBuf> {
    let mut dirs: Vec<PathBuf> = fs::read_dir(root).ok()?
                                    .filter_map(|entry| entry.ok().map(|entry| entry.path()))
                                    .collect();
    dirs.sort();
    dirs.into_iter()
        .find(|dir| read_attribute(&dir.join(TYPE)).as_deref() == Some("Battery"))
}

fn read_attribute(path: &Path) -> Option<String> {
    fs::read_to_string(path).ok().map(|s| s.trim_end().to_string())
}

fn reread(file: &mut File) -> i32 {
    let mut buf = String::new();
    if file.seek(SeekFrom::Start(0)).is_err() || file.read_to_string(&mut buf).is_err() {
        return UNKNOWN;
    }
    buf.trim_end().parse::<i32>().unwrap_or(UNKNOWN)
}

// Every online sibling supply contributes its source bit.
fn plugged_mask(root: &Path) -> i32 {
    let mut mask = 0;
    if let Ok(entries) = fs::read_dir(root) {
        for entry in entries.filter_map(|entry| entry.ok()) {
            let dir = entry.path();
            if read_attribute(&dir.join(ONLINE)).as_deref() != Some("1") {
                continue;
            }
            match read_attribute(&dir.join(TYPE)).as_deref() {
                Some("Mains") => mask |= AC,
                Some(kind) if kind.starts_with("USB") => mask |= USB,
                Some("Wireless") => mask |= WIRELESS,
                _ => (),
            }
        }
    }
    mask
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;
    use super::*;

    fn scratch_tree(name: &str) -> PathBuf {
        let root = std::env::temp_dir().join(format!("argus-{}-{}", name, std::process::id()));
        fs::remove_dir_all(&root).ok();
        fs::create_dir_all(&root).unwrap();
        root
    }

    #[test]
    fn poll_reads_the_charge_pair_and_the_plugged_mask() {
        let root = scratch_tree("sysfs-charge");
        let bat = root.join("BAT0");
        let ac = root.join("AC");
        fs::create_dir_all(&bat).unwrap();
        fs::create_dir_all(&ac).unwrap();
        fs::write(bat.join("type"), "Battery\n").unwrap();
        fs::write(bat.join("charge_now"), "1600\n").unwrap();
        fs::write(bat.join("charge_full"), "3200\n").unwrap();
        fs::write(ac.join("type"), "Mains\n").unwrap();
        fs::write(ac.join("online"), "1\n").unwrap();

        let mut battery = SysfsBattery::from_root(&root).unwrap();
        let update = battery.poll().unwrap().unwrap();
        assert_eq!(update, BatteryUpdate { level: 1600, scale: 3200, plugged: AC });
        assert_eq!(update.percentage(), 50.0);

        fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn poll_falls_back_to_capacity() {
        let root = scratch_tree("sysfs-capacity");
        let bat = root.join("battery");
        let usb = root.join("usb");
        fs::create_dir_all(&bat).unwrap();
        fs::create_dir_all(&usb).unwrap();
        fs::write(bat.join("type"), "Battery\n").unwrap();
        fs::write(bat.join("capacity"), "87\n").unwrap();
        fs::write(usb.join("type"), "USB_PD\n").unwrap();
        fs::write(usb.join("online"), "1\n").unwrap();

        let mut battery = SysfsBattery::from_root(&root).unwrap();
        let update = battery.poll().unwrap().unwrap();
        assert_eq!(update, BatteryUpdate { level: 87, scale: 100, plugged: USB });

        fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn missing_battery_is_a_construction_error() {
        let root = scratch_tree("sysfs-empty");
        assert!(SysfsBattery::from_root(&root).is_err());
        fs::remove_dir_all(&root).ok();
    }
}
