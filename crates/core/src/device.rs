use std::fs;
use std::path::Path;
use serde::Serialize;

pub const DMI_ROOT: &str = "/sys/class/dmi/id";

const MACHINE_ID_PATHS: [&str; 2] = ["/etc/machine-id", "/var/lib/dbus/machine-id"];

/// Identity of the machine we're running on, read from the DMI tree.
/// Attributes the firmware doesn't expose come back empty.
#[derive(Debug, Clone, Serialize)]
pub struct DeviceInfo {
    pub vendor: String,
    pub product: String,
    pub version: String,
    pub board: String,
    pub firmware: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serial: Option<String>,
}

impl DeviceInfo {
    pub fn detect() -> DeviceInfo {
        DeviceInfo::from_root(Path::new(DMI_ROOT))
    }

    pub fn from_root(root: &Path) -> DeviceInfo {
        DeviceInfo {
            vendor: attribute(root, "sys_vendor"),
            product: attribute(root, "product_name"),
            version: attribute(root, "product_version"),
            board: attribute(root, "board_name"),
            firmware: attribute(root, "bios_version"),
            // Readable by root only on most systems.
            serial: read_trimmed(&root.join("product_serial")),
        }
    }
}

fn attribute(root: &Path, name: &str) -> String {
    read_trimmed(&root.join(name)).unwrap_or_default()
}

fn read_trimmed(path: &Path) -> Option<String> {
    fs::read_to_string(path).ok()
       .map(|s| s.trim().to_string())
       .filter(|s| !s.is_empty())
}

/// The stable per-installation identifier.
pub fn machine_id() -> Option<String> {
    MACHINE_ID_PATHS.iter().find_map(|path| read_trimmed(Path::new(path)))
}

#[cfg(test)]
mod tests {
    use std::fs;
    use super::*;

    #[test]
    fn detects_from_a_dmi_tree() {
        let root = std::env::temp_dir().join(format!("argus-dmi-{}", std::process::id()));
        fs::remove_dir_all(&root).ok();
        fs::create_dir_all(&root).unwrap();
        fs::write(root.join("sys_vendor"), "LENOVO\n").unwrap();
        fs::write(root.join("product_name"), "20QV\n").unwrap();
        fs::write(root.join("board_name"), "20QV0007\n").unwrap();

        let info = DeviceInfo::from_root(&root);
        assert_eq!(info.vendor, "LENOVO");
        assert_eq!(info.product, "20QV");
        assert_eq!(info.board, "20QV0007");
        assert!(info.version.is_empty());
        assert_eq!(info.serial, None);

        fs::remove_dir_all(&root).ok();
    }
}
