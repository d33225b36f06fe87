use std::fs;
use std::path::Path;
use nix::ifaddrs::getifaddrs;

pub const NET_ROOT: &str = "/sys/class/net";

// Handed out by platforms that hide the real address.
const PLACEHOLDER_MAC: &str = "02:00:00:00:00:00";
const NULL_MAC: &str = "00:00:00:00:00:00";

/// The hardware address of `interface`, preferring the sysfs attribute
/// and falling back to enumerating the host's interfaces. `None` when
/// both strategies come up empty.
pub fn mac_address(interface: &str) -> Option<String> {
    sysfs_mac(Path::new(NET_ROOT), interface).or_else(|| interface_mac(interface))
}

fn sysfs_mac(root: &Path, interface: &str) -> Option<String> {
    let mac = fs::read_to_string(root.join(interface).join("address")).ok()?
                 .trim()
                 .to_lowercase();
    if usable(&mac) {
        Some(mac)
    } else {
        None
    }
}

fn interface_mac(interface: &str) -> Option<String> {
    for ifaddr in getifaddrs().ok()? {
        if ifaddr.interface_name != interface {
            continue;
        }
        let bytes = ifaddr.address.as_ref()
                          .and_then(|addr| addr.as_link_addr())
                          .and_then(|link| link.addr());
        if let Some(bytes) = bytes {
            let mac = format_mac(&bytes);
            if usable(&mac) {
                return Some(mac);
            }
        }
    }
    None
}

fn usable(mac: &str) -> bool {
    !mac.is_empty() && mac != PLACEHOLDER_MAC && mac != NULL_MAC
}

pub fn format_mac(bytes: &[u8]) -> String {
    bytes.iter()
         .map(|byte| format!("{:02x}", byte))
         .collect::<Vec<String>>()
         .join(":")
}
