use std::fs;
use std::path::Path;
use anyhow::{Context, Error};
use nix::sys::utsname::uname;
use serde::Serialize;

pub const OS_RELEASE_PATH: &str = "/etc/os-release";

#[derive(Debug, Clone, Default, Serialize)]
pub struct OsInfo {
    pub sysname: String,
    pub kernel_release: String,
    pub arch: String,
    pub name: String,
    pub version_id: String,
    pub pretty_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub codename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build_id: Option<String>,
}

impl OsInfo {
    pub fn detect() -> Result<OsInfo, Error> {
        let uts = uname().context("can't read uname")?;
        let mut info = OsInfo {
            sysname: uts.sysname().to_string_lossy().into_owned(),
            kernel_release: uts.release().to_string_lossy().into_owned(),
            arch: uts.machine().to_string_lossy().into_owned(),
            .. Default::default()
        };
        if let Ok(content) = fs::read_to_string(Path::new(OS_RELEASE_PATH)) {
            info.apply_os_release(&content);
        }
        Ok(info)
    }

    fn apply_os_release(&mut self, content: &str) {
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some((key, value)) = line.split_once('=') {
                let value = unquote(value);
                match key {
                    "NAME" => self.name = value,
                    "VERSION_ID" => self.version_id = value,
                    "PRETTY_NAME" => self.pretty_name = value,
                    "VERSION_CODENAME" => self.codename = Some(value),
                    "BUILD_ID" => self.build_id = Some(value),
                    _ => (),
                }
            }
        }
    }
}

fn unquote(value: &str) -> String {
    let value = value.trim();
    value.strip_prefix('"')
         .and_then(|v| v.strip_suffix('"'))
         .unwrap_or(value)
         .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_os_release_fields() {
        let mut info = OsInfo::default();
        info.apply_os_release("NAME=\"Ubuntu\"\n\
                               VERSION_ID=\"24.04\"\n\
                               # a comment\n\
                               PRETTY_NAME=\"Ubuntu 24.04.1 LTS\"\n\
                               VERSION_CODENAME=noble\n\
                               HOME_URL=\"https://www.ubuntu.com/\"\n");
        assert_eq!(info.name, "Ubuntu");
        assert_eq!(info.version_id, "24.04");
        assert_eq!(info.pretty_name, "Ubuntu 24.04.1 LTS");
        assert_eq!(info.codename.as_deref(), Some("noble"));
        assert_eq!(info.build_id, None);
    }

    #[test]
    fn unquotes_values() {
        assert_eq!(unquote("\"Arch Linux\""), "Arch Linux");
        assert_eq!(unquote("rolling"), "rolling");
        assert_eq!(unquote("\"unterminated"), "\"unterminated");
    }
}
