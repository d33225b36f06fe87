use std::fs;
use std::path::Path;
use anyhow::{Context, Error};
use serde::Serialize;

pub const FB_ROOT: &str = "/sys/class/graphics/fb0";

#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct DisplayMetrics {
    pub width: u32,
    pub height: u32,
    pub dpi: u16,
    pub density: f32,
}

impl DisplayMetrics {
    pub fn detect(dpi: u16) -> Result<DisplayMetrics, Error> {
        DisplayMetrics::from_root(Path::new(FB_ROOT), dpi)
    }

    pub fn from_root(root: &Path, dpi: u16) -> Result<DisplayMetrics, Error> {
        let path = root.join("virtual_size");
        let content = fs::read_to_string(&path)
                         .with_context(|| format!("can't read {}", path.display()))?;
        let (width, height) = parse_virtual_size(&content)
            .with_context(|| format!("malformed virtual size {:?}", content.trim()))?;
        Ok(DisplayMetrics { width, height, dpi, density: dpi as f32 / 160.0 })
    }
}

fn parse_virtual_size(content: &str) -> Option<(u32, u32)> {
    let (width, height) = content.trim().split_once(',')?;
    Some((width.trim().parse().ok()?, height.trim().parse().ok()?))
}

#[cfg(test)]
mod tests {
    use std::fs;
    use super::*;

    #[test]
    fn parses_the_virtual_size_attribute() {
        assert_eq!(parse_virtual_size("1080,1440\n"), Some((1080, 1440)));
        assert_eq!(parse_virtual_size("758, 1024"), Some((758, 1024)));
        assert_eq!(parse_virtual_size("1080\n"), None);
        assert_eq!(parse_virtual_size("a,b"), None);
    }

    #[test]
    fn reads_metrics_from_a_framebuffer_tree() {
        let root = std::env::temp_dir().join(format!("argus-fb-{}", std::process::id()));
        fs::remove_dir_all(&root).ok();
        fs::create_dir_all(&root).unwrap();
        fs::write(root.join("virtual_size"), "758,1024\n").unwrap();

        let metrics = DisplayMetrics::from_root(&root, 212).unwrap();
        assert_eq!((metrics.width, metrics.height), (758, 1024));
        assert_eq!(metrics.dpi, 212);
        assert_eq!(metrics.density, 1.325);

        fs::remove_dir_all(&root).ok();
    }
}
