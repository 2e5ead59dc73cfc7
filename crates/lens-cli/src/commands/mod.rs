//! CLI command implementations

pub mod distort;
pub mod info;
pub mod preview;

use anyhow::{Context, Result};
use lens_io::ImageData;
use lens_ops::{CacheConfig, LensParams};
use serde::Deserialize;
use std::path::Path;

use crate::{CacheArgs, LensArgs};

/// Load image from path
pub fn load_image(path: &Path) -> Result<ImageData> {
    lens_io::read(path).with_context(|| format!("Failed to load: {}", path.display()))
}

/// Save image to path
pub fn save_image(path: &Path, image: &ImageData) -> Result<()> {
    lens_io::write(path, image).with_context(|| format!("Failed to save: {}", path.display()))
}

/// Format byte count for display
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Contents of a YAML preset file. Both sections are optional.
///
/// ```yaml
/// params:
///   main: 30
///   edge: -10
/// cache:
///   regions: 32
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Preset {
    pub params: LensParams,
    pub cache: CacheConfig,
}

impl Preset {
    /// Parses a preset from YAML text.
    pub fn from_yaml(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).context("Invalid preset")
    }

    /// Reads a preset file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read preset: {}", path.display()))?;
        Self::from_yaml(&text).with_context(|| format!("In preset: {}", path.display()))
    }
}

/// Resolves lens parameters and cache geometry: preset first, then flags.
pub fn resolve(lens: &LensArgs, cache: &CacheArgs) -> Result<(LensParams, CacheConfig)> {
    let preset = match &lens.preset {
        Some(path) => Preset::load(path)?,
        None => Preset::default(),
    };

    let mut params = preset.params;
    let overrides = [
        (&mut params.centre_x, lens.centre_x),
        (&mut params.centre_y, lens.centre_y),
        (&mut params.main, lens.main),
        (&mut params.edge, lens.edge),
        (&mut params.zoom, lens.zoom),
        (&mut params.brighten, lens.brighten),
    ];
    for (slot, value) in overrides {
        if let Some(v) = value {
            *slot = v;
        }
    }

    let mut config = preset.cache;
    if let Some(n) = cache.regions {
        config.regions = n;
    }
    if let Some(w) = cache.region_width {
        config.region_width = w;
    }
    if let Some(h) = cache.region_height {
        config.region_height = h;
    }
    config.validate().context("Invalid cache settings")?;

    Ok((params, config))
}
