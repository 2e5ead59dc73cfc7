//! Distort command - full-resolution lens distortion

use anyhow::{Context, Result};
use lens_io::{ImageData, MemorySource};
use lens_ops::{RegionCache, RenderRect, Renderer};
use std::ops::ControlFlow;
use tracing::{debug, info};

use super::{load_image, resolve, save_image};
use crate::DistortArgs;

pub fn run(args: DistortArgs, verbose: u8) -> Result<()> {
    let (params, config) = resolve(&args.lens, &args.cache)?;

    if verbose > 0 {
        println!("Loading: {}", args.input.display());
    }
    let input = load_image(&args.input)?;
    let (width, height, channels) = (input.width, input.height, input.channels);

    if verbose > 0 {
        println!("Size: {}x{} ({} ch)", width, height, channels);
        println!(
            "Lens: centre=({}, {}) main={} edge={} zoom={} brighten={}",
            params.centre_x, params.centre_y, params.main, params.edge, params.zoom, params.brighten
        );
    }
    debug!("cache config: {:?}", config);

    let renderer = Renderer::from_params(&params, width, height);
    if renderer.calc().is_identity() {
        info!("lens mapping is the identity, only brightness compensation applies");
    }
    let mut cache = RegionCache::new(MemorySource::new(input), config)
        .context("Failed to set up region cache")?;

    let mut output = ImageData::filled(width, height, channels, 0)?;
    let mut dst = output.raster_mut()?;
    let mut next_report = 0.1;
    renderer
        .render_with_progress(&mut cache, &mut dst, RenderRect::full(width, height), |done| {
            if done >= next_report {
                info!("{:.0}% rendered", done * 100.0);
                next_report += 0.1;
            }
            ControlFlow::Continue(())
        })
        .context("Render failed")?;

    save_image(&args.output, &output)?;

    if args.stats {
        println!("Cache: {}", cache.stats());
        println!(
            "Cache memory: {}",
            super::format_size(cache.memory_bytes() as u64)
        );
    }
    if verbose > 0 {
        println!("Saved: {}", args.output.display());
    }

    Ok(())
}
