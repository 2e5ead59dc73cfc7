//! Image info command.
//!
//! Shows dimensions and the memory the region cache would use for the image.

use anyhow::Result;
use lens_io::{preview_size, Format};
use lens_ops::CacheConfig;
use std::fs;

use crate::InfoArgs;

/// Default preview box used for the preview size line.
const PREVIEW_BOX: u32 = 256;

pub fn run(args: InfoArgs, verbose: u8) -> Result<()> {
    let config = CacheConfig::default();

    for path in &args.input {
        let file_size = fs::metadata(path)?.len();
        let image = super::load_image(path)?;
        let depth = image.depth();
        let (pw, ph) = preview_size(image.width, image.height, PREVIEW_BOX);

        println!("{}", path.display());
        println!("  Format:     {:?}", Format::from_extension(path));
        println!("  Resolution: {}x{}", image.width, image.height);
        println!("  Channels:   {}", image.channels);
        println!("  File size:  {}", super::format_size(file_size));
        println!("  Decoded:    {}", super::format_size(image.data.len() as u64));
        println!(
            "  Cache:      {} ({} regions of {}x{})",
            super::format_size(config.memory_bytes(depth) as u64),
            config.regions,
            config.region_width,
            config.region_height
        );
        if verbose > 0 {
            println!("  Preview:    {}x{}", pw, ph);
        }

        if args.input.len() > 1 {
            println!();
        }
    }

    Ok(())
}
