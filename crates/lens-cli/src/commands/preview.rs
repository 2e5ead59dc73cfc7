//! Preview command - distortion rendered from a downscaled copy

use anyhow::{Context, Result};
use lens_io::PreviewSource;
use lens_ops::render_preview;

use super::{load_image, resolve, save_image};
use crate::PreviewArgs;

pub fn run(args: PreviewArgs, verbose: u8) -> Result<()> {
    let (params, config) = resolve(&args.lens, &args.cache)?;
    let input = load_image(&args.input)?;

    let source = PreviewSource::from_image(&input, args.size)
        .with_context(|| format!("Failed to build preview of {}", args.input.display()))?;
    let (scale_x, scale_y) = source.scale();

    if verbose > 0 {
        println!(
            "Preview: {}x{} -> {}x{} (scale {:.2}x{:.2}), step {}",
            input.width,
            input.height,
            source.image().width,
            source.image().height,
            scale_x,
            scale_y,
            args.step
        );
    }

    let output = render_preview(source, &params, config, args.step).context("Preview render failed")?;
    save_image(&args.output, &output)?;

    if verbose > 0 {
        println!("Saved: {} ({}x{})", args.output.display(), output.width, output.height);
    }
    Ok(())
}
