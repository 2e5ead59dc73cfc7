//! PNG format support.
//!
//! Reads any PNG into 8-bit interleaved samples (palettes and low bit
//! depths are expanded, 16-bit samples are stripped to their high byte) and
//! writes 8-bit gray, gray+alpha, RGB or RGBA.
//!
//! # Example
//!
//! ```rust,ignore
//! use lens_io::png::{read, write};
//!
//! let image = read("input.png")?;
//! write("output.png", &image)?;
//! ```

use crate::{ImageData, IoError, IoResult};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Reads a PNG file from the given path.
pub fn read<P: AsRef<Path>>(path: P) -> IoResult<ImageData> {
    let file = File::open(path.as_ref())?;
    let mut decoder = png::Decoder::new(BufReader::new(file));
    decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);
    let mut reader = decoder
        .read_info()
        .map_err(|e: png::DecodingError| IoError::DecodeError(e.to_string()))?;

    let buf_size = reader
        .output_buffer_size()
        .ok_or_else(|| IoError::DecodeError("cannot determine output buffer size".into()))?;
    let mut buf = vec![0u8; buf_size];
    let info = reader
        .next_frame(&mut buf)
        .map_err(|e: png::DecodingError| IoError::DecodeError(e.to_string()))?;

    if info.bit_depth != png::BitDepth::Eight {
        return Err(IoError::UnsupportedBitDepth(format!(
            "{:?} {:?}",
            info.color_type, info.bit_depth
        )));
    }

    let channels = match info.color_type {
        png::ColorType::Grayscale => 1,
        png::ColorType::GrayscaleAlpha => 2,
        png::ColorType::Rgb => 3,
        png::ColorType::Rgba => 4,
        other => {
            return Err(IoError::UnsupportedBitDepth(format!(
                "{:?} {:?}",
                other, info.bit_depth
            )));
        }
    };

    buf.truncate(info.buffer_size());
    ImageData::from_u8(info.width, info.height, channels, buf)
}

/// Writes an 8-bit image to a PNG file.
pub fn write<P: AsRef<Path>>(path: P, image: &ImageData) -> IoResult<()> {
    let color_type = match image.channels {
        1 => png::ColorType::Grayscale,
        2 => png::ColorType::GrayscaleAlpha,
        3 => png::ColorType::Rgb,
        4 => png::ColorType::Rgba,
        n => return Err(IoError::EncodeError(format!("unsupported channel count: {}", n))),
    };

    let file = File::create(path.as_ref())?;
    let writer = BufWriter::new(file);

    let mut encoder = png::Encoder::new(writer, image.width, image.height);
    encoder.set_color(color_type);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_compression(png::Compression::default());

    let mut png_writer = encoder
        .write_header()
        .map_err(|e| IoError::EncodeError(e.to_string()))?;

    png_writer
        .write_image_data(&image.data)
        .map_err(|e| IoError::EncodeError(e.to_string()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_rgb() {
        let image = ImageData::from_fn(32, 32, 3, |x, y, c| match c {
            0 => (x * 8) as u8,
            1 => (y * 8) as u8,
            _ => 128,
        })
        .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lens_io_test_rgb.png");

        write(&path, &image).expect("Failed to write PNG");
        let loaded = read(&path).expect("Failed to read PNG");

        assert_eq!(loaded, image);
    }

    #[test]
    fn test_roundtrip_gray_keeps_single_channel() {
        let image = ImageData::from_fn(7, 5, 1, |x, y, _| (x * 30 + y) as u8).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lens_io_test_gray.png");

        write(&path, &image).unwrap();
        let loaded = read(&path).unwrap();

        assert_eq!(loaded.channels, 1);
        assert_eq!(loaded.data, image.data);
    }

    #[test]
    fn test_read_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read(dir.path().join("absent.png")).unwrap_err();
        assert!(matches!(err, IoError::Io(_)));
    }
}
