//! Extension dispatch and end-to-end file tests for lens-io.

use lens_core::{PixelRect, SourceProvider};
use lens_io::{read, write, Format, ImageData, IoError, MemorySource, PreviewSource};

#[test]
fn format_detection() {
    assert_eq!(Format::from_extension("a/b/c.png"), Format::Png);
    assert_eq!(Format::from_extension("C.PNG"), Format::Png);
    assert_eq!(Format::from_extension("c.exr"), Format::Unknown);
    assert_eq!(Format::from_extension("noext"), Format::Unknown);
}

#[test]
fn unknown_extension_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let image = ImageData::filled(2, 2, 3, 0).unwrap();
    let err = write(dir.path().join("out.tga"), &image).unwrap_err();
    assert!(matches!(err, IoError::UnsupportedFormat(ext) if ext == "tga"));
}

#[test]
fn rgba_file_feeds_memory_source() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rgba.png");
    let image = ImageData::from_fn(16, 9, 4, |x, y, c| (x * 4 + y * 16 + c) as u8).unwrap();
    write(&path, &image).unwrap();

    let mut source = MemorySource::new(read(&path).unwrap());
    assert_eq!(source.dimensions(), (16, 9));
    assert_eq!(source.depth(), 4);

    let mut buf = vec![0u8; 4];
    source.get_rect(PixelRect::new(3, 2, 1, 1), &mut buf).unwrap();
    assert_eq!(buf, vec![44, 45, 46, 47]);
}

#[test]
fn preview_from_file_source() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("big.png");
    write(&path, &ImageData::filled(240, 120, 3, 90).unwrap()).unwrap();

    let mut source = MemorySource::new(read(&path).unwrap());
    let preview = PreviewSource::from_source(&mut source, 60).unwrap();
    assert_eq!(preview.dimensions(), (60, 30));
    assert_eq!(preview.scale(), (4.0, 4.0));
    assert!(preview.image().data.iter().all(|&v| v == 90));
}
