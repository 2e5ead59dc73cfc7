//! End-to-end render properties.

mod common;

use std::ops::ControlFlow;

use common::{random_image, reference_render, CountingSource};
use lens_core::RasterMut;
use lens_io::{ImageData, MemorySource, PreviewSource};
use lens_ops::{
    render_image, render_preview, CacheConfig, DistortionCalc, LensParams, RegionCache,
    RenderOutcome, RenderRect, Renderer,
};

fn distorted() -> LensParams {
    LensParams {
        centre_x: 10.0,
        centre_y: -20.0,
        main: 35.0,
        edge: -15.0,
        zoom: 12.0,
        brighten: -8.0,
    }
}

fn render_centre(params: &LensParams) -> Vec<u8> {
    let image = ImageData::filled(100, 100, 1, 200).unwrap();
    let renderer = Renderer::from_params(params, 100, 100);
    let mut cache = RegionCache::new(MemorySource::new(image), CacheConfig::default()).unwrap();
    let mut out = vec![0u8; 100];
    let mut dst = RasterMut::packed(&mut out, 10, 10, 1).unwrap();
    renderer
        .render(&mut cache, &mut dst, RenderRect::new(45, 45, 10, 10))
        .unwrap();
    out
}

#[test]
fn identity_reproduces_source() {
    let image = random_image(73, 41, 3, 21);
    let (out, _) =
        render_image(MemorySource::new(image.clone()), &LensParams::default(), CacheConfig::default())
            .unwrap();
    assert_eq!(out.data, image.data);
}

#[test]
fn cached_render_matches_reference() {
    let image = random_image(90, 70, 3, 4);
    let params = distorted();
    let calc = DistortionCalc::setup(&params, 90, 70);
    let expected = reference_render(&image, &calc);

    for config in [
        CacheConfig::default(),
        CacheConfig {
            regions: 2,
            region_width: 7,
            region_height: 7,
            x_offset: 3,
            y_offset: 3,
        },
    ] {
        let (out, _) = render_image(MemorySource::new(image.clone()), &params, config).unwrap();
        assert_eq!(out.data, expected);
    }
}

#[test]
fn rendering_is_deterministic() {
    let image = random_image(64, 48, 4, 8);
    let (a, stats_a) =
        render_image(MemorySource::new(image.clone()), &distorted(), CacheConfig::default()).unwrap();
    let (b, stats_b) =
        render_image(MemorySource::new(image), &distorted(), CacheConfig::default()).unwrap();
    assert_eq!(a, b);
    assert_eq!(stats_a, stats_b);
}

#[test]
fn constant_image_centre_is_unchanged() {
    assert!(render_centre(&LensParams::default()).iter().all(|&v| v == 200));
}

#[test]
fn brightening_follows_coefficient_sign() {
    // Centre pixel has zero radial magnitude, so only its neighbours change.
    let centre = 5 * 10 + 5;

    let brighter = render_centre(&LensParams { main: 100.0, brighten: -100.0, ..Default::default() });
    assert_eq!(brighter[centre], 200);
    assert!(brighter[0] > 200 && brighter[99] > 200);
    assert!(brighter.iter().all(|&v| v >= 200));

    let darker = render_centre(&LensParams { main: -100.0, brighten: -100.0, ..Default::default() });
    assert_eq!(darker[centre], 200);
    assert!(darker[0] < 200 && darker[99] < 200);
    assert!(darker.iter().all(|&v| v <= 200));
}

#[test]
fn cancellation_stops_between_rows() {
    let image = random_image(32, 20, 1, 6);
    let params = distorted();
    let renderer = Renderer::from_params(&params, 32, 20);
    let mut cache = RegionCache::new(MemorySource::new(image.clone()), CacheConfig::default()).unwrap();

    let mut out = vec![0xEEu8; 32 * 20];
    let mut dst = RasterMut::packed(&mut out, 32, 20, 1).unwrap();
    let mut rows = 0;
    let outcome = renderer
        .render_with_progress(&mut cache, &mut dst, RenderRect::full(32, 20), |_| {
            rows += 1;
            if rows == 3 { ControlFlow::Break(()) } else { ControlFlow::Continue(()) }
        })
        .unwrap();
    assert_eq!(outcome, RenderOutcome::Cancelled { rows_done: 3 });
    assert!(out[3 * 32..].iter().all(|&v| v == 0xEE));

    // Finishing with the same cache gives the uninterrupted result.
    let mut dst = RasterMut::packed(&mut out, 32, 20, 1).unwrap();
    let outcome = renderer.render(&mut cache, &mut dst, RenderRect::full(32, 20)).unwrap();
    assert!(outcome.is_completed());
    let (fresh, _) = render_image(MemorySource::new(image), &params, CacheConfig::default()).unwrap();
    assert_eq!(out, fresh.data);
}

#[test]
fn provider_error_aborts_render() {
    let image = random_image(200, 120, 3, 12);
    let source = CountingSource::failing_after(image, 4);
    let renderer = Renderer::from_params(&LensParams::default(), 200, 120);
    let mut cache = RegionCache::new(source, CacheConfig::default()).unwrap();

    let mut out = vec![0u8; 200 * 120 * 3];
    let mut dst = RasterMut::packed(&mut out, 200, 120, 3).unwrap();
    let err = renderer
        .render(&mut cache, &mut dst, RenderRect::full(200, 120))
        .unwrap_err();
    assert!(err.is_source_error());
    assert_eq!(cache.source().calls, 4);
}

#[test]
fn rgb_output_from_rgba_source() {
    let image = ImageData::from_fn(20, 20, 4, |x, y, c| if c == 3 { 255 } else { (x * 10 + y) as u8 })
        .unwrap();
    let renderer = Renderer::new(DistortionCalc::identity(20, 20));
    let mut cache = RegionCache::new(MemorySource::new(image.clone()), CacheConfig::default()).unwrap();

    let mut out = vec![0u8; 20 * 20 * 3];
    let mut dst = RasterMut::packed(&mut out, 20, 20, 3).unwrap();
    renderer.render(&mut cache, &mut dst, RenderRect::full(20, 20)).unwrap();
    assert_eq!(&out[3 * (20 * 7 + 4)..3 * (20 * 7 + 4) + 3], &image.pixel(4, 7).unwrap()[..3]);
}

#[test]
fn preview_matches_downscaled_full_render_shape() {
    let image = random_image(300, 200, 3, 30);
    let preview = PreviewSource::from_image(&image, 120).unwrap();
    assert_eq!(preview.scale(), (2.5, 2.5));

    let out = render_preview(preview.clone(), &distorted(), CacheConfig::default(), 1).unwrap();
    assert_eq!((out.width, out.height), (120, 80));

    let calc = DistortionCalc::setup(&distorted(), 120, 80);
    assert_eq!(out.data, reference_render(preview.image(), &calc));
}
