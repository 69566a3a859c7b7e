use std::path::Path;

use anyhow::Result;
use image::{Rgb, RgbImage};
use thermal_filter::{
    image::{color_from_rgb, gray_from_image},
    zoom::ZoomCropper,
    ErrorKind, Pipeline, PipelineConfig,
};

const WIDTH: u32 = 640;
const HEIGHT: u32 = 480;

/// Gray background, a green square at rows / cols 100..200 and
/// a white rectangle at rows 250..400, cols 350..550.
fn scene() -> RgbImage {
    RgbImage::from_fn(WIDTH, HEIGHT, |x, y| {
        if (100..200).contains(&x) && (100..200).contains(&y) {
            Rgb([0, 255, 0])
        } else if (350..550).contains(&x) && (250..400).contains(&y) {
            Rgb([255, 255, 255])
        } else {
            Rgb([128, 128, 128])
        }
    })
}

/// Location in the input frame that output pixel `(col, row)`
/// is drawn from, following the zoom and distortion mappings.
fn source_of(config: &PipelineConfig, col: usize, row: usize) -> Result<(f64, f64)> {
    let (w, h) = (WIDTH as f64, HEIGHT as f64);
    let window = ZoomCropper::new(config.zoom_factor)?.window(HEIGHT as usize, WIDTH as usize)?;
    let zx = window.x as f64 + (col as f64 + 0.5) * window.width as f64 / w - 0.5;
    let zy = window.y as f64 + (row as f64 + 0.5) * window.height as f64 / h - 0.5;

    let x = 2. * zx / (w - 1.) - 1.;
    let y = 2. * zy / (h - 1.) - 1.;
    let factor = 1. + config.distortion_k * (x * x + y * y);
    Ok((
        (x * factor + 1.) * (w - 1.) / 2.,
        (y * factor + 1.) * (h - 1.) / 2.,
    ))
}

fn inside(p: (f64, f64), cols: (f64, f64), rows: (f64, f64), margin: f64) -> bool {
    p.0 >= cols.0 + margin
        && p.0 <= cols.1 - 1. - margin
        && p.1 >= rows.0 + margin
        && p.1 <= rows.1 - 1. - margin
}

#[test]
fn green_square_stays_black_through_geometry() -> Result<()> {
    let config = PipelineConfig {
        distortion_k: 0.09,
        zoom_factor: 1.2,
        ..Default::default()
    };
    let result = Pipeline::new(&config)?.run(&color_from_rgb(scene())?)?;
    let out = &result.image;

    assert_eq!(out.dim(), (HEIGHT as usize, WIDTH as usize));
    assert_eq!(result.vegetation_pixels, 100 * 100);
    assert!(!result.tone.uniform_luminance);

    let mut green = 0;
    let mut white = 0;
    let mut background = 0;
    for ((row, col), &v) in out.indexed_iter() {
        let src = source_of(&config, col, row)?;
        if inside(src, (100., 200.), (100., 200.), 4.) {
            assert_eq!(v, 0, "vegetation at ({}, {}) from {:?}", row, col, src);
            green += 1;
        } else if inside(src, (350., 550.), (250., 400.), 4.) {
            // brightest input, so darkest after inversion
            assert!(v <= 5, "white region at ({}, {}) is {}", row, col, v);
            white += 1;
        } else if src.0 > 20. && src.0 < 80. && src.1 > 20. && src.1 < 80. {
            // gray background, away from the other regions
            assert!(v >= 30, "background at ({}, {}) is {}", row, col, v);
            background += 1;
        }
    }
    assert!(green > 5000, "only {} green samples", green);
    assert!(white > 10000, "only {} white samples", white);
    assert!(background > 1000, "only {} background samples", background);
    Ok(())
}

#[test]
fn all_black_input_gives_uniform_output() -> Result<()> {
    let black = RgbImage::new(WIDTH, HEIGHT);
    let result = Pipeline::new(&PipelineConfig::default())?.run(&color_from_rgb(black)?)?;

    assert!(result.tone.uniform_luminance);
    assert_eq!(result.vegetation_pixels, 0);
    // resampling may round a uniform frame by one level
    let min = result.image.iter().min().copied().unwrap_or(0);
    let max = result.image.iter().max().copied().unwrap_or(0);
    assert!(max - min <= 1, "range {}..={}", min, max);
    assert!(min > 0);
    Ok(())
}

#[test]
fn writes_grayscale_png() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let input = dir.path().join("scene.png");
    let output = dir.path().join("thermal.png");
    scene().save(&input)?;

    let pipeline = Pipeline::new(&PipelineConfig::default())?;
    let result = pipeline.run_path(&input, &output)?;

    let written = image::open(&output)?;
    assert_eq!(written.color(), image::ColorType::L8);
    assert_eq!(gray_from_image(written.to_luma8())?, result.image);
    Ok(())
}

#[test]
fn undecodable_input_writes_nothing() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let input = dir.path().join("broken.jpg");
    std::fs::write(&input, b"definitely not a jpeg")?;
    let output = dir.path().join("out.png");

    let pipeline = Pipeline::new(&PipelineConfig::default())?;
    for path in [input.as_path(), Path::new("/no/such/image.png")].iter() {
        let err = pipeline.run_path(path, &output).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
        assert!(!output.exists());
    }
    Ok(())
}

#[test]
fn invalid_zoom_is_rejected_up_front() {
    for &zoom in [0., -2.].iter() {
        let config = PipelineConfig {
            zoom_factor: zoom,
            ..Default::default()
        };
        let err = Pipeline::new(&config).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);
    }
}

#[test]
fn oversized_zoom_fails_at_the_crop() -> Result<()> {
    let config = PipelineConfig {
        zoom_factor: 1000.,
        ..Default::default()
    };
    let pipeline = Pipeline::new(&config)?;
    let err = pipeline.run(&color_from_rgb(scene())?).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidParameter);
    Ok(())
}

#[test]
fn identity_geometry_keeps_tone_map() -> Result<()> {
    let config = PipelineConfig {
        distortion_k: 0.,
        zoom_factor: 1.,
        ..Default::default()
    };
    let frame = color_from_rgb(scene())?;
    let result = Pipeline::new(&config)?.run(&frame)?;

    // without geometry the green square lands exactly where it was
    for row in 100..200 {
        for col in 100..200 {
            assert_eq!(result.image[(row, col)], 0);
        }
    }
    assert!(result.image[(50, 50)] > 0);
    Ok(())
}
