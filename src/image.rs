//! Frame types and conversion to / from files.
//!
//! Frames are plain `ndarray` arrays indexed `(row, col)` for
//! grayscale data and `(row, col, channel)` for color data.
//! Color frames are always in RGB order.
use std::{fs::File, io::BufWriter, path::Path};

use ::image::{GrayImage, RgbImage};
use ndarray::{Array2, Array3};
use tracing::debug;

use crate::error::{PipelineError, Result};

/// An `H x W x 3` RGB frame.
pub type ColorFrame = Array3<u8>;

/// An `H x W` single-channel frame.
pub type GrayFrame = Array2<u8>;

/// An `H x W` vegetation mask; `true` marks a masked pixel.
pub type Mask = Array2<bool>;

/// Decode the image at `path` into an RGB frame.
///
/// Any format the `image` crate understands is accepted;
/// alpha and extra channels are dropped.
pub fn load_color(path: &Path) -> Result<ColorFrame> {
    let decoded = ::image::open(path).map_err(|source| PipelineError::Decode {
        path: path.to_owned(),
        source,
    })?;
    let rgb = decoded.to_rgb8();
    debug!(
        path = %path.display(),
        width = rgb.width(),
        height = rgb.height(),
        "decoded input image"
    );
    color_from_rgb(rgb)
}

pub fn color_from_rgb(image: RgbImage) -> Result<ColorFrame> {
    let (width, height) = image.dimensions();
    Ok(Array3::from_shape_vec(
        (height as usize, width as usize, 3),
        image.into_raw(),
    )?)
}

pub fn gray_from_image(image: GrayImage) -> Result<GrayFrame> {
    let (width, height) = image.dimensions();
    Ok(Array2::from_shape_vec(
        (height as usize, width as usize),
        image.into_raw(),
    )?)
}

pub fn gray_to_image(frame: &GrayFrame) -> GrayImage {
    let (ht, wid) = frame.dim();
    // Iteration is in logical (row-major) order regardless of the
    // memory layout of `frame`, so the length always matches.
    GrayImage::from_raw(wid as u32, ht as u32, frame.iter().copied().collect())
        .unwrap_or_else(|| unreachable!("buffer of {}x{} pixels", wid, ht))
}

/// Write `frame` as an 8-bit grayscale PNG.
pub fn write_png(path: &Path, frame: &GrayFrame) -> Result<()> {
    let (ht, wid) = frame.dim();
    let image_writer = BufWriter::new(File::create(path)?);
    let mut png_writer = {
        let mut encoder = png::Encoder::new(image_writer, wid as u32, ht as u32);
        encoder.set_color(png::ColorType::Grayscale);
        encoder.set_depth(png::BitDepth::Eight);
        encoder.write_header()?
    };
    let data: Vec<u8> = frame.iter().copied().collect();
    png_writer.write_image_data(&data)?;
    debug!(path = %path.display(), width = wid, height = ht, "wrote png");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_layout_is_row_major() -> anyhow::Result<()> {
        let mut rgb = RgbImage::new(3, 2);
        rgb.put_pixel(2, 1, ::image::Rgb([10, 20, 30]));
        let frame = color_from_rgb(rgb)?;
        assert_eq!(frame.dim(), (2, 3, 3));
        assert_eq!(frame[(1, 2, 0)], 10);
        assert_eq!(frame[(1, 2, 1)], 20);
        assert_eq!(frame[(1, 2, 2)], 30);
        Ok(())
    }

    #[test]
    fn gray_conversions_agree() -> anyhow::Result<()> {
        let frame = Array2::from_shape_fn((4, 5), |(r, c)| (r * 5 + c) as u8);
        let image = gray_to_image(&frame);
        assert_eq!(image.dimensions(), (5, 4));
        assert_eq!(image.get_pixel(3, 2)[0], 13);
        assert_eq!(gray_from_image(image)?, frame);

        // transposed views are copied in logical order
        let transposed = frame.t().to_owned();
        assert_eq!(gray_to_image(&transposed).get_pixel(2, 3)[0], 13);
        Ok(())
    }

    #[test]
    fn png_round_trip() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("out.png");
        let frame = Array2::from_shape_fn((6, 7), |(r, c)| (r * 40 + c) as u8);
        write_png(&path, &frame)?;

        let back = ::image::open(&path)?.to_luma8();
        assert_eq!(gray_from_image(back)?, frame);
        Ok(())
    }

    #[test]
    fn missing_file_is_decode_error() {
        let err = load_color(Path::new("does/not/exist.jpg")).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Decode);
    }
}
