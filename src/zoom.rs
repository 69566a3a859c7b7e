//! Center crop followed by a resize back to the frame size.
use ::image::imageops::{self, FilterType};
use ndarray::Array2;
use tracing::debug;

use crate::{
    error::Result,
    image::{gray_from_image, gray_to_image, GrayFrame},
};

/// Largest crop window accepted, as a multiple of the frame
/// size along each axis. Bounds the memory a tiny zoom factor
/// could otherwise request.
pub const MAX_WINDOW_SCALE: usize = 16;

/// A crop rectangle in source pixel coordinates. The origin
/// is negative when the window is larger than the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropWindow {
    pub x: isize,
    pub y: isize,
    pub width: usize,
    pub height: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct ZoomCropper {
    zoom: f64,
}

impl ZoomCropper {
    pub fn new(zoom: f64) -> Result<Self> {
        ensure_param!(
            zoom.is_finite() && zoom > 0.,
            "zoom factor must be positive, got {}",
            zoom
        );
        Ok(ZoomCropper { zoom })
    }

    /// Window of `(wid / zoom, ht / zoom)` pixels, truncated,
    /// centred in a `wid x ht` frame.
    pub fn window(&self, ht: usize, wid: usize) -> Result<CropWindow> {
        let width = (wid as f64 / self.zoom) as usize;
        let height = (ht as f64 / self.zoom) as usize;
        ensure_param!(
            width >= 1 && height >= 1,
            "zoom factor {} leaves a {}x{} crop of a {}x{} frame",
            self.zoom,
            width,
            height,
            wid,
            ht
        );
        ensure_param!(
            width <= wid * MAX_WINDOW_SCALE && height <= ht * MAX_WINDOW_SCALE,
            "zoom factor {} asks for a {}x{} window of a {}x{} frame",
            self.zoom,
            width,
            height,
            wid,
            ht
        );

        let origin = |full: usize, part: usize| (full as isize - part as isize).div_euclid(2);
        Ok(CropWindow {
            x: origin(wid, width),
            y: origin(ht, height),
            width,
            height,
        })
    }

    pub fn apply(&self, frame: &GrayFrame) -> Result<GrayFrame> {
        let (ht, wid) = frame.dim();
        let window = self.window(ht, wid)?;
        debug!(zoom = self.zoom, ?window, "zoom crop");

        if window.width == wid && window.height == ht {
            return Ok(frame.clone());
        }

        let cropped = crop(frame, &window);
        let resized = imageops::resize(
            &gray_to_image(&cropped),
            wid as u32,
            ht as u32,
            FilterType::CatmullRom,
        );
        gray_from_image(resized)
    }
}

/// Copy `window` out of `frame`, replicating edge pixels where
/// the window extends past the frame.
fn crop(frame: &GrayFrame, window: &CropWindow) -> GrayFrame {
    let (ht, wid) = frame.dim();
    let clamp = |v: isize, len: usize| v.max(0).min(len as isize - 1) as usize;
    Array2::from_shape_fn((window.height, window.width), |(r, c)| {
        frame[(
            clamp(window.y + r as isize, ht),
            clamp(window.x + c as isize, wid),
        )]
    })
}
