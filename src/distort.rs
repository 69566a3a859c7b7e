//! Radial (barrel / pincushion) lens distortion.
//!
//! Output pixels are placed on a normalized grid spanning
//! `[-1, 1]` along each axis. A pixel at `(x, y)` samples the
//! source at `(x, y) * (1 + k r²)`, mapped back to pixel
//! coordinates, so a positive `k` pulls the periphery inwards
//! (barrel) and a negative one pushes it out (pincushion).
use itertools::iproduct;
use ndarray::Array2;
use tracing::debug;

use crate::{error::Result, image::GrayFrame};

/// Source sample coordinates for every output pixel.
#[derive(Debug, Clone, PartialEq)]
pub struct DistortionField {
    pub map_x: Array2<f32>,
    pub map_y: Array2<f32>,
}

impl DistortionField {
    pub fn dim(&self) -> (usize, usize) {
        self.map_x.dim()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct BarrelDistorter {
    k: f64,
}

impl BarrelDistorter {
    pub fn new(k: f64) -> Result<Self> {
        ensure_param!(k.is_finite(), "distortion coefficient must be finite, got {}", k);
        Ok(BarrelDistorter { k })
    }

    pub fn field(&self, ht: usize, wid: usize) -> DistortionField {
        let xs: Vec<f64> = (0..wid).map(|c| normalized(c, wid)).collect();
        let ys: Vec<f64> = (0..ht).map(|r| normalized(r, ht)).collect();
        let half_w = wid.saturating_sub(1) as f64 / 2.;
        let half_h = ht.saturating_sub(1) as f64 / 2.;

        let mut map_x = Array2::zeros((ht, wid));
        let mut map_y = Array2::zeros((ht, wid));
        for (row, col) in iproduct!(0..ht, 0..wid) {
            let (x, y) = (xs[col], ys[row]);
            let factor = 1. + self.k * (x * x + y * y);
            map_x[(row, col)] = ((x * factor + 1.) * half_w) as f32;
            map_y[(row, col)] = ((y * factor + 1.) * half_h) as f32;
        }
        DistortionField { map_x, map_y }
    }

    pub fn apply(&self, frame: &GrayFrame) -> GrayFrame {
        let (ht, wid) = frame.dim();
        debug!(k = self.k, width = wid, height = ht, "barrel distortion");
        remap_bilinear(frame, &self.field(ht, wid))
    }
}

/// Position of index `i` on a grid of `n` points spanning
/// `[-1, 1]`. A single point sits at the centre.
fn normalized(i: usize, n: usize) -> f64 {
    if n < 2 {
        0.
    } else {
        2. * i as f64 / (n - 1) as f64 - 1.
    }
}

/// Sample `src` at the coordinates of `field` with bilinear
/// interpolation.
///
/// Neighbors outside the canvas take the value of the nearest
/// edge pixel, so every output is a convex combination of
/// source pixels.
pub fn remap_bilinear(src: &GrayFrame, field: &DistortionField) -> GrayFrame {
    let (src_h, src_w) = src.dim();
    let (ht, wid) = field.dim();
    if src_h == 0 || src_w == 0 {
        return Array2::zeros((ht, wid));
    }

    let clamp = |v: f32, len: usize| -> usize { (v.max(0.) as usize).min(len - 1) };
    let mut dst = Array2::zeros((ht, wid));
    for (row, col) in iproduct!(0..ht, 0..wid) {
        let sx = field.map_x[(row, col)];
        let sy = field.map_y[(row, col)];
        let (x0, y0) = (sx.floor(), sy.floor());
        let (fx, fy) = (sx - x0, sy - y0);

        let (xa, xb) = (clamp(x0, src_w), clamp(x0 + 1., src_w));
        let (ya, yb) = (clamp(y0, src_h), clamp(y0 + 1., src_h));
        let px = |r: usize, c: usize| src[(r, c)] as f32;

        let top = px(ya, xa) * (1. - fx) + px(ya, xb) * fx;
        let bottom = px(yb, xa) * (1. - fx) + px(yb, xb) * fx;
        let value = top * (1. - fy) + bottom * fy;
        dst[(row, col)] = value.round().max(0.).min(255.) as u8;
    }
    dst
}
