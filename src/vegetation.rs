//! Vegetation detection by HSV thresholding.
use ndarray::{Array2, Axis};
use tracing::debug;

use crate::{
    config::HsvRange,
    image::{ColorFrame, Mask},
};

/// Convert an RGB pixel to 8-bit HSV.
///
/// Hue is in half-degrees (`0..180`), saturation and value
/// on `0..=255`. Achromatic pixels get hue 0.
pub fn rgb_to_hsv([r, g, b]: [u8; 3]) -> [u8; 3] {
    let v = r.max(g).max(b);
    let diff = f32::from(v - r.min(g).min(b));
    if v == 0 {
        return [0, 0, 0];
    }
    let s = (255. * diff / f32::from(v)).round() as u8;
    if diff == 0. {
        return [0, s, v];
    }

    let (r, g, b) = (f32::from(r), f32::from(g), f32::from(b));
    let vf = f32::from(v);
    let mut h = if vf == r {
        60. * (g - b) / diff
    } else if vf == g {
        120. + 60. * (b - r) / diff
    } else {
        240. + 60. * (r - g) / diff
    };
    if h < 0. {
        h += 360.;
    }
    let h = (h / 2.).round() as u8;
    [if h >= 180 { h - 180 } else { h }, s, v]
}

/// Marks pixels whose HSV value falls within a fixed range.
#[derive(Debug, Clone, Copy)]
pub struct VegetationMasker {
    range: HsvRange,
}

impl VegetationMasker {
    pub fn new(range: HsvRange) -> Self {
        VegetationMasker { range }
    }

    pub fn mask(&self, frame: &ColorFrame) -> Mask {
        let (ht, wid, _) = frame.dim();
        let mut mask = Array2::from_elem((ht, wid), false);
        for (row, pixels) in frame.axis_iter(Axis(0)).enumerate() {
            for (col, px) in pixels.axis_iter(Axis(0)).enumerate() {
                let hsv = rgb_to_hsv([px[0], px[1], px[2]]);
                mask[(row, col)] = self.range.contains(hsv);
            }
        }
        debug!(
            masked = Self::coverage(&mask),
            total = ht * wid,
            "vegetation mask"
        );
        mask
    }

    /// Number of masked pixels.
    pub fn coverage(mask: &Mask) -> usize {
        mask.iter().filter(|&&m| m).count()
    }
}

impl Default for VegetationMasker {
    fn default() -> Self {
        Self::new(HsvRange::default())
    }
}
