//! Mapping of a color frame to a monochrome "thermal" frame.
//!
//! The steps, in order:
//!
//! 1. masked (vegetation) pixels are blacked out;
//! 2. the frame is reduced to Rec. 601 luminance;
//! 3. local contrast is boosted with [CLAHE][crate::clahe];
//! 4. a power-law gamma correction with exponent `1 / gamma`
//!    brightens the dark end;
//! 5. the result is stretched to the full `0..=255` range;
//! 6. intensities are inverted;
//! 7. masked pixels are forced to 0 again, so vegetation is
//!    always rendered cold regardless of the steps above.
use ndarray::{Array2, Axis, Zip};
use tracing::{debug, warn};

use crate::{
    clahe::Clahe,
    config::PipelineConfig,
    error::Result,
    image::{ColorFrame, GrayFrame, Mask},
};

/// Side information about a tone-mapping run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ToneMapReport {
    /// The gamma-corrected frame had a single intensity, so
    /// the min-max stretch left it unchanged.
    pub uniform_luminance: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct ThermalToneMapper {
    clahe: Clahe,
    gamma: f64,
}

impl ThermalToneMapper {
    pub fn new(config: &PipelineConfig) -> Self {
        ThermalToneMapper {
            clahe: Clahe::new(config.clahe),
            gamma: config.gamma,
        }
    }

    pub fn map(&self, frame: &ColorFrame, mask: &Mask) -> Result<(GrayFrame, ToneMapReport)> {
        let (ht, wid, _) = frame.dim();
        ensure_param!(
            mask.dim() == (ht, wid),
            "mask of shape {:?} does not match {}x{} frame",
            mask.dim(),
            wid,
            ht
        );

        let gray = masked_luminance(frame, mask);
        let equalized = self.clahe.apply(&gray);
        let corrected = gamma_correct(&equalized, self.gamma);
        let (mut out, uniform_luminance) = normalize_min_max(&corrected);
        if uniform_luminance {
            warn!(
                value = corrected.iter().next().copied().unwrap_or(0),
                "uniform luminance; skipping normalization"
            );
        }
        invert(&mut out);
        Zip::from(&mut out).and(mask).for_each(|v, &m| {
            if m {
                *v = 0;
            }
        });

        debug!(width = wid, height = ht, gamma = self.gamma, "tone mapped frame");
        Ok((out, ToneMapReport { uniform_luminance }))
    }
}

/// Rec. 601 luma of an RGB pixel, in 14-bit fixed point.
#[inline]
pub fn luma([r, g, b]: [u8; 3]) -> u8 {
    const R: u32 = 4899;
    const G: u32 = 9617;
    const B: u32 = 1868;
    ((R * r as u32 + G * g as u32 + B * b as u32 + (1 << 13)) >> 14) as u8
}

/// Luminance of `frame` with masked pixels set to 0.
pub fn masked_luminance(frame: &ColorFrame, mask: &Mask) -> GrayFrame {
    let (ht, wid, _) = frame.dim();
    let mut gray = Array2::zeros((ht, wid));
    for (row, pixels) in frame.axis_iter(Axis(0)).enumerate() {
        for (col, px) in pixels.axis_iter(Axis(0)).enumerate() {
            if !mask[(row, col)] {
                gray[(row, col)] = luma([px[0], px[1], px[2]]);
            }
        }
    }
    gray
}

/// `255 * (v / 255) ^ (1 / gamma)`, truncated.
pub fn gamma_correct(frame: &GrayFrame, gamma: f64) -> GrayFrame {
    let exponent = 1. / gamma;
    let mut lut = [0u8; 256];
    for (v, out) in lut.iter_mut().enumerate() {
        *out = (255. * (v as f64 / 255.).powf(exponent)).max(0.).min(255.) as u8;
    }
    frame.mapv(|v| lut[v as usize])
}

/// Stretch `frame` linearly so its minimum maps to 0 and its
/// maximum to 255.
///
/// Results are rounded half to even. A uniform frame has no
/// range to stretch; it is returned unchanged and the second
/// value is `true`.
pub fn normalize_min_max(frame: &GrayFrame) -> (GrayFrame, bool) {
    let (min, max) = frame
        .iter()
        .fold((u8::MAX, u8::MIN), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    if frame.is_empty() || min == max {
        return (frame.clone(), true);
    }

    let range = f64::from(max - min);
    let out = frame.mapv(|v| {
        (f64::from(v - min) * 255. / range)
            .round_ties_even()
            .min(255.) as u8
    });
    (out, false)
}

pub fn invert(frame: &mut GrayFrame) {
    frame.mapv_inplace(|v| 255 - v);
}
