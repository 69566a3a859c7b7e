//! Named constants of the pipeline.
//!
//! Every stage reads its parameters from [`PipelineConfig`].
//! The defaults reproduce the reference look; a JSON file may
//! override any subset of the fields:
//!
//! ```json
//! { "distortion_k": 0.05, "clahe": { "clip_limit": 2.0 } }
//! ```
use std::{fs::File, io::BufReader, path::Path};

use serde_derive::*;

use crate::error::{PipelineError, Result};

/// Inclusive HSV bounds, in the 8-bit convention (hue on
/// `0..=180`, saturation and value on `0..=255`).
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct HsvRange {
    pub lower: [u8; 3],
    pub upper: [u8; 3],
}

impl Default for HsvRange {
    fn default() -> Self {
        HsvRange {
            lower: [40, 40, 40],
            upper: [80, 255, 255],
        }
    }
}

impl HsvRange {
    pub fn contains(&self, hsv: [u8; 3]) -> bool {
        (0..3).all(|i| self.lower[i] <= hsv[i] && hsv[i] <= self.upper[i])
    }

    pub fn validate(&self) -> Result<()> {
        ensure_param!(
            self.upper[0] <= 180,
            "hue upper bound {} exceeds 180",
            self.upper[0]
        );
        ensure_param!(
            (0..3).all(|i| self.lower[i] <= self.upper[i]),
            "hsv range is inverted: {:?} > {:?}",
            self.lower,
            self.upper
        );
        Ok(())
    }
}

/// Contrast limited adaptive histogram equalization settings.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct ClaheParams {
    /// Bound on the amplification of any histogram bin,
    /// relative to a flat histogram.
    pub clip_limit: f64,

    /// Number of tiles along `[x, y]`.
    pub tile_grid: [usize; 2],
}

impl Default for ClaheParams {
    fn default() -> Self {
        ClaheParams {
            clip_limit: 1.7,
            tile_grid: [8, 8],
        }
    }
}

impl ClaheParams {
    pub fn validate(&self) -> Result<()> {
        ensure_param!(
            self.clip_limit.is_finite() && self.clip_limit > 0.,
            "clip limit must be positive, got {}",
            self.clip_limit
        );
        ensure_param!(
            self.tile_grid[0] > 0 && self.tile_grid[1] > 0,
            "tile grid must be non-empty, got {:?}",
            self.tile_grid
        );
        Ok(())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    /// Pixels inside this range are treated as vegetation and
    /// rendered black.
    pub vegetation: HsvRange,

    pub clahe: ClaheParams,

    /// Gamma of the power-law correction. The correction
    /// applies exponent `1 / gamma`, brightening dark values.
    pub gamma: f64,

    /// Radial coefficient of the barrel distortion. Zero
    /// disables the distortion; negative values pinch.
    pub distortion_k: f64,

    /// Magnification of the final center crop. Must be
    /// positive; values below one shrink the content.
    pub zoom_factor: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            vegetation: HsvRange::default(),
            clahe: ClaheParams::default(),
            gamma: 2.2,
            distortion_k: 0.09,
            zoom_factor: 1.2,
        }
    }
}

impl PipelineConfig {
    pub fn from_json_path(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|source| PipelineError::ConfigRead {
            path: path.to_owned(),
            source,
        })?;
        let reader = BufReader::new(file);
        let config: PipelineConfig = serde_json::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that all parameters are in their valid ranges.
    ///
    /// The crop window depends on the frame size too, so the
    /// zoom cropper re-checks it once the frame is known.
    pub fn validate(&self) -> Result<()> {
        self.vegetation.validate()?;
        self.clahe.validate()?;
        ensure_param!(
            self.gamma.is_finite() && self.gamma > 0.,
            "gamma must be positive, got {}",
            self.gamma
        );
        ensure_param!(
            self.distortion_k.is_finite(),
            "distortion coefficient must be finite, got {}",
            self.distortion_k
        );
        ensure_param!(
            self.zoom_factor.is_finite() && self.zoom_factor > 0.,
            "zoom factor must be positive, got {}",
            self.zoom_factor
        );
        Ok(())
    }
}
