//! Give ordinary photos the look of a monochrome thermal
//! camera.
//!
//! The crate runs a fixed, four-stage pipeline over a single
//! image:
//!
//! 1. [Mask vegetation](vegetation::VegetationMasker) by
//! thresholding in HSV space.
//! 2. [Tone map](tonemap::ThermalToneMapper) the rest into an
//! inverted, contrast-enhanced grayscale frame, with
//! vegetation forced to black.
//! 3. Apply [barrel distortion](distort::BarrelDistorter) to
//! mimic a wide-angle thermal lens.
//! 4. [Zoom](zoom::ZoomCropper) into the centre and resize back
//! to the original frame size.
//!
//! It is a cosmetic filter: nothing here models infrared
//! radiance.
//!
//! # Usage
//!
//! All constants live in [`PipelineConfig`]; the defaults
//! give the reference look.
//!
//! ```rust
//! # fn test_compile() -> anyhow::Result<()> {
//! use std::path::Path;
//! use thermal_filter::{Pipeline, PipelineConfig};
//!
//! let pipeline = Pipeline::new(&PipelineConfig::default())?;
//! let result = pipeline.run_path(Path::new("photo.jpg"), Path::new("thermal.png"))?;
//! eprintln!("{} vegetation pixels", result.vegetation_pixels);
//! # Ok(())
//! # }
//! ```
//!
//! The stages can also be used on their own; frames are
//! `ndarray` arrays (see [`image`]).
//!
//! ```rust
//! # fn test_compile() -> anyhow::Result<()> {
//! use ndarray::Array2;
//! use thermal_filter::{distort::BarrelDistorter, zoom::ZoomCropper};
//!
//! let frame = Array2::from_elem((480, 640), 128u8);
//! let distorted = BarrelDistorter::new(0.09)?.apply(&frame);
//! let zoomed = ZoomCropper::new(1.2)?.apply(&distorted)?;
//! assert_eq!(zoomed.dim(), (480, 640));
//! # Ok(())
//! # }
//! ```

#[macro_use]
pub mod error;

pub mod clahe;
pub mod config;
pub mod distort;
pub mod image;
pub mod pipeline;
pub mod tonemap;
pub mod vegetation;
pub mod zoom;

#[cfg(feature = "cli")]
pub mod cli;

pub use crate::config::PipelineConfig;
pub use crate::error::{ErrorKind, PipelineError};
pub use crate::pipeline::{Pipeline, PipelineOutput};
