//! Composition of the four stages.
use std::path::Path;

use tracing::info;

use crate::{
    config::PipelineConfig,
    distort::BarrelDistorter,
    error::Result,
    image::{load_color, write_png, ColorFrame, GrayFrame},
    tonemap::{ThermalToneMapper, ToneMapReport},
    vegetation::VegetationMasker,
    zoom::ZoomCropper,
};

/// Result of a successful run.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Final single-channel frame, same size as the input.
    pub image: GrayFrame,

    /// Number of pixels classified as vegetation.
    pub vegetation_pixels: usize,

    pub tone: ToneMapReport,
}

/// The thermal-look pipeline: mask vegetation, tone map,
/// distort, zoom.
#[derive(Debug, Clone)]
pub struct Pipeline {
    masker: VegetationMasker,
    tone_mapper: ThermalToneMapper,
    distorter: BarrelDistorter,
    cropper: ZoomCropper,
}

impl Pipeline {
    pub fn new(config: &PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Pipeline {
            masker: VegetationMasker::new(config.vegetation),
            tone_mapper: ThermalToneMapper::new(config),
            distorter: BarrelDistorter::new(config.distortion_k)?,
            cropper: ZoomCropper::new(config.zoom_factor)?,
        })
    }

    pub fn run(&self, frame: &ColorFrame) -> Result<PipelineOutput> {
        let (ht, wid, _) = frame.dim();
        info!(width = wid, height = ht, "running thermal pipeline");

        let mask = self.masker.mask(frame);
        let vegetation_pixels = VegetationMasker::coverage(&mask);
        let (thermal, tone) = self.tone_mapper.map(frame, &mask)?;
        let distorted = self.distorter.apply(&thermal);
        let image = self.cropper.apply(&distorted)?;

        Ok(PipelineOutput {
            image,
            vegetation_pixels,
            tone,
        })
    }

    /// Decode `input`, run the pipeline and write the result to
    /// `output` as a grayscale PNG.
    ///
    /// Nothing is written unless every stage succeeds.
    pub fn run_path(&self, input: &Path, output: &Path) -> Result<PipelineOutput> {
        let frame = load_color(input)?;
        let result = self.run(&frame)?;
        write_png(output, &result.image)?;
        info!(
            input = %input.display(),
            output = %output.display(),
            vegetation_pixels = result.vegetation_pixels,
            "wrote thermal image"
        );
        Ok(result)
    }
}
