mod args;

use anyhow::{Context, Result};
use thermal_filter::{cli::init_logging, Pipeline, PipelineConfig};
use tracing::info;

use crate::args::Args;

fn main() -> Result<()> {
    init_logging();
    let args = Args::from_cmd_line()?;

    let config = match &args.config {
        Some(path) => PipelineConfig::from_json_path(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => PipelineConfig::default(),
    };

    let pipeline = Pipeline::new(&config)?;
    let result = pipeline
        .run_path(&args.image, &args.output)
        .with_context(|| format!("processing {}", args.image.display()))?;

    let (ht, wid) = result.image.dim();
    info!(
        width = wid,
        height = ht,
        output = %args.output.display(),
        vegetation_pixels = result.vegetation_pixels,
        "done"
    );
    Ok(())
}
