//! Error type shared by all pipeline stages.

use std::path::PathBuf;

use thiserror::Error;

/// Everything that can abort a pipeline run.
///
/// A uniform luminance range is not an error: the tone mapper
/// substitutes a defined value and reports it in
/// [`ToneMapReport`][crate::tonemap::ToneMapReport].
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("could not decode image `{}`", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("png encoding failed")]
    Encode(#[from] png::EncodingError),

    #[error("file I/O error")]
    Io(#[from] std::io::Error),

    #[error("could not read configuration `{}`", .path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed configuration")]
    Config(#[from] serde_json::Error),

    #[error("buffer shape mismatch")]
    Shape(#[from] ndarray::ShapeError),
}

/// Coarse failure class of a [`PipelineError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Decode,
    InvalidParameter,
    Output,
    Config,
}

impl PipelineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::Decode { .. } => ErrorKind::Decode,
            PipelineError::InvalidParameter(_) => ErrorKind::InvalidParameter,
            PipelineError::Encode(_) | PipelineError::Io(_) | PipelineError::Shape(_) => {
                ErrorKind::Output
            }
            PipelineError::ConfigRead { .. } | PipelineError::Config(_) => ErrorKind::Config,
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;

/// Bail out of a stage with [`PipelineError::InvalidParameter`].
macro_rules! invalid_param {
    ($($arg:tt)*) => {
        return Err($crate::error::PipelineError::InvalidParameter(format!($($arg)*)))
    };
}

/// Like `anyhow::ensure!`, but raising [`PipelineError::InvalidParameter`].
macro_rules! ensure_param {
    ($cond:expr, $($arg:tt)*) => {
        if !$cond {
            invalid_param!($($arg)*);
        }
    };
}
