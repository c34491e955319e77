//! sobelmap-io: filesystem boundary for the sobelmap pipeline.
//!
//! Reads image files into [`PixelArray`]s and writes output rasters and
//! JSON reports. All image processing lives in `sobelmap-pipeline`;
//! this crate only moves bytes between disk and memory.

use std::path::PathBuf;

use sobelmap_pipeline::{ErrorKind, PipelineError};

pub mod load;
pub mod save;

pub use load::load_image;
pub use save::{save_gray_image, save_pixels, write_json};

/// Errors raised while reading inputs or writing outputs.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// An empty path was given.
    #[error("{what} path is empty")]
    EmptyPath {
        /// Which path was missing (e.g. `"input"`).
        what: &'static str,
    },

    /// The input file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        /// The file that was being read.
        path: PathBuf,
        /// Underlying OS error.
        source: std::io::Error,
    },

    /// The input file was read but could not be turned into a pixel
    /// array.
    #[error("failed to load {}: {source}", path.display())]
    Load {
        /// The file that was being loaded.
        path: PathBuf,
        /// Underlying pipeline error.
        source: PipelineError,
    },

    /// An image could not be encoded or written.
    #[error("failed to save {}: {source}", path.display())]
    Save {
        /// The destination path.
        path: PathBuf,
        /// Underlying encoder or OS error.
        source: image::ImageError,
    },

    /// A non-image output could not be written.
    #[error("failed to write {}: {source}", path.display())]
    Write {
        /// The destination path.
        path: PathBuf,
        /// Underlying OS error.
        source: std::io::Error,
    },

    /// A report could not be serialized.
    #[error("failed to serialize {what}: {source}")]
    Serialize {
        /// What was being serialized (e.g. `"histogram"`).
        what: &'static str,
        /// Underlying serializer error.
        source: serde_json::Error,
    },
}

impl IoError {
    /// The broad category of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyPath { .. } => ErrorKind::InvalidArgument,
            Self::Read { .. } => ErrorKind::LoadFailure,
            Self::Load { source, .. } => source.kind(),
            Self::Save { .. } | Self::Write { .. } | Self::Serialize { .. } => {
                ErrorKind::SaveFailure
            }
        }
    }
}
