use std::path::PathBuf;

use thiserror::Error;

/// Failures that reach the user through a dialog.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Bad frame rate or scale text, or no frames loaded
    #[error("invalid inputs or no video selected.")]
    InvalidInput,

    #[error("an export is already running, wait for it to finish.")]
    AlreadyRunning,

    /// Scaled frames exceed what a GIF can hold (65535 px per side)
    #[error("scaled frames would be {width}x{height}, larger than a gif allows; use a smaller scale.")]
    TooLarge { width: u32, height: u32 },

    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode gif: {0}")]
    Encode(#[from] image::ImageError),

    #[error("export worker stopped unexpectedly: {0}")]
    WorkerFailed(String),
}

impl ExportError {
    /// Dialog title for this error.
    pub fn title(&self) -> &'static str {
        match self {
            ExportError::InvalidInput | ExportError::AlreadyRunning => "error",
            _ => "export failed",
        }
    }
}
