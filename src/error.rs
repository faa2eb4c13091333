use std::path::PathBuf;

use thiserror::Error;

use crate::session::Mode;

/// Library error type for name-drill operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The photo folder is missing or not a directory.
    #[error("the specified folder '{}' does not exist", .0.display())]
    DirectoryNotFound(PathBuf),

    /// Too few usable photos remain after filtering for the requested mode.
    #[error("not enough valid image files in the folder for {mode} mode: found {found}, need {required}")]
    InsufficientEntries {
        mode: Mode,
        found: usize,
        required: usize,
    },

    /// Quiz mode needs enough distinct display names to build four options.
    #[error("not enough distinct names for quiz mode: found {found}, need {required}")]
    InsufficientNames { found: usize, required: usize },

    /// A file name that does not follow the `Family,Given.ext` layout.
    #[error("file '{0}' ignored due to incorrect format")]
    MalformedFilename(String),

    /// The image-loading collaborator could not decode a photo.
    #[error("failed to decode {}: {source}", path.display())]
    ImageDecode {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    /// Window or surface setup failed.
    #[error("display error: {0}")]
    Display(String),
}
