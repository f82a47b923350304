use thiserror::Error;

use crate::normalizer::InvalidIntervalError;
use crate::upload::UploadError;

/// Crate-wide error type for the review core.
#[derive(Error, Debug)]
pub enum ReviewError {
    /// Detection data failed validation before normalization.
    #[error("Invalid interval: {0}")]
    InvalidInterval(#[from] InvalidIntervalError),

    /// Broadcast upload was rejected or could not be measured.
    #[error(transparent)]
    Upload(#[from] UploadError),

    /// Audio could not be fetched from the API.
    #[error("Audio fetch failed: {0}")]
    AudioFetch(String),

    /// A gap was requested for a region that is not an empty slot.
    #[error("Region {0} is not an empty slot")]
    NotAGap(usize),

    /// An operation needed a loaded waveform.
    #[error("No broadcast loaded")]
    NoWaveform,

    /// The gap designation collaborator refused the request.
    #[error("Gap designation failed: {0}")]
    Designation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ReviewError>;
