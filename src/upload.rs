use lofty::file::AudioFile;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info};

/// Why a broadcast upload did not reach the handoff.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum UploadError {
    #[error("Please select an audio file")]
    MissingFile,

    #[error("Please fill in all required fields")]
    MissingFields,

    /// The file's duration could not be read from its metadata.
    #[error("Cannot read duration of '{}': {}", .path.display(), .reason)]
    Metadata { path: PathBuf, reason: String },
}

impl UploadError {
    /// Text shown to the reviewer. Metadata details go to the log only.
    pub fn user_message(&self) -> String {
        match self {
            UploadError::Metadata { .. } => "Upload failed. See console for details.".to_string(),
            other => other.to_string(),
        }
    }
}

/// Everything the host application needs to start an upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadRequest {
    pub file: PathBuf,
    pub duration_secs: u64,
    pub station_name: String,
    pub recording_name: String,
}

/// Reads the playable duration of an audio file.
pub trait DurationProbe {
    fn probe(&self, path: &Path) -> Result<Duration, UploadError>;
}

/// Takes over a validated upload. Owns the transport.
pub trait UploadHandoff {
    fn start_upload(&mut self, request: UploadRequest);
}

/// Duration from container metadata via lofty.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoftyProbe;

impl DurationProbe for LoftyProbe {
    fn probe(&self, path: &Path) -> Result<Duration, UploadError> {
        let tagged_file = lofty::read_from_path(path).map_err(|e| UploadError::Metadata {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Ok(tagged_file.properties().duration())
    }
}

/// The upload form's fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadForm {
    pub station_name: String,
    pub recording_name: String,
    pub file: Option<PathBuf>,
}

impl UploadForm {
    pub fn new(station_name: &str, recording_name: &str, file: Option<PathBuf>) -> Self {
        UploadForm {
            station_name: station_name.to_string(),
            recording_name: recording_name.to_string(),
            file,
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == UploadForm::default()
    }

    /// Validate, measure and hand off the upload.
    ///
    /// The form is cleared on every path, including validation failures.
    /// Nothing reaches `handoff` unless all fields are present and the
    /// duration was read. Names that are only whitespace count as missing;
    /// the rest are handed off as typed. Durations are floored to whole
    /// seconds.
    pub fn submit(
        &mut self,
        probe: &dyn DurationProbe,
        handoff: &mut dyn UploadHandoff,
    ) -> Result<UploadRequest, UploadError> {
        let form = std::mem::take(self);

        let file = form.file.ok_or(UploadError::MissingFile)?;
        if form.station_name.trim().is_empty() || form.recording_name.trim().is_empty() {
            return Err(UploadError::MissingFields);
        }

        let duration = probe.probe(&file).inspect_err(|e| {
            error!(error = %e, "could not measure broadcast duration");
        })?;

        let request = UploadRequest {
            file,
            duration_secs: duration.as_secs(),
            station_name: form.station_name,
            recording_name: form.recording_name,
        };
        info!(
            file = %request.file.display(),
            duration_secs = request.duration_secs,
            station = %request.station_name,
            "handing off broadcast upload"
        );
        handoff.start_upload(request.clone());
        Ok(request)
    }
}

/// Collects handed-off requests. Used by the CLI dry run and tests.
#[derive(Debug, Default)]
pub struct PendingUploads {
    pub requests: Vec<UploadRequest>,
}

impl UploadHandoff for PendingUploads {
    fn start_upload(&mut self, request: UploadRequest) {
        self.requests.push(request);
    }
}
