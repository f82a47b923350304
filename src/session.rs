//! ReviewSession: single entry point for the review UI.
//!
//! Owns the configuration, the loaded broadcast's waveform, its audio
//! source and the notice buffer. The view layer and the headless tests both
//! drive the core through these methods. Every failure a reviewer should
//! know about lands in the notice buffer, whatever its origin.

use crate::audio::{AudioClient, AudioSource, FetchOutcome, RequestToken};
use crate::config::ReviewConfig;
use crate::error::{Result, ReviewError};
use crate::gap::{GapDesignator, GapRequest};
use crate::notices::{Notice, NoticeBuffer, NoticeLevel};
use crate::region::RegionSet;
use crate::timecode::format_hhmmss;
use crate::upload::{DurationProbe, UploadForm, UploadHandoff, UploadRequest};
use crate::view::{MemoryView, ViewAdapter};
use crate::waveform::Waveform;
use serde::Serialize;
use tracing::{error, info};

#[derive(Debug, Clone, Serialize)]
pub struct SessionStatus {
    pub api_base: String,
    pub broadcast_id: Option<u64>,
    pub region_count: usize,
    pub bar_count: usize,
    pub audio_ready: bool,
    pub notice_count: usize,
}

pub struct ReviewSession<V: ViewAdapter> {
    config: ReviewConfig,
    client: AudioClient,
    audio: AudioSource<V::Handle>,
    view: V,
    waveform: Option<Waveform>,
    pub notices: NoticeBuffer,
}

impl<V: ViewAdapter> ReviewSession<V> {
    pub fn new(config: ReviewConfig, view: V) -> Self {
        let client = AudioClient::new(&config.api_base);
        ReviewSession {
            config,
            client,
            audio: AudioSource::new(),
            view,
            waveform: None,
            notices: NoticeBuffer::new(),
        }
    }

    pub fn config(&self) -> &ReviewConfig {
        &self.config
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            api_base: self.client.api_base().to_string(),
            broadcast_id: self.waveform.as_ref().map(Waveform::broadcast_id),
            region_count: self.waveform.as_ref().map_or(0, |w| w.regions().len()),
            bar_count: self.waveform.as_ref().map_or(0, Waveform::bar_count),
            audio_ready: self.audio.is_playable(),
            notice_count: self.notices.len(),
        }
    }

    // ── Broadcast ───────────────────────────────────────────────────────────

    /// Rebuild the waveform from fresh detection data. The previous waveform
    /// is kept if the new data is rejected.
    pub fn load_broadcast(&mut self, set: &RegionSet, duration_secs: u64, seed: &str) -> Result<&Waveform> {
        match Waveform::build(
            set,
            duration_secs,
            seed,
            self.config.color_mode,
            self.config.layout,
        ) {
            Ok(waveform) => {
                info!(
                    broadcast_id = set.broadcast_id,
                    regions = waveform.regions().len(),
                    bars = waveform.bar_count(),
                    "broadcast loaded"
                );
                Ok(self.waveform.insert(waveform))
            }
            Err(e) => {
                error!(broadcast_id = set.broadcast_id, error = %e, "rejected detection data");
                self.report(NoticeLevel::Error, e.to_string());
                Err(e)
            }
        }
    }

    pub fn waveform(&self) -> Option<&Waveform> {
        self.waveform.as_ref()
    }

    /// Seek target for a bar click, if this broadcast is the one playing.
    pub fn seek(&self, bar_index: usize, playing_broadcast_id: Option<u64>) -> Option<f64> {
        self.waveform
            .as_ref()?
            .seek_for_bar(bar_index, playing_broadcast_id)
    }

    pub fn designate_gap(
        &mut self,
        region_index: usize,
        designator: &mut dyn GapDesignator,
    ) -> Result<GapRequest> {
        let waveform = self.waveform.as_ref().ok_or(ReviewError::NoWaveform)?;
        match waveform.designate_gap(region_index, designator) {
            Ok(request) => Ok(request),
            Err(e) => {
                self.report(NoticeLevel::Error, e.to_string());
                Err(e)
            }
        }
    }

    // ── Audio ───────────────────────────────────────────────────────────────

    /// Start a fetch; pair the token with [`Self::complete_audio_fetch`].
    pub fn begin_audio_fetch(&mut self) -> RequestToken {
        self.audio.begin()
    }

    pub fn audio_client(&self) -> &AudioClient {
        &self.client
    }

    pub fn complete_audio_fetch(
        &mut self,
        token: RequestToken,
        result: Result<Vec<u8>>,
    ) -> Result<FetchOutcome> {
        let outcome = self.audio.complete(token, result, &mut self.view);
        if let Err(e) = &outcome {
            self.report(NoticeLevel::Error, format!("Could not load audio: {}", e));
        }
        outcome
    }

    /// Fetch and publish a broadcast's audio.
    pub async fn fetch_audio(&mut self, filename: &str) -> Result<FetchOutcome> {
        let token = self.begin_audio_fetch();
        let client = self.client.clone();
        let result = client.fetch(filename).await;
        self.complete_audio_fetch(token, result)
    }

    pub fn audio_handle(&self) -> Option<&V::Handle> {
        self.audio.handle()
    }

    pub fn clear_audio(&mut self) {
        self.audio.clear(&mut self.view);
    }

    // ── Upload ──────────────────────────────────────────────────────────────

    pub fn submit_upload(
        &mut self,
        form: &mut UploadForm,
        probe: &dyn DurationProbe,
        handoff: &mut dyn UploadHandoff,
    ) -> Result<UploadRequest> {
        match form.submit(probe, handoff) {
            Ok(request) => {
                self.report(
                    NoticeLevel::Info,
                    format!(
                        "Uploading '{}' ({})",
                        request.recording_name,
                        format_hhmmss(request.duration_secs)
                    ),
                );
                Ok(request)
            }
            Err(e) => {
                self.report(NoticeLevel::Error, e.user_message());
                Err(e.into())
            }
        }
    }

    // ── Notices ─────────────────────────────────────────────────────────────

    pub fn get_notices(&self, since_index: usize) -> Vec<Notice> {
        self.notices.get(since_index)
    }

    /// Record a notice and hand it to the view.
    fn report(&mut self, level: NoticeLevel, message: String) {
        self.notices.push(level, message);
        if let Some(notice) = self.notices.last() {
            self.view.notify(notice);
        }
    }
}

impl ReviewSession<MemoryView> {
    /// Session with default config and an in-memory view. For testing.
    pub fn new_test() -> Self {
        ReviewSession::new(ReviewConfig::default(), MemoryView::new())
    }
}
