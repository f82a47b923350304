//! Broadcast audio retrieval.
//!
//! [`AudioClient`] fetches recordings from the review API. [`AudioSource`]
//! holds whichever fetch finished last *and* was requested last: every
//! request gets a generation token, and results carrying an older token are
//! dropped, so a slow response can never overwrite a newer one.

use crate::error::{Result, ReviewError};
use crate::view::ViewAdapter;
use reqwest::Url;
use tracing::{debug, error, info};

/// HTTP client for the audio endpoint.
#[derive(Debug, Clone)]
pub struct AudioClient {
    api_base: String,
    http: reqwest::Client,
}

impl AudioClient {
    pub fn new(api_base: &str) -> Self {
        AudioClient {
            api_base: api_base.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// `{api_base}/audio/broadcasts/{filename}`
    pub fn audio_url(&self, filename: &str) -> String {
        format!("{}/audio/broadcasts/{}", self.api_base, filename)
    }

    /// Download a broadcast's audio. Non-2xx responses are errors.
    pub async fn fetch(&self, filename: &str) -> Result<Vec<u8>> {
        let url = self.audio_url(filename);
        debug!(%url, "fetching broadcast audio");

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| ReviewError::AudioFetch(format!("{}: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ReviewError::AudioFetch(format!("{}: HTTP {}", url, status)));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ReviewError::AudioFetch(format!("{}: {}", url, e)))?;
        info!(%url, bytes = body.len(), "broadcast audio fetched");
        Ok(body.to_vec())
    }
}

/// Last non-empty path segment of `url`, e.g. the filename of a broadcast
/// link. `None` for unparseable URLs or bare hosts.
pub fn filename_from_url(url: &str) -> Option<String> {
    let parsed = match Url::parse(url) {
        Ok(u) => u,
        Err(e) => {
            error!(url, error = %e, "invalid URL");
            return None;
        }
    };
    parsed
        .path_segments()?
        .rev()
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

/// Identifies one fetch request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RequestToken(u64);

/// What happened to a completed fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Result applied; the source is playable.
    Loaded,
    /// A newer request was issued; the result was dropped.
    Stale,
}

/// Playback source for the loaded broadcast.
#[derive(Debug)]
pub struct AudioSource<H> {
    generation: u64,
    handle: Option<H>,
}

impl<H> Default for AudioSource<H> {
    fn default() -> Self {
        AudioSource {
            generation: 0,
            handle: None,
        }
    }
}

impl<H> AudioSource<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a request. Any earlier outstanding request becomes stale.
    pub fn begin(&mut self) -> RequestToken {
        self.generation += 1;
        RequestToken(self.generation)
    }

    pub fn is_current(&self, token: RequestToken) -> bool {
        token.0 == self.generation
    }

    pub fn handle(&self) -> Option<&H> {
        self.handle.as_ref()
    }

    /// Playback controls are enabled only when audio is loaded.
    pub fn is_playable(&self) -> bool {
        self.handle.is_some()
    }

    /// Apply a fetch result.
    ///
    /// A failure for the current request clears the source and is returned
    /// so the caller can surface it. Results for stale tokens are dropped
    /// whether they succeeded or not.
    pub fn complete<A>(
        &mut self,
        token: RequestToken,
        result: Result<Vec<u8>>,
        adapter: &mut A,
    ) -> Result<FetchOutcome>
    where
        A: ViewAdapter<Handle = H>,
    {
        if !self.is_current(token) {
            debug!(token = token.0, current = self.generation, "dropping stale audio fetch");
            return Ok(FetchOutcome::Stale);
        }

        if let Some(old) = self.handle.take() {
            adapter.release_audio(old);
        }

        match result {
            Ok(bytes) => {
                self.handle = Some(adapter.publish_audio(bytes));
                Ok(FetchOutcome::Loaded)
            }
            Err(e) => {
                error!(error = %e, "audio fetch failed, playback disabled");
                Err(e)
            }
        }
    }

    /// Drop the loaded audio and invalidate outstanding requests.
    pub fn clear<A>(&mut self, adapter: &mut A)
    where
        A: ViewAdapter<Handle = H>,
    {
        self.generation += 1;
        if let Some(old) = self.handle.take() {
            adapter.release_audio(old);
        }
    }
}
