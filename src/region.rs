use crate::timecode::format_hhmmss;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Label shown for empty slots, which carry no brand.
const OPEN_SLOT_LABEL: &str = "Open slot";

/// Classification of a stretch of broadcast audio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClipType {
    Song,
    Ad,
    Speech,
    Empty,
}

impl fmt::Display for ClipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ClipType::Song => "song",
            ClipType::Ad => "ad",
            ClipType::Speech => "speech",
            ClipType::Empty => "empty",
        };
        f.pad(name)
    }
}

/// A raw detection result as delivered by the analysis API.
/// Bounds may be fractional; they are floored during normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub start_time_seconds: f64,
    pub end_time_seconds: f64,
    pub clip_type: ClipType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ad_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
}

impl Detection {
    pub fn new(start: f64, end: f64, clip_type: ClipType) -> Self {
        Detection {
            start_time_seconds: start,
            end_time_seconds: end,
            clip_type,
            ad_id: None,
            brand: None,
        }
    }

    /// Attach an identity and display label.
    pub fn with_identity(mut self, ad_id: u64, brand: &str) -> Self {
        self.ad_id = Some(ad_id);
        self.brand = Some(brand.to_string());
        self
    }
}

/// Detection results for one broadcast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionSet {
    pub broadcast_id: u64,
    pub data: Vec<Detection>,
}

/// A normalized region with whole-second, inclusive bounds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub start_time_seconds: u64,
    pub end_time_seconds: u64,
    pub clip_type: ClipType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ad_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
}

impl Region {
    /// Synthesize an empty filler covering `[start, end]`.
    pub fn filler(start: u64, end: u64) -> Self {
        Region {
            start_time_seconds: start,
            end_time_seconds: end,
            clip_type: ClipType::Empty,
            ad_id: None,
            brand: None,
        }
    }

    pub fn is_filler(&self) -> bool {
        self.clip_type == ClipType::Empty
    }

    /// Number of whole seconds covered, counting both bounds.
    /// A reversed region covers nothing.
    pub fn duration_secs(&self) -> u64 {
        if self.end_time_seconds < self.start_time_seconds {
            return 0;
        }
        self.end_time_seconds - self.start_time_seconds + 1
    }

    pub fn contains(&self, second: u64) -> bool {
        second >= self.start_time_seconds && second <= self.end_time_seconds
    }

    /// Midpoint in seconds, used to place gap markers.
    pub fn midpoint(&self) -> f64 {
        let start = self.start_time_seconds as f64;
        start + (self.end_time_seconds as f64 - start) / 2.0
    }

    /// Hover text: brand and time span.
    pub fn tooltip(&self) -> String {
        format!(
            "{}  |  {} - {}",
            self.brand.as_deref().unwrap_or(OPEN_SLOT_LABEL),
            format_hhmmss(self.start_time_seconds),
            format_hhmmss(self.end_time_seconds)
        )
    }
}
