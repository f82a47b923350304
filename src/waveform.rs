use crate::amplitude::generate_amplitudes;
use crate::color::{ColorMap, ColorMode};
use crate::error::{Result, ReviewError};
use crate::gap::{GapDesignator, GapRequest};
use crate::normalizer::{normalize, region_index_at};
use crate::region::{Region, RegionSet};
use serde::{Deserialize, Serialize};

/// Pixel geometry of the rendered waveform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaveformLayout {
    #[serde(default = "default_bar_height")]
    pub bar_height_px: f64,
    #[serde(default = "default_bar_width")]
    pub bar_width_px: f64,
    /// Bars never render shorter than this.
    #[serde(default = "default_min_bar_height")]
    pub min_bar_height_px: f64,
}

fn default_bar_height() -> f64 {
    75.0
}

fn default_bar_width() -> f64 {
    2.0
}

fn default_min_bar_height() -> f64 {
    15.0
}

impl Default for WaveformLayout {
    fn default() -> Self {
        WaveformLayout {
            bar_height_px: default_bar_height(),
            bar_width_px: default_bar_width(),
            min_bar_height_px: default_min_bar_height(),
        }
    }
}

/// One rendered bar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    pub index: usize,
    pub height_px: f64,
    pub color: String,
    pub region_index: usize,
    pub is_filler: bool,
    pub tooltip: String,
}

/// Clickable marker at the middle of an empty slot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GapMarker {
    pub region_index: usize,
    pub left_px: f64,
}

/// Render model for one broadcast: regions, colors and bar amplitudes.
#[derive(Debug, Clone)]
pub struct Waveform {
    broadcast_id: u64,
    duration_secs: u64,
    amplitudes: Vec<f64>,
    regions: Vec<Region>,
    colors: ColorMap,
    layout: WaveformLayout,
}

impl Waveform {
    pub fn new(
        broadcast_id: u64,
        duration_secs: u64,
        amplitudes: Vec<f64>,
        regions: Vec<Region>,
        colors: ColorMap,
        layout: WaveformLayout,
    ) -> Self {
        Waveform {
            broadcast_id,
            duration_secs,
            amplitudes,
            regions,
            colors,
            layout,
        }
    }

    /// Normalize detections, assign colors and generate amplitudes.
    pub fn build(
        set: &RegionSet,
        duration_secs: u64,
        seed: &str,
        mode: ColorMode,
        layout: WaveformLayout,
    ) -> Result<Self> {
        let regions = normalize(duration_secs, &set.data)?;
        let colors = ColorMap::assign(&regions, mode);
        let amplitudes = generate_amplitudes(seed, duration_secs as f64);
        Ok(Waveform::new(
            set.broadcast_id,
            duration_secs,
            amplitudes,
            regions,
            colors,
            layout,
        ))
    }

    pub fn broadcast_id(&self) -> u64 {
        self.broadcast_id
    }

    pub fn duration_secs(&self) -> u64 {
        self.duration_secs
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn colors(&self) -> &ColorMap {
        &self.colors
    }

    pub fn bar_count(&self) -> usize {
        self.amplitudes.len()
    }

    /// Seconds represented by one bar. Zero when there are no bars.
    pub fn seconds_per_bar(&self) -> f64 {
        if self.amplitudes.is_empty() {
            0.0
        } else {
            self.duration_secs as f64 / self.amplitudes.len() as f64
        }
    }

    /// Index of the region under bar `index`.
    pub fn region_index_for_bar(&self, index: usize) -> Option<usize> {
        if index >= self.amplitudes.len() {
            return None;
        }
        let last = self.regions.last()?.end_time_seconds;
        let second = ((index as f64 * self.seconds_per_bar()).floor() as u64).min(last);
        region_index_at(&self.regions, second)
    }

    pub fn region_for_bar(&self, index: usize) -> Option<&Region> {
        self.region_index_for_bar(index).map(|i| &self.regions[i])
    }

    /// Every bar with its height, color and hover text.
    pub fn bars(&self) -> Vec<Bar> {
        self.amplitudes
            .iter()
            .enumerate()
            .filter_map(|(index, &amp)| {
                let region_index = self.region_index_for_bar(index)?;
                let region = &self.regions[region_index];
                Some(Bar {
                    index,
                    height_px: (amp * self.layout.bar_height_px).max(self.layout.min_bar_height_px),
                    color: self.colors.color_for(region).to_string(),
                    region_index,
                    is_filler: region.is_filler(),
                    tooltip: region.tooltip(),
                })
            })
            .collect()
    }

    /// Seek target for a click on bar `index`. Only the broadcast that is
    /// currently playing can be seeked.
    pub fn seek_for_bar(&self, index: usize, playing_broadcast_id: Option<u64>) -> Option<f64> {
        if playing_broadcast_id != Some(self.broadcast_id) || index >= self.amplitudes.len() {
            return None;
        }
        Some(index as f64 * self.seconds_per_bar())
    }

    /// Width of the played-portion overlay at `position_secs`.
    pub fn playhead_width_px(&self, position_secs: f64) -> f64 {
        let spb = self.seconds_per_bar();
        if spb == 0.0 {
            return 0.0;
        }
        self.layout.bar_width_px * position_secs / spb
    }

    /// One marker per empty slot, centred on it.
    pub fn gap_markers(&self) -> Vec<GapMarker> {
        let spb = self.seconds_per_bar();
        if spb == 0.0 {
            return Vec::new();
        }
        self.regions
            .iter()
            .enumerate()
            .filter(|(_, r)| r.is_filler())
            .map(|(region_index, r)| GapMarker {
                region_index,
                left_px: r.midpoint() / spb * self.layout.bar_width_px,
            })
            .collect()
    }

    /// Hand the empty slot at `region_index` to `designator`.
    pub fn designate_gap(
        &self,
        region_index: usize,
        designator: &mut dyn GapDesignator,
    ) -> Result<GapRequest> {
        let region = self
            .regions
            .get(region_index)
            .filter(|r| r.is_filler())
            .ok_or(ReviewError::NotAGap(region_index))?;
        let request = GapRequest::for_region(self.broadcast_id, region);
        designator.designate(request.clone())?;
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{EMPTY_COLOR, SPEECH_COLOR};
    use crate::gap::RecordingDesignator;
    use crate::region::{ClipType, Detection};

    fn sample_set() -> RegionSet {
        RegionSet {
            broadcast_id: 4,
            data: vec![
                Detection::new(5.0, 10.0, ClipType::Ad).with_identity(1, "Acme"),
                Detection::new(20.0, 25.0, ClipType::Speech),
            ],
        }
    }

    fn sample_waveform() -> Waveform {
        Waveform::build(
            &sample_set(),
            30,
            "show.mp3",
            ColorMode::Deterministic,
            WaveformLayout::default(),
        )
        .unwrap()
    }

    #[test]
    fn default_layout_values() {
        let layout = WaveformLayout::default();
        assert_eq!(layout.bar_height_px, 75.0);
        assert_eq!(layout.bar_width_px, 2.0);
        assert_eq!(layout.min_bar_height_px, 15.0);
    }

    #[test]
    fn build_composes_the_pipeline() {
        let wf = sample_waveform();
        assert_eq!(wf.bar_count(), 3000);
        assert_eq!(wf.regions().len(), 5);
        assert!((wf.seconds_per_bar() - 0.01).abs() < 1e-12);
    }

    #[test]
    fn build_rejects_invalid_detections() {
        let mut set = sample_set();
        set.data.push(Detection::new(28.0, 45.0, ClipType::Song));
        let result = Waveform::build(&set, 30, "x", ColorMode::Random, WaveformLayout::default());
        assert!(matches!(result, Err(ReviewError::InvalidInterval(_))));
    }

    #[test]
    fn bars_follow_regions() {
        let wf = sample_waveform();
        let bars = wf.bars();
        assert_eq!(bars.len(), 3000);
        // Bar 0 is at 0s (filler), bar 500 at 5s (ad), bar 2000 at 20s (speech).
        assert!(bars[0].is_filler);
        assert_eq!(bars[0].color, EMPTY_COLOR);
        assert_eq!(bars[500].region_index, 1);
        assert!(!bars[500].is_filler);
        assert!(bars[500].tooltip.starts_with("Acme"));
        assert_eq!(bars[2000].color, SPEECH_COLOR);
        assert!(bars.iter().all(|b| b.height_px >= 15.0 && b.height_px <= 75.0));
    }

    #[test]
    fn seek_only_when_playing() {
        let wf = sample_waveform();
        assert_eq!(wf.seek_for_bar(250, Some(4)), Some(2.5));
        assert_eq!(wf.seek_for_bar(250, Some(5)), None);
        assert_eq!(wf.seek_for_bar(250, None), None);
        assert_eq!(wf.seek_for_bar(5000, Some(4)), None);
    }

    #[test]
    fn playhead_scales_with_position() {
        let wf = sample_waveform();
        // 10s at 0.01s per bar = 1000 bars of 2px.
        assert!((wf.playhead_width_px(10.0) - 2000.0).abs() < 1e-6);
    }

    #[test]
    fn markers_sit_on_filler_midpoints() {
        let wf = sample_waveform();
        let markers = wf.gap_markers();
        let indices: Vec<usize> = markers.iter().map(|m| m.region_index).collect();
        assert_eq!(indices, vec![0, 2, 4]);
        // Filler [0, 4] has midpoint 2s = 200 bars = 400px.
        assert!((markers[0].left_px - 400.0).abs() < 1e-6);
    }

    #[test]
    fn designate_gap_accepts_fillers_only() {
        let wf = sample_waveform();
        let mut designator = RecordingDesignator::default();

        let req = wf.designate_gap(2, &mut designator).unwrap();
        assert_eq!(req.broadcast_id, 4);
        assert_eq!((req.start_time_seconds, req.end_time_seconds), (11, 19));

        assert!(matches!(
            wf.designate_gap(1, &mut designator),
            Err(ReviewError::NotAGap(1))
        ));
        assert!(matches!(
            wf.designate_gap(99, &mut designator),
            Err(ReviewError::NotAGap(99))
        ));
        assert_eq!(designator.requests.len(), 1);
    }

    #[test]
    fn no_bars_for_zero_duration() {
        let wf = Waveform::build(
            &RegionSet { broadcast_id: 1, data: vec![] },
            0,
            "x",
            ColorMode::Random,
            WaveformLayout::default(),
        )
        .unwrap();
        assert_eq!(wf.bar_count(), 0);
        assert!(wf.bars().is_empty());
        assert!(wf.gap_markers().is_empty());
        assert_eq!(wf.playhead_width_px(3.0), 0.0);
        assert!(wf.region_for_bar(0).is_none());
    }
}
