//! Region normalization.
//!
//! Turns unordered detection results into an ordered, gapless region list
//! covering `[0, duration]` in whole seconds. Gaps between detections are
//! filled with synthetic empty regions, which the reviewer can later claim
//! as ad slots.

use crate::region::{Detection, Region};
use thiserror::Error;
use tracing::warn;

/// Detection input that cannot be normalized. `index` is the position in
/// the caller's list, before sorting.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InvalidIntervalError {
    #[error("interval {index} has a non-finite bound")]
    NotFinite { index: usize },

    #[error("interval {index} has a negative bound ({value}s)")]
    Negative { index: usize, value: f64 },

    #[error("interval {index} starts at {start}s, after it ends at {end}s")]
    Reversed { index: usize, start: f64, end: f64 },

    #[error("interval {index} ends at {end}s, past the broadcast end at {duration}s")]
    BeyondDuration { index: usize, end: f64, duration: u64 },

    #[error("interval {index} starts at {start}s, inside the interval ending at {previous_end}s")]
    Overlapping {
        index: usize,
        start: u64,
        previous_end: u64,
    },
}

/// Check every detection against the broadcast bounds.
///
/// Bounds are compared after flooring, so a detection ending at 30.4s is
/// accepted for a 30s broadcast.
pub fn validate(duration: u64, detections: &[Detection]) -> Result<(), InvalidIntervalError> {
    for (index, d) in detections.iter().enumerate() {
        let (start, end) = (d.start_time_seconds, d.end_time_seconds);
        if !start.is_finite() || !end.is_finite() {
            return Err(InvalidIntervalError::NotFinite { index });
        }
        if start < 0.0 {
            return Err(InvalidIntervalError::Negative { index, value: start });
        }
        if end < 0.0 {
            return Err(InvalidIntervalError::Negative { index, value: end });
        }
        if start > end {
            return Err(InvalidIntervalError::Reversed { index, start, end });
        }
        if end.floor() > duration as f64 {
            return Err(InvalidIntervalError::BeyondDuration {
                index,
                end,
                duration,
            });
        }
    }
    Ok(())
}

/// Normalize detections into a full-coverage region list.
///
/// Output is sorted by start, free of overlaps, and partitions
/// `[0, duration]` exactly. A detection that starts on the second where the
/// previous one ends gives up that second (its start moves forward by one).
/// If that leaves it with nothing, it is dropped.
pub fn normalize(duration: u64, detections: &[Detection]) -> Result<Vec<Region>, InvalidIntervalError> {
    validate(duration, detections)?;

    let mut order: Vec<usize> = (0..detections.len()).collect();
    order.sort_by(|&a, &b| {
        detections[a]
            .start_time_seconds
            .total_cmp(&detections[b].start_time_seconds)
    });

    // Floor bounds and resolve shared boundary seconds.
    let mut floored: Vec<Region> = Vec::with_capacity(detections.len());
    let mut previous_end: Option<u64> = None;
    for index in order {
        let d = &detections[index];
        let mut start = d.start_time_seconds.floor() as u64;
        let end = d.end_time_seconds.floor() as u64;

        if let Some(prev) = previous_end {
            if start == prev {
                start += 1;
                if start > end {
                    warn!(index, second = prev, "detection absorbed by the preceding region");
                    continue;
                }
            } else if start < prev {
                return Err(InvalidIntervalError::Overlapping {
                    index,
                    start,
                    previous_end: prev,
                });
            }
        }

        previous_end = Some(end);
        floored.push(Region {
            start_time_seconds: start,
            end_time_seconds: end,
            clip_type: d.clip_type,
            ad_id: d.ad_id,
            brand: d.brand.clone(),
        });
    }

    // Interleave fillers. `next_free` is one past the last covered second.
    let mut regions = Vec::with_capacity(floored.len() * 2 + 1);
    let mut next_free: u64 = 0;
    for region in floored {
        if region.start_time_seconds > next_free {
            regions.push(Region::filler(next_free, region.start_time_seconds - 1));
        }
        next_free = region.end_time_seconds + 1;
        regions.push(region);
    }
    if next_free <= duration {
        regions.push(Region::filler(next_free, duration));
    }

    Ok(regions)
}

/// Index of the region covering `second` in a normalized list.
pub fn region_index_at(regions: &[Region], second: u64) -> Option<usize> {
    let idx = regions.partition_point(|r| r.end_time_seconds < second);
    regions
        .get(idx)
        .filter(|r| r.contains(second))
        .map(|_| idx)
}

/// Region covering `second` in a normalized list.
pub fn region_at(regions: &[Region], second: u64) -> Option<&Region> {
    region_index_at(regions, second).map(|i| &regions[i])
}
