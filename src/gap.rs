use crate::error::Result;
use crate::region::Region;
use serde::{Deserialize, Serialize};

/// Request to turn an empty slot into an ad slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GapRequest {
    pub broadcast_id: u64,
    pub start_time_seconds: u64,
    pub end_time_seconds: u64,
}

impl GapRequest {
    pub fn for_region(broadcast_id: u64, region: &Region) -> Self {
        GapRequest {
            broadcast_id,
            start_time_seconds: region.start_time_seconds,
            end_time_seconds: region.end_time_seconds,
        }
    }
}

/// Receives gap designations. Owns its own persistence and network calls.
pub trait GapDesignator {
    fn designate(&mut self, request: GapRequest) -> Result<()>;
}

/// Collects requests in memory. Used by the CLI dry run and tests.
#[derive(Debug, Default)]
pub struct RecordingDesignator {
    pub requests: Vec<GapRequest>,
}

impl GapDesignator for RecordingDesignator {
    fn designate(&mut self, request: GapRequest) -> Result<()> {
        self.requests.push(request);
        Ok(())
    }
}
