//! Deterministic waveform amplitudes.
//!
//! The bar heights for a recording are derived from a seed string (usually
//! the recording's filename) rather than from decoded audio, so the same
//! recording always shows the same shape without fetching its audio first.
//! The hash and generator are exact 32-bit integer arithmetic; results are
//! bit-identical across platforms and runs.

/// Bars generated per second of broadcast.
pub const POINTS_PER_SECOND: f64 = 100.0;

/// Lowest amplitude emitted, so no bar renders at zero height.
pub const AMPLITUDE_FLOOR: f64 = 0.1;

/// Hash a string to a 32-bit seed: `hash = unit + ((hash << 5) - hash)`
/// over its UTF-16 code units, wrapping at 32 bits.
pub fn string_to_seed(input: &str) -> u32 {
    input.encode_utf16().fold(0u32, |hash, unit| {
        (unit as u32).wrapping_add((hash << 5).wrapping_sub(hash))
    })
}

/// Mulberry32 pseudo-random generator.
#[derive(Debug, Clone)]
pub struct Mulberry32 {
    state: u32,
}

impl Mulberry32 {
    pub fn new(seed: u32) -> Self {
        Mulberry32 { state: seed }
    }

    /// Seed from a string via [`string_to_seed`].
    pub fn from_str_seed(seed: &str) -> Self {
        Self::new(string_to_seed(seed))
    }

    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_add(0x6D2B_79F5);
        let mut t = self.state;
        t = (t ^ (t >> 15)).wrapping_mul(t | 1);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
        t ^ (t >> 14)
    }

    /// Next value in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        self.next_u32() as f64 / 4_294_967_296.0
    }
}

impl Iterator for Mulberry32 {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        Some(self.next_f64())
    }
}

/// Number of bars for a broadcast of `duration_secs`.
/// Negative or non-finite durations yield zero bars.
pub fn bar_count(duration_secs: f64) -> usize {
    let count = (duration_secs * POINTS_PER_SECOND).floor();
    if count.is_finite() && count > 0.0 {
        count as usize
    } else {
        0
    }
}

/// Generate `floor(duration * 100)` amplitudes in `[0.1, 1.0)` from `seed`.
pub fn generate_amplitudes(seed: &str, duration_secs: f64) -> Vec<f64> {
    Mulberry32::from_str_seed(seed)
        .take(bar_count(duration_secs))
        .map(|raw| raw * 0.9 + AMPLITUDE_FLOOR)
        .collect()
}
