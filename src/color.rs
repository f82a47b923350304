use crate::amplitude::{Mulberry32, string_to_seed};
use crate::region::{ClipType, Region};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Fixed color for empty slots.
pub const EMPTY_COLOR: &str = "#222222";

/// Fixed color for speech.
pub const SPEECH_COLOR: &str = "#6784a8";

/// Hue family and lightness spread for generated colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Palette {
    /// Ads: hue 30, lightness 50-89.
    Orange,
    /// Songs: hue 135, lightness 50-69.
    Green,
}

impl Palette {
    pub fn hue(self) -> f64 {
        match self {
            Palette::Orange => 30.0,
            Palette::Green => 135.0,
        }
    }

    pub fn lightness_range(self) -> u32 {
        match self {
            Palette::Orange => 40,
            Palette::Green => 20,
        }
    }

    /// Palette used for a clip type, if its color is generated.
    pub fn for_clip(clip_type: ClipType) -> Option<Palette> {
        match clip_type {
            ClipType::Ad => Some(Palette::Orange),
            ClipType::Song => Some(Palette::Green),
            ClipType::Speech | ClipType::Empty => None,
        }
    }
}

/// How ad and song colors are picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColorMode {
    /// Fresh random shade on every pass.
    #[default]
    Random,
    /// Shade derived from the identity key, stable across passes.
    Deterministic,
}

/// Convert HSL (hue in degrees, saturation and lightness in percent) to
/// `#rrggbb`.
pub fn hsl_to_hex(h: f64, s: f64, l: f64) -> String {
    let s = s / 100.0;
    let l = l / 100.0;
    let k = |n: f64| (n + h / 30.0) % 12.0;
    let a = s * l.min(1.0 - l);
    let f = |n: f64| {
        let kn = k(n);
        let v = l - a * (kn - 3.0).min((9.0 - kn).min(1.0)).max(-1.0);
        (255.0 * v).round() as u8
    };
    format!("#{:02x}{:02x}{:02x}", f(0.0), f(8.0), f(4.0))
}

/// Random shade from `palette` using the thread-local generator.
pub fn random_hex(palette: Palette) -> String {
    let saturation = 80 + fastrand::u32(..20);
    let lightness = 50 + fastrand::u32(..palette.lightness_range());
    hsl_to_hex(palette.hue(), saturation as f64, lightness as f64)
}

/// Random shade from `palette` drawn from an explicit generator.
pub fn random_hex_with(palette: Palette, rng: &mut fastrand::Rng) -> String {
    let saturation = 80 + rng.u32(..20);
    let lightness = 50 + rng.u32(..palette.lightness_range());
    hsl_to_hex(palette.hue(), saturation as f64, lightness as f64)
}

/// Shade from `palette` derived from `key`. Same key, same color.
pub fn deterministic_hex(palette: Palette, key: &str) -> String {
    let mut rng = Mulberry32::new(string_to_seed(key));
    let saturation = (80.0 + rng.next_f64() * 20.0).floor();
    let lightness = (50.0 + rng.next_f64() * palette.lightness_range() as f64).floor();
    hsl_to_hex(palette.hue(), saturation, lightness)
}

/// Cache key: classification group plus clip type. Fillers share one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColorKey {
    pub ad_id: Option<u64>,
    pub clip_type: ClipType,
}

impl ColorKey {
    pub fn of(region: &Region) -> Self {
        ColorKey {
            ad_id: region.ad_id,
            clip_type: region.clip_type,
        }
    }
}

impl fmt::Display for ColorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.ad_id {
            Some(id) => write!(f, "{}-{}", id, self.clip_type),
            None => write!(f, "none-{}", self.clip_type),
        }
    }
}

/// Colors for one normalized region set.
#[derive(Debug, Clone, Default)]
pub struct ColorMap {
    colors: HashMap<ColorKey, String>,
}

impl ColorMap {
    /// Assign a color to every distinct key in `regions`.
    pub fn assign(regions: &[Region], mode: ColorMode) -> Self {
        let mut map = ColorMap::default();
        for region in regions {
            let key = ColorKey::of(region);
            map.colors
                .entry(key)
                .or_insert_with(|| color_for_key(key, mode));
        }
        map
    }

    pub fn get(&self, key: &ColorKey) -> Option<&str> {
        self.colors.get(key).map(String::as_str)
    }

    /// Color for a region; falls back to the empty color for unknown keys.
    pub fn color_for(&self, region: &Region) -> &str {
        self.get(&ColorKey::of(region)).unwrap_or(EMPTY_COLOR)
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

fn color_for_key(key: ColorKey, mode: ColorMode) -> String {
    match (key.clip_type, Palette::for_clip(key.clip_type)) {
        (_, Some(palette)) => match mode {
            ColorMode::Random => random_hex(palette),
            ColorMode::Deterministic => deterministic_hex(palette, &key.to_string()),
        },
        (ClipType::Speech, None) => SPEECH_COLOR.to_string(),
        (_, None) => EMPTY_COLOR.to_string(),
    }
}
