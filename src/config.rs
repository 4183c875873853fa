use serde::{Deserialize, Serialize};

use crate::error::SceneError;

/// Visual parameters of the menu backdrop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SceneConfig {
    pub star_count: usize,
    pub star_color: String,
    /// Phase advance per frame. Twinkle speed is tied to the render cadence.
    pub twinkle_speed: f64,

    pub emblem_count: usize,
    pub glyphs: Vec<String>,
    /// How far below the bottom edge an emblem falls before it is recycled
    /// to the same distance above the top.
    pub wrap_margin: f64,
    pub backing_color: String,
    pub backing_alpha: f64,
    pub glyph_color: String,
    pub glyph_alpha: f64,
    pub glyph_font: String,

    pub gradient_top: String,
    pub gradient_bottom: String,

    pub ground_ratio: f64,
    pub ground_color: String,
    pub lane_ratios: Vec<f64>,
    pub lane_color: String,
    pub line_width: f64,
    pub lane_dash: [f64; 2],
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            star_count: 120,
            star_color: "#836EF9".into(),
            twinkle_speed: 0.015,

            emblem_count: 18,
            glyphs: ["$", "€", "₹", "£"].iter().map(|g| g.to_string()).collect(),
            wrap_margin: 20.0,
            backing_color: "#836EF9".into(),
            backing_alpha: 0.45,
            glyph_color: "#ffd700".into(),
            glyph_alpha: 0.9,
            glyph_font: "bold 9px monospace".into(),

            gradient_top: "#04020e".into(),
            gradient_bottom: "#0e0b1e".into(),

            ground_ratio: 0.78,
            ground_color: "rgba(131,110,249,0.25)".into(),
            lane_ratios: vec![0.33, 0.66],
            lane_color: "rgba(57,255,20,0.2)".into(),
            line_width: 2.0,
            lane_dash: [30.0, 20.0],
        }
    }
}

impl SceneConfig {
    /// Parses a (possibly partial) JSON object; missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, SceneError> {
        let cfg: Self =
            serde_json::from_str(json).map_err(|e| SceneError::Config(e.to_string()))?;
        Ok(cfg.sanitized())
    }

    /// Replaces values that would break rendering invariants.
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if !(self.wrap_margin.is_finite() && self.wrap_margin >= 1.0) {
            log::warn!("wrap_margin {} clamped to 1", self.wrap_margin);
            self.wrap_margin = if self.wrap_margin.is_finite() {
                self.wrap_margin.max(1.0)
            } else {
                defaults.wrap_margin
            };
        }
        if self.glyphs.iter().all(|g| g.is_empty()) {
            self.glyphs = defaults.glyphs.clone();
        } else {
            self.glyphs.retain(|g| !g.is_empty());
        }
        if !(self.twinkle_speed.is_finite() && self.twinkle_speed >= 0.0) {
            self.twinkle_speed = defaults.twinkle_speed;
        }
        if !(0.0..=1.0).contains(&self.ground_ratio) {
            self.ground_ratio = defaults.ground_ratio;
        }
        self.lane_ratios.retain(|r| (0.0..=1.0).contains(r));
        if !(self.line_width.is_finite() && self.line_width > 0.0) {
            self.line_width = defaults.line_width;
        }
        self.backing_alpha = clamp_alpha(self.backing_alpha, defaults.backing_alpha);
        self.glyph_alpha = clamp_alpha(self.glyph_alpha, defaults.glyph_alpha);
        self
    }
}

fn clamp_alpha(a: f64, fallback: f64) -> f64 {
    if a.is_finite() {
        a.clamp(0.0, 1.0)
    } else {
        fallback
    }
}

/// Timing shared between the reveal engine and the overlay that hosts it.
///
/// The overlay owns its own dismissal countdown; it reads `countdown_ms`
/// from here and drives its progress bar with `countdown_animation`, so both
/// sides are configured from a single value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RevealPacing {
    pub cadence_ms: u32,
    pub countdown_ms: u32,
    /// Delay before the overlay appears, letting the hit effect play first.
    pub entry_delay_ms: u32,
}

impl Default for RevealPacing {
    fn default() -> Self {
        Self {
            cadence_ms: 22,
            countdown_ms: 9_000,
            entry_delay_ms: 320,
        }
    }
}

impl RevealPacing {
    pub fn from_json(json: &str) -> Result<Self, SceneError> {
        serde_json::from_str(json).map_err(|e| SceneError::Config(e.to_string()))
    }

    /// CSS `animation` shorthand for the countdown bar.
    pub fn countdown_animation(&self) -> String {
        format!("dq-countdown {} linear forwards", css_duration(self.countdown_ms))
    }

    /// Upper bound on how long a text of `chars` characters takes to reveal.
    pub fn reveal_duration_ms(&self, chars: usize) -> u64 {
        self.cadence_ms.max(1) as u64 * chars as u64
    }

    /// Whether a text of `chars` characters finishes before the countdown.
    pub fn fits_countdown(&self, chars: usize) -> bool {
        self.reveal_duration_ms(chars) <= self.countdown_ms as u64
    }
}

fn css_duration(ms: u32) -> String {
    if ms % 1000 == 0 {
        format!("{}s", ms / 1000)
    } else {
        format!("{ms}ms")
    }
}
