use std::path::Path;

use anyhow::Context;

use crate::foundation::{
    core::Point,
    error::{InsigniaError, InsigniaResult},
};

/// Soft black drop shadow behind a layer.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ShadowSpec {
    /// Horizontal offset in pixels.
    pub offset_x: f64,
    /// Vertical offset in pixels.
    pub offset_y: f64,
    /// Blur extent in pixels; Gaussian sigma is half of it.
    pub blur: f64,
    /// Shadow alpha multiplier in `[0, 1]`.
    pub opacity: f32,
}

impl ShadowSpec {
    /// Whether drawing this shadow would leave the surface unchanged.
    pub fn is_noop(&self) -> bool {
        self.opacity <= 0.0
    }
}

/// Compositor constants. Every field has a default; a JSON file may set any subset.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Ribbons per rack row.
    pub row_capacity: usize,
    /// Awards considered for the rack, highest priority first.
    pub max_awards: usize,
    /// Uniform scale applied to the rack surface.
    pub rack_scale: f64,
    /// Rack rotation in degrees (negative is counter-clockwise on screen).
    pub rack_rotation_deg: f64,
    /// Vertical rack shear in degrees.
    pub rack_skew_deg: f64,
    /// Where the rack center lands for 1, 2, 3 and 4-or-more awards.
    pub rack_anchors: [[f64; 2]; 4],
    /// Inward shrink applied to every award hit-region.
    pub hit_margin_px: f64,
    pub background_shadow: ShadowSpec,
    pub rack_shadow: ShadowSpec,
    /// Distance between a region's bottom edge and the tooltip panel.
    pub tooltip_gap_px: f64,
    /// Draw hit-region outlines onto the surface.
    pub debug: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            row_capacity: 4,
            max_awards: 8,
            rack_scale: 0.29,
            rack_rotation_deg: -3.0,
            rack_skew_deg: -3.0,
            rack_anchors: [
                [620.0, 372.0],
                [616.0, 374.0],
                [612.0, 376.0],
                [608.0, 378.0],
            ],
            hit_margin_px: 4.0,
            background_shadow: ShadowSpec {
                offset_x: 1.0,
                offset_y: 1.0,
                blur: 10.0,
                opacity: 0.4,
            },
            rack_shadow: ShadowSpec {
                offset_x: 1.0,
                offset_y: 1.0,
                blur: 3.0,
                opacity: 0.5,
            },
            tooltip_gap_px: 8.0,
            debug: false,
        }
    }
}

impl RenderConfig {
    /// Parse and validate a JSON config.
    pub fn from_json_str(json: &str) -> InsigniaResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| InsigniaError::serde(format!("parse render config JSON: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> InsigniaResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read render config '{}'", path.display()))?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> InsigniaResult<()> {
        if self.row_capacity == 0 {
            return Err(InsigniaError::validation("row_capacity must be > 0"));
        }
        if !(self.rack_scale.is_finite() && self.rack_scale > 0.0) {
            return Err(InsigniaError::validation("rack_scale must be finite and > 0"));
        }
        for (name, v) in [
            ("rack_rotation_deg", self.rack_rotation_deg),
            ("rack_skew_deg", self.rack_skew_deg),
            ("hit_margin_px", self.hit_margin_px),
            ("tooltip_gap_px", self.tooltip_gap_px),
        ] {
            if !v.is_finite() {
                return Err(InsigniaError::validation(format!("{name} must be finite")));
            }
        }
        if self.rack_skew_deg.abs() >= 90.0 {
            return Err(InsigniaError::validation("rack_skew_deg must be within (-90, 90)"));
        }
        for shadow in [&self.background_shadow, &self.rack_shadow] {
            if !(shadow.blur.is_finite() && shadow.blur >= 0.0) {
                return Err(InsigniaError::validation("shadow blur must be finite and >= 0"));
            }
            if !(shadow.offset_x.is_finite() && shadow.offset_y.is_finite()) {
                return Err(InsigniaError::validation("shadow offset must be finite"));
            }
        }
        Ok(())
    }

    /// Rack anchor for `award_count` drawn ribbons.
    pub fn anchor_for(&self, award_count: usize) -> Point {
        let idx = award_count.clamp(1, 4) - 1;
        let [x, y] = self.rack_anchors[idx];
        Point::new(x, y)
    }

    /// Debug is on when either the config or the runtime flag asks for it.
    pub fn effective_debug(&self, runtime_debug: bool) -> bool {
        self.debug || runtime_debug
    }
}

/// Interpret a runtime debug flag value such as `INSIGNIA_DEBUG`.
pub fn parse_debug_flag(value: Option<&str>) -> bool {
    matches!(
        value.map(|v| v.trim().to_ascii_lowercase()).as_deref(),
        Some("1" | "true" | "yes" | "on")
    )
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
