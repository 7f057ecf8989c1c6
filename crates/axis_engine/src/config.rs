//! Axis configuration
//!
//! Settings shared by the tick generators and the zoom controller. The
//! struct round-trips through JSON so hosts can keep axis settings next to
//! their other preferences.

use crate::{AxisError, AxisResult};
use serde::{Deserialize, Serialize};

/// Tunable parameters for tick layout and zooming
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AxisConfig {
    /// Font size handed to the text measurer, in em
    pub font_size_em: f64,
    /// Horizontal padding added to every measured label, in pixels
    pub label_padding: f64,
    /// Geometric factor applied by a single zoom in or zoom out
    pub zoom_factor: f64,
    /// Absolute lower limit for the visible range
    pub min_range: f64,
    /// Relative tolerance (fraction of the range) treated as rounding noise
    pub boundary_tolerance: f64,
}

impl Default for AxisConfig {
    fn default() -> Self {
        Self {
            font_size_em: 12.0,
            label_padding: 8.0,
            zoom_factor: 2.0,
            min_range: 1e-12,
            boundary_tolerance: 1e-7,
        }
    }
}

impl AxisConfig {
    /// Create a configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> AxisResult<Self> {
        let config: AxisConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to pretty JSON
    pub fn to_json(&self) -> AxisResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check that every field is usable by the generators
    pub fn validate(&self) -> AxisResult<()> {
        let positive = [
            ("font_size_em", self.font_size_em),
            ("min_range", self.min_range),
            ("boundary_tolerance", self.boundary_tolerance),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(AxisError::Config(format!(
                    "{name} must be finite and > 0, got {value}"
                )));
            }
        }
        if !self.label_padding.is_finite() || self.label_padding < 0.0 {
            return Err(AxisError::Config(format!(
                "label_padding must be finite and >= 0, got {}",
                self.label_padding
            )));
        }
        if !self.zoom_factor.is_finite() || self.zoom_factor <= 1.0 {
            return Err(AxisError::Config(format!(
                "zoom_factor must be finite and > 1, got {}",
                self.zoom_factor
            )));
        }
        Ok(())
    }

    /// Builder-style font size override
    pub fn with_font_size(mut self, font_size_em: f64) -> Self {
        self.font_size_em = font_size_em;
        self
    }

    /// Builder-style label padding override
    pub fn with_label_padding(mut self, padding: f64) -> Self {
        self.label_padding = padding;
        self
    }

    /// Builder-style zoom factor override
    pub fn with_zoom_factor(mut self, factor: f64) -> Self {
        self.zoom_factor = factor;
        self
    }
}
