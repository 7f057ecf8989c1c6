//! The displayed value window and its optional domain bounds
//!
//! Bounds describe everything the axis has ever been asked to show. They are
//! widened to contain the window whenever either changes and are never used
//! to clip a window a caller set explicitly.

use crate::error::ensure_finite;
use crate::{AxisError, AxisResult};
use serde::{Deserialize, Serialize};

/// Domain bounds, always defined as a pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

impl Bounds {
    pub fn new(min: f64, max: f64) -> AxisResult<Self> {
        ensure_finite("min bound", min)?;
        ensure_finite("max bound", max)?;
        if min > max {
            return Err(AxisError::InvalidBounds(format!(
                "min bound {min} is greater than max bound {max}"
            )));
        }
        Ok(Self { min, max })
    }

    /// Build from a possibly half-defined pair
    pub fn from_options(min: Option<f64>, max: Option<f64>) -> AxisResult<Option<Self>> {
        match (min, max) {
            (Some(min), Some(max)) => Self::new(min, max).map(Some),
            (None, None) => Ok(None),
            (Some(_), None) => Err(AxisError::InvalidBounds(
                "min bound is defined without a max bound".to_string(),
            )),
            (None, Some(_)) => Err(AxisError::InvalidBounds(
                "max bound is defined without a min bound".to_string(),
            )),
        }
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    fn widened_to(self, lo: f64, hi: f64) -> Self {
        Self {
            min: self.min.min(lo),
            max: self.max.max(hi),
        }
    }
}

/// Visible window `[value, value + range]` with optional domain bounds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    value: f64,
    range: f64,
    bounds: Option<Bounds>,
}

impl Viewport {
    /// Create an unbounded viewport. A zero range is replaced by a small
    /// symmetric window around `value`.
    pub fn new(value: f64, range: f64) -> AxisResult<Self> {
        let (value, range) = validate_window(value, range)?;
        Ok(Self {
            value,
            range,
            bounds: None,
        })
    }

    /// Create a viewport with domain bounds; bounds that do not contain the
    /// window are widened.
    pub fn with_bounds(value: f64, range: f64, min: f64, max: f64) -> AxisResult<Self> {
        let mut viewport = Self::new(value, range)?;
        viewport.set_bounds(min, max)?;
        Ok(viewport)
    }

    /// Create a viewport from bounds that may be missing
    pub fn from_parts(
        value: f64,
        range: f64,
        min: Option<f64>,
        max: Option<f64>,
    ) -> AxisResult<Self> {
        let mut viewport = Self::new(value, range)?;
        if let Some(bounds) = Bounds::from_options(min, max)? {
            viewport.bounds = Some(bounds.widened_to(viewport.value, viewport.end()));
        }
        Ok(viewport)
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn range(&self) -> f64 {
        self.range
    }

    /// Upper edge of the window
    pub fn end(&self) -> f64 {
        self.value + self.range
    }

    pub fn bounds(&self) -> Option<Bounds> {
        self.bounds
    }

    pub fn min_bound(&self) -> Option<f64> {
        self.bounds.map(|b| b.min)
    }

    pub fn max_bound(&self) -> Option<f64> {
        self.bounds.map(|b| b.max)
    }

    /// The values labels must be sized against: the bounds when defined,
    /// otherwise the window edges
    pub fn extremes(&self) -> (f64, f64) {
        match self.bounds {
            Some(bounds) => (bounds.min, bounds.max),
            None => (self.value, self.end()),
        }
    }

    /// Replace the window, widening bounds to contain it
    pub fn set_window(&mut self, value: f64, range: f64) -> AxisResult<()> {
        let (value, range) = validate_window(value, range)?;
        self.value = value;
        self.range = range;
        self.bounds = self.bounds.map(|b| b.widened_to(value, value + range));
        Ok(())
    }

    /// Replace the bounds; a bound that would exclude the window is moved
    /// outward just enough to contain it
    pub fn set_bounds(&mut self, min: f64, max: f64) -> AxisResult<()> {
        let bounds = Bounds::new(min, max)?;
        self.bounds = Some(bounds.widened_to(self.value, self.end()));
        Ok(())
    }

    /// Assign bounds that may be missing; a half-defined pair is rejected
    pub fn set_bounds_opt(&mut self, min: Option<f64>, max: Option<f64>) -> AxisResult<()> {
        match Bounds::from_options(min, max)? {
            Some(bounds) => self.set_bounds(bounds.min, bounds.max),
            None => {
                self.bounds = None;
                Ok(())
            }
        }
    }

    pub fn clear_bounds(&mut self) {
        self.bounds = None;
    }

    /// Widen the bounds to include an observed data value. An unbounded
    /// viewport gains bounds covering the window and the value.
    pub fn observe(&mut self, value: f64) -> AxisResult<()> {
        ensure_finite("observed value", value)?;
        let current = self.bounds.unwrap_or(Bounds {
            min: self.value,
            max: self.end(),
        });
        self.bounds = Some(current.widened_to(value, value));
        Ok(())
    }
}

/// Whether anything a layout depends on differs between two snapshots
pub fn viewport_changed(previous: Option<&Viewport>, current: &Viewport) -> bool {
    previous != Some(current)
}

/// Half-width of the window substituted for a zero range
fn default_half_width(value: f64) -> f64 {
    if value == 0.0 {
        1.0
    } else {
        value.abs() * 0.1
    }
}

fn validate_window(value: f64, range: f64) -> AxisResult<(f64, f64)> {
    ensure_finite("value", value)?;
    ensure_finite("range", range)?;
    if range < 0.0 {
        return Err(AxisError::domain(format!("range must be >= 0, got {range}")));
    }
    let (value, range) = if range == 0.0 {
        let mut half = default_half_width(value);
        // |value| * 0.1 underflows for subnormal values
        if value - half == value || value + half == value {
            half = 1.0;
        }
        (value - half, half * 2.0)
    } else {
        (value, range)
    };
    if !(value + range).is_finite() {
        return Err(AxisError::domain(format!(
            "window end {value} + {range} overflows"
        )));
    }
    if value + range <= value {
        return Err(AxisError::domain(format!(
            "range {range} is below the resolution of value {value}"
        )));
    }
    Ok((value, range))
}
