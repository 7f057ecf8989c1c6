//! Tick data handed to the rendering collaborator

use crate::calendar::CalendarUnit;
use crate::nice_step::NiceStep;
use serde::{Deserialize, Serialize};

/// One axis mark
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    pub value: f64,
    pub pixel_offset: f64,
    /// `None` when the label was suppressed; the tick still occupies its slot
    pub label: Option<String>,
}

impl Tick {
    pub fn new(value: f64, pixel_offset: f64, label: impl Into<String>) -> Self {
        Self {
            value,
            pixel_offset,
            label: Some(label.into()),
        }
    }

    pub fn unlabeled(value: f64, pixel_offset: f64) -> Self {
        Self {
            value,
            pixel_offset,
            label: None,
        }
    }

    pub fn has_label(&self) -> bool {
        self.label.is_some()
    }
}

/// Ticks for a continuous numeric axis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearTicks {
    pub ticks: Vec<Tick>,
    /// Step the ticks are spaced by
    pub step: NiceStep,
    /// Decimals used by every label
    pub decimal_places: usize,
    /// True when only a single unrounded tick could be shown
    pub degenerate: bool,
}

impl LinearTicks {
    pub fn len(&self) -> usize {
        self.ticks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ticks.is_empty()
    }

    pub fn values(&self) -> Vec<f64> {
        self.ticks.iter().map(|t| t.value).collect()
    }

    pub fn labels(&self) -> Vec<Option<&str>> {
        self.ticks.iter().map(|t| t.label.as_deref()).collect()
    }
}

/// Ticks for a date/time axis. Values are seconds since the Unix epoch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarTicks {
    pub ticks: Vec<Tick>,
    pub unit: CalendarUnit,
    /// True when no unit fit and a single best-effort tick was kept
    pub degenerate: bool,
}

impl CalendarTicks {
    pub fn len(&self) -> usize {
        self.ticks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ticks.is_empty()
    }

    pub fn values(&self) -> Vec<f64> {
        self.ticks.iter().map(|t| t.value).collect()
    }

    pub fn labels(&self) -> Vec<Option<&str>> {
        self.ticks.iter().map(|t| t.label.as_deref()).collect()
    }
}
