//! "Nice" step values for numeric axes
//!
//! Steps are restricted to `{1, 2, 5} × 10^n`. Walking the sequence
//! `…, 0.5, 1, 2, 5, 10, 20, …` one position at a time keeps consecutive
//! candidates within a factor of 2.5 of each other, which bounds how many
//! iterations the tick generators need.

use crate::magnitude::{scale_by_power_of_ten, Magnitude};
use crate::AxisResult;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Largest exponent a step may carry: `floor(log10(f64::MAX)) - 1`
pub const MAX_STEP_EXPONENT: i32 = 307;

/// Leading digit of a nice step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StepDigit {
    One,
    Two,
    Five,
}

impl StepDigit {
    pub fn as_f64(self) -> f64 {
        match self {
            StepDigit::One => 1.0,
            StepDigit::Two => 2.0,
            StepDigit::Five => 5.0,
        }
    }
}

/// A round tick increment: `digit × 10^exponent`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NiceStep {
    digit: StepDigit,
    exponent: i32,
}

impl NiceStep {
    /// Create a step; the exponent is clamped to `±MAX_STEP_EXPONENT`
    pub fn new(digit: StepDigit, exponent: i32) -> Self {
        Self {
            digit,
            exponent: exponent.clamp(-MAX_STEP_EXPONENT, MAX_STEP_EXPONENT),
        }
    }

    /// Snap an estimate to a nice step using the cut-points
    /// `mantissa < 2 → 1`, `< 5 → 2`, otherwise `5`. A zero estimate maps to
    /// `0.5`.
    pub fn initial(estimate: f64) -> AxisResult<Self> {
        let magnitude = Magnitude::decompose(estimate)?;
        let mantissa = magnitude.mantissa.abs();
        let step = if mantissa < 1.0 {
            Self::new(StepDigit::Five, magnitude.exponent - 1)
        } else if mantissa < 2.0 {
            Self::new(StepDigit::One, magnitude.exponent)
        } else if mantissa < 5.0 {
            Self::new(StepDigit::Two, magnitude.exponent)
        } else {
            Self::new(StepDigit::Five, magnitude.exponent)
        };
        Ok(step)
    }

    pub fn digit(&self) -> StepDigit {
        self.digit
    }

    pub fn exponent(&self) -> i32 {
        self.exponent
    }

    /// Numeric value of the step
    pub fn value(&self) -> f64 {
        scale_by_power_of_ten(self.digit.as_f64(), self.exponent)
    }

    /// Next smaller step: 5 → 2 → 1 → 0.5 of the previous decade
    pub fn shrink(self) -> Self {
        match self.digit {
            StepDigit::Five => Self::new(StepDigit::Two, self.exponent),
            StepDigit::Two => Self::new(StepDigit::One, self.exponent),
            StepDigit::One if self.exponent > -MAX_STEP_EXPONENT => {
                Self::new(StepDigit::Five, self.exponent - 1)
            }
            StepDigit::One => self,
        }
    }

    /// Next larger step: 1 → 2 → 5 → 10
    pub fn grow(self) -> Self {
        match self.digit {
            StepDigit::One => Self::new(StepDigit::Two, self.exponent),
            StepDigit::Two => Self::new(StepDigit::Five, self.exponent),
            StepDigit::Five if self.exponent < MAX_STEP_EXPONENT => {
                Self::new(StepDigit::One, self.exponent + 1)
            }
            StepDigit::Five => self,
        }
    }

    /// Number of decimals needed to print multiples of this step
    pub fn decimal_places(&self) -> usize {
        (-self.exponent).max(0) as usize
    }

    /// Format a multiple of this step with the step's decimal mask
    pub fn format(&self, value: f64) -> String {
        format_fixed(value, self.decimal_places())
    }
}

impl fmt::Display for NiceStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format(self.value()))
    }
}

/// Locale-free fixed-point formatting that never prints `-0`
pub fn format_fixed(value: f64, decimal_places: usize) -> String {
    let text = format!("{:.*}", decimal_places, value);
    if text.starts_with('-') && text[1..].chars().all(|c| c == '0' || c == '.') {
        text[1..].to_string()
    } else {
        text
    }
}
