//! Affine mapping between axis values and pixel offsets

use crate::error::ensure_finite;
use crate::{AxisError, AxisResult};

/// Maps values in `[origin, origin + range]` onto pixels in `[0, extent]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateMapper {
    origin: f64,
    range: f64,
    extent: f64,
}

impl CoordinateMapper {
    pub fn new(origin: f64, range: f64, extent: f64) -> AxisResult<Self> {
        ensure_finite("value", origin)?;
        ensure_finite("range", range)?;
        ensure_finite("pixel extent", extent)?;
        if range <= 0.0 {
            return Err(AxisError::domain(format!("range must be > 0, got {range}")));
        }
        if extent < 0.0 {
            return Err(AxisError::domain(format!(
                "pixel extent must be >= 0, got {extent}"
            )));
        }
        Ok(Self {
            origin,
            range,
            extent,
        })
    }

    pub fn extent(&self) -> f64 {
        self.extent
    }

    /// Pixels covered by one unit of value
    pub fn pixels_per_unit(&self) -> f64 {
        self.extent / self.range
    }

    pub fn to_pixel(&self, value: f64) -> f64 {
        (value - self.origin) * self.pixels_per_unit()
    }

    pub fn to_value(&self, pixel: f64) -> f64 {
        if self.extent == 0.0 {
            return self.origin;
        }
        self.origin + pixel * self.range / self.extent
    }

    /// Map a value and pull results that miss `[0, extent]` by less than
    /// `tolerance` pixels back onto the edge
    pub fn to_pixel_clamped(&self, value: f64, tolerance: f64) -> f64 {
        let pixel = self.to_pixel(value);
        if pixel < 0.0 && pixel > -tolerance {
            0.0
        } else if pixel > self.extent && pixel < self.extent + tolerance {
            self.extent
        } else {
            pixel
        }
    }
}
