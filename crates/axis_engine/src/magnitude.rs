//! Base-10 decomposition of real numbers

use crate::error::ensure_finite;
use crate::AxisResult;
use serde::{Deserialize, Serialize};

/// Exponents below this are scaled in two stages to stay clear of subnormals
const SUBNORMAL_EXPONENT: i32 = -300;

/// A number split into a mantissa with `|mantissa|` in `[1, 10)` and a
/// power-of-ten exponent. Zero is `{ mantissa: 0, exponent: 0 }`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Magnitude {
    pub mantissa: f64,
    pub exponent: i32,
}

impl Magnitude {
    /// Decompose a finite number. NaN and infinities are domain errors.
    pub fn decompose(x: f64) -> AxisResult<Self> {
        let x = ensure_finite("magnitude input", x)?;
        if x == 0.0 {
            return Ok(Self {
                mantissa: 0.0,
                exponent: 0,
            });
        }

        let abs = x.abs();
        let mut exponent = abs.log10().floor() as i32;
        let mut mantissa = scale_by_power_of_ten(abs, -exponent);

        // log10 can land one decade off near exact powers of ten
        while mantissa >= 10.0 {
            mantissa /= 10.0;
            exponent += 1;
        }
        while mantissa < 1.0 {
            mantissa *= 10.0;
            exponent -= 1;
        }

        Ok(Self {
            mantissa: mantissa.copysign(x),
            exponent,
        })
    }

    /// Reconstruct `mantissa * 10^exponent`
    pub fn value(&self) -> f64 {
        scale_by_power_of_ten(self.mantissa, self.exponent)
    }
}

/// `x * 10^power` without overflowing the intermediate power of ten.
pub(crate) fn scale_by_power_of_ten(x: f64, power: i32) -> f64 {
    if power < SUBNORMAL_EXPONENT {
        x * 10f64.powi(SUBNORMAL_EXPONENT) * 10f64.powi(power - SUBNORMAL_EXPONENT)
    } else if power > -SUBNORMAL_EXPONENT {
        x * 10f64.powi(-SUBNORMAL_EXPONENT) * 10f64.powi(power + SUBNORMAL_EXPONENT)
    } else if power < 0 {
        // Dividing by an exact power of ten keeps 0.1-style inputs exact
        x / 10f64.powi(-power)
    } else {
        x * 10f64.powi(power)
    }
}
