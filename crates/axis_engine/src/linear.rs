//! Tick generation for continuous numeric axes
//!
//! The generator starts from a nice step close to the visible range and
//! shrinks it while the widest label still fits between two ticks. The last
//! step that fit wins; if even the first candidate does not fit it is used
//! anyway, since one crowded label beats none.

use crate::mapper::CoordinateMapper;
use crate::measure::{padded_width, TextMeasurer};
use crate::nice_step::{format_fixed, NiceStep};
use crate::tick::{LinearTicks, Tick};
use crate::viewport::Viewport;
use crate::{AxisConfig, AxisResult};

/// Ticks closer than this are never produced, whatever the label widths
const MIN_TICK_SPACING_PX: f64 = 1.0;

/// Decimal digits kept when rounding step quotients
const QUOTIENT_DIGITS: i32 = 6;

/// Result of the step search
#[derive(Debug, Clone, Copy, PartialEq)]
struct StepFit {
    step: NiceStep,
    /// Padded width of the longest label at this step's precision
    label_width: f64,
}

/// Generator for numeric axis ticks
pub struct LinearTickGenerator<'a> {
    measurer: &'a dyn TextMeasurer,
    config: &'a AxisConfig,
}

impl<'a> LinearTickGenerator<'a> {
    pub fn new(measurer: &'a dyn TextMeasurer, config: &'a AxisConfig) -> Self {
        Self { measurer, config }
    }

    /// Compute ticks for `viewport` drawn across `extent` pixels
    pub fn generate(&self, viewport: &Viewport, extent: f64) -> AxisResult<LinearTicks> {
        let value = viewport.value();
        let range = viewport.range();
        let mapper = CoordinateMapper::new(value, range, extent)?;

        let fit = self.select_step(viewport, &mapper)?;
        let step = fit.step;

        let label_count = if fit.label_width > 0.0 {
            (extent / fit.label_width).floor()
        } else {
            f64::INFINITY
        };
        if label_count <= 1.0 {
            tracing::warn!(
                target: "axis_engine::linear",
                extent,
                label_width = fit.label_width,
                "not enough room for rounded labels, emitting a single tick"
            );
            return Ok(LinearTicks {
                ticks: vec![Tick::new(value, 0.0, value.to_string())],
                step,
                decimal_places: step.decimal_places(),
                degenerate: true,
            });
        }

        let (first, last, count) = self.tick_span(value, range, step.value());
        let tolerance = self.config.boundary_tolerance * extent.max(1.0);
        let ticks: Vec<Tick> = (0..count)
            .map(|i| {
                let tick_value = if i + 1 == count {
                    last
                } else {
                    first + i as f64 * step.value()
                };
                Tick::new(
                    tick_value,
                    mapper.to_pixel_clamped(tick_value, tolerance),
                    step.format(tick_value),
                )
            })
            .collect();

        tracing::debug!(
            target: "axis_engine::linear",
            step = step.value(),
            first,
            last,
            count,
            "linear ticks computed"
        );

        Ok(LinearTicks {
            ticks,
            step,
            decimal_places: step.decimal_places(),
            degenerate: false,
        })
    }

    /// Walk the nice-step sequence downward while the widest label fits
    fn select_step(&self, viewport: &Viewport, mapper: &CoordinateMapper) -> AxisResult<StepFit> {
        let mut step = NiceStep::initial(viewport.range())?;
        let first_candidate = StepFit {
            step,
            label_width: self.label_width(viewport, step),
        };
        let mut best: Option<StepFit> = None;

        loop {
            let label_width = self.label_width(viewport, step);
            let available = step.value() * mapper.pixels_per_unit();
            let fits = label_width <= available && available >= MIN_TICK_SPACING_PX;

            tracing::trace!(
                target: "axis_engine::linear",
                step = step.value(),
                label_width,
                available,
                fits,
                "trying step"
            );

            if !fits {
                break;
            }
            best = Some(StepFit { step, label_width });
            let finer = step.shrink();
            if finer == step {
                break;
            }
            step = finer;
        }

        Ok(best.unwrap_or(first_candidate))
    }

    /// Padded width of the textually longest extreme at `step`'s precision
    fn label_width(&self, viewport: &Viewport, step: NiceStep) -> f64 {
        let label = longest_label(viewport, step);
        padded_width(
            self.measurer,
            &label,
            self.config.font_size_em,
            self.config.label_padding,
        )
    }

    /// First tick, last tick and tick count for a window and step
    fn tick_span(&self, value: f64, range: f64, step: f64) -> (f64, f64, usize) {
        let tolerance = self.config.boundary_tolerance;
        let max = value + range;

        let mut first = round_decimals(value / step, QUOTIENT_DIGITS).ceil() * step;
        if first < value {
            if (value - first) / range < tolerance {
                first = value;
            } else {
                first += step;
            }
        }

        let mut last = round_decimals(max / step, QUOTIENT_DIGITS).floor() * step;
        if last > max {
            if (last - max) / range < tolerance {
                last = max;
            } else {
                last -= step;
            }
        }

        let intervals = round_decimals((last - first) / step, QUOTIENT_DIGITS).round();
        let count = if intervals < 0.0 {
            0
        } else {
            intervals as usize + 1
        };
        (first, last, count)
    }
}

/// Compute ticks with a one-off generator
pub fn linear_ticks(
    viewport: &Viewport,
    extent: f64,
    measurer: &dyn TextMeasurer,
    config: &AxisConfig,
) -> AxisResult<LinearTicks> {
    LinearTickGenerator::new(measurer, config).generate(viewport, extent)
}

/// Formatted label of whichever extreme prints longer
fn longest_label(viewport: &Viewport, step: NiceStep) -> String {
    let (lo, hi) = viewport.extremes();
    let decimals = step.decimal_places();
    let lo_label = format_fixed(lo, decimals);
    let hi_label = format_fixed(hi, decimals);
    if lo_label.chars().count() > hi_label.chars().count() {
        lo_label
    } else {
        hi_label
    }
}

/// Round to `digits` decimals; magnitudes without a fractional part pass through
fn round_decimals(x: f64, digits: i32) -> f64 {
    if !(x.abs() < 1e15) {
        return x;
    }
    let factor = 10f64.powi(digits);
    (x * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nice_step::StepDigit;
    use proptest::prelude::*;

    /// Every label is 140px wide; with the default 10px padding a label
    /// needs 150px between ticks
    fn wide_labels(_: &str, _: f64) -> f64 {
        140.0
    }

    fn config() -> AxisConfig {
        AxisConfig::default().with_label_padding(10.0)
    }

    fn generate(value: f64, range: f64, extent: f64) -> LinearTicks {
        let viewport = Viewport::new(value, range).unwrap();
        let config = config();
        linear_ticks(&viewport, extent, &wide_labels, &config).unwrap()
    }

    #[test]
    fn test_range_50_picks_step_20() {
        let ticks = generate(0.0, 50.0, 400.0);
        assert_eq!(ticks.step, NiceStep::new(StepDigit::Two, 1));
        assert_eq!(ticks.values(), vec![0.0, 20.0, 40.0]);
        assert_eq!(ticks.labels(), vec![Some("0"), Some("20"), Some("40")]);
        assert_eq!(ticks.ticks[1].pixel_offset, 160.0);
    }

    #[test]
    fn test_range_30_keeps_step_20() {
        let ticks = generate(0.0, 30.0, 400.0);
        assert_eq!(ticks.step.value(), 20.0);
        assert_eq!(ticks.values(), vec![0.0, 20.0]);
    }

    #[test]
    fn test_range_99_picks_step_50() {
        let ticks = generate(0.0, 99.0, 400.0);
        assert_eq!(ticks.step.value(), 50.0);
        assert_eq!(ticks.values(), vec![0.0, 50.0]);
    }

    #[test]
    fn test_narrow_extent_falls_back_to_single_tick() {
        let ticks = generate(0.3, 50.0, 200.0);
        assert!(ticks.degenerate);
        assert_eq!(ticks.len(), 1);
        assert_eq!(ticks.ticks[0].value, 0.3);
        assert_eq!(ticks.ticks[0].label.as_deref(), Some("0.3"));
        assert_eq!(ticks.ticks[0].pixel_offset, 0.0);
    }

    #[test]
    fn test_decimal_mask() {
        let measurer = |text: &str, _: f64| text.len() as f64 * 7.0;
        let viewport = Viewport::new(0.0, 1.0).unwrap();
        let ticks = linear_ticks(&viewport, 500.0, &measurer, &AxisConfig::default()).unwrap();
        assert!(ticks.decimal_places >= 1);
        for tick in &ticks.ticks {
            let label = tick.label.as_deref().unwrap();
            assert_eq!(label.split('.').nth(1).map(str::len), Some(ticks.decimal_places));
        }
    }

    #[test]
    fn test_floating_noise_snaps_to_window_edge() {
        // 0.3 / 0.1 is 2.9999999999999996 in binary floating point
        let measurer = |_: &str, _: f64| 10.0;
        let config = AxisConfig::default().with_label_padding(0.0);
        let viewport = Viewport::new(0.3, 0.7).unwrap();
        let ticks = linear_ticks(&viewport, 100.0, &measurer, &config).unwrap();
        assert_eq!(ticks.step.value(), 0.1);
        assert!((ticks.ticks[0].value - 0.3).abs() < 1e-12);
        assert_eq!(ticks.ticks[0].label.as_deref(), Some("0.3"));
        assert!((ticks.ticks.last().unwrap().value - 1.0).abs() < 1e-12);
        assert_eq!(ticks.len(), 8);
    }

    #[test]
    fn test_bounds_size_the_labels() {
        let measurer = |text: &str, _: f64| text.len() as f64 * 10.0;
        let config = AxisConfig::default().with_label_padding(0.0);
        let unbounded = Viewport::new(0.0, 100.0).unwrap();
        let bounded = Viewport::with_bounds(0.0, 100.0, -100_000.0, 100_000.0).unwrap();
        let a = linear_ticks(&unbounded, 400.0, &measurer, &config).unwrap();
        let b = linear_ticks(&bounded, 400.0, &measurer, &config).unwrap();
        assert!(b.step.value() > a.step.value());
    }

    #[test]
    fn test_rejects_bad_extent() {
        let viewport = Viewport::new(0.0, 10.0).unwrap();
        let config = config();
        assert!(linear_ticks(&viewport, f64::NAN, &wide_labels, &config).is_err());
        assert!(linear_ticks(&viewport, -1.0, &wide_labels, &config).is_err());
    }

    #[test]
    fn test_zero_extent_is_degenerate() {
        let ticks = generate(5.0, 10.0, 0.0);
        assert!(ticks.degenerate);
        assert_eq!(ticks.len(), 1);
    }

    #[test]
    fn test_negative_window() {
        let ticks = generate(-50.0, 50.0, 400.0);
        assert_eq!(ticks.values(), vec![-40.0, -20.0, 0.0]);
        assert_eq!(ticks.labels(), vec![Some("-40"), Some("-20"), Some("0")]);
    }

    #[test]
    fn test_round_decimals() {
        assert_eq!(round_decimals(2.9999999999999996, 6), 3.0);
        assert_eq!(round_decimals(1e300, 6), 1e300);
        assert!(round_decimals(f64::NAN, 6).is_nan());
    }

    proptest! {
        #[test]
        fn prop_ticks_are_ordered_and_cover_window(
            value in -1e6f64..1e6,
            range in 1e-3f64..1e6,
            extent in 50.0f64..2000.0,
        ) {
            let measurer = |text: &str, _: f64| text.len() as f64 * 6.0;
            let config = AxisConfig::default();
            let viewport = Viewport::new(value, range).unwrap();
            let ticks = linear_ticks(&viewport, extent, &measurer, &config).unwrap();
            prop_assert!(!ticks.is_empty());

            for pair in ticks.ticks.windows(2) {
                prop_assert!(pair[1].value > pair[0].value);
                prop_assert!(pair[1].pixel_offset >= pair[0].pixel_offset);
            }

            if ticks.len() > 1 {
                let step = ticks.step.value();
                let tol = range * 1e-6;
                let first = ticks.ticks[0].value;
                let last = ticks.ticks[ticks.len() - 1].value;
                prop_assert!(first >= value - tol && first <= value + step + tol);
                prop_assert!(last <= value + range + tol && last >= value + range - step - tol);
                for tick in &ticks.ticks {
                    prop_assert!(tick.pixel_offset >= 0.0 && tick.pixel_offset <= extent);
                }
            }
        }

        #[test]
        fn prop_generation_is_idempotent(
            value in -1e3f64..1e3,
            range in 1e-2f64..1e4,
            extent in 10.0f64..1500.0,
        ) {
            let measurer = |text: &str, em: f64| text.len() as f64 * em * 0.5;
            let config = AxisConfig::default();
            let viewport = Viewport::new(value, range).unwrap();
            let a = linear_ticks(&viewport, extent, &measurer, &config).unwrap();
            let b = linear_ticks(&viewport, extent, &measurer, &config).unwrap();
            prop_assert_eq!(a, b);
        }
    }
}
