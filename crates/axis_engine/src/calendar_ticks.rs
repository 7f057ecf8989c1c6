//! Calendar-aligned tick placement for date/time axes
//!
//! Dates are naive UTC date-times. A date/time axis stores its window once,
//! as a numeric viewport in seconds since the Unix epoch; [`DateWindow`] is
//! the date view of that viewport and is computed on demand.

use crate::calendar::{CalendarAdvance, CalendarUnit};
use crate::mapper::CoordinateMapper;
use crate::measure::TextMeasurer;
use crate::tick::Tick;
use crate::viewport::Viewport;
use crate::{AxisConfig, AxisError, AxisResult};
use chrono::{DateTime, Datelike, Months, NaiveDate, NaiveDateTime, TimeDelta, Timelike};
use serde::{Deserialize, Serialize};

const MICROS_PER_SECOND: i64 = 1_000_000;

/// Weeks start on Monday; 1970-01-05 was the first Monday after the epoch
const WEEK_ANCHOR_MICROS: i64 = 4 * 86_400 * MICROS_PER_SECOND;

/// Seconds since the Unix epoch, with microsecond resolution
pub fn to_epoch_seconds(date: NaiveDateTime) -> f64 {
    date.and_utc().timestamp_micros() as f64 / MICROS_PER_SECOND as f64
}

/// Date for a number of seconds since the Unix epoch, rounded to the
/// nearest microsecond
pub fn from_epoch_seconds(seconds: f64) -> AxisResult<NaiveDateTime> {
    let micros = (seconds * MICROS_PER_SECOND as f64).round();
    if !micros.is_finite() || micros.abs() >= i64::MAX as f64 {
        return Err(AxisError::Calendar(format!(
            "{seconds} seconds since the epoch is not a representable date"
        )));
    }
    date_from_micros(micros as i64).ok_or_else(|| {
        AxisError::Calendar(format!(
            "{seconds} seconds since the epoch is not a representable date"
        ))
    })
}

fn date_from_micros(micros: i64) -> Option<NaiveDateTime> {
    let seconds = micros.div_euclid(MICROS_PER_SECOND);
    let nanos = micros.rem_euclid(MICROS_PER_SECOND) * 1_000;
    DateTime::from_timestamp(seconds, u32::try_from(nanos).ok()?).map(|date| date.naive_utc())
}

fn micros_of(date: NaiveDateTime) -> i64 {
    date.and_utc().timestamp_micros()
}

/// Visible date range `[start, end]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl DateWindow {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> AxisResult<Self> {
        if end <= start {
            return Err(AxisError::domain(format!(
                "date window must end after it starts ({start} .. {end})"
            )));
        }
        Ok(Self { start, end })
    }

    /// Date view of a numeric viewport measured in epoch seconds
    pub fn from_viewport(viewport: &Viewport) -> AxisResult<Self> {
        let start = from_epoch_seconds(viewport.value())?;
        let end = from_epoch_seconds(viewport.end())?;
        Self::new(start, end)
    }

    /// Numeric viewport in epoch seconds
    pub fn to_viewport(&self) -> AxisResult<Viewport> {
        let start = to_epoch_seconds(self.start);
        Viewport::new(start, to_epoch_seconds(self.end) - start)
    }

    pub fn span_seconds(&self) -> f64 {
        to_epoch_seconds(self.end) - to_epoch_seconds(self.start)
    }
}

/// Where the ticks of a unit fall inside a window, without building them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickPlan {
    pub unit: CalendarUnit,
    pub first: NaiveDateTime,
    pub count: usize,
}

impl TickPlan {
    /// Compute the aligned first tick and the tick count for `unit`
    pub fn new(unit: CalendarUnit, window: &DateWindow) -> AxisResult<Self> {
        let first = first_tick(unit, window.start)?;
        let count = tick_count(unit, first, window.end);
        Ok(Self { unit, first, count })
    }

    /// Date of the `n`th tick
    pub fn nth(&self, n: usize) -> AxisResult<NaiveDateTime> {
        nth_tick(self.unit, self.first, n)
    }

    pub fn dates(&self) -> AxisResult<Vec<NaiveDateTime>> {
        (0..self.count).map(|n| self.nth(n)).collect()
    }
}

fn is_midnight(date: NaiveDateTime) -> bool {
    date.time().num_seconds_from_midnight() == 0 && date.time().nanosecond() == 0
}

fn jan_first(year: i32) -> AxisResult<NaiveDateTime> {
    NaiveDate::from_ymd_opt(year, 1, 1)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .ok_or_else(|| AxisError::Calendar(format!("year {year} is out of range")))
}

/// First tick at or after `start` for `unit`
pub fn first_tick(unit: CalendarUnit, start: NaiveDateTime) -> AxisResult<NaiveDateTime> {
    match unit.advance() {
        CalendarAdvance::Years(k) => {
            let mut year = start.year();
            if !(start.month() == 1 && start.day() == 1 && is_midnight(start)) {
                year += 1;
            }
            let remainder = year.rem_euclid(k);
            if remainder != 0 {
                year += k - remainder;
            }
            jan_first(year)
        }
        CalendarAdvance::Months(_) => {
            if start.day() == 1 && is_midnight(start) {
                return Ok(start);
            }
            NaiveDate::from_ymd_opt(start.year(), start.month(), 1)
                .and_then(|date| date.checked_add_months(Months::new(1)))
                .and_then(|date| date.and_hms_opt(0, 0, 0))
                .ok_or_else(|| AxisError::Calendar(format!("no month follows {start}")))
        }
        CalendarAdvance::Fixed(seconds) => {
            let unit_micros = seconds * MICROS_PER_SECOND;
            let anchor = if unit == CalendarUnit::Week {
                WEEK_ANCHOR_MICROS
            } else {
                0
            };
            let offset = micros_of(start) - anchor;
            let mut aligned = offset.div_euclid(unit_micros) * unit_micros;
            if aligned < offset {
                aligned += unit_micros;
            }
            date_from_micros(aligned + anchor)
                .ok_or_else(|| AxisError::Calendar(format!("no {unit} tick follows {start}")))
        }
    }
}

/// Number of ticks from `first` up to and including `end`
pub fn tick_count(unit: CalendarUnit, first: NaiveDateTime, end: NaiveDateTime) -> usize {
    if first > end {
        return 0;
    }
    let intervals = match unit.advance() {
        CalendarAdvance::Years(k) => i64::from((end.year() - first.year()).div_euclid(k)),
        CalendarAdvance::Months(m) => {
            let months =
                |date: NaiveDateTime| i64::from(date.year()) * 12 + i64::from(date.month0());
            (months(end) - months(first)).div_euclid(i64::from(m))
        }
        CalendarAdvance::Fixed(seconds) => {
            (micros_of(end) - micros_of(first)) / (seconds * MICROS_PER_SECOND)
        }
    };
    usize::try_from(intervals).map_or(0, |n| n.saturating_add(1))
}

/// The `n`th tick after `first`, advanced by calendar-correct increments
pub fn nth_tick(unit: CalendarUnit, first: NaiveDateTime, n: usize) -> AxisResult<NaiveDateTime> {
    let out_of_range =
        || AxisError::Calendar(format!("tick {n} of {unit} after {first} is out of range"));
    match unit.advance() {
        CalendarAdvance::Years(k) => {
            let offset = i32::try_from(n)
                .ok()
                .and_then(|n| n.checked_mul(k))
                .ok_or_else(out_of_range)?;
            jan_first(first.year().checked_add(offset).ok_or_else(out_of_range)?)
        }
        CalendarAdvance::Months(m) => {
            let months = u32::try_from(n)
                .ok()
                .and_then(|n| n.checked_mul(m))
                .ok_or_else(out_of_range)?;
            first
                .checked_add_months(Months::new(months))
                .ok_or_else(out_of_range)
        }
        CalendarAdvance::Fixed(seconds) => {
            let micros = i64::try_from(n)
                .ok()
                .and_then(|n| n.checked_mul(seconds * MICROS_PER_SECOND))
                .ok_or_else(out_of_range)?;
            first
                .checked_add_signed(TimeDelta::microseconds(micros))
                .ok_or_else(out_of_range)
        }
    }
}

/// Builds labelled ticks for a chosen calendar unit
pub struct CalendarTickGenerator<'a> {
    measurer: &'a dyn TextMeasurer,
    config: &'a AxisConfig,
}

impl<'a> CalendarTickGenerator<'a> {
    pub fn new(measurer: &'a dyn TextMeasurer, config: &'a AxisConfig) -> Self {
        Self { measurer, config }
    }

    /// Ticks for `plan` laid out over `extent` pixels. The first tick uses
    /// the unit's first-label format and the rest its follow format.
    pub fn generate(
        &self,
        plan: &TickPlan,
        window: &DateWindow,
        extent: f64,
    ) -> AxisResult<Vec<Tick>> {
        let mapper = CoordinateMapper::new(
            to_epoch_seconds(window.start),
            window.span_seconds(),
            extent,
        )?;
        let tolerance = self.config.boundary_tolerance * extent.max(1.0);

        let mut ticks = Vec::with_capacity(plan.count);
        for (index, date) in plan.dates()?.into_iter().enumerate() {
            let format = if index == 0 {
                plan.unit.first_format()
            } else {
                plan.unit.follow_format()
            };
            let value = to_epoch_seconds(date);
            ticks.push(Tick::new(
                value,
                mapper.to_pixel_clamped(value, tolerance),
                date.format(format).to_string(),
            ));
        }

        suppress_overlapping_labels(&mut ticks, self.measurer, self.config.font_size_em);
        Ok(ticks)
    }
}

/// Left to right, drop any label that would start before the previous
/// visible label ends. Suppressed ticks keep their slot.
pub fn suppress_overlapping_labels(
    ticks: &mut [Tick],
    measurer: &dyn TextMeasurer,
    font_size_em: f64,
) {
    let mut visible_end: Option<f64> = None;
    for tick in ticks.iter_mut() {
        let Some(label) = tick.label.as_deref() else {
            continue;
        };
        if visible_end.is_some_and(|end| tick.pixel_offset < end) {
            tracing::trace!(
                target: "axis_engine::calendar",
                label,
                pixel_offset = tick.pixel_offset,
                "label overlaps previous label, suppressed"
            );
            tick.label = None;
            continue;
        }
        let width = measurer.measure_width(label, font_size_em).max(0.0);
        visible_end = Some(tick.pixel_offset + width);
    }
}
