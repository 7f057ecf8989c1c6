//! Calendar granularities for date/time axes
//!
//! [`CalendarUnit`] is the ordered table of tick granularities, from one
//! second up to a millennium. [`UnitWidthTable`] holds the measured label
//! widths of each unit for the active font size, and
//! [`CalendarUnitSelector`] walks the table to find the finest unit whose
//! labels fit the available width.

use crate::calendar_ticks::{to_epoch_seconds, CalendarTickGenerator, DateWindow, TickPlan};
use crate::measure::{padded_width, TextMeasurer};
use crate::tick::{CalendarTicks, Tick};
use crate::{AxisConfig, AxisResult};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

const SECONDS_PER_DAY: f64 = 86_400.0;
const SECONDS_PER_YEAR: f64 = 365.2425 * SECONDS_PER_DAY;

/// Headroom applied to the widest label when estimating a tick count
const LABEL_HEADROOM: f64 = 1.1;

/// How a unit moves from one tick to the next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalendarAdvance {
    /// A fixed number of seconds
    Fixed(i64),
    /// A number of calendar months
    Months(u32),
    /// A number of calendar years
    Years(i32),
}

/// Tick granularity of a date/time axis, ordered finest to coarsest
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalendarUnit {
    Second,
    TenSeconds,
    Minute,
    TenMinutes,
    Hour,
    SixHours,
    Day,
    Week,
    Month,
    Year,
    FiveYears,
    Decade,
    FiftyYears,
    Century,
    FiveCenturies,
    Millennium,
}

impl CalendarUnit {
    pub const ALL: [CalendarUnit; 16] = [
        CalendarUnit::Second,
        CalendarUnit::TenSeconds,
        CalendarUnit::Minute,
        CalendarUnit::TenMinutes,
        CalendarUnit::Hour,
        CalendarUnit::SixHours,
        CalendarUnit::Day,
        CalendarUnit::Week,
        CalendarUnit::Month,
        CalendarUnit::Year,
        CalendarUnit::FiveYears,
        CalendarUnit::Decade,
        CalendarUnit::FiftyYears,
        CalendarUnit::Century,
        CalendarUnit::FiveCenturies,
        CalendarUnit::Millennium,
    ];

    /// Position in [`CalendarUnit::ALL`]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn finer(self) -> Option<Self> {
        self.index()
            .checked_sub(1)
            .and_then(|i| Self::ALL.get(i).copied())
    }

    pub fn coarser(self) -> Option<Self> {
        Self::ALL.get(self.index() + 1).copied()
    }

    pub fn advance(self) -> CalendarAdvance {
        match self {
            CalendarUnit::Second => CalendarAdvance::Fixed(1),
            CalendarUnit::TenSeconds => CalendarAdvance::Fixed(10),
            CalendarUnit::Minute => CalendarAdvance::Fixed(60),
            CalendarUnit::TenMinutes => CalendarAdvance::Fixed(600),
            CalendarUnit::Hour => CalendarAdvance::Fixed(3_600),
            CalendarUnit::SixHours => CalendarAdvance::Fixed(21_600),
            CalendarUnit::Day => CalendarAdvance::Fixed(86_400),
            CalendarUnit::Week => CalendarAdvance::Fixed(604_800),
            CalendarUnit::Month => CalendarAdvance::Months(1),
            CalendarUnit::Year => CalendarAdvance::Years(1),
            CalendarUnit::FiveYears => CalendarAdvance::Years(5),
            CalendarUnit::Decade => CalendarAdvance::Years(10),
            CalendarUnit::FiftyYears => CalendarAdvance::Years(50),
            CalendarUnit::Century => CalendarAdvance::Years(100),
            CalendarUnit::FiveCenturies => CalendarAdvance::Years(500),
            CalendarUnit::Millennium => CalendarAdvance::Years(1000),
        }
    }

    /// Exact duration for fixed units, average duration for months and years
    pub fn typical_duration_secs(self) -> f64 {
        match self.advance() {
            CalendarAdvance::Fixed(seconds) => seconds as f64,
            CalendarAdvance::Months(months) => f64::from(months) * SECONDS_PER_YEAR / 12.0,
            CalendarAdvance::Years(years) => f64::from(years) * SECONDS_PER_YEAR,
        }
    }

    /// `strftime` pattern for the leftmost label, which carries full context
    pub fn first_format(self) -> &'static str {
        match self {
            CalendarUnit::Second | CalendarUnit::TenSeconds => "%d %b %Y %H:%M:%S",
            CalendarUnit::Minute
            | CalendarUnit::TenMinutes
            | CalendarUnit::Hour
            | CalendarUnit::SixHours => "%d %b %Y %H:%M",
            CalendarUnit::Day | CalendarUnit::Week => "%d %b %Y",
            CalendarUnit::Month => "%b %Y",
            _ => "%Y",
        }
    }

    /// `strftime` pattern for every label after the first
    pub fn follow_format(self) -> &'static str {
        match self {
            CalendarUnit::Second | CalendarUnit::TenSeconds => "%H:%M:%S",
            CalendarUnit::Minute
            | CalendarUnit::TenMinutes
            | CalendarUnit::Hour
            | CalendarUnit::SixHours => "%H:%M",
            CalendarUnit::Day | CalendarUnit::Week => "%d %b",
            CalendarUnit::Month => "%b",
            _ => "%Y",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            CalendarUnit::Second => "second",
            CalendarUnit::TenSeconds => "10 seconds",
            CalendarUnit::Minute => "minute",
            CalendarUnit::TenMinutes => "10 minutes",
            CalendarUnit::Hour => "hour",
            CalendarUnit::SixHours => "6 hours",
            CalendarUnit::Day => "day",
            CalendarUnit::Week => "week",
            CalendarUnit::Month => "month",
            CalendarUnit::Year => "year",
            CalendarUnit::FiveYears => "5 years",
            CalendarUnit::Decade => "decade",
            CalendarUnit::FiftyYears => "50 years",
            CalendarUnit::Century => "century",
            CalendarUnit::FiveCenturies => "500 years",
            CalendarUnit::Millennium => "millennium",
        }
    }
}

impl fmt::Display for CalendarUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Padded pixel widths of a unit's two label formats
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LabelWidths {
    pub first: f64,
    pub follow: f64,
}

/// Label widths of every unit, measured for one font size
#[derive(Debug, Clone, PartialEq)]
pub struct UnitWidthTable {
    font_size_em: f64,
    padding: f64,
    widths: [LabelWidths; 16],
}

/// Sample date with wide two-digit fields in every position
fn sample_date() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2000, 12, 28)
        .and_then(|date| date.and_hms_opt(20, 58, 58))
        .unwrap_or_default()
}

impl UnitWidthTable {
    pub fn measure(measurer: &dyn TextMeasurer, font_size_em: f64, padding: f64) -> Self {
        let sample = sample_date();
        let mut widths = [LabelWidths::default(); 16];
        for unit in CalendarUnit::ALL {
            let width_of = |format: &str| {
                padded_width(
                    measurer,
                    &sample.format(format).to_string(),
                    font_size_em,
                    padding,
                )
            };
            widths[unit.index()] = LabelWidths {
                first: width_of(unit.first_format()),
                follow: width_of(unit.follow_format()),
            };
        }
        tracing::debug!(
            target: "axis_engine::calendar",
            font_size_em,
            padding,
            "calendar label widths measured"
        );
        Self {
            font_size_em,
            padding,
            widths,
        }
    }

    /// Whether the table was measured for these settings
    pub fn matches(&self, font_size_em: f64, padding: f64) -> bool {
        self.font_size_em == font_size_em && self.padding == padding
    }

    pub fn font_size_em(&self) -> f64 {
        self.font_size_em
    }

    pub fn widths(&self, unit: CalendarUnit) -> LabelWidths {
        self.widths[unit.index()]
    }

    pub fn widest_follow(&self) -> f64 {
        self.widths.iter().map(|w| w.follow).fold(0.0, f64::max)
    }

    /// Total width of `count` labels: one first label, the rest follow labels
    pub fn layout_width(&self, unit: CalendarUnit, count: usize) -> f64 {
        if count == 0 {
            return 0.0;
        }
        let widths = self.widths(unit);
        widths.first + (count - 1) as f64 * widths.follow
    }

    /// Finest unit at least as long as the per-tick duration implied by
    /// fitting `extent` pixels with the widest follow label
    pub fn default_unit(&self, span_secs: f64, extent: f64) -> CalendarUnit {
        let widest = self.widest_follow() * LABEL_HEADROOM;
        let target_count = if widest > 0.0 {
            (extent / widest).floor()
        } else {
            extent.floor()
        }
        .max(1.0);
        let per_tick = span_secs / target_count;
        CalendarUnit::ALL
            .into_iter()
            .find(|unit| unit.typical_duration_secs() >= per_tick)
            .unwrap_or(CalendarUnit::Millennium)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verdict {
    /// No tick falls inside the window
    Empty,
    Fits,
    TooWide,
}

/// Chooses a calendar unit for a window and lays out its ticks
pub struct CalendarUnitSelector<'a> {
    table: &'a UnitWidthTable,
    measurer: &'a dyn TextMeasurer,
    config: &'a AxisConfig,
}

impl<'a> CalendarUnitSelector<'a> {
    pub fn new(
        table: &'a UnitWidthTable,
        measurer: &'a dyn TextMeasurer,
        config: &'a AxisConfig,
    ) -> Self {
        Self {
            table,
            measurer,
            config,
        }
    }

    fn judge(&self, plan: &TickPlan, extent: f64) -> Verdict {
        if plan.count == 0 {
            return Verdict::Empty;
        }
        let width = self.table.layout_width(plan.unit, plan.count);
        let verdict = if width <= extent {
            Verdict::Fits
        } else {
            Verdict::TooWide
        };
        tracing::trace!(
            target: "axis_engine::calendar",
            unit = %plan.unit,
            count = plan.count,
            width,
            extent,
            ?verdict,
            "calendar trial"
        );
        verdict
    }

    /// Pick the finest unit whose labels fit and build its ticks.
    ///
    /// Starting from [`UnitWidthTable::default_unit`], trials that fit (or
    /// contain no tick) move one unit finer until a trial is too wide. If
    /// the very first trial is too wide the walk goes coarser instead. When
    /// nothing fits, the coarsest trial that produced ticks is kept as a
    /// single best-effort tick.
    pub fn select(&self, window: &DateWindow, extent: f64) -> AxisResult<CalendarTicks> {
        let default = self.table.default_unit(window.span_seconds(), extent);
        let mut unit = default;
        let first_plan = TickPlan::new(unit, window)?;
        let mut chosen: Option<TickPlan> = None;
        let mut fallback: Option<TickPlan> = None;

        match self.judge(&first_plan, extent) {
            Verdict::TooWide => {
                fallback = Some(first_plan);
                while let Some(coarser) = unit.coarser() {
                    unit = coarser;
                    let plan = TickPlan::new(unit, window)?;
                    match self.judge(&plan, extent) {
                        Verdict::Fits => {
                            chosen = Some(plan);
                            break;
                        }
                        Verdict::TooWide => fallback = Some(plan),
                        Verdict::Empty => break,
                    }
                }
            }
            verdict => {
                if verdict == Verdict::Fits {
                    chosen = Some(first_plan);
                }
                while let Some(finer) = unit.finer() {
                    let plan = TickPlan::new(finer, window)?;
                    match self.judge(&plan, extent) {
                        Verdict::Fits => chosen = Some(plan),
                        Verdict::Empty => {}
                        Verdict::TooWide => {
                            if chosen.is_none() {
                                fallback = Some(plan);
                            }
                            break;
                        }
                    }
                    unit = finer;
                }
            }
        }

        let generator = CalendarTickGenerator::new(self.measurer, self.config);
        if let Some(plan) = chosen {
            let ticks = generator.generate(&plan, window, extent)?;
            tracing::debug!(
                target: "axis_engine::calendar",
                unit = %plan.unit,
                count = ticks.len(),
                "calendar ticks computed"
            );
            return Ok(CalendarTicks {
                ticks,
                unit: plan.unit,
                degenerate: false,
            });
        }

        match fallback {
            Some(plan) => {
                tracing::warn!(
                    target: "axis_engine::calendar",
                    unit = %plan.unit,
                    "no calendar unit fits, keeping a single tick"
                );
                let single = TickPlan { count: 1, ..plan };
                Ok(CalendarTicks {
                    ticks: generator.generate(&single, window, extent)?,
                    unit: plan.unit,
                    degenerate: true,
                })
            }
            None => {
                tracing::debug!(
                    target: "axis_engine::calendar",
                    unit = %default,
                    "window holds no calendar boundary, labelling its start"
                );
                let label = window.start.format(default.first_format()).to_string();
                Ok(CalendarTicks {
                    ticks: vec![Tick::new(to_epoch_seconds(window.start), 0.0, label)],
                    unit: default,
                    degenerate: true,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar_ticks::from_epoch_seconds;
    use chrono::Datelike;
    use proptest::prelude::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn seven_px(text: &str, _: f64) -> f64 {
        text.chars().count() as f64 * 7.0
    }

    fn table() -> UnitWidthTable {
        UnitWidthTable::measure(&seven_px, 12.0, 8.0)
    }

    #[test]
    fn test_unit_order_and_neighbours() {
        assert_eq!(CalendarUnit::Second.finer(), None);
        assert_eq!(CalendarUnit::Second.coarser(), Some(CalendarUnit::TenSeconds));
        assert_eq!(CalendarUnit::Millennium.coarser(), None);
        assert_eq!(CalendarUnit::Month.finer(), Some(CalendarUnit::Week));
        for pair in CalendarUnit::ALL.windows(2) {
            assert!(pair[0] < pair[1]);
            assert!(pair[0].typical_duration_secs() < pair[1].typical_duration_secs());
        }
    }

    #[test]
    fn test_label_formats() {
        let date = day(2000, 1, 1);
        assert_eq!(date.format(CalendarUnit::Month.first_format()).to_string(), "Jan 2000");
        assert_eq!(date.format(CalendarUnit::Month.follow_format()).to_string(), "Jan");
        assert_eq!(date.format(CalendarUnit::Decade.first_format()).to_string(), "2000");
        assert_eq!(
            date.format(CalendarUnit::Minute.first_format()).to_string(),
            "01 Jan 2000 00:00"
        );
    }

    #[test]
    fn test_width_table() {
        let table = table();
        let month = table.widths(CalendarUnit::Month);
        assert_eq!(month.first, 8.0 * 7.0 + 8.0);
        assert_eq!(month.follow, 3.0 * 7.0 + 8.0);
        assert_eq!(table.widest_follow(), 8.0 * 7.0 + 8.0);
        assert_eq!(table.layout_width(CalendarUnit::Month, 0), 0.0);
        assert_eq!(table.layout_width(CalendarUnit::Month, 3), 64.0 + 2.0 * 29.0);
        assert!(table.matches(12.0, 8.0));
        assert!(!table.matches(10.0, 8.0));
    }

    #[test]
    fn test_default_unit() {
        let table = table();
        // 400px / (1.1 * 64px) -> 5 ticks; 10 days / 5 = 2 days per tick
        assert_eq!(table.default_unit(10.0 * SECONDS_PER_DAY, 400.0), CalendarUnit::Week);
        assert_eq!(table.default_unit(40.0, 400.0), CalendarUnit::TenSeconds);
        assert_eq!(table.default_unit(60.0, 400.0), CalendarUnit::Minute);
        assert_eq!(table.default_unit(1e15, 400.0), CalendarUnit::Millennium);
    }

    #[test]
    fn test_select_six_years() {
        let table = table();
        let config = AxisConfig::default();
        let window = DateWindow::new(day(2000, 1, 1), day(2006, 1, 1)).unwrap();
        let ticks = CalendarUnitSelector::new(&table, &seven_px, &config)
            .select(&window, 300.0)
            .unwrap();
        assert_eq!(ticks.unit, CalendarUnit::Year);
        assert!(!ticks.degenerate);
        assert_eq!(ticks.len(), 7);
        assert_eq!(ticks.ticks[0].label.as_deref(), Some("2000"));
        assert_eq!(ticks.ticks[6].label.as_deref(), Some("2006"));
        assert!(ticks.ticks.iter().all(|t| t.has_label()));
    }

    #[test]
    fn test_select_months() {
        let table = table();
        let config = AxisConfig::default();
        let window = DateWindow::new(day(2000, 1, 1), day(2000, 7, 1)).unwrap();
        let ticks = CalendarUnitSelector::new(&table, &seven_px, &config)
            .select(&window, 400.0)
            .unwrap();
        assert_eq!(ticks.unit, CalendarUnit::Month);
        assert_eq!(ticks.len(), 7);
        assert_eq!(ticks.ticks[0].label.as_deref(), Some("Jan 2000"));
        assert_eq!(ticks.ticks[1].label.as_deref(), Some("Feb"));
    }

    #[test]
    fn test_select_walks_coarser_when_first_trial_is_too_wide() {
        let table = table();
        let config = AxisConfig::default();
        // Ten-second labels carry seconds in the first label and do not fit
        let start = day(2000, 1, 1);
        let window = DateWindow::new(start, start + chrono::TimeDelta::seconds(3)).unwrap();
        assert_eq!(table.default_unit(window.span_seconds(), 140.0), CalendarUnit::TenSeconds);
        let ticks = CalendarUnitSelector::new(&table, &seven_px, &config)
            .select(&window, 140.0)
            .unwrap();
        assert_eq!(ticks.unit, CalendarUnit::Minute);
        assert!(!ticks.degenerate);
        assert_eq!(ticks.len(), 1);
        assert_eq!(ticks.ticks[0].label.as_deref(), Some("01 Jan 2000 00:00"));
    }

    #[test]
    fn test_select_best_effort_single_tick() {
        let table = table();
        let config = AxisConfig::default();
        let window = DateWindow::new(day(2000, 1, 1), day(2006, 1, 1)).unwrap();
        let ticks = CalendarUnitSelector::new(&table, &seven_px, &config)
            .select(&window, 10.0)
            .unwrap();
        assert!(ticks.degenerate);
        assert_eq!(ticks.len(), 1);
        assert_eq!(ticks.unit, CalendarUnit::Millennium);
        assert_eq!(ticks.ticks[0].label.as_deref(), Some("2000"));
    }

    #[test]
    fn test_select_without_any_boundary() {
        let table = table();
        let config = AxisConfig::default();
        let start = day(2000, 1, 1) + chrono::TimeDelta::milliseconds(100);
        let end = start + chrono::TimeDelta::milliseconds(500);
        let window = DateWindow::new(start, end).unwrap();
        let ticks = CalendarUnitSelector::new(&table, &seven_px, &config)
            .select(&window, 400.0)
            .unwrap();
        assert!(ticks.degenerate);
        assert_eq!(ticks.len(), 1);
        assert_eq!(ticks.unit, CalendarUnit::Second);
        assert_eq!(ticks.ticks[0].pixel_offset, 0.0);
        assert_eq!(ticks.ticks[0].label.as_deref(), Some("01 Jan 2000 00:00:00"));
    }

    #[test]
    fn test_select_year_ticks_fall_on_new_year() {
        let table = table();
        let config = AxisConfig::default();
        let window = DateWindow::new(day(1990, 7, 1), day(2020, 7, 1)).unwrap();
        let ticks = CalendarUnitSelector::new(&table, &seven_px, &config)
            .select(&window, 300.0)
            .unwrap();
        for tick in &ticks.ticks {
            let date = crate::calendar_ticks::from_epoch_seconds(tick.value).unwrap();
            assert_eq!((date.month(), date.day()), (1, 1));
        }
    }

    proptest! {
        #[test]
        fn prop_calendar_ticks_are_ordered(
            start in -2e9f64..4e9,
            span in 1.0f64..3e9,
            extent in 20.0f64..2000.0,
        ) {
            let window = DateWindow::new(
                from_epoch_seconds(start.floor()).unwrap(),
                from_epoch_seconds((start + span).floor()).unwrap(),
            )
            .unwrap();
            let table = table();
            let config = AxisConfig::default();
            let ticks = CalendarUnitSelector::new(&table, &seven_px, &config)
                .select(&window, extent)
                .unwrap();
            prop_assert!(!ticks.is_empty());

            for pair in ticks.ticks.windows(2) {
                prop_assert!(pair[1].value > pair[0].value);
                prop_assert!(pair[1].pixel_offset >= pair[0].pixel_offset);
            }
            for tick in &ticks.ticks {
                prop_assert!(tick.pixel_offset >= 0.0 && tick.pixel_offset <= extent);
            }
        }
    }
}
