//! Numeric and date/time axes driven by render-size notifications
//!
//! An axis owns a [`ZoomController`], a text measurer and its configuration.
//! The hosting layout pass reports the available pixel extent through
//! `on_render_size`; ticks are recomputed only when the extent or the
//! viewport changed since the previous layout.

use crate::calendar::{CalendarUnit, CalendarUnitSelector, UnitWidthTable};
use crate::calendar_ticks::{to_epoch_seconds, DateWindow};
use crate::linear::LinearTickGenerator;
use crate::mapper::CoordinateMapper;
use crate::measure::TextMeasurer;
use crate::tick::{CalendarTicks, LinearTicks};
use crate::viewport::{viewport_changed, Viewport};
use crate::zoom::ZoomController;
use crate::{AxisConfig, AxisResult};
use chrono::NaiveDateTime;

/// Layout bookkeeping shared by both axis kinds
#[derive(Debug, Clone)]
struct LayoutCache<T> {
    extent: Option<f64>,
    laid_out: Option<Viewport>,
    ticks: Option<T>,
}

impl<T> LayoutCache<T> {
    fn empty() -> Self {
        Self {
            extent: None,
            laid_out: None,
            ticks: None,
        }
    }

    fn is_stale(&self, extent: f64, viewport: &Viewport) -> bool {
        self.ticks.is_none()
            || self.extent != Some(extent)
            || viewport_changed(self.laid_out.as_ref(), viewport)
    }

    fn store(&mut self, extent: f64, viewport: Viewport, ticks: T) {
        self.extent = Some(extent);
        self.laid_out = Some(viewport);
        self.ticks = Some(ticks);
    }

    fn invalidate(&mut self) {
        self.ticks = None;
    }
}

/// Axis over plain numbers
#[derive(Debug)]
pub struct NumericAxis<M: TextMeasurer> {
    controller: ZoomController,
    measurer: M,
    config: AxisConfig,
    cache: LayoutCache<LinearTicks>,
}

impl<M: TextMeasurer> NumericAxis<M> {
    pub fn new(viewport: Viewport, measurer: M, config: AxisConfig) -> AxisResult<Self> {
        let controller = ZoomController::new(viewport, &config)?;
        Ok(Self {
            controller,
            measurer,
            config,
            cache: LayoutCache::empty(),
        })
    }

    pub fn controller(&self) -> &ZoomController {
        &self.controller
    }

    /// Zoom, page and bound changes go through the controller; the next
    /// render-size notification picks them up
    pub fn controller_mut(&mut self) -> &mut ZoomController {
        &mut self.controller
    }

    pub fn config(&self) -> &AxisConfig {
        &self.config
    }

    /// Change the label font size and force the next layout
    pub fn set_font_size(&mut self, font_size_em: f64) -> AxisResult<()> {
        let config = self.config.clone().with_font_size(font_size_em);
        config.validate()?;
        self.config = config;
        self.cache.invalidate();
        Ok(())
    }

    pub fn invalidate(&mut self) {
        self.cache.invalidate();
    }

    /// Handle a render-size notification. Returns `true` when the ticks
    /// were recomputed.
    pub fn on_render_size(&mut self, extent: f64) -> AxisResult<bool> {
        let viewport = *self.controller.viewport();
        if !self.cache.is_stale(extent, &viewport) {
            return Ok(false);
        }
        let ticks = LinearTickGenerator::new(&self.measurer, &self.config)
            .generate(&viewport, extent)?;
        tracing::debug!(
            target: "axis_engine::axis",
            extent,
            revision = self.controller.revision(),
            ticks = ticks.len(),
            "numeric axis laid out"
        );
        self.cache.store(extent, viewport, ticks);
        Ok(true)
    }

    /// Ticks of the most recent layout
    pub fn ticks(&self) -> Option<&LinearTicks> {
        self.cache.ticks.as_ref()
    }

    /// Mapper for the laid-out viewport and extent
    pub fn mapper(&self) -> AxisResult<CoordinateMapper> {
        let viewport = self.controller.viewport();
        CoordinateMapper::new(
            viewport.value(),
            viewport.range(),
            self.cache.extent.unwrap_or(0.0),
        )
    }
}

/// Below one second no calendar unit changes the layout
const MIN_DATE_RANGE_SECS: f64 = 1.0;

/// Axis over dates. The controller's viewport, in seconds since the Unix
/// epoch, is the only stored window; the date view is derived from it.
#[derive(Debug)]
pub struct DateTimeAxis<M: TextMeasurer> {
    controller: ZoomController,
    measurer: M,
    config: AxisConfig,
    widths: Option<UnitWidthTable>,
    cache: LayoutCache<CalendarTicks>,
}

impl<M: TextMeasurer> DateTimeAxis<M> {
    pub fn new(window: DateWindow, measurer: M, config: AxisConfig) -> AxisResult<Self> {
        let controller = ZoomController::new(window.to_viewport()?, &config)?
            .with_min_range(config.min_range.max(MIN_DATE_RANGE_SECS))?;
        Ok(Self {
            controller,
            measurer,
            config,
            widths: None,
            cache: LayoutCache::empty(),
        })
    }

    pub fn controller(&self) -> &ZoomController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut ZoomController {
        &mut self.controller
    }

    pub fn config(&self) -> &AxisConfig {
        &self.config
    }

    /// The displayed dates, derived from the numeric viewport
    pub fn display_window(&self) -> AxisResult<DateWindow> {
        DateWindow::from_viewport(self.controller.viewport())
    }

    pub fn set_display_window(&mut self, window: DateWindow) -> AxisResult<bool> {
        let start = to_epoch_seconds(window.start);
        self.controller
            .set_window(start, to_epoch_seconds(window.end) - start)
    }

    /// Set the date domain the window may be zoomed out to
    pub fn set_date_bounds(&mut self, min: NaiveDateTime, max: NaiveDateTime) -> AxisResult<bool> {
        self.controller
            .set_bounds(to_epoch_seconds(min), to_epoch_seconds(max))
    }

    /// Change the label font size; label widths are re-measured on the next
    /// layout
    pub fn set_font_size(&mut self, font_size_em: f64) -> AxisResult<()> {
        let config = self.config.clone().with_font_size(font_size_em);
        config.validate()?;
        self.config = config;
        self.cache.invalidate();
        Ok(())
    }

    pub fn invalidate(&mut self) {
        self.cache.invalidate();
    }

    /// Handle a render-size notification. Returns `true` when the ticks
    /// were recomputed.
    pub fn on_render_size(&mut self, extent: f64) -> AxisResult<bool> {
        let viewport = *self.controller.viewport();
        if !self.cache.is_stale(extent, &viewport) {
            return Ok(false);
        }

        let font_size_em = self.config.font_size_em;
        let padding = self.config.label_padding;
        let table = match self.widths.take() {
            Some(table) if table.matches(font_size_em, padding) => table,
            _ => UnitWidthTable::measure(&self.measurer, font_size_em, padding),
        };
        let table = self.widths.insert(table);

        let window = DateWindow::from_viewport(&viewport)?;
        let ticks = CalendarUnitSelector::new(table, &self.measurer, &self.config)
            .select(&window, extent)?;
        tracing::debug!(
            target: "axis_engine::axis",
            extent,
            unit = %ticks.unit,
            revision = self.controller.revision(),
            ticks = ticks.len(),
            "date/time axis laid out"
        );
        self.cache.store(extent, viewport, ticks);
        Ok(true)
    }

    pub fn ticks(&self) -> Option<&CalendarTicks> {
        self.cache.ticks.as_ref()
    }

    /// Unit chosen by the most recent layout
    pub fn unit(&self) -> Option<CalendarUnit> {
        self.cache.ticks.as_ref().map(|ticks| ticks.unit)
    }
}
