//! Zoom, pan and paging over a [`Viewport`]
//!
//! The controller is the only writer of the viewport it owns. Every
//! operation that actually changes the window bumps the revision counter,
//! notifies viewport listeners and recomputes the [`ZoomState`]; zoom-state
//! listeners hear about it only when one of the two flags flips.

use crate::error::ensure_finite;
use crate::viewport::Viewport;
use crate::{AxisConfig, AxisError, AxisResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ranges below this fraction of the window's magnitude no longer change the
/// tick layout
const MIN_RELATIVE_RANGE: f64 = 1e-9;

/// Whether zooming in or out would change the window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ZoomState {
    pub can_zoom_in: bool,
    pub can_zoom_out: bool,
}

type ViewportListener = Box<dyn FnMut(&Viewport)>;
type ZoomStateListener = Box<dyn FnMut(ZoomState)>;

/// Owner of the displayed window and its zoomability flags
pub struct ZoomController {
    viewport: Viewport,
    zoom_factor: f64,
    min_range: f64,
    zoom_state: ZoomState,
    revision: u64,
    viewport_listeners: Vec<ViewportListener>,
    zoom_state_listeners: Vec<ZoomStateListener>,
}

impl fmt::Debug for ZoomController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZoomController")
            .field("viewport", &self.viewport)
            .field("zoom_factor", &self.zoom_factor)
            .field("min_range", &self.min_range)
            .field("zoom_state", &self.zoom_state)
            .field("revision", &self.revision)
            .field("viewport_listeners", &self.viewport_listeners.len())
            .field("zoom_state_listeners", &self.zoom_state_listeners.len())
            .finish()
    }
}

impl ZoomController {
    pub fn new(viewport: Viewport, config: &AxisConfig) -> AxisResult<Self> {
        config.validate()?;
        let mut controller = Self {
            viewport,
            zoom_factor: config.zoom_factor,
            min_range: config.min_range,
            zoom_state: ZoomState::default(),
            revision: 0,
            viewport_listeners: Vec::new(),
            zoom_state_listeners: Vec::new(),
        };
        controller.zoom_state = controller.compute_zoom_state();
        Ok(controller)
    }

    /// Replace the absolute floor below which zooming in stops
    pub fn with_min_range(mut self, min_range: f64) -> AxisResult<Self> {
        ensure_finite("min_range", min_range)?;
        if min_range <= 0.0 {
            return Err(AxisError::domain(format!(
                "min_range must be > 0, got {min_range}"
            )));
        }
        self.min_range = min_range;
        self.zoom_state = self.compute_zoom_state();
        Ok(self)
    }

    /// Register a listener for every actual viewport change
    pub fn on_viewport_changed(&mut self, listener: impl FnMut(&Viewport) + 'static) {
        self.viewport_listeners.push(Box::new(listener));
    }

    /// Register a listener for flips of either zoom flag
    pub fn on_zoom_state_changed(&mut self, listener: impl FnMut(ZoomState) + 'static) {
        self.zoom_state_listeners.push(Box::new(listener));
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn value(&self) -> f64 {
        self.viewport.value()
    }

    pub fn range(&self) -> f64 {
        self.viewport.range()
    }

    pub fn zoom_state(&self) -> ZoomState {
        self.zoom_state
    }

    pub fn can_zoom_in(&self) -> bool {
        self.zoom_state.can_zoom_in
    }

    pub fn can_zoom_out(&self) -> bool {
        self.zoom_state.can_zoom_out
    }

    pub fn zoom_factor(&self) -> f64 {
        self.zoom_factor
    }

    /// Incremented on every actual viewport change
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Smallest range worth zooming to for the current window
    pub fn min_meaningful_range(&self) -> f64 {
        let magnitude = self.viewport.value().abs().max(self.viewport.end().abs());
        self.min_range.max(magnitude * MIN_RELATIVE_RANGE)
    }

    /// Divide the range by the zoom factor, keeping the window's start.
    /// Returns `false` without changing anything at the minimum range.
    pub fn zoom_in(&mut self) -> AxisResult<bool> {
        if !self.zoom_state.can_zoom_in {
            return Ok(false);
        }
        let value = self.viewport.value();
        let range = self.viewport.range() / self.zoom_factor;
        self.update(|viewport| viewport.set_window(value, range))
    }

    /// Multiply the range by the zoom factor, limited to the bounds' span
    pub fn zoom_out(&mut self) -> AxisResult<bool> {
        if !self.zoom_state.can_zoom_out {
            return Ok(false);
        }
        let mut value = self.viewport.value();
        let mut range = self.viewport.range() * self.zoom_factor;
        if let Some(bounds) = self.viewport.bounds() {
            range = range.min(bounds.span());
            value = value.min(bounds.max - range).max(bounds.min);
        }
        self.update(|viewport| viewport.set_window(value, range))
    }

    /// Show the whole bounded domain
    pub fn zoom_reset(&mut self) -> AxisResult<bool> {
        let bounds = self
            .viewport
            .bounds()
            .ok_or(AxisError::Unbounded("zoom_reset"))?;
        self.update(|viewport| viewport.set_window(bounds.min, bounds.span()))
    }

    /// Shift the window by one range, staying inside the bounds
    pub fn page(&mut self, forward: bool) -> AxisResult<bool> {
        let range = self.viewport.range();
        let mut value = if forward {
            self.viewport.value() + range
        } else {
            self.viewport.value() - range
        };
        if let Some(bounds) = self.viewport.bounds() {
            value = value.min(bounds.max - range).max(bounds.min);
        }
        self.update(|viewport| viewport.set_window(value, range))
    }

    /// Replace the window; bounds widen to contain it
    pub fn set_window(&mut self, value: f64, range: f64) -> AxisResult<bool> {
        self.update(|viewport| viewport.set_window(value, range))
    }

    /// Replace the bounds; they widen to contain the window
    pub fn set_bounds(&mut self, min: f64, max: f64) -> AxisResult<bool> {
        self.update(|viewport| viewport.set_bounds(min, max))
    }

    /// Replace the bounds with a pair that may be missing
    pub fn set_bounds_opt(&mut self, min: Option<f64>, max: Option<f64>) -> AxisResult<bool> {
        self.update(|viewport| viewport.set_bounds_opt(min, max))
    }

    pub fn clear_bounds(&mut self) -> AxisResult<bool> {
        self.update(|viewport| {
            viewport.clear_bounds();
            Ok(())
        })
    }

    /// Widen the bounds to include an observed data value
    pub fn observe(&mut self, value: f64) -> AxisResult<bool> {
        self.update(|viewport| viewport.observe(value))
    }

    /// Apply a mutation to a copy and commit it only if it succeeded and
    /// changed something
    fn update(
        &mut self,
        mutate: impl FnOnce(&mut Viewport) -> AxisResult<()>,
    ) -> AxisResult<bool> {
        let mut next = self.viewport;
        mutate(&mut next)?;
        if next == self.viewport {
            return Ok(false);
        }

        self.viewport = next;
        self.revision += 1;
        tracing::trace!(
            target: "axis_engine::zoom",
            value = next.value(),
            range = next.range(),
            revision = self.revision,
            "viewport changed"
        );
        for listener in &mut self.viewport_listeners {
            listener(&next);
        }

        let state = self.compute_zoom_state();
        if state != self.zoom_state {
            self.zoom_state = state;
            tracing::debug!(
                target: "axis_engine::zoom",
                can_zoom_in = state.can_zoom_in,
                can_zoom_out = state.can_zoom_out,
                "zoom state changed"
            );
            for listener in &mut self.zoom_state_listeners {
                listener(state);
            }
        }
        Ok(true)
    }

    fn compute_zoom_state(&self) -> ZoomState {
        let range = self.viewport.range();
        ZoomState {
            can_zoom_in: range / self.zoom_factor >= self.min_meaningful_range(),
            can_zoom_out: self
                .viewport
                .bounds()
                .map_or(true, |bounds| range < bounds.span()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn bounded(value: f64, range: f64, min: f64, max: f64) -> ZoomController {
        let viewport = Viewport::with_bounds(value, range, min, max).unwrap();
        ZoomController::new(viewport, &AxisConfig::default()).unwrap()
    }

    #[test]
    fn test_min_range_floor_stops_zoom_in() {
        let viewport = Viewport::new(0.0, 8.0).unwrap();
        let mut controller = ZoomController::new(viewport, &AxisConfig::default())
            .unwrap()
            .with_min_range(1.0)
            .unwrap();
        let mut steps = 0;
        while controller.zoom_in().unwrap() {
            steps += 1;
        }
        assert_eq!(steps, 3);
        assert_eq!(controller.range(), 1.0);
        assert!(!controller.can_zoom_in());

        let viewport = Viewport::new(0.0, 0.5).unwrap();
        let controller = ZoomController::new(viewport, &AxisConfig::default())
            .unwrap()
            .with_min_range(1.0)
            .unwrap();
        assert!(!controller.can_zoom_in());
    }

    #[test]
    fn test_min_range_must_be_positive() {
        let viewport = Viewport::new(0.0, 8.0).unwrap();
        let controller = ZoomController::new(viewport, &AxisConfig::default()).unwrap();
        assert!(matches!(controller.with_min_range(0.0), Err(AxisError::Domain(_))));
    }

    #[test]
    fn test_zoom_in_keeps_start() {
        let mut controller = bounded(10.0, 40.0, 0.0, 100.0);
        assert!(controller.zoom_in().unwrap());
        assert_eq!(controller.value(), 10.0);
        assert_eq!(controller.range(), 20.0);
        assert_eq!(controller.revision(), 1);
    }

    #[test]
    fn test_zoom_out_clamps_to_bounds() {
        let mut controller = bounded(60.0, 40.0, 0.0, 100.0);
        assert!(controller.zoom_out().unwrap());
        assert_eq!(controller.range(), 80.0);
        assert_eq!(controller.value(), 20.0);

        assert!(controller.zoom_out().unwrap());
        assert_eq!(controller.range(), 100.0);
        assert_eq!(controller.value(), 0.0);
        assert!(!controller.can_zoom_out());
        assert!(!controller.zoom_out().unwrap());
    }

    #[test]
    fn test_zoom_out_unbounded() {
        let viewport = Viewport::new(5.0, 10.0).unwrap();
        let mut controller = ZoomController::new(viewport, &AxisConfig::default()).unwrap();
        assert!(controller.can_zoom_out());
        assert!(controller.zoom_out().unwrap());
        assert_eq!(controller.range(), 20.0);
        assert_eq!(controller.value(), 5.0);
        assert!(controller.can_zoom_out());
    }

    #[test]
    fn test_zoom_in_stops_at_minimum_range() {
        let viewport = Viewport::new(1e6, 1e-2).unwrap();
        let mut controller = ZoomController::new(viewport, &AxisConfig::default()).unwrap();
        let mut steps = 0;
        while controller.zoom_in().unwrap() {
            steps += 1;
            assert!(steps < 100);
        }
        assert!(!controller.can_zoom_in());
        assert!(controller.range() >= controller.min_meaningful_range());
        let revision = controller.revision();
        assert!(!controller.zoom_in().unwrap());
        assert_eq!(controller.revision(), revision);
    }

    #[test]
    fn test_zoom_reset_requires_bounds() {
        let viewport = Viewport::new(0.0, 10.0).unwrap();
        let mut controller = ZoomController::new(viewport, &AxisConfig::default()).unwrap();
        assert_eq!(controller.zoom_reset(), Err(AxisError::Unbounded("zoom_reset")));
    }

    #[test]
    fn test_zoom_out_flag_flips_on_reset() {
        let mut controller = bounded(0.0, 100.0, 0.0, 100.0);
        let flips = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&flips);
        controller.on_zoom_state_changed(move |state| sink.borrow_mut().push(state));

        assert!(!controller.can_zoom_out());
        controller.zoom_in().unwrap();
        assert!(controller.can_zoom_out());
        controller.zoom_reset().unwrap();
        assert!(!controller.can_zoom_out());

        let flips = flips.borrow();
        assert_eq!(flips.len(), 2);
        assert!(flips[0].can_zoom_out);
        assert!(!flips[1].can_zoom_out);
    }

    #[test]
    fn test_zoom_state_notifies_only_on_flip() {
        let mut controller = bounded(0.0, 10.0, 0.0, 100.0);
        let flips = Rc::new(RefCell::new(0));
        let changes = Rc::new(RefCell::new(0));
        let flip_sink = Rc::clone(&flips);
        let change_sink = Rc::clone(&changes);
        controller.on_zoom_state_changed(move |_| *flip_sink.borrow_mut() += 1);
        controller.on_viewport_changed(move |_| *change_sink.borrow_mut() += 1);

        controller.page(true).unwrap();
        controller.page(true).unwrap();
        controller.zoom_in().unwrap();
        assert_eq!(*changes.borrow(), 3);
        assert_eq!(*flips.borrow(), 0);
    }

    #[test]
    fn test_page_clamps_into_bounds() {
        let mut controller = bounded(70.0, 20.0, 0.0, 100.0);
        assert!(controller.page(true).unwrap());
        assert_eq!(controller.value(), 80.0);
        assert!(!controller.page(true).unwrap());

        controller.set_window(10.0, 20.0).unwrap();
        assert!(controller.page(false).unwrap());
        assert_eq!(controller.value(), 0.0);
        assert!(!controller.page(false).unwrap());
    }

    #[test]
    fn test_page_unbounded() {
        let viewport = Viewport::new(0.0, 5.0).unwrap();
        let mut controller = ZoomController::new(viewport, &AxisConfig::default()).unwrap();
        controller.page(false).unwrap();
        assert_eq!(controller.value(), -5.0);
    }

    #[test]
    fn test_set_bounds_widens_and_updates_flags() {
        let mut controller = bounded(0.0, 100.0, 0.0, 100.0);
        assert!(!controller.can_zoom_out());
        controller.set_bounds(20.0, 50.0).unwrap();
        let bounds = controller.viewport().bounds().unwrap();
        assert_eq!((bounds.min, bounds.max), (0.0, 100.0));

        controller.observe(250.0).unwrap();
        assert_eq!(controller.viewport().max_bound(), Some(250.0));
        assert!(controller.can_zoom_out());
    }

    #[test]
    fn test_failed_update_leaves_state_untouched() {
        let mut controller = bounded(0.0, 10.0, 0.0, 100.0);
        assert!(controller.set_bounds_opt(Some(0.0), None).is_err());
        assert!(controller.set_window(f64::NAN, 1.0).is_err());
        assert_eq!(controller.revision(), 0);
        assert_eq!(controller.viewport().bounds().map(|b| b.max), Some(100.0));
    }

    #[test]
    fn test_rejects_invalid_config() {
        let viewport = Viewport::new(0.0, 1.0).unwrap();
        let config = AxisConfig::default().with_zoom_factor(0.5);
        assert!(ZoomController::new(viewport, &config).is_err());
    }
}
