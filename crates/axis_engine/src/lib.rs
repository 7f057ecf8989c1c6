//! Axis Engine - tick layout and zoom control for chart axes
//!
//! This crate provides support for:
//! - Splitting numbers into mantissa and decimal exponent
//! - Choosing "nice" tick steps (1, 2 or 5 times a power of ten)
//! - Laying out labeled numeric ticks that do not overlap
//! - Choosing calendar units for date/time axes and aligning ticks to them
//! - Mapping between axis values and pixel offsets
//! - Viewport state with optional bounds, zoom and paging
//! - Axis objects that recompute ticks only when size or viewport change

mod error;
mod config;
mod measure;
mod magnitude;
mod nice_step;
mod mapper;
mod viewport;
mod tick;
mod linear;
mod calendar;
mod calendar_ticks;
mod zoom;
mod axis;

pub use error::*;
pub use config::*;
pub use measure::*;
pub use magnitude::*;
pub use nice_step::*;
pub use mapper::*;
pub use viewport::*;
pub use tick::*;
pub use linear::*;
pub use calendar::*;
pub use calendar_ticks::*;
pub use zoom::*;
pub use axis::*;
