//! Text measurement
//!
//! The engine never touches glyph metrics itself. Label widths come from a
//! [`TextMeasurer`] supplied by the host; any `Fn(&str, f64) -> f64` closure
//! qualifies.

/// Measures the rendered pixel width of a string at a font size in em
pub trait TextMeasurer {
    fn measure_width(&self, text: &str, font_size_em: f64) -> f64;
}

impl<F> TextMeasurer for F
where
    F: Fn(&str, f64) -> f64,
{
    fn measure_width(&self, text: &str, font_size_em: f64) -> f64 {
        self(text, font_size_em)
    }
}

/// Approximate measurer for hosts without real font metrics
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EstimatedMeasurer {
    /// Average glyph advance as a fraction of the font size
    pub char_width_em: f64,
}

impl Default for EstimatedMeasurer {
    fn default() -> Self {
        // Average character width is ~60% of em
        Self { char_width_em: 0.6 }
    }
}

impl TextMeasurer for EstimatedMeasurer {
    fn measure_width(&self, text: &str, font_size_em: f64) -> f64 {
        text.chars().count() as f64 * font_size_em * self.char_width_em
    }
}

/// Width of `text` plus the configured padding
pub(crate) fn padded_width(
    measurer: &dyn TextMeasurer,
    text: &str,
    font_size_em: f64,
    padding: f64,
) -> f64 {
    measurer.measure_width(text, font_size_em).max(0.0) + padding
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimated_width() {
        let measurer = EstimatedMeasurer::default();
        assert!((measurer.measure_width("hello", 10.0) - 30.0).abs() < 1e-9);
        assert_eq!(measurer.measure_width("", 10.0), 0.0);
    }

    #[test]
    fn test_closure_measurer() {
        let measurer = |text: &str, em: f64| text.len() as f64 * em;
        assert_eq!(measurer.measure_width("abc", 2.0), 6.0);
    }

    #[test]
    fn test_padded_width_ignores_negative_measurements() {
        let measurer = |_: &str, _: f64| -5.0;
        assert_eq!(padded_width(&measurer, "x", 12.0, 4.0), 4.0);
    }
}
