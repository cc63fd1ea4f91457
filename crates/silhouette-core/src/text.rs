use unicode_segmentation::UnicodeSegmentation;

/// The host's text-measurement facility.
pub trait TextMeasurer {
    /// Returns the rendered width of the text string for the given font and size.
    fn measure(&self, text: &str, font_family: &str, size: f32) -> f32;
}

/// Measures every grapheme cluster as a fixed advance.
///
/// Useful for hosts without a font stack and for deterministic tests.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MonospaceMeasurer {
    pub advance: f32,
}

impl MonospaceMeasurer {
    pub fn new(advance: f32) -> Self {
        Self { advance }
    }
}

impl Default for MonospaceMeasurer {
    fn default() -> Self {
        Self { advance: 8.0 }
    }
}

impl TextMeasurer for MonospaceMeasurer {
    fn measure(&self, text: &str, _font_family: &str, _size: f32) -> f32 {
        text.graphemes(true).count() as f32 * self.advance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monospace_counts_graphemes() {
        let m = MonospaceMeasurer::new(10.0);
        assert_eq!(m.measure("abc", "", 12.0), 30.0);
        // "e" + combining acute is one grapheme
        assert_eq!(m.measure("e\u{301}x", "", 12.0), 20.0);
        assert_eq!(m.measure("", "", 12.0), 0.0);
    }
}
