use std::cell::RefCell;
use std::collections::HashMap;

use silhouette_core::TextMeasurer;
use skia_safe::{Font, FontMgr, FontStyle, Typeface};
use tracing::warn;

/// Measures text ink bounds with Skia fonts.
///
/// Typefaces are resolved once per family and cached. Families that do not
/// resolve fall back to `fallback_family`, then to the platform default.
pub struct SkiaTextMeasurer {
    font_mgr: FontMgr,
    fallback_family: String,
    typefaces: RefCell<HashMap<String, Option<Typeface>>>,
}

impl SkiaTextMeasurer {
    pub fn new() -> Self {
        Self::with_fallback("Arial")
    }

    pub fn with_fallback(family: impl Into<String>) -> Self {
        Self {
            font_mgr: FontMgr::new(),
            fallback_family: family.into(),
            typefaces: RefCell::new(HashMap::new()),
        }
    }

    fn typeface(&self, family: &str) -> Option<Typeface> {
        if let Some(cached) = self.typefaces.borrow().get(family) {
            return cached.clone();
        }

        let resolved = self
            .font_mgr
            .match_family_style(family, FontStyle::normal())
            .or_else(|| {
                self.font_mgr
                    .match_family_style(&self.fallback_family, FontStyle::normal())
            })
            .or_else(|| self.font_mgr.match_family_style("", FontStyle::normal()));
        if resolved.is_none() {
            warn!(family, "no typeface available, text will not be traced");
        }

        self.typefaces
            .borrow_mut()
            .insert(family.to_string(), resolved.clone());
        resolved
    }
}

impl Default for SkiaTextMeasurer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextMeasurer for SkiaTextMeasurer {
    fn measure(&self, text: &str, font_family: &str, size: f32) -> f32 {
        if text.is_empty() {
            return 0.0;
        }
        let Some(typeface) = self.typeface(font_family) else {
            return 0.0;
        };
        let font = Font::new(typeface, Some(size));
        let (_advance, bounds) = font.measure_str(text, None);
        bounds.width()
    }
}

impl std::fmt::Debug for SkiaTextMeasurer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SkiaTextMeasurer")
            .field("fallback_family", &self.fallback_family)
            .field("cached", &self.typefaces.borrow().len())
            .finish()
    }
}
