//! Plain-value overlay configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::TraceError;
use crate::shimmer::DEFAULT_SHIMMER_PERIOD;

/// RGBA colour in float format (0.0 - 1.0).
///
/// Deserializes from either `{ "r", "g", "b", "a" }` or a hex string
/// (`"#RGB"`, `"#RRGGBB"` or `"#RRGGBBAA"`).
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ColorRepr")]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const TRANSPARENT: Color = Color::new(0.0, 0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0, 1.0);
    /// `#AAAAAA`, the default silhouette fill.
    pub const DARKER_GRAY: Color = Color::new(
        0xAA as f32 / 255.0,
        0xAA as f32 / 255.0,
        0xAA as f32 / 255.0,
        1.0,
    );

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn from_rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::new(
            r as f32 / 255.0,
            g as f32 / 255.0,
            b as f32 / 255.0,
            a as f32 / 255.0,
        )
    }

    /// Parses `#RGB`, `#RRGGBB` or `#RRGGBBAA`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim_start_matches('#');
        if !hex.is_ascii() {
            return None;
        }
        let byte = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
        match hex.len() {
            3 => {
                let nibble = |i: usize| u8::from_str_radix(hex.get(i..i + 1)?, 16).ok();
                Some(Self::from_rgba8(
                    nibble(0)? * 17,
                    nibble(1)? * 17,
                    nibble(2)? * 17,
                    255,
                ))
            }
            6 => Some(Self::from_rgba8(byte(0)?, byte(2)?, byte(4)?, 255)),
            8 => Some(Self::from_rgba8(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
            _ => None,
        }
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ColorRepr {
    Hex(String),
    Rgba {
        r: f32,
        g: f32,
        b: f32,
        #[serde(default = "opaque")]
        a: f32,
    },
}

fn opaque() -> f32 {
    1.0
}

impl TryFrom<ColorRepr> for Color {
    type Error = String;

    fn try_from(repr: ColorRepr) -> Result<Self, Self::Error> {
        match repr {
            ColorRepr::Hex(hex) => {
                Color::from_hex(&hex).ok_or_else(|| format!("invalid hex colour `{hex}`"))
            }
            ColorRepr::Rgba { r, g, b, a } => Ok(Color::new(r, g, b, a)),
        }
    }
}

/// Appearance and timing of a silhouette overlay.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    pub silhouette_color: Color,
    pub shimmer_color: Color,
    pub shimmer_period_ms: u64,
    /// Width of the shimmer band as a fraction of the silhouette width.
    pub shimmer_width: f64,
    pub cross_fade_enabled: bool,
    pub cross_fade_duration_ms: u64,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            silhouette_color: Color::DARKER_GRAY,
            shimmer_color: Color::WHITE,
            shimmer_period_ms: DEFAULT_SHIMMER_PERIOD.as_millis() as u64,
            shimmer_width: 0.33,
            cross_fade_enabled: true,
            cross_fade_duration_ms: 750,
        }
    }
}

impl OverlayConfig {
    pub fn from_json(json: &str) -> Result<Self, TraceError> {
        let config: OverlayConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), TraceError> {
        if !(self.shimmer_width > 0.0 && self.shimmer_width <= 1.0) {
            return Err(TraceError::Config(format!(
                "shimmer_width must be in (0, 1], got {}",
                self.shimmer_width
            )));
        }
        if self.shimmer_period_ms == 0 {
            return Err(TraceError::Config("shimmer_period_ms must be positive".into()));
        }
        Ok(())
    }

    pub fn shimmer_period(&self) -> Duration {
        Duration::from_millis(self.shimmer_period_ms)
    }

    pub fn cross_fade_duration(&self) -> Duration {
        Duration::from_millis(self.cross_fade_duration_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_colours() {
        assert_eq!(Color::from_hex("#fff"), Some(Color::WHITE));
        assert_eq!(Color::from_hex("AAAAAA"), Some(Color::DARKER_GRAY));
        assert_eq!(
            Color::from_hex("#00000000"),
            Some(Color::TRANSPARENT)
        );
        assert_eq!(Color::from_hex("#12345"), None);
        assert_eq!(Color::from_hex("#zzzzzz"), None);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = OverlayConfig::from_json(
            r##"{ "shimmer_color": "#ff0000", "cross_fade_enabled": false }"##,
        )
        .unwrap();
        assert_eq!(config.shimmer_color, Color::new(1.0, 0.0, 0.0, 1.0));
        assert!(!config.cross_fade_enabled);
        assert_eq!(config.silhouette_color, Color::DARKER_GRAY);
        assert_eq!(config.shimmer_period(), Duration::from_millis(1200));
        assert_eq!(config.cross_fade_duration(), Duration::from_millis(750));
    }

    #[test]
    fn struct_colours_default_to_opaque() {
        let config =
            OverlayConfig::from_json(r#"{ "silhouette_color": { "r": 0.5, "g": 0.5, "b": 0.5 } }"#)
                .unwrap();
        assert_eq!(config.silhouette_color, Color::new(0.5, 0.5, 0.5, 1.0));
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(matches!(
            OverlayConfig::from_json(r#"{ "shimmer_width": 0 }"#),
            Err(TraceError::Config(_))
        ));
        assert!(matches!(
            OverlayConfig::from_json(r#"{ "shimmer_period_ms": 0 }"#),
            Err(TraceError::Config(_))
        ));
        assert!(matches!(
            OverlayConfig::from_json(r##"{ "silhouette_color": "#xyz" }"##),
            Err(TraceError::Json(_))
        ));
    }
}
