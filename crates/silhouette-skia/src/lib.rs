//! # silhouette-skia
//!
//! Skia backend for silhouette overlays.
//!
//! - **Paths**: [`to_skia_path`] converts a traced silhouette into a nonzero
//!   `skia_safe::Path`; [`intersect`] and [`union`] run Skia's path ops.
//! - **Drawing**: [`OverlayRenderer`] fills the silhouette and, while the
//!   overlay shimmers, paints the highlight band masked to the silhouette.
//! - **Text**: [`SkiaTextMeasurer`] measures line ink widths with Skia fonts.

mod text;

pub use text::SkiaTextMeasurer;

use kurbo::{BezPath, PathEl};
use silhouette_core::{Color as CoreColor, Direction, Overlay, PathShape, SilhouettePath};
use skia_safe::{
    gradient_shader, surfaces, Canvas, Color, Color4f, EncodedImageFormat, Paint, PaintStyle,
    Path, PathDirection, PathFillType, PathOp, Point, Rect, TileMode,
};
use thiserror::Error;
use tracing::{debug, instrument};

/// Alpha of the shimmer highlight paint.
pub const SHIMMER_ALPHA: u8 = 0x40;

/// Gradient stops of the shimmer highlight.
const SHIMMER_STOPS: [f32; 5] = [0.0, 0.25, 0.5, 0.75, 1.0];

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to create surface")]
    SurfaceFailure,
    #[error("Failed to encode image")]
    EncodeFailure,
}

pub struct OverlayRenderer;

impl OverlayRenderer {
    /// Draws `overlay` onto `canvas`, in silhouette coordinates.
    #[instrument(level = "debug", skip_all)]
    pub fn draw(canvas: &Canvas, overlay: &Overlay) {
        let Some(silhouette) = overlay.silhouette() else {
            return;
        };
        let alpha = overlay.alpha();
        if alpha <= 0.0 {
            return;
        }

        let traced = to_skia_path(&silhouette.path);

        let fill_color = overlay.silhouette_color();
        let mut paint = Paint::default();
        paint.set_anti_alias(true);
        paint.set_style(PaintStyle::Fill);
        paint.set_color4f(to_color4f(fill_color), None);
        paint.set_alpha_f(sanitize(fill_color.a * alpha));
        canvas.draw_path(&traced, &paint);

        let Some(band) = overlay.shimmer_band() else {
            return;
        };
        let mut band_path = Path::new();
        band_path.add_rect(to_skia_rect(band), None);

        // Only the part of the band that lies on the silhouette shimmers.
        let Some(highlight) = band_path.op(&traced, PathOp::Intersect) else {
            debug!("shimmer intersect failed");
            return;
        };

        let mut shimmer = Paint::default();
        shimmer.set_anti_alias(true);
        shimmer.set_style(PaintStyle::Fill);
        shimmer.set_shader(shimmer_shader(
            overlay.shimmer_color(),
            silhouette.bounds.width() as f32,
        ));
        shimmer.set_alpha_f(sanitize(SHIMMER_ALPHA as f32 / 255.0 * alpha));
        canvas.draw_path(&highlight, &shimmer);
    }

    /// Renders `overlay` into a new raster surface and encodes it as PNG.
    pub fn render_png(
        overlay: &Overlay,
        (width, height): (i32, i32),
        background: Option<CoreColor>,
    ) -> Result<Vec<u8>, RenderError> {
        let mut surface =
            surfaces::raster_n32_premul((width, height)).ok_or(RenderError::SurfaceFailure)?;
        let canvas = surface.canvas();
        canvas.clear(background.map_or(Color::TRANSPARENT, to_skia_color));
        Self::draw(canvas, overlay);

        let image = surface.image_snapshot();
        let data = image
            .encode(None, EncodedImageFormat::PNG, 100)
            .ok_or(RenderError::EncodeFailure)?;
        Ok(data.as_bytes().to_vec())
    }
}

/// Repeating `[clear, shimmer, clear, shimmer, clear]` gradient across `width`.
fn shimmer_shader(color: CoreColor, width: f32) -> Option<skia_safe::Shader> {
    let on = to_skia_color(color);
    let off = to_skia_color(color.with_alpha(0.0));
    let colors: Vec<Color> = vec![off, on, off, on, off];
    gradient_shader::linear(
        (Point::new(0.0, 0.0), Point::new(sanitize(width).max(1.0), 0.0)),
        colors.as_slice(),
        Some(SHIMMER_STOPS.as_slice()),
        TileMode::Repeat,
        None,
        None,
    )
}

/// Converts a silhouette into a Skia path with nonzero winding.
pub fn to_skia_path(path: &SilhouettePath) -> Path {
    let mut out = Path::new();
    for shape in path.shapes() {
        match shape {
            PathShape::Rect { rect, direction } => {
                out.add_rect(to_skia_rect(*rect), Some((to_skia_direction(*direction), 0)));
            }
            PathShape::RoundedRect {
                rect,
                radius,
                direction,
            } => {
                let r = sanitize(*radius as f32);
                out.add_round_rect(to_skia_rect(*rect), (r, r), to_skia_direction(*direction));
            }
            PathShape::Circle {
                center,
                radius,
                direction,
            } => {
                out.add_circle(
                    (sanitize(center.x as f32), sanitize(center.y as f32)),
                    sanitize(*radius as f32),
                    to_skia_direction(*direction),
                );
            }
            PathShape::Path(bez) => {
                out.add_path(&kurbo_to_skia_path(bez), (0.0, 0.0), None);
            }
        }
    }
    out.set_fill_type(PathFillType::Winding);
    out
}

/// Boolean intersection of two silhouettes, or `None` if Skia cannot
/// resolve it.
pub fn intersect(a: &SilhouettePath, b: &SilhouettePath) -> Option<Path> {
    to_skia_path(a).op(&to_skia_path(b), PathOp::Intersect)
}

/// Boolean union of two silhouettes as a simplified outline.
pub fn union(a: &SilhouettePath, b: &SilhouettePath) -> Option<Path> {
    to_skia_path(a).op(&to_skia_path(b), PathOp::Union)
}

pub fn to_skia_color(color: CoreColor) -> Color {
    to_color4f(color).to_color()
}

pub fn to_color4f(color: CoreColor) -> Color4f {
    Color4f::new(
        sanitize(color.r),
        sanitize(color.g),
        sanitize(color.b),
        sanitize(color.a),
    )
}

fn to_skia_direction(direction: Direction) -> PathDirection {
    match direction {
        Direction::Clockwise => PathDirection::CW,
        Direction::CounterClockwise => PathDirection::CCW,
    }
}

fn to_skia_rect(rect: kurbo::Rect) -> Rect {
    Rect::new(
        sanitize(rect.x0 as f32),
        sanitize(rect.y0 as f32),
        sanitize(rect.x1 as f32),
        sanitize(rect.y1 as f32),
    )
}

fn sanitize(v: f32) -> f32 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

pub fn kurbo_to_skia_path(bez_path: &BezPath) -> Path {
    let mut path = Path::new();
    for el in bez_path.elements() {
        match el {
            PathEl::MoveTo(p) => {
                path.move_to((sanitize(p.x as f32), sanitize(p.y as f32)));
            }
            PathEl::LineTo(p) => {
                path.line_to((sanitize(p.x as f32), sanitize(p.y as f32)));
            }
            PathEl::QuadTo(p1, p2) => {
                path.quad_to(
                    (sanitize(p1.x as f32), sanitize(p1.y as f32)),
                    (sanitize(p2.x as f32), sanitize(p2.y as f32)),
                );
            }
            PathEl::CurveTo(p1, p2, p3) => {
                path.cubic_to(
                    (sanitize(p1.x as f32), sanitize(p1.y as f32)),
                    (sanitize(p2.x as f32), sanitize(p2.y as f32)),
                    (sanitize(p3.x as f32), sanitize(p3.y as f32)),
                );
            }
            PathEl::ClosePath => {
                path.close();
            }
        }
    }
    path
}
