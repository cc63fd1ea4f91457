//! # Default Shape Strategy
//!
//! Geometry heuristics for nodes that do not trace themselves.
//!
//! | Capability | Geometry |
//! |---|---|
//! | Checkbox | Rounded square at the glyph position, plus the label lines. |
//! | RadioButton | Circle at the glyph centre, plus the label lines. |
//! | Button / Generic | One inset rounded rectangle over the node box. |
//! | MultilineText | One inset rounded rectangle per visible line. |

use std::rc::Rc;

use kurbo::{Point, Rect};
use tracing::warn;

use crate::delegate::{Exclusion, ShapeDelegate};
use crate::node::{Capability, Glyph, HorizontalGravity, Node, TextContent, VerticalGravity};
use crate::path::{Direction, SilhouettePath};
use crate::text::TextMeasurer;

/// Inset applied on every edge so silhouette shapes do not touch node edges.
pub const SPACE: f64 = 2.5;

/// Corner radius of text line and checkbox shapes.
pub const CORNER_RADIUS: f64 = 10.0;

/// Corner radius of simple shapes, as a fraction of the node's shorter side.
pub const SIMPLE_RADIUS_FACTOR: f64 = 0.075;

/// Radio dot radius, as a fraction of the glyph width.
pub const RADIO_RADIUS_FACTOR: f64 = 0.33;

/// Built-in per-capability silhouette synthesis. Always handles the node.
#[derive(Clone)]
pub struct DefaultShapeStrategy {
    measurer: Rc<dyn TextMeasurer>,
}

impl DefaultShapeStrategy {
    pub fn new(measurer: Rc<dyn TextMeasurer>) -> Self {
        Self { measurer }
    }

    /// Appends the silhouette of `node` at `offset` according to its capability.
    pub fn append(&self, node: &Node, path: &mut SilhouettePath, offset: Point) {
        match node.capability() {
            Capability::Checkbox { glyph, text } => {
                if let Some(glyph) = glyph {
                    checkbox_glyph(node, glyph, path, offset);
                }
                self.multiline_text(node, text, glyph, path, offset);
            }
            Capability::RadioButton { glyph, text } => {
                if let Some(glyph) = glyph {
                    radio_glyph(node, glyph, path, offset);
                }
                self.multiline_text(node, text, glyph, path, offset);
            }
            Capability::MultilineText(text) => self.multiline_text(node, text, None, path, offset),
            Capability::Button
            | Capability::Generic
            | Capability::Container(_)
            | Capability::CustomTraceable(_) => simple_shape(node, path, offset),
        }
    }

    /// Appends one rounded rectangle per visible text line.
    ///
    /// The text region excludes the leading `glyph`, if any. Only lines that
    /// fit entirely in the node are emitted, so no line overflows it.
    pub fn multiline_text(
        &self,
        node: &Node,
        text: &TextContent,
        glyph: Option<Glyph>,
        path: &mut SilhouettePath,
        offset: Point,
    ) {
        let width = node.width();
        let height = node.height();
        let glyph_width = glyph.map_or(0.0, |g| g.width);

        let text_bounds = if node.layout_direction.is_rtl() {
            Rect::new(offset.x, offset.y, offset.x + width - glyph_width, offset.y + height)
        } else {
            Rect::new(offset.x + glyph_width, offset.y, offset.x + width, offset.y + height)
        };

        let line_height = text.line_height;
        if line_height <= 0.0 || text_bounds.width() <= 0.0 {
            return;
        }

        let fitting = (text_bounds.height() / line_height).floor().max(0.0) as usize;
        let visible_lines = text.max_lines.min(text.line_count()).min(fitting);
        let used_height = line_height * visible_lines as f64;

        let y_offset = match text.vertical_gravity {
            VerticalGravity::Top => 0.0,
            VerticalGravity::Center => (height - used_height) / 2.0,
            VerticalGravity::Bottom => height - used_height,
        };
        let horizontal = text.horizontal_gravity.resolve(node.layout_direction);

        for line in 0..visible_lines {
            let Some(line_text) = text.line_text(line) else {
                warn!(line, "skipping text line with an invalid span");
                continue;
            };
            let line_width = self
                .measurer
                .measure(line_text.trim_end(), &text.font_family, text.font_size)
                as f64;

            let x_offset = match horizontal {
                HorizontalGravity::Center => (text_bounds.width() - line_width) / 2.0,
                HorizontalGravity::Right => text_bounds.width() - line_width,
                _ => 0.0,
            };

            let line_offset = line as f64 * line_height;
            let line_bottom = text_bounds.y0 + y_offset + line_height - SPACE + line_offset;

            let rect = Rect::new(
                text_bounds.x0 + x_offset + SPACE,
                text_bounds.y0 + y_offset + line_offset + SPACE,
                text_bounds.x0 + x_offset + line_width - SPACE,
                line_bottom,
            );
            path.add_round_rect(rect, CORNER_RADIUS, Direction::Clockwise);
        }
    }
}

impl ShapeDelegate for DefaultShapeStrategy {
    fn handle(
        &self,
        node: &Node,
        path: &mut SilhouettePath,
        _exclusion: &Exclusion,
        offset: Point,
    ) -> bool {
        if node.is_visible() {
            self.append(node, path, offset);
        }
        true
    }
}

impl std::fmt::Debug for DefaultShapeStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DefaultShapeStrategy").finish_non_exhaustive()
    }
}

/// Inset rounded rectangle over the whole node box.
pub fn simple_shape(node: &Node, path: &mut SilhouettePath, offset: Point) {
    let width = node.width();
    let height = node.height();
    let rect = Rect::new(
        offset.x + SPACE,
        offset.y + SPACE,
        offset.x + width - SPACE,
        offset.y + height - SPACE,
    );
    let radius = width.min(height) * SIMPLE_RADIUS_FACTOR;
    path.add_round_rect(rect, radius, Direction::Clockwise);
}

fn checkbox_glyph(node: &Node, glyph: Glyph, path: &mut SilhouettePath, offset: Point) {
    let inset_x = glyph.width / 4.0;
    let size_x = glyph.width / 2.0;
    let size_y = glyph.height / 2.0;
    let center_y = offset.y + node.height() / 2.0;

    let (left, right) = if node.layout_direction.is_rtl() {
        let right = offset.x + node.width() - inset_x;
        (right - size_x, right)
    } else {
        let left = offset.x + inset_x;
        (left, left + size_x)
    };

    let rect = Rect::new(left, center_y - size_y / 2.0, right, center_y + size_y / 2.0);
    path.add_round_rect(rect, CORNER_RADIUS, Direction::Clockwise);
}

fn radio_glyph(node: &Node, glyph: Glyph, path: &mut SilhouettePath, offset: Point) {
    let center_x = if node.layout_direction.is_rtl() {
        offset.x + node.width() - glyph.width / 2.0
    } else {
        offset.x + glyph.width / 2.0
    };
    let center = Point::new(center_x, offset.y + node.height() / 2.0);
    path.add_circle(center, RADIO_RADIUS_FACTOR * glyph.width, Direction::Clockwise);
}
