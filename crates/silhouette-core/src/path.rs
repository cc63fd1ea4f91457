//! # Path Module
//!
//! The composite vector shape a trace pass produces.
//!
//! ## Responsibilities
//! - **Append**: rectangles, rounded rectangles, circles and free-form sub-paths.
//! - **Bounds**: union of every appended shape's bounds.
//! - **Reservation**: the CW + CCW rectangle pair that widens bounds without filling.
//! - **Flattening**: conversion to a single `kurbo::BezPath` with winding preserved.
//!
//! Boolean intersection lives in the rendering backend; `union` here is an
//! append under nonzero winding.

use kurbo::{Affine, BezPath, Circle, Point, Rect, RoundedRect, Shape as _, Vec2};
use serde::{Deserialize, Serialize};

use crate::node::Traceable;

/// Tolerance used when flattening curves into path elements.
const FLATTEN_TOLERANCE: f64 = 0.1;

/// Winding direction of an appended shape, in y-down screen coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    #[default]
    Clockwise,
    CounterClockwise,
}

impl Direction {
    pub fn reversed(self) -> Self {
        match self {
            Direction::Clockwise => Direction::CounterClockwise,
            Direction::CounterClockwise => Direction::Clockwise,
        }
    }
}

/// A single primitive appended to a [`SilhouettePath`].
#[derive(Clone, Debug, PartialEq)]
pub enum PathShape {
    Rect {
        rect: Rect,
        direction: Direction,
    },
    RoundedRect {
        rect: Rect,
        radius: f64,
        direction: Direction,
    },
    Circle {
        center: Point,
        radius: f64,
        direction: Direction,
    },
    Path(BezPath),
}

impl PathShape {
    /// Axis-aligned bounds of the shape, or `None` for an empty free-form path.
    pub fn bounds(&self) -> Option<Rect> {
        match self {
            PathShape::Rect { rect, .. } | PathShape::RoundedRect { rect, .. } => Some(*rect),
            PathShape::Circle { center, radius, .. } => Some(Rect::new(
                center.x - radius,
                center.y - radius,
                center.x + radius,
                center.y + radius,
            )),
            PathShape::Path(path) => {
                if path.elements().is_empty() {
                    None
                } else {
                    Some(path.bounding_box())
                }
            }
        }
    }

    pub fn translate(&mut self, delta: Vec2) {
        match self {
            PathShape::Rect { rect, .. } | PathShape::RoundedRect { rect, .. } => {
                *rect = *rect + delta;
            }
            PathShape::Circle { center, .. } => *center += delta,
            PathShape::Path(path) => path.apply_affine(Affine::translate(delta)),
        }
    }

    pub fn direction(&self) -> Option<Direction> {
        match self {
            PathShape::Rect { direction, .. }
            | PathShape::RoundedRect { direction, .. }
            | PathShape::Circle { direction, .. } => Some(*direction),
            PathShape::Path(_) => None,
        }
    }

    /// Flattens the shape into path elements, honouring its winding direction.
    pub fn to_bez_path(&self) -> BezPath {
        match self {
            PathShape::Rect { rect, direction } => rect_path(*rect, *direction),
            PathShape::RoundedRect {
                rect,
                radius,
                direction,
            } => {
                let mut path = RoundedRect::from_rect(*rect, *radius).to_path(FLATTEN_TOLERANCE);
                if *direction == Direction::CounterClockwise {
                    path.apply_affine(mirror_about(rect.center()));
                }
                path
            }
            PathShape::Circle {
                center,
                radius,
                direction,
            } => {
                let mut path = Circle::new(*center, *radius).to_path(FLATTEN_TOLERANCE);
                if *direction == Direction::CounterClockwise {
                    path.apply_affine(mirror_about(*center));
                }
                path
            }
            PathShape::Path(path) => path.clone(),
        }
    }

    fn cancels(&self, other: &PathShape) -> bool {
        match (self, other) {
            (
                PathShape::Rect {
                    rect: a,
                    direction: da,
                },
                PathShape::Rect {
                    rect: b,
                    direction: db,
                },
            ) => a == b && *da == db.reversed(),
            _ => false,
        }
    }
}

fn rect_path(rect: Rect, direction: Direction) -> BezPath {
    let mut path = BezPath::new();
    path.move_to((rect.x0, rect.y0));
    match direction {
        Direction::Clockwise => {
            path.line_to((rect.x1, rect.y0));
            path.line_to((rect.x1, rect.y1));
            path.line_to((rect.x0, rect.y1));
        }
        Direction::CounterClockwise => {
            path.line_to((rect.x0, rect.y1));
            path.line_to((rect.x1, rect.y1));
            path.line_to((rect.x1, rect.y0));
        }
    }
    path.close_path();
    path
}

// Reflecting a symmetric shape about its own vertical axis keeps its outline
// and reverses its winding.
fn mirror_about(center: Point) -> Affine {
    let c = center.to_vec2();
    Affine::translate(c) * Affine::scale_non_uniform(-1.0, 1.0) * Affine::translate(-c)
}

fn has_area(rect: &Rect) -> bool {
    rect.width() > 0.0 && rect.height() > 0.0
}

/// An ordered set of primitive shapes forming one silhouette region.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SilhouettePath {
    shapes: Vec<PathShape>,
}

impl SilhouettePath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shapes(&self) -> &[PathShape] {
        &self.shapes
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn clear(&mut self) {
        self.shapes.clear();
    }

    /// Appends a rectangle. Rectangles without area are dropped.
    pub fn add_rect(&mut self, rect: Rect, direction: Direction) -> &mut Self {
        if has_area(&rect) {
            self.shapes.push(PathShape::Rect { rect, direction });
        }
        self
    }

    /// Appends a rounded rectangle. Rectangles without area are dropped.
    pub fn add_round_rect(&mut self, rect: Rect, radius: f64, direction: Direction) -> &mut Self {
        if has_area(&rect) {
            self.shapes.push(PathShape::RoundedRect {
                rect,
                radius: radius.max(0.0),
                direction,
            });
        }
        self
    }

    pub fn add_circle(&mut self, center: Point, radius: f64, direction: Direction) -> &mut Self {
        if radius > 0.0 {
            self.shapes.push(PathShape::Circle {
                center,
                radius,
                direction,
            });
        }
        self
    }

    pub fn add_bez_path(&mut self, path: BezPath) -> &mut Self {
        if !path.elements().is_empty() {
            self.shapes.push(PathShape::Path(path));
        }
        self
    }

    /// Appends a copy of `other`, translated by `offset`.
    pub fn add_path(&mut self, other: &SilhouettePath, offset: Vec2) -> &mut Self {
        self.shapes.extend(other.shapes.iter().cloned().map(|mut shape| {
            shape.translate(offset);
            shape
        }));
        self
    }

    /// Combines `other` into this path. Overlaps fill once under nonzero winding.
    pub fn union(&mut self, other: &SilhouettePath) -> &mut Self {
        self.add_path(other, Vec2::ZERO)
    }

    /// Widens the bounds to cover `rect` without filling any pixels.
    ///
    /// Appends the same rectangle twice with opposite winding, which cancels
    /// out under nonzero fill.
    pub fn reserve_bounds(&mut self, rect: Rect) -> &mut Self {
        if has_area(&rect) {
            self.shapes.push(PathShape::Rect {
                rect,
                direction: Direction::Clockwise,
            });
            self.shapes.push(PathShape::Rect {
                rect,
                direction: Direction::CounterClockwise,
            });
        }
        self
    }

    pub fn translate(&mut self, delta: Vec2) {
        for shape in &mut self.shapes {
            shape.translate(delta);
        }
    }

    pub fn translated(&self, delta: Vec2) -> Self {
        let mut copy = self.clone();
        copy.translate(delta);
        copy
    }

    /// Union of the bounds of every appended shape; `Rect::ZERO` when empty.
    pub fn bounds(&self) -> Rect {
        self.shapes
            .iter()
            .filter_map(PathShape::bounds)
            .reduce(|acc, b| acc.union(b))
            .unwrap_or(Rect::ZERO)
    }

    /// Shapes that contribute fill, i.e. everything but cancelled reservation pairs.
    pub fn visible_shapes(&self) -> Vec<&PathShape> {
        let mut visible = Vec::with_capacity(self.shapes.len());
        let mut i = 0;
        while i < self.shapes.len() {
            if let Some(next) = self.shapes.get(i + 1) {
                if self.shapes[i].cancels(next) {
                    i += 2;
                    continue;
                }
            }
            visible.push(&self.shapes[i]);
            i += 1;
        }
        visible
    }

    pub fn to_bez_path(&self) -> BezPath {
        let mut path = BezPath::new();
        for shape in &self.shapes {
            path.extend(shape.to_bez_path());
        }
        path
    }
}

impl Traceable for SilhouettePath {
    fn trace(&self) -> SilhouettePath {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signed_area(path: &BezPath) -> f64 {
        path.area()
    }

    #[test]
    fn bounds_cover_all_shapes() {
        let mut path = SilhouettePath::new();
        path.add_rect(Rect::new(10.0, 10.0, 20.0, 20.0), Direction::Clockwise);
        path.add_circle(Point::new(50.0, 50.0), 5.0, Direction::Clockwise);
        assert_eq!(path.bounds(), Rect::new(10.0, 10.0, 55.0, 55.0));
    }

    #[test]
    fn empty_path_has_zero_bounds() {
        assert_eq!(SilhouettePath::new().bounds(), Rect::ZERO);
    }

    #[test]
    fn degenerate_shapes_are_dropped() {
        let mut path = SilhouettePath::new();
        path.add_round_rect(Rect::new(2.5, 2.5, -2.5, 10.0), 1.0, Direction::Clockwise);
        path.add_rect(Rect::new(0.0, 0.0, 0.0, 10.0), Direction::Clockwise);
        path.add_circle(Point::ZERO, 0.0, Direction::Clockwise);
        path.reserve_bounds(Rect::new(5.0, 5.0, 5.0, 5.0));
        assert!(path.is_empty());
    }

    #[test]
    fn reservation_pair_widens_bounds_but_is_not_visible() {
        let mut path = SilhouettePath::new();
        path.reserve_bounds(Rect::new(0.0, 0.0, 100.0, 40.0));
        path.add_round_rect(Rect::new(10.0, 10.0, 20.0, 20.0), 2.0, Direction::Clockwise);

        assert_eq!(path.bounds(), Rect::new(0.0, 0.0, 100.0, 40.0));
        let visible = path.visible_shapes();
        assert_eq!(visible.len(), 1);
        assert!(matches!(visible[0], PathShape::RoundedRect { .. }));

        let reserve = SilhouettePath::new()
            .reserve_bounds(Rect::new(0.0, 0.0, 100.0, 40.0))
            .to_bez_path();
        assert!(signed_area(&reserve).abs() < 1e-9);
    }

    #[test]
    fn counter_clockwise_shapes_have_opposite_area_sign() {
        let rect = Rect::new(0.0, 0.0, 40.0, 20.0);
        for (cw, ccw) in [
            (
                PathShape::RoundedRect {
                    rect,
                    radius: 4.0,
                    direction: Direction::Clockwise,
                },
                PathShape::RoundedRect {
                    rect,
                    radius: 4.0,
                    direction: Direction::CounterClockwise,
                },
            ),
            (
                PathShape::Circle {
                    center: Point::new(10.0, 10.0),
                    radius: 5.0,
                    direction: Direction::Clockwise,
                },
                PathShape::Circle {
                    center: Point::new(10.0, 10.0),
                    radius: 5.0,
                    direction: Direction::CounterClockwise,
                },
            ),
        ] {
            let a = signed_area(&cw.to_bez_path());
            let b = signed_area(&ccw.to_bez_path());
            assert!((a + b).abs() < 1e-6, "{a} vs {b}");
            assert_eq!(cw.bounds(), ccw.bounds());
        }
    }

    #[test]
    fn add_path_translates_copy() {
        let mut own = SilhouettePath::new();
        own.add_circle(Point::new(5.0, 5.0), 5.0, Direction::Clockwise);

        let mut path = SilhouettePath::new();
        path.add_path(&own, Vec2::new(30.0, 10.0));

        assert_eq!(path.bounds(), Rect::new(30.0, 10.0, 40.0, 20.0));
        assert_eq!(own.bounds(), Rect::new(0.0, 0.0, 10.0, 10.0));
    }
}
