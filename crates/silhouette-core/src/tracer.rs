//! # Silhouette Tracer
//!
//! Walks a node tree and synthesizes one composite silhouette path.
//!
//! ## Process
//! 1. **Root offset**: the root's margin and its parent's padding are removed
//!    so the silhouette's local origin is `(0, 0)`.
//! 2. **Visit**: every node reserves its full box in the path bounds, then
//!    either stops (excluded / not visible), appends its custom trace, recurses
//!    into its children, or hands off to the delegate and default strategy.
//! 3. **Bounds**: the union bounds of the composite path.
//!
//! Offsets are pure recursion state; nothing is written back to the nodes.

use std::rc::Rc;

use kurbo::{Point, Rect, Vec2};
use tracing::{debug, instrument, trace};

use crate::delegate::{Exclusion, ShapeDelegate};
use crate::node::{Capability, Insets, LayoutDirection, Node, Visibility};
use crate::path::SilhouettePath;
use crate::strategy::DefaultShapeStrategy;
use crate::text::TextMeasurer;

/// Result of one trace pass.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Silhouette {
    pub path: SilhouettePath,
    pub bounds: Rect,
}

impl Silhouette {
    pub fn width(&self) -> f64 {
        self.bounds.width()
    }

    pub fn height(&self) -> f64 {
        self.bounds.height()
    }
}

/// Absolute box of a container, handed to its children.
#[derive(Clone, Copy, Debug)]
struct ParentFrame {
    origin: Point,
    width: f64,
    direction: LayoutDirection,
}

impl ParentFrame {
    /// Absolute top-left of `child`, clamped to the root's origin.
    fn place(&self, child: &Node) -> Point {
        let left = match self.direction {
            LayoutDirection::LeftToRight => self.origin.x + child.bounds.x0,
            LayoutDirection::RightToLeft => {
                self.origin.x + self.width - child.bounds.x0 - child.width()
            }
        };
        Point::new(left.max(0.0), (self.origin.y + child.bounds.y0).max(0.0))
    }
}

/// Produces silhouettes from node trees.
///
/// The tracer is reusable; each call to [`trace`](Self::trace) starts from an
/// empty path.
pub struct SilhouetteTracer {
    exclusion: Exclusion,
    delegate: Option<Rc<dyn ShapeDelegate>>,
    default_strategy: DefaultShapeStrategy,
    parent_padding: Insets,
}

impl SilhouetteTracer {
    pub fn new(measurer: Rc<dyn TextMeasurer>) -> Self {
        Self {
            exclusion: Exclusion::None,
            delegate: None,
            default_strategy: DefaultShapeStrategy::new(measurer),
            parent_padding: Insets::ZERO,
        }
    }

    pub fn with_exclusion(mut self, exclusion: Exclusion) -> Self {
        self.exclusion = exclusion;
        self
    }

    /// Installs a strategy consulted before the default one for every leaf.
    pub fn with_delegate(mut self, delegate: Rc<dyn ShapeDelegate>) -> Self {
        self.delegate = Some(delegate);
        self
    }

    /// Padding of the root's parent, removed from the root's offset.
    pub fn with_parent_padding(mut self, padding: Insets) -> Self {
        self.parent_padding = padding;
        self
    }

    pub fn exclusion(&self) -> &Exclusion {
        &self.exclusion
    }

    /// Traces `root` and its visible, non-excluded descendants.
    #[instrument(level = "debug", skip_all, fields(root = ?root.id))]
    pub fn trace(&self, root: &Node) -> Silhouette {
        let mut path = SilhouettePath::new();
        let origin = self.root_origin(root);
        self.visit(root, origin, &mut path);

        let bounds = path.bounds();
        debug!(
            shapes = path.len(),
            width = bounds.width(),
            height = bounds.height(),
            "trace complete"
        );
        Silhouette { path, bounds }
    }

    fn root_origin(&self, root: &Node) -> Point {
        let mut x = -(root.margin.left + self.parent_padding.left);
        let y = -(root.margin.top + self.parent_padding.top);
        if root.layout_direction.is_rtl() {
            x -= root.bounds.x0;
        }
        Point::new(
            (x + root.bounds.x0).max(0.0),
            (y + root.bounds.y0).max(0.0),
        )
    }

    fn visit(&self, node: &Node, origin: Point, path: &mut SilhouettePath) {
        if node.visibility == Visibility::Collapsed {
            trace!(id = ?node.id, "collapsed, skipping");
            return;
        }

        path.reserve_bounds(Rect::from_origin_size(origin, node.size()));

        if !node.is_visible() || self.exclusion.excludes(node) {
            debug!(id = ?node.id, visibility = ?node.visibility, "excluded from trace");
            return;
        }

        match node.capability() {
            Capability::CustomTraceable(custom) => {
                let own = custom.trace();
                let x = if node.layout_direction.is_rtl() {
                    origin.x + node.width() - own.bounds().width()
                } else {
                    origin.x
                };
                path.add_path(&own, Vec2::new(x, origin.y));
            }
            Capability::Container(children) => {
                let frame = ParentFrame {
                    origin,
                    width: node.width(),
                    direction: node.layout_direction,
                };
                for child in children {
                    self.visit(child, frame.place(child), path);
                }
            }
            _ => {
                if let Some(delegate) = &self.delegate {
                    if delegate.handle(node, path, &self.exclusion, origin) {
                        return;
                    }
                }
                self.default_strategy.append(node, path, origin);
            }
        }
    }
}

impl std::fmt::Debug for SilhouetteTracer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SilhouetteTracer")
            .field("exclusion", &self.exclusion)
            .field("has_delegate", &self.delegate.is_some())
            .field("parent_padding", &self.parent_padding)
            .finish()
    }
}
