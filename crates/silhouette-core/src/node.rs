//! # Node Module
//!
//! The host UI tree as seen by a trace pass.
//!
//! Nodes are a snapshot taken after the host's layout pass has settled; the
//! tracer only borrows them for the duration of one pass.
//!
//! ## Key Types
//! - `Node`: bounds, insets, visibility, direction, kind and children.
//! - `NodeKind`: the host-declared widget kind.
//! - `Capability`: the resolved geometry variant, with custom tracing first.
//! - `TextContent`: pre-wrapped text and its line metrics.

use std::fmt;
use std::rc::Rc;

use kurbo::{Rect, Size};
use serde::{Deserialize, Serialize};

use crate::path::SilhouettePath;

/// Opaque node identifier, unique within one tree snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for NodeId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Edge insets (margin or padding).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Insets {
    #[serde(default)]
    pub left: f64,
    #[serde(default)]
    pub top: f64,
    #[serde(default)]
    pub right: f64,
    #[serde(default)]
    pub bottom: f64,
}

impl Insets {
    pub const ZERO: Insets = Insets {
        left: 0.0,
        top: 0.0,
        right: 0.0,
        bottom: 0.0,
    };

    pub fn uniform(value: f64) -> Self {
        Self {
            left: value,
            top: value,
            right: value,
            bottom: value,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    #[default]
    Visible,
    /// Invisible but still occupying layout space.
    Hidden,
    /// Removed from layout entirely.
    Collapsed,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutDirection {
    #[default]
    LeftToRight,
    RightToLeft,
}

impl LayoutDirection {
    pub fn is_rtl(self) -> bool {
        self == LayoutDirection::RightToLeft
    }
}

/// Horizontal text gravity. `Start` and `End` follow the layout direction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HorizontalGravity {
    Left,
    Center,
    Right,
    #[default]
    Start,
    End,
}

impl HorizontalGravity {
    /// Resolves relative gravity to `Left`, `Center` or `Right`.
    pub fn resolve(self, direction: LayoutDirection) -> HorizontalGravity {
        match (self, direction) {
            (HorizontalGravity::Start, LayoutDirection::LeftToRight)
            | (HorizontalGravity::End, LayoutDirection::RightToLeft) => HorizontalGravity::Left,
            (HorizontalGravity::Start, LayoutDirection::RightToLeft)
            | (HorizontalGravity::End, LayoutDirection::LeftToRight) => HorizontalGravity::Right,
            (absolute, _) => absolute,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerticalGravity {
    #[default]
    Top,
    Center,
    Bottom,
}

/// Byte range of one wrapped line within `TextContent::text`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineSpan {
    pub start: usize,
    pub end: usize,
}

/// Text and line metrics of a text-bearing node, as laid out by the host.
#[derive(Clone, Debug, PartialEq)]
pub struct TextContent {
    pub text: String,
    pub lines: Vec<LineSpan>,
    pub line_height: f64,
    pub max_lines: usize,
    pub horizontal_gravity: HorizontalGravity,
    pub vertical_gravity: VerticalGravity,
    pub font_family: String,
    pub font_size: f32,
}

impl TextContent {
    /// Creates text content with one line per `\n`-separated segment.
    pub fn new(text: impl Into<String>, line_height: f64) -> Self {
        let text = text.into();
        let mut lines = Vec::new();
        let mut start = 0;
        for (idx, _) in text.match_indices('\n') {
            lines.push(LineSpan { start, end: idx });
            start = idx + 1;
        }
        lines.push(LineSpan {
            start,
            end: text.len(),
        });

        Self {
            text,
            lines,
            line_height,
            max_lines: usize::MAX,
            horizontal_gravity: HorizontalGravity::default(),
            vertical_gravity: VerticalGravity::default(),
            font_family: String::new(),
            font_size: 14.0,
        }
    }

    /// Replaces the line spans with the host's own wrapping.
    pub fn with_lines(mut self, lines: Vec<LineSpan>) -> Self {
        self.lines = lines;
        self
    }

    pub fn with_max_lines(mut self, max_lines: usize) -> Self {
        self.max_lines = max_lines;
        self
    }

    pub fn with_gravity(mut self, horizontal: HorizontalGravity, vertical: VerticalGravity) -> Self {
        self.horizontal_gravity = horizontal;
        self.vertical_gravity = vertical;
        self
    }

    pub fn with_font(mut self, family: impl Into<String>, size: f32) -> Self {
        self.font_family = family.into();
        self.font_size = size;
        self
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Text of line `index`, or `None` if the span is out of range or not on a
    /// character boundary.
    pub fn line_text(&self, index: usize) -> Option<&str> {
        let span = self.lines.get(index)?;
        self.text.get(span.start..span.end)
    }
}

/// Intrinsic size of a compound button's control glyph (checkbox box, radio dot).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Glyph {
    pub width: f64,
    pub height: f64,
}

/// Widget kind declared by the host.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    Container,
    Checkbox {
        glyph: Option<Glyph>,
        text: TextContent,
    },
    RadioButton {
        glyph: Option<Glyph>,
        text: TextContent,
    },
    Button,
    Text(TextContent),
    Generic,
}

/// A node that supplies its own silhouette in its local coordinate space
/// (origin at its own top-left).
pub trait Traceable: fmt::Debug {
    fn trace(&self) -> SilhouettePath;
}

/// The geometry variant a node is routed to.
#[derive(Clone, Copy, Debug)]
pub enum Capability<'a> {
    CustomTraceable(&'a dyn Traceable),
    Container(&'a [Node]),
    Checkbox {
        glyph: Option<Glyph>,
        text: &'a TextContent,
    },
    RadioButton {
        glyph: Option<Glyph>,
        text: &'a TextContent,
    },
    Button,
    MultilineText(&'a TextContent),
    Generic,
}

/// One node of the host tree.
#[derive(Clone, Debug)]
pub struct Node {
    pub id: Option<NodeId>,
    /// Bounds in the parent's local space. Under a right-to-left parent, `x0`
    /// is the inset of this node's leading (right) edge from the parent's.
    pub bounds: Rect,
    pub margin: Insets,
    pub padding: Insets,
    pub visibility: Visibility,
    pub layout_direction: LayoutDirection,
    pub enabled: bool,
    pub kind: NodeKind,
    pub custom: Option<Rc<dyn Traceable>>,
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(bounds: Rect, kind: NodeKind) -> Self {
        Self {
            id: None,
            bounds,
            margin: Insets::ZERO,
            padding: Insets::ZERO,
            visibility: Visibility::Visible,
            layout_direction: LayoutDirection::LeftToRight,
            enabled: true,
            kind,
            custom: None,
            children: Vec::new(),
        }
    }

    pub fn generic(bounds: Rect) -> Self {
        Self::new(bounds, NodeKind::Generic)
    }

    pub fn button(bounds: Rect) -> Self {
        Self::new(bounds, NodeKind::Button)
    }

    pub fn text(bounds: Rect, text: TextContent) -> Self {
        Self::new(bounds, NodeKind::Text(text))
    }

    pub fn checkbox(bounds: Rect, glyph: Option<Glyph>, text: TextContent) -> Self {
        Self::new(bounds, NodeKind::Checkbox { glyph, text })
    }

    pub fn radio_button(bounds: Rect, glyph: Option<Glyph>, text: TextContent) -> Self {
        Self::new(bounds, NodeKind::RadioButton { glyph, text })
    }

    pub fn container(bounds: Rect, children: Vec<Node>) -> Self {
        let mut node = Self::new(bounds, NodeKind::Container);
        node.children = children;
        node
    }

    pub fn with_id(mut self, id: impl Into<NodeId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn with_direction(mut self, direction: LayoutDirection) -> Self {
        self.layout_direction = direction;
        self
    }

    pub fn with_margin(mut self, margin: Insets) -> Self {
        self.margin = margin;
        self
    }

    pub fn with_padding(mut self, padding: Insets) -> Self {
        self.padding = padding;
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_custom(mut self, custom: Rc<dyn Traceable>) -> Self {
        self.custom = Some(custom);
        self
    }

    pub fn width(&self) -> f64 {
        self.bounds.width()
    }

    pub fn height(&self) -> f64 {
        self.bounds.height()
    }

    pub fn size(&self) -> Size {
        self.bounds.size()
    }

    pub fn is_visible(&self) -> bool {
        self.visibility == Visibility::Visible
    }

    pub fn is_container(&self) -> bool {
        matches!(self.kind, NodeKind::Container)
    }

    /// Resolves the geometry variant. Custom tracing wins over every kind.
    pub fn capability(&self) -> Capability<'_> {
        if let Some(custom) = &self.custom {
            return Capability::CustomTraceable(custom.as_ref());
        }
        match &self.kind {
            NodeKind::Container => Capability::Container(&self.children),
            NodeKind::Checkbox { glyph, text } => Capability::Checkbox {
                glyph: *glyph,
                text,
            },
            NodeKind::RadioButton { glyph, text } => Capability::RadioButton {
                glyph: *glyph,
                text,
            },
            NodeKind::Button => Capability::Button,
            NodeKind::Text(text) => Capability::MultilineText(text),
            NodeKind::Generic => Capability::Generic,
        }
    }

    /// Depth-first iterator over this node and its descendants.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }
}

pub struct Descendants<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}
