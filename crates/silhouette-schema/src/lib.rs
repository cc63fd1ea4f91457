use std::rc::Rc;

use kurbo::{BezPath, Point, Rect};
use serde::{Deserialize, Serialize};
use silhouette_core::{
    Color, Direction, Exclusion, Glyph, HorizontalGravity, Insets, LayoutDirection, LineSpan,
    Node, NodeKind, OverlayConfig, SilhouettePath, SilhouetteTracer, TextContent, TextMeasurer,
    TraceError, VerticalGravity, Visibility,
};

/// A node tree to trace plus everything needed to render its overlay.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TraceRequest {
    /// Output surface width in pixels
    pub width: u32,
    /// Output surface height in pixels
    pub height: u32,
    #[serde(default)]
    pub background: Option<Color>,
    #[serde(default)]
    pub overlay: OverlayConfig,
    /// Ids of nodes whose subtrees are left out of the silhouette
    #[serde(default)]
    pub exclude: Vec<String>,
    /// Padding of the view hosting the root, removed from the root origin
    #[serde(default)]
    pub parent_padding: Insets,
    pub root: NodeSpec,
}

impl TraceRequest {
    pub fn from_json(json: &str) -> Result<Self, TraceError> {
        let request: TraceRequest = serde_json::from_str(json)?;
        request.overlay.validate()?;
        Ok(request)
    }

    pub fn exclusion(&self) -> Exclusion {
        if self.exclude.is_empty() {
            Exclusion::None
        } else {
            Exclusion::ids(self.exclude.iter().cloned())
        }
    }

    /// Builds a tracer configured with this request's exclusions and padding.
    pub fn tracer(&self, measurer: Rc<dyn TextMeasurer>) -> SilhouetteTracer {
        SilhouetteTracer::new(measurer)
            .with_exclusion(self.exclusion())
            .with_parent_padding(self.parent_padding)
    }

    pub fn root_node(&self) -> Result<Node, TraceError> {
        self.root.to_node()
    }
}

/// Position of a node relative to its parent's leading edge.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq)]
pub struct BoundsSpec {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundsSpec {
    pub fn to_rect(self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct NodeSpec {
    #[serde(default)]
    pub id: Option<String>,
    pub bounds: BoundsSpec,
    #[serde(default)]
    pub margin: Insets,
    #[serde(default)]
    pub padding: Insets,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub direction: LayoutDirection,
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    // Widget kind (container, generic, button, text, checkbox, radio_button)
    #[serde(flatten)]
    pub kind: NodeKindSpec,

    /// Shapes the node supplies itself, in its local coordinates
    #[serde(default)]
    pub custom: Option<Vec<ShapeSpec>>,

    #[serde(default)]
    pub children: Vec<NodeSpec>,
}

fn default_enabled() -> bool {
    true
}

impl NodeSpec {
    pub fn to_node(&self) -> Result<Node, TraceError> {
        let kind = match &self.kind {
            NodeKindSpec::Container => NodeKind::Container,
            NodeKindSpec::Generic => NodeKind::Generic,
            NodeKindSpec::Button => NodeKind::Button,
            NodeKindSpec::Text(text) => NodeKind::Text(text.to_content()?),
            NodeKindSpec::Checkbox { glyph, label } => NodeKind::Checkbox {
                glyph: *glyph,
                text: label.to_content()?,
            },
            NodeKindSpec::RadioButton { glyph, label } => NodeKind::RadioButton {
                glyph: *glyph,
                text: label.to_content()?,
            },
        };

        if !matches!(kind, NodeKind::Container) && !self.children.is_empty() {
            return Err(TraceError::Config(format!(
                "node {:?} has children but is not a container",
                self.id
            )));
        }

        let mut node = Node::new(self.bounds.to_rect(), kind)
            .with_margin(self.margin)
            .with_padding(self.padding)
            .with_visibility(self.visibility)
            .with_direction(self.direction)
            .with_enabled(self.enabled);
        if let Some(id) = &self.id {
            node = node.with_id(id.as_str());
        }
        if let Some(shapes) = &self.custom {
            let mut path = SilhouettePath::new();
            for shape in shapes {
                shape.append_to(&mut path)?;
            }
            node = node.with_custom(Rc::new(path));
        }
        node.children = self
            .children
            .iter()
            .map(NodeSpec::to_node)
            .collect::<Result<_, _>>()?;
        Ok(node)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeKindSpec {
    Container,
    Generic,
    Button,
    Text(TextSpec),
    Checkbox {
        #[serde(default)]
        glyph: Option<Glyph>,
        label: TextSpec,
    },
    RadioButton {
        #[serde(default)]
        glyph: Option<Glyph>,
        label: TextSpec,
    },
}

/// Text laid out by the host. Without `lines`, the text is split on `\n`.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TextSpec {
    pub text: String,
    #[serde(default = "default_line_height")]
    pub line_height: f64,
    #[serde(default)]
    pub lines: Option<Vec<LineSpan>>,
    #[serde(default)]
    pub max_lines: Option<usize>,
    #[serde(default)]
    pub horizontal_gravity: HorizontalGravity,
    #[serde(default)]
    pub vertical_gravity: VerticalGravity,
    #[serde(default)]
    pub font_family: String,
    #[serde(default = "default_font_size")]
    pub font_size: f32,
}

fn default_line_height() -> f64 {
    20.0
}

fn default_font_size() -> f32 {
    14.0
}

impl TextSpec {
    pub fn to_content(&self) -> Result<TextContent, TraceError> {
        if self.line_height.is_nan() || self.line_height <= 0.0 {
            return Err(TraceError::Config(format!(
                "line_height must be positive, got {}",
                self.line_height
            )));
        }
        let mut content = TextContent::new(self.text.clone(), self.line_height)
            .with_gravity(self.horizontal_gravity, self.vertical_gravity)
            .with_font(self.font_family.clone(), self.font_size);
        if let Some(lines) = &self.lines {
            content = content.with_lines(lines.clone());
        }
        if let Some(max_lines) = self.max_lines {
            content = content.with_max_lines(max_lines);
        }
        Ok(content)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum ShapeSpec {
    Rect {
        #[serde(flatten)]
        bounds: BoundsSpec,
        #[serde(default)]
        direction: Direction,
    },
    RoundRect {
        #[serde(flatten)]
        bounds: BoundsSpec,
        radius: f64,
        #[serde(default)]
        direction: Direction,
    },
    Circle {
        cx: f64,
        cy: f64,
        radius: f64,
        #[serde(default)]
        direction: Direction,
    },
    /// SVG path data, e.g. `"M0 0 L10 0 L10 10 Z"`
    Svg { d: String },
}

impl ShapeSpec {
    pub fn append_to(&self, path: &mut SilhouettePath) -> Result<(), TraceError> {
        match self {
            ShapeSpec::Rect { bounds, direction } => {
                path.add_rect(bounds.to_rect(), *direction);
            }
            ShapeSpec::RoundRect {
                bounds,
                radius,
                direction,
            } => {
                path.add_round_rect(bounds.to_rect(), *radius, *direction);
            }
            ShapeSpec::Circle {
                cx,
                cy,
                radius,
                direction,
            } => {
                path.add_circle(Point::new(*cx, *cy), *radius, *direction);
            }
            ShapeSpec::Svg { d } => {
                let bez = BezPath::from_svg(d)
                    .map_err(|e| TraceError::Config(format!("invalid svg path {d:?}: {e}")))?;
                path.add_bez_path(bez);
            }
        }
        Ok(())
    }
}
