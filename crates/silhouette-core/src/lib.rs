//! # silhouette-core
//!
//! Skeleton-loading silhouettes for UI trees.
//!
//! A [`SilhouetteTracer`] walks a laid-out [`Node`] tree and approximates its
//! visible footprint as one composite [`SilhouettePath`]. An [`Overlay`] holds
//! that path and, while its content loads, sweeps a shimmer highlight across
//! it. Overlays sharing a [`ShimmerSynchronizer`] shimmer in lock-step.
//!
//! Everything here is single-threaded and host-driven: the host supplies node
//! snapshots after layout and calls `tick` once per frame.

pub mod animation;
pub mod config;
pub mod container;
pub mod delegate;
pub mod errors;
pub mod node;
pub mod overlay;
pub mod path;
pub mod shimmer;
pub mod strategy;
pub mod text;
pub mod tracer;

pub use config::{Color, OverlayConfig};
pub use container::{EnabledSnapshot, ShimmerOptions, TraceContainer};
pub use delegate::{Exclusion, ShapeDelegate};
pub use errors::TraceError;
pub use node::{
    Capability, Glyph, HorizontalGravity, Insets, LayoutDirection, LineSpan, Node, NodeId,
    NodeKind, TextContent, Traceable, VerticalGravity, Visibility,
};
pub use overlay::Overlay;
pub use path::{Direction, PathShape, SilhouettePath};
pub use shimmer::{ShimmerSubscriber, ShimmerSynchronizer, SubscriberId, DEFAULT_SHIMMER_PERIOD};
pub use strategy::DefaultShapeStrategy;
pub use text::{MonospaceMeasurer, TextMeasurer};
pub use tracer::{Silhouette, SilhouetteTracer};
