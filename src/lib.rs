//! # silhouette
//!
//! Skeleton loading overlays traced from UI node trees.
//!
//! The tracing model, overlays and the shared shimmer clock live in
//! `silhouette-core` and are re-exported at the crate root. The Skia backend
//! is available as [`skia`] and the JSON request format as [`schema`].

pub use silhouette_core::*;
pub use silhouette_schema as schema;
pub use silhouette_skia as skia;
