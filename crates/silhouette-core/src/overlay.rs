//! # Overlay Module
//!
//! The renderable sink for a traced silhouette.
//!
//! An [`Overlay`] owns the last trace result, its colours and, while
//! shimmering, a registration with a [`ShimmerSynchronizer`]. Drawing is left
//! to a rendering backend, which reads [`Overlay::silhouette`] and
//! [`Overlay::shimmer_band`] each frame.

use std::cell::{Ref, RefCell};
use std::rc::Rc;
use std::time::Duration;

use kurbo::{Point, Rect, Vec2};
use tracing::{debug, instrument};

use crate::config::{Color, OverlayConfig};
use crate::node::Node;
use crate::shimmer::{ShimmerSubscriber, ShimmerSynchronizer, SubscriberId};
use crate::tracer::{Silhouette, SilhouetteTracer};

struct ShimmerAttachment {
    synchronizer: ShimmerSynchronizer,
    id: SubscriberId,
}

struct OverlayState {
    silhouette: Option<Silhouette>,
    silhouette_color: Color,
    shimmer_color: Color,
    shimmer_width: f64,
    alpha: f32,
    shimmer: Option<ShimmerAttachment>,
    progress: u8,
    needs_repaint: bool,
}

pub struct Overlay {
    state: RefCell<OverlayState>,
}

impl Overlay {
    pub fn new(config: &OverlayConfig) -> Self {
        Self {
            state: RefCell::new(OverlayState {
                silhouette: None,
                silhouette_color: config.silhouette_color,
                shimmer_color: config.shimmer_color,
                shimmer_width: config.shimmer_width,
                alpha: 1.0,
                shimmer: None,
                progress: 0,
                needs_repaint: false,
            }),
        }
    }

    /// Traces `root` and replaces any previous silhouette.
    #[instrument(level = "debug", skip_all)]
    pub fn trace(&self, tracer: &SilhouetteTracer, root: &Node) {
        self.set_silhouette(tracer.trace(root));
    }

    /// Replaces the silhouette. Bounds are normalised to start at the origin.
    pub fn set_silhouette(&self, mut silhouette: Silhouette) {
        silhouette.bounds = Rect::from_origin_size(Point::ZERO, silhouette.bounds.size());
        debug!(
            width = silhouette.bounds.width(),
            height = silhouette.bounds.height(),
            "overlay silhouette updated"
        );
        let mut state = self.state.borrow_mut();
        state.silhouette = Some(silhouette);
        state.needs_repaint = true;
    }

    pub fn silhouette(&self) -> Option<Ref<'_, Silhouette>> {
        Ref::filter_map(self.state.borrow(), |state| state.silhouette.as_ref()).ok()
    }

    pub fn has_silhouette(&self) -> bool {
        self.state.borrow().silhouette.is_some()
    }

    /// Size the overlay occupies; zero until a silhouette is set.
    pub fn bounds(&self) -> Rect {
        self.state
            .borrow()
            .silhouette
            .as_ref()
            .map_or(Rect::ZERO, |s| s.bounds)
    }

    pub fn set_silhouette_color(&self, color: Color) {
        let mut state = self.state.borrow_mut();
        state.silhouette_color = color;
        state.needs_repaint = true;
    }

    pub fn set_shimmer_color(&self, color: Color) {
        let mut state = self.state.borrow_mut();
        state.shimmer_color = color;
        state.needs_repaint = true;
    }

    pub fn silhouette_color(&self) -> Color {
        self.state.borrow().silhouette_color
    }

    pub fn shimmer_color(&self) -> Color {
        self.state.borrow().shimmer_color
    }

    pub fn set_alpha(&self, alpha: f32) {
        let mut state = self.state.borrow_mut();
        state.alpha = alpha.clamp(0.0, 1.0);
        state.needs_repaint = true;
    }

    pub fn alpha(&self) -> f32 {
        self.state.borrow().alpha
    }

    /// Starts shimmering on `synchronizer`, or on a new one with `period`.
    ///
    /// Returns the synchronizer in use so that other overlays can join it.
    pub fn start_shimmer(
        self: &Rc<Self>,
        period: Duration,
        synchronizer: Option<ShimmerSynchronizer>,
    ) -> ShimmerSynchronizer {
        self.stop_shimmer();

        let synchronizer = synchronizer.unwrap_or_else(|| ShimmerSynchronizer::new(period));
        let id = synchronizer.register(self);

        let mut state = self.state.borrow_mut();
        state.shimmer = Some(ShimmerAttachment {
            synchronizer: synchronizer.clone(),
            id,
        });
        state.progress = 0;
        state.needs_repaint = true;
        synchronizer
    }

    /// Leaves the synchronizer and resets the highlight.
    pub fn stop_shimmer(&self) {
        let attachment = {
            let mut state = self.state.borrow_mut();
            state.progress = 0;
            state.needs_repaint = true;
            state.shimmer.take()
        };
        if let Some(attachment) = attachment {
            attachment.synchronizer.unregister(attachment.id);
        }
    }

    pub fn is_shimmering(&self) -> bool {
        self.state.borrow().shimmer.is_some()
    }

    pub fn synchronizer(&self) -> Option<ShimmerSynchronizer> {
        self.state
            .borrow()
            .shimmer
            .as_ref()
            .map(|attachment| attachment.synchronizer.clone())
    }

    pub fn shimmer_progress(&self) -> u8 {
        self.state.borrow().progress
    }

    /// The highlight band for the current progress, in silhouette space.
    ///
    /// `None` unless shimmering over a non-empty silhouette.
    pub fn shimmer_band(&self) -> Option<Rect> {
        let state = self.state.borrow();
        state.shimmer.as_ref()?;
        let bounds = state.silhouette.as_ref()?.bounds;
        if bounds.area() <= 0.0 {
            return None;
        }
        let band = Rect::new(0.0, 0.0, bounds.width() * state.shimmer_width, bounds.height());
        Some(band + Vec2::new(bounds.x1 * f64::from(state.progress) / 100.0, 0.0))
    }

    /// Returns and clears the pending-repaint flag.
    pub fn take_repaint(&self) -> bool {
        std::mem::take(&mut self.state.borrow_mut().needs_repaint)
    }
}

impl ShimmerSubscriber for Overlay {
    fn on_shimmer_frame(&self, progress: u8) {
        let mut state = self.state.borrow_mut();
        state.progress = progress;
        state.needs_repaint = true;
    }
}

impl Drop for Overlay {
    fn drop(&mut self) {
        if let Some(attachment) = self.state.get_mut().shimmer.take() {
            attachment.synchronizer.unregister(attachment.id);
        }
    }
}

impl std::fmt::Debug for Overlay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("Overlay")
            .field("bounds", &state.silhouette.as_ref().map(|s| s.bounds))
            .field("alpha", &state.alpha)
            .field("shimmering", &state.shimmer.is_some())
            .field("progress", &state.progress)
            .finish()
    }
}
