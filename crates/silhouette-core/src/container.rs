//! # Trace Container
//!
//! Hosts exactly one content node and swaps it for a shimmering silhouette
//! overlay while its data loads.
//!
//! ## Lifecycle
//! 1. `start_shimmer`: trace the content into a fresh overlay, disable every
//!    leaf of the content (remembering its previous state), then cross-fade
//!    from content to overlay.
//! 2. `tick`: advance the cross-fade.
//! 3. `stop_shimmer`: restore the remembered enabled states, cross-fade back,
//!    then drop the overlay.

use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use tracing::{debug, instrument};

use crate::animation::{Animated, EasingType};
use crate::config::OverlayConfig;
use crate::errors::TraceError;
use crate::node::Node;
use crate::overlay::Overlay;
use crate::shimmer::{ShimmerSynchronizer, DEFAULT_SHIMMER_PERIOD};
use crate::tracer::SilhouetteTracer;

/// Per-call options for [`TraceContainer::start_shimmer`].
#[derive(Clone, Debug)]
pub struct ShimmerOptions {
    pub period: Duration,
    pub cross_fade: bool,
    /// Shared clock to join. A private one is created when `None`.
    pub synchronizer: Option<ShimmerSynchronizer>,
}

impl Default for ShimmerOptions {
    fn default() -> Self {
        Self {
            period: DEFAULT_SHIMMER_PERIOD,
            cross_fade: true,
            synchronizer: None,
        }
    }
}

/// Enabled flags of a subtree's leaves, keyed by child-index path from the
/// subtree root.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EnabledSnapshot {
    states: HashMap<Vec<usize>, bool>,
}

impl EnabledSnapshot {
    /// Records every leaf's enabled flag, then disables it.
    pub fn capture_and_disable(root: &mut Node) -> Self {
        let mut snapshot = Self::default();
        let mut path = Vec::new();
        snapshot.capture(root, &mut path);
        snapshot
    }

    fn capture(&mut self, node: &mut Node, path: &mut Vec<usize>) {
        if node.is_container() {
            for (i, child) in node.children.iter_mut().enumerate() {
                path.push(i);
                self.capture(child, path);
                path.pop();
            }
        } else {
            self.states.insert(path.clone(), node.enabled);
            node.enabled = false;
        }
    }

    /// Restores every leaf's flag. Leaves missing from the snapshot are
    /// enabled.
    pub fn restore(&self, root: &mut Node) {
        let mut path = Vec::new();
        self.restore_at(root, &mut path);
    }

    fn restore_at(&self, node: &mut Node, path: &mut Vec<usize>) {
        if node.is_container() {
            for (i, child) in node.children.iter_mut().enumerate() {
                path.push(i);
                self.restore_at(child, path);
                path.pop();
            }
        } else {
            node.enabled = self.states.get(path.as_slice()).copied().unwrap_or(true);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FadeDirection {
    ToOverlay,
    ToContent,
}

#[derive(Debug)]
struct CrossFade {
    direction: FadeDirection,
    started_at: f64,
    ramp: Animated<f32>,
}

/// Single-child host that overlays its content with a shimmering silhouette.
#[derive(Debug)]
pub struct TraceContainer {
    config: OverlayConfig,
    content: Option<Node>,
    content_alpha: f32,
    overlay: Option<Rc<Overlay>>,
    snapshot: EnabledSnapshot,
    fade: Option<CrossFade>,
}

impl TraceContainer {
    pub fn new(config: OverlayConfig) -> Self {
        Self {
            config,
            content: None,
            content_alpha: 1.0,
            overlay: None,
            snapshot: EnabledSnapshot::default(),
            fade: None,
        }
    }

    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut OverlayConfig {
        &mut self.config
    }

    /// Sets the content node. Fails if one is already present.
    pub fn add_child(&mut self, node: Node) -> Result<(), TraceError> {
        if self.content.is_some() {
            return Err(TraceError::ContainerOccupied);
        }
        self.content = Some(node);
        self.content_alpha = 1.0;
        Ok(())
    }

    /// Removes the content, restoring its enabled states and dropping any
    /// overlay.
    pub fn remove_child(&mut self) -> Option<Node> {
        let mut content = self.content.take()?;
        if !self.snapshot.is_empty() {
            self.snapshot.restore(&mut content);
            self.snapshot = EnabledSnapshot::default();
        }
        self.fade = None;
        self.overlay = None;
        self.content_alpha = 1.0;
        Some(content)
    }

    pub fn content(&self) -> Option<&Node> {
        self.content.as_ref()
    }

    pub fn content_mut(&mut self) -> Option<&mut Node> {
        self.content.as_mut()
    }

    pub fn content_alpha(&self) -> f32 {
        self.content_alpha
    }

    pub fn overlay(&self) -> Option<&Rc<Overlay>> {
        self.overlay.as_ref()
    }

    pub fn is_shimmering(&self) -> bool {
        self.overlay.as_ref().is_some_and(|o| o.is_shimmering())
    }

    pub fn is_cross_fading(&self) -> bool {
        self.fade.is_some()
    }

    /// Covers the content with a freshly traced, shimmering overlay.
    ///
    /// Returns the synchronizer driving the overlay, or `None` when there is no
    /// content.
    #[instrument(level = "debug", skip_all, fields(cross_fade = options.cross_fade))]
    pub fn start_shimmer(
        &mut self,
        tracer: &SilhouetteTracer,
        options: ShimmerOptions,
        now: f64,
    ) -> Option<ShimmerSynchronizer> {
        let content = self.content.as_mut()?;

        let overlay = Rc::new(Overlay::new(&self.config));
        overlay.trace(tracer, content);
        let synchronizer = overlay.start_shimmer(options.period, options.synchronizer);

        if !self.snapshot.is_empty() {
            self.snapshot.restore(content);
        }
        self.snapshot = EnabledSnapshot::capture_and_disable(content);
        debug!(leaves = self.snapshot.len(), "content disabled");

        self.overlay = Some(overlay);
        if self.fade_allowed(options.cross_fade) {
            self.begin_fade(FadeDirection::ToOverlay, now);
            self.apply_fade(0.0);
        } else {
            self.fade = None;
            self.finish_fade(FadeDirection::ToOverlay);
        }
        Some(synchronizer)
    }

    /// Restores the content and fades the overlay out.
    #[instrument(level = "debug", skip(self))]
    pub fn stop_shimmer(&mut self, cross_fade: bool, now: f64) {
        if self.overlay.is_none() {
            return;
        }
        if self
            .fade
            .as_ref()
            .is_some_and(|fade| matches!(fade.direction, FadeDirection::ToContent))
        {
            // already fading back; an instant stop completes the fade now
            if !self.fade_allowed(cross_fade) {
                self.fade = None;
                self.finish_fade(FadeDirection::ToContent);
            }
            return;
        }
        let Some(content) = self.content.as_mut() else {
            return;
        };

        let snapshot = std::mem::take(&mut self.snapshot);
        if !snapshot.is_empty() {
            snapshot.restore(content);
        }

        if self.fade_allowed(cross_fade) {
            self.begin_fade(FadeDirection::ToContent, now);
            self.apply_fade(0.0);
        } else {
            self.fade = None;
            self.finish_fade(FadeDirection::ToContent);
        }
    }

    /// Advances any running cross-fade to `now` (seconds).
    pub fn tick(&mut self, now: f64) {
        let Some(fade) = self.fade.as_mut() else {
            return;
        };
        let elapsed = now - fade.started_at;
        let progress = *fade.ramp.update(elapsed);
        let direction = fade.direction;
        if fade.ramp.is_finished(elapsed) {
            self.fade = None;
            self.finish_fade(direction);
        } else {
            self.apply_fade(progress);
        }
    }

    fn fade_allowed(&self, requested: bool) -> bool {
        requested && self.config.cross_fade_enabled && self.config.cross_fade_duration_ms > 0
    }

    fn begin_fade(&mut self, direction: FadeDirection, now: f64) {
        let duration = self.config.cross_fade_duration().as_secs_f64();
        self.fade = Some(CrossFade {
            direction,
            started_at: now,
            ramp: Animated::ramp(0.0, 1.0, duration, EasingType::Linear),
        });
    }

    fn apply_fade(&mut self, progress: f32) {
        let Some(fade) = &self.fade else {
            return;
        };
        match fade.direction {
            FadeDirection::ToOverlay => {
                self.content_alpha = self.content_alpha.min(1.0 - progress);
                if let Some(overlay) = &self.overlay {
                    overlay.set_alpha(progress);
                }
            }
            FadeDirection::ToContent => {
                self.content_alpha = progress;
                if let Some(overlay) = &self.overlay {
                    overlay.set_alpha(1.0 - progress);
                }
            }
        }
    }

    fn finish_fade(&mut self, direction: FadeDirection) {
        match direction {
            FadeDirection::ToOverlay => {
                self.content_alpha = 0.0;
                if let Some(overlay) = &self.overlay {
                    overlay.set_alpha(1.0);
                }
            }
            FadeDirection::ToContent => {
                self.content_alpha = 1.0;
                if let Some(overlay) = self.overlay.take() {
                    overlay.set_alpha(0.0);
                    overlay.stop_shimmer();
                }
                debug!("overlay removed");
            }
        }
    }
}
