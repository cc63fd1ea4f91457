//! # Shimmer Module
//!
//! One shared cyclic progress value fanned out to any number of overlays, so
//! that every overlay on screen shimmers in lock-step.
//!
//! ## Model
//! - **Handle table**: subscribers live in slots addressed by a generational
//!   [`SubscriberId`]. A slot holds only a `Weak` reference, so a dropped
//!   overlay is never kept alive by the synchronizer.
//! - **Clock**: host-driven. The host calls [`ShimmerSynchronizer::tick`] once
//!   per frame; the first tick after a start anchors the cycle.
//! - **Lifetime**: the clock runs if and only if at least one live subscriber
//!   is registered.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::time::Duration;

use tracing::{debug, trace};

use crate::animation::{Animated, EasingType};

/// Default shimmer cycle length.
pub const DEFAULT_SHIMMER_PERIOD: Duration = Duration::from_millis(1200);

/// Receives the shared shimmer progress once per tick.
pub trait ShimmerSubscriber {
    /// Called with the progress (0..=99) of the current tick.
    fn on_shimmer_frame(&self, progress: u8);
}

/// Handle to a registration in a [`ShimmerSynchronizer`].
///
/// Carries a generation counter so that a handle outliving its registration
/// never addresses a reused slot.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId {
    idx: u32,
    generation: u32,
}

impl SubscriberId {
    pub fn index(self) -> u32 {
        self.idx
    }

    pub fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SubscriberId({}@gen{})", self.idx, self.generation)
    }
}

struct Slot {
    generation: u32,
    subscriber: Option<Weak<dyn ShimmerSubscriber>>,
}

impl Slot {
    fn is_live(&self) -> bool {
        self.subscriber
            .as_ref()
            .is_some_and(|weak| weak.strong_count() > 0)
    }
}

struct ClockState {
    slots: Vec<Slot>,
    free: Vec<u32>,
    period: Duration,
    ramp: Animated<f32>,
    running: bool,
    anchor: Option<f64>,
    progress: u8,
}

impl ClockState {
    fn new(period: Duration) -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            period,
            ramp: Animated::ramp(0.0, 100.0, period.as_secs_f64(), EasingType::EaseInOut),
            running: false,
            anchor: None,
            progress: 0,
        }
    }

    fn slot(&self, id: SubscriberId) -> Option<&Slot> {
        self.slots
            .get(id.idx as usize)
            .filter(|slot| slot.generation == id.generation)
    }

    fn release(&mut self, idx: u32) {
        if let Some(slot) = self.slots.get_mut(idx as usize) {
            if slot.subscriber.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(idx);
            }
        }
    }

    /// Releases every slot whose subscriber has been dropped.
    fn prune(&mut self) -> usize {
        let dead: Vec<u32> = self
            .slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.subscriber.is_some() && !slot.is_live())
            .map(|(idx, _)| idx as u32)
            .collect();
        for &idx in &dead {
            self.release(idx);
        }
        dead.len()
    }

    fn live_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_live()).count()
    }

    fn start(&mut self) {
        if !self.running {
            debug!(period_ms = self.period.as_millis() as u64, "shimmer clock started");
            self.running = true;
            self.anchor = None;
            self.progress = 0;
        }
    }

    fn stop(&mut self) {
        if self.running {
            debug!("shimmer clock stopped");
        }
        self.running = false;
        self.anchor = None;
        self.progress = 0;
    }

    fn stop_if_idle(&mut self) {
        if self.live_count() == 0 {
            self.stop();
        }
    }
}

/// Shared shimmer clock. Cloning yields another handle to the same clock.
#[derive(Clone)]
pub struct ShimmerSynchronizer {
    state: Rc<RefCell<ClockState>>,
}

impl ShimmerSynchronizer {
    pub fn new(period: Duration) -> Self {
        Self {
            state: Rc::new(RefCell::new(ClockState::new(period))),
        }
    }

    /// Adds `subscriber` and starts the clock if it is not running.
    ///
    /// Registering a subscriber that is already registered returns its
    /// existing handle.
    pub fn register<S>(&self, subscriber: &Rc<S>) -> SubscriberId
    where
        S: ShimmerSubscriber + 'static,
    {
        let weak = Rc::downgrade(subscriber);
        let weak: Weak<dyn ShimmerSubscriber> = weak;
        let mut state = self.state.borrow_mut();
        state.prune();

        let existing = state.slots.iter().position(|slot| {
            slot.subscriber
                .as_ref()
                .is_some_and(|other| Weak::ptr_eq(other, &weak))
        });

        let id = match existing {
            Some(idx) => {
                let slot = &mut state.slots[idx];
                slot.subscriber = Some(weak);
                SubscriberId {
                    idx: idx as u32,
                    generation: slot.generation,
                }
            }
            None => match state.free.pop() {
                Some(idx) => {
                    let slot = &mut state.slots[idx as usize];
                    slot.subscriber = Some(weak);
                    SubscriberId {
                        idx,
                        generation: slot.generation,
                    }
                }
                None => {
                    let idx = state.slots.len() as u32;
                    state.slots.push(Slot {
                        generation: 0,
                        subscriber: Some(weak),
                    });
                    SubscriberId { idx, generation: 0 }
                }
            },
        };

        trace!(?id, "shimmer subscriber registered");
        state.start();
        id
    }

    /// Removes the registration behind `id`. Stale or unknown ids are ignored.
    pub fn unregister(&self, id: SubscriberId) {
        let mut state = self.state.borrow_mut();
        if state.slot(id).is_some() {
            state.release(id.idx);
            trace!(?id, "shimmer subscriber unregistered");
        }
        state.prune();
        state.stop_if_idle();
    }

    /// Removes `subscriber` by identity. Unknown subscribers are ignored.
    pub fn unregister_subscriber<S>(&self, subscriber: &Rc<S>)
    where
        S: ShimmerSubscriber + 'static,
    {
        let weak = Rc::downgrade(subscriber);
        let weak: Weak<dyn ShimmerSubscriber> = weak;
        let mut state = self.state.borrow_mut();
        let matching = state.slots.iter().position(|slot| {
            slot.subscriber
                .as_ref()
                .is_some_and(|other| Weak::ptr_eq(other, &weak))
        });
        if let Some(idx) = matching {
            state.release(idx as u32);
        }
        state.prune();
        state.stop_if_idle();
    }

    /// Whether `id` still addresses a live subscriber.
    pub fn is_registered(&self, id: SubscriberId) -> bool {
        self.state.borrow().slot(id).is_some_and(Slot::is_live)
    }

    /// Progress of the last tick, 0..=99. A cycle wraps to 0 rather than
    /// emitting 100.
    pub fn progress(&self) -> u8 {
        self.state.borrow().progress
    }

    pub fn is_running(&self) -> bool {
        self.state.borrow().running
    }

    pub fn subscriber_count(&self) -> usize {
        self.state.borrow().live_count()
    }

    pub fn period(&self) -> Duration {
        self.state.borrow().period
    }

    /// Whether `self` and `other` drive the same clock.
    pub fn same_clock(&self, other: &ShimmerSynchronizer) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }

    /// Advances the clock to `now` (seconds, any monotonic origin) and
    /// notifies every live subscriber.
    ///
    /// Subscribers may register or unregister from inside the callback.
    pub fn tick(&self, now: f64) {
        let (progress, subscribers) = {
            let mut state = self.state.borrow_mut();
            if !state.running {
                return;
            }

            let anchor = *state.anchor.get_or_insert(now);
            let period = state.period.as_secs_f64();
            let position = if period > 0.0 {
                (now - anchor).max(0.0) % period
            } else {
                0.0
            };
            let eased = *state.ramp.update(position);
            state.progress = eased.floor().clamp(0.0, 100.0) as u8;

            if state.prune() > 0 {
                trace!("pruned dropped shimmer subscribers");
            }
            let subscribers: Vec<Rc<dyn ShimmerSubscriber>> = state
                .slots
                .iter()
                .filter_map(|slot| slot.subscriber.as_ref().and_then(Weak::upgrade))
                .collect();
            if subscribers.is_empty() {
                state.stop();
            }
            (state.progress, subscribers)
        };

        for subscriber in subscribers {
            subscriber.on_shimmer_frame(progress);
        }
    }
}

impl Default for ShimmerSynchronizer {
    fn default() -> Self {
        Self::new(DEFAULT_SHIMMER_PERIOD)
    }
}

impl fmt::Debug for ShimmerSynchronizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("ShimmerSynchronizer")
            .field("period", &state.period)
            .field("running", &state.running)
            .field("progress", &state.progress)
            .field("subscribers", &state.live_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[derive(Default)]
    struct Recorder {
        frames: RefCell<Vec<u8>>,
    }

    impl ShimmerSubscriber for Recorder {
        fn on_shimmer_frame(&self, progress: u8) {
            self.frames.borrow_mut().push(progress);
        }
    }

    #[test]
    fn clock_runs_while_subscribers_remain() {
        let sync = ShimmerSynchronizer::default();
        let subs: Vec<Rc<Recorder>> = (0..3).map(|_| Rc::new(Recorder::default())).collect();
        let ids: Vec<SubscriberId> = subs.iter().map(|s| sync.register(s)).collect();

        assert!(sync.is_running());
        assert_eq!(sync.subscriber_count(), 3);

        sync.unregister(ids[0]);
        sync.unregister(ids[1]);
        assert!(sync.is_running());
        sync.unregister(ids[2]);
        assert!(!sync.is_running());
    }

    #[test]
    fn subscribers_observe_the_same_progress() {
        let sync = ShimmerSynchronizer::new(Duration::from_millis(1000));
        let a = Rc::new(Recorder::default());
        let b = Rc::new(Recorder::default());
        sync.register(&a);
        sync.register(&b);

        sync.tick(10.0);
        sync.tick(10.5);
        sync.tick(10.25);

        assert_eq!(a.frames.borrow()[0], 0);
        assert_eq!(*a.frames.borrow(), *b.frames.borrow());
        let mid = a.frames.borrow()[1];
        assert!((45..=55).contains(&mid), "{mid}");
    }

    #[test]
    fn cycle_restarts_from_zero() {
        let sync = ShimmerSynchronizer::new(Duration::from_millis(1000));
        let a = Rc::new(Recorder::default());
        sync.register(&a);

        sync.tick(0.0);
        sync.tick(0.99);
        sync.tick(1.0);
        let frames = a.frames.borrow();
        assert!(frames[1] >= 98);
        assert_eq!(frames[2], 0);
    }

    #[test]
    fn progress_wraps_before_reaching_full() {
        let sync = ShimmerSynchronizer::new(Duration::from_millis(1000));
        let a = Rc::new(Recorder::default());
        sync.register(&a);

        for step in 0..=2000 {
            sync.tick(step as f64 * 0.0005);
        }
        let frames = a.frames.borrow();
        assert_eq!(frames.iter().copied().max(), Some(99));
        assert_eq!(frames[2000], 0);
    }

    #[test]
    fn reregistering_restarts_progress() {
        let sync = ShimmerSynchronizer::new(Duration::from_millis(1000));
        let a = Rc::new(Recorder::default());
        let id = sync.register(&a);
        sync.tick(0.0);
        sync.tick(0.5);
        assert!(sync.progress() > 0);

        sync.unregister(id);
        assert_eq!(sync.progress(), 0);

        sync.register(&a);
        assert_eq!(sync.progress(), 0);
        sync.tick(7.0);
        assert_eq!(sync.progress(), 0);
        sync.tick(7.5);
        assert!(sync.progress() > 0);
        assert_eq!(a.frames.borrow().len(), 4);
    }

    #[test]
    fn duplicate_registration_is_idempotent() {
        let sync = ShimmerSynchronizer::default();
        let a = Rc::new(Recorder::default());
        let first = sync.register(&a);
        let second = sync.register(&a);
        assert_eq!(first, second);
        assert_eq!(sync.subscriber_count(), 1);

        sync.tick(0.0);
        assert_eq!(a.frames.borrow().len(), 1);
    }

    #[test]
    fn stale_handles_are_ignored() {
        let sync = ShimmerSynchronizer::default();
        let a = Rc::new(Recorder::default());
        let b = Rc::new(Recorder::default());

        let stale = sync.register(&a);
        sync.unregister(stale);
        let fresh = sync.register(&b);
        assert_eq!(stale.index(), fresh.index());
        assert_ne!(stale, fresh);

        sync.unregister(stale);
        assert!(sync.is_registered(fresh));
        assert!(!sync.is_registered(stale));

        sync.unregister_subscriber(&a);
        assert_eq!(sync.subscriber_count(), 1);
    }

    #[test]
    fn dropped_subscribers_are_pruned_on_tick() {
        let sync = ShimmerSynchronizer::default();
        let kept = Rc::new(Recorder::default());
        let dropped = Rc::new(Recorder::default());
        sync.register(&kept);
        let dropped_id = sync.register(&dropped);
        drop(dropped);

        sync.tick(0.0);
        assert!(!sync.is_registered(dropped_id));
        assert_eq!(kept.frames.borrow().len(), 1);
        assert!(sync.is_running());

        drop(kept);
        sync.tick(0.1);
        assert!(!sync.is_running());
    }

    struct SelfRemoving {
        sync: ShimmerSynchronizer,
        id: Cell<Option<SubscriberId>>,
        calls: Cell<usize>,
    }

    impl ShimmerSubscriber for SelfRemoving {
        fn on_shimmer_frame(&self, _progress: u8) {
            self.calls.set(self.calls.get() + 1);
            if let Some(id) = self.id.take() {
                self.sync.unregister(id);
            }
        }
    }

    #[test]
    fn subscriber_may_unregister_during_notification() {
        let sync = ShimmerSynchronizer::default();
        let other = Rc::new(Recorder::default());
        let leaving = Rc::new(SelfRemoving {
            sync: sync.clone(),
            id: Cell::new(None),
            calls: Cell::new(0),
        });
        leaving.id.set(Some(sync.register(&leaving)));
        sync.register(&other);

        sync.tick(0.0);
        sync.tick(0.1);

        assert_eq!(leaving.calls.get(), 1);
        assert_eq!(other.frames.borrow().len(), 2);
    }
}
