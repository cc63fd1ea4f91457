use keyframe::{AnimationSequence, CanTween, EasingFunction, Keyframe};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Pacing curves used by the shimmer clock and the overlay cross-fade.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EasingType {
    Linear,
    EaseIn,
    EaseOut,
    #[default]
    EaseInOut,
}

impl EasingFunction for EasingType {
    fn y(&self, x: f64) -> f64 {
        match self {
            EasingType::Linear => keyframe::functions::Linear.y(x),
            EasingType::EaseIn => keyframe::functions::EaseIn.y(x),
            EasingType::EaseOut => keyframe::functions::EaseOut.y(x),
            EasingType::EaseInOut => keyframe::functions::EaseInOut.y(x),
        }
    }
}

impl EasingType {
    /// Evaluates the curve at `x` in `[0, 1]`.
    pub fn eval(&self, x: f32) -> f32 {
        self.y(x.clamp(0.0, 1.0) as f64) as f32
    }
}

/// A keyframed value sampled at absolute times (seconds).
#[derive(Clone)]
pub struct Animated<T>
where
    T: Clone + CanTween + Default,
{
    keyframes: Vec<(T, f64, EasingType)>,
    sequence: AnimationSequence<T>,
    current_value: T,
}

impl<T> Animated<T>
where
    T: Clone + CanTween + Default,
{
    /// A value that holds `initial` forever.
    pub fn new(initial: T) -> Self {
        let sequence = AnimationSequence::from(vec![Keyframe::new(
            initial.clone(),
            0.0,
            EasingType::Linear,
        )]);
        Self {
            keyframes: vec![(initial.clone(), 0.0, EasingType::Linear)],
            sequence,
            current_value: initial,
        }
    }

    /// A single segment from `from` to `to` over `duration` seconds.
    pub fn ramp(from: T, to: T, duration: f64, easing: EasingType) -> Self {
        let mut animated = Self::new(from);
        animated.add_keyframe(to, duration, easing);
        animated
    }

    /// Appends `target`, reached `duration` seconds after the last keyframe.
    pub fn add_keyframe(&mut self, target: T, duration: f64, easing: EasingType) {
        let time = self.sequence.duration() + duration.max(0.0);
        self.keyframes.push((target, time, easing));
        self.sequence = AnimationSequence::from(
            self.keyframes
                .iter()
                .map(|(value, time, easing)| Keyframe::new(value.clone(), *time, *easing))
                .collect::<Vec<_>>(),
        );
    }

    pub fn duration(&self) -> f64 {
        self.sequence.duration()
    }

    /// Samples the sequence at `time`, clamped to its span.
    pub fn update(&mut self, time: f64) -> &T {
        self.sequence.advance_to(time.clamp(0.0, self.duration()));
        self.current_value = self.sequence.now();
        &self.current_value
    }

    pub fn value(&self) -> &T {
        &self.current_value
    }

    pub fn is_finished(&self, time: f64) -> bool {
        time >= self.duration()
    }
}

impl<T> fmt::Debug for Animated<T>
where
    T: Clone + CanTween + Default + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Animated")
            .field("current_value", &self.current_value)
            .field("duration", &self.duration())
            .finish()
    }
}
