//! Transition animations
//!
//! A slide moves both screens horizontally by the viewport width; a fade
//! runs the outgoing screen to transparent, then the incoming one back to
//! opaque. Each animated value is an [`AnimationTrack`] sampled with an
//! ease-in-out curve.

use std::sync::Arc;
use std::time::Duration;

/// Side from which the incoming screen enters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Incoming screen enters from the right, outgoing leaves to the left.
    Forward,
    /// Incoming screen enters from the left, outgoing leaves to the right.
    Backward,
}

impl Direction {
    pub fn sign(self) -> f64 {
        match self {
            Direction::Forward => 1.0,
            Direction::Backward => -1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionKind {
    Slide(Direction),
    /// Outgoing fades out, root is swapped, incoming fades in.
    Fade,
}

/// Which screen an animation track drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    Outgoing,
    Incoming,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Property {
    TranslateX,
    Opacity,
}

/// Symmetric ease-in/ease-out curve over `t` in `[0, 1]`.
pub fn ease_both(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// One property animation on one layer.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationTrack {
    pub layer: Layer,
    pub property: Property,
    pub from: f64,
    pub to: f64,
    /// Time after the transition start before this track begins moving.
    pub delay: Duration,
    pub duration: Duration,
}

impl AnimationTrack {
    /// Property value `elapsed` after the transition started.
    pub fn value_at(&self, elapsed: Duration) -> f64 {
        if elapsed <= self.delay {
            return self.from;
        }
        let local = elapsed - self.delay;
        if self.duration.is_zero() || local >= self.duration {
            return self.to;
        }
        let progress = ease_both(local.as_secs_f64() / self.duration.as_secs_f64());
        self.from + (self.to - self.from) * progress
    }

    pub fn end(&self) -> Duration {
        self.delay + self.duration
    }
}

/// Tracks for a slide: both screens move concurrently by one viewport width.
pub fn slide_tracks(direction: Direction, width: f64, duration: Duration) -> Vec<AnimationTrack> {
    let sign = direction.sign();
    vec![
        AnimationTrack {
            layer: Layer::Outgoing,
            property: Property::TranslateX,
            from: 0.0,
            to: -sign * width,
            delay: Duration::ZERO,
            duration,
        },
        AnimationTrack {
            layer: Layer::Incoming,
            property: Property::TranslateX,
            from: sign * width,
            to: 0.0,
            delay: Duration::ZERO,
            duration,
        },
    ]
}

/// Tracks for a fade: the fade-in only starts once the fade-out has finished.
pub fn fade_tracks(phase: Duration) -> Vec<AnimationTrack> {
    vec![
        AnimationTrack {
            layer: Layer::Outgoing,
            property: Property::Opacity,
            from: 1.0,
            to: 0.0,
            delay: Duration::ZERO,
            duration: phase,
        },
        AnimationTrack {
            layer: Layer::Incoming,
            property: Property::Opacity,
            from: 0.0,
            to: 1.0,
            delay: phase,
            duration: phase,
        },
    ]
}

/// Temporary stack holding the old and new screen during a slide.
#[derive(Debug)]
pub struct Overlay<S> {
    pub outgoing: Arc<S>,
    pub incoming: Arc<S>,
    pub tracks: Vec<AnimationTrack>,
}

impl<S> Clone for Overlay<S> {
    fn clone(&self) -> Self {
        Self {
            outgoing: Arc::clone(&self.outgoing),
            incoming: Arc::clone(&self.incoming),
            tracks: self.tracks.clone(),
        }
    }
}

impl<S> Overlay<S> {
    /// Horizontal offset of `layer` at `elapsed`; `0.0` if the layer has no track.
    pub fn offset_at(&self, layer: Layer, elapsed: Duration) -> f64 {
        self.tracks
            .iter()
            .find(|t| t.layer == layer && t.property == Property::TranslateX)
            .map(|t| t.value_at(elapsed))
            .unwrap_or(0.0)
    }
}
