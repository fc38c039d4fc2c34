//! Screen navigation for the padel club desktop client.
//!
//! A two-state machine (`Idle` / `Transitioning`) that builds the target
//! screen, runs a slide or fade between the old and new screen, and commits
//! the new screen as root when the animation finishes. Overlapping
//! transitions are rejected rather than queued.

mod controller;
mod error;
mod screen;
mod transition;

pub use controller::{
    NavigationEvent, NavigationOptions, NavigationState, TransitionController, TransitionTicket,
};
pub use error::NavigationError;
pub use screen::{ScreenFactory, ScreenId};
pub use transition::{
    ease_both, fade_tracks, slide_tracks, AnimationTrack, Direction, Layer, Overlay, Property,
    TransitionKind,
};
