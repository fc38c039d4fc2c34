//! The `Idle` / `Transitioning` state machine driving screen changes

use log::{debug, info, trace, warn};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::sleep;

use crate::error::NavigationError;
use crate::screen::{ScreenFactory, ScreenId};
use crate::transition::{fade_tracks, slide_tracks, AnimationTrack, Direction, Overlay, TransitionKind};

/// Navigation state machine states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationState {
    Idle,
    Transitioning,
}

/// Notifications published on every state change.
#[derive(Debug, Clone, PartialEq)]
pub enum NavigationEvent {
    Started {
        from: ScreenId,
        to: ScreenId,
        kind: TransitionKind,
    },
    Committed {
        screen: ScreenId,
    },
    Failed {
        target: ScreenId,
        error: NavigationError,
    },
}

/// Timing and geometry of transitions.
#[derive(Debug, Clone)]
pub struct NavigationOptions {
    pub slide_duration: Duration,
    /// Length of each fade phase (out, then in).
    pub fade_duration: Duration,
    /// Distance a screen travels to be fully off-view.
    pub viewport_width: f64,
}

impl Default for NavigationOptions {
    fn default() -> Self {
        Self {
            slide_duration: Duration::from_millis(400),
            fade_duration: Duration::from_millis(500),
            viewport_width: 1280.0,
        }
    }
}

impl NavigationOptions {
    pub fn with_slide_duration(mut self, value: Duration) -> Self {
        self.slide_duration = value;
        self
    }

    pub fn with_fade_duration(mut self, value: Duration) -> Self {
        self.fade_duration = value;
        self
    }

    pub fn with_viewport_width(mut self, value: f64) -> Self {
        self.viewport_width = value;
        self
    }
}

/// Handle to the transition currently in flight, returned by `begin_*`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionTicket {
    id: u64,
    target: ScreenId,
    kind: TransitionKind,
    duration: Duration,
}

impl TransitionTicket {
    pub fn target(&self) -> &ScreenId {
        &self.target
    }

    pub fn kind(&self) -> TransitionKind {
        self.kind
    }

    /// Total running time of all animations of this transition.
    pub fn duration(&self) -> Duration {
        self.duration
    }
}

struct InFlight<S> {
    ticket_id: u64,
    target_id: ScreenId,
    target: Arc<S>,
    overlay: Option<Overlay<S>>,
    tracks: Vec<AnimationTrack>,
}

struct Inner<S> {
    current_id: ScreenId,
    current: Arc<S>,
    in_flight: Option<InFlight<S>>,
}

/// Guards screen navigation: at most one transition runs at a time and
/// requests arriving meanwhile are rejected with
/// [`NavigationError::AlreadyTransitioning`].
pub struct TransitionController<F: ScreenFactory> {
    factory: F,
    options: NavigationOptions,
    busy: AtomicBool,
    next_ticket: AtomicU64,
    inner: Mutex<Inner<F::Screen>>,
    events: broadcast::Sender<NavigationEvent>,
}

impl<F: ScreenFactory> TransitionController<F> {
    pub fn new(factory: F, initial_id: ScreenId, initial: F::Screen) -> Self {
        Self::new_with_options(factory, initial_id, initial, NavigationOptions::default())
    }

    pub fn new_with_options(
        factory: F,
        initial_id: ScreenId,
        initial: F::Screen,
        options: NavigationOptions,
    ) -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            factory,
            options,
            busy: AtomicBool::new(false),
            next_ticket: AtomicU64::new(1),
            inner: Mutex::new(Inner {
                current_id: initial_id,
                current: Arc::new(initial),
                in_flight: None,
            }),
            events,
        }
    }

    /// Builds the initial screen through the factory itself.
    pub async fn start(
        factory: F,
        initial_id: ScreenId,
        options: NavigationOptions,
    ) -> Result<Self, NavigationError> {
        let initial = factory.build(&initial_id).await?;
        Ok(Self::new_with_options(factory, initial_id, initial, options))
    }

    pub fn options(&self) -> &NavigationOptions {
        &self.options
    }

    pub fn on_event(&self) -> broadcast::Receiver<NavigationEvent> {
        self.events.subscribe()
    }

    pub fn state(&self) -> NavigationState {
        if self.busy.load(Ordering::Acquire) {
            NavigationState::Transitioning
        } else {
            NavigationState::Idle
        }
    }

    pub fn current_id(&self) -> ScreenId {
        self.lock().current_id.clone()
    }

    pub fn current_screen(&self) -> Arc<F::Screen> {
        Arc::clone(&self.lock().current)
    }

    /// Target of the transition in flight, if any.
    pub fn in_flight_target(&self) -> Option<ScreenId> {
        self.lock().in_flight.as_ref().map(|f| f.target_id.clone())
    }

    /// Old and new screen stacked together while a slide runs.
    pub fn overlay(&self) -> Option<Overlay<F::Screen>> {
        self.lock().in_flight.as_ref().and_then(|f| f.overlay.clone())
    }

    /// Animation tracks of the transition in flight.
    pub fn tracks(&self) -> Vec<AnimationTrack> {
        self.lock()
            .in_flight
            .as_ref()
            .map(|f| f.tracks.clone())
            .unwrap_or_default()
    }

    /// Slide to `target`, waiting out the animation before committing.
    pub async fn navigate_to(
        &self,
        target: ScreenId,
        direction: Direction,
    ) -> Result<Arc<F::Screen>, NavigationError> {
        let ticket = self.begin_slide(target, direction).await?;
        let guard = CommitOnDrop {
            controller: self,
            ticket: Some(ticket.clone()),
        };
        sleep(ticket.duration).await;
        guard.finish()
    }

    /// Cross-fade to `target`: fade out, swap the root, fade in.
    pub async fn fade_to(&self, target: ScreenId) -> Result<Arc<F::Screen>, NavigationError> {
        let ticket = self.begin_fade(target).await?;
        let guard = CommitOnDrop {
            controller: self,
            ticket: Some(ticket.clone()),
        };
        sleep(self.options.fade_duration).await;
        self.swap_root(&ticket)?;
        sleep(self.options.fade_duration).await;
        guard.finish()
    }

    pub async fn begin_slide(
        &self,
        target: ScreenId,
        direction: Direction,
    ) -> Result<TransitionTicket, NavigationError> {
        self.begin(target, TransitionKind::Slide(direction)).await
    }

    pub async fn begin_fade(&self, target: ScreenId) -> Result<TransitionTicket, NavigationError> {
        self.begin(target, TransitionKind::Fade).await
    }

    /// Enters `Transitioning` and builds the target screen.
    ///
    /// On a build failure the machine is back in `Idle` before the error is
    /// returned.
    pub async fn begin(
        &self,
        target: ScreenId,
        kind: TransitionKind,
    ) -> Result<TransitionTicket, NavigationError> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!("Rejected navigation to '{}': transition in progress", target);
            return Err(NavigationError::AlreadyTransitioning);
        }
        let release = ReleaseOnDrop {
            controller: self,
            target: Some(target.clone()),
        };

        debug!("Building screen '{}'", target);
        let built = match self.factory.build(&target).await {
            Ok(screen) => Arc::new(screen),
            Err(err) => {
                release.disarm();
                warn!("Navigation to '{}' aborted: {}", target, err);
                self.busy.store(false, Ordering::Release);
                let _ = self.events.send(NavigationEvent::Failed {
                    target,
                    error: err.clone(),
                });
                return Err(err);
            }
        };

        let id = self.next_ticket.fetch_add(1, Ordering::SeqCst);
        let (tracks, duration) = match kind {
            TransitionKind::Slide(direction) => (
                slide_tracks(direction, self.options.viewport_width, self.options.slide_duration),
                self.options.slide_duration,
            ),
            TransitionKind::Fade => (
                fade_tracks(self.options.fade_duration),
                self.options.fade_duration * 2,
            ),
        };

        let from = {
            let mut inner = self.lock();
            let overlay = match kind {
                TransitionKind::Slide(_) => Some(Overlay {
                    outgoing: Arc::clone(&inner.current),
                    incoming: Arc::clone(&built),
                    tracks: tracks.clone(),
                }),
                TransitionKind::Fade => None,
            };
            inner.in_flight = Some(InFlight {
                ticket_id: id,
                target_id: target.clone(),
                target: built,
                overlay,
                tracks,
            });
            inner.current_id.clone()
        };
        release.disarm();

        info!("Transition {} started: '{}' -> '{}' ({:?})", id, from, target, kind);
        let _ = self.events.send(NavigationEvent::Started {
            from,
            to: target.clone(),
            kind,
        });

        Ok(TransitionTicket {
            id,
            target,
            kind,
            duration,
        })
    }

    /// Makes the incoming screen the root while the transition keeps running.
    /// Used between the two phases of a fade.
    pub fn swap_root(&self, ticket: &TransitionTicket) -> Result<(), NavigationError> {
        let mut inner = self.lock();
        let in_flight = match inner.in_flight.as_mut() {
            Some(f) if f.ticket_id == ticket.id => f,
            _ => return Err(NavigationError::StaleTransition),
        };
        in_flight.overlay = None;
        let target = Arc::clone(&in_flight.target);
        let target_id = in_flight.target_id.clone();
        inner.current = target;
        inner.current_id = target_id;
        trace!("Transition {} swapped root", ticket.id);
        Ok(())
    }

    /// Discards the overlay, commits the target as the sole current screen
    /// and returns to `Idle`.
    pub fn complete(&self, ticket: &TransitionTicket) -> Result<Arc<F::Screen>, NavigationError> {
        let committed = {
            let mut inner = self.lock();
            let in_flight = match inner.in_flight.take() {
                Some(f) if f.ticket_id == ticket.id => f,
                other => {
                    inner.in_flight = other;
                    return Err(NavigationError::StaleTransition);
                }
            };
            inner.current = Arc::clone(&in_flight.target);
            inner.current_id = in_flight.target_id;
            Arc::clone(&inner.current)
        };
        self.busy.store(false, Ordering::Release);

        info!("Transition {} committed '{}'", ticket.id, ticket.target);
        let _ = self.events.send(NavigationEvent::Committed {
            screen: ticket.target.clone(),
        });
        Ok(committed)
    }

    fn lock(&self) -> MutexGuard<'_, Inner<F::Screen>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Returns the machine to `Idle` if `begin` is dropped or unwinds while the
/// target screen is still being built.
struct ReleaseOnDrop<'a, F: ScreenFactory> {
    controller: &'a TransitionController<F>,
    target: Option<ScreenId>,
}

impl<F: ScreenFactory> ReleaseOnDrop<'_, F> {
    fn disarm(mut self) {
        self.target = None;
    }
}

impl<F: ScreenFactory> Drop for ReleaseOnDrop<'_, F> {
    fn drop(&mut self) {
        if let Some(target) = self.target.take() {
            warn!("Navigation to '{}' cancelled while building", target);
            self.controller.busy.store(false, Ordering::Release);
            let error = NavigationError::Cancelled(target.to_string());
            let _ = self.controller.events.send(NavigationEvent::Failed { target, error });
        }
    }
}

/// Commits the transition if the driving future is dropped mid-animation,
/// so the machine cannot stay stuck in `Transitioning`.
struct CommitOnDrop<'a, F: ScreenFactory> {
    controller: &'a TransitionController<F>,
    ticket: Option<TransitionTicket>,
}

impl<F: ScreenFactory> CommitOnDrop<'_, F> {
    fn finish(mut self) -> Result<Arc<F::Screen>, NavigationError> {
        match self.ticket.take() {
            Some(ticket) => self.controller.complete(&ticket),
            None => Err(NavigationError::StaleTransition),
        }
    }
}

impl<F: ScreenFactory> Drop for CommitOnDrop<'_, F> {
    fn drop(&mut self) {
        if let Some(ticket) = self.ticket.take() {
            debug!("Transition {} dropped mid-animation, committing", ticket.id);
            let _ = self.controller.complete(&ticket);
        }
    }
}
