//! Navigation error type

use thiserror::Error;

/// Errors raised while moving between screens.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NavigationError {
    /// A transition is already running; the request was rejected, not queued.
    #[error("A screen transition is already in progress")]
    AlreadyTransitioning,

    #[error("Screen not found: {0}")]
    ScreenNotFound(String),

    #[error("Failed to build screen '{screen}': {reason}")]
    BuildFailed { screen: String, reason: String },

    /// The caller gave up on the transition before its screen was built.
    #[error("Building screen '{0}' was cancelled")]
    Cancelled(String),

    /// The ticket does not belong to the transition currently in flight.
    #[error("Transition ticket is stale")]
    StaleTransition,
}

impl NavigationError {
    pub fn build_failed<S: Into<String>, R: std::fmt::Display>(screen: S, reason: R) -> Self {
        Self::BuildFailed {
            screen: screen.into(),
            reason: reason.to_string(),
        }
    }
}
