//! Padel Club Client Library
//!
//! The communication and session layer behind the club's desktop screens:
//! a one-request-per-connection JSON line protocol, the member session
//! shared by every screen, and a guarded screen navigation state machine.

pub mod api;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod fetch;
pub mod protocol;
pub mod session;
pub mod validation;

pub use padel_navigation as navigation;

use crate::api::PadelApi;
use crate::config::ClientOptions;
use crate::dispatch::Dispatcher;
use crate::error::Error;
use crate::fetch::RequestClient;
use crate::session::SessionHandle;

/// The main entry point: request client, action API and session context
pub struct PadelClient {
    /// Client options
    pub options: ClientOptions,
    /// Typed server actions
    pub api: PadelApi,
    /// Session shared with every screen
    pub session: SessionHandle,
}

impl PadelClient {
    /// Create a client for `host:port` with default options
    ///
    /// # Example
    ///
    /// ```
    /// use padel_client::PadelClient;
    ///
    /// let client = PadelClient::new("localhost", 8080);
    /// assert!(!client.session().is_logged_in());
    /// ```
    pub fn new(host: &str, port: u16) -> Self {
        Self::new_with_options(ClientOptions::default().with_host(host).with_port(port))
    }

    /// Create a client with custom options
    ///
    /// # Example
    ///
    /// ```
    /// use std::time::Duration;
    /// use padel_client::{PadelClient, config::ClientOptions};
    ///
    /// let options = ClientOptions::default()
    ///     .with_port(9000)
    ///     .with_read_timeout(Some(Duration::from_secs(5)));
    /// let client = PadelClient::new_with_options(options);
    /// ```
    pub fn new_with_options(options: ClientOptions) -> Self {
        let api = PadelApi::new(RequestClient::new(options.clone()));
        Self {
            options,
            api,
            session: SessionHandle::new(),
        }
    }

    pub fn api(&self) -> &PadelApi {
        &self.api
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    /// Dispatcher for running requests off the interactive thread.
    /// Must be called from within a tokio runtime.
    pub fn dispatcher<T: Send + 'static>(&self) -> Result<Dispatcher<T>, Error> {
        Dispatcher::new(self.api.client().clone())
    }

    /// Forget the logged-in member.
    pub fn logout(&self) {
        log::info!("Logging out");
        self.session.lock().clear();
    }
}

/// A convenience module for common imports
pub mod prelude {
    pub use crate::api::{LoginOutcome, PadelApi};
    pub use crate::config::ClientOptions;
    pub use crate::dispatch::{Completion, Dispatcher};
    pub use crate::error::{ClientError, Error};
    pub use crate::navigation::{Direction, ScreenFactory, ScreenId, TransitionController};
    pub use crate::protocol::{
        Action, CourtBooking, MemberDetails, PlanChoice, Request, Response, Status,
        SubscriptionPlan,
    };
    pub use crate::session::{LoginData, SessionHandle, SessionState};
    pub use crate::PadelClient;
}
