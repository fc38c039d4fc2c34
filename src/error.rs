//! Error handling for the padel client

use std::fmt;
use std::io;
use std::time::Duration;
use thiserror::Error;

use crate::navigation::NavigationError;

/// Coarse classification of a [`ClientError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Connect, write or read failure on the socket.
    Transport,
    /// Missing or unparsable response line.
    Protocol,
}

/// Failure of a single request/response exchange.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Could not connect to {addr}: {source}")]
    ConnectFailed {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write request: {0}")]
    WriteFailed(#[source] io::Error),

    #[error("Failed to read response: {0}")]
    ReadFailed(#[source] io::Error),

    /// The peer closed the connection without sending a line.
    #[error("Server closed the connection without responding")]
    NoResponse,

    #[error("Malformed response: {0}")]
    MalformedResponse(#[source] serde_json::Error),

    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),
}

impl ClientError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::NoResponse | ClientError::MalformedResponse(_) => ErrorKind::Protocol,
            _ => ErrorKind::Transport,
        }
    }
}

/// Unified error type for the padel client
#[derive(Error, Debug)]
pub enum Error {
    /// Transport or protocol failure talking to the server
    #[error(transparent)]
    Client(#[from] ClientError),

    /// Well-formed response with `status: "error"`
    #[error("{0}")]
    Application(String),

    /// Screen construction failed or a transition was already running
    #[error("Navigation error: {0}")]
    Navigation(#[from] NavigationError),

    /// Form input rejected before anything was sent
    #[error("{0}")]
    Validation(String),

    /// The action needs a logged-in member
    #[error("Not logged in")]
    NotLoggedIn,

    /// The action needs an active subscription
    #[error("Your membership is inactive. Please renew or contact support.")]
    InactiveMembership,

    /// JSON serialization or payload decoding errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Endpoint URL parsing errors
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// General errors
    #[error("{0}")]
    General(String),
}

impl Error {
    pub fn application<T: fmt::Display>(msg: T) -> Self {
        Error::Application(msg.to_string())
    }

    pub fn validation<T: fmt::Display>(msg: T) -> Self {
        Error::Validation(msg.to_string())
    }

    pub fn general<T: fmt::Display>(msg: T) -> Self {
        Error::General(msg.to_string())
    }

    /// Text to show the user at the screen-action boundary.
    ///
    /// Server messages are shown verbatim; transport and protocol failures
    /// get a generic prefix followed by the detail. A reply that arrived but
    /// whose payload could not be decoded is reported as unexpected.
    pub fn user_message(&self) -> String {
        match self {
            Error::Application(msg) | Error::Validation(msg) => msg.clone(),
            Error::Client(err) => format!("Could not reach server: {}", err),
            Error::Json(err) => format!("Unexpected response from server: {}", err),
            other => other.to_string(),
        }
    }

    pub fn is_application(&self) -> bool {
        matches!(self, Error::Application(_))
    }
}
