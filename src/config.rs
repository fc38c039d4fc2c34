//! Configuration options for the padel client

use std::time::Duration;
use url::Url;

use crate::error::Error;

/// Configuration options for the padel client
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Server host name
    pub host: String,

    /// Server port
    pub port: u16,

    /// Limit on establishing the connection
    pub connect_timeout: Option<Duration>,

    /// Limit on writing the request and waiting for the response line
    pub read_timeout: Option<Duration>,

    /// Maximum number of requests the dispatcher runs at once
    pub max_in_flight: usize,

    /// Capacity of the dispatcher's completion queue
    pub completion_capacity: usize,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 8080,
            connect_timeout: Some(Duration::from_secs(5)),
            read_timeout: Some(Duration::from_secs(30)),
            max_in_flight: 4,
            completion_capacity: 64,
        }
    }
}

impl ClientOptions {
    /// Parse an endpoint of the form `tcp://host:port`.
    ///
    /// The port defaults to 8080 when omitted.
    pub fn from_url(endpoint: &str) -> Result<Self, Error> {
        let url = Url::parse(endpoint)?;
        if url.scheme() != "tcp" {
            return Err(Error::general(format!(
                "Unsupported endpoint scheme: {}",
                url.scheme()
            )));
        }
        let host = url
            .host_str()
            .ok_or(Error::Url(url::ParseError::EmptyHost))?;

        let defaults = Self::default();
        Ok(Self {
            host: host.to_string(),
            port: url.port().unwrap_or(defaults.port),
            ..defaults
        })
    }

    /// `host:port` string used for connecting and in log lines.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Set the server host
    pub fn with_host(mut self, value: &str) -> Self {
        self.host = value.to_string();
        self
    }

    /// Set the server port
    pub fn with_port(mut self, value: u16) -> Self {
        self.port = value;
        self
    }

    /// Set the connect timeout
    pub fn with_connect_timeout(mut self, value: Option<Duration>) -> Self {
        self.connect_timeout = value;
        self
    }

    /// Set the read timeout
    pub fn with_read_timeout(mut self, value: Option<Duration>) -> Self {
        self.read_timeout = value;
        self
    }

    /// Set the dispatcher concurrency bound (at least one)
    pub fn with_max_in_flight(mut self, value: usize) -> Self {
        self.max_in_flight = value.max(1);
        self
    }

    /// Set the dispatcher completion queue capacity (at least one)
    pub fn with_completion_capacity(mut self, value: usize) -> Self {
        self.completion_capacity = value.max(1);
        self
    }
}
