//! Line-oriented JSON transport to the club server
//!
//! One request per connection: connect, write one JSON line, read one JSON
//! line, close. Nothing is pooled or retried.

use log::{debug, trace, warn};
use serde::Serialize;
use std::future::Future;
use std::io;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::config::ClientOptions;
use crate::error::ClientError;
use crate::protocol::{Request, Response};

/// Sends requests to one statically configured endpoint
#[derive(Debug, Clone)]
pub struct RequestClient {
    options: ClientOptions,
}

impl RequestClient {
    pub fn new(options: ClientOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// Perform one exchange. Transport and protocol failures are returned
    /// as-is; a `status: "error"` response is still `Ok` here.
    pub async fn send(&self, request: &Request) -> Result<Response, ClientError> {
        debug!("Sending '{}' to {}", request.action, self.options.address());
        let result = exchange(&self.options, request).await;
        match &result {
            Ok(response) => debug!("'{}' answered with {:?}", request.action, response.status),
            Err(err) => warn!("'{}' failed: {}", request.action, err),
        }
        result
    }
}

/// Send any serializable payload to `host:port` with the default timeouts.
pub async fn send<T: Serialize + ?Sized>(
    host: &str,
    port: u16,
    payload: &T,
) -> Result<Response, ClientError> {
    let options = ClientOptions::default().with_host(host).with_port(port);
    exchange(&options, payload).await
}

async fn exchange<T: Serialize + ?Sized>(
    options: &ClientOptions,
    payload: &T,
) -> Result<Response, ClientError> {
    let mut line = serde_json::to_string(payload)
        .map_err(|e| ClientError::WriteFailed(io::Error::new(io::ErrorKind::InvalidData, e)))?;
    line.push('\n');

    let addr = options.address();
    let mut stream = with_timeout(options.connect_timeout, TcpStream::connect(addr.as_str()))
        .await?
        .map_err(|source| ClientError::ConnectFailed {
            addr: addr.clone(),
            source,
        })?;
    trace!("Connected to {}", addr);

    let result = with_timeout(options.read_timeout, round_trip(&mut stream, &line))
        .await
        .and_then(|inner| inner);

    // Closed on every path; the peer may already be gone.
    if let Err(e) = stream.shutdown().await {
        trace!("Shutdown of {} failed: {}", addr, e);
    }
    result
}

async fn round_trip(stream: &mut TcpStream, line: &str) -> Result<Response, ClientError> {
    let (reader, mut writer) = stream.split();

    writer
        .write_all(line.as_bytes())
        .await
        .map_err(ClientError::WriteFailed)?;
    writer.flush().await.map_err(ClientError::WriteFailed)?;

    let mut reply = String::new();
    let read = BufReader::new(reader)
        .read_line(&mut reply)
        .await
        .map_err(|e| match e.kind() {
            io::ErrorKind::ConnectionReset | io::ErrorKind::UnexpectedEof => ClientError::NoResponse,
            _ => ClientError::ReadFailed(e),
        })?;
    if read == 0 {
        return Err(ClientError::NoResponse);
    }

    serde_json::from_str(reply.trim_end()).map_err(ClientError::MalformedResponse)
}

async fn with_timeout<F: Future>(limit: Option<Duration>, fut: F) -> Result<F::Output, ClientError> {
    match limit {
        Some(limit) => timeout(limit, fut)
            .await
            .map_err(|_| ClientError::Timeout(limit)),
        None => Ok(fut.await),
    }
}
