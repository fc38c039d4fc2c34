#![allow(dead_code)]

use padel_client::config::ClientOptions;
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;

/// What the mock server does after reading a request line.
pub enum Reply {
    Line(String),
    /// Close the connection without writing anything.
    Close,
    /// Keep the connection open and never answer.
    Hang,
}

/// Requests received by the mock server, in arrival order.
pub type Received = Arc<Mutex<Vec<Value>>>;

/// Start a line-JSON mock server on an ephemeral port.
pub async fn start_mock_server<F>(handler: F) -> (SocketAddr, Received)
where
    F: Fn(&Value) -> Reply + Send + Sync + 'static,
{
    let _ = pretty_env_logger::try_init();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let received: Received = Arc::new(Mutex::new(Vec::new()));
    let handler = Arc::new(handler);

    let log = received.clone();
    tokio::spawn(async move {
        while let Ok((stream, _peer)) = listener.accept().await {
            let handler = handler.clone();
            let log = log.clone();
            tokio::spawn(async move {
                let (reader, mut writer) = stream.into_split();
                let mut line = String::new();
                if BufReader::new(reader).read_line(&mut line).await.unwrap_or(0) == 0 {
                    return;
                }
                let request: Value = serde_json::from_str(line.trim()).unwrap_or(Value::Null);
                log.lock().unwrap().push(request.clone());

                match handler(&request) {
                    Reply::Line(text) => {
                        let _ = writer.write_all(format!("{}\n", text).as_bytes()).await;
                    }
                    Reply::Close => {}
                    Reply::Hang => tokio::time::sleep(Duration::from_secs(3600)).await,
                }
            });
        }
    });

    (addr, received)
}

/// Always answer with the same line.
pub async fn start_fixed_server(reply: &str) -> (SocketAddr, Received) {
    let reply = reply.to_string();
    start_mock_server(move |_| Reply::Line(reply.clone())).await
}

pub fn options_for(addr: SocketAddr) -> ClientOptions {
    ClientOptions::default()
        .with_host("127.0.0.1")
        .with_port(addr.port())
        .with_read_timeout(Some(Duration::from_millis(500)))
}

/// A local port with nothing listening on it.
pub async fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}
