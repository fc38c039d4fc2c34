//! Off-thread request execution with results delivered over a channel
//!
//! The interactive loop submits requests and later drains [`Completion`]s,
//! applying each result on its own thread. At most `max_in_flight` requests
//! run at once; completions arrive in whatever order the server answers.

use log::{debug, trace};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, Semaphore};

use crate::error::{ClientError, Error};
use crate::fetch::RequestClient;
use crate::protocol::{Request, Response};

pub type RequestId = u64;

/// Outcome of one submitted request, tagged with the caller's context.
#[derive(Debug)]
pub struct Completion<T> {
    pub id: RequestId,
    pub tag: T,
    pub result: Result<Response, ClientError>,
}

impl<T> Completion<T> {
    /// Split into the tag and the result with `status: "error"` mapped to
    /// [`Error::Application`].
    pub fn into_parts(self) -> (T, Result<Response, Error>) {
        let result = self
            .result
            .map_err(Error::from)
            .and_then(Response::into_result);
        (self.tag, result)
    }
}

pub struct Dispatcher<T> {
    client: RequestClient,
    runtime: Handle,
    permits: Arc<Semaphore>,
    next_id: AtomicU64,
    tx: mpsc::Sender<Completion<T>>,
    rx: mpsc::Receiver<Completion<T>>,
}

impl<T: Send + 'static> Dispatcher<T> {
    /// Create a dispatcher on the runtime of the calling context.
    pub fn new(client: RequestClient) -> Result<Self, Error> {
        let runtime = Handle::try_current().map_err(Error::general)?;
        Ok(Self::with_handle(client, runtime))
    }

    pub fn with_handle(client: RequestClient, runtime: Handle) -> Self {
        let options = client.options();
        let (tx, rx) = mpsc::channel(options.completion_capacity.max(1));
        let permits = Arc::new(Semaphore::new(options.max_in_flight.max(1)));
        Self {
            client,
            runtime,
            permits,
            next_id: AtomicU64::new(1),
            tx,
            rx,
        }
    }

    /// Queue `request`; its completion carries `tag` back.
    pub fn submit(&self, tag: T, request: Request) -> RequestId {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let client = self.client.clone();
        let permits = Arc::clone(&self.permits);
        let tx = self.tx.clone();

        debug!("Queued request {} ('{}')", id, request.action);
        self.runtime.spawn(async move {
            // The semaphore is never closed, so this only waits for a slot.
            let permit = permits.acquire_owned().await.ok();
            trace!("Request {} running", id);
            let result = client.send(&request).await;
            drop(permit);

            if tx.send(Completion { id, tag, result }).await.is_err() {
                debug!("Dispatcher dropped before request {} completed", id);
            }
        });
        id
    }

    /// Next finished request, without waiting.
    pub fn try_next(&mut self) -> Option<Completion<T>> {
        self.rx.try_recv().ok()
    }

    /// Wait for the next finished request.
    pub async fn next(&mut self) -> Option<Completion<T>> {
        self.rx.recv().await
    }

    /// Wait for the next finished request from a thread outside the runtime.
    ///
    /// Panics if called from within an async context.
    pub fn blocking_next(&mut self) -> Option<Completion<T>> {
        self.rx.blocking_recv()
    }

    /// Requests that could start right now without waiting for a slot.
    pub fn available_slots(&self) -> usize {
        self.permits.available_permits()
    }
}
