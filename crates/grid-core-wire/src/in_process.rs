//! Patch authority running on a worker thread of the host process.

use grid_core::{Patch, PatchAuthority, PatchError, PatchReply, PatchRequest};
use serde_json::Value;
use std::sync::mpsc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Edit handler invoked with the method name and the proposed patches.
///
/// `Ok` carries the accepted patch list (or any value, which the grid treats as malformed
/// unless it is an array of patches); `Err` carries the rejection value.
pub type PatchHandler = Box<dyn FnMut(&str, Vec<Patch>) -> Result<Value, Value> + Send>;

/// A [`PatchAuthority`] that answers requests from a handler closure on a worker thread.
///
/// # Example
///
/// ```rust
/// use grid_core::{EditKey, Patch, PatchAuthority, PatchRequest, PatchTicket};
/// use grid_core_wire::InProcessAuthority;
/// use serde_json::json;
/// use std::time::Duration;
///
/// let mut authority = InProcessAuthority::new(|_method: &str, patches: Vec<Patch>| {
///     Ok(serde_json::to_value(patches).unwrap_or_default())
/// });
/// let ticket = PatchTicket { id: 1, generation: 0, key: EditKey::new(0, 0) };
/// authority
///     .send(PatchRequest { ticket, method: "edit".into(), patches: vec![Patch::new(0, 0, "x")] })
///     .unwrap();
///
/// let replies = authority.poll_timeout(Duration::from_secs(5));
/// assert_eq!(replies[0].result, Ok(json!([{"row_index": 0, "column_index": 0, "value": "x"}])));
/// ```
pub struct InProcessAuthority {
    tx: Option<mpsc::Sender<PatchRequest>>,
    rx: mpsc::Receiver<PatchReply>,
    worker: Option<JoinHandle<()>>,
}

impl InProcessAuthority {
    /// Start a worker answering with `handler`.
    pub fn new<F>(handler: F) -> Self
    where
        F: FnMut(&str, Vec<Patch>) -> Result<Value, Value> + Send + 'static,
    {
        Self::with_latency(handler, Duration::ZERO)
    }

    /// Like [`new`](Self::new), but the worker sleeps `latency` before answering each request.
    pub fn with_latency<F>(handler: F, latency: Duration) -> Self
    where
        F: FnMut(&str, Vec<Patch>) -> Result<Value, Value> + Send + 'static,
    {
        let (tx_req, rx_req) = mpsc::channel::<PatchRequest>();
        let (tx_reply, rx_reply) = mpsc::channel::<PatchReply>();
        let handler: PatchHandler = Box::new(handler);
        let worker = thread::spawn(move || worker_loop(handler, latency, rx_req, tx_reply));

        Self {
            tx: Some(tx_req),
            rx: rx_reply,
            worker: Some(worker),
        }
    }

    /// Block until at least one reply arrives or `timeout` elapses, then drain.
    pub fn poll_timeout(&mut self, timeout: Duration) -> Vec<PatchReply> {
        let deadline = Instant::now() + timeout;
        let mut replies = Vec::new();
        let remaining = deadline.saturating_duration_since(Instant::now());
        if let Ok(reply) = self.rx.recv_timeout(remaining) {
            replies.push(reply);
        }
        replies.extend(self.rx.try_iter());
        replies
    }
}

impl PatchAuthority for InProcessAuthority {
    fn send(&mut self, request: PatchRequest) -> Result<(), PatchError> {
        let Some(tx) = &self.tx else {
            return Err(PatchError::Transport("authority worker stopped".into()));
        };
        tx.send(request)
            .map_err(|_| PatchError::Transport("authority worker stopped".into()))
    }

    fn poll(&mut self) -> Vec<PatchReply> {
        self.rx.try_iter().collect()
    }
}

impl Drop for InProcessAuthority {
    fn drop(&mut self) {
        // Closing the request channel ends the worker loop.
        self.tx.take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

fn worker_loop(
    mut handler: PatchHandler,
    latency: Duration,
    rx: mpsc::Receiver<PatchRequest>,
    tx: mpsc::Sender<PatchReply>,
) {
    for request in rx {
        if !latency.is_zero() {
            thread::sleep(latency);
        }
        tracing::debug!(
            method = %request.method,
            patches = request.patches.len(),
            "authority handling request"
        );
        let reply = match handler(&request.method, request.patches) {
            Ok(result) => PatchReply::accepted(request.ticket, result),
            Err(error) => PatchReply::rejected(request.ticket, &error),
        };
        if tx.send(reply).is_err() {
            break;
        }
    }
}
