//! Listener dispatcher worker.
//!
//! This module owns the registered observer and delivers `ContentEvent`s to it
//! on a dedicated thread. Producers enqueue through an unbounded channel and
//! never block, so events can be emitted while the session state lock is
//! held; the single consumer then delivers them in exactly that order.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, unbounded, Receiver, RecvTimeoutError, Sender};

use super::events::{ContentEvent, ContentListener};
use crate::error::{WaveCxError, WaveCxResult};

pub(crate) enum DispatchMsg {
    SetListener(Option<Arc<dyn ContentListener>>),
    Event(ContentEvent),
    Flush(Sender<()>),
}

/// Cheap handle used by producers to enqueue events.
#[derive(Clone)]
pub struct EventSink {
    tx: Sender<DispatchMsg>,
}

impl EventSink {
    /// Enqueues an event for delivery. Never blocks.
    pub fn emit(&self, event: ContentEvent) {
        // Disconnected only after the dispatcher is gone; nothing left to notify.
        let _ = self.tx.send(DispatchMsg::Event(event));
    }
}

impl std::fmt::Debug for EventSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventSink").finish_non_exhaustive()
    }
}

/// Owns the observer slot and the delivery thread.
pub struct ListenerDispatcher {
    tx: Sender<DispatchMsg>,
    delivered: Arc<AtomicU64>,
    panicked: Arc<AtomicU64>,
    join: Mutex<Option<JoinHandle<()>>>,
}

impl ListenerDispatcher {
    /// Spawns the delivery thread.
    ///
    /// With `verbose` set, every delivered event is logged with its details.
    pub fn start(verbose: bool) -> WaveCxResult<Self> {
        let (tx, rx) = unbounded::<DispatchMsg>();
        let delivered = Arc::new(AtomicU64::new(0));
        let panicked = Arc::new(AtomicU64::new(0));

        let thread_delivered = Arc::clone(&delivered);
        let thread_panicked = Arc::clone(&panicked);
        let join = thread::Builder::new()
            .name("wavecx-listener".to_string())
            .spawn(move || worker_loop(&rx, verbose, &thread_delivered, &thread_panicked))
            .map_err(|e| WaveCxError::internal(format!("failed to spawn listener dispatcher: {e}")))?;

        Ok(Self {
            tx,
            delivered,
            panicked,
            join: Mutex::new(Some(join)),
        })
    }

    /// Producer handle for this dispatcher.
    #[must_use]
    pub fn sink(&self) -> EventSink {
        EventSink { tx: self.tx.clone() }
    }

    /// Replaces the observer. Events already queued before this call go to the
    /// previous observer; nothing is replayed to the new one.
    pub fn set_listener(&self, listener: Arc<dyn ContentListener>) {
        let _ = self.tx.send(DispatchMsg::SetListener(Some(listener)));
    }

    /// Removes the observer. Later events are dropped until one is set again.
    pub fn clear_listener(&self) {
        let _ = self.tx.send(DispatchMsg::SetListener(None));
    }

    /// Waits until every event enqueued before this call has been delivered.
    ///
    /// Must not be called from inside a listener callback: the dispatcher
    /// thread would wait on itself until `timeout` expires.
    pub fn flush(&self, timeout: Duration) -> WaveCxResult<()> {
        let (reply_tx, reply_rx) = bounded::<()>(1);
        self.tx.send(DispatchMsg::Flush(reply_tx)).map_err(|_| WaveCxError::Disconnected {
            path: "listener_dispatcher".to_string(),
        })?;

        reply_rx.recv_timeout(timeout).map_err(|err| match err {
            RecvTimeoutError::Timeout => WaveCxError::Timeout {
                duration_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            },
            RecvTimeoutError::Disconnected => WaveCxError::Disconnected {
                path: "listener_dispatcher".to_string(),
            },
        })
    }

    /// Number of events handed to an observer so far.
    #[must_use]
    pub fn delivered_events(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }

    /// Number of callbacks that panicked.
    #[must_use]
    pub fn panicked_callbacks(&self) -> u64 {
        self.panicked.load(Ordering::Relaxed)
    }
}

impl std::fmt::Debug for ListenerDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerDispatcher")
            .field("delivered", &self.delivered_events())
            .finish_non_exhaustive()
    }
}

impl Drop for ListenerDispatcher {
    fn drop(&mut self) {
        // Close our sender so the worker exits once every sink is gone too.
        let (dummy_tx, _) = unbounded::<DispatchMsg>();
        drop(std::mem::replace(&mut self.tx, dummy_tx));

        if let Ok(mut guard) = self.join.lock() {
            // Detach: sinks held elsewhere keep the channel open, joining here could hang.
            drop(guard.take());
        }
    }
}

fn worker_loop(rx: &Receiver<DispatchMsg>, verbose: bool, delivered: &AtomicU64, panicked: &AtomicU64) {
    let mut listener: Option<Arc<dyn ContentListener>> = None;

    for msg in rx {
        match msg {
            DispatchMsg::SetListener(next) => {
                tracing::debug!(registered = next.is_some(), "content listener replaced");
                listener = next;
            }
            DispatchMsg::Event(event) => {
                let Some(current) = listener.as_ref() else {
                    continue;
                };

                if verbose {
                    tracing::info!(event = event.name(), details = ?event, "delivering content event");
                }

                let outcome = panic::catch_unwind(AssertUnwindSafe(|| event.deliver_to(current.as_ref())));
                delivered.fetch_add(1, Ordering::Relaxed);
                if outcome.is_err() {
                    panicked.fetch_add(1, Ordering::Relaxed);
                    tracing::warn!(event = event.name(), "content listener panicked");
                }
            }
            DispatchMsg::Flush(reply) => {
                let _ = reply.send(());
            }
        }
    }
}
