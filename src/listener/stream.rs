use std::time::Duration;

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender, TryRecvError};

use super::events::{ContentEvent, ContentListener};
use crate::content::ContentItem;
use crate::error::{WaveCxError, WaveCxResult};

/// Creates a listener that forwards every callback into an [`EventStream`].
///
/// Register the listener with `WaveCx::set_listener` and consume the stream
/// from any thread.
#[must_use]
pub fn event_channel() -> (ChannelListener, EventStream) {
    let (tx, rx) = unbounded();
    (ChannelListener { tx }, EventStream { rx })
}

/// Listener that turns callbacks back into [`ContentEvent`]s.
#[derive(Debug, Clone)]
pub struct ChannelListener {
    tx: Sender<ContentEvent>,
}

impl ChannelListener {
    fn forward(&self, event: ContentEvent) {
        // The stream side may have been dropped; the host stopped listening.
        let _ = self.tx.send(event);
    }
}

impl ContentListener for ChannelListener {
    fn on_content_received(&self, items: &[ContentItem]) {
        self.forward(ContentEvent::Received(items.to_vec()));
    }

    fn on_content_presented(&self, item: &ContentItem) {
        self.forward(ContentEvent::Presented(item.clone()));
    }

    fn on_content_dismissed(&self, item: &ContentItem) {
        self.forward(ContentEvent::Dismissed(item.clone()));
    }

    fn on_content_changed(&self) {
        self.forward(ContentEvent::Changed);
    }

    fn on_error(&self, error: &WaveCxError) {
        self.forward(ContentEvent::Error(error.clone()));
    }
}

/// Receiving end of an [`event_channel`].
#[derive(Debug)]
pub struct EventStream {
    rx: Receiver<ContentEvent>,
}

impl EventStream {
    /// Receive the next event (blocking).
    pub fn recv(&self) -> WaveCxResult<ContentEvent> {
        self.rx.recv().map_err(|_| WaveCxError::Disconnected {
            path: "event_stream".to_string(),
        })
    }

    /// Receive the next event with a timeout.
    pub fn recv_timeout(&self, timeout: Duration) -> WaveCxResult<ContentEvent> {
        self.rx.recv_timeout(timeout).map_err(|err| match err {
            RecvTimeoutError::Timeout => WaveCxError::Timeout {
                duration_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            },
            RecvTimeoutError::Disconnected => WaveCxError::Disconnected {
                path: "event_stream".to_string(),
            },
        })
    }

    /// Next event if one is already queued.
    pub fn try_recv(&self) -> Option<ContentEvent> {
        match self.rx.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Drains everything queued right now.
    pub fn drain(&self) -> Vec<ContentEvent> {
        self.rx.try_iter().collect()
    }
}
