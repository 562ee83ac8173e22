//! Listener subsystem: one observer, ordered delivery.
//!
//! Cache mutations enqueue `ContentEvent`s through an `EventSink`; the
//! dispatcher thread hands them to the registered `ContentListener` in the
//! same order. Hosts that prefer a pull model can register the
//! `ChannelListener` half of an `event_channel` and read an `EventStream`.

/// Observer slot and delivery thread.
pub mod dispatcher;
/// Event union and observer trait.
pub mod events;
/// Channel-backed listener and stream handle.
pub mod stream;

pub use dispatcher::{EventSink, ListenerDispatcher};
pub use events::{ContentEvent, ContentListener};
pub use stream::{event_channel, ChannelListener, EventStream};
