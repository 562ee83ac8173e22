//! Content events and the observer interface.

use crate::content::ContentItem;
use crate::error::WaveCxError;

/// Observer for cache and presentation events.
///
/// All methods default to no-ops so an observer only implements what it
/// cares about. Callbacks run on the SDK's dispatcher thread, one at a time,
/// in the order the underlying mutations happened. Calling back into the SDK
/// from a callback is allowed.
pub trait ContentListener: Send + Sync {
    /// A session's catalog arrived and was installed.
    fn on_content_received(&self, _items: &[ContentItem]) {}

    /// An item moved to `Presented`; the rendering layer should show it.
    fn on_content_presented(&self, _item: &ContentItem) {}

    /// A presented item was dismissed.
    fn on_content_dismissed(&self, _item: &ContentItem) {}

    /// Trigger point availability may have changed; recompute badges.
    fn on_content_changed(&self) {}

    /// A fetch or command failed.
    fn on_error(&self, _error: &WaveCxError) {}
}

/// Tagged union of everything a listener can be told.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentEvent {
    /// Full catalog of a newly installed snapshot.
    Received(Vec<ContentItem>),
    /// Item that just became `Presented`.
    Presented(ContentItem),
    /// Item that just became `Dismissed`.
    Dismissed(ContentItem),
    /// Eligibility changed somewhere.
    Changed,
    /// Failed fetch or command.
    Error(WaveCxError),
}

impl ContentEvent {
    /// Short name used in logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Received(_) => "received",
            Self::Presented(_) => "presented",
            Self::Dismissed(_) => "dismissed",
            Self::Changed => "changed",
            Self::Error(_) => "error",
        }
    }

    /// Invokes the matching callback on `listener`.
    pub fn deliver_to(&self, listener: &dyn ContentListener) {
        match self {
            Self::Received(items) => listener.on_content_received(items),
            Self::Presented(item) => listener.on_content_presented(item),
            Self::Dismissed(item) => listener.on_content_dismissed(item),
            Self::Changed => listener.on_content_changed(),
            Self::Error(error) => listener.on_error(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        calls: Mutex<Vec<&'static str>>,
    }

    impl ContentListener for Recorder {
        fn on_content_presented(&self, _item: &ContentItem) {
            self.calls.lock().unwrap().push("presented");
        }

        fn on_content_changed(&self) {
            self.calls.lock().unwrap().push("changed");
        }
    }

    #[test]
    fn deliver_routes_to_matching_callback() {
        let recorder = Recorder::default();
        let item = ContentItem::popup("home", serde_json::json!({}));

        ContentEvent::Presented(item.clone()).deliver_to(&recorder);
        ContentEvent::Changed.deliver_to(&recorder);
        // Not overridden: default no-op.
        ContentEvent::Dismissed(item).deliver_to(&recorder);

        assert_eq!(*recorder.calls.lock().unwrap(), vec!["presented", "changed"]);
    }
}
