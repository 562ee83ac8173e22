//! Mock content source.
//!
//! Synthesizes one item per configured trigger point and completes after a
//! simulated network delay. The delay is an awaited timer on the fetch
//! runtime, so neither the caller nor the runtime thread is blocked. This
//! source never fails.

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{ContentSource, FetchRequest};
use crate::content::{ContentItem, ContentKind};
use crate::error::FetchError;

/// Trigger points synthesized when mock mode has no custom content.
pub const DEFAULT_MOCK_TRIGGER_POINTS: [&str; 6] = [
    "account-dashboard",
    "low-balance-alert",
    "savings-promotion",
    "credit-card-offer",
    "investment-promotion",
    "banking-services",
];

/// One synthesized catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MockContent {
    /// Trigger point the item is bound to.
    pub trigger_point: String,
    /// Explicit kind; defaults to alternating popup / button-triggered by position.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ContentKind>,
    /// Explicit payload; defaults to a synthesized title/body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
}

impl MockContent {
    /// Entry with default kind and payload.
    #[must_use]
    pub fn new(trigger_point: impl Into<String>) -> Self {
        Self {
            trigger_point: trigger_point.into(),
            kind: None,
            payload: None,
        }
    }

    /// Overrides the kind.
    #[must_use]
    pub const fn with_kind(mut self, kind: ContentKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Overrides the payload.
    #[must_use]
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = Some(payload);
        self
    }

    fn to_item(&self, position: usize) -> ContentItem {
        let kind = self.kind.unwrap_or_else(|| default_kind(position));
        let payload = self
            .payload
            .clone()
            .unwrap_or_else(|| synthesized_payload(&self.trigger_point, kind));
        ContentItem::new(self.trigger_point.clone(), kind, payload)
    }
}

/// Builds mock entries for `codes`, alternating kinds starting with popup.
///
/// # Examples
///
/// ```
/// use wavecx::{generate_mock_content, ContentKind};
///
/// let entries = generate_mock_content(["a", "b"]);
/// assert_eq!(entries[0].kind, Some(ContentKind::Popup));
/// assert_eq!(entries[1].kind, Some(ContentKind::ButtonTriggered));
/// ```
pub fn generate_mock_content<I, S>(codes: I) -> Vec<MockContent>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    codes
        .into_iter()
        .enumerate()
        .map(|(pos, code)| {
            let code = code.into();
            let kind = default_kind(pos);
            let payload = synthesized_payload(&code, kind);
            MockContent {
                trigger_point: code,
                kind: Some(kind),
                payload: Some(payload),
            }
        })
        .collect()
}

const fn default_kind(position: usize) -> ContentKind {
    if position % 2 == 0 {
        ContentKind::Popup
    } else {
        ContentKind::ButtonTriggered
    }
}

fn synthesized_payload(trigger_point: &str, kind: ContentKind) -> serde_json::Value {
    let title = trigger_point
        .split(['-', '_'])
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            chars.next().map_or_else(String::new, |c| {
                c.to_uppercase().chain(chars).collect::<String>()
            })
        })
        .collect::<Vec<_>>()
        .join(" ");

    serde_json::json!({
        "title": title,
        "body": format!("Mock {} content for '{}'", kind, trigger_point),
        "triggerPoint": trigger_point,
        "mock": true,
    })
}

/// Offline content source with a simulated network delay.
#[derive(Debug)]
pub struct MockContentSource {
    entries: Vec<MockContent>,
    delay: Duration,
    fetch_count: AtomicU32,
}

impl MockContentSource {
    /// Source synthesizing `entries` after `delay`.
    #[must_use]
    pub fn new(entries: Vec<MockContent>, delay: Duration) -> Self {
        Self {
            entries,
            delay,
            fetch_count: AtomicU32::new(0),
        }
    }

    /// Source with one default entry per trigger point.
    #[must_use]
    pub fn for_trigger_points<I, S>(codes: I, delay: Duration) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(codes.into_iter().map(MockContent::new).collect(), delay)
    }

    /// Source over [`DEFAULT_MOCK_TRIGGER_POINTS`].
    #[must_use]
    pub fn with_defaults(delay: Duration) -> Self {
        Self::for_trigger_points(DEFAULT_MOCK_TRIGGER_POINTS, delay)
    }

    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }

    #[must_use]
    pub fn entries(&self) -> &[MockContent] {
        &self.entries
    }

    /// Number of fetches started so far.
    pub fn fetch_count(&self) -> u32 {
        self.fetch_count.load(Ordering::SeqCst)
    }

    /// Builds a fresh catalog (new ids every call).
    #[must_use]
    pub fn synthesize(&self) -> Vec<ContentItem> {
        self.entries
            .iter()
            .enumerate()
            .map(|(pos, entry)| entry.to_item(pos))
            .collect()
    }
}

#[async_trait]
impl ContentSource for MockContentSource {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn fetch(&self, request: &FetchRequest) -> Result<Vec<ContentItem>, FetchError> {
        self.fetch_count.fetch_add(1, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let items = self.synthesize();
        tracing::debug!(
            session_id = %request.session_id,
            items = items.len(),
            "mock catalog synthesized"
        );
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Session;
    use crate::value::Attributes;
    use std::time::Instant;

    fn request() -> FetchRequest {
        FetchRequest::for_session("demo-org", &Session::start("u1", Attributes::new()))
    }

    #[test]
    fn kinds_alternate_unless_overridden() {
        let source = MockContentSource::new(
            vec![
                MockContent::new("a"),
                MockContent::new("b"),
                MockContent::new("c").with_kind(ContentKind::ButtonTriggered),
            ],
            Duration::ZERO,
        );

        let kinds: Vec<ContentKind> = source.synthesize().iter().map(ContentItem::kind).collect();
        assert_eq!(
            kinds,
            vec![ContentKind::Popup, ContentKind::ButtonTriggered, ContentKind::ButtonTriggered]
        );
    }

    #[test]
    fn synthesized_payload_has_title() {
        let entries = generate_mock_content(["low-balance-alert"]);
        let payload = entries[0].payload.as_ref().unwrap();
        assert_eq!(payload["title"], "Low Balance Alert");
        assert_eq!(payload["triggerPoint"], "low-balance-alert");
    }

    #[test]
    fn custom_payload_is_kept() {
        let source = MockContentSource::new(
            vec![MockContent::new("promo").with_payload(serde_json::json!({"html": "<b>hi</b>"}))],
            Duration::ZERO,
        );
        let items = source.synthesize();
        assert_eq!(items[0].payload()["html"], "<b>hi</b>");
    }

    #[test]
    fn every_synthesis_mints_new_ids() {
        let source = MockContentSource::with_defaults(Duration::ZERO);
        let first = source.synthesize();
        let second = source.synthesize();

        assert_eq!(first.len(), DEFAULT_MOCK_TRIGGER_POINTS.len());
        assert!(first.iter().zip(&second).all(|(a, b)| a.id() != b.id()));
    }

    #[tokio::test]
    async fn fetch_completes_after_delay() {
        let source = MockContentSource::for_trigger_points(["a", "b"], Duration::from_millis(50));
        let started = Instant::now();

        let items = source.fetch(&request()).await.unwrap();

        assert!(started.elapsed() >= Duration::from_millis(50));
        assert_eq!(items.len(), 2);
        assert_eq!(source.fetch_count(), 1);
    }

    #[test]
    fn mock_content_deserializes_from_camel_case() {
        let entry: MockContent = serde_json::from_value(serde_json::json!({
            "triggerPoint": "home",
            "kind": "button-triggered"
        }))
        .unwrap();
        assert_eq!(entry.kind, Some(ContentKind::ButtonTriggered));
        assert!(entry.payload.is_none());
    }
}
