//! Content items and their identity.
//!
//! A catalog is the list of `ContentItem`s returned by one fetch. Item ids are
//! minted on the client when an item is created, so two fetches never share
//! ids even if the service returns the same content twice.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::presentation::PresentationState;

/// Unique identifier of a content item within a catalog snapshot.
///
/// # Examples
///
/// ```
/// use wavecx::ContentId;
///
/// let id = ContentId::new();
/// assert!(!id.is_nil());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentId(Uuid);

impl ContentId {
    /// Creates a new random content ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a content ID from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Returns true if this is a nil (all zeros) UUID.
    #[must_use]
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

impl Default for ContentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How a content item reaches the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContentKind {
    /// Presented automatically when its trigger point fires.
    Popup,
    /// Presented only when the host explicitly asks (usually a button tap).
    ButtonTriggered,
}

impl ContentKind {
    /// Canonical string form (`"popup"` / `"button-triggered"`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Popup => "popup",
            Self::ButtonTriggered => "button-triggered",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string does not name a [`ContentKind`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown content kind '{0}'")]
pub struct UnknownContentKind(pub String);

impl FromStr for ContentKind {
    type Err = UnknownContentKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "popup" => Ok(Self::Popup),
            "button-triggered" | "button" => Ok(Self::ButtonTriggered),
            _ => Err(UnknownContentKind(s.to_string())),
        }
    }
}

/// A single piece of contextual content bound to a trigger point.
///
/// Everything except the presentation state is fixed at creation. The state
/// is owned by the cache and only moves forward.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    id: ContentId,
    trigger_point: String,
    kind: ContentKind,
    payload: serde_json::Value,
    state: PresentationState,
}

impl ContentItem {
    /// Creates a new `Unseen` item with a fresh id.
    #[must_use]
    pub fn new(trigger_point: impl Into<String>, kind: ContentKind, payload: serde_json::Value) -> Self {
        Self {
            id: ContentId::new(),
            trigger_point: trigger_point.into(),
            kind,
            payload,
            state: PresentationState::Unseen,
        }
    }

    /// Creates a popup item.
    #[must_use]
    pub fn popup(trigger_point: impl Into<String>, payload: serde_json::Value) -> Self {
        Self::new(trigger_point, ContentKind::Popup, payload)
    }

    /// Creates a button-triggered item.
    #[must_use]
    pub fn button_triggered(trigger_point: impl Into<String>, payload: serde_json::Value) -> Self {
        Self::new(trigger_point, ContentKind::ButtonTriggered, payload)
    }

    #[must_use]
    pub const fn id(&self) -> ContentId {
        self.id
    }

    #[must_use]
    pub fn trigger_point(&self) -> &str {
        &self.trigger_point
    }

    #[must_use]
    pub const fn kind(&self) -> ContentKind {
        self.kind
    }

    /// Opaque renderable data, handed untouched to the rendering layer.
    #[must_use]
    pub const fn payload(&self) -> &serde_json::Value {
        &self.payload
    }

    #[must_use]
    pub const fn state(&self) -> PresentationState {
        self.state
    }

    /// True while the item can still be presented.
    #[must_use]
    pub fn is_eligible(&self) -> bool {
        self.state == PresentationState::Unseen
    }

    pub(crate) fn state_mut(&mut self) -> &mut PresentationState {
        &mut self.state
    }
}
