//! User sessions and their lifecycle.
//!
//! A session identifies the user content is fetched for. Every start mints a
//! new `SessionId`; catalog fetches are tagged with it so a response that
//! arrives after the session ended (or was replaced) can be recognized and
//! dropped.

/// Session lifecycle, catalog refresh and presentation commands.
pub mod manager;

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::value::Attributes;

pub use manager::SessionManager;

/// Identity of one session start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Creates a new random session ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a session ID from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A user session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Identity of this session start.
    pub id: SessionId,
    /// Host-provided user identifier.
    pub user_id: String,
    /// Flat attributes forwarded to the content service.
    #[serde(default)]
    pub attributes: Attributes,
    /// When the session was started.
    pub started_at: DateTime<Utc>,
    /// False once the session has been ended.
    pub active: bool,
}

impl Session {
    /// Starts a new active session.
    #[must_use]
    pub fn start(user_id: impl Into<String>, attributes: Attributes) -> Self {
        Self {
            id: SessionId::new(),
            user_id: user_id.into(),
            attributes,
            started_at: Utc::now(),
            active: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_start_gets_a_new_identity() {
        let a = Session::start("u1", Attributes::new());
        let b = Session::start("u1", Attributes::new());

        assert!(a.active);
        assert_eq!(a.user_id, "u1");
        assert_ne!(a.id, b.id);
    }
}
