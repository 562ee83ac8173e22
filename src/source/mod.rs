//! Content sources: where a session's catalog comes from.
//!
//! Two interchangeable providers implement [`ContentSource`]:
//! - [`NetworkContentSource`] asks the content service over HTTP
//! - [`MockContentSource`] synthesizes a catalog after a simulated delay
//!
//! The SDK picks one at initialization and never switches. Sources do not
//! cache; every session start triggers exactly one fetch.

/// Deterministic offline provider.
pub mod mock;
/// HTTP provider for the content service.
pub mod network;

use async_trait::async_trait;

use crate::content::ContentItem;
use crate::error::FetchError;
use crate::session::{Session, SessionId};
use crate::value::Attributes;

pub use mock::{generate_mock_content, MockContent, MockContentSource, DEFAULT_MOCK_TRIGGER_POINTS};
pub use network::NetworkContentSource;

/// Everything a source needs to fetch a catalog for one session.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchRequest {
    /// Organization the host app belongs to.
    pub organization_code: String,
    /// Session the catalog is fetched for.
    pub session_id: SessionId,
    /// Host-provided user identifier.
    pub user_id: String,
    /// Flat attributes forwarded to the content service.
    pub attributes: Attributes,
}

impl FetchRequest {
    /// Builds the request for a session.
    #[must_use]
    pub fn for_session(organization_code: impl Into<String>, session: &Session) -> Self {
        Self {
            organization_code: organization_code.into(),
            session_id: session.id,
            user_id: session.user_id.clone(),
            attributes: session.attributes.clone(),
        }
    }
}

/// Produces the content catalog for a session.
///
/// Returned items must be fresh (`Unseen`, newly minted ids), which
/// [`ContentItem::new`] guarantees.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Fetches the catalog for the request's session.
    async fn fetch(&self, request: &FetchRequest) -> Result<Vec<ContentItem>, FetchError>;
}
