//! # WaveCX - client content delivery core
//!
//! The core of the WaveCX client SDK: per-user sessions, a catalog of
//! trigger-point content fetched at session start, and the presentation
//! state of every item in it.
//!
//! ## Core Concepts
//!
//! - **Session**: one user's run of the app; starting one fetches a catalog
//! - **Trigger point**: a named place in the host app where content may appear
//! - **Content item**: a popup or button-triggered payload bound to a trigger point
//! - **Presentation state**: `Unseen -> Presented -> Dismissed`, never backwards
//! - **Listener**: the single observer receiving content events in mutation order
//!
//! ## Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use wavecx::{event_channel, ContentEvent, MockModeConfig, SdkConfig, WaveCx};
//!
//! let config = SdkConfig::new("demo-org").with_mock(MockModeConfig::with_delay(500));
//! let sdk = WaveCx::initialize(config)?;
//!
//! let (listener, events) = event_channel();
//! sdk.set_listener(Arc::new(listener));
//! sdk.start_user_session("user-42", None);
//!
//! while let Ok(event) = events.recv_timeout(Duration::from_secs(2)) {
//!     if let ContentEvent::Received(items) = event {
//!         println!("{} items cached", items.len());
//!         break;
//!     }
//! }
//! sdk.trigger_point("account-dashboard");
//! # Ok::<(), wavecx::WaveCxError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Core types
pub mod content;
pub mod error;
pub mod presentation;
pub mod value;

// Cache, sessions and sources
pub mod cache;
pub mod session;
pub mod source;

// Host surface
pub mod config;
pub mod listener;
pub mod sdk;

// Re-export primary types at crate root for convenience
pub use cache::{ContentCache, TriggerIndex};
pub use config::{MockModeConfig, SdkConfig, DEFAULT_API_BASE_URL};
pub use content::{ContentId, ContentItem, ContentKind, UnknownContentKind};
pub use error::{ConfigError, ErrorKind, FetchError, SessionError, WaveCxError, WaveCxResult};
pub use listener::{event_channel, ChannelListener, ContentEvent, ContentListener, EventStream};
pub use presentation::{PresentationState, Transition};
pub use sdk::{WaveCx, WaveCxBuilder};
pub use session::{Session, SessionId};
pub use source::{
    generate_mock_content, ContentSource, FetchRequest, MockContent, MockContentSource, NetworkContentSource,
    DEFAULT_MOCK_TRIGGER_POINTS,
};
pub use value::{AttributeValue, Attributes};
