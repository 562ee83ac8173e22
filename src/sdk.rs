//! The `WaveCx` facade.
//!
//! One value per host app. It wires the configured content source, the
//! session manager and the listener dispatcher together, and owns a small
//! tokio runtime for catalog fetches unless the host lends it one.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::{Builder, Handle, Runtime};

use crate::config::SdkConfig;
use crate::content::{ContentId, ContentItem, ContentKind};
use crate::error::{ConfigError, WaveCxResult};
use crate::listener::{ContentListener, ListenerDispatcher};
use crate::session::{Session, SessionId, SessionManager};
use crate::source::ContentSource;
use crate::value::Attributes;

struct FetchRuntime {
    handle: Handle,
    owned: Option<Runtime>,
}

impl FetchRuntime {
    fn own() -> Result<Self, ConfigError> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("wavecx-fetch")
            .enable_all()
            .build()
            .map_err(|e| ConfigError::Runtime {
                message: e.to_string(),
            })?;
        Ok(Self {
            handle: runtime.handle().clone(),
            owned: Some(runtime),
        })
    }

    const fn borrowed(handle: Handle) -> Self {
        Self { handle, owned: None }
    }
}

impl Drop for FetchRuntime {
    fn drop(&mut self) {
        // Blocking shutdown panics when the host drops us from async code.
        if let Some(runtime) = self.owned.take() {
            runtime.shutdown_background();
        }
    }
}

/// Builder for a [`WaveCx`] with non-default collaborators.
pub struct WaveCxBuilder {
    config: SdkConfig,
    source: Option<Arc<dyn ContentSource>>,
    runtime: Option<Handle>,
    listener: Option<Arc<dyn ContentListener>>,
}

impl WaveCxBuilder {
    /// Uses `source` instead of the one the configuration selects.
    #[must_use]
    pub fn content_source(mut self, source: Arc<dyn ContentSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Spawns fetches on the host's runtime instead of an owned one.
    #[must_use]
    pub fn runtime_handle(mut self, handle: Handle) -> Self {
        self.runtime = Some(handle);
        self
    }

    /// Registers a listener before any session can start.
    #[must_use]
    pub fn listener(mut self, listener: Arc<dyn ContentListener>) -> Self {
        self.listener = Some(listener);
        self
    }

    /// Validates the configuration and starts the SDK.
    pub fn build(self) -> WaveCxResult<WaveCx> {
        self.config.validate()?;

        let source = match self.source {
            Some(source) => source,
            None => self.config.build_source()?,
        };
        let runtime = match self.runtime {
            Some(handle) => FetchRuntime::borrowed(handle),
            None => FetchRuntime::own()?,
        };

        let dispatcher = ListenerDispatcher::start(self.config.debug_mode)?;
        if let Some(listener) = self.listener {
            dispatcher.set_listener(listener);
        }

        let manager = SessionManager::new(
            self.config.organization_code.clone(),
            Arc::clone(&source),
            runtime.handle.clone(),
            dispatcher.sink(),
            self.config.debug_mode,
        );

        tracing::info!(
            organization = %self.config.organization_code,
            source = source.name(),
            debug_mode = self.config.debug_mode,
            owned_runtime = runtime.owned.is_some(),
            "WaveCX SDK initialized"
        );

        Ok(WaveCx {
            manager,
            dispatcher,
            runtime,
            config: self.config,
        })
    }
}

impl std::fmt::Debug for WaveCxBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WaveCxBuilder")
            .field("config", &self.config)
            .field("custom_source", &self.source.is_some())
            .field("runtime_handle", &self.runtime.is_some())
            .finish_non_exhaustive()
    }
}

/// Client SDK instance: sessions, trigger points and content callbacks.
///
/// Every method is callable from any thread, including from inside listener
/// callbacks. Listener callbacks run on a dedicated SDK thread.
pub struct WaveCx {
    // Field order is drop order: the manager aborts its fetch while the
    // runtime is still alive.
    manager: SessionManager,
    dispatcher: ListenerDispatcher,
    runtime: FetchRuntime,
    config: SdkConfig,
}

impl WaveCx {
    /// Starts the SDK with the source the configuration selects.
    pub fn initialize(config: SdkConfig) -> WaveCxResult<Self> {
        Self::builder(config).build()
    }

    #[must_use]
    pub fn builder(config: SdkConfig) -> WaveCxBuilder {
        WaveCxBuilder {
            config,
            source: None,
            runtime: None,
            listener: None,
        }
    }

    #[must_use]
    pub fn config(&self) -> &SdkConfig {
        &self.config
    }

    /// Starts a session for `user_id`, replacing any active one.
    ///
    /// Returns immediately; the catalog arrives later through
    /// `on_content_received`, or `on_error` if the fetch fails.
    pub fn start_user_session(&self, user_id: impl Into<String>, attributes: Option<Attributes>) -> SessionId {
        self.manager.start_user_session(user_id, attributes)
    }

    /// Ends the session and empties the cache. No-op without a session.
    pub fn end_user_session(&self) {
        self.manager.end_user_session();
    }

    /// Reports that the user reached `code`; presents its first eligible popup.
    pub fn trigger_point(&self, code: &str) {
        self.manager.trigger_point(code);
    }

    /// True if the most recently activated trigger point has button content.
    #[must_use]
    pub fn has_user_triggered_content(&self) -> bool {
        self.manager.has_user_triggered_content()
    }

    /// Presents button-triggered content for `code`, defaulting to the most
    /// recently activated trigger point.
    pub fn show_user_triggered_content(&self, code: Option<&str>) {
        self.manager.show_user_triggered_content(code);
    }

    #[must_use]
    pub fn has_content(&self, code: &str, kind: ContentKind) -> bool {
        self.manager.has_content(code, kind)
    }

    #[must_use]
    pub fn trigger_points_with_content(&self, kind: ContentKind) -> BTreeSet<String> {
        self.manager.trigger_points_with_content(kind)
    }

    /// Eligible items for `code` and `kind`, in catalog order.
    #[must_use]
    pub fn eligible_for(&self, code: &str, kind: ContentKind) -> Vec<ContentItem> {
        self.manager.eligible_for(code, kind)
    }

    /// Records that the host closed presented content.
    pub fn dismiss_content(&self, id: ContentId) {
        self.manager.dismiss_content(id);
    }

    /// Snapshot of the current catalog.
    #[must_use]
    pub fn content(&self) -> Vec<ContentItem> {
        self.manager.content()
    }

    #[must_use]
    pub fn current_session(&self) -> Option<Session> {
        self.manager.current_session()
    }

    #[must_use]
    pub fn is_session_active(&self) -> bool {
        self.manager.is_session_active()
    }

    /// True while a catalog fetch is outstanding.
    #[must_use]
    pub fn is_fetching(&self) -> bool {
        self.manager.is_fetching()
    }

    /// Replaces the listener. Past events are not replayed.
    pub fn set_listener(&self, listener: Arc<dyn ContentListener>) {
        self.dispatcher.set_listener(listener);
    }

    pub fn clear_listener(&self) {
        self.dispatcher.clear_listener();
    }

    /// Blocks until every event emitted so far has reached the listener.
    ///
    /// Do not call from inside a listener callback.
    pub fn flush_events(&self, timeout: Duration) -> WaveCxResult<()> {
        self.dispatcher.flush(timeout)
    }
}

impl std::fmt::Debug for WaveCx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WaveCx")
            .field("manager", &self.manager)
            .field("dispatcher", &self.dispatcher)
            .field("owned_runtime", &self.runtime.owned.is_some())
            .finish_non_exhaustive()
    }
}
