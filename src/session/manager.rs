//! Session manager.
//!
//! Owns the current session, its catalog and the in-flight fetch. Every
//! mutation and every event emission happens while holding the single state
//! lock, which makes the lock the sequencing point: queries see consistent
//! snapshots and listeners receive events in mutation order.
//!
//! The catalog fetch runs as a tokio task tagged with the `SessionId` that
//! started it. A second task awaits it and installs the outcome, so a source
//! that panics still ends in a reported error. Ending or replacing the session
//! aborts the fetch, and a result that still slips through is dropped because
//! its tag no longer matches.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::runtime::Handle;
use tokio::task::{AbortHandle, JoinError};

use super::{Session, SessionId};
use crate::cache::ContentCache;
use crate::content::{ContentId, ContentItem, ContentKind};
use crate::error::{FetchError, SessionError, WaveCxError};
use crate::listener::{ContentEvent, EventSink};
use crate::source::{ContentSource, FetchRequest};
use crate::value::Attributes;

struct InFlightFetch {
    session_id: SessionId,
    task: AbortHandle,
}

struct SessionState {
    session: Option<Session>,
    cache: ContentCache,
    in_flight: Option<InFlightFetch>,
    /// Most recently activated trigger point of the current session.
    activated: Option<String>,
    events: EventSink,
}

impl SessionState {
    fn report(&self, error: WaveCxError) {
        tracing::warn!(kind = %error.kind(), error = %error, "reporting error to listener");
        self.events.emit(ContentEvent::Error(error));
    }

    fn require_session(&self) -> bool {
        if self.session.is_some() {
            return true;
        }
        self.report(SessionError::NoActiveSession.into());
        false
    }

    fn present(&mut self, id: ContentId) -> bool {
        let Some(item) = self.cache.present(id) else {
            return false;
        };

        tracing::info!(
            content_id = %item.id(),
            trigger_point = item.trigger_point(),
            kind = %item.kind(),
            "content presented"
        );
        self.events.emit(ContentEvent::Presented(item));
        // The item left the index, so availability changed.
        self.events.emit(ContentEvent::Changed);
        true
    }

    fn end_session(&mut self) {
        if let Some(fetch) = self.in_flight.take() {
            fetch.task.abort();
            tracing::debug!(session_id = %fetch.session_id, "in-flight catalog fetch cancelled");
        }

        let had_eligible = self.cache.has_eligible();
        self.cache.clear();
        self.activated = None;

        if let Some(mut session) = self.session.take() {
            session.active = false;
            tracing::info!(
                session_id = %session.id,
                user_id = %session.user_id,
                "user session ended"
            );
        }

        if had_eligible {
            self.events.emit(ContentEvent::Changed);
        }
    }

    fn complete_fetch(&mut self, session_id: SessionId, result: Result<Vec<ContentItem>, FetchError>) {
        let current = self.session.as_ref().map(|s| s.id);
        if current != Some(session_id) {
            tracing::debug!(%session_id, "discarding catalog for a session that is no longer current");
            return;
        }

        if self.in_flight.as_ref().is_some_and(|f| f.session_id == session_id) {
            self.in_flight = None;
        }

        match result {
            Ok(items) => {
                let installed = self.cache.install(items);
                tracing::info!(%session_id, items = installed, "content catalog installed");
                self.events.emit(ContentEvent::Changed);
                self.events.emit(ContentEvent::Received(self.cache.items().to_vec()));
            }
            Err(error) => {
                self.cache.clear();
                tracing::warn!(%session_id, error = %error, "content catalog fetch failed");
                self.events.emit(ContentEvent::Error(error.into()));
            }
        }
    }
}

fn source_failure(source: &str, err: &JoinError) -> FetchError {
    tracing::error!(source, error = %err, "content source panicked during fetch");
    FetchError::SourceFailed {
        message: format!("{source} source panicked: {err}"),
    }
}

fn lock_state(state: &Mutex<SessionState>) -> MutexGuard<'_, SessionState> {
    // A panicking listener cannot poison this lock (callbacks run elsewhere);
    // recover rather than wedge every later call.
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Session lifecycle and presentation commands over one content source.
pub struct SessionManager {
    state: Arc<Mutex<SessionState>>,
    source: Arc<dyn ContentSource>,
    runtime: Handle,
    organization_code: String,
    verbose: bool,
}

impl SessionManager {
    /// Creates a manager with no active session.
    ///
    /// Fetches are spawned on `runtime`; events go to `events`.
    #[must_use]
    pub fn new(
        organization_code: impl Into<String>,
        source: Arc<dyn ContentSource>,
        runtime: Handle,
        events: EventSink,
        verbose: bool,
    ) -> Self {
        Self {
            state: Arc::new(Mutex::new(SessionState {
                session: None,
                cache: ContentCache::new(),
                in_flight: None,
                activated: None,
                events,
            })),
            source,
            runtime,
            organization_code: organization_code.into(),
            verbose,
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        lock_state(&self.state)
    }

    /// Starts a session and fetches its catalog in the background.
    ///
    /// An active session is ended first, discarding its cache and any fetch
    /// still in flight. Fetch failures are reported to the listener only.
    pub fn start_user_session(&self, user_id: impl Into<String>, attributes: Option<Attributes>) -> SessionId {
        let mut state = self.lock();
        if state.session.is_some() {
            state.end_session();
        }

        let session = Session::start(user_id, attributes.unwrap_or_default());
        let session_id = session.id;
        let request = FetchRequest::for_session(&self.organization_code, &session);
        tracing::info!(
            %session_id,
            user_id = %session.user_id,
            source = self.source.name(),
            "user session started"
        );
        state.session = Some(session);

        let source = Arc::clone(&self.source);
        let fetch = self.runtime.spawn(async move { source.fetch(&request).await });
        let task = fetch.abort_handle();

        let shared = Arc::clone(&self.state);
        let source_name = self.source.name();
        // Completion cannot land before it is tracked: it needs the lock we hold.
        self.runtime.spawn(async move {
            let result = match fetch.await {
                Ok(result) => result,
                Err(err) if err.is_cancelled() => return,
                Err(err) => Err(source_failure(source_name, &err)),
            };
            lock_state(&shared).complete_fetch(session_id, result);
        });
        state.in_flight = Some(InFlightFetch { session_id, task });

        session_id
    }

    /// Ends the current session, clearing the cache and cancelling the fetch.
    pub fn end_user_session(&self) {
        let mut state = self.lock();
        if state.session.is_none() && state.in_flight.is_none() {
            return;
        }
        state.end_session();
    }

    /// Marks `code` activated and presents its first eligible popup, if any.
    pub fn trigger_point(&self, code: &str) {
        let mut state = self.lock();
        if !state.require_session() {
            return;
        }

        state.activated = Some(code.to_string());
        let next = state.cache.first_eligible(code, ContentKind::Popup);
        if self.verbose {
            tracing::info!(trigger_point = code, popup = ?next, "trigger point activated");
        }
        if let Some(id) = next {
            state.present(id);
        }
    }

    /// True if the most recently activated trigger point has button content.
    #[must_use]
    pub fn has_user_triggered_content(&self) -> bool {
        let state = self.lock();
        state
            .activated
            .as_deref()
            .is_some_and(|code| state.cache.has_content(code, ContentKind::ButtonTriggered))
    }

    /// Presents button-triggered content for `code`, or for the most recently
    /// activated trigger point when `code` is `None`.
    pub fn show_user_triggered_content(&self, code: Option<&str>) {
        let mut state = self.lock();
        if !state.require_session() {
            return;
        }

        let Some(target) = code.map(str::to_string).or_else(|| state.activated.clone()) else {
            return;
        };
        let next = state.cache.first_eligible(&target, ContentKind::ButtonTriggered);
        if self.verbose {
            tracing::info!(trigger_point = %target, content = ?next, "user-triggered content requested");
        }
        if let Some(id) = next {
            state.present(id);
        }
    }

    /// Marks presented content as dismissed. No-op for anything else.
    pub fn dismiss_content(&self, id: ContentId) {
        let mut state = self.lock();
        if let Some(item) = state.cache.dismiss(id) {
            tracing::info!(content_id = %id, trigger_point = item.trigger_point(), "content dismissed");
            state.events.emit(ContentEvent::Dismissed(item));
        }
    }

    #[must_use]
    pub fn has_content(&self, code: &str, kind: ContentKind) -> bool {
        let found = self.lock().cache.has_content(code, kind);
        if self.verbose {
            tracing::info!(trigger_point = code, %kind, found, "content lookup");
        }
        found
    }

    #[must_use]
    pub fn trigger_points_with_content(&self, kind: ContentKind) -> BTreeSet<String> {
        self.lock().cache.trigger_points_with_content(kind)
    }

    #[must_use]
    pub fn eligible_for(&self, code: &str, kind: ContentKind) -> Vec<ContentItem> {
        self.lock().cache.eligible_for(code, kind)
    }

    /// Snapshot of the whole catalog with current states.
    #[must_use]
    pub fn content(&self) -> Vec<ContentItem> {
        self.lock().cache.items().to_vec()
    }

    #[must_use]
    pub fn current_session(&self) -> Option<Session> {
        self.lock().session.clone()
    }

    #[must_use]
    pub fn is_session_active(&self) -> bool {
        self.lock().session.as_ref().is_some_and(|s| s.active)
    }

    /// True while the current session's catalog has not arrived yet.
    #[must_use]
    pub fn is_fetching(&self) -> bool {
        self.lock().in_flight.is_some()
    }

    #[must_use]
    pub fn organization_code(&self) -> &str {
        &self.organization_code
    }
}

impl Drop for SessionManager {
    fn drop(&mut self) {
        if let Some(fetch) = self.lock().in_flight.take() {
            fetch.task.abort();
        }
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("organization_code", &self.organization_code)
            .field("source", &self.source.name())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listener::{event_channel, ListenerDispatcher};
    use crate::source::MockContentSource;
    use async_trait::async_trait;
    use std::time::Duration;

    struct Exploding;

    #[async_trait]
    impl ContentSource for Exploding {
        fn name(&self) -> &'static str {
            "exploding"
        }

        async fn fetch(&self, _request: &FetchRequest) -> Result<Vec<ContentItem>, FetchError> {
            panic!("source bug");
        }
    }

    struct Harness {
        runtime: tokio::runtime::Runtime,
        dispatcher: ListenerDispatcher,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                runtime: tokio::runtime::Builder::new_multi_thread()
                    .worker_threads(1)
                    .enable_all()
                    .build()
                    .unwrap(),
                dispatcher: ListenerDispatcher::start(false).unwrap(),
            }
        }

        fn manager(&self, source: MockContentSource) -> SessionManager {
            self.manager_with(Arc::new(source))
        }

        fn manager_with(&self, source: Arc<dyn ContentSource>) -> SessionManager {
            SessionManager::new(
                "demo-org",
                source,
                self.runtime.handle().clone(),
                self.dispatcher.sink(),
                false,
            )
        }
    }

    fn wait_for_received(stream: &crate::listener::EventStream) -> Vec<ContentItem> {
        loop {
            match stream.recv_timeout(Duration::from_secs(2)).unwrap() {
                ContentEvent::Received(items) => return items,
                _ => continue,
            }
        }
    }

    #[test]
    fn commands_without_session_report_no_active_session() {
        let harness = Harness::new();
        let (listener, stream) = event_channel();
        harness.dispatcher.set_listener(Arc::new(listener));
        let manager = harness.manager(MockContentSource::for_trigger_points(["a"], Duration::ZERO));

        manager.trigger_point("a");
        manager.show_user_triggered_content(None);
        harness.dispatcher.flush(Duration::from_secs(1)).unwrap();

        let errors: Vec<ContentEvent> = stream.drain();
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|e| matches!(
            e,
            ContentEvent::Error(WaveCxError::Session(SessionError::NoActiveSession))
        )));
    }

    #[test]
    fn trigger_marks_activation_even_without_popup() {
        let harness = Harness::new();
        let (listener, stream) = event_channel();
        harness.dispatcher.set_listener(Arc::new(listener));
        // "a" is popup, "b" is button-triggered.
        let manager = harness.manager(MockContentSource::for_trigger_points(["a", "b"], Duration::ZERO));

        manager.start_user_session("u1", None);
        wait_for_received(&stream);

        assert!(!manager.has_user_triggered_content());
        manager.trigger_point("b");
        assert!(manager.has_user_triggered_content());

        manager.show_user_triggered_content(None);
        assert!(!manager.has_user_triggered_content());
        assert!(!manager.is_fetching());
    }

    #[test]
    fn dismiss_emits_once() {
        let harness = Harness::new();
        let (listener, stream) = event_channel();
        harness.dispatcher.set_listener(Arc::new(listener));
        let manager = harness.manager(MockContentSource::for_trigger_points(["a"], Duration::ZERO));

        manager.start_user_session("u1", None);
        let items = wait_for_received(&stream);
        let id = items[0].id();

        manager.dismiss_content(id);
        manager.trigger_point("a");
        manager.dismiss_content(id);
        manager.dismiss_content(id);
        harness.dispatcher.flush(Duration::from_secs(1)).unwrap();

        let names: Vec<&str> = stream.drain().iter().map(ContentEvent::name).collect();
        assert_eq!(names, vec!["presented", "changed", "dismissed"]);
    }

    #[test]
    fn panicking_source_reports_error_and_stops_fetching() {
        let harness = Harness::new();
        let (listener, stream) = event_channel();
        harness.dispatcher.set_listener(Arc::new(listener));
        let manager = harness.manager_with(Arc::new(Exploding));

        manager.start_user_session("u1", None);
        let event = stream.recv_timeout(Duration::from_secs(2)).unwrap();

        assert!(matches!(
            event,
            ContentEvent::Error(WaveCxError::Fetch(FetchError::SourceFailed { .. }))
        ));
        assert!(!manager.is_fetching());
        assert!(manager.content().is_empty());
        assert!(manager.is_session_active());
    }
}
