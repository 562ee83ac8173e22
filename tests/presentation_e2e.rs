use std::sync::Arc;
use std::time::Duration;

use wavecx::{
    event_channel, ContentEvent, ContentItem, ContentKind, EventStream, MockContent, MockModeConfig,
    PresentationState, SdkConfig, SessionError, WaveCx, WaveCxError, DEFAULT_MOCK_TRIGGER_POINTS,
};

const WAIT: Duration = Duration::from_secs(3);

/// Starts a session on the default mock catalog and waits for it to land.
fn ready_sdk(mock: MockModeConfig) -> (WaveCx, EventStream, Vec<ContentItem>) {
    let sdk = WaveCx::initialize(SdkConfig::new("demo-org").with_mock(mock)).unwrap();
    let (listener, events) = event_channel();
    sdk.set_listener(Arc::new(listener));
    sdk.start_user_session("user-1", None);

    let items = loop {
        if let ContentEvent::Received(items) = events.recv_timeout(WAIT).unwrap() {
            break items;
        }
    };
    sdk.flush_events(WAIT).unwrap();
    assert!(events.drain().is_empty());
    (sdk, events, items)
}

fn names(events: &EventStream) -> Vec<&'static str> {
    events.drain().iter().map(ContentEvent::name).collect()
}

#[test]
fn default_mock_catalog_alternates_kinds() {
    let (sdk, _events, items) = ready_sdk(MockModeConfig::with_delay(0));

    assert_eq!(items.len(), DEFAULT_MOCK_TRIGGER_POINTS.len());
    let popups = sdk.trigger_points_with_content(ContentKind::Popup);
    let buttons = sdk.trigger_points_with_content(ContentKind::ButtonTriggered);
    assert!(popups.contains("account-dashboard"));
    assert!(buttons.contains("low-balance-alert"));
    assert_eq!(popups.len() + buttons.len(), DEFAULT_MOCK_TRIGGER_POINTS.len());
    assert!(popups.is_disjoint(&buttons));
}

#[test]
fn trigger_presents_popup_exactly_once() {
    let (sdk, events, _) = ready_sdk(MockModeConfig::with_delay(0));

    sdk.trigger_point("account-dashboard");
    sdk.flush_events(WAIT).unwrap();
    let delivered = events.drain();
    assert_eq!(delivered.len(), 2);
    let ContentEvent::Presented(item) = &delivered[0] else {
        panic!("expected presented first, got {delivered:?}");
    };
    assert_eq!(item.trigger_point(), "account-dashboard");
    assert_eq!(item.state(), PresentationState::Presented);
    assert_eq!(delivered[1], ContentEvent::Changed);

    // Presenting is idempotent: nothing left to show.
    sdk.trigger_point("account-dashboard");
    sdk.flush_events(WAIT).unwrap();
    assert!(events.drain().is_empty());
    assert!(!sdk.has_content("account-dashboard", ContentKind::Popup));
    assert!(!sdk
        .trigger_points_with_content(ContentKind::Popup)
        .contains("account-dashboard"));
}

#[test]
fn trigger_without_content_is_silent() {
    let (sdk, events, _) = ready_sdk(MockModeConfig::with_delay(0));

    sdk.trigger_point("no-such-place");
    // Button-only trigger point: no popup to present.
    sdk.trigger_point("low-balance-alert");
    sdk.flush_events(WAIT).unwrap();
    assert!(events.drain().is_empty());
    assert!(sdk.has_user_triggered_content());
}

#[test]
fn button_triggered_flow_follows_last_activation() {
    let (sdk, events, _) = ready_sdk(MockModeConfig::with_delay(0));

    assert!(!sdk.has_user_triggered_content());
    sdk.trigger_point("low-balance-alert");
    assert!(sdk.has_user_triggered_content());

    sdk.trigger_point("account-dashboard");
    assert!(!sdk.has_user_triggered_content());
    sdk.flush_events(WAIT).unwrap();
    assert_eq!(names(&events), vec!["presented", "changed"]);

    sdk.trigger_point("low-balance-alert");
    sdk.show_user_triggered_content(None);
    sdk.flush_events(WAIT).unwrap();
    let delivered = events.drain();
    assert!(matches!(
        delivered.as_slice(),
        [ContentEvent::Presented(item), ContentEvent::Changed]
            if item.kind() == ContentKind::ButtonTriggered && item.trigger_point() == "low-balance-alert"
    ));
    assert!(!sdk.has_user_triggered_content());

    // Explicit code wins over the last activation.
    sdk.show_user_triggered_content(Some("credit-card-offer"));
    sdk.flush_events(WAIT).unwrap();
    assert_eq!(names(&events), vec!["presented", "changed"]);
    assert!(!sdk.has_content("credit-card-offer", ContentKind::ButtonTriggered));
}

#[test]
fn dismiss_is_terminal() {
    let (sdk, events, _) = ready_sdk(MockModeConfig::with_delay(0));

    sdk.trigger_point("savings-promotion");
    sdk.flush_events(WAIT).unwrap();
    let id = match events.drain().first() {
        Some(ContentEvent::Presented(item)) => item.id(),
        other => panic!("expected presented, got {other:?}"),
    };

    sdk.dismiss_content(id);
    sdk.dismiss_content(id);
    sdk.trigger_point("savings-promotion");
    sdk.flush_events(WAIT).unwrap();

    assert_eq!(names(&events), vec!["dismissed"]);
    let stored = sdk.content().into_iter().find(|i| i.id() == id).unwrap();
    assert_eq!(stored.state(), PresentationState::Dismissed);
}

#[test]
fn several_items_on_one_trigger_point_present_in_catalog_order() {
    let custom = vec![
        MockContent::new("home").with_kind(ContentKind::Popup).with_payload(serde_json::json!({ "n": 1 })),
        MockContent::new("home").with_kind(ContentKind::Popup).with_payload(serde_json::json!({ "n": 2 })),
    ];
    let (sdk, events, _) = ready_sdk(MockModeConfig::with_delay(0).with_custom_content(custom));

    assert_eq!(sdk.eligible_for("home", ContentKind::Popup).len(), 2);

    let mut order = Vec::new();
    for _ in 0..3 {
        sdk.trigger_point("home");
        sdk.flush_events(WAIT).unwrap();
        for event in events.drain() {
            if let ContentEvent::Presented(item) = event {
                order.push(item.payload()["n"].as_i64());
            }
        }
    }
    assert_eq!(order, vec![Some(1), Some(2)]);
    assert!(sdk.eligible_for("home", ContentKind::Popup).is_empty());
}

#[test]
fn commands_after_end_report_no_session() {
    let (sdk, events, _) = ready_sdk(MockModeConfig::with_delay(0));
    sdk.end_user_session();
    sdk.flush_events(WAIT).unwrap();
    events.drain();

    sdk.trigger_point("account-dashboard");
    sdk.flush_events(WAIT).unwrap();
    assert_eq!(
        events.drain(),
        vec![ContentEvent::Error(WaveCxError::Session(SessionError::NoActiveSession))]
    );
    assert!(!sdk.has_user_triggered_content());
}
