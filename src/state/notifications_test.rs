use super::*;

// =============================================================
// enqueue / dismiss
// =============================================================

#[test]
fn enqueue_then_dismiss_leaves_queue_empty() {
    let mut state = NotificationState::default();
    state.enqueue("x", NotificationKind::Info);
    let dismissed = state.dismiss().unwrap();
    assert_eq!(dismissed.message, "x");
    assert!(state.is_empty());
}

#[test]
fn dismiss_on_empty_is_noop() {
    let mut state = NotificationState::default();
    assert!(state.dismiss().is_none());
    assert!(state.is_empty());
}

#[test]
fn dismiss_is_fifo() {
    let mut state = NotificationState::default();
    state.enqueue("first", NotificationKind::Info);
    state.enqueue("second", NotificationKind::Error);
    assert_eq!(state.current().map(|n| n.message.as_str()), Some("first"));
    state.dismiss();
    assert_eq!(state.current().map(|n| n.message.as_str()), Some("second"));
    assert_eq!(state.current().map(|n| n.kind), Some(NotificationKind::Error));
}

#[test]
fn enqueue_does_not_deduplicate() {
    let mut state = NotificationState::default();
    let a = state.enqueue("same", NotificationKind::Info);
    let b = state.enqueue("same", NotificationKind::Info);
    assert_eq!(state.len(), 2);
    assert_ne!(a, b);
}

#[test]
fn iter_preserves_insertion_order() {
    let mut state = NotificationState::default();
    for msg in ["a", "b", "c"] {
        state.enqueue(msg, NotificationKind::Warning);
    }
    let order: Vec<&str> = state.iter().map(|n| n.message.as_str()).collect();
    assert_eq!(order, vec!["a", "b", "c"]);
}

// =============================================================
// NotificationKind
// =============================================================

#[test]
fn kind_parses_case_insensitively() {
    assert_eq!("info".parse::<NotificationKind>(), Ok(NotificationKind::Info));
    assert_eq!("ERROR".parse::<NotificationKind>(), Ok(NotificationKind::Error));
    assert_eq!(" Success ".parse::<NotificationKind>(), Ok(NotificationKind::Success));
    assert_eq!("warning".parse::<NotificationKind>(), Ok(NotificationKind::Warning));
}

#[test]
fn kind_rejects_unknown() {
    let err = "loud".parse::<NotificationKind>().unwrap_err();
    assert!(err.contains("loud"));
}

#[test]
fn notification_serializes_kind_as_type() {
    let mut state = NotificationState::default();
    state.enqueue("saved", NotificationKind::Success);
    let json = serde_json::to_value(state.current().unwrap()).unwrap();
    assert_eq!(json["type"], "success");
    assert_eq!(json["message"], "saved");
}
