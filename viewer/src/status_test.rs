use super::*;

#[test]
fn default_is_disconnected() {
    assert_eq!(ConnectionStatus::default(), ConnectionStatus::Disconnected);
}

#[test]
fn labels_and_classes() {
    assert_eq!(ConnectionStatus::Connected.label(), "connected");
    assert_eq!(ConnectionStatus::Error.label(), "error");
    assert_eq!(ConnectionStatus::Connected.class(), "status connected");
    assert_eq!(ConnectionStatus::SnapshotFailed.class(), "status disconnected");
}

#[test]
fn stats_readouts() {
    assert_eq!(stats_text(12, 59.6), ("12".to_owned(), "60".to_owned()));
}
