#![allow(clippy::float_cmp)]

use super::*;

fn parse(args: &[&str]) -> NodeConfig {
    let mut argv = vec!["display-node"];
    argv.extend_from_slice(args);
    NodeConfig::try_parse_from(argv).expect("args")
}

#[test]
fn defaults_describe_a_local_full_hd_display() {
    let config = parse(&["--base-url", "http://127.0.0.1:8080", "--display-key", "k", "--scene-id", "1"]);
    assert_eq!(config.width, 1920.0);
    assert_eq!(config.height, 1080.0);
    assert_eq!(config.tick(), Duration::from_millis(16));
    assert_eq!(config.reconnect_delay(), Duration::from_secs(5));
    assert_eq!(config.stats_every(), Duration::from_secs(5));
    assert_eq!(config.report_every(), None);
    assert!(!config.debug);
    assert!(config.validate().is_ok());
}

#[test]
fn flags_override_defaults() {
    let config = parse(&[
        "--base-url",
        "https://gallery.example/",
        "--scene-id",
        "7",
        "--display-key",
        "lobby",
        "--width",
        "800",
        "--height",
        "600",
        "--report-secs",
        "2",
        "--seed",
        "42",
        "--debug",
    ]);
    assert_eq!(config.scene_id, 7);
    assert_eq!(config.display_key, "lobby");
    assert_eq!(config.origin(), "https://gallery.example");
    assert_eq!(config.report_every(), Some(Duration::from_secs(2)));
    assert_eq!(config.seed, Some(42));
    assert!(config.debug);
    let viewport = config.viewport();
    assert_eq!((viewport.width, viewport.height), (800.0, 600.0));
}

#[test]
fn ws_url_maps_scheme() {
    assert_eq!(ws_url("http://127.0.0.1:8080").expect("url"), "ws://127.0.0.1:8080/ws");
    assert_eq!(ws_url("https://gallery.example/").expect("url"), "wss://gallery.example/ws");
    assert_eq!(ws_url("ftp://x"), Err(ConfigError::InvalidBaseUrl("ftp://x".to_owned())));
    assert!(ws_url("http://").is_err());
}

#[test]
fn validate_rejects_unusable_settings() {
    let base = parse(&["--base-url", "http://localhost:8080", "--display-key", "k", "--scene-id", "1"]);

    let zero_tick = NodeConfig { tick_ms: 0, ..base.clone() };
    assert_eq!(zero_tick.validate(), Err(ConfigError::ZeroTick));

    let flat = NodeConfig { height: 0.0, ..base.clone() };
    assert!(matches!(flat.validate(), Err(ConfigError::Viewport { .. })));

    let bad_ratio = NodeConfig { px_ratio: f64::NAN, ..base.clone() };
    assert!(matches!(bad_ratio.validate(), Err(ConfigError::PxRatio(_))));

    let bad_url = NodeConfig { base_url: "localhost:8080".to_owned(), ..base };
    assert!(matches!(bad_url.validate(), Err(ConfigError::InvalidBaseUrl(_))));
}

#[test]
fn zero_report_interval_disables_reports() {
    let config = parse(&["--base-url", "http://h", "--display-key", "k", "--scene-id", "1", "--report-secs", "0"]);
    assert_eq!(config.report_every(), None);
}
