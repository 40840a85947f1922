#![allow(clippy::float_cmp)]

use super::*;

#[test]
fn publishes_after_a_full_window() {
    let mut meter = FrameMeter::new();
    let mut published = None;
    for i in 0..=61 {
        if let Some(fps) = meter.record(f64::from(i) * (1000.0 / 60.0)) {
            published = Some(fps);
        }
    }
    assert_eq!(published, Some(60.0));
    assert_eq!(meter.fps(), 60.0);
}

#[test]
fn nothing_before_the_window_closes() {
    let mut meter = FrameMeter::new();
    assert_eq!(meter.record(0.0), None);
    assert_eq!(meter.record(500.0), None);
    assert_eq!(meter.record(999.0), None);
    assert_eq!(meter.fps(), 0.0);
}

#[test]
fn slow_frames_give_low_rate() {
    let mut meter = FrameMeter::new();
    meter.record(0.0);
    meter.record(500.0);
    assert_eq!(meter.record(2000.0), Some(1.0));
    // The next window starts at the publishing frame.
    assert_eq!(meter.record(2500.0), None);
    assert_eq!(meter.record(3000.0), Some(2.0));
}
