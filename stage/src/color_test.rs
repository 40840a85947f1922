use super::*;

#[test]
fn css_formats_whole_numbers() {
    assert_eq!(Hsl::new(200.0, 70.0, 60.0).css(), "hsl(200, 70%, 60%)");
    assert_eq!(Hsl::WHITE.css(), "hsl(0, 0%, 100%)");
}

#[test]
fn css_wraps_hue() {
    assert_eq!(Hsl::new(-30.0, 90.0, 60.0).css(), "hsl(330, 90%, 60%)");
    assert_eq!(Hsl::new(400.0, 90.0, 60.0).css(), "hsl(40, 90%, 60%)");
}
