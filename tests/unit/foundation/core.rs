use super::*;

#[test]
fn frame_range_iterates_half_open() {
    let r = FrameRange::new(FrameIndex(2), FrameIndex(5)).unwrap();
    let frames: Vec<u64> = r.iter().map(|f| f.0).collect();
    assert_eq!(frames, vec![2, 3, 4]);
    assert_eq!(r.len_frames(), 3);
}

#[test]
fn frame_range_rejects_inverted_bounds() {
    assert!(FrameRange::new(FrameIndex(3), FrameIndex(2)).is_err());
}

#[test]
fn fps_parses_rational_and_integer_rates() {
    assert_eq!(Fps::parse("30000/1001").unwrap(), Fps { num: 30000, den: 1001 });
    assert_eq!(Fps::parse("25").unwrap(), Fps { num: 25, den: 1 });
    assert!(Fps::parse("0/0").is_err());
    assert!(Fps::parse("abc").is_err());
}

#[test]
fn resolution_serializes_as_height_width_channels() {
    let r = Resolution::rgb(640, 360);
    let json = serde_json::to_string(&r).unwrap();
    assert_eq!(json, "[360,640,3]");
    let back: Resolution = serde_json::from_str(&json).unwrap();
    assert_eq!(back, r);
}
