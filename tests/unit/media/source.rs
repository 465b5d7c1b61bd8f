use super::*;

fn solid(w: u32, h: u32, v: u8) -> RgbImage {
    RgbImage::from_pixel(w, h, image::Rgb([v, v, v]))
}

#[test]
fn in_memory_source_reports_info_and_frames() {
    let mut src = InMemorySource::new(vec![solid(4, 2, 1), solid(4, 2, 2)], Fps::default()).unwrap();
    let info = src.info();
    assert_eq!((info.width, info.height, info.frame_count), (4, 2, 2));
    assert_eq!(info.resolution(), Resolution::rgb(4, 2));
    assert_eq!(src.read_frame(FrameIndex(1)).unwrap().get_pixel(0, 0).0, [2, 2, 2]);
    assert!(src.read_frame(FrameIndex(2)).is_err());
}

#[test]
fn in_memory_source_rejects_empty_and_mixed_sizes() {
    assert!(matches!(
        InMemorySource::new(Vec::new(), Fps::default()),
        Err(TracemarkError::Format(_))
    ));
    assert!(InMemorySource::new(vec![solid(4, 2, 0), solid(2, 2, 0)], Fps::default()).is_err());
}

#[test]
fn unreadable_marker_fails_only_that_frame() {
    let mut src = InMemorySource::new(vec![solid(2, 2, 0); 3], Fps::default())
        .unwrap()
        .with_unreadable(1);
    assert!(src.read_frame(FrameIndex(0)).is_ok());
    assert!(src.read_frame(FrameIndex(1)).is_err());
    assert!(src.read_frame(FrameIndex(2)).is_ok());
}

#[test]
fn blank_frame_matches_shape_and_is_zeroed() {
    let src = InMemorySource::new(vec![solid(3, 5, 9)], Fps::default()).unwrap();
    let blank = src.info().blank_frame();
    assert_eq!(blank.dimensions(), (3, 5));
    assert!(blank.pixels().all(|p| p.0 == [0, 0, 0]));
}
