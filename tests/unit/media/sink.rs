use super::*;

fn cfg() -> SinkConfig {
    SinkConfig {
        width: 2,
        height: 2,
        fps: Fps::default(),
    }
}

#[test]
fn in_memory_sink_captures_frames_in_order() {
    let mut sink = InMemorySink::new();
    sink.begin(cfg()).unwrap();
    let f = RgbaImage::new(2, 2);
    sink.push_frame(FrameIndex(0), &f).unwrap();
    sink.push_frame(FrameIndex(1), &f).unwrap();
    sink.end().unwrap();
    assert_eq!(sink.config(), Some(cfg()));
    assert_eq!(sink.frames().len(), 2);
    assert_eq!(sink.images().len(), 2);
    assert!(sink.is_finished());
}

#[test]
fn in_memory_sink_rejects_out_of_order_and_unstarted() {
    let mut sink = InMemorySink::new();
    let f = RgbaImage::new(2, 2);
    assert!(sink.push_frame(FrameIndex(0), &f).is_err());
    sink.begin(cfg()).unwrap();
    sink.push_frame(FrameIndex(3), &f).unwrap();
    assert!(sink.push_frame(FrameIndex(3), &f).is_err());
}
