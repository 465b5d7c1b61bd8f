use super::*;
use crate::foundation::core::Fps;
use crate::media::sink::InMemorySink;
use crate::media::source::InMemorySource;
use image::{Rgb, RgbImage, RgbaImage};
use std::sync::{Arc, Mutex};

/// Sink handle that keeps its frames reachable after `split` drops it.
#[derive(Clone, Default)]
struct Shared(Arc<Mutex<InMemorySink>>);

impl FrameSink for Shared {
    fn begin(&mut self, cfg: SinkConfig) -> TracemarkResult<()> {
        self.0.lock().unwrap().begin(cfg)
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &RgbaImage) -> TracemarkResult<()> {
        self.0.lock().unwrap().push_frame(idx, frame)
    }

    fn end(&mut self) -> TracemarkResult<()> {
        self.0.lock().unwrap().end()
    }
}

fn numbered_source(frames: u8) -> InMemorySource {
    let frames = (0..frames)
        .map(|i| RgbImage::from_pixel(8, 8, Rgb([i, 0, 0])))
        .collect();
    InMemorySource::new(frames, Fps::default()).unwrap()
}

fn run(source: &mut InMemorySource, shard_size: u64) -> (SplitOutcome, Vec<Shared>) {
    let mut opened = Vec::new();
    let out = split(source, shard_size, |_, _| {
        let s = Shared::default();
        opened.push(s.clone());
        Ok(s)
    })
    .unwrap();
    (out, opened)
}

fn reds(sink: &Shared) -> Vec<u8> {
    sink.0
        .lock()
        .unwrap()
        .images()
        .iter()
        .map(|f| f.get_pixel(0, 0).0[0])
        .collect()
}

#[test]
fn ranges_cover_everything_with_short_tail() {
    let r = shard_ranges(10, 4).unwrap();
    let bounds: Vec<(u64, u64)> = r.iter().map(|r| (r.start.0, r.end.0)).collect();
    assert_eq!(bounds, vec![(0, 4), (4, 8), (8, 10)]);
    assert_eq!(shard_ranges(8, 4).unwrap().len(), 2);
    assert!(shard_ranges(0, 4).unwrap().is_empty());
    assert!(shard_ranges(10, 0).is_err());
}

#[test]
fn shards_are_contiguous_and_ordered() {
    let mut source = numbered_source(7);
    let (out, sinks) = run(&mut source, 3);
    assert!(out.problems.is_empty());
    assert_eq!(sinks.len(), 3);
    assert_eq!(reds(&sinks[0]), vec![0, 1, 2]);
    assert_eq!(reds(&sinks[1]), vec![3, 4, 5]);
    assert_eq!(reds(&sinks[2]), vec![6]);
    for s in &sinks {
        let inner = s.0.lock().unwrap();
        assert!(inner.is_finished());
        let idx: Vec<u64> = inner.frames().iter().map(|(i, _)| i.0).collect();
        assert_eq!(idx, (0..idx.len() as u64).collect::<Vec<_>>());
    }
    assert_eq!(out.shards[2].frames, 1);
}

#[test]
fn unreadable_frames_are_omitted_from_their_shard() {
    let mut source = numbered_source(6).with_unreadable(4);
    let (out, sinks) = run(&mut source, 3);
    assert_eq!(
        out.problems,
        vec![Problem::UnreadableFrame {
            shard: Some(1),
            frame: 4
        }]
    );
    assert_eq!(reds(&sinks[1]), vec![3, 5]);
    assert_eq!(out.shards[1].frames, 2);
    assert_eq!(out.shards[1].range.len_frames(), 3);
}

#[test]
fn sink_open_failure_aborts() {
    let mut source = numbered_source(4);
    let res = split(&mut source, 2, |k, _| {
        if k == 1 {
            Err(TracemarkError::codec("disk full"))
        } else {
            Ok(InMemorySink::new())
        }
    });
    assert!(matches!(res, Err(TracemarkError::Codec(_))));
}
