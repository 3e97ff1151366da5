use super::*;

fn frame() -> FrameRgba {
    FrameRgba {
        width: 2,
        height: 2,
        data: vec![0; 16],
    }
}

fn cfg() -> SinkConfig {
    SinkConfig {
        width: 2,
        height: 2,
        fps: Fps::new(30, 1).unwrap(),
        audio: None,
    }
}

#[test]
fn in_memory_sink_captures_frames_in_order() {
    let mut sink = InMemorySink::new();
    sink.begin(cfg()).unwrap();
    sink.push_frame(FrameIndex(0), &frame()).unwrap();
    sink.push_frame(FrameIndex(1), &frame()).unwrap();
    sink.end().unwrap();
    assert_eq!(sink.frames().len(), 2);
    assert!(sink.is_ended());
    assert_eq!(sink.config(), Some(&cfg()));
}

#[test]
fn in_memory_sink_rejects_out_of_order_and_unstarted() {
    let mut sink = InMemorySink::new();
    assert!(sink.push_frame(FrameIndex(0), &frame()).is_err());
    sink.begin(cfg()).unwrap();
    sink.push_frame(FrameIndex(3), &frame()).unwrap();
    assert!(sink.push_frame(FrameIndex(3), &frame()).is_err());
}

#[test]
fn boxed_sinks_forward() {
    let mut sink: Box<dyn FrameSink> = Box::new(InMemorySink::new());
    sink.begin(cfg()).unwrap();
    sink.push_frame(FrameIndex(0), &frame()).unwrap();
    sink.end().unwrap();
}
