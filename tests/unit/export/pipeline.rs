use super::*;
use crate::export::recorder::MemoryRecorder;

fn frame(w: u32, h: u32, v: u8) -> FrameRGBA {
    FrameRGBA {
        width: w,
        height: h,
        data: vec![v; (w * h * 4) as usize],
        premultiplied: true,
    }
}

#[test]
fn push_while_idle_is_ignored() {
    let mut p = ExportPipeline::new();
    p.push(&frame(2, 2, 1)).unwrap();
    assert!(!p.is_capturing());
    assert_eq!(p.frames(), 0);
    assert!(p.finalize().unwrap().is_none());
}

#[test]
fn captures_frames_and_finalizes_once() {
    let (rec, captured) = MemoryRecorder::new("video/webm;codecs=vp9");
    let mut p = ExportPipeline::new();
    p.start(Box::new(rec)).unwrap();
    for v in 0..3 {
        p.push(&frame(2, 2, v)).unwrap();
    }
    assert_eq!(p.frames(), 3);

    let artifact = p.finalize().unwrap().unwrap();
    assert_eq!(artifact.frames, 3);
    assert_eq!(artifact.mime, "video/webm;codecs=vp9");
    assert_eq!(artifact.path, None);
    assert_eq!(captured.len(), 3);
    assert_eq!(captured.get(2).unwrap().data[0], 2);

    assert!(p.finalize().unwrap().is_none());
    assert!(!p.is_capturing());
}

#[test]
fn second_start_is_rejected() {
    let mut p = ExportPipeline::new();
    p.start(Box::new(MemoryRecorder::new("video/mp4").0)).unwrap();
    let err = p
        .start(Box::new(MemoryRecorder::new("video/mp4").0))
        .unwrap_err();
    assert!(matches!(err, ReelError::ExportSetup(_)));
    assert!(p.is_capturing());
}

#[test]
fn recorder_errors_propagate() {
    let mut p = ExportPipeline::new();
    p.start(Box::new(MemoryRecorder::new("video/mp4").0)).unwrap();
    p.push(&frame(2, 2, 0)).unwrap();
    assert!(p.push(&frame(4, 2, 0)).is_err());
    assert_eq!(p.frames(), 1);
}
