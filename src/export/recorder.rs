use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
};

use crate::{
    foundation::error::{ReelError, ReelResult},
    render::FrameRGBA,
};

/// Finished recording handed back to the host for saving.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportArtifact {
    /// Written file, for recorders that write one.
    pub path: Option<PathBuf>,
    /// MIME type of the container, e.g. `video/webm;codecs=vp9`.
    pub mime: String,
    /// Frames captured.
    pub frames: u64,
}

/// Consumes rendered frames in playback order.
pub trait Recorder: Send {
    fn mime(&self) -> &str;
    fn push_frame(&mut self, frame: &FrameRGBA) -> ReelResult<()>;
    /// Flush and close. Consuming `self` makes a second finalize impossible.
    fn finish(self: Box<Self>) -> ReelResult<ExportArtifact>;
}

/// Frames captured by a [`MemoryRecorder`], readable after (and during) recording.
#[derive(Clone, Debug, Default)]
pub struct CapturedFrames(Arc<Mutex<Vec<FrameRGBA>>>);

impl CapturedFrames {
    pub fn len(&self) -> usize {
        self.0.lock().map(|v| v.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: usize) -> Option<FrameRGBA> {
        self.0.lock().ok().and_then(|v| v.get(index).cloned())
    }
}

/// Keeps every frame in memory. For tests and hosts that encode frames themselves.
#[derive(Debug)]
pub struct MemoryRecorder {
    mime: String,
    frames: CapturedFrames,
    expected_size: Option<(u32, u32)>,
}

impl MemoryRecorder {
    pub fn new(mime: impl Into<String>) -> (Self, CapturedFrames) {
        let frames = CapturedFrames::default();
        (
            Self {
                mime: mime.into(),
                frames: frames.clone(),
                expected_size: None,
            },
            frames,
        )
    }
}

impl Recorder for MemoryRecorder {
    fn mime(&self) -> &str {
        &self.mime
    }

    fn push_frame(&mut self, frame: &FrameRGBA) -> ReelResult<()> {
        let size = (frame.width, frame.height);
        match self.expected_size {
            None => self.expected_size = Some(size),
            Some(expected) if expected != size => {
                return Err(ReelError::export(format!(
                    "frame size changed mid-recording: {}x{} -> {}x{}",
                    expected.0, expected.1, size.0, size.1
                )));
            }
            Some(_) => {}
        }
        self.frames
            .0
            .lock()
            .map_err(|_| ReelError::export("captured frame store poisoned"))?
            .push(frame.clone());
        Ok(())
    }

    fn finish(self: Box<Self>) -> ReelResult<ExportArtifact> {
        let this = *self;
        Ok(ExportArtifact {
            path: None,
            frames: this.frames.len() as u64,
            mime: this.mime,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/recorder.rs"]
mod tests;
