use crate::{
    export::recorder::{ExportArtifact, Recorder},
    foundation::error::{ReelError, ReelResult},
    render::FrameRGBA,
};

enum State {
    Idle,
    Capturing {
        recorder: Box<dyn Recorder>,
        frames: u64,
    },
}

/// Owns at most one running recorder and guarantees it is finalized once.
pub struct ExportPipeline {
    state: State,
}

impl std::fmt::Debug for ExportPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.state {
            State::Idle => f.write_str("ExportPipeline(Idle)"),
            State::Capturing { recorder, frames } => f
                .debug_struct("ExportPipeline")
                .field("mime", &recorder.mime())
                .field("frames", frames)
                .finish(),
        }
    }
}

impl Default for ExportPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl ExportPipeline {
    pub fn new() -> Self {
        Self { state: State::Idle }
    }

    pub fn is_capturing(&self) -> bool {
        matches!(self.state, State::Capturing { .. })
    }

    /// Frames pushed to the current recorder.
    pub fn frames(&self) -> u64 {
        match &self.state {
            State::Idle => 0,
            State::Capturing { frames, .. } => *frames,
        }
    }

    pub fn start(&mut self, recorder: Box<dyn Recorder>) -> ReelResult<()> {
        if self.is_capturing() {
            return Err(ReelError::export_setup("an export is already running"));
        }
        tracing::debug!(mime = recorder.mime(), "export capture started");
        self.state = State::Capturing {
            recorder,
            frames: 0,
        };
        Ok(())
    }

    /// Forward a frame to the recorder. No-op while idle.
    pub fn push(&mut self, frame: &FrameRGBA) -> ReelResult<()> {
        if let State::Capturing { recorder, frames } = &mut self.state {
            recorder.push_frame(frame)?;
            *frames += 1;
        }
        Ok(())
    }

    /// Close the recorder and hand back its artifact.
    ///
    /// Returns `Ok(None)` when nothing is capturing, so calling it twice never finalizes twice.
    pub fn finalize(&mut self) -> ReelResult<Option<ExportArtifact>> {
        match std::mem::replace(&mut self.state, State::Idle) {
            State::Idle => Ok(None),
            State::Capturing { recorder, frames } => {
                tracing::debug!(frames, "export capture finalizing");
                recorder.finish().map(Some)
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/pipeline.rs"]
mod tests;
