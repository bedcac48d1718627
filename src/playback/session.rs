use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use crate::{
    assets::image_cache::ImageCache,
    export::{
        pipeline::ExportPipeline,
        recorder::{ExportArtifact, Recorder},
    },
    foundation::{core::Fps, error::ReelResult},
    playback::{
        playhead::{Playhead, TickOutcome},
        scheduler::Scheduler,
        sync::{AudioSynchronizer, SyncReport},
    },
    project::model::{MediaKind, ProjectState},
    render::{FrameRGBA, compositor::FrameCompositor},
    timing::resolver::{ProjectTimingContext, TimingOptions},
};

/// What a call to [`PlaybackSession::on_frame`] did.
#[derive(Clone, Debug, PartialEq)]
pub enum FrameEvent {
    /// Nothing was due.
    Idle,
    /// A frame for `time` was rendered.
    Rendered { time: f64 },
    /// Playback reached the end. `artifact` is set when an export was running.
    Finished {
        time: f64,
        artifact: Option<ExportArtifact>,
    },
}

/// Components a [`PlaybackSession`] drives.
pub struct SessionParts {
    pub fps: Fps,
    pub timing: TimingOptions,
    pub compositor: FrameCompositor,
    pub images: ImageCache,
    pub audio: AudioSynchronizer,
    pub scheduler: Box<dyn Scheduler>,
}

/// Wires playhead, audio sync, compositor and export around one project.
///
/// The host calls [`on_frame`](Self::on_frame) from its frame callback. Within a tick, audio is
/// synced before the frame for the same time is rendered, and an active export receives exactly
/// the frame the preview shows.
pub struct PlaybackSession {
    project: Arc<ProjectState>,
    timing_opts: TimingOptions,
    timing: ProjectTimingContext,
    playhead: Playhead,
    scheduler: Box<dyn Scheduler>,
    audio: AudioSynchronizer,
    compositor: FrameCompositor,
    images: ImageCache,
    export: ExportPipeline,
    last_sync: SyncReport,
}

impl std::fmt::Debug for PlaybackSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackSession")
            .field("time", &self.playhead.time())
            .field("total", &self.timing.total_duration)
            .field("state", &self.playhead.state())
            .field("export", &self.export)
            .finish()
    }
}

impl PlaybackSession {
    pub fn new(project: impl Into<Arc<ProjectState>>, parts: SessionParts) -> ReelResult<Self> {
        parts.timing.validate()?;
        let project = project.into();
        project.validate()?;
        let timing = ProjectTimingContext::for_project(&project, &parts.timing);
        let playhead = Playhead::new(parts.fps, timing.total_duration)?;
        let mut session = Self {
            project,
            timing_opts: parts.timing,
            timing,
            playhead,
            scheduler: parts.scheduler,
            audio: parts.audio,
            compositor: parts.compositor,
            images: parts.images,
            export: ExportPipeline::new(),
            last_sync: SyncReport::default(),
        };
        session.request_images();
        Ok(session)
    }

    pub fn project(&self) -> &ProjectState {
        &self.project
    }

    /// Shared handle to the project the session currently plays.
    pub fn project_snapshot(&self) -> Arc<ProjectState> {
        Arc::clone(&self.project)
    }

    pub fn timing(&self) -> &ProjectTimingContext {
        &self.timing
    }

    pub fn playhead(&self) -> &Playhead {
        &self.playhead
    }

    pub fn time(&self) -> f64 {
        self.playhead.time()
    }

    pub fn synchronizer(&self) -> &AudioSynchronizer {
        &self.audio
    }

    pub fn images(&self) -> &ImageCache {
        &self.images
    }

    pub fn compositor_mut(&mut self) -> &mut FrameCompositor {
        &mut self.compositor
    }

    /// Report of the most recent audio sync pass.
    pub fn last_sync(&self) -> SyncReport {
        self.last_sync
    }

    pub fn is_exporting(&self) -> bool {
        self.export.is_capturing()
    }

    /// Swap in an edited project.
    ///
    /// Timing is recomputed wholesale, the playhead is clamped to the new total, pooled audio for
    /// removed tracks is disposed and cached images no longer referenced are dropped. A project
    /// that fails validation is rejected and the current one stays in place.
    #[tracing::instrument(skip_all)]
    pub fn replace_project(&mut self, project: impl Into<Arc<ProjectState>>) -> ReelResult<()> {
        let project = project.into();
        project.validate()?;
        self.project = project;
        self.timing = ProjectTimingContext::for_project(&self.project, &self.timing_opts);
        self.playhead.set_total(self.timing.total_duration);
        self.audio.retain_tracks(&self.project.audio_tracks);
        let live: Vec<String> = self.image_urls().map(str::to_owned).collect();
        self.images.retain_urls(live.iter().map(String::as_str));
        self.request_images();
        tracing::debug!(total = self.timing.total_duration, "project replaced");
        Ok(())
    }

    pub fn play(&mut self, now: Instant) {
        if self.playhead.play().is_some() {
            self.scheduler.arm(now);
        }
    }

    pub fn pause(&mut self) {
        self.playhead.pause();
        self.audio.pause_all();
    }

    pub fn seek(&mut self, time: f64, now: Instant) {
        if self.playhead.seek(time).is_some() {
            self.scheduler.arm(now);
        }
    }

    /// Advance the session for one host frame callback.
    pub fn on_frame(&mut self, now: Instant) -> ReelResult<FrameEvent> {
        if !self.playhead.is_running() {
            if self.playhead.take_redraw() {
                let time = self.playhead.time();
                self.render(time);
                return Ok(FrameEvent::Rendered { time });
            }
            return Ok(FrameEvent::Idle);
        }

        let due = self.scheduler.due(now);
        let Some(id) = self.playhead.pending_tick().filter(|_| due) else {
            if self.playhead.take_redraw() {
                let time = self.playhead.time();
                self.sync_audio(time);
                self.render(time);
                return Ok(FrameEvent::Rendered { time });
            }
            return Ok(FrameEvent::Idle);
        };

        match self.playhead.tick(id) {
            TickOutcome::Advanced { time, .. } => {
                self.playhead.take_redraw();
                self.sync_audio(time);
                self.render(time);
                self.push_export_frame()?;
                Ok(FrameEvent::Rendered { time })
            }
            TickOutcome::Finished { time } => {
                self.audio.pause_all();
                let artifact = self.export.finalize()?;
                if let Some(a) = &artifact {
                    tracing::info!(frames = a.frames, mime = %a.mime, "export finished");
                }
                self.playhead.take_redraw();
                self.render(time);
                Ok(FrameEvent::Finished { time, artifact })
            }
            TickOutcome::Stale => Ok(FrameEvent::Idle),
        }
    }

    /// Start capturing from `t = 0`.
    ///
    /// The frame for `t = 0` is recorded immediately; each following tick adds one frame until
    /// the playhead finishes.
    #[tracing::instrument(skip_all, fields(mime = recorder.mime()))]
    pub fn start_export(&mut self, recorder: Box<dyn Recorder>, now: Instant) -> ReelResult<()> {
        self.export.start(recorder)?;
        self.playhead.pause();
        self.playhead.seek(0.0);
        self.playhead.take_redraw();
        self.sync_audio(0.0);
        self.render(0.0);
        self.push_export_frame()?;
        self.play(now);
        Ok(())
    }

    /// Cancel a capture: playback halts and the recorder is finalized with what it has.
    ///
    /// Returns `None` when no capture was running.
    #[tracing::instrument(skip_all)]
    pub fn stop_export(&mut self) -> ReelResult<Option<ExportArtifact>> {
        if !self.export.is_capturing() {
            return Ok(None);
        }
        self.pause();
        self.export.finalize()
    }

    /// Render `time` directly, without touching audio or the playhead.
    pub fn render_at(&mut self, time: f64) -> FrameRGBA {
        self.render(time);
        self.compositor.snapshot()
    }

    /// Copy of the last rendered frame.
    pub fn snapshot(&self) -> FrameRGBA {
        self.compositor.snapshot()
    }

    /// Request every referenced image and wait up to `timeout` for the loads to settle.
    ///
    /// Returns `false` if loads were still in flight at the deadline.
    pub fn preload_images(&mut self, timeout: Duration) -> bool {
        self.request_images();
        self.images.wait_idle(timeout)
    }

    fn render(&mut self, time: f64) {
        self.compositor
            .render_frame(time, &self.project, &self.timing, &mut self.images);
    }

    fn sync_audio(&mut self, time: f64) {
        self.last_sync = self.audio.sync(
            time,
            &self.project.audio_tracks,
            &self.timing,
            self.project.volume_policy(),
        );
    }

    fn push_export_frame(&mut self) -> ReelResult<()> {
        if !self.export.is_capturing() {
            return Ok(());
        }
        let frame = self.compositor.snapshot();
        if let Err(e) = self.export.push(&frame) {
            tracing::warn!(error = %e, "export frame rejected; stopping export");
            self.pause();
            if let Err(fin) = self.export.finalize() {
                tracing::warn!(error = %fin, "export finalize after failure also failed");
            }
            return Err(e);
        }
        Ok(())
    }

    fn image_urls(&self) -> impl Iterator<Item = &str> {
        let scenes = self
            .project
            .scene_assets
            .iter()
            .filter(|s| s.media_kind == MediaKind::Image)
            .filter_map(|s| s.media());
        let overlays = self.project.overlays.iter().map(|o| o.media_url.as_str());
        scenes.chain(overlays)
    }

    fn request_images(&mut self) {
        let urls: Vec<String> = self.image_urls().map(str::to_owned).collect();
        for url in &urls {
            self.images.request(url);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/playback/session.rs"]
mod tests;
