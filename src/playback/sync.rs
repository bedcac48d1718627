use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use crate::{
    foundation::error::{ReelError, ReelResult},
    project::model::{AudioAsset, VolumePolicy},
    timing::{
        resolver::ProjectTimingContext,
        schedule::{effective_span, track_gain},
    },
};

/// One playable audio track, positioned in its own media time.
pub trait AudioHandle: Send {
    /// Current position in seconds from the start of the media.
    fn position(&self) -> f64;
    fn is_playing(&self) -> bool;
    fn play(&mut self) -> ReelResult<()>;
    fn pause(&mut self);
    fn seek(&mut self, position: f64) -> ReelResult<()>;
    fn set_volume(&mut self, volume: f32);
    fn volume(&self) -> f32;
    /// Release the underlying resources. The handle is dropped afterwards.
    fn stop(&mut self);
}

/// Creates handles for tracks.
pub trait AudioBackend: Send {
    fn open(&mut self, track: &AudioAsset, url: &str) -> ReelResult<Box<dyn AudioHandle>>;
}

/// What one synchronization pass did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Paused tracks that were positioned and started.
    pub starts: u32,
    /// Playing tracks hard-seeked to correct drift.
    pub seeks: u32,
    /// Playing tracks paused because the playhead left their span.
    pub pauses: u32,
    /// Tracks skipped because opening, seeking or starting failed.
    pub failures: u32,
}

impl SyncReport {
    /// True when the pass changed nothing.
    pub fn is_quiet(&self) -> bool {
        self.starts == 0 && self.seeks == 0 && self.pauses == 0
    }
}

struct PooledHandle {
    url: String,
    handle: Box<dyn AudioHandle>,
}

/// Keeps every audio track in step with the playhead.
///
/// Handles are opened lazily, pooled by track id, and disposed when their id leaves the
/// project. A track that fails is skipped for the pass and retried on the next one.
pub struct AudioSynchronizer {
    backend: Box<dyn AudioBackend>,
    pool: HashMap<String, PooledHandle>,
    drift_tolerance: f64,
}

impl AudioSynchronizer {
    pub fn new(backend: Box<dyn AudioBackend>, drift_tolerance: f64) -> ReelResult<Self> {
        if !drift_tolerance.is_finite() || drift_tolerance < 0.0 {
            return Err(ReelError::validation(
                "drift tolerance must be finite and >= 0",
            ));
        }
        Ok(Self {
            backend,
            pool: HashMap::new(),
            drift_tolerance,
        })
    }

    pub fn drift_tolerance(&self) -> f64 {
        self.drift_tolerance
    }

    /// Handle for `track_id`, if one is pooled.
    pub fn handle(&self, track_id: &str) -> Option<&dyn AudioHandle> {
        self.pool.get(track_id).map(|p| p.handle.as_ref())
    }

    /// Number of pooled handles.
    pub fn pooled(&self) -> usize {
        self.pool.len()
    }

    /// Bring every track in line with playhead time `time`.
    pub fn sync(
        &mut self,
        time: f64,
        tracks: &[AudioAsset],
        timing: &ProjectTimingContext,
        policy: VolumePolicy,
    ) -> SyncReport {
        let mut report = SyncReport::default();
        let tolerance = self.drift_tolerance;
        for track in tracks {
            let Some(url) = track.media() else {
                continue;
            };
            let in_span = effective_span(track, timing)
                .filter(|&(start, end)| start <= time && time < end);
            let Some((start, _)) = in_span else {
                if let Some(entry) = self.pool.get_mut(&track.id)
                    && entry.handle.is_playing()
                {
                    entry.handle.pause();
                    report.pauses += 1;
                }
                continue;
            };

            let entry = match self.acquire(track, url) {
                Ok(entry) => entry,
                Err(e) => {
                    report.failures += 1;
                    tracing::warn!(track = %track.id, error = %e, "audio track unavailable this tick");
                    continue;
                }
            };
            let handle = entry.handle.as_mut();
            handle.set_volume(track_gain(track.kind, policy));

            let target = time - start;
            if !handle.is_playing() {
                match handle.seek(target).and_then(|()| handle.play()) {
                    Ok(()) => report.starts += 1,
                    Err(e) => {
                        report.failures += 1;
                        tracing::warn!(track = %track.id, error = %e, "audio track failed to start");
                    }
                }
                continue;
            }

            let drift = handle.position() - target;
            if drift.abs() > tolerance {
                tracing::debug!(track = %track.id, drift, "correcting audio drift");
                match handle.seek(target) {
                    Ok(()) => report.seeks += 1,
                    Err(e) => {
                        report.failures += 1;
                        tracing::warn!(track = %track.id, error = %e, "audio seek failed");
                    }
                }
            }
        }
        report
    }

    /// Pause every pooled handle.
    pub fn pause_all(&mut self) {
        for entry in self.pool.values_mut() {
            if entry.handle.is_playing() {
                entry.handle.pause();
            }
        }
    }

    /// Dispose handles whose track id is not in `tracks` (or whose track lost its media).
    pub fn retain_tracks(&mut self, tracks: &[AudioAsset]) {
        self.pool.retain(|id, entry| {
            let keep = tracks
                .iter()
                .any(|t| &t.id == id && t.media() == Some(entry.url.as_str()));
            if !keep {
                entry.handle.stop();
            }
            keep
        });
    }

    /// Dispose every handle.
    pub fn dispose_all(&mut self) {
        for (_, mut entry) in self.pool.drain() {
            entry.handle.stop();
        }
    }

    fn acquire(&mut self, track: &AudioAsset, url: &str) -> ReelResult<&mut PooledHandle> {
        if self.pool.get(&track.id).is_some_and(|p| p.url != url)
            && let Some(mut stale) = self.pool.remove(&track.id)
        {
            stale.handle.stop();
        }
        if !self.pool.contains_key(&track.id) {
            let handle = self.backend.open(track, url)?;
            self.pool.insert(
                track.id.clone(),
                PooledHandle {
                    url: url.to_string(),
                    handle,
                },
            );
        }
        self.pool
            .get_mut(&track.id)
            .ok_or_else(|| ReelError::validation("audio handle pool out of sync"))
    }
}

impl Drop for AudioSynchronizer {
    fn drop(&mut self) {
        self.dispose_all();
    }
}

/// Shared virtual clock for [`SoftwareAudioBackend`] handles, in seconds.
#[derive(Clone, Debug, Default)]
pub struct SoftwareClock(Arc<AtomicU64>);

impl SoftwareClock {
    pub fn now(&self) -> f64 {
        f64::from_bits(self.0.load(Ordering::SeqCst))
    }

    pub fn set(&self, secs: f64) {
        self.0.store(secs.to_bits(), Ordering::SeqCst);
    }

    pub fn advance(&self, secs: f64) {
        self.set(self.now() + secs);
    }
}

/// Audio backend without a sound device: handles track position against a [`SoftwareClock`].
///
/// Headless hosts use it to drive the synchronizer; tests use it to observe what the
/// synchronizer asked for. URLs listed with [`SoftwareAudioBackend::fail_url`] refuse to open.
#[derive(Clone, Debug, Default)]
pub struct SoftwareAudioBackend {
    clock: SoftwareClock,
    failing: Vec<String>,
}

impl SoftwareAudioBackend {
    pub fn new(clock: SoftwareClock) -> Self {
        Self {
            clock,
            failing: Vec::new(),
        }
    }

    pub fn clock(&self) -> SoftwareClock {
        self.clock.clone()
    }

    /// Make every open of `url` fail.
    pub fn fail_url(mut self, url: impl Into<String>) -> Self {
        self.failing.push(url.into());
        self
    }
}

impl AudioBackend for SoftwareAudioBackend {
    fn open(&mut self, track: &AudioAsset, url: &str) -> ReelResult<Box<dyn AudioHandle>> {
        if self.failing.iter().any(|u| u == url) {
            return Err(ReelError::missing_media(format!("cannot open '{url}'")));
        }
        Ok(Box::new(SoftwareAudioHandle {
            clock: self.clock.clone(),
            duration: track.duration_seconds,
            base_position: 0.0,
            started_at: None,
            volume: 1.0,
        }))
    }
}

/// Handle whose position advances with the shared clock while playing.
#[derive(Debug)]
pub struct SoftwareAudioHandle {
    clock: SoftwareClock,
    duration: f64,
    base_position: f64,
    started_at: Option<f64>,
    volume: f32,
}

impl SoftwareAudioHandle {
    fn raw_position(&self) -> f64 {
        match self.started_at {
            Some(t0) => self.base_position + (self.clock.now() - t0).max(0.0),
            None => self.base_position,
        }
    }
}

impl AudioHandle for SoftwareAudioHandle {
    fn position(&self) -> f64 {
        self.raw_position().min(self.duration)
    }

    fn is_playing(&self) -> bool {
        self.started_at.is_some() && self.raw_position() < self.duration
    }

    fn play(&mut self) -> ReelResult<()> {
        if self.started_at.is_none() {
            self.started_at = Some(self.clock.now());
        }
        Ok(())
    }

    fn pause(&mut self) {
        self.base_position = self.position();
        self.started_at = None;
    }

    fn seek(&mut self, position: f64) -> ReelResult<()> {
        if !position.is_finite() {
            return Err(ReelError::validation("seek position must be finite"));
        }
        self.base_position = position.clamp(0.0, self.duration.max(0.0));
        if self.started_at.is_some() {
            self.started_at = Some(self.clock.now());
        }
        Ok(())
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
    }

    fn volume(&self) -> f32 {
        self.volume
    }

    fn stop(&mut self) {
        self.started_at = None;
        self.base_position = 0.0;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/playback/sync.rs"]
mod tests;
