use crate::{
    foundation::error::{ReelError, ReelResult},
    project::model::{AudioAsset, AudioKind, ProjectState, SceneAsset},
};

/// Constants of the timing model.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TimingOptions {
    /// Length of the intro placard when the project has an intro.
    pub intro_duration: f64,
    /// Length of the outro placard when the project has an outro.
    pub outro_duration: f64,
    /// Duration given to a scene that has no paired voice-over.
    pub fallback_scene_duration: f64,
    /// Lower bound for the timeline length, so empty projects keep a usable ruler.
    pub min_total_duration: f64,
}

impl Default for TimingOptions {
    fn default() -> Self {
        Self {
            intro_duration: 5.0,
            outro_duration: 5.0,
            fallback_scene_duration: 5.0,
            min_total_duration: 10.0,
        }
    }
}

impl TimingOptions {
    pub fn validate(&self) -> ReelResult<()> {
        let fields = [
            ("intro_duration", self.intro_duration),
            ("outro_duration", self.outro_duration),
            ("fallback_scene_duration", self.fallback_scene_duration),
            ("min_total_duration", self.min_total_duration),
        ];
        for (name, v) in fields {
            if !v.is_finite() || v < 0.0 {
                return Err(ReelError::validation(format!(
                    "timing option {name} must be finite and >= 0"
                )));
            }
        }
        if self.fallback_scene_duration <= 0.0 {
            return Err(ReelError::validation(
                "timing option fallback_scene_duration must be > 0",
            ));
        }
        Ok(())
    }
}

/// Result of pairing voice-over tracks to scenes by ordinal position.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VoicePairing {
    /// For each scene (in `scene_index` order), the index into the audio list of its voice-over.
    pub by_scene: Vec<Option<usize>>,
    /// Indices of voice-overs past the last scene. They are not scheduled.
    pub unpaired: Vec<usize>,
}

/// Pair voice-over tracks to scenes.
///
/// Voice-overs are stably sorted by `declared_start`; the n-th sorted voice-over belongs to the
/// scene at position n. The declared starts only decide the order, never the placement.
pub fn pair_voice_to_scenes(scenes: &[SceneAsset], audio: &[AudioAsset]) -> VoicePairing {
    let mut voice: Vec<usize> = audio
        .iter()
        .enumerate()
        .filter(|(_, t)| t.kind == AudioKind::Voiceover)
        .map(|(i, _)| i)
        .collect();
    voice.sort_by(|&a, &b| audio[a].declared_start.total_cmp(&audio[b].declared_start));

    let by_scene = (0..scenes.len()).map(|i| voice.get(i).copied()).collect();
    let unpaired = voice.iter().skip(scenes.len()).copied().collect();
    VoicePairing { by_scene, unpaired }
}

/// Resolved on-screen interval of one scene.
#[derive(Clone, Debug, PartialEq)]
pub struct TimelineWindow {
    /// Scene position.
    pub scene_index: u32,
    /// Inclusive start in seconds.
    pub start: f64,
    /// Length in seconds.
    pub duration: f64,
    /// Exclusive end in seconds.
    pub end: f64,
    /// Snapshot of the scene's asset at resolve time.
    pub asset: SceneAsset,
    /// Id of the paired voice-over, when there is one.
    pub voiceover_id: Option<String>,
}

impl TimelineWindow {
    /// Half-open containment.
    pub fn contains(&self, time: f64) -> bool {
        self.start <= time && time < self.end
    }
}

/// Derived timeline: scene windows plus overall length.
#[derive(Clone, Debug, PartialEq)]
pub struct ProjectTimingContext {
    /// One window per scene, in scene order, contiguous.
    pub windows: Vec<TimelineWindow>,
    /// Timeline length in seconds (never below the configured floor).
    pub total_duration: f64,
    /// End of the intro placard, when the project has one.
    pub intro_end: Option<f64>,
    /// Time after which the outro placard shows, when the project has one.
    pub outro_start: Option<f64>,
    /// Ids of voice-overs that had no scene to pair with.
    pub unpaired_voiceovers: Vec<String>,
}

impl ProjectTimingContext {
    /// Resolve the timeline for a whole project.
    pub fn for_project(project: &ProjectState, opts: &TimingOptions) -> Self {
        resolve_timings(
            &project.scene_assets,
            &project.audio_tracks,
            project.has_intro(),
            project.has_outro(),
            opts,
        )
    }

    /// Window containing `time`, if any.
    pub fn window_at(&self, time: f64) -> Option<&TimelineWindow> {
        // Windows are sorted and contiguous.
        let idx = self.windows.partition_point(|w| w.end <= time);
        self.windows.get(idx).filter(|w| w.contains(time))
    }

    /// Window whose paired voice-over has id `track_id`.
    pub fn window_for_voiceover(&self, track_id: &str) -> Option<&TimelineWindow> {
        self.windows
            .iter()
            .find(|w| w.voiceover_id.as_deref() == Some(track_id))
    }

    /// Clamp a time into `[0, total_duration]`.
    pub fn clamp_time(&self, time: f64) -> f64 {
        if time.is_nan() {
            return 0.0;
        }
        time.clamp(0.0, self.total_duration)
    }
}

/// Compute scene windows and total duration.
///
/// Pure and deterministic; callers replace their previous context wholesale whenever scenes,
/// audio tracks or the intro/outro flags change.
#[tracing::instrument(skip(scenes, audio, opts), fields(scenes = scenes.len(), tracks = audio.len()))]
pub fn resolve_timings(
    scenes: &[SceneAsset],
    audio: &[AudioAsset],
    has_intro: bool,
    has_outro: bool,
    opts: &TimingOptions,
) -> ProjectTimingContext {
    let pairing = pair_voice_to_scenes(scenes, audio);

    let mut cursor = if has_intro { opts.intro_duration } else { 0.0 };
    let mut windows = Vec::with_capacity(scenes.len());
    for (pos, scene) in scenes.iter().enumerate() {
        let paired = pairing.by_scene[pos].map(|i| &audio[i]);
        let duration = match paired {
            Some(track) => track.duration_seconds,
            None => {
                tracing::debug!(
                    scene = scene.scene_index,
                    fallback = opts.fallback_scene_duration,
                    "scene has no paired voice-over; using fallback duration"
                );
                opts.fallback_scene_duration
            }
        };
        windows.push(TimelineWindow {
            scene_index: scene.scene_index,
            start: cursor,
            duration,
            end: cursor + duration,
            asset: scene.clone(),
            voiceover_id: paired.map(|t| t.id.clone()),
        });
        cursor += duration;
    }

    let unpaired_voiceovers: Vec<String> = pairing
        .unpaired
        .iter()
        .map(|&i| audio[i].id.clone())
        .collect();
    if !unpaired_voiceovers.is_empty() {
        tracing::debug!(
            count = unpaired_voiceovers.len(),
            "voice-over tracks beyond the scene count are not scheduled"
        );
    }

    let mut total = windows.last().map(|w| w.end).unwrap_or(0.0);
    if has_outro {
        let content_end = windows.last().map(|w| w.end).unwrap_or(cursor);
        total = total.max(content_end + opts.outro_duration);
    }
    for track in audio.iter().filter(|t| t.kind != AudioKind::Voiceover) {
        total = total.max(track.declared_start + track.duration_seconds);
    }
    total = total.max(opts.min_total_duration);

    ProjectTimingContext {
        windows,
        total_duration: total,
        intro_end: has_intro.then_some(opts.intro_duration),
        outro_start: has_outro.then(|| (total - opts.outro_duration).max(0.0)),
        unpaired_voiceovers,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timing/resolver.rs"]
mod tests;
