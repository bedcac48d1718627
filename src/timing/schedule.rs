//! Effective-start and gain rules.
//!
//! Live sync and the offline mixdown both call into this module; neither carries its own copy
//! of these rules.

use crate::{
    project::model::{AudioAsset, AudioKind, VolumePolicy},
    timing::resolver::ProjectTimingContext,
};

/// Start time used for scheduling `track`.
///
/// Voice-overs start at their paired window's start; their own `declared_start` is ignored.
/// Music and SFX start at `declared_start`. Unpaired voice-overs are not scheduled (`None`).
pub fn effective_start(track: &AudioAsset, timing: &ProjectTimingContext) -> Option<f64> {
    match track.kind {
        AudioKind::Voiceover => timing.window_for_voiceover(&track.id).map(|w| w.start),
        AudioKind::Music | AudioKind::Sfx => Some(track.declared_start),
    }
}

/// Half-open `[start, end)` span of `track` on the timeline.
pub fn effective_span(track: &AudioAsset, timing: &ProjectTimingContext) -> Option<(f64, f64)> {
    effective_start(track, timing).map(|start| (start, start + track.duration_seconds))
}

/// Gain for a track kind: music is ducked, narration follows the voice volume, SFX is fixed.
pub fn track_gain(kind: AudioKind, policy: VolumePolicy) -> f32 {
    let v = match kind {
        AudioKind::Music => policy.music,
        AudioKind::Voiceover => policy.voice,
        AudioKind::Sfx => 1.0,
    };
    v.clamp(0.0, 1.0)
}

#[cfg(test)]
#[path = "../../tests/unit/timing/schedule.rs"]
mod tests;
