use std::{path::Path, sync::Arc};

use anyhow::Context;
use rayon::prelude::*;

use crate::{
    assets::{
        fetch::MediaFetcher,
        media::{self, AudioPcm},
    },
    audio::{
        MIX_CHANNELS, MIX_SAMPLE_RATE,
        decode,
        mix::{AudioManifest, AudioSegment, mix_manifest, secs_to_sample},
        wav,
    },
    foundation::error::{ReelError, ReelResult},
    project::model::{AudioAsset, ProjectState},
    timing::{
        resolver::ProjectTimingContext,
        schedule::{effective_start, track_gain},
    },
};

/// Turns encoded audio bytes into PCM.
///
/// The returned PCM may use any rate and channel count; the mixer resamples.
pub trait AudioDecoder: Send + Sync {
    fn decode(&self, bytes: &[u8], target_rate: u32) -> ReelResult<AudioPcm>;
}

/// Decodes with `symphonia` and falls back to the system `ffmpeg` for other containers.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultAudioDecoder;

impl AudioDecoder for DefaultAudioDecoder {
    fn decode(&self, bytes: &[u8], target_rate: u32) -> ReelResult<AudioPcm> {
        decode::decode_audio(bytes).or_else(|e| {
            tracing::debug!(error = %e, "symphonia decode failed; trying ffmpeg");
            media::decode_audio_f32_stereo(bytes, target_rate)
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MixdownOptions {
    pub sample_rate: u32,
    /// Silence appended after the timeline's total duration.
    pub tail_secs: f64,
}

impl Default for MixdownOptions {
    fn default() -> Self {
        Self {
            sample_rate: MIX_SAMPLE_RATE,
            tail_secs: 1.0,
        }
    }
}

impl MixdownOptions {
    pub fn validate(&self) -> ReelResult<()> {
        if self.sample_rate == 0 {
            return Err(ReelError::mixdown("sample_rate must be > 0"));
        }
        if !self.tail_secs.is_finite() || self.tail_secs < 0.0 {
            return Err(ReelError::mixdown("tail_secs must be finite and >= 0"));
        }
        Ok(())
    }
}

/// Decode every schedulable track and place it on the output timeline.
///
/// Tracks without media, unpaired voice-overs and tracks that fail to fetch or decode are left
/// out; the rest of the mix is still produced.
#[tracing::instrument(skip_all, fields(tracks = project.audio_tracks.len()))]
pub fn build_mix_manifest(
    project: &ProjectState,
    timing: &ProjectTimingContext,
    fetcher: &dyn MediaFetcher,
    decoder: &dyn AudioDecoder,
    opts: MixdownOptions,
) -> ReelResult<AudioManifest> {
    opts.validate()?;
    let sample_rate = opts.sample_rate;
    let policy = project.volume_policy();

    let segments: Vec<AudioSegment> = project
        .audio_tracks
        .par_iter()
        .filter_map(|track| {
            let url = track.media()?;
            let Some(start) = effective_start(track, timing) else {
                tracing::debug!(track = %track.id, "voice-over has no scene; left out of mix");
                return None;
            };
            match fetcher
                .fetch(url)
                .and_then(|bytes| decoder.decode(&bytes, sample_rate))
            {
                Ok(pcm) => Some(segment_for(
                    track,
                    start,
                    track_gain(track.kind, policy),
                    pcm,
                    sample_rate,
                )),
                Err(e) => {
                    tracing::warn!(track = %track.id, error = %e, "audio track skipped in mixdown");
                    None
                }
            }
        })
        .collect();

    Ok(AudioManifest {
        sample_rate,
        channels: MIX_CHANNELS,
        total_samples: secs_to_sample(timing.total_duration + opts.tail_secs, sample_rate),
        segments,
    })
}

fn segment_for(
    track: &AudioAsset,
    start: f64,
    gain: f32,
    pcm: AudioPcm,
    sample_rate: u32,
) -> AudioSegment {
    AudioSegment {
        track_id: track.id.clone(),
        timeline_start_sample: secs_to_sample(start, sample_rate),
        gain,
        source_sample_rate: pcm.sample_rate,
        source_channels: pcm.channels,
        source_interleaved_f32: Arc::new(pcm.interleaved_f32),
    }
}

/// Render the whole project's audio to WAV bytes (16-bit PCM, stereo).
///
/// Not meant to run while a live session is playing the same project.
#[tracing::instrument(skip_all)]
pub fn render_mixdown(
    project: &ProjectState,
    timing: &ProjectTimingContext,
    fetcher: &dyn MediaFetcher,
    decoder: &dyn AudioDecoder,
    opts: MixdownOptions,
) -> ReelResult<Vec<u8>> {
    let manifest = build_mix_manifest(project, timing, fetcher, decoder, opts)?;
    let samples = mix_manifest(&manifest);
    tracing::info!(
        segments = manifest.segments.len(),
        frames = manifest.total_samples,
        "mixdown rendered"
    );
    Ok(wav::encode_pcm16(&samples, manifest.sample_rate, manifest.channels))
}

/// Write mixdown bytes to `out_path`, creating parent directories.
pub fn write_mixdown_file(wav_bytes: &[u8], out_path: &Path) -> ReelResult<()> {
    if let Some(parent) = out_path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create mixdown directory '{}'", parent.display()))
            .map_err(|e| ReelError::mixdown(format!("{e:#}")))?;
    }
    std::fs::write(out_path, wav_bytes)
        .with_context(|| format!("write mixdown '{}'", out_path.display()))
        .map_err(|e| ReelError::mixdown(format!("{e:#}")))
}

#[cfg(test)]
#[path = "../../tests/unit/audio/mixdown.rs"]
mod tests;
