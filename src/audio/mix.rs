use std::sync::Arc;

/// One decoded source placed on the output timeline.
#[derive(Clone, Debug)]
pub struct AudioSegment {
    /// Track the segment came from.
    pub track_id: String,
    /// First output frame the source's frame 0 lands on.
    pub timeline_start_sample: u64,
    pub gain: f32,
    pub source_sample_rate: u32,
    pub source_channels: u16,
    pub source_interleaved_f32: Arc<Vec<f32>>,
}

impl AudioSegment {
    /// Source length in seconds.
    pub fn source_duration_secs(&self) -> f64 {
        if self.source_channels == 0 || self.source_sample_rate == 0 {
            return 0.0;
        }
        let frames = self.source_interleaved_f32.len() / usize::from(self.source_channels);
        frames as f64 / f64::from(self.source_sample_rate)
    }
}

/// Everything the mixer needs: output format, length and the placed segments.
#[derive(Clone, Debug)]
pub struct AudioManifest {
    pub sample_rate: u32,
    pub channels: u16,
    /// Output length in frames.
    pub total_samples: u64,
    pub segments: Vec<AudioSegment>,
}

/// Output frame index for a timeline time, rounded to the nearest frame.
pub fn secs_to_sample(secs: f64, sample_rate: u32) -> u64 {
    if !secs.is_finite() || secs <= 0.0 {
        return 0;
    }
    (secs * f64::from(sample_rate)).round() as u64
}

/// Sum every segment into an interleaved buffer, clamped to [-1, 1].
///
/// Sources at a different rate are resampled by linear interpolation. Mono sources are copied
/// to both output channels; channels beyond the second are ignored. Segments are cut at the end
/// of the buffer.
pub fn mix_manifest(manifest: &AudioManifest) -> Vec<f32> {
    let frames = manifest.total_samples as usize;
    let out_channels = usize::from(manifest.channels);
    let mut out = vec![0.0f32; frames * out_channels];
    if out_channels == 0 || manifest.sample_rate == 0 {
        return out;
    }

    for seg in &manifest.segments {
        if seg.source_channels == 0 || seg.gain == 0.0 {
            continue;
        }
        let src = seg.source_interleaved_f32.as_ref();
        let src_channels = usize::from(seg.source_channels);
        let src_frames = src.len() / src_channels;
        if src_frames == 0 {
            continue;
        }
        let ratio = f64::from(seg.source_sample_rate) / f64::from(manifest.sample_rate);

        for dst_sample in seg.timeline_start_sample..manifest.total_samples {
            let rel = dst_sample - seg.timeline_start_sample;
            let src_pos = rel as f64 * ratio;
            let src_frame0 = src_pos.floor() as usize;
            if src_frame0 >= src_frames {
                break;
            }
            let src_frame1 = (src_frame0 + 1).min(src_frames - 1);
            let frac = (src_pos - src_frame0 as f64) as f32;

            let (l, r) = if src_channels == 1 {
                let v0 = src[src_frame0];
                let v1 = src[src_frame1];
                let v = v0 + ((v1 - v0) * frac);
                (v, v)
            } else {
                let i0 = src_frame0 * src_channels;
                let i1 = src_frame1 * src_channels;
                let (l0, l1) = (src[i0], src[i1]);
                let (r0, r1) = (src[i0 + 1], src[i1 + 1]);
                (l0 + ((l1 - l0) * frac), r0 + ((r1 - r0) * frac))
            };

            let dst_idx = dst_sample as usize * out_channels;
            out[dst_idx] += l * seg.gain;
            if out_channels > 1 {
                out[dst_idx + 1] += r * seg.gain;
            }
        }
    }

    for s in &mut out {
        *s = s.clamp(-1.0, 1.0);
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/audio/mix.rs"]
mod tests;
