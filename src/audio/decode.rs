//! In-process audio decoding through `symphonia`.
//!
//! Covers WAV, MP3, AAC, FLAC and Vorbis. Containers symphonia cannot open fall back to the
//! system `ffmpeg`/`ffprobe` helpers in [`crate::assets::media`].

use std::io::{self, Cursor};

use symphonia::core::{
    audio::SampleBuffer,
    codecs::DecoderOptions,
    errors::Error,
    formats::{FormatOptions, FormatReader},
    io::MediaSourceStream,
    meta::MetadataOptions,
    probe::Hint,
};

use crate::{
    assets::media::AudioPcm,
    foundation::error::{ReelError, ReelResult},
};

fn sym_err(e: Error) -> ReelError {
    ReelError::decode(format!("audio decode failed: {e}"))
}

fn open(bytes: &[u8]) -> ReelResult<Box<dyn FormatReader>> {
    let mss = MediaSourceStream::new(Box::new(Cursor::new(bytes.to_vec())), Default::default());
    let probed = symphonia::default::get_probe()
        .format(
            &Hint::new(),
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(sym_err)?;
    Ok(probed.format)
}

/// Decode `bytes` to interleaved f32 at the stream's own rate and channel count.
#[tracing::instrument(skip(bytes), fields(len = bytes.len()))]
pub fn decode_audio(bytes: &[u8]) -> ReelResult<AudioPcm> {
    let mut format = open(bytes)?;
    let track = format
        .default_track()
        .ok_or_else(|| ReelError::decode("no default audio track"))?;
    let track_id = track.id;
    let params = track.codec_params.clone();

    let mut decoder = symphonia::default::get_codecs()
        .make(&params, &DecoderOptions::default())
        .map_err(sym_err)?;

    let mut sample_rate = params.sample_rate;
    let mut channels = params.channels.map(|c| c.count());
    let mut interleaved_f32: Vec<f32> = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(p) => p,
            Err(Error::IoError(e)) if e.kind() == io::ErrorKind::UnexpectedEof => break,
            Err(Error::ResetRequired) => {
                decoder.reset();
                continue;
            }
            Err(Error::DecodeError(_)) => continue,
            Err(e) => return Err(sym_err(e)),
        };
        if packet.track_id() != track_id {
            continue;
        }
        let decoded = match decoder.decode(&packet) {
            Ok(buf) => buf,
            Err(Error::DecodeError(msg)) => {
                tracing::debug!(error = msg, "skipping undecodable packet");
                continue;
            }
            Err(e) => return Err(sym_err(e)),
        };
        let spec = *decoded.spec();
        sample_rate.get_or_insert(spec.rate);
        channels.get_or_insert(spec.channels.count());

        let mut buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
        buf.copy_interleaved_ref(decoded);
        interleaved_f32.extend_from_slice(buf.samples());
    }

    let sample_rate = sample_rate
        .filter(|&r| r > 0)
        .ok_or_else(|| ReelError::decode("audio stream has no sample rate"))?;
    let channels = channels
        .and_then(|c| u16::try_from(c).ok())
        .filter(|&c| c > 0)
        .ok_or_else(|| ReelError::decode("audio stream has no channel layout"))?;

    let ch = usize::from(channels);
    interleaved_f32.truncate(interleaved_f32.len() / ch * ch);

    Ok(AudioPcm {
        sample_rate,
        channels,
        interleaved_f32,
    })
}

/// Playable length in seconds.
///
/// Uses the frame count from the container header when there is one, and decodes the stream
/// otherwise.
pub fn probe_duration_secs(bytes: &[u8]) -> ReelResult<f64> {
    let format = open(bytes)?;
    let header = format.default_track().and_then(|t| {
        let params = &t.codec_params;
        let rate = params.sample_rate.filter(|&r| r > 0)?;
        let frames = params.n_frames?;
        Some(frames as f64 / f64::from(rate))
    });
    match header {
        Some(secs) => Ok(secs),
        None => Ok(decode_audio(bytes)?.duration_secs()),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/audio/decode.rs"]
mod tests;
