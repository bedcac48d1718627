//! RIFF/WAVE writing. Output is always 16-bit integer PCM.

const FORMAT_PCM: u16 = 1;

/// Size of the canonical 44-byte header written by [`encode_pcm16`].
pub const WAV_HEADER_LEN: usize = 44;

/// Encode interleaved f32 samples as 16-bit PCM WAV.
///
/// Samples are clamped to [-1, 1]; negative values scale by 32768, positive by 32767.
pub fn encode_pcm16(samples_interleaved: &[f32], sample_rate: u32, channels: u16) -> Vec<u8> {
    let data_len = samples_interleaved.len() * 2;
    let mut out = Vec::with_capacity(WAV_HEADER_LEN + data_len);
    write_header(&mut out, data_len as u32, sample_rate, channels);
    for &s in samples_interleaved {
        let s = if s.is_finite() { s.clamp(-1.0, 1.0) } else { 0.0 };
        let v = if s < 0.0 {
            (s * 32_768.0) as i16
        } else {
            (s * 32_767.0) as i16
        };
        out.extend_from_slice(&v.to_le_bytes());
    }
    out
}

/// Wrap raw little-endian 16-bit PCM (as returned by speech synthesis APIs) in a WAV header.
pub fn wrap_pcm16(pcm_le: &[u8], sample_rate: u32, channels: u16) -> Vec<u8> {
    let mut out = Vec::with_capacity(WAV_HEADER_LEN + pcm_le.len());
    write_header(&mut out, pcm_le.len() as u32, sample_rate, channels);
    out.extend_from_slice(pcm_le);
    out
}

fn write_header(out: &mut Vec<u8>, data_len: u32, sample_rate: u32, channels: u16) {
    let block_align = channels * 2;
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36 + data_len).to_le_bytes());
    out.extend_from_slice(b"WAVE");
    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&FORMAT_PCM.to_le_bytes());
    out.extend_from_slice(&channels.to_le_bytes());
    out.extend_from_slice(&sample_rate.to_le_bytes());
    out.extend_from_slice(&(sample_rate * u32::from(block_align)).to_le_bytes());
    out.extend_from_slice(&block_align.to_le_bytes());
    out.extend_from_slice(&16u16.to_le_bytes());
    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_len.to_le_bytes());
}

#[cfg(test)]
#[path = "../../tests/unit/audio/wav.rs"]
mod tests;
