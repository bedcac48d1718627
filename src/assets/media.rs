use crate::foundation::error::{ReelError, ReelResult};

/// Interleaved floating-point PCM.
#[derive(Clone, Debug, PartialEq)]
pub struct AudioPcm {
    pub sample_rate: u32,
    pub channels: u16,
    pub interleaved_f32: Vec<f32>,
}

impl AudioPcm {
    /// Frames (samples per channel).
    pub fn frames(&self) -> usize {
        if self.channels == 0 {
            0
        } else {
            self.interleaved_f32.len() / usize::from(self.channels)
        }
    }

    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            0.0
        } else {
            self.frames() as f64 / f64::from(self.sample_rate)
        }
    }
}

/// `true` when an `ffmpeg` binary can be spawned.
pub fn is_ffmpeg_on_path() -> bool {
    probe_binary("ffmpeg")
}

/// `true` when an `ffprobe` binary can be spawned.
pub fn is_ffprobe_on_path() -> bool {
    probe_binary("ffprobe")
}

fn probe_binary(name: &str) -> bool {
    std::process::Command::new(name)
        .arg("-version")
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .is_ok_and(|s| s.success())
}

/// Run `program` with `args`, feeding `input` on stdin from a writer thread.
#[cfg(feature = "media-ffmpeg")]
fn run_with_stdin(program: &str, args: &[&str], input: &[u8]) -> ReelResult<std::process::Output> {
    use std::{
        io::Write,
        process::{Command, Stdio},
    };

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| ReelError::decode(format!("failed to spawn {program}: {e}")))?;

    let mut stdin = child
        .stdin
        .take()
        .ok_or_else(|| ReelError::decode(format!("{program} stdin not available")))?;
    let bytes = input.to_vec();
    // ffmpeg may stop reading early (e.g. after probing headers); a broken pipe is not an error.
    let writer = std::thread::spawn(move || {
        let _ = stdin.write_all(&bytes);
    });

    let out = child
        .wait_with_output()
        .map_err(|e| ReelError::decode(format!("failed to wait for {program}: {e}")))?;
    let _ = writer.join();
    Ok(out)
}

/// Decode any audio container ffmpeg understands into stereo f32 PCM at `sample_rate`.
#[cfg(feature = "media-ffmpeg")]
#[tracing::instrument(skip(bytes), fields(len = bytes.len()))]
pub fn decode_audio_f32_stereo(bytes: &[u8], sample_rate: u32) -> ReelResult<AudioPcm> {
    let rate = sample_rate.to_string();
    let out = run_with_stdin(
        "ffmpeg",
        &[
            "-v", "error", "-i", "pipe:0", "-vn", "-f", "f32le", "-acodec", "pcm_f32le", "-ac",
            "2", "-ar", &rate, "pipe:1",
        ],
        bytes,
    )?;

    if !out.status.success() {
        let msg = String::from_utf8_lossy(&out.stderr);
        if msg.contains("matches no streams")
            || msg.contains("Output file #0 does not contain any stream")
        {
            return Ok(AudioPcm {
                sample_rate,
                channels: 2,
                interleaved_f32: Vec::new(),
            });
        }
        return Err(ReelError::decode(format!(
            "ffmpeg audio decode failed: {}",
            msg.trim()
        )));
    }

    if !out.stdout.len().is_multiple_of(4) {
        return Err(ReelError::decode(
            "decoded audio byte length is not aligned to f32 samples",
        ));
    }
    let interleaved_f32 = out
        .stdout
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect();

    Ok(AudioPcm {
        sample_rate,
        channels: 2,
        interleaved_f32,
    })
}

#[cfg(not(feature = "media-ffmpeg"))]
pub fn decode_audio_f32_stereo(_bytes: &[u8], _sample_rate: u32) -> ReelResult<AudioPcm> {
    Err(ReelError::decode(
        "compressed audio requires the 'media-ffmpeg' feature",
    ))
}

/// Container duration in seconds as reported by ffprobe.
#[cfg(feature = "media-ffmpeg")]
pub fn probe_duration_secs(bytes: &[u8]) -> ReelResult<f64> {
    #[derive(serde::Deserialize)]
    struct ProbeFormat {
        duration: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeOut {
        format: Option<ProbeFormat>,
    }

    let out = run_with_stdin(
        "ffprobe",
        &["-v", "error", "-print_format", "json", "-show_format", "pipe:0"],
        bytes,
    )?;
    if !out.status.success() {
        return Err(ReelError::decode(format!(
            "ffprobe failed: {}",
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }
    let parsed: ProbeOut = serde_json::from_slice(&out.stdout)
        .map_err(|e| ReelError::decode(format!("ffprobe json parse failed: {e}")))?;
    parsed
        .format
        .and_then(|f| f.duration)
        .and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d >= 0.0)
        .ok_or_else(|| ReelError::decode("ffprobe reported no duration"))
}

#[cfg(not(feature = "media-ffmpeg"))]
pub fn probe_duration_secs(_bytes: &[u8]) -> ReelResult<f64> {
    Err(ReelError::decode(
        "probing compressed audio requires the 'media-ffmpeg' feature",
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/media.rs"]
mod tests;
