use std::{
    io::Write as _,
    path::{Path, PathBuf},
    process::{Child, ChildStdin, Command, Stdio},
};

use anyhow::Context as _;

use crate::{
    assets::media::is_ffmpeg_on_path,
    export::recorder::{ExportArtifact, Recorder},
    foundation::{
        core::{Canvas, Fps},
        error::{ReelError, ReelResult},
    },
    render::FrameRGBA,
};

/// Output container plus the codec used inside it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Container {
    /// WebM with VP9.
    Webm,
    /// MP4 with H.264.
    Mp4,
}

impl Container {
    pub fn extension(self) -> &'static str {
        match self {
            Container::Webm => "webm",
            Container::Mp4 => "mp4",
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            Container::Webm => "video/webm;codecs=vp9",
            Container::Mp4 => "video/mp4",
        }
    }

    /// ffmpeg encoder this container needs.
    pub fn encoder(self) -> &'static str {
        match self {
            Container::Webm => "libvpx-vp9",
            Container::Mp4 => "libx264",
        }
    }

    fn codec_args(self, bitrate: &str) -> Vec<String> {
        let mut args = vec!["-c:v", self.encoder(), "-b:v", bitrate, "-pix_fmt", "yuv420p"];
        match self {
            Container::Webm => {
                args.extend(["-deadline", "realtime", "-cpu-used", "8", "-row-mt", "1"]);
            }
            Container::Mp4 => args.extend(["-movflags", "+faststart"]),
        }
        args.into_iter().map(str::to_string).collect()
    }
}

/// First container in `preference` whose encoder appears in an `ffmpeg -encoders` listing.
pub fn negotiate_container(encoders_listing: &str, preference: &[Container]) -> Option<Container> {
    preference.iter().copied().find(|c| {
        encoders_listing
            .lines()
            .any(|line| line.split_whitespace().nth(1) == Some(c.encoder()))
    })
}

fn list_encoders() -> ReelResult<String> {
    let out = Command::new("ffmpeg")
        .args(["-hide_banner", "-encoders"])
        .stdin(Stdio::null())
        .output()
        .map_err(|e| ReelError::export_setup(format!("failed to run ffmpeg -encoders: {e}")))?;
    if !out.status.success() {
        return Err(ReelError::export_setup(format!(
            "ffmpeg -encoders failed: {}",
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }
    Ok(String::from_utf8_lossy(&out.stdout).into_owned())
}

#[derive(Clone, Debug, PartialEq)]
pub struct FfmpegRecorderConfig {
    pub canvas: Canvas,
    pub fps: Fps,
    /// Target path; its extension is replaced by the negotiated container's.
    pub out_path: PathBuf,
    pub bitrate_bps: u32,
    /// Containers to try, best first.
    pub preference: Vec<Container>,
    pub overwrite: bool,
}

impl FfmpegRecorderConfig {
    pub fn new(out_path: impl Into<PathBuf>, canvas: Canvas, fps: Fps) -> Self {
        Self {
            canvas,
            fps,
            out_path: out_path.into(),
            bitrate_bps: 3_000_000,
            preference: vec![Container::Webm, Container::Mp4],
            overwrite: true,
        }
    }

    pub fn validate(&self) -> ReelResult<()> {
        let Canvas { width, height } = self.canvas;
        if width == 0 || height == 0 {
            return Err(ReelError::export_setup("export width/height must be non-zero"));
        }
        if !width.is_multiple_of(2) || !height.is_multiple_of(2) {
            return Err(ReelError::export_setup(
                "export width/height must be even (yuv420p output)",
            ));
        }
        if self.fps.num == 0 || self.fps.den == 0 {
            return Err(ReelError::export_setup("export fps must be non-zero"));
        }
        if self.bitrate_bps == 0 {
            return Err(ReelError::export_setup("export bitrate must be non-zero"));
        }
        if self.preference.is_empty() {
            return Err(ReelError::export_setup("no container preference given"));
        }
        Ok(())
    }
}

/// Create the parent directory of `path` if needed.
pub fn ensure_parent_dir(path: &Path) -> ReelResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Streams raw RGBA frames into a system `ffmpeg` process.
pub struct FfmpegRecorder {
    container: Container,
    out_path: PathBuf,
    canvas: Canvas,
    child: Child,
    stdin: Option<ChildStdin>,
    scratch: Vec<u8>,
    frames: u64,
}

impl std::fmt::Debug for FfmpegRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FfmpegRecorder")
            .field("container", &self.container)
            .field("out_path", &self.out_path)
            .field("frames", &self.frames)
            .finish()
    }
}

impl FfmpegRecorder {
    /// Negotiate a container and start the encoder.
    ///
    /// Fails with [`ReelError::ExportSetup`] when ffmpeg is missing, none of the preferred
    /// encoders is available, or the process cannot be spawned.
    #[tracing::instrument(skip(cfg), fields(out = %cfg.out_path.display()))]
    pub fn create(cfg: FfmpegRecorderConfig) -> ReelResult<Self> {
        cfg.validate()?;
        if !is_ffmpeg_on_path() {
            return Err(ReelError::export_setup(
                "ffmpeg is required for video export, but was not found on PATH",
            ));
        }
        let listing = list_encoders()?;
        let container = negotiate_container(&listing, &cfg.preference).ok_or_else(|| {
            ReelError::export_setup("none of the preferred video encoders is available")
        })?;

        let out_path = cfg.out_path.with_extension(container.extension());
        ensure_parent_dir(&out_path).map_err(|e| ReelError::export_setup(e.to_string()))?;
        if !cfg.overwrite && out_path.exists() {
            return Err(ReelError::export_setup(format!(
                "output file '{}' already exists",
                out_path.display()
            )));
        }

        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        cmd.arg(if cfg.overwrite { "-y" } else { "-n" });
        cmd.args([
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-s",
            &format!("{}x{}", cfg.canvas.width, cfg.canvas.height),
            "-r",
            &format!("{}/{}", cfg.fps.num, cfg.fps.den),
            "-i",
            "pipe:0",
            "-an",
        ])
        .args(container.codec_args(&cfg.bitrate_bps.to_string()))
        .arg(&out_path);

        let mut child = cmd
            .spawn()
            .map_err(|e| ReelError::export_setup(format!("failed to spawn ffmpeg: {e}")))?;
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| ReelError::export_setup("failed to open ffmpeg stdin"))?;

        tracing::info!(container = container.extension(), "video export started");
        Ok(Self {
            container,
            out_path,
            canvas: cfg.canvas,
            child,
            stdin: Some(stdin),
            scratch: vec![0u8; cfg.canvas.width as usize * cfg.canvas.height as usize * 4],
            frames: 0,
        })
    }

    pub fn container(&self) -> Container {
        self.container
    }

    pub fn out_path(&self) -> &Path {
        &self.out_path
    }
}

impl Recorder for FfmpegRecorder {
    fn mime(&self) -> &str {
        self.container.mime()
    }

    fn push_frame(&mut self, frame: &FrameRGBA) -> ReelResult<()> {
        if frame.width != self.canvas.width || frame.height != self.canvas.height {
            return Err(ReelError::export(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, self.canvas.width, self.canvas.height
            )));
        }
        flatten_to_opaque_rgba8(&mut self.scratch, &frame.data, frame.premultiplied)?;

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(ReelError::export("ffmpeg recorder is already finalized"));
        };
        stdin
            .write_all(&self.scratch)
            .map_err(|e| ReelError::export(format!("failed to write frame to ffmpeg: {e}")))?;
        self.frames += 1;
        Ok(())
    }

    fn finish(mut self: Box<Self>) -> ReelResult<ExportArtifact> {
        drop(self.stdin.take());
        let this = *self;
        let output = this
            .child
            .wait_with_output()
            .map_err(|e| ReelError::export(format!("failed to wait for ffmpeg: {e}")))?;
        if !output.status.success() {
            return Err(ReelError::export(format!(
                "ffmpeg exited with status {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        tracing::info!(frames = this.frames, path = %this.out_path.display(), "video export finished");
        Ok(ExportArtifact {
            path: Some(this.out_path),
            mime: this.container.mime().to_string(),
            frames: this.frames,
        })
    }
}

/// Composite over black into opaque RGBA8, as the encoder expects.
fn flatten_to_opaque_rgba8(dst: &mut [u8], src: &[u8], src_is_premul: bool) -> ReelResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(ReelError::export(
            "frame byte length does not match width*height*4",
        ));
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let a = u16::from(s[3]);
        if a == 255 || src_is_premul {
            d[..3].copy_from_slice(&s[..3]);
        } else {
            for i in 0..3 {
                d[i] = ((u32::from(s[i]) * u32::from(a) + 127) / 255) as u8;
            }
        }
        d[3] = 255;
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/export/ffmpeg.rs"]
mod tests;
