use std::{path::PathBuf, str::FromStr, time::Duration};

use crate::{
    audio::mixdown::MixdownOptions,
    export::ffmpeg::Container,
    foundation::{
        core::{Canvas, Fps},
        error::{ReelError, ReelResult},
    },
    render::compositor::CompositorOptions,
    timing::resolver::TimingOptions,
};

/// Video export settings.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    pub bitrate_bps: u32,
    /// Containers to try, best first.
    pub containers: Vec<Container>,
    pub overwrite: bool,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            bitrate_bps: 3_000_000,
            containers: vec![Container::Webm, Container::Mp4],
            overwrite: true,
        }
    }
}

/// Engine settings a host loads once at startup.
///
/// Every field has a default, so a partial JSON document (or `{}`) is a valid config.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub canvas: Canvas,
    pub fps: Fps,
    pub timing: TimingOptions,
    /// Allowed gap between audio position and playhead before a hard seek.
    pub drift_tolerance_secs: f64,
    pub motion_cycle_secs: f64,
    pub subtitles: bool,
    pub subtitle_char_budget: usize,
    pub overlay_width_fraction: f64,
    /// Font for placards and subtitles. When unset a system font is searched.
    pub font_path: Option<PathBuf>,
    pub export: ExportSettings,
    pub mix_sample_rate: u32,
    pub mix_tail_secs: f64,
    /// How long offline renders wait for image loads before drawing placeholders.
    pub image_wait_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            canvas: Canvas::default(),
            fps: Fps::default(),
            timing: TimingOptions::default(),
            drift_tolerance_secs: 0.3,
            motion_cycle_secs: 5.0,
            subtitles: true,
            subtitle_char_budget: 60,
            overlay_width_fraction: 0.12,
            font_path: None,
            export: ExportSettings::default(),
            mix_sample_rate: crate::audio::MIX_SAMPLE_RATE,
            mix_tail_secs: 1.0,
            image_wait_ms: 10_000,
        }
    }
}

impl EngineConfig {
    pub fn from_json(json: &str) -> ReelResult<Self> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_file(path: &std::path::Path) -> ReelResult<Self> {
        use anyhow::Context as _;
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config '{}'", path.display()))?;
        Self::from_json(&json)
    }

    /// Apply `REELSYNC_*` environment overrides.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from `lookup`, keyed like the environment variables.
    ///
    /// Values that do not parse are ignored with a warning.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(v) = parsed::<u32>(&get, "REELSYNC_WIDTH").filter(|&n| n > 0) {
            self.canvas.width = v;
        }
        if let Some(v) = parsed::<u32>(&get, "REELSYNC_HEIGHT").filter(|&n| n > 0) {
            self.canvas.height = v;
        }
        if let Some(v) = parsed::<u32>(&get, "REELSYNC_FPS").filter(|&n| n > 0) {
            self.fps = Fps { num: v, den: 1 };
        }
        if let Some(v) = parsed::<f64>(&get, "REELSYNC_DRIFT_TOLERANCE").filter(|v| *v > 0.0) {
            self.drift_tolerance_secs = v;
        }
        if let Some(v) = get("REELSYNC_SUBTITLES") {
            match v.to_ascii_lowercase().as_str() {
                "1" | "true" | "on" | "yes" => self.subtitles = true,
                "0" | "false" | "off" | "no" => self.subtitles = false,
                _ => tracing::warn!(value = %v, "ignoring unparsable REELSYNC_SUBTITLES"),
            }
        }
        if let Some(v) = get("REELSYNC_FONT") {
            self.font_path = Some(PathBuf::from(v));
        }
        if let Some(v) = parsed::<u32>(&get, "REELSYNC_EXPORT_BITRATE").filter(|&n| n > 0) {
            self.export.bitrate_bps = v;
        }
        if let Some(v) = get("REELSYNC_EXPORT_CONTAINER") {
            match v.to_ascii_lowercase().as_str() {
                "webm" => self.export.containers = vec![Container::Webm],
                "mp4" => self.export.containers = vec![Container::Mp4],
                _ => tracing::warn!(value = %v, "ignoring unknown REELSYNC_EXPORT_CONTAINER"),
            }
        }
        if let Some(v) = parsed::<u32>(&get, "REELSYNC_MIX_SAMPLE_RATE").filter(|&n| n > 0) {
            self.mix_sample_rate = v;
        }
        if let Some(v) = parsed::<u64>(&get, "REELSYNC_IMAGE_WAIT_MS") {
            self.image_wait_ms = v;
        }
    }

    pub fn validate(&self) -> ReelResult<()> {
        Fps::new(self.fps.num, self.fps.den)?;
        self.timing.validate()?;
        self.compositor_options().validate()?;
        self.mixdown_options().validate()?;
        if !self.drift_tolerance_secs.is_finite() || self.drift_tolerance_secs <= 0.0 {
            return Err(ReelError::validation(
                "drift_tolerance_secs must be finite and > 0",
            ));
        }
        if self.export.bitrate_bps == 0 {
            return Err(ReelError::validation("export.bitrate_bps must be > 0"));
        }
        if self.export.containers.is_empty() {
            return Err(ReelError::validation("export.containers must not be empty"));
        }
        Ok(())
    }

    pub fn compositor_options(&self) -> CompositorOptions {
        CompositorOptions {
            canvas: self.canvas,
            motion_cycle_secs: self.motion_cycle_secs,
            subtitles: self.subtitles,
            subtitle_char_budget: self.subtitle_char_budget,
            overlay_width_fraction: self.overlay_width_fraction,
        }
    }

    pub fn mixdown_options(&self) -> MixdownOptions {
        MixdownOptions {
            sample_rate: self.mix_sample_rate,
            tail_secs: self.mix_tail_secs,
        }
    }

    pub fn image_wait(&self) -> Duration {
        Duration::from_millis(self.image_wait_ms)
    }

    /// Wall-clock interval between live ticks.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_nanos(
            u64::from(self.fps.den) * 1_000_000_000 / u64::from(self.fps.num.max(1)),
        )
    }
}

fn parsed<T: FromStr>(get: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = get(key)?;
    match raw.parse::<T>() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!(key, value = %raw, "ignoring unparsable override");
            None
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
