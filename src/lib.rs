//! reelsync turns independently produced scene assets into one seekable, exportable timeline.
//!
//! Narration durations are the clock: scene windows are derived from measured voice-over lengths,
//! and every consumer (live preview, audio sync, video export, offline mixdown) reads the same
//! [`ProjectTimingContext`]. The usual flow is:
//!
//! - Build or load a [`ProjectState`]
//! - Wire a [`PlaybackSession`] around it and drive it from a frame callback
//! - Export frames through a [`Recorder`], or render the audio with [`render_mixdown`]
#![forbid(unsafe_code)]

mod assets;
mod audio;
mod export;
mod foundation;
mod playback;
mod project;
mod render;
mod timing;

/// Engine configuration loaded by hosts.
pub mod config;
pub mod providers;

pub use crate::foundation::core::{Affine, Canvas, Fps, Point, Rect, Vec2};
pub use crate::foundation::duration::parse_duration_secs;
pub use crate::foundation::error::{ReelError, ReelResult};

pub use crate::project::model::{
    AssetSource, AudioAsset, AudioKind, MediaKind, MotionKind, NormalizedPos, Overlay,
    OverlayKind, ProjectState, SceneAsset, Script, ScriptScene, VolumePolicy,
};
pub use crate::project::registry::DeletedScene;

pub use crate::timing::resolver::{
    ProjectTimingContext, TimelineWindow, TimingOptions, VoicePairing, pair_voice_to_scenes,
    resolve_timings,
};
pub use crate::timing::schedule::{effective_span, effective_start, track_gain};

pub use crate::assets::PreparedImage;
pub use crate::assets::decode::{decode_any_image, decode_image, decode_svg_image};
pub use crate::assets::fetch::{FsMediaFetcher, MediaFetcher, MediaRef};
pub use crate::assets::image_cache::{ImageCache, ImageLookup};
pub use crate::assets::media::{AudioPcm, is_ffmpeg_on_path, is_ffprobe_on_path};

pub use crate::audio::mix::{AudioManifest, AudioSegment, mix_manifest, secs_to_sample};
pub use crate::audio::mixdown::{
    AudioDecoder, DefaultAudioDecoder, MixdownOptions, build_mix_manifest, render_mixdown,
    write_mixdown_file,
};
pub use crate::audio::probe::{DefaultMediaProbe, MediaProbe, measure_duration};
pub use crate::audio::decode::{decode_audio, probe_duration_secs as probe_audio_duration};
pub use crate::audio::wav::{encode_pcm16 as encode_wav_pcm16, wrap_pcm16 as wrap_pcm16_wav};
pub use crate::audio::{MIX_CHANNELS, MIX_SAMPLE_RATE};

pub use crate::render::FrameRGBA;
pub use crate::render::compositor::{
    ActiveContent, CompositorOptions, FrameCompositor, active_content,
};
pub use crate::render::motion::{motion_phase, motion_transform};
pub use crate::render::surface::Surface;
pub use crate::render::text::{TextBrushRgba8, TextRenderer, find_system_font};

pub use crate::playback::playhead::{Playhead, PlayheadState, TickId, TickOutcome};
pub use crate::playback::scheduler::{LiveScheduler, Scheduler, SteppedScheduler};
pub use crate::playback::session::{FrameEvent, PlaybackSession, SessionParts};
pub use crate::playback::sync::{
    AudioBackend, AudioHandle, AudioSynchronizer, SoftwareAudioBackend, SoftwareAudioHandle,
    SoftwareClock, SyncReport,
};

pub use crate::export::ffmpeg::{
    Container, FfmpegRecorder, FfmpegRecorderConfig, negotiate_container,
};
pub use crate::export::pipeline::ExportPipeline;
pub use crate::export::recorder::{CapturedFrames, ExportArtifact, MemoryRecorder, Recorder};

pub use crate::config::{EngineConfig, ExportSettings};
