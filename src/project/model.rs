use crate::foundation::duration::{de_opt_seconds, de_seconds};

/// Visual media type of a scene; selects the render strategy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// Still image, drawn with the scene's motion effect.
    #[default]
    Image,
    /// Video clip. The compositor shows the placeholder frame for it.
    Video,
}

/// Where a scene's media came from. Only informs regeneration, never timing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum AssetSource {
    /// Produced by an image/video generation provider.
    #[serde(rename = "generated", alias = "gemini")]
    Generated,
    /// Found through a general web search.
    #[serde(rename = "web_search", alias = "google_search")]
    WebSearch,
    /// Pexels stock search.
    #[serde(rename = "pexels")]
    Pexels,
    /// Pixabay stock search.
    #[serde(rename = "pixabay")]
    Pixabay,
}

/// Per-scene motion effect. Rendering evaluates it as a pure function of time-in-scene.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MotionKind {
    /// Static frame.
    #[default]
    None,
    /// Slow push in.
    ZoomIn,
    /// Slow pull out.
    ZoomOut,
    /// Drift toward the left.
    PanLeft,
    /// Drift toward the right.
    PanRight,
    /// Drift upward.
    PanUp,
    /// Drift downward.
    PanDown,
    /// Push in toward the top-left corner.
    CornerZoom,
    /// Camera tilts up (content moves down).
    TiltUp,
    /// Camera tilts down (content moves up).
    TiltDown,
    /// Small deterministic jitter.
    Shake,
    /// Periodic breathing scale.
    Pulse,
}

/// One narrative scene's visual.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneAsset {
    /// Position in the narrative. Matches the scene's array index.
    pub scene_index: u32,
    /// Free text used to (re)generate the visual.
    #[serde(default)]
    pub prompt: String,
    /// Image or video reference; `None` until a provider call succeeds.
    #[serde(default, alias = "imageUrl")]
    pub media_url: Option<String>,
    /// Render strategy selector.
    #[serde(default, alias = "type")]
    pub media_kind: MediaKind,
    /// Provenance tag.
    #[serde(default)]
    pub source: Option<AssetSource>,
    /// Motion effect applied while the scene is on screen.
    #[serde(default)]
    pub motion: MotionKind,
}

impl SceneAsset {
    /// Empty scene slot, as created when a script is first loaded.
    pub fn empty(scene_index: u32, prompt: impl Into<String>) -> Self {
        Self {
            scene_index,
            prompt: prompt.into(),
            media_url: None,
            media_kind: MediaKind::Image,
            source: None,
            motion: MotionKind::None,
        }
    }

    /// Media reference when it is present and non-blank.
    pub fn media(&self) -> Option<&str> {
        self.media_url.as_deref().filter(|u| !u.trim().is_empty())
    }
}

/// Audio track role.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioKind {
    /// Narration for one scene. Its start is resolved from the timeline.
    Voiceover,
    /// Background music. Ducked by the project's music volume.
    Music,
    /// Sound effect, played at full volume.
    Sfx,
}

/// One audio clip placed on the timeline.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioAsset {
    /// Stable identity; keys the playback handle pool.
    pub id: String,
    /// Track role.
    #[serde(alias = "type")]
    pub kind: AudioKind,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Playable audio reference.
    #[serde(default, alias = "url")]
    pub media_url: Option<String>,
    /// Measured clip length in seconds.
    #[serde(alias = "duration", deserialize_with = "de_seconds")]
    pub duration_seconds: f64,
    /// Start as originally produced. Authoritative for music/sfx only.
    #[serde(default, alias = "startTime", deserialize_with = "de_opt_seconds")]
    pub declared_start: f64,
}

impl AudioAsset {
    /// Convenience constructor used by hosts and tests.
    pub fn new(
        id: impl Into<String>,
        kind: AudioKind,
        media_url: Option<String>,
        duration_seconds: f64,
        declared_start: f64,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            name: String::new(),
            media_url,
            duration_seconds,
            declared_start,
        }
    }

    /// Media reference when it is present and non-blank.
    pub fn media(&self) -> Option<&str> {
        self.media_url.as_deref().filter(|u| !u.trim().is_empty())
    }
}

/// Decoration kind for overlays.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlayKind {
    /// "Subscribe" sticker.
    Subscribe,
    /// "Like" sticker.
    Like,
    /// Notification bell.
    Notification,
    /// Caption marker.
    Text,
}

/// Position in percent of the canvas, 0..=100 on both axes.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct NormalizedPos {
    /// Horizontal, 0 = left edge.
    pub x: f64,
    /// Vertical, 0 = top edge.
    pub y: f64,
}

/// A transient sticker/icon drawn over the scene for a time span.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Overlay {
    /// Unique id.
    pub id: String,
    /// Decoration kind.
    #[serde(alias = "type")]
    pub kind: OverlayKind,
    /// Image reference.
    #[serde(alias = "url")]
    pub media_url: String,
    /// Absolute timeline start in seconds.
    #[serde(deserialize_with = "de_seconds")]
    pub start_time: f64,
    /// Visible span in seconds.
    #[serde(alias = "duration", deserialize_with = "de_seconds")]
    pub duration_seconds: f64,
    /// Center position.
    pub position: NormalizedPos,
}

impl Overlay {
    /// Half-open `[start, start + duration)` containment.
    pub fn is_active_at(&self, time: f64) -> bool {
        self.start_time <= time && time < self.start_time + self.duration_seconds
    }
}

/// One scene as returned by the script provider.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScriptScene {
    /// Spoken text; the subtitle source.
    pub narration: String,
    /// Prompt for the visual.
    #[serde(alias = "visualPrompt")]
    pub visual_cue: String,
    /// Motion the script author suggests.
    pub suggested_motion: Option<MotionKind>,
    /// Named sound effect to place at the scene start.
    pub sfx_cue: Option<String>,
}

/// Script metadata plus ordered scenes.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Script {
    pub title: String,
    pub hook: String,
    pub scenes: Vec<ScriptScene>,
    pub selected_music_track_id: Option<String>,
    pub music_mood: Option<String>,
}

impl Script {
    /// Narration for the scene at `scene_index`, if any.
    pub fn narration(&self, scene_index: u32) -> Option<&str> {
        self.scenes
            .get(scene_index as usize)
            .map(|s| s.narration.as_str())
            .filter(|s| !s.trim().is_empty())
    }
}

/// Gains applied per track kind, shared by live sync and the offline mixdown.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VolumePolicy {
    /// Narration gain.
    pub voice: f32,
    /// Background music gain (the duck level).
    pub music: f32,
}

impl Default for VolumePolicy {
    fn default() -> Self {
        Self {
            voice: DEFAULT_VOICE_VOLUME as f32,
            music: DEFAULT_MUSIC_VOLUME as f32,
        }
    }
}

pub(crate) const DEFAULT_VOICE_VOLUME: f64 = 1.0;
pub(crate) const DEFAULT_MUSIC_VOLUME: f64 = 0.3;

fn default_voice_volume() -> f64 {
    DEFAULT_VOICE_VOLUME
}

fn default_music_volume() -> f64 {
    DEFAULT_MUSIC_VOLUME
}

/// The single writable project store read by every engine component.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectState {
    #[serde(default)]
    pub scene_assets: Vec<SceneAsset>,
    #[serde(default)]
    pub audio_tracks: Vec<AudioAsset>,
    #[serde(default)]
    pub overlays: Vec<Overlay>,
    #[serde(default)]
    pub script: Option<Script>,
    /// Intro reference; the intro placard is enabled when set.
    #[serde(default)]
    pub intro: Option<String>,
    /// Outro reference; the outro placard is enabled when set.
    #[serde(default)]
    pub outro: Option<String>,
    #[serde(default = "default_voice_volume")]
    pub voice_volume: f64,
    #[serde(default = "default_music_volume")]
    pub music_volume: f64,
}

impl Default for ProjectState {
    fn default() -> Self {
        Self {
            scene_assets: Vec::new(),
            audio_tracks: Vec::new(),
            overlays: Vec::new(),
            script: None,
            intro: None,
            outro: None,
            voice_volume: DEFAULT_VOICE_VOLUME,
            music_volume: DEFAULT_MUSIC_VOLUME,
        }
    }
}

impl ProjectState {
    /// Whether the intro placard occupies the head of the timeline.
    pub fn has_intro(&self) -> bool {
        self.intro.is_some()
    }

    /// Whether the outro placard occupies the tail of the timeline.
    pub fn has_outro(&self) -> bool {
        self.outro.is_some()
    }

    /// Current per-kind gains, clamped to 0..=1.
    pub fn volume_policy(&self) -> VolumePolicy {
        VolumePolicy {
            voice: self.voice_volume.clamp(0.0, 1.0) as f32,
            music: self.music_volume.clamp(0.0, 1.0) as f32,
        }
    }

    /// Parse a persisted project.
    pub fn from_json(json: &str) -> crate::ReelResult<Self> {
        let state: Self = serde_json::from_str(json)?;
        state.validate()?;
        Ok(state)
    }

    /// Serialize for the persistence layer.
    pub fn to_json_pretty(&self) -> crate::ReelResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
