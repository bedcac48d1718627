//! Collaborator interfaces the engine is handed by its host.
//!
//! The engine never talks to generation services or storage itself. Hosts implement these
//! traits; the helpers here only turn provider output into registry data.

use std::collections::BTreeMap;

use crate::{
    assets::fetch::MediaFetcher,
    audio::probe::{MediaProbe, measure_duration},
    foundation::error::{ReelError, ReelResult},
    project::model::{AssetSource, AudioAsset, AudioKind, MediaKind, ProjectState, Script},
};

/// Turns a topic into a narrated script.
pub trait ScriptProvider {
    fn generate_script(&self, topic: &str) -> ReelResult<Script>;
}

/// Speaks narration text and returns a media URL for the result.
///
/// Providers do not report durations; the engine measures the returned file.
pub trait VoiceProvider {
    fn synthesize(&self, text: &str, voice: &str) -> ReelResult<String>;
}

/// Media found or generated for a scene prompt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VisualMedia {
    pub url: String,
    pub kind: MediaKind,
    pub source: AssetSource,
}

/// Finds or generates the visual for one scene. `Ok(None)` means nothing suitable.
pub trait VisualProvider {
    fn find_visual(&self, prompt: &str) -> ReelResult<Option<VisualMedia>>;
}

/// Loads and saves projects.
pub trait ProjectStore {
    fn load(&self, project_id: &str) -> ReelResult<Option<ProjectState>>;
    fn save(&self, project_id: &str, project: &ProjectState) -> ReelResult<()>;
}

/// Key/value settings (API keys, preferred voices) injected into provider clients.
///
/// Core components never read configuration through this trait.
pub trait Configuration {
    fn get(&self, key: &str) -> Option<String>;

    /// Like [`get`](Self::get), but a missing key is a validation error.
    fn require(&self, key: &str) -> ReelResult<String> {
        self.get(key)
            .ok_or_else(|| ReelError::validation(format!("missing configuration key '{key}'")))
    }
}

/// In-memory [`Configuration`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MapConfiguration {
    values: BTreeMap<String, String>,
}

impl MapConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.values.remove(key)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MapConfiguration {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl Configuration for MapConfiguration {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).filter(|v| !v.is_empty()).cloned()
    }
}

/// Narrate one scene and build its voice-over track with a measured duration.
///
/// The track is placed after every existing voice-over so it pairs with the next scene in
/// order.
#[tracing::instrument(skip(project, voice, fetcher, probe, text))]
pub fn narrate_scene(
    project: &ProjectState,
    voice: &dyn VoiceProvider,
    fetcher: &dyn MediaFetcher,
    probe: &dyn MediaProbe,
    scene_index: u32,
    text: &str,
    voice_name: &str,
) -> ReelResult<AudioAsset> {
    let url = voice.synthesize(text, voice_name)?;
    let duration = measure_duration(fetcher, probe, &url)?;
    if !duration.is_finite() || duration <= 0.0 {
        return Err(ReelError::decode(format!(
            "voice-over '{url}' has no playable duration"
        )));
    }
    let declared_start = project
        .audio_tracks
        .iter()
        .filter(|t| t.kind == AudioKind::Voiceover)
        .map(|t| t.declared_start + t.duration_seconds)
        .fold(0.0_f64, f64::max);

    let mut id = format!("vo-{scene_index}");
    let mut n = 1;
    while project.audio_tracks.iter().any(|t| t.id == id) {
        n += 1;
        id = format!("vo-{scene_index}-{n}");
    }
    let mut track = AudioAsset::new(
        id,
        AudioKind::Voiceover,
        Some(url),
        duration,
        declared_start,
    );
    track.name = format!("Scene {} narration", scene_index + 1);
    Ok(track)
}

/// Ask `visuals` for every scene that has no media yet. Returns how many scenes were filled.
///
/// Scenes the provider has nothing for, or fails on, are left empty and render the placeholder.
pub fn fill_missing_visuals(project: &mut ProjectState, visuals: &dyn VisualProvider) -> usize {
    let mut filled = 0;
    for scene in project
        .scene_assets
        .iter_mut()
        .filter(|s| s.media().is_none())
    {
        match visuals.find_visual(&scene.prompt) {
            Ok(Some(media)) => {
                scene.media_url = Some(media.url);
                scene.media_kind = media.kind;
                scene.source = Some(media.source);
                filled += 1;
            }
            Ok(None) => {
                tracing::debug!(scene = scene.scene_index, "no visual found for scene");
            }
            Err(e) => {
                tracing::warn!(scene = scene.scene_index, error = %e, "visual lookup failed");
            }
        }
    }
    filled
}

#[cfg(test)]
#[path = "../tests/unit/providers.rs"]
mod tests;
