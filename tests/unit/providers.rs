use std::{cell::RefCell, collections::HashMap};

use super::*;
use crate::{
    audio::{probe::DefaultMediaProbe, wav},
    project::model::SceneAsset,
};

struct MapFetcher(HashMap<String, Vec<u8>>);

impl MediaFetcher for MapFetcher {
    fn fetch(&self, url: &str) -> ReelResult<Vec<u8>> {
        self.0
            .get(url)
            .cloned()
            .ok_or_else(|| ReelError::missing_media(url.to_string()))
    }
}

struct FixedVoice(&'static str);

impl VoiceProvider for FixedVoice {
    fn synthesize(&self, _text: &str, _voice: &str) -> ReelResult<String> {
        Ok(self.0.to_string())
    }
}

struct ListVisuals(RefCell<Vec<ReelResult<Option<VisualMedia>>>>);

impl VisualProvider for ListVisuals {
    fn find_visual(&self, _prompt: &str) -> ReelResult<Option<VisualMedia>> {
        self.0.borrow_mut().remove(0)
    }
}

fn silence_wav(secs: f64) -> Vec<u8> {
    let frames = (secs * 1000.0) as usize;
    wav::encode_pcm16(&vec![0.0; frames * 2], 1000, 2)
}

#[test]
fn map_configuration_lookups() {
    let mut cfg = MapConfiguration::new();
    cfg.set("voice", "Kore").set("empty", "");
    assert_eq!(cfg.get("voice").as_deref(), Some("Kore"));
    assert_eq!(cfg.get("empty"), None);
    assert!(matches!(cfg.require("api_key"), Err(ReelError::Validation(_))));
    assert_eq!(cfg.remove("voice").as_deref(), Some("Kore"));

    let collected: MapConfiguration = [("a", "1"), ("b", "2")].into_iter().collect();
    assert_eq!(collected.require("b").unwrap(), "2");
}

#[test]
fn narrated_track_uses_measured_duration_and_follows_existing_voiceovers() {
    let mut project = ProjectState::default();
    project.audio_tracks.push(AudioAsset::new(
        "vo-0",
        AudioKind::Voiceover,
        Some("old.wav".into()),
        4.0,
        0.0,
    ));
    let fetcher = MapFetcher(HashMap::from([("new.wav".to_string(), silence_wav(2.5))]));

    let track = narrate_scene(
        &project,
        &FixedVoice("new.wav"),
        &fetcher,
        &DefaultMediaProbe,
        1,
        "hello",
        "Kore",
    )
    .unwrap();
    assert_eq!(track.id, "vo-1");
    assert_eq!(track.kind, AudioKind::Voiceover);
    assert!((track.duration_seconds - 2.5).abs() < 1e-9);
    assert_eq!(track.declared_start, 4.0);
    assert_eq!(track.media(), Some("new.wav"));
}

#[test]
fn narrated_track_ids_stay_unique() {
    let mut project = ProjectState::default();
    project.audio_tracks.push(AudioAsset::new(
        "vo-0",
        AudioKind::Voiceover,
        None,
        1.0,
        0.0,
    ));
    let fetcher = MapFetcher(HashMap::from([("x.wav".to_string(), silence_wav(1.0))]));
    let track = narrate_scene(
        &project,
        &FixedVoice("x.wav"),
        &fetcher,
        &DefaultMediaProbe,
        0,
        "again",
        "Kore",
    )
    .unwrap();
    assert_eq!(track.id, "vo-0-2");
}

#[test]
fn narration_with_missing_media_fails() {
    let fetcher = MapFetcher(HashMap::new());
    let err = narrate_scene(
        &ProjectState::default(),
        &FixedVoice("gone.wav"),
        &fetcher,
        &DefaultMediaProbe,
        0,
        "x",
        "Kore",
    )
    .unwrap_err();
    assert!(err.is_per_asset());
}

#[test]
fn fill_missing_visuals_skips_filled_and_failed_scenes() {
    let mut filled_scene = SceneAsset::empty(0, "kept");
    filled_scene.media_url = Some("kept.png".into());
    let mut project = ProjectState {
        scene_assets: vec![
            filled_scene,
            SceneAsset::empty(1, "found"),
            SceneAsset::empty(2, "nothing"),
            SceneAsset::empty(3, "error"),
        ],
        ..ProjectState::default()
    };
    let visuals = ListVisuals(RefCell::new(vec![
        Ok(Some(VisualMedia {
            url: "clip.mp4".into(),
            kind: MediaKind::Video,
            source: AssetSource::Pexels,
        })),
        Ok(None),
        Err(ReelError::missing_media("offline")),
    ]));

    assert_eq!(fill_missing_visuals(&mut project, &visuals), 1);
    assert_eq!(project.scene_assets[0].media(), Some("kept.png"));
    assert_eq!(project.scene_assets[1].media(), Some("clip.mp4"));
    assert_eq!(project.scene_assets[1].media_kind, MediaKind::Video);
    assert_eq!(project.scene_assets[1].source, Some(AssetSource::Pexels));
    assert_eq!(project.scene_assets[2].media(), None);
    assert_eq!(project.scene_assets[3].media(), None);
}
