use super::*;
use crate::project::model::{AudioKind, NormalizedPos, OverlayKind, ScriptScene};

fn script(n: usize) -> Script {
    Script {
        title: "t".to_string(),
        hook: "h".to_string(),
        scenes: (0..n)
            .map(|i| ScriptScene {
                narration: format!("narration {i}"),
                visual_cue: format!("cue {i}"),
                suggested_motion: if i == 1 {
                    Some(MotionKind::PanLeft)
                } else {
                    None
                },
                sfx_cue: None,
            })
            .collect(),
        ..Script::default()
    }
}

fn vo(id: &str, start: f64) -> AudioAsset {
    AudioAsset::new(id, AudioKind::Voiceover, Some(format!("{id}.wav")), 2.0, start)
}

#[test]
fn from_script_creates_empty_slots() {
    let p = ProjectState::from_script(script(3));
    assert_eq!(p.scene_assets.len(), 3);
    assert!(p.scene_assets.iter().all(|s| s.media_url.is_none()));
    assert_eq!(p.scene_assets[1].motion, MotionKind::PanLeft);
    assert_eq!(p.scene_assets[2].prompt, "cue 2");
    p.validate().unwrap();
}

#[test]
fn delete_scene_removes_paired_voiceover_and_renumbers() {
    let mut p = ProjectState::from_script(script(3));
    p.audio_tracks = vec![
        vo("scene-10", 4.0),
        vo("scene-1", 2.0),
        vo("scene-0", 0.0),
        AudioAsset::new("music", AudioKind::Music, None, 30.0, 0.0),
    ];

    // Scene 1 pairs with the second voice-over by declared start ("scene-1"), not by an id
    // substring match (which would also hit "scene-10").
    let deleted = p.delete_scene(1).unwrap();
    assert_eq!(deleted.voiceover.unwrap().id, "scene-1");
    assert_eq!(p.scene_assets.len(), 2);
    assert_eq!(p.scene_assets[1].scene_index, 1);
    assert_eq!(p.scene_assets[1].prompt, "cue 2");
    assert_eq!(p.script.as_ref().unwrap().scenes.len(), 2);
    assert_eq!(
        p.audio_tracks.iter().map(|t| t.id.as_str()).collect::<Vec<_>>(),
        vec!["scene-10", "scene-0", "music"]
    );
    p.validate().unwrap();
}

#[test]
fn delete_scene_without_voiceover() {
    let mut p = ProjectState::from_script(script(2));
    let deleted = p.delete_scene(0).unwrap();
    assert!(deleted.voiceover.is_none());
    assert!(p.delete_scene(5).is_err());
}

#[test]
fn validate_rejects_duplicates_and_bad_ranges() {
    let mut p = ProjectState::from_script(script(1));
    p.audio_tracks = vec![vo("a", 0.0), vo("a", 1.0)];
    assert!(p.validate().is_err());

    let mut p = ProjectState::from_script(script(1));
    p.scene_assets[0].scene_index = 4;
    assert!(p.validate().is_err());

    let mut p = ProjectState::from_script(script(1));
    p.music_volume = 1.5;
    assert!(p.validate().is_err());

    let mut p = ProjectState::default();
    p.overlays.push(Overlay {
        id: "o".to_string(),
        kind: OverlayKind::Like,
        media_url: "like.png".to_string(),
        start_time: 1.0,
        duration_seconds: 2.0,
        position: NormalizedPos { x: 120.0, y: 5.0 },
    });
    assert!(p.validate().is_err());
}

#[test]
fn media_and_motion_mutations() {
    let mut p = ProjectState::from_script(script(2));
    p.set_scene_media(0, "img/0.png", MediaKind::Image, Some(AssetSource::Pexels))
        .unwrap();
    assert_eq!(p.scene_assets[0].media(), Some("img/0.png"));
    p.set_scene_motion(0, MotionKind::Shake).unwrap();
    assert_eq!(p.scene_assets[0].motion, MotionKind::Shake);
    p.clear_scene_media(0).unwrap();
    assert_eq!(p.scene_assets[0].media(), None);
    assert!(p.set_scene_motion(9, MotionKind::Pulse).is_err());
}

#[test]
fn suggested_motion_fills_only_static_scenes() {
    let mut p = ProjectState::from_script(script(3));
    p.scene_assets[1].motion = MotionKind::None;
    p.scene_assets[0].motion = MotionKind::ZoomIn;
    assert_eq!(p.apply_suggested_motion(), 1);
    assert_eq!(p.scene_assets[1].motion, MotionKind::PanLeft);
    assert_eq!(p.scene_assets[0].motion, MotionKind::ZoomIn);
}

#[test]
fn audio_and_overlay_add_remove() {
    let mut p = ProjectState::default();
    p.add_audio_track(vo("a", 0.0)).unwrap();
    assert!(p.add_audio_track(vo("a", 1.0)).is_err());
    assert!(
        p.add_audio_track(AudioAsset::new("bad", AudioKind::Sfx, None, -1.0, 0.0))
            .is_err()
    );
    assert_eq!(p.remove_audio_track("a").map(|t| t.id), Some("a".to_string()));
    assert!(p.remove_audio_track("a").is_none());

    let o = Overlay {
        id: "sub".to_string(),
        kind: OverlayKind::Subscribe,
        media_url: "sub.png".to_string(),
        start_time: 0.0,
        duration_seconds: 3.0,
        position: NormalizedPos { x: 80.0, y: 80.0 },
    };
    p.add_overlay(o.clone()).unwrap();
    assert!(p.add_overlay(o).is_err());
    assert!(p.remove_overlay("sub").is_some());
}

#[test]
fn persisted_json_with_string_durations_loads() {
    let json = r#"{
        "sceneAssets": [
            {"sceneIndex": 0, "prompt": "city", "imageUrl": "a.png", "type": "image", "source": "gemini", "motion": "zoom-in"},
            {"sceneIndex": 1, "prompt": "sea", "type": "video", "motion": "corner-zoom"}
        ],
        "audioTracks": [
            {"id": "vo-1", "type": "voiceover", "name": "Scene 1", "duration": "4.25", "url": "vo1.wav", "startTime": 0},
            {"id": "sfx-1", "type": "sfx", "name": "Whoosh", "duration": "0:01", "url": "w.mp3"},
            {"id": "mus", "type": "music", "name": "Bed", "duration": 6.5, "startTime": "1.5"}
        ],
        "overlays": [],
        "intro": null,
        "voiceVolume": 1.0,
        "musicVolume": 0.3,
        "topic": "ignored by the engine"
    }"#;
    let p = ProjectState::from_json(json).unwrap();
    assert_eq!(p.scene_assets[0].source, Some(AssetSource::Generated));
    assert_eq!(p.scene_assets[0].motion, MotionKind::ZoomIn);
    assert_eq!(p.scene_assets[1].media_kind, MediaKind::Video);
    assert_eq!(p.audio_tracks[0].duration_seconds, 4.25);
    assert_eq!(p.audio_tracks[1].duration_seconds, 1.0);
    assert_eq!(p.audio_tracks[1].declared_start, 0.0);
    assert_eq!(p.audio_tracks[2].declared_start, 1.5);
    assert!(!p.has_intro());

    let back = ProjectState::from_json(&p.to_json_pretty().unwrap()).unwrap();
    assert_eq!(back, p);
}
