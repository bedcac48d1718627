use super::*;
use crate::{
    project::model::SceneAsset,
    timing::resolver::{TimingOptions, resolve_timings},
};

fn fixture() -> (Vec<AudioAsset>, ProjectTimingContext) {
    let scenes = vec![SceneAsset::empty(0, "a"), SceneAsset::empty(1, "b")];
    let audio = vec![
        AudioAsset::new("vo-0", AudioKind::Voiceover, None, 4.0, 0.0),
        AudioAsset::new("vo-1", AudioKind::Voiceover, None, 6.0, 0.0),
        AudioAsset::new("vo-2", AudioKind::Voiceover, None, 6.0, 99.0),
        AudioAsset::new("mus", AudioKind::Music, None, 30.0, 1.5),
        AudioAsset::new("fx", AudioKind::Sfx, None, 1.0, 4.0),
    ];
    let ctx = resolve_timings(&scenes, &audio, true, false, &TimingOptions::default());
    (audio, ctx)
}

#[test]
fn voiceover_uses_window_start() {
    let (audio, ctx) = fixture();
    // Intro pushes scene 0 to 5s; scene 1 follows at 9s.
    assert_eq!(effective_start(&audio[0], &ctx), Some(5.0));
    assert_eq!(effective_start(&audio[1], &ctx), Some(9.0));
    assert_eq!(effective_span(&audio[1], &ctx), Some((9.0, 15.0)));
}

#[test]
fn unpaired_voiceover_is_not_scheduled() {
    let (audio, ctx) = fixture();
    assert_eq!(effective_start(&audio[2], &ctx), None);
}

#[test]
fn music_and_sfx_use_declared_start() {
    let (audio, ctx) = fixture();
    assert_eq!(effective_start(&audio[3], &ctx), Some(1.5));
    assert_eq!(effective_span(&audio[4], &ctx), Some((4.0, 5.0)));
}

#[test]
fn gains_follow_policy() {
    let policy = VolumePolicy {
        voice: 0.8,
        music: 0.25,
    };
    assert_eq!(track_gain(AudioKind::Voiceover, policy), 0.8);
    assert_eq!(track_gain(AudioKind::Music, policy), 0.25);
    assert_eq!(track_gain(AudioKind::Sfx, policy), 1.0);

    let loud = VolumePolicy {
        voice: 3.0,
        music: -1.0,
    };
    assert_eq!(track_gain(AudioKind::Voiceover, loud), 1.0);
    assert_eq!(track_gain(AudioKind::Music, loud), 0.0);
}
