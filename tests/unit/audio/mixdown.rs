use super::*;
use crate::{
    assets::fetch::FsMediaFetcher,
    project::model::{AudioKind, SceneAsset},
    timing::resolver::TimingOptions,
};

const RATE: u32 = 100;

fn write_tone(dir: &Path, name: &str, value: f32, frames: usize) -> String {
    let wav = wav::encode_pcm16(&vec![value; frames], RATE, 1);
    std::fs::write(dir.join(name), wav).unwrap();
    name.to_string()
}

fn fixture(dir: &Path) -> (ProjectState, ProjectTimingContext) {
    let mut project = ProjectState {
        scene_assets: vec![SceneAsset::empty(0, "a"), SceneAsset::empty(1, "b")],
        ..ProjectState::default()
    };
    let a = write_tone(dir, "a.wav", 0.5, 100);
    let b = write_tone(dir, "b.wav", 0.5, 100);
    let extra = write_tone(dir, "extra.wav", 0.9, 100);
    let m = write_tone(dir, "m.wav", 0.5, 100);
    project.audio_tracks = vec![
        AudioAsset::new("vo-a", AudioKind::Voiceover, Some(a), 1.0, 50.0),
        AudioAsset::new("vo-b", AudioKind::Voiceover, Some(b), 1.0, 60.0),
        AudioAsset::new("vo-extra", AudioKind::Voiceover, Some(extra), 1.0, 70.0),
        AudioAsset::new("music", AudioKind::Music, Some(m), 1.0, 0.5),
        AudioAsset::new(
            "sfx",
            AudioKind::Sfx,
            Some("missing.wav".to_string()),
            1.0,
            0.0,
        ),
    ];
    let timing = ProjectTimingContext::for_project(&project, &TimingOptions::default());
    (project, timing)
}

fn left(pcm: &AudioPcm, frame: usize) -> f32 {
    pcm.interleaved_f32[frame * usize::from(pcm.channels)]
}

#[test]
fn mixdown_places_tracks_at_effective_starts() {
    let dir = tempfile::tempdir().unwrap();
    let (project, timing) = fixture(dir.path());
    let fetcher = FsMediaFetcher::new(dir.path());
    let opts = MixdownOptions {
        sample_rate: RATE,
        tail_secs: 1.0,
    };

    let bytes = render_mixdown(&project, &timing, &fetcher, &DefaultAudioDecoder, opts).unwrap();
    let pcm = decode::decode_audio(&bytes).unwrap();
    assert_eq!(pcm.channels, 2);
    assert_eq!(pcm.sample_rate, RATE);
    assert_eq!(pcm.frames(), 1_100);

    let close = |a: f32, b: f32| (a - b).abs() < 2e-3;
    // First voice-over only.
    assert!(close(left(&pcm, 25), 0.5));
    // First voice-over plus music ducked to 0.3.
    assert!(close(left(&pcm, 75), 0.65));
    // Second voice-over starts at its scene window (1.0 s), not at its declared start.
    assert!(close(left(&pcm, 125), 0.65));
    assert!(close(left(&pcm, 175), 0.5));
    // The unpaired voice-over and the missing sfx contribute nothing.
    assert!(close(left(&pcm, 250), 0.0));
    assert!(close(left(&pcm, 1_050), 0.0));
}

#[test]
fn manifest_skips_failures_and_unpaired_voiceovers() {
    let dir = tempfile::tempdir().unwrap();
    let (project, timing) = fixture(dir.path());
    let fetcher = FsMediaFetcher::new(dir.path());
    let opts = MixdownOptions {
        sample_rate: RATE,
        tail_secs: 0.0,
    };
    let manifest =
        build_mix_manifest(&project, &timing, &fetcher, &DefaultAudioDecoder, opts).unwrap();

    let ids: Vec<&str> = manifest.segments.iter().map(|s| s.track_id.as_str()).collect();
    assert_eq!(ids, vec!["vo-a", "vo-b", "music"]);
    assert_eq!(manifest.total_samples, 1_000);
    assert_eq!(manifest.segments[1].timeline_start_sample, 100);
    assert_eq!(manifest.segments[2].timeline_start_sample, 50);
    assert!((manifest.segments[2].gain - 0.3).abs() < 1e-6);
}

#[test]
fn invalid_options_are_rejected() {
    let project = ProjectState::default();
    let timing = ProjectTimingContext::for_project(&project, &TimingOptions::default());
    let fetcher = FsMediaFetcher::new(".");
    let opts = MixdownOptions {
        sample_rate: 0,
        tail_secs: 1.0,
    };
    let err = render_mixdown(&project, &timing, &fetcher, &DefaultAudioDecoder, opts).unwrap_err();
    assert!(matches!(err, ReelError::Mixdown(_)));
}

#[test]
fn write_mixdown_file_creates_parents() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("nested/mix.wav");
    write_mixdown_file(b"RIFF", &out).unwrap();
    assert_eq!(std::fs::read(out).unwrap(), b"RIFF");
}
