use super::*;

const LISTING_BOTH: &str = "\
Encoders:
 V..... = Video
 ------
 V....D libx264              libx264 H.264 / AVC / MPEG-4 AVC / MPEG-4 part 10 (codec h264)
 V....D libvpx-vp9           libvpx VP9 (codec vp9)
 A....D aac                  AAC (Advanced Audio Coding)
";

const LISTING_H264_ONLY: &str = "\
 V....D libx264              libx264 H.264 / AVC / MPEG-4 AVC / MPEG-4 part 10 (codec h264)
 A....D aac                  AAC (Advanced Audio Coding)
";

fn cfg() -> FfmpegRecorderConfig {
    FfmpegRecorderConfig::new(
        "out/video",
        Canvas {
            width: 1280,
            height: 720,
        },
        Fps::new(30, 1).unwrap(),
    )
}

#[test]
fn negotiation_prefers_webm_when_vp9_is_available() {
    let got = negotiate_container(LISTING_BOTH, &[Container::Webm, Container::Mp4]);
    assert_eq!(got, Some(Container::Webm));
}

#[test]
fn negotiation_falls_back_to_mp4() {
    let got = negotiate_container(LISTING_H264_ONLY, &[Container::Webm, Container::Mp4]);
    assert_eq!(got, Some(Container::Mp4));
}

#[test]
fn negotiation_fails_without_a_matching_encoder() {
    assert_eq!(negotiate_container("A....D aac  AAC\n", &[Container::Webm]), None);
    assert_eq!(negotiate_container(LISTING_BOTH, &[]), None);
}

#[test]
fn container_metadata() {
    assert_eq!(Container::Webm.mime(), "video/webm;codecs=vp9");
    assert_eq!(Container::Mp4.mime(), "video/mp4");
    assert_eq!(Container::Webm.extension(), "webm");
    assert_eq!(Container::Mp4.encoder(), "libx264");
    assert!(
        Container::Mp4
            .codec_args("3000000")
            .windows(2)
            .any(|w| w[0] == "-b:v" && w[1] == "3000000")
    );
}

#[test]
fn config_validation_catches_bad_values() {
    assert!(cfg().validate().is_ok());

    let mut odd = cfg();
    odd.canvas.width = 1281;
    assert!(matches!(odd.validate(), Err(ReelError::ExportSetup(_))));

    let mut zero = cfg();
    zero.canvas.height = 0;
    assert!(zero.validate().is_err());

    let mut no_bitrate = cfg();
    no_bitrate.bitrate_bps = 0;
    assert!(no_bitrate.validate().is_err());

    let mut no_pref = cfg();
    no_pref.preference.clear();
    assert!(no_pref.validate().is_err());
}

#[test]
fn ensure_parent_dir_creates_missing_directories() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("a/b/out.webm");
    ensure_parent_dir(&path).unwrap();
    assert!(dir.path().join("a/b").is_dir());
}

#[test]
fn flatten_premul_over_black_produces_expected_rgb() {
    let src = vec![128u8, 0, 0, 128];
    let mut dst = vec![0u8; 4];
    flatten_to_opaque_rgba8(&mut dst, &src, true).unwrap();
    assert_eq!(dst, vec![128u8, 0, 0, 255]);
}

#[test]
fn flatten_straight_over_black_produces_expected_rgb() {
    let src = vec![255u8, 0, 0, 128];
    let mut dst = vec![0u8; 4];
    flatten_to_opaque_rgba8(&mut dst, &src, false).unwrap();
    assert_eq!(dst, vec![128u8, 0, 0, 255]);
}

#[test]
fn flatten_rejects_length_mismatch() {
    let mut dst = vec![0u8; 8];
    assert!(flatten_to_opaque_rgba8(&mut dst, &[0u8; 4], true).is_err());
}
