use super::*;
use crate::foundation::core::Point;

const CANVAS: Canvas = Canvas {
    width: 1280,
    height: 720,
};

fn approx_pt(a: Point, b: Point) -> bool {
    (a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9
}

#[test]
fn phase_wraps_at_cycle() {
    assert!((motion_phase(7.5, 5.0) - 2.5).abs() < 1e-12);
    assert_eq!(motion_phase(5.0, 5.0), 0.0);
    assert_eq!(motion_phase(-1.0, 5.0), 4.0);
    assert_eq!(motion_phase(3.0, 0.0), 0.0);
    assert_eq!(motion_phase(f64::NAN, 5.0), 0.0);
}

#[test]
fn zoom_in_scales_about_center() {
    let a = motion_transform(MotionKind::ZoomIn, 2.0, 5.0, CANVAS);
    let center = Point::new(640.0, 360.0);
    assert!(approx_pt(a * center, center));
    // 1 + 2 * 0.05 = 1.1
    assert!(approx_pt(a * Point::new(0.0, 0.0), Point::new(-64.0, -36.0)));
}

#[test]
fn pan_right_moves_ten_px_per_second() {
    let a = motion_transform(MotionKind::PanRight, 3.0, 5.0, CANVAS);
    assert!(approx_pt(a * Point::new(0.0, 0.0), Point::new(30.0, 0.0)));
    // Next cycle starts over.
    let b = motion_transform(MotionKind::PanRight, 8.0, 5.0, CANVAS);
    assert!(approx_pt(b * Point::new(0.0, 0.0), Point::new(30.0, 0.0)));
}

#[test]
fn none_is_identity_and_every_kind_is_deterministic() {
    assert_eq!(
        motion_transform(MotionKind::None, 1.234, 5.0, CANVAS),
        Affine::IDENTITY
    );
    for kind in [
        MotionKind::ZoomIn,
        MotionKind::ZoomOut,
        MotionKind::PanLeft,
        MotionKind::PanRight,
        MotionKind::PanUp,
        MotionKind::PanDown,
        MotionKind::CornerZoom,
        MotionKind::TiltUp,
        MotionKind::TiltDown,
        MotionKind::Shake,
        MotionKind::Pulse,
    ] {
        let a = motion_transform(kind, 2.7, 5.0, CANVAS);
        let b = motion_transform(kind, 2.7, 5.0, CANVAS);
        assert_eq!(a, b, "{kind:?}");
        assert!(a.as_coeffs().iter().all(|c| c.is_finite()));
    }
}

#[test]
fn zoom_out_ends_at_identity_scale() {
    let near_end = motion_transform(MotionKind::ZoomOut, 4.999_999, 5.0, CANVAS);
    let c = near_end.as_coeffs();
    assert!((c[0] - 1.0).abs() < 1e-6);
}
