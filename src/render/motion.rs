//! Camera motion as a pure function of time elapsed within a scene.

use std::f64::consts::TAU;

use crate::{
    foundation::core::{Affine, Canvas, Vec2},
    project::model::MotionKind,
};

/// Zoom gained per second by `zoom-in` (and lost by `zoom-out`).
const ZOOM_PER_SEC: f64 = 0.05;
/// Horizontal/vertical pan speed in pixels per second.
const PAN_PX_PER_SEC: f64 = 10.0;
/// Tilt speed as a fraction of the canvas height per second.
const TILT_PER_SEC: f64 = 0.02;

/// Phase within the motion cycle: `elapsed mod cycle`, always in `[0, cycle)`.
pub fn motion_phase(elapsed_secs: f64, cycle_secs: f64) -> f64 {
    if !elapsed_secs.is_finite() || !cycle_secs.is_finite() || cycle_secs <= 0.0 {
        return 0.0;
    }
    elapsed_secs.rem_euclid(cycle_secs)
}

/// Canvas-space transform applied to a scene's media.
///
/// Depends only on its arguments, so live playback and export see the same frame for the same
/// time.
pub fn motion_transform(
    kind: MotionKind,
    elapsed_secs: f64,
    cycle_secs: f64,
    canvas: Canvas,
) -> Affine {
    let p = motion_phase(elapsed_secs, cycle_secs);
    let center = Vec2::new(canvas.width_f64() / 2.0, canvas.height_f64() / 2.0);
    let about_center = |s: f64| {
        Affine::translate(center) * Affine::scale(s) * Affine::translate(-center)
    };

    match kind {
        MotionKind::None => Affine::IDENTITY,
        MotionKind::ZoomIn => about_center(1.0 + p * ZOOM_PER_SEC),
        MotionKind::ZoomOut => about_center(1.0 + (cycle_secs - p) * ZOOM_PER_SEC),
        MotionKind::PanLeft => Affine::translate((-p * PAN_PX_PER_SEC, 0.0)),
        MotionKind::PanRight => Affine::translate((p * PAN_PX_PER_SEC, 0.0)),
        MotionKind::PanUp => Affine::translate((0.0, -p * PAN_PX_PER_SEC)),
        MotionKind::PanDown => Affine::translate((0.0, p * PAN_PX_PER_SEC)),
        MotionKind::CornerZoom => Affine::scale(1.0 + p * ZOOM_PER_SEC),
        MotionKind::TiltUp => {
            Affine::translate((0.0, -p * TILT_PER_SEC * canvas.height_f64()))
                * about_center(1.0 + TILT_PER_SEC * cycle_secs)
        }
        MotionKind::TiltDown => {
            Affine::translate((0.0, p * TILT_PER_SEC * canvas.height_f64()))
                * about_center(1.0 + TILT_PER_SEC * cycle_secs)
        }
        MotionKind::Shake => {
            let dx = 4.0 * (TAU * 6.0 * p).sin();
            let dy = 3.0 * (TAU * 4.0 * p + 1.0).sin();
            Affine::translate((dx, dy)) * about_center(1.02)
        }
        MotionKind::Pulse => about_center(1.0 + 0.015 * (1.0 - (TAU * p).cos())),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/motion.rs"]
mod tests;
