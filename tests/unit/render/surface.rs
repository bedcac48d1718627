use super::*;

#[test]
fn new_surface_is_transparent_and_sized() {
    let s = Surface::new(Canvas {
        width: 4,
        height: 3,
    })
    .unwrap();
    assert_eq!((s.width(), s.height()), (4, 3));
    assert_eq!(s.data().len(), 4 * 3 * 4);
    assert!(s.data().iter().all(|&b| b == 0));
}

#[test]
fn oversized_canvas_is_rejected() {
    assert!(
        Surface::new(Canvas {
            width: 70_000,
            height: 10,
        })
        .is_err()
    );
}

#[test]
fn fill_rects_through_a_context() {
    let mut s = Surface::new(Canvas {
        width: 8,
        height: 8,
    })
    .unwrap();

    let mut ctx = s.context();
    ctx.set_paint(solid([0, 0, 0, 255]));
    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, 8.0, 8.0));
    ctx.set_paint(solid([255, 0, 0, 255]));
    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, 4.0, 8.0));
    s.present(&mut ctx);

    let frame = s.snapshot();
    assert!(frame.premultiplied);
    assert_eq!(frame.pixel(1, 1), Some([255, 0, 0, 255]));
    assert_eq!(frame.pixel(6, 6), Some([0, 0, 0, 255]));
    assert_eq!(frame.pixel(8, 0), None);
}

#[test]
fn image_paint_rejects_mismatched_buffers() {
    let bad = PreparedImage {
        width: 2,
        height: 2,
        rgba8_premul: std::sync::Arc::new(vec![0; 3]),
    };
    assert!(image_paint(&bad).is_err());

    let ok = PreparedImage {
        width: 1,
        height: 1,
        rgba8_premul: std::sync::Arc::new(vec![1, 2, 3, 255]),
    };
    assert!(image_paint(&ok).is_ok());
}
