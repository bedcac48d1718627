use super::*;

fn fps30() -> Fps {
    Fps::new(30, 1).unwrap()
}

fn run_to_end(p: &mut Playhead, mut id: TickId) -> Vec<f64> {
    let mut times = Vec::new();
    loop {
        match p.tick(id) {
            TickOutcome::Advanced { time, next } => {
                times.push(time);
                id = next;
            }
            TickOutcome::Finished { time } => {
                times.push(time);
                return times;
            }
            TickOutcome::Stale => panic!("unexpected stale tick"),
        }
    }
}

#[test]
fn ticks_are_one_frame_apart_and_end_at_total() {
    let mut p = Playhead::new(fps30(), 10.0).unwrap();
    let id = p.play().unwrap();
    let times = run_to_end(&mut p, id);

    assert_eq!(times.len(), 300);
    assert_eq!(*times.last().unwrap(), 10.0);
    for pair in times.windows(2) {
        assert!(pair[1] > pair[0]);
        assert!((pair[1] - pair[0] - 1.0 / 30.0).abs() < 1e-9);
    }
    assert_eq!(p.state(), PlayheadState::Idle);
    assert_eq!(p.time(), 10.0);
}

#[test]
fn play_while_running_is_a_noop() {
    let mut p = Playhead::new(fps30(), 10.0).unwrap();
    let id = p.play().unwrap();
    assert!(p.play().is_none());
    assert_eq!(p.pending_tick(), Some(id));
}

#[test]
fn pause_cancels_the_pending_tick() {
    let mut p = Playhead::new(fps30(), 10.0).unwrap();
    let id = p.play().unwrap();
    p.pause();
    assert_eq!(p.tick(id), TickOutcome::Stale);
    assert_eq!(p.time(), 0.0);
}

#[test]
fn seek_while_running_restarts_the_chain() {
    let mut p = Playhead::new(fps30(), 10.0).unwrap();
    let old = p.play().unwrap();
    let new = p.seek(9.5).unwrap();
    assert_ne!(old, new);
    assert_eq!(p.tick(old), TickOutcome::Stale);

    match p.tick(new) {
        TickOutcome::Advanced { time, .. } => assert!((time - (9.5 + 1.0 / 30.0)).abs() < 1e-12),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn seek_clamps_and_requests_redraw_when_idle() {
    let mut p = Playhead::new(fps30(), 10.0).unwrap();
    assert!(p.take_redraw());
    assert!(!p.take_redraw());

    assert!(p.seek(42.0).is_none());
    assert_eq!(p.time(), 10.0);
    assert!(p.take_redraw());

    p.seek(-1.0);
    assert_eq!(p.time(), 0.0);
    p.seek(f64::NAN);
    assert_eq!(p.time(), 0.0);
}

#[test]
fn shrinking_total_clamps_time() {
    let mut p = Playhead::new(fps30(), 20.0).unwrap();
    p.seek(15.0);
    p.set_total(12.0);
    assert_eq!(p.time(), 12.0);
    assert_eq!(p.total(), 12.0);
}

#[test]
fn invalid_construction_is_rejected() {
    assert!(Playhead::new(Fps { num: 0, den: 1 }, 10.0).is_err());
    assert!(Playhead::new(fps30(), f64::INFINITY).is_err());
}
