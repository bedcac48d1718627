use super::*;

#[test]
fn live_scheduler_waits_one_interval() {
    let t0 = Instant::now();
    let ms = Duration::from_millis;
    let mut s = LiveScheduler::new(ms(33));
    s.arm(t0);
    assert!(!s.due(t0));
    assert!(!s.due(t0 + ms(20)));
    assert!(s.due(t0 + ms(33)));
    // Consumed: the next one is another interval away.
    assert!(!s.due(t0 + ms(40)));
    assert!(s.due(t0 + ms(66)));
}

#[test]
fn live_scheduler_drops_backlog() {
    let t0 = Instant::now();
    let ms = Duration::from_millis;
    let mut s = LiveScheduler::new(ms(10));
    s.arm(t0);
    assert!(s.due(t0 + ms(1_000)));
    // Only one catch-up tick, then paced again from "now".
    assert!(!s.due(t0 + ms(1_001)));
    assert!(s.due(t0 + ms(1_010)));
}

#[test]
fn unarmed_live_scheduler_arms_on_first_poll() {
    let t0 = Instant::now();
    let mut s = LiveScheduler::new(Duration::from_millis(5));
    assert!(!s.due(t0));
    assert!(s.due(t0 + Duration::from_millis(5)));
}

#[test]
fn stepped_scheduler_always_fires() {
    let mut s = SteppedScheduler;
    let now = Instant::now();
    s.arm(now);
    assert!(s.due(now));
    assert!(s.due(now));
}
