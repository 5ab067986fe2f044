use super::*;

#[test]
fn fake_clock_advances_both_instant_and_epoch() {
    let clock = FakeClock::new();
    let epoch0 = clock.epoch_ms();
    let now0 = clock.now();
    clock.advance(Duration::from_secs(60));
    assert_eq!(clock.epoch_ms(), epoch0 + 60_000);
    assert!(clock.now() > now0);
}

#[test]
fn fake_clock_epoch_can_be_pinned() {
    let clock = FakeClock::new();
    clock.set_epoch_ms(1_771_000_000_000);
    assert_eq!(clock.epoch_ms(), 1_771_000_000_000);
}

#[test]
fn system_clock_epoch_is_plausible() {
    let clock = SystemClock;
    // Some time after 2020-01-01.
    assert!(clock.epoch_ms() > 1_577_836_800_000);
}
