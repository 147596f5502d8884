#![cfg(feature = "host")]
#![allow(missing_docs)]
//! Countdowns across the 32-bit counter wrap.

use core::cell::Cell;

use strip_kit::timer::{Calibration, Countdown, TickSource, TimerService};

struct FakeTicks(Cell<u32>);

impl FakeTicks {
    fn at(now: u32) -> Self {
        Self(Cell::new(now))
    }

    fn set(&self, now: u32) {
        self.0.set(now);
    }
}

impl TickSource for FakeTicks {
    fn now(&self) -> u32 {
        self.0.get()
    }
}

/// One tick per microsecond, so quanta are in ticks.
fn timer(ticks: &FakeTicks) -> TimerService<&FakeTicks> {
    TimerService::new(ticks, Calibration::from_counter_hz(1_000_000).expect("1 MHz"))
}

/// Step the counter one tick at a time and return every tick at which `poll` fired.
fn fire_ticks(
    ticks: &FakeTicks,
    timer: &TimerService<&FakeTicks>,
    countdown: &mut Countdown,
    from: u32,
    steps: u32,
) -> Vec<u32> {
    let mut fired = Vec::new();
    for step in 0..steps {
        let now = from.wrapping_add(step);
        ticks.set(now);
        if timer.poll(countdown) {
            fired.push(now);
        }
    }
    fired
}

#[test]
fn fires_once_after_all_quanta_without_wrap() {
    let ticks = FakeTicks::at(1_000);
    let timer = timer(&ticks);
    let mut countdown = Countdown::new();
    timer.start(&mut countdown, 3, 10);

    // Each quantum elapses when the counter passes stop (start + 10), i.e. 11 ticks.
    let fired = fire_ticks(&ticks, &timer, &mut countdown, 1_000, 200);
    assert_eq!(fired, [1_033]);
    assert!(countdown.is_expired());
}

#[test]
fn fires_once_when_quantum_straddles_the_wrap() {
    let start = u32::MAX - 5;
    let ticks = FakeTicks::at(start);
    let timer = timer(&ticks);
    let mut countdown = Countdown::new();
    timer.start(&mut countdown, 1, 10);
    assert_eq!(countdown.stop_tick(), 4);

    // Still before the wrap: the counter is above stop but not below start.
    ticks.set(u32::MAX);
    assert!(!timer.poll(&mut countdown));
    // Wrapped but not past stop yet.
    ticks.set(4);
    assert!(!timer.poll(&mut countdown));
    ticks.set(5);
    assert!(timer.poll(&mut countdown));
}

#[test]
fn multi_quantum_period_spanning_the_wrap() {
    let start = u32::MAX - 15;
    let ticks = FakeTicks::at(start);
    let timer = timer(&ticks);
    let mut countdown = Countdown::new();
    timer.start(&mut countdown, 4, 10);

    let fired = fire_ticks(&ticks, &timer, &mut countdown, start, 100);
    // 4 quanta of 11 ticks each, 16 of them before the wrap.
    assert_eq!(fired, [start.wrapping_add(44)]);
}

#[test]
fn expired_countdown_stays_quiet_until_refilled() {
    let ticks = FakeTicks::at(0);
    let timer = timer(&ticks);
    let mut countdown = Countdown::new();
    timer.start(&mut countdown, 1, 10);

    assert_eq!(fire_ticks(&ticks, &timer, &mut countdown, 0, 100), [11]);

    // Quanta keep re-arming while expired; refilling resumes from the armed quantum.
    ticks.set(100);
    countdown.set_remaining(2);
    let fired = fire_ticks(&ticks, &timer, &mut countdown, 100, 100);
    assert_eq!(fired.len(), 1);
}

#[test]
fn restarting_overrides_a_running_countdown() {
    let ticks = FakeTicks::at(50);
    let timer = timer(&ticks);
    let mut countdown = Countdown::new();
    timer.start(&mut countdown, 5, 10);
    ticks.set(80);
    timer.start(&mut countdown, 1, 10);
    assert_eq!(countdown.remaining(), 1);
    assert_eq!(fire_ticks(&ticks, &timer, &mut countdown, 80, 20), [91]);
}

#[test]
fn millisecond_countdown_uses_calibration() {
    let ticks = FakeTicks::at(0);
    let timer = TimerService::new(
        &ticks,
        Calibration::from_system_clock(80_000_000, 2).expect("40 ticks per microsecond"),
    );
    let mut countdown = Countdown::new();
    timer.start_ms(&mut countdown, 2);
    assert_eq!(countdown.stop_tick(), 40_000);

    ticks.set(40_001);
    assert!(!timer.poll(&mut countdown));
    ticks.set(80_002);
    assert!(timer.poll(&mut countdown));
}

#[test]
fn quantum_ending_at_counter_max_still_fires() {
    let start = u32::MAX - 10;
    let ticks = FakeTicks::at(start);
    let timer = timer(&ticks);
    let mut countdown = Countdown::new();
    timer.start(&mut countdown, 1, 10);
    assert_eq!(countdown.stop_tick(), u32::MAX);

    // No tick exceeds stop, so the first tick after the wrap ends the quantum.
    let fired = fire_ticks(&ticks, &timer, &mut countdown, start, 1_000);
    assert_eq!(fired, [0]);
}

#[test]
fn late_poll_after_the_wrap_still_fires() {
    let start = u32::MAX - 100;
    let ticks = FakeTicks::at(start);
    let timer = timer(&ticks);
    let mut countdown = Countdown::new();
    timer.start(&mut countdown, 1, 10);
    assert_eq!(countdown.stop_tick(), u32::MAX - 90);

    // The loop stalled across both stop and the wrap.
    ticks.set(5);
    assert!(timer.poll(&mut countdown));
}

#[test]
fn timed_rearm_on_every_tick_survives_the_wrap() {
    let start = u32::MAX - 995;
    let ticks = FakeTicks::at(start);
    let timer = timer(&ticks);
    let mut countdown = Countdown::new();
    timer.start(&mut countdown, 1, 5);

    // Re-arm after every firing, as timed pacing does. The quantum armed at step 990
    // ends on u32::MAX.
    let mut fired = Vec::new();
    let mut reached_max = false;
    for step in 0..3_000_u32 {
        ticks.set(start.wrapping_add(step));
        if timer.poll(&mut countdown) {
            fired.push(step);
            countdown.set_remaining(1);
        }
        reached_max |= countdown.stop_tick() == u32::MAX;
    }
    assert!(reached_max);
    let expected: Vec<u32> = (1..500).map(|k| k * 6).collect();
    assert_eq!(fired, expected);
}
