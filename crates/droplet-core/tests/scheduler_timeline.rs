//! Timeline tests for the scheduling state machine.
//!
//! These drive the public API with explicit timestamps, walking the same
//! scenarios a user would produce through the menu: cold start, warm
//! resume, a lunchtime pause, a laptop lid close.

use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use droplet_core::scheduler::{CADENCE, INITIAL_DELAY, PAUSE_WINDOW};
use droplet_core::{Arming, FireDecision, Phase, ReminderScheduler};

fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).unwrap()
}

#[test]
fn constants_match_the_product_cadence() {
    assert_eq!(INITIAL_DELAY, Duration::from_secs(10));
    assert_eq!(CADENCE, Duration::from_secs(3600));
    assert_eq!(PAUSE_WINDOW, Duration::from_secs(7200));
}

#[test]
fn cold_start_decision_timeline() {
    // start() at T=0: decisions at 10s, 3610s, 7210s, hourly thereafter.
    let mut sched = ReminderScheduler::new(true);
    assert_eq!(sched.start(), Some(Arming::Initial));

    let tick = sched.on_timer_elapsed(at(10));
    assert!(tick.decision.should_fire());
    assert_eq!(tick.rearm, Some(Arming::Steady));

    for t in [3610, 7210, 10810] {
        let tick = sched.on_timer_elapsed(at(t));
        assert!(tick.decision.should_fire(), "expected fire at {t}");
        assert_eq!(tick.rearm, None);
    }
}

#[test]
fn warm_resume_decision_timeline() {
    // Toggle off then on at T=0: first decision at exactly T=3600.
    let mut sched = ReminderScheduler::new(true);
    sched.start();
    sched.on_timer_elapsed(at(10));
    sched.set_enabled(false);

    assert_eq!(sched.set_enabled(true), Some(Arming::Steady));
    assert_eq!(sched.phase(), Phase::SteadyInterval);
    let tick = sched.on_timer_elapsed(at(3600));
    assert!(tick.decision.should_fire());
    assert_eq!(tick.rearm, None);
}

#[test]
fn lunch_pause_timeline() {
    // pause(2h) at T=0: every decision with now < 7200 is suppressed and
    // leaves the deadline alone; the first at/after 7200 clears and fires.
    let mut sched = ReminderScheduler::new(true);
    sched.start();
    sched.on_timer_elapsed(at(0));
    sched.pause(PAUSE_WINDOW, at(0));

    for t in [100, 3600, 7199] {
        assert_eq!(sched.trigger_now(at(t)), FireDecision::Paused);
        assert_eq!(sched.paused_until(), Some(at(7200)), "deadline moved at {t}");
    }

    assert_eq!(sched.trigger_now(at(7300)), FireDecision::Fire);
    assert_eq!(sched.paused_until(), None);

    // The next tick is back to normal firing.
    assert!(sched.on_timer_elapsed(at(10800)).decision.should_fire());
}

#[test]
fn lid_close_timeline() {
    // Sleep cancels the timer but keeps the flags; wake restarts from the
    // beginning with the fresh initial delay.
    let mut sched = ReminderScheduler::new(true);
    sched.start();
    sched.on_timer_elapsed(at(10));

    sched.on_sleep();
    assert_eq!(sched.phase(), Phase::Stopped);
    assert!(sched.enabled());

    assert_eq!(sched.on_wake(), Some(Arming::Initial));
    assert_eq!(sched.phase(), Phase::AwaitingInitial);

    let tick = sched.on_timer_elapsed(at(5000));
    assert!(tick.decision.should_fire());
    assert_eq!(tick.rearm, Some(Arming::Steady));
}

#[test]
fn pause_survives_sleep_and_disable() {
    let mut sched = ReminderScheduler::new(true);
    sched.start();
    sched.pause(PAUSE_WINDOW, at(0));

    sched.on_sleep();
    sched.on_wake();
    assert_eq!(sched.paused_until(), Some(at(7200)));

    sched.set_enabled(false);
    sched.set_enabled(true);
    assert_eq!(sched.paused_until(), Some(at(7200)));

    // Still honored after all of that churn.
    assert_eq!(sched.trigger_now(at(3600)), FireDecision::Paused);
    assert_eq!(sched.trigger_now(at(7200)), FireDecision::Fire);
}
