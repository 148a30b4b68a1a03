//! Reminder scheduling state machine.
//!
//! The scheduler is a wall-clock-based state machine. It owns no timers and
//! spawns no threads - the runtime driver arms and cancels timers from the
//! [`Arming`] directives it returns, and reports elapsed timers back through
//! [`ReminderScheduler::on_timer_elapsed`].
//!
//! ## State transitions
//!
//! ```text
//! Stopped --start() [cold]--------> AwaitingInitial
//! AwaitingInitial --elapsed-------> SteadyInterval
//! SteadyInterval --tick-----------> SteadyInterval
//! any --on_sleep()----------------> Stopped
//! Stopped --on_wake() [enabled]---> AwaitingInitial
//! SteadyInterval --disable--------> Stopped
//! Stopped --enable [warm]---------> SteadyInterval
//! ```
//!
//! A warm re-enable skips the initial delay: that path resumes an existing
//! cadence rather than cold-starting one.
//!
//! The pause window never stops the timer. Suppression is decided at fire
//! time: every tick evaluates the policy, and a tick that lands past the
//! deadline consumes it and fires.

pub mod messages;

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::events::Event;

/// Delay before the first fire decision on a cold start or wake.
pub const INITIAL_DELAY: Duration = Duration::from_secs(10);
/// Steady recurring interval between fire decisions.
pub const CADENCE: Duration = Duration::from_secs(3600);
/// The host menu's fixed suppression window.
pub const PAUSE_WINDOW: Duration = Duration::from_secs(7200);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// No timer armed. Reached by disable, sleep, or never having started.
    Stopped,
    /// One-shot initial-delay timer armed.
    AwaitingInitial,
    /// Recurring cadence timer armed.
    SteadyInterval,
}

/// Timer arming directive for the runtime driver.
///
/// Arming always replaces: the driver must cancel the live timer handle
/// before registering the new one, so at most one timer exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arming {
    /// One-shot timer for [`INITIAL_DELAY`].
    Initial,
    /// Recurring timer at [`CADENCE`].
    Steady,
}

impl Arming {
    pub fn delay(self) -> Duration {
        match self {
            Arming::Initial => INITIAL_DELAY,
            Arming::Steady => CADENCE,
        }
    }
}

/// Outcome of one fire-policy evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireDecision {
    /// The reminder is due. Any pause deadline has been consumed.
    Fire,
    /// Reminders are disabled.
    Disabled,
    /// Inside the pause window; the deadline is untouched.
    Paused,
    /// The timer callback arrived after cancellation; ignored.
    Stale,
}

impl FireDecision {
    pub fn should_fire(self) -> bool {
        matches!(self, FireDecision::Fire)
    }
}

/// Outcome of a timer callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    pub decision: FireDecision,
    /// `Some` when the driver must re-arm (leaving `AwaitingInitial`).
    pub rearm: Option<Arming>,
}

/// The reminder scheduling state machine.
///
/// All state is owned here and mutated only through these methods; time is
/// passed in explicitly wherever policy depends on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderScheduler {
    enabled: bool,
    paused_until: Option<DateTime<Utc>>,
    phase: Phase,
}

impl ReminderScheduler {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            paused_until: None,
            phase: Phase::Stopped,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn paused_until(&self) -> Option<DateTime<Utc>> {
        self.paused_until
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            enabled: self.enabled,
            phase: self.phase,
            paused_until: self.paused_until,
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Begin the initial-delay-then-cadence sequence. Idempotent: does
    /// nothing when disabled or already armed.
    pub fn start(&mut self) -> Option<Arming> {
        if !self.enabled || self.phase != Phase::Stopped {
            return None;
        }
        self.phase = Phase::AwaitingInitial;
        Some(Arming::Initial)
    }

    /// Flip the enabled flag. Enabling resumes straight into the steady
    /// cadence (no initial delay); disabling stops the timer. The caller
    /// persists the flag and cancels/arms per the returned directive.
    pub fn set_enabled(&mut self, value: bool) -> Option<Arming> {
        if value == self.enabled {
            return None;
        }
        self.enabled = value;
        if value {
            self.phase = Phase::SteadyInterval;
            Some(Arming::Steady)
        } else {
            self.phase = Phase::Stopped;
            None
        }
    }

    /// Set the suppression deadline to `now + duration`. The timer keeps
    /// running; suppression is evaluated at fire time. A second pause
    /// overwrites the first (no stacking). Returns the new deadline.
    pub fn pause(&mut self, duration: Duration, now: DateTime<Utc>) -> DateTime<Utc> {
        let until = now + chrono::Duration::milliseconds(duration.as_millis() as i64);
        self.paused_until = Some(until);
        until
    }

    /// Evaluate the fire policy immediately, exactly as a timer tick would.
    pub fn trigger_now(&mut self, now: DateTime<Utc>) -> FireDecision {
        self.evaluate(now)
    }

    /// Host is going to sleep: the timer is cancelled, `enabled` and the
    /// pause deadline are retained.
    pub fn on_sleep(&mut self) {
        self.phase = Phase::Stopped;
    }

    /// Host woke up: restart the sequence from the beginning with a fresh
    /// initial delay, never a resumed countdown.
    pub fn on_wake(&mut self) -> Option<Arming> {
        if !self.enabled {
            return None;
        }
        self.phase = Phase::AwaitingInitial;
        Some(Arming::Initial)
    }

    /// Timer callback entry point. Evaluates the fire policy, and on the
    /// first elapse after a cold start also switches over to the steady
    /// cadence.
    pub fn on_timer_elapsed(&mut self, now: DateTime<Utc>) -> Tick {
        // A callback already queued when the timer was cancelled.
        if self.phase == Phase::Stopped {
            return Tick {
                decision: FireDecision::Stale,
                rearm: None,
            };
        }
        let decision = self.evaluate(now);
        let rearm = if self.phase == Phase::AwaitingInitial {
            self.phase = Phase::SteadyInterval;
            Some(Arming::Steady)
        } else {
            None
        };
        Tick { decision, rearm }
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Fire iff enabled and not inside the pause window. A fire consumes
    /// the deadline; a suppressed or disabled evaluation leaves it alone.
    fn evaluate(&mut self, now: DateTime<Utc>) -> FireDecision {
        if !self.enabled {
            return FireDecision::Disabled;
        }
        if let Some(until) = self.paused_until {
            if now < until {
                return FireDecision::Paused;
            }
        }
        self.paused_until = None;
        FireDecision::Fire
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn cold_start_arms_initial_then_steady() {
        let mut sched = ReminderScheduler::new(true);
        assert_eq!(sched.start(), Some(Arming::Initial));
        assert_eq!(sched.phase(), Phase::AwaitingInitial);

        let tick = sched.on_timer_elapsed(at(10));
        assert_eq!(tick.decision, FireDecision::Fire);
        assert_eq!(tick.rearm, Some(Arming::Steady));
        assert_eq!(sched.phase(), Phase::SteadyInterval);

        let tick = sched.on_timer_elapsed(at(3610));
        assert_eq!(tick.decision, FireDecision::Fire);
        assert_eq!(tick.rearm, None);
    }

    #[test]
    fn start_is_idempotent() {
        let mut sched = ReminderScheduler::new(true);
        assert!(sched.start().is_some());
        assert!(sched.start().is_none());
        assert_eq!(sched.phase(), Phase::AwaitingInitial);
    }

    #[test]
    fn start_when_disabled_stays_stopped() {
        let mut sched = ReminderScheduler::new(false);
        assert!(sched.start().is_none());
        assert_eq!(sched.phase(), Phase::Stopped);
    }

    #[test]
    fn warm_resume_skips_initial_delay() {
        let mut sched = ReminderScheduler::new(false);
        assert_eq!(sched.set_enabled(true), Some(Arming::Steady));
        assert_eq!(sched.phase(), Phase::SteadyInterval);
    }

    #[test]
    fn disable_stops_the_timer() {
        let mut sched = ReminderScheduler::new(true);
        sched.start();
        sched.on_timer_elapsed(at(10));
        assert!(sched.set_enabled(false).is_none());
        assert_eq!(sched.phase(), Phase::Stopped);
    }

    #[test]
    fn same_value_enable_is_a_noop() {
        let mut sched = ReminderScheduler::new(true);
        sched.start();
        assert!(sched.set_enabled(true).is_none());
        assert_eq!(sched.phase(), Phase::AwaitingInitial);
    }

    #[test]
    fn pause_suppresses_until_deadline() {
        let mut sched = ReminderScheduler::new(true);
        sched.start();
        sched.on_timer_elapsed(at(10));

        sched.pause(PAUSE_WINDOW, at(100));
        let tick = sched.on_timer_elapsed(at(3610));
        assert_eq!(tick.decision, FireDecision::Paused);
        assert_eq!(sched.paused_until(), Some(at(7300)));

        // First evaluation at/after the deadline consumes it and fires.
        let tick = sched.on_timer_elapsed(at(7300));
        assert_eq!(tick.decision, FireDecision::Fire);
        assert_eq!(sched.paused_until(), None);
    }

    #[test]
    fn pause_overwrites_previous_deadline() {
        let mut sched = ReminderScheduler::new(true);
        sched.pause(PAUSE_WINDOW, at(0));
        sched.pause(PAUSE_WINDOW, at(100));
        assert_eq!(sched.paused_until(), Some(at(7300)));
    }

    #[test]
    fn trigger_now_when_disabled_never_fires_nor_clears_pause() {
        let mut sched = ReminderScheduler::new(true);
        sched.pause(PAUSE_WINDOW, at(0));
        sched.set_enabled(false);
        assert_eq!(sched.trigger_now(at(9000)), FireDecision::Disabled);
        assert_eq!(sched.paused_until(), Some(at(7200)));
    }

    #[test]
    fn pause_then_trigger_timeline() {
        let mut sched = ReminderScheduler::new(true);
        sched.start();
        sched.pause(PAUSE_WINDOW, at(0));

        assert_eq!(sched.trigger_now(at(100)), FireDecision::Paused);
        assert_eq!(sched.paused_until(), Some(at(7200)));

        assert_eq!(sched.trigger_now(at(7300)), FireDecision::Fire);
        assert_eq!(sched.paused_until(), None);
    }

    #[test]
    fn trigger_now_works_without_an_armed_timer() {
        // A manual trigger checks only the flag and the pause window, not
        // whether a timer is armed.
        let mut sched = ReminderScheduler::new(true);
        assert_eq!(sched.phase(), Phase::Stopped);
        assert_eq!(sched.trigger_now(at(5)), FireDecision::Fire);
    }

    #[test]
    fn sleep_then_wake_reenters_awaiting_initial() {
        let mut sched = ReminderScheduler::new(true);
        sched.start();
        sched.on_timer_elapsed(at(10));
        sched.pause(PAUSE_WINDOW, at(20));

        sched.on_sleep();
        assert_eq!(sched.phase(), Phase::Stopped);
        assert!(sched.enabled());
        assert_eq!(sched.paused_until(), Some(at(7220)));

        assert_eq!(sched.on_wake(), Some(Arming::Initial));
        assert_eq!(sched.phase(), Phase::AwaitingInitial);
    }

    #[test]
    fn wake_when_disabled_stays_stopped() {
        let mut sched = ReminderScheduler::new(false);
        sched.on_sleep();
        assert_eq!(sched.on_wake(), None);
        assert_eq!(sched.phase(), Phase::Stopped);
    }

    #[test]
    fn stale_tick_after_cancel_is_ignored() {
        let mut sched = ReminderScheduler::new(true);
        sched.pause(PAUSE_WINDOW, at(0));
        // Never started: a queued callback from a cancelled timer must not
        // fire or consume the pause deadline.
        let tick = sched.on_timer_elapsed(at(9000));
        assert_eq!(tick.decision, FireDecision::Stale);
        assert_eq!(tick.rearm, None);
        assert_eq!(sched.paused_until(), Some(at(7200)));
    }

    #[derive(Debug, Clone)]
    enum Cmd {
        Start,
        SetEnabled(bool),
        Pause(u64),
        TriggerNow,
        Sleep,
        Wake,
        TimerElapsed,
    }

    fn cmd_strategy() -> impl Strategy<Value = Cmd> {
        prop_oneof![
            Just(Cmd::Start),
            any::<bool>().prop_map(Cmd::SetEnabled),
            (1u64..20_000).prop_map(Cmd::Pause),
            Just(Cmd::TriggerNow),
            Just(Cmd::Sleep),
            Just(Cmd::Wake),
            Just(Cmd::TimerElapsed),
        ]
    }

    proptest! {
        // Disabled implies stopped, for every command sequence: the driver
        // can never be told to keep a timer alive while reminders are off.
        #[test]
        fn disabled_implies_stopped(cmds in prop::collection::vec(cmd_strategy(), 0..40)) {
            let mut sched = ReminderScheduler::new(true);
            let mut clock = 0i64;
            for cmd in cmds {
                clock += 1;
                let now = at(clock);
                let armed = match cmd {
                    Cmd::Start => sched.start(),
                    Cmd::SetEnabled(v) => sched.set_enabled(v),
                    Cmd::Pause(secs) => {
                        sched.pause(Duration::from_secs(secs), now);
                        None
                    }
                    Cmd::TriggerNow => {
                        sched.trigger_now(now);
                        None
                    }
                    Cmd::Sleep => {
                        sched.on_sleep();
                        None
                    }
                    Cmd::Wake => sched.on_wake(),
                    Cmd::TimerElapsed => sched.on_timer_elapsed(now).rearm,
                };
                if !sched.enabled() {
                    prop_assert_eq!(sched.phase(), Phase::Stopped);
                    prop_assert!(armed.is_none());
                }
                if armed.is_some() {
                    prop_assert!(sched.enabled());
                    prop_assert_ne!(sched.phase(), Phase::Stopped);
                }
            }
        }
    }
}
