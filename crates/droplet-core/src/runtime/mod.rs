//! Single-threaded event loop driving the scheduler and notifier.
//!
//! All mutable state (scheduler, notifier, surface, indicator, RNG) is
//! confined to one loop task on a current-thread runtime, so no locks are
//! needed. Timer callbacks are spawned sleeper tasks that only sleep and
//! send a message back into the loop - they never touch state. Arming
//! aborts the previous sleeper's handle synchronously before spawning the
//! next, so no two callbacks for the same logical timer are ever
//! concurrently pending; a callback that was already queued when its timer
//! was cancelled is recognized as stale and dropped by the state machines.
//!
//! Cross-thread callers (a stdin pump, an OS sleep/wake watcher) marshal
//! their signals onto the loop through [`LoopHandle`].

use chrono::{DateTime, Utc};
use rand::RngCore;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::AbortHandle;
use tokio::time;

use crate::events::Event;
use crate::notifier::{NotificationRequest, SurfaceFactory, TransientNotifier, SHOW_DURATION};
use crate::scheduler::{messages, Arming, FireDecision, ReminderScheduler};

/// How long the status indicator stays lit after a fire.
pub const BLINK_HOLD: Duration = Duration::from_secs(2);

const CHANNEL_CAPACITY: usize = 64;

/// Inbound host signals: menu actions, power transitions, shutdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostSignal {
    /// Flip the enabled flag.
    Toggle,
    SetEnabled(bool),
    /// Suppress fires for the given window.
    Pause(Duration),
    /// Evaluate the fire policy right now.
    TriggerNow,
    /// Host is about to sleep.
    Sleep,
    /// Host woke up.
    Wake,
    /// Emit a state snapshot event.
    Snapshot,
    Shutdown,
}

enum LoopEvent {
    Signal(HostSignal),
    TimerElapsed,
    HoldElapsed(u64),
    BlinkElapsed,
}

/// Cloneable handle for marshaling signals onto the loop thread.
///
/// Sends are best-effort: once the loop is gone they are silently dropped,
/// matching the informational nature of the whole feature.
#[derive(Clone)]
pub struct LoopHandle {
    tx: mpsc::Sender<LoopEvent>,
}

impl LoopHandle {
    pub async fn signal(&self, signal: HostSignal) {
        let _ = self.tx.send(LoopEvent::Signal(signal)).await;
    }

    /// For callers outside the runtime (e.g. a stdin reader thread).
    pub fn signal_blocking(&self, signal: HostSignal) {
        let _ = self.tx.blocking_send(LoopEvent::Signal(signal));
    }
}

/// Persistent store for the enabled flag. Read once at startup, written on
/// every toggle. The contract has no failure surface; implementations deal
/// with I/O errors themselves.
pub trait SettingsStore {
    fn enabled(&self) -> bool;
    fn set_enabled(&mut self, enabled: bool);
}

/// In-memory settings for tests and stateless shells.
#[derive(Debug, Clone, Copy)]
pub struct MemorySettings {
    pub enabled: bool,
}

impl MemorySettings {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}

impl SettingsStore for MemorySettings {
    fn enabled(&self) -> bool {
        self.enabled
    }
    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }
}

/// Host status indicator (menu icon / toggle label).
pub trait StatusIndicator {
    /// Reflect a change of the enabled flag.
    fn set_enabled(&mut self, enabled: bool);
    /// Swap to the firing icon.
    fn blink(&mut self);
    /// Swap back. Must be idempotent: a revert can land after a newer
    /// blink, or after the feature was disabled mid-blink.
    fn restore(&mut self);
}

/// Indicator for shells without a status surface.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullIndicator;

impl StatusIndicator for NullIndicator {
    fn set_enabled(&mut self, _enabled: bool) {}
    fn blink(&mut self) {}
    fn restore(&mut self) {}
}

type EventSink = Box<dyn FnMut(&Event)>;

/// The event loop. Owns every piece of mutable state; consumed by
/// [`ReminderLoop::run`] on a current-thread runtime.
pub struct ReminderLoop {
    scheduler: ReminderScheduler,
    notifier: TransientNotifier,
    settings: Box<dyn SettingsStore>,
    indicator: Box<dyn StatusIndicator>,
    rng: Box<dyn RngCore>,
    sink: Option<EventSink>,
    tx: mpsc::Sender<LoopEvent>,
    rx: mpsc::Receiver<LoopEvent>,
    /// The single live scheduler timer. Arming aborts first.
    timer: Option<AbortHandle>,
    /// The single pending notification hold. A new show aborts it.
    hold: Option<AbortHandle>,
}

impl ReminderLoop {
    /// Build a loop around a settings store; the enabled flag is read once
    /// here. Indicator and surface default to no-ops.
    pub fn new(settings: Box<dyn SettingsStore>) -> Self {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let enabled = settings.enabled();
        Self {
            scheduler: ReminderScheduler::new(enabled),
            notifier: TransientNotifier::disabled(),
            settings,
            indicator: Box::new(NullIndicator),
            rng: Box::new(rand::thread_rng()),
            sink: None,
            tx,
            rx,
            timer: None,
            hold: None,
        }
    }

    pub fn with_surface_factory(mut self, factory: SurfaceFactory) -> Self {
        self.notifier = TransientNotifier::new(factory);
        self
    }

    pub fn with_indicator(mut self, indicator: Box<dyn StatusIndicator>) -> Self {
        self.indicator = indicator;
        self
    }

    pub fn with_rng(mut self, rng: Box<dyn RngCore>) -> Self {
        self.rng = rng;
        self
    }

    pub fn with_event_sink(mut self, sink: EventSink) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn handle(&self) -> LoopHandle {
        LoopHandle {
            tx: self.tx.clone(),
        }
    }

    /// Run until shutdown. Starts the cadence if enabled, then processes
    /// host signals and timer callbacks one at a time.
    pub async fn run(mut self) {
        if let Some(arming) = self.scheduler.start() {
            self.arm(arming);
            self.emit(Event::SchedulerStarted { at: Utc::now() });
        }
        while let Some(event) = self.rx.recv().await {
            match event {
                LoopEvent::Signal(HostSignal::Shutdown) => break,
                LoopEvent::Signal(signal) => self.handle_signal(signal),
                LoopEvent::TimerElapsed => self.handle_tick(),
                LoopEvent::HoldElapsed(epoch) => {
                    if self.notifier.on_hold_elapsed(epoch) {
                        self.hold = None;
                    }
                }
                LoopEvent::BlinkElapsed => self.indicator.restore(),
            }
        }
        self.cancel_timer();
        self.cancel_hold();
    }

    // ── Signal handling ──────────────────────────────────────────────

    fn handle_signal(&mut self, signal: HostSignal) {
        let now = Utc::now();
        match signal {
            HostSignal::Toggle => self.apply_enabled(!self.scheduler.enabled(), now),
            HostSignal::SetEnabled(value) => self.apply_enabled(value, now),
            HostSignal::Pause(duration) => {
                let until = self.scheduler.pause(duration, now);
                self.emit(Event::PauseSet { until, at: now });
            }
            HostSignal::TriggerNow => {
                let decision = self.scheduler.trigger_now(now);
                self.react(decision, now);
            }
            HostSignal::Sleep => {
                self.scheduler.on_sleep();
                self.cancel_timer();
                self.emit(Event::SchedulerStopped { at: now });
            }
            HostSignal::Wake => {
                if let Some(arming) = self.scheduler.on_wake() {
                    self.arm(arming);
                    self.emit(Event::SchedulerStarted { at: now });
                }
            }
            HostSignal::Snapshot => {
                let snapshot = self.scheduler.snapshot();
                self.emit(snapshot);
            }
            HostSignal::Shutdown => {}
        }
    }

    fn apply_enabled(&mut self, value: bool, now: DateTime<Utc>) {
        if value == self.scheduler.enabled() {
            return;
        }
        let arming = self.scheduler.set_enabled(value);
        self.settings.set_enabled(value);
        self.indicator.set_enabled(value);
        match arming {
            Some(arming) => self.arm(arming),
            None => self.cancel_timer(),
        }
        self.emit(Event::EnabledChanged { enabled: value, at: now });
    }

    fn handle_tick(&mut self) {
        let now = Utc::now();
        let tick = self.scheduler.on_timer_elapsed(now);
        if let Some(arming) = tick.rearm {
            self.arm(arming);
        }
        self.react(tick.decision, now);
    }

    fn react(&mut self, decision: FireDecision, now: DateTime<Utc>) {
        match decision {
            FireDecision::Fire => self.fire(now),
            FireDecision::Paused => {
                if let Some(until) = self.scheduler.paused_until() {
                    self.emit(Event::ReminderSuppressed {
                        paused_until: until,
                        at: now,
                    });
                }
            }
            FireDecision::Disabled | FireDecision::Stale => {}
        }
    }

    fn fire(&mut self, now: DateTime<Utc>) {
        let message = messages::pick_message(&mut self.rng);
        let directive = self.notifier.show(NotificationRequest {
            text: message.to_string(),
            duration: SHOW_DURATION,
        });

        self.cancel_hold();
        let tx = self.tx.clone();
        let handle = tokio::spawn(async move {
            time::sleep(directive.hold).await;
            let _ = tx.send(LoopEvent::HoldElapsed(directive.epoch)).await;
        });
        self.hold = Some(handle.abort_handle());

        self.indicator.blink();
        // The revert is informational, not state-bearing: it is never
        // cancelled or rescheduled by a fire that lands mid-blink, and
        // restore() is idempotent.
        let tx = self.tx.clone();
        tokio::spawn(async move {
            time::sleep(BLINK_HOLD).await;
            let _ = tx.send(LoopEvent::BlinkElapsed).await;
        });

        self.emit(Event::ReminderFired {
            message: message.to_string(),
            at: now,
        });
    }

    // ── Timers ───────────────────────────────────────────────────────

    fn arm(&mut self, arming: Arming) {
        self.cancel_timer();
        let tx = self.tx.clone();
        let handle = match arming {
            Arming::Initial => tokio::spawn(async move {
                time::sleep(Arming::Initial.delay()).await;
                let _ = tx.send(LoopEvent::TimerElapsed).await;
            }),
            Arming::Steady => tokio::spawn(async move {
                loop {
                    time::sleep(Arming::Steady.delay()).await;
                    if tx.send(LoopEvent::TimerElapsed).await.is_err() {
                        break;
                    }
                }
            }),
        };
        self.timer = Some(handle.abort_handle());
    }

    fn cancel_timer(&mut self) {
        if let Some(handle) = self.timer.take() {
            handle.abort();
        }
    }

    fn cancel_hold(&mut self) {
        if let Some(handle) = self.hold.take() {
            handle.abort();
        }
    }

    fn emit(&mut self, event: Event) {
        if let Some(sink) = self.sink.as_mut() {
            sink(&event);
        }
    }
}
