use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::scheduler::Phase;

/// Every observable state change produces an Event.
/// The shell logs them; `run --json` prints them as JSON lines.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// The cadence timer was armed (cold start or wake).
    SchedulerStarted {
        at: DateTime<Utc>,
    },
    /// The cadence timer was cancelled (sleep).
    SchedulerStopped {
        at: DateTime<Utc>,
    },
    EnabledChanged {
        enabled: bool,
        at: DateTime<Utc>,
    },
    PauseSet {
        until: DateTime<Utc>,
        at: DateTime<Utc>,
    },
    /// A reminder passed the fire policy and was presented.
    ReminderFired {
        message: String,
        at: DateTime<Utc>,
    },
    /// An evaluation landed inside the pause window.
    ReminderSuppressed {
        paused_until: DateTime<Utc>,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        enabled: bool,
        phase: Phase,
        paused_until: Option<DateTime<Utc>>,
        at: DateTime<Utc>,
    },
}
