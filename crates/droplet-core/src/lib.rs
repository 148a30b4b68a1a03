//! # Droplet Core Library
//!
//! This library provides the core logic for Droplet, a periodic hydration
//! reminder with a transient on-screen notification. The host shell (a CLI
//! binary, or any other front-end) is a thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Reminder Scheduler**: A wall-clock-based state machine that decides
//!   when a reminder fires. It owns no timers -- the runtime arms and
//!   cancels them on its behalf and reports elapsed timers back
//! - **Transient Notifier**: The show-for-duration-then-fade protocol over
//!   a pluggable presentation surface
//! - **Runtime**: A single-threaded tokio event loop that drives both with
//!   real time and marshals host signals onto one thread
//! - **Storage**: TOML-based persistence for the enabled flag
//!
//! ## Key Components
//!
//! - [`ReminderScheduler`]: Fire-policy state machine
//! - [`TransientNotifier`]: Presentation coalescing and hiding
//! - [`ReminderLoop`]: The event loop tying everything together
//! - [`Config`]: Persistent settings

pub mod error;
pub mod events;
pub mod notifier;
pub mod runtime;
pub mod scheduler;
pub mod storage;

pub use error::{ConfigError, CoreError, Result};
pub use events::Event;
pub use notifier::{NotificationRequest, NullSurface, Surface, TransientNotifier};
pub use runtime::{HostSignal, LoopHandle, MemorySettings, ReminderLoop, SettingsStore, StatusIndicator};
pub use scheduler::{Arming, FireDecision, Phase, ReminderScheduler, Tick};
pub use storage::Config;
