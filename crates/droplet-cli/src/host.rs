//! Host-shell collaborators: settings persistence, the status indicator,
//! and the notification surfaces the loop can present on.

use std::time::Duration;

use clap::ValueEnum;
use droplet_core::notifier::{Surface, SurfaceFactory};
use droplet_core::runtime::{SettingsStore, StatusIndicator};
use droplet_core::Config;
use notify_rust::{Notification, NotificationHandle, Timeout};

/// Settings store over the TOML config file. Save failures are logged and
/// swallowed; the in-memory flag stays authoritative for this process.
pub struct TomlSettings {
    config: Config,
}

impl TomlSettings {
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

impl SettingsStore for TomlSettings {
    fn enabled(&self) -> bool {
        self.config.enabled
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.config.enabled = enabled;
        if let Err(err) = self.config.save() {
            tracing::warn!(%err, "failed to persist enabled flag");
        }
    }
}

/// Status indicator rendered as log lines.
#[derive(Debug, Default)]
pub struct LogIndicator {
    lit: bool,
}

impl StatusIndicator for LogIndicator {
    fn set_enabled(&mut self, enabled: bool) {
        tracing::info!(enabled, "reminders toggled");
    }

    fn blink(&mut self) {
        self.lit = true;
        tracing::debug!("status icon lit");
    }

    fn restore(&mut self) {
        if self.lit {
            self.lit = false;
            tracing::debug!("status icon restored");
        }
    }
}

/// Logs the reminder text instead of drawing it; for headless runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSurface;

impl Surface for ConsoleSurface {
    fn present(&mut self, text: &str, _fade: Duration) {
        tracing::info!(%text, "reminder");
    }

    fn dismiss(&mut self, _fade: Duration) {
        tracing::debug!("reminder dismissed");
    }
}

/// Desktop toast surface. Reuses the notification id so a superseding show
/// replaces the previous toast instead of stacking a second one; the fade
/// transitions collapse to show/close, which is the closest a notification
/// daemon gets to an alpha ramp.
pub struct ToastSurface {
    handle: Option<NotificationHandle>,
    warned: bool,
}

impl ToastSurface {
    pub fn new() -> Self {
        Self {
            handle: None,
            warned: false,
        }
    }
}

impl Surface for ToastSurface {
    fn present(&mut self, text: &str, _fade: Duration) {
        let mut toast = Notification::new();
        toast
            .appname("droplet")
            .summary(text)
            // Hiding is duration-driven by the notifier, never by the daemon.
            .timeout(Timeout::Never);
        if let Some(previous) = self.handle.as_ref() {
            toast.id(previous.id());
        }
        match toast.show() {
            Ok(handle) => self.handle = Some(handle),
            Err(err) => {
                if !self.warned {
                    self.warned = true;
                    tracing::warn!(%err, "notification daemon unavailable, reminders degrade to log lines");
                }
            }
        }
    }

    fn dismiss(&mut self, _fade: Duration) {
        if let Some(handle) = self.handle.take() {
            handle.close();
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SurfaceKind {
    /// Desktop toast notifications
    Toast,
    /// Log lines only
    Console,
    /// No presentation at all
    None,
}

pub fn surface_factory(kind: SurfaceKind) -> SurfaceFactory {
    Box::new(move || match kind {
        SurfaceKind::Toast => Some(Box::new(ToastSurface::new()) as Box<dyn Surface>),
        SurfaceKind::Console => Some(Box::new(ConsoleSurface) as Box<dyn Surface>),
        SurfaceKind::None => None,
    })
}
