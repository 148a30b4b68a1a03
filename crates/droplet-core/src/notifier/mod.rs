//! Transient notification presentation protocol.
//!
//! [`TransientNotifier`] owns the one presentation surface and decides what
//! it shows. Hiding is always duration-driven - there is no explicit hide
//! in the contract, so the surface can never be left in a half-dismissed
//! state. A `show()` that lands while a presentation is still up (or
//! mid-fade) supersedes it: the text is replaced immediately and the hold
//! restarts from the new request, so exactly one hide runs per visible
//! presentation.
//!
//! The notifier owns no timers. The runtime schedules the hold from the
//! [`ShowDirective`] and reports back with `on_hold_elapsed()`; the epoch
//! carried in the directive lets a superseded hold be recognized as stale
//! even if its callback was already queued.

use std::time::Duration;

/// Fade-in/fade-out transition length.
pub const FADE: Duration = Duration::from_millis(250);
/// How long a reminder stays fully visible.
pub const SHOW_DURATION: Duration = Duration::from_secs(4);

/// Rendering capability for the transient surface.
///
/// Implementations must settle to a final visibility when a transition
/// completes or is cancelled, must not intercept input, and render above
/// normal windows on every virtual desktop, pinned to the top-right corner
/// of the primary display. Rendering is best-effort: a surface that cannot
/// present does nothing and reports nothing.
pub trait Surface {
    /// Make `text` visible, fading in over `fade`.
    fn present(&mut self, text: &str, fade: Duration);

    /// Fade out over `fade` and hide.
    fn dismiss(&mut self, fade: Duration);
}

/// Degraded surface used when no display is available.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSurface;

impl Surface for NullSurface {
    fn present(&mut self, _text: &str, _fade: Duration) {}
    fn dismiss(&mut self, _fade: Duration) {}
}

/// A single reminder presentation, consumed immediately on fire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationRequest {
    pub text: String,
    pub duration: Duration,
}

/// Returned by [`TransientNotifier::show`]; tells the driver how long to
/// hold before reporting back with this epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShowDirective {
    pub epoch: u64,
    pub hold: Duration,
}

/// Factory for the presentation surface. Called lazily on first show, and
/// again on later shows if no surface could be produced; `None` degrades
/// the notification to a silent no-op.
pub type SurfaceFactory = Box<dyn FnMut() -> Option<Box<dyn Surface>>>;

pub struct TransientNotifier {
    factory: SurfaceFactory,
    surface: Option<Box<dyn Surface>>,
    epoch: u64,
    visible_text: Option<String>,
}

impl TransientNotifier {
    pub fn new(factory: SurfaceFactory) -> Self {
        Self {
            factory,
            surface: None,
            epoch: 0,
            visible_text: None,
        }
    }

    /// Notifier that never presents anything.
    pub fn disabled() -> Self {
        Self::new(Box::new(|| None))
    }

    pub fn is_visible(&self) -> bool {
        self.visible_text.is_some()
    }

    pub fn visible_text(&self) -> Option<&str> {
        self.visible_text.as_deref()
    }

    /// Present `text`, superseding any current presentation. The caller
    /// must cancel the previous hold timer and schedule a new one from the
    /// returned directive.
    pub fn show(&mut self, request: NotificationRequest) -> ShowDirective {
        if self.surface.is_none() {
            self.surface = (self.factory)();
        }
        if let Some(surface) = self.surface.as_mut() {
            surface.present(&request.text, FADE);
        }
        self.epoch += 1;
        self.visible_text = Some(request.text);
        ShowDirective {
            epoch: self.epoch,
            hold: request.duration,
        }
    }

    /// Hold timer callback. Hides only when `epoch` still names the latest
    /// show; a stale epoch means that show was superseded and its hide is
    /// dropped. Returns whether the surface was hidden.
    pub fn on_hold_elapsed(&mut self, epoch: u64) -> bool {
        if epoch != self.epoch || self.visible_text.is_none() {
            return false;
        }
        self.visible_text = None;
        if let Some(surface) = self.surface.as_mut() {
            surface.dismiss(FADE);
        }
        true
    }
}
