//! Page-wide UI effects injected into the controller.
//!
//! The notification stack and the loading overlay are shared by every call
//! site on a page. They are reached through [`UiEffects`] rather than looked
//! up globally, so hosts and tests can substitute their own implementation.

use std::cell::RefCell;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Visual variant of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
    Warning,
    Info,
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NotificationKind::Success => "success",
            NotificationKind::Error => "error",
            NotificationKind::Warning => "warning",
            NotificationKind::Info => "info",
        };
        f.write_str(s)
    }
}

/// Capabilities the controller needs from the page.
///
/// Notifications are single-line and auto-dismissing; dismissal is the
/// host's concern.
pub trait UiEffects {
    fn show_notification(&self, message: &str, kind: NotificationKind);
    fn show_loading(&self);
    fn hide_loading(&self);
}

impl<E: UiEffects + ?Sized> UiEffects for &E {
    fn show_notification(&self, message: &str, kind: NotificationKind) {
        (**self).show_notification(message, kind)
    }

    fn show_loading(&self) {
        (**self).show_loading()
    }

    fn hide_loading(&self) {
        (**self).hide_loading()
    }
}

/// Shows the loading indicator for as long as it is alive.
///
/// Dropping the guard hides the indicator, so every exit path (including a
/// future dropped mid-request) leaves it hidden.
pub struct LoadingGuard<'a, E: UiEffects + ?Sized> {
    effects: &'a E,
}

impl<'a, E: UiEffects + ?Sized> LoadingGuard<'a, E> {
    pub fn show(effects: &'a E) -> Self {
        effects.show_loading();
        LoadingGuard { effects }
    }
}

impl<E: UiEffects + ?Sized> Drop for LoadingGuard<'_, E> {
    fn drop(&mut self) {
        self.effects.hide_loading();
    }
}

/// Renders effects as `tracing` events, for headless hosts.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingEffects;

impl UiEffects for TracingEffects {
    fn show_notification(&self, message: &str, kind: NotificationKind) {
        match kind {
            NotificationKind::Error => tracing::error!(%kind, "{}", message),
            NotificationKind::Warning => tracing::warn!(%kind, "{}", message),
            NotificationKind::Success | NotificationKind::Info => {
                tracing::info!(%kind, "{}", message)
            }
        }
    }

    fn show_loading(&self) {
        tracing::debug!("loading indicator shown");
    }

    fn hide_loading(&self) {
        tracing::debug!("loading indicator hidden");
    }
}

/// One effect observed by [`RecordingEffects`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    Notification { message: String, kind: NotificationKind },
    LoadingShown,
    LoadingHidden,
}

/// Test double that records every effect in order.
#[derive(Debug, Default)]
pub struct RecordingEffects {
    events: RefCell<Vec<UiEvent>>,
}

impl RecordingEffects {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<UiEvent> {
        self.events.borrow().clone()
    }

    pub fn notifications(&self) -> Vec<(String, NotificationKind)> {
        self.events
            .borrow()
            .iter()
            .filter_map(|event| match event {
                UiEvent::Notification { message, kind } => Some((message.clone(), *kind)),
                _ => None,
            })
            .collect()
    }

    /// Whether the indicator is currently shown (shows minus hides > 0).
    pub fn loading_visible(&self) -> bool {
        let events = self.events.borrow();
        let shown = events.iter().filter(|e| **e == UiEvent::LoadingShown).count();
        let hidden = events.iter().filter(|e| **e == UiEvent::LoadingHidden).count();
        shown > hidden
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}

impl UiEffects for RecordingEffects {
    fn show_notification(&self, message: &str, kind: NotificationKind) {
        self.events.borrow_mut().push(UiEvent::Notification {
            message: message.to_string(),
            kind,
        });
    }

    fn show_loading(&self) {
        self.events.borrow_mut().push(UiEvent::LoadingShown);
    }

    fn hide_loading(&self) {
        self.events.borrow_mut().push(UiEvent::LoadingHidden);
    }
}
