//! User-facing notifications.
//!
//! The store never returns errors to its caller. Every failed operation is
//! turned into a [`Notification`] and handed to a [`Notifier`], which is the
//! seam where a UI would show a toast.

use std::str::FromStr;
use std::sync::{Mutex, PoisonError};

use thiserror::Error;

/// Language used for notification messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Locale {
    /// Brazilian Portuguese, the storefront's original copy.
    #[default]
    PtBr,
    /// English.
    En,
}

/// Unrecognized locale tag.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown locale '{0}' (expected pt-BR or en)")]
pub struct UnknownLocale(pub String);

impl FromStr for Locale {
    type Err = UnknownLocale;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "pt-br" | "pt" => Ok(Self::PtBr),
            "en" | "en-us" | "en-gb" => Ok(Self::En),
            _ => Err(UnknownLocale(s.to_string())),
        }
    }
}

impl Locale {
    /// Standard message for a notification kind.
    #[must_use]
    pub const fn message(self, kind: NotificationKind) -> &'static str {
        match (self, kind) {
            (Self::PtBr, NotificationKind::AddFailed) => "Erro na adição do produto",
            (Self::PtBr, NotificationKind::RemoveFailed) => "Erro na remoção do produto",
            (Self::PtBr, NotificationKind::UpdateFailed) => {
                "Erro na alteração de quantidade do produto"
            }
            (Self::PtBr, NotificationKind::OutOfStock) => "Quantidade solicitada fora de estoque",
            (Self::En, NotificationKind::AddFailed) => "Could not add product",
            (Self::En, NotificationKind::RemoveFailed) => "Could not remove product",
            (Self::En, NotificationKind::UpdateFailed) => "Could not update product amount",
            (Self::En, NotificationKind::OutOfStock) => "Requested amount is out of stock",
        }
    }
}

/// What went wrong, as far as the user is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    AddFailed,
    RemoveFailed,
    UpdateFailed,
    OutOfStock,
}

/// A transient, user-visible error message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

impl Notification {
    /// Notification with the standard message for `kind`.
    #[must_use]
    pub fn new(kind: NotificationKind, locale: Locale) -> Self {
        Self {
            kind,
            message: locale.message(kind).to_string(),
        }
    }

    /// Notification with a custom message, falling back to the standard one
    /// when `message` is blank.
    #[must_use]
    pub fn with_message(kind: NotificationKind, locale: Locale, message: &str) -> Self {
        if message.trim().is_empty() {
            return Self::new(kind, locale);
        }
        Self {
            kind,
            message: message.to_string(),
        }
    }
}

impl std::fmt::Display for Notification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Receives notifications raised by the store.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Emits notifications as `tracing` warnings.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        tracing::warn!(kind = ?notification.kind, "{}", notification.message);
    }
}

/// Keeps every notification in memory.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    received: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything received so far, oldest first.
    #[must_use]
    pub fn notifications(&self) -> Vec<Notification> {
        self.received
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Drain everything received so far.
    pub fn take(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.received.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// Whether nothing has been received.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.received
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.received
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notification);
    }
}
