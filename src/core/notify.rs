//! Notification sink: the single surface every outcome is reported through.

use std::fmt;

/// How a notification should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// Everything went through
    Success,
    /// Saved, but something needs the user's attention
    Warning,
    /// Nothing was saved
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
        })
    }
}

/// A user-facing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Presentation level
    pub severity: Severity,
    /// Message text
    pub message: String,
}

impl Notification {
    /// Success notification.
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Success,
            message: message.into(),
        }
    }

    /// Warning notification.
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
        }
    }

    /// Error notification.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
        }
    }
}

/// Receives notifications. Implementations must not block.
pub trait NotificationSink: Send + Sync {
    /// Shows `notification` to the user.
    fn notify(&self, notification: Notification);
}

/// Sink that writes notifications to the tracing subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn notify(&self, notification: Notification) {
        match notification.severity {
            Severity::Success => tracing::info!("{}", notification.message),
            Severity::Warning => tracing::warn!("{}", notification.message),
            Severity::Error => tracing::error!("{}", notification.message),
        }
    }
}
