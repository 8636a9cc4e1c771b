//! Notification side channel for the targeting core.
//!
//! Components push typed [`Notification`]s into a [`NotificationSink`]. The
//! frontend drains them from a [`NotificationCenter`] and owns toast lifecycle
//! and rendering. Terminal alerts that must reach the user go through a
//! [`DeliveryCascade`], which walks channels in priority order until one
//! accepts.

mod cascade;
mod center;
mod notification;

pub use cascade::{ConsoleChannel, DeliveryCascade, DeliveryChannel, DeliveryError, QueueChannel};
pub use center::NotificationCenter;
pub use notification::{AutoDismiss, Level, Notification, NotificationAction};

/// Fire-and-forget notification consumer.
pub trait NotificationSink: Send + Sync {
	fn add_notification(&self, notification: Notification);
}

/// Sink that drops everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl NotificationSink for NullSink {
	fn add_notification(&self, _notification: Notification) {}
}
