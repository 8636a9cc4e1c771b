//! Ordered delivery of alerts that must reach the user.

use std::sync::Arc;

use crate::{Level, Notification, NotificationSink};

/// Failure of one delivery channel.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeliveryError {
	/// Channel has no surface to render into (not mounted, headless, ...).
	#[error("channel {0} is unavailable")]
	Unavailable(&'static str),
	#[error("channel {channel} rejected the alert: {reason}")]
	Rejected { channel: &'static str, reason: String },
}

/// One presentation surface in a delivery cascade.
pub trait DeliveryChannel: Send + Sync {
	fn name(&self) -> &'static str;

	fn deliver(&self, notification: &Notification) -> Result<(), DeliveryError>;
}

/// Channel that forwards into a [`NotificationSink`] when one is attached.
///
/// Used for the modal, banner and toast surfaces: the frontend attaches a
/// sink while the surface is mounted.
pub struct QueueChannel {
	name: &'static str,
	sink: Option<Arc<dyn NotificationSink>>,
}

impl QueueChannel {
	pub fn new(name: &'static str, sink: Arc<dyn NotificationSink>) -> Self {
		Self { name, sink: Some(sink) }
	}

	/// Channel whose surface is not mounted; every delivery fails.
	pub fn detached(name: &'static str) -> Self {
		Self { name, sink: None }
	}
}

impl DeliveryChannel for QueueChannel {
	fn name(&self) -> &'static str {
		self.name
	}

	fn deliver(&self, notification: &Notification) -> Result<(), DeliveryError> {
		let sink = self.sink.as_ref().ok_or(DeliveryError::Unavailable(self.name))?;
		sink.add_notification(notification.clone());
		Ok(())
	}
}

/// Last-resort channel writing to the log. Always succeeds.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleChannel;

impl DeliveryChannel for ConsoleChannel {
	fn name(&self) -> &'static str {
		"console"
	}

	fn deliver(&self, notification: &Notification) -> Result<(), DeliveryError> {
		match notification.level {
			Level::Error => tracing::error!(id = %notification.id, title = %notification.title, "{}", notification.message),
			Level::Warn => tracing::warn!(id = %notification.id, title = %notification.title, "{}", notification.message),
			_ => tracing::info!(id = %notification.id, title = %notification.title, "{}", notification.message),
		}
		Ok(())
	}
}

/// Ordered list of channels; delivery stops at the first success.
pub struct DeliveryCascade {
	channels: Vec<Box<dyn DeliveryChannel>>,
}

impl Default for DeliveryCascade {
	fn default() -> Self {
		Self::console_only()
	}
}

impl DeliveryCascade {
	pub fn new(channels: Vec<Box<dyn DeliveryChannel>>) -> Self {
		Self { channels }
	}

	pub fn console_only() -> Self {
		Self::new(vec![Box::new(ConsoleChannel)])
	}

	/// Modal, banner and toast surfaces, then console. A surface passed as
	/// `None` is not mounted and always falls through.
	pub fn standard(
		modal: Option<Arc<dyn NotificationSink>>,
		banner: Option<Arc<dyn NotificationSink>>,
		toast: Option<Arc<dyn NotificationSink>>,
	) -> Self {
		fn surface(name: &'static str, sink: Option<Arc<dyn NotificationSink>>) -> Box<dyn DeliveryChannel> {
			match sink {
				Some(sink) => Box::new(QueueChannel::new(name, sink)),
				None => Box::new(QueueChannel::detached(name)),
			}
		}
		Self::new(vec![
			surface("modal", modal),
			surface("banner", banner),
			surface("toast", toast),
			Box::new(ConsoleChannel),
		])
	}

	/// Delivers through the first channel that accepts.
	///
	/// Returns the accepting channel's name, or the last error when every
	/// channel failed.
	pub fn deliver(&self, notification: &Notification) -> Result<&'static str, DeliveryError> {
		let mut last_error = DeliveryError::Unavailable("none");
		for channel in &self.channels {
			match channel.deliver(notification) {
				Ok(()) => {
					tracing::debug!(channel = channel.name(), id = %notification.id, "notify.cascade.delivered");
					return Ok(channel.name());
				}
				Err(error) => {
					tracing::debug!(channel = channel.name(), %error, "notify.cascade.fallthrough");
					last_error = error;
				}
			}
		}
		Err(last_error)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::NotificationCenter;

	struct Refusing;

	impl DeliveryChannel for Refusing {
		fn name(&self) -> &'static str {
			"refusing"
		}

		fn deliver(&self, _notification: &Notification) -> Result<(), DeliveryError> {
			Err(DeliveryError::Rejected {
				channel: "refusing",
				reason: "busy".into(),
			})
		}
	}

	fn alert() -> Notification {
		Notification::error("failure", "Connection lost", "gone").blocking()
	}

	#[test]
	fn stops_at_first_successful_channel() {
		let banner = Arc::new(NotificationCenter::new());
		let toast = Arc::new(NotificationCenter::new());
		let cascade = DeliveryCascade::new(vec![
			Box::new(QueueChannel::detached("modal")),
			Box::new(QueueChannel::new("banner", banner.clone())),
			Box::new(QueueChannel::new("toast", toast.clone())),
			Box::new(ConsoleChannel),
		]);

		assert_eq!(cascade.deliver(&alert()), Ok("banner"));
		assert_eq!(banner.len(), 1);
		assert!(toast.is_empty());
	}

	#[test]
	fn standard_order_skips_unmounted_surfaces() {
		let banner = Arc::new(NotificationCenter::new());
		let toast = Arc::new(NotificationCenter::new());
		let cascade = DeliveryCascade::standard(None, Some(banner.clone()), Some(toast.clone()));

		assert_eq!(cascade.deliver(&alert()), Ok("banner"));
		assert_eq!(banner.len(), 1);
		assert!(toast.is_empty());
		assert_eq!(DeliveryCascade::standard(None, None, None).deliver(&alert()), Ok("console"));
	}

	#[test]
	fn falls_back_to_console() {
		let cascade = DeliveryCascade::new(vec![Box::new(Refusing), Box::new(QueueChannel::detached("toast")), Box::new(ConsoleChannel)]);
		assert_eq!(cascade.deliver(&alert()), Ok("console"));
	}

	#[test]
	fn reports_last_error_when_nothing_accepts() {
		let cascade = DeliveryCascade::new(vec![Box::new(QueueChannel::detached("modal")), Box::new(Refusing)]);
		assert!(matches!(cascade.deliver(&alert()), Err(DeliveryError::Rejected { channel: "refusing", .. })));
	}
}
