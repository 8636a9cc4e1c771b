use std::time::Duration;

/// Severity level for notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Level {
	#[default]
	Info,
	Warn,
	Error,
	Success,
	/// Transient progress indicator, replaced by the outcome notification.
	Progress,
}

/// Controls automatic dismissal of notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoDismiss {
	/// Stays until dismissed by the user.
	Never,
	After(Duration),
}

impl AutoDismiss {
	/// Default auto-dismiss duration (4 seconds).
	pub const DEFAULT: Self = Self::After(Duration::from_secs(4));
}

impl Default for AutoDismiss {
	fn default() -> Self {
		Self::DEFAULT
	}
}

/// Action button attached to a notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationAction {
	pub id: String,
	pub label: String,
	pub primary: bool,
}

/// Runtime notification instance ready to display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
	/// Stable id; a later notification with the same id replaces the earlier one.
	pub id: String,
	pub level: Level,
	pub title: String,
	pub message: String,
	pub auto_dismiss: AutoDismiss,
	/// Blocking notifications must be acknowledged before the user continues.
	pub blocking: bool,
	pub actions: Vec<NotificationAction>,
}

impl Notification {
	pub fn new(id: impl Into<String>, level: Level, title: impl Into<String>, message: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			level,
			title: title.into(),
			message: message.into(),
			auto_dismiss: AutoDismiss::DEFAULT,
			blocking: false,
			actions: Vec::new(),
		}
	}

	pub fn progress(id: impl Into<String>, message: impl Into<String>) -> Self {
		Self::new(id, Level::Progress, "In progress", message).auto_dismiss(AutoDismiss::Never)
	}

	pub fn success(id: impl Into<String>, message: impl Into<String>) -> Self {
		Self::new(id, Level::Success, "Done", message)
	}

	pub fn error(id: impl Into<String>, title: impl Into<String>, message: impl Into<String>) -> Self {
		Self::new(id, Level::Error, title, message).auto_dismiss(AutoDismiss::After(Duration::from_secs(8)))
	}

	#[must_use]
	pub fn auto_dismiss(mut self, auto_dismiss: AutoDismiss) -> Self {
		self.auto_dismiss = auto_dismiss;
		self
	}

	#[must_use]
	pub fn blocking(mut self) -> Self {
		self.blocking = true;
		self.auto_dismiss = AutoDismiss::Never;
		self
	}

	#[must_use]
	pub fn action(mut self, id: impl Into<String>, label: impl Into<String>, primary: bool) -> Self {
		self.actions.push(NotificationAction {
			id: id.into(),
			label: label.into(),
			primary,
		});
		self
	}
}
