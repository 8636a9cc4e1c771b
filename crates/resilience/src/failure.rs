use swapline_notify::Notification;
use swapline_primitives::Timestamp;
use tokio::time::Instant;

use crate::error::ConnectionError;
use crate::recovery::RecoveryOption;

/// Why the connection was declared permanently failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureReason {
	MaxReconnectionAttempts,
	AuthenticationFailure,
	ServerUnavailable,
	NetworkUnavailable,
	ConfigurationError,
	UserRequested,
}

impl FailureReason {
	pub const ALL: [Self; 6] = [
		Self::MaxReconnectionAttempts,
		Self::AuthenticationFailure,
		Self::ServerUnavailable,
		Self::NetworkUnavailable,
		Self::ConfigurationError,
		Self::UserRequested,
	];

	pub const fn as_str(self) -> &'static str {
		match self {
			Self::MaxReconnectionAttempts => "MAX_RECONNECTION_ATTEMPTS",
			Self::AuthenticationFailure => "AUTHENTICATION_FAILURE",
			Self::ServerUnavailable => "SERVER_UNAVAILABLE",
			Self::NetworkUnavailable => "NETWORK_UNAVAILABLE",
			Self::ConfigurationError => "CONFIGURATION_ERROR",
			Self::UserRequested => "USER_REQUESTED",
		}
	}

	pub const fn title(self) -> &'static str {
		match self {
			Self::MaxReconnectionAttempts => "Connection lost",
			Self::AuthenticationFailure => "Sign-in required",
			Self::ServerUnavailable => "Service unavailable",
			Self::NetworkUnavailable => "You're offline",
			Self::ConfigurationError => "Connection misconfigured",
			Self::UserRequested => "Disconnected",
		}
	}

	pub(crate) const fn user_message(self) -> &'static str {
		match self {
			Self::MaxReconnectionAttempts => "We couldn't restore the live connection after several attempts. Live updates are paused.",
			Self::AuthenticationFailure => "The live connection was refused because your credentials could not be verified.",
			Self::ServerUnavailable => "The swap service is not responding. Live updates are paused until it recovers.",
			Self::NetworkUnavailable => "Your device appears to be offline. Live updates resume once you reconnect.",
			Self::ConfigurationError => "The live connection is misconfigured and cannot be established.",
			Self::UserRequested => "Live updates were turned off.",
		}
	}
}

/// Terminal failure record, created once per failure episode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermanentFailure {
	pub reason: FailureReason,
	pub timestamp: Timestamp,
	pub(crate) declared_at: Instant,
	pub error_history: Vec<ConnectionError>,
	pub attempt_count: u32,
	pub user_message: String,
	pub technical_details: String,
	pub recovery_options: Vec<RecoveryOption>,
}

impl PermanentFailure {
	pub(crate) fn new(reason: FailureReason, error_history: Vec<ConnectionError>, attempt_count: u32, max_attempts: u32) -> Self {
		let last_error = error_history.last().map_or_else(|| "none".to_owned(), ToString::to_string);
		let technical_details = format!(
			"reason={} attempts={attempt_count}/{max_attempts} recent_errors={} last_error={last_error}",
			reason.as_str(),
			error_history.len(),
		);
		Self {
			reason,
			timestamp: swapline_primitives::now(),
			declared_at: Instant::now(),
			error_history,
			attempt_count,
			user_message: reason.user_message().to_owned(),
			technical_details,
			recovery_options: crate::recovery::options_for(reason),
		}
	}

	pub fn primary_option(&self) -> Option<&RecoveryOption> {
		self.recovery_options.iter().find(|o| o.primary)
	}

	/// Blocking notification with one action per recovery option.
	pub fn to_notification(&self) -> Notification {
		self.recovery_options.iter().fold(
			Notification::error("connection.permanent_failure", self.reason.title(), &self.user_message).blocking(),
			|notification, option| notification.action(option.id, option.label, option.primary),
		)
	}
}
