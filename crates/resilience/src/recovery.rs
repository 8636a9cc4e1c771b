use crate::failure::FailureReason;

/// What a recovery option does when executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecoveryAction {
	/// Clear the failure and ask the transport to connect again.
	Reconnect,
	Reauthenticate,
	OfflineMode,
	ContactSupport,
	CheckConfiguration,
	/// Reload the whole client; always offered.
	RefreshPage,
}

/// User-selectable way out of a permanent failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveryOption {
	pub id: &'static str,
	pub label: &'static str,
	pub description: &'static str,
	pub action: RecoveryAction,
	pub primary: bool,
}

impl RecoveryOption {
	const fn new(id: &'static str, label: &'static str, description: &'static str, action: RecoveryAction) -> Self {
		Self {
			id,
			label,
			description,
			action,
			primary: false,
		}
	}

	const fn primary(mut self) -> Self {
		self.primary = true;
		self
	}
}

/// Errors from [`crate::ConnectionResilienceManager::execute_recovery`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecoveryError {
	#[error("no permanent failure is active")]
	NoActiveFailure,
	#[error("unknown recovery option: {0}")]
	UnknownOption(String),
}

const RECONNECT: RecoveryOption = RecoveryOption::new("reconnect", "Try again", "Attempt to reconnect to the server now.", RecoveryAction::Reconnect);
const REAUTHENTICATE: RecoveryOption = RecoveryOption::new(
	"reauthenticate",
	"Sign in again",
	"Refresh your credentials and restore the realtime connection.",
	RecoveryAction::Reauthenticate,
);
const OFFLINE: RecoveryOption = RecoveryOption::new(
	"offline",
	"Continue offline",
	"Keep browsing cached swaps; changes sync when the connection returns.",
	RecoveryAction::OfflineMode,
);
const SUPPORT: RecoveryOption = RecoveryOption::new(
	"contact-support",
	"Contact support",
	"Report the problem with the technical details attached.",
	RecoveryAction::ContactSupport,
);
const CHECK_CONFIG: RecoveryOption = RecoveryOption::new(
	"check-configuration",
	"Check settings",
	"Review the client configuration for the realtime service.",
	RecoveryAction::CheckConfiguration,
);
const REFRESH: RecoveryOption = RecoveryOption::new("refresh", "Refresh page", "Reload the application.", RecoveryAction::RefreshPage);

/// Recovery options for `reason`, most relevant first, refresh last.
pub(crate) fn options_for(reason: FailureReason) -> Vec<RecoveryOption> {
	let mut options = match reason {
		FailureReason::MaxReconnectionAttempts | FailureReason::ServerUnavailable => vec![RECONNECT.primary(), OFFLINE, SUPPORT],
		FailureReason::NetworkUnavailable => vec![RECONNECT.primary(), OFFLINE],
		FailureReason::AuthenticationFailure => vec![REAUTHENTICATE.primary(), SUPPORT],
		FailureReason::ConfigurationError => vec![CHECK_CONFIG.primary(), SUPPORT],
		FailureReason::UserRequested => vec![RECONNECT.primary()],
	};
	options.push(REFRESH);
	options
}
