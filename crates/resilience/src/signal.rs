use std::time::Duration;

use crate::failure::FailureReason;

/// Lifecycle state of the realtime connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
	Connected,
	Reconnecting,
	PermanentlyFailed,
}

/// Instruction broadcast to the transport and the frontend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionSignal {
	/// Cease all reconnection attempts until reset.
	StopReconnection { reason: FailureReason },
	/// Connect again from a clean slate.
	RetryConnection,
	Reauthenticate,
	EnterOfflineMode,
	RefreshPage,
	ContactSupport,
	CheckConfiguration,
	/// Failure state cleared.
	Reset,
}

/// Point-in-time view of the connection for status displays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionHealth {
	pub state: ConnectionState,
	pub attempts: u32,
	pub max_attempts: u32,
	pub recent_errors: usize,
	pub last_error: Option<String>,
	pub failure_reason: Option<FailureReason>,
	/// Time since the permanent failure was declared.
	pub failed_for: Option<Duration>,
}
