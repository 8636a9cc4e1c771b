use swapline_auth::AuthError;
use swapline_primitives::TargetingActionKind;
use swapline_resilience::FailureReason;
use thiserror::Error;

use crate::ledger::RetryKey;

pub type Result<T, E = TargetingError> = std::result::Result<T, E>;

/// Terminal outcome of a targeting action that did not succeed.
///
/// Local state has already been rolled back when one of these is returned.
#[derive(Debug, Error)]
pub enum TargetingError {
	#[error("operation {key} is already in flight")]
	OperationInFlight { key: RetryKey },
	#[error("{kind} failed after {attempts} attempt(s): {user_message}")]
	Failed {
		kind: TargetingActionKind,
		attempts: u32,
		user_message: String,
		#[source]
		error: AuthError,
	},
	#[error("{kind} abandoned: connection permanently failed ({})", .reason.as_str())]
	ConnectionFailed { kind: TargetingActionKind, reason: FailureReason },
}

impl TargetingError {
	pub fn auth_error(&self) -> Option<&AuthError> {
		match self {
			Self::Failed { error, .. } => Some(error),
			_ => None,
		}
	}
}
