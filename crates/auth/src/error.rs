use std::time::Duration;

use swapline_primitives::Timestamp;

use crate::context::ErrorContext;
use crate::kind::AuthErrorKind;
use crate::strategy::RetryStrategy;

/// Classified, immutable error record.
///
/// Only the classifier constructs these. `triggers_logout` is derived here,
/// never passed in: a targeting-related error cannot carry it.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct AuthError {
	kind: AuthErrorKind,
	message: String,
	is_targeting_related: bool,
	triggers_logout: bool,
	retryable: bool,
	retry_delay: Option<Duration>,
	context: ErrorContext,
	timestamp: Timestamp,
}

impl AuthError {
	pub(crate) fn new(
		kind: AuthErrorKind,
		message: impl Into<String>,
		context: ErrorContext,
		is_targeting_related: bool,
		strategy: Option<&RetryStrategy>,
	) -> Self {
		let retry_delay = strategy.map(|s| s.delay_for_attempt(context.retry_count.saturating_add(1)));
		Self {
			kind,
			message: message.into(),
			is_targeting_related,
			triggers_logout: kind.is_session_kind() && !is_targeting_related,
			retryable: kind.is_retryable(),
			retry_delay,
			context,
			timestamp: swapline_primitives::now(),
		}
	}

	pub fn kind(&self) -> AuthErrorKind {
		self.kind
	}

	pub fn message(&self) -> &str {
		&self.message
	}

	pub fn is_targeting_related(&self) -> bool {
		self.is_targeting_related
	}

	pub fn triggers_logout(&self) -> bool {
		self.triggers_logout
	}

	pub fn retryable(&self) -> bool {
		self.retryable
	}

	/// Delay before the next retry of the call that produced this error.
	pub fn retry_delay(&self) -> Option<Duration> {
		self.retry_delay
	}

	pub fn context(&self) -> &ErrorContext {
		&self.context
	}

	pub fn timestamp(&self) -> Timestamp {
		self.timestamp
	}
}
