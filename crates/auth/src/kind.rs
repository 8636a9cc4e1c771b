use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::strategy::RetryStrategy;

/// Classified error kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthErrorKind {
	/// Session token has expired.
	TokenExpired,
	/// Session token was rejected as invalid.
	TokenInvalid,
	/// No session token was presented.
	TokenMissing,
	/// A targeting call failed its authentication check.
	TargetingAuthFailure,
	/// Token validation failed on a targeting call.
	TargetingTokenValidationFailed,
	/// A targeting call was refused by a permission check.
	TargetingPermissionDenied,
	/// A non-targeting call tried to read another user's data.
	CrossUserAccessDenied,
	/// Looks like an auth failure but does not invalidate the session.
	FalsePositiveAuthFailure,
	RateLimitExceeded,
	ServerError,
	NetworkError,
	UnknownError,
}

impl AuthErrorKind {
	pub const ALL: [Self; 12] = [
		Self::TokenExpired,
		Self::TokenInvalid,
		Self::TokenMissing,
		Self::TargetingAuthFailure,
		Self::TargetingTokenValidationFailed,
		Self::TargetingPermissionDenied,
		Self::CrossUserAccessDenied,
		Self::FalsePositiveAuthFailure,
		Self::RateLimitExceeded,
		Self::ServerError,
		Self::NetworkError,
		Self::UnknownError,
	];

	pub const fn as_str(self) -> &'static str {
		match self {
			Self::TokenExpired => "TOKEN_EXPIRED",
			Self::TokenInvalid => "TOKEN_INVALID",
			Self::TokenMissing => "TOKEN_MISSING",
			Self::TargetingAuthFailure => "TARGETING_AUTH_FAILURE",
			Self::TargetingTokenValidationFailed => "TARGETING_TOKEN_VALIDATION_FAILED",
			Self::TargetingPermissionDenied => "TARGETING_PERMISSION_DENIED",
			Self::CrossUserAccessDenied => "CROSS_USER_ACCESS_DENIED",
			Self::FalsePositiveAuthFailure => "FALSE_POSITIVE_AUTH_FAILURE",
			Self::RateLimitExceeded => "RATE_LIMIT_EXCEEDED",
			Self::ServerError => "SERVER_ERROR",
			Self::NetworkError => "NETWORK_ERROR",
			Self::UnknownError => "UNKNOWN_ERROR",
		}
	}

	/// Kinds that mean the session itself is no longer usable.
	pub const fn is_session_kind(self) -> bool {
		matches!(self, Self::TokenExpired | Self::TokenInvalid | Self::TokenMissing)
	}

	/// Kinds that only ever arise from targeting-scoped calls.
	pub const fn is_targeting_kind(self) -> bool {
		matches!(
			self,
			Self::TargetingAuthFailure | Self::TargetingTokenValidationFailed | Self::TargetingPermissionDenied
		)
	}

	pub const fn is_retryable(self) -> bool {
		matches!(
			self,
			Self::NetworkError
				| Self::ServerError
				| Self::RateLimitExceeded
				| Self::TargetingAuthFailure
				| Self::TargetingTokenValidationFailed
				| Self::FalsePositiveAuthFailure
		)
	}

	/// Default retry schedule, `None` for non-retryable kinds.
	pub const fn retry_strategy(self) -> Option<RetryStrategy> {
		const CAP: Duration = Duration::from_secs(30);
		match self {
			Self::NetworkError => Some(RetryStrategy::exponential(Duration::from_secs(1), 5, CAP)),
			Self::ServerError => Some(RetryStrategy::exponential(Duration::from_secs(2), 3, CAP)),
			Self::RateLimitExceeded => Some(RetryStrategy::fixed(Duration::from_secs(5), 2)),
			Self::TargetingAuthFailure => Some(RetryStrategy::fixed(Duration::from_secs(1), 2)),
			Self::TargetingTokenValidationFailed => Some(RetryStrategy::linear(Duration::from_secs(2), 2, Duration::from_secs(10))),
			Self::FalsePositiveAuthFailure => Some(RetryStrategy::fixed(Duration::from_millis(500), 1)),
			_ => None,
		}
	}
}

impl fmt::Display for AuthErrorKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn retry_strategy_exists_exactly_for_retryable_kinds() {
		for kind in AuthErrorKind::ALL {
			assert_eq!(kind.is_retryable(), kind.retry_strategy().is_some(), "{kind}");
		}
	}

	#[test]
	fn session_and_targeting_kinds_are_disjoint() {
		for kind in AuthErrorKind::ALL {
			assert!(!(kind.is_session_kind() && kind.is_targeting_kind()), "{kind}");
		}
	}

	#[test]
	fn rate_limit_uses_fixed_short_schedule() {
		let s = AuthErrorKind::RateLimitExceeded.retry_strategy().unwrap();
		assert_eq!(s.max_attempts, 2);
		assert_eq!(s.delay_for_attempt(1), Duration::from_secs(5));
		assert_eq!(s.delay_for_attempt(2), Duration::from_secs(5));
	}
}
