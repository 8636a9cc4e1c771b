//! Targeting-aware error classification.

use crate::context::ErrorContext;
use crate::error::AuthError;
use crate::kind::AuthErrorKind;
use crate::messages::user_message;
use crate::raw::{HttpFailure, RawError, TokenFailureKind};
use crate::strategy::RetryStrategy;

#[cfg(test)]
mod tests;

/// Route patterns and keywords that mark a call as targeting-scoped.
///
/// Pattern segments written as `{name}` match any single non-empty path
/// segment. A pattern matches an endpoint when it is a segment-wise prefix
/// of the endpoint path (query string ignored).
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
	pub targeting_routes: Vec<String>,
	pub targeting_keywords: Vec<String>,
}

impl Default for ClassifierConfig {
	fn default() -> Self {
		Self {
			targeting_routes: ["/api/targeting", "/api/swaps/{id}/target", "/api/swaps/{id}/targeting", "/api/proposals"]
				.into_iter()
				.map(String::from)
				.collect(),
			targeting_keywords: ["cross-user", "targeting", "swap access", "target swap"]
				.into_iter()
				.map(String::from)
				.collect(),
		}
	}
}

/// Classification result: the error record plus its handling policy.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
	pub error: AuthError,
	pub should_trigger_logout: bool,
	pub should_retry: bool,
	pub retry_strategy: Option<RetryStrategy>,
	pub user_message: String,
	pub technical_message: String,
}

impl Classification {
	pub fn kind(&self) -> AuthErrorKind {
		self.error.kind()
	}
}

/// Stateless classifier. Cheap to clone; share one per client.
#[derive(Debug, Clone, Default)]
pub struct ErrorClassifier {
	config: ClassifierConfig,
}

impl ErrorClassifier {
	pub fn new(config: ClassifierConfig) -> Self {
		Self { config }
	}

	pub fn config(&self) -> &ClassifierConfig {
		&self.config
	}

	/// Classifies `raw` as observed at the call site described by `context`.
	pub fn classify(&self, raw: &RawError, context: &ErrorContext) -> Classification {
		let targeting = self.is_targeting_related(raw, context);
		let kind = kind_for(raw, targeting);

		let mut retry_strategy = kind.retry_strategy();
		if let (Some(strategy), RawError::Http(HttpFailure { retry_after: Some(hint), .. })) = (retry_strategy, raw) {
			retry_strategy = Some(strategy.with_base_delay(*hint));
		}

		let error = AuthError::new(kind, raw.message(), context.clone(), targeting, retry_strategy.as_ref());
		let should_trigger_logout = error.triggers_logout();
		let should_retry = kind.is_retryable();

		let technical_message = format!(
			"{kind} on {} {} (request {}, retry {}, targeting {targeting}): {raw}",
			context.operation, context.endpoint, context.request_id, context.retry_count
		);

		tracing::debug!(
			kind = kind.as_str(),
			targeting,
			logout = should_trigger_logout,
			retry = should_retry,
			endpoint = %context.endpoint,
			"auth.classify"
		);

		Classification {
			error,
			should_trigger_logout,
			should_retry,
			retry_strategy,
			user_message: user_message(kind),
			technical_message,
		}
	}

	/// Whether the call is targeting-scoped.
	///
	/// True when the endpoint matches a targeting route, the operation name
	/// mentions targeting, a swap id is attached, or the error message carries
	/// a targeting keyword.
	pub fn is_targeting_related(&self, raw: &RawError, context: &ErrorContext) -> bool {
		if self.config.targeting_routes.iter().any(|route| route_matches(route, &context.endpoint)) {
			return true;
		}
		if context.operation.to_ascii_lowercase().contains("target") {
			return true;
		}
		if context.swap_id.is_some() || context.target_swap_id.is_some() {
			return true;
		}
		let message = raw.message().to_ascii_lowercase();
		self.config
			.targeting_keywords
			.iter()
			.any(|keyword| message.contains(&keyword.to_ascii_lowercase()))
	}
}

fn kind_for(raw: &RawError, targeting: bool) -> AuthErrorKind {
	match raw {
		RawError::Http(http) => kind_for_http(http, targeting),
		RawError::Network(_) => AuthErrorKind::NetworkError,
		RawError::Token(token) => match (token.kind, targeting) {
			(_, true) => AuthErrorKind::TargetingTokenValidationFailed,
			(TokenFailureKind::Expired, false) => AuthErrorKind::TokenExpired,
			(TokenFailureKind::Invalid, false) => AuthErrorKind::TokenInvalid,
			(TokenFailureKind::Missing, false) => AuthErrorKind::TokenMissing,
			(TokenFailureKind::ValidationFailed, false) => AuthErrorKind::FalsePositiveAuthFailure,
		},
		RawError::Unknown { .. } => AuthErrorKind::UnknownError,
	}
}

fn kind_for_http(http: &HttpFailure, targeting: bool) -> AuthErrorKind {
	let challenge = http.www_authenticate.as_deref().unwrap_or_default().to_ascii_lowercase();
	let message = http.message.to_ascii_lowercase();
	match http.status {
		401 if targeting => {
			let mentions_token = ["token", "expired", "invalid", "signature"]
				.iter()
				.any(|needle| challenge.contains(needle) || message.contains(needle));
			if mentions_token {
				AuthErrorKind::TargetingTokenValidationFailed
			} else {
				AuthErrorKind::TargetingAuthFailure
			}
		}
		401 => {
			if challenge.contains("insufficient_scope") {
				AuthErrorKind::FalsePositiveAuthFailure
			} else if challenge.contains("expired") || message.contains("expired") {
				AuthErrorKind::TokenExpired
			} else if challenge.contains("invalid") || message.contains("invalid") {
				AuthErrorKind::TokenInvalid
			} else {
				AuthErrorKind::TokenMissing
			}
		}
		403 if targeting => AuthErrorKind::TargetingPermissionDenied,
		403 => AuthErrorKind::CrossUserAccessDenied,
		429 => AuthErrorKind::RateLimitExceeded,
		408 => AuthErrorKind::NetworkError,
		500..=599 => AuthErrorKind::ServerError,
		_ => AuthErrorKind::UnknownError,
	}
}

fn route_matches(pattern: &str, endpoint: &str) -> bool {
	let path = endpoint.split(['?', '#']).next().unwrap_or_default();
	let mut endpoint_segments = path.split('/').filter(|s| !s.is_empty());
	pattern.split('/').filter(|s| !s.is_empty()).all(|expected| match endpoint_segments.next() {
		Some(actual) if expected.starts_with('{') && expected.ends_with('}') => !actual.is_empty(),
		Some(actual) => actual.eq_ignore_ascii_case(expected),
		None => false,
	})
}
