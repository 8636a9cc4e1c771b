//! Transport-boundary error input.

use std::time::Duration;

/// Raw failure reported by the transport, before classification.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RawError {
	/// The server answered with a non-success status.
	#[error("HTTP {}: {}", .0.status, .0.message)]
	Http(HttpFailure),
	/// The request never produced a response.
	#[error("network failure ({:?}): {}", .0.kind, .0.message)]
	Network(NetworkFailure),
	/// Local or server-side token validation rejected the credentials.
	#[error("token failure ({:?}): {}", .0.kind, .0.message)]
	Token(TokenFailure),
	/// Anything the transport could not describe more precisely.
	#[error("{message}")]
	Unknown {
		/// Free-form description.
		message: String,
	},
}

/// HTTP response failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpFailure {
	/// Response status code.
	pub status: u16,
	/// Response body message, if any.
	pub message: String,
	/// Value of the `WWW-Authenticate` challenge header.
	pub www_authenticate: Option<String>,
	/// Server-provided `Retry-After` hint.
	pub retry_after: Option<Duration>,
}

/// Network-level failure classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NetworkErrorKind {
	Timeout,
	ConnectionRefused,
	ConnectionReset,
	DnsFailure,
	Offline,
	Other,
}

/// Failure to reach the server at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkFailure {
	pub kind: NetworkErrorKind,
	pub message: String,
}

/// Token validation failure classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenFailureKind {
	Expired,
	Invalid,
	Missing,
	/// Validation could not complete (signature service down, clock skew, ...).
	ValidationFailed,
}

/// Token validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenFailure {
	pub kind: TokenFailureKind,
	pub message: String,
}

impl RawError {
	/// HTTP failure without challenge or retry hints.
	pub fn http(status: u16, message: impl Into<String>) -> Self {
		Self::Http(HttpFailure {
			status,
			message: message.into(),
			www_authenticate: None,
			retry_after: None,
		})
	}

	/// HTTP 401 carrying a `WWW-Authenticate` challenge.
	pub fn unauthorized(message: impl Into<String>, challenge: impl Into<String>) -> Self {
		Self::Http(HttpFailure {
			status: 401,
			message: message.into(),
			www_authenticate: Some(challenge.into()),
			retry_after: None,
		})
	}

	/// HTTP 429 with an optional `Retry-After` hint.
	pub fn rate_limited(message: impl Into<String>, retry_after: Option<Duration>) -> Self {
		Self::Http(HttpFailure {
			status: 429,
			message: message.into(),
			www_authenticate: None,
			retry_after,
		})
	}

	pub fn network(kind: NetworkErrorKind, message: impl Into<String>) -> Self {
		Self::Network(NetworkFailure { kind, message: message.into() })
	}

	pub fn token(kind: TokenFailureKind, message: impl Into<String>) -> Self {
		Self::Token(TokenFailure { kind, message: message.into() })
	}

	pub fn unknown(message: impl Into<String>) -> Self {
		Self::Unknown { message: message.into() }
	}

	/// Human-readable message carried by the failure.
	pub fn message(&self) -> &str {
		match self {
			Self::Http(http) => &http.message,
			Self::Network(net) => &net.message,
			Self::Token(token) => &token.message,
			Self::Unknown { message } => message,
		}
	}

	/// HTTP status, when the failure came from a response.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Http(http) => Some(http.status),
			_ => None,
		}
	}
}
