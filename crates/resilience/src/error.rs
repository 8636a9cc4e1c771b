use std::fmt;

use swapline_auth::RawError;
use swapline_primitives::Timestamp;
use tokio::time::Instant;

/// Connection error category used for burst detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
	Authentication,
	Server,
	Network,
	/// Misconfiguration; never fixed by retrying.
	Configuration,
	Other,
}

impl ErrorCategory {
	/// Category of a transport error surfaced through the request path.
	pub fn of_raw(raw: &RawError) -> Self {
		match raw {
			RawError::Http(http) => match http.status {
				401 | 403 => Self::Authentication,
				500..=599 => Self::Server,
				408 => Self::Network,
				400 | 404 | 426 => Self::Configuration,
				_ => Self::Other,
			},
			RawError::Network(_) => Self::Network,
			RawError::Token(_) => Self::Authentication,
			RawError::Unknown { .. } => Self::Other,
		}
	}

	/// Category of a WebSocket close code.
	pub const fn of_close_code(code: u16) -> Self {
		match code {
			1008 | 4001 | 4003 => Self::Authentication,
			1011..=1014 => Self::Server,
			1001 | 1005 | 1006 => Self::Network,
			1002 | 1003 | 1007 | 1010 => Self::Configuration,
			_ => Self::Other,
		}
	}
}

/// One connection-level error observed by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionError {
	pub category: ErrorCategory,
	pub message: String,
	/// Close code or HTTP status, when one was reported.
	pub code: Option<u16>,
	pub observed_at: Instant,
	pub timestamp: Timestamp,
}

impl ConnectionError {
	pub fn new(category: ErrorCategory, message: impl Into<String>) -> Self {
		Self {
			category,
			message: message.into(),
			code: None,
			observed_at: Instant::now(),
			timestamp: swapline_primitives::now(),
		}
	}

	pub fn from_close_code(code: u16, reason: impl Into<String>) -> Self {
		Self::new(ErrorCategory::of_close_code(code), reason).with_code(code)
	}

	pub fn from_raw(raw: &RawError) -> Self {
		let error = Self::new(ErrorCategory::of_raw(raw), raw.to_string());
		match raw.status() {
			Some(status) => error.with_code(status),
			None => error,
		}
	}

	#[must_use]
	pub fn with_code(mut self, code: u16) -> Self {
		self.code = Some(code);
		self
	}
}

impl fmt::Display for ConnectionError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self.code {
			Some(code) => write!(f, "{:?} [{code}]: {}", self.category, self.message),
			None => write!(f, "{:?}: {}", self.category, self.message),
		}
	}
}

#[cfg(test)]
mod tests {
	use swapline_auth::NetworkErrorKind;

	use super::*;

	#[test]
	fn raw_errors_map_to_categories() {
		assert_eq!(ErrorCategory::of_raw(&RawError::http(401, "")), ErrorCategory::Authentication);
		assert_eq!(ErrorCategory::of_raw(&RawError::http(503, "")), ErrorCategory::Server);
		assert_eq!(ErrorCategory::of_raw(&RawError::network(NetworkErrorKind::Offline, "")), ErrorCategory::Network);
		assert_eq!(ErrorCategory::of_raw(&RawError::http(404, "")), ErrorCategory::Configuration);
	}

	#[test]
	fn close_codes_map_to_categories() {
		assert_eq!(ConnectionError::from_close_code(4001, "unauthorized").category, ErrorCategory::Authentication);
		assert_eq!(ConnectionError::from_close_code(1006, "abnormal").category, ErrorCategory::Network);
		assert_eq!(ConnectionError::from_close_code(1011, "internal").code, Some(1011));
	}
}
