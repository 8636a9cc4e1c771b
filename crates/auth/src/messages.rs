use crate::kind::AuthErrorKind;

const SESSION_UNAFFECTED: &str = "Your main session is unaffected.";

/// User-facing copy for a classified error.
pub(crate) fn user_message(kind: AuthErrorKind) -> String {
	let base = match kind {
		AuthErrorKind::TokenExpired => return "Your session has expired. Please sign in again.".to_owned(),
		AuthErrorKind::TokenInvalid => return "Your session is no longer valid. Please sign in again.".to_owned(),
		AuthErrorKind::TokenMissing => return "Please sign in to continue.".to_owned(),
		AuthErrorKind::TargetingAuthFailure => "We couldn't verify access for this targeting action.",
		AuthErrorKind::TargetingTokenValidationFailed => "We couldn't validate your credentials for this targeting action.",
		AuthErrorKind::TargetingPermissionDenied => "You don't have permission to target this swap.",
		AuthErrorKind::CrossUserAccessDenied => "You don't have access to this user's swaps.",
		AuthErrorKind::FalsePositiveAuthFailure => "A permission check failed for this request.",
		AuthErrorKind::RateLimitExceeded => "Too many requests. Please wait a moment and try again.",
		AuthErrorKind::ServerError => "The server ran into a problem. Please try again shortly.",
		AuthErrorKind::NetworkError => "Network connection problem. Check your connection and try again.",
		AuthErrorKind::UnknownError => "Something went wrong. Please try again.",
	};
	if kind.is_targeting_kind() || kind == AuthErrorKind::FalsePositiveAuthFailure {
		format!("{base} {SESSION_UNAFFECTED}")
	} else {
		base.to_owned()
	}
}
