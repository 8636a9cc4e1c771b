use proptest::prelude::*;
use swapline_auth::{AuthErrorKind, ErrorClassifier, ErrorContext, NetworkErrorKind, RawError, TokenFailureKind};
use swapline_primitives::SwapId;

fn raw_error() -> impl Strategy<Value = RawError> {
	let challenge = prop_oneof![
		Just(None),
		Just(Some("Bearer error=\"invalid_token\"".to_owned())),
		Just(Some("Bearer error=\"invalid_token\", error_description=\"expired\"".to_owned())),
		Just(Some("Bearer error=\"insufficient_scope\"".to_owned())),
	];
	let http = (100u16..600, "[a-z ]{0,24}", challenge).prop_map(|(status, message, www_authenticate)| {
		RawError::Http(swapline_auth::HttpFailure {
			status,
			message,
			www_authenticate,
			retry_after: None,
		})
	});
	let token = prop_oneof![
		Just(TokenFailureKind::Expired),
		Just(TokenFailureKind::Invalid),
		Just(TokenFailureKind::Missing),
		Just(TokenFailureKind::ValidationFailed),
	]
	.prop_map(|kind| RawError::token(kind, "token rejected"));
	let network = Just(RawError::network(NetworkErrorKind::ConnectionReset, "reset"));
	prop_oneof![http, token, network, "[a-z]{0,12}".prop_map(|message: String| RawError::unknown(message))]
}

fn targeting_context() -> impl Strategy<Value = ErrorContext> {
	prop_oneof![
		Just(ErrorContext::new("/api/targeting/create", "submit")),
		Just(ErrorContext::new("/api/swaps/s-1/target", "submit")),
		Just(ErrorContext::new("/api/misc", "retarget")),
		Just(ErrorContext::new("/api/misc", "submit").swap(SwapId::new("s-1"))),
		Just(ErrorContext::new("/api/misc", "submit").target_swap(SwapId::new("s-2"))),
	]
}

proptest! {
	#[test]
	fn targeting_calls_never_log_out(raw in raw_error(), ctx in targeting_context(), retry in 0u32..4) {
		let classifier = ErrorClassifier::default();
		let c = classifier.classify(&raw, &ctx.retry(retry));
		prop_assert!(c.error.is_targeting_related());
		prop_assert!(!c.should_trigger_logout);
		prop_assert!(!c.error.triggers_logout());
		prop_assert!(!c.kind().is_session_kind());
	}

	#[test]
	fn non_targeting_session_kinds_always_log_out(raw in raw_error()) {
		let classifier = ErrorClassifier::default();
		let ctx = ErrorContext::new("/api/users/me", "load_profile");
		let c = classifier.classify(&raw, &ctx);
		if !c.error.is_targeting_related() {
			prop_assert_eq!(c.should_trigger_logout, c.kind().is_session_kind());
		}
	}

	#[test]
	fn unknown_kinds_never_retry_or_log_out(raw in raw_error(), targeting in any::<bool>()) {
		let classifier = ErrorClassifier::default();
		let ctx = if targeting {
			ErrorContext::new("/api/targeting", "submit")
		} else {
			ErrorContext::new("/api/users/me", "load_profile")
		};
		let c = classifier.classify(&raw, &ctx);
		if c.kind() == AuthErrorKind::UnknownError {
			prop_assert!(!c.should_retry);
			prop_assert!(!c.should_trigger_logout);
		}
	}
}
