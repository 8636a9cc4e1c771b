use std::time::Duration;

use pretty_assertions::assert_eq;
use swapline_primitives::SwapId;

use super::*;
use crate::raw::{NetworkErrorKind, TokenFailureKind};
use crate::stats::ClassificationStats;

fn profile_ctx() -> ErrorContext {
	ErrorContext::new("/api/users/me", "load_profile")
}

fn targeting_ctx() -> ErrorContext {
	ErrorContext::new("/api/swaps/swap-1/target", "create_target").swap(SwapId::new("swap-1"))
}

#[test]
fn route_patterns_match_placeholders_and_prefixes() {
	assert!(route_matches("/api/swaps/{id}/target", "/api/swaps/abc/target"));
	assert!(route_matches("/api/swaps/{id}/target", "/api/swaps/abc/target/accept?x=1"));
	assert!(route_matches("/api/targeting", "/api/targeting/history"));
	assert!(!route_matches("/api/swaps/{id}/target", "/api/swaps/abc"));
	assert!(!route_matches("/api/swaps/{id}/target", "/api/swaps/abc/browse"));
}

#[test]
fn targeting_detection_uses_every_signal() {
	let classifier = ErrorClassifier::default();
	let plain = RawError::http(500, "boom");

	assert!(classifier.is_targeting_related(&plain, &ErrorContext::new("/api/targeting/list", "list")));
	assert!(classifier.is_targeting_related(&plain, &ErrorContext::new("/api/other", "retargetSwap")));
	assert!(classifier.is_targeting_related(&plain, &profile_ctx().target_swap(SwapId::new("s"))));
	assert!(classifier.is_targeting_related(&RawError::http(403, "Cross-user swap access denied"), &profile_ctx()));
	assert!(!classifier.is_targeting_related(&plain, &profile_ctx()));
}

#[test]
fn targeting_401_never_maps_to_session_kinds() {
	let classifier = ErrorClassifier::default();

	let c = classifier.classify(&RawError::unauthorized("nope", "Bearer error=\"invalid_token\", token expired"), &targeting_ctx());
	assert_eq!(c.kind(), AuthErrorKind::TargetingTokenValidationFailed);
	assert!(!c.should_trigger_logout);
	assert!(c.should_retry);

	let c = classifier.classify(&RawError::http(401, "denied"), &targeting_ctx());
	assert_eq!(c.kind(), AuthErrorKind::TargetingAuthFailure);
	assert!(!c.should_trigger_logout);
	assert!(c.user_message.ends_with("Your main session is unaffected."));
}

#[test]
fn non_targeting_401_reads_the_challenge() {
	let classifier = ErrorClassifier::default();
	let ctx = profile_ctx();

	let expired = classifier.classify(&RawError::unauthorized("", "Bearer error=\"invalid_token\", error_description=\"expired\""), &ctx);
	assert_eq!(expired.kind(), AuthErrorKind::TokenExpired);
	assert!(expired.should_trigger_logout);

	let invalid = classifier.classify(&RawError::unauthorized("", "Bearer error=\"invalid_token\""), &ctx);
	assert_eq!(invalid.kind(), AuthErrorKind::TokenInvalid);
	assert!(invalid.should_trigger_logout);

	let missing = classifier.classify(&RawError::http(401, "unauthorized"), &ctx);
	assert_eq!(missing.kind(), AuthErrorKind::TokenMissing);
	assert!(missing.should_trigger_logout);
	assert!(!missing.should_retry);

	let scope = classifier.classify(&RawError::unauthorized("", "Bearer error=\"insufficient_scope\""), &ctx);
	assert_eq!(scope.kind(), AuthErrorKind::FalsePositiveAuthFailure);
	assert!(!scope.should_trigger_logout);
	assert!(scope.should_retry);
}

#[test]
fn forbidden_splits_on_targeting() {
	let classifier = ErrorClassifier::default();
	assert_eq!(classifier.classify(&RawError::http(403, "no"), &targeting_ctx()).kind(), AuthErrorKind::TargetingPermissionDenied);
	assert_eq!(classifier.classify(&RawError::http(403, "no"), &profile_ctx()).kind(), AuthErrorKind::CrossUserAccessDenied);
}

#[test]
fn transient_kinds_are_retryable_with_their_schedules() {
	let classifier = ErrorClassifier::default();
	let ctx = profile_ctx();

	let net = classifier.classify(&RawError::network(NetworkErrorKind::Timeout, "timed out"), &ctx);
	assert_eq!(net.kind(), AuthErrorKind::NetworkError);
	assert_eq!(net.retry_strategy.map(|s| s.max_attempts), Some(5));
	assert_eq!(net.error.retry_delay(), Some(Duration::from_secs(1)));

	let server = classifier.classify(&RawError::http(503, "unavailable"), &ctx.clone().retry(1));
	assert_eq!(server.kind(), AuthErrorKind::ServerError);
	assert_eq!(server.error.retry_delay(), Some(Duration::from_secs(4)));

	let limited = classifier.classify(&RawError::rate_limited("slow down", None), &ctx);
	assert_eq!(limited.kind(), AuthErrorKind::RateLimitExceeded);
	assert_eq!(limited.error.retry_delay(), Some(Duration::from_secs(5)));
}

#[test]
fn retry_after_hint_replaces_base_delay() {
	let classifier = ErrorClassifier::default();
	let c = classifier.classify(&RawError::rate_limited("slow down", Some(Duration::from_secs(9))), &profile_ctx());
	assert_eq!(c.retry_strategy.map(|s| s.delay_for_attempt(1)), Some(Duration::from_secs(9)));
	assert_eq!(c.retry_strategy.map(|s| s.max_attempts), Some(2));
}

#[test]
fn token_failures_respect_targeting() {
	let classifier = ErrorClassifier::default();
	let expired = RawError::token(TokenFailureKind::Expired, "jwt expired");

	let plain = classifier.classify(&expired, &profile_ctx());
	assert_eq!(plain.kind(), AuthErrorKind::TokenExpired);
	assert!(plain.should_trigger_logout);

	let scoped = classifier.classify(&expired, &targeting_ctx());
	assert_eq!(scoped.kind(), AuthErrorKind::TargetingTokenValidationFailed);
	assert!(!scoped.should_trigger_logout);

	let validation = classifier.classify(&RawError::token(TokenFailureKind::ValidationFailed, "jwks unreachable"), &profile_ctx());
	assert_eq!(validation.kind(), AuthErrorKind::FalsePositiveAuthFailure);
	assert!(!validation.should_trigger_logout);
}

#[test]
fn unknown_input_is_conservative() {
	let classifier = ErrorClassifier::default();
	for raw in [RawError::unknown("???"), RawError::http(418, "teapot"), RawError::http(404, "gone")] {
		let c = classifier.classify(&raw, &profile_ctx());
		assert_eq!(c.kind(), AuthErrorKind::UnknownError);
		assert!(!c.should_trigger_logout);
		assert!(!c.should_retry);
		assert_eq!(c.retry_strategy, None);
	}
}

#[test]
fn technical_message_carries_call_site() {
	let classifier = ErrorClassifier::default();
	let ctx = targeting_ctx().retry(2);
	let c = classifier.classify(&RawError::http(502, "bad gateway"), &ctx);
	assert!(c.technical_message.contains("create_target"));
	assert!(c.technical_message.contains("/api/swaps/swap-1/target"));
	assert!(c.technical_message.contains("retry 2"));
	assert!(c.error.context().is_retry);
}

#[test]
fn stats_count_suppressed_logouts() {
	let classifier = ErrorClassifier::default();
	let mut stats = ClassificationStats::default();

	stats.record(&classifier.classify(&RawError::http(401, "denied"), &targeting_ctx()));
	stats.record(&classifier.classify(&RawError::http(401, "denied"), &profile_ctx()));
	stats.record(&classifier.classify(&RawError::http(500, "boom"), &profile_ctx()));

	assert_eq!(stats.total(), 3);
	assert_eq!(stats.targeting_related(), 1);
	assert_eq!(stats.logouts_triggered(), 1);
	assert_eq!(stats.logouts_suppressed(), 1);
	assert_eq!(stats.count(AuthErrorKind::ServerError), 1);
}
