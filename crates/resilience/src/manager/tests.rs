use std::sync::Arc;
use std::time::Duration;

use swapline_notify::{ConsoleChannel, DeliveryCascade, Level, NotificationCenter, QueueChannel};

use super::*;
use crate::recovery::RecoveryAction;

fn auth_error() -> ConnectionError {
	ConnectionError::new(ErrorCategory::Authentication, "handshake rejected")
}

fn with_limit(max: u32) -> ConnectionResilienceManager {
	ConnectionResilienceManager::new(
		ResilienceConfig {
			max_reconnection_attempts: max,
			..ResilienceConfig::default()
		},
		DeliveryCascade::console_only(),
	)
}

#[test]
fn tenth_attempt_declares_max_attempts_failure() {
	let manager = with_limit(10);
	for _ in 0..9 {
		assert!(!manager.track_reconnection_attempt(None));
	}
	assert!(!manager.is_in_permanent_failure());
	assert_eq!(manager.state(), ConnectionState::Reconnecting);

	assert!(manager.track_reconnection_attempt(None));
	assert!(manager.is_in_permanent_failure());
	let failure = manager.permanent_failure().unwrap();
	assert_eq!(failure.reason, FailureReason::MaxReconnectionAttempts);
	assert_eq!(failure.attempt_count, 10);
	assert_eq!(manager.state(), ConnectionState::PermanentlyFailed);
}

#[test]
fn attempts_after_failure_are_not_counted() {
	let manager = with_limit(2);
	manager.track_reconnection_attempt(None);
	manager.track_reconnection_attempt(None);
	assert!(manager.track_reconnection_attempt(None));
	assert_eq!(manager.attempt_count(), 2);
	assert!(!manager.can_attempt_reconnection());
}

#[test]
fn mark_connected_clears_attempts() {
	let manager = with_limit(5);
	manager.track_reconnection_attempt(Some(ConnectionError::from_close_code(1006, "abnormal")));
	manager.track_reconnection_attempt(None);
	manager.mark_connected();
	assert_eq!(manager.attempt_count(), 0);
	assert_eq!(manager.state(), ConnectionState::Connected);
	assert!(manager.can_attempt_reconnection());
	assert_eq!(manager.health().recent_errors, 1);
}

#[test]
fn three_auth_errors_escalate_two_do_not() {
	let manager = ConnectionResilienceManager::default();
	assert!(!manager.should_trigger_permanent_failure(auth_error()));
	assert!(!manager.should_trigger_permanent_failure(auth_error()));
	assert!(!manager.is_in_permanent_failure());

	assert!(manager.should_trigger_permanent_failure(auth_error()));
	assert_eq!(manager.permanent_failure().map(|f| f.reason), Some(FailureReason::AuthenticationFailure));
}

#[tokio::test(start_paused = true)]
async fn auth_errors_outside_the_window_do_not_escalate() {
	let manager = ConnectionResilienceManager::default();
	manager.should_trigger_permanent_failure(auth_error());
	tokio::time::advance(Duration::from_secs(31)).await;
	manager.should_trigger_permanent_failure(auth_error());
	tokio::time::advance(Duration::from_secs(31)).await;
	assert!(!manager.should_trigger_permanent_failure(auth_error()));
	assert!(!manager.is_in_permanent_failure());

	tokio::time::advance(Duration::from_secs(1)).await;
	assert!(manager.should_trigger_permanent_failure(auth_error()));
}

#[tokio::test(start_paused = true)]
async fn categories_use_independent_thresholds() {
	let manager = ConnectionResilienceManager::default();
	for _ in 0..4 {
		assert!(!manager.should_trigger_permanent_failure(ConnectionError::new(ErrorCategory::Server, "502")));
		tokio::time::advance(Duration::from_secs(60)).await;
	}
	for _ in 0..3 {
		assert!(!manager.should_trigger_permanent_failure(ConnectionError::new(ErrorCategory::Network, "reset")));
	}
	assert!(!manager.should_trigger_permanent_failure(auth_error()));
	assert!(!manager.is_in_permanent_failure());

	assert!(manager.should_trigger_permanent_failure(ConnectionError::new(ErrorCategory::Server, "503")));
	assert_eq!(manager.permanent_failure().map(|f| f.reason), Some(FailureReason::ServerUnavailable));
}

#[test]
fn four_network_errors_escalate() {
	let manager = ConnectionResilienceManager::default();
	for _ in 0..3 {
		assert!(!manager.should_trigger_permanent_failure(ConnectionError::new(ErrorCategory::Network, "offline")));
	}
	assert!(manager.should_trigger_permanent_failure(ConnectionError::new(ErrorCategory::Network, "offline")));
	assert_eq!(manager.permanent_failure().map(|f| f.reason), Some(FailureReason::NetworkUnavailable));
}

#[test]
fn configuration_errors_escalate_immediately() {
	let manager = ConnectionResilienceManager::default();
	assert!(manager.should_trigger_permanent_failure(ConnectionError::from_close_code(1002, "protocol error")));
	assert_eq!(manager.permanent_failure().map(|f| f.reason), Some(FailureReason::ConfigurationError));
}

#[test]
fn other_errors_never_escalate() {
	let manager = ConnectionResilienceManager::default();
	for _ in 0..20 {
		assert!(!manager.should_trigger_permanent_failure(ConnectionError::new(ErrorCategory::Other, "odd")));
	}
	assert_eq!(manager.health().recent_errors, 20);
}

#[test]
fn history_is_bounded() {
	let manager = ConnectionResilienceManager::new(
		ResilienceConfig {
			history_limit: 3,
			..ResilienceConfig::default()
		},
		DeliveryCascade::console_only(),
	);
	for i in 0..10 {
		manager.should_trigger_permanent_failure(ConnectionError::new(ErrorCategory::Other, format!("e{i}")));
	}
	let health = manager.health();
	assert_eq!(health.recent_errors, 3);
	assert_eq!(health.last_error.as_deref(), Some("Other: e9"));
}

#[test]
fn fast_paths_fail_without_attempts() {
	let cases: [(fn(&ConnectionResilienceManager), FailureReason); 5] = [
		(|m| m.handle_authentication_failure(None), FailureReason::AuthenticationFailure),
		(|m| m.handle_server_unavailable(None), FailureReason::ServerUnavailable),
		(|m| m.handle_network_unavailable(None), FailureReason::NetworkUnavailable),
		(|m| m.handle_configuration_error(None), FailureReason::ConfigurationError),
		(|m| m.handle_user_requested(), FailureReason::UserRequested),
	];
	for (trigger, reason) in cases {
		let manager = ConnectionResilienceManager::default();
		trigger(&manager);
		let failure = manager.permanent_failure().unwrap();
		assert_eq!(failure.reason, reason);
		assert_eq!(failure.attempt_count, 0);
	}
}

#[test]
fn first_failure_wins_until_reset() {
	let manager = ConnectionResilienceManager::default();
	manager.handle_network_unavailable(None);
	manager.handle_authentication_failure(Some(auth_error()));
	assert_eq!(manager.permanent_failure().map(|f| f.reason), Some(FailureReason::NetworkUnavailable));

	manager.reset();
	assert!(!manager.is_in_permanent_failure());
	assert_eq!(manager.state(), ConnectionState::Connected);
	assert_eq!(manager.health().recent_errors, 0);

	manager.handle_authentication_failure(None);
	assert_eq!(manager.permanent_failure().map(|f| f.reason), Some(FailureReason::AuthenticationFailure));
}

#[test]
fn failure_broadcasts_stop_reconnection() {
	let manager = ConnectionResilienceManager::default();
	let mut signals = manager.subscribe();
	manager.handle_server_unavailable(None);
	assert_eq!(
		signals.try_recv().ok(),
		Some(ConnectionSignal::StopReconnection {
			reason: FailureReason::ServerUnavailable
		})
	);
}

#[test]
fn failure_is_delivered_through_the_cascade() {
	let modal = Arc::new(NotificationCenter::new());
	let cascade = DeliveryCascade::new(vec![Box::new(QueueChannel::new("modal", modal.clone())), Box::new(ConsoleChannel)]);
	let manager = ConnectionResilienceManager::new(ResilienceConfig::default(), cascade);

	manager.handle_authentication_failure(Some(auth_error()));

	let delivered = modal.take_pending();
	assert_eq!(delivered.len(), 1);
	assert_eq!(delivered[0].level, Level::Error);
	assert!(delivered[0].blocking);
	assert_eq!(delivered[0].actions.first().map(|a| a.id.as_str()), Some("reauthenticate"));
	assert_eq!(delivered[0].actions.last().map(|a| a.id.as_str()), Some("refresh"));
}

#[test]
fn reconnect_recovery_resets_and_signals_retry() {
	let manager = with_limit(1);
	manager.track_reconnection_attempt(None);
	let mut signals = manager.subscribe();

	assert_eq!(manager.execute_recovery("reconnect"), Ok(RecoveryAction::Reconnect));
	assert!(!manager.is_in_permanent_failure());
	assert_eq!(signals.try_recv().ok(), Some(ConnectionSignal::Reset));
	assert_eq!(signals.try_recv().ok(), Some(ConnectionSignal::RetryConnection));
}

#[test]
fn offline_recovery_keeps_the_failure() {
	let manager = ConnectionResilienceManager::default();
	manager.handle_network_unavailable(None);
	let mut signals = manager.subscribe();

	assert_eq!(manager.execute_recovery("offline"), Ok(RecoveryAction::OfflineMode));
	assert!(manager.is_in_permanent_failure());
	assert_eq!(signals.try_recv().ok(), Some(ConnectionSignal::EnterOfflineMode));
}

#[test]
fn recovery_requires_a_matching_option() {
	let manager = ConnectionResilienceManager::default();
	assert_eq!(manager.execute_recovery("reconnect"), Err(RecoveryError::NoActiveFailure));

	manager.handle_configuration_error(None);
	assert_eq!(manager.execute_recovery("offline"), Err(RecoveryError::UnknownOption("offline".into())));
	assert_eq!(manager.execute_recovery("refresh"), Ok(RecoveryAction::RefreshPage));
}

#[test]
fn technical_details_name_reason_and_last_error() {
	let manager = with_limit(1);
	manager.track_reconnection_attempt(Some(ConnectionError::from_close_code(1011, "internal error")));
	let failure = manager.permanent_failure().unwrap();
	assert!(failure.technical_details.contains("MAX_RECONNECTION_ATTEMPTS"));
	assert!(failure.technical_details.contains("attempts=1/1"));
	assert!(failure.technical_details.contains("[1011]"));
	assert_eq!(failure.error_history.len(), 1);
	assert_eq!(failure.primary_option().map(|o| o.action), Some(RecoveryAction::Reconnect));
}

#[tokio::test(start_paused = true)]
async fn health_reports_time_since_failure() {
	let manager = ConnectionResilienceManager::default();
	assert_eq!(manager.health().failed_for, None);

	manager.handle_server_unavailable(None);
	tokio::time::advance(Duration::from_secs(45)).await;

	let health = manager.health();
	assert_eq!(health.state, ConnectionState::PermanentlyFailed);
	assert_eq!(health.failed_for, Some(Duration::from_secs(45)));

	manager.reset();
	assert_eq!(manager.health().failed_for, None);
}
