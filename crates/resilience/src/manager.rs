use std::collections::VecDeque;
use std::time::Duration;

use parking_lot::Mutex;
use swapline_notify::DeliveryCascade;
use tokio::sync::broadcast;
use tokio::time::Instant;

use crate::config::{BurstThreshold, ResilienceConfig};
use crate::error::{ConnectionError, ErrorCategory};
use crate::failure::{FailureReason, PermanentFailure};
use crate::recovery::{RecoveryAction, RecoveryError};
use crate::signal::{ConnectionHealth, ConnectionSignal, ConnectionState};

#[cfg(test)]
mod tests;

struct Inner {
	state: ConnectionState,
	attempts: u32,
	history: VecDeque<ConnectionError>,
	failure: Option<PermanentFailure>,
}

impl Inner {
	fn new() -> Self {
		Self {
			state: ConnectionState::Connected,
			attempts: 0,
			history: VecDeque::new(),
			failure: None,
		}
	}

	fn remember(&mut self, error: ConnectionError, limit: usize) {
		self.history.push_back(error);
		while self.history.len() > limit.max(1) {
			self.history.pop_front();
		}
	}

	fn burst_count(&self, category: ErrorCategory, window: Duration, now: Instant) -> usize {
		self.history
			.iter()
			.filter(|e| e.category == category && now.saturating_duration_since(e.observed_at) <= window)
			.count()
	}
}

/// Decides when the realtime connection is beyond automatic recovery.
///
/// One instance per running client, shared by the transport (which reports
/// failures and listens for [`ConnectionSignal`]s) and the targeting
/// coordinator (which checks [`Self::is_in_permanent_failure`] before each
/// scheduled retry).
pub struct ConnectionResilienceManager {
	config: ResilienceConfig,
	inner: Mutex<Inner>,
	signals: broadcast::Sender<ConnectionSignal>,
	cascade: DeliveryCascade,
}

impl Default for ConnectionResilienceManager {
	fn default() -> Self {
		Self::new(ResilienceConfig::default(), DeliveryCascade::console_only())
	}
}

impl ConnectionResilienceManager {
	pub fn new(config: ResilienceConfig, cascade: DeliveryCascade) -> Self {
		let (signals, _) = broadcast::channel(config.signal_buffer.max(1));
		Self {
			config,
			inner: Mutex::new(Inner::new()),
			signals,
			cascade,
		}
	}

	pub fn config(&self) -> &ResilienceConfig {
		&self.config
	}

	/// Subscribes to connection signals.
	pub fn subscribe(&self) -> broadcast::Receiver<ConnectionSignal> {
		self.signals.subscribe()
	}

	pub fn state(&self) -> ConnectionState {
		self.inner.lock().state
	}

	pub fn attempt_count(&self) -> u32 {
		self.inner.lock().attempts
	}

	pub fn is_in_permanent_failure(&self) -> bool {
		self.inner.lock().failure.is_some()
	}

	pub fn permanent_failure(&self) -> Option<PermanentFailure> {
		self.inner.lock().failure.clone()
	}

	/// Whether the transport may schedule another connection attempt.
	pub fn can_attempt_reconnection(&self) -> bool {
		let inner = self.inner.lock();
		inner.failure.is_none() && inner.attempts < self.config.max_reconnection_attempts
	}

	pub fn health(&self) -> ConnectionHealth {
		let inner = self.inner.lock();
		ConnectionHealth {
			state: inner.state,
			attempts: inner.attempts,
			max_attempts: self.config.max_reconnection_attempts,
			recent_errors: inner.history.len(),
			last_error: inner.history.back().map(ToString::to_string),
			failure_reason: inner.failure.as_ref().map(|f| f.reason),
			failed_for: inner.failure.as_ref().map(|f| f.declared_at.elapsed()),
		}
	}

	/// Records one reconnection attempt, optionally with the error that caused it.
	///
	/// Returns `true` when the connection is (now) permanently failed. Attempts
	/// reported after the failure was declared are ignored.
	pub fn track_reconnection_attempt(&self, error: Option<ConnectionError>) -> bool {
		let declared = {
			let mut inner = self.inner.lock();
			if inner.failure.is_some() {
				tracing::debug!("resilience.attempt_ignored");
				return true;
			}
			inner.attempts = inner.attempts.saturating_add(1);
			inner.state = ConnectionState::Reconnecting;
			if let Some(error) = error {
				inner.remember(error, self.config.history_limit);
			}
			tracing::debug!(attempt = inner.attempts, max = self.config.max_reconnection_attempts, "resilience.attempt");
			if inner.attempts >= self.config.max_reconnection_attempts {
				self.declare(&mut inner, FailureReason::MaxReconnectionAttempts)
			} else {
				None
			}
		};
		match declared {
			Some(failure) => {
				self.announce(&failure);
				true
			}
			None => false,
		}
	}

	/// A (re)connection succeeded; clears the attempt counter.
	pub fn mark_connected(&self) {
		let mut inner = self.inner.lock();
		if inner.failure.is_some() {
			tracing::warn!("resilience.connected_while_failed");
			return;
		}
		inner.attempts = 0;
		inner.state = ConnectionState::Connected;
	}

	pub fn handle_authentication_failure(&self, error: Option<ConnectionError>) {
		self.fail_fast(FailureReason::AuthenticationFailure, error);
	}

	pub fn handle_server_unavailable(&self, error: Option<ConnectionError>) {
		self.fail_fast(FailureReason::ServerUnavailable, error);
	}

	pub fn handle_network_unavailable(&self, error: Option<ConnectionError>) {
		self.fail_fast(FailureReason::NetworkUnavailable, error);
	}

	pub fn handle_configuration_error(&self, error: Option<ConnectionError>) {
		self.fail_fast(FailureReason::ConfigurationError, error);
	}

	pub fn handle_user_requested(&self) {
		self.fail_fast(FailureReason::UserRequested, None);
	}

	/// Records `error` and reports whether it completes a failure burst.
	///
	/// A single error is weak evidence; only a burst within the category's
	/// window (or a configuration error, which retrying never fixes)
	/// escalates. Escalation declares the permanent failure immediately.
	pub fn should_trigger_permanent_failure(&self, error: ConnectionError) -> bool {
		let category = error.category;
		let declared = {
			let mut inner = self.inner.lock();
			if inner.failure.is_some() {
				return true;
			}
			let now = error.observed_at.max(Instant::now());
			inner.remember(error, self.config.history_limit);

			let reason = match category {
				ErrorCategory::Configuration => Some(FailureReason::ConfigurationError),
				ErrorCategory::Authentication => self.burst(&inner, category, self.config.auth_burst, now, FailureReason::AuthenticationFailure),
				ErrorCategory::Server => self.burst(&inner, category, self.config.server_burst, now, FailureReason::ServerUnavailable),
				ErrorCategory::Network => self.burst(&inner, category, self.config.network_burst, now, FailureReason::NetworkUnavailable),
				ErrorCategory::Other => None,
			};
			reason.and_then(|reason| self.declare(&mut inner, reason))
		};
		match declared {
			Some(failure) => {
				self.announce(&failure);
				true
			}
			None => false,
		}
	}

	/// Clears any failure and returns to the initial state.
	pub fn reset(&self) {
		{
			let mut inner = self.inner.lock();
			*inner = Inner::new();
		}
		tracing::info!("resilience.reset");
		let _ = self.signals.send(ConnectionSignal::Reset);
	}

	/// Runs the recovery option `option_id` of the active failure.
	pub fn execute_recovery(&self, option_id: &str) -> Result<RecoveryAction, RecoveryError> {
		let action = {
			let inner = self.inner.lock();
			let failure = inner.failure.as_ref().ok_or(RecoveryError::NoActiveFailure)?;
			failure
				.recovery_options
				.iter()
				.find(|o| o.id == option_id)
				.map(|o| o.action)
				.ok_or_else(|| RecoveryError::UnknownOption(option_id.to_owned()))?
		};

		tracing::info!(option = option_id, ?action, "resilience.recovery");
		let signal = match action {
			RecoveryAction::Reconnect => {
				self.reset();
				ConnectionSignal::RetryConnection
			}
			RecoveryAction::Reauthenticate => ConnectionSignal::Reauthenticate,
			RecoveryAction::OfflineMode => ConnectionSignal::EnterOfflineMode,
			RecoveryAction::ContactSupport => ConnectionSignal::ContactSupport,
			RecoveryAction::CheckConfiguration => ConnectionSignal::CheckConfiguration,
			RecoveryAction::RefreshPage => ConnectionSignal::RefreshPage,
		};
		let _ = self.signals.send(signal);
		Ok(action)
	}

	fn burst(&self, inner: &Inner, category: ErrorCategory, threshold: BurstThreshold, now: Instant, reason: FailureReason) -> Option<FailureReason> {
		let count = inner.burst_count(category, threshold.window, now);
		tracing::trace!(?category, count, threshold = threshold.count, "resilience.burst_check");
		(count >= threshold.count).then_some(reason)
	}

	fn fail_fast(&self, reason: FailureReason, error: Option<ConnectionError>) {
		let declared = {
			let mut inner = self.inner.lock();
			if let Some(error) = error {
				inner.remember(error, self.config.history_limit);
			}
			self.declare(&mut inner, reason)
		};
		if let Some(failure) = declared {
			self.announce(&failure);
		}
	}

	/// Transitions to permanent failure. `None` when already failed.
	fn declare(&self, inner: &mut Inner, reason: FailureReason) -> Option<PermanentFailure> {
		if inner.failure.is_some() {
			return None;
		}
		let failure = PermanentFailure::new(reason, inner.history.iter().cloned().collect(), inner.attempts, self.config.max_reconnection_attempts);
		inner.state = ConnectionState::PermanentlyFailed;
		inner.failure = Some(failure.clone());
		Some(failure)
	}

	fn announce(&self, failure: &PermanentFailure) {
		tracing::warn!(
			reason = failure.reason.as_str(),
			attempts = failure.attempt_count,
			details = %failure.technical_details,
			"resilience.permanent_failure"
		);
		let _ = self.signals.send(ConnectionSignal::StopReconnection { reason: failure.reason });
		if let Err(error) = self.cascade.deliver(&failure.to_notification()) {
			tracing::error!(%error, "resilience.notify_failed");
		}
	}
}
