use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use swapline_auth::{Classification, ClassificationStats, ErrorClassifier, ErrorContext, RawError};
use swapline_cache::{InvalidationReason, ProposalCache, ProposalStatusUpdate};
use swapline_notify::{Notification, NotificationSink, NullSink};
use swapline_primitives::{OperationId, ProposalId, SwapId, TargetingActionKind, Timestamp, UserId};
use swapline_resilience::ConnectionResilienceManager;
use tracing::{debug, info, warn};

use crate::action::ActionSpec;
use crate::config::CoordinatorConfig;
use crate::error::{Result, TargetingError};
use crate::ledger::{RetryKey, RetryLedger};
use crate::model::{EventOrigin, IncomingTarget, OutgoingTarget, TargetingEvent, TargetingPushEvent, TargetingReceipt};
use crate::mutation::{StoreMutation, StoreSlot, StoreSnapshot, apply_all};
use crate::remote::{RemoteInvoker, RemoteRequest};
use crate::session::{NullSessionGuard, SessionGuard};
use crate::store::TargetingStore;


/// Undo record for one speculative mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptimisticUpdate {
	pub id: OperationId,
	pub kind: TargetingActionKind,
	pub swap_id: SwapId,
	/// Placeholder id for create/retarget, otherwise the proposal acted on.
	pub target_id: Option<ProposalId>,
	pub original_state: StoreSnapshot,
	/// Derived from `original_state` before the forward mutations ran.
	pub inverse: Vec<StoreMutation>,
	pub timestamp: Timestamp,
}

/// Coordinator counters since construction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoordinatorStats {
	/// Logical operations admitted.
	pub started: u64,
	pub confirmed: u64,
	/// Speculative mutations undone, one per failed attempt.
	pub rolled_back: u64,
	pub retries: u64,
	pub failed: u64,
	/// Operations stopped by a permanent connection failure.
	pub aborted: u64,
	/// Operations refused because the same key was in flight.
	pub refused: u64,
	/// Destructive actions whose prior state was not in the store.
	pub missing_undo: u64,
	pub push_events: u64,
}

#[derive(Default)]
struct State {
	pending: HashMap<OperationId, OptimisticUpdate>,
	ledger: RetryLedger,
	stats: CoordinatorStats,
	classifications: ClassificationStats,
}

/// Runs targeting actions against local state and the remote API.
///
/// Each action is applied speculatively to the [`TargetingStore`], sent
/// through the [`RemoteInvoker`], then either confirmed with the server's
/// answer or rolled back by replaying the inverse recorded before the
/// speculative mutation. Failures are classified with the targeting-aware
/// [`ErrorClassifier`]; retryable ones are retried within a per-operation
/// budget unless the connection has been declared permanently failed.
pub struct TargetingCoordinator {
	config: CoordinatorConfig,
	user_id: Option<UserId>,
	store: Arc<dyn TargetingStore>,
	remote: Arc<dyn RemoteInvoker>,
	classifier: ErrorClassifier,
	cache: ProposalCache,
	resilience: Arc<ConnectionResilienceManager>,
	notifications: Arc<dyn NotificationSink>,
	session: Arc<dyn SessionGuard>,
	state: Mutex<State>,
}

impl TargetingCoordinator {
	pub fn builder(store: Arc<dyn TargetingStore>, remote: Arc<dyn RemoteInvoker>) -> TargetingCoordinatorBuilder {
		TargetingCoordinatorBuilder {
			config: CoordinatorConfig::default(),
			user_id: None,
			store,
			remote,
			classifier: ErrorClassifier::default(),
			cache: ProposalCache::default(),
			resilience: Arc::new(ConnectionResilienceManager::default()),
			notifications: Arc::new(NullSink),
			session: Arc::new(NullSessionGuard),
		}
	}

	pub fn config(&self) -> &CoordinatorConfig {
		&self.config
	}

	pub fn cache(&self) -> &ProposalCache {
		&self.cache
	}

	pub async fn create_targeting_proposal(&self, source_swap_id: SwapId, target_swap_id: SwapId, message: Option<String>) -> Result<TargetingReceipt> {
		self.run(ActionSpec::Create {
			source: source_swap_id,
			target: target_swap_id,
			message,
		})
		.await
	}

	pub async fn accept_targeting_proposal(&self, swap_id: SwapId, proposal_id: ProposalId) -> Result<TargetingReceipt> {
		self.run(ActionSpec::Accept {
			swap: swap_id,
			proposal: proposal_id,
		})
		.await
	}

	pub async fn reject_targeting_proposal(&self, swap_id: SwapId, proposal_id: ProposalId) -> Result<TargetingReceipt> {
		self.run(ActionSpec::Reject {
			swap: swap_id,
			proposal: proposal_id,
		})
		.await
	}

	pub async fn cancel_targeting_proposal(&self, source_swap_id: SwapId) -> Result<TargetingReceipt> {
		self.run(ActionSpec::Cancel { source: source_swap_id }).await
	}

	pub async fn retarget(&self, source_swap_id: SwapId, new_target_swap_id: SwapId) -> Result<TargetingReceipt> {
		self.run(ActionSpec::Retarget {
			source: source_swap_id,
			target: new_target_swap_id,
		})
		.await
	}

	/// Applies a server-pushed status change to the store and the cache.
	///
	/// Returns the store mutations applied. A pending push for a proposal
	/// not yet known locally is recorded as a new incoming proposal unless it
	/// matches this user's outgoing target.
	pub fn handle_push_event(&self, event: &TargetingPushEvent) -> Vec<StoreMutation> {
		let mut mutations = Vec::new();

		let outgoing = self
			.store
			.outgoing_target(&event.source_swap_id)
			.filter(|outgoing| outgoing.proposal_id == event.proposal_id);
		let matched_outgoing = outgoing.is_some();
		if let Some(outgoing) = outgoing {
			mutations.push(if event.status.is_closed() {
				StoreMutation::RemoveOutgoing {
					swap_id: event.source_swap_id.clone(),
				}
			} else {
				StoreMutation::SetOutgoing {
					swap_id: event.source_swap_id.clone(),
					target: OutgoingTarget {
						status: event.status,
						optimistic: false,
						updated_at: swapline_primitives::now(),
						..outgoing
					},
				}
			});
		}

		match self.store.incoming_target(&event.target_swap_id, &event.proposal_id) {
			Some(_) if event.status.is_closed() => mutations.push(StoreMutation::RemoveIncoming {
				swap_id: event.target_swap_id.clone(),
				proposal_id: event.proposal_id.clone(),
			}),
			Some(incoming) => mutations.push(StoreMutation::UpdateIncoming {
				swap_id: event.target_swap_id.clone(),
				target: IncomingTarget {
					status: event.status,
					proposer: event.proposer.clone().or(incoming.proposer.clone()),
					updated_at: swapline_primitives::now(),
					..incoming
				},
			}),
			None if !matched_outgoing && !event.status.is_closed() => mutations.push(StoreMutation::UpdateIncoming {
				swap_id: event.target_swap_id.clone(),
				target: IncomingTarget {
					proposal_id: event.proposal_id.clone(),
					source_swap_id: event.source_swap_id.clone(),
					target_swap_id: event.target_swap_id.clone(),
					proposer: event.proposer.clone(),
					status: event.status,
					updated_at: swapline_primitives::now(),
				},
			}),
			None => {}
		}

		apply_all(self.store.as_ref(), &mutations);
		self.store.add_targeting_event(TargetingEvent {
			proposal_id: event.proposal_id.clone(),
			swap_id: event.source_swap_id.clone(),
			target_swap_id: Some(event.target_swap_id.clone()),
			status: event.status,
			origin: EventOrigin::Push,
			at: swapline_primitives::now(),
		});
		self.cache
			.apply_status_update(&ProposalStatusUpdate::new(event.proposal_id.clone(), event.status.as_str()));
		self.state.lock().stats.push_events += 1;

		debug!(
			proposal = %event.proposal_id,
			status = event.status.as_str(),
			mutations = mutations.len(),
			"targeting.push_applied"
		);
		mutations
	}

	/// Speculative updates currently awaiting their remote call.
	pub fn pending_updates(&self) -> Vec<OptimisticUpdate> {
		let state = self.state.lock();
		let mut pending: Vec<_> = state.pending.values().cloned().collect();
		pending.sort_by_key(|update| update.timestamp);
		pending
	}

	pub fn is_in_flight(&self, key: &RetryKey) -> bool {
		self.state.lock().ledger.get(key).is_some()
	}

	pub fn stats(&self) -> CoordinatorStats {
		self.state.lock().stats
	}

	pub fn classification_stats(&self) -> ClassificationStats {
		self.state.lock().classifications.clone()
	}

	async fn run(&self, spec: ActionSpec) -> Result<TargetingReceipt> {
		let kind = spec.kind();
		let key = spec.retry_key();
		let operation_id = OperationId::generate();
		let _claim = self.claim(&key, &spec.slots(), operation_id)?;
		let notification_id = format!("targeting.{operation_id}");

		let mut retries = 0;
		let mut budget = self.config.max_retries;
		loop {
			if retries > 0
				&& let Some(failure) = self.resilience.permanent_failure()
			{
				self.state.lock().stats.aborted += 1;
				warn!(operation = %operation_id, key = %key, reason = failure.reason.as_str(), "targeting.retry_aborted");
				self.notifications.add_notification(
					Notification::error(notification_id.as_str(), failure.reason.title(), failure.user_message.as_str()),
				);
				return Err(TargetingError::ConnectionFailed {
					kind,
					reason: failure.reason,
				});
			}

			let progress = if retries == 0 {
				kind.progress_label().to_owned()
			} else {
				format!("{} (retry {retries}/{budget})", kind.progress_label())
			};
			self.notifications.add_notification(Notification::progress(notification_id.as_str(), progress));

			if self.config.optimistic_updates {
				self.apply_optimistic(operation_id, &spec);
			}

			let request = spec.request(operation_id, retries);
			let context = self.error_context(&spec, &request);
			debug!(operation = %operation_id, endpoint = %request.endpoint, attempt = retries, "targeting.invoke");

			match self.remote.invoke(request).await {
				Ok(receipt) => {
					self.commit(operation_id, &spec, &receipt, &notification_id);
					return Ok(receipt);
				}
				Err(raw) => {
					self.roll_back(operation_id);
					let classification = self.classify(&raw, &context);
					if classification.should_retry
						&& let Some(strategy) = classification.retry_strategy
					{
						budget = self.config.max_retries.min(strategy.max_attempts);
						if retries < self.config.max_retries && strategy.allows(retries) {
							retries = {
								let mut state = self.state.lock();
								state.stats.retries += 1;
								state.ledger.record_retry(&key)
							};
							let delay = strategy.delay_for_attempt(retries);
							debug!(
								operation = %operation_id,
								kind = %classification.kind(),
								retry = retries,
								budget,
								delay_ms = delay.as_millis() as u64,
								"targeting.retry_scheduled"
							);
							tokio::time::sleep(delay).await;
							continue;
						}
					}
					return Err(self.fail(operation_id, kind, retries + 1, classification, &notification_id));
				}
			}
		}
	}

	/// Admits the operation unless its key or one of `slots` is held by
	/// another in-flight operation.
	fn claim(&self, key: &RetryKey, slots: &[StoreSlot], operation_id: OperationId) -> Result<Claim<'_>> {
		let mut state = self.state.lock();
		if let Err(holder) = state.ledger.begin(key, slots, operation_id) {
			state.stats.refused += 1;
			drop(state);
			debug!(key = %key, holder = %holder, "targeting.refused_in_flight");
			return Err(TargetingError::OperationInFlight { key: holder });
		}
		state.stats.started += 1;
		Ok(Claim {
			coordinator: self,
			key: key.clone(),
			operation_id,
		})
	}

	/// Records the undo information, then applies the speculative mutations.
	fn apply_optimistic(&self, operation_id: OperationId, spec: &ActionSpec) {
		let kind = spec.kind();
		let snapshot = StoreSnapshot::capture(self.store.as_ref(), &spec.slots());
		let inverse = snapshot.invert();
		let forward = spec.forward(&snapshot, operation_id);

		let missing_undo = kind.is_destructive() && snapshot.is_vacant();
		if missing_undo {
			warn!(operation = %operation_id, kind = %kind, swap = %spec.swap_id(), "targeting.missing_undo");
		}

		let target_id = match spec {
			ActionSpec::Create { .. } | ActionSpec::Retarget { .. } => Some(ProposalId::new(operation_id.placeholder_target_id())),
			ActionSpec::Accept { proposal, .. } | ActionSpec::Reject { proposal, .. } => Some(proposal.clone()),
			ActionSpec::Cancel { .. } => snapshot.outgoing().map(|outgoing| outgoing.proposal_id.clone()),
		};
		let update = OptimisticUpdate {
			id: operation_id,
			kind,
			swap_id: spec.swap_id().clone(),
			target_id,
			original_state: snapshot,
			inverse,
			timestamp: swapline_primitives::now(),
		};
		{
			let mut state = self.state.lock();
			if missing_undo {
				state.stats.missing_undo += 1;
			}
			state.pending.insert(operation_id, update);
		}
		apply_all(self.store.as_ref(), &forward);
	}

	/// Replays the recorded inverse. Returns `false` when nothing was pending.
	fn roll_back(&self, operation_id: OperationId) -> bool {
		let update = {
			let mut state = self.state.lock();
			let Some(update) = state.pending.remove(&operation_id) else {
				return false;
			};
			state.stats.rolled_back += 1;
			update
		};
		apply_all(self.store.as_ref(), &update.inverse);
		debug!(operation = %operation_id, kind = %update.kind, mutations = update.inverse.len(), "targeting.rolled_back");

		// Nothing to restore locally; make the next read go to the server.
		if update.kind.is_destructive() && update.original_state.is_vacant() {
			if let Some(proposal) = &update.target_id {
				self.cache.invalidate_by_proposal_id(proposal, InvalidationReason::ManualRefresh);
			}
			self.cache.invalidate_user_lists(InvalidationReason::ManualRefresh);
		}
		true
	}

	fn commit(&self, operation_id: OperationId, spec: &ActionSpec, receipt: &TargetingReceipt, notification_id: &str) {
		let kind = spec.kind();
		let pending = self.state.lock().pending.remove(&operation_id);
		let snapshot = match pending {
			Some(update) => update.original_state,
			None => StoreSnapshot::capture(self.store.as_ref(), &spec.slots()),
		};

		apply_all(self.store.as_ref(), &spec.confirm(&snapshot, receipt));
		self.store.add_targeting_event(TargetingEvent {
			proposal_id: receipt.proposal_id.clone(),
			swap_id: spec.swap_id().clone(),
			target_swap_id: spec
				.target_swap_id()
				.cloned()
				.or_else(|| snapshot.outgoing().map(|outgoing| outgoing.target_swap_id.clone())),
			status: receipt.status,
			origin: EventOrigin::Action(kind),
			at: swapline_primitives::now(),
		});

		let reason = invalidation_reason(kind);
		self.cache.invalidate_by_proposal_id(&receipt.proposal_id, reason);
		if let Some(previous) = snapshot.outgoing()
			&& previous.proposal_id != receipt.proposal_id
		{
			self.cache.invalidate_by_proposal_id(&previous.proposal_id, reason);
		}
		self.cache.invalidate_user_lists(reason);

		self.state.lock().stats.confirmed += 1;
		info!(operation = %operation_id, kind = %kind, proposal = %receipt.proposal_id, status = receipt.status.as_str(), "targeting.confirmed");
		self.notifications
			.add_notification(Notification::success(notification_id, success_message(kind)));
	}

	fn classify(&self, raw: &RawError, context: &ErrorContext) -> Classification {
		let classification = self.classifier.classify(raw, context);
		self.state.lock().classifications.record(&classification);
		debug!(
			kind = %classification.kind(),
			targeting = classification.error.is_targeting_related(),
			retry = classification.should_retry,
			technical = %classification.technical_message,
			"targeting.classified"
		);
		if classification.should_trigger_logout {
			warn!(kind = %classification.kind(), "targeting.session_logout");
			self.session.logout(&classification.error);
		}
		classification
	}

	fn fail(
		&self,
		operation_id: OperationId,
		kind: TargetingActionKind,
		attempts: u32,
		classification: Classification,
		notification_id: &str,
	) -> TargetingError {
		self.state.lock().stats.failed += 1;
		warn!(
			operation = %operation_id,
			kind = %kind,
			error = %classification.kind(),
			attempts,
			"targeting.failed"
		);
		self.notifications.add_notification(Notification::error(
			notification_id,
			failure_title(kind),
			classification.user_message.as_str(),
		));
		TargetingError::Failed {
			kind,
			attempts,
			user_message: classification.user_message,
			error: classification.error,
		}
	}

	fn error_context(&self, spec: &ActionSpec, request: &RemoteRequest) -> ErrorContext {
		let mut context = ErrorContext::new(request.endpoint.as_str(), spec.kind().operation_name())
			.swap(spec.swap_id().clone())
			.request_id(request.request_id.clone())
			.retry(request.attempt);
		if let Some(target) = spec.target_swap_id() {
			context = context.target_swap(target.clone());
		}
		if let Some(user) = &self.user_id {
			context = context.user(user.clone());
		}
		context
	}
}

/// Holds a retry key for the lifetime of one logical operation.
///
/// Dropping it mid-call (the caller abandoned the future) rolls back any
/// speculative mutation still pending before releasing the key.
struct Claim<'a> {
	coordinator: &'a TargetingCoordinator,
	key: RetryKey,
	operation_id: OperationId,
}

impl Drop for Claim<'_> {
	fn drop(&mut self) {
		if self.coordinator.roll_back(self.operation_id) {
			warn!(operation = %self.operation_id, key = %self.key, "targeting.abandoned");
		}
		self.coordinator.state.lock().ledger.finish(&self.key, self.operation_id);
	}
}

fn invalidation_reason(kind: TargetingActionKind) -> InvalidationReason {
	match kind {
		TargetingActionKind::Create => InvalidationReason::ProposalCreated,
		TargetingActionKind::Accept => InvalidationReason::ProposalAccepted,
		TargetingActionKind::Reject => InvalidationReason::ProposalRejected,
		TargetingActionKind::Cancel => InvalidationReason::ProposalCancelled,
		TargetingActionKind::Retarget => InvalidationReason::ProposalRetargeted,
	}
}

fn success_message(kind: TargetingActionKind) -> &'static str {
	match kind {
		TargetingActionKind::Create => "Proposal sent",
		TargetingActionKind::Accept => "Proposal accepted",
		TargetingActionKind::Reject => "Proposal rejected",
		TargetingActionKind::Cancel => "Proposal cancelled",
		TargetingActionKind::Retarget => "Proposal moved to the new swap",
	}
}

fn failure_title(kind: TargetingActionKind) -> &'static str {
	match kind {
		TargetingActionKind::Create => "Could not send proposal",
		TargetingActionKind::Accept => "Could not accept proposal",
		TargetingActionKind::Reject => "Could not reject proposal",
		TargetingActionKind::Cancel => "Could not cancel proposal",
		TargetingActionKind::Retarget => "Could not retarget proposal",
	}
}

/// Builder for [`TargetingCoordinator`]; unset collaborators get
/// process-local defaults.
pub struct TargetingCoordinatorBuilder {
	config: CoordinatorConfig,
	user_id: Option<UserId>,
	store: Arc<dyn TargetingStore>,
	remote: Arc<dyn RemoteInvoker>,
	classifier: ErrorClassifier,
	cache: ProposalCache,
	resilience: Arc<ConnectionResilienceManager>,
	notifications: Arc<dyn NotificationSink>,
	session: Arc<dyn SessionGuard>,
}

impl TargetingCoordinatorBuilder {
	#[must_use]
	pub fn config(mut self, config: CoordinatorConfig) -> Self {
		self.config = config;
		self
	}

	/// User reported in error contexts.
	#[must_use]
	pub fn user(mut self, user_id: UserId) -> Self {
		self.user_id = Some(user_id);
		self
	}

	#[must_use]
	pub fn classifier(mut self, classifier: ErrorClassifier) -> Self {
		self.classifier = classifier;
		self
	}

	#[must_use]
	pub fn cache(mut self, cache: ProposalCache) -> Self {
		self.cache = cache;
		self
	}

	#[must_use]
	pub fn resilience(mut self, resilience: Arc<ConnectionResilienceManager>) -> Self {
		self.resilience = resilience;
		self
	}

	#[must_use]
	pub fn notifications(mut self, notifications: Arc<dyn NotificationSink>) -> Self {
		self.notifications = notifications;
		self
	}

	#[must_use]
	pub fn session(mut self, session: Arc<dyn SessionGuard>) -> Self {
		self.session = session;
		self
	}

	pub fn build(self) -> TargetingCoordinator {
		TargetingCoordinator {
			config: self.config,
			user_id: self.user_id,
			store: self.store,
			remote: self.remote,
			classifier: self.classifier,
			cache: self.cache,
			resilience: self.resilience,
			notifications: self.notifications,
			session: self.session,
			state: Mutex::new(State::default()),
		}
	}
}
