use std::collections::HashMap;

use parking_lot::Mutex;
use swapline_primitives::{ProposalId, SwapId};

use crate::model::{IncomingTarget, OutgoingTarget, TargetingEvent};

/// Local targeting state shown to the user.
///
/// A swap has at most one outgoing target; it may receive any number of
/// incoming proposals, keyed by proposal id.
pub trait TargetingStore: Send + Sync {
	fn outgoing_target(&self, swap_id: &SwapId) -> Option<OutgoingTarget>;
	fn set_outgoing_target(&self, swap_id: &SwapId, target: OutgoingTarget);
	fn remove_outgoing_target(&self, swap_id: &SwapId);

	fn incoming_target(&self, swap_id: &SwapId, proposal_id: &ProposalId) -> Option<IncomingTarget>;
	/// Inserts or replaces the incoming proposal with the same id.
	fn update_incoming_target(&self, swap_id: &SwapId, target: IncomingTarget);
	fn remove_incoming_target(&self, swap_id: &SwapId, proposal_id: &ProposalId);

	fn add_targeting_event(&self, event: TargetingEvent);
}

/// Process-local [`TargetingStore`].
#[derive(Debug, Default)]
pub struct InMemoryTargetingStore {
	state: Mutex<StoreState>,
}

#[derive(Debug, Default)]
struct StoreState {
	outgoing: HashMap<SwapId, OutgoingTarget>,
	incoming: HashMap<SwapId, Vec<IncomingTarget>>,
	events: Vec<TargetingEvent>,
}

impl InMemoryTargetingStore {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn events(&self) -> Vec<TargetingEvent> {
		self.state.lock().events.clone()
	}

	pub fn incoming_targets(&self, swap_id: &SwapId) -> Vec<IncomingTarget> {
		self.state.lock().incoming.get(swap_id).cloned().unwrap_or_default()
	}
}

impl TargetingStore for InMemoryTargetingStore {
	fn outgoing_target(&self, swap_id: &SwapId) -> Option<OutgoingTarget> {
		self.state.lock().outgoing.get(swap_id).cloned()
	}

	fn set_outgoing_target(&self, swap_id: &SwapId, target: OutgoingTarget) {
		self.state.lock().outgoing.insert(swap_id.clone(), target);
	}

	fn remove_outgoing_target(&self, swap_id: &SwapId) {
		self.state.lock().outgoing.remove(swap_id);
	}

	fn incoming_target(&self, swap_id: &SwapId, proposal_id: &ProposalId) -> Option<IncomingTarget> {
		let state = self.state.lock();
		state.incoming.get(swap_id)?.iter().find(|target| &target.proposal_id == proposal_id).cloned()
	}

	fn update_incoming_target(&self, swap_id: &SwapId, target: IncomingTarget) {
		let mut state = self.state.lock();
		let targets = state.incoming.entry(swap_id.clone()).or_default();
		match targets.iter_mut().find(|existing| existing.proposal_id == target.proposal_id) {
			Some(existing) => *existing = target,
			None => targets.push(target),
		}
	}

	fn remove_incoming_target(&self, swap_id: &SwapId, proposal_id: &ProposalId) {
		let mut state = self.state.lock();
		if let Some(targets) = state.incoming.get_mut(swap_id) {
			targets.retain(|target| &target.proposal_id != proposal_id);
			if targets.is_empty() {
				state.incoming.remove(swap_id);
			}
		}
	}

	fn add_targeting_event(&self, event: TargetingEvent) {
		self.state.lock().events.push(event);
	}
}
