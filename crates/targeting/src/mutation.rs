//! Store mutations and the snapshots they are inverted against.
//!
//! A forward mutation list is never applied without first capturing a
//! [`StoreSnapshot`] of every slot it touches; [`StoreSnapshot::invert`]
//! turns that snapshot into the mutations that restore those slots exactly.

use swapline_primitives::{ProposalId, SwapId, Timestamp};

use crate::model::{IncomingTarget, OutgoingTarget};
use crate::store::TargetingStore;

/// Addressable piece of targeting state.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StoreSlot {
	Outgoing(SwapId),
	Incoming { swap_id: SwapId, proposal_id: ProposalId },
}

/// Prior contents of one slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotSnapshot {
	Outgoing {
		swap_id: SwapId,
		previous: Option<OutgoingTarget>,
	},
	Incoming {
		swap_id: SwapId,
		proposal_id: ProposalId,
		previous: Option<IncomingTarget>,
	},
}

impl SlotSnapshot {
	pub fn is_vacant(&self) -> bool {
		match self {
			Self::Outgoing { previous, .. } => previous.is_none(),
			Self::Incoming { previous, .. } => previous.is_none(),
		}
	}

	fn restore(&self) -> StoreMutation {
		match self {
			Self::Outgoing {
				swap_id,
				previous: Some(target),
			} => StoreMutation::SetOutgoing {
				swap_id: swap_id.clone(),
				target: target.clone(),
			},
			Self::Outgoing { swap_id, previous: None } => StoreMutation::RemoveOutgoing { swap_id: swap_id.clone() },
			Self::Incoming {
				swap_id,
				previous: Some(target),
				..
			} => StoreMutation::UpdateIncoming {
				swap_id: swap_id.clone(),
				target: target.clone(),
			},
			Self::Incoming {
				swap_id,
				proposal_id,
				previous: None,
			} => StoreMutation::RemoveIncoming {
				swap_id: swap_id.clone(),
				proposal_id: proposal_id.clone(),
			},
		}
	}
}

/// Contents of every slot an action touches, taken before it mutates them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreSnapshot {
	pub slots: Vec<SlotSnapshot>,
	pub taken_at: Timestamp,
}

impl StoreSnapshot {
	pub fn capture(store: &dyn TargetingStore, slots: &[StoreSlot]) -> Self {
		let slots = slots
			.iter()
			.map(|slot| match slot {
				StoreSlot::Outgoing(swap_id) => SlotSnapshot::Outgoing {
					swap_id: swap_id.clone(),
					previous: store.outgoing_target(swap_id),
				},
				StoreSlot::Incoming { swap_id, proposal_id } => SlotSnapshot::Incoming {
					swap_id: swap_id.clone(),
					proposal_id: proposal_id.clone(),
					previous: store.incoming_target(swap_id, proposal_id),
				},
			})
			.collect();
		Self {
			slots,
			taken_at: swapline_primitives::now(),
		}
	}

	/// True when no captured slot held anything.
	pub fn is_vacant(&self) -> bool {
		self.slots.iter().all(SlotSnapshot::is_vacant)
	}

	pub fn outgoing(&self) -> Option<&OutgoingTarget> {
		self.slots.iter().find_map(|slot| match slot {
			SlotSnapshot::Outgoing { previous, .. } => previous.as_ref(),
			SlotSnapshot::Incoming { .. } => None,
		})
	}

	pub fn incoming(&self) -> Option<&IncomingTarget> {
		self.slots.iter().find_map(|slot| match slot {
			SlotSnapshot::Incoming { previous, .. } => previous.as_ref(),
			SlotSnapshot::Outgoing { .. } => None,
		})
	}

	/// Mutations that put every captured slot back to its captured contents.
	///
	/// Slots are restored in reverse capture order.
	pub fn invert(&self) -> Vec<StoreMutation> {
		self.slots.iter().rev().map(SlotSnapshot::restore).collect()
	}
}

/// One change to the targeting store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreMutation {
	SetOutgoing { swap_id: SwapId, target: OutgoingTarget },
	RemoveOutgoing { swap_id: SwapId },
	UpdateIncoming { swap_id: SwapId, target: IncomingTarget },
	RemoveIncoming { swap_id: SwapId, proposal_id: ProposalId },
}

impl StoreMutation {
	pub fn apply(&self, store: &dyn TargetingStore) {
		match self {
			Self::SetOutgoing { swap_id, target } => store.set_outgoing_target(swap_id, target.clone()),
			Self::RemoveOutgoing { swap_id } => store.remove_outgoing_target(swap_id),
			Self::UpdateIncoming { swap_id, target } => store.update_incoming_target(swap_id, target.clone()),
			Self::RemoveIncoming { swap_id, proposal_id } => store.remove_incoming_target(swap_id, proposal_id),
		}
	}
}

pub fn apply_all(store: &dyn TargetingStore, mutations: &[StoreMutation]) {
	for mutation in mutations {
		mutation.apply(store);
	}
}
