use std::collections::HashMap;
use std::fmt;

use swapline_primitives::{OperationId, ProposalId, SwapId, TargetingActionKind};

use crate::mutation::StoreSlot;

/// What a logical operation acts on besides its own swap.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RetryTarget {
	Swap(SwapId),
	Proposal(ProposalId),
}

/// Identity of one logical operation for retry accounting.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RetryKey {
	pub kind: TargetingActionKind,
	pub swap_id: SwapId,
	pub target: Option<RetryTarget>,
}

impl fmt::Display for RetryKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}:{}", self.kind, self.swap_id)?;
		match &self.target {
			Some(RetryTarget::Swap(swap)) => write!(f, "->{swap}"),
			Some(RetryTarget::Proposal(proposal)) => write!(f, "#{proposal}"),
			None => Ok(()),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LedgerEntry {
	pub operation_id: OperationId,
	pub retries: u32,
	/// Store slots this operation writes speculatively.
	pub slots: Vec<StoreSlot>,
}

/// In-flight logical operations and the retries each has spent.
///
/// A store slot belongs to at most one in-flight operation, so two actions
/// writing the same slot (create and retarget on one source swap, say)
/// never snapshot each other's speculative state.
#[derive(Debug, Default)]
pub(crate) struct RetryLedger {
	entries: HashMap<RetryKey, LedgerEntry>,
	slots: HashMap<StoreSlot, RetryKey>,
}

impl RetryLedger {
	/// Claims `key` and `slots`. On conflict returns the key of the
	/// operation already holding the key or one of the slots.
	pub fn begin(&mut self, key: &RetryKey, slots: &[StoreSlot], operation_id: OperationId) -> Result<(), RetryKey> {
		if self.entries.contains_key(key) {
			return Err(key.clone());
		}
		if let Some(holder) = slots.iter().find_map(|slot| self.slots.get(slot)) {
			return Err(holder.clone());
		}
		for slot in slots {
			self.slots.insert(slot.clone(), key.clone());
		}
		self.entries.insert(
			key.clone(),
			LedgerEntry {
				operation_id,
				retries: 0,
				slots: slots.to_vec(),
			},
		);
		Ok(())
	}

	pub fn record_retry(&mut self, key: &RetryKey) -> u32 {
		match self.entries.get_mut(key) {
			Some(entry) => {
				entry.retries += 1;
				entry.retries
			}
			None => 0,
		}
	}

	/// Releases `key` and its slots if `operation_id` still holds it.
	pub fn finish(&mut self, key: &RetryKey, operation_id: OperationId) {
		if !self.entries.get(key).is_some_and(|entry| entry.operation_id == operation_id) {
			return;
		}
		if let Some(entry) = self.entries.remove(key) {
			for slot in &entry.slots {
				self.slots.remove(slot);
			}
		}
	}

	pub fn get(&self, key: &RetryKey) -> Option<&LedgerEntry> {
		self.entries.get(key)
	}
}
