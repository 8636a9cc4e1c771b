use serde::{Deserialize, Serialize};
use swapline_primitives::{ProposalId, SwapId, TargetingActionKind, Timestamp, UserId};

/// Lifecycle status of a targeting proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetStatus {
	Pending,
	Accepted,
	Rejected,
	Cancelled,
}

impl TargetStatus {
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Pending => "pending",
			Self::Accepted => "accepted",
			Self::Rejected => "rejected",
			Self::Cancelled => "cancelled",
		}
	}

	/// Whether the proposal is closed and leaves no local state behind.
	pub const fn is_closed(self) -> bool {
		matches!(self, Self::Rejected | Self::Cancelled)
	}
}

/// Proposal this user's swap is making against another swap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingTarget {
	/// Server id, or an `optimistic-*` placeholder until confirmed.
	pub proposal_id: ProposalId,
	pub source_swap_id: SwapId,
	pub target_swap_id: SwapId,
	pub status: TargetStatus,
	/// Set while the entry is a speculative local value.
	pub optimistic: bool,
	pub message: Option<String>,
	pub updated_at: Timestamp,
}

/// Proposal another user made against one of this user's swaps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomingTarget {
	pub proposal_id: ProposalId,
	/// The proposer's swap.
	pub source_swap_id: SwapId,
	/// This user's swap being targeted.
	pub target_swap_id: SwapId,
	pub proposer: Option<UserId>,
	pub status: TargetStatus,
	pub updated_at: Timestamp,
}

/// Where a targeting event came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventOrigin {
	Action(TargetingActionKind),
	Push,
}

/// Confirmed change appended to the local targeting history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetingEvent {
	pub proposal_id: ProposalId,
	pub swap_id: SwapId,
	pub target_swap_id: Option<SwapId>,
	pub status: TargetStatus,
	pub origin: EventOrigin,
	pub at: Timestamp,
}

/// Authoritative server answer to a targeting call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetingReceipt {
	pub proposal_id: ProposalId,
	pub status: TargetStatus,
}

impl TargetingReceipt {
	pub fn new(proposal_id: impl Into<ProposalId>, status: TargetStatus) -> Self {
		Self {
			proposal_id: proposal_id.into(),
			status,
		}
	}
}

/// Server-pushed status change for one proposal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetingPushEvent {
	pub proposal_id: ProposalId,
	pub source_swap_id: SwapId,
	pub target_swap_id: SwapId,
	pub status: TargetStatus,
	pub proposer: Option<UserId>,
}
