use swapline_primitives::{OperationId, ProposalId, RequestId, SwapId, TargetingActionKind};

use crate::ledger::{RetryKey, RetryTarget};
use crate::model::{IncomingTarget, OutgoingTarget, TargetStatus, TargetingReceipt};
use crate::mutation::{StoreMutation, StoreSlot, StoreSnapshot};
use crate::remote::RemoteRequest;

/// One requested targeting action, independent of its attempts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ActionSpec {
	Create {
		source: SwapId,
		target: SwapId,
		message: Option<String>,
	},
	Accept {
		swap: SwapId,
		proposal: ProposalId,
	},
	Reject {
		swap: SwapId,
		proposal: ProposalId,
	},
	Cancel {
		source: SwapId,
	},
	Retarget {
		source: SwapId,
		target: SwapId,
	},
}

impl ActionSpec {
	pub fn kind(&self) -> TargetingActionKind {
		match self {
			Self::Create { .. } => TargetingActionKind::Create,
			Self::Accept { .. } => TargetingActionKind::Accept,
			Self::Reject { .. } => TargetingActionKind::Reject,
			Self::Cancel { .. } => TargetingActionKind::Cancel,
			Self::Retarget { .. } => TargetingActionKind::Retarget,
		}
	}

	/// Swap the action is performed on behalf of.
	pub fn swap_id(&self) -> &SwapId {
		match self {
			Self::Create { source, .. } | Self::Cancel { source } | Self::Retarget { source, .. } => source,
			Self::Accept { swap, .. } | Self::Reject { swap, .. } => swap,
		}
	}

	pub fn target_swap_id(&self) -> Option<&SwapId> {
		match self {
			Self::Create { target, .. } | Self::Retarget { target, .. } => Some(target),
			_ => None,
		}
	}

	pub fn proposal_id(&self) -> Option<&ProposalId> {
		match self {
			Self::Accept { proposal, .. } | Self::Reject { proposal, .. } => Some(proposal),
			_ => None,
		}
	}

	pub fn retry_key(&self) -> RetryKey {
		let target = match self {
			Self::Create { target, .. } | Self::Retarget { target, .. } => Some(RetryTarget::Swap(target.clone())),
			Self::Accept { proposal, .. } | Self::Reject { proposal, .. } => Some(RetryTarget::Proposal(proposal.clone())),
			Self::Cancel { .. } => None,
		};
		RetryKey {
			kind: self.kind(),
			swap_id: self.swap_id().clone(),
			target,
		}
	}

	pub fn endpoint(&self) -> String {
		match self {
			Self::Create { source, .. } | Self::Cancel { source } => format!("/api/swaps/{source}/target"),
			Self::Retarget { source, .. } => format!("/api/swaps/{source}/retarget"),
			Self::Accept { proposal, .. } => format!("/api/proposals/{proposal}/accept"),
			Self::Reject { proposal, .. } => format!("/api/proposals/{proposal}/reject"),
		}
	}

	pub fn request(&self, operation_id: OperationId, attempt: u32) -> RemoteRequest {
		RemoteRequest {
			operation_id,
			request_id: RequestId::generate(),
			kind: self.kind(),
			endpoint: self.endpoint(),
			swap_id: self.swap_id().clone(),
			target_swap_id: self.target_swap_id().cloned(),
			proposal_id: self.proposal_id().cloned(),
			message: match self {
				Self::Create { message, .. } => message.clone(),
				_ => None,
			},
			attempt,
		}
	}

	/// Slots the action mutates, in the order they are captured.
	pub fn slots(&self) -> Vec<StoreSlot> {
		match self {
			Self::Create { source, .. } | Self::Cancel { source } | Self::Retarget { source, .. } => vec![StoreSlot::Outgoing(source.clone())],
			Self::Accept { swap, proposal } | Self::Reject { swap, proposal } => vec![StoreSlot::Incoming {
				swap_id: swap.clone(),
				proposal_id: proposal.clone(),
			}],
		}
	}

	/// Speculative mutations shown while the remote call is in flight.
	pub fn forward(&self, snapshot: &StoreSnapshot, operation_id: OperationId) -> Vec<StoreMutation> {
		match self {
			Self::Create { source, target, message } => vec![StoreMutation::SetOutgoing {
				swap_id: source.clone(),
				target: OutgoingTarget {
					proposal_id: ProposalId::new(operation_id.placeholder_target_id()),
					source_swap_id: source.clone(),
					target_swap_id: target.clone(),
					status: TargetStatus::Pending,
					optimistic: true,
					message: message.clone(),
					updated_at: swapline_primitives::now(),
				},
			}],
			Self::Retarget { source, target } => vec![StoreMutation::SetOutgoing {
				swap_id: source.clone(),
				target: OutgoingTarget {
					proposal_id: ProposalId::new(operation_id.placeholder_target_id()),
					source_swap_id: source.clone(),
					target_swap_id: target.clone(),
					status: TargetStatus::Pending,
					optimistic: true,
					message: snapshot.outgoing().and_then(|previous| previous.message.clone()),
					updated_at: swapline_primitives::now(),
				},
			}],
			Self::Accept { swap, .. } => snapshot
				.incoming()
				.map(|incoming| StoreMutation::UpdateIncoming {
					swap_id: swap.clone(),
					target: with_status(incoming, TargetStatus::Accepted),
				})
				.into_iter()
				.collect(),
			Self::Reject { swap, proposal } => vec![StoreMutation::RemoveIncoming {
				swap_id: swap.clone(),
				proposal_id: proposal.clone(),
			}],
			Self::Cancel { source } => vec![StoreMutation::RemoveOutgoing { swap_id: source.clone() }],
		}
	}

	/// Mutations that replace speculative state with the server's answer.
	pub fn confirm(&self, snapshot: &StoreSnapshot, receipt: &TargetingReceipt) -> Vec<StoreMutation> {
		match self {
			Self::Create { source, target, message } => vec![StoreMutation::SetOutgoing {
				swap_id: source.clone(),
				target: OutgoingTarget {
					proposal_id: receipt.proposal_id.clone(),
					source_swap_id: source.clone(),
					target_swap_id: target.clone(),
					status: receipt.status,
					optimistic: false,
					message: message.clone(),
					updated_at: swapline_primitives::now(),
				},
			}],
			Self::Retarget { source, target } => vec![StoreMutation::SetOutgoing {
				swap_id: source.clone(),
				target: OutgoingTarget {
					proposal_id: receipt.proposal_id.clone(),
					source_swap_id: source.clone(),
					target_swap_id: target.clone(),
					status: receipt.status,
					optimistic: false,
					message: snapshot.outgoing().and_then(|previous| previous.message.clone()),
					updated_at: swapline_primitives::now(),
				},
			}],
			Self::Accept { swap, .. } => snapshot
				.incoming()
				.map(|incoming| StoreMutation::UpdateIncoming {
					swap_id: swap.clone(),
					target: with_status(incoming, receipt.status),
				})
				.into_iter()
				.collect(),
			Self::Reject { swap, proposal } => vec![StoreMutation::RemoveIncoming {
				swap_id: swap.clone(),
				proposal_id: proposal.clone(),
			}],
			Self::Cancel { source } => vec![StoreMutation::RemoveOutgoing { swap_id: source.clone() }],
		}
	}
}

fn with_status(incoming: &IncomingTarget, status: TargetStatus) -> IncomingTarget {
	IncomingTarget {
		status,
		updated_at: swapline_primitives::now(),
		..incoming.clone()
	}
}
