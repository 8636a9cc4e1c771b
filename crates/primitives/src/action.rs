use serde::{Deserialize, Serialize};

/// User-initiated targeting action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetingActionKind {
	/// Propose one's own swap against another user's swap.
	Create,
	/// Owner accepts an incoming proposal.
	Accept,
	/// Owner rejects an incoming proposal.
	Reject,
	/// Proposer withdraws an outgoing proposal.
	Cancel,
	/// Proposer moves an outgoing proposal to a different swap.
	Retarget,
}

impl TargetingActionKind {
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Create => "create",
			Self::Accept => "accept",
			Self::Reject => "reject",
			Self::Cancel => "cancel",
			Self::Retarget => "retarget",
		}
	}

	/// Operation name reported in error contexts.
	pub const fn operation_name(self) -> &'static str {
		match self {
			Self::Create => "create_target",
			Self::Accept => "accept_target",
			Self::Reject => "reject_target",
			Self::Cancel => "cancel_target",
			Self::Retarget => "retarget",
		}
	}

	/// Human-readable verb used in notifications.
	pub const fn progress_label(self) -> &'static str {
		match self {
			Self::Create => "Sending proposal",
			Self::Accept => "Accepting proposal",
			Self::Reject => "Rejecting proposal",
			Self::Cancel => "Cancelling proposal",
			Self::Retarget => "Retargeting proposal",
		}
	}

	/// Whether the optimistic mutation removes local state.
	pub const fn is_destructive(self) -> bool {
		matches!(self, Self::Reject | Self::Cancel)
	}
}

impl std::fmt::Display for TargetingActionKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}
