use std::fmt;

use swapline_primitives::{ProposalId, UserId};

/// TTL class of a cached value, ordered from most to least volatile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheClass {
	/// A user's proposal list; changes most often.
	UserProposals,
	ProposalStatus,
	ProposalDetail,
	/// Targeting history; least volatile once fetched.
	TargetingHistory,
}

/// Typed cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
	UserProposals(UserId),
	Proposal(ProposalId),
	ProposalStatus(ProposalId),
	TargetingHistory(UserId),
}

impl CacheKey {
	pub fn class(&self) -> CacheClass {
		match self {
			Self::UserProposals(_) => CacheClass::UserProposals,
			Self::Proposal(_) => CacheClass::ProposalDetail,
			Self::ProposalStatus(_) => CacheClass::ProposalStatus,
			Self::TargetingHistory(_) => CacheClass::TargetingHistory,
		}
	}

	/// User the key itself is scoped to.
	pub fn user_id(&self) -> Option<&UserId> {
		match self {
			Self::UserProposals(user) | Self::TargetingHistory(user) => Some(user),
			_ => None,
		}
	}

	/// Proposal the key itself is scoped to.
	pub fn proposal_id(&self) -> Option<&ProposalId> {
		match self {
			Self::Proposal(proposal) | Self::ProposalStatus(proposal) => Some(proposal),
			_ => None,
		}
	}
}

impl fmt::Display for CacheKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::UserProposals(user) => write!(f, "user-proposals:{user}"),
			Self::Proposal(proposal) => write!(f, "proposal:{proposal}"),
			Self::ProposalStatus(proposal) => write!(f, "proposal-status:{proposal}"),
			Self::TargetingHistory(user) => write!(f, "targeting-history:{user}"),
		}
	}
}
