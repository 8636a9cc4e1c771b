use std::fmt;

use swapline_primitives::{ProposalId, Timestamp, UserId};

use crate::key::CacheKey;

/// Why entries were invalidated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InvalidationReason {
	ProposalCreated,
	ProposalAccepted,
	ProposalRejected,
	ProposalCancelled,
	ProposalRetargeted,
	RealTimeUpdate,
	ManualRefresh,
	TtlExpired,
	/// Cached payload no longer deserializes.
	DeserializeFailed,
}

impl InvalidationReason {
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::ProposalCreated => "proposal_created",
			Self::ProposalAccepted => "proposal_accepted",
			Self::ProposalRejected => "proposal_rejected",
			Self::ProposalCancelled => "proposal_cancelled",
			Self::ProposalRetargeted => "proposal_retargeted",
			Self::RealTimeUpdate => "real_time_update",
			Self::ManualRefresh => "manual_refresh",
			Self::TtlExpired => "ttl_expired",
			Self::DeserializeFailed => "deserialize_failed",
		}
	}
}

impl fmt::Display for InvalidationReason {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Scope of one invalidation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidationTarget {
	Key(CacheKey),
	User(UserId),
	Proposal(ProposalId),
	/// Every user proposal list.
	UserLists,
	/// Entries past their TTL.
	Expired,
	All,
}

/// One entry of the invalidation log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidationRecord {
	pub target: InvalidationTarget,
	pub reason: InvalidationReason,
	/// Entries actually removed.
	pub removed: usize,
	pub at: Timestamp,
}
