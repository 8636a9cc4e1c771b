use std::time::Duration;

use crate::key::CacheClass;

/// Per-class time-to-live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TtlConfig {
	pub user_proposals: Duration,
	pub proposal_status: Duration,
	pub proposal_detail: Duration,
	pub targeting_history: Duration,
}

impl TtlConfig {
	pub const fn for_class(&self, class: CacheClass) -> Duration {
		match class {
			CacheClass::UserProposals => self.user_proposals,
			CacheClass::ProposalStatus => self.proposal_status,
			CacheClass::ProposalDetail => self.proposal_detail,
			CacheClass::TargetingHistory => self.targeting_history,
		}
	}
}

impl Default for TtlConfig {
	fn default() -> Self {
		Self {
			user_proposals: Duration::from_secs(15),
			proposal_status: Duration::from_secs(30),
			proposal_detail: Duration::from_secs(60),
			targeting_history: Duration::from_secs(300),
		}
	}
}

/// Cache configuration.
#[derive(Debug, Clone)]
pub struct CacheConfig {
	pub ttl: TtlConfig,
	/// Entries kept before least-recently-used eviction.
	pub max_entries: usize,
	pub invalidation_log_limit: usize,
	/// Quiet period before pushed updates clear the user proposal lists.
	pub list_invalidation_debounce: Duration,
}

impl Default for CacheConfig {
	fn default() -> Self {
		Self {
			ttl: TtlConfig::default(),
			max_entries: 500,
			invalidation_log_limit: 100,
			list_invalidation_debounce: Duration::from_millis(500),
		}
	}
}
