use std::time::Duration;

use serde_json::Value;
use swapline_primitives::{ProposalId, UserId};
use tokio::time::Instant;

/// Ownership tags and TTL override supplied with [`crate::ProposalCache::set`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryMeta {
	pub user_id: Option<UserId>,
	pub proposal_id: Option<ProposalId>,
	/// Replaces the class TTL for this entry.
	pub ttl: Option<Duration>,
}

impl EntryMeta {
	pub fn user(user_id: impl Into<UserId>) -> Self {
		Self {
			user_id: Some(user_id.into()),
			..Self::default()
		}
	}

	pub fn proposal(proposal_id: impl Into<ProposalId>) -> Self {
		Self {
			proposal_id: Some(proposal_id.into()),
			..Self::default()
		}
	}

	#[must_use]
	pub fn ttl(mut self, ttl: Duration) -> Self {
		self.ttl = Some(ttl);
		self
	}
}

#[derive(Debug, Clone)]
pub(crate) struct CacheEntry {
	pub data: Value,
	pub timestamp: Instant,
	pub last_accessed: Instant,
	pub access_count: u64,
	pub user_id: Option<UserId>,
	pub proposal_id: Option<ProposalId>,
	pub ttl: Duration,
}

impl CacheEntry {
	pub fn is_expired(&self, now: Instant) -> bool {
		now.saturating_duration_since(self.timestamp) > self.ttl
	}

	pub fn info(&self) -> EntryInfo {
		EntryInfo {
			timestamp: self.timestamp,
			last_accessed: self.last_accessed,
			access_count: self.access_count,
			ttl: self.ttl,
			user_id: self.user_id.clone(),
			proposal_id: self.proposal_id.clone(),
		}
	}
}

/// Read-only view of an entry's bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryInfo {
	/// Write time; TTL is measured from here.
	pub timestamp: Instant,
	pub last_accessed: Instant,
	pub access_count: u64,
	pub ttl: Duration,
	pub user_id: Option<UserId>,
	pub proposal_id: Option<ProposalId>,
}
