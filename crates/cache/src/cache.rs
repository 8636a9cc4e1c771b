use std::collections::VecDeque;
use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use parking_lot::Mutex;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use swapline_primitives::{ProposalId, UserId};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::config::CacheConfig;
use crate::entry::{CacheEntry, EntryInfo, EntryMeta};
use crate::invalidation::{InvalidationReason, InvalidationRecord, InvalidationTarget};
use crate::key::CacheKey;
use crate::stats::CacheStats;

#[cfg(test)]
mod tests;

/// Server-pushed status change for one proposal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProposalStatusUpdate {
	pub proposal_id: ProposalId,
	pub status: String,
}

impl ProposalStatusUpdate {
	pub fn new(proposal_id: impl Into<ProposalId>, status: impl Into<String>) -> Self {
		Self {
			proposal_id: proposal_id.into(),
			status: status.into(),
		}
	}
}

/// Shared cache handle.
///
/// Clones share storage. Values are stored as JSON so one cache can hold
/// lists, details and histories of different shapes; a read whose payload no
/// longer deserializes into the requested type is treated as a miss and the
/// entry is dropped.
#[derive(Clone)]
pub struct ProposalCache {
	inner: Arc<Inner>,
}

struct Inner {
	config: CacheConfig,
	state: Mutex<State>,
	debounce: Mutex<Debounce>,
}

struct State {
	entries: LruCache<CacheKey, CacheEntry>,
	log: VecDeque<InvalidationRecord>,
	stats: CacheStats,
	/// A pushed update is waiting to clear the user proposal lists.
	lists_dirty: bool,
}

#[derive(Default)]
struct Debounce {
	generation: u64,
	task: Option<JoinHandle<()>>,
}

impl Default for ProposalCache {
	fn default() -> Self {
		Self::new(CacheConfig::default())
	}
}

impl std::fmt::Debug for ProposalCache {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ProposalCache")
			.field("config", &self.inner.config)
			.field("entries", &self.len())
			.finish()
	}
}

impl ProposalCache {
	pub fn new(config: CacheConfig) -> Self {
		let capacity = NonZeroUsize::new(config.max_entries).unwrap_or(NonZeroUsize::MIN);
		Self {
			inner: Arc::new(Inner {
				config,
				state: Mutex::new(State {
					entries: LruCache::new(capacity),
					log: VecDeque::new(),
					stats: CacheStats::default(),
					lists_dirty: false,
				}),
				debounce: Mutex::new(Debounce::default()),
			}),
		}
	}

	pub fn config(&self) -> &CacheConfig {
		&self.inner.config
	}

	pub fn len(&self) -> usize {
		self.inner.state.lock().entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Serializes and stores `data`. Returns `false` when serialization fails;
	/// the cache is left unchanged in that case.
	pub fn set<T: Serialize + ?Sized>(&self, key: CacheKey, data: &T, meta: EntryMeta) -> bool {
		match serde_json::to_value(data) {
			Ok(value) => {
				self.set_value(key, value, meta);
				true
			}
			Err(error) => {
				warn!(key = %key, %error, "cache.serialize_failed");
				false
			}
		}
	}

	/// Stores an already-encoded value.
	pub fn set_value(&self, key: CacheKey, data: Value, meta: EntryMeta) {
		let now = Instant::now();
		let ttl = meta.ttl.unwrap_or_else(|| self.inner.config.ttl.for_class(key.class()));
		let entry = CacheEntry {
			data,
			timestamp: now,
			last_accessed: now,
			access_count: 0,
			user_id: meta.user_id.or_else(|| key.user_id().cloned()),
			proposal_id: meta.proposal_id.or_else(|| key.proposal_id().cloned()),
			ttl,
		};

		let mut state = self.inner.state.lock();
		if let Some((evicted, _)) = state.entries.push(key.clone(), entry) {
			if evicted != key {
				state.stats.evictions += 1;
				debug!(key = %evicted, "cache.evicted");
			}
		}
	}

	/// Returns the cached value when present, fresh and decodable.
	///
	/// Reads never touch the write timestamp, so repeated reads cannot extend
	/// an entry's life.
	pub fn get<T: DeserializeOwned>(&self, key: &CacheKey) -> Option<T> {
		let now = Instant::now();
		let mut guard = self.inner.state.lock();
		let state = &mut *guard;

		let Some(entry) = state.entries.get_mut(key) else {
			state.stats.misses += 1;
			return None;
		};

		if entry.is_expired(now) {
			state.entries.pop(key);
			state.stats.expired += 1;
			state.stats.misses += 1;
			debug!(key = %key, "cache.expired");
			return None;
		}

		entry.last_accessed = now;
		entry.access_count += 1;
		match T::deserialize(&entry.data) {
			Ok(value) => {
				state.stats.hits += 1;
				Some(value)
			}
			Err(error) => {
				warn!(key = %key, %error, "cache.malformed_entry");
				state.entries.pop(key);
				state.stats.malformed += 1;
				state.stats.misses += 1;
				state.record(
					InvalidationTarget::Key(key.clone()),
					InvalidationReason::DeserializeFailed,
					1,
					self.inner.config.invalidation_log_limit,
				);
				None
			}
		}
	}

	/// Whether a fresh entry exists, without counting as a read.
	pub fn contains(&self, key: &CacheKey) -> bool {
		let now = Instant::now();
		self.inner.state.lock().entries.peek(key).is_some_and(|entry| !entry.is_expired(now))
	}

	/// Bookkeeping for an entry, without counting as a read.
	pub fn entry_info(&self, key: &CacheKey) -> Option<EntryInfo> {
		self.inner.state.lock().entries.peek(key).map(CacheEntry::info)
	}

	pub fn invalidate(&self, key: &CacheKey, reason: InvalidationReason) -> bool {
		self.remove_where(InvalidationTarget::Key(key.clone()), reason, |candidate, _| candidate == key) > 0
	}

	/// Removes every entry owned by `user_id`.
	pub fn invalidate_by_user_id(&self, user_id: &UserId, reason: InvalidationReason) -> usize {
		self.remove_where(InvalidationTarget::User(user_id.clone()), reason, |key, entry| {
			entry.user_id.as_ref() == Some(user_id) || key.user_id() == Some(user_id)
		})
	}

	/// Removes every entry tagged with `proposal_id`.
	pub fn invalidate_by_proposal_id(&self, proposal_id: &ProposalId, reason: InvalidationReason) -> usize {
		self.remove_where(InvalidationTarget::Proposal(proposal_id.clone()), reason, |key, entry| {
			entry.proposal_id.as_ref() == Some(proposal_id) || key.proposal_id() == Some(proposal_id)
		})
	}

	/// Removes every user proposal list immediately.
	pub fn invalidate_user_lists(&self, reason: InvalidationReason) -> usize {
		self.remove_where(InvalidationTarget::UserLists, reason, |key, _| matches!(key, CacheKey::UserProposals(_)))
	}

	pub fn clear(&self, reason: InvalidationReason) -> usize {
		self.remove_where(InvalidationTarget::All, reason, |_, _| true)
	}

	/// Drops every entry past its TTL. Logged only when something was removed.
	pub fn purge_expired(&self) -> usize {
		let now = Instant::now();
		let mut state = self.inner.state.lock();
		let expired: Vec<CacheKey> = state
			.entries
			.iter()
			.filter(|(_, entry)| entry.is_expired(now))
			.map(|(key, _)| key.clone())
			.collect();
		if expired.is_empty() {
			return 0;
		}
		for key in &expired {
			state.entries.pop(key);
		}
		state.stats.expired += expired.len() as u64;
		state.record(
			InvalidationTarget::Expired,
			InvalidationReason::TtlExpired,
			expired.len(),
			self.inner.config.invalidation_log_limit,
		);
		debug!(removed = expired.len(), "cache.purged");
		expired.len()
	}

	/// Applies a pushed status change.
	///
	/// A fresh detail entry has its `status` field rewritten in place and keeps
	/// its original timestamp; the status entry is replaced with the pushed
	/// value. User proposal lists are cleared once pushes stop arriving for the
	/// debounce window. Returns whether a detail entry was updated.
	pub fn apply_status_update(&self, update: &ProposalStatusUpdate) -> bool {
		let now = Instant::now();
		let detail_updated = {
			let mut guard = self.inner.state.lock();
			let state = &mut *guard;

			let detail_key = CacheKey::Proposal(update.proposal_id.clone());
			let mut detail_updated = false;
			let mut detail_stale = false;
			if let Some(entry) = state.entries.peek_mut(&detail_key) {
				if entry.is_expired(now) {
					detail_stale = true;
				} else if let Value::Object(fields) = &mut entry.data {
					fields.insert("status".to_owned(), Value::String(update.status.clone()));
					detail_updated = true;
				}
			}
			if detail_stale {
				state.entries.pop(&detail_key);
				state.stats.expired += 1;
			}

			let status_key = CacheKey::ProposalStatus(update.proposal_id.clone());
			let owner = state.entries.peek(&status_key).and_then(|entry| entry.user_id.clone());
			let status_entry = CacheEntry {
				data: json!({ "proposal_id": update.proposal_id, "status": update.status }),
				timestamp: now,
				last_accessed: now,
				access_count: 0,
				user_id: owner,
				proposal_id: Some(update.proposal_id.clone()),
				ttl: self.inner.config.ttl.for_class(status_key.class()),
			};
			if let Some((evicted, _)) = state.entries.push(status_key.clone(), status_entry) {
				if evicted != status_key {
					state.stats.evictions += 1;
				}
			}
			detail_updated
		};

		debug!(proposal = %update.proposal_id, status = %update.status, detail_updated, "cache.status_update");
		self.schedule_list_invalidation();
		detail_updated
	}

	/// Whether a debounced list invalidation is waiting to run.
	pub fn has_pending_list_invalidation(&self) -> bool {
		self.inner.state.lock().lists_dirty
	}

	/// Runs a pending list invalidation now. Returns the entries removed.
	pub fn flush_pending_list_invalidation(&self) -> usize {
		{
			let mut debounce = self.inner.debounce.lock();
			debounce.generation += 1;
			if let Some(task) = debounce.task.take() {
				task.abort();
			}
		}
		self.inner.flush_lists()
	}

	pub fn stats(&self) -> CacheStats {
		let state = self.inner.state.lock();
		CacheStats {
			entries: state.entries.len(),
			..state.stats
		}
	}

	/// Invalidation records, oldest first.
	pub fn invalidation_log(&self) -> Vec<InvalidationRecord> {
		self.inner.state.lock().log.iter().cloned().collect()
	}

	fn remove_where(&self, target: InvalidationTarget, reason: InvalidationReason, predicate: impl Fn(&CacheKey, &CacheEntry) -> bool) -> usize {
		let mut state = self.inner.state.lock();
		state.remove_where(target, reason, self.inner.config.invalidation_log_limit, predicate)
	}

	/// Each push restarts the quiet window. Without a runtime to host the
	/// timer the lists are cleared immediately.
	fn schedule_list_invalidation(&self) {
		self.inner.state.lock().lists_dirty = true;

		let quiet = self.inner.config.list_invalidation_debounce;
		if quiet.is_zero() {
			self.inner.flush_lists();
			return;
		}
		let Ok(handle) = Handle::try_current() else {
			debug!("cache.debounce_without_runtime");
			self.inner.flush_lists();
			return;
		};

		let mut debounce = self.inner.debounce.lock();
		debounce.generation += 1;
		let generation = debounce.generation;
		if let Some(previous) = debounce.task.take() {
			previous.abort();
		}
		let inner = Arc::clone(&self.inner);
		debounce.task = Some(handle.spawn(async move {
			tokio::time::sleep(quiet).await;
			if inner.debounce.lock().generation == generation {
				inner.flush_lists();
			}
		}));
	}
}

impl Inner {
	fn flush_lists(&self) -> usize {
		let mut state = self.state.lock();
		if !std::mem::take(&mut state.lists_dirty) {
			return 0;
		}
		state.remove_where(
			InvalidationTarget::UserLists,
			InvalidationReason::RealTimeUpdate,
			self.config.invalidation_log_limit,
			|key, _| matches!(key, CacheKey::UserProposals(_)),
		)
	}
}

impl State {
	fn remove_where(
		&mut self,
		target: InvalidationTarget,
		reason: InvalidationReason,
		log_limit: usize,
		predicate: impl Fn(&CacheKey, &CacheEntry) -> bool,
	) -> usize {
		let doomed: Vec<CacheKey> = self
			.entries
			.iter()
			.filter(|(key, entry)| predicate(key, entry))
			.map(|(key, _)| key.clone())
			.collect();
		for key in &doomed {
			self.entries.pop(key);
		}
		self.stats.invalidated += doomed.len() as u64;
		debug!(scope = ?target, reason = %reason, removed = doomed.len(), "cache.invalidated");
		self.record(target, reason, doomed.len(), log_limit);
		doomed.len()
	}

	fn record(&mut self, target: InvalidationTarget, reason: InvalidationReason, removed: usize, limit: usize) {
		self.log.push_back(InvalidationRecord {
			target,
			reason,
			removed,
			at: swapline_primitives::now(),
		});
		while self.log.len() > limit {
			self.log.pop_front();
		}
	}
}
