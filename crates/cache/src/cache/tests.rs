use std::time::Duration;

use pretty_assertions::assert_eq;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::*;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct ProposalView {
	id: String,
	status: String,
}

fn view(id: &str, status: &str) -> ProposalView {
	ProposalView {
		id: id.to_owned(),
		status: status.to_owned(),
	}
}

fn proposal_key(id: &str) -> CacheKey {
	CacheKey::Proposal(ProposalId::from(id))
}

fn list_key(user: &str) -> CacheKey {
	CacheKey::UserProposals(UserId::from(user))
}

#[test]
fn invalidate_by_proposal_id_removes_tagged_entry() {
	let cache = ProposalCache::default();
	cache.set(proposal_key("proposal-1"), &view("proposal-1", "pending"), EntryMeta::proposal("proposal-1"));

	let removed = cache.invalidate_by_proposal_id(&ProposalId::from("proposal-1"), InvalidationReason::ProposalAccepted);

	assert_eq!(removed, 1);
	assert_eq!(cache.get::<ProposalView>(&proposal_key("proposal-1")), None);
	let log = cache.invalidation_log();
	assert_eq!(log.len(), 1);
	assert_eq!(log[0].reason, InvalidationReason::ProposalAccepted);
	assert_eq!(log[0].target, InvalidationTarget::Proposal(ProposalId::from("proposal-1")));
}

#[test]
fn reads_do_not_refresh_write_timestamp() {
	let cache = ProposalCache::default();
	let key = proposal_key("p1");
	cache.set(key.clone(), &view("p1", "pending"), EntryMeta::default());
	let written = cache.entry_info(&key).map(|info| info.timestamp);

	let first = cache.get::<ProposalView>(&key);
	let second = cache.get::<ProposalView>(&key);

	assert_eq!(first, Some(view("p1", "pending")));
	assert_eq!(first, second);
	let info = cache.entry_info(&key).unwrap();
	assert_eq!(Some(info.timestamp), written);
	assert_eq!(info.access_count, 2);
	assert_eq!(cache.stats().hits, 2);
}

#[test]
fn key_scope_tags_entries_without_meta() {
	let cache = ProposalCache::default();
	cache.set(list_key("u1"), &vec![view("p1", "pending")], EntryMeta::default());

	let info = cache.entry_info(&list_key("u1")).unwrap();
	assert_eq!(info.user_id, Some(UserId::from("u1")));
	assert_eq!(info.ttl, Duration::from_secs(15));
}

#[test]
fn invalidate_by_user_id_covers_tagged_details() {
	let cache = ProposalCache::default();
	cache.set(list_key("u1"), &Vec::<ProposalView>::new(), EntryMeta::default());
	cache.set(CacheKey::TargetingHistory(UserId::from("u1")), &json!([]), EntryMeta::default());
	cache.set(proposal_key("p1"), &view("p1", "pending"), EntryMeta::user("u1"));
	cache.set(list_key("u2"), &Vec::<ProposalView>::new(), EntryMeta::default());

	let removed = cache.invalidate_by_user_id(&UserId::from("u1"), InvalidationReason::ManualRefresh);

	assert_eq!(removed, 3);
	assert!(cache.contains(&list_key("u2")));
	assert!(!cache.contains(&proposal_key("p1")));
	assert_eq!(cache.stats().invalidated, 3);
}

#[test]
fn malformed_payload_is_a_miss_and_dropped() {
	let cache = ProposalCache::default();
	let key = proposal_key("p1");
	cache.set_value(key.clone(), json!("not a proposal"), EntryMeta::default());

	assert_eq!(cache.get::<ProposalView>(&key), None);
	assert!(!cache.contains(&key));

	let stats = cache.stats();
	assert_eq!(stats.malformed, 1);
	assert_eq!(stats.misses, 1);
	let log = cache.invalidation_log();
	assert_eq!(log.last().map(|record| record.reason), Some(InvalidationReason::DeserializeFailed));
}

#[test]
fn invalidation_log_is_bounded() {
	let cache = ProposalCache::new(CacheConfig {
		invalidation_log_limit: 3,
		..CacheConfig::default()
	});
	let reasons = [
		InvalidationReason::ProposalCreated,
		InvalidationReason::ProposalAccepted,
		InvalidationReason::ProposalRejected,
		InvalidationReason::ProposalCancelled,
		InvalidationReason::ProposalRetargeted,
	];
	for reason in reasons {
		cache.invalidate(&proposal_key("p1"), reason);
	}

	let logged: Vec<_> = cache.invalidation_log().into_iter().map(|record| record.reason).collect();
	assert_eq!(logged, reasons[2..].to_vec());
}

#[test]
fn least_recently_used_entry_is_evicted() {
	let cache = ProposalCache::new(CacheConfig {
		max_entries: 2,
		..CacheConfig::default()
	});
	cache.set(proposal_key("a"), &view("a", "pending"), EntryMeta::default());
	cache.set(proposal_key("b"), &view("b", "pending"), EntryMeta::default());
	assert!(cache.get::<ProposalView>(&proposal_key("a")).is_some());

	cache.set(proposal_key("c"), &view("c", "pending"), EntryMeta::default());

	assert!(cache.contains(&proposal_key("a")));
	assert!(!cache.contains(&proposal_key("b")));
	assert!(cache.contains(&proposal_key("c")));
	assert_eq!(cache.stats().evictions, 1);
}

#[test]
fn overwriting_a_key_is_not_an_eviction() {
	let cache = ProposalCache::default();
	cache.set(proposal_key("a"), &view("a", "pending"), EntryMeta::default());
	cache.set(proposal_key("a"), &view("a", "accepted"), EntryMeta::default());

	assert_eq!(cache.get::<ProposalView>(&proposal_key("a")), Some(view("a", "accepted")));
	assert_eq!(cache.stats().evictions, 0);
	assert_eq!(cache.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn entries_expire_after_class_ttl() {
	let cache = ProposalCache::default();
	cache.set(list_key("u1"), &vec![view("p1", "pending")], EntryMeta::default());

	tokio::time::advance(Duration::from_secs(14)).await;
	assert!(cache.get::<Vec<ProposalView>>(&list_key("u1")).is_some());

	tokio::time::advance(Duration::from_secs(2)).await;
	assert_eq!(cache.get::<Vec<ProposalView>>(&list_key("u1")), None);
	assert_eq!(cache.stats().expired, 1);
}

#[tokio::test(start_paused = true)]
async fn meta_ttl_overrides_class_ttl() {
	let cache = ProposalCache::default();
	let key = CacheKey::TargetingHistory(UserId::from("u1"));
	cache.set(key.clone(), &json!([]), EntryMeta::default().ttl(Duration::from_secs(1)));

	tokio::time::advance(Duration::from_secs(2)).await;
	assert!(!cache.contains(&key));
}

#[tokio::test(start_paused = true)]
async fn purge_expired_logs_one_record() {
	let cache = ProposalCache::default();
	cache.set(list_key("u1"), &json!([]), EntryMeta::default());
	cache.set(list_key("u2"), &json!([]), EntryMeta::default());
	cache.set(proposal_key("p1"), &view("p1", "pending"), EntryMeta::default());

	assert_eq!(cache.purge_expired(), 0);
	tokio::time::advance(Duration::from_secs(20)).await;
	assert_eq!(cache.purge_expired(), 2);

	let log = cache.invalidation_log();
	assert_eq!(log.len(), 1);
	assert_eq!(log[0].target, InvalidationTarget::Expired);
	assert_eq!(log[0].removed, 2);
	assert!(cache.contains(&proposal_key("p1")));
}

#[test]
fn status_update_rewrites_detail_in_place() {
	let cache = ProposalCache::new(CacheConfig {
		list_invalidation_debounce: Duration::ZERO,
		..CacheConfig::default()
	});
	let key = proposal_key("p1");
	cache.set_value(key.clone(), json!({ "id": "p1", "status": "pending", "note": "keep" }), EntryMeta::default());
	let written = cache.entry_info(&key).map(|info| info.timestamp);

	assert!(cache.apply_status_update(&ProposalStatusUpdate::new("p1", "accepted")));

	let detail: Value = cache.get(&key).unwrap();
	assert_eq!(detail, json!({ "id": "p1", "status": "accepted", "note": "keep" }));
	assert_eq!(cache.entry_info(&key).map(|info| info.timestamp), written);

	let status: Value = cache.get(&CacheKey::ProposalStatus(ProposalId::from("p1"))).unwrap();
	assert_eq!(status, json!({ "proposal_id": "p1", "status": "accepted" }));
}

#[test]
fn status_update_without_runtime_clears_lists_immediately() {
	let cache = ProposalCache::default();
	cache.set(list_key("u1"), &json!([]), EntryMeta::default());

	assert!(!cache.apply_status_update(&ProposalStatusUpdate::new("p9", "rejected")));

	assert!(!cache.contains(&list_key("u1")));
	assert!(!cache.has_pending_list_invalidation());
}

#[tokio::test(start_paused = true)]
async fn pushed_updates_coalesce_into_one_list_invalidation() {
	let cache = ProposalCache::default();
	cache.set(list_key("u1"), &json!([]), EntryMeta::default());
	cache.set(list_key("u2"), &json!([]), EntryMeta::default());

	for status in ["accepted", "rejected", "cancelled"] {
		cache.apply_status_update(&ProposalStatusUpdate::new("p1", status));
		tokio::time::sleep(Duration::from_millis(100)).await;
	}

	tokio::time::sleep(Duration::from_millis(200)).await;
	assert!(cache.has_pending_list_invalidation());
	assert!(cache.contains(&list_key("u1")));

	tokio::time::sleep(Duration::from_millis(250)).await;
	assert!(!cache.has_pending_list_invalidation());
	assert!(!cache.contains(&list_key("u1")));
	assert!(!cache.contains(&list_key("u2")));

	let list_records: Vec<_> = cache
		.invalidation_log()
		.into_iter()
		.filter(|record| record.target == InvalidationTarget::UserLists)
		.collect();
	assert_eq!(list_records.len(), 1);
	assert_eq!(list_records[0].reason, InvalidationReason::RealTimeUpdate);
	assert_eq!(list_records[0].removed, 2);
}

#[tokio::test(start_paused = true)]
async fn flush_runs_pending_list_invalidation_early() {
	let cache = ProposalCache::default();
	cache.set(list_key("u1"), &json!([]), EntryMeta::default());
	cache.apply_status_update(&ProposalStatusUpdate::new("p1", "accepted"));

	assert_eq!(cache.flush_pending_list_invalidation(), 1);
	assert_eq!(cache.flush_pending_list_invalidation(), 0);

	tokio::time::sleep(Duration::from_secs(1)).await;
	assert_eq!(cache.invalidation_log().len(), 1);
}
