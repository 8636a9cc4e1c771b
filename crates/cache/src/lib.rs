//! Proposal and targeting cache.
//!
//! Volatile per-user and per-proposal reads are cached for a short, per-class
//! TTL. Entries are never served past their TTL, every invalidation is
//! tagged with a reason and logged, and server-pushed status changes update
//! detail entries in place while the user proposal lists (whose recipients
//! are not known precisely) are cleared after a debounce window.

mod cache;
mod config;
mod entry;
mod invalidation;
mod key;
mod stats;

pub use cache::{ProposalCache, ProposalStatusUpdate};
pub use config::{CacheConfig, TtlConfig};
pub use entry::{EntryInfo, EntryMeta};
pub use invalidation::{InvalidationReason, InvalidationRecord, InvalidationTarget};
pub use key::{CacheClass, CacheKey};
pub use stats::CacheStats;
