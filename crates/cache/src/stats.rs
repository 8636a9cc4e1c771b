/// Cache counters since construction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
	pub hits: u64,
	pub misses: u64,
	/// Entries dropped on read because their TTL had elapsed.
	pub expired: u64,
	/// Entries dropped to stay within capacity.
	pub evictions: u64,
	/// Entries removed by invalidation calls.
	pub invalidated: u64,
	/// Entries whose payload failed to deserialize.
	pub malformed: u64,
	pub entries: usize,
}

impl CacheStats {
	pub fn hit_rate(&self) -> f64 {
		let total = self.hits + self.misses;
		if total == 0 { 0.0 } else { self.hits as f64 / total as f64 }
	}
}
