use std::time::Duration;

/// Escalation threshold: `count` errors of one category within `window`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BurstThreshold {
	pub count: usize,
	pub window: Duration,
}

impl BurstThreshold {
	pub const fn new(count: usize, window: Duration) -> Self {
		Self { count, window }
	}
}

/// Resilience manager configuration.
#[derive(Debug, Clone)]
pub struct ResilienceConfig {
	/// Reconnection attempts before the connection is declared dead.
	pub max_reconnection_attempts: u32,
	pub auth_burst: BurstThreshold,
	pub server_burst: BurstThreshold,
	pub network_burst: BurstThreshold,
	/// Rolling error history length.
	pub history_limit: usize,
	/// Broadcast buffer for connection signals.
	pub signal_buffer: usize,
}

impl Default for ResilienceConfig {
	fn default() -> Self {
		Self {
			max_reconnection_attempts: 10,
			auth_burst: BurstThreshold::new(3, Duration::from_secs(60)),
			server_burst: BurstThreshold::new(5, Duration::from_secs(300)),
			network_burst: BurstThreshold::new(4, Duration::from_secs(180)),
			history_limit: 50,
			signal_buffer: 32,
		}
	}
}
