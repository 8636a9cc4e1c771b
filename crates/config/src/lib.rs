//! Configuration for the swapline targeting core.
//!
//! A single TOML document with optional `[classifier]`, `[resilience]`,
//! `[cache]` and `[coordinator]` sections. Absent keys keep the defaults of
//! the component they configure; durations are written in milliseconds.
//!
//! ```toml
//! [resilience]
//! max_reconnection_attempts = 6
//! auth_burst = { count = 2, window_ms = 30000 }
//!
//! [cache]
//! user_proposals_ttl_ms = 10000
//!
//! [coordinator]
//! optimistic_updates = false
//! ```

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use swapline_auth::ClassifierConfig;
use swapline_cache::{CacheConfig, TtlConfig};
use swapline_resilience::{BurstThreshold, ResilienceConfig};
use swapline_targeting::CoordinatorConfig;

mod error;

pub use error::{ConfigError, Result};

/// Parsed configuration document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SwaplineConfig {
	pub classifier: ClassifierSection,
	pub resilience: ResilienceSection,
	pub cache: CacheSection,
	pub coordinator: CoordinatorSection,
}

/// `[classifier]`: lists replace the built-in defaults when present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClassifierSection {
	pub targeting_routes: Option<Vec<String>>,
	pub targeting_keywords: Option<Vec<String>>,
	/// Appended to whichever route list is in effect.
	pub extra_targeting_routes: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BurstSection {
	pub count: usize,
	pub window_ms: u64,
}

impl From<BurstThreshold> for BurstSection {
	fn from(threshold: BurstThreshold) -> Self {
		Self {
			count: threshold.count,
			window_ms: millis(threshold.window),
		}
	}
}

impl From<BurstSection> for BurstThreshold {
	fn from(section: BurstSection) -> Self {
		BurstThreshold::new(section.count, Duration::from_millis(section.window_ms))
	}
}

/// `[resilience]`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResilienceSection {
	pub max_reconnection_attempts: u32,
	pub auth_burst: BurstSection,
	pub server_burst: BurstSection,
	pub network_burst: BurstSection,
	pub history_limit: usize,
	pub signal_buffer: usize,
}

impl Default for ResilienceSection {
	fn default() -> Self {
		let defaults = ResilienceConfig::default();
		Self {
			max_reconnection_attempts: defaults.max_reconnection_attempts,
			auth_burst: defaults.auth_burst.into(),
			server_burst: defaults.server_burst.into(),
			network_burst: defaults.network_burst.into(),
			history_limit: defaults.history_limit,
			signal_buffer: defaults.signal_buffer,
		}
	}
}

/// `[cache]`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheSection {
	pub user_proposals_ttl_ms: u64,
	pub proposal_status_ttl_ms: u64,
	pub proposal_detail_ttl_ms: u64,
	pub targeting_history_ttl_ms: u64,
	pub max_entries: usize,
	pub invalidation_log_limit: usize,
	pub list_invalidation_debounce_ms: u64,
}

impl Default for CacheSection {
	fn default() -> Self {
		let defaults = CacheConfig::default();
		Self {
			user_proposals_ttl_ms: millis(defaults.ttl.user_proposals),
			proposal_status_ttl_ms: millis(defaults.ttl.proposal_status),
			proposal_detail_ttl_ms: millis(defaults.ttl.proposal_detail),
			targeting_history_ttl_ms: millis(defaults.ttl.targeting_history),
			max_entries: defaults.max_entries,
			invalidation_log_limit: defaults.invalidation_log_limit,
			list_invalidation_debounce_ms: millis(defaults.list_invalidation_debounce),
		}
	}
}

/// `[coordinator]`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoordinatorSection {
	pub optimistic_updates: bool,
	pub max_retries: u32,
}

impl Default for CoordinatorSection {
	fn default() -> Self {
		let defaults = CoordinatorConfig::default();
		Self {
			optimistic_updates: defaults.optimistic_updates,
			max_retries: defaults.max_retries,
		}
	}
}

impl SwaplineConfig {
	/// Parses and validates a TOML document.
	pub fn from_toml_str(content: &str) -> Result<Self> {
		let config: Self = toml::from_str(content)?;
		config.validate()?;
		Ok(config)
	}

	/// Reads, parses and validates a TOML file.
	pub fn load_from_path(path: &Path) -> Result<Self> {
		let content = std::fs::read_to_string(path).map_err(|error| ConfigError::Io {
			path: path.to_path_buf(),
			error,
		})?;
		Self::from_toml_str(&content)
	}

	/// Like [`Self::load_from_path`], but a missing file yields the defaults.
	pub fn load_or_default(path: &Path) -> Result<Self> {
		if !path.exists() {
			return Ok(Self::default());
		}
		Self::load_from_path(path)
	}

	pub fn validate(&self) -> Result<()> {
		let r = &self.resilience;
		ensure(r.max_reconnection_attempts > 0, "resilience.max_reconnection_attempts", "must be at least 1")?;
		for (field, burst) in [
			("resilience.auth_burst", r.auth_burst),
			("resilience.server_burst", r.server_burst),
			("resilience.network_burst", r.network_burst),
		] {
			ensure(burst.count > 0, field, "count must be at least 1")?;
			ensure(burst.window_ms > 0, field, "window_ms must be positive")?;
		}
		ensure(r.signal_buffer > 0, "resilience.signal_buffer", "must be at least 1")?;

		let c = &self.cache;
		ensure(c.max_entries > 0, "cache.max_entries", "must be at least 1")?;
		for (field, ttl) in [
			("cache.user_proposals_ttl_ms", c.user_proposals_ttl_ms),
			("cache.proposal_status_ttl_ms", c.proposal_status_ttl_ms),
			("cache.proposal_detail_ttl_ms", c.proposal_detail_ttl_ms),
			("cache.targeting_history_ttl_ms", c.targeting_history_ttl_ms),
		] {
			ensure(ttl > 0, field, "must be positive")?;
		}
		Ok(())
	}

	pub fn classifier_config(&self) -> ClassifierConfig {
		let defaults = ClassifierConfig::default();
		let section = &self.classifier;
		let mut targeting_routes = section.targeting_routes.clone().unwrap_or(defaults.targeting_routes);
		targeting_routes.extend(section.extra_targeting_routes.iter().cloned());
		ClassifierConfig {
			targeting_routes,
			targeting_keywords: section.targeting_keywords.clone().unwrap_or(defaults.targeting_keywords),
		}
	}

	pub fn resilience_config(&self) -> ResilienceConfig {
		let section = &self.resilience;
		ResilienceConfig {
			max_reconnection_attempts: section.max_reconnection_attempts,
			auth_burst: section.auth_burst.into(),
			server_burst: section.server_burst.into(),
			network_burst: section.network_burst.into(),
			history_limit: section.history_limit,
			signal_buffer: section.signal_buffer,
		}
	}

	pub fn cache_config(&self) -> CacheConfig {
		let section = &self.cache;
		CacheConfig {
			ttl: TtlConfig {
				user_proposals: Duration::from_millis(section.user_proposals_ttl_ms),
				proposal_status: Duration::from_millis(section.proposal_status_ttl_ms),
				proposal_detail: Duration::from_millis(section.proposal_detail_ttl_ms),
				targeting_history: Duration::from_millis(section.targeting_history_ttl_ms),
			},
			max_entries: section.max_entries,
			invalidation_log_limit: section.invalidation_log_limit,
			list_invalidation_debounce: Duration::from_millis(section.list_invalidation_debounce_ms),
		}
	}

	pub fn coordinator_config(&self) -> CoordinatorConfig {
		CoordinatorConfig {
			optimistic_updates: self.coordinator.optimistic_updates,
			max_retries: self.coordinator.max_retries,
		}
	}
}

fn ensure(condition: bool, field: &'static str, reason: &'static str) -> Result<()> {
	if condition { Ok(()) } else { Err(ConfigError::Invalid { field, reason }) }
}

fn millis(duration: Duration) -> u64 {
	u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
