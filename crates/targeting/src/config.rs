/// Coordinator behavior switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinatorConfig {
	/// Apply speculative local state before the remote call returns.
	pub optimistic_updates: bool,
	/// Upper bound on retries per logical operation; the classified strategy
	/// may allow fewer.
	pub max_retries: u32,
}

impl Default for CoordinatorConfig {
	fn default() -> Self {
		Self {
			optimistic_updates: true,
			max_retries: 3,
		}
	}
}
