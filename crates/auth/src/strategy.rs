use std::time::Duration;

/// Growth shape of successive retry delays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
	Fixed,
	Linear,
	Exponential,
}

/// Retry schedule for one error kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryStrategy {
	/// Delay before the first retry.
	pub base_delay: Duration,
	/// Retries allowed for this kind.
	pub max_attempts: u32,
	pub backoff: Backoff,
	/// Upper bound on any single delay.
	pub max_delay: Duration,
}

impl RetryStrategy {
	pub const fn fixed(base_delay: Duration, max_attempts: u32) -> Self {
		Self {
			base_delay,
			max_attempts,
			backoff: Backoff::Fixed,
			max_delay: base_delay,
		}
	}

	pub const fn linear(base_delay: Duration, max_attempts: u32, max_delay: Duration) -> Self {
		Self {
			base_delay,
			max_attempts,
			backoff: Backoff::Linear,
			max_delay,
		}
	}

	pub const fn exponential(base_delay: Duration, max_attempts: u32, max_delay: Duration) -> Self {
		Self {
			base_delay,
			max_attempts,
			backoff: Backoff::Exponential,
			max_delay,
		}
	}

	/// Replaces the base delay, raising the cap if needed.
	#[must_use]
	pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
		self.base_delay = base_delay;
		self.max_delay = self.max_delay.max(base_delay);
		self
	}

	/// Delay before retry number `retry` (1-based).
	pub fn delay_for_attempt(&self, retry: u32) -> Duration {
		let retry = retry.max(1);
		let delay = match self.backoff {
			Backoff::Fixed => self.base_delay,
			Backoff::Linear => self.base_delay.saturating_mul(retry),
			Backoff::Exponential => {
				let exponent = (retry - 1).min(16);
				self.base_delay.saturating_mul(1u32 << exponent)
			}
		};
		delay.min(self.max_delay)
	}

	/// Whether another retry is allowed after `retries_done` retries.
	pub fn allows(&self, retries_done: u32) -> bool {
		retries_done < self.max_attempts
	}
}
