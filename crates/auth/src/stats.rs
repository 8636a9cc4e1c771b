use std::collections::HashMap;

use crate::classifier::Classification;
use crate::kind::AuthErrorKind;

/// Running counters over recorded classifications.
///
/// Kept apart from the classifier so classification itself stays pure.
#[derive(Debug, Clone, Default)]
pub struct ClassificationStats {
	total: u64,
	by_kind: HashMap<AuthErrorKind, u64>,
	targeting_related: u64,
	logouts_triggered: u64,
	logouts_suppressed: u64,
}

impl ClassificationStats {
	pub fn record(&mut self, classification: &Classification) {
		self.total += 1;
		*self.by_kind.entry(classification.kind()).or_default() += 1;
		if classification.error.is_targeting_related() {
			self.targeting_related += 1;
		}
		if classification.should_trigger_logout {
			self.logouts_triggered += 1;
		}
		// Targeting auth kinds stand in for session kinds that would have logged the user out.
		if matches!(
			classification.kind(),
			AuthErrorKind::TargetingAuthFailure | AuthErrorKind::TargetingTokenValidationFailed
		) {
			self.logouts_suppressed += 1;
		}
	}

	pub fn total(&self) -> u64 {
		self.total
	}

	pub fn count(&self, kind: AuthErrorKind) -> u64 {
		self.by_kind.get(&kind).copied().unwrap_or(0)
	}

	pub fn targeting_related(&self) -> u64 {
		self.targeting_related
	}

	pub fn logouts_triggered(&self) -> u64 {
		self.logouts_triggered
	}

	/// Targeting auth failures that did not end the session.
	pub fn logouts_suppressed(&self) -> u64 {
		self.logouts_suppressed
	}
}
