//! Shared types for the targeting coordination core.
//!
//! Identifiers for swaps, users, proposals and in-flight operations, the
//! closed set of targeting action kinds, and the wall-clock timestamp type
//! used by every record that outlives a single call.

/// Targeting action kinds.
pub mod action;
/// Identifier newtypes.
pub mod ids;

pub use action::TargetingActionKind;
pub use ids::{OperationId, ProposalId, RequestId, SwapId, UserId};

/// Wall-clock timestamp attached to classified errors, failures and log records.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Returns the current wall-clock time.
pub fn now() -> Timestamp {
	chrono::Utc::now()
}
