use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! string_id {
	($(#[$meta:meta])* $name:ident) => {
		$(#[$meta])*
		#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
		#[serde(transparent)]
		pub struct $name(String);

		impl $name {
			/// Wraps a raw identifier.
			pub fn new(id: impl Into<String>) -> Self {
				Self(id.into())
			}

			/// Returns the raw identifier.
			pub fn as_str(&self) -> &str {
				&self.0
			}
		}

		impl fmt::Display for $name {
			fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				f.write_str(&self.0)
			}
		}

		impl From<&str> for $name {
			fn from(id: &str) -> Self {
				Self(id.to_owned())
			}
		}

		impl From<String> for $name {
			fn from(id: String) -> Self {
				Self(id)
			}
		}
	};
}

string_id!(
	/// Identifier of a published swap offer.
	SwapId
);

string_id!(
	/// Identifier of a marketplace user.
	UserId
);

string_id!(
	/// Identifier of a targeting proposal (one swap targeting another).
	ProposalId
);

string_id!(
	/// Correlation id for one transport request.
	RequestId
);

impl RequestId {
	/// Generates a fresh random request id.
	pub fn generate() -> Self {
		Self(Uuid::new_v4().to_string())
	}
}

/// Unique identifier of one logical targeting operation.
///
/// Stays stable across retries of the same operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OperationId(pub Uuid);

impl OperationId {
	/// Generates a fresh operation id.
	pub fn generate() -> Self {
		Self(Uuid::new_v4())
	}

	/// Placeholder target id shown in the UI until the server assigns one.
	pub fn placeholder_target_id(&self) -> String {
		format!("optimistic-{}", self.0)
	}
}

impl fmt::Display for OperationId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "op-{}", self.0)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn string_ids_serialize_transparently() {
		let id = SwapId::new("swap-42");
		assert_eq!(serde_json::to_string(&id).unwrap(), "\"swap-42\"");
		let back: SwapId = serde_json::from_str("\"swap-42\"").unwrap();
		assert_eq!(back, id);
	}

	#[test]
	fn operation_ids_serialize_as_uuid_strings() {
		let id = OperationId(Uuid::nil());
		let json = serde_json::to_string(&id).unwrap();
		assert_eq!(json, "\"00000000-0000-0000-0000-000000000000\"");
		let back: OperationId = serde_json::from_str(&json).unwrap();
		assert_eq!(back, id);
	}

	#[test]
	fn placeholder_target_ids_are_unique_per_operation() {
		let a = OperationId::generate();
		let b = OperationId::generate();
		assert_ne!(a.placeholder_target_id(), b.placeholder_target_id());
		assert!(a.placeholder_target_id().starts_with("optimistic-"));
	}
}
