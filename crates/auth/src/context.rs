use swapline_primitives::{RequestId, SwapId, UserId};

/// Call-site description supplied alongside a raw error.
///
/// Only used to classify; never persisted beyond the error's lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
	pub endpoint: String,
	pub operation: String,
	pub swap_id: Option<SwapId>,
	pub target_swap_id: Option<SwapId>,
	pub user_id: Option<UserId>,
	pub request_id: RequestId,
	pub is_retry: bool,
	pub retry_count: u32,
}

impl ErrorContext {
	/// Creates a context for a first attempt with a fresh request id.
	pub fn new(endpoint: impl Into<String>, operation: impl Into<String>) -> Self {
		Self {
			endpoint: endpoint.into(),
			operation: operation.into(),
			swap_id: None,
			target_swap_id: None,
			user_id: None,
			request_id: RequestId::generate(),
			is_retry: false,
			retry_count: 0,
		}
	}

	#[must_use]
	pub fn swap(mut self, swap_id: SwapId) -> Self {
		self.swap_id = Some(swap_id);
		self
	}

	#[must_use]
	pub fn target_swap(mut self, target_swap_id: SwapId) -> Self {
		self.target_swap_id = Some(target_swap_id);
		self
	}

	#[must_use]
	pub fn user(mut self, user_id: UserId) -> Self {
		self.user_id = Some(user_id);
		self
	}

	#[must_use]
	pub fn request_id(mut self, request_id: RequestId) -> Self {
		self.request_id = request_id;
		self
	}

	/// Marks the context as the `retry_count`-th retry of the same call.
	#[must_use]
	pub fn retry(mut self, retry_count: u32) -> Self {
		self.is_retry = retry_count > 0;
		self.retry_count = retry_count;
		self
	}
}
