use async_trait::async_trait;
use swapline_auth::RawError;
use swapline_primitives::{OperationId, ProposalId, RequestId, SwapId, TargetingActionKind};

use crate::model::TargetingReceipt;

/// One attempt of a targeting call, as handed to the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteRequest {
	/// Stable across retries of the same logical operation.
	pub operation_id: OperationId,
	/// Fresh per attempt.
	pub request_id: RequestId,
	pub kind: TargetingActionKind,
	pub endpoint: String,
	pub swap_id: SwapId,
	pub target_swap_id: Option<SwapId>,
	pub proposal_id: Option<ProposalId>,
	pub message: Option<String>,
	/// Zero for the first attempt.
	pub attempt: u32,
}

/// Transport boundary for targeting calls.
///
/// Implementations translate transport failures into [`RawError`] and
/// apply their own request timeouts.
#[async_trait]
pub trait RemoteInvoker: Send + Sync {
	async fn invoke(&self, request: RemoteRequest) -> Result<TargetingReceipt, RawError>;
}
