use swapline_auth::AuthError;

/// Ends the user's session.
///
/// Called only for errors whose classification demands a logout, which a
/// targeting-related error never does.
pub trait SessionGuard: Send + Sync {
	fn logout(&self, error: &AuthError);
}

/// Guard for contexts without a session to end.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSessionGuard;

impl SessionGuard for NullSessionGuard {
	fn logout(&self, error: &AuthError) {
		tracing::debug!(kind = %error.kind(), "session.logout_ignored");
	}
}
