//! Authentication error taxonomy for the targeting core.
//!
//! Transport failures enter as a closed [`RawError`] built at the transport
//! boundary. [`ErrorClassifier::classify`] turns one into a [`Classification`]:
//! an immutable [`AuthError`] plus the handling policy (logout, retry,
//! backoff, user-facing copy).
//!
//! The overriding rule: a failure raised by a targeting-scoped call never
//! ends the user's session, whatever its status code looks like. The rule is
//! enforced twice, once in kind selection (targeting 401s never map to the
//! session kinds) and once when [`AuthError`] is constructed.

mod classifier;
mod context;
mod error;
mod kind;
mod messages;
mod raw;
mod stats;
mod strategy;

pub use classifier::{Classification, ClassifierConfig, ErrorClassifier};
pub use context::ErrorContext;
pub use error::AuthError;
pub use kind::AuthErrorKind;
pub use raw::{HttpFailure, NetworkErrorKind, NetworkFailure, RawError, TokenFailure, TokenFailureKind};
pub use stats::ClassificationStats;
pub use strategy::{Backoff, RetryStrategy};
