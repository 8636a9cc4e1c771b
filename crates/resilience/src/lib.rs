//! Connection resilience for the long-lived realtime channel.
//!
//! [`ConnectionResilienceManager`] watches reconnection attempts and
//! connection-level errors reported by the transport and decides when the
//! connection is beyond automatic recovery. Once it declares a
//! [`PermanentFailure`] it broadcasts [`ConnectionSignal::StopReconnection`],
//! the authoritative instruction for the transport to stop retrying, and
//! nothing short of [`ConnectionResilienceManager::reset`] clears it.
//!
//! State machine:
//!
//! ```text
//! Connected -> Reconnecting -> (Reconnecting | PermanentlyFailed)
//!     ^                                             |
//!     +------------------- reset() -----------------+
//! ```

mod config;
mod error;
mod failure;
mod manager;
mod recovery;
mod signal;

pub use config::{BurstThreshold, ResilienceConfig};
pub use error::{ConnectionError, ErrorCategory};
pub use failure::{FailureReason, PermanentFailure};
pub use manager::ConnectionResilienceManager;
pub use recovery::{RecoveryAction, RecoveryError, RecoveryOption};
pub use signal::{ConnectionHealth, ConnectionSignal, ConnectionState};
