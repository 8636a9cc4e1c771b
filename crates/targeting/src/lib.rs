//! Optimistic coordination of swap targeting actions.
//!
//! [`TargetingCoordinator`] runs create, accept, reject, cancel and retarget
//! against a local [`TargetingStore`] and a [`RemoteInvoker`]. Every
//! speculative mutation is preceded by a [`StoreSnapshot`] of the slots it
//! touches, so a failed attempt restores local state exactly. Failures are
//! classified by `swapline-auth`; targeting-scoped authentication failures
//! are retried or surfaced locally and never end the session.

mod action;
mod config;
mod coordinator;
mod error;
mod ledger;
mod model;
mod mutation;
mod remote;
mod session;
mod store;

pub use config::CoordinatorConfig;
pub use coordinator::{CoordinatorStats, OptimisticUpdate, TargetingCoordinator, TargetingCoordinatorBuilder};
pub use error::{Result, TargetingError};
pub use ledger::{RetryKey, RetryTarget};
pub use model::{EventOrigin, IncomingTarget, OutgoingTarget, TargetStatus, TargetingEvent, TargetingPushEvent, TargetingReceipt};
pub use mutation::{SlotSnapshot, StoreMutation, StoreSlot, StoreSnapshot};
pub use remote::{RemoteInvoker, RemoteRequest};
pub use session::{NullSessionGuard, SessionGuard};
pub use store::{InMemoryTargetingStore, TargetingStore};
