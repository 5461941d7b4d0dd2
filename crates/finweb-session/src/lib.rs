//! # finweb-session
//!
//! Per-worker execution state for finweb.
//!
//! Every concurrently executing scenario runs inside its own
//! [`SessionContext`]: the driver handle, the scenario descriptor, the
//! one-shot recovery flags and the edition all live there and nowhere
//! else. Contexts are reached through a [`ContextRegistry`] keyed by
//! worker id — an explicit registry, not implicit process-wide state — so
//! nothing a worker writes is ever observable from another worker.
//!
//! The [`RetryCoordinator`] is the one deliberately shared structure: a
//! process-wide attempt ledger keyed by stable scenario identity.

mod context;
mod flags;
mod registry;
mod retry;

pub use context::SessionContext;
pub use flags::{CookieGroup, FlagKey, FlagSet, PromoCampaign};
pub use registry::{ContextRegistry, WorkerId};
pub use retry::{AttemptPhase, RetryCoordinator};
