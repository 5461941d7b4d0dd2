//! # finweb-runner
//!
//! Scenario lifecycle for finweb: the before/after hooks every worker runs
//! around a scenario attempt, tying the session registry, the driver, the
//! interception layer, retry coordination and failure reporting together.

mod hooks;
mod logging;

pub use hooks::Runner;
pub use logging::init_logging;
