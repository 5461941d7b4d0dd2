//! # finweb-core
//!
//! Core types for the finweb browser test framework.
//!
//! finweb drives a remote browser through the WebDriver protocol to execute
//! behavior-specified scenarios against a financial-information website.
//! This crate carries the pieces every other crate needs:
//!
//! - the unified [`FinwebError`] type and [`Result`] alias
//! - the environment-driven run configuration ([`RunParams`])
//! - shared domain types (edition, execution mode, browser kind,
//!   scenario descriptor, attempt outcome)

mod config;
mod error;
mod scenario;
mod types;

pub use config::RunParams;
pub use error::{FinwebError, Result};
pub use scenario::ScenarioDescriptor;
pub use types::{AttemptOutcome, BrowserKind, Edition, ExecutionMode};
