//! # finweb-interception
//!
//! Driver event-interception layer.
//!
//! Every physical browser action the step layer performs goes through an
//! [`Interceptor`], which runs recovery hooks after the action succeeds:
//! consent overlays get closed, promotional popups get dismissed, legacy
//! suppression cookies get rewritten. Hooks are gated by the session's
//! one-shot flags, so each recovery runs at most once per browser session,
//! and a hook failure never fails the action that triggered it.

pub mod cookies;
pub mod intercept;
pub mod locators;
pub mod popups;
pub mod relevance;

pub use intercept::Interceptor;
