//! # finweb-driver
//!
//! Browser session ownership for finweb over the WebDriver protocol.
//!
//! A [`DriverHandle`] owns exactly one remote browser session, built from a
//! `(browser, version, execution mode)` triple. In cloud mode the remote
//! session id is captured immediately after connecting so the recording can
//! still be fetched after the session itself became unusable.
//!
//! The [`BrowserActions`] trait is the minimal action surface the rest of
//! the framework programs against; production code talks to the real
//! session, tests talk to scripted fakes.
//!
//! [`wait`] holds the bounded polling primitives every higher-level wait in
//! the framework is built on.

pub mod actions;
pub mod capabilities;
pub mod handle;
pub mod timeouts;
pub mod wait;

pub use actions::BrowserActions;
pub use capabilities::build_capabilities;
pub use handle::DriverHandle;
pub use wait::{wait_until, Lookup};
