//! Waiting durations used across the framework
//!
//! The site renders slowly and unevenly; every wait in the framework is
//! bounded by one of these.

use std::time::Duration;

/// Default element wait
pub const ELEMENT_WAIT_FULL: Duration = Duration::from_secs(10);

/// Half of the full element wait
pub const ELEMENT_WAIT_MEDIUM: Duration = Duration::from_secs(5);

/// Third of the full element wait
pub const ELEMENT_WAIT_SMALL: Duration = Duration::from_millis(3_333);

/// Staleness/quick-probe wait
pub const MINIMAL_WAIT: Duration = Duration::from_millis(500);

/// How long a consent/promo overlay gets to show up before it is treated
/// as absent for this session
pub const POPUP_WAIT: Duration = Duration::from_secs(5);

/// Settle time after a navigation before post-navigation hooks inspect
/// the page
pub const PAGE_SETTLE: Duration = Duration::from_secs(5);

/// Polling interval of the bounded waits
pub const POLL_INTERVAL: Duration = Duration::from_millis(250);
