//! Bounded-duration condition polling
//!
//! Base primitive for every higher wait in the framework: poll a condition
//! at a fixed short interval until it produces a value or the duration
//! elapses. A wait blocks only the calling worker's task; it never yields
//! control to unrelated scenarios.
//!
//! Element-level outcomes are explicit values, not caught exceptions: a
//! lookup that resolves to nothing returns `Ok(None)`, and callers
//! distinguish `Timeout` (slow) from `ElementNotFound` (can never resolve).

use std::future::Future;
use std::time::Duration;

use finweb_core::{FinwebError, Result};
use tokio::time::{sleep, Instant};
use tracing::debug;

use crate::timeouts::POLL_INTERVAL;

/// Outcome of a bounded element probe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    Found,
    NotFound,
    Timeout,
}

/// Which of two alternate locators satisfied a wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EitherVisible {
    First,
    Second,
}

/// Poll `condition` every [`POLL_INTERVAL`] until it yields a value or
/// `duration` elapses.
///
/// The condition reports "not yet" as `Ok(None)`; hard errors propagate
/// immediately and end the wait.
pub async fn wait_until<T, F, Fut>(duration: Duration, description: &str, mut condition: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>>>,
{
    debug!(condition = description, timeout_ms = duration.as_millis() as u64, "waiting");
    let started = Instant::now();

    loop {
        if let Some(value) = condition().await? {
            return Ok(value);
        }

        let elapsed = started.elapsed();
        if elapsed >= duration {
            return Err(FinwebError::Timeout {
                condition: description.to_string(),
                waited_ms: elapsed.as_millis() as u64,
            });
        }

        let remaining = duration - elapsed;
        sleep(POLL_INTERVAL.min(remaining)).await;
    }
}

/// Wait for a target to be present in the DOM.
///
/// A timeout here means the target may simply never exist, so it maps to
/// [`FinwebError::ElementNotFound`] rather than `Timeout` — callers that
/// would otherwise keep waiting on a doomed locator fail fast instead.
pub async fn wait_for_presence_with<T, F, Fut>(
    duration: Duration,
    target: &str,
    mut lookup: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>>>,
{
    wait_until(duration, &format!("presence of {}", target), || lookup())
        .await
        .map_err(|err| match err {
            FinwebError::Timeout { waited_ms, .. } => FinwebError::ElementNotFound(format!(
                "\"{}\" did not show up within {} ms",
                target, waited_ms
            )),
            other => other,
        })
}

/// Wait for a target to be present, then visible.
///
/// Two-phase: the presence phase fails fast as `ElementNotFound` for a
/// target that never appears, so a missing element costs one bounded wait,
/// not two. The visibility phase then runs within the same outer duration
/// and a timeout there stays a `Timeout`.
pub async fn wait_for_visibility_with<T, L, LFut, V, VFut>(
    duration: Duration,
    target: &str,
    mut lookup: L,
    mut visible: V,
) -> Result<T>
where
    L: FnMut() -> LFut,
    LFut: Future<Output = Result<Option<T>>>,
    V: FnMut(&T) -> VFut,
    VFut: Future<Output = Result<bool>>,
{
    let started = Instant::now();
    let mut found = wait_for_presence_with(duration, target, || lookup()).await?;

    loop {
        if visible(&found).await? {
            return Ok(found);
        }

        let elapsed = started.elapsed();
        if elapsed >= duration {
            return Err(FinwebError::Timeout {
                condition: format!("visibility of {}", target),
                waited_ms: elapsed.as_millis() as u64,
            });
        }
        sleep(POLL_INTERVAL.min(duration - elapsed)).await;

        // Re-resolve between polls; the element may have gone stale.
        if let Some(fresh) = lookup().await? {
            found = fresh;
        }
    }
}

/// Wait for a target to be invisible or gone from the DOM.
pub async fn wait_for_invisibility_with<F, Fut>(
    duration: Duration,
    target: &str,
    mut visible: F,
) -> Result<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    wait_until(duration, &format!("invisibility of {}", target), || {
        let check = visible();
        async move {
            if check.await? {
                Ok(None)
            } else {
                Ok(Some(()))
            }
        }
    })
    .await
    .map_err(|err| match err {
        FinwebError::Timeout { waited_ms, .. } => FinwebError::Timeout {
            condition: format!("\"{}\" wasn't hidden", target),
            waited_ms,
        },
        other => other,
    })
}

/// Wait until either of two alternate targets becomes visible.
///
/// Used for overlays that render as one of several market-dependent
/// variants; the caller learns which one appeared.
pub async fn wait_for_either_visible_with<A, AFut, B, BFut>(
    duration: Duration,
    description: &str,
    mut first: A,
    mut second: B,
) -> Result<EitherVisible>
where
    A: FnMut() -> AFut,
    AFut: Future<Output = Result<bool>>,
    B: FnMut() -> BFut,
    BFut: Future<Output = Result<bool>>,
{
    wait_until(duration, description, || {
        let a = first();
        let b = second();
        async move {
            if a.await? {
                Ok(Some(EitherVisible::First))
            } else if b.await? {
                Ok(Some(EitherVisible::Second))
            } else {
                Ok(None)
            }
        }
    })
    .await
}

/// Wait for a loading indicator to appear and then disappear.
///
/// An indicator that never appears is fine (the content loaded too fast to
/// see it). An indicator that appeared but never hides is reported to the
/// caller as `Lookup::Timeout` so it can attach a warning; it is not an
/// error.
pub async fn wait_for_loading_with<F, Fut>(
    presence_timeout: Duration,
    disappear_timeout: Duration,
    target: &str,
    mut visible: F,
) -> Result<Lookup>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    let appeared = wait_until(presence_timeout, &format!("loader {} visible", target), || {
        let check = visible();
        async move {
            if check.await? {
                Ok(Some(()))
            } else {
                Ok(None)
            }
        }
    })
    .await;

    match appeared {
        Ok(()) => {}
        Err(FinwebError::Timeout { .. }) => return Ok(Lookup::NotFound),
        Err(other) => return Err(other),
    }

    match wait_for_invisibility_with(disappear_timeout, target, visible).await {
        Ok(()) => {
            debug!(target, "loader was displayed and then hidden");
            Ok(Lookup::Found)
        }
        Err(FinwebError::Timeout { .. }) => Ok(Lookup::Timeout),
        Err(other) => Err(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_wait_until_immediate_value() {
        let result = wait_until(Duration::from_secs(1), "ready", || async { Ok(Some(7)) }).await;
        assert_eq!(result.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_wait_until_eventually_satisfied() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls_in = calls.clone();
        let result = wait_until(Duration::from_secs(5), "third try", move || {
            let calls = calls_in.clone();
            async move {
                if calls.fetch_add(1, Ordering::SeqCst) >= 2 {
                    Ok(Some("done"))
                } else {
                    Ok(None)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_wait_until_times_out_with_description() {
        let result: Result<()> =
            wait_until(Duration::from_millis(50), "never true", || async { Ok(None) }).await;
        match result {
            Err(FinwebError::Timeout { condition, waited_ms }) => {
                assert_eq!(condition, "never true");
                assert!(waited_ms >= 50);
            }
            other => panic!("expected timeout, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_wait_until_propagates_hard_errors() {
        let result: Result<()> = wait_until(Duration::from_secs(5), "broken", || async {
            Err(FinwebError::Driver("socket closed".to_string()))
        })
        .await;
        assert!(matches!(result, Err(FinwebError::Driver(_))));
    }

    #[tokio::test]
    async fn test_presence_timeout_maps_to_not_found() {
        let result: Result<()> =
            wait_for_presence_with(Duration::from_millis(50), "#ghost", || async { Ok(None) })
                .await;
        assert!(matches!(result, Err(FinwebError::ElementNotFound(_))));
    }

    #[tokio::test]
    async fn test_visibility_fails_fast_on_absent_element() {
        // The visibility check must never run when presence already failed;
        // a missing element costs one bounded wait, not two.
        let visibility_calls = Arc::new(AtomicU32::new(0));
        let counter = visibility_calls.clone();

        let result: Result<()> = wait_for_visibility_with(
            Duration::from_millis(50),
            "#ghost",
            || async { Ok(None) },
            move |_: &()| {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Ok(true) }
            },
        )
        .await;

        assert!(matches!(result, Err(FinwebError::ElementNotFound(_))));
        assert_eq!(visibility_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_visibility_of_present_element() {
        let result = wait_for_visibility_with(
            Duration::from_secs(1),
            "#banner",
            || async { Ok(Some("banner")) },
            |_| async { Ok(true) },
        )
        .await;
        assert_eq!(result.unwrap(), "banner");
    }

    #[tokio::test]
    async fn test_invisibility_waits_until_hidden() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls_in = calls.clone();
        let result = wait_for_invisibility_with(Duration::from_secs(5), "#overlay", move || {
            let calls = calls_in.clone();
            async move { Ok(calls.fetch_add(1, Ordering::SeqCst) < 2) }
        })
        .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_either_visible_picks_second_variant() {
        let result = wait_for_either_visible_with(
            Duration::from_secs(1),
            "consent overlay",
            || async { Ok(false) },
            || async { Ok(true) },
        )
        .await;
        assert_eq!(result.unwrap(), EitherVisible::Second);
    }

    #[tokio::test]
    async fn test_loading_indicator_never_appearing_is_fine() {
        let result = wait_for_loading_with(
            Duration::from_millis(50),
            Duration::from_millis(50),
            ".loader",
            || async { Ok(false) },
        )
        .await;
        assert_eq!(result.unwrap(), Lookup::NotFound);
    }

    #[tokio::test]
    async fn test_loading_indicator_stuck_is_reported_not_fatal() {
        let result = wait_for_loading_with(
            Duration::from_millis(50),
            Duration::from_millis(50),
            ".loader",
            || async { Ok(true) },
        )
        .await;
        assert_eq!(result.unwrap(), Lookup::Timeout);
    }
}
