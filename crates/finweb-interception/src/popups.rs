//! Popup probing and closing helpers.
//!
//! All helpers are best-effort booleans: `true` means the popup was found
//! and actually dismissed. Probe and close errors (stale elements, a popup
//! removed mid-wait) are attached as diagnostic notes and folded into
//! `false`, never raised: a failed recovery must not fail the step that
//! triggered it.

use std::time::Duration;

use tracing::debug;

use finweb_driver::actions::BrowserActions;
use finweb_driver::timeouts::ELEMENT_WAIT_SMALL;
use finweb_driver::wait::{wait_for_invisibility_with, wait_until};
use finweb_reporting::AttachmentSink;

/// True once the popup becomes visible within `duration`.
pub async fn is_popup_displayed<B: BrowserActions>(
    browser: &B,
    duration: Duration,
    popup: &str,
) -> bool {
    wait_until(duration, &format!("popup {popup}"), || {
        let probe = browser;
        async move { Ok(probe.is_visible(popup).await.unwrap_or(false).then_some(())) }
    })
    .await
    .is_ok()
}

/// Close a popup through its close button and wait for it to go away.
///
/// Returns `true` only when the popup was displayed and is now gone.
pub async fn close_popup<B: BrowserActions>(
    browser: &mut B,
    sink: &dyn AttachmentSink,
    duration: Duration,
    popup: &str,
    close_button: &str,
) -> bool {
    if !is_popup_displayed(&*browser, duration, popup).await {
        sink.attach_text("info", &format!("popup was not displayed: {popup}"));
        return false;
    }

    if let Err(err) = browser.click(close_button).await {
        debug!(popup, error = %err, "popup close click failed");
        sink.attach_text("error", &format!("couldn't close the popup {popup}: {err}"));
        return false;
    }

    let probe = &*browser;
    let hidden = wait_for_invisibility_with(ELEMENT_WAIT_SMALL, popup, || {
        let b = probe;
        async move { b.is_visible(popup).await }
    })
    .await;

    match hidden {
        Ok(()) => {
            sink.attach_text("info", &format!("popup was closed: {popup}"));
            true
        }
        Err(err) => {
            debug!(popup, error = %err, "popup did not disappear after close");
            sink.attach_text("error", &format!("popup still displayed after close {popup}: {err}"));
            false
        }
    }
}

/// Close a popup whose close button lives inside an embedded iframe.
///
/// Switches into the frame for the click and always switches back, even
/// when the click fails.
pub async fn close_popup_in_iframe<B: BrowserActions>(
    browser: &mut B,
    sink: &dyn AttachmentSink,
    duration: Duration,
    popup: &str,
    frame: &str,
    close_button: &str,
) -> bool {
    if !is_popup_displayed(&*browser, duration, popup).await {
        sink.attach_text("info", &format!("iframe popup was not displayed: {popup}"));
        return false;
    }

    if let Err(err) = browser.enter_frame(frame).await {
        debug!(popup, error = %err, "couldn't switch into popup iframe");
        sink.attach_text("error", &format!("couldn't switch into the popup iframe {frame}: {err}"));
        return false;
    }

    let clicked = browser.click(close_button).await;
    // Back to the top document no matter how the click went.
    if let Err(err) = browser.leave_frame().await {
        debug!(popup, error = %err, "couldn't switch back from popup iframe");
        sink.attach_text("error", &format!("couldn't leave the popup iframe {frame}: {err}"));
        return false;
    }
    if let Err(err) = clicked {
        debug!(popup, error = %err, "iframe popup close click failed");
        sink.attach_text("error", &format!("couldn't close the popup {popup}: {err}"));
        return false;
    }

    let probe = &*browser;
    let hidden = wait_for_invisibility_with(ELEMENT_WAIT_SMALL, popup, || {
        let b = probe;
        async move { b.is_visible(popup).await }
    })
    .await;

    match hidden {
        Ok(()) => {
            sink.attach_text("info", &format!("iframe popup was closed: {popup}"));
            true
        }
        Err(err) => {
            debug!(popup, error = %err, "iframe popup did not disappear after close");
            sink.attach_text("error", &format!("popup still displayed after close {popup}: {err}"));
            false
        }
    }
}
