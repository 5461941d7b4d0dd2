//! Failure diagnostics collected when a scenario attempt goes down.
//!
//! Everything here is best-effort: a broken screenshot endpoint or an
//! unreachable recording must never mask the original failure, so each
//! step downgrades its own errors to attached notes.

use tracing::{debug, warn};

use finweb_core::{ExecutionMode, ScenarioDescriptor};
use finweb_driver::actions::BrowserActions;
use finweb_driver::handle::DriverHandle;

use crate::sink::AttachmentSink;
use crate::video::fetch_recording;

/// Scenarios exercising the HTTP API have no browser to photograph
pub(crate) fn skips_diagnostics(scenario: &ScenarioDescriptor) -> bool {
    scenario.contains_tag("@API")
}

/// Grab a screenshot of the current page and hand it to the sink.
///
/// A capture failure becomes an error note instead of a returned error.
pub(crate) async fn capture_screenshot<B: BrowserActions>(
    sink: &dyn AttachmentSink,
    scenario: &ScenarioDescriptor,
    browser: &mut B,
) {
    let label = format!("screenshot: {}", scenario.name);
    match browser.screenshot_png().await {
        Ok(png) => sink.attach_bytes(&label, "image/png", png),
        Err(err) => {
            warn!(scenario = %scenario.name, error = %err, "screenshot capture failed");
            sink.attach_text("error", &format!("screenshot capture failed: {err}"));
        }
    }
}

/// Collect the full failure bundle for one scenario attempt.
///
/// On a remote run the driver session is quit here so the broker finalizes
/// the recording before we fetch it; the caller must treat the driver as
/// gone afterwards. Local runs leave the driver alone.
pub async fn capture_failure_diagnostics(
    sink: &dyn AttachmentSink,
    scenario: &ScenarioDescriptor,
    driver: &mut DriverHandle,
    mode: ExecutionMode,
) {
    if skips_diagnostics(scenario) {
        debug!(scenario = %scenario.name, "API scenario, no browser diagnostics");
        return;
    }

    capture_screenshot(sink, scenario, driver).await;

    if mode != ExecutionMode::Cloud {
        return;
    }

    let Some(remote_session_id) = driver.remote_session_id().map(str::to_owned) else {
        sink.attach_text("error", "no remote session id, recording unavailable");
        return;
    };

    // Recording is only written out once the session closes.
    if let Err(err) = driver.quit().await {
        debug!(error = %err, "driver already gone before recording fetch");
    }

    match fetch_recording(&remote_session_id).await {
        Ok(bytes) => {
            let label = format!("recording: {}", scenario.name);
            sink.attach_bytes(&label, "video/mp4", bytes);
        }
        Err(err) => {
            warn!(session = %remote_session_id, error = %err, "recording fetch failed");
            sink.attach_text("error", &format!("recording fetch failed: {err}"));
        }
    }
}
