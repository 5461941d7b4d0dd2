//! Retrieval of broker-side session recordings.
//!
//! The remote broker finalizes a recording only after the driver session is
//! quit, and the file grows for a short while as the encoder flushes. We
//! poll the reported size and download once it holds still.

use std::time::Duration;

use tracing::debug;

use finweb_core::{FinwebError, Result};

const VIDEO_HOST: &str = "http://selenoid:4444";
const POLL_ROUNDS: u32 = 20;
const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Download URL for a finished session recording
pub fn recording_url(remote_session_id: &str) -> String {
    format!("{VIDEO_HOST}/video/{remote_session_id}.mp4")
}

/// True once the size report has settled on a non-zero value
pub(crate) fn size_is_stable(previous: Option<u64>, current: Option<u64>) -> bool {
    match (previous, current) {
        (Some(prev), Some(curr)) => prev == curr && curr > 0,
        _ => false,
    }
}

/// Fetch the session recording, waiting out the encoder flush.
///
/// Gives up after a bounded number of polling rounds rather than hanging
/// scenario teardown on a broker that never produces the file.
pub async fn fetch_recording(remote_session_id: &str) -> Result<Vec<u8>> {
    let url = recording_url(remote_session_id);
    let client = reqwest::Client::new();

    let mut previous: Option<u64> = None;
    let mut stable = false;
    for round in 0..POLL_ROUNDS {
        let response = client
            .head(&url)
            .send()
            .await
            .map_err(|e| FinwebError::Reporting(format!("recording probe failed: {e}")))?;

        let current = response
            .status()
            .is_success()
            .then(|| response.content_length())
            .flatten();
        debug!(round, size = ?current, "recording size probe");

        if size_is_stable(previous, current) {
            stable = true;
            break;
        }
        previous = current;
        tokio::time::sleep(POLL_INTERVAL).await;
    }

    if !stable {
        return Err(FinwebError::Reporting(format!(
            "recording for session {remote_session_id} never stabilized"
        )));
    }

    let response = client
        .get(&url)
        .send()
        .await
        .map_err(|e| FinwebError::Reporting(format!("recording download failed: {e}")))?;
    if !response.status().is_success() {
        return Err(FinwebError::Reporting(format!(
            "recording download returned {}",
            response.status()
        )));
    }
    let bytes = response
        .bytes()
        .await
        .map_err(|e| FinwebError::Reporting(format!("recording body read failed: {e}")))?;
    Ok(bytes.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_url_shape() {
        assert_eq!(
            recording_url("abc-123"),
            "http://selenoid:4444/video/abc-123.mp4"
        );
    }

    #[test]
    fn test_size_stability() {
        // still growing
        assert!(!size_is_stable(Some(10), Some(20)));
        // first observation, nothing to compare against
        assert!(!size_is_stable(None, Some(20)));
        // missing file
        assert!(!size_is_stable(None, None));
        assert!(!size_is_stable(Some(10), None));
        // settled on empty is not a recording
        assert!(!size_is_stable(Some(0), Some(0)));
        assert!(size_is_stable(Some(20), Some(20)));
    }
}
