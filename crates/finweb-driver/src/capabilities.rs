//! Capability construction per (browser, version, execution mode)

use finweb_core::{BrowserKind, ExecutionMode, FinwebError, Result};
use serde_json::json;
use thirtyfour::{Capabilities, CapabilitiesHelper, DesiredCapabilities};
use tracing::debug;

/// Build the capabilities payload for a new session.
///
/// Local mode gets the stability flags a CI box needs; cloud mode labels
/// the broker session with the scenario name and enables video/log/VNC
/// capture so diagnostics can be fetched after a failure.
///
/// An unsupported (browser, mode) combination fails with
/// [`FinwebError::UnsupportedConfiguration`] before any session exists.
pub fn build_capabilities(
    browser: BrowserKind,
    version_tag: &str,
    mode: ExecutionMode,
    headless: bool,
    scenario_name: &str,
) -> Result<Capabilities> {
    match (browser, mode) {
        (BrowserKind::Chrome | BrowserKind::ChromeMobile, _) => {
            let mut caps = DesiredCapabilities::chrome();

            match mode {
                ExecutionMode::Local => {
                    for arg in [
                        "--disable-gpu",
                        "--window-size=1920,1200",
                        "--ignore-certificate-errors",
                        "--no-sandbox",
                        "--disable-dev-shm-usage",
                    ] {
                        caps.add_chrome_arg(arg).map_err(driver_err)?;
                    }
                    if headless {
                        caps.add_chrome_arg("--headless").map_err(driver_err)?;
                    }
                }
                ExecutionMode::Cloud => {
                    for arg in [
                        "--no-sandbox",
                        "--disable-dev-shm-usage",
                        "--ignore-certificate-errors",
                        "--window-size=1920,1200",
                    ] {
                        caps.add_chrome_arg(arg).map_err(driver_err)?;
                    }
                    caps.add("browserVersion", version_tag).map_err(driver_err)?;
                    caps.add(
                        "selenoid:options",
                        json!({
                            "name": scenario_name,
                            "enableLog": true,
                            "enableVideo": true,
                            "enableVNC": true,
                        }),
                    )
                    .map_err(driver_err)?;
                }
            }

            debug!(%browser, %mode, version_tag, "built chrome capabilities");
            Ok(caps.into())
        }
        (BrowserKind::Firefox, ExecutionMode::Local) => {
            let mut caps = DesiredCapabilities::firefox();
            if headless {
                caps.add_firefox_arg("--headless").map_err(driver_err)?;
            }
            Ok(caps.into())
        }
        (browser, mode) => Err(FinwebError::UnsupportedConfiguration {
            browser: browser.to_string(),
            mode: mode.to_string(),
        }),
    }
}

pub(crate) fn driver_err(err: thirtyfour::error::WebDriverError) -> FinwebError {
    FinwebError::Driver(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cloud_capabilities_carry_session_labeling() {
        let caps = build_capabilities(
            BrowserKind::Chrome,
            "118.0",
            ExecutionMode::Cloud,
            false,
            "Open equities page",
        )
        .unwrap();

        let raw = serde_json::to_value(&caps).unwrap();
        let selenoid = &raw["selenoid:options"];
        assert_eq!(selenoid["name"], "Open equities page");
        assert_eq!(selenoid["enableVideo"], true);
        assert_eq!(selenoid["enableLog"], true);
        assert_eq!(selenoid["enableVNC"], true);
        assert_eq!(raw["browserVersion"], "118.0");
    }

    #[test]
    fn test_local_capabilities_have_no_broker_options() {
        let caps = build_capabilities(
            BrowserKind::Chrome,
            "latest",
            ExecutionMode::Local,
            true,
            "ignored",
        )
        .unwrap();

        let raw = serde_json::to_value(&caps).unwrap();
        assert!(raw.get("selenoid:options").is_none());
    }

    #[test]
    fn test_unsupported_combination_names_both_inputs() {
        let err = build_capabilities(
            BrowserKind::Safari,
            "latest",
            ExecutionMode::Cloud,
            false,
            "any",
        )
        .unwrap_err();

        match err {
            FinwebError::UnsupportedConfiguration { browser, mode } => {
                assert_eq!(browser, "safari");
                assert_eq!(mode, "cloud");
            }
            other => panic!("expected UnsupportedConfiguration, got {other}"),
        }
    }
}
