//! Ownership of a single remote browser session

use async_trait::async_trait;
use finweb_core::{BrowserKind, ExecutionMode, FinwebError, Result, RunParams, ScenarioDescriptor};
use thirtyfour::error::WebDriverError;
use thirtyfour::{By, Cookie, WebDriver, WebElement};
use tracing::{debug, info, warn};

use crate::actions::BrowserActions;
use crate::capabilities::{build_capabilities, driver_err};
use crate::wait;
use std::time::Duration;

/// Local chromedriver process endpoint
const LOCAL_DRIVER_URL: &str = "http://localhost:9515";
/// Localhost session hub, used when local runs are routed through a grid
const LOCAL_HUB_URL: &str = "http://localhost:4444/wd/hub";
/// Fixed remote session-broker endpoint
pub const CLOUD_HUB_URL: &str = "http://selenoid:4444/wd/hub";

/// Owns exactly one remote browser session.
///
/// At most one handle exists per session context; the handle is never
/// shared across workers. After [`DriverHandle::quit`] every action fails
/// with [`FinwebError::DriverUnavailable`].
pub struct DriverHandle {
    delegate: Option<WebDriver>,
    /// Captured immediately after remote session creation, before any other
    /// action, so the recording can be fetched even when the session is no
    /// longer queryable.
    remote_session_id: Option<String>,
    browser: BrowserKind,
}

impl DriverHandle {
    /// Construct the session for a scenario.
    ///
    /// The scenario's tags can override run parameters: `@MobileSite`
    /// forces the mobile-emulation browser, `@Profile` forces the
    /// "profile" version tag.
    pub async fn connect(params: &RunParams, scenario: &ScenarioDescriptor) -> Result<Self> {
        let browser = if scenario.contains_tag("@MobileSite") {
            BrowserKind::ChromeMobile
        } else {
            params.browser
        };
        let version_tag = if scenario.contains_tag("@Profile") {
            "profile"
        } else {
            params.version_tag.as_str()
        };

        let caps = build_capabilities(
            browser,
            version_tag,
            params.mode,
            params.headless,
            &scenario.name,
        )?;

        let mut handle = match params.mode {
            ExecutionMode::Local => {
                let server = if params.local_grid {
                    LOCAL_HUB_URL
                } else {
                    LOCAL_DRIVER_URL
                };
                info!(%browser, server, "starting local browser session");
                let delegate = WebDriver::new(server, caps).await.map_err(driver_err)?;
                Self {
                    delegate: Some(delegate),
                    remote_session_id: None,
                    browser,
                }
            }
            ExecutionMode::Cloud => {
                info!(%browser, version_tag, server = CLOUD_HUB_URL, "starting cloud browser session");
                let delegate = WebDriver::new(CLOUD_HUB_URL, caps).await.map_err(driver_err)?;

                // Session id first, before any other call: the recording
                // fetch after a failure must not depend on the session
                // still answering.
                let session_id = delegate
                    .session_id()
                    .await
                    .map_err(driver_err)?
                    .to_string();
                debug!(session_id, "captured remote session id");

                Self {
                    delegate: Some(delegate),
                    remote_session_id: Some(session_id),
                    browser,
                }
            }
        };

        handle.apply_window_policy().await?;
        Ok(handle)
    }

    /// Mobile emulation gets a fixed small viewport; everything else is
    /// maximized.
    async fn apply_window_policy(&mut self) -> Result<()> {
        let delegate = self.delegate()?;
        if self.browser.is_mobile() {
            delegate
                .set_window_rect(0, 0, 600, 1000)
                .await
                .map_err(driver_err)?;
        } else {
            delegate.maximize_window().await.map_err(driver_err)?;
        }
        Ok(())
    }

    pub fn browser(&self) -> BrowserKind {
        self.browser
    }

    /// Remote session id, present in cloud mode only.
    pub fn remote_session_id(&self) -> Option<&str> {
        self.remote_session_id.as_deref()
    }

    fn delegate(&self) -> Result<&WebDriver> {
        self.delegate.as_ref().ok_or_else(|| {
            FinwebError::DriverUnavailable(
                "the browser session was quit or never constructed".to_string(),
            )
        })
    }

    async fn find_optional(&self, css: &str) -> Result<Option<WebElement>> {
        match self.delegate()?.find(By::Css(css)).await {
            Ok(element) => Ok(Some(element)),
            Err(WebDriverError::NoSuchElement(_)) => Ok(None),
            Err(other) => Err(driver_err(other)),
        }
    }

    /// Wait for an element matching `css` to be present in the DOM.
    pub async fn wait_for_presence(&self, duration: Duration, css: &str) -> Result<WebElement> {
        wait::wait_for_presence_with(duration, css, || self.find_optional(css)).await
    }

    /// Wait for an element matching `css` to be present and displayed.
    pub async fn wait_for_visibility(&self, duration: Duration, css: &str) -> Result<WebElement> {
        wait::wait_for_visibility_with(
            duration,
            css,
            || self.find_optional(css),
            |element: &WebElement| {
                let element = element.clone();
                async move { element.is_displayed().await.map_err(driver_err) }
            },
        )
        .await
    }

    /// Wait for the element matching `css` to be hidden or gone.
    pub async fn wait_for_invisibility(&self, duration: Duration, css: &str) -> Result<()> {
        wait::wait_for_invisibility_with(duration, css, || {
            let this = self;
            async move {
                match this.find_optional(css).await? {
                    Some(element) => element.is_displayed().await.map_err(driver_err),
                    None => Ok(false),
                }
            }
        })
        .await
    }

    /// Terminate the underlying session. A second call is a no-op.
    pub async fn quit(&mut self) -> Result<()> {
        match self.delegate.take() {
            Some(delegate) => {
                info!("quitting browser session");
                delegate.quit().await.map_err(driver_err)
            }
            None => Ok(()),
        }
    }

    /// Lifecycle-managed teardown: quit if a session is present, never
    /// raise.
    pub async fn dispose(&mut self) {
        if let Err(err) = self.quit().await {
            warn!(error = %err, "driver teardown reported an error");
        }
    }

    #[cfg(test)]
    pub(crate) fn detached(remote_session_id: Option<String>) -> Self {
        Self {
            delegate: None,
            remote_session_id,
            browser: BrowserKind::Chrome,
        }
    }
}

#[async_trait]
impl BrowserActions for DriverHandle {
    async fn goto(&mut self, url: &str) -> Result<()> {
        debug!(url, "navigating");
        self.delegate()?.goto(url).await.map_err(driver_err)
    }

    async fn refresh(&mut self) -> Result<()> {
        self.delegate()?.refresh().await.map_err(driver_err)
    }

    async fn current_url(&self) -> Result<String> {
        self.delegate()?
            .current_url()
            .await
            .map(|url| url.to_string())
            .map_err(driver_err)
    }

    async fn click(&mut self, css: &str) -> Result<()> {
        match self.find_optional(css).await? {
            Some(element) => element.click().await.map_err(driver_err),
            None => Err(FinwebError::ElementNotFound(css.to_string())),
        }
    }

    async fn send_keys(&mut self, css: &str, text: &str) -> Result<()> {
        match self.find_optional(css).await? {
            Some(element) => element.send_keys(text).await.map_err(driver_err),
            None => Err(FinwebError::ElementNotFound(css.to_string())),
        }
    }

    async fn run_script(&mut self, script: &str) -> Result<serde_json::Value> {
        let ret = self
            .delegate()?
            .execute(script, Vec::new())
            .await
            .map_err(driver_err)?;
        Ok(ret.json().clone())
    }

    async fn scroll_by(&mut self, y_pixels: i64) -> Result<()> {
        self.run_script(&format!("window.scrollBy(0, {});", y_pixels))
            .await
            .map(|_| ())
    }

    async fn is_present(&self, css: &str) -> Result<bool> {
        Ok(self.find_optional(css).await?.is_some())
    }

    async fn is_visible(&self, css: &str) -> Result<bool> {
        match self.find_optional(css).await? {
            Some(element) => element.is_displayed().await.map_err(driver_err),
            None => Ok(false),
        }
    }

    async fn text_of(&self, css: &str) -> Result<Option<String>> {
        match self.find_optional(css).await? {
            Some(element) => Ok(Some(element.text().await.map_err(driver_err)?)),
            None => Ok(None),
        }
    }

    async fn has_cookie(&self, name: &str) -> Result<bool> {
        let cookies = self
            .delegate()?
            .get_all_cookies()
            .await
            .map_err(driver_err)?;
        Ok(cookies.iter().any(|c| c.name() == name))
    }

    async fn set_cookie(&mut self, name: &str, value: &str) -> Result<()> {
        self.delegate()?
            .add_cookie(Cookie::new(name.to_owned(), value.to_owned()))
            .await
            .map_err(driver_err)
    }

    async fn delete_cookie(&mut self, name: &str) -> Result<()> {
        self.delegate()?
            .delete_cookie(name)
            .await
            .map_err(driver_err)
    }

    async fn enter_frame(&mut self, css: &str) -> Result<()> {
        match self.find_optional(css).await? {
            Some(element) => element.enter_frame().await.map_err(driver_err),
            None => Err(FinwebError::ElementNotFound(css.to_string())),
        }
    }

    async fn leave_frame(&mut self) -> Result<()> {
        self.delegate()?
            .enter_default_frame()
            .await
            .map_err(driver_err)
    }

    async fn screenshot_png(&mut self) -> Result<Vec<u8>> {
        self.delegate()?
            .screenshot_as_png()
            .await
            .map_err(driver_err)
    }
}
