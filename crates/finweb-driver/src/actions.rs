//! The minimal browser action surface the framework programs against
//!
//! Interception hooks, popup recovery and failure capture all depend on
//! this trait rather than on the concrete WebDriver client, so they can be
//! exercised against a scripted fake browser in tests. Locators cross this
//! seam as CSS selector strings.

use async_trait::async_trait;
use finweb_core::Result;

/// Physical browser actions plus the probes recovery policies need.
///
/// Probes report absence as a value (`Ok(false)` / `Ok(None)`), never as an
/// error: "the element is not there" is an expected outcome.
#[async_trait]
pub trait BrowserActions: Send {
    // Navigation
    async fn goto(&mut self, url: &str) -> Result<()>;
    async fn refresh(&mut self) -> Result<()>;
    async fn current_url(&self) -> Result<String>;

    // Interaction
    async fn click(&mut self, css: &str) -> Result<()>;
    async fn send_keys(&mut self, css: &str, text: &str) -> Result<()>;
    async fn run_script(&mut self, script: &str) -> Result<serde_json::Value>;
    async fn scroll_by(&mut self, y_pixels: i64) -> Result<()>;

    // Probes
    async fn is_present(&self, css: &str) -> Result<bool>;
    async fn is_visible(&self, css: &str) -> Result<bool>;
    async fn text_of(&self, css: &str) -> Result<Option<String>>;

    // Cookies
    async fn has_cookie(&self, name: &str) -> Result<bool>;
    async fn set_cookie(&mut self, name: &str, value: &str) -> Result<()>;
    async fn delete_cookie(&mut self, name: &str) -> Result<()>;

    // Frames
    async fn enter_frame(&mut self, css: &str) -> Result<()>;
    async fn leave_frame(&mut self) -> Result<()>;

    // Diagnostics
    async fn screenshot_png(&mut self) -> Result<Vec<u8>>;
}
