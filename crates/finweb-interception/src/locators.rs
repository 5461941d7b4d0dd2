//! CSS locators for the overlays the recovery hooks handle.
//!
//! Only the popups the interception layer itself closes live here; page
//! objects keep their own locators.

/// EU-style privacy overlay (OneTrust banner)
pub const PRIVACY_POPUP: &str = "#onetrust-banner-sdk";
pub const PRIVACY_ACCEPT_BTN: &str = "#onetrust-accept-btn-handler";

/// US-state-style privacy overlay (CCPA variant of the same SDK)
pub const CCPA_POPUP: &str = "#onetrust-close-btn-container";
pub const CCPA_CLOSE_BTN: &str = "button.ot-close-icon";

/// Pro promotional dialog; one container serves several campaigns
pub const PRO_PROMO_POPUP: &str = "[class*='invProPromote']";
pub const PRO_PROMO_CLOSE_BTN: &str = "[class*='invProPromote'] svg[data-test='close-icon']";

/// Promotional dialog whose body is an embedded iframe
pub const IFRAME_POPUP: &str = "div[class*='promoOverlay']";
pub const IFRAME_POPUP_FRAME: &str = "div[class*='promoOverlay'] iframe";
pub const IFRAME_POPUP_CLOSE_BTN: &str = "[data-test='banner-close-button']";
