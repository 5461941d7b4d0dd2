//! The interceptor wrapping physical browser actions.
//!
//! Steps never call `goto`/`click`/`execute` on the driver directly; they
//! go through [`Interceptor`], which performs the action and then runs the
//! recovery hooks for it. Hooks run only after the action succeeded — a
//! failed click is the step's problem, not a popup's.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use finweb_core::{RunParams, Result};
use finweb_driver::actions::BrowserActions;
use finweb_driver::timeouts::{ELEMENT_WAIT_SMALL, PAGE_SETTLE, POPUP_WAIT};
use finweb_driver::wait::{wait_for_either_visible_with, EitherVisible};
use finweb_reporting::AttachmentSink;
use finweb_session::{FlagKey, FlagSet, PromoCampaign};

use crate::cookies::{apply_cookie_policy, default_cookie_policies, CookiePolicy};
use crate::locators;
use crate::popups::{close_popup, close_popup_in_iframe};
use crate::relevance;

/// One promotional-overlay campaign and how to dismiss it.
pub struct PromoPolicy {
    pub campaign: PromoCampaign,
    pub relevant: fn(&str) -> bool,
    pub popup: &'static str,
    pub close_button: &'static str,
    /// Some campaigns render their close button inside an iframe.
    pub frame: Option<&'static str>,
    /// ProPicks suppression cookies cannot load on the canary environment,
    /// so its close-after-interaction path only runs there.
    pub canary_only: bool,
}

/// After-interaction campaign table, in application order.
pub fn default_promo_policies() -> Vec<PromoPolicy> {
    vec![
        PromoPolicy {
            campaign: PromoCampaign::ProPicks,
            relevant: relevance::is_propicks_banner_page,
            popup: locators::PRO_PROMO_POPUP,
            close_button: locators::PRO_PROMO_CLOSE_BTN,
            frame: None,
            canary_only: true,
        },
        PromoPolicy {
            campaign: PromoCampaign::MarchSale,
            relevant: relevance::is_march_sale_banner_page,
            popup: locators::IFRAME_POPUP,
            close_button: locators::IFRAME_POPUP_CLOSE_BTN,
            frame: Some(locators::IFRAME_POPUP_FRAME),
            canary_only: false,
        },
        PromoPolicy {
            campaign: PromoCampaign::ProTips,
            relevant: relevance::is_protips_banner_page,
            popup: locators::IFRAME_POPUP,
            close_button: locators::IFRAME_POPUP_CLOSE_BTN,
            frame: Some(locators::IFRAME_POPUP_FRAME),
            canary_only: false,
        },
    ]
}

/// Post-action recovery layer for one run configuration.
///
/// Shared across workers; all per-session state lives in the [`FlagSet`]
/// the caller passes in.
pub struct Interceptor {
    base_domain: String,
    on_canary: bool,
    settle: Duration,
    popup_wait: Duration,
    sink: Arc<dyn AttachmentSink>,
    promo_policies: Vec<PromoPolicy>,
    cookie_policies: Vec<CookiePolicy>,
}

impl Interceptor {
    pub fn new(params: &RunParams, sink: Arc<dyn AttachmentSink>) -> Self {
        Self {
            base_domain: params.base_domain.clone(),
            on_canary: params.is_on_canary(),
            settle: PAGE_SETTLE,
            popup_wait: POPUP_WAIT,
            sink,
            promo_policies: default_promo_policies(),
            cookie_policies: default_cookie_policies(),
        }
    }

    /// Override the settle pause and popup wait, mainly for fast tests.
    pub fn with_timing(mut self, settle: Duration, popup_wait: Duration) -> Self {
        self.settle = settle;
        self.popup_wait = popup_wait;
        self
    }

    /// Navigate and run the post-navigation hooks.
    pub async fn navigate<B: BrowserActions>(
        &self,
        browser: &mut B,
        flags: &mut FlagSet,
        url: &str,
    ) -> Result<()> {
        browser.goto(url).await?;
        tokio::time::sleep(self.settle).await;
        self.after_navigate(browser, flags, url).await;
        Ok(())
    }

    /// Refresh and re-run the consent hook if it has not fired yet.
    pub async fn refresh<B: BrowserActions>(
        &self,
        browser: &mut B,
        flags: &mut FlagSet,
    ) -> Result<()> {
        browser.refresh().await?;
        tokio::time::sleep(self.settle).await;

        if !flags.is_set(FlagKey::PrivacyConsentPopup) {
            match browser.current_url().await {
                Ok(url) => self.after_navigate(browser, flags, &url).await,
                Err(err) => debug!(error = %err, "no current URL after refresh, hooks skipped"),
            }
        }
        Ok(())
    }

    /// Click and run the after-interaction hooks.
    pub async fn click<B: BrowserActions>(
        &self,
        browser: &mut B,
        flags: &mut FlagSet,
        css: &str,
    ) -> Result<()> {
        browser.click(css).await?;
        self.after_interaction(browser, flags).await;
        Ok(())
    }

    /// Execute a script and run the after-interaction hooks.
    pub async fn run_script<B: BrowserActions>(
        &self,
        browser: &mut B,
        flags: &mut FlagSet,
        script: &str,
    ) -> Result<serde_json::Value> {
        let value = browser.run_script(script).await?;
        self.after_interaction(browser, flags).await;
        Ok(value)
    }

    /// Scroll and run the after-interaction hooks.
    pub async fn perform_scroll<B: BrowserActions>(
        &self,
        browser: &mut B,
        flags: &mut FlagSet,
        y_pixels: i64,
    ) -> Result<()> {
        browser.scroll_by(y_pixels).await?;
        self.after_interaction(browser, flags).await;
        Ok(())
    }

    /// Post-navigation recovery: consent overlays plus cookie normalization.
    ///
    /// Never errors; each policy's failure becomes an error note.
    async fn after_navigate<B: BrowserActions>(
        &self,
        browser: &mut B,
        flags: &mut FlagSet,
        url: &str,
    ) {
        debug!(url, "post-navigation hooks");

        let page = match relevance::page_from_url(&self.base_domain, url) {
            Ok(page) => page,
            Err(err) => {
                debug!(url, error = %err, "URL outside the root domain, hooks skipped");
                return;
            }
        };

        // Pro pages run their own overlay stack.
        if relevance::is_pro_page(&page) {
            debug!(page, "pro page, recovery hooks skipped");
            return;
        }

        self.handle_consent(browser, flags, url).await;

        for policy in &self.cookie_policies {
            match apply_cookie_policy(browser, self.sink.as_ref(), policy, &page, flags).await {
                Ok(true) => info!(group = %policy.group, "suppression cookies written"),
                Ok(false) => {}
                Err(err) => {
                    warn!(group = %policy.group, error = %err, "cookie policy failed");
                    self.sink.attach_text(
                        "error",
                        &format!("couldn't apply the {} cookie policy: {err}", policy.group),
                    );
                }
            }
        }
    }

    /// Close whichever consent overlay variant the visitor's region gets.
    ///
    /// A timeout means this session's region shows no overlay at all, which
    /// is just as final as having closed one: the flag is set either way so
    /// no later navigation pays the wait again.
    async fn handle_consent<B: BrowserActions>(
        &self,
        browser: &mut B,
        flags: &mut FlagSet,
        url: &str,
    ) {
        if flags.is_set(FlagKey::PrivacyConsentPopup) {
            return;
        }
        if !relevance::is_consent_relevant(&self.base_domain, url) {
            return;
        }

        let probe = &*browser;
        let appeared = wait_for_either_visible_with(
            self.popup_wait,
            "privacy or regional-privacy overlay",
            || {
                let b = probe;
                async move { b.is_visible(locators::PRIVACY_POPUP).await }
            },
            || {
                let b = probe;
                async move { b.is_visible(locators::CCPA_POPUP).await }
            },
        )
        .await;

        match appeared {
            Ok(EitherVisible::First) => {
                close_popup(
                    browser,
                    self.sink.as_ref(),
                    self.popup_wait,
                    locators::PRIVACY_POPUP,
                    locators::PRIVACY_ACCEPT_BTN,
                )
                .await;
            }
            Ok(EitherVisible::Second) => {
                close_popup(
                    browser,
                    self.sink.as_ref(),
                    self.popup_wait,
                    locators::CCPA_POPUP,
                    locators::CCPA_CLOSE_BTN,
                )
                .await;
            }
            Err(err) => {
                debug!(error = %err, "no consent overlay for this session");
            }
        }

        flags.set(FlagKey::PrivacyConsentPopup);
    }

    /// After-interaction recovery: promotional overlays raised by scrolls,
    /// clicks and scripts. Never errors.
    async fn after_interaction<B: BrowserActions>(&self, browser: &mut B, flags: &mut FlagSet) {
        let url = match browser.current_url().await {
            Ok(url) => url,
            Err(err) => {
                debug!(error = %err, "no current URL, after-interaction hooks skipped");
                return;
            }
        };
        let page = match relevance::page_from_url(&self.base_domain, &url) {
            Ok(page) => page,
            Err(_) => return,
        };

        for policy in &self.promo_policies {
            if policy.canary_only && !self.on_canary {
                continue;
            }
            let flag = FlagKey::PromoPopup(policy.campaign);
            if flags.is_set(flag) {
                continue;
            }
            if !(policy.relevant)(&page) {
                continue;
            }

            let closed = match policy.frame {
                Some(frame) => {
                    close_popup_in_iframe(
                        browser,
                        self.sink.as_ref(),
                        ELEMENT_WAIT_SMALL.min(self.popup_wait),
                        policy.popup,
                        frame,
                        policy.close_button,
                    )
                    .await
                }
                None => {
                    close_popup(
                        browser,
                        self.sink.as_ref(),
                        ELEMENT_WAIT_SMALL.min(self.popup_wait),
                        policy.popup,
                        policy.close_button,
                    )
                    .await
                }
            };

            // Only an actual dismissal spends the one-shot.
            if closed {
                info!(campaign = %policy.campaign, "promo popup dismissed");
                flags.set(flag);
            }
        }
    }

    /// Dismiss the sign-up promotion that fires when the cursor leaves the
    /// page. Called by steps that trigger it deliberately.
    pub async fn dismiss_sign_up<B: BrowserActions>(
        &self,
        browser: &mut B,
        flags: &mut FlagSet,
    ) -> bool {
        let flag = FlagKey::PromoPopup(PromoCampaign::SignUp);
        if flags.is_set(flag) {
            return false;
        }

        let closed = close_popup(
            browser,
            self.sink.as_ref(),
            ELEMENT_WAIT_SMALL.min(self.popup_wait),
            locators::PRO_PROMO_POPUP,
            locators::PRO_PROMO_CLOSE_BTN,
        )
        .await;

        if closed {
            flags.set(flag);
        }
        closed
    }
}
