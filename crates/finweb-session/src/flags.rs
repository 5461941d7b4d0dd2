//! One-shot flags for session-scoped recovery actions
//!
//! Consent banners, promo popups and their suppression cookies are expected
//! to need handling at most once per browser session. After a recovery
//! action succeeds, its flag flips to true and every later gated action
//! short-circuits — re-probing "is the banner visible" after every click
//! would cost a bounded wait each time.

use std::collections::HashMap;

use tracing::debug;

/// Promotional overlay campaigns, each with its own relevance rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromoCampaign {
    ProPicks,
    MarchSale,
    ProTips,
    SignUp,
}

impl std::fmt::Display for PromoCampaign {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ProPicks => write!(f, "pro-picks"),
            Self::MarchSale => write!(f, "march-sale"),
            Self::ProTips => write!(f, "pro-tips"),
            Self::SignUp => write!(f, "sign-up"),
        }
    }
}

/// Named cookie groups rewritten to suppress overlays pre-emptively
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CookieGroup {
    /// `invpro_promote_variant`
    ProPromoVariant,
    /// `event_popup_*` counter/dismissed/last-shown triple
    EventPopup,
    /// `propicks_popup_*` quadruple
    ProPicksPopup,
    /// `promo_banner_auto`, added rather than rewritten
    PromoBannerAuto,
}

impl std::fmt::Display for CookieGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ProPromoVariant => write!(f, "pro-promo-variant"),
            Self::EventPopup => write!(f, "event-popup"),
            Self::ProPicksPopup => write!(f, "propicks-popup"),
            Self::PromoBannerAuto => write!(f, "promo-banner-auto"),
        }
    }
}

/// Key of a one-shot recovery flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlagKey {
    /// The EU-privacy / US-state-privacy overlay pair
    PrivacyConsentPopup,
    PromoPopup(PromoCampaign),
    CookieGroup(CookieGroup),
}

impl std::fmt::Display for FlagKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PrivacyConsentPopup => write!(f, "privacy-consent-popup"),
            Self::PromoPopup(campaign) => write!(f, "promo-popup/{}", campaign),
            Self::CookieGroup(group) => write!(f, "cookie-group/{}", group),
        }
    }
}

/// The per-session set of one-shot flags. Defaults to all-false.
#[derive(Debug, Default)]
pub struct FlagSet {
    handled: HashMap<FlagKey, bool>,
}

impl FlagSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_set(&self, key: FlagKey) -> bool {
        self.handled.get(&key).copied().unwrap_or(false)
    }

    /// Mark a recovery as handled for the rest of the session.
    pub fn set(&mut self, key: FlagKey) {
        debug!(flag = %key, "one-shot flag set");
        self.handled.insert(key, true);
    }

    /// Reset every flag; called at scenario teardown.
    pub fn clear(&mut self) {
        debug!("one-shot flags cleared");
        self.handled.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_default_false() {
        let flags = FlagSet::new();
        assert!(!flags.is_set(FlagKey::PrivacyConsentPopup));
        assert!(!flags.is_set(FlagKey::PromoPopup(PromoCampaign::ProPicks)));
    }

    #[test]
    fn test_flags_are_independent() {
        let mut flags = FlagSet::new();
        flags.set(FlagKey::PromoPopup(PromoCampaign::ProPicks));
        assert!(flags.is_set(FlagKey::PromoPopup(PromoCampaign::ProPicks)));
        assert!(!flags.is_set(FlagKey::PromoPopup(PromoCampaign::MarchSale)));
        assert!(!flags.is_set(FlagKey::CookieGroup(CookieGroup::ProPicksPopup)));
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut flags = FlagSet::new();
        flags.set(FlagKey::PrivacyConsentPopup);
        flags.set(FlagKey::CookieGroup(CookieGroup::PromoBannerAuto));
        flags.clear();
        assert!(!flags.is_set(FlagKey::PrivacyConsentPopup));
        assert!(!flags.is_set(FlagKey::CookieGroup(CookieGroup::PromoBannerAuto)));
    }
}
