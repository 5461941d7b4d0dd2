//! Cookie normalization policies.
//!
//! The site decides whether to raise a promotional overlay from a handful
//! of client-side cookies. Rewriting those to their "already seen, already
//! dismissed" values suppresses the overlay before it can interfere with a
//! step, which is cheaper than closing it afterwards.

use chrono::Utc;
use tracing::debug;

use finweb_core::Result;
use finweb_driver::actions::BrowserActions;
use finweb_reporting::AttachmentSink;
use finweb_session::{CookieGroup, FlagKey, FlagSet};

use crate::relevance;

/// One cookie write performed by a policy.
#[derive(Debug, Clone)]
pub struct CookieRewrite {
    pub name: &'static str,
    pub value: String,
}

/// A suppression-cookie group and the conditions under which it applies.
pub struct CookiePolicy {
    pub group: CookieGroup,
    /// Page-path predicate; `None` means any page.
    pub relevant: Option<fn(&str) -> bool>,
    /// The policy only rewrites when this cookie already exists — a site
    /// variant that never sets it would ignore the rewrite anyway.
    pub guard: Option<&'static str>,
    pub rewrites: Vec<CookieRewrite>,
    /// Add the cookies without deleting first; used for marker cookies the
    /// site only checks for presence.
    pub add_only: bool,
}

/// Midnight-of-today stamp in the site's own "last shown" encoding.
fn last_shown_stamp() -> String {
    format!("{}T00%0000%0000.000Z", Utc::now().format("%Y-%m-%d"))
}

/// The full suppression table, in application order.
pub fn default_cookie_policies() -> Vec<CookiePolicy> {
    vec![
        CookiePolicy {
            group: CookieGroup::ProPromoVariant,
            relevant: None,
            guard: Some("invpro_promote_variant"),
            rewrites: vec![CookieRewrite {
                name: "invpro_promote_variant",
                value: "0".into(),
            }],
            add_only: false,
        },
        CookiePolicy {
            group: CookieGroup::EventPopup,
            relevant: Some(relevance::is_sale_banner_page),
            guard: Some("event_popup_counter"),
            rewrites: vec![
                CookieRewrite {
                    name: "event_popup_counter",
                    value: "3".into(),
                },
                CookieRewrite {
                    name: "event_popup_did_user_dismissed",
                    value: "1".into(),
                },
                CookieRewrite {
                    name: "event_popup_last_shown",
                    value: last_shown_stamp(),
                },
            ],
            add_only: false,
        },
        CookiePolicy {
            group: CookieGroup::ProPicksPopup,
            relevant: Some(relevance::is_propicks_banner_page),
            guard: Some("propicks_popup_counter"),
            rewrites: vec![
                CookieRewrite {
                    name: "propicks_popup_counter",
                    value: "3".into(),
                },
                CookieRewrite {
                    name: "propicks_popup_did_user_dismissed",
                    value: "1".into(),
                },
                CookieRewrite {
                    name: "propicks_popup_user_clicked",
                    value: "0".into(),
                },
                CookieRewrite {
                    name: "propicks_popup_last_shown",
                    value: last_shown_stamp(),
                },
            ],
            add_only: false,
        },
        CookiePolicy {
            group: CookieGroup::PromoBannerAuto,
            relevant: None,
            guard: None,
            rewrites: vec![CookieRewrite {
                name: "promo_banner_auto",
                value: String::new(),
            }],
            add_only: true,
        },
    ]
}

/// Apply a single policy to the session.
///
/// Returns `true` when any cookie was written. Gated by the policy's
/// one-shot flag; the flag flips only after a successful write so a
/// transient failure gets retried on the next navigation.
pub async fn apply_cookie_policy<B: BrowserActions>(
    browser: &mut B,
    sink: &dyn AttachmentSink,
    policy: &CookiePolicy,
    page: &str,
    flags: &mut FlagSet,
) -> Result<bool> {
    let flag = FlagKey::CookieGroup(policy.group);
    if flags.is_set(flag) {
        return Ok(false);
    }

    if let Some(relevant) = policy.relevant {
        if !relevant(page) {
            return Ok(false);
        }
    }

    if let Some(guard) = policy.guard {
        if !browser.has_cookie(guard).await? {
            debug!(group = %policy.group, guard, "guard cookie absent, policy skipped");
            return Ok(false);
        }
    }

    for rewrite in &policy.rewrites {
        if !policy.add_only {
            browser.delete_cookie(rewrite.name).await?;
        }
        browser.set_cookie(rewrite.name, &rewrite.value).await?;
        sink.attach_text(
            &format!("{} cookie modified", rewrite.name),
            &format!("value changed to \"{}\"", rewrite.value),
        );
    }

    flags.set(flag);
    Ok(true)
}
