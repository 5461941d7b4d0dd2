//! Page-relevance predicates for the recovery policies.
//!
//! A "page" is the URL path with the domain stripped: `/equities/acme-corp`.
//! Each overlay campaign only ever fires on a known subset of pages, so the
//! hooks check relevance before spending a bounded wait on a probe.

use finweb_core::{FinwebError, Result};

pub const EQUITIES_PAGE: &str = "/equities";
pub const INDICES_PAGE: &str = "/indices";
pub const INDICES_FUTURES_PAGE: &str = "/indices/indices-futures";
pub const INDICES_MAJOR_PAGE: &str = "/indices/major-indices";
pub const NEWS_PAGE: &str = "/news";
pub const PRO_PAGE: &str = "/pro";

/// Extract the page path from a full URL.
///
/// Fails when the URL is not under the given base domain; the hooks treat
/// that as "leave this page alone".
pub fn page_from_url(base_domain: &str, url: &str) -> Result<String> {
    let position = url.find(base_domain).ok_or_else(|| {
        FinwebError::InvalidConfig(format!(
            "URL \"{url}\" is not under the \"{base_domain}\" domain"
        ))
    })?;

    let path = &url[position + base_domain.len()..];
    let path = path.trim_end_matches('/');
    Ok(path.to_string())
}

/// Pro pages run their own overlay stack; recovery hooks skip them.
pub fn is_pro_page(page: &str) -> bool {
    page.starts_with(&format!("{PRO_PAGE}/")) || page == PRO_PAGE
}

/// Global consent overlays can show up on any page under the root domain.
pub fn is_consent_relevant(base_domain: &str, url: &str) -> bool {
    url.contains(base_domain)
}

/// Sale banner triggers on equities overview pages only.
pub fn is_sale_banner_page(page: &str) -> bool {
    page.starts_with(EQUITIES_PAGE)
}

/// ProPicks banner triggers on the major/futures index pages.
pub fn is_propicks_banner_page(page: &str) -> bool {
    page.contains(INDICES_FUTURES_PAGE)
        || page.contains(INDICES_MAJOR_PAGE)
        || page.contains("us-spx-500-futures")
        || page.contains("us-spx-500")
}

/// ProTips banner triggers on individual equities pages.
pub fn is_protips_banner_page(page: &str) -> bool {
    page.starts_with(&format!("{EQUITIES_PAGE}/"))
}

/// March sale banner triggers on index and news pages.
pub fn is_march_sale_banner_page(page: &str) -> bool {
    page.starts_with(&format!("{INDICES_PAGE}/")) || page.starts_with(&format!("{NEWS_PAGE}/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOMAIN: &str = "marketpulse.com";

    #[test]
    fn test_page_from_url_strips_domain_and_trailing_slash() {
        assert_eq!(
            page_from_url(DOMAIN, "https://www.marketpulse.com/equities/acme-corp/").unwrap(),
            "/equities/acme-corp"
        );
        assert_eq!(
            page_from_url(DOMAIN, "https://es.marketpulse.com/indices/major-indices").unwrap(),
            "/indices/major-indices"
        );
        assert_eq!(page_from_url(DOMAIN, "https://marketpulse.com/").unwrap(), "");
    }

    #[test]
    fn test_page_from_url_rejects_foreign_domain() {
        let err = page_from_url(DOMAIN, "https://example.org/equities").unwrap_err();
        assert!(matches!(err, FinwebError::InvalidConfig(_)));
    }

    #[test]
    fn test_pro_pages() {
        assert!(is_pro_page("/pro"));
        assert!(is_pro_page("/pro/watchlist"));
        assert!(!is_pro_page("/products"));
        assert!(!is_pro_page("/equities/acme-corp"));
    }

    #[test]
    fn test_campaign_relevance() {
        assert!(is_sale_banner_page("/equities"));
        assert!(is_sale_banner_page("/equities/acme-corp"));
        assert!(!is_sale_banner_page("/indices"));

        assert!(is_propicks_banner_page("/indices/major-indices"));
        assert!(is_propicks_banner_page("/indices/us-spx-500"));
        assert!(!is_propicks_banner_page("/indices"));

        assert!(is_protips_banner_page("/equities/acme-corp"));
        assert!(!is_protips_banner_page("/equities"));

        assert!(is_march_sale_banner_page("/indices/dax"));
        assert!(is_march_sale_banner_page("/news/latest-news"));
        assert!(!is_march_sale_banner_page("/equities/acme-corp"));
    }
}
