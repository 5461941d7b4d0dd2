//! Run configuration for finweb
//!
//! Parameters come from environment-style key/value pairs, read once at
//! startup. Every parameter has a default so a bare `FINWEB_RUN=local`
//! invocation works out of the box.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::{BrowserKind, Edition, ExecutionMode, FinwebError, Result};

/// Sub-domain marking the canary environment
pub const CANARY_SUB_DOMAIN: &str = "canary";

/// Cache-busting query flag appended when `no_cache` is on
pub const NO_CACHE_PARAM: &str = "?nocache=";

/// Run-level parameters, resolved once per process
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunParams {
    /// Where browser sessions are provisioned
    #[serde(default)]
    pub mode: ExecutionMode,

    /// Requested browser variant
    #[serde(default)]
    pub browser: BrowserKind,

    /// Browser version tag requested from the session broker
    #[serde(default = "default_version_tag")]
    pub version_tag: String,

    /// Default locale edition for new scenarios
    #[serde(default)]
    pub edition: Edition,

    /// Base domain of the target site, without scheme or edition sub-domain
    #[serde(default = "default_base_domain")]
    pub base_domain: String,

    /// Run local browsers headless
    #[serde(default)]
    pub headless: bool,

    /// Upper bound on attempts per scenario (first run included)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Append the cache-busting query flag to navigated URLs
    #[serde(default)]
    pub no_cache: bool,

    /// Route local-mode sessions through a localhost hub with cloud-style
    /// capabilities instead of a bare chromedriver process
    #[serde(default)]
    pub local_grid: bool,
}

fn default_version_tag() -> String {
    "latest".to_string()
}

fn default_base_domain() -> String {
    "marketpulse.com".to_string()
}

fn default_max_attempts() -> u32 {
    1
}

impl Default for RunParams {
    fn default() -> Self {
        Self {
            mode: ExecutionMode::default(),
            browser: BrowserKind::default(),
            version_tag: default_version_tag(),
            edition: Edition::default(),
            base_domain: default_base_domain(),
            headless: false,
            max_attempts: default_max_attempts(),
            no_cache: false,
            local_grid: false,
        }
    }
}

impl RunParams {
    /// Read parameters from process environment variables (`FINWEB_*`).
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read parameters through an arbitrary lookup function.
    ///
    /// Empty values fall back to defaults the same way absent ones do.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| -> Option<String> {
            lookup(key).filter(|v| !v.trim().is_empty())
        };

        let mut params = Self::default();

        if let Some(raw) = get("FINWEB_RUN") {
            params.mode = ExecutionMode::from_str(&raw).map_err(FinwebError::InvalidConfig)?;
        }
        if let Some(raw) = get("FINWEB_BROWSER") {
            // Name the requested mode too, so a rejected run shows both
            // inputs the operator asked for.
            params.browser = BrowserKind::from_str(&raw).map_err(|err| {
                FinwebError::InvalidConfig(format!(
                    "{} (requested with \"{}\" execution mode)",
                    err, params.mode
                ))
            })?;
        }
        if let Some(raw) = get("FINWEB_TAG") {
            params.version_tag = raw;
        }
        if let Some(raw) = get("FINWEB_EDITION") {
            params.edition = Edition::from_str(&raw).map_err(FinwebError::InvalidConfig)?;
        }
        if let Some(raw) = get("FINWEB_URL") {
            params.base_domain = raw
                .to_lowercase()
                .trim_end_matches('/')
                .to_string();
        }
        if let Some(raw) = get("FINWEB_HEADLESS") {
            params.headless = raw.parse().unwrap_or(false);
        }
        if let Some(raw) = get("FINWEB_RETRIES") {
            params.max_attempts = raw
                .parse()
                .map_err(|_| FinwebError::InvalidConfig(format!("FINWEB_RETRIES: {}", raw)))?;
        }
        if let Some(raw) = get("FINWEB_NO_CACHE") {
            params.no_cache = raw == "1" || raw.eq_ignore_ascii_case("true");
        }
        if let Some(raw) = get("FINWEB_LOCAL_GRID") {
            params.local_grid = raw.parse().unwrap_or(false);
        }

        Ok(params)
    }

    /// True when the run targets the canary environment.
    pub fn is_on_canary(&self) -> bool {
        self.base_domain.contains(CANARY_SUB_DOMAIN)
    }

    /// Home URL for the given edition.
    ///
    /// The mobile-emulation browser uses the `m.` sub-domain; the
    /// international edition drops its own sub-domain there (`m.domain`
    /// rather than `m.www.domain`).
    pub fn home_url(&self, edition: Edition) -> String {
        let mut url = String::from("https://");

        if self.browser.is_mobile() {
            url.push('m');
            if edition != Edition::Www {
                url.push('.');
                url.push_str(edition.as_subdomain());
            }
        } else {
            url.push_str(edition.as_subdomain());
        }

        url.push('.');
        url.push_str(&self.base_domain);

        if self.no_cache {
            url.push_str(NO_CACHE_PARAM);
            let stamp = std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_millis())
                .unwrap_or(0);
            url.push_str(&stamp.to_string());
        }
        url
    }
}
