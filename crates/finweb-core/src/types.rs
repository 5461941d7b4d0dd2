//! Shared domain types for finweb

use serde::{Deserialize, Serialize};

/// Locale/region edition of the target site.
///
/// `Www` is the international default; the rest select a localized
/// sub-domain (`de.`, `jp.`, ...).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Edition {
    #[default]
    Www,
    De,
    Es,
    Fr,
    It,
    Nl,
    Pl,
    Br,
    Pt,
    Tr,
    Ru,
    Kr,
    Jp,
    Cn,
    Hk,
    Sa,
    Se,
    Gr,
    Id,
    Th,
    Vn,
    Fi,
    Il,
    Au,
    Ca,
    In,
    Mx,
    Uk,
}

impl Edition {
    pub fn as_subdomain(&self) -> &'static str {
        match self {
            Self::Www => "www",
            Self::De => "de",
            Self::Es => "es",
            Self::Fr => "fr",
            Self::It => "it",
            Self::Nl => "nl",
            Self::Pl => "pl",
            Self::Br => "br",
            Self::Pt => "pt",
            Self::Tr => "tr",
            Self::Ru => "ru",
            Self::Kr => "kr",
            Self::Jp => "jp",
            Self::Cn => "cn",
            Self::Hk => "hk",
            Self::Sa => "sa",
            Self::Se => "se",
            Self::Gr => "gr",
            Self::Id => "id",
            Self::Th => "th",
            Self::Vn => "vn",
            Self::Fi => "fi",
            Self::Il => "il",
            Self::Au => "au",
            Self::Ca => "ca",
            Self::In => "in",
            Self::Mx => "mx",
            Self::Uk => "uk",
        }
    }
}

impl std::fmt::Display for Edition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_subdomain())
    }
}

impl std::str::FromStr for Edition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "www" => Ok(Self::Www),
            "de" => Ok(Self::De),
            "es" => Ok(Self::Es),
            "fr" => Ok(Self::Fr),
            "it" => Ok(Self::It),
            "nl" => Ok(Self::Nl),
            "pl" => Ok(Self::Pl),
            "br" => Ok(Self::Br),
            "pt" => Ok(Self::Pt),
            "tr" => Ok(Self::Tr),
            "ru" => Ok(Self::Ru),
            "kr" => Ok(Self::Kr),
            "jp" => Ok(Self::Jp),
            "cn" => Ok(Self::Cn),
            "hk" => Ok(Self::Hk),
            "sa" => Ok(Self::Sa),
            "se" => Ok(Self::Se),
            "gr" => Ok(Self::Gr),
            "id" => Ok(Self::Id),
            "th" => Ok(Self::Th),
            "vn" => Ok(Self::Vn),
            "fi" => Ok(Self::Fi),
            "il" => Ok(Self::Il),
            "au" => Ok(Self::Au),
            "ca" => Ok(Self::Ca),
            "in" => Ok(Self::In),
            "mx" => Ok(Self::Mx),
            "uk" => Ok(Self::Uk),
            _ => Err(format!("Invalid edition: {}", s)),
        }
    }
}

/// Where the browser session is provisioned
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    /// On-machine browser behind a local chromedriver process
    #[default]
    Local,
    /// Remote session broker with video/log capture
    Cloud,
}

impl std::fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Local => write!(f, "local"),
            Self::Cloud => write!(f, "cloud"),
        }
    }
}

impl std::str::FromStr for ExecutionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "cloud" => Ok(Self::Cloud),
            _ => Err(format!("Invalid execution mode: {}", s)),
        }
    }
}

/// Requested browser variant
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserKind {
    #[default]
    Chrome,
    /// Mobile-emulation chrome variant with a fixed small viewport
    ChromeMobile,
    Firefox,
    Edge,
    Safari,
}

impl BrowserKind {
    pub fn is_mobile(&self) -> bool {
        matches!(self, Self::ChromeMobile)
    }
}

impl std::fmt::Display for BrowserKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Chrome => write!(f, "chrome"),
            Self::ChromeMobile => write!(f, "chromemobile"),
            Self::Firefox => write!(f, "firefox"),
            Self::Edge => write!(f, "edge"),
            Self::Safari => write!(f, "safari"),
        }
    }
}

impl std::str::FromStr for BrowserKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "chrome" => Ok(Self::Chrome),
            "chromemobile" => Ok(Self::ChromeMobile),
            "firefox" => Ok(Self::Firefox),
            "edge" => Ok(Self::Edge),
            "safari" => Ok(Self::Safari),
            _ => Err(format!("Invalid browser: {}", s)),
        }
    }
}

/// Outcome of one scenario execution attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttemptOutcome {
    Success,
    Failure,
    Skipped,
}

impl AttemptOutcome {
    /// Non-success outcomes are candidates for a retry.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::Success)
    }
}

impl std::fmt::Display for AttemptOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Failure => write!(f, "failure"),
            Self::Skipped => write!(f, "skipped"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_edition_round_trip() {
        assert_eq!(Edition::from_str("DE").unwrap(), Edition::De);
        assert_eq!(Edition::De.as_subdomain(), "de");
        assert_eq!(Edition::default(), Edition::Www);
    }

    #[test]
    fn test_execution_mode_parsing() {
        assert_eq!(ExecutionMode::from_str("Cloud").unwrap(), ExecutionMode::Cloud);
        assert!(ExecutionMode::from_str("grid").is_err());
    }

    #[test]
    fn test_browser_kind_mobile() {
        assert!(BrowserKind::ChromeMobile.is_mobile());
        assert!(!BrowserKind::Chrome.is_mobile());
        assert!(BrowserKind::from_str("roku").is_err());
    }

    #[test]
    fn test_outcome_retryability() {
        assert!(AttemptOutcome::Failure.is_retryable());
        assert!(AttemptOutcome::Skipped.is_retryable());
        assert!(!AttemptOutcome::Success.is_retryable());
    }
}
