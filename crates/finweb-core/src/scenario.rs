//! Scenario identity as consumed from the BDD engine
//!
//! Runner-generated scenario IDs are not stable across repeated executions,
//! so the display name plus the feature-file line number is used everywhere
//! a stable identity is needed (retry bookkeeping, diagnostics labeling).

use regex::Regex;
use tracing::warn;

/// Ticket-project prefixes recognized in test-id tags (e.g. `@CT-1234`).
const TICKET_PROJECTS: &[&str] = &["CT", "WEB"];

/// Metadata of one behavior-specified scenario.
///
/// Supplied by the scenario runner at before-hook time and held by the
/// session context for the duration of the scenario.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioDescriptor {
    /// Display name of the scenario
    pub name: String,
    /// Line in the feature file. For an outline row this is the example
    /// row's line, which keeps reruns of the same row identical.
    pub line: u32,
    /// Source tags, each starting with '@'
    pub tags: Vec<String>,
}

impl ScenarioDescriptor {
    pub fn new(name: impl Into<String>, line: u32, tags: Vec<String>) -> Self {
        Self {
            name: name.into(),
            line,
            tags,
        }
    }

    /// Stable identity across reruns: `"<name> (line <line>)"`.
    pub fn stable_key(&self) -> String {
        format!("{} (line {})", self.name, self.line)
    }

    pub fn contains_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Ticket IDs of known bugs, from `@issue=` tags.
    pub fn issues(&self) -> Vec<String> {
        self.tags
            .iter()
            .filter_map(|t| t.strip_prefix("@issue="))
            .map(str::to_string)
            .collect()
    }

    /// The test ID from a ticket-style tag (`@CT-xxxx` or `@tmsLink=CT-xxxx`),
    /// or None when no such tag exists.
    pub fn test_id(&self) -> Option<String> {
        let patterns: Vec<Regex> = TICKET_PROJECTS
            .iter()
            .flat_map(|project| {
                [
                    Regex::new(&format!(r"^@{}-\d+$", project)).expect("static pattern"),
                    Regex::new(&format!(r"^@tmsLink={}-\d+$", project)).expect("static pattern"),
                ]
            })
            .collect();

        let test_id = self
            .tags
            .iter()
            .find(|tag| patterns.iter().any(|p| p.is_match(tag)))
            .map(|tag| {
                tag.trim_start_matches('@')
                    .trim_start_matches("tmsLink=")
                    .to_string()
            });

        if test_id.is_none() {
            warn!(scenario = %self.name, "couldn't detect a ticket ID for the test");
        }

        test_id
    }
}

impl std::fmt::Display for ScenarioDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.stable_key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(tags: &[&str]) -> ScenarioDescriptor {
        ScenarioDescriptor::new(
            "Open equities page",
            42,
            tags.iter().map(|t| t.to_string()).collect(),
        )
    }

    #[test]
    fn test_stable_key_format() {
        let d = descriptor(&[]);
        assert_eq!(d.stable_key(), "Open equities page (line 42)");
    }

    #[test]
    fn test_stable_key_identical_across_reruns() {
        // Runtime IDs differ between runs; name + line must not.
        let first = descriptor(&["@CT-100"]);
        let second = descriptor(&["@CT-100"]);
        assert_eq!(first.stable_key(), second.stable_key());
    }

    #[test]
    fn test_test_id_plain_tag() {
        let d = descriptor(&["@smoke", "@CT-1234"]);
        assert_eq!(d.test_id().as_deref(), Some("CT-1234"));
    }

    #[test]
    fn test_test_id_tms_link_tag() {
        let d = descriptor(&["@tmsLink=WEB-77"]);
        assert_eq!(d.test_id().as_deref(), Some("WEB-77"));
    }

    #[test]
    fn test_test_id_missing() {
        let d = descriptor(&["@smoke"]);
        assert_eq!(d.test_id(), None);
    }

    #[test]
    fn test_issues_extraction() {
        let d = descriptor(&["@issue=CT-1", "@issue=CT-2", "@smoke"]);
        assert_eq!(d.issues(), vec!["CT-1".to_string(), "CT-2".to_string()]);
    }

    #[test]
    fn test_contains_tag() {
        let d = descriptor(&["@MobileSite"]);
        assert!(d.contains_tag("@MobileSite"));
        assert!(!d.contains_tag("@Profile"));
    }
}
