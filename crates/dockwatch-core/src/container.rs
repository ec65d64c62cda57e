//! Container snapshots and monitoring filters.

use serde::{Deserialize, Serialize};

/// A read-only snapshot of a container as reported by the engine.
///
/// Re-fetched on every directory query, never mutated in place.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContainerInfo {
    /// Opaque engine identifier.
    pub id: String,
    /// First alias with the leading `/` stripped.
    pub name: String,
    /// Image reference.
    pub image: String,
    /// Human-readable status line.
    pub status: String,
    /// Enumerated state string (running, exited, paused, ...).
    pub state: String,
    /// Creation time in unix seconds.
    pub created: i64,
}

/// Process-wide allow-lists restricting which containers are monitorable.
///
/// Derived from configuration at startup and immutable for the process
/// lifetime. `None` (or an empty list) matches everything.
#[derive(Debug, Clone, Default)]
pub struct FilterConfig {
    /// Name allow-list.
    pub names: Option<Vec<String>>,
    /// State allow-list (lower-cased entries).
    pub states: Option<Vec<String>>,
}

impl FilterConfig {
    /// Symmetric substring match: an entry matches when it contains the
    /// container name or the container name contains it. Deliberately loose
    /// so partial names on either side still match.
    pub fn matches_name(&self, name: &str) -> bool {
        match &self.names {
            None => true,
            Some(entries) if entries.is_empty() => true,
            Some(entries) => entries
                .iter()
                .any(|entry| name.contains(entry.as_str()) || entry.contains(name)),
        }
    }

    /// Literal membership of the lower-cased container state.
    pub fn matches_state(&self, state: &str) -> bool {
        match &self.states {
            None => true,
            Some(entries) if entries.is_empty() => true,
            Some(entries) => {
                let state = state.to_lowercase();
                entries.iter().any(|entry| *entry == state)
            }
        }
    }

    /// Whether a container survives both allow-lists.
    pub fn matches(&self, container: &ContainerInfo) -> bool {
        self.matches_name(&container.name) && self.matches_state(&container.state)
    }

    /// Render the name allow-list for the listing endpoint.
    pub fn describe(&self) -> String {
        match &self.names {
            Some(entries) if !entries.is_empty() => entries.join(", "),
            _ => "all".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn container(name: &str, state: &str) -> ContainerInfo {
        ContainerInfo {
            id: "abc123".to_string(),
            name: name.to_string(),
            image: "nginx:latest".to_string(),
            status: "Up 2 hours".to_string(),
            state: state.to_string(),
            created: 1_700_000_000,
        }
    }

    #[test]
    fn absent_allow_list_matches_everything() {
        let filter = FilterConfig::default();
        assert!(filter.matches(&container("anything", "running")));
        assert!(filter.matches(&container("", "exited")));
    }

    #[test]
    fn empty_allow_list_matches_everything() {
        let filter = FilterConfig {
            names: Some(Vec::new()),
            states: Some(Vec::new()),
        };
        assert!(filter.matches(&container("web-1", "running")));
    }

    #[test]
    fn name_match_is_symmetric_substring() {
        let filter = FilterConfig {
            names: Some(vec!["web".to_string()]),
            states: None,
        };
        // Entry is a substring of the name.
        assert!(filter.matches_name("web-worker"));
        // Name is a substring of the entry.
        let filter = FilterConfig {
            names: Some(vec!["production-web".to_string()]),
            states: None,
        };
        assert!(filter.matches_name("web"));
        assert!(!filter.matches_name("db"));
    }

    #[test]
    fn overlapping_entries_match_both_containers() {
        // Known looseness: "web" matches both "web" and "web-worker".
        let filter = FilterConfig {
            names: Some(vec!["web".to_string()]),
            states: None,
        };
        assert!(filter.matches_name("web"));
        assert!(filter.matches_name("web-worker"));
    }

    #[test]
    fn state_match_is_literal_and_case_folded() {
        let filter = FilterConfig {
            names: None,
            states: Some(vec!["running".to_string()]),
        };
        assert!(filter.matches_state("running"));
        assert!(filter.matches_state("Running"));
        assert!(!filter.matches_state("exited"));
        // No substring looseness for states.
        assert!(!filter.matches_state("run"));
    }

    #[test]
    fn describe_renders_all_or_joined_names() {
        assert_eq!(FilterConfig::default().describe(), "all");
        let filter = FilterConfig {
            names: Some(vec!["web".to_string(), "db".to_string()]),
            states: None,
        };
        assert_eq!(filter.describe(), "web, db");
    }
}
