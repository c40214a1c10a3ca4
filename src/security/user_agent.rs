//! User-Agent block list.

/// Rejects requests whose User-Agent contains a blocked pattern.
#[derive(Debug, Clone, Default)]
pub struct UserAgentFilter {
    patterns: Vec<String>,
}

impl UserAgentFilter {
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            patterns: patterns
                .into_iter()
                .map(|p| p.as_ref().trim().to_lowercase())
                .filter(|p| !p.is_empty())
                .collect(),
        }
    }

    /// Returns the matching pattern if `user_agent` is blocked.
    ///
    /// A request without a User-Agent header is never blocked.
    pub fn blocked_by(&self, user_agent: Option<&str>) -> Option<&str> {
        let agent = user_agent?.to_lowercase();
        self.patterns
            .iter()
            .find(|pattern| agent.contains(pattern.as_str()))
            .map(String::as_str)
    }

    pub fn is_blocked(&self, user_agent: Option<&str>) -> bool {
        self.blocked_by(user_agent).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_case_insensitive_substring() {
        let filter = UserAgentFilter::new(["curl"]);
        assert!(filter.is_blocked(Some("curl/8.0")));
        assert!(filter.is_blocked(Some("Mozilla-compatible CURL client")));
        assert!(!filter.is_blocked(Some("Mozilla/5.0")));
    }

    #[test]
    fn missing_header_is_allowed() {
        let filter = UserAgentFilter::new(["curl"]);
        assert!(!filter.is_blocked(None));
    }

    #[test]
    fn reports_matching_pattern() {
        let filter = UserAgentFilter::new(["Wget", "curl"]);
        assert_eq!(filter.blocked_by(Some("GNU wget 1.21")), Some("wget"));
    }

    #[test]
    fn empty_patterns_are_dropped() {
        let filter = UserAgentFilter::new(["", "  "]);
        assert!(!filter.is_blocked(Some("anything")));
    }
}
