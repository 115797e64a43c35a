//! Monitors the bar can be placed on, and the `output` pattern list that picks them

use std::fmt;

/// A connected monitor as reported by the compositor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Output {
    /// Connector name, e.g. `eDP-1`
    pub name: String,
    /// Stable description, e.g. `Dell Inc. DELL U2720Q ABC123`
    pub identifier: String,
}

impl Output {
    pub fn new(name: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            identifier: identifier.into(),
        }
    }

    /// Parse the `NAME[:IDENTIFIER]` form used on the command line
    pub fn parse(raw: &str) -> Self {
        match raw.split_once(':') {
            Some((name, identifier)) => Self::new(name, identifier),
            None => Self::new(raw, ""),
        }
    }

    fn is(&self, pattern: &str) -> bool {
        pattern == self.name || (!self.identifier.is_empty() && pattern == self.identifier)
    }
}

impl fmt::Display for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.identifier.is_empty() {
            f.write_str(&self.name)
        } else {
            write!(f, "{} ({})", self.name, self.identifier)
        }
    }
}

/// Decide whether a bar with these output patterns shows on `output`.
///
/// Patterns are checked in order and the first hit decides:
/// `!NAME` excludes, a leading `*` includes everything, and a bare name or
/// identifier includes. An empty list shows the bar everywhere; otherwise an
/// output nothing matched gets no bar.
pub fn output_matches<S: AsRef<str>>(patterns: &[S], output: &Output) -> bool {
    if patterns.is_empty() {
        return true;
    }

    for pattern in patterns.iter().map(AsRef::as_ref) {
        if let Some(excluded) = pattern.strip_prefix('!') {
            if output.is(excluded) {
                return false;
            }
            continue;
        }
        if pattern.starts_with('*') || output.is(pattern) {
            return true;
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_list_enables_everything() {
        let patterns: [&str; 0] = [];
        assert!(output_matches(&patterns, &Output::new("HDMI-0", "")));
    }

    #[test]
    fn test_exclusion_then_wildcard() {
        let patterns = ["!HDMI-0", "*"];
        assert!(!output_matches(&patterns, &Output::new("HDMI-0", "")));
        assert!(output_matches(&patterns, &Output::new("eDP-1", "")));
        assert!(output_matches(&patterns, &Output::new("DP-2", "Some Monitor")));
    }

    #[test]
    fn test_exclusion_by_identifier() {
        let patterns = ["!Dell U2720Q", "*"];
        assert!(!output_matches(&patterns, &Output::new("DP-1", "Dell U2720Q")));
        assert!(output_matches(&patterns, &Output::new("DP-2", "LG 27GL850")));
    }

    #[test]
    fn test_first_match_wins() {
        // The wildcard short-circuits before the exclusion is reached
        let patterns = ["*", "!HDMI-0"];
        assert!(output_matches(&patterns, &Output::new("HDMI-0", "")));
    }

    #[test]
    fn test_closed_list() {
        let patterns = vec!["eDP-1".to_string(), "Dell U2720Q".to_string()];
        assert!(output_matches(&patterns, &Output::new("eDP-1", "")));
        assert!(output_matches(&patterns, &Output::new("DP-3", "Dell U2720Q")));
        assert!(!output_matches(&patterns, &Output::new("HDMI-0", "")));
    }

    #[test]
    fn test_empty_identifier_never_matches_empty_pattern() {
        let patterns = ["!", "*"];
        assert!(output_matches(&patterns, &Output::new("HDMI-0", "")));
    }

    #[test]
    fn test_parse_cli_form() {
        assert_eq!(Output::parse("eDP-1"), Output::new("eDP-1", ""));
        assert_eq!(Output::parse("DP-1:Dell U2720Q"), Output::new("DP-1", "Dell U2720Q"));
    }
}
