//! `*` wildcard patterns for forbidden variable names.

use regex::Regex;

/// A forbidden-name pattern such as `SCIENTIA_*`. `*` matches any run of
/// characters; everything else is literal and the whole name must match.
#[derive(Debug, Clone)]
pub struct WildcardPattern {
    source: String,
    regex: Regex,
}

impl WildcardPattern {
    /// Compiles a pattern.
    ///
    /// # Errors
    ///
    /// Returns the regex error if the translated pattern does not compile.
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        let body = pattern
            .split('*')
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join(".*");
        Ok(Self {
            source: pattern.to_string(),
            regex: Regex::new(&format!("^{body}$"))?,
        })
    }

    /// The pattern as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Whether `name` matches.
    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }
}

impl PartialEq for WildcardPattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for WildcardPattern {}

/// First pattern matching `name`, in declaration order.
#[must_use]
pub fn first_match<'a>(patterns: &'a [WildcardPattern], name: &str) -> Option<&'a WildcardPattern> {
    patterns.iter().find(|p| p.matches(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn star_matches_any_run() {
        let p = WildcardPattern::new("SCIENTIA_*").unwrap();
        assert!(p.matches("SCIENTIA_DB_URL"));
        assert!(p.matches("SCIENTIA_"));
        assert!(!p.matches("MY_SCIENTIA_DB"));
    }

    #[test]
    fn other_characters_are_literal() {
        let p = WildcardPattern::new("DB.URL").unwrap();
        assert!(p.matches("DB.URL"));
        assert!(!p.matches("DBXURL"));

        let p = WildcardPattern::new("*_SECRET_*").unwrap();
        assert!(p.matches("PLATFORM_SECRET_KEY"));
        assert!(!p.matches("SECRET_KEY"));
    }

    #[test]
    fn first_match_keeps_declaration_order() {
        let patterns = vec![
            WildcardPattern::new("DATABASE_*").unwrap(),
            WildcardPattern::new("*_URL").unwrap(),
        ];
        assert_eq!(first_match(&patterns, "DATABASE_URL").map(WildcardPattern::as_str), Some("DATABASE_*"));
        assert_eq!(first_match(&patterns, "SITE_URL").map(WildcardPattern::as_str), Some("*_URL"));
        assert!(first_match(&patterns, "APP_ID").is_none());
    }
}
