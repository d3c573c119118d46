//! Minimal dotenv parser: `KEY=value` lines, `#` comments, an optional
//! `export ` prefix and optional quotes.

use std::collections::BTreeMap;

use crate::contract::is_var_name;

/// One `KEY=value` assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvEntry {
    /// Variable name.
    pub key: String,
    /// Value with surrounding whitespace and matching quotes removed.
    pub value: String,
    /// Line number (1-indexed).
    pub line: usize,
}

/// Parses dotenv text.
///
/// Blank lines, comments, lines without `=`, and keys that are not
/// uppercase snake case are skipped.
#[must_use]
pub fn parse_entries(content: &str) -> Vec<EnvEntry> {
    content
        .lines()
        .enumerate()
        .filter_map(|(idx, raw)| {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                return None;
            }
            let (key, value) = line.split_once('=')?;
            let key = key.trim();
            let key = key
                .strip_prefix("export")
                .filter(|rest| rest.starts_with(char::is_whitespace))
                .map_or(key, str::trim_start);
            is_var_name(key).then(|| EnvEntry {
                key: key.to_string(),
                value: strip_quotes(value).to_string(),
                line: idx + 1,
            })
        })
        .collect()
}

/// Parses dotenv text into a map; a repeated key keeps its last value.
#[must_use]
pub fn parse_env_file(content: &str) -> BTreeMap<String, String> {
    parse_entries(content)
        .into_iter()
        .map(|e| (e.key, e.value))
        .collect()
}

fn strip_quotes(value: &str) -> &str {
    let v = value.trim();
    let quoted = v.len() >= 2
        && ((v.starts_with('"') && v.ends_with('"')) || (v.starts_with('\'') && v.ends_with('\'')));
    if quoted {
        &v[1..v.len() - 1]
    } else {
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_assignments_and_skips_noise() {
        let text = "\
# comment
APP_ID=marketing-site

PUBLIC_SITE_URL = \"https://example.com\"
lower_case=ignored
NO_EQUALS
EMPTY=
QUOTED='a=b'
";
        let map = parse_env_file(text);
        assert_eq!(map.len(), 4);
        assert_eq!(map["APP_ID"], "marketing-site");
        assert_eq!(map["PUBLIC_SITE_URL"], "https://example.com");
        assert_eq!(map["EMPTY"], "");
        assert_eq!(map["QUOTED"], "a=b");
    }

    #[test]
    fn entries_keep_line_numbers_and_repeats() {
        let entries = parse_entries("A=1\r\n\r\nA=2\n");
        let lines: Vec<(String, usize)> = entries.iter().map(|e| (e.value.clone(), e.line)).collect();
        assert_eq!(lines, vec![("1".to_string(), 1), ("2".to_string(), 3)]);
        assert_eq!(parse_env_file("A=1\nA=2\n")["A"], "2");
    }

    #[test]
    fn export_prefix_is_stripped() {
        let entries = parse_entries("export APP_ID=marketing-site\nexport\tPUBLIC_SITE_URL=\"https://example.com\"\nEXPORTED=1\n");
        let keys: Vec<&str> = entries.iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, vec!["APP_ID", "PUBLIC_SITE_URL", "EXPORTED"]);
        assert_eq!(entries[1].value, "https://example.com");
    }

    #[test]
    fn lone_quote_is_kept() {
        assert_eq!(parse_env_file("A=\"\n")["A"], "\"");
    }
}
