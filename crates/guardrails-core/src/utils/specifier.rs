//! Lightweight module-specifier tokenizer.
//!
//! Recognizes the specifier string in:
//! ```text
//! import x from "a"      export * from "a"
//! import "a"             import("a")
//! require("a")
//! ```
//! Detection is lexical and line-local: a statement split across lines is
//! only seen through the line that carries the quoted specifier after its
//! keyword.

const KEYWORDS: [&str; 3] = ["from", "import", "require"];

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}

/// Extracts every module specifier on a line, in order of appearance.
#[must_use]
pub fn extract_specifiers(line: &str) -> Vec<&str> {
    let bytes = line.as_bytes();
    let mut found = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let Some(keyword) = KEYWORDS
            .iter()
            .find(|k| bytes[i..].starts_with(k.as_bytes()))
        else {
            i += 1;
            continue;
        };

        let end = i + keyword.len();
        let bounded_left = i == 0 || !is_ident_byte(bytes[i - 1]);
        let bounded_right = bytes.get(end).map_or(true, |b| !is_ident_byte(*b));
        if !(bounded_left && bounded_right) {
            i = end;
            continue;
        }

        match quoted_after(line, end) {
            Some((spec, next)) => {
                found.push(spec);
                i = next;
            }
            None => i = end,
        }
    }

    found
}

/// Skips whitespace and at most one `(` and returns the quoted string that
/// follows, with the index just past its closing quote.
fn quoted_after(line: &str, start: usize) -> Option<(&str, usize)> {
    let bytes = line.as_bytes();
    let mut i = start;
    let mut paren = false;
    while let Some(&b) = bytes.get(i) {
        match b {
            b' ' | b'\t' => i += 1,
            b'(' if !paren => {
                paren = true;
                i += 1;
            }
            _ => break,
        }
    }

    let quote = *bytes.get(i)?;
    if !matches!(quote, b'"' | b'\'' | b'`') {
        return None;
    }
    let body = i + 1;
    let close = bytes[body..].iter().position(|&b| b == quote)? + body;
    let spec = &line[body..close];
    if spec.is_empty() || spec.contains("${") {
        return None;
    }
    Some((spec, close + 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_static_imports() {
        assert_eq!(extract_specifiers(r#"import { db } from "@scientia/db";"#), vec!["@scientia/db"]);
        assert_eq!(extract_specifiers("import './styles.css'"), vec!["./styles.css"]);
        assert_eq!(extract_specifiers(r#"export * from "scientia-platform""#), vec!["scientia-platform"]);
    }

    #[test]
    fn extracts_calls() {
        assert_eq!(extract_specifiers("const m = await import('@solum/core')"), vec!["@solum/core"]);
        assert_eq!(extract_specifiers(r#"const db = require( "@radixos/db" )"#), vec!["@radixos/db"]);
    }

    #[test]
    fn extracts_multiple_on_one_line() {
        let line = r#"import a from "a"; import b from 'b'"#;
        assert_eq!(extract_specifiers(line), vec!["a", "b"]);
    }

    #[test]
    fn ignores_prose_and_partial_keywords() {
        assert!(extract_specifiers("We import nothing from the platform.").is_empty());
        assert!(extract_specifiers(r#"const important = "x""#).is_empty());
        assert!(extract_specifiers(r#"fromage "brie""#).is_empty());
        assert!(extract_specifiers(r#"x.require_all("y")"#).is_empty());
    }

    #[test]
    fn ignores_template_interpolation() {
        assert!(extract_specifiers("import(`./pages/${slug}`)").is_empty());
    }
}
