//! Negation guards: suppress matches on lines that are compliance statements.
//!
//! A guard fires when one of its negation phrases is followed, within a
//! bounded number of intervening words, by one of its trigger phrases.
//! The window never crosses sentence punctuation (`.`, `!`, `?`, `;`, `:`).
//! Each guard suppresses only the rules tagged with its [`GuardClass`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Negation phrases shared by the built-in guards.
pub const NEGATION_PHRASES: &[&str] = &["not", "no", "without", "does not", "do not", "did not", "never"];

/// Which class of rules a guard suppresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GuardClass {
    /// Autonomy vocabulary ("autonomous", "self-directed").
    Autonomy,
    /// Decision-authority verbs ("decides", "executes", "prioritizes").
    AuthorityVerb,
}

impl GuardClass {
    /// Stable identifier used in configuration (`guard_window`).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Autonomy => "autonomy",
            Self::AuthorityVerb => "authority-verb",
        }
    }
}

impl fmt::Display for GuardClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Stem {
    Exact(String),
    Prefix(String),
}

impl Stem {
    fn parse(word: &str) -> Self {
        let word = word.to_lowercase();
        match word.strip_suffix('*') {
            Some(prefix) => Self::Prefix(prefix.to_string()),
            None => Self::Exact(word),
        }
    }

    fn matches(&self, word: &str) -> bool {
        match self {
            Self::Exact(w) => w == word,
            Self::Prefix(p) => word.starts_with(p.as_str()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Word(String),
    Break,
}

fn tokenize(line: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut word = String::new();
    for c in line.chars().flat_map(char::to_lowercase) {
        if c.is_alphanumeric() || c == '\'' {
            word.push(c);
            continue;
        }
        if !word.is_empty() {
            tokens.push(Token::Word(std::mem::take(&mut word)));
        }
        if matches!(c, '.' | '!' | '?' | ';' | ':') {
            tokens.push(Token::Break);
        }
    }
    if !word.is_empty() {
        tokens.push(Token::Word(word));
    }
    tokens
}

fn phrase(text: &str) -> Vec<Stem> {
    text.split_whitespace().map(Stem::parse).collect()
}

fn matches_at(tokens: &[Token], at: usize, seq: &[Stem]) -> bool {
    seq.iter().enumerate().all(|(offset, stem)| {
        matches!(tokens.get(at + offset), Some(Token::Word(w)) if stem.matches(w))
    })
}

/// A bounded-window negation predicate over a single line.
#[derive(Debug, Clone)]
pub struct NegationGuard {
    id: String,
    class: GuardClass,
    negations: Vec<Vec<Stem>>,
    triggers: Vec<Vec<Stem>>,
    window: usize,
}

impl NegationGuard {
    /// Creates a guard with the shared negation phrases and no triggers.
    ///
    /// `window` is the maximum number of words allowed between the end of
    /// the negation and the start of the trigger.
    #[must_use]
    pub fn new(id: impl Into<String>, class: GuardClass, window: usize) -> Self {
        Self {
            id: id.into(),
            class,
            negations: NEGATION_PHRASES.iter().map(|n| phrase(n)).collect(),
            triggers: Vec::new(),
            window,
        }
    }

    /// Adds trigger phrases. A trailing `*` on a word makes it a stem
    /// (`prioritiz*` matches "prioritizes").
    #[must_use]
    pub fn triggers<I, S>(mut self, triggers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.triggers
            .extend(triggers.into_iter().map(|t| phrase(t.as_ref())));
        self
    }

    /// Replaces the word window.
    #[must_use]
    pub fn with_window(mut self, window: usize) -> Self {
        self.window = window;
        self
    }

    /// Guard identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Class of rules this guard suppresses.
    #[must_use]
    pub fn class(&self) -> GuardClass {
        self.class
    }

    /// Word window.
    #[must_use]
    pub fn window(&self) -> usize {
        self.window
    }

    /// Returns true if the line is a negated statement for this guard.
    #[must_use]
    pub fn matches(&self, line: &str) -> bool {
        let tokens = tokenize(line);
        (0..tokens.len()).any(|i| {
            self.negations
                .iter()
                .filter(|neg| matches_at(&tokens, i, neg))
                .any(|neg| self.trigger_follows(&tokens, i + neg.len()))
        })
    }

    fn trigger_follows(&self, tokens: &[Token], start: usize) -> bool {
        let end = (start + self.window + 1).min(tokens.len());
        for at in start..end {
            if tokens[at] == Token::Break {
                return false;
            }
            if self.triggers.iter().any(|t| matches_at(tokens, at, t)) {
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verb_guard(window: usize) -> NegationGuard {
        NegationGuard::new("negated-authority-verb", GuardClass::AuthorityVerb, window).triggers([
            "decide*",
            "decision*",
            "execut*",
            "prioritiz*",
            "determin*",
            "make* decisions",
        ])
    }

    fn autonomy_guard() -> NegationGuard {
        NegationGuard::new("negated-autonomy", GuardClass::Autonomy, 4).triggers(["autonomous"])
    }

    #[test]
    fn negated_statement_matches() {
        let guard = verb_guard(10);
        assert!(guard.matches("This document does not claim the system decides outcomes."));
        assert!(guard.matches("Humans make the call; software never makes decisions."));
    }

    #[test]
    fn plain_statement_does_not_match() {
        let guard = verb_guard(10);
        assert!(!guard.matches("The system decides outcomes."));
    }

    #[test]
    fn window_bounds_the_lookahead() {
        let line = "We do not, under any real circumstance whatsoever, let software decide.";
        assert!(verb_guard(10).matches(line));
        assert!(!verb_guard(3).matches(line));
    }

    #[test]
    fn sentence_punctuation_stops_the_window() {
        assert!(!verb_guard(10).matches("No. The platform decides."));
    }

    #[test]
    fn autonomy_guard_ignores_verbs() {
        let guard = autonomy_guard();
        assert!(guard.matches("It is not autonomous."));
        assert!(guard.matches("Without being autonomous, it helps."));
        assert!(!guard.matches("It does not decide anything at all for anyone, it is autonomous"));
    }

    #[test]
    fn stems_require_word_start() {
        let guard = verb_guard(10);
        assert!(!guard.matches("There is no undecided matter."));
    }

    #[test]
    fn negation_inside_word_is_ignored() {
        assert!(!autonomy_guard().matches("Nothing autonomous here knot autonomous"));
    }

    #[test]
    fn class_ids_are_stable() {
        assert_eq!(GuardClass::Autonomy.to_string(), "autonomy");
        assert_eq!(GuardClass::AuthorityVerb.as_str(), "authority-verb");
    }
}
