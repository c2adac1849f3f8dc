// SPDX-FileCopyrightText: 2026 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Safely-escaped `LIKE` patterns.
//!
//! All pattern matching in the index goes through SQLite `LIKE ... ESCAPE`
//! with the pattern as a bound parameter, so user-supplied search criteria
//! can never alter query semantics. A [`LikePattern`] is the only way to
//! get wildcard matching: literal text has `%`, `_` and the escape
//! character escaped; user-facing wildcards `*` and `?` translate to `%`
//! and `_`.
//!
//! Matching is ASCII case-insensitive, which is SQLite's default `LIKE`
//! collation and what name search wants.

/// The escape character declared in every `LIKE` clause.
pub(crate) const LIKE_ESCAPE: char = '\\';

/// An escaped `LIKE` pattern, built by composition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LikePattern(String);

fn push_escaped(out: &mut String, text: &str) {
    for c in text.chars() {
        if c == '%' || c == '_' || c == LIKE_ESCAPE {
            out.push(LIKE_ESCAPE);
        }
        out.push(c);
    }
}

impl LikePattern {
    pub fn empty() -> Self {
        Self(String::new())
    }

    /// Match `text` exactly (no wildcards).
    pub fn literal(text: &str) -> Self {
        Self::empty().then_literal(text)
    }

    /// Match a user pattern: `*` is any run, `?` a single character,
    /// everything else literal.
    pub fn from_user(pattern: &str) -> Self {
        Self::empty().then_user(pattern)
    }

    /// Case-insensitive substring match.
    pub fn contains(text: &str) -> Self {
        Self::empty().then_any().then_literal(text).then_any()
    }

    pub fn then_literal(mut self, text: &str) -> Self {
        push_escaped(&mut self.0, text);
        self
    }

    pub fn then_user(mut self, pattern: &str) -> Self {
        for c in pattern.chars() {
            match c {
                '*' => self.0.push('%'),
                '?' => self.0.push('_'),
                c => push_escaped(&mut self.0, &c.to_string()),
            }
        }
        self
    }

    /// Append a match-anything wildcard.
    pub fn then_any(mut self) -> Self {
        self.0.push('%');
        self
    }

    /// The rendered SQL pattern; always passed as a bound parameter.
    pub fn as_sql(&self) -> &str {
        &self.0
    }

    /// Whether the pattern is a bare match-everything wildcard.
    pub fn matches_everything(&self) -> bool {
        self.0.chars().all(|c| c == '%') && !self.0.is_empty()
    }
}
