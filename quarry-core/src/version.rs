// SPDX-FileCopyrightText: 2026 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Maven-aware version ordering.
//!
//! Implements the numeric-aware comparison used to pick the "latest" unique
//! snapshot: version strings are tokenized on `.`, `-` and digit/letter
//! transitions, numeric tokens compare numerically and known qualifiers
//! (`alpha` < `beta` < `milestone` < `rc` < `snapshot` < release < `sp`)
//! order the way Maven orders them. Plain lexicographic comparison would
//! rank `1.0-20230101.020202-2` below `1.0-20230101.010101-10`.

use std::cmp::Ordering;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Number(u64),
    Qualifier(String),
}

impl Token {
    fn qualifier_rank(q: &str) -> u8 {
        match q {
            "alpha" | "a" => 0,
            "beta" | "b" => 1,
            "milestone" | "m" => 2,
            "rc" | "cr" => 3,
            "snapshot" => 4,
            "" | "final" | "ga" | "release" => 5,
            "sp" => 6,
            _ => 7,
        }
    }

    fn compare(&self, other: &Token) -> Ordering {
        match (self, other) {
            (Token::Number(a), Token::Number(b)) => a.cmp(b),
            // Numbers always rank above qualifiers: 1.0.1 > 1.0-rc
            (Token::Number(_), Token::Qualifier(_)) => Ordering::Greater,
            (Token::Qualifier(_), Token::Number(_)) => Ordering::Less,
            (Token::Qualifier(a), Token::Qualifier(b)) => {
                let (ra, rb) = (Self::qualifier_rank(a), Self::qualifier_rank(b));
                ra.cmp(&rb).then_with(|| a.cmp(b))
            }
        }
    }

    /// Comparison against a missing trailing token ("1.0" vs "1.0.x").
    fn compare_to_padding(&self) -> Ordering {
        match self {
            Token::Number(0) => Ordering::Equal,
            Token::Number(_) => Ordering::Greater,
            Token::Qualifier(q) => Self::qualifier_rank(q).cmp(&Self::qualifier_rank("")),
        }
    }
}

/// A version string with Maven ordering semantics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MavenVersion {
    raw: String,
    tokens: Vec<Token>,
}

impl MavenVersion {
    pub fn parse(raw: &str) -> Self {
        Self {
            raw: raw.to_owned(),
            tokens: tokenize(raw),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl From<&str> for MavenVersion {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

impl fmt::Display for MavenVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl Ord for MavenVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let longest = self.tokens.len().max(other.tokens.len());
        for i in 0..longest {
            let ordering = match (self.tokens.get(i), other.tokens.get(i)) {
                (Some(a), Some(b)) => a.compare(b),
                (Some(a), None) => a.compare_to_padding(),
                (None, Some(b)) => b.compare_to_padding().reverse(),
                (None, None) => Ordering::Equal,
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }
}

impl PartialOrd for MavenVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn tokenize(raw: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut buf = String::new();
    let mut buf_numeric = false;

    let flush = |buf: &mut String, numeric: bool, tokens: &mut Vec<Token>| {
        if buf.is_empty() {
            return;
        }
        let token = if numeric {
            match buf.parse::<u64>() {
                Ok(n) => Token::Number(n),
                // Longer than u64: keep as qualifier, still deterministic
                Err(_) => Token::Qualifier(buf.clone()),
            }
        } else {
            Token::Qualifier(buf.to_lowercase())
        };
        tokens.push(token);
        buf.clear();
    };

    for c in raw.chars() {
        if c == '.' || c == '-' || c == '_' {
            flush(&mut buf, buf_numeric, &mut tokens);
            continue;
        }
        let numeric = c.is_ascii_digit();
        if !buf.is_empty() && numeric != buf_numeric {
            flush(&mut buf, buf_numeric, &mut tokens);
        }
        buf_numeric = numeric;
        buf.push(c);
    }
    flush(&mut buf, buf_numeric, &mut tokens);
    tokens
}
