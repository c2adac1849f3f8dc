// SPDX-FileCopyrightText: 2026 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Escaping of reserved characters in stored path segments.
//!
//! Build names, numbers and timestamps may contain characters that are
//! illegal in tree node names (`/`, separators, whitespace) or that the
//! naming scheme reserves (a leading digit). [`escape`] maps any segment to
//! a storable form; [`unescape`] inverts it.
//!
//! The encoding is ISO-9075 style: an offending character is replaced by
//! `_xHHHH_` (code point in hex, six digits above the BMP). A literal `_`
//! that would otherwise start a decodable unit is escaped too, which is what
//! makes the pair a true inverse.
//!
//! Escaping is total. Unescaping is best-effort: historical trees contain
//! segments that were never produced by [`escape`] ("bereaved" records), so
//! a malformed unit returns the input unchanged instead of failing.

use tracing::debug;

const RESERVED: &[char] = &['/', ':', '|', '*', '?', '"', '\'', '[', ']'];

fn is_reserved(c: char) -> bool {
    RESERVED.contains(&c) || c.is_whitespace()
}

fn push_escaped(out: &mut String, c: char) {
    let code = c as u32;
    if code <= 0xffff {
        out.push_str(&format!("_x{code:04x}_"));
    } else {
        out.push_str(&format!("_x{code:06x}_"));
    }
}

/// Escape a segment so it can be stored as a tree node name.
///
/// Total over all of Unicode; never fails. Not idempotent - callers must
/// track escape state explicitly.
pub fn escape(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    let mut chars = segment.chars().peekable();
    let mut first = true;
    while let Some(c) = chars.next() {
        let confusable = c == '_' && chars.peek() == Some(&'x');
        if is_reserved(c) || confusable || (first && c.is_ascii_digit()) {
            push_escaped(&mut out, c);
        } else {
            out.push(c);
        }
        first = false;
    }
    out
}

/// Decode a segment produced by [`escape`].
///
/// A segment containing a malformed `_x..._` unit is returned unchanged:
/// non-conforming historical data must not break scans that touch it.
pub fn unescape(segment: &str) -> String {
    match try_unescape(segment) {
        Some(decoded) => decoded,
        None => {
            debug!("not a conforming escaped segment, keeping as-is: '{segment}'");
            segment.to_owned()
        }
    }
}

fn try_unescape(segment: &str) -> Option<String> {
    let mut out = String::with_capacity(segment.len());
    let mut rest = segment;
    while let Some(pos) = rest.find("_x") {
        out.push_str(&rest[..pos]);
        let unit = &rest[pos + 2..];
        let end = unit.find('_')?;
        if !(4..=6).contains(&end) {
            return None;
        }
        let code = u32::from_str_radix(&unit[..end], 16).ok()?;
        out.push(char::from_u32(code)?);
        rest = &unit[end + 1..];
    }
    out.push_str(rest);
    Some(out)
}
