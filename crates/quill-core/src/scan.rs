//! Byte-level helpers shared by the rewriter and the placeholder binder.
//!
//! The scanner understands just enough SQL lexing to avoid matching inside
//! literals: single-quoted strings, double-quoted and backtick identifiers
//! (all with doubled-delimiter escapes), `--` line comments and `/* */`
//! block comments. Bracketed identifiers and backslash escapes are only
//! recognised when the dialect's [`Syntax`] has them. Everything else is
//! plain text.

use crate::dialect::Syntax;

/// Whether `b` can be part of an identifier or keyword.
pub(crate) const fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Whether `keyword` (uppercase ASCII) starts at `i`, case-insensitively,
/// with no identifier character directly before or after it.
pub(crate) fn keyword_at(bytes: &[u8], i: usize, keyword: &[u8]) -> bool {
    let end = i + keyword.len();
    if end > bytes.len() || !bytes[i..end].eq_ignore_ascii_case(keyword) {
        return false;
    }
    let before_ok = i == 0 || !is_word_byte(bytes[i - 1]);
    let after_ok = end == bytes.len() || !is_word_byte(bytes[end]);
    before_ok && after_ok
}

/// If a literal, quoted identifier or comment starts at `i`, returns the
/// index just past its end. Unterminated constructs run to the end of input.
pub(crate) fn skip_opaque(bytes: &[u8], i: usize, syntax: Syntax) -> Option<usize> {
    let len = bytes.len();
    let escapes = syntax.backslash_escapes;
    match bytes[i] {
        b'\'' => Some(skip_delimited(bytes, i, b'\'', escapes)),
        b'"' => Some(skip_delimited(bytes, i, b'"', escapes)),
        b'`' => Some(skip_delimited(bytes, i, b'`', false)),
        b'[' if syntax.bracket_identifiers => Some(skip_delimited(bytes, i, b']', false)),
        b'-' if i + 1 < len && bytes[i + 1] == b'-' => {
            let mut j = i + 2;
            while j < len && bytes[j] != b'\n' {
                j += 1;
            }
            Some(j)
        }
        b'/' if i + 1 < len && bytes[i + 1] == b'*' => {
            let mut j = i + 2;
            while j + 1 < len {
                if bytes[j] == b'*' && bytes[j + 1] == b'/' {
                    return Some(j + 2);
                }
                j += 1;
            }
            Some(len)
        }
        _ => None,
    }
}

/// Advances past a delimited section opened at `i`, honouring doubled
/// closing delimiters and, with `backslash`, `\x` as escapes.
fn skip_delimited(bytes: &[u8], i: usize, close: u8, backslash: bool) -> usize {
    let len = bytes.len();
    let mut j = i + 1;
    while j < len {
        if backslash && bytes[j] == b'\\' {
            j += 2;
            continue;
        }
        if bytes[j] == close {
            if j + 1 < len && bytes[j + 1] == close {
                j += 2;
                continue;
            }
            return j + 1;
        }
        j += 1;
    }
    len
}

/// Returns the first position at or after `start` where `matches` holds,
/// considering only positions at parenthesis depth zero and outside opaque
/// sections. A `)` with no matching `(` is treated as plain text.
pub(crate) fn find_top_level(
    bytes: &[u8],
    start: usize,
    syntax: Syntax,
    mut matches: impl FnMut(usize) -> bool,
) -> Option<usize> {
    let mut depth: usize = 0;
    let mut i = start;
    while i < bytes.len() {
        if let Some(next) = skip_opaque(bytes, i, syntax) {
            i = next;
            continue;
        }
        match bytes[i] {
            b'(' => depth += 1,
            b')' if depth > 0 => depth -= 1,
            _ if depth == 0 && matches(i) => return Some(i),
            _ => {}
        }
        i += 1;
    }
    None
}

/// Returns the index just past the parenthesised group opened at `i`.
pub(crate) fn skip_group(bytes: &[u8], i: usize, syntax: Syntax) -> Option<usize> {
    let mut depth: usize = 0;
    let mut j = i;
    while j < bytes.len() {
        if let Some(next) = skip_opaque(bytes, j, syntax) {
            j = next;
            continue;
        }
        match bytes[j] {
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(j + 1);
                }
            }
            _ => {}
        }
        j += 1;
    }
    None
}

/// Advances past ASCII whitespace.
pub(crate) fn skip_whitespace(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
        i += 1;
    }
    i
}
