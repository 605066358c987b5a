//! Text surgery on caller SELECT statements.
//!
//! Pagination needs two derived statements from one caller query: a COUNT
//! over the same rows and a windowed read. Both are produced by rewriting
//! the caller's text rather than parsing it. The supported subset is a
//! single SELECT with one top-level FROM and an optional ORDER BY; FROM and
//! ORDER BY inside parentheses, literals or comments are ignored. What
//! counts as a literal follows the dialect's [`Syntax`](crate::Syntax).

use crate::dialect::{Dialect, Syntax};
use crate::error::{Error, Result};
use crate::scan::{
    find_top_level, is_word_byte, keyword_at, skip_group, skip_opaque, skip_whitespace,
};

/// A SELECT statement cut around its projection list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountSplit<'a> {
    /// Everything before the projection, up to and including `SELECT`.
    pub prefix: &'a str,
    /// The projection list, untrimmed.
    pub projection: &'a str,
    /// Everything from the top-level `FROM` onward.
    pub suffix: &'a str,
}

/// Splits `sql` around its projection list.
///
/// # Errors
///
/// Returns [`Error::MalformedQuery`] if the statement does not start with
/// `SELECT`, has an empty projection or has no top-level `FROM`.
pub fn split_for_count<'a>(sql: &'a str, dialect: &dyn Dialect) -> Result<CountSplit<'a>> {
    let bytes = sql.as_bytes();
    let start = skip_whitespace(bytes, 0);
    if !keyword_at(bytes, start, b"SELECT") {
        return Err(Error::malformed("statement does not start with SELECT"));
    }
    let projection_start = start + "SELECT".len();
    if projection_start >= bytes.len() || !bytes[projection_start].is_ascii_whitespace() {
        return Err(Error::malformed("SELECT has no projection"));
    }

    let from = find_top_level(bytes, projection_start, dialect.syntax(), |i| {
        keyword_at(bytes, i, b"FROM") && !follows_comma(bytes, i)
    })
    .ok_or_else(|| Error::malformed("no top-level FROM"))?;

    let projection = &sql[projection_start..from];
    if projection.trim().is_empty() {
        return Err(Error::malformed("SELECT has no projection"));
    }

    Ok(CountSplit {
        prefix: &sql[..projection_start],
        projection,
        suffix: &sql[from..],
    })
}

/// Whether the text right before `i` is a comma followed by whitespace.
fn follows_comma(bytes: &[u8], i: usize) -> bool {
    let mut j = i;
    while j > 0 && bytes[j - 1].is_ascii_whitespace() {
        j -= 1;
    }
    j < i && j > 0 && bytes[j - 1] == b','
}

/// Rewrites a SELECT into the COUNT over the same rows.
///
/// The projection becomes `COUNT(*)`, or `COUNT(<projection>)` when it
/// starts with `DISTINCT` and whitespace, and a top-level ORDER BY is
/// removed.
///
/// # Errors
///
/// Returns [`Error::MalformedQuery`] for statements outside the supported
/// subset; see [`split_for_count`].
pub fn count_query(sql: &str, dialect: &dyn Dialect) -> Result<String> {
    let split = split_for_count(sql, dialect)?;
    let projection = split.projection.trim_start();
    let expr = if starts_with_distinct(projection.as_bytes()) {
        projection
    } else {
        "*"
    };
    let counted = format!(
        "{} COUNT({expr}) {}",
        split.prefix.trim_end(),
        split.suffix
    );
    Ok(strip_order_by(&counted, dialect))
}

fn starts_with_distinct(bytes: &[u8]) -> bool {
    const DISTINCT: &[u8] = b"DISTINCT";
    bytes.len() > DISTINCT.len()
        && bytes[..DISTINCT.len()].eq_ignore_ascii_case(DISTINCT)
        && bytes[DISTINCT.len()].is_ascii_whitespace()
}

/// Removes the first top-level `ORDER BY` clause.
///
/// The clause is a comma separated list of keys, each optionally followed by
/// `ASC` or `DESC`. A key is a run of identifier characters, dots, quoted
/// identifiers, parenthesised groups and `[...]` subscripts. Text that does not look like a key
/// list is left unchanged.
#[must_use]
pub fn strip_order_by(sql: &str, dialect: &dyn Dialect) -> String {
    let bytes = sql.as_bytes();
    let Some((start, end)) = find_order_by(bytes, dialect.syntax()) else {
        return String::from(sql.trim_end());
    };

    let head = sql[..start].trim_end();
    let tail = sql[end..].trim();
    if tail.is_empty() {
        String::from(head)
    } else {
        format!("{head} {tail}")
    }
}

fn find_order_by(bytes: &[u8], syntax: Syntax) -> Option<(usize, usize)> {
    let mut search = 0;
    loop {
        let start = find_top_level(bytes, search, syntax, |i| keyword_at(bytes, i, b"ORDER"))?;
        let by = skip_whitespace(bytes, start + "ORDER".len());
        if by > start + "ORDER".len() && keyword_at(bytes, by, b"BY") {
            if let Some(end) = order_keys_end(bytes, by + "BY".len(), syntax) {
                return Some((start, end));
            }
        }
        search = start + "ORDER".len();
    }
}

/// Returns the end of the key list starting at `i`, or `None` if there is
/// no key at all.
fn order_keys_end(bytes: &[u8], i: usize, syntax: Syntax) -> Option<usize> {
    let mut end = None;
    let mut pos = i;
    loop {
        let key_start = skip_whitespace(bytes, pos);
        let Some(key_end) = key_end(bytes, key_start, syntax) else {
            return end;
        };
        let mut clause_end = key_end;

        let after = skip_whitespace(bytes, key_end);
        if keyword_at(bytes, after, b"ASC") {
            clause_end = after + "ASC".len();
        } else if keyword_at(bytes, after, b"DESC") {
            clause_end = after + "DESC".len();
        }
        end = Some(clause_end);

        let next = skip_whitespace(bytes, clause_end);
        if next < bytes.len() && bytes[next] == b',' {
            pos = next + 1;
        } else {
            return end;
        }
    }
}

/// Returns the end of one ordering key, or `None` if none starts at `i`.
fn key_end(bytes: &[u8], i: usize, syntax: Syntax) -> Option<usize> {
    let mut j = i;
    while j < bytes.len() {
        let b = bytes[j];
        if is_word_byte(b) || b == b'.' {
            j += 1;
        } else if b == b'(' {
            j = skip_group(bytes, j, syntax)?;
        } else if matches!(b, b'"' | b'`') || (b == b'[' && syntax.bracket_identifiers) {
            j = skip_opaque(bytes, j, syntax)?;
        } else if b == b'[' {
            j = skip_subscript(bytes, j)?;
        } else {
            break;
        }
    }
    let is_keyword = keyword_at(bytes, i, b"ASC") || keyword_at(bytes, i, b"DESC");
    (j > i && !is_keyword).then_some(j)
}

/// Returns the index just past the `[...]` subscript opened at `i`.
fn skip_subscript(bytes: &[u8], i: usize) -> Option<usize> {
    let mut depth: usize = 0;
    for (j, &b) in bytes.iter().enumerate().skip(i) {
        match b {
            b'[' => depth += 1,
            b']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(j + 1);
                }
            }
            _ => {}
        }
    }
    None
}

/// Splits a batch into its statements at top-level semicolons.
///
/// Empty statements are dropped; each statement is trimmed.
#[must_use]
pub fn split_statements<'a>(sql: &'a str, dialect: &dyn Dialect) -> Vec<&'a str> {
    let bytes = sql.as_bytes();
    let syntax = dialect.syntax();
    let mut statements = Vec::new();
    let mut start = 0;
    while let Some(semi) = find_top_level(bytes, start, syntax, |i| bytes[i] == b';') {
        push_statement(&mut statements, &sql[start..semi]);
        start = semi + 1;
    }
    push_statement(&mut statements, &sql[start..]);
    statements
}

fn push_statement<'a>(statements: &mut Vec<&'a str>, piece: &'a str) {
    let piece = piece.trim();
    if !piece.is_empty() {
        statements.push(piece);
    }
}

/// Removes trailing whitespace and semicolons.
#[must_use]
pub fn trim_terminator(sql: &str) -> &str {
    sql.trim_end_matches(|c: char| c == ';' || c.is_whitespace())
}
