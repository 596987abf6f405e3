//! Position resolver: which identifier is the cursor touching?
//!
//! This is a best-effort heuristic, not a grammar. It never checks that the
//! name is declared anywhere; callers look the result up in the symbol table.

use std::sync::LazyLock;

use regex::Regex;

use crate::parser::{assignment_name, split_lines};
use crate::types::{Position, to_usize};

/// Characters that make up a word under the cursor. Broader than variable
/// names so file-like targets (`src/main.o`) resolve as one token.
static WORD: LazyLock<Regex> = LazyLock::new(|| return compile(r"[a-zA-Z0-9_.\-/]+"));

/// Compile the word pattern.
///
/// # Panics
///
/// Panics if the pattern literal is invalid.
#[allow(clippy::expect_used, reason = "pattern is a string literal covered by tests")]
fn compile(pattern: &str) -> Regex {
    return Regex::new(pattern).expect("valid regex");
}

/// Resolve the symbol name at `position`.
///
/// Rules, first match wins:
///
/// 1. no word touches the cursor: `None`
/// 2. the cursor sits inside `$(...)`: the enclosed text
/// 3. the line has a `:`: the word under the cursor (target or dependency)
/// 4. the line is an assignment and the cursor is on or before the end of its
///    name: the assigned name
/// 5. otherwise the word under the cursor
pub fn find_symbol_at_position(text: &str, position: Position) -> Option<String> {
    let line = split_lines(text).nth(to_usize(position.line))?;
    let column = snap_to_char_boundary(line, to_usize(position.character));
    let word = word_at(line, column)?;

    if let Some(name) = variable_reference_at(line, column) {
        return Some(name.to_string());
    }

    if line.contains(':') {
        return Some(word.to_string());
    }

    if let Some(name) = assignment_name(line)
        && column <= name.end()
    {
        return Some(name.as_str().to_string());
    }

    return Some(word.to_string());
}

/// Clamp `column` to the line length and move it back onto a character boundary.
pub(crate) fn snap_to_char_boundary(line: &str, column: usize) -> usize {
    let mut column = column.min(line.len());
    while !line.is_char_boundary(column) {
        column = column.saturating_sub(1);
    }
    return column;
}

/// Text of the nearest `$(...)` enclosing `column`, if the cursor is between
/// the parentheses. The opening `$(` is the last one before the cursor and the
/// closing `)` is the first one after that opening.
fn variable_reference_at(line: &str, column: usize) -> Option<&str> {
    let before = line.get(..column)?;
    let after = line.get(column..)?;
    if !after.contains(')') {
        return None;
    }

    let open = before.rfind("$(")?;
    let content_start = open.saturating_add(2);
    let close = line
        .get(open..)?
        .find(')')
        .map(|offset| return open.saturating_add(offset))?;

    if column < content_start || column > close {
        return None;
    }

    return line.get(content_start..close).filter(|name| return !name.is_empty());
}

/// The word touching `column`, ends inclusive, so a cursor right after a word
/// still resolves to it.
fn word_at(line: &str, column: usize) -> Option<&str> {
    return WORD
        .find_iter(line)
        .find(|m| return m.start() <= column && column <= m.end())
        .map(|m| return m.as_str());
}
