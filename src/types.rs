//! Core domain types for makeref symbols, positions, and locations.
use std::path::PathBuf;

/// A file path plus the span of text it points at.
/// Declarations and references are both reported as locations.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Location {
    /// Document the range belongs to.
    pub file: PathBuf,
    /// Span of the name token inside the document.
    pub range: TextRange,
}

/// Zero-based line and column. Columns are UTF-8 byte offsets into the line,
/// measured after a trailing `\r` has been stripped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct Position {
    /// Byte offset into the line.
    pub character: u32,
    /// Zero-based line index.
    pub line: u32,
}

impl Position {
    /// Build a position from a line index and a byte column.
    pub const fn new(line: u32, character: u32) -> Self {
        return Self { character, line };
    }
}

impl Ord for Position {
    /// Document order: line first, then column.
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        return (self.line, self.character).cmp(&(other.line, other.character));
    }
}

impl PartialOrd for Position {
    /// Delegate to `Ord` implementation.
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        return Some(self.cmp(other));
    }
}

/// A named declaration found while scanning a document.
/// `range` always covers exactly the characters of `name` on the declaring line.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Symbol {
    /// Whether this declares a target, a variable, or a function.
    pub kind: SymbolKind,
    /// Document identity plus the range of the name token.
    pub location: Location,
    /// Identifier text, never empty.
    pub name: String,
    /// Span of the name on its declaring line.
    pub range: TextRange,
}

/// Classification of a declared name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolKind {
    /// Reserved; the line scanner never produces it.
    Function,
    /// A rule target such as `all` or the pattern `%.o`.
    Target,
    /// A name assigned with `=`, `:=`, `+=` or `?=`.
    Variable,
}

impl SymbolKind {
    /// Capitalized name used in hover text.
    pub const fn label(self) -> &'static str {
        return match self {
            SymbolKind::Function => "Function",
            SymbolKind::Target => "Target",
            SymbolKind::Variable => "Variable",
        };
    }

    /// Classification used when presenting symbols as a document outline.
    /// Targets show up as functions and reserved functions as methods.
    pub const fn outline_kind(self) -> &'static str {
        return match self {
            SymbolKind::Function => "method",
            SymbolKind::Target => "function",
            SymbolKind::Variable => "variable",
        };
    }
}

/// Start and end positions of a span. Both ends are on the same line for
/// everything the scanners produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct TextRange {
    /// One past the last byte of the span.
    pub end: Position,
    /// First byte of the span.
    pub start: Position,
}

impl TextRange {
    /// Whether `position` lies inside the range, both ends inclusive.
    pub fn contains(&self, position: Position) -> bool {
        return self.start <= position && position <= self.end;
    }

    /// Range covering `start..end` byte columns of a single line.
    /// Offsets that do not fit in `u32` saturate.
    pub fn single_line(line: usize, start: usize, end: usize) -> Self {
        let line = to_u32(line);
        return Self {
            end: Position::new(line, to_u32(end)),
            start: Position::new(line, to_u32(start)),
        };
    }
}

/// Saturating `usize` to `u32` conversion for line and column offsets.
pub fn to_u32(value: usize) -> u32 {
    return u32::try_from(value).unwrap_or(u32::MAX);
}

/// Saturating `u32` to `usize` conversion for slicing lines.
pub fn to_usize(value: u32) -> usize {
    return usize::try_from(value).unwrap_or(usize::MAX);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_contains_both_ends() {
        let range = TextRange::single_line(2, 4, 8);
        assert!(range.contains(Position::new(2, 4)));
        assert!(range.contains(Position::new(2, 8)));
        assert!(!range.contains(Position::new(2, 9)));
        assert!(!range.contains(Position::new(1, 5)));
    }

    #[test]
    fn outline_kinds() {
        assert_eq!(SymbolKind::Target.outline_kind(), "function");
        assert_eq!(SymbolKind::Variable.outline_kind(), "variable");
        assert_eq!(SymbolKind::Function.outline_kind(), "method");
    }

    #[test]
    fn kind_serializes_lowercase() {
        let json = serde_json::to_string(&SymbolKind::Target).unwrap();
        assert_eq!(json, "\"target\"");
    }
}
