//! Line classifier: turns Makefile text into target and variable declarations.
//!
//! Each physical line is checked against an ordered list of rules:
//!
//! 1. blank lines and `#` comments are skipped
//! 2. `.PHONY` lists are skipped (they reference targets, they do not declare them)
//! 3. a target or pattern-rule match emits a `Target`
//! 4. a variable-assignment match emits a `Variable`
//!
//! Rules 3 and 4 are independent, so a line such as `CC := gcc` yields both a
//! target and a variable. The scanner is line-oriented and does not try to be a
//! Make grammar.

use std::path::Path;
use std::sync::LazyLock;

use regex::{Match, Regex};

use crate::types::{Location, Symbol, SymbolKind, TextRange};

/// A run of non-whitespace characters inside a list.
static TOKEN: LazyLock<Regex> = LazyLock::new(|| return compile(r"\S+"));

/// `.PHONY: a b c`, matched against a trimmed line. Group 1 is the name list.
pub(crate) static PHONY: LazyLock<Regex> =
    LazyLock::new(|| return compile(r"^\.PHONY\s*:\s*(.+)$"));

/// Target declaration, including `%` pattern rules. Group 1 is the target name.
static TARGET: LazyLock<Regex> =
    LazyLock::new(|| return compile(r"^([a-zA-Z0-9_.\-/%]+)\s*:\s*"));

/// `NAME =`, `NAME :=`, `NAME +=` or `NAME ?=`. Group 1 is the variable name.
static VARIABLE_ASSIGNMENT: LazyLock<Regex> =
    LazyLock::new(|| return compile(r"^([a-zA-Z_][a-zA-Z0-9_]*)\s*[:+?]?="));

/// `$(NAME)` with an identifier inside. Group 1 is the name.
pub(crate) static VARIABLE_REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| return compile(r"\$\(([a-zA-Z_][a-zA-Z0-9_]*)\)"));

/// Name captured by the variable-assignment rule, if the line is an assignment.
pub(crate) fn assignment_name(line: &str) -> Option<Match<'_>> {
    return VARIABLE_ASSIGNMENT.captures(line).and_then(|c| return c.get(1));
}

/// Compile one of the hardcoded patterns above.
///
/// # Panics
///
/// Panics if a pattern literal is invalid; the unit tests exercise every one.
#[allow(clippy::expect_used, reason = "patterns are string literals covered by tests")]
fn compile(pattern: &str) -> Regex {
    return Regex::new(pattern).expect("valid regex");
}

/// Build a symbol for a name match on `line`.
/// The patterns are anchored at column 0, so the match start is also the
/// first occurrence of the name on the line.
fn declare(file: &Path, line_number: usize, name: Match<'_>, kind: SymbolKind) -> Symbol {
    let range = TextRange::single_line(line_number, name.start(), name.end());
    return Symbol {
        kind,
        location: Location {
            file: file.to_path_buf(),
            range,
        },
        name: name.as_str().to_string(),
        range,
    };
}

/// Whether a trimmed line is blank or a comment.
pub(crate) fn is_blank_or_comment(trimmed: &str) -> bool {
    return trimmed.is_empty() || trimmed.starts_with('#');
}

/// Scan `text` top to bottom and return every declaration in line order.
/// Never fails: lines that match no rule simply contribute nothing.
pub fn parse_document(file: &Path, text: &str) -> Vec<Symbol> {
    let mut symbols = Vec::new();

    for (line_number, line) in split_lines(text).enumerate() {
        let trimmed = line.trim();
        if is_blank_or_comment(trimmed) || PHONY.is_match(trimmed) {
            continue;
        }

        if let Some(name) = target_name(line) {
            symbols.push(declare(file, line_number, name, SymbolKind::Target));
        }

        if let Some(name) = assignment_name(line) {
            symbols.push(declare(file, line_number, name, SymbolKind::Variable));
        }
    }

    return symbols;
}

/// Split text into physical lines on `\n`, dropping a trailing `\r` from each.
/// Empty text is a single empty line, matching how editors number lines.
pub fn split_lines(text: &str) -> impl Iterator<Item = &str> {
    return text
        .split('\n')
        .map(|line| return line.strip_suffix('\r').unwrap_or(line));
}

/// Name captured by the target rule, if the line declares a target.
pub(crate) fn target_name(line: &str) -> Option<Match<'_>> {
    return TARGET.captures(line).and_then(|c| return c.get(1));
}

/// Whitespace-separated tokens of `list` with their byte offsets into it.
pub(crate) fn whitespace_tokens(list: &str) -> impl Iterator<Item = (usize, &str)> {
    return TOKEN.find_iter(list).map(|m| return (m.start(), m.as_str()));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Vec<Symbol> {
        return parse_document(Path::new("Makefile"), text);
    }

    fn range_text<'a>(text: &'a str, range: &TextRange) -> &'a str {
        let line = split_lines(text).nth(range.start.line as usize).unwrap();
        return &line[range.start.character as usize..range.end.character as usize];
    }

    #[test]
    fn blank_and_comment_only_text_has_no_symbols() {
        assert!(parse("").is_empty());
        assert!(parse("\n\n   \n# comment\n\t# indented comment\n").is_empty());
    }

    #[test]
    fn simple_variable() {
        let symbols = parse("CC = gcc");
        assert_eq!(symbols.len(), 1);
        assert_eq!(symbols[0].name, "CC");
        assert_eq!(symbols[0].kind, SymbolKind::Variable);
        assert_eq!(symbols[0].range, TextRange::single_line(0, 0, 2));
    }

    #[test]
    fn digit_leading_name_is_not_a_variable() {
        assert!(parse("123INVALID = value").is_empty());
    }

    #[test]
    fn every_assignment_operator() {
        let symbols = parse("A = 1\nB := 2\nC += 3\nD ?= 4\nE=5");
        let variables: Vec<&str> = symbols
            .iter()
            .filter(|s| s.kind == SymbolKind::Variable)
            .map(|s| s.name.as_str())
            .collect();
        assert_eq!(variables, vec!["A", "B", "C", "D", "E"]);
    }

    #[test]
    fn target_declares_only_its_name() {
        let symbols = parse("all: main.o");
        assert_eq!(symbols.len(), 1);
        assert_eq!(symbols[0].name, "all");
        assert_eq!(symbols[0].kind, SymbolKind::Target);
    }

    #[test]
    fn phony_line_declares_nothing() {
        assert!(parse(".PHONY: all clean").is_empty());
        assert!(parse("  .PHONY : all").is_empty());
    }

    #[test]
    fn pattern_rule_is_a_target() {
        let symbols = parse("%.o: %.c");
        assert_eq!(symbols.len(), 1);
        assert_eq!(symbols[0].name, "%.o");
        assert_eq!(symbols[0].kind, SymbolKind::Target);
    }

    #[test]
    fn colon_equals_emits_target_and_variable() {
        let symbols = parse("CC := gcc");
        let kinds: Vec<SymbolKind> = symbols.iter().map(|s| s.kind).collect();
        assert_eq!(kinds, vec![SymbolKind::Target, SymbolKind::Variable]);
        assert!(symbols.iter().all(|s| s.name == "CC"));
    }

    #[test]
    fn indented_lines_are_not_declarations() {
        assert!(parse("\tCC = gcc\n  all: x").is_empty());
    }

    #[test]
    fn ranges_cover_exactly_the_name() {
        let text = "CC = gcc\nCFLAGS += -Wall\n\nall: main.o\nsrc/main.o : src/main.c\n%.o: %.c\r\nLD?=ld";
        let symbols = parse(text);
        assert_eq!(symbols.len(), 6);
        for symbol in &symbols {
            assert_eq!(range_text(text, &symbol.range), symbol.name);
            assert_eq!(symbol.location.range, symbol.range);
        }
    }

    #[test]
    fn declarations_keep_line_order() {
        let symbols = parse("all: app\nCC = gcc\napp: main.o\nLD = ld");
        let names: Vec<&str> = symbols.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["all", "CC", "app", "LD"]);
        assert_eq!(symbols[2].range.start.line, 2);
    }

    #[test]
    fn parsing_is_idempotent() {
        let text = "CC = gcc\nall: main.o\n%.o: %.c\n";
        assert_eq!(parse(text), parse(text));
    }

    #[test]
    fn crlf_lines_are_stripped() {
        let lines: Vec<&str> = split_lines("a\r\nb\n").collect();
        assert_eq!(lines, vec!["a", "b", ""]);
    }

    #[test]
    fn tokens_carry_offsets() {
        let tokens: Vec<(usize, &str)> = whitespace_tokens(" all  clean\tdist").collect();
        assert_eq!(tokens, vec![(1, "all"), (6, "clean"), (12, "dist")]);
    }

    #[test]
    fn variable_reference_pattern() {
        let names: Vec<&str> = VARIABLE_REFERENCE
            .captures_iter("$(CC) $(CFLAGS) $(1BAD) $@")
            .map(|c| c.get(1).unwrap().as_str())
            .collect();
        assert_eq!(names, vec!["CC", "CFLAGS"]);
    }
}
