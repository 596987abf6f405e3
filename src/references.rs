//! Reference scanner: every usage of a name inside one document.
//!
//! Three kinds of usage are recognized on each line, reported in this order:
//!
//! - `$(NAME)` variable references
//! - whole-word dependency tokens after the first `:` of a non-assignment line
//! - entries of a `.PHONY` list
//!
//! Declarations are not usages. Assignment lines are never scanned for
//! dependencies, so `CC = gcc` does not count as a reference to `CC`.

use std::path::Path;

use regex::Regex;

use crate::parser::{PHONY, assignment_name, parse_document, split_lines, whitespace_tokens};
use crate::types::{Location, Symbol, TextRange};

/// Patterns built once per scan from the escaped name.
struct NamePatterns {
    /// `\bNAME\b` for dependency lists.
    dependency: Regex,
    /// `\$\(NAME\)` for variable references.
    variable: Regex,
}

impl NamePatterns {
    /// Escape `name` and compile both search patterns.
    /// Returns `None` only if the compiled pattern would exceed the regex size limit.
    fn new(name: &str) -> Option<Self> {
        let escaped = regex::escape(name);
        let dependency = Regex::new(&format!(r"\b{escaped}\b")).ok()?;
        let variable = Regex::new(&format!(r"\$\({escaped}\)")).ok()?;
        return Some(Self { dependency, variable });
    }
}

/// Dependency tokens after the first `:` on a line.
fn collect_dependency_references(
    file: &Path,
    line_number: usize,
    line: &str,
    patterns: &NamePatterns,
    references: &mut Vec<Location>,
) {
    let Some(colon) = line.find(':') else {
        return;
    };
    let offset = colon.saturating_add(1);
    let Some(dependencies) = line.get(offset..) else {
        return;
    };

    for m in patterns.dependency.find_iter(dependencies) {
        let start = offset.saturating_add(m.start());
        references.push(location(file, line_number, start, m.len()));
    }
    return;
}

/// Entries of a `.PHONY` list equal to `name`, each at its own column.
/// Returns `false` when the line is not a `.PHONY` declaration.
fn collect_phony_references(
    file: &Path,
    line_number: usize,
    line: &str,
    name: &str,
    references: &mut Vec<Location>,
) -> bool {
    let trimmed = line.trim();
    let Some(list) = PHONY.captures(trimmed).and_then(|c| return c.get(1)) else {
        return false;
    };

    let indent = line.len().saturating_sub(line.trim_start().len());
    let list_start = indent.saturating_add(list.start());
    for (offset, token) in whitespace_tokens(list.as_str()) {
        if token == name {
            let start = list_start.saturating_add(offset);
            references.push(location(file, line_number, start, name.len()));
        }
    }
    return true;
}

/// `$(NAME)` occurrences. The reported range skips the `$(`.
fn collect_variable_references(
    file: &Path,
    line_number: usize,
    line: &str,
    name: &str,
    patterns: &NamePatterns,
    references: &mut Vec<Location>,
) {
    for m in patterns.variable.find_iter(line) {
        let start = m.start().saturating_add(2);
        references.push(location(file, line_number, start, name.len()));
    }
    return;
}

/// First declaration of `name` in a symbol table.
pub fn find_declaration<'a>(symbols: &'a [Symbol], name: &str) -> Option<&'a Symbol> {
    return symbols.iter().find(|s| return s.name == name);
}

/// Every usage of `name` in `text`, in line order.
///
/// The name is matched literally; regex metacharacters are escaped. A line
/// may contribute matches under more than one rule (a `$(OBJS)` in a
/// dependency list is both a variable reference and a dependency token) and
/// all of them are kept. A `.PHONY` line is only scanned as a `.PHONY` list.
pub fn find_references(file: &Path, text: &str, name: &str) -> Vec<Location> {
    let mut references = Vec::new();
    if name.is_empty() {
        return references;
    }
    let Some(patterns) = NamePatterns::new(name) else {
        log::debug!("name too large to search for: {} bytes", name.len());
        return references;
    };

    for (line_number, line) in split_lines(text).enumerate() {
        collect_variable_references(file, line_number, line, name, &patterns, &mut references);

        if assignment_name(line.trim()).is_some() {
            continue;
        }
        if collect_phony_references(file, line_number, line, name, &mut references) {
            continue;
        }
        collect_dependency_references(file, line_number, line, &patterns, &mut references);
    }

    return references;
}

/// Build a single-line location of `len` bytes starting at `start`.
fn location(file: &Path, line_number: usize, start: usize, len: usize) -> Location {
    return Location {
        file: file.to_path_buf(),
        range: TextRange::single_line(line_number, start, start.saturating_add(len)),
    };
}

/// Usages of `name`, preceded by its declaration when `include_declaration`
/// is set and the document declares it. The declaration is listed once even
/// if a scan rule also reports it.
pub fn references_with_declaration(
    file: &Path,
    text: &str,
    name: &str,
    include_declaration: bool,
) -> Vec<Location> {
    let declaration = if include_declaration {
        let symbols = parse_document(file, text);
        find_declaration(&symbols, name).map(|d| return d.location.clone())
    } else {
        None
    };

    let mut locations: Vec<Location> = declaration.iter().cloned().collect();
    for reference in find_references(file, text, name) {
        if declaration.as_ref() != Some(&reference) {
            locations.push(reference);
        }
    }
    return locations;
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROGRAM: &str = "CC = gcc\nCFLAGS = -Wall\n\nall: main.o\n\t$(CC) $(CFLAGS) -o myapp main.o\n\t$(CC) -c main.c";

    fn refs(text: &str, name: &str) -> Vec<Location> {
        return find_references(Path::new("Makefile"), text, name);
    }

    fn lines_of(locations: &[Location]) -> Vec<u32> {
        return locations.iter().map(|l| l.range.start.line).collect();
    }

    fn range_text<'a>(text: &'a str, range: &TextRange) -> &'a str {
        let line = split_lines(text).nth(range.start.line as usize).unwrap();
        return &line[range.start.character as usize..range.end.character as usize];
    }

    #[test]
    fn variable_usages_only() {
        let found = refs(PROGRAM, "CC");
        assert_eq!(found.len(), 2);
        assert_eq!(lines_of(&found), vec![4, 5]);
        assert_eq!(found[0].range, TextRange::single_line(4, 3, 5));
        assert_eq!(found[1].range, TextRange::single_line(5, 3, 5));
    }

    #[test]
    fn phony_list_contributes_one_reference() {
        let found = refs(".PHONY: all clean", "all");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].range, TextRange::single_line(0, 8, 11));
    }

    #[test]
    fn phony_entry_reported_at_its_own_column() {
        let text = ".PHONY: clean all";
        let found = refs(text, "all");
        assert_eq!(found.len(), 1);
        assert_eq!(range_text(text, &found[0].range), "all");
        assert_eq!(found[0].range.start.character, 14);
    }

    #[test]
    fn target_usages() {
        let text = "all: main.o utils.o clean\n\techo \"Building all\"\n\nclean:\n\trm -f *.o\n\n.PHONY: all clean\n\ntest: all\n\t./myapp\n";
        let found = refs(text, "all");
        assert_eq!(lines_of(&found), vec![6, 8]);

        let found = refs(text, "clean");
        assert_eq!(lines_of(&found), vec![0, 6]);
    }

    #[test]
    fn dependency_match_is_whole_word_and_literal() {
        let text = "app: mainxo main.o main.obj";
        let found = refs(text, "main.o");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].range.start.character, 12);
    }

    #[test]
    fn assignment_lines_are_not_dependency_lines() {
        let text = "CC := gcc\nCFLAGS = $(CC)";
        let found = refs(text, "CC");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].range, TextRange::single_line(1, 11, 13));
    }

    #[test]
    fn variable_in_dependency_list_matches_twice() {
        let found = refs("app: $(OBJS)", "OBJS");
        assert_eq!(found.len(), 2);
        assert_eq!(found[0], found[1]);
    }

    #[test]
    fn every_reference_round_trips_to_the_name() {
        let text = "OBJS = a.o b.o\n.PHONY: all\nall: app\napp: $(OBJS) all\n\t$(CC) -o app $(OBJS)\n";
        for name in ["OBJS", "all", "app", "CC"] {
            for reference in refs(text, name) {
                assert_eq!(range_text(text, &reference.range), name);
            }
        }
    }

    #[test]
    fn empty_name_matches_nothing() {
        assert!(refs(PROGRAM, "").is_empty());
    }

    #[test]
    fn declaration_lookup() {
        let symbols = parse_document(Path::new("Makefile"), PROGRAM);
        let declaration = find_declaration(&symbols, "CFLAGS").unwrap();
        assert_eq!(declaration.range.start.line, 1);
        assert!(find_declaration(&symbols, "LDFLAGS").is_none());
    }

    #[test]
    fn with_and_without_declaration() {
        let file = Path::new("Makefile");
        let with = references_with_declaration(file, PROGRAM, "CC", true);
        assert_eq!(lines_of(&with), vec![0, 4, 5]);

        let without = references_with_declaration(file, PROGRAM, "CC", false);
        assert_eq!(lines_of(&without), vec![4, 5]);
    }

    #[test]
    fn declaration_precedes_usages() {
        let file = Path::new("Makefile");
        let text = "all: all";
        let with = references_with_declaration(file, text, "all", true);
        assert_eq!(with.len(), 2);
        assert_eq!(with[0].range.start.character, 0);
        assert_eq!(with[1].range.start.character, 5);
    }
}
