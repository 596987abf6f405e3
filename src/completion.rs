//! Context-aware completion for Makefiles.
//!
//! The text before the cursor picks one of three contexts:
//!
//! - **Variable reference**: right after `$(` or inside a partial `$(NAME`,
//!   offers declared variables followed by the common predefined ones.
//! - **Dependency list**: after a `:` with at least one character typed past it,
//!   offers every declared target. Pattern rules sort last.
//! - **Anywhere else**: special targets such as `.PHONY` and the built-in
//!   text functions.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::parser::{parse_document, split_lines};
use crate::resolver::snap_to_char_boundary;
use crate::types::{Position, SymbolKind, to_usize};

/// Built-in functions as (name, description, syntax).
const FUNCTIONS: &[(&str, &str, &str)] = &[
    ("wildcard", "Find files matching pattern", "$(wildcard pattern)"),
    ("patsubst", "Pattern substitution", "$(patsubst pattern,replacement,text)"),
    ("subst", "Text substitution", "$(subst from,to,text)"),
    ("filter", "Filter words matching patterns", "$(filter pattern,text)"),
    ("filter-out", "Filter out words matching patterns", "$(filter-out pattern,text)"),
    ("sort", "Sort words", "$(sort list)"),
    ("dir", "Directory part of filenames", "$(dir names)"),
    ("notdir", "Non-directory part of filenames", "$(notdir names)"),
    ("basename", "Remove suffix from filenames", "$(basename names)"),
    ("addsuffix", "Add suffix to words", "$(addsuffix suffix,names)"),
    ("addprefix", "Add prefix to words", "$(addprefix prefix,names)"),
];

/// Predefined variables offered inside `$(`, as (name, description).
const PREDEFINED_VARIABLES: &[(&str, &str)] = &[
    ("CC", "C compiler command"),
    ("CXX", "C++ compiler command"),
    ("CFLAGS", "C compiler flags"),
    ("CXXFLAGS", "C++ compiler flags"),
    ("LDFLAGS", "Linker flags"),
    ("MAKE", "Make command"),
    ("SHELL", "Shell to use"),
    ("@", "Target name"),
    ("<", "First prerequisite"),
    ("^", "All prerequisites"),
    ("?", "Prerequisites newer than target"),
];

/// Special built-in target names, as (name, description).
const SPECIAL_TARGETS: &[(&str, &str)] = &[
    (".PHONY", "Declare phony targets"),
    (".DEFAULT", "Default target for unmatched files"),
    (".PRECIOUS", "Preserve intermediate files"),
    (".INTERMEDIATE", "Mark targets as intermediate"),
    (".SECONDARY", "Mark targets as secondary"),
    (".DELETE_ON_ERROR", "Delete targets on command failure"),
    (".IGNORE", "Ignore errors in commands"),
    (".SILENT", "Silent execution of commands"),
    (".EXPORT_ALL_VARIABLES", "Export all variables to sub-makes"),
];

/// An unfinished `$(NAME` at the end of the text before the cursor.
static PARTIAL_REFERENCE: LazyLock<Regex> = LazyLock::new(|| return compile(r"\$\([a-zA-Z_]*$"));

/// Where the cursor is, as far as completion cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CompletionContext {
    /// After the colon of a rule line.
    Dependency,
    /// Nowhere in particular.
    General,
    /// Inside `$(`.
    VariableReference,
}

/// A completion suggestion, independent of any editor protocol.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct CompletionItem {
    /// Short description shown next to the label.
    pub detail: Option<String>,
    /// Longer help, such as a function's call syntax.
    pub documentation: Option<String>,
    /// Text to insert when it differs from the label.
    pub insert_text: Option<String>,
    /// Semantic category.
    pub kind: CompletionKind,
    /// Text shown in the completion list.
    pub label: String,
    /// Key used for ordering when it differs from the label.
    pub sort_text: Option<String>,
}

impl CompletionItem {
    /// Item with only a label and a kind.
    fn new(label: impl Into<String>, kind: CompletionKind) -> Self {
        return Self {
            detail: None,
            documentation: None,
            insert_text: None,
            kind,
            label: label.into(),
            sort_text: None,
        };
    }

    /// Set the detail text.
    fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        return self;
    }

    /// Set the documentation text.
    fn with_documentation(mut self, documentation: impl Into<String>) -> Self {
        self.documentation = Some(documentation.into());
        return self;
    }

    /// Set the insert text.
    fn with_insert_text(mut self, text: impl Into<String>) -> Self {
        self.insert_text = Some(text.into());
        return self;
    }

    /// Set the sort key.
    fn with_sort_text(mut self, text: impl Into<String>) -> Self {
        self.sort_text = Some(text.into());
        return self;
    }
}

/// Semantic category of a completion item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CompletionKind {
    /// Built-in function or a target.
    Function,
    /// Special target directive.
    Keyword,
    /// Variable name.
    Variable,
}

/// Classify the text before the cursor.
fn classify(before_cursor: &str) -> CompletionContext {
    if before_cursor.ends_with("$(") || PARTIAL_REFERENCE.is_match(before_cursor) {
        return CompletionContext::VariableReference;
    }

    let typed_past_colon = before_cursor
        .find(':')
        .is_some_and(|colon| return colon.saturating_add(1) < before_cursor.len());
    if typed_past_colon {
        return CompletionContext::Dependency;
    }

    return CompletionContext::General;
}

/// Completion candidates for `position` in `text`.
pub fn complete(file: &Path, text: &str, position: Position) -> Vec<CompletionItem> {
    let line = split_lines(text).nth(to_usize(position.line)).unwrap_or("");
    let column = snap_to_char_boundary(line, to_usize(position.character));
    let before_cursor = line.get(..column).unwrap_or("");

    return match classify(before_cursor) {
        CompletionContext::Dependency => target_completions(file, text),
        CompletionContext::General => general_completions(),
        CompletionContext::VariableReference => variable_completions(file, text),
    };
}

/// Compile the partial-reference pattern.
///
/// # Panics
///
/// Panics if the pattern literal is invalid.
#[allow(clippy::expect_used, reason = "pattern is a string literal covered by tests")]
fn compile(pattern: &str) -> Regex {
    return Regex::new(pattern).expect("valid regex");
}

/// Special targets followed by built-in functions.
fn general_completions() -> Vec<CompletionItem> {
    let directives = SPECIAL_TARGETS.iter().map(|(name, description)| {
        return CompletionItem::new(*name, CompletionKind::Keyword)
            .with_detail(*description)
            .with_insert_text(format!("{name}: "));
    });

    let functions = FUNCTIONS.iter().map(|(name, description, syntax)| {
        return CompletionItem::new(*name, CompletionKind::Function)
            .with_detail(*description)
            .with_documentation(*syntax)
            .with_insert_text(*name);
    });

    return directives.chain(functions).collect();
}

/// Every declared target. Pattern rules are flagged and sorted to the bottom.
fn target_completions(file: &Path, text: &str) -> Vec<CompletionItem> {
    return parse_document(file, text)
        .into_iter()
        .filter(|symbol| return symbol.kind == SymbolKind::Target)
        .map(|symbol| {
            let item = CompletionItem::new(symbol.name.clone(), CompletionKind::Function);
            if symbol.name.contains('%') {
                return item
                    .with_detail("Pattern rule (may not be suitable as dependency)")
                    .with_sort_text(format!("z{}", symbol.name));
            }
            return item.with_detail("Makefile target");
        })
        .collect();
}

/// Declared variables, then the predefined table. Insert text closes the `)`.
fn variable_completions(file: &Path, text: &str) -> Vec<CompletionItem> {
    let declared = parse_document(file, text)
        .into_iter()
        .filter(|symbol| return symbol.kind == SymbolKind::Variable)
        .map(|symbol| {
            let insert = format!("{})", symbol.name);
            return CompletionItem::new(symbol.name, CompletionKind::Variable)
                .with_detail("User-defined variable")
                .with_insert_text(insert);
        });

    let predefined = PREDEFINED_VARIABLES.iter().map(|(name, description)| {
        return CompletionItem::new(*name, CompletionKind::Variable)
            .with_detail(*description)
            .with_insert_text(format!("{name})"));
    });

    return declared.chain(predefined).collect();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(items: &[CompletionItem]) -> Vec<&str> {
        return items.iter().map(|i| i.label.as_str()).collect();
    }

    fn complete_at(text: &str, line: u32, character: u32) -> Vec<CompletionItem> {
        return complete(Path::new("Makefile"), text, Position::new(line, character));
    }

    #[test]
    fn variables_inside_partial_reference() {
        let text = "CC = gcc\nCFLAGS = -Wall\nLDFLAGS = -lm\n\ntest:\n\t$(C";
        let items = complete_at(text, 5, 4);
        let labels = labels(&items);
        assert_eq!(&labels[..3], &["CC", "CFLAGS", "LDFLAGS"]);
        assert!(labels.contains(&"@"));
        assert_eq!(items[0].insert_text.as_deref(), Some("CC)"));
        assert_eq!(items[0].detail.as_deref(), Some("User-defined variable"));
        assert!(items.iter().all(|i| i.kind == CompletionKind::Variable));
    }

    #[test]
    fn variables_right_after_open_paren() {
        let items = complete_at("all:\n\t$(", 1, 3);
        assert_eq!(items.len(), PREDEFINED_VARIABLES.len());
    }

    #[test]
    fn targets_in_dependency_list() {
        let text = "all: main.o\nmain.o: main.c\n%.o: %.c\n\nclean:\n\trm -f *.o\n\ntest: m";
        let items = complete_at(text, 7, 7);
        assert_eq!(labels(&items), vec!["all", "main.o", "%.o", "clean", "test"]);

        let pattern = items.iter().find(|i| i.label == "%.o").unwrap();
        assert_eq!(pattern.sort_text.as_deref(), Some("z%.o"));
        let plain = items.iter().find(|i| i.label == "all").unwrap();
        assert_eq!(plain.detail.as_deref(), Some("Makefile target"));
        assert_eq!(plain.sort_text, None);
    }

    #[test]
    fn colon_as_last_character_is_general() {
        let items = complete_at("all:", 0, 4);
        assert_eq!(items.len(), SPECIAL_TARGETS.len() + FUNCTIONS.len());
    }

    #[test]
    fn general_completions_list_directives_then_functions() {
        let items = complete_at("", 0, 0);
        assert_eq!(items[0].label, ".PHONY");
        assert_eq!(items[0].insert_text.as_deref(), Some(".PHONY: "));
        assert_eq!(items[0].kind, CompletionKind::Keyword);

        let wildcard = items.iter().find(|i| i.label == "wildcard").unwrap();
        assert_eq!(wildcard.kind, CompletionKind::Function);
        assert_eq!(wildcard.documentation.as_deref(), Some("$(wildcard pattern)"));
    }
}
