//! Lint checks built on top of the symbol table and the reference scanner.
//!
//! Four checks run over a document:
//!
//! - `tab-required`: a recipe line under a rule is indented with spaces
//! - `undefined-variable`: `$(NAME)` where `NAME` is neither declared nor predefined
//! - `undefined-target`: a dependency that looks like a target name but is not declared
//! - `unused-variable`: a declared variable that is never referenced
//!
//! Line diagnostics come first in line order, unused variables last.

use std::path::Path;

use crate::parser::{
    VARIABLE_REFERENCE, assignment_name, is_blank_or_comment, parse_document, split_lines,
    whitespace_tokens,
};
use crate::references::find_references;
use crate::types::{Symbol, SymbolKind, TextRange};

/// Variables make defines on its own, plus the automatic variables.
const BUILTIN_VARIABLES: &[&str] = &[
    "CC", "CXX", "CPP", "FC", "PC", "CO", "GET", "LEX", "YACC", "CFLAGS", "CXXFLAGS",
    "CPPFLAGS", "FFLAGS", "PFLAGS", "LDFLAGS", "ARFLAGS", "YFLAGS", "LFLAGS", "MAKE", "SHELL",
    "MAKESHELL", "MAKEFLAGS", "MAKECMDGOALS", "@", "<", "^", "?", "*", "+", "|",
];

/// Which check produced a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Code {
    /// Recipe line indented with spaces.
    TabRequired,
    /// Dependency naming a target that is not declared.
    UndefinedTarget,
    /// Reference to a variable that is not declared.
    UndefinedVariable,
    /// Variable declared but never referenced.
    UnusedVariable,
}

impl Code {
    /// Kebab-case name of the check.
    pub const fn as_str(self) -> &'static str {
        return match self {
            Code::TabRequired => "tab-required",
            Code::UndefinedTarget => "undefined-target",
            Code::UndefinedVariable => "undefined-variable",
            Code::UnusedVariable => "unused-variable",
        };
    }
}

/// One finding.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Diagnostic {
    /// Check that produced it.
    pub code: Code,
    /// Human-readable description.
    pub message: String,
    /// Span the finding applies to.
    pub range: TextRange,
    /// How serious it is.
    pub severity: Severity,
}

/// Severity levels, most to least serious: error, warning, information, hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// The file will not work as written.
    Error,
    /// Informational hint, usually paired with an "unnecessary" marker.
    Hint,
    /// Worth knowing, often harmless.
    Information,
    /// Probably a mistake.
    Warning,
}

impl Severity {
    /// Lowercase name of the level.
    pub const fn as_str(self) -> &'static str {
        return match self {
            Severity::Error => "error",
            Severity::Hint => "hint",
            Severity::Information => "information",
            Severity::Warning => "warning",
        };
    }
}

/// Whether `name` is a variable make provides without a declaration.
fn is_predefined(name: &str, extra: &[String]) -> bool {
    return BUILTIN_VARIABLES.contains(&name) || extra.iter().any(|e| return e == name);
}

/// Run every check over `text`. `extra_predefined` adds names that count as
/// declared, such as variables passed on the make command line.
pub fn lint(file: &Path, text: &str, extra_predefined: &[String]) -> Vec<Diagnostic> {
    let symbols = parse_document(file, text);
    let variables: Vec<&Symbol> = symbols
        .iter()
        .filter(|s| return s.kind == SymbolKind::Variable)
        .collect();
    let targets: Vec<&str> = symbols
        .iter()
        .filter(|s| return s.kind == SymbolKind::Target)
        .map(|s| return s.name.as_str())
        .collect();

    let mut diagnostics = Vec::new();
    let mut previous: Option<&str> = None;
    for (line_number, line) in split_lines(text).enumerate() {
        if let Some(diagnostic) = tab_required(line_number, line, previous) {
            diagnostics.push(diagnostic);
        }
        undefined_variables(line_number, line, &variables, extra_predefined, &mut diagnostics);
        undefined_targets(line_number, line, &targets, &mut diagnostics);
        previous = Some(line);
    }

    for variable in variables {
        if find_references(file, text, &variable.name).is_empty() {
            diagnostics.push(Diagnostic {
                code: Code::UnusedVariable,
                message: format!("Variable '{}' is defined but never used", variable.name),
                range: variable.range,
                severity: Severity::Hint,
            });
        }
    }

    log::debug!("{}: {} diagnostics", file.display(), diagnostics.len());
    return diagnostics;
}

/// Dependency part of a rule line: the text after the first `:` (or `::`) up
/// to any inline `;` recipe. `None` for lines that are not plain rule lines.
fn rule_dependencies(line: &str) -> Option<(usize, &str)> {
    let trimmed = line.trim();
    if is_blank_or_comment(trimmed) || line.starts_with('\t') || assignment_name(trimmed).is_some() {
        return None;
    }

    // `all:: deps` is a double-colon rule; every leading colon belongs to the separator.
    let colon = line.find(':')?;
    let start = line
        .get(colon..)?
        .find(|c: char| return c != ':')
        .map_or(line.len(), |offset| return colon.saturating_add(offset));
    let rest = line.get(start..)?;
    let dependencies = rest.split_once(';').map_or(rest, |(deps, _)| return deps);

    // `target: VAR = value` is a target-specific assignment, not a dependency list.
    if dependencies.contains('=') {
        return None;
    }
    return Some((start, dependencies));
}

/// A space-indented line directly under a rule line.
fn tab_required(line_number: usize, line: &str, previous: Option<&str>) -> Option<Diagnostic> {
    if !line.starts_with(' ') || line.trim().is_empty() {
        return None;
    }
    let previous = previous?;
    if !previous.contains(':') || previous.trim().starts_with('#') {
        return None;
    }

    let indent = line.find(|c: char| return !c.is_whitespace()).unwrap_or(line.len());
    return Some(Diagnostic {
        code: Code::TabRequired,
        message: "Recipe lines must start with a tab character, not spaces".to_string(),
        range: TextRange::single_line(line_number, 0, indent),
        severity: Severity::Error,
    });
}

/// Dependencies that look like target names but are not declared.
/// Tokens containing `$`, `%`, `.` or `/` are variables, patterns or files.
fn undefined_targets(
    line_number: usize,
    line: &str,
    targets: &[&str],
    diagnostics: &mut Vec<Diagnostic>,
) {
    let Some((offset, dependencies)) = rule_dependencies(line) else {
        return;
    };

    for (position, token) in whitespace_tokens(dependencies) {
        let looks_like_target = token != "|" && !token.contains(['$', '%', '.', '/']);
        if !looks_like_target || targets.contains(&token) {
            continue;
        }
        let start = offset.saturating_add(position);
        diagnostics.push(Diagnostic {
            code: Code::UndefinedTarget,
            message: format!("Target '{token}' is not defined in this Makefile"),
            range: TextRange::single_line(line_number, start, start.saturating_add(token.len())),
            severity: Severity::Information,
        });
    }
    return;
}

/// `$(NAME)` references to names that are neither declared nor predefined.
fn undefined_variables(
    line_number: usize,
    line: &str,
    variables: &[&Symbol],
    extra_predefined: &[String],
    diagnostics: &mut Vec<Diagnostic>,
) {
    for capture in VARIABLE_REFERENCE.captures_iter(line) {
        let Some(name) = capture.get(1) else {
            continue;
        };
        let declared = variables.iter().any(|v| return v.name == name.as_str());
        if declared || is_predefined(name.as_str(), extra_predefined) {
            continue;
        }
        diagnostics.push(Diagnostic {
            code: Code::UndefinedVariable,
            message: format!("Undefined variable '{}'", name.as_str()),
            range: TextRange::single_line(line_number, name.start(), name.end()),
            severity: Severity::Warning,
        });
    }
    return;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(text: &str) -> Vec<Diagnostic> {
        return lint(Path::new("Makefile"), text, &[]);
    }

    fn codes(diagnostics: &[Diagnostic]) -> Vec<Code> {
        return diagnostics.iter().map(|d| d.code).collect();
    }

    #[test]
    fn clean_makefile_has_no_diagnostics() {
        let text = "CC = gcc\nOBJS = main.o\n\n.PHONY: all\nall: app\napp: $(OBJS)\n\t$(CC) -o $@ $(OBJS)\n";
        assert_eq!(run(text), vec![]);
    }

    #[test]
    fn spaces_under_a_rule() {
        let text = "all: main.o\n    echo \"This should be a tab!\"\n\techo \"This is correct\"\n\nmain.o:\n";
        let diagnostics = run(text);
        assert_eq!(codes(&diagnostics), vec![Code::TabRequired]);
        assert_eq!(diagnostics[0].range, TextRange::single_line(1, 0, 4));
        assert_eq!(diagnostics[0].severity, Severity::Error);
    }

    #[test]
    fn spaces_under_a_comment_are_fine() {
        assert_eq!(run("# all: x\n    indented\n"), vec![]);
    }

    #[test]
    fn undefined_variable_is_a_warning() {
        let diagnostics = run("all:\n\t$(CC) $(MISSING)\n");
        assert_eq!(codes(&diagnostics), vec![Code::UndefinedVariable]);
        assert_eq!(diagnostics[0].range, TextRange::single_line(1, 9, 16));
        assert_eq!(diagnostics[0].message, "Undefined variable 'MISSING'");
    }

    #[test]
    fn extra_predefined_names_count_as_declared() {
        let extra = vec!["PREFIX".to_string()];
        let diagnostics = lint(Path::new("Makefile"), "all:\n\tcp app $(PREFIX)/bin\n", &extra);
        assert_eq!(diagnostics, vec![]);
    }

    #[test]
    fn undefined_target_is_information() {
        let diagnostics = run("all: build main.o src/x $(OBJS) %.c | order\n");
        let targets: Vec<&Diagnostic> = diagnostics
            .iter()
            .filter(|d| d.code == Code::UndefinedTarget)
            .collect();
        assert_eq!(targets.len(), 2);
        assert_eq!(targets[0].range, TextRange::single_line(0, 5, 10));
        assert_eq!(targets[0].severity, Severity::Information);
        assert_eq!(targets[1].message, "Target 'order' is not defined in this Makefile");
    }

    #[test]
    fn phony_entries_must_be_declared() {
        let diagnostics = run(".PHONY: all clean\nall:\n");
        assert_eq!(codes(&diagnostics), vec![Code::UndefinedTarget]);
        assert_eq!(diagnostics[0].range, TextRange::single_line(0, 12, 17));
    }

    #[test]
    fn assignments_recipes_and_target_variables_are_not_rule_lines() {
        let text = "CC := gcc\nall: CFLAGS += -O2\nall:\n\techo a: b\n";
        assert_eq!(codes(&run(text)), vec![Code::UnusedVariable]);
    }

    #[test]
    fn double_colon_rules_check_only_real_dependencies() {
        assert_eq!(run("all:: app\napp:\n"), vec![]);

        let diagnostics = run("all:: dep\n");
        assert_eq!(codes(&diagnostics), vec![Code::UndefinedTarget]);
        assert_eq!(diagnostics[0].range, TextRange::single_line(0, 6, 9));
        assert_eq!(run("all::\n"), vec![]);
    }

    #[test]
    fn unused_variable_is_a_hint_reported_last() {
        let diagnostics = run("UNUSED = 1\nall: dep\n");
        assert_eq!(codes(&diagnostics), vec![Code::UndefinedTarget, Code::UnusedVariable]);
        assert_eq!(diagnostics[1].range, TextRange::single_line(0, 0, 6));
        assert_eq!(diagnostics[1].severity, Severity::Hint);
    }

    #[test]
    fn code_names() {
        assert_eq!(Code::TabRequired.as_str(), "tab-required");
        let json = serde_json::to_string(&Code::UndefinedVariable).unwrap();
        assert_eq!(json, "\"undefined-variable\"");
    }
}
