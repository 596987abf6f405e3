use std::fmt::Write as _;
use std::path::Path;

use crate::config::CONFIG_FILE;
use crate::error::Error;
use crate::types::Position;

/// ANSI bold, used for markdown headings on stderr.
const BOLD: &str = "\x1b[1m";
/// ANSI reset.
const RESET: &str = "\x1b[0m";

/// Pick the suggestion that matches `symbol` ignoring ASCII case.
pub fn find_closest_suggestion(symbol: &str, suggestions: &[String]) -> Option<String> {
    return suggestions
        .iter()
        .find(|s| return s.eq_ignore_ascii_case(symbol))
        .cloned();
}

/// Render an error as valid markdown with bold headings and print to stderr.
pub fn print_error(e: &Error) {
    let md = render_error(e);
    for line in md.lines() {
        if line.starts_with('#') {
            eprintln!("{BOLD}{line}{RESET}");
        } else {
            eprintln!("{line}");
        }
    }
    return;
}

/// Render an error as a structured markdown diagnostic.
///
/// Each variant produces a block with what happened and, where there is one,
/// how to fix it.
pub fn render_error(e: &Error) -> String {
    return match e {
        Error::FileNotFound { path } => format!(
            "\
# Error: File Not Found

`{}` does not exist or is not a text file.
",
            path.display()
        ),
        Error::Io(inner) => format!(
            "\
# Error: I/O

{inner}
"
        ),
        Error::Json(inner) => format!(
            "\
# Error: JSON Output

{inner}
"
        ),
        Error::NoSymbolAtPosition { file, position } => render_no_symbol(file, *position),
        Error::SymbolNotFound { file, suggestions, symbol } => {
            render_symbol_not_found(file, symbol, suggestions)
        },
        Error::TomlDe(inner) => format!(
            "\
# Error: Invalid TOML

{inner}

## Fix

Check `{CONFIG_FILE}` against the supported keys:
`include`, `exclude`, `exclude_dirs`, `predefined_variables`.
"
        ),
        Error::Watch { reason } => format!(
            "\
# Error: Watch Failed

{reason}
"
        ),
    };
}

/// Cursor is on whitespace, punctuation, or past the end of the file.
fn render_no_symbol(file: &Path, position: Position) -> String {
    return format!(
        "\
# Error: No Symbol At Position

Nothing at line {}, column {} of `{}` names a target or variable.

## Fix

Positions are zero-based. Point at a target name, a dependency, or the
inside of a `$(NAME)` reference:

    makeref symbols {}
",
        position.line,
        position.character,
        file.display(),
        file.display()
    );
}

/// Name resolved but never declared.
fn render_symbol_not_found(file: &Path, symbol: &str, suggestions: &[String]) -> String {
    let mut out = format!(
        "\
# Error: Symbol Not Found

`{symbol}` is not declared in `{}` or any other Makefile in the workspace.
",
        file.display()
    );

    if let Some(suggestion) = find_closest_suggestion(symbol, suggestions) {
        let _ = write!(out, "\n## Did you mean `{suggestion}`?\n");
    } else if !suggestions.is_empty() {
        out.push_str("\n## Declared in this file\n\n");
        for s in suggestions {
            let _ = writeln!(out, "- `{s}`");
        }
    }

    return out;
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn closest_suggestion_ignores_case() {
        let suggestions = vec!["CFLAGS".to_string(), "all".to_string()];
        assert_eq!(find_closest_suggestion("cflags", &suggestions), Some("CFLAGS".to_string()));
        assert_eq!(find_closest_suggestion("clean", &suggestions), None);
    }

    #[test]
    fn symbol_not_found_offers_a_match() {
        let e = Error::SymbolNotFound {
            file: PathBuf::from("Makefile"),
            suggestions: vec!["Clean".to_string()],
            symbol: "clean".to_string(),
        };
        let md = render_error(&e);
        assert!(md.starts_with("# Error: Symbol Not Found"));
        assert!(md.contains("## Did you mean `Clean`?"));
    }

    #[test]
    fn symbol_not_found_lists_declared_names() {
        let e = Error::SymbolNotFound {
            file: PathBuf::from("Makefile"),
            suggestions: vec!["all".to_string(), "CC".to_string()],
            symbol: "install".to_string(),
        };
        let md = render_error(&e);
        assert!(md.contains("## Declared in this file"));
        assert!(md.contains("- `CC`"));
    }

    #[test]
    fn no_symbol_points_at_the_symbols_command() {
        let e = Error::NoSymbolAtPosition {
            file: PathBuf::from("Makefile"),
            position: Position::new(2, 0),
        };
        let md = render_error(&e);
        assert!(md.contains("line 2, column 0"));
        assert!(md.contains("makeref symbols Makefile"));
    }
}
