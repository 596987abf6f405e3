//! Hover text for the declaration under the cursor.

use std::fmt::Write as _;
use std::path::Path;

use crate::parser::{parse_document, split_lines};
use crate::references::{find_declaration, find_references};
use crate::resolver::find_symbol_at_position;
use crate::types::{Position, Symbol, SymbolKind, TextRange, to_usize};

/// Markdown hover contents plus the declaration range they describe.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct HoverResult {
    /// Markdown body.
    pub contents: String,
    /// Range of the declared name.
    pub range: TextRange,
}

/// Describe the symbol under `position`. `None` when nothing resolves or the
/// resolved name is not declared in this document.
pub fn hover(file: &Path, text: &str, position: Position) -> Option<HoverResult> {
    let name = find_symbol_at_position(text, position)?;
    let symbols = parse_document(file, text);
    let symbol = find_declaration(&symbols, &name)?;
    let line = split_lines(text)
        .nth(to_usize(symbol.range.start.line))
        .unwrap_or("");

    let mut contents = String::new();
    match symbol.kind {
        SymbolKind::Function => push_code_block(&mut contents, &symbol.name),
        SymbolKind::Target => push_target_details(&mut contents, symbol, line),
        SymbolKind::Variable => push_variable_details(&mut contents, file, text, symbol, line),
    }

    let line_number = symbol.range.start.line.saturating_add(1);
    let _ = write!(contents, "\n\n**Location:** Line {line_number}");

    return Some(HoverResult {
        contents,
        range: symbol.range,
    });
}

/// Fenced `makefile` block holding `title`.
fn push_code_block(out: &mut String, title: &str) {
    let _ = write!(out, "```makefile\n{title}\n```\n");
    return;
}

/// Dependencies and rule type of a target.
fn push_target_details(out: &mut String, symbol: &Symbol, line: &str) {
    push_code_block(out, &format!("{} ({})", symbol.name, symbol.kind.label()));

    if let Some((_, rest)) = line.split_once(':') {
        let dependencies = rest.trim_start_matches(':').trim();
        if dependencies.is_empty() {
            out.push_str("\n**Dependencies:** None");
        } else {
            let _ = write!(out, "\n**Dependencies:** `{dependencies}`");
        }
    }

    if symbol.name.contains('%') {
        out.push_str("\n\n**Type:** Pattern Rule");
    } else {
        out.push_str("\n\n**Type:** Explicit Target");
    }
    return;
}

/// Assigned value and usage count of a variable.
fn push_variable_details(out: &mut String, file: &Path, text: &str, symbol: &Symbol, line: &str) {
    push_code_block(out, &format!("{} ({})", symbol.name, symbol.kind.label()));

    let value = line
        .split_once('=')
        .map(|(_, value)| return value.trim())
        .filter(|value| return !value.is_empty());
    if let Some(value) = value {
        let _ = write!(out, "\n**Value:** `{value}`");
    }

    let count = find_references(file, text, &symbol.name).len();
    let _ = write!(out, "\n\n**References:** {count} usage(s) found");
    return;
}
