//! CLI commands for makeref: symbols, resolve, definition, references, hover,
//! complete, check.
//!
//! Each command reads its inputs from disk, calls into the library, and
//! prints either plain text or pretty JSON on stdout.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use serde::Serialize;

use crate::completion;
use crate::config::Config;
use crate::error::Error;
use crate::hover;
use crate::lint::{self, Diagnostic, Severity};
use crate::parser::parse_document;
use crate::resolver::find_symbol_at_position;
use crate::types::{Location, Position, SymbolKind, TextRange};
use crate::workspace;

/// Diagnostics for one file, as printed by `check --format json`.
#[derive(Serialize)]
struct FileReport {
    /// Findings in line order, unused variables last.
    diagnostics: Vec<Diagnostic>,
    /// File that was checked.
    file: PathBuf,
}

/// Output format shared by every command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Format {
    /// Pretty-printed JSON.
    Json,
    /// One line per result.
    Text,
}

/// One declared name, as printed by `symbols`.
#[derive(Serialize)]
struct SymbolEntry {
    /// Target, variable, or function.
    kind: SymbolKind,
    /// Declared name.
    name: String,
    /// Outline classification for editor symbol lists.
    outline_kind: &'static str,
    /// Span of the name.
    range: TextRange,
}

/// Lint the given files, or every Makefile under `root` when `files` is empty.
/// Discovered files that cannot be read are skipped with a warning; a file
/// named explicitly must be readable.
/// Exit code priority: errors (2) > warnings (1) > clean (0).
///
/// # Errors
///
/// Returns `Error::FileNotFound` if a named file cannot be read,
/// or config errors from `.makeref.toml`.
pub fn check(root: &Path, files: &[PathBuf], format: Format) -> Result<ExitCode, Error> {
    let config = Config::load(root)?;
    let documents = if files.is_empty() {
        workspace::read_documents(root, &config)
    } else {
        files
            .iter()
            .map(|file| return read_document(file).map(|text| return (file.clone(), text)))
            .collect::<Result<Vec<_>, Error>>()?
    };

    let reports: Vec<FileReport> = documents
        .into_iter()
        .map(|(file, text)| {
            let diagnostics = lint::lint(&file, &text, &config.predefined_variables);
            return FileReport { diagnostics, file };
        })
        .collect();

    let count = |severity: Severity| -> usize {
        return reports
            .iter()
            .flat_map(|r| return r.diagnostics.iter())
            .filter(|d| return d.severity == severity)
            .count();
    };
    let errors = count(Severity::Error);
    let warnings = count(Severity::Warning);

    match format {
        Format::Json => print_json(&reports)?,
        Format::Text => print_check_report(root, &reports, errors, warnings),
    }

    if errors > 0 {
        return Ok(ExitCode::from(2));
    } else if warnings > 0 {
        return Ok(ExitCode::from(1));
    }
    return Ok(ExitCode::SUCCESS);
}

/// Completion candidates at a position.
///
/// # Errors
///
/// Returns `Error::FileNotFound` if the file cannot be read.
pub fn complete(file: &Path, position: Position, format: Format) -> Result<ExitCode, Error> {
    let text = read_document(file)?;
    let items = completion::complete(file, &text, position);

    match format {
        Format::Json => print_json(&items)?,
        Format::Text => {
            for item in &items {
                let detail = item.detail.as_deref().unwrap_or("");
                println!("{}\t{}", item.label, detail);
            }
        },
    }
    return Ok(ExitCode::SUCCESS);
}

/// Declaration of the name under the cursor, searching the workspace when
/// the current file does not declare it.
///
/// # Errors
///
/// Returns `Error::NoSymbolAtPosition` if nothing is under the cursor,
/// or `Error::SymbolNotFound` if no Makefile declares the name.
pub fn definition(
    root: &Path,
    file: &Path,
    position: Position,
    format: Format,
) -> Result<ExitCode, Error> {
    let text = read_document(file)?;
    let name = name_at(file, &text, position)?;
    let config = Config::load(root)?;

    let locations = workspace::find_definitions(root, &config, file, &text, &name);
    if locations.is_empty() {
        return Err(symbol_not_found(file, &text, name));
    }

    print_locations(root, &locations, format)?;
    return Ok(ExitCode::SUCCESS);
}

/// Hover markdown for the declaration under the cursor.
///
/// # Errors
///
/// Returns `Error::NoSymbolAtPosition` if nothing is under the cursor,
/// or `Error::SymbolNotFound` if the file does not declare the name.
pub fn hover(file: &Path, position: Position, format: Format) -> Result<ExitCode, Error> {
    let text = read_document(file)?;
    let name = name_at(file, &text, position)?;
    let Some(result) = hover::hover(file, &text, position) else {
        return Err(symbol_not_found(file, &text, name));
    };

    match format {
        Format::Json => print_json(&result)?,
        Format::Text => println!("{}", result.contents),
    }
    return Ok(ExitCode::SUCCESS);
}

/// Format a location as `path:line:start-end`, relative to `root` when possible.
fn location_text(root: &Path, location: &Location) -> String {
    let file = location.file.strip_prefix(root).unwrap_or(&location.file);
    let range = &location.range;
    return format!(
        "{}:{}:{}-{}",
        file.display(),
        range.start.line,
        range.start.character,
        range.end.character
    );
}

/// Resolve the name under the cursor or fail with a positioned error.
///
/// # Errors
///
/// Returns `Error::NoSymbolAtPosition` if nothing resolves.
fn name_at(file: &Path, text: &str, position: Position) -> Result<String, Error> {
    return find_symbol_at_position(text, position).ok_or_else(|| {
        return Error::NoSymbolAtPosition {
            file: file.to_path_buf(),
            position,
        };
    });
}

/// Print per-diagnostic lines and a summary.
fn print_check_report(root: &Path, reports: &[FileReport], errors: usize, warnings: usize) {
    let mut total = 0_usize;
    for report in reports {
        let file = report.file.strip_prefix(root).unwrap_or(&report.file);
        for d in &report.diagnostics {
            total = total.saturating_add(1);
            println!(
                "{}:{}:{}: {} [{}] {}",
                file.display(),
                d.range.start.line,
                d.range.start.character,
                d.severity.as_str(),
                d.code.as_str(),
                d.message
            );
        }
    }

    let files = reports.len();
    if total == 0 {
        println!("All {files} files clean");
    } else {
        println!();
        println!("{errors} errors, {warnings} warnings, {total} total in {files} files");
    }
    return;
}

/// Serialize to pretty JSON on stdout.
///
/// # Errors
///
/// Returns `Error::Json` if serialization fails.
fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), Error> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{json}");
    return Ok(());
}

/// Print locations one per line, or as a JSON array.
///
/// # Errors
///
/// Returns `Error::Json` if serialization fails.
fn print_locations(root: &Path, locations: &[Location], format: Format) -> Result<(), Error> {
    match format {
        Format::Json => print_json(locations)?,
        Format::Text => {
            for location in locations {
                println!("{}", location_text(root, location));
            }
        },
    }
    return Ok(());
}

/// Read a document, mapping any failure to `Error::FileNotFound`.
///
/// # Errors
///
/// Returns `Error::FileNotFound` if the file is missing or not UTF-8.
fn read_document(file: &Path) -> Result<String, Error> {
    return std::fs::read_to_string(file).map_err(|e| {
        log::debug!("read {} failed: {e}", file.display());
        return Error::FileNotFound { path: file.to_path_buf() };
    });
}

/// Every usage of the name under the cursor across the workspace.
///
/// # Errors
///
/// Returns `Error::NoSymbolAtPosition` if nothing is under the cursor.
pub fn references(
    root: &Path,
    file: &Path,
    position: Position,
    include_declaration: bool,
    format: Format,
) -> Result<ExitCode, Error> {
    let text = read_document(file)?;
    let name = name_at(file, &text, position)?;
    let config = Config::load(root)?;

    let locations =
        workspace::find_references(root, &config, file, &text, &name, include_declaration);
    log::info!("{} references to `{name}`", locations.len());

    print_locations(root, &locations, format)?;
    return Ok(ExitCode::SUCCESS);
}

/// Print the name under the cursor. Exits 1 when there is none.
///
/// # Errors
///
/// Returns `Error::FileNotFound` if the file cannot be read.
pub fn resolve(file: &Path, position: Position, format: Format) -> Result<ExitCode, Error> {
    let text = read_document(file)?;
    let name = find_symbol_at_position(&text, position);

    match format {
        Format::Json => print_json(&name)?,
        Format::Text => {
            if let Some(n) = &name {
                println!("{n}");
            }
        },
    }

    if name.is_none() {
        return Ok(ExitCode::from(1));
    }
    return Ok(ExitCode::SUCCESS);
}

/// Build a `SymbolNotFound` carrying the names declared in `text` as hints.
fn symbol_not_found(file: &Path, text: &str, symbol: String) -> Error {
    let suggestions = parse_document(file, text)
        .into_iter()
        .map(|s| return s.name)
        .collect();
    return Error::SymbolNotFound {
        file: file.to_path_buf(),
        suggestions,
        symbol,
    };
}

/// List every declaration in a file.
///
/// # Errors
///
/// Returns `Error::FileNotFound` if the file cannot be read.
pub fn symbols(file: &Path, format: Format) -> Result<ExitCode, Error> {
    let text = read_document(file)?;
    let symbols = parse_document(file, &text);

    match format {
        Format::Json => {
            let entries: Vec<SymbolEntry> = symbols
                .into_iter()
                .map(|s| {
                    return SymbolEntry {
                        kind: s.kind,
                        name: s.name,
                        outline_kind: s.kind.outline_kind(),
                        range: s.range,
                    };
                })
                .collect();
            print_json(&entries)?;
        },
        Format::Text => {
            for symbol in &symbols {
                println!(
                    "{}:{}\t{}\t{}",
                    symbol.range.start.line,
                    symbol.range.start.character,
                    symbol.kind.label(),
                    symbol.name
                );
            }
        },
    }
    return Ok(ExitCode::SUCCESS);
}
