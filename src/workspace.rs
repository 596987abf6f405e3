//! Cross-document search: Makefile discovery plus definition and reference
//! lookups that reach beyond the current document.

use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use crate::config::Config;
use crate::parser::parse_document;
use crate::references::{self, find_declaration, references_with_declaration};
use crate::types::Location;

/// File names make reads without being told.
const MAKEFILE_NAMES: &[&str] = &["GNUmakefile", "Makefile", "makefile"];

/// Extensions used for included makefile fragments.
const MAKEFILE_EXTENSIONS: &[&str] = &["mak", "mk"];

/// Find every Makefile under `root`.
/// Applies the config's excluded directories and include/exclude prefixes.
/// Entries that cannot be read are skipped. The result is sorted.
pub fn discover(root: &Path, config: &Config) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_entry(|e| return e.depth() == 0 || !is_excluded_dir(e, config))
        .filter_map(Result::ok)
        .filter(|e| return e.file_type().is_file() && is_makefile(e.path()))
        .filter(|e| {
            let relative = e.path().strip_prefix(root).unwrap_or(e.path());
            return config.should_scan(&relative.to_string_lossy());
        })
        .map(DirEntry::into_path)
        .collect();

    files.sort();
    log::debug!("discovered {} makefiles under {}", files.len(), root.display());
    return files;
}

/// Declarations of `name`. The current document wins; other workspace files
/// are only searched when it has none, and each contributes its first match.
pub fn find_definitions(
    root: &Path,
    config: &Config,
    current: &Path,
    text: &str,
    name: &str,
) -> Vec<Location> {
    let symbols = parse_document(current, text);
    if let Some(declaration) = find_declaration(&symbols, name) {
        return vec![declaration.location.clone()];
    }

    let mut locations = Vec::new();
    for (file, other_text) in other_documents(root, config, current) {
        let other_symbols = parse_document(&file, &other_text);
        if let Some(declaration) = find_declaration(&other_symbols, name) {
            locations.push(declaration.location.clone());
        }
    }
    return locations;
}

/// Usages of `name` across the workspace, current document first.
/// With `include_declaration`, each file's declaration is added once; a
/// declaration already listed at the same file, line and column is skipped.
pub fn find_references(
    root: &Path,
    config: &Config,
    current: &Path,
    text: &str,
    name: &str,
    include_declaration: bool,
) -> Vec<Location> {
    let mut locations = references_with_declaration(current, text, name, include_declaration);

    for (file, other_text) in other_documents(root, config, current) {
        locations.extend(references::find_references(&file, &other_text, name));

        if !include_declaration {
            continue;
        }
        let symbols = parse_document(&file, &other_text);
        let Some(declaration) = find_declaration(&symbols, name) else {
            continue;
        };
        let already_listed = locations.iter().any(|l| {
            return l.file == declaration.location.file
                && l.range.start == declaration.location.range.start;
        });
        if !already_listed {
            locations.push(declaration.location.clone());
        }
    }
    return locations;
}

/// Whether a directory entry is one of the config's excluded directory names.
fn is_excluded_dir(entry: &DirEntry, config: &Config) -> bool {
    if !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    return config.exclude_dirs.iter().any(|d| return *d == name);
}

/// Whether a path names a Makefile by file name or extension.
pub(crate) fn is_makefile(path: &Path) -> bool {
    let by_name = path
        .file_name()
        .is_some_and(|n| return MAKEFILE_NAMES.iter().any(|m| return n == *m));
    let by_extension = path
        .extension()
        .is_some_and(|e| return MAKEFILE_EXTENSIONS.iter().any(|m| return e == *m));
    return by_name || by_extension;
}

/// Contents of every discovered Makefile other than `current`.
fn other_documents(root: &Path, config: &Config, current: &Path) -> Vec<(PathBuf, String)> {
    let current_canonical = std::fs::canonicalize(current).ok();
    return read_documents(root, config)
        .into_iter()
        .filter(|(file, _)| {
            let is_current = current_canonical.as_ref().map_or_else(
                || return file == current,
                |canonical| return std::fs::canonicalize(file).ok().as_ref() == Some(canonical),
            );
            return !is_current;
        })
        .collect();
}

/// Contents of every discovered Makefile, in discovery order.
/// Files that cannot be read as UTF-8 text are logged and left out.
pub fn read_documents(root: &Path, config: &Config) -> Vec<(PathBuf, String)> {
    let mut documents = Vec::new();
    for file in discover(root, config) {
        match std::fs::read_to_string(&file) {
            Err(e) => log::warn!("skipping {}: {e}", file.display()),
            Ok(text) => documents.push((file, text)),
        }
    }
    return documents;
}
