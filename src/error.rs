//! Crate-level error types for makeref diagnostics.

use std::path::PathBuf;

use crate::types::Position;

/// Errors only come from file access and CLI lookups; the parsing and search
/// functions themselves never fail. Each variant names the file, symbol, or
/// reason for failure.
#[allow(clippy::error_impl_error, reason = "crate-level error type shared by lib and binary")]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A file named on the command line does not exist or cannot be read as text.
    #[error("file not found: {}", path.display())]
    FileNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// Underlying I/O error from the filesystem.
    #[error("io: {0}")]
    Io(
        /// The wrapped I/O error.
        #[from]
        std::io::Error,
    ),

    /// JSON serialization of command output failed.
    #[error("json: {0}")]
    Json(
        /// The wrapped JSON error.
        #[from]
        serde_json::Error,
    ),

    /// The cursor is not on anything that names a symbol.
    #[error("no symbol at {}:{}:{}", file.display(), position.line, position.character)]
    NoSymbolAtPosition {
        /// File that was inspected.
        file: PathBuf,
        /// Zero-based cursor position.
        position: Position,
    },

    /// A name was resolved but has no declaration anywhere in the workspace.
    #[error("symbol not found: `{symbol}` in {}", file.display())]
    SymbolNotFound {
        /// File the lookup started from.
        file: PathBuf,
        /// Declared names in that file, for "did you mean" hints.
        suggestions: Vec<String>,
        /// Name that was looked up.
        symbol: String,
    },

    /// TOML deserialization failed.
    #[error("toml deserialize: {0}")]
    TomlDe(
        /// The wrapped TOML deserialization error.
        #[from]
        toml::de::Error,
    ),

    /// The filesystem watcher could not be set up.
    #[error("watch: {reason}")]
    Watch {
        /// Description of the failure.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_file() {
        let e = Error::NoSymbolAtPosition {
            file: PathBuf::from("Makefile"),
            position: Position::new(3, 7),
        };
        assert_eq!(e.to_string(), "no symbol at Makefile:3:7");

        let e = Error::SymbolNotFound {
            file: PathBuf::from("sub/rules.mk"),
            suggestions: vec![],
            symbol: "clean".to_string(),
        };
        assert_eq!(e.to_string(), "symbol not found: `clean` in sub/rules.mk");
    }
}
