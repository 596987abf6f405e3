use std::path::Path;

use crate::error::Error;

/// File name of the workspace config.
pub const CONFIG_FILE: &str = ".makeref.toml";

/// Directories skipped during workspace discovery when the config does not say otherwise.
const DEFAULT_EXCLUDE_DIRS: &[&str] = &["node_modules", ".git"];

/// Workspace configuration loaded from `.makeref.toml`.
/// Include/exclude patterns are path prefixes applied to discovered Makefiles.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory names never descended into.
    pub exclude_dirs: Vec<String>,
    /// Path prefixes to skip.
    exclude: Vec<String>,
    /// Path prefixes to keep; empty keeps everything.
    include: Vec<String>,
    /// Variable names treated as defined by the lint checks.
    pub predefined_variables: Vec<String>,
}

/// Raw TOML structure for `.makeref.toml`.
#[derive(serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct MakerefTomlConfig {
    #[serde(default)]
    exclude: Vec<String>,
    exclude_dirs: Option<Vec<String>>,
    #[serde(default)]
    include: Vec<String>,
    #[serde(default)]
    predefined_variables: Vec<String>,
}

impl Config {
    /// Load config from `.makeref.toml` in the given root directory.
    /// Returns the defaults if the file doesn't exist.
    /// Returns an error if the file exists but is malformed; a config the user
    /// wrote is never silently replaced by defaults.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if reading fails (other than not-found),
    /// or `Error::TomlDe` if the TOML is malformed.
    pub fn load(root: &Path) -> Result<Self, Error> {
        let path = root.join(CONFIG_FILE);
        let content = match std::fs::read_to_string(&path) {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("no {CONFIG_FILE} in {}, using defaults", root.display());
                return Ok(Self::default());
            },
            Err(e) => return Err(Error::Io(e)),
            Ok(c) => c,
        };

        return Self::parse(&content);
    }

    /// Parse config TOML.
    ///
    /// # Errors
    ///
    /// Returns `Error::TomlDe` if the TOML is malformed or has unknown keys.
    pub fn parse(content: &str) -> Result<Self, Error> {
        let raw: MakerefTomlConfig = toml::from_str(content)?;
        let exclude_dirs = raw.exclude_dirs.unwrap_or_else(default_exclude_dirs);
        return Ok(Self {
            exclude: raw.exclude,
            exclude_dirs,
            include: raw.include,
            predefined_variables: raw.predefined_variables,
        });
    }

    /// Check whether a discovered Makefile path should be used.
    ///
    /// A path is included if no include patterns are set (use everything),
    /// or if the path starts with at least one include pattern.
    /// An included path is then excluded if it starts with any exclude pattern.
    pub fn should_scan(&self, relative_path: &str) -> bool {
        let included = self.include.is_empty()
            || self.include.iter().any(|p| return relative_path.starts_with(p.as_str()));

        if !included {
            return false;
        }

        return !self.exclude.iter().any(|p| return relative_path.starts_with(p.as_str()));
    }
}

impl Default for Config {
    /// Scan everything except the default excluded directories.
    fn default() -> Self {
        return Self {
            exclude: Vec::new(),
            exclude_dirs: default_exclude_dirs(),
            include: Vec::new(),
            predefined_variables: Vec::new(),
        };
    }
}

/// Owned copy of `DEFAULT_EXCLUDE_DIRS`.
fn default_exclude_dirs() -> Vec<String> {
    return DEFAULT_EXCLUDE_DIRS.iter().map(|d| return (*d).to_string()).collect();
}
