//! File watcher: runs `check` on startup, then re-runs on Makefile changes.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use notify::{RecursiveMode, Watcher as _};

use crate::commands::{self, Format};
use crate::config::{CONFIG_FILE, Config};
use crate::diagnostics;
use crate::error;
use crate::workspace;

/// Debounce delay between filesystem events and re-check.
const DEBOUNCE_MS: u64 = 100;

/// Create a filesystem watcher that signals on the given channel whenever a
/// Makefile or the config file under `root` is created, modified, or removed.
/// Paths inside any of `exclude_dirs` are ignored.
///
/// # Errors
///
/// Returns `Error::Watch` if the watcher cannot be created.
fn create_watcher(
    tx: crossbeam_channel::Sender<()>,
    root: PathBuf,
    exclude_dirs: Vec<String>,
) -> Result<notify::RecommendedWatcher, error::Error> {
    return notify::recommended_watcher(move |res: Result<notify::Event, notify::Error>| {
        if let Ok(event) = res
            && matches!(
                event.kind,
                notify::EventKind::Create(_)
                    | notify::EventKind::Modify(_)
                    | notify::EventKind::Remove(_)
            )
            && event.paths.iter().any(|p| return is_relevant(p, &root, &exclude_dirs))
        {
            let _ = tx.send(());
        }
    })
    .map_err(|e| {
        return error::Error::Watch {
            reason: format!("watcher setup failed: {e}"),
        };
    });
}

/// Whether a changed path should trigger a re-check. Only the part of `path`
/// below `root` is matched against `exclude_dirs`.
fn is_relevant(path: &Path, root: &Path, exclude_dirs: &[String]) -> bool {
    let relative = path.strip_prefix(root).unwrap_or(path);
    let excluded = relative
        .components()
        .any(|c| return exclude_dirs.iter().any(|d| return c.as_os_str() == d.as_str()));
    if excluded {
        return false;
    }
    return workspace::is_makefile(path) || path.file_name().is_some_and(|n| return n == CONFIG_FILE);
}

/// Entry point for the watch command.
///
/// Runs an initial check, then watches the workspace tree and re-checks when a
/// Makefile or the config file changes. Directories created later are covered.
///
/// # Errors
///
/// Returns errors from config loading or watcher setup.
pub fn run(root: &Path, format: Format) -> Result<ExitCode, error::Error> {
    eprintln!("watch: initial check");
    let mut last_code = run_check(root, format);

    let config = Config::load(root)?;
    let watch_root = std::fs::canonicalize(root).unwrap_or_else(|_| return root.to_path_buf());

    let (tx, rx) = crossbeam_channel::unbounded();
    let mut watcher = create_watcher(tx, watch_root.clone(), config.exclude_dirs)?;
    watcher.watch(&watch_root, RecursiveMode::Recursive).map_err(|e| {
        return error::Error::Watch {
            reason: format!("cannot watch {}: {e}", watch_root.display()),
        };
    })?;

    eprintln!("watch: monitoring {}, press Ctrl+C to stop", watch_root.display());

    while rx.recv().is_ok() {
        let debounce = Duration::from_millis(DEBOUNCE_MS);
        while rx.recv_timeout(debounce).is_ok() {}
        eprintln!("watch: change detected, re-checking...");
        last_code = run_check(root, format);
    }

    return Ok(last_code);
}

/// Run check once over the whole workspace. Returns the exit code from check.
fn run_check(root: &Path, format: Format) -> ExitCode {
    return match commands::check(root, &[], format) {
        Ok(code) => code,
        Err(e) => {
            diagnostics::print_error(&e);
            ExitCode::from(3_u8)
        },
    };
}
