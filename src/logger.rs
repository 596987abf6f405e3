//! Minimal stderr backend for the `log` facade.

use log::{Level, LevelFilter, Log, Metadata, Record};

/// Writes `level: message` lines to stderr.
struct StderrLogger;

/// The single installed backend.
static LOGGER: StderrLogger = StderrLogger;

impl Log for StderrLogger {
    /// Level filtering is done by `log::max_level`.
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        return metadata.level() <= log::max_level();
    }

    /// Nothing is buffered.
    fn flush(&self) {}

    /// Print one record.
    fn log(&self, record: &Record<'_>) {
        if self.enabled(record.metadata()) {
            eprintln!("{}: {}", label(record.level()), record.args());
        }
        return;
    }
}

/// Install the stderr logger. `verbosity` counts `-v` flags:
/// 0 shows warnings, 1 adds info, 2 or more adds debug.
/// Calling this twice keeps the first logger.
pub fn init(verbosity: u8) {
    let level = level_for(verbosity);
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
    return;
}

/// Lowercase prefix for a record.
const fn label(level: Level) -> &'static str {
    return match level {
        Level::Debug => "debug",
        Level::Error => "error",
        Level::Info => "info",
        Level::Trace => "trace",
        Level::Warn => "warning",
    };
}

/// Map a `-v` count to a level filter.
const fn level_for(verbosity: u8) -> LevelFilter {
    return match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
}
