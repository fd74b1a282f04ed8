// ============================================================================
// reelsmith-cli/src/logging.rs
// ============================================================================
//
// LOGGING SETUP: env_logger Initialisation for the CLI
//
// The core logs through the `log` facade only; this module installs the
// env_logger backend for the binary.
//
// USAGE:
// - RUST_LOG=info (default): build milestones, warnings and retries
// - RUST_LOG=debug (or --verbose): assembled commands and probe results
// - RUST_LOG=ffmpeg_log=trace: every raw encoder diagnostic line

use log::LevelFilter;
use std::io::Write;

/// Default level for the given verbosity.
#[must_use]
pub fn default_level(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

/// Installs the global logger.
///
/// `RUST_LOG` takes precedence over the verbosity flag when set.
pub fn init(verbose: bool) {
    let mut builder = env_logger::Builder::new();
    builder
        .filter_level(default_level(verbose))
        .format(|buf, record| {
            let level = match record.level() {
                log::Level::Error => "ERROR",
                log::Level::Warn => "WARN ",
                log::Level::Info => "INFO ",
                log::Level::Debug => "DEBUG",
                log::Level::Trace => "TRACE",
            };
            writeln!(buf, "{} {} {}", buf.timestamp(), level, record.args())
        })
        .parse_default_env();

    // Ignored when a logger is already installed.
    let _ = builder.try_init();
}
