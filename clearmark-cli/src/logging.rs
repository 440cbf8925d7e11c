// ============================================================================
// clearmark-cli/src/logging.rs
// ============================================================================
//
// LOGGING SETUP: Console and Optional File Logging
//
// Console logging goes through `env_logger`, so RUST_LOG still works:
// - RUST_LOG=info (default): Normal operation logs
// - RUST_LOG=debug (or --verbose): Detailed debugging information
//
// When `--log-file` is given, `fern` dispatches every record to both stderr
// and the file with a local timestamp. The level then comes from --verbose.

use anyhow::Context;
use log::LevelFilter;
use std::io::Write;
use std::path::Path;

/// Initializes the global logger.
pub fn init_logging(verbose: bool, log_file: Option<&Path>) -> anyhow::Result<()> {
    match log_file {
        Some(path) => init_file_logging(verbose, path),
        None => {
            let default_level = if verbose { "debug" } else { "info" };
            env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
                .format(|buf, record| {
                    writeln!(buf, "{} {:<5} {}", buf.timestamp(), record.level(), record.args())
                })
                .try_init()
                .context("Failed to initialize logger")
        }
    }
}

fn init_file_logging(verbose: bool, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory '{}'", parent.display()))?;
    }
    let level = if verbose { LevelFilter::Debug } else { LevelFilter::Info };

    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{} {:<5} [{}] {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level)
        // HTTP internals are noisy at debug level.
        .level_for("hyper", LevelFilter::Warn)
        .level_for("hyper_util", LevelFilter::Warn)
        .level_for("reqwest", LevelFilter::Warn)
        .chain(std::io::stderr())
        .chain(
            fern::log_file(path)
                .with_context(|| format!("Failed to open log file '{}'", path.display()))?,
        )
        .apply()
        .context("Failed to initialize logger")
}
