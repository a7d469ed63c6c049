//! Structured logging for the rover simulator.
//!
//! Console output with uptime timestamps and module paths, plus a JSON log
//! file in debug builds. The level comes from `RUST_LOG` when set, else from
//! the `debug.log_level` config setting.

use std::path::{Path, PathBuf};

use rover_config::Config;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Directive used when neither `RUST_LOG` nor the config provides one.
pub const DEFAULT_DIRECTIVES: &str = "info";

/// File name of the JSON log written in debug builds.
pub const LOG_FILE_NAME: &str = "rover.log";

/// Initialize the global tracing subscriber.
///
/// * `log_dir` - directory for the JSON log file (debug builds only)
/// * `debug_build` - enables the file layer
/// * `config` - supplies the fallback log level
///
/// ```no_run
/// use rover_config::Config;
/// use rover_log::init_logging;
///
/// let config = Config::default();
/// init_logging(Some(std::path::Path::new("./logs")), true, Some(&config));
/// ```
pub fn init_logging(log_dir: Option<&Path>, debug_build: bool, config: Option<&Config>) {
    let directives = filter_directives(config);
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&directives));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_level(true)
        .with_timer(fmt::time::uptime());

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer);

    if debug_build
        && let Some(path) = log_file_path(log_dir)
        && let Ok(log_file) = std::fs::File::create(&path)
    {
        let file_layer = fmt::layer()
            .with_writer(log_file)
            .with_ansi(false)
            .with_target(true)
            .with_timer(fmt::time::uptime())
            .json();

        subscriber.with(file_layer).init();
        tracing::debug!(path = %path.display(), "File logging enabled");
        return;
    }

    subscriber.init();
}

/// Filter directives derived from config, falling back to [`DEFAULT_DIRECTIVES`].
pub fn filter_directives(config: Option<&Config>) -> String {
    match config {
        Some(config) if !config.debug.log_level.trim().is_empty() => {
            config.debug.log_level.trim().to_string()
        }
        _ => DEFAULT_DIRECTIVES.to_string(),
    }
}

/// Creates `log_dir` if needed and returns the log file path inside it.
fn log_file_path(log_dir: Option<&Path>) -> Option<PathBuf> {
    let dir = log_dir?;
    std::fs::create_dir_all(dir).ok()?;
    Some(dir.join(LOG_FILE_NAME))
}
