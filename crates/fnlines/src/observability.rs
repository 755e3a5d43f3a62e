//! Logging setup.
//!
//! Human-readable diagnostics go to stderr. When a log file is configured,
//! every event also goes to it as JSON lines. Stdout is never written to,
//! because it carries command output (and the MCP protocol under `serve`).

use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

/// Environment variable holding an explicit log file path.
pub const LOG_PATH_ENV: &str = "FNLINES_LOG_PATH";
/// Environment variable holding a log directory.
pub const LOG_DIR_ENV: &str = "FNLINES_LOG_DIR";
/// File name used inside a log directory.
pub const LOG_FILE_NAME: &str = "fnlines.jsonl";

/// Where logs go and how chatty stderr is.
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    /// JSON log file, if any.
    pub log_file: Option<PathBuf>,
    /// Most verbose level printed to stderr.
    pub stderr_level: LevelFilter,
}

impl ObservabilityConfig {
    /// Resolve the log file from the environment, falling back to the
    /// configured `log_dir`.
    pub fn from_env_with_overrides(config_log_dir: Option<PathBuf>) -> Self {
        let log_path = std::env::var_os(LOG_PATH_ENV).map(PathBuf::from);
        let log_dir = std::env::var_os(LOG_DIR_ENV).map(PathBuf::from);
        Self {
            log_file: resolve_log_file(log_path, log_dir, config_log_dir),
            stderr_level: LevelFilter::WARN,
        }
    }

    /// Set the stderr level from `--quiet` and `-v` flags.
    ///
    /// With `RUST_LOG` set, stderr shows whatever the filter lets through.
    #[must_use]
    pub fn with_verbosity(mut self, quiet: bool, verbose: u8) -> Self {
        self.stderr_level = if std::env::var_os(EnvFilter::DEFAULT_ENV).is_some() && !quiet {
            LevelFilter::TRACE
        } else {
            stderr_level(quiet, verbose)
        };
        self
    }
}

/// Pick the log file: explicit path, then directory, then config directory.
fn resolve_log_file(
    log_path: Option<PathBuf>,
    log_dir: Option<PathBuf>,
    config_log_dir: Option<PathBuf>,
) -> Option<PathBuf> {
    log_path
        .filter(|p| !p.as_os_str().is_empty())
        .or_else(|| {
            log_dir
                .or(config_log_dir)
                .filter(|d| !d.as_os_str().is_empty())
                .map(|d| d.join(LOG_FILE_NAME))
        })
}

const fn stderr_level(quiet: bool, verbose: u8) -> LevelFilter {
    if quiet {
        return LevelFilter::ERROR;
    }
    match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

fn filter_directive(quiet: bool, verbose: u8, log_level: &str) -> String {
    let floor = match verbose {
        0 => return if quiet { "error".to_string() } else { log_level.to_string() },
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let configured = log_level.parse::<LevelFilter>().unwrap_or(LevelFilter::INFO);
    let requested = floor.parse::<LevelFilter>().unwrap_or(LevelFilter::INFO);
    if configured > requested {
        log_level.to_string()
    } else {
        floor.to_string()
    }
}

/// Build the global filter.
///
/// `RUST_LOG` wins. Otherwise `--quiet` limits to errors, and `-v` raises the
/// configured level but never lowers it.
pub fn env_filter(quiet: bool, verbose: u8, log_level: &str) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    EnvFilter::new(filter_directive(quiet, verbose, log_level))
}

/// Keeps the background log writer alive; dropping it flushes the file.
#[derive(Debug)]
pub struct ObservabilityGuard {
    _file_guard: Option<WorkerGuard>,
}

/// Install the global subscriber.
pub fn init_observability(
    config: &ObservabilityConfig,
    filter: EnvFilter,
) -> anyhow::Result<ObservabilityGuard> {
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .with_filter(config.stderr_level);

    let (file_layer, file_guard) = match config.log_file.as_deref() {
        Some(path) => {
            let appender = file_appender(path)?;
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().json().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .context("a global tracing subscriber is already installed")?;

    Ok(ObservabilityGuard {
        _file_guard: file_guard,
    })
}

fn file_appender(path: &Path) -> anyhow::Result<RollingFileAppender> {
    let dir = path
        .parent()
        .filter(|d| !d.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let name = path
        .file_name()
        .with_context(|| format!("log path has no file name: {}", path.display()))?;

    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create log directory {}", dir.display()))?;

    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(name.to_string_lossy())
        .build(dir)
        .with_context(|| format!("failed to open log file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_path_beats_directories() {
        let resolved = resolve_log_file(
            Some(PathBuf::from("/tmp/a.log")),
            Some(PathBuf::from("/tmp/dir")),
            Some(PathBuf::from("/tmp/config")),
        );
        assert_eq!(resolved, Some(PathBuf::from("/tmp/a.log")));
    }

    #[test]
    fn env_dir_beats_config_dir() {
        let resolved = resolve_log_file(
            None,
            Some(PathBuf::from("/tmp/dir")),
            Some(PathBuf::from("/tmp/config")),
        );
        assert_eq!(resolved, Some(PathBuf::from("/tmp/dir").join(LOG_FILE_NAME)));
    }

    #[test]
    fn config_dir_is_last_resort() {
        let resolved = resolve_log_file(None, None, Some(PathBuf::from("/var/log/fnlines")));
        assert_eq!(
            resolved,
            Some(PathBuf::from("/var/log/fnlines").join(LOG_FILE_NAME))
        );
    }

    #[test]
    fn no_file_without_configuration() {
        assert_eq!(resolve_log_file(None, None, None), None);
        assert_eq!(resolve_log_file(Some(PathBuf::new()), None, None), None);
    }

    #[test]
    fn stderr_level_follows_flags() {
        assert_eq!(stderr_level(false, 0), LevelFilter::WARN);
        assert_eq!(stderr_level(false, 1), LevelFilter::INFO);
        assert_eq!(stderr_level(false, 2), LevelFilter::DEBUG);
        assert_eq!(stderr_level(false, 5), LevelFilter::TRACE);
        assert_eq!(stderr_level(true, 3), LevelFilter::ERROR);
    }

    #[test]
    fn verbosity_raises_but_never_lowers_configured_level() {
        assert_eq!(filter_directive(false, 0, "warn"), "warn");
        assert_eq!(filter_directive(true, 0, "debug"), "error");
        assert_eq!(filter_directive(false, 2, "warn"), "debug");
        assert_eq!(filter_directive(false, 1, "debug"), "debug");
    }
}
