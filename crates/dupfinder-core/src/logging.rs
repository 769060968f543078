use log::{error, info, LevelFilter};
use std::path::Path;

// For file-based logging with rotation
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::append::rolling_file::policy::compound::roll::fixed_window::FixedWindowRoller;
use log4rs::append::rolling_file::policy::compound::trigger::size::SizeTrigger;
use log4rs::append::rolling_file::policy::compound::CompoundPolicy;
use log4rs::append::rolling_file::RollingFileAppender;
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;

use crate::config::LogLevel;
use crate::error::{Error, Result};

/// Rotate the log file once it grows past this size
const MAX_LOG_BYTES: u64 = 10 * 1024 * 1024;

/// Number of rotated log files kept next to the live one
const ARCHIVED_LOGS: u32 = 5;

const LOG_PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S)} [{T}] {M} ({f}:{L}) {l} - {m}{n}";

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// Initialize the logger with timestamp, thread, log level, and module path.
///
/// Logs always go to `<log_dir>/dupfinder.log`. Console output on stderr is optional
/// so it can be turned off while a progress bar is drawn.
/// `DUPFINDER_LOG` overrides `level` when it holds a valid level name.
pub fn init_logger(log_dir: &Path, level: LogLevel, console: bool) -> Result<()> {
    std::fs::create_dir_all(log_dir)?;

    let log_file_path = log_dir.join("dupfinder.log");
    let archived_logs_pattern = log_dir.join("dupfinder.{}.log");

    let file_trigger = SizeTrigger::new(MAX_LOG_BYTES);
    let file_roller = FixedWindowRoller::builder()
        .build(&archived_logs_pattern.to_string_lossy(), ARCHIVED_LOGS)
        .map_err(|e| Error::Configuration(format!("Failed to create log roller: {}", e)))?;
    let compound_policy = CompoundPolicy::new(Box::new(file_trigger), Box::new(file_roller));

    let rolling_file = RollingFileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
        .build(&log_file_path, Box::new(compound_policy))?;

    let mut builder =
        Config::builder().appender(Appender::builder().build("file", Box::new(rolling_file)));
    let mut root = Root::builder().appender("file");

    if console {
        let stderr = ConsoleAppender::builder()
            .target(Target::Stderr)
            .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
            .build();
        builder = builder.appender(Appender::builder().build("console", Box::new(stderr)));
        root = root.appender("console");
    }

    let level = std::env::var("DUPFINDER_LOG")
        .ok()
        .and_then(|value| value.parse::<LevelFilter>().ok())
        .unwrap_or_else(|| level.into());

    let config = builder
        .build(root.build(level))
        .map_err(|e| Error::Configuration(format!("Failed to build log config: {}", e)))?;

    log4rs::init_config(config)
        .map_err(|e| Error::Configuration(format!("Failed to initialize log4rs: {}", e)))?;

    info!("Logging to file: {}", log_file_path.display());
    Ok(())
}

/// Log file operation that failed
pub fn log_file_error(path: &Path, operation: &str, error: &dyn std::error::Error) {
    error!(
        "File operation failed - Operation: {}, Path: {}, Error: {}",
        operation,
        path.display(),
        error
    );
}

/// Log hash computation error
pub fn log_hash_error(path: &Path, error: &dyn std::error::Error) {
    error!(
        "Hash computation failed - Path: {}, Error: {}",
        path.display(),
        error
    );
}
