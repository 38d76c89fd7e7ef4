use once_cell::sync::Lazy;
use std::sync::Mutex;

/// Severity of a collected log entry
#[cfg_attr(feature = "napi", napi)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
  Error,
  Warn,
  Info,
}

impl LogLevel {
  pub fn as_str(self) -> &'static str {
    match self {
      LogLevel::Error => "error",
      LogLevel::Warn => "warn",
      LogLevel::Info => "info",
    }
  }
}

/// A log line handed back to the build tool, which decides how to print it
#[cfg_attr(feature = "napi", napi(object))]
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
  pub message: String,
  #[cfg_attr(feature = "napi", napi(ts_type = " 'error' | 'warn' | 'info' "))]
  pub level: String,
}

impl LogEntry {
  pub fn new(message: String, level: LogLevel) -> Self {
    Self {
      message,
      level: level.as_str().to_string(),
    }
  }
}

/// Collects log entries in memory until the host drains them
/// Transforms run on the host's worker threads, so entries are kept behind a mutex
#[derive(Debug, Default)]
pub struct Logger {
  logs: Mutex<Vec<LogEntry>>,
}

impl Logger {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn log(&self, message: String, level: LogLevel) {
    if let Ok(mut logs) = self.logs.lock() {
      logs.push(LogEntry::new(message, level));
    }
  }

  /// Returns every collected entry and clears the collection
  pub fn drain_logs(&self) -> Vec<LogEntry> {
    match self.logs.lock() {
      Ok(mut logs) => logs.drain(..).collect(),
      Err(_) => Vec::new(),
    }
  }
}

static GLOBAL_LOGGER: Lazy<Logger> = Lazy::new(Logger::new);

pub fn get_logger() -> &'static Logger {
  &GLOBAL_LOGGER
}

pub fn log_error(message: impl Into<String>) {
  get_logger().log(message.into(), LogLevel::Error);
}

pub fn log_warn(message: impl Into<String>) {
  get_logger().log(message.into(), LogLevel::Warn);
}

pub fn log_info(message: impl Into<String>) {
  get_logger().log(message.into(), LogLevel::Info);
}

#[macro_export]
macro_rules! log_error {
  ($($arg:tt)*) => {
    $crate::logger::log_error(format!($($arg)*))
  };
}

#[macro_export]
macro_rules! log_warn {
  ($($arg:tt)*) => {
    $crate::logger::log_warn(format!($($arg)*))
  };
}

#[macro_export]
macro_rules! log_info {
  ($($arg:tt)*) => {
    $crate::logger::log_info(format!($($arg)*))
  };
}
