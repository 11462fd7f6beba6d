//! Category/level based logging used by the `svec` crates.
//!
//! A [`Logger`] is registered globally with [`set_logger`], after which the `log_*!` macros route
//! their output to it. When no logger was registered, a quiet default logger (max level
//! [`LogLevel::Warning`]) is used, so library code can always log.

use core::{
    fmt::{Arguments, Display},
    sync::atomic::{self, AtomicU8},
    time::Duration,
};
use std::{
    fmt::Write as _,
    io::{self, Write},
    time::Instant,
};

use once_cell::sync::Lazy;
use parking_lot::{Mutex, RwLock};

static LOGGER : RwLock<Option<&'static Logger>> = parking_lot::const_rwlock(None);
static DEFAULT_LOGGER : Logger = Logger::with_max_level(LogLevel::Warning);
static START : Lazy<Instant> = Lazy::new(Instant::now);

/// Register the global logger.
pub fn set_logger(logger: &'static Logger) {
    *LOGGER.write() = Some(logger);
}

/// Get the global logger, or the default logger if none was registered.
pub fn get_logger() -> &'static Logger {
    match *LOGGER.read() {
        Some(logger) => logger,
        None => &DEFAULT_LOGGER,
    }
}

//------------------------------------------------------------------------------------------------------------------------------

/// Time elapsed since the logging system was first used
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub struct TimeStamp(Duration);

impl TimeStamp {
    /// Get the elapsed duration
    pub const fn duration(&self) -> Duration {
        self.0
    }
}

impl Display for TimeStamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:>5}.{:06}", self.0.as_secs(), self.0.subsec_micros())
    }
}

/// Get the current timestamp
pub fn get_timestamp() -> TimeStamp {
    TimeStamp(START.elapsed())
}

//------------------------------------------------------------------------------------------------------------------------------

/// Logging level
#[repr(u8)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub enum LogLevel {
    /// Severe error: will probably result in a crash
    Severe,
    /// Error: may not result in a crash
    Error,
    /// Warning: While not as bad as an error, it may result to something like a performance regression
    Warning,
    /// General info
    Info,
    /// Verbose info
    Verbose,
    /// Debug info (includes verbose info)
    Debug,
}

impl LogLevel {
    const fn from_u8(val: u8) -> Self {
        match val {
            0 => LogLevel::Severe,
            1 => LogLevel::Error,
            2 => LogLevel::Warning,
            3 => LogLevel::Info,
            4 => LogLevel::Verbose,
            _ => LogLevel::Debug,
        }
    }
}

impl Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Severe  => f.write_str("\x1B[1m\x1B[41m\x1B[30m[SEVERE ]\x1B[0m"),
            LogLevel::Error   => f.write_str(               "\x1B[91m[ERROR  ]\x1B[0m"),
            LogLevel::Warning => f.write_str(               "\x1B[93m[WARNING]\x1B[0m"),
            LogLevel::Info    => f.write_str(               "\x1B[37m[INFO   ]\x1B[0m"),
            LogLevel::Verbose => f.write_str(               "\x1B[90m[VERBOSE]\x1B[0m"),
            LogLevel::Debug   => f.write_str(               "\x1B[94m[DEBUG  ]\x1B[0m"),
        }
    }
}

/// Log category
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct LogCategory {
    category     : &'static str,
    sub_category : Option<&'static str>
}

impl LogCategory {
    pub const fn new(name: &'static str) -> Self {
        Self { category: name, sub_category: None }
    }

    pub const fn new_with_sub(name: &'static str, sub_name: &'static str) -> Self {
        Self { category: name, sub_category: Some(sub_name) }
    }
}

impl Display for LogCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.sub_category {
            Some(sub) => f.write_fmt(format_args!("{}({sub})", self.category)),
            None => f.write_str(self.category),
        }
    }
}

/// Additional info about where the log occured
pub struct LogLocation {
    file : &'static str,
    line : u32,
    func : &'static str,
    time : TimeStamp,
}

impl LogLocation {
    /// Creates a new log location
    pub const fn new(file: &'static str, line: u32, func: &'static str, time: TimeStamp) -> Self {
        Self { file, line, func, time }
    }

    /// Get the file name where the log occured
    pub const fn file(&self) -> &str {
        self.file
    }

    /// Get the line where the log occurred
    pub const fn line(&self) -> u32 {
        self.line
    }

    /// Get the function where the log occurred
    pub const fn function(&self) -> &str {
        self.func
    }

    /// Get the timestamp when the log occurred
    pub const fn timestamp(&self) -> TimeStamp {
        self.time
    }
}

struct LogLocationFormatter<'a> {
    loc   : &'a LogLocation,
    level : LogLevel
}

impl<'a> LogLocationFormatter<'a> {
    fn new(loc: &'a LogLocation, level: LogLevel) -> Self {
        Self { loc, level }
    }
}

impl<'a> Display for LogLocationFormatter<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.level {
            LogLevel::Severe |
            LogLevel::Error |
            LogLevel::Debug => f.write_fmt(format_args!("({}:{}: {})", self.loc.file(), self.loc.line(), self.loc.function())),
            LogLevel::Warning |
            LogLevel::Info |
            LogLevel::Verbose => Ok(()),
        }
    }
}

#[doc(hidden)]
pub fn get_func_name<F>(_: F) -> &'static str {
    core::any::type_name::<F>()
}

#[macro_export]
macro_rules! log_location {
    () => {
        $crate::LogLocation::new(file!(), line!(), "", $crate::get_timestamp())
    };
    ($func: expr) => {
        $crate::LogLocation::new(file!(), line!(), $crate::get_func_name($func), $crate::get_timestamp())
    };
}

//------------------------------------------------------------------------------------------------------------------------------

type LogWriter = Box<dyn Write + Send>;

pub struct LoggerState {
    writers:        [Option<LogWriter>; Self::MAX_WRITERS],
    cache:          Option<String>,
    always_flush:   bool,
    log_to_console: bool,
}

impl LoggerState {
    const MAX_WRITERS: usize = 8;
    const CACHE_FLUSH_LIMIT: usize = 4 * 1024;

    pub const fn new() -> Self {
        // Cause the `Option` contians a `Box<T>`, the option is not Copy, so we need to manually build the array
        let writers = [
            None,
            None,
            None,
            None,
            None,
            None,
            None,
            None,
        ];

        Self {
            writers,
            cache: None,
            always_flush: false,
            log_to_console: true,
        }
    }

    fn cache(&mut self) -> &mut String {
        self.cache.get_or_insert_with(|| String::with_capacity(Self::CACHE_FLUSH_LIMIT))
    }

    fn write_message(&mut self, message: &str) {
        self.cache().push_str(message);
        self.flush_when_needed();
    }

    fn format_message(&mut self, fmt_args: Arguments) {
        _ = self.cache().write_fmt(fmt_args);
        self.flush_when_needed();
    }

    fn flush_when_needed(&mut self) {
        if self.always_flush || self.cache.as_ref().map_or(0, |cache| cache.len()) > Self::CACHE_FLUSH_LIMIT {
            self.flush();
        }
    }

    fn flush(&mut self) {
        if let Some(cache) = &mut self.cache {
            if cache.is_empty() {
                return;
            }

            if self.log_to_console {
                _ = io::stdout().lock().write_all(cache.as_bytes());
            }

            for writer in self.writers.iter_mut().flatten() {
                _ = writer.write_all(cache.as_bytes());
                _ = writer.flush();
            }
            cache.clear();
        }
    }
}

/// Logger
///
/// Supports up to 8 writers next to the console, e.g. a file, an in-memory capture, an external tool, etc
pub struct Logger {
    state: Mutex<LoggerState>,
    max_log_level: AtomicU8,
}

impl Logger {
    pub const fn new() -> Self {
        Self::with_max_level(LogLevel::Debug)
    }

    pub const fn with_max_level(level: LogLevel) -> Self {
        Self {
            state: parking_lot::const_mutex(LoggerState::new()),
            max_log_level: AtomicU8::new(level as u8),
        }
    }

    /// Set the maximum log level (severe == lowest, debug == highest)
    pub fn set_max_level(&self, level: LogLevel) {
        self.max_log_level.store(level as u8, atomic::Ordering::Relaxed)
    }

    /// Get the maximum log level
    pub fn max_level(&self) -> LogLevel {
        LogLevel::from_u8(self.max_log_level.load(atomic::Ordering::Relaxed))
    }

    /// Check if messages at the given level would be logged
    pub fn is_enabled(&self, level: LogLevel) -> bool {
        level as u8 <= self.max_log_level.load(atomic::Ordering::Relaxed)
    }

    /// Set whether the logger should flush after each write
    pub fn set_always_flush(&self, always_flush: bool) {
        self.state.lock().always_flush = always_flush;
    }

    /// Set whether the logger should log it's output to console
    pub fn set_log_to_console(&self, log_to_console: bool) {
        let mut state = self.state.lock();

        // Make sure to flush first, cause all messages before wanted/didn't want to be log to be written to console
        state.flush();
        state.log_to_console = log_to_console;
    }

    /// Add a writer.
    ///
    /// Returns `Ok(index)` if space was available. This index can be used to remove the writer later on.
    ///
    /// Otherwise returns an `Err` with the provided writer
    pub fn add_writer(&self, writer: LogWriter) -> Result<usize, LogWriter> {
        let mut state = self.state.lock();

        let empty = state.writers.iter_mut().enumerate().find(|val| val.1.is_none());
        match empty {
            Some((id, slot)) => {
                *slot = Some(writer);
                Ok(id)
            },
            None => Err(writer),
        }
    }

    /// Remove a writer from the logger, pending messages are flushed to it first
    pub fn remove_writer(&self, index: usize) -> Option<LogWriter> {
        let mut state = self.state.lock();
        state.flush();
        state.writers.get_mut(index)?.take()
    }

    /// Log a message
    pub fn log(&self, category: LogCategory, level: LogLevel, loc: LogLocation, text: &str) {
        self.log_fmt(category, level, loc, format_args!("{text}"));
    }

    /// Log a formatted message
    pub fn log_fmt(&self, category: LogCategory, level: LogLevel, loc: LogLocation, format: Arguments) {
        if self.is_enabled(level) {
            let loc_formatter = LogLocationFormatter::new(&loc, level);
            let timestamp = loc.timestamp();
            let mut state = self.state.lock();
            state.format_message(format_args!("\x1B[38m{timestamp}\x1B[0m {level} [{category}] {loc_formatter}: "));
            state.format_message(format);
            state.write_message("\n");
        }
    }

    pub fn flush(&self) {
        self.state.lock().flush()
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        self.flush();
    }
}

//------------------------------------------------------------------------------------------------------------------------------

#[macro_export]
macro_rules! log {
    ($category:expr, $level:expr, $func:expr, $($arg:tt)+) => {
        {
            let logger = $crate::get_logger();
            if logger.is_enabled($level) {
                logger.log_fmt($category, $level, $crate::log_location!($func), format_args!($($arg)+));
            }
        }
    };
}

#[macro_export]
macro_rules! log_severe {
    ($category:expr, $func:expr, $($arg:tt)+) => {
        $crate::log!($category, $crate::LogLevel::Severe, $func, $($arg)+)
    };
}

#[macro_export]
macro_rules! log_error {
    ($category:expr, $func:expr, $($arg:tt)+) => {
        $crate::log!($category, $crate::LogLevel::Error, $func, $($arg)+)
    };
}

#[macro_export]
macro_rules! log_warning {
    ($category:expr, $($arg:tt)+) => {
        {
            let logger = $crate::get_logger();
            if logger.is_enabled($crate::LogLevel::Warning) {
                logger.log_fmt($category, $crate::LogLevel::Warning, $crate::log_location!(), format_args!($($arg)+));
            }
        }
    };
}

#[macro_export]
macro_rules! log_info {
    ($category:expr, $($arg:tt)+) => {
        {
            let logger = $crate::get_logger();
            if logger.is_enabled($crate::LogLevel::Info) {
                logger.log_fmt($category, $crate::LogLevel::Info, $crate::log_location!(), format_args!($($arg)+));
            }
        }
    };
}

#[macro_export]
macro_rules! log_verbose {
    ($category:expr, $($arg:tt)+) => {
        {
            let logger = $crate::get_logger();
            if logger.is_enabled($crate::LogLevel::Verbose) {
                logger.log_fmt($category, $crate::LogLevel::Verbose, $crate::log_location!(), format_args!($($arg)+));
            }
        }
    };
}

#[macro_export]
macro_rules! log_debug {
    ($category:expr, $func:expr, $($arg:tt)+) => {
        $crate::log!($category, $crate::LogLevel::Debug, $func, $($arg)+)
    };
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    const CAT : LogCategory = LogCategory::new("Test");

    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl Write for Capture {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Capture {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock()).into_owned()
        }
    }

    fn capturing_logger(level: LogLevel) -> (Logger, Capture) {
        let logger = Logger::with_max_level(level);
        logger.set_log_to_console(false);
        logger.set_always_flush(true);
        let capture = Capture::default();
        assert!(logger.add_writer(Box::new(capture.clone())).is_ok());
        (logger, capture)
    }

    #[test]
    fn category_display() {
        assert_eq!(LogCategory::new("Memory").to_string(), "Memory");
        assert_eq!(LogCategory::new_with_sub("Memory", "Buffer").to_string(), "Memory(Buffer)");
    }

    #[test]
    fn level_filtering() {
        let (logger, capture) = capturing_logger(LogLevel::Info);
        assert!(logger.is_enabled(LogLevel::Severe));
        assert!(logger.is_enabled(LogLevel::Info));
        assert!(!logger.is_enabled(LogLevel::Verbose));

        logger.log(CAT, LogLevel::Info, log_location!(), "shown");
        logger.log(CAT, LogLevel::Debug, log_location!(level_filtering), "hidden");

        let out = capture.contents();
        assert!(out.contains("[Test]"));
        assert!(out.contains("shown\n"));
        assert!(!out.contains("hidden"));

        logger.set_max_level(LogLevel::Debug);
        assert_eq!(logger.max_level(), LogLevel::Debug);
        logger.log_fmt(CAT, LogLevel::Debug, log_location!(level_filtering), format_args!("value {}", 42));
        let out = capture.contents();
        assert!(out.contains("value 42"));
        assert!(out.contains("level_filtering"));
    }

    #[test]
    fn cached_until_flush() {
        let logger = Logger::new();
        logger.set_log_to_console(false);
        let capture = Capture::default();
        let idx = logger.add_writer(Box::new(capture.clone())).ok().unwrap();

        logger.log(CAT, LogLevel::Warning, log_location!(), "pending");
        assert!(capture.contents().is_empty());

        logger.flush();
        assert!(capture.contents().contains("pending"));

        assert!(logger.remove_writer(idx).is_some());
        assert!(logger.remove_writer(idx).is_none());
    }

    #[test]
    fn writer_slots_are_limited() {
        let logger = Logger::new();
        for _ in 0..LoggerState::MAX_WRITERS {
            assert!(logger.add_writer(Box::new(io::sink())).is_ok());
        }
        assert!(logger.add_writer(Box::new(io::sink())).is_err());
    }

    #[test]
    fn default_logger_is_quiet() {
        assert!(!DEFAULT_LOGGER.is_enabled(LogLevel::Info));
        assert!(DEFAULT_LOGGER.is_enabled(LogLevel::Warning));
    }
}
