use log::{Level, LevelFilter, Log, Metadata, Record};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// `log` backend writing to stderr and, optionally, a file
pub struct Logger {
    severity: Level,
    file: Option<Mutex<File>>,
    enable_colors: bool,
}

impl Logger {
    pub fn new(severity: Level, file_path: Option<PathBuf>, enable_colors: bool) -> Self {
        let file = file_path.and_then(|path| {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            OpenOptions::new().create(true).append(true).open(path).ok().map(Mutex::new)
        });

        Logger { severity, file, enable_colors }
    }

    /// Install the logger, configured from the environment.
    ///
    /// `TINYWIKI_LOG` (or `RUST_LOG`) picks the level, `TINYWIKI_LOG_FILE`
    /// names a file to append to, `NO_COLOR` turns off ANSI colours.
    pub fn init() -> Result<(), log::SetLoggerError> {
        let severity = std::env::var("TINYWIKI_LOG")
            .or_else(|_| std::env::var("RUST_LOG"))
            .ok()
            .and_then(|level| level.parse::<Level>().ok())
            .unwrap_or(Level::Info);
        let file_path = std::env::var_os("TINYWIKI_LOG_FILE").map(PathBuf::from);
        let enable_colors = std::env::var_os("NO_COLOR").is_none();

        let logger = Logger::new(severity, file_path, enable_colors);
        log::set_max_level(LevelFilter::Trace);
        log::set_logger(Box::leak(Box::new(logger)))
    }

    fn timestamp() -> String {
        OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .unwrap_or_else(|_| String::from("-"))
    }

    fn color(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1b[31m",
            Level::Warn => "\x1b[33m",
            Level::Info => "\x1b[36m",
            Level::Debug => "\x1b[35m",
            Level::Trace => "\x1b[37m",
        }
    }

    fn format_line(&self, timestamp: &str, record: &Record, colored: bool) -> String {
        let level = record.level();
        if colored {
            format!("{}[{timestamp}] {level:<5}\x1b[0m {}\n", Self::color(level), record.args())
        } else {
            format!("[{timestamp}] {level:<5} {}\n", record.args())
        }
    }
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.severity
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let timestamp = Self::timestamp();
        let line = self.format_line(&timestamp, record, self.enable_colors);
        let _ = std::io::stderr().write_all(line.as_bytes());

        // File output never carries colours
        if let Some(file) = &self.file {
            if let Ok(mut file) = file.lock() {
                let _ = file.write_all(self.format_line(&timestamp, record, false).as_bytes());
            }
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
        if let Some(file) = &self.file {
            if let Ok(mut file) = file.lock() {
                let _ = file.flush();
            }
        }
    }
}


/// Global logger that records messages so tests can inspect what was logged
#[cfg(test)]
pub(crate) mod capture {
    use std::sync::{Mutex, Once};

    use log::{Level, LevelFilter, Log, Metadata, Record};

    struct CaptureLogger {
        records: Mutex<Vec<(Level, String)>>,
    }

    impl Log for CaptureLogger {
        fn enabled(&self, _metadata: &Metadata) -> bool {
            true
        }

        fn log(&self, record: &Record) {
            if let Ok(mut records) = self.records.lock() {
                records.push((record.level(), record.args().to_string()));
            }
        }

        fn flush(&self) {}
    }

    static LOGGER: CaptureLogger = CaptureLogger { records: Mutex::new(Vec::new()) };
    static INSTALL: Once = Once::new();

    pub(crate) fn install() {
        INSTALL.call_once(|| {
            let _ = log::set_logger(&LOGGER);
            log::set_max_level(LevelFilter::Trace);
        });
    }

    /// Error-level messages containing `needle`
    pub(crate) fn errors_mentioning(needle: &str) -> usize {
        let records = LOGGER.records.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        records
            .iter()
            .filter(|(level, message)| *level == Level::Error && message.contains(needle))
            .count()
    }
}
