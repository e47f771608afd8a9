//! Logging backend for the `log` facade.
//!
//! Every record is written to stderr as `[HH:MM:SS.mmm] [LEVEL] message` and,
//! when a log directory is configured, appended to a per-invocation file
//! `<dir>/<YYYYmmdd_HHMMSS>_submit.log`. Stdout stays free for the job id.

use chrono::Local;
use log::{LevelFilter, Log, Metadata, Record};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// `log::Log` implementation writing to stderr and an optional session file.
pub struct LogCollector {
    level: LevelFilter,
    session: Option<(PathBuf, Mutex<File>)>,
}

impl LogCollector {
    /// Create a collector. With `log_dir`, the directory is created and a fresh
    /// session file opened inside it.
    pub fn new(log_dir: Option<&Path>, level: LevelFilter) -> Result<Self, String> {
        let session = match log_dir {
            Some(dir) => {
                std::fs::create_dir_all(dir)
                    .map_err(|e| format!("Failed to create logs directory: {}", e))?;
                let path = session_log_path(dir);
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(&path)
                    .map_err(|e| format!("Failed to open log file {}: {}", path.display(), e))?;
                Some((path, Mutex::new(file)))
            }
            None => None,
        };
        Ok(LogCollector { level, session })
    }

    /// Path of the session log file, if one is being written.
    pub fn log_path(&self) -> Option<&Path> {
        self.session.as_ref().map(|(path, _)| path.as_path())
    }

    pub fn level(&self) -> LevelFilter {
        self.level
    }

    /// Register as the global logger.
    pub fn install(self) -> Result<(), String> {
        let level = self.level;
        log::set_boxed_logger(Box::new(self))
            .map(|()| log::set_max_level(level))
            .map_err(|e| format!("Failed to set global logger: {}", e))
    }
}

/// `[HH:MM:SS.mmm] [LEVEL] message`
pub fn format_line(level: log::Level, message: &str) -> String {
    format!(
        "[{}] [{}] {}",
        Local::now().format("%H:%M:%S%.3f"),
        level,
        message
    )
}

fn session_log_path(dir: &Path) -> PathBuf {
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    dir.join(format!("{}_submit.log", timestamp))
}

impl Log for LogCollector {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format_line(record.level(), &record.args().to_string());
        eprintln!("{}", line);

        if let Some((_, file)) = &self.session {
            if let Ok(mut file) = file.lock() {
                let _ = writeln!(file, "{}", line);
            }
        }
    }

    fn flush(&self) {
        if let Some((_, file)) = &self.session {
            if let Ok(mut file) = file.lock() {
                let _ = file.flush();
            }
        }
    }
}
