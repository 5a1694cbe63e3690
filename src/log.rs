// src/log.rs
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::Local;

use crate::config::consts::LOG_FILE;

static LOG_PATH: Mutex<Option<PathBuf>> = Mutex::new(None);

/// Point the sink at `path`. Until this is called, lines go to `LOG_FILE`
/// (under the temp dir for unit tests).
pub fn init<P: AsRef<Path>>(path: P) {
    if let Ok(mut guard) = LOG_PATH.lock() {
        *guard = Some(path.as_ref().to_path_buf());
    }
}

/// Where lines are going right now.
pub fn path() -> PathBuf {
    LOG_PATH
        .lock()
        .ok()
        .and_then(|g| g.clone())
        .unwrap_or_else(default_path)
}

fn default_path() -> PathBuf {
    if cfg!(test) {
        std::env::temp_dir().join(LOG_FILE)
    } else {
        PathBuf::from(LOG_FILE)
    }
}

/// Delete the previous log file. A missing file is fine.
pub fn zap<P: AsRef<Path>>(path: P) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

fn format_line(level: &str, msg: &str) -> String {
    let ts = Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
    format!("{ts} [{level}] {msg}\n")
}

/// Internal logging function. Append-only; write errors are swallowed.
pub fn write_log(level: &str, msg: &str) {
    let line = format_line(level, msg);

    if let Ok(guard) = LOG_PATH.lock() {
        let path = guard.clone().unwrap_or_else(default_path);
        if let Ok(mut file) = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
        {
            let _ = file.write_all(line.as_bytes());
        }
    }
}

/// Info-level logging
#[macro_export]
macro_rules! logf {
    ($($arg:tt)*) => {
        $crate::log::write_log("INFO", &format!($($arg)*))
    };
}

/// Debug-level logging
#[macro_export]
macro_rules! logd {
    ($($arg:tt)*) => {
        $crate::log::write_log("DEBUG", &format!($($arg)*))
    };
}

/// Warn-level logging
#[macro_export]
macro_rules! logw {
    ($($arg:tt)*) => {
        $crate::log::write_log("WARN", &format!($($arg)*))
    };
}

/// Error-level logging
#[macro_export]
macro_rules! loge {
    ($($arg:tt)*) => {
        $crate::log::write_log("ERROR", &format!($($arg)*))
    };
}
