//! File-backed logger. The terminal UI owns stdout/stderr, so log records
//! go to a file when one is configured and are dropped otherwise.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use log::{LevelFilter, Log, Metadata, Record};

use crate::error::LogError;

struct FileLogger {
    level: LevelFilter,
    file: Mutex<File>,
}

impl Log for FileLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format_record(record);
        if let Ok(mut file) = self.file.lock() {
            let _ = file.write_all(line.as_bytes());
        }
    }

    fn flush(&self) {
        if let Ok(mut file) = self.file.lock() {
            let _ = file.flush();
        }
    }
}

fn format_record(record: &Record) -> String {
    format!(
        "{} {:<5} {}: {}\n",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        record.level(),
        record.target(),
        record.args()
    )
}

/// Append log records at or above `level` to `path`.
pub fn init(path: &Path, level: LevelFilter) -> Result<(), LogError> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| LogError::Open {
            path: path.display().to_string(),
            source,
        })?;
    log::set_boxed_logger(Box::new(FileLogger {
        level,
        file: Mutex::new(file),
    }))?;
    log::set_max_level(level);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_record_includes_level_and_target() {
        let line = format_record(
            &Record::builder()
                .args(format_args!("hello {}", 42))
                .level(log::Level::Warn)
                .target("dilution_core::storage")
                .build(),
        );
        assert!(line.ends_with("WARN  dilution_core::storage: hello 42\n"));
    }

    #[test]
    fn test_file_logger_filters_by_level() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dilution.log");
        let logger = FileLogger {
            level: LevelFilter::Info,
            file: Mutex::new(File::create(&path).unwrap()),
        };

        logger.log(
            &Record::builder()
                .args(format_args!("kept"))
                .level(log::Level::Info)
                .build(),
        );
        logger.log(
            &Record::builder()
                .args(format_args!("dropped"))
                .level(log::Level::Debug)
                .build(),
        );
        logger.flush();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("kept"));
        assert!(!contents.contains("dropped"));
    }
}
