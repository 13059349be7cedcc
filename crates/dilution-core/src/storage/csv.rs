//! Append-only local CSV ledger.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use super::row::{SNAPSHOT_HEADER, SnapshotRow};
use super::sink::RowSink;
use crate::error::{DilutionError, Result};

/// Appends snapshot rows to a CSV file, writing the header first when the
/// file is new or empty.
#[derive(Debug, Clone)]
pub struct CsvSink {
    path: PathBuf,
}

impl CsvSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        CsvSink { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_row(&self, row: &SnapshotRow) -> std::result::Result<(), csv::Error> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let needs_header = file.metadata()?.len() == 0;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        if needs_header {
            writer.write_record(SNAPSHOT_HEADER)?;
        }
        writer.write_record(row.to_strings())?;
        writer.flush()?;
        Ok(())
    }
}

impl RowSink for CsvSink {
    fn name(&self) -> String {
        self.path.display().to_string()
    }

    fn append_row(&mut self, row: &SnapshotRow) -> Result<()> {
        self.write_row(row)
            .map_err(|e| DilutionError::persistence(self.name(), e))?;
        log::info!("Appended snapshot row to {}", self.path.display());
        Ok(())
    }
}
