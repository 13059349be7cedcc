//! Snapshot rows and the ledgers they are appended to.

mod csv;
mod row;
mod sheets;
mod sink;

pub use csv::CsvSink;
pub use row::{NOT_APPLICABLE, RowValue, SNAPSHOT_HEADER, SnapshotRow};
pub use sheets::{
    DEFAULT_TOKEN_ENV, DEFAULT_WORKSHEET, DRIVE_API_BASE, SHEETS_API_BASE, SheetReference,
    SheetsConfig, SheetsSink,
};
pub use sink::RowSink;
