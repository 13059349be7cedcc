//! dilution-core - UI-agnostic calculator session + row sinks.

pub mod error;
pub mod session;
pub mod storage;

pub use error::{DilutionError, Result};
pub use session::{Field, FormInput, Metric, Session, SinkOutcome, Submission};
pub use storage::{CsvSink, RowSink, SheetsConfig, SheetsSink, SnapshotRow};

pub use dilution_engine::engine::{DilutionResult, EngineError};
