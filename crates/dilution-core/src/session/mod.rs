//! Calculator session state and logic (UI-agnostic).

mod form;
mod report;
mod state;

pub use form::{Field, FormInput};
pub use report::{Metric, metrics};
pub use state::{Session, SinkOutcome, Submission};
