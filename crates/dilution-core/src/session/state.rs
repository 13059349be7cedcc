use dilution_engine::engine::{DilutionResult, EngineError, calculate};

use super::form::FormInput;
use super::report::{Metric, metrics};
use crate::error::DilutionError;
use crate::storage::{RowSink, SnapshotRow};

/// What happened when one sink was asked to record a submission.
#[derive(Debug)]
pub struct SinkOutcome {
    pub sink: String,
    pub outcome: Result<(), DilutionError>,
}

/// The outcome of one press of "Calculate".
#[derive(Debug)]
pub struct Submission {
    /// The form values the calculation ran on.
    pub form: FormInput,
    pub result: Result<DilutionResult, EngineError>,
    /// One entry per registered sink; empty when the calculation failed.
    pub persisted: Vec<SinkOutcome>,
}

impl Submission {
    pub fn metrics(&self) -> Vec<Metric> {
        match &self.result {
            Ok(result) => metrics(self.form.fund_size, result),
            Err(_) => Vec::new(),
        }
    }

    pub fn persistence_failures(&self) -> impl Iterator<Item = &SinkOutcome> {
        self.persisted.iter().filter(|o| o.outcome.is_err())
    }

    /// True when the calculation succeeded and every sink accepted the row.
    pub fn is_complete(&self) -> bool {
        self.result.is_ok() && self.persistence_failures().next().is_none()
    }
}

/// UI-agnostic calculator state: the form, the sinks rows go to, and the
/// last submission.
pub struct Session {
    pub form: FormInput,
    sinks: Vec<Box<dyn RowSink>>,
    last: Option<Submission>,
    /// Number of submissions made so far.
    pub submissions: usize,
}

impl Session {
    /// Create a session with no sinks.
    ///
    /// This constructor is side-effect free: nothing is read or written.
    pub fn new(form: FormInput) -> Self {
        Session {
            form,
            sinks: Vec::new(),
            last: None,
            submissions: 0,
        }
    }

    pub fn add_sink(&mut self, sink: Box<dyn RowSink>) {
        self.sinks.push(sink);
    }

    pub fn sink_names(&self) -> Vec<String> {
        self.sinks.iter().map(|s| s.name()).collect()
    }

    pub fn has_sinks(&self) -> bool {
        !self.sinks.is_empty()
    }

    pub fn last(&self) -> Option<&Submission> {
        self.last.as_ref()
    }

    /// Run the calculation on the current form without recording anything.
    pub fn calculate(&self) -> Result<DilutionResult, EngineError> {
        calculate(&self.form.round_one(), Some(&self.form.round_two()))
    }

    /// Calculate, then hand the snapshot to every sink.
    ///
    /// A calculation error ends the submission before any sink is called.
    /// Sink failures are recorded per sink and leave the result intact.
    pub fn submit(&mut self) -> &Submission {
        self.submissions += 1;
        let form = self.form;
        let result = self.calculate();

        let mut persisted = Vec::new();
        match &result {
            Ok(computed) => {
                log::info!(
                    "Submission {}: ownership {:.6}, target valuation {:.0}",
                    self.submissions,
                    computed.ownership_round1,
                    computed.target_valuation
                );
                let row = SnapshotRow::new(&form, computed);
                for sink in self.sinks.iter_mut() {
                    let outcome = sink.append_row(&row);
                    if let Err(e) = &outcome {
                        log::warn!("Could not record submission: {}", e);
                    }
                    persisted.push(SinkOutcome {
                        sink: sink.name(),
                        outcome,
                    });
                }
            }
            Err(e) => log::warn!("Submission {} failed: {}", self.submissions, e),
        }

        self.last.insert(Submission {
            form,
            result,
            persisted,
        })
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(FormInput::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::storage::RowValue;
    use dilution_engine::engine::Quantity;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct SharedSink(Rc<RefCell<Vec<SnapshotRow>>>);

    impl RowSink for SharedSink {
        fn name(&self) -> String {
            "shared".to_string()
        }

        fn append_row(&mut self, row: &SnapshotRow) -> Result<()> {
            self.0.borrow_mut().push(row.clone());
            Ok(())
        }
    }

    struct FailingSink;

    impl RowSink for FailingSink {
        fn name(&self) -> String {
            "offline".to_string()
        }

        fn append_row(&mut self, _row: &SnapshotRow) -> Result<()> {
            Err(DilutionError::PersistenceFailure {
                sink: self.name(),
                message: "connection refused".to_string(),
            })
        }
    }

    #[test]
    fn test_submit_without_sinks() {
        let mut session = Session::default();
        let submission = session.submit();
        assert!(submission.result.is_ok());
        assert!(submission.persisted.is_empty());
        assert!(submission.is_complete());
        assert_eq!(submission.metrics().len(), 5);
    }

    #[test]
    fn test_submit_records_row_in_each_sink() {
        let rows = Rc::new(RefCell::new(Vec::new()));
        let mut session = Session::default();
        session.add_sink(Box::new(SharedSink(Rc::clone(&rows))));

        session.submit();
        session.form.include_round_two = false;
        session.submit();

        let rows = rows.borrow();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].cells[4], RowValue::Number(2_000_000.0));
        assert_eq!(rows[1].cells[4], RowValue::NotApplicable);
        assert_eq!(session.submissions, 2);
    }

    #[test]
    fn test_sink_failure_keeps_result() {
        let rows = Rc::new(RefCell::new(Vec::new()));
        let mut session = Session::default();
        session.add_sink(Box::new(FailingSink));
        session.add_sink(Box::new(SharedSink(Rc::clone(&rows))));

        let submission = session.submit();
        assert!(submission.result.is_ok());
        assert!(!submission.is_complete());
        assert_eq!(submission.persistence_failures().count(), 1);
        assert_eq!(submission.persisted[0].sink, "offline");
        assert!(submission.persisted[1].outcome.is_ok());
        assert_eq!(rows.borrow().len(), 1);
    }

    #[test]
    fn test_engine_error_skips_sinks() {
        let rows = Rc::new(RefCell::new(Vec::new()));
        let mut session = Session::default();
        session.add_sink(Box::new(SharedSink(Rc::clone(&rows))));
        session.form.pre_money_round1 = 0.0;
        session.form.total_raised_round1 = 0.0;

        let submission = session.submit();
        assert_eq!(
            submission.result,
            Err(EngineError::DivisionByZero {
                quantity: Quantity::PostMoneyRound1
            })
        );
        assert!(submission.persisted.is_empty());
        assert!(submission.metrics().is_empty());
        assert!(rows.borrow().is_empty());
    }

    #[test]
    fn test_last_submission_is_kept() {
        let mut session = Session::default();
        assert!(session.last().is_none());
        session.submit();
        session.form.fund_size = 1_000_000.0;
        assert_eq!(session.last().unwrap().form.fund_size, 2_000_000.0);
    }
}
