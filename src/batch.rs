//! Non-interactive mode: calculate once, print, exit.

use clap::ValueEnum;
use dilution_core::{Session, Submission};
use serde_json::json;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

pub const EXIT_OK: i32 = 0;
pub const EXIT_CALCULATION_FAILED: i32 = 1;
pub const EXIT_NOT_RECORDED: i32 = 2;

/// Submit the form once and print the outcome. Returns the exit code.
pub fn run(session: &mut Session, format: OutputFormat, setup_errors: &[String]) -> i32 {
    let submission = session.submit();
    match format {
        OutputFormat::Text => {
            let (out, err) = render_text(submission, setup_errors);
            print!("{}", out);
            eprint!("{}", err);
        }
        OutputFormat::Json => {
            let value = render_json(submission, setup_errors);
            println!(
                "{}",
                serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string())
            );
        }
    }
    exit_code(submission, setup_errors)
}

/// Engine failures win over ledger failures.
pub fn exit_code(submission: &Submission, setup_errors: &[String]) -> i32 {
    if submission.result.is_err() {
        EXIT_CALCULATION_FAILED
    } else if !setup_errors.is_empty() || !submission.is_complete() {
        EXIT_NOT_RECORDED
    } else {
        EXIT_OK
    }
}

/// Returns `(stdout, stderr)` text.
pub fn render_text(submission: &Submission, setup_errors: &[String]) -> (String, String) {
    let mut out = String::new();
    let mut err = String::new();

    match &submission.result {
        Ok(_) => {
            let metrics = submission.metrics();
            let width = metrics.iter().map(|m| m.label.len()).max().unwrap_or(0);
            for metric in metrics {
                out.push_str(&format!("{:<width$}  {}\n", metric.label, metric.value));
            }
        }
        Err(e) => err.push_str(&format!("Error: {}\n", e)),
    }

    for setup in setup_errors {
        err.push_str(&format!("Error: {}\n", setup));
    }
    for outcome in &submission.persisted {
        match &outcome.outcome {
            Ok(()) => err.push_str(&format!("Results logged to {}\n", outcome.sink)),
            Err(e) => err.push_str(&format!("Error: {}\n", e)),
        }
    }
    (out, err)
}

pub fn render_json(submission: &Submission, setup_errors: &[String]) -> serde_json::Value {
    let persisted: Vec<_> = submission
        .persisted
        .iter()
        .map(|outcome| match &outcome.outcome {
            Ok(()) => json!({ "sink": outcome.sink, "ok": true }),
            Err(e) => json!({ "sink": outcome.sink, "ok": false, "error": e.to_string() }),
        })
        .collect();

    match &submission.result {
        Ok(result) => json!({
            "input": submission.form,
            "result": result,
            "metrics": submission.metrics(),
            "persisted": persisted,
            "setup_errors": setup_errors,
        }),
        Err(e) => json!({
            "input": submission.form,
            "error": e.to_string(),
            "setup_errors": setup_errors,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dilution_core::{DilutionError, RowSink, SnapshotRow};

    struct Unreachable;

    impl RowSink for Unreachable {
        fn name(&self) -> String {
            "sheet".to_string()
        }

        fn append_row(&mut self, _row: &SnapshotRow) -> dilution_core::Result<()> {
            Err(DilutionError::ResourceAccessFailure {
                resource: "spreadsheet 'Deals'".to_string(),
                message: "not found".to_string(),
            })
        }
    }

    #[test]
    fn test_render_text_lists_metrics() {
        let mut session = Session::default();
        let submission = session.submit();
        let (out, err) = render_text(submission, &[]);
        assert!(out.contains("Initial Ownership"));
        assert!(out.contains("0.2439%"));
        assert!(out.contains("$852,800,000"));
        assert!(err.is_empty());
        assert_eq!(exit_code(submission, &[]), EXIT_OK);
    }

    #[test]
    fn test_render_text_engine_error() {
        let mut session = Session::default();
        session.form.pre_money_round1 = 0.0;
        session.form.total_raised_round1 = 0.0;
        let submission = session.submit();
        let (out, err) = render_text(submission, &[]);
        assert!(out.is_empty());
        assert!(err.contains("post-money valuation for round 1"));
        assert_eq!(exit_code(submission, &[]), EXIT_CALCULATION_FAILED);
    }

    #[test]
    fn test_sink_failure_still_prints_results() {
        let mut session = Session::default();
        session.add_sink(Box::new(Unreachable));
        let submission = session.submit();
        let (out, err) = render_text(submission, &[]);
        assert!(out.contains("Ownership After Dilution"));
        assert!(err.contains("Cannot access spreadsheet 'Deals': not found"));
        assert_eq!(exit_code(submission, &[]), EXIT_NOT_RECORDED);
    }

    #[test]
    fn test_setup_errors_change_exit_code() {
        let mut session = Session::default();
        let submission = session.submit();
        let setup = vec!["no access token".to_string()];
        assert_eq!(exit_code(submission, &setup), EXIT_NOT_RECORDED);
    }

    #[test]
    fn test_render_json_without_round_two() {
        let mut session = Session::default();
        session.form.include_round_two = false;
        let submission = session.submit();
        let value = render_json(submission, &[]);
        assert_eq!(value["result"]["post_money_round1"], json!(20_500_000.0));
        assert!(value["result"].get("round_two").is_none());
        assert_eq!(value["input"]["include_round_two"], json!(false));
        assert_eq!(value["metrics"].as_array().unwrap().len(), 2);
    }
}
