//! The flat snapshot row appended to a ledger after each submission.

use dilution_engine::engine::DilutionResult;
use std::fmt;

use crate::session::FormInput;

/// Placeholder written wherever round two did not apply.
pub const NOT_APPLICABLE: &str = "N/A";

/// Column names, in row order.
pub const SNAPSHOT_HEADER: [&str; 10] = [
    "fund_size",
    "your_investment",
    "total_raised_round1",
    "pre_money_round1",
    "new_raise",
    "pre_money_round2",
    "ownership_round1",
    "diluted_ownership",
    "target_valuation",
    "pro_rata_investment",
];

/// A single cell of a snapshot row.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RowValue {
    Number(f64),
    NotApplicable,
}

impl RowValue {
    fn from_option(value: Option<f64>) -> Self {
        value.map_or(RowValue::NotApplicable, RowValue::Number)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            RowValue::Number(n) => Some(*n),
            RowValue::NotApplicable => None,
        }
    }

    /// JSON representation used by the spreadsheet API.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            RowValue::Number(n) => serde_json::Number::from_f64(*n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            RowValue::NotApplicable => serde_json::Value::String(NOT_APPLICABLE.to_string()),
        }
    }
}

impl fmt::Display for RowValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowValue::Number(n) => write!(f, "{}", n),
            RowValue::NotApplicable => f.write_str(NOT_APPLICABLE),
        }
    }
}

/// Inputs and results of one submission, in [`SNAPSHOT_HEADER`] order.
#[derive(Clone, Debug, PartialEq)]
pub struct SnapshotRow {
    pub cells: [RowValue; 10],
}

impl SnapshotRow {
    pub fn new(form: &FormInput, result: &DilutionResult) -> Self {
        // Round two inputs are recorded only when round two took part.
        let round_two_active = result.round_two.is_some();
        let round_two_input = |value: f64| {
            RowValue::from_option(round_two_active.then_some(value))
        };

        SnapshotRow {
            cells: [
                RowValue::Number(form.fund_size),
                RowValue::Number(form.your_investment),
                RowValue::Number(form.total_raised_round1),
                RowValue::Number(form.pre_money_round1),
                round_two_input(form.new_raise),
                round_two_input(form.pre_money_round2),
                RowValue::Number(result.ownership_round1),
                RowValue::from_option(result.diluted_ownership()),
                RowValue::Number(result.target_valuation),
                RowValue::from_option(result.pro_rata_investment()),
            ],
        }
    }

    /// Cell texts for text based ledgers.
    pub fn to_strings(&self) -> Vec<String> {
        self.cells.iter().map(|c| c.to_string()).collect()
    }

    pub fn to_json(&self) -> Vec<serde_json::Value> {
        self.cells.iter().map(RowValue::to_json).collect()
    }
}
