use dilution_engine::engine::DilutionResult;
use dilution_engine::format::{format_currency, format_percent};
use serde::Serialize;

/// A labelled, formatted figure ready for display.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Metric {
    pub label: String,
    pub value: String,
}

impl Metric {
    fn new(label: impl Into<String>, value: String) -> Self {
        Metric {
            label: label.into(),
            value,
        }
    }
}

/// The figures shown after a calculation, in display order.
///
/// Round two figures only appear when round two was applied.
pub fn metrics(fund_size: f64, result: &DilutionResult) -> Vec<Metric> {
    let mut out = vec![Metric::new(
        "Initial Ownership",
        format_percent(result.ownership_round1, 4),
    )];

    if let Some(round_two) = result.round_two {
        out.push(Metric::new(
            "Ownership After Dilution",
            format_percent(round_two.diluted_ownership, 4),
        ));
        out.push(Metric::new(
            "Ownership Decrease",
            format!("{:.2}%", round_two.ownership_loss_percent),
        ));
    }

    out.push(Metric::new(
        format!(
            "Company Value Needed to Return Entire Fund ({})",
            format_currency(fund_size, 0)
        ),
        format_currency(result.target_valuation, 0),
    ));

    if let Some(round_two) = result.round_two {
        out.push(Metric::new(
            "Pro-Rata Investment in Round 2",
            format_currency(round_two.pro_rata_investment, 2),
        ));
    }
    out
}
