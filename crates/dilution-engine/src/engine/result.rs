use serde::{Deserialize, Serialize};

/// Output of [`compute_ownership`](super::compute_ownership).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoundOneOwnership {
    pub post_money_round1: f64,
    pub ownership_round1: f64,
}

/// Output of [`compute_dilution`](super::compute_dilution).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoundTwoDilution {
    pub post_money_round2: f64,
    pub diluted_ownership: f64,
    pub ownership_loss_percent: f64,
}

/// Round two figures. Only present when round two was active.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoundTwoOutcome {
    pub post_money_round2: f64,
    pub diluted_ownership: f64,
    pub ownership_loss_percent: f64,
    pub pro_rata_investment: f64,
}

/// Everything derived from one submission of the form.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DilutionResult {
    pub post_money_round1: f64,
    pub ownership_round1: f64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub round_two: Option<RoundTwoOutcome>,
    pub target_valuation: f64,
}

impl DilutionResult {
    pub fn post_money_round2(&self) -> Option<f64> {
        self.round_two.map(|r| r.post_money_round2)
    }

    pub fn diluted_ownership(&self) -> Option<f64> {
        self.round_two.map(|r| r.diluted_ownership)
    }

    pub fn ownership_loss_percent(&self) -> Option<f64> {
        self.round_two.map(|r| r.ownership_loss_percent)
    }

    pub fn pro_rata_investment(&self) -> Option<f64> {
        self.round_two.map(|r| r.pro_rata_investment)
    }

    /// The ownership the target valuation was derived from.
    pub fn effective_ownership(&self) -> f64 {
        self.diluted_ownership().unwrap_or(self.ownership_round1)
    }
}
