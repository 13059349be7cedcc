//! Error types for the dilution engine.

use std::fmt;

use thiserror::Error;

/// An intermediate or output amount the engine computes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Quantity {
    /// `pre_money_round1 + total_raised_round1`
    PostMoneyRound1,
    /// `pre_money_round2 + new_raise`
    PostMoneyRound2,
    /// `your_investment / post_money_round1`
    OwnershipRound1,
    /// Diluted ownership when round two applies, round one ownership otherwise.
    EffectiveOwnership,
    /// `fund_size / effective ownership`
    TargetValuation,
    /// `ownership_round1 * new_raise`
    ProRataInvestment,
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Quantity::PostMoneyRound1 => "post-money valuation for round 1",
            Quantity::PostMoneyRound2 => "post-money valuation for round 2",
            Quantity::OwnershipRound1 => "ownership after round 1",
            Quantity::EffectiveOwnership => "ownership used for the target valuation",
            Quantity::TargetValuation => "target valuation",
            Quantity::ProRataInvestment => "pro-rata investment",
        };
        f.write_str(name)
    }
}

/// Errors raised while computing a dilution result.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("Division by zero: {quantity} is zero")]
    DivisionByZero { quantity: Quantity },

    #[error("Overflow: {quantity} is too large to represent")]
    Overflow { quantity: Quantity },

    #[error("Invalid input for {field}: {value} (must be a finite amount >= 0)")]
    InvalidInput { field: &'static str, value: f64 },
}

pub type Result<T> = std::result::Result<T, EngineError>;
