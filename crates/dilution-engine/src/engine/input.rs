use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// Fund size plus the first round the investor took part in.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoundOneInput {
    pub fund_size: f64,
    pub your_investment: f64,
    pub total_raised_round1: f64,
    pub pre_money_round1: f64,
}

/// A later raise that dilutes the round one stake.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoundTwoInput {
    pub include_round_two: bool,
    pub new_raise: f64,
    pub pre_money_round2: f64,
}

impl RoundOneInput {
    /// Check that every amount is finite and non-negative.
    pub fn validate(&self) -> Result<()> {
        check_amount("fund size", self.fund_size)?;
        check_amount("your investment", self.your_investment)?;
        check_amount("total raised in round 1", self.total_raised_round1)?;
        check_amount("pre-money valuation round 1", self.pre_money_round1)
    }
}

impl RoundTwoInput {
    /// Round two only takes part in the calculation when it is included
    /// and both of its amounts are positive.
    pub fn is_active(&self) -> bool {
        self.include_round_two && self.new_raise > 0.0 && self.pre_money_round2 > 0.0
    }

    pub fn validate(&self) -> Result<()> {
        check_amount("new funds raised in round 2", self.new_raise)?;
        check_amount("pre-money valuation round 2", self.pre_money_round2)
    }
}

fn check_amount(field: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(EngineError::InvalidInput { field, value })
    }
}
