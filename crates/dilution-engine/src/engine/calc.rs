//! Closed-form dilution arithmetic.
//!
//! Each operation is a pure function. Every division is guarded so that a
//! zero denominator surfaces as [`EngineError::DivisionByZero`], and every
//! sum or quotient that leaves the `f64` range surfaces as
//! [`EngineError::Overflow`]. Neither `NaN` nor `inf` reaches the result.

use super::input::{RoundOneInput, RoundTwoInput};
use super::result::{DilutionResult, RoundOneOwnership, RoundTwoDilution, RoundTwoOutcome};
use crate::error::{EngineError, Quantity, Result};

fn finite(value: f64, quantity: Quantity) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(EngineError::Overflow { quantity })
    }
}

/// `numerator / denominator`, where `over` names the denominator and `into`
/// names the quotient.
fn divide(numerator: f64, denominator: f64, over: Quantity, into: Quantity) -> Result<f64> {
    if denominator == 0.0 {
        return Err(EngineError::DivisionByZero { quantity: over });
    }
    finite(numerator / denominator, into)
}

/// Post-money valuation and the investor's share of it after round one.
pub fn compute_ownership(input: &RoundOneInput) -> Result<RoundOneOwnership> {
    let post_money_round1 = finite(
        input.pre_money_round1 + input.total_raised_round1,
        Quantity::PostMoneyRound1,
    )?;
    let ownership_round1 = divide(
        input.your_investment,
        post_money_round1,
        Quantity::PostMoneyRound1,
        Quantity::OwnershipRound1,
    )?;
    Ok(RoundOneOwnership {
        post_money_round1,
        ownership_round1,
    })
}

/// Ownership left after round two issues new shares.
///
/// Callers are expected to check [`RoundTwoInput::is_active`] first;
/// this function applies the formulas unconditionally.
pub fn compute_dilution(ownership_round1: f64, round2: &RoundTwoInput) -> Result<RoundTwoDilution> {
    let post_money_round2 = finite(
        round2.pre_money_round2 + round2.new_raise,
        Quantity::PostMoneyRound2,
    )?;
    let retained = divide(
        round2.pre_money_round2,
        post_money_round2,
        Quantity::PostMoneyRound2,
        Quantity::PostMoneyRound2,
    )?;
    let diluted_ownership = ownership_round1 * retained;
    let kept = divide(
        diluted_ownership,
        ownership_round1,
        Quantity::OwnershipRound1,
        Quantity::OwnershipRound1,
    )?;
    let ownership_loss_percent = (1.0 - kept) * 100.0;
    Ok(RoundTwoDilution {
        post_money_round2,
        diluted_ownership,
        ownership_loss_percent,
    })
}

/// Company value at exit at which `effective_ownership` is worth the whole fund.
pub fn compute_target_valuation(fund_size: f64, effective_ownership: f64) -> Result<f64> {
    divide(
        fund_size,
        effective_ownership,
        Quantity::EffectiveOwnership,
        Quantity::TargetValuation,
    )
}

/// Amount needed in round two to keep the round one ownership.
pub fn compute_pro_rata_investment(ownership_round1: f64, new_raise: f64) -> f64 {
    ownership_round1 * new_raise
}

/// Run the full calculation for one submission.
///
/// Round two is skipped entirely unless it is active, in which case the
/// target valuation is derived from round one ownership.
pub fn calculate(round1: &RoundOneInput, round2: Option<&RoundTwoInput>) -> Result<DilutionResult> {
    round1.validate()?;
    if let Some(round2) = round2.filter(|r| r.include_round_two) {
        round2.validate()?;
    }

    let RoundOneOwnership {
        post_money_round1,
        ownership_round1,
    } = compute_ownership(round1)?;

    let active = round2.filter(|r| r.is_active());
    let dilution = match active {
        Some(round2) => Some(compute_dilution(ownership_round1, round2)?),
        None => None,
    };

    let effective_ownership = dilution
        .map(|d| d.diluted_ownership)
        .unwrap_or(ownership_round1);
    let target_valuation = compute_target_valuation(round1.fund_size, effective_ownership)?;

    let round_two = match active.zip(dilution) {
        Some((round2, dilution)) => Some(RoundTwoOutcome {
            post_money_round2: dilution.post_money_round2,
            diluted_ownership: dilution.diluted_ownership,
            ownership_loss_percent: dilution.ownership_loss_percent,
            pro_rata_investment: finite(
                compute_pro_rata_investment(ownership_round1, round2.new_raise),
                Quantity::ProRataInvestment,
            )?,
        }),
        None => None,
    };

    Ok(DilutionResult {
        post_money_round1,
        ownership_round1,
        round_two,
        target_valuation,
    })
}
