//! Sensitivity of the diluted stake to the size of the round two raise.

use super::calc::calculate;
use super::input::{RoundOneInput, RoundTwoInput};
use crate::error::Result;

/// Upper bound on sweep resolution.
pub const MAX_CURVE_STEPS: usize = 512;

/// One sample of the sweep.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CurvePoint {
    pub new_raise: f64,
    pub ownership: f64,
}

/// Sweep the round two raise from zero to twice the entered raise.
///
/// When the entered raise is zero the sweep runs up to the round two
/// pre-money instead. Samples where round two is inactive (the first one,
/// for instance) carry the round one ownership. `steps` is clamped to
/// `1..=MAX_CURVE_STEPS`, giving `steps + 1` points.
pub fn dilution_curve(
    round1: &RoundOneInput,
    round2: &RoundTwoInput,
    steps: usize,
) -> Result<Vec<CurvePoint>> {
    let steps = steps.clamp(1, MAX_CURVE_STEPS);
    let upper = if round2.new_raise > 0.0 {
        round2.new_raise * 2.0
    } else {
        round2.pre_money_round2
    };

    let mut points = Vec::with_capacity(steps + 1);
    for i in 0..=steps {
        let new_raise = upper * i as f64 / steps as f64;
        let sample = RoundTwoInput {
            include_round_two: true,
            new_raise,
            pre_money_round2: round2.pre_money_round2,
        };
        let result = calculate(round1, Some(&sample))?;
        points.push(CurvePoint {
            new_raise,
            ownership: result.effective_ownership(),
        });
    }
    Ok(points)
}
