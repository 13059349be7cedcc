//! Dilution calculation: inputs, the closed-form operations and their results.

mod calc;
mod curve;
mod input;
mod result;

pub use calc::{
    calculate, compute_dilution, compute_ownership, compute_pro_rata_investment,
    compute_target_valuation,
};
pub use curve::{CurvePoint, MAX_CURVE_STEPS, dilution_curve};
pub use input::{RoundOneInput, RoundTwoInput};
pub use result::{DilutionResult, RoundOneOwnership, RoundTwoDilution, RoundTwoOutcome};

pub use crate::error::{EngineError, Quantity, Result};
