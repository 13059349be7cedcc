use dilution_engine::engine::{RoundOneInput, RoundTwoInput};
use dilution_engine::format::{format_amount, parse_amount};
use serde::{Deserialize, Serialize};

use crate::error::{DilutionError, Result};

/// An editable amount on the form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Field {
    FundSize,
    YourInvestment,
    TotalRaisedRound1,
    PreMoneyRound1,
    NewRaise,
    PreMoneyRound2,
}

impl Field {
    /// All fields in form order.
    pub const ALL: [Field; 6] = [
        Field::FundSize,
        Field::YourInvestment,
        Field::TotalRaisedRound1,
        Field::PreMoneyRound1,
        Field::NewRaise,
        Field::PreMoneyRound2,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Field::FundSize => "Total fund size ($)",
            Field::YourInvestment => "Your investment ($)",
            Field::TotalRaisedRound1 => "Total raised in Round 1 ($)",
            Field::PreMoneyRound1 => "Pre-money valuation Round 1 ($)",
            Field::NewRaise => "New funds raised in Round 2 ($)",
            Field::PreMoneyRound2 => "Pre-money valuation Round 2 ($)",
        }
    }

    /// Short name used in error messages and config keys.
    pub fn key(self) -> &'static str {
        match self {
            Field::FundSize => "fund_size",
            Field::YourInvestment => "your_investment",
            Field::TotalRaisedRound1 => "total_raised_round1",
            Field::PreMoneyRound1 => "pre_money_round1",
            Field::NewRaise => "new_raise",
            Field::PreMoneyRound2 => "pre_money_round2",
        }
    }

    /// Increment used by the step keys.
    pub fn step(self) -> f64 {
        match self {
            Field::FundSize | Field::PreMoneyRound1 | Field::PreMoneyRound2 => 100_000.0,
            Field::YourInvestment | Field::TotalRaisedRound1 | Field::NewRaise => 1_000.0,
        }
    }

    pub fn is_round_two(self) -> bool {
        matches!(self, Field::NewRaise | Field::PreMoneyRound2)
    }
}

/// Raw values entered on the form.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FormInput {
    pub fund_size: f64,
    pub your_investment: f64,
    pub total_raised_round1: f64,
    pub pre_money_round1: f64,
    pub include_round_two: bool,
    pub new_raise: f64,
    pub pre_money_round2: f64,
}

impl Default for FormInput {
    fn default() -> Self {
        FormInput {
            fund_size: 2_000_000.0,
            your_investment: 50_000.0,
            total_raised_round1: 500_000.0,
            pre_money_round1: 20_000_000.0,
            include_round_two: true,
            new_raise: 2_000_000.0,
            pre_money_round2: 50_000_000.0,
        }
    }
}

impl FormInput {
    pub fn round_one(&self) -> RoundOneInput {
        RoundOneInput {
            fund_size: self.fund_size,
            your_investment: self.your_investment,
            total_raised_round1: self.total_raised_round1,
            pre_money_round1: self.pre_money_round1,
        }
    }

    pub fn round_two(&self) -> RoundTwoInput {
        RoundTwoInput {
            include_round_two: self.include_round_two,
            new_raise: self.new_raise,
            pre_money_round2: self.pre_money_round2,
        }
    }

    pub fn get(&self, field: Field) -> f64 {
        match field {
            Field::FundSize => self.fund_size,
            Field::YourInvestment => self.your_investment,
            Field::TotalRaisedRound1 => self.total_raised_round1,
            Field::PreMoneyRound1 => self.pre_money_round1,
            Field::NewRaise => self.new_raise,
            Field::PreMoneyRound2 => self.pre_money_round2,
        }
    }

    fn slot(&mut self, field: Field) -> &mut f64 {
        match field {
            Field::FundSize => &mut self.fund_size,
            Field::YourInvestment => &mut self.your_investment,
            Field::TotalRaisedRound1 => &mut self.total_raised_round1,
            Field::PreMoneyRound1 => &mut self.pre_money_round1,
            Field::NewRaise => &mut self.new_raise,
            Field::PreMoneyRound2 => &mut self.pre_money_round2,
        }
    }

    /// Display text for a field.
    pub fn text(&self, field: Field) -> String {
        format_amount(self.get(field))
    }

    /// Set a field from user text. Negative and unparseable amounts are rejected
    /// and leave the field unchanged.
    pub fn set_text(&mut self, field: Field, input: &str) -> Result<()> {
        let value = parse_amount(input)
            .filter(|v| *v >= 0.0)
            .ok_or_else(|| DilutionError::InvalidField {
                field: field.key(),
                input: input.to_string(),
            })?;
        *self.slot(field) = value;
        Ok(())
    }

    /// Move a field by `count` steps, never below zero.
    pub fn step(&mut self, field: Field, count: i32) {
        let slot = self.slot(field);
        *slot = (*slot + field.step() * count as f64).max(0.0);
    }

    pub fn toggle_round_two(&mut self) {
        self.include_round_two = !self.include_round_two;
    }
}
