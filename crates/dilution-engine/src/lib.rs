//! dilution_engine - Ownership and dilution arithmetic for a two round investment.

pub mod engine;
pub mod error;
pub mod format;
