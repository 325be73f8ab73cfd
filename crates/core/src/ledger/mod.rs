pub mod ledger_calculator;
pub mod ledger_model;

#[cfg(test)]
mod ledger_calculator_tests;

pub use ledger_calculator::*;
pub use ledger_model::*;
