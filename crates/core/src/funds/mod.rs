pub mod fund_model;

pub use fund_model::*;
