pub mod transaction_model;

pub use transaction_model::*;
