pub mod reconstructor;
pub mod valuation_model;
pub mod valuation_service;


pub use reconstructor::*;
pub use valuation_model::*;
pub use valuation_service::*;
