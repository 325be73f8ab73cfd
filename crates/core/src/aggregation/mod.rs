pub mod aggregation_model;
pub mod aggregation_service;


pub use aggregation_model::*;
pub use aggregation_service::*;
