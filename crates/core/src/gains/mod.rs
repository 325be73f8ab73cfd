pub mod classifier;
pub mod gains_model;


pub use classifier::*;
pub use gains_model::*;
