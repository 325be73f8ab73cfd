pub mod solver;

#[cfg(test)]
mod solver_tests;

pub use solver::*;
