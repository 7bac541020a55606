//! solver module
//!
//! the relaxation kernel, the multi-grid bootstrap that drives it
//! across refinement levels, and the capacitance integrals and
//! orchestrating field solver built on top of them

pub mod capacitance;
pub mod field_solver;
pub mod multigrid;
pub mod relaxation;

pub use field_solver::{FieldSolver, SolvedField};
pub use multigrid::grid_ladder;
