//! grid module
//!
//! describes the cylindrically symmetric (z, r) lattice at a given
//! refinement level: per-cell classification, permittivity, space-charge
//! fraction, and the double-buffered potential the relaxation kernel
//! updates in place.

pub mod classify;
pub mod dims;
pub mod level;

pub use classify::{vfraction, CellClassification, CellKind, SolveKind};
pub use dims::GridDims;
pub use level::{GridLevel, PotentialBuffer};
