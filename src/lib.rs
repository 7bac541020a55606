//! field and pulse-shape simulator for semi-coaxial / point-contact
//! germanium radiation detectors: a cylindrically symmetric relaxation
//! solver for the bias and weighting potentials, a drift-trajectory
//! integrator applying the Shockley-Ramo theorem, and the signal
//! post-processing chain (diffusion, downsampling, RC shaping) that
//! turns a drift trajectory into a preamp-like output waveform.

pub mod config;
pub mod constants;
pub mod detector;
pub mod drift;
pub mod error;
pub mod field;
pub mod geometry;
pub mod grid;
pub mod io;
pub mod signal;
pub mod solver;
pub mod utils;
pub mod velocity;
pub mod verbosity;

pub use config::Config;
pub use detector::{Detector, SignalStatus};
pub use error::{SiggenError, SiggenResult};
pub use geometry::{Geometry, ImpurityProfile, Point3};
pub use solver::{FieldSolver, SolvedField};
pub use velocity::VelocityLookup;
