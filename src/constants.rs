//! constants module
//!
//! container for compile-time constants used by the field solver and
//! signal generator

/// (F * mm^-1) vacuum permittivity, expressed in the pF/mm units the
/// relaxation kernel and capacitance integrals work in
pub const VAC_PERM_PF_PER_MM: f64 = 8.85e-3;

/// relative permittivity of germanium
pub const EPS_GE: f64 = 16.0;

/// relative permittivity of vacuum (ditch)
pub const EPS_VACUUM: f64 = 1.0;

/// permittivity of germanium in pF/mm, as used directly in the
/// capacitance integrals (matches `Epsilon` in the original relaxation
/// code: `8.85 * 16.0 / 1000.0`)
pub const EPS_GE_PF_PER_MM: f64 = 8.85 * EPS_GE / 1000.0;

/// `e/epsilon0` prefactor (in units where grid is in mm and impurity
/// density is in 1e10 cm^-3) used to convert space charge into a
/// potential contribution per relaxation sweep
pub const E_OVER_EPSILON: f64 = 0.7072 * 4.0;

/// reference temperature (K) for drift velocity / diffusion corrections
pub const REF_TEMP_K: f64 = 77.0;

/// minimum allowed crystal temperature (K)
pub const MIN_TEMP_K: f64 = 77.0;

/// maximum allowed crystal temperature (K)
pub const MAX_TEMP_K: f64 = 110.0;

/// hole diffusion coefficient prefactor in Ge at low field, FWHM^2 (mm^2) per ns
/// at the reference temperature; see Jacoboni et al., Phys. Rev. B24 (1981) 1014
pub const DIFFUSION_COEF_H: f64 = 2.9e-4;

/// electron diffusion coefficient prefactor in Ge at low field
pub const DIFFUSION_COEF_E: f64 = 3.7e-4;

/// charge sign used for holes throughout the drift integrator
pub const HOLE_CHARGE: f64 = 1.0;

/// charge sign used for electrons throughout the drift integrator
pub const ELECTRON_CHARGE: f64 = -1.0;

/// weighting potential above which a drifting electron is considered to
/// have effectively reached a fully depleted point contact, used to
/// decide whether exceeding the time step budget is fatal
pub const WP_THRESH_ELECTRONS: f64 = 0.95;

/// SOR over-relaxation is intentionally left at 1.0 (plain weighted-mean
/// Jacobi sweep): the original `mjd_fieldgen.c` relaxation does not apply
/// an SOR acceleration factor to the cylindrical 5-point stencil itself,
/// unlike the unrelated Cartesian solver this crate was adapted from.
pub const SOR_ACCELERATION: f64 = 1.0;

/// default maximum number of relaxation iterations per grid level
pub const DEFAULT_MAX_ITERATIONS: u64 = 50_000;

/// factor by which the iteration cap is divided after the coarsest grid level
pub const MAX_ITERATIONS_REFINEMENT_FACTOR: u64 = 2;

/// convergence threshold (max|v_new - v_old|) for the bias-potential solve
pub const FIELD_CONVERGENCE_THRESHOLD: f64 = 1e-9;

/// convergence threshold (max|v_new - v_old|) for the weighting-potential solve
pub const WP_CONVERGENCE_THRESHOLD: f64 = 1e-10;

/// cell is considered "mostly bulk" (for undepleted-map purposes) above this vfraction
pub const BULK_VFRACTION_THRESHOLD: f64 = 0.45;

/// sub-pixel point-contact edge interpolation is skipped below this offset
pub const PC_EDGE_THRESHOLD: f64 = 0.05;
