//! error module
//!
//! typed error taxonomy for the field solver and signal generator;
//! library functions return `Result<T, SiggenError>` and callers that
//! need to add context convert to `anyhow::Error` with `?`

use thiserror::Error;

/// errors produced by configuration, field solving, and signal generation
#[derive(Debug, Error)]
pub enum SiggenError {
    /// configuration file could not be read or contained an invalid value
    #[error("config error: {0}")]
    Config(String),

    /// a working array could not be allocated
    #[error("allocation error: {0}")]
    Alloc(String),

    /// an output field/WP file could not be opened or written
    #[error("field file error: {0}")]
    FieldFile(String),

    /// relaxation hit the iteration cap without reaching its convergence
    /// threshold; carries the best-effort max-diff reached
    #[error("did not converge to tolerance {tolerance} in {iterations} iterations (reached {reached})")]
    Nonconvergence {
        tolerance: f64,
        iterations: u64,
        reached: f64,
    },

    /// `get_signal` was asked to compute a signal for a point outside the detector
    #[error("point is outside the detector")]
    OutsideDetector,

    /// the weighting-potential lookup succeeded for velocity but failed in
    /// the Ramo step, or the hole drift produced zero usable steps
    #[error("hole drift failed: {0}")]
    HoleDriftFailure(String),

    /// a trajectory did not terminate within the configured number of time
    /// steps, and the carrier required to collect could not complete
    #[error("exceeded configured time steps ({0}) before collection")]
    ExceededTimeSteps(usize),
}

pub type SiggenResult<T> = Result<T, SiggenError>;
