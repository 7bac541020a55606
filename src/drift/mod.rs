//! single-carrier drift-trajectory integration: advances a charge
//! through the drift-velocity field, accumulates its Ramo-induced
//! current against the weighting potential, tracks diffusion spread,
//! and extends a short tail phase once the carrier leaves the field
//! grid. Grounded on `make_signal` in `calc_signal.c`.

use crate::error::{SiggenError, SiggenResult};
use crate::geometry::{CylPoint, Point3, Vector3};
use crate::utils::vector2::Vector2;

/// one sampled point along a carrier's path, for diagnostic export
/// (`drift_path_e`/`drift_path_h`)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrajectoryPoint {
    pub point: Point3,
    pub time_step: usize,
}

/// how far a drift integration got and whether the carrier collected
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DriftOutcome {
    /// reached the collecting contact (pinch-off guard or tail smear)
    Collected { steps: usize, sigma2_final: f64, speed_final: f64 },
    /// ran out of the configured time budget before collecting
    TimedOut { sigma2_final: f64, speed_final: f64 },
}

/// everything the field module needs to expose for one drift step:
/// the local drift velocity (mm/ns, lab frame) and weighting potential
pub trait FieldSample {
    /// `Err` when `pt` has left the tabulated field grid
    fn drift_velocity(&self, pt: Point3, q: f64) -> SiggenResult<Vector3>;
    /// `Err` when `pt` has left the tabulated weighting-potential grid
    fn wpotential(&self, pt: Point3) -> SiggenResult<f64>;
}

/// optional per-step carrier-charge modifier: given the step displacement
/// and the carrier's current charge, returns its charge after trapping.
/// The original project carries a disabled `charge_trapping(dx, q)` hook
/// of this shape that this crate keeps available without committing to a
/// trapping model.
pub type TrappingHook<'a> = &'a dyn Fn(Vector3, f64) -> f64;

/// fixed parameters for one drift integration
pub struct DriftParams<'a> {
    pub dt: f64,
    pub max_steps: usize,
    pub charge_sign: f64,
    pub collects_to_pc: bool,
    pub cloud_size: f64,
    pub diffusion_coef: f64,
    pub trapping_hook: Option<TrappingHook<'a>>,
}

const PINCH_OFF_WP_THRESHOLD: f64 = 0.999;
const PINCH_OFF_DW_THRESHOLD: f64 = 2.0e-4;

/// drifts one carrier from `p0`, writing its Ramo current contribution
/// into `signal[0..]` (induced current per step, not yet accumulated to
/// charge) and its visited points into `trajectory`. Returns how the
/// drift ended.
pub fn drift<F: FieldSample>(
    field: &F,
    p0: Point3,
    params: &DriftParams,
    signal: &mut [f64],
    trajectory: &mut Vec<TrajectoryPoint>,
) -> SiggenResult<DriftOutcome> {
    trajectory.clear();
    let t_calc = params.max_steps;
    for s in signal.iter_mut() {
        *s = 0.0;
    }

    let mut p = p0;
    let mut w_prev = field.wpotential(p)?;
    let mut sigma2 = params.cloud_size * params.cloud_size;
    let mut speed_prev = 0.0_f64;
    let mut last_velocity = Vector3::new(0.0, 0.0, 0.0);
    let mut charge = params.charge_sign;

    for t in 0..t_calc.saturating_sub(1) {
        let v = match field.drift_velocity(p, params.charge_sign) {
            Ok(v) => v,
            Err(_) => {
                return tail_phase(field, p, last_velocity, w_prev, params, signal, t, sigma2, charge);
            }
        };
        trajectory.push(TrajectoryPoint { point: p, time_step: t });

        let speed = v.length();
        if t == 1 {
            speed_prev = speed;
        } else if t >= 2 && speed_prev > 0.0 {
            sigma2 = sigma2 * (speed / speed_prev).powi(2) + params.diffusion_coef;
            speed_prev = speed;
        }

        let w = field.wpotential(p)?;
        let dw = w - w_prev;
        let step = v * params.dt;
        if let Some(hook) = params.trapping_hook {
            charge = hook(step, charge);
        }
        if t > 0 {
            signal[t] += charge * dw;
        }

        let pinched_off = w >= PINCH_OFF_WP_THRESHOLD && dw.abs() < PINCH_OFF_DW_THRESHOLD;

        last_velocity = v;
        p = p + step;
        w_prev = w;

        if pinched_off {
            return Ok(DriftOutcome::Collected { steps: t + 1, sigma2_final: sigma2, speed_final: speed });
        }
    }

    Ok(DriftOutcome::TimedOut { sigma2_final: sigma2, speed_final: speed_prev })
}

/// extends the trajectory along the last known velocity after the
/// carrier exits the tabulated field grid, smearing the weighting
/// potential linearly to its asymptote (1 if this carrier collects to
/// the point contact, 0 otherwise) over the remaining step budget
fn tail_phase<F: FieldSample>(
    field: &F,
    mut p: Point3,
    velocity: Vector3,
    w_start: f64,
    params: &DriftParams,
    signal: &mut [f64],
    start_t: usize,
    sigma2_final: f64,
    charge: f64,
) -> SiggenResult<DriftOutcome> {
    let speed_final = velocity.length();
    let remaining = params.max_steps.saturating_sub(start_t);
    if remaining == 0 || speed_final == 0.0 {
        return Ok(DriftOutcome::TimedOut { sigma2_final, speed_final });
    }

    let asymptote = if params.collects_to_pc { 1.0 } else { 0.0 };
    let n = remaining;
    let dw = (asymptote - w_start) / n as f64;

    let mut w = w_start;
    for (i, t) in (start_t..params.max_steps).enumerate() {
        if t >= signal.len() {
            break;
        }
        w += dw;
        signal[t] += charge * dw;
        p = p + velocity * params.dt;
        let _ = p;
        if i + 1 >= n {
            break;
        }
    }

    if params.collects_to_pc {
        Ok(DriftOutcome::Collected { steps: params.max_steps, sigma2_final, speed_final })
    } else {
        Err(SiggenError::ExceededTimeSteps(params.max_steps))
    }
}

/// the charge-sign-qualified (q, impurity-sign) rule restated here so
/// the drift integrator and the orchestrator agree on which carrier
/// asymptotes its weighting potential to 1
pub fn cyl_of(p: Point3) -> CylPoint {
    p.to_cyl()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    struct LinearField {
        grid_limit: f64,
        wp_slope: f64,
        calls: RefCell<usize>,
    }

    impl FieldSample for LinearField {
        fn drift_velocity(&self, pt: Point3, q: f64) -> SiggenResult<Vector3> {
            *self.calls.borrow_mut() += 1;
            if pt.z > self.grid_limit {
                return Err(SiggenError::OutsideDetector);
            }
            let dir = if q > 0.0 { 1.0 } else { -1.0 };
            Ok(Vector3::new(0.0, 0.0, dir * 0.05))
        }

        fn wpotential(&self, pt: Point3) -> SiggenResult<f64> {
            Ok((pt.z * self.wp_slope).clamp(0.0, 1.0))
        }
    }

    #[test]
    fn hole_drifting_toward_pc_collects() {
        let field = LinearField { grid_limit: 100.0, wp_slope: -0.05, calls: RefCell::new(0) };
        let params = DriftParams {
            dt: 1.0,
            max_steps: 2000,
            charge_sign: 1.0,
            collects_to_pc: true,
            cloud_size: 0.0,
            diffusion_coef: 0.0,
            trapping_hook: None,
        };
        let mut signal = vec![0.0; params.max_steps];
        let mut traj = Vec::new();
        let outcome = drift(&field, Point3::new(0.0, 0.0, 20.0), &params, &mut signal, &mut traj);
        assert!(outcome.is_ok());
    }

    #[test]
    fn trajectory_is_recorded_until_exit_or_collection() {
        let field = LinearField { grid_limit: 100.0, wp_slope: 0.0, calls: RefCell::new(0) };
        let params = DriftParams {
            dt: 1.0,
            max_steps: 50,
            charge_sign: -1.0,
            collects_to_pc: false,
            cloud_size: 0.0,
            diffusion_coef: 0.0,
            trapping_hook: None,
        };
        let mut signal = vec![0.0; params.max_steps];
        let mut traj = Vec::new();
        let _ = drift(&field, Point3::new(0.0, 0.0, 5.0), &params, &mut signal, &mut traj);
        assert!(!traj.is_empty());
    }

    #[test]
    fn exit_from_field_grid_triggers_tail_phase_and_collects() {
        let field = LinearField { grid_limit: 10.0, wp_slope: 0.02, calls: RefCell::new(0) };
        let params = DriftParams {
            dt: 1.0,
            max_steps: 500,
            charge_sign: -1.0,
            collects_to_pc: true,
            cloud_size: 0.0,
            diffusion_coef: 0.0,
            trapping_hook: None,
        };
        let mut signal = vec![0.0; params.max_steps];
        let mut traj = Vec::new();
        let outcome = drift(&field, Point3::new(0.0, 0.0, 9.5), &params, &mut signal, &mut traj).unwrap();
        assert!(matches!(outcome, DriftOutcome::Collected { .. }));
    }
}
