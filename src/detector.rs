//! top-level orchestrator: owns the solved field, the velocity table,
//! and the reusable scratch buffers `get_signal` needs, and exposes the
//! `get_signal`/`drift_path_*` interface. Grounded on
//! `signal_calc_init`/`get_signal` in `calc_signal.c`, reworked from
//! file-scope static scratch arrays into state owned by this struct so
//! multiple detectors can be simulated side by side.

use crate::config::Config;
use crate::constants::{DIFFUSION_COEF_E, DIFFUSION_COEF_H, ELECTRON_CHARGE, HOLE_CHARGE, REF_TEMP_K};
use crate::drift::{drift, DriftOutcome, DriftParams, FieldSample, TrajectoryPoint};
use crate::error::{SiggenError, SiggenResult};
use crate::field::Grid2;
use crate::geometry::{collects_to_point_contact, Geometry, ImpurityProfile, Point3, Vector3};
use crate::solver::{FieldSolver, SolvedField};
use crate::utils::vector2::Vector2;
use crate::velocity::VelocityLookup;
use crate::verbosity::Verbosity;

/// wraps a solved field plus a velocity table as the `FieldSample`
/// collaborator the drift integrator consumes, bridging the solver's
/// (z, r) grid samples back into lab-frame vectors
struct DetectorField<'a> {
    geometry: &'a Geometry,
    solved: &'a SolvedField,
    velocities: &'a VelocityLookup,
}

impl<'a> DetectorField<'a> {
    fn sample_grid(&self, grid: &Grid2<f64>, pt: Point3) -> SiggenResult<f64> {
        let cyl = pt.to_cyl();
        let dims = &self.solved.dims;
        let fz = cyl.z / dims.grid;
        let fr = cyl.r / dims.grid;
        if fz < 0.0 || fr < 0.0 || fz > dims.l as f64 || fr > dims.r as f64 {
            return Err(SiggenError::OutsideDetector);
        }
        let z0 = (fz.floor() as usize).min(dims.l);
        let r0 = (fr.floor() as usize).min(dims.r);
        let z1 = (z0 + 1).min(dims.l);
        let r1 = (r0 + 1).min(dims.r);
        let tz = fz - z0 as f64;
        let tr = fr - r0 as f64;

        let v00 = grid[(z0, r0)];
        let v01 = grid[(z0, r1)];
        let v10 = grid[(z1, r0)];
        let v11 = grid[(z1, r1)];
        let v0 = v00 * (1.0 - tr) + v01 * tr;
        let v1 = v10 * (1.0 - tr) + v11 * tr;
        Ok(v0 * (1.0 - tz) + v1 * tz)
    }

    fn sample_vector(&self, field: &crate::field::VectorGrid2, pt: Point3) -> SiggenResult<Vector2> {
        let z = self.sample_grid(&field.z, pt)?;
        let r = self.sample_grid(&field.r, pt)?;
        Ok(Vector2::new(z, r))
    }
}

impl<'a> FieldSample for DetectorField<'a> {
    fn drift_velocity(&self, pt: Point3, q: f64) -> SiggenResult<Vector3> {
        if self.geometry.outside_detector(pt) {
            return Err(SiggenError::OutsideDetector);
        }
        let e_sample = self.sample_vector(&self.solved.e_field, pt)?;
        let cyl = pt.to_cyl();
        let v_plane = self.velocities.drift_velocity(cyl, q, e_sample)?;
        Ok(Vector3::from_cyl(v_plane, pt.phi()))
    }

    fn wpotential(&self, pt: Point3) -> SiggenResult<f64> {
        self.sample_grid(&self.solved.weighting_potential, pt)
    }
}

/// result of `get_signal`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalStatus {
    Outside,
    Ok,
    HoleFailed,
}

/// owns the solved field, velocity table, and reusable trajectory
/// buffers for one detector
pub struct Detector {
    geometry: Geometry,
    impurity: ImpurityProfile,
    config: Config,
    solved: SolvedField,
    velocities: VelocityLookup,
    verbosity: Verbosity,

    trajectory_e: Vec<TrajectoryPoint>,
    trajectory_h: Vec<TrajectoryPoint>,
    signal_e: Vec<f64>,
    signal_h: Vec<f64>,
}

impl Detector {
    /// `signal_calc_init`: solves the field, loads the velocity table,
    /// and allocates the reusable scratch buffers
    pub fn new(config: Config, velocities: VelocityLookup) -> SiggenResult<Detector> {
        let solver = FieldSolver::new(config.geometry, config.impurity, config.v_bias, config.grid);
        let solved = solver.solve()?;

        let t_calc = config.t_calc_steps;
        Ok(Detector {
            geometry: config.geometry,
            impurity: config.impurity,
            config,
            solved,
            velocities,
            verbosity: Verbosity::default(),
            trajectory_e: Vec::with_capacity(t_calc),
            trajectory_h: Vec::with_capacity(t_calc),
            signal_e: vec![0.0; t_calc],
            signal_h: vec![0.0; t_calc],
        })
    }

    pub fn set_verbosity(&mut self, v: Verbosity) {
        self.verbosity = v;
    }

    fn diffusion_coef(&self, base: f64) -> f64 {
        base * self.config.dt_calc_ns * REF_TEMP_K / self.config.xtal_temp
    }

    /// `get_signal(pt, out)`: validates containment, drifts both
    /// carriers, and writes the downsampled, RC-shaped waveform into
    /// `out`. Returns the status the original interface reports as
    /// `{-1, +1, -1}`.
    pub fn get_signal(&mut self, pt: Point3, out: &mut Vec<f64>) -> SignalStatus {
        if self.geometry.outside_detector(pt) {
            return SignalStatus::Outside;
        }

        let field = DetectorField {
            geometry: &self.geometry,
            solved: &self.solved,
            velocities: &self.velocities,
        };

        let t_calc = self.config.t_calc_steps;
        let dt = self.config.dt_calc_ns;

        let electron_collects = collects_to_point_contact(ELECTRON_CHARGE, &self.impurity);
        let electron_params = DriftParams {
            dt,
            max_steps: t_calc,
            charge_sign: ELECTRON_CHARGE,
            collects_to_pc: electron_collects,
            cloud_size: self.config.cloud_size,
            diffusion_coef: self.diffusion_coef(DIFFUSION_COEF_E),
            trapping_hook: None,
        };
        let electron_outcome = drift(&field, pt, &electron_params, &mut self.signal_e, &mut self.trajectory_e);
        if electron_outcome.is_err() {
            // tolerated: the signal is still emitted with holes only
            self.signal_e.iter_mut().for_each(|s| *s = 0.0);
        }

        let hole_collects = collects_to_point_contact(HOLE_CHARGE, &self.impurity);
        let hole_params = DriftParams {
            dt,
            max_steps: t_calc,
            charge_sign: HOLE_CHARGE,
            collects_to_pc: hole_collects,
            cloud_size: self.config.cloud_size,
            diffusion_coef: self.diffusion_coef(DIFFUSION_COEF_H),
            trapping_hook: None,
        };
        let hole_outcome = drift(&field, pt, &hole_params, &mut self.signal_h, &mut self.trajectory_h);
        let (sigma2_final, speed_final) = match hole_outcome {
            Ok(DriftOutcome::Collected { sigma2_final, speed_final, .. }) => (sigma2_final, speed_final),
            Ok(DriftOutcome::TimedOut { .. }) | Err(_) => return SignalStatus::HoleFailed,
        };

        let mut combined: Vec<f64> = self
            .signal_e
            .iter()
            .zip(self.signal_h.iter())
            .map(|(e, h)| e + h)
            .collect();

        crate::signal::accumulate_charge(&mut combined);
        crate::signal::diffuse(&mut combined, dt, sigma2_final.sqrt(), speed_final);

        let comp_f = (self.config.dt_out_ns / self.config.dt_calc_ns).round().max(1.0) as usize;
        let mut downsampled = crate::signal::downsample(&combined, comp_f);

        let tau = self.config.preamp_tau_ns / self.config.dt_out_ns;
        if tau >= 0.1 {
            crate::signal::rc_integrate_in_place(&mut downsampled, tau);
        }

        *out = downsampled;
        SignalStatus::Ok
    }

    pub fn drift_path_e(&self) -> &[TrajectoryPoint] {
        &self.trajectory_e
    }

    pub fn drift_path_h(&self) -> &[TrajectoryPoint] {
        &self.trajectory_h
    }

    pub fn solved_field(&self) -> &SolvedField {
        &self.solved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        let mut cfg = Config::default();
        cfg.geometry.xtal_length = 20.0;
        cfg.geometry.xtal_radius = 20.0;
        cfg.geometry.pc_length = 2.0;
        cfg.geometry.pc_radius = 2.0;
        cfg.impurity = ImpurityProfile::new(-1.0, 0.0);
        cfg.v_bias = 2000.0;
        cfg.grid = 1.0;
        cfg.t_calc_steps = 200;
        cfg.dt_calc_ns = 1.0;
        cfg.dt_out_ns = 1.0;
        cfg.preamp_tau_ns = 0.0;
        cfg
    }

    fn velocities() -> VelocityLookup {
        VelocityLookup::new(vec![
            crate::velocity::VelocityRow { e_field: 0.0, v_e: 0.0, v_h: 0.0 },
            crate::velocity::VelocityRow { e_field: 5000.0, v_e: 0.08, v_h: 0.06 },
        ])
        .unwrap()
    }

    #[test]
    fn get_signal_rejects_points_outside_detector() {
        let mut det = Detector::new(config(), velocities()).expect("solve should converge");
        let mut out = Vec::new();
        let status = det.get_signal(Point3::new(100.0, 0.0, 5.0), &mut out);
        assert_eq!(status, SignalStatus::Outside);
        assert!(out.is_empty());
    }

    #[test]
    fn get_signal_on_axis_produces_a_waveform() {
        let mut det = Detector::new(config(), velocities()).expect("solve should converge");
        let mut out = Vec::new();
        let status = det.get_signal(Point3::new(0.0, 0.0, 10.0), &mut out);
        assert_eq!(status, SignalStatus::Ok);
        assert!(!out.is_empty());
    }
}
