//! top-level field solve: runs the bias-potential solve across the
//! multi-grid ladder, derives the undepleted ("pinched") region, runs
//! the weighting-potential solve with that region excluded from the
//! ordinary stencil, and exports both fields' gradients and the
//! resulting capacitance. Grounded on `mjd_fieldgen.c`'s `main()`, which
//! sequences exactly these steps around the shared relaxation loop.

use crate::constants::{
    DEFAULT_MAX_ITERATIONS, E_OVER_EPSILON, FIELD_CONVERGENCE_THRESHOLD, MAX_ITERATIONS_REFINEMENT_FACTOR,
    WP_CONVERGENCE_THRESHOLD,
};
use crate::error::{SiggenError, SiggenResult};
use crate::field::{Grid2, VectorGrid2};
use crate::geometry::{Geometry, ImpurityProfile};
use crate::grid::{GridDims, GridLevel, SolveKind};
use crate::solver::capacitance::{self, Capacitance};
use crate::solver::multigrid::{grid_ladder, iteration_cap, prolongate};
use crate::solver::relaxation::{sweep, SpaceCharge};
use crate::utils::extent::Extent;
use crate::verbosity::{tell_normal, Verbosity};

/// everything the rest of the crate needs from a completed field solve
pub struct SolvedField {
    pub dims: GridDims,
    pub bias_potential: Grid2<f64>,
    pub weighting_potential: Grid2<f64>,
    pub e_field: VectorGrid2,
    pub wp_field: VectorGrid2,
    /// 1.0 where the bias solve found the cell undepleted, 0.0 otherwise,
    /// resampled to `dims` (the finest level)
    pub undepleted: Grid2<f64>,
    /// the coarsest ladder level's own dims and undepleted map, exactly
    /// as detected there — this is what the exported diagnostic map
    /// should be built from, matching the original's `istep == 0` gate
    pub coarsest_dims: GridDims,
    pub coarsest_undepleted: Grid2<f64>,
    pub capacitance: Capacitance,
}

/// drives the bias and weighting-potential solves for one detector
pub struct FieldSolver {
    pub geometry: Geometry,
    pub impurity: ImpurityProfile,
    pub v_bias: f64,
    pub target_grid: f64,
    pub verbosity: Verbosity,
    pub max_iterations: u64,
}

impl FieldSolver {
    pub fn new(geometry: Geometry, impurity: ImpurityProfile, v_bias: f64, target_grid: f64) -> FieldSolver {
        FieldSolver {
            geometry,
            impurity,
            v_bias,
            target_grid,
            verbosity: Verbosity::default(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    pub fn solve(&self) -> SiggenResult<SolvedField> {
        let ladder = grid_ladder(self.geometry.xtal_length, self.geometry.xtal_radius, self.target_grid);

        let bias_solve = SolveKind::Bias { v_bias: self.v_bias };
        let (bias_level, bias_coarsest, bias_stats) = self.run_ladder(&ladder, bias_solve, None)?;
        tell_normal!(
            self.verbosity,
            "bias solve converged: max_diff={:.3e} after {} sweeps",
            bias_stats.0,
            bias_stats.1
        );

        // matches `mjd_fieldgen.c`'s `if (istep == 0)` gate: the
        // undepleted region is detected once, from the coarsest grid's
        // converged bias potential, not re-derived at every refinement
        let undepleted_coarse = detect_undepleted(&bias_coarsest);
        let undepleted_coarse_dims = bias_coarsest.dims;
        let undepleted = resample_undepleted(&undepleted_coarse, undepleted_coarse_dims, bias_level.dims);
        let fully_depleted = undepleted.iter().all(|&v| v < 0.5);

        let weighting_solve = SolveKind::Weighting;
        let (mut wp_level, _wp_coarsest, wp_stats) =
            self.run_ladder(&ladder, weighting_solve, Some((&undepleted_coarse, undepleted_coarse_dims)))?;
        tell_normal!(
            self.verbosity,
            "weighting solve converged: max_diff={:.3e} after {} sweeps",
            wp_stats.0,
            wp_stats.1
        );
        let undepleted_finest = resample_undepleted(&undepleted_coarse, undepleted_coarse_dims, wp_level.dims);
        pin_undepleted(&mut wp_level, &undepleted_finest);

        let e_field = gradient(bias_level.potential.current(), &bias_level.dims, true);
        let wp_field = gradient(wp_level.potential.current(), &wp_level.dims, false);
        let cap = capacitance::integrate(&wp_field, &wp_level.dims, fully_depleted);

        Ok(SolvedField {
            dims: bias_level.dims,
            bias_potential: bias_level.potential.current().clone(),
            weighting_potential: wp_level.potential.current().clone(),
            e_field,
            wp_field,
            undepleted,
            coarsest_dims: undepleted_coarse_dims,
            coarsest_undepleted: undepleted_coarse,
            capacitance: cap,
        })
    }

    /// runs the relaxation loop across every level of `ladder`, seeding
    /// each finer level from the previous level's converged potential.
    /// returns the finest level's `GridLevel`, the coarsest level's
    /// `GridLevel`, and (max_diff, sweep count) from the finest level.
    fn run_ladder(
        &self,
        ladder: &[f64],
        solve: SolveKind,
        undepleted: Option<(&Grid2<f64>, GridDims)>,
    ) -> SiggenResult<(GridLevel, GridLevel, (f64, u64))> {
        let threshold = match solve {
            SolveKind::Bias { .. } => FIELD_CONVERGENCE_THRESHOLD,
            SolveKind::Weighting => WP_CONVERGENCE_THRESHOLD,
        };

        let mut previous: Option<(GridLevel, f64)> = None;
        let mut coarsest: Option<GridLevel> = None;
        let mut last_stats = (0.0_f64, 0u64);

        for (index, &grid) in ladder.iter().enumerate() {
            let dims = GridDims::new(&self.geometry, grid);
            let mut level = GridLevel::build(&self.geometry, dims, solve);

            if let Some((prev_level, prev_grid)) = &previous {
                let prev_dims = GridDims::new(&self.geometry, *prev_grid);
                let seeded = prolongate(prev_level.potential.current(), prev_dims, dims);
                // fixed cells must keep their pinned value regardless of
                // what the coarser level's interpolation produced there
                for z in 0..=dims.l {
                    for r in 0..=dims.r {
                        if !level.classification.get(z, r).is_fixed() {
                            level.potential.current_mut()[(z, r)] = seeded[(z, r)];
                        }
                    }
                }
                level.potential.sync();
            }

            if let (SolveKind::Weighting, Some((undepleted, undepleted_dims))) = (solve, undepleted) {
                let resampled = resample_undepleted(undepleted, undepleted_dims, dims);
                apply_undepleted(&mut level, &resampled, dims);
            }

            let density = match solve {
                SolveKind::Bias { .. } => Some(net_density_grid(&self.geometry, &self.impurity, &dims)),
                SolveKind::Weighting => None,
            };
            let e_over_eps_h2 = E_OVER_EPSILON * dims.grid * dims.grid;
            let space_charge = match &density {
                Some(net_density) => SpaceCharge::Density { net_density, e_over_eps_h2 },
                None => SpaceCharge::None,
            };

            let cap = iteration_cap(self.max_iterations, index, MAX_ITERATIONS_REFINEMENT_FACTOR);
            let mut iterations = 0u64;
            let mut stats = sweep(&mut level, &space_charge, solve);
            iterations += 1;
            while stats.max_diff > threshold && iterations < cap {
                stats = sweep(&mut level, &space_charge, solve);
                iterations += 1;
            }

            let is_finest = index == ladder.len() - 1;
            if is_finest && stats.max_diff > threshold {
                return Err(SiggenError::Nonconvergence {
                    tolerance: threshold,
                    iterations,
                    reached: stats.max_diff,
                });
            }

            last_stats = (stats.max_diff, iterations);
            if index == 0 {
                coarsest = Some(level.clone());
            }
            previous = Some((level, grid));
        }

        let (level, _) = previous.expect("grid_ladder always returns at least one level");
        let coarsest = coarsest.expect("grid_ladder always returns at least one level");
        Ok((level, coarsest, last_stats))
    }
}

/// marks cells of a converged bias-potential level as undepleted: the
/// local field magnitude there is too weak for charge to have been
/// swept out, so the cell is excluded from the weighting-potential
/// stencil and folded into the pinched-region average instead
fn detect_undepleted(level: &GridLevel) -> Grid2<f64> {
    let dims = level.dims;
    let field = gradient(level.potential.current(), &dims, true);
    let mut flags = Grid2::new(Extent::new(dims.l + 1, dims.r + 1));

    const UNDEPLETED_FIELD_THRESHOLD: f64 = 1e-3; // volts/mm

    for z in 0..=dims.l {
        for r in 0..=dims.r {
            if level.classification.get(z, r).is_fixed() {
                continue;
            }
            if field.at(z, r).length() < UNDEPLETED_FIELD_THRESHOLD {
                flags[(z, r)] = 1.0;
            }
        }
    }
    flags
}

/// nearest-neighbor resamples a categorical undepleted map from
/// `from_dims`'s resolution onto `to_dims`'s; every ladder level's grid
/// spacing is an integer multiple of the next, so this is exact at the
/// coarse level's own cells and a block expansion everywhere else
fn resample_undepleted(undepleted: &Grid2<f64>, from_dims: GridDims, to_dims: GridDims) -> Grid2<f64> {
    if from_dims == to_dims {
        return undepleted.clone();
    }

    let mut out = Grid2::new(Extent::new(to_dims.l + 1, to_dims.r + 1));
    let scale = to_dims.grid / from_dims.grid;
    for z in 0..=to_dims.l {
        let fz = ((z as f64 * scale).round() as usize).min(from_dims.l);
        for r in 0..=to_dims.r {
            let fr = ((r as f64 * scale).round() as usize).min(from_dims.r);
            out[(z, r)] = undepleted[(fz, fr)];
        }
    }
    out
}

fn apply_undepleted(level: &mut GridLevel, undepleted: &Grid2<f64>, dims: GridDims) {
    for z in 0..=dims.l {
        for r in 0..=dims.r {
            if undepleted[(z, r)] > 0.5 {
                level.classification.mark_pinched(z, r);
            }
        }
    }
}

fn pin_undepleted(level: &mut GridLevel, undepleted: &Grid2<f64>) {
    let dims = level.dims;
    apply_undepleted(level, undepleted, dims);
}

/// net impurity density sampled onto a grid level, `n0 + gradient * z`,
/// in the same 1e10 cm^-3 units as `ImpurityProfile`
fn net_density_grid(_geom: &Geometry, impurity: &ImpurityProfile, dims: &GridDims) -> Grid2<f64> {
    let mut density = Grid2::new(Extent::new(dims.l + 1, dims.r + 1));
    for z in 0..=dims.l {
        let z_mm = z as f64 * dims.grid;
        let n = impurity.n0 + impurity.gradient * z_mm;
        for r in 0..=dims.r {
            density[(z, r)] = n;
        }
    }
    density
}

/// `-grad(potential)` by central differences in the interior and
/// one-sided differences at the domain boundary; `negate` selects
/// whether the caller wants `-grad` (electric field) or `grad` (the
/// weighting-field gradient, used unsigned in the capacitance integral)
fn gradient(potential: &Grid2<f64>, dims: &GridDims, negate: bool) -> VectorGrid2 {
    let mut out = VectorGrid2::new(Extent::new(dims.l + 1, dims.r + 1));
    let h = dims.grid;
    let sign = if negate { -1.0 } else { 1.0 };

    for z in 0..=dims.l {
        for r in 0..=dims.r {
            let dz = if z == 0 {
                (potential[(1, r)] - potential[(0, r)]) / h
            } else if z == dims.l {
                (potential[(z, r)] - potential[(z - 1, r)]) / h
            } else {
                (potential[(z + 1, r)] - potential[(z - 1, r)]) / (2.0 * h)
            };

            let dr = if r == 0 {
                (potential[(z, 1)] - potential[(z, 0)]) / h
            } else if r == dims.r {
                (potential[(z, r)] - potential[(z, r - 1)]) / h
            } else {
                (potential[(z, r + 1)] - potential[(z, r - 1)]) / (2.0 * h)
            };

            out.set(z, r, crate::utils::vector2::Vector2::new(sign * dz, sign * dr));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geom() -> Geometry {
        Geometry {
            xtal_length: 20.0,
            xtal_radius: 20.0,
            top_bullet_radius: 0.0,
            bottom_bullet_radius: 0.0,
            pc_length: 2.0,
            pc_radius: 2.0,
            taper_length: 0.0,
            wrap_around_radius: 0.0,
            ditch_depth: 0.0,
            ditch_thickness: 0.0,
            li_thickness: 0.0,
        }
    }

    #[test]
    fn solve_produces_monotonic_bias_potential_along_axis() {
        let impurity = ImpurityProfile::new(-1.0, 0.0);
        let solver = FieldSolver::new(geom(), impurity, 2000.0, 1.0);
        let solved = solver.solve().expect("bias/weighting solve should converge");

        // the point contact (r=0, z=0) is held near 0 and the outer
        // surface near v_bias; the potential along the axis should not
        // decrease as z increases
        let mut prev = solved.bias_potential[(0, 0)];
        for z in 1..=solved.dims.l {
            let v = solved.bias_potential[(z, 0)];
            assert!(v >= prev - 1e-6);
            prev = v;
        }
    }

    #[test]
    fn weighting_potential_is_one_at_point_contact_and_zero_at_outer_surface() {
        let impurity = ImpurityProfile::new(-1.0, 0.0);
        let solver = FieldSolver::new(geom(), impurity, 2000.0, 1.0);
        let solved = solver.solve().expect("solve should converge");
        assert!((solved.weighting_potential[(0, 0)] - 1.0).abs() < 1e-6);
        assert!(solved.weighting_potential[(solved.dims.l, 10)].abs() < 1e-6);
    }

    #[test]
    fn capacitance_is_positive() {
        let impurity = ImpurityProfile::new(-1.0, 0.0);
        let solver = FieldSolver::new(geom(), impurity, 2000.0, 1.0);
        let solved = solver.solve().expect("solve should converge");
        assert!(solved.capacitance.volume_integral > 0.0);
        assert!(solved.capacitance.surface_integral.expect("this geometry should be fully depleted") > 0.0);
    }
}
