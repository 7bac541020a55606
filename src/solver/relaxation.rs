//! one weighted-mean relaxation sweep over a grid level's potential:
//! the cylindrical five-point stencil, the space-charge source term,
//! and the pinched-region running average used by the weighting-
//! potential solve. Grounded on the inner `for (z...) for (r...)`
//! relaxation loop of `mjd_fieldgen.c`, including its `s1(r)`/`s2(r)`
//! radial weights and its undershoot clamp.

use crate::grid::{CellKind, GridLevel, SolveKind};

/// radial weighting factors for the cylindrical Laplacian stencil:
/// `s1` multiplies the outward neighbor, `s2` the inward one. At r=0
/// the stencil collapses to the on-axis form (4 equal neighbors).
fn s1(r: usize) -> f64 {
    if r == 0 {
        2.0
    } else {
        1.0 + 0.5 / r as f64
    }
}

fn s2(r: usize) -> f64 {
    if r == 0 {
        0.0
    } else {
        1.0 - 0.5 / r as f64
    }
}

/// outcome of one relaxation sweep
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepStats {
    /// largest absolute change seen at any updated cell
    pub max_diff: f64,
    /// sum of absolute changes over all updated cells
    pub sum_diff: f64,
}

/// space-charge contribution at (z, r), after the bias sign flip has
/// already been folded into the net-impurity grid the caller supplies;
/// zero for the weighting-potential solve, which carries no source term
pub enum SpaceCharge<'a> {
    None,
    Density {
        /// net impurity density ( x 1e10 cm^-3 ) sampled per cell, same
        /// (z, r) layout as the potential grid
        net_density: &'a crate::field::Grid2<f64>,
        /// `e / epsilon` prefactor already scaled for grid spacing
        e_over_eps_h2: f64,
    },
}

/// runs one full sweep over `level`, updating `level.potential` in
/// place and returning convergence statistics. `solve` selects whether
/// a bias voltage ceiling (bubble formation) is enforced.
pub fn sweep(level: &mut GridLevel, space_charge: &SpaceCharge, solve: SolveKind) -> SweepStats {
    let extent = level.dims;
    let l = extent.l;
    let r_max = extent.r;

    let mut max_diff = 0.0_f64;
    let mut sum_diff = 0.0_f64;

    let mut pinched_sum = 0.0_f64;
    let mut pinched_count = 0usize;

    for z in 0..=l {
        for r in 0..=r_max {
            let kind = level.classification.get(z, r);
            if kind.is_fixed() {
                continue;
            }

            let new_v = stencil_value(level, z, r, kind, space_charge);
            let old_v = level.potential.previous()[(z, r)];
            let diff = (new_v - old_v).abs();
            max_diff = max_diff.max(diff);
            sum_diff += diff;

            let clamped = clamp_for_solve(new_v, solve);
            level.potential.current_mut()[(z, r)] = clamped;

            if matches!(kind, CellKind::Pinched) {
                pinched_sum += clamped;
                pinched_count += 1;
            }
        }
    }

    // pinched cells (tracked only during the weighting-potential solve)
    // are all pulled to the mean of the region rather than relaxed
    // individually: the undepleted bulk carries no field, so every
    // pinched cell shares one potential
    if pinched_count > 0 {
        let mean = pinched_sum / pinched_count as f64;
        for z in 0..=l {
            for r in 0..=r_max {
                if matches!(level.classification.get(z, r), CellKind::Pinched) {
                    level.potential.current_mut()[(z, r)] = mean;
                }
            }
        }
    }

    level.potential.swap();
    level.potential.sync();

    SweepStats { max_diff, sum_diff }
}

fn clamp_for_solve(v: f64, solve: SolveKind) -> f64 {
    match solve {
        SolveKind::Bias { v_bias } => {
            // undershoot past zero or overshoot past the bias voltage is
            // unphysical for a mid-sweep Jacobi update; clamp to the
            // admissible range rather than let the sweep diverge
            if v_bias >= 0.0 {
                v.clamp(0.0, v_bias.max(0.0))
            } else {
                v.clamp(v_bias, 0.0)
            }
        }
        SolveKind::Weighting => v.clamp(0.0, 1.0),
    }
}

fn stencil_value(level: &GridLevel, z: usize, r: usize, kind: CellKind, space_charge: &SpaceCharge) -> f64 {
    let buf = level.potential.previous();
    let l = level.dims.l;
    let r_max = level.dims.r;

    // neighbor potentials, reflecting at the domain boundary rather than
    // reading out of range; true boundary cells are classified Fixed and
    // never reach this function, so this only guards interior corners
    let v_zm = if z == 0 { buf[(z + 1, r)] } else { buf[(z - 1, r)] };
    let v_zp = if z == l { buf[(z - 1, r)] } else { buf[(z + 1, r)] };
    let v_rm = if r == 0 { buf[(z, r + 1)] } else { buf[(z, r - 1)] };
    let v_rp = if r == r_max { buf[(z, r - 1)] } else { buf[(z, r + 1)] };

    // face-averaged permittivity relative to the bulk value, normalized
    // so a uniform-dielectric crystal reproduces the plain s1/s2 weights;
    // only deviates from 1 at a vacuum-ditch boundary
    let eps0 = level.permittivity[(z, r)];
    let face_eps = |zn: usize, rn: usize| -> f64 { 0.5 * (eps0 + level.permittivity[(zn, rn)]) / eps0 };
    let eps_zm = face_eps(if z == 0 { z + 1 } else { z - 1 }, r);
    let eps_zp = face_eps(if z == l { z - 1 } else { z + 1 }, r);
    let eps_rm = face_eps(z, if r == 0 { r + 1 } else { r - 1 });
    let eps_rp = face_eps(z, if r == r_max { r - 1 } else { r + 1 });

    let (w_rp, w_rm) = (s1(r) * eps_rp, s2(r) * eps_rm);

    let (weighted, weight_sum) = match kind {
        CellKind::Bulk | CellKind::Pinched => (
            eps_zm * v_zm + eps_zp * v_zp + w_rp * v_rp + w_rm * v_rm,
            eps_zm + eps_zp + w_rp + w_rm,
        ),
        CellKind::EdgeR(d) => {
            // the contact surface sits a fraction `d` of a cell beyond
            // this grid point along r; replace the outward neighbor term
            // with a 1/d-weighted pull toward the (zero) contact value
            let w_edge = 1.0 / (0.5 + d);
            (eps_zm * v_zm + eps_zp * v_zp + w_rm * v_rm, eps_zm + eps_zp + w_rm + w_edge)
        }
        CellKind::EdgeZ(d) => {
            let w_edge = 1.0 / (0.5 + d);
            (eps_zm * v_zm + w_rp * v_rp + w_rm * v_rm, eps_zm + w_rp + w_rm + w_edge)
        }
        CellKind::EdgeCorner(d_rc, d_lc) => {
            let w_edge_r = 1.0 / (0.5 + d_rc);
            let w_edge_z = 1.0 / (0.5 + d_lc);
            (eps_zm * v_zm + w_rm * v_rm, eps_zm + w_rm + w_edge_r + w_edge_z)
        }
        CellKind::FixedContact(_) => unreachable!("fixed cells are skipped before reaching the stencil"),
    };

    let mut v = weighted / weight_sum;

    if let SpaceCharge::Density { net_density, e_over_eps_h2 } = space_charge {
        let vf = level.vfraction[(z, r)];
        v += vf * net_density[(z, r)] * e_over_eps_h2 / weight_sum;
    }

    v
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Grid2;
    use crate::geometry::Geometry;
    use crate::grid::GridDims;

    fn geom() -> Geometry {
        Geometry {
            xtal_length: 10.0,
            xtal_radius: 10.0,
            top_bullet_radius: 0.0,
            bottom_bullet_radius: 0.0,
            pc_length: 1.0,
            pc_radius: 1.0,
            taper_length: 0.0,
            wrap_around_radius: 0.0,
            ditch_depth: 0.0,
            ditch_thickness: 0.0,
            li_thickness: 0.0,
        }
    }

    #[test]
    fn sweep_reduces_max_diff_on_laplace_problem() {
        let geom = geom();
        let dims = GridDims::new(&geom, 1.0);
        let solve = SolveKind::Bias { v_bias: 100.0 };
        let mut level = GridLevel::build(&geom, dims, solve);

        let first = sweep(&mut level, &SpaceCharge::None, solve);
        let mut last = first;
        for _ in 0..200 {
            last = sweep(&mut level, &SpaceCharge::None, solve);
        }
        assert!(last.max_diff <= first.max_diff);
    }

    #[test]
    fn bias_solve_stays_within_bounds() {
        let geom = geom();
        let dims = GridDims::new(&geom, 1.0);
        let solve = SolveKind::Bias { v_bias: 100.0 };
        let mut level = GridLevel::build(&geom, dims, solve);
        for _ in 0..50 {
            sweep(&mut level, &SpaceCharge::None, solve);
        }
        for v in level.potential.current().iter() {
            assert!(*v >= -1e-9 && *v <= 100.0 + 1e-9);
        }
    }

    #[test]
    fn weighting_solve_stays_within_zero_one() {
        let geom = geom();
        let dims = GridDims::new(&geom, 1.0);
        let mut level = GridLevel::build(&geom, dims, SolveKind::Weighting);
        for _ in 0..50 {
            sweep(&mut level, &SpaceCharge::None, SolveKind::Weighting);
        }
        for v in level.potential.current().iter() {
            assert!(*v >= -1e-9 && *v <= 1.0 + 1e-9);
        }
    }

    #[test]
    fn space_charge_term_shifts_interior_potential() {
        let geom = geom();
        let dims = GridDims::new(&geom, 1.0);
        let solve = SolveKind::Bias { v_bias: 0.0 };
        let mut level_plain = GridLevel::build(&geom, dims, solve);
        let mut level_charged = GridLevel::build(&geom, dims, solve);

        let mut density = Grid2::new(level_charged.potential.current().extent());
        density.fill(1.0);
        let charge = SpaceCharge::Density {
            net_density: &density,
            e_over_eps_h2: 1.0,
        };

        for _ in 0..20 {
            sweep(&mut level_plain, &SpaceCharge::None, solve);
            sweep(&mut level_charged, &charge, solve);
        }

        let mid = (dims.l / 2, dims.r / 2);
        assert!(level_charged.potential.current()[mid] > level_plain.potential.current()[mid]);
    }
}
