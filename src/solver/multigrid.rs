//! multi-grid bootstrap: picks a ladder of 1-3 grid spacings scaled to
//! the crystal size, and prolongates a converged coarse-level potential
//! into the initial guess for the next-finer level. Grounded on
//! `mjd_fieldgen.c`'s grid-ladder selection (`cs = sqrt(L*R)`) and its
//! bilinear interpolation step between grid passes.

use crate::field::Grid2;
use crate::grid::GridDims;

/// chooses the sequence of grid spacings to solve at, coarsest first,
/// ending at `target_grid`. Larger crystals get more levels so the
/// first (coarse) solve stays cheap; `target_grid` alone is used for
/// crystals small enough that a single pass is already fast.
///
/// follows the characteristic-size ladder `mjd_fieldgen.c` derives from
/// `cs = sqrt(L*R)`: `i = 1 + floor((c/grid)/100)` picks 1, 2, or 3
/// levels, and `j = ceil(i/5)` spaces the three-level case. `i` and `j`
/// are both integers, so every level is automatically an exact integer
/// multiple of the next.
pub fn grid_ladder(xtal_length: f64, xtal_radius: f64, target_grid: f64) -> Vec<f64> {
    let c = (xtal_length * xtal_radius).sqrt();
    let i = 1 + ((c / target_grid) / 100.0).floor() as i64;

    if i < 2 {
        return vec![target_grid];
    }

    if i < 6 {
        return vec![target_grid * i as f64, target_grid];
    }

    let j = (i as f64 / 5.0).ceil() as i64;
    vec![target_grid * (i * j) as f64, target_grid * j as f64, target_grid]
}

/// the iteration cap applied to a level at position `index` (0 =
/// coarsest) out of `total` levels in the ladder: every level after the
/// first starts from a good guess, so its cap is reduced
pub fn iteration_cap(default_cap: u64, index: usize, refinement_factor: u64) -> u64 {
    if index == 0 {
        default_cap
    } else {
        (default_cap / refinement_factor).max(1)
    }
}

/// bilinearly resamples `coarse` (on a `coarse_dims`-spaced grid) onto a
/// buffer shaped for `fine_dims`, used to seed the next-finer level's
/// initial guess before its own relaxation sweeps begin
pub fn prolongate(coarse: &Grid2<f64>, coarse_dims: GridDims, fine_dims: GridDims) -> Grid2<f64> {
    let fine_extent = crate::utils::extent::Extent::new(fine_dims.l + 1, fine_dims.r + 1);
    let mut fine = Grid2::new(fine_extent);

    let scale = fine_dims.grid / coarse_dims.grid;

    for z in 0..=fine_dims.l {
        for r in 0..=fine_dims.r {
            let cz = z as f64 * scale;
            let cr = r as f64 * scale;

            let z0 = (cz.floor() as usize).min(coarse_dims.l);
            let r0 = (cr.floor() as usize).min(coarse_dims.r);
            let z1 = (z0 + 1).min(coarse_dims.l);
            let r1 = (r0 + 1).min(coarse_dims.r);

            let tz = cz - z0 as f64;
            let tr = cr - r0 as f64;

            let v00 = coarse[(z0, r0)];
            let v01 = coarse[(z0, r1)];
            let v10 = coarse[(z1, r0)];
            let v11 = coarse[(z1, r1)];

            let v0 = v00 * (1.0 - tr) + v01 * tr;
            let v1 = v10 * (1.0 - tr) + v11 * tr;
            fine[(z, r)] = v0 * (1.0 - tz) + v1 * tz;
        }
    }

    fine
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Geometry;

    #[test]
    fn small_crystal_gets_one_level() {
        let ladder = grid_ladder(10.0, 10.0, 0.5);
        assert_eq!(ladder.len(), 1);
        assert_eq!(ladder[0], 0.5);
    }

    #[test]
    fn large_crystal_gets_multiple_levels_ending_at_target() {
        let ladder = grid_ladder(80.0, 80.0, 0.1);
        assert!(ladder.len() >= 2);
        assert_eq!(*ladder.last().unwrap(), 0.1);
        // coarsest spacing must be strictly coarser (larger) than target
        assert!(ladder[0] > 0.1);
    }

    #[test]
    fn iteration_cap_shrinks_after_first_level() {
        assert_eq!(iteration_cap(1000, 0, 2), 1000);
        assert_eq!(iteration_cap(1000, 1, 2), 500);
    }

    #[test]
    fn prolongate_preserves_constant_field() {
        let geom = Geometry {
            xtal_length: 20.0,
            xtal_radius: 20.0,
            top_bullet_radius: 0.0,
            bottom_bullet_radius: 0.0,
            pc_length: 1.0,
            pc_radius: 1.0,
            taper_length: 0.0,
            wrap_around_radius: 0.0,
            ditch_depth: 0.0,
            ditch_thickness: 0.0,
            li_thickness: 0.0,
        };
        let coarse_dims = GridDims::new(&geom, 2.0);
        let fine_dims = GridDims::new(&geom, 1.0);

        let mut coarse = Grid2::new(crate::utils::extent::Extent::new(coarse_dims.l + 1, coarse_dims.r + 1));
        coarse.fill(42.0);

        let fine = prolongate(&coarse, coarse_dims, fine_dims);
        for v in fine.iter() {
            assert!((*v - 42.0).abs() < 1e-9);
        }
    }
}
