//! capacitance integrals computed from a converged weighting field.
//! Grounded on the two accumulator loops (`esum`, `esum2`) at the end of
//! `mjd_fieldgen.c`'s weighting-potential pass, which integrate the same
//! gradient-squared quantity with different prefactors as a cross-check
//! against discretization error.

use crate::constants::EPS_GE_PF_PER_MM;
use crate::field::VectorGrid2;
use crate::grid::GridDims;
use std::f64::consts::PI;

/// detector capacitance in pF, computed two independent ways from the
/// same weighting-field gradient
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Capacitance {
    /// trapezoidal-rule integral over cell volumes, `2*pi*0.01*eps*grid^3`
    pub volume_integral: f64,
    /// flux integral over the point-contact perimeter, `2*pi*eps*grid^3`,
    /// only meaningful (and only reported) once the detector is fully
    /// depleted
    pub surface_integral: Option<f64>,
}

/// integrates `|grad(weighting potential)|^2` over the whole grid for the
/// volume term, and `|grad(weighting potential)|` over the point-contact
/// perimeter (`r==rc && z<=lc`, or `r<=rc && z==lc`) for the surface term;
/// `wp_field` must be the gradient of a converged weighting potential, in
/// volts/mm. The surface term is only returned when `fully_depleted`.
pub fn integrate(wp_field: &VectorGrid2, dims: &GridDims, fully_depleted: bool) -> Capacitance {
    let grid = dims.grid;
    let mut esum = 0.0_f64;
    let mut esum2 = 0.0_f64;

    for z in 0..=dims.l {
        for r in 0..=dims.r {
            let e = wp_field.at(z, r);
            let e2 = e.z * e.z + e.r * e.r;
            let r_weight = if r == 0 { 0.5 } else { r as f64 };

            esum += e2 * r_weight;

            let on_pc_perimeter = (r == dims.rc && z <= dims.lc) || (r <= dims.rc && z == dims.lc);
            if on_pc_perimeter {
                esum2 += e2.sqrt() * r_weight;
            }
        }
    }

    Capacitance {
        volume_integral: 2.0 * PI * 0.01 * EPS_GE_PF_PER_MM * grid.powi(3) * esum,
        surface_integral: fully_depleted.then(|| 2.0 * PI * EPS_GE_PF_PER_MM * grid.powi(3) * esum2),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::extent::Extent;
    use crate::utils::vector2::Vector2;

    #[test]
    fn zero_field_gives_zero_capacitance() {
        let dims = GridDims {
            grid: 1.0,
            l: 4,
            r: 4,
            lc: 1,
            rc: 1,
            lt: 0,
            ro: 4,
            lo: 0,
            wo: 0,
            d_rc: 0.0,
            d_lc: 0.0,
        };
        let field = VectorGrid2::new(Extent::new(dims.l + 1, dims.r + 1));
        let cap = integrate(&field, &dims, true);
        assert_eq!(cap.volume_integral, 0.0);
        assert_eq!(cap.surface_integral, Some(0.0));
    }

    #[test]
    fn uniform_field_gives_positive_capacitance() {
        let dims = GridDims {
            grid: 1.0,
            l: 4,
            r: 4,
            lc: 1,
            rc: 1,
            lt: 0,
            ro: 4,
            lo: 0,
            wo: 0,
            d_rc: 0.0,
            d_lc: 0.0,
        };
        let mut field = VectorGrid2::new(Extent::new(dims.l + 1, dims.r + 1));
        for z in 0..=dims.l {
            for r in 0..=dims.r {
                field.set(z, r, Vector2::new(1.0, 0.0));
            }
        }
        let cap = integrate(&field, &dims, true);
        assert!(cap.volume_integral > 0.0);
        assert!(cap.surface_integral.unwrap() > 0.0);
    }

    #[test]
    fn surface_integral_absent_when_not_fully_depleted() {
        let dims = GridDims {
            grid: 1.0,
            l: 4,
            r: 4,
            lc: 1,
            rc: 1,
            lt: 0,
            ro: 4,
            lo: 0,
            wo: 0,
            d_rc: 0.0,
            d_lc: 0.0,
        };
        let mut field = VectorGrid2::new(Extent::new(dims.l + 1, dims.r + 1));
        field.set(0, 0, Vector2::new(1.0, 0.0));
        let cap = integrate(&field, &dims, false);
        assert_eq!(cap.surface_integral, None);
    }
}
