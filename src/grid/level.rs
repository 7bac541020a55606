//! one refinement level's relaxation state: a double-buffered potential,
//! the cell classification, and the per-cell space-charge fraction and
//! permittivity the relaxation kernel reads. Grounded on the `old`/`new`
//! pointer-swapped potential arrays in `mjd_fieldgen.c`'s relaxation
//! loop, adapted to owned buffers with an explicit parity flag rather
//! than raw pointer aliasing.

use crate::constants::{EPS_GE_PF_PER_MM, VAC_PERM_PF_PER_MM};
use crate::field::scalar::Grid2;
use crate::geometry::Geometry;
use crate::grid::classify::{vfraction, CellClassification, CellKind, SolveKind};
use crate::grid::dims::GridDims;
use crate::utils::extent::Extent;

/// a potential field with two owned buffers, swapped by flipping
/// `parity` rather than copying data each relaxation sweep
#[derive(Debug, Clone)]
pub struct PotentialBuffer {
    buffers: [Grid2<f64>; 2],
    parity: bool,
}

impl PotentialBuffer {
    pub fn new(extent: Extent<usize>) -> PotentialBuffer {
        PotentialBuffer {
            buffers: [Grid2::new(extent), Grid2::new(extent)],
            parity: false,
        }
    }

    pub fn current(&self) -> &Grid2<f64> {
        &self.buffers[self.parity as usize]
    }

    pub fn current_mut(&mut self) -> &mut Grid2<f64> {
        &mut self.buffers[self.parity as usize]
    }

    /// the buffer not currently exposed as `current`, read by the
    /// relaxation kernel to seed the next sweep before swapping
    pub fn previous(&self) -> &Grid2<f64> {
        &self.buffers[!self.parity as usize]
    }

    pub fn previous_mut(&mut self) -> &mut Grid2<f64> {
        &mut self.buffers[!self.parity as usize]
    }

    /// swaps which buffer is `current`, making the sweep just written
    /// into `previous_mut` the new `current`
    pub fn swap(&mut self) {
        self.parity = !self.parity;
    }

    /// copies `current` into `previous`, used once after seeding an
    /// initial guess so both buffers agree before the first sweep
    pub fn sync(&mut self) {
        let (a, b) = self.buffers.split_at_mut(1);
        if self.parity {
            // current = b[0], previous = a[0]
            a[0].clone_from(&b[0]);
        } else {
            // current = a[0], previous = b[0]
            b[0].clone_from(&a[0]);
        }
    }
}

/// the full relaxation state for one grid level: potential, cell
/// classification, and the derived per-cell fields the stencil needs
#[derive(Debug, Clone)]
pub struct GridLevel {
    pub dims: GridDims,
    pub potential: PotentialBuffer,
    pub classification: CellClassification,
    pub vfraction: Grid2<f64>,
    pub permittivity: Grid2<f64>,
}

impl GridLevel {
    pub fn build(geom: &Geometry, dims: GridDims, solve: SolveKind) -> GridLevel {
        let extent = Extent::new(dims.l + 1, dims.r + 1);
        let classification = CellClassification::build(geom, &dims, solve);

        let mut vfraction_grid = Grid2::new(extent);
        for z in 0..extent.z {
            for r in 0..extent.r {
                vfraction_grid[(z, r)] = vfraction(classification.get(z, r));
            }
        }

        let mut permittivity = Grid2::filled(extent, EPS_GE_PF_PER_MM);
        // vacuum ditch next to the wrap-around contact: vacuum permittivity,
        // no space-charge contribution
        if dims.wo > 0 {
            let ditch_inner = dims.ro.saturating_sub(dims.wo + 1);
            for z in 0..dims.lo.min(dims.l + 1) {
                for r in (ditch_inner + 1)..dims.ro.min(dims.r + 1) {
                    permittivity[(z, r)] = VAC_PERM_PF_PER_MM;
                    vfraction_grid[(z, r)] = 0.0;
                }
            }
        }

        let mut potential = PotentialBuffer::new(extent);
        seed_initial_guess(potential.current_mut(), &classification, &dims);
        potential.sync();

        GridLevel {
            dims,
            potential,
            classification,
            vfraction: vfraction_grid,
            permittivity,
        }
    }
}

/// seeds fixed cells with their pinned value and leaves the rest at
/// zero; the multi-grid driver overwrites this with a prolongated guess
/// from the previous (coarser) level when one is available
fn seed_initial_guess(buf: &mut Grid2<f64>, classification: &CellClassification, dims: &GridDims) {
    for z in 0..=dims.l {
        for r in 0..=dims.r {
            if let CellKind::FixedContact(v) = classification.get(z, r) {
                buf[(z, r)] = v;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn swap_exposes_the_other_buffer() {
        let mut pb = PotentialBuffer::new(Extent::new(2, 2));
        pb.current_mut()[(0, 0)] = 1.0;
        pb.swap();
        assert_eq!(pb.current()[(0, 0)], 0.0);
        assert_eq!(pb.previous()[(0, 0)], 1.0);
    }

    #[test]
    fn sync_copies_current_into_previous() {
        let mut pb = PotentialBuffer::new(Extent::new(2, 2));
        pb.current_mut()[(1, 1)] = 5.0;
        pb.sync();
        assert_eq!(pb.previous()[(1, 1)], 5.0);
    }

    fn geom() -> Geometry {
        Geometry {
            xtal_length: 40.0,
            xtal_radius: 30.0,
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
    fn build_seeds_fixed_cells_with_their_pinned_value() {
        let dims = GridDims::new(&geom(), 0.5);
        let level = GridLevel::build(&geom(), dims, SolveKind::Bias { v_bias: 2000.0 });
        assert_eq!(level.potential.current()[(dims.l, 10)], 2000.0);
        assert_eq!(level.potential.current()[(0, 0)], 0.0);
    }
}
