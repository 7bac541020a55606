//! `VectorGrid2` struct
//!
//! a (z, r)-indexed grid of `Vector2` samples, used for the exported
//! electric field and for the weighting-potential gradient the
//! capacitance integrals consume

use crate::field::scalar::Grid2;
use crate::utils::extent::Extent;
use crate::utils::vector2::Vector2;
use std::fmt::{Display, Formatter};

/// describes a vector field over the (z, r) lattice
#[derive(Debug, Clone, PartialEq)]
pub struct VectorGrid2 {
    /// axial (z) component at each cell
    pub z: Grid2<f64>,

    /// radial (r) component at each cell
    pub r: Grid2<f64>,
}

impl VectorGrid2 {
    /// `VectorGrid2` constructor
    ///
    /// # Arguments
    /// - `extent`: Extent<usize> number of cells in (z, r)
    pub fn new(extent: Extent<usize>) -> VectorGrid2 {
        VectorGrid2 {
            z: Grid2::new(extent),
            r: Grid2::new(extent),
        }
    }

    pub fn at(&self, z: usize, r: usize) -> Vector2 {
        Vector2::new(self.z[(z, r)], self.r[(z, r)])
    }

    pub fn set(&mut self, z: usize, r: usize, v: Vector2) {
        self.z[(z, r)] = v.z;
        self.r[(z, r)] = v.r;
    }
}

impl Display for VectorGrid2 {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let extent = self.z.extent();
        for z in 0..extent.z {
            for r in 0..extent.r {
                let v = self.at(z, r);
                writeln!(f, "VectorGrid2({}, {}) = [{}, {}]", z, r, v.z, v.r)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::VectorGrid2;
    use crate::utils::extent::Extent;
    use crate::utils::vector2::Vector2;

    #[test]
    fn new_is_zeroed() {
        let vf = VectorGrid2::new(Extent::new(2, 3));
        assert_eq!(vf.at(1, 2), Vector2::new(0.0, 0.0));
    }

    #[test]
    fn set_and_at_round_trip() {
        let mut vf = VectorGrid2::new(Extent::new(2, 3));
        vf.set(1, 2, Vector2::new(3.0, 4.0));
        assert_eq!(vf.at(1, 2), Vector2::new(3.0, 4.0));
        assert_eq!(vf.at(0, 0), Vector2::new(0.0, 0.0));
    }
}
