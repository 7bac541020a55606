//! `Extent<T>` struct
//!
//! the detector field is axisymmetric and solved on a strictly 2-D
//! (z, r) lattice, so this carries only the two components that are
//! ever meaningful here. A `z`-only or `r`-only field with an unused
//! third component would be a silent source of index bugs.

use std::fmt::{Display, Formatter};

/// represents generic (z, r) data: grid extents, spatial steps, or any
/// other quantity that is naturally indexed by the two cylindrical axes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent<T> {
    /// axial (z) component
    pub z: T,

    /// radial (r) component
    pub r: T,
}

impl<T> Extent<T> {
    /// `Extent` constructor
    ///
    /// # Arguments
    /// - `z`: T axial component
    /// - `r`: T radial component
    pub fn new(z: T, r: T) -> Extent<T> {
        Extent { z, r }
    }
}

impl<T: Display> Display for Extent<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "(z={}, r={})", self.z, self.r)
    }
}

#[cfg(test)]
mod tests {
    use super::Extent;

    #[test]
    fn new_sets_components() {
        let e = Extent::new(3usize, 5usize);
        assert_eq!(e.z, 3);
        assert_eq!(e.r, 5);
    }

    #[test]
    fn display_format() {
        let e = Extent::new(1.5f64, 2.5f64);
        assert_eq!(format!("{}", e), "(z=1.5, r=2.5)");
    }
}
