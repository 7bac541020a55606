//! geometry module
//!
//! describes the immutable physical geometry of the detector crystal and
//! the containment predicates the drift integrator uses to decide when a
//! carrier has left the detector volume. Grounded on `detector_geometry.c`
//! and the geometry fields of `MJD_Siggen_Setup` in `mjd_siggen.h`.

pub mod point;

pub use point::{CylPoint, Point3, Vector3};

/// carrier type implied by the sign of the impurity concentration at z=0
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarrierType {
    NType,
    PType,
}

/// linear net-donor impurity profile along z
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImpurityProfile {
    /// net donor density at z=0, in 1e10 cm^-3; sign gives carrier type
    pub n0: f64,

    /// net donor density gradient along z, in 1e10 cm^-4
    pub gradient: f64,
}

impl ImpurityProfile {
    pub fn new(n0: f64, gradient: f64) -> ImpurityProfile {
        ImpurityProfile { n0, gradient }
    }

    /// positive n0 is n-type; the solver internally flips polarity so all
    /// stored potentials are non-negative (see `Geometry::normalize_bias`)
    pub fn carrier_type(&self) -> CarrierType {
        if self.n0 > 0.0 {
            CarrierType::NType
        } else {
            CarrierType::PType
        }
    }
}

/// immutable crystal geometry, all dimensions in millimeters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geometry {
    /// crystal length (z extent)
    pub xtal_length: f64,

    /// crystal radius (r extent)
    pub xtal_radius: f64,

    /// bulletization radius at the top of the crystal
    pub top_bullet_radius: f64,

    /// bulletization radius at the bottom of the crystal
    pub bottom_bullet_radius: f64,

    /// point-contact length
    pub pc_length: f64,

    /// point-contact radius
    pub pc_radius: f64,

    /// 45-degree taper length at the bottom of the crystal
    pub taper_length: f64,

    /// wrap-around outer-contact radius (0 for no wrap-around)
    pub wrap_around_radius: f64,

    /// depth of the vacuum ditch next to the wrap-around contact
    pub ditch_depth: f64,

    /// width of the vacuum ditch next to the wrap-around contact
    pub ditch_thickness: f64,

    /// thickness of the lithium-contact dead layer
    pub li_thickness: f64,
}

impl Geometry {
    /// true iff `pt` lies outside the detector's physical volume:
    /// beyond the crystal length/radius, inside the top bulletization cut,
    /// inside the point-contact volume, or inside the 45-degree taper.
    pub fn outside_detector(&self, pt: Point3) -> bool {
        let z = pt.z;
        if z >= self.xtal_length || z < 0.0 {
            return true;
        }

        let r = (pt.x * pt.x + pt.y * pt.y).sqrt();
        if r > self.xtal_radius {
            return true;
        }

        let br = self.top_bullet_radius;
        if br > 0.0
            && z > self.xtal_length - br
            && r > (self.xtal_radius - br) + (br * br - (z - (self.xtal_length - br)).powi(2)).sqrt()
        {
            return true;
        }

        if self.pc_radius > 0.0 && z <= self.pc_length && r <= self.pc_radius {
            return true;
        }

        if self.taper_length > 0.0 && z < self.taper_length && r > self.xtal_length - self.taper_length + z {
            return true;
        }

        false
    }

    /// same predicate expressed directly on a cylindrical (z, r) location,
    /// used by the grid classifier which never constructs a Cartesian point
    pub fn outside_detector_cyl(&self, pt: CylPoint) -> bool {
        self.outside_detector(Point3::new(pt.r, 0.0, pt.z))
    }

    /// whether the outer wrap-around contact is present
    pub fn has_wrap_around(&self) -> bool {
        self.wrap_around_radius > 0.0 && self.wrap_around_radius < self.xtal_radius
    }
}

/// the (q, impurity-sign) pair for which a carrier's weighting potential
/// asymptotes to 1, i.e. the carrier collects at the point contact:
/// holes collect to the PC for p-type material, electrons for n-type
pub fn collects_to_point_contact(charge_sign: f64, impurity: &ImpurityProfile) -> bool {
    (charge_sign > 0.0 && impurity.n0 < 0.0) || (charge_sign < 0.0 && impurity.n0 > 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

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
    fn inside_bulk_is_not_outside() {
        let g = geom();
        assert!(!g.outside_detector(Point3::new(10.0, 0.0, 20.0)));
    }

    #[test]
    fn beyond_radius_is_outside() {
        let g = geom();
        assert!(g.outside_detector(Point3::new(31.0, 0.0, 20.0)));
    }

    #[test]
    fn beyond_length_is_outside() {
        let g = geom();
        assert!(g.outside_detector(Point3::new(10.0, 0.0, 41.0)));
        assert!(g.outside_detector(Point3::new(10.0, 0.0, -1.0)));
    }

    #[test]
    fn inside_point_contact_is_outside() {
        let g = geom();
        assert!(g.outside_detector(Point3::new(1.0, 0.0, 1.0)));
    }

    #[test]
    fn taper_excludes_corner() {
        let mut g = geom();
        g.taper_length = 10.0;
        // at z=0 the taper boundary is r > xtal_length - taper_length = 30
        assert!(g.outside_detector(Point3::new(31.0, 0.0, 0.0)));
        assert!(!g.outside_detector(Point3::new(5.0, 0.0, 0.0)));
    }

    #[test]
    fn impurity_sign_determines_carrier_type() {
        assert_eq!(ImpurityProfile::new(1.0, 0.0).carrier_type(), CarrierType::NType);
        assert_eq!(ImpurityProfile::new(-1.0, 0.0).carrier_type(), CarrierType::PType);
    }

    #[test]
    fn collection_rule_p_type_holes_to_pc() {
        let p_type = ImpurityProfile::new(-1.0, 0.0);
        assert!(collects_to_point_contact(1.0, &p_type));
        assert!(!collects_to_point_contact(-1.0, &p_type));
    }

    #[test]
    fn collection_rule_n_type_electrons_to_pc() {
        let n_type = ImpurityProfile::new(1.0, 0.0);
        assert!(collects_to_point_contact(-1.0, &n_type));
        assert!(!collects_to_point_contact(1.0, &n_type));
    }
}
