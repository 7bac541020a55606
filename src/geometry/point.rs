//! Cartesian and cylindrical point/vector types used at the geometry and
//! drift-integrator seams, where the axisymmetric (z, r) grid data has to
//! be related back to full 3-D positions

use crate::utils::vector2::Vector2;
use std::ops::{Add, Mul};

/// a point in the detector's lab frame
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    pub fn new(x: f64, y: f64, z: f64) -> Point3 {
        Point3 { x, y, z }
    }

    /// radial distance from the z axis
    pub fn r(&self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// azimuthal angle, used to rotate a cylindrical-plane vector sample
    /// back into the lab frame
    pub fn phi(&self) -> f64 {
        self.y.atan2(self.x)
    }

    pub fn to_cyl(&self) -> CylPoint {
        CylPoint::new(self.z, self.r())
    }
}

impl Add<Vector3> for Point3 {
    type Output = Point3;
    fn add(self, rhs: Vector3) -> Point3 {
        Point3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

/// a lab-frame velocity or displacement vector
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    pub fn new(x: f64, y: f64, z: f64) -> Vector3 {
        Vector3 { x, y, z }
    }

    pub fn length(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// builds a lab-frame vector from a (z, r) sample taken in the
    /// azimuthal plane that contains `phi`
    pub fn from_cyl(sample: Vector2, phi: f64) -> Vector3 {
        Vector3::new(sample.r * phi.cos(), sample.r * phi.sin(), sample.z)
    }
}

impl Mul<f64> for Vector3 {
    type Output = Vector3;
    fn mul(self, rhs: f64) -> Vector3 {
        Vector3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

/// a location on the solver's 2-D (z, r) lattice
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CylPoint {
    pub z: f64,
    pub r: f64,
}

impl CylPoint {
    pub fn new(z: f64, r: f64) -> CylPoint {
        CylPoint { z, r }
    }
}
