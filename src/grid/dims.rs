//! converts the crystal's physical geometry into integer grid-unit
//! extents for a given grid spacing, and computes the sub-pixel offsets
//! of the point-contact edges within that grid. Grounded on the
//! `lrint(...)`-based extent recomputation inside each `istep` iteration
//! of `mjd_fieldgen.c`'s main loop.

use crate::constants::PC_EDGE_THRESHOLD;
use crate::geometry::Geometry;

/// grid-unit extents and point-contact sub-pixel offsets for one grid
/// refinement level
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridDims {
    /// grid spacing at this level, in mm
    pub grid: f64,

    /// axial extent (number of z cells)
    pub l: usize,

    /// radial extent (number of r cells)
    pub r: usize,

    /// point-contact length, in grid units
    pub lc: usize,

    /// point-contact radius, in grid units
    pub rc: usize,

    /// taper length, in grid units
    pub lt: usize,

    /// wrap-around contact inner radius, in grid units
    pub ro: usize,

    /// ditch depth, in grid units
    pub lo: usize,

    /// ditch width, in grid units
    pub wo: usize,

    /// fractional offset of the physical PC radius from the grid point RC
    pub d_rc: f64,

    /// fractional offset of the physical PC length from the grid point LC
    pub d_lc: f64,
}

fn grid_round(x: f64) -> usize {
    x.round().max(0.0) as usize
}

impl GridDims {
    pub fn new(geom: &Geometry, grid: f64) -> GridDims {
        let l = grid_round(geom.xtal_length / grid);
        let r = grid_round(geom.xtal_radius / grid);
        let lc = grid_round(geom.pc_length / grid);
        let rc = grid_round(geom.pc_radius / grid);
        let lt = grid_round(geom.taper_length / grid);
        let mut ro = grid_round(geom.wrap_around_radius / grid);
        let lo = grid_round(geom.ditch_depth / grid);
        let wo = grid_round(geom.ditch_thickness / grid);

        let mut d_rc = geom.pc_radius / grid - rc as f64;
        if d_rc.abs() < PC_EDGE_THRESHOLD {
            d_rc = 0.0;
        }
        let mut d_lc = geom.pc_length / grid - lc as f64;
        if d_lc.abs() < PC_EDGE_THRESHOLD {
            d_lc = 0.0;
        }

        if ro == 0 || ro >= r {
            // no wrap-around contact: outer boundary is defined by the taper
            ro = r.saturating_sub(lt);
        }

        GridDims {
            grid,
            l,
            r,
            lc,
            rc,
            lt,
            ro,
            lo,
            wo,
            d_rc,
            d_lc,
        }
    }
}
