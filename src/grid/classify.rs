//! classifies each cell of a grid level as bulk, fixed-contact boundary,
//! sub-pixel contact edge, or pinched (undepleted, tracked only during
//! the weighting-potential solve). Grounded on the `bulk[z][r]` coding
//! and the surrounding edge-detection branches in `mjd_fieldgen.c`'s
//! grid-setup loop.

use crate::geometry::{CylPoint, Geometry};
use crate::grid::dims::GridDims;
use crate::utils::extent::Extent;

/// which solve a classification grid is built for: the two differ in
/// which cells are pinned to a fixed Dirichlet value and in whether
/// undepleted cells are tracked as `Pinched`
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SolveKind {
    /// bias-potential solve: outer surface pinned to `v_bias`, point
    /// contact and excluded volumes pinned to 0
    Bias { v_bias: f64 },
    /// weighting-potential solve: point contact pinned to 1, everything
    /// else outside the bulk pinned to 0; undepleted cells are folded
    /// into `Pinched` by the caller once the bias solve's depletion map
    /// is known
    Weighting,
}

/// per-cell classification consumed by the relaxation kernel
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CellKind {
    /// ordinary interior cell, updated by the five-point stencil
    Bulk,
    /// held at a fixed Dirichlet potential: point contact, outer
    /// surface, or volume excluded by the detector geometry
    FixedContact(f64),
    /// sub-pixel radial contact edge; fractional offset of the true
    /// contact surface from this grid line, from `GridDims::d_rc`
    EdgeR(f64),
    /// sub-pixel axial contact edge; fractional offset of the true
    /// contact surface from this grid line, from `GridDims::d_lc`
    EdgeZ(f64),
    /// a radial and an axial sub-pixel edge meet in the same cell
    EdgeCorner(f64, f64),
    /// undepleted during the weighting-potential solve: excluded from
    /// the ordinary stencil, updated instead from the pinched-region
    /// running average (see `solver::relaxation`)
    Pinched,
}

impl CellKind {
    pub fn is_fixed(&self) -> bool {
        matches!(self, CellKind::FixedContact(_))
    }

    pub fn is_bulk_like(&self) -> bool {
        matches!(
            self,
            CellKind::Bulk | CellKind::EdgeR(_) | CellKind::EdgeZ(_) | CellKind::EdgeCorner(_, _)
        )
    }
}

/// classification for every cell of one grid level
#[derive(Debug, Clone)]
pub struct CellClassification {
    data: Vec<CellKind>,
    extent: Extent<usize>,
}

impl CellClassification {
    fn linear(&self, z: usize, r: usize) -> usize {
        z * self.extent.r + r
    }

    pub fn extent(&self) -> Extent<usize> {
        self.extent
    }

    pub fn get(&self, z: usize, r: usize) -> CellKind {
        self.data[self.linear(z, r)]
    }

    pub fn set(&mut self, z: usize, r: usize, kind: CellKind) {
        let idx = self.linear(z, r);
        self.data[idx] = kind;
    }

    /// classifies every cell of a `(dims.l + 1) x (dims.r + 1)` grid for
    /// the given geometry and solve kind
    pub fn build(geom: &Geometry, dims: &GridDims, solve: SolveKind) -> CellClassification {
        let extent = Extent::new(dims.l + 1, dims.r + 1);
        let mut grid = CellClassification {
            data: vec![CellKind::Bulk; extent.z * extent.r],
            extent,
        };

        let excluded_value = match solve {
            SolveKind::Bias { .. } => 0.0,
            SolveKind::Weighting => 1.0,
        };
        let outer_value = match solve {
            SolveKind::Bias { v_bias } => v_bias,
            SolveKind::Weighting => 0.0,
        };

        for z in 0..extent.z {
            for r in 0..extent.r {
                let cyl = CylPoint::new(z as f64 * dims.grid, r as f64 * dims.grid);

                // the outer grid face is itself at/beyond the crystal's
                // physical extent, so it must be checked before the
                // generic outside-detector test below: otherwise it would
                // be misclassified as the point-contact/bulletization
                // exclusion value instead of the outer HV contact
                if z == dims.l || r == dims.r {
                    grid.set(z, r, CellKind::FixedContact(outer_value));
                    continue;
                }

                if geom.outside_detector_cyl(cyl) {
                    grid.set(z, r, CellKind::FixedContact(excluded_value));
                    continue;
                }

                // the true point-contact boundary falls strictly between
                // grid lines when d_rc/d_lc are nonzero; z==lc or r==rc is
                // the last grid line still on the depleted side
                let on_r_edge = r == dims.rc && z <= dims.lc && dims.d_rc != 0.0;
                let on_z_edge = z == dims.lc && r <= dims.rc && dims.d_lc != 0.0;

                let kind = if on_r_edge && on_z_edge {
                    CellKind::EdgeCorner(dims.d_rc, dims.d_lc)
                } else if on_r_edge {
                    CellKind::EdgeR(dims.d_rc)
                } else if on_z_edge {
                    CellKind::EdgeZ(dims.d_lc)
                } else {
                    CellKind::Bulk
                };
                grid.set(z, r, kind);
            }
        }

        grid
    }

    /// marks `(z, r)` as undepleted during a weighting-potential solve,
    /// called by the field solver once the bias solve's depletion map is
    /// known; a no-op on cells already fixed
    pub fn mark_pinched(&mut self, z: usize, r: usize) {
        if !self.get(z, r).is_fixed() {
            self.set(z, r, CellKind::Pinched);
        }
    }
}

/// space-charge weight for a cell, in [0, 1]: the fraction of the cell's
/// volume that lies on the depleted side of a sub-pixel contact edge.
///
/// the axial edge case is intentionally not given its own reduction
/// formula; see DESIGN.md for why this asymmetry is kept rather than
/// silently corrected.
pub fn vfraction(kind: CellKind) -> f64 {
    match kind {
        CellKind::Bulk | CellKind::Pinched => 1.0,
        CellKind::FixedContact(_) => 0.0,
        CellKind::EdgeR(d) => (1.0 - 2.0 * d).clamp(0.0, 1.0),
        // deliberately not distinguished from the radial case; see DESIGN.md
        CellKind::EdgeZ(d) => (1.0 - 2.0 * d).clamp(0.0, 1.0),
        CellKind::EdgeCorner(d_rc, d_lc) => (1.0 - 2.0 * d_rc - 2.0 * d_lc).clamp(0.0, 1.0),
    }
}
