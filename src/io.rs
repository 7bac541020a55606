//! output file writers reproducing the exact textual formats of
//! `mjd_fieldgen.c`'s `fprintf` calls: the field file, the weighting-
//! potential file, and the undepleted-region ASCII map.

use crate::error::{SiggenError, SiggenResult};
use crate::field::{Grid2, VectorGrid2};
use crate::grid::GridDims;
use std::io::Write;

/// writes the field file: header, then `r` outer / `z` inner blocks of
/// `r z V E E_r E_z`, separated by a blank line between `r` blocks
pub fn write_field_file<W: Write>(
    mut out: W,
    dims: &GridDims,
    potential: &Grid2<f64>,
    e_field: &VectorGrid2,
) -> SiggenResult<()> {
    writeln!(out, "## r (mm), z (mm), V (V),  E (V/cm), E_r (V/cm), E_z (V/cm)")
        .map_err(|e| SiggenError::FieldFile(e.to_string()))?;

    for r in 0..=dims.r {
        for z in 0..=dims.l {
            let v = potential[(z, r)];
            let e = e_field.at(z, r);
            let e_mag = e.length() * 10.0; // V/mm -> V/cm
            writeln!(
                out,
                "{:7.2} {:7.2} {:7.1} {:7.1} {:7.1} {:7.1}",
                r as f64 * dims.grid,
                z as f64 * dims.grid,
                v,
                e_mag,
                e.r * 10.0,
                e.z * 10.0,
            )
            .map_err(|e| SiggenError::FieldFile(e.to_string()))?;
        }
        writeln!(out).map_err(|e| SiggenError::FieldFile(e.to_string()))?;
    }
    Ok(())
}

/// writes the weighting-potential file: header, then `r z WP` blocks in
/// the same r-outer/z-inner layout as the field file
pub fn write_wp_file<W: Write>(mut out: W, dims: &GridDims, wp: &Grid2<f64>) -> SiggenResult<()> {
    writeln!(out, "## r (mm), z (mm), WP").map_err(|e| SiggenError::FieldFile(e.to_string()))?;

    for r in 0..=dims.r {
        for z in 0..=dims.l {
            writeln!(out, "{:7.2} {:7.2} {:7.4}", r as f64 * dims.grid, z as f64 * dims.grid, wp[(z, r)])
                .map_err(|e| SiggenError::FieldFile(e.to_string()))?;
        }
        writeln!(out).map_err(|e| SiggenError::FieldFile(e.to_string()))?;
    }
    Ok(())
}

/// classification of one cell for the undepleted ASCII map; distinct
/// from `grid::CellKind`, which drives the relaxation stencil rather
/// than diagnostic export
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepletionState {
    Depleted,
    Undepleted,
    PinchedBubble,
}

impl DepletionState {
    fn to_ascii(self) -> char {
        match self {
            DepletionState::Depleted => '.',
            DepletionState::Undepleted => '*',
            DepletionState::PinchedBubble => 'B',
        }
    }
}

/// writes one line per decreasing r, each a row of `L+1` characters,
/// matching the legacy ASCII map format
pub fn write_undepleted_map<W: Write>(mut out: W, dims: &GridDims, map: &[Vec<DepletionState>]) -> SiggenResult<()> {
    for row in map.iter().rev() {
        let line: String = row.iter().map(|s| s.to_ascii()).collect();
        writeln!(out, "{line}").map_err(|e| SiggenError::FieldFile(e.to_string()))?;
    }
    let _ = dims;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::extent::Extent;

    fn dims() -> GridDims {
        GridDims {
            grid: 1.0,
            l: 2,
            r: 2,
            lc: 1,
            rc: 1,
            lt: 0,
            ro: 2,
            lo: 0,
            wo: 0,
            d_rc: 0.0,
            d_lc: 0.0,
        }
    }

    #[test]
    fn field_file_has_header_and_blank_line_per_r_block() {
        let dims = dims();
        let potential = Grid2::new(Extent::new(dims.l + 1, dims.r + 1));
        let e_field = VectorGrid2::new(Extent::new(dims.l + 1, dims.r + 1));
        let mut out = Vec::new();
        write_field_file(&mut out, &dims, &potential, &e_field).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("## r (mm), z (mm), V (V)"));
        assert_eq!(text.matches("\n\n").count(), dims.r + 1);
    }

    #[test]
    fn wp_file_has_header() {
        let dims = dims();
        let wp = Grid2::new(Extent::new(dims.l + 1, dims.r + 1));
        let mut out = Vec::new();
        write_wp_file(&mut out, &dims, &wp).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("## r (mm), z (mm), WP"));
    }

    #[test]
    fn undepleted_map_uses_legacy_ascii_codes() {
        let dims = dims();
        let map = vec![
            vec![DepletionState::Depleted, DepletionState::Undepleted],
            vec![DepletionState::PinchedBubble, DepletionState::Depleted],
        ];
        let mut out = Vec::new();
        write_undepleted_map(&mut out, &dims, &map).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "B.\n.*\n");
    }
}
