//! carrier drift-velocity lookup against a field-magnitude-indexed
//! mobility table. Grounded on `struct velocity_lookup` in
//! `mjd_siggen.h` and the table-driven lookup `mjd_siggen.c` performs
//! against it; the full `<100>/<110>/<111>` crystal-anisotropy tensor
//! that the original project layers on top lives in an external
//! collaborator (`fields.c`) outside this crate's scope (see
//! DESIGN.md), so velocities here depend on field magnitude only.

use crate::error::{SiggenError, SiggenResult};
use crate::geometry::CylPoint;
use crate::utils::vector2::Vector2;
use std::io::BufRead;

/// one row of the mobility table: field magnitude in V/cm, drift speed
/// in mm/ns for each carrier
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VelocityRow {
    pub e_field: f64,
    pub v_e: f64,
    pub v_h: f64,
}

/// a piecewise-linear drift-velocity-vs-field-magnitude table, shared by
/// both carrier species; velocity direction follows the local field
/// direction (down the gradient for electrons, up it for holes)
#[derive(Debug, Clone)]
pub struct VelocityLookup {
    rows: Vec<VelocityRow>,
}

impl VelocityLookup {
    /// builds a table from explicit rows, sorted by field magnitude
    pub fn new(mut rows: Vec<VelocityRow>) -> SiggenResult<VelocityLookup> {
        if rows.is_empty() {
            return Err(SiggenError::Config("velocity table must have at least one row".into()));
        }
        rows.sort_by(|a, b| a.e_field.partial_cmp(&b.e_field).unwrap());
        Ok(VelocityLookup { rows })
    }

    /// parses the original project's whitespace-separated table format:
    /// one header line, then `E v_e v_h` triples
    pub fn from_reader<R: BufRead>(reader: R) -> SiggenResult<VelocityLookup> {
        let mut rows = Vec::new();
        for (lineno, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| SiggenError::Config(format!("velocity table: {e}")))?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || lineno == 0 && line.chars().next().map_or(false, |c| c.is_alphabetic()) {
                continue;
            }
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() < 3 {
                continue;
            }
            let parse = |s: &str| -> SiggenResult<f64> {
                s.parse().map_err(|_| SiggenError::Config(format!("bad velocity table field {s:?}")))
            };
            rows.push(VelocityRow {
                e_field: parse(fields[0])?,
                v_e: parse(fields[1])?,
                v_h: parse(fields[2])?,
            });
        }
        VelocityLookup::new(rows)
    }

    /// interpolates a scalar drift speed in mm/ns for the given carrier
    /// at the given field magnitude (V/cm)
    fn speed(&self, e_mag: f64, q: f64) -> f64 {
        let rows = &self.rows;
        if e_mag <= rows[0].e_field {
            return if q > 0.0 { rows[0].v_h } else { rows[0].v_e };
        }
        let last = rows.len() - 1;
        if e_mag >= rows[last].e_field {
            return if q > 0.0 { rows[last].v_h } else { rows[last].v_e };
        }

        let idx = rows.partition_point(|row| row.e_field < e_mag).max(1);
        let lo = &rows[idx - 1];
        let hi = &rows[idx];
        let t = (e_mag - lo.e_field) / (hi.e_field - lo.e_field);

        if q > 0.0 {
            lo.v_h + t * (hi.v_h - lo.v_h)
        } else {
            lo.v_e + t * (hi.v_e - lo.v_e)
        }
    }

    /// drift velocity vector at `pt` for carrier charge sign `q`, given
    /// the local electric field sample in V/mm; electrons drift opposite
    /// the field, holes along it
    pub fn drift_velocity(&self, _pt: CylPoint, q: f64, e_field: Vector2) -> SiggenResult<Vector2> {
        let e_mag_v_per_cm = e_field.length() * 10.0; // mm -> cm
        if e_mag_v_per_cm <= 0.0 {
            return Ok(Vector2::new(0.0, 0.0));
        }
        let speed = self.speed(e_mag_v_per_cm, q);
        let direction = if q > 0.0 { 1.0 } else { -1.0 };
        Ok(e_field * (direction * speed / e_field.length()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> VelocityLookup {
        VelocityLookup::new(vec![
            VelocityRow { e_field: 0.0, v_e: 0.0, v_h: 0.0 },
            VelocityRow { e_field: 1000.0, v_e: 0.05, v_h: 0.04 },
            VelocityRow { e_field: 2000.0, v_e: 0.09, v_h: 0.07 },
        ])
        .unwrap()
    }

    #[test]
    fn interpolates_between_rows() {
        let t = table();
        let speed = t.speed(1500.0, -1.0);
        assert!((speed - 0.07).abs() < 1e-9);
    }

    #[test]
    fn clamps_below_and_above_table_range() {
        let t = table();
        assert_eq!(t.speed(-10.0, -1.0), 0.0);
        assert_eq!(t.speed(1.0e9, 1.0), 0.07);
    }

    #[test]
    fn electron_velocity_opposes_field() {
        let t = table();
        let e = Vector2::new(100.0, 0.0); // V/mm, along z
        let v = t.drift_velocity(CylPoint::new(0.0, 0.0), -1.0, e).unwrap();
        assert!(v.z < 0.0);
    }

    #[test]
    fn hole_velocity_follows_field() {
        let t = table();
        let e = Vector2::new(100.0, 0.0);
        let v = t.drift_velocity(CylPoint::new(0.0, 0.0), 1.0, e).unwrap();
        assert!(v.z > 0.0);
    }

    #[test]
    fn zero_field_gives_zero_velocity() {
        let t = table();
        let v = t.drift_velocity(CylPoint::new(0.0, 0.0), 1.0, Vector2::new(0.0, 0.0)).unwrap();
        assert_eq!(v, Vector2::new(0.0, 0.0));
    }

    #[test]
    fn from_reader_skips_header_and_comments() {
        let text = "E v_e v_h\n# comment\n0 0 0\n1000 0.05 0.04\n";
        let t = VelocityLookup::from_reader(text.as_bytes()).unwrap();
        assert_eq!(t.rows.len(), 2);
    }
}
