// Hexagonal binning of records in web-mercator world space.
//
// Pointy-top grid with the same rounding rule as d3-hexbin: rows are
// `1.5 r` apart and odd rows are shifted half a column.

use std::collections::HashMap;
use std::f64::consts::PI;

use crate::geo::{lng_lat_to_world, units_per_meter};
use crate::model::LocationRecord;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HexGrid {
    pub radius: f64,
    dx: f64,
    dy: f64,
}

impl HexGrid {
    pub fn new(radius: f64) -> Self {
        Self {
            radius,
            dx: radius * 2.0 * (PI / 3.0).sin(),
            dy: radius * 1.5,
        }
    }

    /// Grid cell `(column, row)` containing a world point.
    pub fn cell_of(&self, p: [f64; 2]) -> (i64, i64) {
        let py = p[1] / self.dy;
        let mut pj = py.round();
        let px = p[0] / self.dx - (pj as i64 & 1) as f64 / 2.0;
        let mut pi = px.round();
        let py1 = py - pj;

        if py1.abs() * 3.0 > 1.0 {
            let px1 = px - pi;
            let pi2 = pi + (if px < pi { -1.0 } else { 1.0 }) / 2.0;
            let pj2 = pj + if py < pj { -1.0 } else { 1.0 };
            let px2 = px - pi2;
            let py2 = py - pj2;
            if px1 * px1 + py1 * py1 > px2 * px2 + py2 * py2 {
                pi = pi2 + (if pj as i64 & 1 != 0 { 1.0 } else { -1.0 }) / 2.0;
                pj = pj2;
            }
        }
        (pi as i64, pj as i64)
    }

    pub fn center(&self, cell: (i64, i64)) -> [f64; 2] {
        let (i, j) = cell;
        [(i as f64 + (j & 1) as f64 / 2.0) * self.dx, j as f64 * self.dy]
    }

    /// Hexagon corners around `center`, clockwise from the top vertex.
    pub fn vertices(center: [f64; 2], radius: f64) -> [[f64; 2]; 6] {
        let mut out = [[0.0; 2]; 6];
        for (k, v) in out.iter_mut().enumerate() {
            let a = k as f64 * PI / 3.0;
            *v = [center[0] + a.sin() * radius, center[1] - a.cos() * radius];
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HexBin {
    pub cell: (i64, i64),
    pub center: [f64; 2],
    /// Indices into the aggregated record slice, in input order.
    pub points: Vec<usize>,
    pub color_value: f64,
    /// Value of the first point.
    pub elevation_value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Aggregation {
    pub grid: HexGrid,
    pub bins: Vec<HexBin>,
}

/// Latitude at the middle of the finite points' bounding box.
fn center_latitude(records: &[LocationRecord]) -> Option<f64> {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for r in records {
        let (x, y) = r.coordinates;
        if x.is_finite() && y.is_finite() {
            lo = lo.min(y);
            hi = hi.max(y);
        }
    }
    (lo <= hi).then(|| (lo + hi) / 2.0)
}

/// Bin records into hexagons of `radius_m` meters (measured at the data's center latitude).
pub fn aggregate(records: &[LocationRecord], radius_m: f64) -> Aggregation {
    let lat = center_latitude(records).unwrap_or(0.0);
    let grid = HexGrid::new(radius_m * units_per_meter(lat));
    let mut index: HashMap<(i64, i64), usize> = HashMap::new();
    let mut bins: Vec<HexBin> = Vec::new();
    if !(grid.radius > 0.0 && grid.radius.is_finite()) {
        return Aggregation { grid, bins };
    }
    for (i, r) in records.iter().enumerate() {
        let (x, y) = r.coordinates;
        if !(x.is_finite() && y.is_finite()) {
            continue;
        }
        let cell = grid.cell_of(lng_lat_to_world(x, y));
        let slot = *index.entry(cell).or_insert_with(|| {
            bins.push(HexBin {
                cell,
                center: grid.center(cell),
                points: Vec::new(),
                color_value: 0.0,
                elevation_value: r.value,
            });
            bins.len() - 1
        });
        let bin = &mut bins[slot];
        bin.points.push(i);
        bin.color_value += r.value;
    }
    Aggregation { grid, bins }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn rec(x: f64, y: f64, value: f64, name: &str) -> LocationRecord {
        LocationRecord {
            coordinates: (x, y),
            value,
            name: name.into(),
        }
    }

    #[test]
    fn every_point_lands_in_nearest_center() {
        let grid = HexGrid::new(1.0);
        for k in 0..400 {
            let p = [(k % 20) as f64 * 0.37 - 3.0, (k / 20) as f64 * 0.41 - 4.0];
            let c = grid.center(grid.cell_of(p));
            let d = ((p[0] - c[0]).powi(2) + (p[1] - c[1]).powi(2)).sqrt();
            // Inside a hexagon no point is farther than the circumradius.
            assert!(d <= 1.0 + 1e-9, "{p:?} -> {c:?} ({d})");
        }
    }

    #[test]
    fn vertices_sit_on_circumradius() {
        for v in HexGrid::vertices([10.0, 5.0], 2.0) {
            let d = ((v[0] - 10.0).powi(2) + (v[1] - 5.0).powi(2)).sqrt();
            assert_abs_diff_eq!(d, 2.0, epsilon = 1e-12);
        }
        assert_abs_diff_eq!(HexGrid::vertices([0.0, 0.0], 1.0)[0][1], -1.0, epsilon = 1e-12);
    }

    #[test]
    fn colocated_points_share_a_bin_with_sum_and_first_value() {
        let recs = vec![
            rec(-3.880, 40.750, 12.0, "Pedriza"),
            rec(-3.880, 40.750, 30.0, "Pedriza Norte"),
            rec(1.05, 41.25, 100.0, "Siurana"),
        ];
        let agg = aggregate(&recs, 2000.0);
        assert_eq!(agg.bins.len(), 2);
        let pedriza = &agg.bins[0];
        assert_eq!(pedriza.points, vec![0, 1]);
        assert_eq!(pedriza.color_value, 42.0);
        assert_eq!(pedriza.elevation_value, 12.0);
        assert_eq!(agg.bins[1].points, vec![2]);
        assert_eq!(agg.bins[1].color_value, 100.0);
    }

    #[test]
    fn non_finite_coordinates_are_skipped_but_nan_values_propagate() {
        let recs = vec![
            rec(f64::NAN, 40.0, 5.0, "bad"),
            rec(-3.7, 40.4, f64::NAN, "nan value"),
        ];
        let agg = aggregate(&recs, 2000.0);
        assert_eq!(agg.bins.len(), 1);
        assert_eq!(agg.bins[0].points, vec![1]);
        assert!(agg.bins[0].color_value.is_nan());
    }

    #[test]
    fn empty_input_has_no_bins() {
        assert!(aggregate(&[], 2000.0).bins.is_empty());
    }
}
