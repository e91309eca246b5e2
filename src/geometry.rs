//! Disk buffering and polygon union.
//!
//! Boolean operations come from `geo`; this module only decides how disks
//! are approximated and in which order they are merged.

use std::f64::consts::TAU;

use geo::{coord, Area, BooleanOps, CoordsIter, LineString, MultiPolygon, Point, Polygon};

/// Fewest segments accepted for a disk approximation.
///
/// Below this the polygon's edges visibly cut into the circle at map scale.
pub const MIN_SEGMENTS: usize = 32;

/// Approximate the disk of `radius` around `center` by a regular polygon.
///
/// The exterior ring is counter-clockwise and starts at angle 0.
pub fn disk(center: Point<f64>, radius: f64, segments: usize) -> Polygon<f64> {
    let segments = segments.max(MIN_SEGMENTS);
    let ring: Vec<_> = (0..segments)
        .map(|i| {
            let theta = TAU * i as f64 / segments as f64;
            coord! {
                x: center.x() + radius * theta.cos(),
                y: center.y() + radius * theta.sin(),
            }
        })
        .collect();
    Polygon::new(LineString::from(ring), vec![])
}

/// Union of all `polygons`, merged pairwise in a balanced tree.
///
/// Pairwise merging keeps intermediate results small compared to folding
/// everything into one growing accumulator. Disjoint parts and holes are
/// preserved.
pub fn cascaded_union(polygons: Vec<Polygon<f64>>) -> MultiPolygon<f64> {
    let mut layer: Vec<MultiPolygon<f64>> = polygons
        .into_iter()
        .map(|p| MultiPolygon::new(vec![p]))
        .collect();
    if layer.is_empty() {
        return MultiPolygon::new(vec![]);
    }

    while layer.len() > 1 {
        let mut next = Vec::with_capacity(layer.len().div_ceil(2));
        let mut iter = layer.into_iter();
        while let Some(a) = iter.next() {
            match iter.next() {
                Some(b) => next.push(a.union(&b)),
                None => next.push(a),
            }
        }
        layer = next;
    }
    layer.pop().unwrap_or_else(|| MultiPolygon::new(vec![]))
}

/// Why a region polygon is unusable, if it is.
pub fn degeneracy(region: &MultiPolygon<f64>) -> Option<&'static str> {
    if region.0.is_empty() {
        return Some("union is empty");
    }
    if region.coords_iter().any(|c| !(c.x.is_finite() && c.y.is_finite())) {
        return Some("non-finite vertex");
    }
    let area = region.unsigned_area();
    if !(area.is_finite() && area > 0.0) {
        return Some("zero or non-finite area");
    }
    None
}
