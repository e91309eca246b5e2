//! GeoJSON export of regions.
//!
//! ```text
//! Synthesis.regions -> to_geojson() -> FeatureCollection
//!   -> choropleth layer keyed on properties.cluster_id
//! ```

use std::io::Write;

use geo::{LineString, MultiPolygon};
use serde_json::{json, Value};

use crate::error::Result;
use crate::region::Region;

fn ring(line: &LineString<f64>) -> Value {
    let mut coords: Vec<Value> = line.0.iter().map(|c| json!([c.x, c.y])).collect();
    // GeoJSON rings are explicitly closed.
    if let (Some(first), Some(last)) = (line.0.first(), line.0.last()) {
        if first != last {
            coords.push(json!([first.x, first.y]));
        }
    }
    Value::Array(coords)
}

fn multipolygon(geometry: &MultiPolygon<f64>) -> Value {
    let polygons: Vec<Value> = geometry
        .0
        .iter()
        .map(|p| {
            let mut rings = vec![ring(p.exterior())];
            rings.extend(p.interiors().iter().map(ring));
            Value::Array(rings)
        })
        .collect();
    json!({ "type": "MultiPolygon", "coordinates": polygons })
}

/// One GeoJSON feature per region.
///
/// Properties: `cluster_id`, `size`, `score` (the mean score), and
/// `keywords` (keyword -> count).
pub fn to_geojson(regions: &[Region]) -> Value {
    let features: Vec<Value> = regions
        .iter()
        .map(|r| {
            json!({
                "type": "Feature",
                "geometry": multipolygon(&r.geometry),
                "properties": {
                    "cluster_id": r.cluster_id,
                    "size": r.size,
                    "score": r.mean_score,
                    "keywords": r.keywords,
                },
            })
        })
        .collect();
    json!({ "type": "FeatureCollection", "features": features })
}

/// Write [`to_geojson`] to `writer`.
pub fn write_geojson(regions: &[Region], writer: &mut dyn Write) -> Result<()> {
    serde_json::to_writer(writer, &to_geojson(regions))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{cascaded_union, disk};
    use crate::point::KeywordBag;
    use geo::point;

    fn sample() -> Region {
        Region {
            cluster_id: 12,
            size: 3,
            geometry: cascaded_union(vec![
                disk(point!(x: 0.0, y: 0.0), 1.0, 16),
                disk(point!(x: 10.0, y: 0.0), 1.0, 16),
            ]),
            mean_score: 0.4,
            keywords: ["a", "b", "a"].into_iter().collect::<KeywordBag>(),
        }
    }

    #[test]
    fn feature_collection_shape() {
        let doc = to_geojson(&[sample()]);
        assert_eq!(doc["type"], "FeatureCollection");
        let feature = &doc["features"][0];
        assert_eq!(feature["properties"]["cluster_id"], 12);
        assert_eq!(feature["properties"]["size"], 3);
        assert_eq!(feature["properties"]["score"], 0.4);
        assert_eq!(feature["properties"]["keywords"]["a"], 2);
        assert_eq!(feature["geometry"]["type"], "MultiPolygon");

        let polygons = feature["geometry"]["coordinates"].as_array().unwrap();
        assert_eq!(polygons.len(), 2);
        let exterior = polygons[0][0].as_array().unwrap();
        assert_eq!(exterior.first(), exterior.last());
    }

    #[test]
    fn writes_parseable_json() {
        let mut buf = Vec::new();
        write_geojson(&[sample()], &mut buf).unwrap();
        let parsed: Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(parsed, to_geojson(&[sample()]));
    }

    #[test]
    fn exported_vertices_parse_back_exactly() {
        let region = sample();
        let mut buf = Vec::new();
        write_geojson(std::slice::from_ref(&region), &mut buf).unwrap();
        let parsed: Value = serde_json::from_slice(&buf).unwrap();

        let exterior = parsed["features"][0]["geometry"]["coordinates"][0][0]
            .as_array()
            .unwrap();
        let expected = region.geometry.0[0].exterior();
        assert_eq!(exterior.len(), expected.0.len());
        for (written, vertex) in exterior.iter().zip(expected.coords()) {
            assert_eq!(written[0].as_f64(), Some(vertex.x));
            assert_eq!(written[1].as_f64(), Some(vertex.y));
        }
    }
}
