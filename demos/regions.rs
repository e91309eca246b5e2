//! Search hits around three Greek cities, clustered into scored regions.

use clump_regions::summary::{keyword_summary, score_bins};
use clump_regions::{export, PipelineConfig, Point, RegionPipeline, NOISE};

fn main() {
    let hits = [
        // Athens
        ("POINT(23.7275 37.9838)", 0.92, vec!["acropolis", "museum", "the"]),
        ("POINT(23.7310 37.9750)", 0.81, vec!["museum", "cafe"]),
        ("POINT(23.7260 37.9790)", 0.77, vec!["market", "cafe"]),
        ("POINT(23.7350 37.9800)", 0.70, vec!["park"]),
        // Thessaloniki
        ("POINT(22.9444 40.6401)", 0.35, vec!["port", "tower"]),
        ("POINT(22.9500 40.6320)", 0.28, vec!["port"]),
        ("POINT(22.9400 40.6350)", 0.22, vec!["tower", "and", "sea"]),
        // Patras
        ("POINT(21.7346 38.2466)", 0.55, vec!["castle"]),
        ("POINT(21.7300 38.2500)", 0.50, vec!["castle", "port"]),
        // A lone hit far from everything else.
        ("POINT(25.1300 35.3300)", 0.99, vec!["palace"]),
    ];

    let points: Vec<Point> = hits
        .iter()
        .enumerate()
        .map(|(i, (wkt, score, keywords))| {
            Point::from_wkt(wkt, *score)
                .unwrap()
                .with_id(format!("hit-{i}"))
                .with_keywords(keywords.iter().copied())
        })
        .collect();

    let out = RegionPipeline::new(PipelineConfig::default()).run(&points).unwrap();

    println!("=== Labels ===");
    for (p, &label) in points.iter().zip(&out.clustering.labels) {
        let tag = if label == NOISE {
            "NOISE".to_string()
        } else {
            format!("cluster {label}")
        };
        println!("  ({:8.4}, {:8.4}) score {:.2} => {}", p.lon, p.lat, p.score, tag);
    }

    println!("\n=== Precision radii ===");
    for t in &out.thresholds {
        println!("  cluster {:3}: size {:2}, epsilon {:.4}", t.cluster_id, t.cluster_size, t.epsilon);
    }

    println!("\n=== Regions ===");
    for r in &out.synthesis.regions {
        println!(
            "  cluster {:3}: {} part(s), mean score {:.3}, top keywords {:?}",
            r.cluster_id,
            r.geometry.0.len(),
            r.mean_score,
            keyword_summary(r, 3)
        );
    }
    println!("  choropleth bins: {:?}", score_bins(&out.synthesis.regions));

    let geojson = export::to_geojson(&out.synthesis.regions);
    println!("\n=== GeoJSON ({} features) ===", geojson["features"].as_array().map_or(0, Vec::len));
}
