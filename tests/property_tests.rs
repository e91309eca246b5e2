use std::collections::{BTreeSet, HashMap};

use clump_regions::{PipelineConfig, Point, RegionPipeline, NOISE};
use proptest::prelude::*;

// Distinct grid points, so every merge happens at a non-trivial distance.
fn point_sets() -> impl Strategy<Value = Vec<Point>> {
    prop::collection::hash_set((-20i32..20, -20i32..20), 0..24).prop_flat_map(|cells| {
        let n = cells.len();
        (Just(cells), prop::collection::vec(0.0f64..1.0, n)).prop_map(|(cells, scores)| {
            cells
                .into_iter()
                .zip(scores)
                .map(|((x, y), s)| Point::new(x as f64 * 0.5, y as f64 * 0.5, s))
                .collect()
        })
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_regions_match_cluster_membership(points in point_sets()) {
        let out = RegionPipeline::new(PipelineConfig::default()).run(&points).unwrap();
        let labels = &out.clustering.labels;
        prop_assert_eq!(labels.len(), points.len());

        let mut members: HashMap<i64, Vec<&Point>> = HashMap::new();
        for (p, &l) in points.iter().zip(labels) {
            if l != NOISE {
                members.entry(l).or_default().push(p);
            }
        }

        for region in &out.synthesis.regions {
            prop_assert!(out.clustering.selected.contains(&region.cluster_id));
            prop_assert!(region.size > 1);

            let group = &members[&region.cluster_id];
            prop_assert_eq!(region.size, group.len());

            // Noise and other clusters never leak into the aggregate.
            let mean = group.iter().map(|p| p.score).sum::<f64>() / group.len() as f64;
            prop_assert!((region.mean_score - mean).abs() < 1e-9);
        }

        // Every threshold ends up either as a region or as a reported drop.
        let built: BTreeSet<i64> = out
            .synthesis
            .regions
            .iter()
            .map(|r| r.cluster_id)
            .chain(out.synthesis.dropped.iter().map(|d| d.cluster_id))
            .collect();
        let expected: BTreeSet<i64> = out.thresholds.iter().map(|t| t.cluster_id).collect();
        prop_assert_eq!(built, expected);
        prop_assert!(out.thresholds.iter().all(|t| t.epsilon > 0.0));
    }

    #[test]
    fn prop_pipeline_is_idempotent(points in point_sets()) {
        let pipeline = RegionPipeline::new(PipelineConfig::default());
        let a = pipeline.run(&points).unwrap();
        let b = pipeline.run(&points).unwrap();

        prop_assert_eq!(&a.clustering, &b.clustering);
        prop_assert_eq!(&a.thresholds, &b.thresholds);
        prop_assert_eq!(&a.synthesis.regions, &b.synthesis.regions);
    }
}
