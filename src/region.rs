//! Cluster regions: buffered footprints with score and keyword aggregates.
//!
//! Every clustered point is buffered into a disk whose radius is its
//! cluster's precision radius; the disks of one cluster are unioned into a
//! single (multi-)polygon. The union is kept as-is: disjoint lobes stay
//! separate parts and enclosed gaps stay holes.

use std::collections::BTreeMap;

use geo::{MultiPolygon, Point as GeoPoint};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::cluster::{DEFAULT_MAX_POINTS, NOISE};
use crate::epsilon::ClusterThreshold;
use crate::error::{Error, Result};
use crate::geometry::{self, MIN_SEGMENTS};
use crate::point::{KeywordBag, Point};

/// Parameters for the geometry stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeometryParams {
    /// Segments per disk approximation.
    pub segments: usize,
    /// Largest number of clustered points buffered in one synthesis.
    pub max_points: usize,
}

impl Default for GeometryParams {
    fn default() -> Self {
        Self {
            segments: 64,
            max_points: DEFAULT_MAX_POINTS,
        }
    }
}

impl GeometryParams {
    /// Reject unusable values.
    pub fn validate(&self) -> Result<()> {
        if self.segments < MIN_SEGMENTS {
            return Err(Error::InvalidParameter {
                name: "segments",
                message: "must be at least 32",
            });
        }
        if self.max_points == 0 {
            return Err(Error::InvalidParameter {
                name: "max_points",
                message: "must be at least 1",
            });
        }
        Ok(())
    }
}

/// The rendered footprint of one cluster.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    /// Cluster id shared with the point labels.
    pub cluster_id: i64,
    /// Point count from the hierarchy.
    pub size: usize,
    /// Union of the members' disks.
    pub geometry: MultiPolygon<f64>,
    /// Arithmetic mean of the members' scores.
    pub mean_score: f64,
    /// Multiset union of the members' keywords.
    pub keywords: KeywordBag,
}

/// A cluster whose region could not be built.
#[derive(Debug)]
pub struct DroppedCluster {
    /// The affected cluster.
    pub cluster_id: i64,
    /// Always an [`Error::DegenerateGeometry`].
    pub error: Error,
}

/// Result of one synthesis: the regions built and the clusters skipped.
#[derive(Debug, Default)]
pub struct Synthesis {
    /// One region per surviving cluster, ordered by cluster id.
    pub regions: Vec<Region>,
    /// Clusters dropped for degenerate geometry.
    pub dropped: Vec<DroppedCluster>,
}

impl Synthesis {
    /// Look up a region by cluster id.
    pub fn region(&self, cluster_id: i64) -> Option<&Region> {
        self.regions.iter().find(|r| r.cluster_id == cluster_id)
    }
}

/// Builds [`Region`]s from labeled points and their cluster thresholds.
#[derive(Debug, Clone, Default)]
pub struct RegionSynthesizer {
    params: GeometryParams,
}

impl RegionSynthesizer {
    /// A synthesizer with default geometry parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the geometry parameters.
    pub fn with_params(mut self, params: GeometryParams) -> Self {
        self.params = params;
        self
    }

    /// Set the number of segments per disk.
    pub fn with_segments(mut self, segments: usize) -> Self {
        self.params.segments = segments;
        self
    }

    /// Build one region per cluster that has both a threshold and points.
    ///
    /// Points labeled noise, or with a label that has no threshold, are
    /// ignored. A threshold without any points, or a cluster id with two
    /// thresholds, is an [`Error::InternalConsistency`]. A cluster whose
    /// geometry degenerates is reported in [`Synthesis::dropped`] and does
    /// not affect the others.
    #[instrument(skip_all, fields(points = points.len(), clusters = thresholds.len()), level = "debug")]
    pub fn synthesize(
        &self,
        points: &[Point],
        labels: &[i64],
        thresholds: &[ClusterThreshold],
    ) -> Result<Synthesis> {
        self.params.validate()?;
        if points.len() != labels.len() {
            return Err(Error::LengthMismatch {
                points: points.len(),
                labels: labels.len(),
            });
        }

        let mut lookup: BTreeMap<i64, &ClusterThreshold> = BTreeMap::new();
        for t in thresholds {
            if lookup.insert(t.cluster_id, t).is_some() {
                return Err(Error::InternalConsistency(format!(
                    "cluster {} has more than one threshold",
                    t.cluster_id
                )));
            }
        }

        let mut groups: BTreeMap<i64, Vec<&Point>> = BTreeMap::new();
        for (index, (point, &label)) in points.iter().zip(labels).enumerate() {
            if label == NOISE || !lookup.contains_key(&label) {
                continue;
            }
            if !point.is_finite() {
                return Err(Error::NonFiniteCoordinate { index });
            }
            groups.entry(label).or_default().push(point);
        }

        let clustered: usize = groups.values().map(Vec::len).sum();
        if clustered > self.params.max_points {
            return Err(Error::TooManyPoints {
                found: clustered,
                limit: self.params.max_points,
            });
        }

        let mut work = Vec::with_capacity(lookup.len());
        for (&cluster_id, &threshold) in &lookup {
            let members = groups.remove(&cluster_id).ok_or_else(|| {
                Error::InternalConsistency(format!("cluster {cluster_id} has a threshold but no points"))
            })?;
            work.push((threshold, members));
        }

        let segments = self.params.segments;
        let built: Vec<std::result::Result<Region, DroppedCluster>> = work
            .into_par_iter()
            .map(|(threshold, members)| build_region(threshold, &members, segments))
            .collect();

        let mut out = Synthesis::default();
        for result in built {
            match result {
                Ok(region) => out.regions.push(region),
                Err(dropped) => {
                    warn!(cluster_id = dropped.cluster_id, error = %dropped.error, "dropping cluster region");
                    out.dropped.push(dropped);
                }
            }
        }

        debug!(
            regions = out.regions.len(),
            dropped = out.dropped.len(),
            "regions synthesized"
        );
        Ok(out)
    }
}

fn build_region(
    threshold: &ClusterThreshold,
    members: &[&Point],
    segments: usize,
) -> std::result::Result<Region, DroppedCluster> {
    let cluster_id = threshold.cluster_id;
    let dropped = |reason| DroppedCluster {
        cluster_id,
        error: Error::DegenerateGeometry { cluster_id, reason },
    };

    let radius = threshold.epsilon;
    if !(radius.is_finite() && radius > 0.0) {
        return Err(dropped("radius is not a positive finite number"));
    }

    let disks = members
        .iter()
        .map(|p| geometry::disk(GeoPoint::from(p.coord()), radius, segments))
        .collect();
    let geometry = geometry::cascaded_union(disks);
    if let Some(reason) = geometry::degeneracy(&geometry) {
        return Err(dropped(reason));
    }

    let mean_score = members.iter().map(|p| p.score).sum::<f64>() / members.len() as f64;
    let keywords = members
        .iter()
        .flat_map(|p| p.keywords.iter().cloned())
        .collect();

    Ok(Region {
        cluster_id,
        size: threshold.cluster_size,
        geometry,
        mean_score,
        keywords,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{point, Contains};

    fn threshold(cluster_id: i64, cluster_size: usize, epsilon: f64) -> ClusterThreshold {
        ClusterThreshold {
            cluster_id,
            cluster_size,
            epsilon,
        }
    }

    #[test]
    fn aggregates_scores_and_keywords() {
        let points = vec![
            Point::new(0.0, 0.0, 0.2).with_keywords(["a"]),
            Point::new(0.1, 0.0, 0.4).with_keywords(["a", "b"]),
            Point::new(0.2, 0.0, 0.6).with_keywords(["b"]),
        ];
        let out = RegionSynthesizer::new()
            .synthesize(&points, &[7, 7, 7], &[threshold(7, 3, 1.0)])
            .unwrap();

        assert_eq!(out.regions.len(), 1);
        let r = &out.regions[0];
        assert_eq!((r.cluster_id, r.size), (7, 3));
        assert!((r.mean_score - 0.4).abs() < 1e-12);
        assert_eq!(r.keywords.iter().collect::<Vec<_>>(), vec![("a", 2), ("b", 2)]);
    }

    #[test]
    fn lobes_follow_disk_overlap() {
        let far = vec![Point::new(0.0, 0.0, 1.0), Point::new(10.0, 0.0, 1.0)];
        let near = vec![Point::new(0.0, 0.0, 1.0), Point::new(0.5, 0.0, 1.0)];
        let t = [threshold(1, 2, 1.0)];
        let s = RegionSynthesizer::new();

        assert_eq!(s.synthesize(&far, &[1, 1], &t).unwrap().regions[0].geometry.0.len(), 2);
        assert_eq!(s.synthesize(&near, &[1, 1], &t).unwrap().regions[0].geometry.0.len(), 1);
    }

    #[test]
    fn noise_and_unknown_labels_are_ignored() {
        let points = vec![
            Point::new(0.0, 0.0, 1.0),
            Point::new(0.2, 0.0, 0.0),
            Point::new(50.0, 50.0, 100.0),
            Point::new(-50.0, 0.0, 100.0),
        ];
        let out = RegionSynthesizer::new()
            .synthesize(&points, &[3, 3, NOISE, 9], &[threshold(3, 2, 0.5)])
            .unwrap();

        assert_eq!(out.regions.len(), 1);
        let r = &out.regions[0];
        assert!((r.mean_score - 0.5).abs() < 1e-12);
        assert!(!r.geometry.contains(&point!(x: 50.0, y: 50.0)));
        assert!(!r.geometry.contains(&point!(x: -50.0, y: 0.0)));
    }

    #[test]
    fn size_comes_from_threshold() {
        let points = vec![Point::new(0.0, 0.0, 1.0), Point::new(0.1, 0.0, 1.0)];
        let out = RegionSynthesizer::new()
            .synthesize(&points, &[4, 4], &[threshold(4, 5, 1.0)])
            .unwrap();
        assert_eq!(out.regions[0].size, 5);
    }

    #[test]
    fn threshold_without_points_is_internal_error() {
        let points = vec![Point::new(0.0, 0.0, 1.0), Point::new(0.1, 0.0, 1.0)];
        let err = RegionSynthesizer::new()
            .synthesize(&points, &[4, 4], &[threshold(4, 2, 1.0), threshold(5, 2, 1.0)])
            .unwrap_err();
        assert!(matches!(err, Error::InternalConsistency(_)));
    }

    #[test]
    fn duplicate_threshold_is_internal_error() {
        let points = vec![Point::new(0.0, 0.0, 1.0)];
        let err = RegionSynthesizer::new()
            .synthesize(&points, &[4], &[threshold(4, 2, 1.0), threshold(4, 2, 2.0)])
            .unwrap_err();
        assert!(matches!(err, Error::InternalConsistency(_)));
    }

    #[test]
    fn degenerate_cluster_is_dropped_not_fatal() {
        let points = vec![
            Point::new(0.0, 0.0, 1.0),
            Point::new(0.1, 0.0, 1.0),
            Point::new(5.0, 5.0, 1.0),
            Point::new(5.1, 5.0, 1.0),
        ];
        let out = RegionSynthesizer::new()
            .synthesize(&points, &[1, 1, 2, 2], &[threshold(1, 2, 0.0), threshold(2, 2, 0.5)])
            .unwrap();

        assert_eq!(out.regions.len(), 1);
        assert_eq!(out.regions[0].cluster_id, 2);
        assert_eq!(out.dropped.len(), 1);
        assert_eq!(out.dropped[0].cluster_id, 1);
        assert!(matches!(out.dropped[0].error, Error::DegenerateGeometry { cluster_id: 1, .. }));
    }

    #[test]
    fn overflowing_area_is_dropped() {
        let points = vec![Point::new(0.0, 0.0, 1.0), Point::new(5.0, 5.0, 1.0)];
        let out = RegionSynthesizer::new()
            .synthesize(&points, &[1, 2], &[threshold(1, 1, 1e300), threshold(2, 1, 0.5)])
            .unwrap();

        assert_eq!(out.regions.len(), 1);
        assert_eq!(out.regions[0].cluster_id, 2);
        assert_eq!(out.dropped.len(), 1);
        assert!(matches!(
            out.dropped[0].error,
            Error::DegenerateGeometry { cluster_id: 1, reason: "zero or non-finite area" }
        ));
    }

    #[test]
    fn length_mismatch_is_rejected() {
        let err = RegionSynthesizer::new()
            .synthesize(&[Point::new(0.0, 0.0, 1.0)], &[], &[])
            .unwrap_err();
        assert!(matches!(err, Error::LengthMismatch { points: 1, labels: 0 }));
    }

    #[test]
    fn point_budget_is_enforced() {
        let points: Vec<Point> = (0..4).map(|i| Point::new(i as f64, 0.0, 1.0)).collect();
        let s = RegionSynthesizer::new().with_params(GeometryParams {
            max_points: 3,
            ..GeometryParams::default()
        });
        let err = s.synthesize(&points, &[1; 4], &[threshold(1, 4, 1.0)]).unwrap_err();
        assert!(matches!(err, Error::TooManyPoints { found: 4, limit: 3 }));

        // Noise does not count against the budget.
        let out = s.synthesize(&points, &[1, 1, 1, NOISE], &[threshold(1, 3, 1.0)]).unwrap();
        assert_eq!(out.regions.len(), 1);
    }

    #[test]
    fn empty_input_yields_no_regions() {
        let out = RegionSynthesizer::new().synthesize(&[], &[], &[]).unwrap();
        assert!(out.regions.is_empty());
        assert!(out.dropped.is_empty());
    }

    #[test]
    fn too_few_segments_is_invalid() {
        for segments in [4, MIN_SEGMENTS - 1] {
            let err = RegionSynthesizer::new()
                .with_segments(segments)
                .synthesize(&[], &[], &[])
                .unwrap_err();
            assert!(matches!(err, Error::InvalidParameter { name: "segments", .. }));
        }
        assert!(RegionSynthesizer::new().with_segments(MIN_SEGMENTS).synthesize(&[], &[], &[]).is_ok());
    }
}
