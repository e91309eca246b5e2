//! HDBSCAN: Hierarchical Density-Based Spatial Clustering of Applications with Noise.
//!
//! HDBSCAN (Campello, Moulavi, Sander 2013) extends DBSCAN by removing the global
//! epsilon parameter and instead building a hierarchy of density-based clusters.
//! It selects the most stable clusters from the hierarchy automatically.
//!
//! # Algorithm Outline
//!
//! 1. **Core distance**: For each point, the distance to its `min_samples`-th
//!    nearest point, counting the point itself. This estimates local density.
//!
//! 2. **Mutual reachability distance**: For each pair (i, j):
//!    `mrd(i, j) = max(core_dist[i], core_dist[j], dist(i, j))`.
//!    This smooths out density spikes so sparse regions don't create spurious links.
//!
//! 3. **MST on mutual reachability graph**: Prim's algorithm over the implicit
//!    complete graph (O(n^2) time, O(n) memory; distances are recomputed).
//!
//! 4. **Condensed cluster tree**: see [`super::condensed`].
//!
//! 5. **Stability-based cluster extraction**: excess of mass over the
//!    condensed tree, root excluded.
//!
//! Unlike a plain label vector, the result keeps the condensed hierarchy and
//! the selected cluster ids, which is what per-cluster precision radii are
//! derived from.
//!
//! # References
//!
//! Campello, R. J. G. B., Moulavi, D., Sander, J. (2013). "Density-Based Clustering
//! Based on Hierarchical Density Estimates." PAKDD 2013.

use rayon::prelude::*;
use tracing::debug;

use super::condensed::{condense, label_points, select_clusters, single_linkage};
use super::traits::{ClusterParams, DensityClustering, DensityClusteringProvider};
use super::util::{self, euclidean};
use crate::error::{Error, Result};

/// Smallest distance scale the hierarchy resolves.
///
/// Mutual reachability distances are floored here so every lambda is finite.
/// Coordinates are degrees, so this is well below any meaningful precision.
pub const MIN_SCALE: f64 = 1e-12;

/// The default density clustering primitive.
#[derive(Debug, Clone, Copy, Default)]
pub struct Hdbscan;

impl Hdbscan {
    /// Create the provider.
    pub fn new() -> Self {
        Self
    }
}

impl DensityClusteringProvider for Hdbscan {
    fn cluster(&self, points: &[[f64; 2]], params: &ClusterParams) -> Result<DensityClustering> {
        params.validate()?;

        let n = points.len();
        if n < 2 {
            return Ok(DensityClustering::all_noise(n));
        }
        if n < params.min_samples {
            return Err(Error::InsufficientPoints {
                required: params.min_samples,
                found: n,
            });
        }
        if let Some(index) = points.iter().position(|p| !(p[0].is_finite() && p[1].is_finite())) {
            return Err(Error::NonFiniteCoordinate { index });
        }

        let core = core_distances(points, params.min_samples, params.parallel);

        let mut mst = util::prim_mst(n, |i, j| {
            mutual_reachability(euclidean(points[i], points[j]), core[i], core[j])
        });
        mst.sort_by(|a, b| a.2.total_cmp(&b.2));

        if mst.iter().all(|e| e.2 <= MIN_SCALE) {
            debug!(points = n, "all points coincide; no density structure");
            return Ok(DensityClustering::all_noise(n));
        }

        let linkage = single_linkage(&mst, n);
        let hierarchy = condense(&linkage, n, params.min_cluster_size);
        let selected = select_clusters(&hierarchy, n);
        let labels = label_points(&hierarchy, &selected, n);

        debug!(
            points = n,
            edges = hierarchy.len(),
            clusters = selected.len(),
            "condensed tree built"
        );

        Ok(DensityClustering {
            labels,
            hierarchy,
            selected,
        })
    }
}

fn core_distances(points: &[[f64; 2]], min_samples: usize, parallel: bool) -> Vec<f64> {
    // The point itself is its own first neighbor.
    let k = min_samples - 1;
    let core_of = |i: usize| -> f64 {
        if k == 0 {
            return 0.0;
        }
        let mut row: Vec<f64> = points
            .iter()
            .enumerate()
            .filter(|&(j, _)| j != i)
            .map(|(_, &q)| euclidean(points[i], q))
            .collect();
        let k = k.min(row.len());
        let (_, kth, _) = row.select_nth_unstable_by(k - 1, |a, b| a.total_cmp(b));
        *kth
    };

    if parallel {
        (0..points.len()).into_par_iter().map(core_of).collect()
    } else {
        (0..points.len()).map(core_of).collect()
    }
}

#[inline]
fn mutual_reachability(dist: f64, core_i: f64, core_j: f64) -> f64 {
    dist.max(core_i).max(core_j).max(MIN_SCALE)
}
