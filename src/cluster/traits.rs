use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::condensed::CondensedHierarchyEdge;
use super::NOISE;
use crate::error::{Error, Result};

/// Parameters handed to a density clustering primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterParams {
    /// Minimum points for a split side to count as a cluster.
    pub min_cluster_size: usize,
    /// Neighborhood size for core distances, counting the point itself.
    pub min_samples: usize,
    /// Compute core distances on the rayon pool.
    pub parallel: bool,
}

impl Default for ClusterParams {
    fn default() -> Self {
        Self {
            min_cluster_size: 2,
            min_samples: 2,
            parallel: true,
        }
    }
}

impl ClusterParams {
    /// Set `min_cluster_size`.
    pub fn with_min_cluster_size(mut self, min_cluster_size: usize) -> Self {
        self.min_cluster_size = min_cluster_size;
        self
    }

    /// Set `min_samples`.
    pub fn with_min_samples(mut self, min_samples: usize) -> Self {
        self.min_samples = min_samples;
        self
    }

    /// Enable or disable parallel distance computation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Reject parameter values no density primitive can honor.
    pub fn validate(&self) -> Result<()> {
        if self.min_samples == 0 {
            return Err(Error::InvalidParameter {
                name: "min_samples",
                message: "must be at least 1",
            });
        }
        if self.min_cluster_size < 2 {
            return Err(Error::InvalidParameter {
                name: "min_cluster_size",
                message: "must be at least 2",
            });
        }
        Ok(())
    }
}

/// Output of a density clustering primitive.
///
/// `labels` and `selected` use the hierarchy's cluster id space: a point
/// labeled `c` belongs to the selected cluster whose condensed-tree id is `c`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DensityClustering {
    /// One label per input point, in input order (`-1` = noise).
    pub labels: Vec<i64>,
    /// The condensed hierarchy.
    pub hierarchy: Vec<CondensedHierarchyEdge>,
    /// Cluster ids chosen as the flat clustering.
    pub selected: BTreeSet<i64>,
}

impl DensityClustering {
    /// The degenerate result: every point is noise, no structure.
    pub fn all_noise(n: usize) -> Self {
        Self {
            labels: vec![NOISE; n],
            hierarchy: Vec::new(),
            selected: BTreeSet::new(),
        }
    }

    /// Number of points labeled as noise.
    pub fn noise_count(&self) -> usize {
        self.labels.iter().filter(|&&l| l == NOISE).count()
    }
}

/// A density clustering primitive that exposes its condensed hierarchy.
///
/// Implementations must be deterministic for a fixed input order.
pub trait DensityClusteringProvider {
    /// Cluster `points` (`[x, y]` pairs) with the given parameters.
    fn cluster(&self, points: &[[f64; 2]], params: &ClusterParams) -> Result<DensityClustering>;
}

impl<P: DensityClusteringProvider + ?Sized> DensityClusteringProvider for &P {
    fn cluster(&self, points: &[[f64; 2]], params: &ClusterParams) -> Result<DensityClustering> {
        (**self).cluster(points, params)
    }
}
