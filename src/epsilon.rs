//! Per-cluster precision radii from the condensed hierarchy.
//!
//! A selected cluster is born at density `lambda` when it splits off its
//! parent. Its precision radius is `epsilon = 1 / lambda`: the distance scale
//! at which its points stop being distinguishable from the rest of the data.
//! A cluster born at a looser merge (smaller lambda) gets a larger radius.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::cluster::CondensedHierarchyEdge;
use crate::error::{Error, Result};

/// Precision radius and size of one selected cluster.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClusterThreshold {
    /// Condensed-tree cluster id (also the label its points carry).
    pub cluster_id: i64,
    /// Points in the cluster according to the hierarchy.
    pub cluster_size: usize,
    /// Buffer radius, in coordinate units.
    pub epsilon: f64,
}

/// Reduce the hierarchy to one [`ClusterThreshold`] per selected cluster.
///
/// Singleton edges are ignored. A selected id with no surviving edge is
/// dropped silently; a selected id with more than one surviving edge, or a
/// surviving edge with a non-positive or non-finite lambda, is an
/// [`Error::InternalConsistency`]. Rows come out ordered by cluster id.
pub fn extract(
    hierarchy: &[CondensedHierarchyEdge],
    selected: &BTreeSet<i64>,
) -> Result<Vec<ClusterThreshold>> {
    let mut rows: BTreeMap<i64, ClusterThreshold> = BTreeMap::new();

    for edge in hierarchy
        .iter()
        .filter(|e| e.is_cluster() && selected.contains(&e.child))
    {
        if !(edge.lambda_val.is_finite() && edge.lambda_val > 0.0) {
            return Err(Error::InternalConsistency(format!(
                "cluster {} merges at lambda {}",
                edge.child, edge.lambda_val
            )));
        }
        let row = ClusterThreshold {
            cluster_id: edge.child,
            cluster_size: edge.child_size,
            epsilon: 1.0 / edge.lambda_val,
        };
        if rows.insert(edge.child, row).is_some() {
            return Err(Error::InternalConsistency(format!(
                "cluster {} appears more than once in the hierarchy",
                edge.child
            )));
        }
    }

    Ok(rows.into_values().collect())
}
