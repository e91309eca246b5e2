//! Density clustering of result points.
//!
//! This module turns a point set into per-point cluster labels plus the
//! condensed hierarchy those labels were cut from.
//!
//! ## Why a hierarchy, not just labels
//!
//! Density clustering (HDBSCAN) does not fix a global neighborhood radius.
//! Each cluster is born at its own density level `lambda` in the condensed
//! tree, and `1 / lambda` is the spatial scale at which that cluster's
//! points separate from the rest. Downstream, that scale becomes the
//! cluster's precision radius (see [`crate::epsilon`]), so the hierarchy has
//! to survive the clustering step.
//!
//! ## Pieces
//!
//! - [`DensityClusteringProvider`]: the seam. Anything that can produce
//!   labels, a condensed hierarchy, and a selected cluster set.
//! - [`Hdbscan`]: the default provider.
//! - [`ClusterLabeler`]: validates input, applies [`ClusterParams`], and
//!   calls the provider.
//!
//! ## Usage
//!
//! ```rust
//! use clump_regions::cluster::{ClusterLabeler, NOISE};
//! use clump_regions::Point;
//!
//! let points = vec![
//!     Point::new(0.0, 0.0, 1.0),
//!     Point::new(0.1, 0.0, 1.0),
//!     Point::new(10.0, 0.0, 1.0),
//!     Point::new(10.1, 0.0, 1.0),
//! ];
//!
//! let out = ClusterLabeler::new().label(&points).unwrap();
//! assert_eq!(out.labels[0], out.labels[1]);
//! assert_ne!(out.labels[0], out.labels[2]);
//! assert!(out.labels.iter().all(|&l| l != NOISE));
//! ```

mod condensed;
mod hdbscan;
mod labeler;
mod traits;
mod util;

pub use condensed::{label_points, select_clusters, CondensedHierarchyEdge};
pub use hdbscan::{Hdbscan, MIN_SCALE};
pub use labeler::{ClusterLabeler, DEFAULT_MAX_POINTS};
pub use traits::{ClusterParams, DensityClustering, DensityClusteringProvider};

/// Label of a point that belongs to no cluster.
pub const NOISE: i64 = -1;
