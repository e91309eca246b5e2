//! Density clusters to scored map regions.
//!
//! `clump-regions` takes geolocated search hits (each with a relevance score
//! and keywords) and produces one polygon region per density cluster, ready
//! to be drawn as a choropleth:
//!
//! 1. [`cluster::ClusterLabeler`] runs a density clustering primitive
//!    (HDBSCAN by default) and keeps its condensed hierarchy.
//! 2. [`epsilon::extract`] turns each selected cluster's merge density into
//!    a precision radius.
//! 3. [`region::RegionSynthesizer`] buffers every clustered point by its
//!    cluster's radius, unions the disks, and aggregates scores and keywords.
//!
//! [`RegionPipeline`] wires the three together.
//!
//! ```rust
//! use clump_regions::{PipelineConfig, Point, RegionPipeline};
//!
//! let points = vec![
//!     Point::new(23.72, 37.98, 0.9).with_keywords(["museum"]),
//!     Point::new(23.73, 37.98, 0.7).with_keywords(["museum", "cafe"]),
//!     Point::new(22.94, 40.64, 0.2).with_keywords(["port"]),
//!     Point::new(22.95, 40.64, 0.4),
//! ];
//!
//! let out = RegionPipeline::new(PipelineConfig::default()).run(&points).unwrap();
//! assert_eq!(out.synthesis.regions.len(), 2);
//! ```

#![forbid(unsafe_code)]

pub mod cluster;
pub mod epsilon;
pub mod error;
pub mod export;
pub mod geometry;
pub mod pipeline;
pub mod point;
pub mod region;
pub mod summary;

pub use cluster::{
    ClusterLabeler, ClusterParams, CondensedHierarchyEdge, DensityClustering,
    DensityClusteringProvider, Hdbscan, NOISE,
};
pub use epsilon::ClusterThreshold;
pub use error::{Error, Result};
pub use pipeline::{PipelineConfig, PipelineOutput, RegionPipeline};
pub use point::{KeywordBag, Point};
pub use region::{DroppedCluster, GeometryParams, Region, RegionSynthesizer, Synthesis};
