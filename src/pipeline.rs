//! End-to-end: points -> labels -> thresholds -> regions.
//!
//! Each run owns everything it produces; nothing is cached between runs, so
//! one [`RegionPipeline`] can serve concurrent queries by shared reference.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::cluster::{ClusterLabeler, ClusterParams, DensityClustering, DensityClusteringProvider, Hdbscan};
use crate::epsilon::{self, ClusterThreshold};
use crate::error::Result;
use crate::point::Point;
use crate::region::{GeometryParams, RegionSynthesizer, Synthesis};

/// Pipeline configuration.
///
/// ```rust
/// use clump_regions::PipelineConfig;
///
/// let config = PipelineConfig::from_json_str(r#"{"geometry": {"segments": 32}}"#).unwrap();
/// assert_eq!(config.geometry.segments, 32);
/// assert_eq!(config.clustering.min_samples, 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Density clustering parameters.
    pub clustering: ClusterParams,
    /// Buffering and union parameters.
    pub geometry: GeometryParams,
}

impl PipelineConfig {
    /// Parse and validate a JSON configuration; missing fields take defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate both parameter groups.
    pub fn validate(&self) -> Result<()> {
        self.clustering.validate()?;
        self.geometry.validate()
    }
}

/// Everything one run produces.
#[derive(Debug)]
pub struct PipelineOutput {
    /// Labels, hierarchy, and selected clusters.
    pub clustering: DensityClustering,
    /// One row per selected, non-singleton cluster.
    pub thresholds: Vec<ClusterThreshold>,
    /// Regions and dropped clusters.
    pub synthesis: Synthesis,
}

/// Labeler, extractor, and synthesizer wired together.
#[derive(Debug, Clone)]
pub struct RegionPipeline<P = Hdbscan> {
    labeler: ClusterLabeler<P>,
    synthesizer: RegionSynthesizer,
}

impl RegionPipeline<Hdbscan> {
    /// A pipeline over [`Hdbscan`] with `config`.
    pub fn new(config: PipelineConfig) -> Self {
        Self::with_provider(Hdbscan, config)
    }
}

impl Default for RegionPipeline<Hdbscan> {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}

impl<P: DensityClusteringProvider> RegionPipeline<P> {
    /// A pipeline over a custom clustering provider.
    pub fn with_provider(provider: P, config: PipelineConfig) -> Self {
        Self {
            labeler: ClusterLabeler::with_provider(provider)
                .with_params(config.clustering)
                .with_max_points(config.geometry.max_points),
            synthesizer: RegionSynthesizer::new().with_params(config.geometry),
        }
    }

    /// Run all three stages over `points`.
    #[instrument(skip_all, fields(points = points.len()), level = "debug")]
    pub fn run(&self, points: &[Point]) -> Result<PipelineOutput> {
        let clustering = self.labeler.label(points)?;
        let thresholds = epsilon::extract(&clustering.hierarchy, &clustering.selected)?;
        debug!(thresholds = thresholds.len(), "precision radii extracted");
        let synthesis = self
            .synthesizer
            .synthesize(points, &clustering.labels, &thresholds)?;
        Ok(PipelineOutput {
            clustering,
            thresholds,
            synthesis,
        })
    }
}
