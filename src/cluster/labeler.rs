use tracing::{debug, instrument};

use super::hdbscan::Hdbscan;
use super::traits::{ClusterParams, DensityClustering, DensityClusteringProvider};
use crate::error::{Error, Result};
use crate::point::Point;

/// Default bound on points handed to the O(n^2) density primitive, and on
/// clustered points buffered by [`RegionSynthesizer`](crate::RegionSynthesizer).
pub const DEFAULT_MAX_POINTS: usize = 5_000;

/// Runs a density clustering primitive over a point set.
#[derive(Debug, Clone)]
pub struct ClusterLabeler<P = Hdbscan> {
    provider: P,
    params: ClusterParams,
    max_points: usize,
}

impl ClusterLabeler<Hdbscan> {
    /// A labeler backed by [`Hdbscan`] with default parameters.
    pub fn new() -> Self {
        Self::with_provider(Hdbscan)
    }
}

impl Default for ClusterLabeler<Hdbscan> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: DensityClusteringProvider> ClusterLabeler<P> {
    /// A labeler backed by `provider` with default parameters.
    pub fn with_provider(provider: P) -> Self {
        Self {
            provider,
            params: ClusterParams::default(),
            max_points: DEFAULT_MAX_POINTS,
        }
    }

    /// Set the clustering parameters.
    pub fn with_params(mut self, params: ClusterParams) -> Self {
        self.params = params;
        self
    }

    /// Set the largest point count accepted.
    pub fn with_max_points(mut self, max_points: usize) -> Self {
        self.max_points = max_points;
        self
    }

    /// The configured parameters.
    pub fn params(&self) -> &ClusterParams {
        &self.params
    }

    /// Label `points`, returning one label per point in input order along
    /// with the condensed hierarchy and the selected cluster ids.
    ///
    /// Fewer than two points is not an error: the result is all noise.
    #[instrument(skip_all, fields(points = points.len()), level = "debug")]
    pub fn label(&self, points: &[Point]) -> Result<DensityClustering> {
        self.params.validate()?;

        if let Some(index) = points.iter().position(|p| !p.is_finite()) {
            return Err(Error::NonFiniteCoordinate { index });
        }
        if points.len() > self.max_points {
            return Err(Error::TooManyPoints {
                found: points.len(),
                limit: self.max_points,
            });
        }
        if points.len() < 2 {
            return Ok(DensityClustering::all_noise(points.len()));
        }

        let coords: Vec<[f64; 2]> = points.iter().map(Point::xy).collect();
        let out = self.provider.cluster(&coords, &self.params)?;

        if out.labels.len() != points.len() {
            return Err(Error::InternalConsistency(format!(
                "provider returned {} labels for {} points",
                out.labels.len(),
                points.len()
            )));
        }

        debug!(
            clusters = out.selected.len(),
            noise = out.noise_count(),
            "points labeled"
        );
        Ok(out)
    }
}
