use thiserror::Error;

/// Errors returned by the labeling, extraction, and synthesis stages.
#[derive(Debug, Error)]
pub enum Error {
    /// Fewer points than the density primitive's hard floor.
    #[error("insufficient points: need at least {required}, found {found}")]
    InsufficientPoints {
        /// Minimum number of points the primitive accepts.
        required: usize,
        /// Number of points supplied.
        found: usize,
    },

    /// Invalid parameter value.
    #[error("invalid parameter {name}: {message}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Human-readable explanation.
        message: &'static str,
    },

    /// A coordinate is NaN or infinite.
    #[error("non-finite coordinate at point {index}")]
    NonFiniteCoordinate {
        /// Index of the offending point.
        index: usize,
    },

    /// Points and labels are not parallel sequences.
    #[error("length mismatch: {points} points but {labels} labels")]
    LengthMismatch {
        /// Number of points.
        points: usize,
        /// Number of labels.
        labels: usize,
    },

    /// Input exceeds the configured bound on geometry work.
    #[error("too many points: {found} exceeds the configured limit of {limit}")]
    TooManyPoints {
        /// Number of points supplied.
        found: usize,
        /// Configured limit.
        limit: usize,
    },

    /// An invariant between the density primitive and this crate was broken.
    #[error("internal consistency error: {0}")]
    InternalConsistency(String),

    /// Buffering or union produced an empty or invalid polygon.
    #[error("degenerate geometry for cluster {cluster_id}: {reason}")]
    DegenerateGeometry {
        /// Cluster whose region could not be built.
        cluster_id: i64,
        /// What went wrong.
        reason: &'static str,
    },

    /// A location string is not a well-formed `POINT(x y)`.
    #[error("invalid WKT point: {0:?}")]
    InvalidWkt(String),

    /// JSON (configuration or export) could not be read or written.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type used by this crate.
pub type Result<T> = std::result::Result<T, Error>;
