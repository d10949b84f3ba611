//! Error types for input staging.
//!
//! Two channels are kept apart. [`StagingError`] covers misuse of the staging
//! lifecycle (calling operations out of order, inconsistent shapes); a host is
//! expected to treat those as fatal. [`LoadError`] is what a dataset variant
//! reports when external data is missing or malformed, and reaches the host
//! wrapped in [`StagingError::Load`].

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::types::{Axis, ShapeCategory};

/// Errors that can occur while sizing, allocating, priming or advancing a dataset.
#[derive(Error, Debug)]
pub enum StagingError {
    /// `set_sizes` was called before the source extents were discovered.
    #[error("dataset '{0}': source extents must be discovered before sizes are set")]
    SizesBeforeExtents(String),

    /// `init_storage` was called before sizes were set.
    #[error("dataset '{0}': sizes must be set before storage is allocated")]
    StorageBeforeSizes(String),

    /// `set_coords` was called before storage was allocated.
    #[error("dataset '{0}': storage must be allocated before coordinates are set")]
    CoordsBeforeStorage(String),

    /// A frame was projected before the source coordinates were set.
    #[error("dataset '{0}': source coordinates are not set")]
    SourceCoordsNotSet(String),

    /// An update or priming call was made before storage was allocated.
    #[error("dataset '{0}': storage is not allocated")]
    NotAllocated(String),

    /// An update or priming call was made before the cadence was set.
    #[error("dataset '{0}': data cadence is not set")]
    CadenceNotSet(String),

    /// An update or priming call was made before the source location was set.
    #[error("dataset '{0}': source location is not set")]
    SourceNotSet(String),

    /// Cadence must be strictly positive and finite.
    #[error("invalid cadence {0} s")]
    InvalidCadence(f64),

    /// Source and destination disagree on whether an axis is a singleton.
    #[error(
        "singleton mismatch on {axis}: source extent {source_extent}, destination extent {destination_extent}"
    )]
    SingletonMismatch {
        axis: Axis,
        source_extent: usize,
        destination_extent: usize,
    },

    /// A shape category has a non-singleton pattern no interpolation rule covers.
    #[error("no interpolation rule for {category} with {active} non-singleton source axes")]
    UnsupportedShape {
        category: ShapeCategory,
        active: usize,
    },

    /// A coordinate vector does not have the length its axis requires.
    #[error("{what} has length {actual}, expected {expected}")]
    CoordinateLength {
        what: String,
        expected: usize,
        actual: usize,
    },

    /// Source coordinates must be strictly increasing along each axis.
    #[error("source coordinates along {0} are not strictly increasing")]
    NonMonotonicCoordinates(Axis),

    /// Quantity index beyond the category's count.
    #[error("{category} has {count} quantities, index {index} requested")]
    QuantityOutOfRange {
        category: ShapeCategory,
        count: usize,
        index: usize,
    },

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Buffer shape error.
    #[error("buffer shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),

    /// The dataset variant failed to provide data.
    #[error("dataset '{dataset}': {source}")]
    Load {
        dataset: String,
        #[source]
        source: LoadError,
    },
}

impl StagingError {
    /// Wrap a loader error with the name of the dataset it came from.
    pub fn load(dataset: impl Into<String>, source: LoadError) -> Self {
        Self::Load {
            dataset: dataset.into(),
            source,
        }
    }

    /// Create a CoordinateLength error.
    pub fn coordinate_length(what: impl Into<String>, expected: usize, actual: usize) -> Self {
        Self::CoordinateLength {
            what: what.into(),
            expected,
            actual,
        }
    }

    /// True for errors that indicate a programming error in the host or variant
    /// rather than bad external data.
    pub fn is_contract_violation(&self) -> bool {
        !matches!(self, Self::Load { .. } | Self::Config(_))
    }
}

/// Errors reported by a dataset variant while reading external data.
#[derive(Error, Debug)]
pub enum LoadError {
    /// No frame exists for the requested date.
    #[error("no frame available for {0}")]
    MissingFrame(DateTime<Utc>),

    /// The external data could not be interpreted.
    #[error("malformed input: {0}")]
    Malformed(String),

    /// The external data does not match the registered shape.
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl LoadError {
    /// Create a Malformed error.
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::Malformed(msg.into())
    }

    /// Create a ShapeMismatch error.
    pub fn shape_mismatch(msg: impl Into<String>) -> Self {
        Self::ShapeMismatch(msg.into())
    }
}

impl From<serde_yaml::Error> for StagingError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<std::io::Error> for StagingError {
    fn from(err: std::io::Error) -> Self {
        Self::Config(err.to_string())
    }
}

/// Result type for staging operations.
pub type Result<T> = std::result::Result<T, StagingError>;
