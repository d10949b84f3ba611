//! The contract each concrete dataset kind implements.

use std::path::Path;

use chrono::{DateTime, Utc};

use crate::calendar;
use crate::config::SimulationConfig;
use crate::coords::{DestinationCoordinates, SourceCoordinates};
use crate::error::LoadError;
use crate::grid::SimulationGrid;
use crate::storage::RawFrame;
use crate::types::{Extents, ShapeCounts};

/// Source-side shape reported by a variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceShape {
    /// Lengths of the source coordinate axes.
    pub extents: Extents,
    /// Number of quantities in each shape category.
    pub counts: ShapeCounts,
}

/// Parameters of one frame load.
#[derive(Debug, Clone, Copy)]
pub struct LoadRequest<'a> {
    /// Simulation time of the step that triggered the load.
    pub t: f64,
    /// Model time step.
    pub dt_model: f64,
    /// Date of the frame currently in the "next" slot.
    pub previous: DateTime<Utc>,
    /// Date of the frame to load (`previous + cadence`).
    pub target: DateTime<Utc>,
    /// Data cadence in seconds.
    pub cadence: f64,
    /// Where the dataset's external data lives.
    pub source: &'a Path,
}

/// Deferred operations a concrete dataset kind supplies.
///
/// The staging engine owns all buffers and timing; a variant only knows how to
/// discover its source layout, compute destination sites on the host grid, and
/// read frames. Reading is synchronous and may be slow.
pub trait DataVariant {
    /// Host grid type the variant projects onto.
    type Grid: SimulationGrid;

    /// Discover the source axis extents and quantity counts.
    ///
    /// # Arguments
    /// * `source` - Location of the dataset's external data
    fn load_size(&mut self, source: &Path) -> Result<SourceShape, LoadError>;

    /// Read the source coordinate vectors.
    ///
    /// # Arguments
    /// * `source` - Location of the dataset's external data
    fn load_grid(&mut self, source: &Path) -> Result<SourceCoordinates, LoadError>;

    /// Compute destination sites on the host grid.
    ///
    /// # Arguments
    /// * `config` - Run configuration
    /// * `grid` - Host simulation grid
    /// * `extents` - Destination extents registered for this dataset
    ///
    /// # Returns
    /// Flat destination coordinates covering `extents`
    fn set_coordsi(
        &mut self,
        config: &SimulationConfig,
        grid: &Self::Grid,
        extents: Extents,
    ) -> Result<DestinationCoordinates, LoadError>;

    /// Read the frame at `request.target` into `frame`.
    ///
    /// # Returns
    /// The date of the frame actually loaded
    fn load_data(
        &mut self,
        request: &LoadRequest<'_>,
        frame: &mut RawFrame,
    ) -> Result<DateTime<Utc>, LoadError>;

    /// Destination extents on the host grid. Defaults to the grid's extents;
    /// surface datasets override this to collapse an axis.
    fn destination_extents(&self, grid: &Self::Grid) -> Extents {
        grid.extents()
    }

    /// Latest frame date at or before `target`, for frames spaced `cadence`
    /// seconds apart from `origin`.
    fn last_frame_at_or_before(
        &self,
        origin: DateTime<Utc>,
        target: DateTime<Utc>,
        cadence: f64,
    ) -> DateTime<Utc> {
        calendar::last_frame_at_or_before(origin, target, cadence)
    }
}
