//! Coordinate registry: source axis vectors and flat destination sites.

use ndarray::{indices, IxDyn};
use serde::{Deserialize, Serialize};

use crate::error::{Result, StagingError};
use crate::types::{Axis, Extents, ShapeCategory};

/// Plaid source coordinates, one strictly increasing vector per axis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceCoordinates {
    pub x1: Vec<f64>,
    pub x2: Vec<f64>,
    pub x3: Vec<f64>,
}

impl SourceCoordinates {
    /// Create source coordinates from per-axis vectors.
    pub fn new(x1: Vec<f64>, x2: Vec<f64>, x3: Vec<f64>) -> Self {
        Self { x1, x2, x3 }
    }

    /// Coordinate vector of one axis.
    pub fn axis(&self, axis: Axis) -> &[f64] {
        match axis {
            Axis::X1 => &self.x1,
            Axis::X2 => &self.x2,
            Axis::X3 => &self.x3,
        }
    }

    /// Check lengths against the source extents and that every axis increases.
    pub fn validate(&self, extents: &Extents) -> Result<()> {
        for axis in Axis::ALL {
            let coords = self.axis(axis);
            if coords.len() != extents.get(axis) {
                return Err(StagingError::coordinate_length(
                    format!("source {} coordinates", axis),
                    extents.get(axis),
                    coords.len(),
                ));
            }
            if coords.windows(2).any(|w| !(w[1] > w[0])) {
                return Err(StagingError::NonMonotonicCoordinates(axis));
            }
        }
        Ok(())
    }
}

/// Destination ("interpolation site") coordinates.
///
/// Each vector holds one coordinate per destination lattice point, flattened
/// in C order (see [`Extents::flat_index`]), so curvilinear destination grids
/// need no special treatment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DestinationCoordinates {
    pub x1i: Vec<f64>,
    pub x2i: Vec<f64>,
    pub x3i: Vec<f64>,
}

impl DestinationCoordinates {
    /// Create destination coordinates from flat per-axis vectors.
    pub fn new(x1i: Vec<f64>, x2i: Vec<f64>, x3i: Vec<f64>) -> Self {
        Self { x1i, x2i, x3i }
    }

    /// Flat coordinate vector of one axis.
    pub fn axis(&self, axis: Axis) -> &[f64] {
        match axis {
            Axis::X1 => &self.x1i,
            Axis::X2 => &self.x2i,
            Axis::X3 => &self.x3i,
        }
    }

    /// Check every vector covers the whole destination lattice.
    pub fn validate(&self, extents: &Extents) -> Result<()> {
        for axis in Axis::ALL {
            let len = self.axis(axis).len();
            if len != extents.len() {
                return Err(StagingError::coordinate_length(
                    format!("destination {} coordinates", axis),
                    extents.len(),
                    len,
                ));
            }
        }
        Ok(())
    }

    /// Coordinates along `axis` of every destination site of `category`, in
    /// the C order of the category's own axes.
    ///
    /// A category that spans only some axes uses the lattice points whose
    /// index on every other axis is zero.
    pub fn gather(&self, axis: Axis, category: ShapeCategory, extents: &Extents) -> Vec<f64> {
        let flat = self.axis(axis);
        let dims = extents.select(category);
        let axes = category.axes();

        indices(IxDyn(&dims))
            .into_iter()
            .map(|idx| {
                let mut full = [0usize; 3];
                for (pos, ax) in axes.iter().enumerate() {
                    full[ax.index()] = idx[pos];
                }
                flat[extents.flat_index(full[0], full[1], full[2])]
            })
            .collect()
    }
}

/// Holds the source coordinates and, once computed, the destination sites.
#[derive(Debug, Clone, Default)]
pub struct CoordinateRegistry {
    source: Option<SourceCoordinates>,
    destination: Option<DestinationCoordinates>,
}

impl CoordinateRegistry {
    /// Store validated source coordinates.
    pub fn set_source(&mut self, coords: SourceCoordinates, extents: &Extents) -> Result<()> {
        coords.validate(extents)?;
        self.source = Some(coords);
        Ok(())
    }

    /// Store validated destination coordinates.
    pub fn set_destination(
        &mut self,
        coords: DestinationCoordinates,
        extents: &Extents,
    ) -> Result<()> {
        coords.validate(extents)?;
        self.destination = Some(coords);
        Ok(())
    }

    /// Source coordinates, if set.
    pub fn source(&self) -> Option<&SourceCoordinates> {
        self.source.as_ref()
    }

    /// Destination coordinates, if computed.
    pub fn destination(&self) -> Option<&DestinationCoordinates> {
        self.destination.as_ref()
    }

    /// Forget all coordinates; the next refresh recomputes destination sites.
    pub fn clear(&mut self) {
        self.source = None;
        self.destination = None;
    }
}
