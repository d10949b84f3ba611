//! The simulation grid as seen by the staging engine.

use serde::{Deserialize, Serialize};

use crate::coords::DestinationCoordinates;
use crate::error::{Result, StagingError};
use crate::types::{Axis, Extents};

/// What the staging engine needs from a host simulation grid.
pub trait SimulationGrid {
    /// Extents of the grid's three axes.
    fn extents(&self) -> Extents;
}

/// A grid given by explicit per-point coordinates.
///
/// Coordinates are flat, C-ordered over `(x1, x2, x3)`, so both plaid and
/// curvilinear grids can be represented.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatticeGrid {
    extents: Extents,
    x1: Vec<f64>,
    x2: Vec<f64>,
    x3: Vec<f64>,
}

impl LatticeGrid {
    /// Create a grid from flat coordinate vectors.
    pub fn new(extents: Extents, x1: Vec<f64>, x2: Vec<f64>, x3: Vec<f64>) -> Result<Self> {
        let grid = Self {
            extents,
            x1,
            x2,
            x3,
        };
        for axis in Axis::ALL {
            let len = grid.axis(axis).len();
            if len != extents.len() {
                return Err(StagingError::coordinate_length(
                    format!("grid {} coordinates", axis),
                    extents.len(),
                    len,
                ));
            }
        }
        Ok(grid)
    }

    /// Create a plaid grid from one coordinate vector per axis.
    pub fn plaid(x1: &[f64], x2: &[f64], x3: &[f64]) -> Self {
        let extents = Extents::new(x1.len(), x2.len(), x3.len());
        let mut flat = [
            Vec::with_capacity(extents.len()),
            Vec::with_capacity(extents.len()),
            Vec::with_capacity(extents.len()),
        ];
        for &a in x1 {
            for &b in x2 {
                for &c in x3 {
                    flat[0].push(a);
                    flat[1].push(b);
                    flat[2].push(c);
                }
            }
        }
        let [x1, x2, x3] = flat;
        Self {
            extents,
            x1,
            x2,
            x3,
        }
    }

    /// Flat coordinates along one axis.
    pub fn axis(&self, axis: Axis) -> &[f64] {
        match axis {
            Axis::X1 => &self.x1,
            Axis::X2 => &self.x2,
            Axis::X3 => &self.x3,
        }
    }

    /// The grid points as destination coordinates.
    pub fn to_destination(&self) -> DestinationCoordinates {
        DestinationCoordinates::new(self.x1.clone(), self.x2.clone(), self.x3.clone())
    }
}

impl SimulationGrid for LatticeGrid {
    fn extents(&self) -> Extents {
        self.extents
    }
}
