//! In-memory dataset variant with generated frames.
//!
//! Frames come from a closure of the requested date, so a host can dry-run
//! the staging pipeline without external files, and tests can check exact
//! values against analytic fields.

use std::path::Path;

use chrono::{DateTime, Utc};

use crate::config::SimulationConfig;
use crate::coords::{DestinationCoordinates, SourceCoordinates};
use crate::error::LoadError;
use crate::grid::{LatticeGrid, SimulationGrid};
use crate::storage::RawFrame;
use crate::types::{Extents, ShapeCounts};
use crate::variant::{DataVariant, LoadRequest, SourceShape};

/// Fills a raw frame with the data valid at the given date.
pub type FrameFn = Box<dyn FnMut(DateTime<Utc>, &mut RawFrame) -> Result<(), LoadError>>;

/// A variant whose frames are generated on demand.
pub struct SyntheticVariant {
    coords: SourceCoordinates,
    counts: ShapeCounts,
    generator: FrameFn,
    loads: Vec<DateTime<Utc>>,
}

impl SyntheticVariant {
    /// Create a variant over the given source coordinates.
    ///
    /// Source extents are the lengths of the coordinate vectors.
    pub fn new<F>(coords: SourceCoordinates, counts: ShapeCounts, generator: F) -> Self
    where
        F: FnMut(DateTime<Utc>, &mut RawFrame) -> Result<(), LoadError> + 'static,
    {
        Self {
            coords,
            counts,
            generator: Box::new(generator),
            loads: Vec::new(),
        }
    }

    /// Dates of every frame loaded so far, in load order.
    pub fn loads(&self) -> &[DateTime<Utc>] {
        &self.loads
    }

    fn extents(&self) -> Extents {
        Extents::new(self.coords.x1.len(), self.coords.x2.len(), self.coords.x3.len())
    }
}

impl std::fmt::Debug for SyntheticVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyntheticVariant")
            .field("extents", &self.extents())
            .field("counts", &self.counts)
            .field("loads", &self.loads.len())
            .finish()
    }
}

impl DataVariant for SyntheticVariant {
    type Grid = LatticeGrid;

    fn load_size(&mut self, _source: &Path) -> Result<SourceShape, LoadError> {
        Ok(SourceShape {
            extents: self.extents(),
            counts: self.counts,
        })
    }

    fn load_grid(&mut self, _source: &Path) -> Result<SourceCoordinates, LoadError> {
        Ok(self.coords.clone())
    }

    fn set_coordsi(
        &mut self,
        _config: &SimulationConfig,
        grid: &LatticeGrid,
        extents: Extents,
    ) -> Result<DestinationCoordinates, LoadError> {
        if grid.extents() != extents {
            return Err(LoadError::shape_mismatch(format!(
                "grid extents {:?} differ from destination extents {:?}",
                grid.extents(),
                extents
            )));
        }
        Ok(grid.to_destination())
    }

    fn load_data(
        &mut self,
        request: &LoadRequest<'_>,
        frame: &mut RawFrame,
    ) -> Result<DateTime<Utc>, LoadError> {
        (self.generator)(request.target, frame)?;
        self.loads.push(request.target);
        Ok(request.target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ShapeCategory;
    use chrono::TimeZone;

    #[test]
    fn test_synthetic_variant_reports_shape() {
        let coords = SourceCoordinates::new(vec![0.0, 1.0], vec![0.0], vec![0.0, 1.0, 2.0]);
        let counts = ShapeCounts::default().with(ShapeCategory::Slab13, 1);
        let mut variant = SyntheticVariant::new(coords.clone(), counts, |_, _| Ok(()));

        let shape = variant.load_size(Path::new("unused")).unwrap();
        assert_eq!(shape.extents, Extents::new(2, 1, 3));
        assert_eq!(shape.counts, counts);
        assert_eq!(variant.load_grid(Path::new("unused")).unwrap(), coords);
    }

    #[test]
    fn test_synthetic_variant_rejects_mismatched_grid() {
        let coords = SourceCoordinates::new(vec![0.0], vec![0.0], vec![0.0]);
        let mut variant = SyntheticVariant::new(coords, ShapeCounts::default(), |_, _| Ok(()));
        let grid = LatticeGrid::plaid(&[0.0, 1.0], &[0.0], &[0.0]);

        let err = variant
            .set_coordsi(&SimulationConfig::default(), &grid, Extents::new(1, 1, 1))
            .unwrap_err();
        assert!(matches!(err, LoadError::ShapeMismatch(_)));
    }

    #[test]
    fn test_synthetic_variant_propagates_generator_errors() {
        let coords = SourceCoordinates::new(vec![0.0], vec![0.0], vec![0.0]);
        let counts = ShapeCounts::default().with(ShapeCategory::Scalar, 1);
        let mut variant =
            SyntheticVariant::new(coords, counts, |date, _| Err(LoadError::MissingFrame(date)));

        let mut frame = crate::storage::Storage::allocate(
            &Extents::new(1, 1, 1),
            &Extents::new(1, 1, 1),
            counts,
        );
        let date = Utc.with_ymd_and_hms(2013, 2, 20, 5, 0, 0).unwrap();
        let request = LoadRequest {
            t: 0.0,
            dt_model: 1.0,
            previous: date,
            target: date,
            cadence: 60.0,
            source: Path::new("unused"),
        };

        let err = variant.load_data(&request, &mut frame.raw).unwrap_err();
        assert!(matches!(err, LoadError::MissingFrame(d) if d == date));
        assert!(variant.loads().is_empty());
    }
}
