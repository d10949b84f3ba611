//! Shape registry: quantity counts and source/destination axis extents.

use crate::error::{Result, StagingError};
use crate::types::{Axis, Extents, ShapeCounts};

/// Source and destination shape of a dataset.
///
/// Source extents are discovered first (by the variant), then `set_sizes`
/// records the quantity counts and the destination extents.
#[derive(Debug, Clone, Default)]
pub struct ShapeRegistry {
    source: Option<Extents>,
    destination: Option<Extents>,
    counts: ShapeCounts,
}

impl ShapeRegistry {
    /// Record the source axis extents reported by the variant.
    pub fn set_source_extents(&mut self, extents: Extents) {
        self.source = Some(extents);
    }

    /// Record quantity counts and destination extents.
    ///
    /// Fails if the source extents are unknown, or if any axis is a singleton
    /// on exactly one of the two sides.
    pub fn set_sizes(
        &mut self,
        dataset: &str,
        counts: ShapeCounts,
        destination: Extents,
    ) -> Result<()> {
        let source = self
            .source
            .ok_or_else(|| StagingError::SizesBeforeExtents(dataset.to_string()))?;

        check_singletons(&source, &destination)?;

        self.counts = counts;
        self.destination = Some(destination);
        Ok(())
    }

    /// Whether `set_sizes` has succeeded.
    pub fn sizes_set(&self) -> bool {
        self.destination.is_some()
    }

    /// Source axis extents, once discovered.
    pub fn source(&self) -> Option<Extents> {
        self.source
    }

    /// Destination axis extents, once sizes are set.
    pub fn destination(&self) -> Option<Extents> {
        self.destination
    }

    /// Quantity counts per category.
    pub fn counts(&self) -> ShapeCounts {
        self.counts
    }
}

/// An axis must be a singleton in both source and destination, or in neither.
pub fn check_singletons(source: &Extents, destination: &Extents) -> Result<()> {
    for axis in Axis::ALL {
        let src = source.get(axis);
        let dst = destination.get(axis);
        if (src == 1) != (dst == 1) {
            return Err(StagingError::SingletonMismatch {
                axis,
                source_extent: src,
                destination_extent: dst,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ShapeCategory;

    #[test]
    fn test_sizes_require_source_extents() {
        let mut shapes = ShapeRegistry::default();
        let err = shapes
            .set_sizes("efield", ShapeCounts::default(), Extents::new(1, 4, 4))
            .unwrap_err();
        assert!(matches!(err, StagingError::SizesBeforeExtents(_)));
        assert!(!shapes.sizes_set());
    }

    #[test]
    fn test_set_sizes_records_destination() {
        let mut shapes = ShapeRegistry::default();
        shapes.set_source_extents(Extents::new(1, 10, 12));

        let counts = ShapeCounts::default().with(ShapeCategory::Slab23, 2);
        shapes
            .set_sizes("precip", counts, Extents::new(1, 40, 64))
            .unwrap();

        assert!(shapes.sizes_set());
        assert_eq!(shapes.destination(), Some(Extents::new(1, 40, 64)));
        assert_eq!(shapes.counts().get(ShapeCategory::Slab23), 2);
    }

    #[test]
    fn test_singleton_consistency_table() {
        for src in 1..=3 {
            for dst in 1..=3 {
                let ok = check_singletons(&Extents::new(src, 5, 5), &Extents::new(dst, 7, 7)).is_ok();
                assert_eq!(ok, (src == 1) == (dst == 1), "src={} dst={}", src, dst);
            }
        }
    }

    #[test]
    fn test_singleton_mismatch_reports_axis() {
        let err = check_singletons(&Extents::new(4, 4, 1), &Extents::new(8, 8, 3)).unwrap_err();
        match err {
            StagingError::SingletonMismatch {
                axis,
                source_extent,
                destination_extent,
            } => {
                assert_eq!(axis, Axis::X3);
                assert_eq!(source_extent, 1);
                assert_eq!(destination_extent, 3);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
