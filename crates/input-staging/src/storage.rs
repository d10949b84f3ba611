//! Buffer allocation for all eight shape categories.
//!
//! Every category owns three arrays:
//!
//! ```text
//! raw   [source extents of category axes..., count]          latest loaded frame
//! dual  [destination extents of category axes..., count, 2]  previous / next slot
//! now   [destination extents of category axes..., count]     time-interpolated
//! ```
//!
//! All arrays are allocated once, in one pass, and zero-filled. Categories
//! with no quantities get empty arrays.

use ndarray::{ArrayD, ArrayViewD, ArrayViewMutD, Axis as NdAxis, IxDyn};

use crate::error::{Result, StagingError};
use crate::types::{Extents, ShapeCategory, ShapeCounts, Slot};

/// Source-resolution buffers the variant fills on every load.
#[derive(Debug, Clone)]
pub struct RawFrame {
    arrays: Vec<ArrayD<f64>>,
    counts: ShapeCounts,
}

impl RawFrame {
    fn allocate(source: &Extents, counts: ShapeCounts) -> Self {
        let arrays = ShapeCategory::ALL
            .iter()
            .map(|&category| {
                let mut shape = source.select(category);
                shape.push(counts.get(category));
                ArrayD::zeros(IxDyn(&shape))
            })
            .collect();
        Self { arrays, counts }
    }

    /// All quantities of a category, shape `[source extents..., count]`.
    pub fn get(&self, category: ShapeCategory) -> ArrayViewD<'_, f64> {
        self.arrays[category.index()].view()
    }

    /// Mutable view of a category for the loader to fill.
    pub fn get_mut(&mut self, category: ShapeCategory) -> ArrayViewMutD<'_, f64> {
        self.arrays[category.index()].view_mut()
    }

    /// Mutable view of one quantity, shape `[source extents...]`.
    pub fn quantity_mut(
        &mut self,
        category: ShapeCategory,
        index: usize,
    ) -> Result<ArrayViewMutD<'_, f64>> {
        check_quantity(&self.counts, category, index)?;
        let trailing = category.rank();
        Ok(self.arrays[category.index()]
            .view_mut()
            .index_axis_move(NdAxis(trailing), index))
    }

    /// Quantity counts the frame was allocated for.
    pub fn counts(&self) -> ShapeCounts {
        self.counts
    }
}

/// All buffers of one dataset.
#[derive(Debug, Clone)]
pub struct Storage {
    pub(crate) raw: RawFrame,
    dual: Vec<ArrayD<f64>>,
    now: Vec<ArrayD<f64>>,
}

impl Storage {
    /// Allocate raw, dual and now buffers for every category.
    pub fn allocate(source: &Extents, destination: &Extents, counts: ShapeCounts) -> Self {
        let raw = RawFrame::allocate(source, counts);

        let mut dual = Vec::with_capacity(ShapeCategory::ALL.len());
        let mut now = Vec::with_capacity(ShapeCategory::ALL.len());
        for category in ShapeCategory::ALL {
            let mut shape = destination.select(category);
            shape.push(counts.get(category));
            now.push(ArrayD::zeros(IxDyn(&shape)));
            shape.push(2);
            dual.push(ArrayD::zeros(IxDyn(&shape)));
        }

        Self { raw, dual, now }
    }

    /// Number of f64 values held across all buffers.
    pub fn len(&self) -> usize {
        let raw: usize = self.raw.arrays.iter().map(|a| a.len()).sum();
        let dual: usize = self.dual.iter().map(|a| a.len()).sum();
        let now: usize = self.now.iter().map(|a| a.len()).sum();
        raw + dual + now
    }

    /// Check if no values are held.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Latest raw frame.
    pub fn raw(&self) -> &RawFrame {
        &self.raw
    }

    /// Time-interpolated values of a category, shape `[destination extents..., count]`.
    pub fn now(&self, category: ShapeCategory) -> ArrayViewD<'_, f64> {
        self.now[category.index()].view()
    }

    /// One slot of a category's dual buffer, shape `[destination extents..., count]`.
    pub fn slot(&self, category: ShapeCategory, slot: Slot) -> ArrayViewD<'_, f64> {
        let dual = &self.dual[category.index()];
        dual.index_axis(NdAxis(dual.ndim() - 1), slot.index())
    }

    /// Mutable view of one slot of a category's dual buffer.
    pub fn slot_mut(&mut self, category: ShapeCategory, slot: Slot) -> ArrayViewMutD<'_, f64> {
        let dual = &mut self.dual[category.index()];
        let axis = NdAxis(dual.ndim() - 1);
        dual.index_axis_mut(axis, slot.index())
    }

    /// Copy every "next" slot into the "previous" slot.
    pub fn shift_slots(&mut self) {
        for dual in &mut self.dual {
            let axis = NdAxis(dual.ndim() - 1);
            let (mut previous, next) = dual.view_mut().split_at(axis, 1);
            previous.assign(&next);
        }
    }

    /// Split borrows: the raw frame and the mutable dual buffers.
    pub(crate) fn raw_and_next(&mut self, category: ShapeCategory) -> (&RawFrame, ArrayViewMutD<'_, f64>) {
        let dual = &mut self.dual[category.index()];
        let axis = NdAxis(dual.ndim() - 1);
        (&self.raw, dual.index_axis_mut(axis, Slot::Next.index()))
    }

    /// Split borrows: the dual buffer of a category and its now buffer.
    pub(crate) fn dual_and_now(
        &mut self,
        category: ShapeCategory,
    ) -> (ArrayViewD<'_, f64>, ArrayViewMutD<'_, f64>) {
        let i = category.index();
        (self.dual[i].view(), self.now[i].view_mut())
    }
}

pub(crate) fn check_quantity(counts: &ShapeCounts, category: ShapeCategory, index: usize) -> Result<()> {
    let count = counts.get(category);
    if index >= count {
        return Err(StagingError::QuantityOutOfRange {
            category,
            count,
            index,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage() -> Storage {
        let counts = ShapeCounts::default()
            .with(ShapeCategory::Scalar, 2)
            .with(ShapeCategory::Profile1, 1)
            .with(ShapeCategory::Slab23, 3)
            .with(ShapeCategory::Volume, 1);
        Storage::allocate(&Extents::new(4, 5, 6), &Extents::new(8, 9, 10), counts)
    }

    #[test]
    fn test_allocation_shapes() {
        let storage = storage();

        assert_eq!(storage.raw().get(ShapeCategory::Scalar).shape(), &[2]);
        assert_eq!(storage.raw().get(ShapeCategory::Profile1).shape(), &[4, 1]);
        assert_eq!(storage.raw().get(ShapeCategory::Slab23).shape(), &[5, 6, 3]);
        assert_eq!(storage.raw().get(ShapeCategory::Volume).shape(), &[4, 5, 6, 1]);

        assert_eq!(storage.now(ShapeCategory::Slab23).shape(), &[9, 10, 3]);
        assert_eq!(storage.slot(ShapeCategory::Volume, Slot::Next).shape(), &[8, 9, 10, 1]);

        // Unused categories are allocated empty
        assert_eq!(storage.raw().get(ShapeCategory::Slab13).shape(), &[4, 6, 0]);
        assert_eq!(storage.now(ShapeCategory::Profile3).len(), 0);
    }

    #[test]
    fn test_allocation_is_zeroed() {
        let storage = storage();
        assert!(storage.now(ShapeCategory::Volume).iter().all(|&v| v == 0.0));
        assert!(storage.raw().get(ShapeCategory::Scalar).iter().all(|&v| v == 0.0));
        assert_eq!(storage.len(), 2 + 4 + 90 + 120 + 3 * (2 + 8 + 270 + 720));
    }

    #[test]
    fn test_shift_slots() {
        let mut storage = storage();
        storage.slot_mut(ShapeCategory::Scalar, Slot::Next).fill(7.0);
        storage.slot_mut(ShapeCategory::Scalar, Slot::Previous).fill(1.0);

        storage.shift_slots();

        assert!(storage
            .slot(ShapeCategory::Scalar, Slot::Previous)
            .iter()
            .all(|&v| v == 7.0));
        assert!(storage
            .slot(ShapeCategory::Scalar, Slot::Next)
            .iter()
            .all(|&v| v == 7.0));
    }

    #[test]
    fn test_quantity_mut_bounds() {
        let mut storage = storage();
        {
            let mut q = storage.raw.quantity_mut(ShapeCategory::Slab23, 2).unwrap();
            assert_eq!(q.shape(), &[5, 6]);
            q.fill(3.0);
        }
        let raw = storage.raw().get(ShapeCategory::Slab23);
        assert_eq!(raw[[0, 0, 2]], 3.0);
        assert_eq!(raw[[0, 0, 1]], 0.0);

        assert!(matches!(
            storage.raw.quantity_mut(ShapeCategory::Slab23, 3),
            Err(StagingError::QuantityOutOfRange { count: 3, index: 3, .. })
        ));
    }
}
