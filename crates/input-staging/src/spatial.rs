//! Projection of the raw frame onto destination sites.
//!
//! The interpolation rank of a category is chosen from which of its axes are
//! non-singleton in the source:
//!
//! | Category | Non-singleton axes | Scheme                     |
//! |----------|--------------------|----------------------------|
//! | 0D       | -                  | copy                       |
//! | 1D       | any                | 1-D along the category axis|
//! | 2D       | 2                  | 2-D                        |
//! | 2D       | 1                  | 1-D along that axis        |
//! | 3D       | 3                  | 3-D                        |
//! | 3D       | 2                  | 2-D on those two axes      |
//!
//! Every other combination is an [`StagingError::UnsupportedShape`].

use ndarray::{ArrayViewD, ArrayViewMutD, Axis as NdAxis, Ix1, Ix2, Ix3};
use tracing::trace;

use crate::coords::{DestinationCoordinates, SourceCoordinates};
use crate::error::{Result, StagingError};
use crate::interpolation::{interp1, interp2, interp3};
use crate::storage::Storage;
use crate::types::{Axis, Extents, ExtrapolationPolicy, ShapeCategory, ShapeCounts};

/// Interpolation scheme selected for one category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scheme {
    /// Scalars are copied.
    Copy,
    /// 1-D interpolation along the given axis.
    Linear1(Axis),
    /// 2-D interpolation over the given axes.
    Linear2(Axis, Axis),
    /// Full 3-D interpolation.
    Linear3,
}

/// Select the interpolation scheme for `category` given the source extents.
pub fn select_scheme(category: ShapeCategory, source: &Extents) -> Result<Scheme> {
    let axes = category.axes();
    let active: Vec<Axis> = axes
        .iter()
        .copied()
        .filter(|&axis| source.get(axis) > 1)
        .collect();

    let scheme = match (axes.len(), active.as_slice()) {
        (0, _) => Scheme::Copy,
        (1, _) => Scheme::Linear1(axes[0]),
        (2, [a, b]) => Scheme::Linear2(*a, *b),
        (2, [a]) => Scheme::Linear1(*a),
        (3, [_, _, _]) => Scheme::Linear3,
        (3, [a, b]) => Scheme::Linear2(*a, *b),
        _ => {
            return Err(StagingError::UnsupportedShape {
                category,
                active: active.len(),
            })
        }
    };
    Ok(scheme)
}

/// Everything the projection needs besides the buffers.
pub struct Projection<'a> {
    pub source_extents: &'a Extents,
    pub destination_extents: &'a Extents,
    pub counts: ShapeCounts,
    pub source: &'a SourceCoordinates,
    pub destination: &'a DestinationCoordinates,
    pub policy: ExtrapolationPolicy,
}

impl Projection<'_> {
    /// Interpolate every populated category of the raw frame into the "next" slot.
    pub fn run(&self, storage: &mut Storage) -> Result<()> {
        for category in self.counts.populated() {
            let scheme = select_scheme(category, self.source_extents)?;
            trace!(%category, ?scheme, "Projecting category");

            let (raw, mut next) = storage.raw_and_next(category);
            let raw = raw.get(category);
            let trailing = NdAxis(category.rank());

            for q in 0..self.counts.get(category) {
                let src = raw.index_axis(trailing, q);
                let dst = next.index_axis_mut(trailing, q);
                self.project_quantity(category, &scheme, src, dst)?;
            }
        }
        Ok(())
    }

    fn project_quantity(
        &self,
        category: ShapeCategory,
        scheme: &Scheme,
        src: ArrayViewD<'_, f64>,
        mut dst: ArrayViewMutD<'_, f64>,
    ) -> Result<()> {
        let sites = |axis: Axis| {
            self.destination
                .gather(axis, category, self.destination_extents)
        };

        // Drop singleton source axes so the view's rank matches the scheme
        let mut squeezed = src;
        for (pos, axis) in category.axes().iter().enumerate().rev() {
            if self.source_extents.get(*axis) == 1 && !matches!(scheme, Scheme::Linear1(a) if a == axis) {
                squeezed = squeezed.index_axis_move(NdAxis(pos), 0);
            }
        }

        let values = match scheme {
            Scheme::Copy => squeezed.iter().copied().collect(),
            Scheme::Linear1(axis) => interp1(
                self.source.axis(*axis),
                squeezed.into_dimensionality::<Ix1>()?,
                &sites(*axis),
                self.policy,
            ),
            Scheme::Linear2(a, b) => interp2(
                self.source.axis(*a),
                self.source.axis(*b),
                squeezed.into_dimensionality::<Ix2>()?,
                &sites(*a),
                &sites(*b),
                self.policy,
            ),
            Scheme::Linear3 => interp3(
                self.source.axis(Axis::X1),
                self.source.axis(Axis::X2),
                self.source.axis(Axis::X3),
                squeezed.into_dimensionality::<Ix3>()?,
                &sites(Axis::X1),
                &sites(Axis::X2),
                &sites(Axis::X3),
                self.policy,
            ),
        };

        // Destination singletons mirror source singletons, so the site count
        // always equals the destination quantity size
        for (out, value) in dst.iter_mut().zip(values) {
            *out = value;
        }
        Ok(())
    }
}
