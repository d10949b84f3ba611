//! Core types for input staging.

use serde::{Deserialize, Serialize};

/// One of the three coordinate axes a dataset may vary along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X1,
    X2,
    X3,
}

impl Axis {
    /// All axes in storage order.
    pub const ALL: [Axis; 3] = [Axis::X1, Axis::X2, Axis::X3];

    /// Zero-based position of the axis.
    pub fn index(self) -> usize {
        match self {
            Self::X1 => 0,
            Self::X2 => 1,
            Self::X3 => 2,
        }
    }
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::X1 => write!(f, "x1"),
            Self::X2 => write!(f, "x2"),
            Self::X3 => write!(f, "x3"),
        }
    }
}

/// Lengths of the three coordinate axes of a grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extents {
    pub lx1: usize,
    pub lx2: usize,
    pub lx3: usize,
}

impl Extents {
    /// Create a new set of extents.
    pub fn new(lx1: usize, lx2: usize, lx3: usize) -> Self {
        Self { lx1, lx2, lx3 }
    }

    /// Length along one axis.
    pub fn get(&self, axis: Axis) -> usize {
        match axis {
            Axis::X1 => self.lx1,
            Axis::X2 => self.lx2,
            Axis::X3 => self.lx3,
        }
    }

    /// Total number of lattice points.
    pub fn len(&self) -> usize {
        self.lx1 * self.lx2 * self.lx3
    }

    /// Check if any axis is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flat C-order index of a lattice point.
    pub fn flat_index(&self, i1: usize, i2: usize, i3: usize) -> usize {
        (i1 * self.lx2 + i2) * self.lx3 + i3
    }

    /// Lengths of the axes a shape category spans, in axis order.
    pub fn select(&self, category: ShapeCategory) -> Vec<usize> {
        category.axes().iter().map(|&axis| self.get(axis)).collect()
    }
}

/// The eight dimensional categories a buffered quantity can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeCategory {
    /// Scalar quantities.
    Scalar,
    /// Profiles along x1.
    Profile1,
    /// Profiles along x2.
    Profile2,
    /// Profiles along x3.
    Profile3,
    /// Slabs over (x2, x3).
    Slab23,
    /// Slabs over (x1, x2).
    Slab12,
    /// Slabs over (x1, x3).
    Slab13,
    /// Full volumes over (x1, x2, x3).
    Volume,
}

impl ShapeCategory {
    /// All categories in storage order.
    pub const ALL: [ShapeCategory; 8] = [
        ShapeCategory::Scalar,
        ShapeCategory::Profile1,
        ShapeCategory::Profile2,
        ShapeCategory::Profile3,
        ShapeCategory::Slab23,
        ShapeCategory::Slab12,
        ShapeCategory::Slab13,
        ShapeCategory::Volume,
    ];

    /// Zero-based storage position.
    pub fn index(self) -> usize {
        match self {
            Self::Scalar => 0,
            Self::Profile1 => 1,
            Self::Profile2 => 2,
            Self::Profile3 => 3,
            Self::Slab23 => 4,
            Self::Slab12 => 5,
            Self::Slab13 => 6,
            Self::Volume => 7,
        }
    }

    /// Axes spanned by quantities of this category, in axis order.
    pub fn axes(self) -> &'static [Axis] {
        match self {
            Self::Scalar => &[],
            Self::Profile1 => &[Axis::X1],
            Self::Profile2 => &[Axis::X2],
            Self::Profile3 => &[Axis::X3],
            Self::Slab23 => &[Axis::X2, Axis::X3],
            Self::Slab12 => &[Axis::X1, Axis::X2],
            Self::Slab13 => &[Axis::X1, Axis::X3],
            Self::Volume => &[Axis::X1, Axis::X2, Axis::X3],
        }
    }

    /// Number of spatial axes.
    pub fn rank(self) -> usize {
        self.axes().len()
    }
}

impl std::fmt::Display for ShapeCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Scalar => "0D",
            Self::Profile1 => "1D-x1",
            Self::Profile2 => "1D-x2",
            Self::Profile3 => "1D-x3",
            Self::Slab23 => "2D-x2x3",
            Self::Slab12 => "2D-x1x2",
            Self::Slab13 => "2D-x1x3",
            Self::Volume => "3D",
        };
        write!(f, "{}", name)
    }
}

/// Number of quantities a dataset carries in each shape category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShapeCounts {
    counts: [usize; 8],
}

impl ShapeCounts {
    /// Set the count for one category (builder style).
    pub fn with(mut self, category: ShapeCategory, count: usize) -> Self {
        self.counts[category.index()] = count;
        self
    }

    /// Count for one category.
    pub fn get(&self, category: ShapeCategory) -> usize {
        self.counts[category.index()]
    }

    /// Total number of quantities across all categories.
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// Categories with at least one quantity.
    pub fn populated(&self) -> impl Iterator<Item = ShapeCategory> + '_ {
        ShapeCategory::ALL
            .into_iter()
            .filter(|&category| self.get(category) > 0)
    }
}

/// Position in the two-frame time bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// Earlier bracketing frame.
    Previous,
    /// Later bracketing frame.
    Next,
}

impl Slot {
    /// Index along the trailing slot axis of a dual buffer.
    pub fn index(self) -> usize {
        match self {
            Self::Previous => 0,
            Self::Next => 1,
        }
    }
}

/// What spatial interpolation does at sites outside the source coordinate range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtrapolationPolicy {
    /// Hold the boundary value constant.
    #[default]
    Clamp,
    /// Continue the boundary segment linearly.
    Linear,
    /// Produce NaN.
    Nan,
}

impl ExtrapolationPolicy {
    /// Parse from string (case-insensitive).
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "linear" | "extrapolate" => Self::Linear,
            "nan" | "none" => Self::Nan,
            _ => Self::Clamp,
        }
    }
}

impl std::fmt::Display for ExtrapolationPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Clamp => write!(f, "clamp"),
            Self::Linear => write!(f, "linear"),
            Self::Nan => write!(f, "nan"),
        }
    }
}

/// Counters describing how a dataset has been driven.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StagingStats {
    /// Calls to `update`.
    pub steps: u64,
    /// Frames loaded and projected.
    pub refreshes: u64,
}

impl StagingStats {
    /// Fraction of steps that triggered a refresh (0.0 - 1.0).
    pub fn refresh_rate(&self) -> f64 {
        if self.steps == 0 {
            0.0
        } else {
            self.refreshes as f64 / self.steps as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extents_flat_index() {
        let extents = Extents::new(2, 3, 4);
        assert_eq!(extents.len(), 24);
        assert_eq!(extents.flat_index(0, 0, 0), 0);
        assert_eq!(extents.flat_index(0, 0, 3), 3);
        assert_eq!(extents.flat_index(0, 1, 0), 4);
        assert_eq!(extents.flat_index(1, 2, 3), 23);
    }

    #[test]
    fn test_extents_select() {
        let extents = Extents::new(5, 6, 7);
        assert!(extents.select(ShapeCategory::Scalar).is_empty());
        assert_eq!(extents.select(ShapeCategory::Profile2), vec![6]);
        assert_eq!(extents.select(ShapeCategory::Slab13), vec![5, 7]);
        assert_eq!(extents.select(ShapeCategory::Volume), vec![5, 6, 7]);
    }

    #[test]
    fn test_category_indices_are_storage_order() {
        for (i, category) in ShapeCategory::ALL.iter().enumerate() {
            assert_eq!(category.index(), i);
        }
        assert_eq!(ShapeCategory::Volume.rank(), 3);
        assert_eq!(ShapeCategory::Slab23.rank(), 2);
    }

    #[test]
    fn test_shape_counts() {
        let counts = ShapeCounts::default()
            .with(ShapeCategory::Slab23, 2)
            .with(ShapeCategory::Scalar, 1);
        assert_eq!(counts.total(), 3);
        assert_eq!(counts.get(ShapeCategory::Volume), 0);
        let populated: Vec<_> = counts.populated().collect();
        assert_eq!(populated, vec![ShapeCategory::Scalar, ShapeCategory::Slab23]);
    }

    #[test]
    fn test_extrapolation_policy_from_str() {
        assert_eq!(ExtrapolationPolicy::from_str("CLAMP"), ExtrapolationPolicy::Clamp);
        assert_eq!(ExtrapolationPolicy::from_str("linear"), ExtrapolationPolicy::Linear);
        assert_eq!(ExtrapolationPolicy::from_str("nan"), ExtrapolationPolicy::Nan);
        assert_eq!(ExtrapolationPolicy::from_str("bogus"), ExtrapolationPolicy::Clamp);
    }

    #[test]
    fn test_stats_refresh_rate() {
        let mut stats = StagingStats::default();
        assert!((stats.refresh_rate() - 0.0).abs() < f64::EPSILON);

        stats.steps = 10;
        stats.refreshes = 2;
        assert!((stats.refresh_rate() - 0.2).abs() < f64::EPSILON);
    }
}
