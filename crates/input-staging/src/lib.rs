//! Spatiotemporal Staging of External Input Data
//!
//! This crate stages time-varying external datasets (forcing, boundary and
//! initial-condition fields) onto a host simulation grid. It provides:
//!
//! - **Shape handling**: eight shape categories from scalars to full volumes,
//!   with singleton axes selecting 1D, 2D or 3D interpolation
//! - **Double buffering**: two spatially interpolated frames bracketing the
//!   current time, refreshed at the data cadence
//! - **Time interpolation**: linear-in-time values at each step midpoint
//! - **Variants**: dataset kinds plug in through the [`DataVariant`] trait
//!
//! # Architecture
//!
//! ```text
//! InputDataset::init(config, source, grid, dt, cadence, start)
//!      │
//!      ├─► DataVariant::load_size   ──► ShapeRegistry (extents, counts)
//!      ├─► Storage::allocate        ──► raw / dual / now buffers
//!      ├─► DataVariant::load_grid   ──► CoordinateRegistry (source axes)
//!      └─► prime_data               ──► two bracketing frames loaded
//!
//! InputDataset::update(config, dt, t, grid, now)   (every model step)
//!      │
//!      ├─► refresh due? ─► DataVariant::load_data ─► raw frame
//!      │                        │
//!      │                        └─► shift slots ─► Projection::run ─► next slot
//!      │
//!      └─► TemporalStager::interpolate ─► now buffers
//! ```
//!
//! # Example
//!
//! ```ignore
//! use input_staging::{InputDataset, LatticeGrid, ShapeCategory, SimulationConfig};
//!
//! let config = SimulationConfig::from_env();
//! let mut dataset = InputDataset::new("precip", variant);
//! dataset.init(&config, "precip/", &grid, dt, 900.0, start)?;
//!
//! let mut t = 0.0;
//! while t < t_end {
//!     dataset.update(&config, dt, t, &grid, start + duration_from_secs(t))?;
//!     let rate = dataset.now_quantity(ShapeCategory::Slab23, 0)?;
//!     // ...
//!     t += dt;
//! }
//! ```

pub mod calendar;
pub mod config;
pub mod coords;
pub mod dataset;
pub mod error;
pub mod grid;
pub mod interpolation;
pub mod shape;
pub mod spatial;
pub mod storage;
pub mod synthetic;
pub mod temporal;
pub mod types;
pub mod variant;

// Re-export commonly used types at crate root
pub use calendar::{duration_from_secs, last_frame_at_or_before, seconds_between};
pub use config::SimulationConfig;
pub use coords::{CoordinateRegistry, DestinationCoordinates, SourceCoordinates};
pub use dataset::InputDataset;
pub use error::{LoadError, Result, StagingError};
pub use grid::{LatticeGrid, SimulationGrid};
pub use interpolation::{interp1, interp2, interp3};
pub use shape::{check_singletons, ShapeRegistry};
pub use spatial::{select_scheme, Projection, Scheme};
pub use storage::{RawFrame, Storage};
pub use synthetic::{FrameFn, SyntheticVariant};
pub use temporal::{StagerState, TemporalStager};
pub use types::{
    Axis, ExtrapolationPolicy, Extents, ShapeCategory, ShapeCounts, Slot, StagingStats,
};
pub use variant::{DataVariant, LoadRequest, SourceShape};
