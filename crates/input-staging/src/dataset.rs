//! Dataset lifecycle: sizing, allocation, priming and per-step updates.
//!
//! ```text
//! init ──► load_size ──► set_sizes ──► init_storage ──► load_grid ──► prime_data
//!                                                                         │
//!        host stepping loop ──► update(t) ──► refresh if due ──► interpolate in time
//! ```

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use ndarray::{ArrayViewD, Axis as NdAxis};
use tracing::{debug, info, instrument, trace, warn};

use crate::calendar::{duration_from_secs, seconds_between};
use crate::config::SimulationConfig;
use crate::coords::{CoordinateRegistry, SourceCoordinates};
use crate::error::{Result, StagingError};
use crate::shape::ShapeRegistry;
use crate::spatial::Projection;
use crate::storage::{check_quantity, RawFrame, Storage};
use crate::temporal::{StagerState, TemporalStager};
use crate::types::{Extents, ShapeCategory, ShapeCounts, Slot, StagingStats};
use crate::variant::{DataVariant, LoadRequest, SourceShape};

/// One externally sourced input stream staged onto the simulation grid.
///
/// The dataset owns every buffer; consumers read the time-interpolated values
/// through [`InputDataset::now`]. Not reentrant: one host loop drives it.
pub struct InputDataset<V: DataVariant> {
    name: String,
    variant: V,
    source: Option<PathBuf>,
    shapes: ShapeRegistry,
    coords: CoordinateRegistry,
    storage: Option<Storage>,
    stager: TemporalStager,
    primed: bool,
    stats: StagingStats,
}

impl<V: DataVariant> InputDataset<V> {
    /// Create an unsized, unallocated dataset.
    pub fn new(name: impl Into<String>, variant: V) -> Self {
        Self {
            name: name.into(),
            variant,
            source: None,
            shapes: ShapeRegistry::default(),
            coords: CoordinateRegistry::default(),
            storage: None,
            stager: TemporalStager::default(),
            primed: false,
            stats: StagingStats::default(),
        }
    }

    /// One-time setup: source, cadence, sizes, storage, coordinates, priming.
    ///
    /// # Arguments
    /// * `config` - Run configuration
    /// * `source` - Data location, resolved against `config.input_root`
    /// * `grid` - Host simulation grid
    /// * `dt_model` - Model time step in seconds
    /// * `cadence` - Data cadence in seconds
    /// * `start` - Simulation start (or restart) date
    #[instrument(skip_all, fields(dataset = %self.name))]
    pub fn init(
        &mut self,
        config: &SimulationConfig,
        source: impl AsRef<Path>,
        grid: &V::Grid,
        dt_model: f64,
        cadence: f64,
        start: DateTime<Utc>,
    ) -> Result<()> {
        config.validate().map_err(StagingError::Config)?;

        self.set_source(config.resolve_source(source));
        self.set_cadence(cadence)?;

        let shape = self.load_size()?;
        self.set_sizes(shape.counts, grid)?;
        self.init_storage()?;
        self.load_grid()?;
        self.prime_data(config, grid, start, dt_model)?;

        info!(
            source = %self.source.as_deref().unwrap_or(Path::new("")).display(),
            cadence,
            quantities = shape.counts.total(),
            "Initialized input dataset"
        );
        Ok(())
    }

    /// Set the dataset name used in logs and errors.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Set where the variant reads external data from.
    pub fn set_source(&mut self, location: impl Into<PathBuf>) {
        self.source = Some(location.into());
    }

    /// Set the data cadence in seconds.
    pub fn set_cadence(&mut self, cadence: f64) -> Result<()> {
        if !cadence.is_finite() || cadence <= 0.0 {
            return Err(StagingError::InvalidCadence(cadence));
        }
        self.stager.set_cadence(cadence);
        Ok(())
    }

    /// Ask the variant for source extents and quantity counts.
    pub fn load_size(&mut self) -> Result<SourceShape> {
        let source = self
            .source
            .as_deref()
            .ok_or_else(|| StagingError::SourceNotSet(self.name.clone()))?;
        let shape = self
            .variant
            .load_size(source)
            .map_err(|e| StagingError::load(&self.name, e))?;

        self.shapes.set_source_extents(shape.extents);
        debug!(dataset = %self.name, extents = ?shape.extents, "Discovered source extents");
        Ok(shape)
    }

    /// Record quantity counts and the destination extents on `grid`.
    pub fn set_sizes(&mut self, counts: ShapeCounts, grid: &V::Grid) -> Result<()> {
        let destination = self.variant.destination_extents(grid);
        self.shapes.set_sizes(&self.name, counts, destination)?;

        info!(
            dataset = %self.name,
            source = ?self.shapes.source(),
            destination = ?destination,
            counts = ?counts,
            "Set dataset sizes"
        );
        Ok(())
    }

    /// Allocate raw, dual and now buffers for every shape category.
    pub fn init_storage(&mut self) -> Result<()> {
        let (Some(source), Some(destination)) = (self.shapes.source(), self.shapes.destination())
        else {
            return Err(StagingError::StorageBeforeSizes(self.name.clone()));
        };

        let storage = Storage::allocate(&source, &destination, self.shapes.counts());
        info!(dataset = %self.name, values = storage.len(), "Allocated dataset storage");
        self.storage = Some(storage);
        Ok(())
    }

    /// Store the source coordinate vectors.
    pub fn set_coords(&mut self, coords: SourceCoordinates) -> Result<()> {
        if self.storage.is_none() {
            return Err(StagingError::CoordsBeforeStorage(self.name.clone()));
        }
        let extents = self
            .shapes
            .source()
            .ok_or_else(|| StagingError::SizesBeforeExtents(self.name.clone()))?;
        self.coords.set_source(coords, &extents)
    }

    /// Ask the variant for source coordinates and store them.
    pub fn load_grid(&mut self) -> Result<()> {
        let source = self
            .source
            .as_deref()
            .ok_or_else(|| StagingError::SourceNotSet(self.name.clone()))?;
        let coords = self
            .variant
            .load_grid(source)
            .map_err(|e| StagingError::load(&self.name, e))?;
        self.set_coords(coords)
    }

    /// Load the two frames bracketing `start` so the first step interpolates
    /// between genuinely different, correctly dated frames.
    ///
    /// The latest cadence slot at or before `start` is found first. Reference
    /// times are placed two cadences before it, then two refreshes follow: one
    /// at a negative (priming) time that lands that slot in the "next"
    /// position, and one at `t = 0` that shifts it to "previous" and loads the
    /// slot after it.
    #[instrument(skip_all, fields(dataset = %self.name, start = %start))]
    pub fn prime_data(
        &mut self,
        config: &SimulationConfig,
        grid: &V::Grid,
        start: DateTime<Utc>,
        dt_model: f64,
    ) -> Result<()> {
        let cadence = self.ensure_ready()?;

        let frame = self
            .variant
            .last_frame_at_or_before(config.origin, start, cadence);
        let offset = seconds_between(start, frame);

        let tref0 = offset - 2.0 * cadence;
        let tref1 = tref0 + cadence;
        let seed = frame - duration_from_secs(cadence);
        self.stager.set_tref([tref0, tref1]);
        self.stager.seed_dates(seed);

        self.update(config, dt_model, tref1 + cadence / 2.0, grid, seed)?;
        self.update(config, dt_model, 0.0, grid, frame)?;
        self.primed = true;

        let [t0, t1] = self.stager.tref();
        info!(%frame, tref0 = t0, tref1 = t1, "Primed input dataset");
        Ok(())
    }

    /// Advance the dataset to the step starting at `t`: load and project a new
    /// frame if one is due, then interpolate every quantity in time.
    ///
    /// # Arguments
    /// * `config` - Run configuration
    /// * `dt_model` - Model time step in seconds
    /// * `t` - Simulation time in seconds since start; negative only while priming
    /// * `grid` - Host simulation grid
    /// * `now` - Calendar date of `t`; seeds the reference dates on first refresh
    pub fn update(
        &mut self,
        config: &SimulationConfig,
        dt_model: f64,
        t: f64,
        grid: &V::Grid,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let cadence = self.ensure_ready()?;
        self.stats.steps += 1;

        if self.stager.refresh_due(t, dt_model) {
            self.refresh(config, dt_model, t, grid, now, cadence)?;
        }

        let storage = self
            .storage
            .as_mut()
            .ok_or_else(|| StagingError::NotAllocated(self.name.clone()))?;
        self.stager.interpolate(storage, t, dt_model);

        trace!(dataset = %self.name, t, tnow = self.stager.tnow(), "Interpolated in time");
        Ok(())
    }

    fn refresh(
        &mut self,
        config: &SimulationConfig,
        dt_model: f64,
        t: f64,
        grid: &V::Grid,
        now: DateTime<Utc>,
        cadence: f64,
    ) -> Result<()> {
        let destination_extents = self
            .shapes
            .destination()
            .ok_or_else(|| StagingError::StorageBeforeSizes(self.name.clone()))?;

        if self.coords.destination().is_none() {
            let coordsi = self
                .variant
                .set_coordsi(config, grid, destination_extents)
                .map_err(|e| StagingError::load(&self.name, e))?;
            self.coords.set_destination(coordsi, &destination_extents)?;
            self.stager.seed_dates(now);
            debug!(dataset = %self.name, sites = destination_extents.len(), "Computed destination coordinates");
        }

        let source_extents = self
            .shapes
            .source()
            .ok_or_else(|| StagingError::SizesBeforeExtents(self.name.clone()))?;
        let source = self
            .source
            .as_deref()
            .ok_or_else(|| StagingError::SourceNotSet(self.name.clone()))?;
        let storage = self
            .storage
            .as_mut()
            .ok_or_else(|| StagingError::NotAllocated(self.name.clone()))?;

        let [_, previous] = self.stager.ref_dates();
        let request = LoadRequest {
            t,
            dt_model,
            previous,
            target: previous + duration_from_secs(cadence),
            cadence,
            source,
        };
        let loaded = self
            .variant
            .load_data(&request, &mut storage.raw)
            .map_err(|e| StagingError::load(&self.name, e))?;

        let drift = seconds_between(request.target, loaded).abs();
        if drift > config.cadence_tolerance_secs {
            warn!(
                dataset = %self.name,
                requested = %request.target,
                %loaded,
                drift,
                "Loaded frame is off its cadence slot"
            );
        }

        let (Some(source_coords), Some(destination_coords)) =
            (self.coords.source(), self.coords.destination())
        else {
            return Err(StagingError::SourceCoordsNotSet(self.name.clone()));
        };

        storage.shift_slots();
        Projection {
            source_extents: &source_extents,
            destination_extents: &destination_extents,
            counts: self.shapes.counts(),
            source: source_coords,
            destination: destination_coords,
            policy: config.extrapolation,
        }
        .run(storage)?;

        self.stager.advance(cadence, loaded);
        self.stats.refreshes += 1;

        let [tref0, tref1] = self.stager.tref();
        debug!(dataset = %self.name, t, tref0, tref1, %loaded, "Refreshed input frame");
        Ok(())
    }

    /// Check allocation, cadence and source; returns the cadence.
    fn ensure_ready(&self) -> Result<f64> {
        if self.storage.is_none() {
            return Err(StagingError::NotAllocated(self.name.clone()));
        }
        let cadence = self
            .stager
            .cadence()
            .ok_or_else(|| StagingError::CadenceNotSet(self.name.clone()))?;
        if self.source.is_none() {
            return Err(StagingError::SourceNotSet(self.name.clone()));
        }
        Ok(cadence)
    }

    /// Release all buffers and reset the allocation, priming and coordinate
    /// state. Sizes, cadence and source are kept so the dataset can be
    /// allocated again.
    pub fn dissociate(&mut self) {
        self.storage = None;
        self.coords.clear();
        self.stager.reset();
        self.primed = false;
        debug!(dataset = %self.name, "Released dataset storage");
    }

    fn storage(&self) -> Result<&Storage> {
        self.storage
            .as_ref()
            .ok_or_else(|| StagingError::NotAllocated(self.name.clone()))
    }

    /// Time-interpolated values of a category, shape `[destination extents..., count]`.
    pub fn now(&self, category: ShapeCategory) -> Result<ArrayViewD<'_, f64>> {
        Ok(self.storage()?.now(category))
    }

    /// Time-interpolated values of one quantity, shape `[destination extents...]`.
    pub fn now_quantity(&self, category: ShapeCategory, index: usize) -> Result<ArrayViewD<'_, f64>> {
        check_quantity(&self.shapes.counts(), category, index)?;
        Ok(self
            .storage()?
            .now(category)
            .index_axis_move(NdAxis(category.rank()), index))
    }

    /// Spatially interpolated values held in one slot.
    pub fn slot(&self, category: ShapeCategory, slot: Slot) -> Result<ArrayViewD<'_, f64>> {
        Ok(self.storage()?.slot(category, slot))
    }

    /// The most recently loaded source-resolution frame.
    pub fn raw_frame(&self) -> Result<&RawFrame> {
        Ok(self.storage()?.raw())
    }

    /// Dataset name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Source location, if set.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Data cadence in seconds, if set.
    pub fn cadence(&self) -> Option<f64> {
        self.stager.cadence()
    }

    /// Reference times of the previous and next slots.
    pub fn tref(&self) -> [f64; 2] {
        self.stager.tref()
    }

    /// Calendar dates of the previous and next slots.
    pub fn ref_dates(&self) -> [DateTime<Utc>; 2] {
        self.stager.ref_dates()
    }

    /// Time the "now" buffers were last interpolated to.
    pub fn tnow(&self) -> f64 {
        self.stager.tnow()
    }

    /// Refresh state.
    pub fn state(&self) -> StagerState {
        self.stager.state()
    }

    /// Quantity counts per category.
    pub fn counts(&self) -> ShapeCounts {
        self.shapes.counts()
    }

    /// Source extents, once discovered.
    pub fn source_extents(&self) -> Option<Extents> {
        self.shapes.source()
    }

    /// Destination extents, once sizes are set.
    pub fn destination_extents(&self) -> Option<Extents> {
        self.shapes.destination()
    }

    /// Whether storage is allocated.
    pub fn is_allocated(&self) -> bool {
        self.storage.is_some()
    }

    /// Whether priming has completed since the last allocation.
    pub fn is_primed(&self) -> bool {
        self.primed
    }

    /// Whether destination coordinates have been computed.
    pub fn has_destination_coords(&self) -> bool {
        self.coords.destination().is_some()
    }

    /// Step and refresh counters.
    pub fn stats(&self) -> StagingStats {
        self.stats
    }

    /// The variant.
    pub fn variant(&self) -> &V {
        &self.variant
    }

    /// Mutable access to the variant.
    pub fn variant_mut(&mut self) -> &mut V {
        &mut self.variant
    }
}

impl<V: DataVariant + std::fmt::Debug> std::fmt::Debug for InputDataset<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InputDataset")
            .field("name", &self.name)
            .field("variant", &self.variant)
            .field("source", &self.source)
            .field("shapes", &self.shapes)
            .field("allocated", &self.storage.is_some())
            .field("stager", &self.stager)
            .field("primed", &self.primed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::LatticeGrid;
    use crate::synthetic::SyntheticVariant;
    use chrono::{Duration, TimeZone};

    fn origin() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2013, 2, 20, 5, 0, 0).unwrap()
    }

    /// Scalar dataset whose value is the frame's minutes since origin.
    fn minute_counter() -> InputDataset<SyntheticVariant> {
        let coords = SourceCoordinates::new(vec![0.0], vec![0.0], vec![0.0]);
        let counts = ShapeCounts::default().with(ShapeCategory::Scalar, 1);
        let variant = SyntheticVariant::new(coords, counts, |date, frame| {
            let minutes = seconds_between(origin(), date) / 60.0;
            frame.get_mut(ShapeCategory::Scalar).fill(minutes);
            Ok(())
        });
        InputDataset::new("counter", variant)
    }

    fn point_grid() -> LatticeGrid {
        LatticeGrid::plaid(&[0.0], &[0.0], &[0.0])
    }

    #[test]
    fn test_sequencing_before_sizes() {
        let mut dataset = minute_counter();
        let grid = point_grid();

        assert!(matches!(
            dataset.set_sizes(ShapeCounts::default(), &grid),
            Err(StagingError::SizesBeforeExtents(_))
        ));
        assert!(matches!(
            dataset.init_storage(),
            Err(StagingError::StorageBeforeSizes(_))
        ));
        assert!(matches!(
            dataset.set_coords(SourceCoordinates::new(vec![0.0], vec![0.0], vec![0.0])),
            Err(StagingError::CoordsBeforeStorage(_))
        ));
        assert!(matches!(
            dataset.update(&SimulationConfig::default(), 1.0, 0.0, &grid, origin()),
            Err(StagingError::NotAllocated(_))
        ));
        assert!(matches!(dataset.now(ShapeCategory::Scalar), Err(StagingError::NotAllocated(_))));
    }

    #[test]
    fn test_update_requires_cadence_then_source() {
        let mut dataset = minute_counter();
        let grid = point_grid();
        let config = SimulationConfig::with_origin(origin());

        dataset.set_source("mem");
        let shape = dataset.load_size().unwrap();
        dataset.set_sizes(shape.counts, &grid).unwrap();
        dataset.init_storage().unwrap();

        assert!(matches!(
            dataset.prime_data(&config, &grid, origin(), 1.0),
            Err(StagingError::CadenceNotSet(_))
        ));

        dataset.set_cadence(60.0).unwrap();
        dataset.source = None;
        assert!(matches!(
            dataset.update(&config, 1.0, 0.0, &grid, origin()),
            Err(StagingError::SourceNotSet(_))
        ));
    }

    #[test]
    fn test_invalid_cadence() {
        let mut dataset = minute_counter();
        assert!(matches!(dataset.set_cadence(0.0), Err(StagingError::InvalidCadence(_))));
        assert!(matches!(dataset.set_cadence(-5.0), Err(StagingError::InvalidCadence(_))));
        assert!(matches!(
            dataset.set_cadence(f64::INFINITY),
            Err(StagingError::InvalidCadence(_))
        ));
        assert_eq!(dataset.cadence(), None);
    }

    #[test]
    fn test_refresh_without_source_coords() {
        let mut dataset = minute_counter();
        let grid = point_grid();
        let config = SimulationConfig::with_origin(origin());

        dataset.set_source("mem");
        dataset.set_cadence(60.0).unwrap();
        let shape = dataset.load_size().unwrap();
        dataset.set_sizes(shape.counts, &grid).unwrap();
        dataset.init_storage().unwrap();

        assert!(matches!(
            dataset.update(&config, 1.0, 0.0, &grid, origin()),
            Err(StagingError::SourceCoordsNotSet(_))
        ));
    }

    #[test]
    fn test_init_primes_bracketing_frames() {
        let mut dataset = minute_counter();
        let grid = point_grid();
        let config = SimulationConfig::with_origin(origin());
        let start = origin() + Duration::seconds(150);

        dataset.init(&config, "mem", &grid, 1.0, 60.0, start).unwrap();

        assert!(dataset.is_primed());
        assert!(dataset.has_destination_coords());
        assert_eq!(dataset.state(), StagerState::Loaded);

        // Last slot at or before start is origin + 120 s, 30 s before start
        assert_eq!(dataset.tref(), [-30.0, 30.0]);
        assert_eq!(
            dataset.ref_dates(),
            [origin() + Duration::seconds(120), origin() + Duration::seconds(180)]
        );
        assert_eq!(
            dataset.variant().loads(),
            &[origin() + Duration::seconds(120), origin() + Duration::seconds(180)]
        );
        assert_eq!(dataset.slot(ShapeCategory::Scalar, Slot::Previous).unwrap()[[0]], 2.0);
        assert_eq!(dataset.slot(ShapeCategory::Scalar, Slot::Next).unwrap()[[0]], 3.0);

        // Midpoint of the first step (t = 0, dt = 1) is 30.5 s past the previous frame
        let quantity = dataset.now_quantity(ShapeCategory::Scalar, 0).unwrap();
        assert_eq!(quantity.ndim(), 0);
        let now = quantity.iter().copied().next().unwrap();
        assert!((now - (2.0 + 30.5 / 60.0)).abs() < 1e-12);
    }

    #[test]
    fn test_steady_state_refresh_cadence() {
        let mut dataset = minute_counter();
        let grid = point_grid();
        let config = SimulationConfig::with_origin(origin());
        dataset.init(&config, "mem", &grid, 10.0, 60.0, origin()).unwrap();
        assert_eq!(dataset.tref(), [0.0, 60.0]);

        let loads_after_priming = dataset.variant().loads().len();
        let mut t = 0.0;
        while t < 300.0 {
            let old = dataset.tref();
            dataset
                .update(&config, 10.0, t, &grid, origin() + duration_from_secs(t))
                .unwrap();
            let new = dataset.tref();
            if new != old {
                assert_eq!(new[0], old[1]);
                assert_eq!(new[1], old[1] + 60.0);
            }
            // Linear data is reproduced exactly inside the bracket
            let expected = (t + 5.0) / 60.0;
            let value = dataset.now(ShapeCategory::Scalar).unwrap()[[0]];
            assert!((value - expected).abs() < 1e-9, "t={} value={}", t, value);
            t += 10.0;
        }

        // One load per cadence interval
        // Refreshes at t = 60, 120, 180, 240
        assert_eq!(dataset.variant().loads().len() - loads_after_priming, 4);
        assert_eq!(dataset.stats().steps, 32);
        assert_eq!(dataset.stats().refreshes, 6);
    }

    #[test]
    fn test_dissociate_resets_flags() {
        let mut dataset = minute_counter();
        let grid = point_grid();
        let config = SimulationConfig::with_origin(origin());
        dataset.init(&config, "mem", &grid, 1.0, 60.0, origin()).unwrap();

        dataset.dissociate();
        assert!(!dataset.is_allocated());
        assert!(!dataset.is_primed());
        assert!(!dataset.has_destination_coords());
        assert_eq!(dataset.state(), StagerState::Unprimed);
        assert_eq!(dataset.cadence(), Some(60.0));
        assert!(matches!(
            dataset.update(&config, 1.0, 0.0, &grid, origin()),
            Err(StagingError::NotAllocated(_))
        ));

        // The instance can be set up again
        dataset.init(&config, "mem", &grid, 1.0, 60.0, origin()).unwrap();
        assert!(dataset.is_primed());
        assert_eq!(dataset.tref(), [0.0, 60.0]);
    }

    #[test]
    fn test_load_errors_are_recoverable_channel() {
        let coords = SourceCoordinates::new(vec![0.0], vec![0.0], vec![0.0]);
        let counts = ShapeCounts::default().with(ShapeCategory::Scalar, 1);
        let variant = SyntheticVariant::new(coords, counts, |date, _| {
            Err(crate::error::LoadError::MissingFrame(date))
        });
        let mut dataset = InputDataset::new("missing", variant);
        let config = SimulationConfig::with_origin(origin());

        let err = dataset
            .init(&config, "mem", &point_grid(), 1.0, 60.0, origin())
            .unwrap_err();
        assert!(!err.is_contract_violation());
        assert!(!dataset.is_primed());
    }

    #[test]
    fn test_now_quantity_out_of_range() {
        let mut dataset = minute_counter();
        let config = SimulationConfig::with_origin(origin());
        dataset.init(&config, "mem", &point_grid(), 1.0, 60.0, origin()).unwrap();

        assert!(matches!(
            dataset.now_quantity(ShapeCategory::Scalar, 1),
            Err(StagingError::QuantityOutOfRange { .. })
        ));
        assert!(matches!(
            dataset.now_quantity(ShapeCategory::Volume, 0),
            Err(StagingError::QuantityOutOfRange { count: 0, .. })
        ));
    }
}
