use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::aggregation::{aggregate_table, AggregatedRow};
use crate::config::ExplorerConfig;
use crate::error::{ExplorerError, Result};
use crate::region::{RegionCatalog, RegionKey, RegionOption};
use crate::reshape::{reshape, TimeSeriesTable};
use crate::table::{RawTable, YearRange};
use crate::visualization::{slider_marks, LineSpec, MapSpec, RenderSpecs, SliderMark};

/// The two user selections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewState {
    pub selected_year: i32,
    pub selected_region: RegionKey,
}

impl ViewState {
    pub fn new(selected_year: i32, selected_region: RegionKey) -> Self {
        Self {
            selected_year,
            selected_region,
        }
    }
}

/// Immutable derived state, built once at startup.
///
/// Holds the aggregated rows for the map and one precomputed time-series
/// table per region for the line chart. Safe to share read-only between
/// sessions.
#[derive(Debug)]
pub struct ExplorerModel {
    years: YearRange,
    catalog: RegionCatalog,
    aggregated: Vec<AggregatedRow>,
    series: HashMap<RegionKey, TimeSeriesTable>,
    default_region: RegionKey,
}

impl ExplorerModel {
    /// Aggregate the source table and precompute every region's series.
    pub fn build(table: &RawTable, catalog: RegionCatalog, default_region: RegionKey) -> Result<Self> {
        let years = table.years();
        let aggregated = aggregate_table(table)?;

        let mut series = HashMap::with_capacity(catalog.regions().len());
        for (key, region) in catalog.regions() {
            let reshaped = reshape(&aggregated, region, years);

            let unmatched: Vec<&str> = region
                .members()
                .iter()
                .filter(|m| !reshaped.entities().contains(*m))
                .map(String::as_str)
                .collect();
            if !unmatched.is_empty() {
                warn!(region = %key, ?unmatched, "region members not found in data");
            }

            series.insert(*key, reshaped);
        }

        info!(
            entities = aggregated.len(),
            regions = series.len(),
            min_year = years.min(),
            max_year = years.max(),
            "explorer model ready"
        );

        Ok(Self {
            years,
            catalog,
            aggregated,
            series,
            default_region,
        })
    }

    /// Load the configured CSV and build with the built-in catalog.
    pub fn from_config(config: &ExplorerConfig) -> Result<Self> {
        let table = RawTable::read_csv(
            config.data_path(),
            &config.data.entity_column,
            config.year_range()?,
        )?;
        Self::build(&table, RegionCatalog::builtin(), config.view.default_region)
    }

    /// Latest year, configured default region.
    pub fn default_state(&self) -> ViewState {
        ViewState::new(self.years.max(), self.default_region)
    }

    /// Recompute both render specs for `state`.
    ///
    /// Fails with `InvalidSelection` for a year outside the range and with
    /// `UnknownRegion` for a region without precomputed series.
    pub fn update(&self, state: &ViewState) -> Result<RenderSpecs> {
        self.years.check(state.selected_year)?;

        let map = MapSpec::for_year(&self.aggregated, state.selected_year);

        let region = self.catalog.get(state.selected_region)?;
        let table = self
            .series
            .get(&state.selected_region)
            .ok_or_else(|| ExplorerError::UnknownRegion(state.selected_region.to_string()))?;
        let line = LineSpec::new(region.key, region.name.as_str(), table.clone());

        debug!(
            year = state.selected_year,
            region = %state.selected_region,
            marks = map.marks.len(),
            series = line.table.entities().len(),
            "updated render specs"
        );
        Ok(RenderSpecs { map, line })
    }

    pub fn years(&self) -> YearRange {
        self.years
    }

    pub fn catalog(&self) -> &RegionCatalog {
        &self.catalog
    }

    pub fn aggregated(&self) -> &[AggregatedRow] {
        &self.aggregated
    }

    pub fn series(&self, key: RegionKey) -> Option<&TimeSeriesTable> {
        self.series.get(&key)
    }

    pub fn region_options(&self) -> Vec<RegionOption> {
        self.catalog.options()
    }

    pub fn slider_marks(&self) -> Vec<SliderMark> {
        slider_marks(self.years, crate::schema::years::MARK_STEP)
    }
}

/// One user's selection state over a shared model.
///
/// A failed selection leaves the previous state in place.
#[derive(Debug, Clone)]
pub struct Session {
    model: Arc<ExplorerModel>,
    state: ViewState,
}

impl Session {
    pub fn new(model: Arc<ExplorerModel>) -> Self {
        let state = model.default_state();
        Self { model, state }
    }

    pub fn model(&self) -> &ExplorerModel {
        &self.model
    }

    pub fn state(&self) -> ViewState {
        self.state
    }

    /// Specs for the current state.
    pub fn render(&self) -> Result<RenderSpecs> {
        self.model.update(&self.state)
    }

    pub fn select_year(&mut self, year: i32) -> Result<RenderSpecs> {
        self.apply(ViewState::new(year, self.state.selected_region))
    }

    pub fn select_region(&mut self, key: &str) -> Result<RenderSpecs> {
        let region: RegionKey = key.parse()?;
        self.apply(ViewState::new(self.state.selected_year, region))
    }

    /// Commit `next` only if both specs could be computed for it.
    pub fn apply(&mut self, next: ViewState) -> Result<RenderSpecs> {
        match self.model.update(&next) {
            Ok(specs) => {
                self.state = next;
                Ok(specs)
            }
            Err(err) => {
                debug!(error = %err, kept = ?self.state, "selection rejected");
                Err(err)
            }
        }
    }
}
