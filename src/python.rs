use std::path::PathBuf;
use std::sync::Arc;

use pyo3::prelude::*;
use pyo3_polars::PyDataFrame;

use crate::aggregation::aggregated_frame;
use crate::config::ExplorerConfig;
use crate::logging;
use crate::model::{ExplorerModel, Session, ViewState};
use crate::region::{RegionCatalog, RegionKey};
use crate::schema::source;
use crate::table::{RawTable, YearRange};

/// Python handle on one explorer session.
///
/// The derived tables are built once in the constructor. Every `update`
/// recomputes both chart frames from the (year, region) pair.
#[pyclass(name = "Explorer")]
pub struct PyExplorer {
    session: Session,
    entity_column: String,
}

#[pymethods]
impl PyExplorer {
    #[new]
    #[pyo3(signature = (path, entity_column=None, min_year=None, max_year=None))]
    fn new(
        path: PathBuf,
        entity_column: Option<String>,
        min_year: Option<i32>,
        max_year: Option<i32>,
    ) -> PyResult<Self> {
        let defaults = YearRange::default();
        let years = YearRange::new(
            min_year.unwrap_or(defaults.min()),
            max_year.unwrap_or(defaults.max()),
        )?;
        let entity_column = entity_column.unwrap_or_else(|| source::ENTITY.to_string());

        let table = RawTable::read_csv(&path, &entity_column, years)?;
        let model = ExplorerModel::build(&table, RegionCatalog::builtin(), RegionKey::World)?;
        Ok(Self {
            session: Session::new(Arc::new(model)),
            entity_column,
        })
    }

    /// Build from a TOML config file.
    #[staticmethod]
    fn from_config(path: PathBuf) -> PyResult<Self> {
        let config = ExplorerConfig::load(&path)?;
        let model = ExplorerModel::from_config(&config)?;
        Ok(Self {
            session: Session::new(Arc::new(model)),
            entity_column: config.data.entity_column,
        })
    }

    /// Apply a selection and return `(map_title, map_df, line_df)`.
    ///
    /// On a bad year or region a ValueError is raised and the previous
    /// selection stays active.
    fn update(&mut self, year: i32, region: &str) -> PyResult<(String, PyDataFrame, PyDataFrame)> {
        let key: RegionKey = region.parse()?;
        let specs = self.session.apply(ViewState::new(year, key))?;
        let map_df = specs.map.to_frame()?;
        let line_df = specs.line.table.to_frame()?;
        Ok((specs.map.title, PyDataFrame(map_df), PyDataFrame(line_df)))
    }

    /// Same selection semantics as `update`, returning the full specs as JSON.
    fn update_json(&mut self, year: i32, region: &str) -> PyResult<String> {
        let key: RegionKey = region.parse()?;
        let specs = self.session.apply(ViewState::new(year, key))?;
        Ok(specs.to_json()?)
    }

    /// `(label, value)` pairs for the region dropdown.
    fn region_options(&self) -> Vec<(String, String)> {
        self.session
            .model()
            .region_options()
            .into_iter()
            .map(|o| (o.label, o.value.to_string()))
            .collect()
    }

    /// Labelled years for the slider, newest first.
    fn slider_marks(&self) -> Vec<i32> {
        self.session
            .model()
            .slider_marks()
            .into_iter()
            .map(|m| m.year)
            .collect()
    }

    #[getter]
    fn selected_year(&self) -> i32 {
        self.session.state().selected_year
    }

    #[getter]
    fn selected_region(&self) -> String {
        self.session.state().selected_region.to_string()
    }

    #[getter]
    fn min_year(&self) -> i32 {
        self.session.model().years().min()
    }

    #[getter]
    fn max_year(&self) -> i32 {
        self.session.model().years().max()
    }

    #[getter]
    fn aggregated_df(&self) -> PyResult<PyDataFrame> {
        let model = self.session.model();
        let df = aggregated_frame(model.aggregated(), &self.entity_column, model.years())?;
        Ok(PyDataFrame(df))
    }
}

/// Route Rust log records to stderr. `RUST_LOG` overrides `filter`.
#[pyfunction]
#[pyo3(signature = (filter="info"))]
fn init_logging(filter: &str) -> bool {
    logging::init_tracing(filter)
}

#[pymodule]
#[pyo3(name = "_core")]
pub fn core_module(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyExplorer>()?;
    m.add_function(wrap_pyfunction!(init_logging, m)?)?;
    m.add("DEFAULT_REGION", RegionKey::default().to_string())?;
    Ok(())
}
