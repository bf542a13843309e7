/// Visualization module: renderer-agnostic chart specifications.
///
/// Produces the two payloads handed to the external renderer on every
/// selection change:
/// - a choropleth spec (one value per entity for the selected year)
/// - a multi-series line spec (one line per entity of the selected region)
///
/// Nothing here draws. Specs serialize to JSON or convert to polars frames
/// for a plotting front end.
use polars::prelude::*;
use serde::Serialize;

use crate::aggregation::AggregatedRow;
use crate::error::Result;
use crate::region::RegionKey;
use crate::reshape::{LineSeries, TimeSeriesTable};
use crate::schema::{line, map, VALUE_LABEL};
use crate::table::YearRange;

// ── Map spec ────────────────────────────────────────────────────────────────

/// Fixed continuous color scale of the map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColorScale {
    pub scheme: String,
    pub range: [f64; 2],
    pub label: String,
}

impl Default for ColorScale {
    fn default() -> Self {
        Self {
            scheme: map::COLOR_SCHEME.to_string(),
            range: map::COLOR_RANGE,
            label: VALUE_LABEL.to_string(),
        }
    }
}

/// One colored entity on the map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapMark {
    pub entity: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapSpec {
    pub year: i32,
    pub title: String,
    pub location_mode: String,
    pub color: ColorScale,
    pub marks: Vec<MapMark>,
    /// Entities without a value for `year`. Rendered as "no data", never as 0.
    pub no_data: Vec<String>,
}

impl MapSpec {
    /// Slice the aggregated rows to the single `year` column.
    pub fn for_year(aggregated: &[AggregatedRow], year: i32) -> Self {
        let mut marks = Vec::new();
        let mut no_data = Vec::new();
        for row in aggregated {
            match row.value(year) {
                Some(value) => marks.push(MapMark {
                    entity: row.entity.clone(),
                    value,
                }),
                None => no_data.push(row.entity.clone()),
            }
        }

        Self {
            year,
            title: format!("{}{}", map::TITLE_PREFIX, year),
            location_mode: map::LOCATION_MODE.to_string(),
            color: ColorScale::default(),
            marks,
            no_data,
        }
    }

    pub fn value(&self, entity: &str) -> Option<f64> {
        self.marks
            .iter()
            .find(|m| m.entity == entity)
            .map(|m| m.value)
    }

    /// Frame with the entity column and the value column. "No data"
    /// entities carry a null value.
    pub fn to_frame(&self) -> Result<DataFrame> {
        let mut entities: Vec<&str> = Vec::with_capacity(self.marks.len() + self.no_data.len());
        let mut values: Vec<Option<f64>> = Vec::with_capacity(entities.capacity());
        for mark in &self.marks {
            entities.push(&mark.entity);
            values.push(Some(mark.value));
        }
        for entity in &self.no_data {
            entities.push(entity);
            values.push(None);
        }

        Ok(DataFrame::new(vec![
            Column::new(map::ENTITY.into(), entities),
            Column::new(map::VALUE.into(), values),
        ])?)
    }
}

// ── Line spec ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineSpec {
    pub region: RegionKey,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub table: TimeSeriesTable,
}

impl LineSpec {
    pub fn new(region: RegionKey, title: impl Into<String>, table: TimeSeriesTable) -> Self {
        Self {
            region,
            title: title.into(),
            x_label: line::YEAR.to_string(),
            y_label: VALUE_LABEL.to_string(),
            table,
        }
    }

    pub fn series(&self) -> Vec<LineSeries> {
        self.table.series()
    }
}

// ── Combined payload ────────────────────────────────────────────────────────

/// Both chart specs for one selection, always produced together.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderSpecs {
    pub map: MapSpec,
    pub line: LineSpec,
}

impl RenderSpecs {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

// ── Controls ────────────────────────────────────────────────────────────────

/// Labelled tick on the year slider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SliderMark {
    pub year: i32,
    pub label: String,
}

/// Slider ticks: every multiple of `step` inside `years` plus both ends,
/// newest first.
pub fn slider_marks(years: YearRange, step: i32) -> Vec<SliderMark> {
    let step = step.max(1);
    years
        .years()
        .rev()
        .filter(|y| *y == years.max() || *y == years.min() || y.rem_euclid(step) == 0)
        .map(|year| SliderMark {
            year,
            label: year.to_string(),
        })
        .collect()
}
