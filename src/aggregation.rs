use std::collections::BTreeMap;

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{ExplorerError, Result};
use crate::schema::observation;
use crate::table::{Observation, RawTable, YearRange};

/// One entity with the mean metric per year.
///
/// A year absent from `values` had no contributing observation. It is never
/// stored as zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedRow {
    pub entity: String,
    pub values: BTreeMap<i32, f64>,
}

impl AggregatedRow {
    pub fn value(&self, year: i32) -> Option<f64> {
        self.values.get(&year).copied()
    }
}

/// Collapse duplicate source rows into one row per entity.
///
/// Groups by (entity, year) and takes the arithmetic mean of the non-missing
/// values as sum / count. A group with no present value stays missing.
/// Output is ordered by entity name ascending.
pub fn aggregate(observations: &[Observation]) -> Result<Vec<AggregatedRow>> {
    if observations.is_empty() {
        return Err(ExplorerError::InvalidInput(
            "cannot aggregate an empty table".into(),
        ));
    }

    let entities: Vec<&str> = observations.iter().map(|o| o.entity.as_str()).collect();
    let years: Vec<i32> = observations.iter().map(|o| o.year).collect();
    let values: Vec<Option<f64>> = observations.iter().map(|o| o.value).collect();

    let long = df!(
        observation::ENTITY => entities,
        observation::YEAR => years,
        observation::VALUE => values,
    )?;

    // mean() panics on the partitioned group-by path; derive it from sum and count
    let present = col(observation::COUNT).gt(lit(0.0));
    let grouped = long
        .lazy()
        .group_by([col(observation::ENTITY), col(observation::YEAR)])
        .agg([
            col(observation::VALUE).sum().alias(observation::SUM),
            col(observation::VALUE)
                .count()
                .cast(DataType::Float64)
                .alias(observation::COUNT),
        ])
        .with_column(
            when(present)
                .then(col(observation::SUM) / col(observation::COUNT))
                .otherwise(lit(NULL).cast(DataType::Float64))
                .alias(observation::VALUE),
        )
        .collect()?;

    let entity_col = grouped.column(observation::ENTITY)?.str()?;
    let year_col = grouped.column(observation::YEAR)?.i32()?;
    let mean_col = grouped.column(observation::VALUE)?.f64()?;

    // BTreeMap keeps the entity order deterministic regardless of group order
    let mut rows: BTreeMap<String, BTreeMap<i32, f64>> = BTreeMap::new();
    for ((entity, year), mean) in entity_col
        .into_iter()
        .zip(year_col.into_iter())
        .zip(mean_col.into_iter())
    {
        let (Some(entity), Some(year)) = (entity, year) else {
            return Err(ExplorerError::InvalidInput(
                "null group key after aggregation".into(),
            ));
        };
        let cells = rows.entry(entity.to_string()).or_default();
        if let Some(mean) = mean {
            cells.insert(year, mean);
        }
    }

    info!(
        observations = observations.len(),
        entities = rows.len(),
        "aggregated source table"
    );

    Ok(rows
        .into_iter()
        .map(|(entity, values)| AggregatedRow { entity, values })
        .collect())
}

/// Aggregate every observation of a loaded table.
pub fn aggregate_table(table: &RawTable) -> Result<Vec<AggregatedRow>> {
    aggregate(table.observations())
}

/// Wide frame of the aggregated rows: the entity column plus one Float64
/// column per year in `years`, nulls where a cell is missing.
pub fn aggregated_frame(
    rows: &[AggregatedRow],
    entity_column: &str,
    years: YearRange,
) -> Result<DataFrame> {
    let mut columns: Vec<Column> = Vec::with_capacity(years.span() + 1);
    let entities: Vec<&str> = rows.iter().map(|r| r.entity.as_str()).collect();
    columns.push(Column::new(entity_column.into(), entities));

    for year in years.years() {
        let cells: Vec<Option<f64>> = rows.iter().map(|r| r.value(year)).collect();
        columns.push(Column::new(year.to_string().into(), cells));
    }

    Ok(DataFrame::new(columns)?)
}
