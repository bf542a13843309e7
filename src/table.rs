/// Source table: the per-entity, per-year observations as loaded.
///
/// The on-disk layout is wide (one entity column, one column per year, several
/// rows per entity allowed). It is flattened once into long-form
/// [`Observation`]s, which is the only shape the aggregator consumes.
use std::collections::BTreeSet;
use std::ops::RangeInclusive;
use std::path::Path;

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{ExplorerError, Result};
use crate::schema::years;

// ── Year range ──────────────────────────────────────────────────────────────

/// Inclusive range of supported years, at most `years::MAX_SPAN` wide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "YearBounds")]
pub struct YearRange {
    min: i32,
    max: i32,
}

/// Unchecked wire form; deserialization goes through [`YearRange::new`].
#[derive(Deserialize)]
struct YearBounds {
    min: i32,
    max: i32,
}

impl TryFrom<YearBounds> for YearRange {
    type Error = ExplorerError;

    fn try_from(bounds: YearBounds) -> Result<Self> {
        Self::new(bounds.min, bounds.max)
    }
}

impl YearRange {
    pub fn new(min: i32, max: i32) -> Result<Self> {
        if min > max {
            return Err(ExplorerError::InvalidInput(format!(
                "year range is empty: min {min} > max {max}"
            )));
        }
        if i64::from(max) - i64::from(min) >= years::MAX_SPAN {
            return Err(ExplorerError::InvalidInput(format!(
                "year range [{min}, {max}] is wider than {} years",
                years::MAX_SPAN
            )));
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> i32 {
        self.min
    }

    pub fn max(&self) -> i32 {
        self.max
    }

    pub fn contains(&self, year: i32) -> bool {
        (self.min..=self.max).contains(&year)
    }

    /// Ascending iterator over every year in the range.
    pub fn years(&self) -> RangeInclusive<i32> {
        self.min..=self.max
    }

    /// Number of years in the range.
    pub fn span(&self) -> usize {
        (i64::from(self.max) - i64::from(self.min) + 1) as usize
    }

    /// Reject a year outside the range as a bad selection.
    pub fn check(&self, year: i32) -> Result<()> {
        if self.contains(year) {
            Ok(())
        } else {
            Err(ExplorerError::InvalidSelection {
                year,
                min: self.min,
                max: self.max,
            })
        }
    }
}

impl Default for YearRange {
    fn default() -> Self {
        Self {
            min: years::MIN,
            max: years::MAX,
        }
    }
}

// ── Observations ────────────────────────────────────────────────────────────

/// One source cell: an entity's metric for one year, possibly missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub entity: String,
    pub year: i32,
    pub value: Option<f64>,
}

impl Observation {
    pub fn new(entity: impl Into<String>, year: i32, value: Option<f64>) -> Self {
        Self {
            entity: entity.into(),
            year,
            value,
        }
    }
}

/// Immutable, validated source data.
#[derive(Debug, Clone)]
pub struct RawTable {
    years: YearRange,
    observations: Vec<Observation>,
}

impl RawTable {
    /// Build from long-form observations.
    ///
    /// Fails with `InvalidInput` when empty, when an entity name is blank or
    /// when a year falls outside `years`. A NaN value is stored as missing.
    pub fn from_observations(
        years: YearRange,
        mut observations: Vec<Observation>,
    ) -> Result<Self> {
        if observations.is_empty() {
            return Err(ExplorerError::InvalidInput(
                "source table has no observations".into(),
            ));
        }
        for obs in &mut observations {
            if obs.value.is_some_and(f64::is_nan) {
                obs.value = None;
            }
            if obs.entity.trim().is_empty() {
                return Err(ExplorerError::InvalidInput(
                    "observation with blank entity name".into(),
                ));
            }
            if !years.contains(obs.year) {
                return Err(ExplorerError::InvalidInput(format!(
                    "observation for '{}' in year {} outside [{}, {}]",
                    obs.entity,
                    obs.year,
                    years.min(),
                    years.max()
                )));
            }
        }
        Ok(Self {
            years,
            observations,
        })
    }

    /// Read a wide CSV with all columns as strings.
    /// Trims whitespace from column names before validation.
    pub fn read_csv(path: impl AsRef<Path>, entity_column: &str, years: YearRange) -> Result<Self> {
        let path = path.as_ref();
        let mut df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(0)) // all columns as String
            .try_into_reader_with_file_path(Some(path.to_path_buf()))?
            .finish()?;

        let trimmed: Vec<String> = df
            .get_column_names_str()
            .iter()
            .map(|c| c.trim().to_string())
            .collect();
        df.set_column_names(trimmed)?;

        info!(
            path = %path.display(),
            rows = df.height(),
            columns = df.width(),
            "read source table"
        );
        Self::from_frame(&df, entity_column, years)
    }

    /// Validate a wide frame and flatten it into observations.
    ///
    /// Required columns: `entity_column` and one column per year in `years`,
    /// named by the decimal year. Other columns are ignored.
    pub fn from_frame(df: &DataFrame, entity_column: &str, years: YearRange) -> Result<Self> {
        if df.height() == 0 {
            return Err(ExplorerError::InvalidInput("source table has no rows".into()));
        }

        let entity_col = require_column(df, entity_column)?.cast(&DataType::String)?;
        let entity_names = entity_col.str()?;
        let mut entities = Vec::with_capacity(df.height());
        for (row, name) in entity_names.into_iter().enumerate() {
            match name {
                Some(n) if !n.trim().is_empty() => entities.push(n.to_string()),
                _ => {
                    return Err(ExplorerError::InvalidInput(format!(
                        "row {row} has no '{entity_column}' value"
                    )))
                }
            }
        }

        // All year columns must exist before anything is parsed
        let mut year_columns = Vec::new();
        for year in years.years() {
            year_columns.push((year, require_column(df, &year.to_string())?));
        }

        // Column-major parse, one Vec per year
        let mut year_values: Vec<(i32, Vec<Option<f64>>)> = Vec::with_capacity(years.span());
        for (year, column) in year_columns {
            let cells = column.cast(&DataType::String)?;
            year_values.push((year, parse_cells(cells.str()?, column.name())?));
        }

        let mut observations = Vec::with_capacity(df.height() * years.span());
        for (row, entity) in entities.iter().enumerate() {
            for (year, values) in &year_values {
                observations.push(Observation::new(entity.as_str(), *year, values[row]));
            }
        }

        debug!(
            rows = entities.len(),
            observations = observations.len(),
            "flattened source table"
        );
        Self::from_observations(years, observations)
    }

    pub fn years(&self) -> YearRange {
        self.years
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    /// Distinct entity names, sorted.
    pub fn entities(&self) -> BTreeSet<&str> {
        self.observations.iter().map(|o| o.entity.as_str()).collect()
    }
}

// ── Private helpers ─────────────────────────────────────────────────────────

fn require_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Column> {
    df.column(name)
        .map_err(|_| ExplorerError::InvalidInput(format!("missing column: {name}")))
}

/// Parse string cells to floats. Blank cells and NaN are missing; anything
/// else that is not a number is malformed input.
fn parse_cells(cells: &StringChunked, column: &str) -> Result<Vec<Option<f64>>> {
    cells
        .into_iter()
        .enumerate()
        .map(|(row, cell)| match cell.map(str::trim) {
            None | Some("") => Ok(None),
            Some(text) => text
                .parse::<f64>()
                .map(|v| if v.is_nan() { None } else { Some(v) })
                .map_err(|_| {
                    ExplorerError::InvalidInput(format!(
                        "column '{column}' row {row}: '{text}' is not a number"
                    ))
                }),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::source;

    fn small_range() -> YearRange {
        YearRange::new(2000, 2001).unwrap()
    }

    fn wide_frame() -> DataFrame {
        df!(
            source::ENTITY => ["A", "A", "B"],
            "2000" => [Some("1.0"), Some("3.0"), Some(" 5 ")],
            "2001" => [None, Some(""), Some("2.5")],
            "Country Code" => ["AAA", "AAA", "BBB"],
        )
        .unwrap()
    }

    #[test]
    fn year_range_rejects_inverted_bounds() {
        assert!(matches!(
            YearRange::new(2018, 1960),
            Err(ExplorerError::InvalidInput(_))
        ));
    }

    #[test]
    fn year_range_check_reports_bounds() {
        let range = YearRange::default();
        assert_eq!(range.span(), 59);
        assert!(range.check(2018).is_ok());
        match range.check(1900) {
            Err(ExplorerError::InvalidSelection { year, min, max }) => {
                assert_eq!((year, min, max), (1900, 1960, 2018));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn year_range_rejects_absurd_width() {
        assert!(matches!(
            YearRange::new(i32::MIN, i32::MAX),
            Err(ExplorerError::InvalidInput(_))
        ));
        assert!(matches!(
            YearRange::new(-2_000_000_000, 2_000_000_000),
            Err(ExplorerError::InvalidInput(_))
        ));
        let widest = YearRange::new(1000, 1999).unwrap();
        assert_eq!(widest.span(), 1000);
        assert!(YearRange::new(1000, 2000).is_err());
    }

    #[test]
    fn year_range_deserialization_is_validated() {
        let range: YearRange = serde_json::from_str(r#"{"min": 1990, "max": 2000}"#).unwrap();
        assert_eq!((range.min(), range.max()), (1990, 2000));
        assert!(serde_json::from_str::<YearRange>(r#"{"min": 2000, "max": 1990}"#).is_err());
        assert!(serde_json::from_str::<YearRange>(
            r#"{"min": -2000000000, "max": 2000000000}"#
        )
        .is_err());
    }

    #[test]
    fn nan_observation_is_stored_as_missing() {
        let table = RawTable::from_observations(
            small_range(),
            vec![
                Observation::new("A", 2000, Some(f64::NAN)),
                Observation::new("A", 2000, Some(2.0)),
            ],
        )
        .unwrap();
        assert_eq!(table.observations()[0].value, None);

        let rows = crate::aggregation::aggregate_table(&table).unwrap();
        assert_eq!(rows[0].value(2000), Some(2.0));
    }

    #[test]
    fn frame_is_flattened_row_major() {
        let table = RawTable::from_frame(&wide_frame(), source::ENTITY, small_range()).unwrap();
        let obs = table.observations();
        assert_eq!(obs.len(), 6);
        assert_eq!(obs[0], Observation::new("A", 2000, Some(1.0)));
        assert_eq!(obs[1], Observation::new("A", 2001, None));
        assert_eq!(obs[3], Observation::new("A", 2001, None));
        assert_eq!(obs[4], Observation::new("B", 2000, Some(5.0)));
        assert_eq!(table.entities().into_iter().collect::<Vec<_>>(), vec!["A", "B"]);
    }

    #[test]
    fn missing_year_column_is_invalid_input() {
        let range = YearRange::new(2000, 2002).unwrap();
        let err = RawTable::from_frame(&wide_frame(), source::ENTITY, range).unwrap_err();
        assert!(matches!(err, ExplorerError::InvalidInput(msg) if msg.contains("2002")));
    }

    #[test]
    fn missing_entity_column_is_invalid_input() {
        let err = RawTable::from_frame(&wide_frame(), "Entity", small_range()).unwrap_err();
        assert!(matches!(err, ExplorerError::InvalidInput(_)));
    }

    #[test]
    fn non_numeric_cell_is_invalid_input() {
        let df = df!(
            source::ENTITY => ["A"],
            "2000" => ["12%"],
            "2001" => ["1"],
        )
        .unwrap();
        let err = RawTable::from_frame(&df, source::ENTITY, small_range()).unwrap_err();
        assert!(matches!(err, ExplorerError::InvalidInput(msg) if msg.contains("12%")));
    }

    #[test]
    fn empty_inputs_are_rejected() {
        assert!(matches!(
            RawTable::from_observations(small_range(), vec![]),
            Err(ExplorerError::InvalidInput(_))
        ));
        let out_of_range = vec![Observation::new("A", 1999, Some(1.0))];
        assert!(matches!(
            RawTable::from_observations(small_range(), out_of_range),
            Err(ExplorerError::InvalidInput(_))
        ));
    }
}
