use polars::prelude::*;
use serde::Serialize;

use crate::aggregation::AggregatedRow;
use crate::error::Result;
use crate::region::Region;
use crate::schema::line;
use crate::table::YearRange;

/// One year of a region's time series, aligned to the table's entity columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearRow {
    pub year: i32,
    pub values: Vec<Option<f64>>,
}

/// Year-major table for one region: a row per year (ascending), a column per
/// matched member entity (in region member order).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeriesTable {
    entities: Vec<String>,
    rows: Vec<YearRow>,
}

/// A single entity's line. Missing years are left out, which renders as a gap.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineSeries {
    pub entity: String,
    pub points: Vec<LinePoint>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinePoint {
    pub year: i32,
    pub value: f64,
}

/// Transpose the aggregated rows of one region from entity-major to
/// year-major.
///
/// Members absent from `aggregated` produce no column. When nothing matches,
/// every year is still present with zero values.
pub fn reshape(aggregated: &[AggregatedRow], region: &Region, years: YearRange) -> TimeSeriesTable {
    let matched: Vec<&AggregatedRow> = region
        .members()
        .iter()
        .filter_map(|member| aggregated.iter().find(|row| &row.entity == member))
        .collect();

    let rows = years
        .years()
        .map(|year| YearRow {
            year,
            values: matched.iter().map(|row| row.value(year)).collect(),
        })
        .collect();

    TimeSeriesTable {
        entities: matched.iter().map(|row| row.entity.clone()).collect(),
        rows,
    }
}

impl TimeSeriesTable {
    pub fn entities(&self) -> &[String] {
        &self.entities
    }

    pub fn rows(&self) -> &[YearRow] {
        &self.rows
    }

    pub fn row(&self, year: i32) -> Option<&YearRow> {
        self.rows.iter().find(|r| r.year == year)
    }

    pub fn value(&self, year: i32, entity: &str) -> Option<f64> {
        let idx = self.entities.iter().position(|e| e == entity)?;
        self.row(year)?.values[idx]
    }

    /// True when no member of the region matched the data.
    pub fn has_no_columns(&self) -> bool {
        self.entities.is_empty()
    }

    /// One line per entity with missing cells omitted.
    pub fn series(&self) -> Vec<LineSeries> {
        self.entities
            .iter()
            .enumerate()
            .map(|(idx, entity)| LineSeries {
                entity: entity.clone(),
                points: self
                    .rows
                    .iter()
                    .filter_map(|row| {
                        row.values[idx].map(|value| LinePoint {
                            year: row.year,
                            value,
                        })
                    })
                    .collect(),
            })
            .collect()
    }

    /// Polars frame with a `Year` column followed by one Float64 column per
    /// entity.
    pub fn to_frame(&self) -> Result<DataFrame> {
        let mut columns: Vec<Column> = Vec::with_capacity(self.entities.len() + 1);
        let years: Vec<i32> = self.rows.iter().map(|r| r.year).collect();
        columns.push(Column::new(line::YEAR.into(), years));

        for (idx, entity) in self.entities.iter().enumerate() {
            let cells: Vec<Option<f64>> = self.rows.iter().map(|r| r.values[idx]).collect();
            columns.push(Column::new(entity.as_str().into(), cells));
        }

        Ok(DataFrame::new(columns)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::RegionKey;
    use std::collections::BTreeMap;

    fn row(entity: &str, values: &[(i32, f64)]) -> AggregatedRow {
        AggregatedRow {
            entity: entity.to_string(),
            values: values.iter().copied().collect::<BTreeMap<_, _>>(),
        }
    }

    fn years() -> YearRange {
        YearRange::new(2000, 2002).unwrap()
    }

    #[test]
    fn unmatched_members_are_skipped() {
        let aggregated = vec![row("A", &[(2000, 2.0)]), row("B", &[(2000, 5.0)])];
        let region = Region::new(RegionKey::WestEurope, "West Europe", ["A", "C"]);
        let table = reshape(&aggregated, &region, YearRange::new(2000, 2000).unwrap());

        assert_eq!(table.entities(), &["A".to_string()]);
        assert_eq!(table.value(2000, "A"), Some(2.0));
        assert_eq!(table.value(2000, "C"), None);
    }

    #[test]
    fn columns_follow_member_order() {
        let aggregated = vec![row("A", &[]), row("B", &[]), row("C", &[])];
        let region = Region::new(RegionKey::EastAsia, "East Asia", ["C", "A", "B"]);
        let table = reshape(&aggregated, &region, years());

        assert_eq!(table.entities(), &["C", "A", "B"].map(String::from));
    }

    #[test]
    fn every_year_is_present_even_when_missing() {
        let aggregated = vec![row("A", &[(2001, 1.5)])];
        let region = Region::new(RegionKey::Africa, "Africa", ["A"]);
        let table = reshape(&aggregated, &region, years());

        let years: Vec<i32> = table.rows().iter().map(|r| r.year).collect();
        assert_eq!(years, vec![2000, 2001, 2002]);
        assert_eq!(table.row(2000).unwrap().values, vec![None]);
        assert_eq!(table.row(2001).unwrap().values, vec![Some(1.5)]);
    }

    #[test]
    fn no_match_yields_empty_rows() {
        let aggregated = vec![row("A", &[(2000, 1.0)])];
        let region = Region::new(RegionKey::SouthAmerica, "South America", ["Columbia"]);
        let table = reshape(&aggregated, &region, years());

        assert!(table.has_no_columns());
        assert_eq!(table.rows().len(), 3);
        assert!(table.rows().iter().all(|r| r.values.is_empty()));
        assert!(table.series().is_empty());
    }

    #[test]
    fn series_leave_gaps_for_missing_years() {
        let aggregated = vec![row("A", &[(2000, 1.0), (2002, 3.0)])];
        let region = Region::new(RegionKey::Africa, "Africa", ["A"]);
        let series = reshape(&aggregated, &region, years()).series();

        assert_eq!(series.len(), 1);
        let years: Vec<i32> = series[0].points.iter().map(|p| p.year).collect();
        assert_eq!(years, vec![2000, 2002]);
    }

    #[test]
    fn frame_has_year_column_first() {
        let aggregated = vec![row("A", &[(2000, 1.0)]), row("B", &[(2001, 2.0)])];
        let region = Region::new(RegionKey::NorthAmerica, "North America", ["B", "A"]);
        let frame = reshape(&aggregated, &region, years()).to_frame().unwrap();

        let names: Vec<String> = frame
            .get_column_names_str()
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(names, vec!["Year", "B", "A"]);
        assert_eq!(frame.height(), 3);
        assert_eq!(frame.column("B").unwrap().f64().unwrap().get(1), Some(2.0));
    }
}
