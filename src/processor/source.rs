//! Field table source
//!
//! Reads a per-watershed field table (one row per field, one `majYY` /
//! `pctYY` column pair per year) and turns it into field records carrying
//! the most recent six-year window and the full history.

use super::discovery::WatershedTable;
use crate::constants::{WINDOW_YEARS, field_columns};
use crate::error::{LandUseError, Result};
use crate::models::{FieldRecord, FieldYearObservation};
use crate::table::{f64_column, has_column, i64_column, read_table, string_column};
use polars::prelude::DataFrame;
use regex::Regex;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Year column names: `maj17`, `pct17`, `maj2017`, `Pct2017`
const YEAR_COLUMN_PATTERN: &str = r"(?i)^(maj|pct)(\d{2}|\d{4})$";

/// Fields read from one watershed table
#[derive(Debug, Clone)]
pub struct WatershedFields {
    pub watershed_id: String,
    pub source_path: PathBuf,
    /// Every calendar year with a majority column, oldest first
    pub all_years: Vec<u16>,
    /// The six years used for classification, oldest first
    pub window_years: Vec<u16>,
    pub records: Vec<FieldRecord>,
}

/// Supplier of per-field observations for one watershed
pub trait FieldSource {
    fn watershed_id(&self) -> &str;

    fn read_fields(&self) -> Result<WatershedFields>;
}

/// Year column pair found in a table
#[derive(Debug, Clone, Default)]
struct YearColumns {
    majority: Option<String>,
    percent: Option<String>,
}

/// Field source backed by a CSV or Parquet table
#[derive(Debug, Clone)]
pub struct TableFieldSource {
    table: WatershedTable,
    year_regex: Regex,
}

impl TableFieldSource {
    pub fn new(table: WatershedTable) -> Result<Self> {
        let year_regex = Regex::new(YEAR_COLUMN_PATTERN)
            .map_err(|e| LandUseError::configuration(e.to_string()))?;
        Ok(Self { table, year_regex })
    }

    fn invalid(&self, reason: impl Into<String>) -> LandUseError {
        LandUseError::InvalidFormat {
            path: self.table.path.clone(),
            reason: reason.into(),
        }
    }

    /// Map calendar year to its majority and percent columns
    fn year_columns(&self, df: &DataFrame) -> BTreeMap<u16, YearColumns> {
        let mut years: BTreeMap<u16, YearColumns> = BTreeMap::new();

        for name in df.get_column_names() {
            let Some(caps) = self.year_regex.captures(name.as_str()) else {
                continue;
            };
            let Ok(digits) = caps[2].parse::<u16>() else {
                continue;
            };
            let year = if caps[2].len() == 2 { 2000 + digits } else { digits };

            let entry = years.entry(year).or_default();
            if caps[1].eq_ignore_ascii_case(field_columns::MAJORITY_PREFIX) {
                entry.majority = Some(name.to_string());
            } else {
                entry.percent = Some(name.to_string());
            }
        }

        years
    }

    /// Field identifiers, synthesising `F{watershed}_{OBJECTID}` where missing
    fn field_ids(&self, df: &DataFrame) -> Result<Vec<String>> {
        let rows = df.height();
        let given = if has_column(df, field_columns::FIELD_ID) {
            string_column(df, field_columns::FIELD_ID)?
        } else {
            vec![None; rows]
        };
        let object_ids = if has_column(df, field_columns::OBJECT_ID) {
            i64_column(df, field_columns::OBJECT_ID)?
        } else {
            vec![None; rows]
        };

        let mut synthesised = 0usize;
        let ids = given
            .into_iter()
            .zip(object_ids)
            .enumerate()
            .map(|(row, (id, object_id))| match id.filter(|s| !s.trim().is_empty()) {
                Some(id) => id.trim().to_string(),
                None => {
                    synthesised += 1;
                    let object_id = object_id.unwrap_or(row as i64 + 1);
                    format!("F{}_{}", self.table.watershed_id, object_id)
                }
            })
            .collect();

        if synthesised > 0 {
            debug!(
                "Synthesised {} field ids for watershed {}",
                synthesised, self.table.watershed_id
            );
        }
        Ok(ids)
    }
}

impl FieldSource for TableFieldSource {
    fn watershed_id(&self) -> &str {
        &self.table.watershed_id
    }

    fn read_fields(&self) -> Result<WatershedFields> {
        let df = read_table(&self.table.path)?;

        if !has_column(&df, field_columns::ACRES) {
            return Err(self.invalid(format!("missing column '{}'", field_columns::ACRES)));
        }

        let year_columns: Vec<(u16, YearColumns)> = self
            .year_columns(&df)
            .into_iter()
            .filter(|(year, cols)| {
                if cols.majority.is_none() {
                    warn!(
                        "Watershed {}: year {} has no majority column, skipping",
                        self.table.watershed_id, year
                    );
                }
                cols.majority.is_some()
            })
            .collect();

        if year_columns.len() < WINDOW_YEARS {
            return Err(LandUseError::InvalidWindow {
                field_id: format!("watershed {}", self.table.watershed_id),
                expected: WINDOW_YEARS,
                found: year_columns.len(),
            });
        }

        let all_years: Vec<u16> = year_columns.iter().map(|(year, _)| *year).collect();
        let window_start = all_years.len() - WINDOW_YEARS;
        let window_years = all_years[window_start..].to_vec();

        if window_start > 0 {
            info!(
                "Watershed {}: {} years available, classifying {}-{}",
                self.table.watershed_id,
                all_years.len(),
                window_years[0],
                window_years[WINDOW_YEARS - 1]
            );
        }

        let rows = df.height();
        let ids = self.field_ids(&df)?;
        let areas = f64_column(&df, field_columns::ACRES)?;

        let mut majority_by_year = Vec::with_capacity(year_columns.len());
        let mut percent_by_year = Vec::with_capacity(year_columns.len());
        for (_, cols) in &year_columns {
            let majority = match &cols.majority {
                Some(name) => i64_column(&df, name)?,
                None => vec![None; rows],
            };
            let percent = match &cols.percent {
                Some(name) => f64_column(&df, name)?,
                None => vec![None; rows],
            };
            majority_by_year.push(majority);
            percent_by_year.push(percent);
        }

        let mut records = Vec::with_capacity(rows);
        for (row, field_id) in ids.into_iter().enumerate() {
            let history: Vec<FieldYearObservation> = all_years
                .iter()
                .enumerate()
                .map(|(i, year)| FieldYearObservation {
                    field_id: field_id.clone(),
                    year: i,
                    calendar_year: Some(*year),
                    majority_code: majority_by_year[i][row],
                    coverage_percent: percent_by_year[i][row],
                })
                .collect();

            let window = history[window_start..]
                .iter()
                .enumerate()
                .map(|(year, obs)| FieldYearObservation { year, ..obs.clone() })
                .collect();

            let area = match areas[row] {
                Some(area) if area.is_finite() => area,
                other => {
                    warn!("Field {} has no usable area ({:?}), treating as 0 ac", field_id, other);
                    0.0
                }
            };

            records.push(FieldRecord::new(field_id, area, window).with_history(history));
        }

        debug!(
            "Read {} fields from {}",
            records.len(),
            self.table.path.display()
        );

        Ok(WatershedFields {
            watershed_id: self.table.watershed_id.clone(),
            source_path: self.table.path.clone(),
            all_years,
            window_years,
            records,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn source_for(temp_dir: &TempDir, contents: &str) -> TableFieldSource {
        let path = temp_dir.path().join("fields_070801050302.csv");
        fs::write(&path, contents).unwrap();
        TableFieldSource::new(WatershedTable {
            watershed_id: "070801050302".to_string(),
            path,
        })
        .unwrap()
    }

    #[test]
    fn test_reads_window_and_history() {
        let temp_dir = TempDir::new().unwrap();
        let source = source_for(
            &temp_dir,
            "FBndID,Acres,maj14,pct14,maj15,pct15,maj16,pct16,maj17,pct17,maj18,pct18,maj19,pct19,maj20,pct20\n\
             F1,40.5,5,88,1,90,5,91,1,80,5,70,1,95,5,99\n\
             F2,2.0,176,100,176,100,176,100,176,100,176,100,176,100,176,100\n",
        );

        let fields = source.read_fields().unwrap();

        assert_eq!(fields.all_years, (2014..=2020).collect::<Vec<u16>>());
        assert_eq!(fields.window_years, (2015..=2020).collect::<Vec<u16>>());
        assert_eq!(fields.records.len(), 2);

        let first = &fields.records[0];
        assert_eq!(first.field_id, "F1");
        assert_eq!(first.area_acres, 40.5);
        assert_eq!(first.history.len(), 7);
        assert_eq!(first.observations.len(), 6);
        assert_eq!(first.observations[0].calendar_year, Some(2015));
        assert_eq!(first.observations[0].year, 0);
        assert_eq!(first.observations[0].majority_code, Some(1));
        assert_eq!(first.observations[5].coverage_percent, Some(99.0));
    }

    #[test]
    fn test_synthesises_missing_field_ids() {
        let temp_dir = TempDir::new().unwrap();
        let source = source_for(
            &temp_dir,
            "OBJECTID,Acres,maj15,maj16,maj17,maj18,maj19,maj20\n\
             7,12,1,1,1,1,1,1\n",
        );

        let fields = source.read_fields().unwrap();
        let record = &fields.records[0];
        assert_eq!(record.field_id, "F070801050302_7");
        assert!(record.observations.iter().all(|o| o.coverage_percent.is_none()));
    }

    #[test]
    fn test_null_codes_survive_reading() {
        let temp_dir = TempDir::new().unwrap();
        let source = source_for(
            &temp_dir,
            "FBndID,Acres,maj2015,pct2015,maj2016,pct2016,maj2017,pct2017,maj2018,pct2018,maj2019,pct2019,maj2020,pct2020\n\
             F1,20,1,90,,,5,90,1,90,5,90,1,90\n",
        );

        let fields = source.read_fields().unwrap();
        assert_eq!(fields.window_years[0], 2015);
        assert_eq!(fields.records[0].observations[1].majority_code, None);
    }

    #[test]
    fn test_missing_area_reads_as_zero() {
        let temp_dir = TempDir::new().unwrap();
        let source = source_for(
            &temp_dir,
            "FBndID,Acres,maj15,maj16,maj17,maj18,maj19,maj20\n\
             F1,,1,1,1,1,1,1\n\
             F3,12.5,1,1,1,1,1,1\n",
        );

        let fields = source.read_fields().unwrap();
        let areas: Vec<f64> = fields.records.iter().map(|r| r.area_acres).collect();
        assert_eq!(areas, vec![0.0, 12.5]);
    }

    #[test]
    fn test_too_few_years() {
        let temp_dir = TempDir::new().unwrap();
        let source = source_for(
            &temp_dir,
            "FBndID,Acres,maj19,pct19,maj20,pct20\nF1,20,1,90,1,90\n",
        );

        match source.read_fields() {
            Err(LandUseError::InvalidWindow { expected, found, .. }) => {
                assert_eq!(expected, 6);
                assert_eq!(found, 2);
            }
            other => panic!("Expected InvalidWindow error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_acres_column() {
        let temp_dir = TempDir::new().unwrap();
        let source = source_for(
            &temp_dir,
            "FBndID,maj15,maj16,maj17,maj18,maj19,maj20\nF1,1,1,1,1,1,1\n",
        );

        assert!(matches!(
            source.read_fields(),
            Err(LandUseError::InvalidFormat { .. })
        ));
    }
}
