//! Output table writing
//!
//! Writes the three per-watershed tables: `LU6_<id>` (land-use summary),
//! `CH_<id>` (full crop history) and `FB_<id>` (field attributes), as CSV
//! or Parquet.

use crate::config::{CompressionAlgorithm, OutputFormat};
use crate::constants::{field_columns, output_tables};
use crate::error::{LandUseError, Result};
use crate::models::FieldRecord;
use polars::prelude::*;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Consumer of classified field records
pub trait FieldSink {
    /// Persist one watershed's records, returning the files written
    fn write_watershed(
        &self,
        watershed_id: &str,
        years: &[u16],
        records: &[FieldRecord],
    ) -> Result<Vec<PathBuf>>;
}

/// Sink writing polars tables to an output directory
#[derive(Debug, Clone)]
pub struct TableSink {
    output_dir: PathBuf,
    format: OutputFormat,
    compression: CompressionAlgorithm,
    force_overwrite: bool,
}

impl TableSink {
    pub fn new(output_dir: PathBuf, format: OutputFormat) -> Self {
        Self {
            output_dir,
            format,
            compression: CompressionAlgorithm::default(),
            force_overwrite: false,
        }
    }

    pub fn with_compression(mut self, compression: CompressionAlgorithm) -> Self {
        self.compression = compression;
        self
    }

    pub fn with_force_overwrite(mut self, force: bool) -> Self {
        self.force_overwrite = force;
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Output path of a table, e.g. `LU6_070801050302.csv`
    pub fn table_path(&self, prefix: &str, watershed_id: &str) -> PathBuf {
        self.output_dir
            .join(format!("{}_{}.{}", prefix, watershed_id, self.format.extension()))
    }

    fn write_frame(&self, mut df: DataFrame, path: &Path) -> Result<()> {
        if path.exists() && !self.force_overwrite {
            return Err(LandUseError::ProcessingFailed {
                path: path.to_path_buf(),
                reason: "output already exists (use --force to overwrite)".to_string(),
            });
        }

        let mut file = File::create(path)?;
        match self.format {
            OutputFormat::Csv => {
                CsvWriter::new(&mut file)
                    .include_header(true)
                    .finish(&mut df)?;
            }
            OutputFormat::Parquet => {
                ParquetWriter::new(file)
                    .with_compression(self.compression.to_polars_compression())
                    .finish(&mut df)?;
            }
        }

        debug!("Wrote {} rows to {}", df.height(), path.display());
        Ok(())
    }
}

impl FieldSink for TableSink {
    fn write_watershed(
        &self,
        watershed_id: &str,
        years: &[u16],
        records: &[FieldRecord],
    ) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(&self.output_dir)?;

        let tables = [
            (output_tables::LAND_USE, land_use_frame(records)?),
            (output_tables::CROP_HISTORY, crop_history_frame(years, records)?),
            (output_tables::FIELD_BOUNDARY, field_boundary_frame(records)?),
        ];

        let mut written = Vec::with_capacity(tables.len());
        for (prefix, df) in tables {
            let path = self.table_path(prefix, watershed_id);
            self.write_frame(df, &path)?;
            written.push(path);
        }
        Ok(written)
    }
}

fn ids(records: &[FieldRecord]) -> Column {
    Column::new(
        field_columns::FIELD_ID.into(),
        records.iter().map(|r| r.field_id.clone()).collect::<Vec<_>>(),
    )
}

fn text_column<F>(name: &str, records: &[FieldRecord], value: F) -> Column
where
    F: Fn(&FieldRecord) -> &str,
{
    Column::new(
        name.into(),
        records
            .iter()
            .map(|r| value(r).to_string())
            .collect::<Vec<_>>(),
    )
}

/// Field id and every derived land-use field
pub fn land_use_frame(records: &[FieldRecord]) -> Result<DataFrame> {
    Ok(DataFrame::new(vec![
        ids(records),
        text_column(field_columns::GENERAL_LAND_USE, records, |r| {
            r.land_use.general.as_str()
        }),
        text_column(field_columns::DETAILED_LAND_USE, records, |r| {
            r.land_use.detailed.as_str()
        }),
        text_column(field_columns::ROTATION, records, |r| r.rotation.as_str()),
        text_column(field_columns::SUMMARY, records, |r| r.summary.as_str()),
        text_column(field_columns::CORN_AFTER_CORN, records, |r| {
            r.corn_after_corn.as_str()
        }),
        text_column(field_columns::LOW_COVERAGE, records, |r| {
            r.low_coverage.as_str()
        }),
    ])?)
}

/// Field id and the majority/percent pair of every year
pub fn crop_history_frame(years: &[u16], records: &[FieldRecord]) -> Result<DataFrame> {
    let mut columns = vec![ids(records)];

    for year in years {
        let suffix = format!("{:02}", year % 100);
        let lookup = |r: &FieldRecord| {
            r.history
                .iter()
                .find(|o| o.calendar_year == Some(*year))
                .cloned()
        };

        columns.push(Column::new(
            format!("{}{}", field_columns::MAJORITY_PREFIX, suffix).into(),
            records
                .iter()
                .map(|r| lookup(r).and_then(|o| o.majority_code))
                .collect::<Vec<Option<i64>>>(),
        ));
        columns.push(Column::new(
            format!("{}{}", field_columns::PERCENT_PREFIX, suffix).into(),
            records
                .iter()
                .map(|r| lookup(r).and_then(|o| o.coverage_percent))
                .collect::<Vec<Option<f64>>>(),
        ));
    }

    Ok(DataFrame::new(columns)?)
}

/// Field id, area and agricultural flag
pub fn field_boundary_frame(records: &[FieldRecord]) -> Result<DataFrame> {
    Ok(DataFrame::new(vec![
        ids(records),
        Column::new(
            field_columns::ACRES.into(),
            records.iter().map(|r| r.area_acres).collect::<Vec<f64>>(),
        ),
        Column::new(
            field_columns::IS_AG.into(),
            records.iter().map(|r| r.ag_class.flag()).collect::<Vec<i32>>(),
        ),
    ])?)
}
