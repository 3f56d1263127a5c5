//! Logged-sample table and its CSV serialization.
//!
//! Rows are taken from a [`NormalizedSeries`] handed in by the caller.

use crate::core::series::NormalizedSeries;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;

/// Fixed header row of exported files.
pub const EXPORT_HEADER: &str = "Timestamp,AccelX,AccelY,AccelZ,GyroX,GyroY,GyroZ,Distance";

/// Errors from logging or exporting rows.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("No data to log!")]
    NoData,
    #[error("No data to export!")]
    EmptyTable,
    #[error("sample index {index} out of range (series has {len} samples)")]
    OutOfRange { index: usize, len: usize },
    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),
}

/// One logged sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRow {
    /// Time label as shown on the chart axis, e.g. `"1.25"`
    pub timestamp: String,
    pub accel_x: f64,
    pub accel_y: f64,
    pub accel_z: f64,
    pub gyro_x: f64,
    pub gyro_y: f64,
    pub gyro_z: f64,
    /// Primary distance channel; `None` for a missing reading
    pub distance: Option<f64>,
}

impl ExportRow {
    /// Row for the sample at `index`.
    pub fn from_series(series: &NormalizedSeries, index: usize) -> Result<Self, ExportError> {
        let out_of_range = || ExportError::OutOfRange {
            index,
            len: series.len(),
        };
        let time = series.time.get(index).ok_or_else(out_of_range)?;
        let [accel_x, accel_y, accel_z] = series.accel.at(index).ok_or_else(out_of_range)?;
        let [gyro_x, gyro_y, gyro_z] = series.gyro.at(index).ok_or_else(out_of_range)?;
        let distance = series
            .distance
            .primary()
            .get(index)
            .copied()
            .ok_or_else(out_of_range)?;

        Ok(Self {
            timestamp: format!("{time:.2}"),
            accel_x,
            accel_y,
            accel_z,
            gyro_x,
            gyro_y,
            gyro_z,
            distance,
        })
    }

    /// Row for the most recent sample.
    pub fn latest(series: &NormalizedSeries) -> Result<Self, ExportError> {
        match series.len() {
            0 => Err(ExportError::NoData),
            len => Self::from_series(series, len - 1),
        }
    }

    /// Fields in `EXPORT_HEADER` order; a missing distance is left blank.
    pub fn to_record(&self) -> [String; 8] {
        [
            self.timestamp.clone(),
            self.accel_x.to_string(),
            self.accel_y.to_string(),
            self.accel_z.to_string(),
            self.gyro_x.to_string(),
            self.gyro_y.to_string(),
            self.gyro_z.to_string(),
            self.distance.map(|d| d.to_string()).unwrap_or_default(),
        ]
    }
}

/// Rows logged for export, in logging order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExportTable {
    rows: Vec<ExportRow>,
}

impl ExportTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, row: ExportRow) {
        self.rows.push(row);
    }

    /// Log the latest sample of `series`.
    pub fn log_latest(&mut self, series: &NormalizedSeries) -> Result<&ExportRow, ExportError> {
        let row = ExportRow::latest(series)?;
        self.rows.push(row);
        Ok(&self.rows[self.rows.len() - 1])
    }

    /// Log every sample of `series`.
    pub fn log_all(&mut self, series: &NormalizedSeries) -> Result<usize, ExportError> {
        if series.is_empty() {
            return Err(ExportError::NoData);
        }
        for index in 0..series.len() {
            self.rows.push(ExportRow::from_series(series, index)?);
        }
        Ok(series.len())
    }

    pub fn rows(&self) -> &[ExportRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Write the table with the fixed header, one record per row.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), ExportError> {
        if self.rows.is_empty() {
            return Err(ExportError::EmptyTable);
        }
        let mut writer = csv::Writer::from_writer(writer);
        writer.write_record(EXPORT_HEADER.split(','))?;
        for row in &self.rows {
            writer.write_record(row.to_record())?;
        }
        writer.flush().map_err(csv::Error::from)?;
        Ok(())
    }

    /// The table as CSV text.
    pub fn to_csv(&self) -> Result<String, ExportError> {
        let mut buf = Vec::new();
        self.write_csv(&mut buf)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

/// File name for an export taken at `at`.
pub fn export_file_name(at: DateTime<Utc>) -> String {
    format!("export_{}.csv", at.format("%Y%m%d_%H%M%S"))
}
