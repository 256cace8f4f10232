//! Feature table export for the external training job

use crate::error::Result;
use crate::index::ForecastIndex;
use crate::schema::{DATE_COLUMN, FEATURE_COLUMNS};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Write the index as CSV: `date` then the schema columns, one row per date
pub fn write_features_csv<W: Write>(index: &ForecastIndex, writer: W) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(std::iter::once(DATE_COLUMN).chain(FEATURE_COLUMNS))?;

    for (date, features) in index.iter() {
        let mut record = Vec::with_capacity(FEATURE_COLUMNS.len() + 1);
        record.push(date.format("%Y-%m-%d").to_string());
        record.extend(features.to_model_input().iter().map(f64::to_string));
        csv.write_record(&record)?;
    }

    csv.flush()?;
    Ok(())
}

/// Write the feature table to a file, replacing it if present
pub fn write_features_file<P: AsRef<Path>>(index: &ForecastIndex, path: P) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    write_features_csv(index, file)?;
    info!(path = %path.display(), rows = index.len(), "wrote feature table");
    Ok(())
}
