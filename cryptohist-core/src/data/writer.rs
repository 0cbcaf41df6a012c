//! CSV writer for normalized tables.

use super::provider::DataError;
use polars::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

/// Timestamp format in written files (UTC, with explicit offset).
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S+00:00";

/// Path a table for `asset_name` is written to.
pub fn csv_path(output_dir: &Path, asset_name: &str) -> PathBuf {
    output_dir.join(format!("{asset_name}.csv"))
}

/// Write `df` to `<output_dir>/<asset_name>.csv`, creating the directory if
/// needed and overwriting any previous file. No index column is written.
///
/// Not atomic: a crash mid-write leaves a partial file behind.
pub fn write_csv(
    df: &mut DataFrame,
    asset_name: &str,
    output_dir: &Path,
) -> Result<PathBuf, DataError> {
    fs::create_dir_all(output_dir).map_err(|source| DataError::Io {
        path: output_dir.display().to_string(),
        source,
    })?;

    let path = csv_path(output_dir, asset_name);
    let mut file = fs::File::create(&path).map_err(|source| DataError::Io {
        path: path.display().to_string(),
        source,
    })?;

    CsvWriter::new(&mut file)
        .include_header(true)
        .with_datetime_format(Some(DATETIME_FORMAT.to_string()))
        .finish(df)
        .map_err(|e| DataError::frame("write csv", e))?;

    tracing::debug!(path = %path.display(), rows = df.height(), "csv written");
    Ok(path)
}
