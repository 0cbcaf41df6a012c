//! Merge per-window block frames into one normalized table.
//!
//! Blocks are concatenated in window order, duplicate timestamps are dropped
//! (first occurrence wins), two-level `Field::TICKER` headers are collapsed to
//! the field name, and the timestamp column becomes a leading `date` column.

use super::provider::{DataError, LEVEL_SEPARATOR, TIMESTAMP_COLUMN};
use polars::prelude::*;

/// Name of the timestamp column in the output table.
pub const DATE_COLUMN: &str = "date";

/// Timestamp column names a provider frame may use.
const INDEX_COLUMNS: [&str; 2] = [TIMESTAMP_COLUMN, "Date"];

/// Merge block frames into a single normalized table.
///
/// Returns an empty frame when there are no blocks.
pub fn merge_blocks(blocks: Vec<DataFrame>) -> Result<DataFrame, DataError> {
    if blocks.is_empty() {
        return Ok(DataFrame::empty());
    }

    let frames = blocks
        .into_iter()
        .map(|df| flatten_columns(df).map(|df| df.lazy()))
        .collect::<Result<Vec<LazyFrame>, DataError>>()?;

    let merged = concat(
        frames,
        UnionArgs {
            rechunk: true,
            ..Default::default()
        },
    )
    .map_err(|e| DataError::frame("concat blocks", e))?
    .collect()
    .map_err(|e| DataError::frame("collect blocks", e))?;

    let index = index_column(&merged)?;
    let deduped = merged
        .lazy()
        .unique_stable(Some(vec![index.into()]), UniqueKeepStrategy::First)
        .collect()
        .map_err(|e| DataError::frame("dedupe timestamps", e))?;

    normalize_timestamp_column(deduped)
}

/// Collapse two-level `Field::TICKER` headers to the field level.
///
/// Single-level headers pass through untouched.
pub fn flatten_columns(mut df: DataFrame) -> Result<DataFrame, DataError> {
    let names: Vec<String> = df.get_column_names().iter().map(|n| n.to_string()).collect();
    if !names.iter().any(|n| n.contains(LEVEL_SEPARATOR)) {
        return Ok(df);
    }

    let flat: Vec<String> = names
        .iter()
        .map(|n| match n.split_once(LEVEL_SEPARATOR) {
            Some((field, _ticker)) => field.to_string(),
            None => n.clone(),
        })
        .collect();

    df.set_column_names(flat)
        .map_err(|e| DataError::frame("flatten headers", e))?;
    Ok(df)
}

/// Rename the timestamp column to `date` and move it to the front.
pub fn normalize_timestamp_column(mut df: DataFrame) -> Result<DataFrame, DataError> {
    let index = index_column(&df)?;
    if index != DATE_COLUMN {
        df.rename(&index, DATE_COLUMN.into())
            .map_err(|e| DataError::frame("rename timestamp", e))?;
    }

    let mut order = vec![DATE_COLUMN.to_string()];
    order.extend(
        df.get_column_names()
            .iter()
            .map(|n| n.to_string())
            .filter(|n| n != DATE_COLUMN),
    );

    df.select(order)
        .map_err(|e| DataError::frame("reorder columns", e))
}

fn index_column(df: &DataFrame) -> Result<String, DataError> {
    let names: Vec<String> = df.get_column_names().iter().map(|n| n.to_string()).collect();
    INDEX_COLUMNS
        .iter()
        .chain(std::iter::once(&DATE_COLUMN))
        .find(|c| names.iter().any(|n| n == *c))
        .map(|c| c.to_string())
        .ok_or_else(|| DataError::Frame(format!("no timestamp column in {names:?}")))
}
