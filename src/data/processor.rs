//! Data Processor Module
//! Reshapes device sheets (transpose, header promotion), keeps complete
//! readings and applies the participant eligibility roster.

use super::table;
use polars::prelude::*;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcessorError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("Table has no rows or columns")]
    EmptyTable,
    #[error("Column '{0}' not found")]
    MissingColumn(String),
}

/// Handles data reshaping and filtering operations.
pub struct DataProcessor;

impl DataProcessor {
    /// Keep rows whose index label ends with `suffix`.
    ///
    /// This is a string match on the label, so `"12"` and `"P2"` both end in `"2"`.
    pub fn filter_by_suffix(df: &DataFrame, suffix: &str) -> Result<DataFrame, ProcessorError> {
        let index = table::index_name(df).ok_or(ProcessorError::EmptyTable)?;

        let filtered = df
            .clone()
            .lazy()
            .filter(
                col(index.as_str())
                    .cast(DataType::String)
                    .str()
                    .ends_with(lit(suffix)),
            )
            .collect()?;
        Ok(filtered)
    }

    /// Swap rows and columns of the whole grid. Headers are not part of the
    /// grid; the result gets positional column names.
    pub fn transpose(df: &DataFrame) -> Result<DataFrame, ProcessorError> {
        let (names, rows) = table::frame_to_rows(df)?;

        let transposed: Vec<table::Row> = (0..names.len())
            .map(|c| rows.iter().map(|row| row[c].clone()).collect())
            .collect();

        Ok(table::frame_from_rows(
            table::positional_names(rows.len()),
            &transposed,
        )?)
    }

    /// Use the first row as column names and drop it from the body.
    pub fn promote_header(df: &DataFrame) -> Result<DataFrame, ProcessorError> {
        let (_, rows) = table::frame_to_rows(df)?;
        let header = rows.first().ok_or(ProcessorError::EmptyTable)?;

        Ok(table::frame_from_rows(
            table::header_names(header),
            &rows[1..],
        )?)
    }

    /// Turn a device sheet (channels down, samples across) into one row per sample.
    ///
    /// The corner cell names the index column, the first column supplies the
    /// channel headers.
    pub fn transpose_and_promote(df: &DataFrame) -> Result<DataFrame, ProcessorError> {
        let transposed = Self::transpose(df)?;
        Self::promote_header(&transposed)
    }

    /// Participants with every eligibility flag set, as `[<id>, <group_col>]`.
    pub fn eligible_groups(
        roster: &DataFrame,
        flags: &[String],
        group_col: &str,
    ) -> Result<DataFrame, ProcessorError> {
        let id_col = table::index_name(roster).ok_or(ProcessorError::EmptyTable)?;
        if roster.column(group_col).is_err() {
            return Err(ProcessorError::MissingColumn(group_col.to_string()));
        }

        let mut eligible = vec![true; roster.height()];
        for flag in flags {
            let column = roster
                .column(flag)
                .map_err(|_| ProcessorError::MissingColumn(flag.clone()))?;

            for (keep, value) in eligible.iter_mut().zip(table::column_strings(column)?) {
                *keep = *keep && value.as_deref().map(is_truthy).unwrap_or(false);
            }
        }

        let mask = BooleanChunked::from_slice("eligible".into(), &eligible);
        let selected = roster.select([id_col.as_str(), group_col])?;
        Ok(selected.filter(&mask)?)
    }
}

/// Spreadsheet booleans arrive as `true`, but hand-typed rosters use `yes`/`1`.
fn is_truthy(value: &str) -> bool {
    let value = value.trim();
    value.eq_ignore_ascii_case("true")
        || value.eq_ignore_ascii_case("yes")
        || value.parse::<f64>().map(|v| v == 1.0).unwrap_or(false)
}
