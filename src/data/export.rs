//! Export Module
//! Writes the cleaned table as CSV and the run summary as JSON.

use polars::prelude::*;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to write '{}'. Details: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to write '{}'. Details: {source}", .path.display())]
    Csv { path: PathBuf, source: PolarsError },
    #[error("Failed to write '{}'. Details: {source}", .path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Write a frame as comma-separated text with a header row.
pub fn export_csv(df: &DataFrame, path: &Path) -> Result<(), ExportError> {
    let file = File::create(path).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut df = df.clone();
    CsvWriter::new(BufWriter::new(file))
        .include_header(true)
        .finish(&mut df)
        .map_err(|source| ExportError::Csv {
            path: path.to_path_buf(),
            source,
        })
}

/// Write any serializable value as pretty JSON.
pub fn export_json<T: Serialize>(value: &T, path: &Path) -> Result<(), ExportError> {
    let file = File::create(path).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::to_writer_pretty(BufWriter::new(file), value).map_err(|source| {
        ExportError::Json {
            path: path.to_path_buf(),
            source,
        }
    })
}
