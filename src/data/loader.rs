//! Spreadsheet Loader Module
//! Validates the input path and reads the first sheet of an `.ods` workbook.

use super::table::{self, Row};
use calamine::{open_workbook, Data, Ods, OdsError, Reader};
use log::debug;
use polars::prelude::*;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Extension accepted for spreadsheet inputs.
pub const SPREADSHEET_EXTENSION: &str = "ods";

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("The file '{}' does not exist.", .0.display())]
    NotFound(PathBuf),
    #[error("The file '{}' must have a '.ods' extension.", .0.display())]
    WrongExtension(PathBuf),
    #[error("Failed to read the file '{}'. Details: {source}", .path.display())]
    Parse { path: PathBuf, source: OdsError },
    #[error("Failed to read the file '{}'. Details: the workbook has no usable sheet", .0.display())]
    EmptySheet(PathBuf),
    #[error("Failed to build table: {0}")]
    Polars(#[from] PolarsError),
}

/// How the first sheet is turned into a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMode {
    /// No header or index assumptions: positional column names, every row is data.
    Raw,
    /// First row becomes the headers, first column the row index.
    Indexed,
}

/// Reads spreadsheet exports into Polars frames.
pub struct SheetLoader;

impl SheetLoader {
    /// Check that the path exists and carries the spreadsheet extension.
    pub fn validate_path(path: &Path) -> Result<(), LoaderError> {
        if !path.exists() {
            return Err(LoaderError::NotFound(path.to_path_buf()));
        }

        let has_extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case(SPREADSHEET_EXTENSION))
            .unwrap_or(false);
        if !has_extension {
            return Err(LoaderError::WrongExtension(path.to_path_buf()));
        }

        Ok(())
    }

    /// Validate and load the first sheet of a workbook.
    pub fn load(path: &Path, mode: LoadMode) -> Result<DataFrame, LoaderError> {
        Self::validate_path(path)?;

        let rows = Self::read_first_sheet(path)?;
        if rows.is_empty() {
            return Err(LoaderError::EmptySheet(path.to_path_buf()));
        }
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);

        let df = match mode {
            LoadMode::Raw => table::frame_from_rows(table::positional_names(width), &rows)?,
            LoadMode::Indexed => {
                let mut header = rows[0].clone();
                header.resize(width, None);
                table::frame_from_rows(table::header_names(&header), &rows[1..])?
            }
        };

        debug!(
            "Loaded {} ({:?}): {} rows x {} columns",
            path.display(),
            mode,
            df.height(),
            df.width()
        );
        Ok(df)
    }

    fn read_first_sheet(path: &Path) -> Result<Vec<Row>, LoaderError> {
        let parse_err = |source| LoaderError::Parse {
            path: path.to_path_buf(),
            source,
        };

        let mut workbook: Ods<BufReader<File>> = open_workbook(path).map_err(parse_err)?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| LoaderError::EmptySheet(path.to_path_buf()))?
            .map_err(parse_err)?;

        Ok(range
            .rows()
            .map(|row| row.iter().map(Self::cell_text).collect())
            .collect())
    }

    /// Stringify a cell; empty and error cells become missing.
    pub fn cell_text(cell: &Data) -> Option<String> {
        match cell {
            Data::Empty | Data::Error(_) => None,
            Data::String(s) if s.trim().is_empty() => None,
            Data::String(s) => Some(s.clone()),
            Data::Float(f) => Some(f.to_string()),
            Data::Int(i) => Some(i.to_string()),
            Data::Bool(b) => Some(b.to_string()),
            other => Some(other.to_string()),
        }
    }
}
