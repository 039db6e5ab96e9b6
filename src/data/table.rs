//! Table Helpers
//! Sheets travel through the pipeline as Polars frames of nullable strings.
//! The first column of a frame is its row index.

use polars::prelude::*;
use std::collections::HashSet;

/// Name given to the index column when the sheet leaves its header cell empty.
pub const INDEX_COLUMN: &str = "index";

/// One sheet row, cell by cell.
pub type Row = Vec<Option<String>>;

/// Positional column names `0..width`, used when a sheet is read without headers.
pub fn positional_names(width: usize) -> Vec<String> {
    (0..width).map(|i| i.to_string()).collect()
}

/// Turn header cells into unique, non-empty column names.
///
/// An empty first cell names the index column; other empty cells become
/// `column_<n>`. Repeated names get a `_<k>` suffix.
pub fn header_names(cells: &[Option<String>]) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();

    cells
        .iter()
        .enumerate()
        .map(|(i, cell)| {
            let base = match cell.as_deref().map(str::trim) {
                Some(text) if !text.is_empty() => text.to_string(),
                _ if i == 0 => INDEX_COLUMN.to_string(),
                _ => format!("column_{}", i),
            };

            let mut name = base.clone();
            let mut k = 1;
            while !seen.insert(name.clone()) {
                name = format!("{}_{}", base, k);
                k += 1;
            }
            name
        })
        .collect()
}

/// Build a frame from row-major cells. Short rows are padded with nulls.
pub fn frame_from_rows(names: Vec<String>, rows: &[Row]) -> PolarsResult<DataFrame> {
    let columns: Vec<Column> = names
        .into_iter()
        .enumerate()
        .map(|(c, name)| {
            let values: Vec<Option<String>> = rows
                .iter()
                .map(|row| row.get(c).cloned().flatten())
                .collect();
            Column::new(name.into(), values)
        })
        .collect();

    DataFrame::new(columns)
}

/// Read every cell of a column as an optional string.
pub fn column_strings(column: &Column) -> PolarsResult<Vec<Option<String>>> {
    let casted = column.cast(&DataType::String)?;
    let series = casted.as_materialized_series();
    Ok(series
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect())
}

/// Split a frame back into its header and row-major cells.
pub fn frame_to_rows(df: &DataFrame) -> PolarsResult<(Vec<String>, Vec<Row>)> {
    let names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();

    let mut rows: Vec<Row> = vec![Vec::with_capacity(names.len()); df.height()];
    for column in df.get_columns() {
        for (r, value) in column_strings(column)?.into_iter().enumerate() {
            rows[r].push(value);
        }
    }

    Ok((names, rows))
}

/// Name of the index column (the first column), if the frame has any.
pub fn index_name(df: &DataFrame) -> Option<String> {
    df.get_column_names().first().map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(values: &[&str]) -> Row {
        values
            .iter()
            .map(|v| (!v.is_empty()).then(|| v.to_string()))
            .collect()
    }

    #[test]
    fn header_names_fill_blanks_and_dedupe() {
        let names = header_names(&cells(&["", "A", "", "A"]));
        assert_eq!(names, vec!["index", "A", "column_2", "A_1"]);
    }

    #[test]
    fn rows_survive_a_frame_round_trip() {
        let rows = vec![cells(&["S1_2", "1.5"]), cells(&["S2_2"])];
        let df = frame_from_rows(vec!["Sample".into(), "D_SCI_L_2".into()], &rows).unwrap();
        assert_eq!(df.shape(), (2, 2));

        let (names, back) = frame_to_rows(&df).unwrap();
        assert_eq!(names, vec!["Sample", "D_SCI_L_2"]);
        assert_eq!(back[0], cells(&["S1_2", "1.5"]));
        assert_eq!(back[1], vec![Some("S2_2".to_string()), None]);
        assert_eq!(index_name(&df).as_deref(), Some("Sample"));
    }
}
