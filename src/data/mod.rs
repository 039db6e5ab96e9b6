//! Data module - spreadsheet loading, reshaping and export

mod export;
mod loader;
mod processor;
pub mod table;

pub use export::{export_csv, export_json};
pub use loader::{LoadMode, LoaderError, SheetLoader};
pub use processor::DataProcessor;
