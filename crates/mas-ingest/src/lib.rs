//! Input ingestion for association studies.
//!
//! - **columns**: resolve the column selection mini-language against a schema
//! - **reader**: probe headers and load `.parquet` / `.csv` / `.tsv` / `.txt` inputs

mod columns;
mod error;
mod reader;

pub use columns::ColumnResolver;
pub use error::{IngestError, Result};
pub use reader::{InputFormat, ReadOptions, read_column_names, read_input};
