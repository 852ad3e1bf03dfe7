//! Input file readers.
//!
//! The file suffix selects the reader: `.parquet`, `.csv` (comma separated),
//! `.tsv` and `.txt` (tab separated).

use std::fs::File;
use std::path::Path;

use mas_model::ConfigError;
use polars::prelude::{
    CsvParseOptions, CsvReadOptions, DataFrame, NullValues, ParquetReader, SerReader,
};
use tracing::debug;

use crate::error::{IngestError, Result};

/// Supported input formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Parquet,
    Csv,
    Tsv,
}

impl InputFormat {
    /// Pick the format from the file suffix.
    pub fn from_path(path: &Path) -> std::result::Result<Self, ConfigError> {
        let suffix = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        match suffix.as_str() {
            "parquet" => Ok(Self::Parquet),
            "csv" => Ok(Self::Csv),
            "tsv" | "txt" => Ok(Self::Tsv),
            _ => Err(ConfigError::UnsupportedInputFormat {
                suffix: format!(".{suffix}"),
            }),
        }
    }

    fn separator(self) -> u8 {
        match self {
            Self::Tsv => b'\t',
            Self::Csv | Self::Parquet => b',',
        }
    }
}

/// Options for loading the input dataset.
#[derive(Debug, Clone, Default)]
pub struct ReadOptions {
    /// Extra tokens read as null (for example `NA`).
    pub null_values: Vec<String>,
}

impl ReadOptions {
    #[must_use]
    pub fn with_null_values(mut self, values: Vec<String>) -> Self {
        self.null_values = values;
        self
    }
}

/// Read only the column names of the input file.
pub fn read_column_names(path: &Path) -> Result<Vec<String>> {
    let format = InputFormat::from_path(path)?;
    if !path.exists() {
        return Err(ConfigError::InputNotFound {
            path: path.to_path_buf(),
        }
        .into());
    }
    match format {
        InputFormat::Parquet => {
            let file = open(path)?;
            let schema = ParquetReader::new(file)
                .schema()
                .map_err(|source| IngestError::Polars {
                    path: path.to_path_buf(),
                    source,
                })?;
            Ok(schema.iter_names().map(|name| name.to_string()).collect())
        }
        InputFormat::Csv | InputFormat::Tsv => {
            let mut reader = csv::ReaderBuilder::new()
                .has_headers(true)
                .delimiter(format.separator())
                .from_path(path)
                .map_err(|error| IngestError::Header {
                    path: path.to_path_buf(),
                    message: error.to_string(),
                })?;
            let headers = reader.headers().map_err(|error| IngestError::Header {
                path: path.to_path_buf(),
                message: error.to_string(),
            })?;
            Ok(headers
                .iter()
                .map(|header| header.trim().trim_matches('\u{feff}').to_string())
                .collect())
        }
    }
}

/// Load the full input dataset.
pub fn read_input(path: &Path, options: &ReadOptions) -> Result<DataFrame> {
    let format = InputFormat::from_path(path)?;
    if !path.exists() {
        return Err(ConfigError::InputNotFound {
            path: path.to_path_buf(),
        }
        .into());
    }
    let polars_error = |source| IngestError::Polars {
        path: path.to_path_buf(),
        source,
    };
    let df = match format {
        InputFormat::Parquet => ParquetReader::new(open(path)?)
            .finish()
            .map_err(polars_error)?,
        InputFormat::Csv | InputFormat::Tsv => {
            let mut parse_options = CsvParseOptions::default().with_separator(format.separator());
            if !options.null_values.is_empty() {
                let tokens = options
                    .null_values
                    .iter()
                    .map(|value| value.as_str().into())
                    .collect();
                parse_options = parse_options.with_null_values(Some(NullValues::AllColumns(tokens)));
            }
            CsvReadOptions::default()
                .with_has_header(true)
                .with_infer_schema_length(Some(10_000))
                .with_parse_options(parse_options)
                .try_into_reader_with_file_path(Some(path.to_path_buf()))
                .map_err(polars_error)?
                .finish()
                .map_err(polars_error)?
        }
    };
    debug!(
        path = %path.display(),
        rows = df.height(),
        columns = df.width(),
        "input loaded"
    );
    Ok(df)
}

fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|source| IngestError::FileRead {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_follows_suffix() {
        assert_eq!(
            InputFormat::from_path(Path::new("a.parquet")),
            Ok(InputFormat::Parquet)
        );
        assert_eq!(InputFormat::from_path(Path::new("a.TXT")), Ok(InputFormat::Tsv));
        assert_eq!(
            InputFormat::from_path(Path::new("a.xlsx")),
            Err(ConfigError::UnsupportedInputFormat {
                suffix: ".xlsx".to_string()
            })
        );
    }
}
