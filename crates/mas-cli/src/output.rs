//! Result table and run summary writers.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use mas_model::AnalysisKind;
use polars::prelude::{ChunkCompareEq, CsvWriter, DataFrame, ParquetWriter, SerWriter};
use tracing::info;

use crate::types::RunSummary;

/// On-disk format of result tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Csv,
    Tsv,
    Parquet,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Tsv => "tsv",
            Self::Parquet => "parquet",
        }
    }
}

/// `<prefix>.<analysis>[.<tag>].<ext>`, next to the prefix.
pub fn output_path(prefix: &Path, analysis: AnalysisKind, tag: Option<&str>, ext: &str) -> PathBuf {
    let mut name = prefix
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    name.push('.');
    name.push_str(analysis.as_str());
    if let Some(tag) = tag {
        name.push('.');
        name.push_str(&file_safe(tag));
    }
    name.push('.');
    name.push_str(ext);
    prefix.with_file_name(name)
}

fn file_safe(tag: &str) -> String {
    tag.chars()
        .map(|c| if matches!(c, '/' | '\\' | ':') { '_' } else { c })
        .collect()
}

/// Directory the prefix writes into.
pub fn output_dir(prefix: &Path) -> &Path {
    match prefix.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// Write one frame in `format`.
pub fn write_frame(frame: &mut DataFrame, path: &Path, format: OutputFormat) -> Result<()> {
    let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    match format {
        OutputFormat::Csv => CsvWriter::new(&mut writer)
            .include_header(true)
            .finish(frame),
        OutputFormat::Tsv => CsvWriter::new(&mut writer)
            .include_header(true)
            .with_separator(b'\t')
            .finish(frame),
        OutputFormat::Parquet => ParquetWriter::new(&mut writer).finish(frame).map(|_| ()),
    }
    .with_context(|| format!("write {}", path.display()))
}

/// Write the combined table and, when asked, one table per predictor.
///
/// Returns the written paths, combined table first.
pub fn write_results(
    results: &DataFrame,
    prefix: &Path,
    analysis: AnalysisKind,
    format: OutputFormat,
    per_predictor: Option<&[String]>,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    let combined = output_path(prefix, analysis, None, format.extension());
    write_frame(&mut results.clone(), &combined, format)?;
    info!(path = %combined.display(), rows = results.height(), "results written");
    written.push(combined);

    if let Some(predictors) = per_predictor {
        let column = results
            .column("predictor")
            .context("result table has no predictor column")?
            .str()
            .context("predictor column is not text")?;
        for predictor in predictors {
            let mask = column.equal(predictor.as_str());
            let mut subset = results.filter(&mask)?;
            let path = output_path(prefix, analysis, Some(predictor), format.extension());
            write_frame(&mut subset, &path, format)?;
            written.push(path);
        }
    }
    Ok(written)
}

/// Write the JSON run summary.
pub fn write_summary(summary: &RunSummary, prefix: &Path) -> Result<PathBuf> {
    let path = output_path(prefix, summary.analysis, Some("summary"), "json");
    let file = File::create(&path).with_context(|| format!("create {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), summary)
        .with_context(|| format!("write {}", path.display()))?;
    Ok(path)
}
