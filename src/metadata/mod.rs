pub mod csv;
pub mod jsonl;

use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::parsers::browser::HistoryRecord;
use crate::util::file_safe;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Jsonl,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Jsonl => "jsonl",
        }
    }
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] ::csv::Error),
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Destination for one family's records.
pub trait HistorySink {
    fn record_history(&mut self, record: &HistoryRecord) -> Result<(), ExportError>;
    fn flush(&mut self) -> Result<(), ExportError>;
}

pub fn build_sink(format: ExportFormat, file: File) -> Result<Box<dyn HistorySink>, ExportError> {
    match format {
        ExportFormat::Csv => Ok(Box::new(csv::CsvSink::new(file)?)),
        ExportFormat::Jsonl => Ok(Box::new(jsonl::JsonlSink::new(file))),
    }
}

/// `<Family>_History_<YYYYMMDD_HHMMSS>.<ext>`
pub fn export_file_name(family: &str, generated_at: DateTime<Utc>, format: ExportFormat) -> String {
    format!(
        "{}_History_{}.{}",
        file_safe(family),
        generated_at.format("%Y%m%d_%H%M%S"),
        format.extension()
    )
}

/// Write all records of one family to a new file in `output_dir` and return
/// its path. Existing files are never overwritten; a numeric suffix is added
/// instead.
pub fn write_family_export(
    format: ExportFormat,
    output_dir: &Path,
    family: &str,
    generated_at: DateTime<Utc>,
    records: &[HistoryRecord],
) -> Result<PathBuf, ExportError> {
    let (path, file) = create_unique(output_dir, &export_file_name(family, generated_at, format))?;
    let mut sink = build_sink(format, file)?;
    for record in records {
        sink.record_history(record)?;
    }
    sink.flush()?;
    Ok(path)
}

fn create_unique(dir: &Path, file_name: &str) -> io::Result<(PathBuf, File)> {
    let (stem, ext) = file_name.rsplit_once('.').unwrap_or((file_name, ""));
    let mut attempt = 0u32;
    loop {
        let candidate = if attempt == 0 {
            dir.join(file_name)
        } else {
            dir.join(format!("{stem}_{attempt}.{ext}"))
        };
        match OpenOptions::new().write(true).create_new(true).open(&candidate) {
            Ok(file) => return Ok((candidate, file)),
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists && attempt < 1000 => {
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
