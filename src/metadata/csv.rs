use std::fs::File;

use chrono::SecondsFormat;
use serde::Serialize;

use crate::metadata::{ExportError, HistorySink};
use crate::parsers::browser::HistoryRecord;

pub struct CsvSink {
    writer: csv::Writer<File>,
}

#[derive(Serialize)]
struct HistoryCsv<'a> {
    source: &'a str,
    url: &'a str,
    title: &'a str,
    visit_count: u64,
    last_visit: Option<String>,
}

impl CsvSink {
    pub fn new(file: File) -> Result<Self, ExportError> {
        let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);
        writer.write_record(["Browser/Source", "URL", "Title", "VisitCount", "LastVisit"])?;
        Ok(Self { writer })
    }
}

impl HistorySink for CsvSink {
    fn record_history(&mut self, record: &HistoryRecord) -> Result<(), ExportError> {
        let row = HistoryCsv {
            source: &record.source,
            url: &record.url,
            title: record.title.as_deref().unwrap_or_default(),
            visit_count: record.visit_count,
            last_visit: record
                .last_visit_time
                .map(|t| t.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
        };
        self.writer.serialize(row)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), ExportError> {
        self.writer.flush()?;
        Ok(())
    }
}
