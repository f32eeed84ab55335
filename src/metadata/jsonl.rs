use std::fs::File;
use std::io::{BufWriter, Write};

use crate::metadata::{ExportError, HistorySink};
use crate::parsers::browser::HistoryRecord;

/// One JSON object per line, with profile and source file included.
pub struct JsonlSink {
    writer: BufWriter<File>,
}

impl JsonlSink {
    pub fn new(file: File) -> Self {
        Self {
            writer: BufWriter::new(file),
        }
    }
}

impl HistorySink for JsonlSink {
    fn record_history(&mut self, record: &HistoryRecord) -> Result<(), ExportError> {
        serde_json::to_writer(&mut self.writer, record)?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), ExportError> {
        self.writer.flush()?;
        Ok(())
    }
}
