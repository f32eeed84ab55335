use chrono::{DateTime, Utc};
use serde::Serialize;

/// One normalized history row, tagged with the family and file it came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryRecord {
    pub source: String,
    pub profile: String,
    pub url: String,
    pub title: Option<String>,
    pub visit_count: u64,
    pub last_visit_time: Option<DateTime<Utc>>,
    pub source_file: std::path::PathBuf,
}
