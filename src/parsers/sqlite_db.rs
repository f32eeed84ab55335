use std::path::Path;

use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};

use crate::parsers::browser::HistoryRecord;
use crate::sources::SourceDescriptor;

/// Read up to `max_results` rows from a history database, newest first.
///
/// `db_path` is the private snapshot, not `descriptor.path`; the descriptor
/// only supplies the query, family and provenance. The snapshot is opened
/// read-write so SQLite can replay a copied WAL, but the connection is
/// switched to `query_only` before anything runs.
pub fn extract_history(
    db_path: &Path,
    descriptor: &SourceDescriptor,
    max_results: u32,
) -> rusqlite::Result<Vec<HistoryRecord>> {
    let conn = Connection::open_with_flags(
        db_path,
        OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )?;
    conn.pragma_update(None, "query_only", true)?;

    let encoding = descriptor.query.encoding;
    let profile = descriptor.profile();
    let mut out = Vec::new();

    let mut stmt = conn.prepare(&descriptor.query.select_sql())?;
    let rows = stmt.query_map([max_results], |row| {
        let url = text_value(row.get_ref(0)?).unwrap_or_default();
        let title = text_value(row.get_ref(1)?);
        let visit_count = count_value(row.get_ref(2)?);
        let last_visit_time = encoding.decode_value(row.get_ref(3)?);
        Ok((url, title, visit_count, last_visit_time))
    })?;

    for row in rows {
        let (url, title, visit_count, last_visit_time) = row?;
        out.push(HistoryRecord {
            source: descriptor.family.clone(),
            profile: profile.clone(),
            url,
            title,
            visit_count,
            last_visit_time,
            source_file: descriptor.path.clone(),
        });
    }

    Ok(out)
}

fn text_value(value: ValueRef<'_>) -> Option<String> {
    match value {
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            Some(String::from_utf8_lossy(bytes).into_owned())
        }
        ValueRef::Integer(v) => Some(v.to_string()),
        ValueRef::Real(v) => Some(v.to_string()),
        ValueRef::Null => None,
    }
}

fn count_value(value: ValueRef<'_>) -> u64 {
    match value {
        ValueRef::Integer(v) => u64::try_from(v).unwrap_or(0),
        ValueRef::Text(bytes) => std::str::from_utf8(bytes)
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(0),
        _ => 0,
    }
}
