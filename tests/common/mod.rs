//! Shared fixtures for integration tests: browser-shaped SQLite databases
//! and family configs pointing at them.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use rusqlite::Connection;

use histcarve::config::FamilyConfig;
use histcarve::sources::QuerySpec;

/// Chromium `urls` table with (url, title, visit_count, last_visit_time) rows.
pub fn create_chromium_history(path: &Path, rows: &[(&str, &str, i64, i64)]) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("profile dir");
    }
    let conn = Connection::open(path).expect("conn");
    conn.execute(
        "CREATE TABLE urls (id INTEGER PRIMARY KEY AUTOINCREMENT, url LONGVARCHAR, \
         title LONGVARCHAR, visit_count INTEGER DEFAULT 0 NOT NULL, \
         typed_count INTEGER DEFAULT 0 NOT NULL, last_visit_time INTEGER NOT NULL, \
         hidden INTEGER DEFAULT 0 NOT NULL)",
        [],
    )
    .expect("create urls");
    for (url, title, visits, last_visit) in rows {
        conn.execute(
            "INSERT INTO urls (url, title, visit_count, last_visit_time) VALUES (?1, ?2, ?3, ?4)",
            (url, title, visits, last_visit),
        )
        .expect("insert url");
    }
}

/// Firefox `moz_places` in WAL mode, as the browser keeps it. While the
/// returned connection is alive the inserted rows live only in the `-wal`
/// file.
pub fn create_firefox_places(path: &Path, rows: &[(&str, &str, i64, i64)]) -> Connection {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("profile dir");
    }
    let conn = Connection::open(path).expect("conn");
    let mode: String = conn
        .pragma_update_and_check(None, "journal_mode", "wal", |row| row.get(0))
        .expect("wal");
    assert_eq!(mode, "wal");
    conn.execute(
        "CREATE TABLE moz_places (id INTEGER PRIMARY KEY, url LONGVARCHAR, title LONGVARCHAR, \
         rev_host LONGVARCHAR, visit_count INTEGER DEFAULT 0, hidden INTEGER DEFAULT 0 NOT NULL, \
         typed INTEGER DEFAULT 0 NOT NULL, frecency INTEGER DEFAULT -1 NOT NULL, \
         last_visit_date INTEGER)",
        [],
    )
    .expect("create moz_places");
    for (url, title, visits, last_visit) in rows {
        conn.execute(
            "INSERT INTO moz_places (url, title, visit_count, last_visit_date) VALUES (?1, ?2, ?3, ?4)",
            (url, title, visits, last_visit),
        )
        .expect("insert place");
    }
    conn
}

pub fn family(name: &str, query: QuerySpec, paths: &[PathBuf]) -> FamilyConfig {
    FamilyConfig {
        name: name.to_string(),
        query,
        paths: paths
            .iter()
            .map(|p| p.to_str().expect("utf-8 path").to_string())
            .collect(),
    }
}

pub fn dir_entries(dir: &Path) -> Vec<PathBuf> {
    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)
        .expect("read_dir")
        .map(|e| e.expect("entry").path())
        .collect();
    entries.sort();
    entries
}
