//! # Pipeline Module
//!
//! Runs families one after another. Within a family every existing source is
//! snapshotted, queried and released before the next one is touched. Errors
//! from a single source are logged and counted; they never stop the family
//! or the run.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::FamilyConfig;
use crate::metadata::{self, ExportFormat};
use crate::parsers::browser::HistoryRecord;
use crate::parsers::sqlite_db;
use crate::snapshot::Snapshot;
use crate::sources::{self, SourceDescriptor, TemplateContext};

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("snapshot of {} failed: {source}", path.display())]
    Snapshot {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("query against {} failed: {source}", path.display())]
    Query {
        path: PathBuf,
        source: rusqlite::Error,
    },
}

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub max_results: u32,
    pub temp_root: PathBuf,
    pub format: ExportFormat,
    /// Stamped into export file names.
    pub generated_at: DateTime<Utc>,
}

/// Records gathered for one family, with per-source bookkeeping.
#[derive(Debug, Clone, Default)]
pub struct FamilyOutcome {
    pub family: String,
    pub records: Vec<HistoryRecord>,
    pub sources_found: usize,
    pub sources_processed: usize,
    pub sources_failed: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct FamilySummary {
    pub family: String,
    pub sources_found: usize,
    pub sources_processed: usize,
    pub sources_failed: usize,
    pub records: usize,
    pub export_path: Option<PathBuf>,
    pub export_failed: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub output_dir: PathBuf,
    pub families: Vec<FamilySummary>,
}

impl RunSummary {
    pub fn sources_found(&self) -> usize {
        self.families.iter().map(|f| f.sources_found).sum()
    }

    pub fn sources_failed(&self) -> usize {
        self.families.iter().map(|f| f.sources_failed).sum()
    }

    pub fn records_exported(&self) -> usize {
        self.families
            .iter()
            .filter(|f| f.export_path.is_some())
            .map(|f| f.records)
            .sum()
    }

    pub fn exports(&self) -> Vec<&Path> {
        self.families
            .iter()
            .filter_map(|f| f.export_path.as_deref())
            .collect()
    }
}

/// Snapshot one source, query the snapshot, release it.
pub fn extract_source(
    descriptor: &SourceDescriptor,
    max_results: u32,
    temp_root: &Path,
) -> Result<Vec<HistoryRecord>, SourceError> {
    let snapshot = Snapshot::capture(&descriptor.path, &descriptor.family, temp_root).map_err(
        |source| SourceError::Snapshot {
            path: descriptor.path.clone(),
            source,
        },
    )?;
    sqlite_db::extract_history(snapshot.path(), descriptor, max_results).map_err(|source| {
        SourceError::Query {
            path: descriptor.path.clone(),
            source,
        }
    })
}

/// Process every descriptor of a family in order. Missing paths are skipped
/// without a warning; failing sources are skipped with one.
pub fn collect_family(
    family: &str,
    descriptors: &[SourceDescriptor],
    max_results: u32,
    temp_root: &Path,
) -> FamilyOutcome {
    let mut outcome = FamilyOutcome {
        family: family.to_string(),
        ..FamilyOutcome::default()
    };

    for descriptor in descriptors {
        if !descriptor.path.exists() {
            debug!("{family}: no database at {}", descriptor.path.display());
            continue;
        }
        outcome.sources_found += 1;
        info!("{family}: reading {}", descriptor.path.display());

        match extract_source(descriptor, max_results, temp_root) {
            Ok(records) => {
                info!(
                    "{family}: {} records from profile {:?}",
                    records.len(),
                    descriptor.profile()
                );
                outcome.sources_processed += 1;
                outcome.records.extend(records);
            }
            Err(err) => {
                warn!("{family}: skipping source: {err}");
                outcome.sources_failed += 1;
            }
        }
    }

    outcome
}

/// Discover, extract and export every family. Only per-family results are
/// reported; nothing here aborts the run.
pub fn run_pipeline(
    families: &[FamilyConfig],
    ctx: &TemplateContext,
    output_dir: &Path,
    opts: &RunOptions,
) -> RunSummary {
    let mut summary = RunSummary {
        output_dir: output_dir.to_path_buf(),
        families: Vec::with_capacity(families.len()),
    };

    for family in families {
        let descriptors = sources::discover_family(family, ctx);
        debug!("{}: {} candidate paths", family.name, descriptors.len());

        let outcome = collect_family(&family.name, &descriptors, opts.max_results, &opts.temp_root);
        let mut family_summary = FamilySummary {
            family: outcome.family.clone(),
            sources_found: outcome.sources_found,
            sources_processed: outcome.sources_processed,
            sources_failed: outcome.sources_failed,
            records: outcome.records.len(),
            ..FamilySummary::default()
        };

        if outcome.records.is_empty() {
            info!("{}: no history found", family.name);
        } else {
            match metadata::write_family_export(
                opts.format,
                output_dir,
                &family.name,
                opts.generated_at,
                &outcome.records,
            ) {
                Ok(path) => {
                    info!(
                        "{}: exported {} records to {}",
                        family.name,
                        outcome.records.len(),
                        path.display()
                    );
                    family_summary.export_path = Some(path);
                }
                Err(err) => {
                    warn!("{}: export failed: {err}", family.name);
                    family_summary.export_failed = true;
                }
            }
        }

        summary.families.push(family_summary);
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::QuerySpec;
    use rusqlite::Connection;
    use tempfile::tempdir;

    fn descriptor(path: PathBuf) -> SourceDescriptor {
        SourceDescriptor {
            family: "Chrome".to_string(),
            path,
            query: QuerySpec::chromium(),
        }
    }

    fn chromium_db(path: &Path, rows: usize) {
        let conn = Connection::open(path).expect("conn");
        conn.execute(
            "CREATE TABLE urls (id INTEGER PRIMARY KEY, url TEXT, title TEXT, visit_count INTEGER, last_visit_time INTEGER)",
            [],
        )
        .expect("create");
        for i in 0..rows {
            conn.execute(
                "INSERT INTO urls (url, title, visit_count, last_visit_time) VALUES (?1, ?2, 1, ?3)",
                (format!("https://{i}.test/"), format!("page {i}"), 13_000_000_000_000_000i64 + i as i64),
            )
            .expect("insert");
        }
    }

    #[test]
    fn missing_sources_are_skipped_silently() {
        let dir = tempdir().expect("tempdir");
        let temp_root = tempdir().expect("temp root");
        let present = dir.path().join("History");
        chromium_db(&present, 2);

        let descriptors = vec![
            descriptor(dir.path().join("missing-1")),
            descriptor(present),
            descriptor(dir.path().join("missing-2")),
        ];
        let outcome = collect_family("Chrome", &descriptors, 1000, temp_root.path());
        assert_eq!(outcome.sources_found, 1);
        assert_eq!(outcome.sources_processed, 1);
        assert_eq!(outcome.sources_failed, 0);
        assert_eq!(outcome.records.len(), 2);
    }

    #[test]
    fn failing_source_does_not_stop_the_family() {
        let dir = tempdir().expect("tempdir");
        let temp_root = tempdir().expect("temp root");
        let corrupt = dir.path().join("corrupt");
        std::fs::write(&corrupt, b"definitely not sqlite, just some bytes").expect("write");
        let good = dir.path().join("good");
        chromium_db(&good, 3);

        let outcome = collect_family(
            "Chrome",
            &[descriptor(corrupt.clone()), descriptor(good)],
            1000,
            temp_root.path(),
        );
        assert_eq!(outcome.sources_failed, 1);
        assert_eq!(outcome.sources_processed, 1);
        assert_eq!(outcome.records.len(), 3);

        let err = extract_source(&descriptor(corrupt), 10, temp_root.path()).expect_err("query");
        assert!(matches!(err, SourceError::Query { .. }));
        assert_eq!(std::fs::read_dir(temp_root.path()).expect("ls").count(), 0);
    }

    #[test]
    fn unreadable_temp_root_is_a_snapshot_error() {
        let dir = tempdir().expect("tempdir");
        let source = dir.path().join("History");
        chromium_db(&source, 1);

        let err = extract_source(&descriptor(source), 10, &dir.path().join("no-such-root"))
            .expect_err("snapshot");
        assert!(matches!(err, SourceError::Snapshot { .. }));
    }

    #[test]
    fn summary_totals() {
        let summary = RunSummary {
            output_dir: PathBuf::from("out"),
            families: vec![
                FamilySummary {
                    family: "Chrome".to_string(),
                    sources_found: 2,
                    sources_failed: 1,
                    records: 5,
                    export_path: Some(PathBuf::from("out/Chrome.csv")),
                    ..FamilySummary::default()
                },
                FamilySummary {
                    family: "Edge".to_string(),
                    sources_found: 1,
                    records: 4,
                    export_failed: true,
                    ..FamilySummary::default()
                },
            ],
        };
        assert_eq!(summary.sources_found(), 3);
        assert_eq!(summary.sources_failed(), 1);
        assert_eq!(summary.records_exported(), 5);
        assert_eq!(summary.exports(), vec![Path::new("out/Chrome.csv")]);
    }
}
